// src/handlers/tasks.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use utoipa::IntoParams;
use validator::Validate;

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::{
        i18n::Locale,
        rbac::{PermTasksRead, PermTasksWrite, RequirePermission},
    },
    models::task::{ColumnMapping, Task, UpdateProgressPayload},
};

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct TaskQuery {
    /// Exige a coluna `project_id` na tabela
    pub project_id: Option<String>,
}

// GET /api/tasks
#[utoipa::path(
    get,
    path = "/api/tasks",
    tag = "Tasks",
    params(TaskQuery),
    responses(
        (status = 200, description = "Tarefas ordenadas por order_index", body = Vec<Task>),
        (status = 409, description = "Tabela sem a coluna project_id")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_tasks(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequirePermission<PermTasksRead>,
    Query(query): Query<TaskQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let tasks = app_state
        .task_service
        .get_all_tasks(query.project_id.as_deref())
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(tasks)))
}

// PATCH /api/tasks/{id}/progress
#[utoipa::path(
    patch,
    path = "/api/tasks/{id}/progress",
    tag = "Tasks",
    params(("id" = String, Path, description = "ID da tarefa (forma texto)")),
    request_body = UpdateProgressPayload,
    responses(
        (status = 200, body = Task),
        (status = 400, description = "Progresso fora de 0..100"),
        (status = 404, description = "Tarefa não encontrada"),
        (status = 409, description = "Tabela sem coluna de progresso")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_progress(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequirePermission<PermTasksWrite>,
    Path(id): Path<String>,
    Json(payload): Json<UpdateProgressPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let task = app_state
        .task_service
        .update_task_progress(&id, payload.progress)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(task)))
}

// GET /api/tasks/schema
#[utoipa::path(
    get,
    path = "/api/tasks/schema",
    tag = "Tasks",
    responses((status = 200, description = "Mapeamento de colunas em uso", body = ColumnMapping)),
    security(("api_jwt" = []))
)]
pub async fn get_schema(
    State(app_state): State<AppState>,
    _guard: RequirePermission<PermTasksRead>,
) -> Json<ColumnMapping> {
    Json(app_state.task_service.mapping().await)
}

// POST /api/tasks/schema/refresh
#[utoipa::path(
    post,
    path = "/api/tasks/schema/refresh",
    tag = "Tasks",
    responses((status = 200, description = "Colunas detectadas de novo", body = ColumnMapping)),
    security(("api_jwt" = []))
)]
pub async fn refresh_schema(
    State(app_state): State<AppState>,
    _guard: RequirePermission<PermTasksWrite>,
) -> Json<ColumnMapping> {
    Json(app_state.task_service.refresh_mapping().await)
}
