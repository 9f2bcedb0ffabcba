// src/handlers/budget.rs

use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use utoipa::IntoParams;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::{
        i18n::Locale,
        rbac::{PermBudgetRead, PermBudgetWrite, PermReportsRead, RequirePermission},
    },
    models::budget::{
        BudgetItem, BudgetStats, CreateBudgetItemPayload, ProjectBudget, UpdateBudgetItemPayload,
    },
};

#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct BudgetQuery {
    pub project_id: Option<Uuid>,
}

// GET /api/budget/items
#[utoipa::path(
    get,
    path = "/api/budget/items",
    tag = "Budget",
    params(BudgetQuery),
    responses((status = 200, description = "Lançamentos, do mais recente ao mais antigo", body = Vec<BudgetItem>)),
    security(("api_jwt" = []))
)]
pub async fn list_items(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequirePermission<PermBudgetRead>,
    Query(query): Query<BudgetQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let items = app_state
        .budget_service
        .get_all_budget_items(query.project_id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(items)))
}

// POST /api/budget/items
#[utoipa::path(
    post,
    path = "/api/budget/items",
    tag = "Budget",
    request_body = CreateBudgetItemPayload,
    responses(
        (status = 201, body = BudgetItem),
        (status = 400, description = "Dados inválidos")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_item(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequirePermission<PermBudgetWrite>,
    Json(payload): Json<CreateBudgetItemPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let item = app_state
        .budget_service
        .create_budget_item(&payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(item)))
}

// PATCH /api/budget/items/{id}
#[utoipa::path(
    patch,
    path = "/api/budget/items/{id}",
    tag = "Budget",
    params(("id" = Uuid, Path, description = "ID do lançamento")),
    request_body = UpdateBudgetItemPayload,
    responses(
        (status = 200, body = BudgetItem),
        (status = 404, description = "Lançamento não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_item(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequirePermission<PermBudgetWrite>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateBudgetItemPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let item = app_state
        .budget_service
        .update_budget_item(id, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(item)))
}

// DELETE /api/budget/items/{id}
#[utoipa::path(
    delete,
    path = "/api/budget/items/{id}",
    tag = "Budget",
    params(("id" = Uuid, Path, description = "ID do lançamento")),
    responses(
        (status = 204, description = "Removido"),
        (status = 404, description = "Lançamento não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_item(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequirePermission<PermBudgetWrite>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    app_state
        .budget_service
        .delete_budget_item(id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(StatusCode::NO_CONTENT)
}

// GET /api/budget/stats
#[utoipa::path(
    get,
    path = "/api/budget/stats",
    tag = "Budget",
    params(BudgetQuery),
    responses((status = 200, body = BudgetStats)),
    security(("api_jwt" = []))
)]
pub async fn get_stats(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequirePermission<PermBudgetRead>,
    Query(query): Query<BudgetQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let stats = app_state
        .budget_service
        .get_budget_stats(query.project_id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(stats)))
}

// GET /api/budget/projects/{project_id}
#[utoipa::path(
    get,
    path = "/api/budget/projects/{project_id}",
    tag = "Budget",
    params(("project_id" = Uuid, Path, description = "ID da obra")),
    responses((status = 200, body = ProjectBudget)),
    security(("api_jwt" = []))
)]
pub async fn get_project_budget(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequirePermission<PermBudgetRead>,
    Path(project_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let budget = app_state
        .budget_service
        .get_project_budget(project_id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(budget)))
}

// GET /api/reports/budget.csv
#[utoipa::path(
    get,
    path = "/api/reports/budget.csv",
    tag = "Reports",
    params(BudgetQuery),
    responses((status = 200, description = "CSV: date,category,description,type,amount", content_type = "text/csv")),
    security(("api_jwt" = []))
)]
pub async fn export_csv(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequirePermission<PermReportsRead>,
    Query(query): Query<BudgetQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let csv = app_state
        .budget_service
        .export_budget_csv(query.project_id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
            (header::CONTENT_DISPOSITION, "attachment; filename=\"budget.csv\""),
        ],
        csv,
    ))
}
