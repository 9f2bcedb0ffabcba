// src/handlers/materials.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::{
        auth::AuthenticatedUser,
        i18n::Locale,
        rbac::{PermMaterialsRead, PermMaterialsWrite, RequirePermission},
    },
    models::material::{
        CorrectStockPayload, CreateMaterialPayload, IssueMaterialPayload, Material,
        MaterialFilter, MaterialMovement, ReceiveMaterialPayload,
    },
};

// GET /api/materials
#[utoipa::path(
    get,
    path = "/api/materials",
    tag = "Materials",
    params(MaterialFilter),
    responses((status = 200, body = Vec<Material>)),
    security(("api_jwt" = []))
)]
pub async fn list_materials(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequirePermission<PermMaterialsRead>,
    Query(filter): Query<MaterialFilter>,
) -> Result<impl IntoResponse, ApiError> {
    let materials = app_state
        .material_service
        .list_materials(&filter)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(materials)))
}

// POST /api/materials
#[utoipa::path(
    post,
    path = "/api/materials",
    tag = "Materials",
    request_body = CreateMaterialPayload,
    responses((status = 201, body = Material)),
    security(("api_jwt" = []))
)]
pub async fn create_material(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequirePermission<PermMaterialsWrite>,
    Json(payload): Json<CreateMaterialPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let material = app_state
        .material_service
        .create_material(&payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(material)))
}

// POST /api/materials/{id}/receive
#[utoipa::path(
    post,
    path = "/api/materials/{id}/receive",
    tag = "Materials",
    params(("id" = Uuid, Path, description = "ID do material")),
    request_body = ReceiveMaterialPayload,
    responses(
        (status = 200, description = "Entrada registrada; custo médio recalculado", body = Material),
        (status = 404, description = "Material não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn receive_material(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    _guard: RequirePermission<PermMaterialsWrite>,
    Path(id): Path<Uuid>,
    Json(payload): Json<ReceiveMaterialPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let material = app_state
        .material_service
        .receive_material(id, &payload, user.0.sub)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(material)))
}

// POST /api/materials/{id}/issue
#[utoipa::path(
    post,
    path = "/api/materials/{id}/issue",
    tag = "Materials",
    params(("id" = Uuid, Path, description = "ID do material")),
    request_body = IssueMaterialPayload,
    responses(
        (status = 200, body = Material),
        (status = 404, description = "Material não encontrado"),
        (status = 409, description = "Estoque insuficiente")
    ),
    security(("api_jwt" = []))
)]
pub async fn issue_material(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    _guard: RequirePermission<PermMaterialsWrite>,
    Path(id): Path<Uuid>,
    Json(payload): Json<IssueMaterialPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let material = app_state
        .material_service
        .issue_material(id, &payload, user.0.sub)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(material)))
}

// POST /api/materials/{id}/correct
#[utoipa::path(
    post,
    path = "/api/materials/{id}/correct",
    tag = "Materials",
    params(("id" = Uuid, Path, description = "ID do material")),
    request_body = CorrectStockPayload,
    responses(
        (status = 200, description = "Estoque ajustado à contagem física", body = Material),
        (status = 404, description = "Material não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn correct_stock(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    _guard: RequirePermission<PermMaterialsWrite>,
    Path(id): Path<Uuid>,
    Json(payload): Json<CorrectStockPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let material = app_state
        .material_service
        .correct_stock(id, &payload, user.0.sub)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(material)))
}

// GET /api/materials/{id}/movements
#[utoipa::path(
    get,
    path = "/api/materials/{id}/movements",
    tag = "Materials",
    params(("id" = Uuid, Path, description = "ID do material")),
    responses((status = 200, body = Vec<MaterialMovement>)),
    security(("api_jwt" = []))
)]
pub async fn list_movements(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequirePermission<PermMaterialsRead>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let movements = app_state
        .material_service
        .list_movements(id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(movements)))
}
