// src/handlers/defects.rs

use axum::{
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::{
        i18n::Locale,
        rbac::{
            PermDefectsDelete, PermDefectsRead, PermDefectsStatus, PermDefectsSync,
            PermDefectsWrite, RequirePermission,
        },
    },
    models::defect::{
        ConnectivityStatus, Defect, DefectStatusUpdate, DefectUpdate, NewDefect, SyncReport,
    },
};

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct DefectQuery {
    /// Sem filtro, lista todos os defeitos do armazenamento ativo
    pub apartment_id: Option<String>,
}

// Só para documentar o multipart no Swagger
#[derive(ToSchema)]
#[allow(dead_code)]
pub struct DefectPhotoForm {
    #[schema(value_type = String, format = Binary)]
    pub file: Vec<u8>,
}

// GET /api/defects
#[utoipa::path(
    get,
    path = "/api/defects",
    tag = "Defects",
    params(DefectQuery),
    responses(
        (status = 200, description = "Defeitos (por apartamento, ordem de criação)", body = Vec<Defect>),
        (status = 503, description = "Banco remoto indisponível")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_defects(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequirePermission<PermDefectsRead>,
    Query(query): Query<DefectQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let result = match query.apartment_id.as_deref() {
        Some(apartment_id) => app_state.defect_service.get_defects_by_apartment(apartment_id).await,
        None => app_state.defect_service.list_all().await,
    };
    let defects = result.map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(defects)))
}

// POST /api/defects
#[utoipa::path(
    post,
    path = "/api/defects",
    tag = "Defects",
    request_body = NewDefect,
    responses(
        (status = 201, description = "Defeito registrado", body = Defect),
        (status = 400, description = "Dados inválidos (coordenadas fora de 0..100)")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_defect(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequirePermission<PermDefectsWrite>,
    Json(payload): Json<NewDefect>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let defect = app_state
        .defect_service
        .create_defect(payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(defect)))
}

// GET /api/defects/{id}
#[utoipa::path(
    get,
    path = "/api/defects/{id}",
    tag = "Defects",
    params(("id" = Uuid, Path, description = "ID do defeito")),
    responses(
        (status = 200, body = Defect),
        (status = 404, description = "Defeito não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_defect(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequirePermission<PermDefectsRead>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let defect = app_state
        .defect_service
        .get_defect(id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(defect)))
}

// PATCH /api/defects/{id}
#[utoipa::path(
    patch,
    path = "/api/defects/{id}",
    tag = "Defects",
    params(("id" = Uuid, Path, description = "ID do defeito")),
    request_body = DefectUpdate,
    responses(
        (status = 200, body = Defect),
        (status = 404, description = "Defeito não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_defect(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequirePermission<PermDefectsWrite>,
    Path(id): Path<Uuid>,
    Json(payload): Json<DefectUpdate>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let defect = app_state
        .defect_service
        .update_defect(id, payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(defect)))
}

// PATCH /api/defects/{id}/status
#[utoipa::path(
    patch,
    path = "/api/defects/{id}/status",
    tag = "Defects",
    params(("id" = Uuid, Path, description = "ID do defeito")),
    request_body = DefectStatusUpdate,
    responses(
        (status = 200, description = "Só status e updatedAt mudam", body = Defect),
        (status = 404, description = "Defeito não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_defect_status(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequirePermission<PermDefectsStatus>,
    Path(id): Path<Uuid>,
    Json(payload): Json<DefectStatusUpdate>,
) -> Result<impl IntoResponse, ApiError> {
    let defect = app_state
        .defect_service
        .update_defect_status(id, payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(defect)))
}

// DELETE /api/defects/{id}
#[utoipa::path(
    delete,
    path = "/api/defects/{id}",
    tag = "Defects",
    params(("id" = Uuid, Path, description = "ID do defeito")),
    responses(
        (status = 204, description = "Removido"),
        (status = 404, description = "Defeito não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_defect(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequirePermission<PermDefectsDelete>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    app_state
        .defect_service
        .delete_defect(id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(StatusCode::NO_CONTENT)
}

// POST /api/defects/{id}/photo
#[utoipa::path(
    post,
    path = "/api/defects/{id}/photo",
    tag = "Defects",
    params(("id" = Uuid, Path, description = "ID do defeito")),
    request_body(content = DefectPhotoForm, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Foto anexada (URL do bucket ou data URL)", body = Defect),
        (status = 404, description = "Defeito não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn upload_defect_photo(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequirePermission<PermDefectsWrite>,
    Path(id): Path<Uuid>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, ApiError> {
    let to_api = |e: AppError| e.to_api_error(&locale, &app_state.i18n_store);

    let mut photo: Option<(Vec<u8>, String)> = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| to_api(AppError::InvalidPayload(e.to_string())))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let content_type = field.content_type().unwrap_or("image/jpeg").to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| to_api(AppError::InvalidPayload(e.to_string())))?;
        photo = Some((bytes.to_vec(), content_type));
    }

    let (bytes, content_type) =
        photo.ok_or_else(|| to_api(AppError::InvalidPayload("campo 'file' ausente".into())))?;

    let defect = app_state
        .defect_service
        .upload_defect_photo(id, bytes, &content_type)
        .await
        .map_err(to_api)?;

    Ok((StatusCode::OK, Json(defect)))
}

// GET /api/defects/connectivity
#[utoipa::path(
    get,
    path = "/api/defects/connectivity",
    tag = "Defects",
    responses((status = 200, description = "Modo atual e fila local", body = ConnectivityStatus)),
    security(("api_jwt" = []))
)]
pub async fn get_connectivity(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequirePermission<PermDefectsRead>,
) -> Result<impl IntoResponse, ApiError> {
    let status = app_state
        .defect_service
        .connectivity()
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(status)))
}

// POST /api/defects/connectivity/check
#[utoipa::path(
    post,
    path = "/api/defects/connectivity/check",
    tag = "Defects",
    responses(
        (status = 200, description = "Banco remoto sondado de novo; não migra dados", body = ConnectivityStatus),
        (status = 403, description = "Exige defects:sync")
    ),
    security(("api_jwt" = []))
)]
pub async fn force_check_remote(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequirePermission<PermDefectsSync>,
) -> Result<impl IntoResponse, ApiError> {
    let status = app_state
        .defect_service
        .force_check_remote()
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(status)))
}

// POST /api/defects/sync
#[utoipa::path(
    post,
    path = "/api/defects/sync",
    tag = "Defects",
    responses(
        (status = 200, description = "Fila local reenviada ao banco remoto", body = SyncReport),
        (status = 503, description = "Ainda em modo local")
    ),
    security(("api_jwt" = []))
)]
pub async fn sync_pending(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequirePermission<PermDefectsSync>,
) -> Result<impl IntoResponse, ApiError> {
    let report = app_state
        .defect_service
        .sync_pending()
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(report)))
}
