// src/handlers/projects.rs

use axum::{
    extract::{Multipart, Path, Query, State},
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
        rbac::{PermPlansRead, PermPlansWrite, PermProjectsWrite, RequirePermission},
    },
    models::project::{
        Apartment, ApartmentFilter, ArchitecturalPlan, CreateApartmentPayload,
        CreateProjectPayload, PlanFilter, PlanUploadForm, Project,
    },
    services::project_service::PlanUpload,
};

// =========================================================================
//  OBRAS
// =========================================================================

// GET /api/projects
#[utoipa::path(
    get,
    path = "/api/projects",
    tag = "Projects",
    responses((status = 200, body = Vec<Project>)),
    security(("api_jwt" = []))
)]
pub async fn list_projects(
    State(app_state): State<AppState>,
    locale: Locale,
    _user: AuthenticatedUser,
) -> Result<impl IntoResponse, ApiError> {
    let projects = app_state
        .project_service
        .list_projects()
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(projects)))
}

// GET /api/projects/{id}
#[utoipa::path(
    get,
    path = "/api/projects/{id}",
    tag = "Projects",
    params(("id" = Uuid, Path, description = "ID da obra")),
    responses(
        (status = 200, body = Project),
        (status = 404, description = "Obra não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_project(
    State(app_state): State<AppState>,
    locale: Locale,
    _user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let project = app_state
        .project_service
        .get_project(id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(project)))
}

// POST /api/projects
#[utoipa::path(
    post,
    path = "/api/projects",
    tag = "Projects",
    request_body = CreateProjectPayload,
    responses(
        (status = 201, body = Project),
        (status = 403, description = "Sem permissão")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_project(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequirePermission<PermProjectsWrite>,
    Json(payload): Json<CreateProjectPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let project = app_state
        .project_service
        .create_project(&payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(project)))
}

// =========================================================================
//  APARTAMENTOS
// =========================================================================

// GET /api/apartments
#[utoipa::path(
    get,
    path = "/api/apartments",
    tag = "Projects",
    params(ApartmentFilter),
    responses((status = 200, body = Vec<Apartment>)),
    security(("api_jwt" = []))
)]
pub async fn list_apartments(
    State(app_state): State<AppState>,
    locale: Locale,
    _user: AuthenticatedUser,
    Query(filter): Query<ApartmentFilter>,
) -> Result<impl IntoResponse, ApiError> {
    let apartments = app_state
        .project_service
        .list_apartments(&filter)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(apartments)))
}

// POST /api/apartments
#[utoipa::path(
    post,
    path = "/api/apartments",
    tag = "Projects",
    request_body = CreateApartmentPayload,
    responses(
        (status = 201, body = Apartment),
        (status = 404, description = "Obra não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_apartment(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequirePermission<PermProjectsWrite>,
    Json(payload): Json<CreateApartmentPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let apartment = app_state
        .project_service
        .create_apartment(&payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(apartment)))
}

// =========================================================================
//  PLANTAS
// =========================================================================

// GET /api/plans
#[utoipa::path(
    get,
    path = "/api/plans",
    tag = "Plans",
    params(PlanFilter),
    responses((status = 200, body = Vec<ArchitecturalPlan>)),
    security(("api_jwt" = []))
)]
pub async fn list_plans(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequirePermission<PermPlansRead>,
    Query(filter): Query<PlanFilter>,
) -> Result<impl IntoResponse, ApiError> {
    let plans = app_state
        .project_service
        .list_plans(&filter)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(plans)))
}

fn parse_uuid_field(field: &str, raw: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw.trim()).map_err(|_| AppError::InvalidPayload(format!("'{field}' não é um UUID")))
}

// POST /api/plans
#[utoipa::path(
    post,
    path = "/api/plans",
    tag = "Plans",
    request_body(content = PlanUploadForm, content_type = "multipart/form-data"),
    responses(
        (status = 201, body = ArchitecturalPlan),
        (status = 400, description = "Formulário incompleto"),
        (status = 503, description = "Storage não configurado")
    ),
    security(("api_jwt" = []))
)]
pub async fn upload_plan(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequirePermission<PermPlansWrite>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, ApiError> {
    let to_api = |e: AppError| e.to_api_error(&locale, &app_state.i18n_store);

    let mut project_id = None;
    let mut apartment_id = None;
    let mut name = None;
    let mut file: Option<(String, Option<String>, Vec<u8>)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| to_api(AppError::InvalidPayload(e.to_string())))?
    {
        let field_name = field.name().unwrap_or_default().to_string();
        match field_name.as_str() {
            "file" => {
                let file_name = field.file_name().unwrap_or("plan").to_string();
                let content_type = field.content_type().map(str::to_string);
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| to_api(AppError::InvalidPayload(e.to_string())))?;
                file = Some((file_name, content_type, bytes.to_vec()));
            }
            "projectId" | "apartmentId" | "name" => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| to_api(AppError::InvalidPayload(e.to_string())))?;
                match field_name.as_str() {
                    "projectId" => project_id = Some(parse_uuid_field("projectId", &text).map_err(to_api)?),
                    "apartmentId" if !text.trim().is_empty() => {
                        apartment_id = Some(parse_uuid_field("apartmentId", &text).map_err(to_api)?)
                    }
                    "name" => name = Some(text),
                    _ => {}
                }
            }
            _ => {}
        }
    }

    let project_id = project_id.ok_or_else(|| to_api(AppError::InvalidPayload("campo 'projectId' ausente".into())))?;
    let (file_name, content_type, bytes) =
        file.ok_or_else(|| to_api(AppError::InvalidPayload("campo 'file' ausente".into())))?;

    let upload = PlanUpload {
        project_id,
        apartment_id,
        name: name.filter(|n| !n.trim().is_empty()).unwrap_or_else(|| file_name.clone()),
        file_name,
        content_type,
        bytes,
    };

    let plan = app_state.project_service.upload_plan(upload).await.map_err(to_api)?;

    Ok((StatusCode::CREATED, Json(plan)))
}

// DELETE /api/plans/{id}
#[utoipa::path(
    delete,
    path = "/api/plans/{id}",
    tag = "Plans",
    params(("id" = Uuid, Path, description = "ID da planta")),
    responses(
        (status = 204, description = "Arquivo e registro removidos"),
        (status = 404, description = "Planta não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_plan(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequirePermission<PermPlansWrite>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    app_state
        .project_service
        .delete_plan(id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uuid_fields_are_trimmed_and_checked() {
        let id = Uuid::new_v4();
        assert_eq!(parse_uuid_field("projectId", &format!(" {id} ")).unwrap(), id);
        assert!(matches!(
            parse_uuid_field("projectId", "101"),
            Err(AppError::InvalidPayload(_))
        ));
    }
}
