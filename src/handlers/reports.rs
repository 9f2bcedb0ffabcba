// src/handlers/reports.rs

use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use utoipa::IntoParams;
use uuid::Uuid;

use crate::{
    common::error::ApiError,
    config::AppState,
    middleware::{
        i18n::Locale,
        rbac::{PermReportsRead, RequirePermission},
    },
    models::report::DefectReport,
};

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct DefectReportQuery {
    pub project_id: Option<Uuid>,
}

// GET /api/reports/defects
#[utoipa::path(
    get,
    path = "/api/reports/defects",
    tag = "Reports",
    params(DefectReportQuery),
    responses((status = 200, description = "Contagem por apartamento", body = DefectReport)),
    security(("api_jwt" = []))
)]
pub async fn defect_report(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequirePermission<PermReportsRead>,
    Query(query): Query<DefectReportQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let report = app_state
        .report_service
        .defect_report(query.project_id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(report)))
}

// GET /api/reports/defects/{apartment_id}/pdf
#[utoipa::path(
    get,
    path = "/api/reports/defects/{apartment_id}/pdf",
    tag = "Reports",
    params(("apartment_id" = String, Path, description = "Apartamento")),
    responses(
        (status = 200, description = "PDF com os defeitos e suas marcas na planta", content_type = "application/pdf"),
        (status = 500, description = "Fonte não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn defect_report_pdf(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequirePermission<PermReportsRead>,
    Path(apartment_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let pdf = app_state
        .report_service
        .apartment_defects_pdf(&apartment_id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let disposition = format!("inline; filename=\"defeitos-{}.pdf\"", apartment_id.replace('"', ""));
    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        pdf,
    ))
}
