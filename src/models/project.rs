// src/models/project.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::models::budget::validate_not_negative;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: Uuid,
    #[schema(example = "Residencial Aurora")]
    pub name: String,
    #[schema(example = "Rua das Acácias, 200")]
    pub address: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateProjectPayload {
    #[validate(length(min = 1, message = "validation.required"))]
    pub name: String,
    #[validate(length(min = 1, message = "validation.required"))]
    pub address: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Apartment {
    pub id: Uuid,
    pub project_id: Uuid,
    #[schema(example = "101")]
    pub number: String,
    #[schema(example = 1)]
    pub floor: i32,
    #[schema(example = "54.30")]
    pub area: Decimal,
    pub rooms: Option<i32>,
    pub price: Option<Decimal>,
    #[schema(example = "available")]
    pub status: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateApartmentPayload {
    pub project_id: Uuid,
    #[validate(length(min = 1, message = "validation.required"))]
    pub number: String,
    pub floor: i32,
    #[validate(custom(function = "validate_not_negative"))]
    pub area: Decimal,
    pub rooms: Option<i32>,
    #[validate(custom(function = "validate_not_negative"))]
    pub price: Option<Decimal>,
    pub status: Option<String>,
}

// Filtros da listagem de apartamentos (todos opcionais)
#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct ApartmentFilter {
    pub project_id: Option<Uuid>,
    pub floor: Option<i32>,
    pub min_area: Option<Decimal>,
    pub max_area: Option<Decimal>,
    pub max_price: Option<Decimal>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ArchitecturalPlan {
    pub id: Uuid,
    pub project_id: Uuid,
    pub apartment_id: Option<Uuid>,
    #[schema(example = "Planta baixa - 1º pavimento")]
    pub name: String,
    pub file_url: String,
    // Caminho do objeto dentro do bucket (para remoção)
    #[serde(skip_serializing)]
    #[schema(ignore)]
    pub storage_path: String,
    pub content_type: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct PlanFilter {
    pub project_id: Option<Uuid>,
    pub apartment_id: Option<Uuid>,
}

// Apenas para a documentação do upload multipart
#[derive(ToSchema)]
#[allow(dead_code)]
#[schema(rename_all = "camelCase")]
pub struct PlanUploadForm {
    #[schema(value_type = String, format = Binary)]
    pub file: Vec<u8>,
    pub project_id: Uuid,
    pub apartment_id: Option<Uuid>,
    pub name: String,
}
