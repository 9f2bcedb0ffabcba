// src/models/defect.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationError};

// --- Enums (Mapeando o Postgres) ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "defect_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum DefectStatus {
    #[default]
    Active,
    Fixed,
}

// Status detalhado (opcional) usado pela fiscalização
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "defect_detail_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum DefectDetailStatus {
    Open,
    InProgress,
    Resolved,
    Closed,
}

// --- Structs ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Defect {
    pub id: Uuid,

    #[schema(example = "101")]
    pub apartment_id: String,

    #[schema(example = "Trinca na parede")]
    pub title: String,

    pub description: Option<String>,

    pub photo_url: Option<String>,

    pub status: DefectStatus,

    pub detail_status: Option<DefectDetailStatus>,

    // Marca na planta, em % da largura/altura da imagem
    #[schema(example = 15.5)]
    pub x_coord: f64,
    #[schema(example = 20.3)]
    pub y_coord: f64,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

pub fn validate_plan_coordinate(value: f64) -> Result<(), ValidationError> {
    if !(0.0..=100.0).contains(&value) {
        let mut err = ValidationError::new("range");
        err.add_param("min".into(), &0.0);
        err.add_param("max".into(), &100.0);
        err.message = Some("validation.coordinate_range".into());
        return Err(err);
    }
    Ok(())
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewDefect {
    #[validate(length(min = 1, message = "validation.required"))]
    pub apartment_id: String,

    #[validate(length(min = 1, message = "validation.required"))]
    pub title: String,

    pub description: Option<String>,

    pub photo_url: Option<String>,

    pub detail_status: Option<DefectDetailStatus>,

    #[validate(custom(function = "validate_plan_coordinate"))]
    pub x_coord: f64,

    #[validate(custom(function = "validate_plan_coordinate"))]
    pub y_coord: f64,
}

// Atualização parcial: só o que vier preenchido é alterado
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DefectUpdate {
    #[validate(length(min = 1, message = "validation.required"))]
    pub title: Option<String>,

    pub description: Option<String>,

    pub photo_url: Option<String>,

    #[validate(custom(function = "validate_plan_coordinate"))]
    pub x_coord: Option<f64>,

    #[validate(custom(function = "validate_plan_coordinate"))]
    pub y_coord: Option<f64>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DefectStatusUpdate {
    pub status: DefectStatus,
    pub detail_status: Option<DefectDetailStatus>,
}

// --- Persistência híbrida ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum PersistenceMode {
    Remote,
    Local,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ConnectivityStatus {
    pub mode: PersistenceMode,
    pub pending_operations: usize,
}

// Operação feita em modo local, aguardando sincronização com o banco remoto
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "camelCase")]
pub enum PendingOperation {
    Create { defect: Defect },
    Update { defect: Defect },
    Delete { id: Uuid, deleted_at: DateTime<Utc> },
}

impl PendingOperation {
    pub fn defect_id(&self) -> Uuid {
        match self {
            PendingOperation::Create { defect } | PendingOperation::Update { defect } => defect.id,
            PendingOperation::Delete { id, .. } => *id,
        }
    }
}

#[derive(Debug, Default, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SyncReport {
    pub applied: usize,
    pub conflicts: Vec<Uuid>,
    pub remaining: usize,
}
