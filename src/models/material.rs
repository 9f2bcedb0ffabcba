// src/models/material.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::models::budget::validate_not_negative;

// --- Material do almoxarifado ---
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Material {
    pub id: Uuid,
    pub project_id: Option<Uuid>,
    #[schema(example = "Cimento CP-II 50kg")]
    pub name: String,
    #[schema(example = "saco")]
    pub unit: String,
    #[schema(example = "120")]
    pub quantity: Decimal,
    #[schema(example = "30")]
    pub min_quantity: Decimal,
    // Custo médio unitário
    #[schema(example = "32.90")]
    pub unit_price: Decimal,
    pub supplier: Option<String>,
    pub updated_at: DateTime<Utc>,
}

impl Material {
    pub fn is_low_stock(&self) -> bool {
        self.quantity <= self.min_quantity
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::Type, PartialEq, ToSchema)]
#[sqlx(type_name = "material_movement_reason", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum MovementReason {
    Receipt,    // Entrada (compra / entrega)
    Issue,      // Saída para a frente de serviço
    Correction, // Ajuste de inventário
}

// --- Histórico ---
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MaterialMovement {
    pub id: Uuid,
    pub material_id: Uuid,
    pub quantity_changed: Decimal,
    pub reason: MovementReason,
    pub unit_price: Option<Decimal>,
    pub notes: Option<String>,
    pub created_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateMaterialPayload {
    pub project_id: Option<Uuid>,

    #[validate(length(min = 1, message = "validation.required"))]
    pub name: String,

    #[validate(length(min = 1, message = "validation.required"))]
    pub unit: String,

    #[validate(custom(function = "validate_not_negative"))]
    #[serde(default)]
    pub min_quantity: Decimal,

    pub supplier: Option<String>,
}

// Entrada de material (compra / entrega)
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReceiveMaterialPayload {
    #[validate(custom(function = "validate_not_negative"))]
    pub quantity: Decimal,

    #[validate(custom(function = "validate_not_negative"))]
    pub unit_price: Decimal,

    pub notes: Option<String>,
}

// Saída de material para a obra
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct IssueMaterialPayload {
    #[validate(custom(function = "validate_not_negative"))]
    pub quantity: Decimal,

    pub notes: Option<String>,
}

// Ajuste de inventário: informa a contagem física
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CorrectStockPayload {
    #[validate(custom(function = "validate_not_negative"))]
    pub counted_quantity: Decimal,

    pub notes: Option<String>,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct MaterialFilter {
    pub project_id: Option<Uuid>,
    #[serde(default)]
    pub low_stock_only: bool,
}
