// src/models/budget.rs

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationError};

// --- Enums (Mapeando o Postgres) ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "budget_item_type", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum BudgetItemType {
    Expense, // Despesa
    Income,  // Receita
}

impl BudgetItemType {
    pub fn as_str(self) -> &'static str {
        match self {
            BudgetItemType::Expense => "expense",
            BudgetItemType::Income => "income",
        }
    }
}

// --- Structs ---

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BudgetItem {
    pub id: Uuid,

    #[schema(example = "Materiais")]
    pub category: String,

    #[schema(example = "Cimento CP-II 50kg")]
    pub description: Option<String>,

    // Sempre positivo; a direção vem do `type`
    #[schema(example = "40000.00")]
    pub amount: Decimal,

    #[sqlx(rename = "type")]
    #[serde(rename = "type")]
    pub item_type: BudgetItemType,

    #[schema(value_type = String, format = Date, example = "2024-03-15")]
    pub date: NaiveDate,

    pub project_id: Uuid,

    pub created_at: DateTime<Utc>,
}

pub fn validate_not_negative(val: &Decimal) -> Result<(), ValidationError> {
    if val.is_sign_negative() {
        let mut err = ValidationError::new("range");
        err.add_param("min".into(), &0.0);
        err.message = Some("validation.not_negative".into());
        return Err(err);
    }
    Ok(())
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateBudgetItemPayload {
    #[validate(length(min = 1, message = "validation.required"))]
    pub category: String,

    pub description: Option<String>,

    #[validate(custom(function = "validate_not_negative"))]
    pub amount: Decimal,

    #[serde(rename = "type")]
    pub item_type: BudgetItemType,

    #[schema(value_type = String, format = Date)]
    pub date: NaiveDate,

    pub project_id: Uuid,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateBudgetItemPayload {
    #[validate(length(min = 1, message = "validation.required"))]
    pub category: Option<String>,

    pub description: Option<String>,

    #[validate(custom(function = "validate_not_negative"))]
    pub amount: Option<Decimal>,

    #[serde(rename = "type")]
    pub item_type: Option<BudgetItemType>,

    #[schema(value_type = Option<String>, format = Date)]
    pub date: Option<NaiveDate>,
}

// --- Agregações (sempre recalculadas a partir das linhas) ---

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CategoryTotal {
    pub category: String,
    pub income: Decimal,
    pub expenses: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BudgetStats {
    pub total_income: Decimal,
    pub total_expenses: Decimal,
    pub net_income: Decimal,
    pub item_count: usize,
    pub by_category: Vec<CategoryTotal>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProjectBudget {
    pub project_id: Uuid,
    pub total_income: Decimal,
    pub total_expenses: Decimal,
    pub balance: Decimal,
    pub items: Vec<BudgetItem>,
}
