// src/models/dashboard.rs

use rust_decimal::Decimal;
use serde::Serialize;
use utoipa::ToSchema;

use crate::models::defect::PersistenceMode;

// Os cards do topo do painel gerencial
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    pub project_count: i64,
    pub apartment_count: i64,
    pub active_defects: usize,
    pub fixed_defects: usize,
    pub total_income: Decimal,
    pub total_expenses: Decimal,
    pub net_income: Decimal,
    pub low_stock_materials: i64,
    pub average_task_progress: f64,
    // De onde vieram os números de defeitos
    pub defects_source: PersistenceMode,
}
