// src/models/report.rs

use serde::Serialize;
use utoipa::ToSchema;

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ApartmentDefectSummary {
    pub apartment_id: String,
    pub total: usize,
    pub active: usize,
    pub fixed: usize,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DefectReport {
    pub apartments: Vec<ApartmentDefectSummary>,
    pub total: usize,
    pub active: usize,
    pub fixed: usize,
}
