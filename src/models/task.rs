// src/models/task.rs

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    #[default]
    Pending,
    InProgress,
    Completed,
    Delayed,
}

impl TaskStatus {
    /// Leitura tolerante: o banco remoto já usou vários formatos para o status.
    pub fn parse_lenient(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().replace(['-', ' '], "_").as_str() {
            "in_progress" | "inprogress" | "active" | "started" => TaskStatus::InProgress,
            "completed" | "complete" | "done" | "finished" => TaskStatus::Completed,
            "delayed" | "late" | "overdue" => TaskStatus::Delayed,
            _ => TaskStatus::Pending,
        }
    }
}

// Formato fixo exposto pela API, independente das colunas reais da tabela
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    // Texto: a tabela remota pode usar UUID ou inteiro
    pub id: String,
    pub project_id: Option<String>,
    pub title: String,
    pub description: Option<String>,
    pub status: TaskStatus,
    pub assignee: Option<String>,
    #[schema(value_type = Option<String>, format = Date)]
    pub start_date: Option<NaiveDate>,
    #[schema(value_type = Option<String>, format = Date)]
    pub end_date: Option<NaiveDate>,
    pub progress: i32,
    pub order_index: i32,
}

fn validate_progress(value: i32) -> Result<(), ValidationError> {
    if !(0..=100).contains(&value) {
        let mut err = ValidationError::new("range");
        err.message = Some("validation.progress_range".into());
        return Err(err);
    }
    Ok(())
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateProgressPayload {
    #[validate(custom(function = "validate_progress"))]
    #[schema(example = 75)]
    pub progress: i32,
}

// --- Mapeamento adaptativo de colunas ---

pub const TITLE_CANDIDATES: [&str; 2] = ["title", "name"];
pub const ASSIGNEE_CANDIDATES: [&str; 2] = ["assigned_to", "assignee"];
pub const PROGRESS_CANDIDATES: [&str; 2] = ["progress_perc", "progress"];
pub const ORDER_CANDIDATES: [&str; 2] = ["order_index", "position"];
pub const OPTIONAL_COLUMNS: [&str; 5] =
    ["description", "status", "project_id", "start_date", "end_date"];

/// Correspondência entre os campos lógicos de `Task` e as colunas reais da tabela `tasks`.
/// Os nomes vêm sempre das listas de candidatos acima, nunca de entrada externa.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ColumnMapping {
    #[schema(value_type = Option<String>, example = "title")]
    pub title: Option<&'static str>,
    #[schema(value_type = Option<String>, example = "assigned_to")]
    pub assignee: Option<&'static str>,
    #[schema(value_type = Option<String>, example = "progress_perc")]
    pub progress: Option<&'static str>,
    #[schema(value_type = Option<String>)]
    pub order_index: Option<&'static str>,
    #[schema(value_type = Vec<String>)]
    pub optional: Vec<&'static str>,
}

impl Default for ColumnMapping {
    // Usado quando a sondagem falha
    fn default() -> Self {
        Self {
            title: Some("title"),
            assignee: Some("assigned_to"),
            progress: Some("progress_perc"),
            order_index: Some("order_index"),
            optional: OPTIONAL_COLUMNS.to_vec(),
        }
    }
}

impl ColumnMapping {
    pub fn from_columns<S: AsRef<str>>(columns: &[S]) -> Self {
        let present = |name: &str| columns.iter().any(|c| c.as_ref().eq_ignore_ascii_case(name));
        let pick = |candidates: &[&'static str]| candidates.iter().copied().find(|c| present(*c));

        Self {
            title: pick(&TITLE_CANDIDATES[..]),
            assignee: pick(&ASSIGNEE_CANDIDATES[..]),
            progress: pick(&PROGRESS_CANDIDATES[..]),
            order_index: pick(&ORDER_CANDIDATES[..]),
            optional: OPTIONAL_COLUMNS.iter().copied().filter(|c| present(*c)).collect(),
        }
    }

    pub fn has(&self, column: &str) -> bool {
        self.optional.contains(&column)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_parsing_tolerates_spelling() {
        assert_eq!(TaskStatus::parse_lenient("In Progress"), TaskStatus::InProgress);
        assert_eq!(TaskStatus::parse_lenient("in-progress"), TaskStatus::InProgress);
        assert_eq!(TaskStatus::parse_lenient("DONE"), TaskStatus::Completed);
        assert_eq!(TaskStatus::parse_lenient("???"), TaskStatus::Pending);
    }

    #[test]
    fn mapping_prefers_first_candidate() {
        let mapping = ColumnMapping::from_columns(&["id", "name", "title", "progress", "assignee"]);
        assert_eq!(mapping.title, Some("title"));
        assert_eq!(mapping.assignee, Some("assignee"));
        assert_eq!(mapping.progress, Some("progress"));
        assert_eq!(mapping.order_index, None);
        assert!(mapping.optional.is_empty());
    }

    #[test]
    fn mapping_detects_legacy_names() {
        let mapping = ColumnMapping::from_columns(&[
            "id", "project_id", "name", "assigned_to", "progress_perc", "status", "start_date",
        ]);
        assert_eq!(mapping.title, Some("name"));
        assert_eq!(mapping.assignee, Some("assigned_to"));
        assert_eq!(mapping.progress, Some("progress_perc"));
        assert!(mapping.has("status"));
        assert!(mapping.has("project_id"));
        assert!(!mapping.has("end_date"));
    }

    #[test]
    fn empty_table_shape_maps_nothing() {
        let mapping = ColumnMapping::from_columns::<&str>(&[]);
        assert_eq!(mapping.title, None);
        assert_eq!(mapping.progress, None);
        assert_ne!(mapping, ColumnMapping::default());
    }

    #[test]
    fn progress_out_of_range_is_rejected() {
        assert!(UpdateProgressPayload { progress: 100 }.validate().is_ok());
        assert!(UpdateProgressPayload { progress: 101 }.validate().is_err());
        assert!(UpdateProgressPayload { progress: -5 }.validate().is_err());
    }
}
