// src/db/task_repo.rs

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use sqlx::{postgres::PgRow, Column, PgPool, Row};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::task::{ColumnMapping, Task, TaskStatus},
};

// A tabela 'tasks' não tem formato garantido: toda leitura passa pelo ColumnMapping.
#[derive(Clone)]
pub struct TaskRepository {
    pool: PgPool,
}

impl TaskRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Sonda o formato da tabela: uma linha, ou o catálogo se a tabela estiver vazia.
    pub async fn detect_mapping(&self) -> Result<ColumnMapping, AppError> {
        let row = sqlx::query("SELECT * FROM tasks LIMIT 1")
            .fetch_optional(&self.pool)
            .await?;

        let columns: Vec<String> = match row {
            Some(row) => row.columns().iter().map(|c| c.name().to_string()).collect(),
            None => {
                sqlx::query_scalar::<_, String>(
                    r#"
                    SELECT column_name::text
                    FROM information_schema.columns
                    WHERE table_name = 'tasks' AND table_schema = current_schema()
                    "#,
                )
                .fetch_all(&self.pool)
                .await?
            }
        };

        Ok(ColumnMapping::from_columns(&columns))
    }

    pub async fn get_all(
        &self,
        mapping: &ColumnMapping,
        project_id: Option<&str>,
    ) -> Result<Vec<Task>, AppError> {
        let mut sql = String::from("SELECT * FROM tasks");
        if project_id.is_some() {
            if !mapping.has("project_id") {
                return Err(AppError::ColumnUnavailable("project_id"));
            }
            sql.push_str(" WHERE project_id::text = $1");
        }
        if let Some(order) = mapping.order_index {
            sql.push_str(&format!(" ORDER BY {} ASC", order));
        }

        let mut query = sqlx::query(&sql);
        if let Some(project_id) = project_id {
            query = query.bind(project_id);
        }

        let rows = query.fetch_all(&self.pool).await?;
        Ok(rows.iter().map(|row| task_from_row(row, mapping)).collect())
    }

    pub async fn update_progress(
        &self,
        mapping: &ColumnMapping,
        id: &str,
        progress: i32,
    ) -> Result<Task, AppError> {
        let column = mapping.progress.ok_or(AppError::ColumnUnavailable("progress"))?;

        // `column` sai da lista fixa de candidatos, nunca do cliente
        let sql = format!("UPDATE tasks SET {} = $1 WHERE id::text = $2 RETURNING *", column);

        let row = sqlx::query(&sql)
            .bind(progress)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::TaskNotFound(id.to_string()))?;

        Ok(task_from_row(&row, mapping))
    }
}

// ---
// Leitura tolerante de colunas (o tipo real varia entre instalações)
// ---

fn text_column(row: &PgRow, column: &str) -> Option<String> {
    if let Ok(value) = row.try_get::<Option<String>, _>(column) {
        return value;
    }
    if let Ok(value) = row.try_get::<Option<Uuid>, _>(column) {
        return value.map(|v| v.to_string());
    }
    if let Ok(value) = row.try_get::<Option<i64>, _>(column) {
        return value.map(|v| v.to_string());
    }
    if let Ok(value) = row.try_get::<Option<i32>, _>(column) {
        return value.map(|v| v.to_string());
    }
    // Enums do Postgres chegam como texto
    row.try_get_unchecked::<Option<String>, _>(column).ok().flatten()
}

fn int_column(row: &PgRow, column: &str) -> Option<i32> {
    if let Ok(value) = row.try_get::<Option<i32>, _>(column) {
        return value;
    }
    if let Ok(value) = row.try_get::<Option<i64>, _>(column) {
        return value.and_then(|v| i32::try_from(v).ok());
    }
    if let Ok(value) = row.try_get::<Option<i16>, _>(column) {
        return value.map(i32::from);
    }
    if let Ok(value) = row.try_get::<Option<f64>, _>(column) {
        return value.map(|v| v.round() as i32);
    }
    if let Ok(value) = row.try_get::<Option<f32>, _>(column) {
        return value.map(|v| v.round() as i32);
    }
    if let Ok(value) = row.try_get::<Option<Decimal>, _>(column) {
        return value.and_then(|v| v.round().to_i32());
    }
    None
}

fn date_column(row: &PgRow, column: &str) -> Option<NaiveDate> {
    if let Ok(value) = row.try_get::<Option<NaiveDate>, _>(column) {
        return value;
    }
    if let Ok(value) = row.try_get::<Option<DateTime<Utc>>, _>(column) {
        return value.map(|v| v.date_naive());
    }
    if let Ok(value) = row.try_get::<Option<NaiveDateTime>, _>(column) {
        return value.map(|v| v.date());
    }
    None
}

/// Converte uma linha no formato fixo `Task`; coluna ausente vira valor padrão.
fn task_from_row(row: &PgRow, mapping: &ColumnMapping) -> Task {
    let optional_text = |name: &str| mapping.has(name).then(|| text_column(row, name)).flatten();
    let optional_date = |name: &str| mapping.has(name).then(|| date_column(row, name)).flatten();

    Task {
        id: text_column(row, "id").unwrap_or_default(),
        project_id: optional_text("project_id"),
        title: mapping.title.and_then(|c| text_column(row, c)).unwrap_or_default(),
        description: optional_text("description"),
        status: optional_text("status")
            .map(|s| TaskStatus::parse_lenient(&s))
            .unwrap_or_default(),
        assignee: mapping.assignee.and_then(|c| text_column(row, c)),
        start_date: optional_date("start_date"),
        end_date: optional_date("end_date"),
        progress: mapping
            .progress
            .and_then(|c| int_column(row, c))
            .unwrap_or(0)
            .clamp(0, 100),
        order_index: mapping.order_index.and_then(|c| int_column(row, c)).unwrap_or(0),
    }
}
