// src/db/budget_repo.rs

use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::budget::{BudgetItem, CreateBudgetItemPayload, UpdateBudgetItemPayload},
};

#[derive(Clone)]
pub struct BudgetRepository {
    pool: PgPool,
}

impl BudgetRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // Sem paginação: as estatísticas precisam do conjunto inteiro
    pub async fn get_all(&self, project_id: Option<Uuid>) -> Result<Vec<BudgetItem>, AppError> {
        let items = sqlx::query_as::<_, BudgetItem>(
            r#"
            SELECT * FROM budget_items
            WHERE ($1::uuid IS NULL OR project_id = $1)
            ORDER BY date DESC, created_at DESC
            "#,
        )
        .bind(project_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(items)
    }

    pub async fn create(&self, input: &CreateBudgetItemPayload) -> Result<BudgetItem, AppError> {
        let item = sqlx::query_as::<_, BudgetItem>(
            r#"
            INSERT INTO budget_items (category, description, amount, type, date, project_id)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(&input.category)
        .bind(&input.description)
        .bind(input.amount)
        .bind(input.item_type)
        .bind(input.date)
        .bind(input.project_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(item)
    }

    // Atualização parcial: NULL mantém o valor atual
    pub async fn update(
        &self,
        id: Uuid,
        input: &UpdateBudgetItemPayload,
    ) -> Result<BudgetItem, AppError> {
        sqlx::query_as::<_, BudgetItem>(
            r#"
            UPDATE budget_items SET
                category = COALESCE($2, category),
                description = COALESCE($3, description),
                amount = COALESCE($4, amount),
                type = COALESCE($5, type),
                date = COALESCE($6, date)
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&input.category)
        .bind(&input.description)
        .bind(input.amount)
        .bind(input.item_type)
        .bind(input.date)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(AppError::BudgetItemNotFound(id))
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM budget_items WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::BudgetItemNotFound(id));
        }
        Ok(())
    }
}
