// src/db/material_repo.rs

use rust_decimal::Decimal;
use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::material::{
        CreateMaterialPayload, Material, MaterialFilter, MaterialMovement, MovementReason,
    },
};

#[derive(Clone)]
pub struct MaterialRepository {
    pool: PgPool,
}

impl MaterialRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    // ---
    // Leitura (usa a pool principal)
    // ---

    pub async fn list(&self, filter: &MaterialFilter) -> Result<Vec<Material>, AppError> {
        let materials = sqlx::query_as::<_, Material>(
            r#"
            SELECT * FROM materials
            WHERE ($1::uuid IS NULL OR project_id = $1)
              AND (NOT $2 OR quantity <= min_quantity)
            ORDER BY name ASC
            "#,
        )
        .bind(filter.project_id)
        .bind(filter.low_stock_only)
        .fetch_all(&self.pool)
        .await?;
        Ok(materials)
    }

    pub async fn list_movements(&self, material_id: Uuid) -> Result<Vec<MaterialMovement>, AppError> {
        let movements = sqlx::query_as::<_, MaterialMovement>(
            "SELECT * FROM material_movements WHERE material_id = $1 ORDER BY created_at DESC",
        )
        .bind(material_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(movements)
    }

    pub async fn create(&self, input: &CreateMaterialPayload) -> Result<Material, AppError> {
        let material = sqlx::query_as::<_, Material>(
            r#"
            INSERT INTO materials (project_id, name, unit, min_quantity, supplier)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(input.project_id)
        .bind(&input.name)
        .bind(&input.unit)
        .bind(input.min_quantity)
        .bind(&input.supplier)
        .fetch_one(&self.pool)
        .await?;
        Ok(material)
    }

    // ---
    // Escrita dentro de transação (recebem o executor)
    // ---

    /// Trava a linha do material até o fim da transação.
    pub async fn find_for_update<'e, E>(&self, executor: E, id: Uuid) -> Result<Option<Material>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let material = sqlx::query_as::<_, Material>("SELECT * FROM materials WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(material)
    }

    pub async fn apply_stock_change<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        quantity_changed: Decimal, // ex: +50.0 ou -1.0
        new_unit_price: Option<Decimal>,
    ) -> Result<Material, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let material = sqlx::query_as::<_, Material>(
            r#"
            UPDATE materials SET
                quantity = quantity + $2,
                unit_price = COALESCE($3, unit_price),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(quantity_changed)
        .bind(new_unit_price)
        .fetch_one(executor)
        .await?;
        Ok(material)
    }

    /// Registra uma movimentação no histórico (auditoria).
    pub async fn record_movement<'e, E>(
        &self,
        executor: E,
        material_id: Uuid,
        quantity_changed: Decimal,
        reason: MovementReason,
        unit_price: Option<Decimal>,
        notes: Option<&str>,
        created_by: Option<Uuid>,
    ) -> Result<MaterialMovement, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let movement = sqlx::query_as::<_, MaterialMovement>(
            r#"
            INSERT INTO material_movements
                (material_id, quantity_changed, reason, unit_price, notes, created_by)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(material_id)
        .bind(quantity_changed)
        .bind(reason)
        .bind(unit_price)
        .bind(notes)
        .bind(created_by)
        .fetch_one(executor)
        .await?;
        Ok(movement)
    }
}
