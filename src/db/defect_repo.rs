// src/db/defect_repo.rs

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{common::error::AppError, db::DefectStore, models::defect::Defect};

// Tabela 'defects' no Postgres remoto
#[derive(Clone)]
pub struct PgDefectRepository {
    pool: PgPool,
}

impl PgDefectRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DefectStore for PgDefectRepository {
    async fn ping(&self) -> Result<(), AppError> {
        sqlx::query("SELECT id FROM defects LIMIT 1")
            .fetch_optional(&self.pool)
            .await?;
        Ok(())
    }

    async fn insert(&self, defect: &Defect) -> Result<Defect, AppError> {
        let created = sqlx::query_as::<_, Defect>(
            r#"
            INSERT INTO defects (
                id, apartment_id, title, description, photo_url,
                status, detail_status, x_coord, y_coord, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING *
            "#,
        )
        .bind(defect.id)
        .bind(&defect.apartment_id)
        .bind(&defect.title)
        .bind(&defect.description)
        .bind(&defect.photo_url)
        .bind(defect.status)
        .bind(defect.detail_status)
        .bind(defect.x_coord)
        .bind(defect.y_coord)
        .bind(defect.created_at)
        .bind(defect.updated_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(created)
    }

    async fn find(&self, id: Uuid) -> Result<Option<Defect>, AppError> {
        let defect = sqlx::query_as::<_, Defect>("SELECT * FROM defects WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(defect)
    }

    async fn list_by_apartment(&self, apartment_id: &str) -> Result<Vec<Defect>, AppError> {
        let defects = sqlx::query_as::<_, Defect>(
            "SELECT * FROM defects WHERE apartment_id = $1 ORDER BY created_at ASC",
        )
        .bind(apartment_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(defects)
    }

    async fn list_all(&self) -> Result<Vec<Defect>, AppError> {
        let defects =
            sqlx::query_as::<_, Defect>("SELECT * FROM defects ORDER BY apartment_id, created_at")
                .fetch_all(&self.pool)
                .await?;
        Ok(defects)
    }

    async fn save(&self, defect: &Defect) -> Result<Defect, AppError> {
        sqlx::query_as::<_, Defect>(
            r#"
            UPDATE defects SET
                apartment_id = $2,
                title = $3,
                description = $4,
                photo_url = $5,
                status = $6,
                detail_status = $7,
                x_coord = $8,
                y_coord = $9,
                updated_at = $10
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(defect.id)
        .bind(&defect.apartment_id)
        .bind(&defect.title)
        .bind(&defect.description)
        .bind(&defect.photo_url)
        .bind(defect.status)
        .bind(defect.detail_status)
        .bind(defect.x_coord)
        .bind(defect.y_coord)
        .bind(defect.updated_at)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(AppError::DefectNotFound(defect.id))
    }

    async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM defects WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
