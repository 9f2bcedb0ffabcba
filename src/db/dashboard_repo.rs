// src/db/dashboard_repo.rs

use sqlx::PgPool;

use crate::common::error::AppError;

// Contagens simples para os cards do painel
#[derive(Debug, Default)]
pub struct SiteCounts {
    pub projects: i64,
    pub apartments: i64,
    pub low_stock_materials: i64,
}

#[derive(Clone)]
pub struct DashboardRepository {
    pool: PgPool,
}

impl DashboardRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn get_counts(&self) -> Result<SiteCounts, AppError> {
        // Snapshot consistente dos dados
        let mut tx = self.pool.begin().await?;

        let projects: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM projects")
            .fetch_one(&mut *tx)
            .await?;

        let apartments: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM apartments")
            .fetch_one(&mut *tx)
            .await?;

        let low_stock_materials: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM materials WHERE quantity <= min_quantity")
                .fetch_one(&mut *tx)
                .await?;

        tx.commit().await?;

        Ok(SiteCounts { projects, apartments, low_stock_materials })
    }
}
