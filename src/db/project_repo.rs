// src/db/project_repo.rs

use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::project::{
        Apartment, ApartmentFilter, ArchitecturalPlan, CreateApartmentPayload,
        CreateProjectPayload, PlanFilter, Project,
    },
};

#[derive(Clone)]
pub struct ProjectRepository {
    pool: PgPool,
}

impl ProjectRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // =========================================================================
    //  OBRAS
    // =========================================================================

    pub async fn list_projects(&self) -> Result<Vec<Project>, AppError> {
        let projects = sqlx::query_as::<_, Project>("SELECT * FROM projects ORDER BY name ASC")
            .fetch_all(&self.pool)
            .await?;
        Ok(projects)
    }

    pub async fn find_project(&self, id: Uuid) -> Result<Option<Project>, AppError> {
        let project = sqlx::query_as::<_, Project>("SELECT * FROM projects WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(project)
    }

    pub async fn create_project(&self, input: &CreateProjectPayload) -> Result<Project, AppError> {
        let project = sqlx::query_as::<_, Project>(
            "INSERT INTO projects (name, address, description) VALUES ($1, $2, $3) RETURNING *",
        )
        .bind(&input.name)
        .bind(&input.address)
        .bind(&input.description)
        .fetch_one(&self.pool)
        .await?;
        Ok(project)
    }

    // =========================================================================
    //  APARTAMENTOS
    // =========================================================================

    pub async fn list_apartments(&self, filter: &ApartmentFilter) -> Result<Vec<Apartment>, AppError> {
        let mut query: QueryBuilder<Postgres> = QueryBuilder::new("SELECT * FROM apartments WHERE TRUE");

        if let Some(project_id) = filter.project_id {
            query.push(" AND project_id = ").push_bind(project_id);
        }
        if let Some(floor) = filter.floor {
            query.push(" AND floor = ").push_bind(floor);
        }
        if let Some(min_area) = filter.min_area {
            query.push(" AND area >= ").push_bind(min_area);
        }
        if let Some(max_area) = filter.max_area {
            query.push(" AND area <= ").push_bind(max_area);
        }
        if let Some(max_price) = filter.max_price {
            query.push(" AND price <= ").push_bind(max_price);
        }
        query.push(" ORDER BY floor ASC, number ASC");

        let apartments = query
            .build_query_as::<Apartment>()
            .fetch_all(&self.pool)
            .await?;
        Ok(apartments)
    }

    pub async fn create_apartment(&self, input: &CreateApartmentPayload) -> Result<Apartment, AppError> {
        let apartment = sqlx::query_as::<_, Apartment>(
            r#"
            INSERT INTO apartments (project_id, number, floor, area, rooms, price, status)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(input.project_id)
        .bind(&input.number)
        .bind(input.floor)
        .bind(input.area)
        .bind(input.rooms)
        .bind(input.price)
        .bind(&input.status)
        .fetch_one(&self.pool)
        .await?;
        Ok(apartment)
    }

    // =========================================================================
    //  PLANTAS
    // =========================================================================

    pub async fn list_plans(&self, filter: &PlanFilter) -> Result<Vec<ArchitecturalPlan>, AppError> {
        let plans = sqlx::query_as::<_, ArchitecturalPlan>(
            r#"
            SELECT * FROM architectural_plans
            WHERE ($1::uuid IS NULL OR project_id = $1)
              AND ($2::uuid IS NULL OR apartment_id = $2)
            ORDER BY created_at DESC
            "#,
        )
        .bind(filter.project_id)
        .bind(filter.apartment_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(plans)
    }

    pub async fn find_plan(&self, id: Uuid) -> Result<Option<ArchitecturalPlan>, AppError> {
        let plan = sqlx::query_as::<_, ArchitecturalPlan>(
            "SELECT * FROM architectural_plans WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(plan)
    }

    pub async fn create_plan(
        &self,
        project_id: Uuid,
        apartment_id: Option<Uuid>,
        name: &str,
        file_url: &str,
        storage_path: &str,
        content_type: Option<&str>,
    ) -> Result<ArchitecturalPlan, AppError> {
        let plan = sqlx::query_as::<_, ArchitecturalPlan>(
            r#"
            INSERT INTO architectural_plans
                (project_id, apartment_id, name, file_url, storage_path, content_type)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(project_id)
        .bind(apartment_id)
        .bind(name)
        .bind(file_url)
        .bind(storage_path)
        .bind(content_type)
        .fetch_one(&self.pool)
        .await?;
        Ok(plan)
    }

    pub async fn delete_plan(&self, id: Uuid) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM architectural_plans WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::PlanNotFound(id));
        }
        Ok(())
    }
}
