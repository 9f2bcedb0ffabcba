// src/db/defect_store.rs

use async_trait::async_trait;
use uuid::Uuid;

use crate::{common::error::AppError, models::defect::Defect};

/// Armazenamento de defeitos. Duas implementações: banco remoto e arquivo local.
#[async_trait]
pub trait DefectStore: Send + Sync {
    /// Sondagem somente-leitura de disponibilidade.
    async fn ping(&self) -> Result<(), AppError>;

    async fn insert(&self, defect: &Defect) -> Result<Defect, AppError>;

    async fn find(&self, id: Uuid) -> Result<Option<Defect>, AppError>;

    async fn list_by_apartment(&self, apartment_id: &str) -> Result<Vec<Defect>, AppError>;

    async fn list_all(&self) -> Result<Vec<Defect>, AppError>;

    /// Regrava o registro inteiro. `DefectNotFound` se o id não existir.
    async fn save(&self, defect: &Defect) -> Result<Defect, AppError>;

    /// `true` se havia algo para apagar.
    async fn delete(&self, id: Uuid) -> Result<bool, AppError>;
}
