// src/services/project_service.rs

use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::ProjectRepository,
    models::project::{
        Apartment, ApartmentFilter, ArchitecturalPlan, CreateApartmentPayload,
        CreateProjectPayload, PlanFilter, Project,
    },
    services::storage::{StorageClient, PLANS_BUCKET},
};

/// Arquivo de planta já lido do multipart.
#[derive(Debug)]
pub struct PlanUpload {
    pub project_id: Uuid,
    pub apartment_id: Option<Uuid>,
    pub name: String,
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

#[derive(Clone)]
pub struct ProjectService {
    repo: ProjectRepository,
    storage: StorageClient,
}

impl ProjectService {
    pub fn new(repo: ProjectRepository, storage: StorageClient) -> Self {
        Self { repo, storage }
    }

    pub async fn list_projects(&self) -> Result<Vec<Project>, AppError> {
        self.repo.list_projects().await
    }

    pub async fn get_project(&self, id: Uuid) -> Result<Project, AppError> {
        self.repo.find_project(id).await?.ok_or(AppError::ProjectNotFound(id))
    }

    pub async fn create_project(&self, input: &CreateProjectPayload) -> Result<Project, AppError> {
        let project = self.repo.create_project(input).await?;
        tracing::info!("🏗️ Obra '{}' criada ({})", project.name, project.id);
        Ok(project)
    }

    pub async fn list_apartments(&self, filter: &ApartmentFilter) -> Result<Vec<Apartment>, AppError> {
        self.repo.list_apartments(filter).await
    }

    pub async fn create_apartment(&self, input: &CreateApartmentPayload) -> Result<Apartment, AppError> {
        self.get_project(input.project_id).await?;
        self.repo.create_apartment(input).await
    }

    pub async fn list_plans(&self, filter: &PlanFilter) -> Result<Vec<ArchitecturalPlan>, AppError> {
        self.repo.list_plans(filter).await
    }

    /// Envia o arquivo ao bucket de plantas e registra a URL pública.
    pub async fn upload_plan(&self, upload: PlanUpload) -> Result<ArchitecturalPlan, AppError> {
        if upload.bytes.is_empty() {
            return Err(AppError::InvalidPayload("arquivo vazio".into()));
        }
        self.get_project(upload.project_id).await?;

        let storage_path = format!(
            "{}/{}-{}",
            upload.project_id,
            Uuid::new_v4(),
            sanitize_file_name(&upload.file_name)
        );
        let content_type = upload
            .content_type
            .clone()
            .unwrap_or_else(|| "application/octet-stream".to_string());

        let repo = &self.repo;
        let path = storage_path.as_str();
        let mime = content_type.as_str();
        let (project_id, apartment_id, name) = (upload.project_id, upload.apartment_id, upload.name);

        self.storage
            .upload_and_persist(PLANS_BUCKET, path, upload.bytes, mime, |file_url| async move {
                repo.create_plan(project_id, apartment_id, &name, &file_url, path, Some(mime))
                    .await
            })
            .await
    }

    /// Remove o objeto do bucket e depois o registro.
    pub async fn delete_plan(&self, id: Uuid) -> Result<(), AppError> {
        let plan = self.repo.find_plan(id).await?.ok_or(AppError::PlanNotFound(id))?;
        self.storage.delete(PLANS_BUCKET, &plan.storage_path).await?;
        self.repo.delete_plan(id).await
    }
}

// Mantém só caracteres seguros para a chave do objeto
fn sanitize_file_name(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') { c } else { '_' })
        .collect();
    let trimmed = cleaned.trim_matches('.');
    if trimmed.is_empty() {
        "plan".to_string()
    } else {
        trimmed.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_names_are_made_safe_for_object_keys() {
        assert_eq!(sanitize_file_name("Planta 2º andar.pdf"), "Planta_2__andar.pdf");
        assert_eq!(sanitize_file_name("../../etc/passwd"), "_.._etc_passwd");
        assert_eq!(sanitize_file_name(""), "plan");
    }
}
