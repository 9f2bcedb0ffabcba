// src/services/task_service.rs

use std::sync::Arc;

use tokio::sync::RwLock;

use crate::{
    common::error::AppError,
    db::TaskRepository,
    models::task::{ColumnMapping, Task},
};

/// Tarefas sobre uma tabela de formato variável. O mapeamento de colunas
/// é resolvido na inicialização e só muda num `refresh_mapping` explícito.
#[derive(Clone)]
pub struct TaskService {
    repo: TaskRepository,
    mapping: Arc<RwLock<ColumnMapping>>,
}

impl TaskService {
    pub fn new(repo: TaskRepository, mapping: ColumnMapping) -> Self {
        Self { repo, mapping: Arc::new(RwLock::new(mapping)) }
    }

    /// Sondagem com degradação: falha vira o mapeamento padrão.
    pub async fn detect_or_default(repo: &TaskRepository) -> ColumnMapping {
        match repo.detect_mapping().await {
            Ok(mapping) => {
                tracing::info!("🧭 Colunas de tasks detectadas: {:?}", mapping);
                mapping
            }
            Err(e) => {
                tracing::warn!("⚠️ Falha ao detectar colunas de tasks ({}); usando o padrão", e);
                ColumnMapping::default()
            }
        }
    }

    pub async fn mapping(&self) -> ColumnMapping {
        self.mapping.read().await.clone()
    }

    pub async fn refresh_mapping(&self) -> ColumnMapping {
        let detected = Self::detect_or_default(&self.repo).await;
        *self.mapping.write().await = detected.clone();
        detected
    }

    pub async fn get_all_tasks(&self, project_id: Option<&str>) -> Result<Vec<Task>, AppError> {
        let mapping = self.mapping().await;
        self.repo.get_all(&mapping, project_id).await
    }

    pub async fn update_task_progress(&self, id: &str, progress: i32) -> Result<Task, AppError> {
        let mapping = self.mapping().await;
        self.repo.update_progress(&mapping, id, progress).await
    }

    /// Média simples do progresso (0 sem tarefas).
    pub async fn average_progress(&self) -> Result<f64, AppError> {
        let tasks = self.get_all_tasks(None).await?;
        Ok(average_progress(&tasks))
    }
}

pub fn average_progress(tasks: &[Task]) -> f64 {
    if tasks.is_empty() {
        return 0.0;
    }
    let total: i64 = tasks.iter().map(|t| i64::from(t.progress)).sum();
    total as f64 / tasks.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::task::TaskStatus;
    use sqlx::postgres::PgPoolOptions;
    use std::time::Duration;

    fn task(progress: i32) -> Task {
        Task {
            id: progress.to_string(),
            project_id: None,
            title: format!("Etapa {progress}"),
            description: None,
            status: TaskStatus::Pending,
            assignee: None,
            start_date: None,
            end_date: None,
            progress,
            order_index: 0,
        }
    }

    #[test]
    fn average_of_no_tasks_is_zero() {
        assert_eq!(average_progress(&[]), 0.0);
    }

    #[test]
    fn average_progress_is_the_mean() {
        assert_eq!(average_progress(&[task(20), task(50), task(80)]), 50.0);
    }

    #[tokio::test]
    async fn unreachable_table_degrades_to_default_mapping() {
        // Porta fechada: a sondagem falha rápido
        let pool = PgPoolOptions::new()
            .acquire_timeout(Duration::from_millis(300))
            .connect_lazy("postgres://canteiro:x@127.0.0.1:1/canteiro")
            .unwrap();
        let repo = TaskRepository::new(pool);

        let mapping = TaskService::detect_or_default(&repo).await;
        assert_eq!(mapping, ColumnMapping::default());

        let service = TaskService::new(repo, ColumnMapping::from_columns(&["id", "name"]));
        assert_eq!(service.mapping().await.title, Some("name"));
        assert_eq!(service.refresh_mapping().await, ColumnMapping::default());
        assert_eq!(service.mapping().await, ColumnMapping::default());
    }
}
