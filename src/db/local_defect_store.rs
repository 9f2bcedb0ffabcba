// src/db/local_defect_store.rs

use std::path::PathBuf;

use async_trait::async_trait;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{json_file, DefectStore},
    models::defect::Defect,
};

pub const LOCAL_DEFECTS_FILE: &str = "defects_data.json";

/// Defeitos num único arquivo JSON (array), lido e regravado por inteiro a cada operação.
/// O mutex serializa o ciclo ler-modificar-gravar dentro do processo.
pub struct LocalDefectStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl LocalDefectStore {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            path: data_dir.into().join(LOCAL_DEFECTS_FILE),
            write_lock: Mutex::new(()),
        }
    }

    async fn load(&self) -> Result<Vec<Defect>, AppError> {
        json_file::read_array(&self.path).await
    }
}

#[async_trait]
impl DefectStore for LocalDefectStore {
    async fn ping(&self) -> Result<(), AppError> {
        self.load().await.map(|_| ())
    }

    async fn insert(&self, defect: &Defect) -> Result<Defect, AppError> {
        let _guard = self.write_lock.lock().await;
        let mut defects = self.load().await?;
        defects.retain(|d| d.id != defect.id);
        defects.push(defect.clone());
        json_file::write_array(&self.path, &defects).await?;
        Ok(defect.clone())
    }

    async fn find(&self, id: Uuid) -> Result<Option<Defect>, AppError> {
        Ok(self.load().await?.into_iter().find(|d| d.id == id))
    }

    async fn list_by_apartment(&self, apartment_id: &str) -> Result<Vec<Defect>, AppError> {
        let mut defects: Vec<Defect> = self
            .load()
            .await?
            .into_iter()
            .filter(|d| d.apartment_id == apartment_id)
            .collect();
        defects.sort_by_key(|d| d.created_at);
        Ok(defects)
    }

    async fn list_all(&self) -> Result<Vec<Defect>, AppError> {
        let mut defects = self.load().await?;
        defects.sort_by(|a, b| {
            a.apartment_id.cmp(&b.apartment_id).then(a.created_at.cmp(&b.created_at))
        });
        Ok(defects)
    }

    async fn save(&self, defect: &Defect) -> Result<Defect, AppError> {
        let _guard = self.write_lock.lock().await;
        let mut defects = self.load().await?;
        let slot = defects
            .iter_mut()
            .find(|d| d.id == defect.id)
            .ok_or(AppError::DefectNotFound(defect.id))?;
        *slot = defect.clone();
        json_file::write_array(&self.path, &defects).await?;
        Ok(defect.clone())
    }

    async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        let _guard = self.write_lock.lock().await;
        let mut defects = self.load().await?;
        let before = defects.len();
        defects.retain(|d| d.id != id);
        if defects.len() == before {
            return Ok(false);
        }
        json_file::write_array(&self.path, &defects).await?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::defect::DefectStatus;
    use chrono::{Duration, Utc};
    use tempfile::TempDir;

    fn defect(apartment: &str, title: &str) -> Defect {
        let now = Utc::now();
        Defect {
            id: Uuid::new_v4(),
            apartment_id: apartment.into(),
            title: title.into(),
            description: None,
            photo_url: None,
            status: DefectStatus::Active,
            detail_status: None,
            x_coord: 10.0,
            y_coord: 10.0,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn insert_and_list_by_apartment() {
        let temp = TempDir::new().unwrap();
        let store = LocalDefectStore::new(temp.path());

        let mut first = defect("101", "Trinca");
        first.created_at -= Duration::minutes(5);
        let second = defect("101", "Infiltração");
        store.insert(&second).await.unwrap();
        store.insert(&first).await.unwrap();
        store.insert(&defect("102", "Rodapé solto")).await.unwrap();

        let list = store.list_by_apartment("101").await.unwrap();
        assert_eq!(list.len(), 2);
        assert_eq!(list[0].title, "Trinca");
        assert_eq!(store.list_all().await.unwrap().len(), 3);
        assert!(temp.path().join(LOCAL_DEFECTS_FILE).exists());
    }

    #[tokio::test]
    async fn save_replaces_and_delete_removes() {
        let temp = TempDir::new().unwrap();
        let store = LocalDefectStore::new(temp.path());
        let mut d = store.insert(&defect("7", "Porta")).await.unwrap();

        d.status = DefectStatus::Fixed;
        store.save(&d).await.unwrap();
        assert_eq!(store.find(d.id).await.unwrap().unwrap().status, DefectStatus::Fixed);

        assert!(store.delete(d.id).await.unwrap());
        assert!(!store.delete(d.id).await.unwrap());
        assert!(store.find(d.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn save_unknown_is_not_found() {
        let temp = TempDir::new().unwrap();
        let store = LocalDefectStore::new(temp.path());
        let result = store.save(&defect("1", "x")).await;
        assert!(matches!(result, Err(AppError::DefectNotFound(_))));
    }

    #[tokio::test]
    async fn concurrent_inserts_are_not_lost() {
        let temp = TempDir::new().unwrap();
        let store = std::sync::Arc::new(LocalDefectStore::new(temp.path()));

        let mut handles = Vec::new();
        for i in 0..10 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                store.insert(&defect("200", &format!("defeito {}", i))).await.unwrap();
            }));
        }
        for h in handles {
            h.await.unwrap();
        }

        assert_eq!(store.list_by_apartment("200").await.unwrap().len(), 10);
    }
}
