// src/db/defect_outbox.rs

use std::path::PathBuf;

use tokio::sync::Mutex;

use crate::{common::error::AppError, db::json_file, models::defect::PendingOperation};

pub const OUTBOX_FILE: &str = "defects_outbox.json";

/// Fila ordenada das operações feitas em modo local, à espera de sincronização.
pub struct DefectOutbox {
    path: PathBuf,
    lock: Mutex<()>,
}

impl DefectOutbox {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            path: data_dir.into().join(OUTBOX_FILE),
            lock: Mutex::new(()),
        }
    }

    pub async fn push(&self, op: PendingOperation) -> Result<(), AppError> {
        let _guard = self.lock.lock().await;
        let mut ops: Vec<PendingOperation> = json_file::read_array(&self.path).await?;
        ops.push(op);
        json_file::write_array(&self.path, &ops).await
    }

    pub async fn pending(&self) -> Result<Vec<PendingOperation>, AppError> {
        json_file::read_array(&self.path).await
    }

    pub async fn len(&self) -> Result<usize, AppError> {
        Ok(self.pending().await?.len())
    }

    /// Remove as `count` primeiras operações (as que já foram resolvidas).
    pub async fn remove_first(&self, count: usize) -> Result<(), AppError> {
        if count == 0 {
            return Ok(());
        }
        let _guard = self.lock.lock().await;
        let mut ops: Vec<PendingOperation> = json_file::read_array(&self.path).await?;
        ops.drain(..count.min(ops.len()));
        json_file::write_array(&self.path, &ops).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use tempfile::TempDir;
    use uuid::Uuid;

    fn delete_op() -> PendingOperation {
        PendingOperation::Delete { id: Uuid::new_v4(), deleted_at: Utc::now() }
    }

    #[tokio::test]
    async fn keeps_order_and_removes_from_front() {
        let temp = TempDir::new().unwrap();
        let outbox = DefectOutbox::new(temp.path());
        let ops = [delete_op(), delete_op(), delete_op()];
        for op in &ops {
            outbox.push(op.clone()).await.unwrap();
        }

        assert_eq!(outbox.len().await.unwrap(), 3);
        outbox.remove_first(2).await.unwrap();

        let left = outbox.pending().await.unwrap();
        assert_eq!(left, vec![ops[2].clone()]);
    }

    #[tokio::test]
    async fn removing_more_than_queued_empties_the_queue() {
        let temp = TempDir::new().unwrap();
        let outbox = DefectOutbox::new(temp.path());
        outbox.push(delete_op()).await.unwrap();
        outbox.remove_first(5).await.unwrap();
        assert_eq!(outbox.len().await.unwrap(), 0);
    }
}
