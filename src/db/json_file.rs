// src/db/json_file.rs
//
// Arquivos JSON lidos e gravados por inteiro (sem atualização parcial).

use std::path::Path;

use serde::{de::DeserializeOwned, Serialize};
use tokio::fs;
use tokio::io::AsyncWriteExt;

use crate::common::error::AppError;

/// Lê um array JSON. Arquivo inexistente ou vazio equivale a lista vazia.
pub async fn read_array<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>, AppError> {
    let raw = match fs::read(path).await {
        Ok(raw) => raw,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e.into()),
    };

    if raw.iter().all(u8::is_ascii_whitespace) {
        return Ok(Vec::new());
    }

    Ok(serde_json::from_slice(&raw)?)
}

/// Grava em arquivo temporário e renomeia, para nunca deixar um JSON pela metade.
pub async fn write_array<T: Serialize>(path: &Path, items: &[T]) -> Result<(), AppError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).await?;
    }

    let data = serde_json::to_vec_pretty(items)?;
    let temp_path = path.with_extension("tmp");

    let mut file = fs::File::create(&temp_path).await?;
    file.write_all(&data).await?;
    file.sync_all().await?;

    fs::rename(&temp_path, path).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn missing_file_reads_as_empty() {
        let temp = TempDir::new().unwrap();
        let items: Vec<u32> = read_array(&temp.path().join("nada.json")).await.unwrap();
        assert!(items.is_empty());
    }

    #[tokio::test]
    async fn write_then_read_and_no_temp_left() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("sub").join("dados.json");

        write_array(&path, &[1u32, 2, 3]).await.unwrap();
        let items: Vec<u32> = read_array(&path).await.unwrap();

        assert_eq!(items, vec![1, 2, 3]);
        assert!(!path.with_extension("tmp").exists());
    }

    #[tokio::test]
    async fn corrupt_file_is_an_error() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("quebrado.json");
        tokio::fs::write(&path, b"[{").await.unwrap();

        let result: Result<Vec<u32>, _> = read_array(&path).await;
        assert!(matches!(result, Err(AppError::SerializationError(_))));
    }
}
