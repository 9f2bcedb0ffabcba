// src/services/storage.rs

use std::{future::Future, time::Duration};

use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};

use crate::{common::error::AppError, config::StorageConfig};

pub const PLANS_BUCKET: &str = "architectural-plans";
pub const DEFECT_PHOTOS_BUCKET: &str = "defect-photos";

/// Cliente da API REST de storage (buckets de plantas e fotos).
/// Sem configuração, toda operação responde `StorageNotConfigured`.
#[derive(Clone)]
pub struct StorageClient {
    http: reqwest::Client,
    config: Option<StorageConfig>,
}

impl StorageClient {
    pub fn new(config: Option<StorageConfig>) -> Result<Self, AppError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(60))
            .build()?;
        Ok(Self { http, config })
    }

    pub fn is_configured(&self) -> bool {
        self.config.is_some()
    }

    fn config(&self) -> Result<&StorageConfig, AppError> {
        self.config.as_ref().ok_or(AppError::StorageNotConfigured)
    }

    fn base_url(config: &StorageConfig) -> &str {
        config.url.trim_end_matches('/')
    }

    fn auth_headers(config: &StorageConfig) -> Result<HeaderMap, AppError> {
        let mut headers = HeaderMap::new();
        let bearer = HeaderValue::from_str(&format!("Bearer {}", config.service_key))
            .map_err(|e| AppError::StorageError(format!("chave inválida: {e}")))?;
        let apikey = HeaderValue::from_str(&config.service_key)
            .map_err(|e| AppError::StorageError(format!("chave inválida: {e}")))?;
        headers.insert(AUTHORIZATION, bearer);
        headers.insert("apikey", apikey);
        Ok(headers)
    }

    pub fn public_url(&self, bucket: &str, path: &str) -> Result<String, AppError> {
        let config = self.config()?;
        Ok(format!(
            "{}/storage/v1/object/public/{}/{}",
            Self::base_url(config),
            bucket,
            path.trim_start_matches('/')
        ))
    }

    /// Envia (ou sobrescreve) o objeto e devolve a URL pública.
    pub async fn upload(
        &self,
        bucket: &str,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<String, AppError> {
        let config = self.config()?;
        let url = format!(
            "{}/storage/v1/object/{}/{}",
            Self::base_url(config),
            bucket,
            path.trim_start_matches('/')
        );

        let mut headers = Self::auth_headers(config)?;
        let mime = HeaderValue::from_str(content_type)
            .unwrap_or_else(|_| HeaderValue::from_static("application/octet-stream"));
        headers.insert(CONTENT_TYPE, mime);
        headers.insert("x-upsert", HeaderValue::from_static("true"));

        let resp = self.http.post(&url).headers(headers).body(bytes).send().await?;
        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(AppError::StorageError(format!("upload {status}: {body}")));
        }

        tracing::info!("📦 Objeto enviado para {}/{}", bucket, path);
        self.public_url(bucket, path)
    }

    /// Envia o objeto e grava o registro com a URL pública.
    /// Se a gravação falhar, o objeto é removido do bucket.
    pub async fn upload_and_persist<T, F, Fut>(
        &self,
        bucket: &str,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
        persist: F,
    ) -> Result<T, AppError>
    where
        F: FnOnce(String) -> Fut,
        Fut: Future<Output = Result<T, AppError>>,
    {
        let url = self.upload(bucket, path, bytes, content_type).await?;
        match persist(url).await {
            Ok(value) => Ok(value),
            Err(e) => {
                if let Err(cleanup) = self.delete(bucket, path).await {
                    tracing::warn!("⚠️ Objeto órfão em {}/{}: {}", bucket, path, cleanup);
                }
                Err(e)
            }
        }
    }

    pub async fn delete(&self, bucket: &str, path: &str) -> Result<(), AppError> {
        let config = self.config()?;
        let url = format!(
            "{}/storage/v1/object/{}/{}",
            Self::base_url(config),
            bucket,
            path.trim_start_matches('/')
        );

        let resp = self
            .http
            .delete(&url)
            .headers(Self::auth_headers(config)?)
            .send()
            .await?;

        // Objeto já inexistente não impede a remoção do registro
        if !resp.status().is_success() && resp.status() != reqwest::StatusCode::NOT_FOUND {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(AppError::StorageError(format!("delete {status}: {body}")));
        }
        Ok(())
    }
}

// Servidor de storage em memória para os testes: registra "MÉTODO bucket/caminho"
#[cfg(test)]
pub(crate) mod mock {
    use std::sync::{Arc, Mutex};

    use axum::{
        extract::{Path, State},
        http::{Method, StatusCode},
        routing::any,
        Router,
    };
    use tokio::net::TcpListener;

    use crate::config::StorageConfig;

    pub type Calls = Arc<Mutex<Vec<String>>>;

    async fn record(State(calls): State<Calls>, method: Method, Path(path): Path<String>) -> StatusCode {
        calls.lock().unwrap().push(format!("{method} {path}"));
        StatusCode::OK
    }

    pub async fn spawn() -> (StorageConfig, Calls) {
        let calls = Calls::default();
        let app = Router::new()
            .route("/storage/v1/object/{*path}", any(record))
            .with_state(calls.clone());
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move { axum::serve(listener, app).await });

        let config = StorageConfig { url: format!("http://{addr}"), service_key: "test-key".into() };
        (config, calls)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn configured() -> StorageClient {
        StorageClient::new(Some(StorageConfig {
            url: "https://demo.supabase.co/".into(),
            service_key: "service-key".into(),
        }))
        .unwrap()
    }

    #[test]
    fn public_url_points_at_public_bucket_path() {
        let url = configured().public_url(PLANS_BUCKET, "/p1/floor.pdf").unwrap();
        assert_eq!(
            url,
            "https://demo.supabase.co/storage/v1/object/public/architectural-plans/p1/floor.pdf"
        );
    }

    #[tokio::test]
    async fn unconfigured_client_refuses_uploads() {
        let client = StorageClient::new(None).unwrap();
        assert!(!client.is_configured());
        let err = client
            .upload(DEFECT_PHOTOS_BUCKET, "a.jpg", vec![1, 2], "image/jpeg")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::StorageNotConfigured));
    }

    #[tokio::test]
    async fn failed_persist_removes_the_uploaded_object() {
        let (config, calls) = mock::spawn().await;
        let client = StorageClient::new(Some(config)).unwrap();

        let result: Result<(), AppError> = client
            .upload_and_persist(PLANS_BUCKET, "p1/floor.pdf", vec![1, 2, 3], "application/pdf", |_url| async {
                Err(AppError::RemoteUnavailable)
            })
            .await;

        assert!(matches!(result, Err(AppError::RemoteUnavailable)));
        assert_eq!(
            *calls.lock().unwrap(),
            vec!["POST architectural-plans/p1/floor.pdf", "DELETE architectural-plans/p1/floor.pdf"]
        );
    }

    #[tokio::test]
    async fn successful_persist_keeps_the_object() {
        let (config, calls) = mock::spawn().await;
        let client = StorageClient::new(Some(config)).unwrap();

        let url = client
            .upload_and_persist(PLANS_BUCKET, "p1/floor.pdf", vec![1], "application/pdf", |url| async move {
                Ok(url)
            })
            .await
            .unwrap();

        assert!(url.ends_with("/storage/v1/object/public/architectural-plans/p1/floor.pdf"));
        assert_eq!(*calls.lock().unwrap(), vec!["POST architectural-plans/p1/floor.pdf"]);
    }
}
