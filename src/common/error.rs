// src/common/error.rs

use std::collections::HashMap;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use rust_decimal::Decimal;
use serde_json::json;
use thiserror::Error;
use uuid::Uuid;

use crate::common::i18n::I18nStore;
use crate::middleware::i18n::Locale;

// Nosso tipo de erro de domínio. Nada é engolido: toda falha vira uma variante.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erro de validação")]
    ValidationError(#[from] validator::ValidationErrors),

    #[error("Payload inválido: {0}")]
    InvalidPayload(String),

    #[error("E-mail já existe")]
    EmailAlreadyExists,

    #[error("Credenciais inválidas")]
    InvalidCredentials,

    #[error("Token inválido")]
    InvalidToken,

    #[error("Usuário não encontrado")]
    UserNotFound,

    #[error("Permissão '{0}' necessária")]
    Forbidden(&'static str),

    #[error("Defeito não encontrado: {0}")]
    DefectNotFound(Uuid),

    #[error("Item de orçamento não encontrado: {0}")]
    BudgetItemNotFound(Uuid),

    #[error("Obra não encontrada: {0}")]
    ProjectNotFound(Uuid),

    #[error("Planta não encontrada: {0}")]
    PlanNotFound(Uuid),

    #[error("Material não encontrado: {0}")]
    MaterialNotFound(Uuid),

    #[error("Tarefa não encontrada: {0}")]
    TaskNotFound(String),

    #[error("Estoque insuficiente: disponível {available}, solicitado {requested}")]
    InsufficientStock { available: Decimal, requested: Decimal },

    #[error("A tabela tasks não possui coluna para '{0}'")]
    ColumnUnavailable(&'static str),

    #[error("Banco remoto indisponível")]
    RemoteUnavailable,

    #[error("Storage não configurado")]
    StorageNotConfigured,

    #[error("Erro no storage: {0}")]
    StorageError(String),

    #[error("Fonte não encontrada: {0}")]
    FontNotFound(String),

    // Variante para erros de banco de dados
    #[error("Erro de banco de dados: {0}")]
    DatabaseError(#[from] sqlx::Error),

    // Arquivos locais (defects_data.json, outbox)
    #[error("Erro de E/S: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Erro de serialização: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Erro HTTP: {0}")]
    HttpError(#[from] reqwest::Error),

    // Variante genérica para qualquer outro erro inesperado
    #[error("Erro interno do servidor: {0}")]
    InternalServerError(#[from] anyhow::Error),

    #[error("Erro de Bcrypt: {0}")]
    BcryptError(#[from] bcrypt::BcryptError),

    #[error("Erro de JWT: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),
}

// O erro que efetivamente sai pela API (já traduzido)
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub error: String,
    pub details: Option<serde_json::Value>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = match self.details {
            Some(details) => json!({ "error": self.error, "details": details }),
            None => json!({ "error": self.error }),
        };
        (self.status, Json(body)).into_response()
    }
}

impl AppError {
    /// Status HTTP e chave de mensagem no catálogo de traduções.
    pub fn status_and_key(&self) -> (StatusCode, &'static str) {
        match self {
            AppError::ValidationError(_) => (StatusCode::BAD_REQUEST, "error.validation"),
            AppError::InvalidPayload(_) => (StatusCode::BAD_REQUEST, "error.invalid_payload"),
            AppError::EmailAlreadyExists => (StatusCode::CONFLICT, "error.email_exists"),
            AppError::InvalidCredentials => (StatusCode::UNAUTHORIZED, "error.invalid_credentials"),
            AppError::InvalidToken | AppError::JwtError(_) => {
                (StatusCode::UNAUTHORIZED, "error.invalid_token")
            }
            AppError::UserNotFound => (StatusCode::NOT_FOUND, "error.user_not_found"),
            AppError::Forbidden(_) => (StatusCode::FORBIDDEN, "error.forbidden"),
            AppError::DefectNotFound(_) => (StatusCode::NOT_FOUND, "error.defect_not_found"),
            AppError::BudgetItemNotFound(_) => (StatusCode::NOT_FOUND, "error.budget_item_not_found"),
            AppError::ProjectNotFound(_) => (StatusCode::NOT_FOUND, "error.project_not_found"),
            AppError::PlanNotFound(_) => (StatusCode::NOT_FOUND, "error.plan_not_found"),
            AppError::MaterialNotFound(_) => (StatusCode::NOT_FOUND, "error.material_not_found"),
            AppError::TaskNotFound(_) => (StatusCode::NOT_FOUND, "error.task_not_found"),
            AppError::InsufficientStock { .. } => (StatusCode::CONFLICT, "error.insufficient_stock"),
            AppError::ColumnUnavailable(_) => (StatusCode::CONFLICT, "error.column_unavailable"),
            AppError::RemoteUnavailable => (StatusCode::SERVICE_UNAVAILABLE, "error.remote_unavailable"),
            AppError::StorageNotConfigured => {
                (StatusCode::SERVICE_UNAVAILABLE, "error.storage_not_configured")
            }
            AppError::StorageError(_) | AppError::HttpError(_) => {
                (StatusCode::BAD_GATEWAY, "error.storage")
            }
            AppError::FontNotFound(_) => (StatusCode::INTERNAL_SERVER_ERROR, "error.font_not_found"),
            // Banco fora do ar é transitório: mesmo tratamento do remoto indisponível
            AppError::DatabaseError(sqlx::Error::PoolTimedOut | sqlx::Error::Io(_)) => {
                (StatusCode::SERVICE_UNAVAILABLE, "error.remote_unavailable")
            }
            AppError::DatabaseError(_)
            | AppError::IoError(_)
            | AppError::SerializationError(_)
            | AppError::InternalServerError(_)
            | AppError::BcryptError(_) => (StatusCode::INTERNAL_SERVER_ERROR, "error.internal"),
        }
    }

    /// Converte o erro de domínio na resposta da API, no idioma do cliente.
    pub fn to_api_error(&self, locale: &Locale, store: &I18nStore) -> ApiError {
        let (status, key) = self.status_and_key();
        let lang = locale.0.as_str();

        if status.is_server_error() {
            tracing::error!("Erro Interno do Servidor: {}", self);
        }

        let message = match self {
            AppError::InvalidPayload(detail) => store.translate_with(lang, key, &[("detail", detail.as_str())]),
            AppError::Forbidden(permission) => {
                store.translate_with(lang, key, &[("permission", *permission)])
            }
            AppError::InsufficientStock { available, requested } => store.translate_with(
                lang,
                key,
                &[
                    ("available", available.to_string().as_str()),
                    ("requested", requested.to_string().as_str()),
                ],
            ),
            AppError::ColumnUnavailable(field) => store.translate_with(lang, key, &[("field", *field)]),
            _ => store.translate(lang, key),
        };

        // Retorna todos os detalhes da validação, campo a campo.
        let details = match self {
            AppError::ValidationError(errors) => {
                let mut details: HashMap<String, Vec<String>> = HashMap::new();
                for (field, field_errors) in errors.field_errors() {
                    let messages = field_errors
                        .iter()
                        .map(|e| match &e.message {
                            Some(m) => store.translate(lang, m),
                            None => e.code.to_string(),
                        })
                        .collect();
                    details.insert(wire_field_name(&field), messages);
                }
                Some(json!(details))
            }
            _ => None,
        };

        ApiError { status, error: message, details }
    }
}

// Os payloads usam camelCase no JSON; os detalhes seguem o mesmo nome
fn wire_field_name(field: &str) -> String {
    let mut out = String::with_capacity(field.len());
    let mut upper = false;
    for c in field.chars() {
        if c == '_' {
            upper = !out.is_empty();
        } else if upper {
            out.extend(c.to_uppercase());
            upper = false;
        } else {
            out.push(c);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::{ValidationError, ValidationErrors};

    fn store() -> I18nStore {
        I18nStore::load().unwrap()
    }

    #[test]
    fn not_found_is_translated() {
        let err = AppError::DefectNotFound(Uuid::new_v4());
        let api = err.to_api_error(&Locale("pt".into()), &store());
        assert_eq!(api.status, StatusCode::NOT_FOUND);
        assert_eq!(api.error, "Defeito não encontrado.");
        assert!(api.details.is_none());
    }

    #[test]
    fn forbidden_carries_permission_slug() {
        let err = AppError::Forbidden("budget:write");
        let api = err.to_api_error(&Locale("en".into()), &store());
        assert_eq!(api.status, StatusCode::FORBIDDEN);
        assert!(api.error.contains("budget:write"));
    }

    #[test]
    fn validation_errors_list_field_messages() {
        let mut errors = ValidationErrors::new();
        let mut err = ValidationError::new("range");
        err.message = Some("validation.coordinate_range".into());
        errors.add("x_coord", err);

        let api = AppError::ValidationError(errors).to_api_error(&Locale("en".into()), &store());
        assert_eq!(api.status, StatusCode::BAD_REQUEST);
        let details = api.details.unwrap();
        assert_eq!(details["xCoord"][0], "Coordinates must be between 0 and 100.");
    }

    #[test]
    fn database_errors_hide_details() {
        let err = AppError::DatabaseError(sqlx::Error::RowNotFound);
        let api = err.to_api_error(&Locale("en".into()), &store());
        assert_eq!(api.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(api.error, "An unexpected error occurred.");
    }

    #[test]
    fn unreachable_database_is_service_unavailable() {
        let timed_out = AppError::DatabaseError(sqlx::Error::PoolTimedOut);
        assert_eq!(timed_out.status_and_key(), (StatusCode::SERVICE_UNAVAILABLE, "error.remote_unavailable"));

        let refused = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "refused");
        let api = AppError::DatabaseError(sqlx::Error::Io(refused))
            .to_api_error(&Locale("en".into()), &store());
        assert_eq!(api.status, StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn field_names_follow_the_json_casing() {
        assert_eq!(wire_field_name("x_coord"), "xCoord");
        assert_eq!(wire_field_name("counted_quantity"), "countedQuantity");
        assert_eq!(wire_field_name("progress"), "progress");
    }
}
