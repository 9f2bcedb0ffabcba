// src/services/auth.rs

use bcrypt::{hash, verify};
use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::UserRepository,
    models::{
        auth::{Claims, RegisterUserPayload, User},
        rbac::UserRole,
    },
};

#[derive(Clone)]
pub struct AuthService {
    user_repo: UserRepository,
    jwt_secret: String,
}

impl AuthService {
    pub fn new(user_repo: UserRepository, jwt_secret: String) -> Self {
        Self { user_repo, jwt_secret }
    }

    pub async fn register_user(&self, payload: &RegisterUserPayload) -> Result<String, AppError> {
        // Hashing em thread separada (bcrypt é caro)
        let password_clone = payload.password.clone();
        let hashed_password = tokio::task::spawn_blocking(move || {
            hash(&password_clone, bcrypt::DEFAULT_COST)
        })
        .await
        .map_err(|e| anyhow::anyhow!("Falha na task de hashing: {}", e))??;

        let new_user = self
            .user_repo
            .create_user(
                &payload.email,
                &hashed_password,
                payload.full_name.as_deref(),
                payload.role,
            )
            .await?;

        tracing::info!("👷 Usuário {} registrado como {:?}", new_user.email, new_user.role);
        self.create_token(new_user.id, new_user.role)
    }

    pub async fn login_user(&self, email: &str, password: &str) -> Result<String, AppError> {
        let user = self
            .user_repo
            .find_by_email(email)
            .await?
            .ok_or(AppError::InvalidCredentials)?;

        let password_clone = password.to_owned();
        let password_hash_clone = user.password_hash.clone();

        let is_password_valid = tokio::task::spawn_blocking(move || {
            verify(&password_clone, &password_hash_clone)
        })
        .await
        .map_err(|e| anyhow::anyhow!("Falha na task de verificação de senha: {}", e))??;

        if !is_password_valid {
            return Err(AppError::InvalidCredentials);
        }

        self.create_token(user.id, user.role)
    }

    /// Decodifica e valida o JWT. Não consulta o banco.
    pub fn validate_token(&self, token: &str) -> Result<Claims, AppError> {
        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.jwt_secret.as_ref()),
            &Validation::default(),
        )
        .map_err(|_| AppError::InvalidToken)?;

        Ok(token_data.claims)
    }

    pub async fn current_user(&self, claims: &Claims) -> Result<User, AppError> {
        self.user_repo
            .find_by_id(claims.sub)
            .await?
            .ok_or(AppError::UserNotFound)
    }

    pub fn create_token(&self, user_id: Uuid, role: UserRole) -> Result<String, AppError> {
        let now = Utc::now();
        let expires_at = now + chrono::Duration::days(7);

        let claims = Claims {
            sub: user_id,
            role,
            exp: expires_at.timestamp() as usize,
            iat: now.timestamp() as usize,
        };

        Ok(encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.jwt_secret.as_ref()),
        )?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::postgres::PgPoolOptions;

    fn service(secret: &str) -> AuthService {
        let pool = PgPoolOptions::new()
            .connect_lazy("postgres://localhost/canteiro_test")
            .unwrap();
        AuthService::new(UserRepository::new(pool), secret.to_string())
    }

    #[tokio::test]
    async fn token_round_trips_subject_and_role() {
        let auth = service("segredo");
        let user_id = Uuid::new_v4();
        let token = auth.create_token(user_id, UserRole::Technadzor).unwrap();

        let claims = auth.validate_token(&token).unwrap();
        assert_eq!(claims.sub, user_id);
        assert_eq!(claims.role, UserRole::Technadzor);
        assert!(claims.exp > claims.iat);
    }

    #[tokio::test]
    async fn token_signed_with_other_secret_is_rejected() {
        let token = service("um").create_token(Uuid::new_v4(), UserRole::Client).unwrap();
        let err = service("outro").validate_token(&token).unwrap_err();
        assert!(matches!(err, AppError::InvalidToken));
    }
}
