// src/services/auth.rs

use bcrypt::{hash, verify};
use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};

use crate::{
    common::error::AppError,
    models::auth::{AdminSession, AuthResponse, Claims},
};

// Um único administrador, configurado no ambiente. Não há tabela de contas:
// a senha é convertida em hash bcrypt na subida e só o hash fica em memória.
#[derive(Clone)]
pub struct AuthService {
    login: String,
    password_hash: String,
    jwt_secret: String,
    token_ttl: chrono::Duration,
}

impl AuthService {
    pub fn new(login: &str, password: &str, jwt_secret: String, ttl_hours: i64) -> Result<Self, AppError> {
        Self::with_cost(login, password, jwt_secret, ttl_hours, bcrypt::DEFAULT_COST)
    }

    pub(crate) fn with_cost(
        login: &str,
        password: &str,
        jwt_secret: String,
        ttl_hours: i64,
        cost: u32,
    ) -> Result<Self, AppError> {
        Ok(Self {
            login: login.to_string(),
            password_hash: hash(password, cost)?,
            jwt_secret,
            token_ttl: chrono::Duration::hours(ttl_hours),
        })
    }

    pub async fn login(&self, login: &str, password: &str) -> Result<AuthResponse, AppError> {
        // O bcrypt roda mesmo com login errado: o tempo de resposta não revela o login
        let login_matches = login == self.login;

        let password_clone = password.to_owned();
        let password_hash_clone = self.password_hash.clone();

        // Executa a verificação em um thread separado
        let is_password_valid = tokio::task::spawn_blocking(move || {
            verify(&password_clone, &password_hash_clone)
        })
        .await
        .map_err(|e| anyhow::anyhow!("Falha na task de verificação de senha: {}", e))??;

        if !(login_matches && is_password_valid) {
            tracing::warn!("🔒 Tentativa de login recusada para '{}'", login);
            return Err(AppError::InvalidCredentials);
        }

        tracing::info!("🔑 Administrador '{}' autenticado", login);
        self.create_token()
    }

    pub fn validate_token(&self, token: &str) -> Result<AdminSession, AppError> {
        let validation = Validation::default();
        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.jwt_secret.as_ref()),
            &validation,
        )
        .map_err(|_| AppError::InvalidToken)?;

        // Token de outro login (credenciais trocadas depois da emissão)
        if token_data.claims.sub != self.login {
            return Err(AppError::InvalidToken);
        }

        Ok(AdminSession {
            login: token_data.claims.sub,
            issued_at: token_data.claims.iat as i64,
            expires_at: token_data.claims.exp as i64,
        })
    }

    fn create_token(&self) -> Result<AuthResponse, AppError> {
        let now = Utc::now();
        let expires_at = now + self.token_ttl;

        let claims = Claims {
            sub: self.login.clone(),
            exp: expires_at.timestamp() as usize,
            iat: now.timestamp() as usize,
        };

        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.jwt_secret.as_ref()),
        )?;

        Ok(AuthResponse {
            token,
            expires_at: expires_at.timestamp(),
        })
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    pub const LOGIN: &str = "admin";
    pub const PASSWORD: &str = "s3cret";

    // custo mínimo do bcrypt para os testes não ficarem lentos
    pub fn auth_service() -> AuthService {
        AuthService::with_cost(LOGIN, PASSWORD, "test-secret".into(), 12, 4).unwrap()
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;

    #[tokio::test]
    async fn login_issues_a_token_that_validates() {
        let auth = auth_service();
        let response = auth.login(LOGIN, PASSWORD).await.unwrap();
        let session = auth.validate_token(&response.token).unwrap();
        assert_eq!(session.login, LOGIN);
        assert_eq!(session.expires_at, response.expires_at);
        assert!(session.expires_at > session.issued_at);
    }

    #[tokio::test]
    async fn wrong_credentials_are_rejected() {
        let auth = auth_service();
        assert!(matches!(auth.login(LOGIN, "nope").await, Err(AppError::InvalidCredentials)));
        assert!(matches!(auth.login("root", PASSWORD).await, Err(AppError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn unknown_login_still_runs_the_hash_check() {
        // hash corrompido: se o bcrypt rodar, o erro é dele, não InvalidCredentials
        let mut auth = auth_service();
        auth.password_hash = "not-a-bcrypt-hash".into();
        assert!(matches!(auth.login("root", PASSWORD).await, Err(AppError::BcryptError(_))));
    }

    #[test]
    fn tokens_from_another_secret_are_invalid() {
        let auth = auth_service();
        let other = AuthService::with_cost(LOGIN, PASSWORD, "other".into(), 12, 4).unwrap();
        let token = other.create_token().unwrap().token;
        assert!(matches!(auth.validate_token(&token), Err(AppError::InvalidToken)));
        assert!(matches!(auth.validate_token("garbage"), Err(AppError::InvalidToken)));
    }
}
