// src/services/auth.rs

use bcrypt::{hash, verify};
use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::EmployeeRepository,
    models::{auth::Claims, employee::Employee},
};

#[derive(Clone)]
pub struct AuthService {
    employee_repo: EmployeeRepository,
    jwt_secret: String,
    token_ttl: chrono::Duration,
}

impl AuthService {
    pub fn new(employee_repo: EmployeeRepository, jwt_secret: String, token_ttl: chrono::Duration) -> Self {
        Self { employee_repo, jwt_secret, token_ttl }
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<String, AppError> {
        let employee = self
            .employee_repo
            .find_by_email(email)
            .await?
            .ok_or(AppError::InvalidCredentials)?;

        let is_password_valid = verify_password(password, &employee.password_hash).await?;
        if !is_password_valid {
            tracing::debug!(employee_id = %employee.id, "senha incorreta");
            return Err(AppError::InvalidCredentials);
        }

        tracing::info!(employee_id = %employee.id, company_id = %employee.company_id, "🔑 login efetuado");
        issue_token(&self.jwt_secret, employee.id, employee.company_id, self.token_ttl)
    }

    /// Valida o token e carrega o funcionário atual do banco.
    pub async fn validate_token(&self, token: &str) -> Result<Employee, AppError> {
        let claims = decode_token(&self.jwt_secret, token)?;

        let employee = self
            .employee_repo
            .find_by_id(claims.sub)
            .await?
            .ok_or(AppError::InvalidToken)?;

        // Funcionário trocado de empresa depois da emissão: o token já não vale
        if employee.company_id != claims.company {
            return Err(AppError::InvalidToken);
        }
        Ok(employee)
    }
}

/// Hash em thread separada: bcrypt é CPU-bound.
pub async fn hash_password(password: &str) -> Result<String, AppError> {
    let password_clone = password.to_owned();
    let hashed = tokio::task::spawn_blocking(move || hash(&password_clone, bcrypt::DEFAULT_COST))
        .await
        .map_err(|e| anyhow::anyhow!("Falha na task de hashing: {}", e))??;
    Ok(hashed)
}

pub async fn verify_password(password: &str, password_hash: &str) -> Result<bool, AppError> {
    let password_clone = password.to_owned();
    let password_hash_clone = password_hash.to_owned();

    // Executa a verificação em um thread separado
    let is_valid = tokio::task::spawn_blocking(move || verify(&password_clone, &password_hash_clone))
        .await
        .map_err(|e| anyhow::anyhow!("Falha na task de verificação de senha: {}", e))??;
    Ok(is_valid)
}

pub fn issue_token(
    secret: &str,
    employee_id: Uuid,
    company_id: Uuid,
    ttl: chrono::Duration,
) -> Result<String, AppError> {
    let now = Utc::now();
    let expires_at = now + ttl;

    let claims = Claims {
        sub: employee_id,
        company: company_id,
        exp: expires_at.timestamp() as usize,
        iat: now.timestamp() as usize,
    };

    Ok(encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_ref()),
    )?)
}

pub fn decode_token(secret: &str, token: &str) -> Result<Claims, AppError> {
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_ref()),
        &Validation::default(),
    )
    .map_err(|_| AppError::InvalidToken)?;
    Ok(token_data.claims)
}
