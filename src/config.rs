// src/config.rs

use std::{env, sync::Arc, time::Duration};

use anyhow::Context;
use sqlx::{postgres::PgPoolOptions, PgPool};

use crate::{
    db::{CompanyRepository, EmployeeRepository, GrantStore, ProductRepository, SharingRepository},
    services::{
        access_service::{AccessPolicy, AccessService},
        approval_service::ApprovalService,
        auth::AuthService,
        change_feed::{ChangePublisher, TracingPublisher},
        company_service::CompanyService,
        product_service::ProductService,
        sharing_service::SharingService,
    },
};

/// Configuração lida do ambiente (e do `.env`, se existir).
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub bind_addr: String,
    pub db_max_connections: u32,
    pub jwt_ttl_hours: i64,
    pub reject_unmatched_grants: bool,
    pub strict_constraint_operators: bool,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(get: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| get(key).with_context(|| format!("{key} deve ser definida"));

        let parse_or = |key: &str, default: &str| get(key).unwrap_or_else(|| default.to_string());

        let db_max_connections = parse_or("DB_MAX_CONNECTIONS", "5")
            .parse::<u32>()
            .context("DB_MAX_CONNECTIONS precisa ser um inteiro positivo")?;

        let jwt_ttl_hours = parse_or("JWT_TTL_HOURS", "24")
            .parse::<i64>()
            .context("JWT_TTL_HOURS precisa ser um inteiro")?;
        if jwt_ttl_hours <= 0 {
            anyhow::bail!("JWT_TTL_HOURS precisa ser maior que zero");
        }

        Ok(Self {
            database_url: required("DATABASE_URL")?,
            jwt_secret: required("JWT_SECRET")?,
            bind_addr: parse_or("BIND_ADDR", "0.0.0.0:3000"),
            db_max_connections,
            jwt_ttl_hours,
            reject_unmatched_grants: parse_flag(get("REJECT_UNMATCHED_GRANTS"), "REJECT_UNMATCHED_GRANTS")?,
            strict_constraint_operators: parse_flag(
                get("STRICT_CONSTRAINT_OPERATORS"),
                "STRICT_CONSTRAINT_OPERATORS",
            )?,
        })
    }
}

fn parse_flag(value: Option<String>, key: &str) -> anyhow::Result<bool> {
    match value.as_deref().map(str::trim) {
        None | Some("") => Ok(false),
        Some(v) if v.eq_ignore_ascii_case("true") || v == "1" => Ok(true),
        Some(v) if v.eq_ignore_ascii_case("false") || v == "0" => Ok(false),
        Some(v) => anyhow::bail!("{key} inválida: '{v}' (use true/false)"),
    }
}

#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub auth_service: AuthService,
    pub approval_service: ApprovalService,
    pub sharing_service: SharingService,
    pub product_service: ProductService,
    pub company_service: CompanyService,
}

impl AppState {
    // A assinatura retorna um Result: falha de configuração impede a aplicação de iniciar.
    pub async fn new(config: &Config) -> anyhow::Result<Self> {
        // Conecta ao banco de dados, usando '?' para propagar erros
        let db_pool = PgPoolOptions::new()
            .max_connections(config.db_max_connections)
            .acquire_timeout(Duration::from_secs(3))
            .connect(&config.database_url)
            .await?;

        tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");

        Ok(Self::with_pool(db_pool, config, Arc::new(TracingPublisher)))
    }

    // --- Monta o gráfico de dependências ---
    pub fn with_pool(db_pool: PgPool, config: &Config, publisher: Arc<dyn ChangePublisher>) -> Self {
        let sharing_repo = SharingRepository::new(db_pool.clone());
        let employee_repo = EmployeeRepository::new(db_pool.clone());
        let grant_store: Arc<dyn GrantStore> = Arc::new(sharing_repo.clone());

        let access_service = AccessService::new(
            grant_store.clone(),
            AccessPolicy {
                reject_unmatched_grants: config.reject_unmatched_grants,
            },
        );

        let auth_service = AuthService::new(
            employee_repo.clone(),
            config.jwt_secret.clone(),
            chrono::Duration::hours(config.jwt_ttl_hours),
        );

        Self {
            auth_service,
            approval_service: ApprovalService::new(grant_store),
            sharing_service: SharingService::new(
                sharing_repo,
                db_pool.clone(),
                config.strict_constraint_operators,
            ),
            product_service: ProductService::new(
                ProductRepository::new(db_pool.clone()),
                access_service.clone(),
                publisher,
                db_pool.clone(),
            ),
            company_service: CompanyService::new(
                CompanyRepository::new(db_pool.clone()),
                employee_repo,
                access_service,
                db_pool.clone(),
            ),
            db_pool,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply_when_optional_vars_are_missing() {
        let config = Config::from_lookup(lookup(&[
            ("DATABASE_URL", "postgres://localhost/sharing"),
            ("JWT_SECRET", "segredo"),
        ]))
        .unwrap();

        assert_eq!(config.bind_addr, "0.0.0.0:3000");
        assert_eq!(config.db_max_connections, 5);
        assert_eq!(config.jwt_ttl_hours, 24);
        assert!(!config.reject_unmatched_grants);
        assert!(!config.strict_constraint_operators);
    }

    #[test]
    fn flags_are_parsed() {
        let config = Config::from_lookup(lookup(&[
            ("DATABASE_URL", "postgres://localhost/sharing"),
            ("JWT_SECRET", "segredo"),
            ("REJECT_UNMATCHED_GRANTS", "true"),
            ("STRICT_CONSTRAINT_OPERATORS", "1"),
            ("BIND_ADDR", "127.0.0.1:8080"),
        ]))
        .unwrap();

        assert!(config.reject_unmatched_grants);
        assert!(config.strict_constraint_operators);
        assert_eq!(config.bind_addr, "127.0.0.1:8080");
    }

    #[test]
    fn missing_required_var_is_an_error() {
        let err = Config::from_lookup(lookup(&[("JWT_SECRET", "segredo")])).unwrap_err();
        assert!(err.to_string().contains("DATABASE_URL"));
    }

    #[test]
    fn invalid_values_are_errors() {
        let base = [
            ("DATABASE_URL", "postgres://localhost/sharing"),
            ("JWT_SECRET", "segredo"),
        ];

        let mut with_bad_flag = base.to_vec();
        with_bad_flag.push(("REJECT_UNMATCHED_GRANTS", "talvez"));
        assert!(Config::from_lookup(lookup(&with_bad_flag)).is_err());

        let mut with_bad_ttl = base.to_vec();
        with_bad_ttl.push(("JWT_TTL_HOURS", "0"));
        assert!(Config::from_lookup(lookup(&with_bad_ttl)).is_err());
    }
}
