// src/db/company_repo.rs

use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{common::error::AppError, models::company::Company};

#[derive(Clone)]
pub struct CompanyRepository {
    pool: PgPool,
}

impl CompanyRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_by_id(&self, company_id: Uuid) -> Result<Option<Company>, AppError> {
        let company = sqlx::query_as::<_, Company>(
            "SELECT id, name, is_main FROM companies WHERE id = $1",
        )
        .bind(company_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(company)
    }

    pub async fn list_all(&self) -> Result<Vec<Company>, AppError> {
        let companies = sqlx::query_as::<_, Company>(
            "SELECT id, name, is_main FROM companies ORDER BY name ASC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(companies)
    }

    pub async fn create_company<'e, E>(
        &self,
        executor: E,
        name: &str,
        is_main: bool,
    ) -> Result<Company, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let company = sqlx::query_as::<_, Company>(
            r#"
            INSERT INTO companies (name, is_main)
            VALUES ($1, $2)
            RETURNING id, name, is_main
            "#,
        )
        .bind(name)
        .bind(is_main)
        .fetch_one(executor)
        .await?;
        Ok(company)
    }

    /// Empresas ainda referenciadas (funcionários, produtos, concessões) não podem ser apagadas.
    pub async fn delete_company<'e, E>(&self, executor: E, company_id: Uuid) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM companies WHERE id = $1")
            .bind(company_id)
            .execute(executor)
            .await
            .map_err(|e| {
                if let sqlx::Error::Database(db_err) = &e {
                    if db_err.is_foreign_key_violation() {
                        return AppError::Conflict(
                            "company is still referenced by employees, products or grants".into(),
                        );
                    }
                }
                AppError::from(e)
            })?;
        Ok(result.rows_affected())
    }
}
