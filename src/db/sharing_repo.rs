// src/db/sharing_repo.rs

use async_trait::async_trait;
use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::grant_store::GrantStore,
    models::sharing::{AccessConstraint, ExternalRightsGrant},
};

const GRANT_COLUMNS: &str =
    "id, sharing_company_id, receiving_company_id, can_read, can_update, can_delete, approved";

const CONSTRAINT_COLUMNS: &str = "id, grant_id, operator_id, property_id, property_value";

// Converte violação de chave estrangeira em "não encontrado" para o recurso referenciado
fn map_fk_violation(e: sqlx::Error, referenced: &'static str) -> AppError {
    if let sqlx::Error::Database(db_err) = &e {
        if db_err.is_foreign_key_violation() {
            return AppError::NotFound(referenced);
        }
    }
    e.into()
}

// O repositório das concessões (external_access_rights) e das suas restrições
#[derive(Clone)]
pub struct SharingRepository {
    pool: PgPool,
}

impl SharingRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // ---
    // Concessões
    // ---

    /// Lista as concessões do par orientado, na ordem de criação.
    pub async fn list_grants_for_pair<'e, E>(
        &self,
        executor: E,
        receiving_company_id: Uuid,
        sharing_company_id: Uuid,
    ) -> Result<Vec<ExternalRightsGrant>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            "SELECT {GRANT_COLUMNS} FROM external_access_rights \
             WHERE receiving_company_id = $1 AND sharing_company_id = $2 \
             ORDER BY created_at ASC, id ASC"
        );
        let grants = sqlx::query_as::<_, ExternalRightsGrant>(&sql)
            .bind(receiving_company_id)
            .bind(sharing_company_id)
            .fetch_all(executor)
            .await?;
        Ok(grants)
    }

    /// Concessões em que a empresa aparece de qualquer um dos lados.
    pub async fn list_grants_for_company<'e, E>(
        &self,
        executor: E,
        company_id: Uuid,
    ) -> Result<Vec<ExternalRightsGrant>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            "SELECT {GRANT_COLUMNS} FROM external_access_rights \
             WHERE sharing_company_id = $1 OR receiving_company_id = $1 \
             ORDER BY created_at ASC, id ASC"
        );
        let grants = sqlx::query_as::<_, ExternalRightsGrant>(&sql)
            .bind(company_id)
            .fetch_all(executor)
            .await?;
        Ok(grants)
    }

    pub async fn find_grant<'e, E>(
        &self,
        executor: E,
        grant_id: Uuid,
    ) -> Result<Option<ExternalRightsGrant>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!("SELECT {GRANT_COLUMNS} FROM external_access_rights WHERE id = $1");
        let grant = sqlx::query_as::<_, ExternalRightsGrant>(&sql)
            .bind(grant_id)
            .fetch_optional(executor)
            .await?;
        Ok(grant)
    }

    /// Cria uma concessão pendente (approved = false).
    pub async fn create_grant<'e, E>(
        &self,
        executor: E,
        sharing_company_id: Uuid,
        receiving_company_id: Uuid,
        read: bool,
        update: bool,
        delete: bool,
    ) -> Result<ExternalRightsGrant, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            "INSERT INTO external_access_rights \
             (sharing_company_id, receiving_company_id, can_read, can_update, can_delete, approved) \
             VALUES ($1, $2, $3, $4, $5, FALSE) \
             RETURNING {GRANT_COLUMNS}"
        );
        sqlx::query_as::<_, ExternalRightsGrant>(&sql)
            .bind(sharing_company_id)
            .bind(receiving_company_id)
            .bind(read)
            .bind(update)
            .bind(delete)
            .fetch_one(executor)
            .await
            .map_err(|e| map_fk_violation(e, "company"))
    }

    pub async fn update_grant_rights<'e, E>(
        &self,
        executor: E,
        grant_id: Uuid,
        read: bool,
        update: bool,
        delete: bool,
    ) -> Result<Option<ExternalRightsGrant>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            "UPDATE external_access_rights \
             SET can_read = $2, can_update = $3, can_delete = $4 \
             WHERE id = $1 \
             RETURNING {GRANT_COLUMNS}"
        );
        let grant = sqlx::query_as::<_, ExternalRightsGrant>(&sql)
            .bind(grant_id)
            .bind(read)
            .bind(update)
            .bind(delete)
            .fetch_optional(executor)
            .await?;
        Ok(grant)
    }

    pub async fn set_grant_approval<'e, E>(
        &self,
        executor: E,
        grant_id: Uuid,
        approved: bool,
    ) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("UPDATE external_access_rights SET approved = $2 WHERE id = $1")
            .bind(grant_id)
            .bind(approved)
            .execute(executor)
            .await?;
        Ok(result.rows_affected())
    }

    /// As restrições da concessão caem junto (ON DELETE CASCADE).
    pub async fn delete_grant<'e, E>(&self, executor: E, grant_id: Uuid) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM external_access_rights WHERE id = $1")
            .bind(grant_id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected())
    }

    // ---
    // Restrições
    // ---

    pub async fn list_constraints_for_grant<'e, E>(
        &self,
        executor: E,
        grant_id: Uuid,
    ) -> Result<Vec<AccessConstraint>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            "SELECT {CONSTRAINT_COLUMNS} FROM access_constraints \
             WHERE grant_id = $1 ORDER BY created_at ASC, id ASC"
        );
        let constraints = sqlx::query_as::<_, AccessConstraint>(&sql)
            .bind(grant_id)
            .fetch_all(executor)
            .await?;
        Ok(constraints)
    }

    pub async fn find_constraint<'e, E>(
        &self,
        executor: E,
        constraint_id: Uuid,
    ) -> Result<Option<AccessConstraint>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!("SELECT {CONSTRAINT_COLUMNS} FROM access_constraints WHERE id = $1");
        let constraint = sqlx::query_as::<_, AccessConstraint>(&sql)
            .bind(constraint_id)
            .fetch_optional(executor)
            .await?;
        Ok(constraint)
    }

    pub async fn create_constraint<'e, E>(
        &self,
        executor: E,
        grant_id: Uuid,
        operator_id: i32,
        property_id: i32,
        property_value: f64,
    ) -> Result<AccessConstraint, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            "INSERT INTO access_constraints (grant_id, operator_id, property_id, property_value) \
             VALUES ($1, $2, $3, $4) \
             RETURNING {CONSTRAINT_COLUMNS}"
        );
        sqlx::query_as::<_, AccessConstraint>(&sql)
            .bind(grant_id)
            .bind(operator_id)
            .bind(property_id)
            .bind(property_value)
            .fetch_one(executor)
            .await
            .map_err(|e| map_fk_violation(e, "grant"))
    }

    pub async fn update_constraint<'e, E>(
        &self,
        executor: E,
        constraint_id: Uuid,
        operator_id: i32,
        property_id: i32,
        property_value: f64,
    ) -> Result<Option<AccessConstraint>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            "UPDATE access_constraints \
             SET operator_id = $2, property_id = $3, property_value = $4 \
             WHERE id = $1 \
             RETURNING {CONSTRAINT_COLUMNS}"
        );
        let constraint = sqlx::query_as::<_, AccessConstraint>(&sql)
            .bind(constraint_id)
            .bind(operator_id)
            .bind(property_id)
            .bind(property_value)
            .fetch_optional(executor)
            .await?;
        Ok(constraint)
    }

    pub async fn delete_constraint<'e, E>(
        &self,
        executor: E,
        constraint_id: Uuid,
    ) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM access_constraints WHERE id = $1")
            .bind(constraint_id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected())
    }
}

// Cada chamada usa a pool diretamente: uma conexão por leitura, sem cache.
#[async_trait]
impl GrantStore for SharingRepository {
    async fn list_grants(
        &self,
        receiving_company_id: Uuid,
        sharing_company_id: Uuid,
    ) -> Result<Vec<ExternalRightsGrant>, AppError> {
        self.list_grants_for_pair(&self.pool, receiving_company_id, sharing_company_id)
            .await
    }

    async fn list_constraints(&self, grant_id: Uuid) -> Result<Vec<AccessConstraint>, AppError> {
        self.list_constraints_for_grant(&self.pool, grant_id).await
    }

    async fn get_grant(&self, grant_id: Uuid) -> Result<Option<ExternalRightsGrant>, AppError> {
        self.find_grant(&self.pool, grant_id).await
    }

    async fn update_grant_approval(
        &self,
        grant_id: Uuid,
        approved: bool,
    ) -> Result<u64, AppError> {
        self.set_grant_approval(&self.pool, grant_id, approved).await
    }
}
