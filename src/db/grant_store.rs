// src/db/grant_store.rs

use async_trait::async_trait;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::sharing::{AccessConstraint, ExternalRightsGrant},
};

/// Leituras (e a única escrita) de que o motor de acesso precisa.
///
/// O par é orientado: `list_grants(a, b)` e `list_grants(b, a)` são consultas
/// diferentes. As listagens devolvem as linhas numa ordem estável (ordem de
/// criação), da qual depende a resolução com várias concessões.
#[async_trait]
pub trait GrantStore: Send + Sync {
    async fn list_grants(
        &self,
        receiving_company_id: Uuid,
        sharing_company_id: Uuid,
    ) -> Result<Vec<ExternalRightsGrant>, AppError>;

    async fn list_constraints(&self, grant_id: Uuid) -> Result<Vec<AccessConstraint>, AppError>;

    async fn get_grant(&self, grant_id: Uuid) -> Result<Option<ExternalRightsGrant>, AppError>;

    /// Devolve o número de linhas afetadas.
    async fn update_grant_approval(&self, grant_id: Uuid, approved: bool)
        -> Result<u64, AppError>;
}

#[cfg(test)]
pub mod testing {
    use super::*;
    use std::sync::Mutex;

    /// Implementação em memória para os testes dos serviços.
    #[derive(Default)]
    pub struct InMemoryGrantStore {
        grants: Mutex<Vec<ExternalRightsGrant>>,
        constraints: Mutex<Vec<AccessConstraint>>,
        fail: bool,
    }

    impl InMemoryGrantStore {
        pub fn new() -> Self {
            Self::default()
        }

        /// Toda chamada falha com um erro de armazenamento.
        pub fn failing() -> Self {
            Self {
                fail: true,
                ..Self::default()
            }
        }

        pub fn with_grant(self, grant: ExternalRightsGrant) -> Self {
            self.grants.lock().unwrap().push(grant);
            self
        }

        pub fn with_constraint(self, constraint: AccessConstraint) -> Self {
            self.constraints.lock().unwrap().push(constraint);
            self
        }

        pub fn grant(&self, grant_id: Uuid) -> Option<ExternalRightsGrant> {
            self.grants
                .lock()
                .unwrap()
                .iter()
                .find(|g| g.id == grant_id)
                .cloned()
        }

        fn check(&self) -> Result<(), AppError> {
            if self.fail {
                return Err(AppError::DatabaseError(sqlx::Error::PoolTimedOut));
            }
            Ok(())
        }
    }

    #[async_trait]
    impl GrantStore for InMemoryGrantStore {
        async fn list_grants(
            &self,
            receiving_company_id: Uuid,
            sharing_company_id: Uuid,
        ) -> Result<Vec<ExternalRightsGrant>, AppError> {
            self.check()?;
            Ok(self
                .grants
                .lock()
                .unwrap()
                .iter()
                .filter(|g| {
                    g.receiving_company_id == receiving_company_id
                        && g.sharing_company_id == sharing_company_id
                })
                .cloned()
                .collect())
        }

        async fn list_constraints(
            &self,
            grant_id: Uuid,
        ) -> Result<Vec<AccessConstraint>, AppError> {
            self.check()?;
            Ok(self
                .constraints
                .lock()
                .unwrap()
                .iter()
                .filter(|c| c.grant_id == grant_id)
                .cloned()
                .collect())
        }

        async fn get_grant(
            &self,
            grant_id: Uuid,
        ) -> Result<Option<ExternalRightsGrant>, AppError> {
            self.check()?;
            Ok(self.grant(grant_id))
        }

        async fn update_grant_approval(
            &self,
            grant_id: Uuid,
            approved: bool,
        ) -> Result<u64, AppError> {
            self.check()?;
            let mut grants = self.grants.lock().unwrap();
            match grants.iter_mut().find(|g| g.id == grant_id) {
                Some(grant) => {
                    grant.approved = approved;
                    Ok(1)
                }
                None => Ok(0),
            }
        }
    }
}
