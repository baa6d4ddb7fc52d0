// src/services/approval_service.rs

use std::sync::Arc;

use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::GrantStore,
    models::sharing::{ApprovalState, ExternalRightsGrant},
};

/// Máquina de estados Pending <-> Approved de uma concessão.
///
/// Só a empresa que partilha pode mudar o estado. A escrita é um único
/// UPDATE de linha; corridas entre aprovar e desaprovar ficam com a última.
#[derive(Clone)]
pub struct ApprovalService {
    store: Arc<dyn GrantStore>,
}

impl ApprovalService {
    pub fn new(store: Arc<dyn GrantStore>) -> Self {
        Self { store }
    }

    pub async fn set_grant_approval(
        &self,
        grant_id: Uuid,
        approved: bool,
        acting_company_id: Uuid,
    ) -> Result<ExternalRightsGrant, AppError> {
        let mut grant = self
            .store
            .get_grant(grant_id)
            .await?
            .ok_or(AppError::NotFound("grant"))?;

        if grant.sharing_company_id != acting_company_id {
            return Err(AppError::Forbidden(
                "your company does not have permission to approve sharing".into(),
            ));
        }

        let target = ApprovalState::from(approved);
        let rows = self
            .store
            .update_grant_approval(grant_id, target.is_approved())
            .await?;

        // A linha sumiu entre a leitura e a escrita
        if rows == 0 {
            return Err(AppError::NotFound("grant"));
        }

        if grant.approval_state() != target {
            tracing::info!(
                grant_id = %grant_id,
                from = ?grant.approval_state(),
                to = ?target,
                "estado de aprovação alterado"
            );
        }

        grant.approved = target.is_approved();
        Ok(grant)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::grant_store::testing::InMemoryGrantStore;
    use crate::models::{product::Product, sharing::AccessConstraint};
    use crate::services::access_service::{AccessPolicy, AccessService};
    use rust_decimal::Decimal;

    fn pending_grant(sharing: Uuid, receiving: Uuid) -> ExternalRightsGrant {
        ExternalRightsGrant {
            id: Uuid::new_v4(),
            sharing_company_id: sharing,
            receiving_company_id: receiving,
            read: true,
            approved: false,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn sharing_company_can_approve_and_repeat_is_idempotent() {
        let sharing = Uuid::new_v4();
        let grant = pending_grant(sharing, Uuid::new_v4());
        let store = Arc::new(InMemoryGrantStore::new().with_grant(grant.clone()));
        let svc = ApprovalService::new(store.clone());

        let first = svc.set_grant_approval(grant.id, true, sharing).await.unwrap();
        let second = svc.set_grant_approval(grant.id, true, sharing).await.unwrap();

        assert!(first.approved);
        assert_eq!(first, second);
        assert!(store.grant(grant.id).unwrap().approved);
    }

    #[tokio::test]
    async fn sharing_company_can_revoke_approval() {
        let sharing = Uuid::new_v4();
        let mut grant = pending_grant(sharing, Uuid::new_v4());
        grant.approved = true;
        let store = Arc::new(InMemoryGrantStore::new().with_grant(grant.clone()));
        let svc = ApprovalService::new(store.clone());

        let updated = svc.set_grant_approval(grant.id, false, sharing).await.unwrap();

        assert_eq!(updated.approval_state(), ApprovalState::Pending);
        assert!(!store.grant(grant.id).unwrap().approved);
    }

    #[tokio::test]
    async fn other_companies_are_forbidden_and_state_is_unchanged() {
        let sharing = Uuid::new_v4();
        let receiving = Uuid::new_v4();
        let grant = pending_grant(sharing, receiving);
        let store = Arc::new(InMemoryGrantStore::new().with_grant(grant.clone()));
        let svc = ApprovalService::new(store.clone());

        // Nem a empresa que recebe pode aprovar
        let err = svc.set_grant_approval(grant.id, true, receiving).await.unwrap_err();

        assert!(matches!(err, AppError::Forbidden(_)));
        assert!(!store.grant(grant.id).unwrap().approved);
    }

    #[tokio::test]
    async fn missing_grant_is_not_found() {
        let svc = ApprovalService::new(Arc::new(InMemoryGrantStore::new()));

        let err = svc
            .set_grant_approval(Uuid::new_v4(), true, Uuid::new_v4())
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::NotFound("grant")));
    }

    #[tokio::test]
    async fn approving_flips_a_multi_grant_resolution_to_matched() {
        let sharing = Uuid::new_v4();
        let receiving = Uuid::new_v4();
        let candidate = pending_grant(sharing, receiving);
        let unreachable = ExternalRightsGrant {
            id: Uuid::new_v4(),
            approved: true,
            ..pending_grant(sharing, receiving)
        };
        let store = Arc::new(
            InMemoryGrantStore::new()
                .with_grant(candidate.clone())
                .with_grant(unreachable.clone())
                .with_constraint(AccessConstraint {
                    id: Uuid::new_v4(),
                    grant_id: candidate.id,
                    operator_id: 1,
                    property_id: 1,
                    property_value: 5.0,
                })
                .with_constraint(AccessConstraint {
                    id: Uuid::new_v4(),
                    grant_id: unreachable.id,
                    operator_id: 1,
                    property_id: 1,
                    property_value: 500.0,
                }),
        );
        let access = AccessService::new(store.clone(), AccessPolicy::default());
        let approvals = ApprovalService::new(store.clone());
        let product = Product {
            id: Uuid::new_v4(),
            name: "Porca".into(),
            price: Decimal::ONE,
            quantity: 10,
            company_id: sharing,
        };

        let before = access
            .resolve_product_access(receiving, sharing, &product)
            .await
            .unwrap();
        assert!(before.is_unset());

        approvals.set_grant_approval(candidate.id, true, sharing).await.unwrap();

        let after = access
            .resolve_product_access(receiving, sharing, &product)
            .await
            .unwrap();
        assert_eq!(after.id, candidate.id);
        assert!(after.approved);
    }
}
