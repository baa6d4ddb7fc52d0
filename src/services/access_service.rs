// src/services/access_service.rs

use std::sync::Arc;

use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::GrantStore,
    models::{product::Product, sharing::ExternalRightsGrant},
    services::constraint_evaluator,
};

const NO_PRODUCT_PERMISSION: &str = "you don't have any permission for this product";
const NO_SHARING_RIGHTS: &str = "your company does not have rights needed";

/// Ajustes explícitos de comportamento do motor de acesso.
#[derive(Debug, Clone, Copy, Default)]
pub struct AccessPolicy {
    /// Com várias concessões e nenhuma aplicável, responde `NoPermission`
    /// em vez da concessão vazia.
    pub reject_unmatched_grants: bool,
}

/// Decide o acesso de uma empresa aos produtos e funcionários de outra.
///
/// Não guarda estado entre chamadas: toda decisão é tomada sobre o que o
/// `GrantStore` devolve no momento.
#[derive(Clone)]
pub struct AccessService {
    store: Arc<dyn GrantStore>,
    policy: AccessPolicy,
}

impl AccessService {
    pub fn new(store: Arc<dyn GrantStore>, policy: AccessPolicy) -> Self {
        Self { store, policy }
    }

    /// Encontra a concessão efetiva de `sharing_company_id` para
    /// `receiving_company_id` sobre `product`.
    ///
    /// - nenhuma concessão: `NoPermission`;
    /// - exatamente uma: devolvida como está (sem olhar aprovação nem restrições);
    /// - várias: vale a ÚLTIMA, na ordem do armazenamento, que tem pelo menos
    ///   uma restrição, satisfaz todas e está aprovada. Se nenhuma vale, o
    ///   resultado é a concessão vazia (`ExternalRightsGrant::default()`),
    ///   a menos que `reject_unmatched_grants` esteja ativo.
    pub async fn resolve_product_access(
        &self,
        receiving_company_id: Uuid,
        sharing_company_id: Uuid,
        product: &Product,
    ) -> Result<ExternalRightsGrant, AppError> {
        let mut grants = self
            .store
            .list_grants(receiving_company_id, sharing_company_id)
            .await?;

        if grants.is_empty() {
            return Err(AppError::NoPermission(NO_PRODUCT_PERMISSION.into()));
        }

        if grants.len() == 1 {
            return Ok(grants.remove(0));
        }

        let mut selected: Option<ExternalRightsGrant> = None;
        for grant in grants {
            let constraints = self.store.list_constraints(grant.id).await?;
            if constraints.is_empty() || !grant.approved {
                continue;
            }
            if constraint_evaluator::satisfies_all(&constraints, product.quantity) {
                // Sem `break`: uma candidata posterior sobrescreve esta.
                selected = Some(grant);
            }
        }

        match selected {
            Some(grant) => {
                tracing::debug!(
                    grant_id = %grant.id,
                    product_id = %product.id,
                    "concessão selecionada entre várias candidatas"
                );
                Ok(grant)
            }
            None if self.policy.reject_unmatched_grants => {
                Err(AppError::NoPermission(NO_PRODUCT_PERMISSION.into()))
            }
            None => {
                tracing::warn!(
                    receiving = %receiving_company_id,
                    sharing = %sharing_company_id,
                    product_id = %product.id,
                    "nenhuma concessão aplicável; devolvendo concessão vazia"
                );
                Ok(ExternalRightsGrant::default())
            }
        }
    }

    /// Basta existir uma concessão aprovada entre as empresas; restrições não entram.
    pub async fn can_view_employees(
        &self,
        receiving_company_id: Uuid,
        sharing_company_id: Uuid,
    ) -> Result<bool, AppError> {
        let grants = self
            .store
            .list_grants(receiving_company_id, sharing_company_id)
            .await?;

        if grants.is_empty() {
            return Err(AppError::NoPermission(NO_SHARING_RIGHTS.into()));
        }

        if grants.iter().any(|g| g.approved) {
            Ok(true)
        } else {
            Err(AppError::NotApproved)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::grant_store::testing::InMemoryGrantStore;
    use crate::models::sharing::AccessConstraint;
    use rust_decimal::Decimal;

    struct Pair {
        receiving: Uuid,
        sharing: Uuid,
    }

    fn pair() -> Pair {
        Pair {
            receiving: Uuid::new_v4(),
            sharing: Uuid::new_v4(),
        }
    }

    fn grant(pair: &Pair, approved: bool) -> ExternalRightsGrant {
        ExternalRightsGrant {
            id: Uuid::new_v4(),
            sharing_company_id: pair.sharing,
            receiving_company_id: pair.receiving,
            read: true,
            update: false,
            delete: false,
            approved,
        }
    }

    fn constraint(grant: &ExternalRightsGrant, operator_id: i32, value: f64) -> AccessConstraint {
        AccessConstraint {
            id: Uuid::new_v4(),
            grant_id: grant.id,
            operator_id,
            property_id: 1,
            property_value: value,
        }
    }

    fn product(pair: &Pair, quantity: i32) -> Product {
        Product {
            id: Uuid::new_v4(),
            name: "Parafuso".into(),
            price: Decimal::ONE,
            quantity,
            company_id: pair.sharing,
        }
    }

    fn service(store: InMemoryGrantStore) -> AccessService {
        AccessService::new(Arc::new(store), AccessPolicy::default())
    }

    #[tokio::test]
    async fn no_grants_is_no_permission() {
        let p = pair();
        let svc = service(InMemoryGrantStore::new());

        let err = svc
            .resolve_product_access(p.receiving, p.sharing, &product(&p, 10))
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::NoPermission(ref m) if m == NO_PRODUCT_PERMISSION));
    }

    #[tokio::test]
    async fn pair_direction_matters() {
        let p = pair();
        let store = InMemoryGrantStore::new().with_grant(grant(&p, true));
        let svc = service(store);

        // Invertendo os papéis não há concessão
        let err = svc
            .resolve_product_access(p.sharing, p.receiving, &product(&p, 10))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NoPermission(_)));
    }

    #[tokio::test]
    async fn single_grant_is_returned_regardless_of_approval_and_constraints() {
        let p = pair();
        let lone = grant(&p, false);
        let store = InMemoryGrantStore::new()
            .with_grant(lone.clone())
            .with_constraint(constraint(&lone, 1, 100.0));
        let svc = service(store);

        let resolved = svc
            .resolve_product_access(p.receiving, p.sharing, &product(&p, 1))
            .await
            .unwrap();

        assert_eq!(resolved, lone);
    }

    #[tokio::test]
    async fn satisfied_approved_candidate_is_selected() {
        let p = pair();
        let matching = grant(&p, true);
        let other = grant(&p, true);
        let store = InMemoryGrantStore::new()
            .with_grant(matching.clone())
            .with_grant(other.clone())
            .with_constraint(constraint(&matching, 1, 5.0))
            .with_constraint(constraint(&other, 1, 50.0));
        let svc = service(store);

        let resolved = svc
            .resolve_product_access(p.receiving, p.sharing, &product(&p, 10))
            .await
            .unwrap();

        assert_eq!(resolved.id, matching.id);
    }

    #[tokio::test]
    async fn unsatisfied_candidates_yield_the_empty_grant_without_error() {
        let p = pair();
        let first = grant(&p, true);
        let second = grant(&p, true);
        let store = InMemoryGrantStore::new()
            .with_grant(first.clone())
            .with_grant(second.clone())
            .with_constraint(constraint(&first, 1, 5.0))
            .with_constraint(constraint(&second, 1, 50.0));
        let svc = service(store);

        let resolved = svc
            .resolve_product_access(p.receiving, p.sharing, &product(&p, 3))
            .await
            .unwrap();

        assert_eq!(resolved, ExternalRightsGrant::default());
        assert!(resolved.is_unset());
    }

    #[tokio::test]
    async fn unmatched_candidates_are_rejected_when_the_policy_asks() {
        let p = pair();
        let first = grant(&p, true);
        let second = grant(&p, false);
        let store = InMemoryGrantStore::new()
            .with_grant(first.clone())
            .with_grant(second.clone())
            .with_constraint(constraint(&first, 1, 5.0));
        let svc = AccessService::new(
            Arc::new(store),
            AccessPolicy {
                reject_unmatched_grants: true,
            },
        );

        let err = svc
            .resolve_product_access(p.receiving, p.sharing, &product(&p, 3))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NoPermission(_)));
    }

    #[tokio::test]
    async fn last_matching_grant_wins() {
        let p = pair();
        let first = grant(&p, true);
        let second = grant(&p, true);
        let store = InMemoryGrantStore::new()
            .with_grant(first.clone())
            .with_grant(second.clone())
            .with_constraint(constraint(&first, 2, 1.0))
            .with_constraint(constraint(&second, 2, 1.0));
        let svc = service(store);

        let resolved = svc
            .resolve_product_access(p.receiving, p.sharing, &product(&p, 10))
            .await
            .unwrap();

        assert_eq!(resolved.id, second.id);
    }

    #[tokio::test]
    async fn unapproved_candidate_is_skipped_even_when_satisfied() {
        let p = pair();
        let pending = grant(&p, false);
        let approved = grant(&p, true);
        let store = InMemoryGrantStore::new()
            .with_grant(approved.clone())
            .with_grant(pending.clone())
            .with_constraint(constraint(&approved, 2, 1.0))
            .with_constraint(constraint(&pending, 2, 1.0));
        let svc = service(store);

        let resolved = svc
            .resolve_product_access(p.receiving, p.sharing, &product(&p, 10))
            .await
            .unwrap();

        assert_eq!(resolved.id, approved.id);
    }

    #[tokio::test]
    async fn every_constraint_of_a_candidate_must_hold() {
        let p = pair();
        let narrow = grant(&p, true);
        let other = grant(&p, true);
        let store = InMemoryGrantStore::new()
            .with_grant(narrow.clone())
            .with_grant(other)
            .with_constraint(constraint(&narrow, 1, 5.0))
            .with_constraint(constraint(&narrow, 3, 8.0));
        let svc = service(store);

        let inside = svc
            .resolve_product_access(p.receiving, p.sharing, &product(&p, 7))
            .await
            .unwrap();
        assert_eq!(inside.id, narrow.id);

        let outside = svc
            .resolve_product_access(p.receiving, p.sharing, &product(&p, 9))
            .await
            .unwrap();
        assert!(outside.is_unset());
    }

    #[tokio::test]
    async fn candidates_without_constraints_never_apply() {
        let p = pair();
        let store = InMemoryGrantStore::new()
            .with_grant(grant(&p, true))
            .with_grant(grant(&p, true));
        let svc = service(store);

        let resolved = svc
            .resolve_product_access(p.receiving, p.sharing, &product(&p, 10))
            .await
            .unwrap();
        assert!(resolved.is_unset());
    }

    #[tokio::test]
    async fn store_errors_propagate() {
        let p = pair();
        let svc = service(InMemoryGrantStore::failing());

        let err = svc
            .resolve_product_access(p.receiving, p.sharing, &product(&p, 10))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::DatabaseError(_)));

        let err = svc.can_view_employees(p.receiving, p.sharing).await.unwrap_err();
        assert!(matches!(err, AppError::DatabaseError(_)));
    }

    #[tokio::test]
    async fn employees_without_grants_is_no_permission() {
        let p = pair();
        let svc = service(InMemoryGrantStore::new());

        let err = svc.can_view_employees(p.receiving, p.sharing).await.unwrap_err();
        assert!(matches!(err, AppError::NoPermission(ref m) if m == NO_SHARING_RIGHTS));
    }

    #[tokio::test]
    async fn employees_with_only_pending_grants_is_not_approved() {
        let p = pair();
        let svc = service(InMemoryGrantStore::new().with_grant(grant(&p, false)));

        let err = svc.can_view_employees(p.receiving, p.sharing).await.unwrap_err();
        assert!(matches!(err, AppError::NotApproved));
    }

    #[tokio::test]
    async fn employees_visible_with_any_approved_grant_ignoring_constraints() {
        let p = pair();
        let approved = grant(&p, true);
        let store = InMemoryGrantStore::new()
            .with_grant(grant(&p, false))
            .with_grant(approved.clone())
            // Restrição impossível: não deve influenciar
            .with_constraint(constraint(&approved, 1, f64::MAX));
        let svc = service(store);

        assert!(svc.can_view_employees(p.receiving, p.sharing).await.unwrap());
    }
}
