// src/models/sharing.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::models::product::ProductAction;

// ---
// 1. ExternalRightsGrant (EAR)
// ---
// "A empresa que partilha permite à empresa que recebe ler/alterar/remover
// os seus produtos", pendente de aprovação pela empresa que partilha.
// O valor `Default` (ids nulos, tudo falso) é a concessão "vazia".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ExternalRightsGrant {
    pub id: Uuid,
    pub sharing_company_id: Uuid,
    pub receiving_company_id: Uuid,

    #[sqlx(rename = "can_read")]
    pub read: bool,
    #[sqlx(rename = "can_update")]
    pub update: bool,
    #[sqlx(rename = "can_delete")]
    pub delete: bool,

    pub approved: bool,
}

impl ExternalRightsGrant {
    /// `true` para a concessão vazia devolvida quando nenhuma candidata se aplica.
    pub fn is_unset(&self) -> bool {
        self.id.is_nil()
    }

    pub fn allows(&self, action: ProductAction) -> bool {
        match action {
            ProductAction::Read => self.read,
            ProductAction::Update => self.update,
            ProductAction::Delete => self.delete,
            // Criação nunca é concedida entre empresas
            ProductAction::Create => false,
        }
    }

    pub fn approval_state(&self) -> ApprovalState {
        ApprovalState::from(self.approved)
    }
}

/// Estados possíveis de uma concessão.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ApprovalState {
    Pending,
    Approved,
}

impl From<bool> for ApprovalState {
    fn from(approved: bool) -> Self {
        if approved {
            ApprovalState::Approved
        } else {
            ApprovalState::Pending
        }
    }
}

impl ApprovalState {
    pub fn is_approved(self) -> bool {
        matches!(self, ApprovalState::Approved)
    }
}

// ---
// 2. AccessConstraint
// ---
// "Esta concessão só vale enquanto product.<property> <operator> value"
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AccessConstraint {
    pub id: Uuid,
    pub grant_id: Uuid,

    // 1 = ">", 2 = ">=", 3 = "<", 4 = "<=" (qualquer outro valor também é "<=")
    #[schema(example = 2)]
    pub operator_id: i32,

    // 1 = quantidade
    #[schema(example = 1)]
    pub property_id: i32,

    #[schema(example = 10.0)]
    pub property_value: f64,
}

/// Identificador do atributo de produto usado hoje pelas restrições.
pub const PROPERTY_QUANTITY: i32 = 1;

fn default_property_id() -> i32 {
    PROPERTY_QUANTITY
}

fn validate_finite(val: f64) -> Result<(), ValidationError> {
    if !val.is_finite() {
        let mut err = ValidationError::new("finite");
        err.message = Some("O valor de referência precisa ser um número finito.".into());
        return Err(err);
    }
    Ok(())
}

// ---
// Payloads
// ---
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateGrantPayload {
    pub sharing_company_id: Uuid,
    pub receiving_company_id: Uuid,

    #[serde(default)]
    pub read: bool,
    #[serde(default)]
    pub update: bool,
    #[serde(default)]
    pub delete: bool,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateGrantRightsPayload {
    pub read: bool,
    pub update: bool,
    pub delete: bool,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ApprovalPayload {
    #[schema(example = true)]
    pub approved: bool,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ConstraintPayload {
    #[schema(example = 2)]
    pub operator_id: i32,

    #[serde(default = "default_property_id")]
    #[schema(example = 1)]
    pub property_id: i32,

    #[validate(custom(function = "validate_finite"))]
    #[schema(example = 10.0)]
    pub property_value: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_grant_is_unset_and_allows_nothing() {
        let grant = ExternalRightsGrant::default();
        assert!(grant.is_unset());
        assert!(!grant.allows(ProductAction::Read));
        assert!(!grant.allows(ProductAction::Update));
        assert!(!grant.allows(ProductAction::Delete));
        assert_eq!(grant.approval_state(), ApprovalState::Pending);
    }

    #[test]
    fn create_is_never_granted() {
        let grant = ExternalRightsGrant {
            id: Uuid::new_v4(),
            read: true,
            update: true,
            delete: true,
            approved: true,
            ..Default::default()
        };
        assert!(!grant.allows(ProductAction::Create));
        assert!(grant.allows(ProductAction::Update));
    }

    #[test]
    fn constraint_payload_defaults_to_quantity() {
        let payload: ConstraintPayload =
            serde_json::from_str(r#"{"operatorId": 1, "propertyValue": 5}"#).unwrap();
        assert_eq!(payload.property_id, PROPERTY_QUANTITY);
        assert!(payload.validate().is_ok());
    }

    #[test]
    fn non_finite_threshold_is_rejected() {
        let payload = ConstraintPayload {
            operator_id: 1,
            property_id: PROPERTY_QUANTITY,
            property_value: f64::NAN,
        };
        assert!(payload.validate().is_err());
    }
}
