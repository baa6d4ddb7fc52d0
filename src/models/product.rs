// src/models/product.rs

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationError};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: Uuid,

    #[schema(example = "Parafuso M8")]
    pub name: String,

    #[schema(example = 1.25)]
    pub price: Decimal,

    // Atributo testado pelas restrições de acesso
    #[schema(example = 120)]
    pub quantity: i32,

    pub company_id: Uuid,
}

/// Operação pretendida sobre um produto.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProductAction {
    Create,
    Read,
    Update,
    Delete,
}

impl ProductAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProductAction::Create => "create",
            ProductAction::Read => "read",
            ProductAction::Update => "update",
            ProductAction::Delete => "delete",
        }
    }
}

fn validate_not_negative(val: &Decimal) -> Result<(), ValidationError> {
    if val.is_sign_negative() {
        let mut err = ValidationError::new("range");
        err.add_param("min".into(), &0.0);
        err.message = Some("O valor não pode ser negativo.".into());
        return Err(err);
    }
    Ok(())
}

// Usado na criação e na alteração (a alteração substitui o registro inteiro)
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductPayload {
    #[validate(length(min = 1, message = "O nome é obrigatório."))]
    pub name: String,

    #[validate(custom(function = "validate_not_negative"))]
    pub price: Decimal,

    #[validate(range(min = 0, message = "A quantidade não pode ser negativa."))]
    pub quantity: i32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::prelude::FromPrimitive;

    #[test]
    fn negative_price_is_rejected() {
        let payload = ProductPayload {
            name: "Parafuso".into(),
            price: Decimal::from_f64(-1.0).unwrap(),
            quantity: 3,
        };
        let errors = payload.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("price"));
    }

    #[test]
    fn negative_quantity_and_empty_name_are_rejected() {
        let payload = ProductPayload {
            name: String::new(),
            price: Decimal::ZERO,
            quantity: -1,
        };
        let errors = payload.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("name"));
        assert!(fields.contains_key("quantity"));
    }

    #[test]
    fn product_serializes_camel_case() {
        let product = Product {
            id: Uuid::nil(),
            name: "Porca".into(),
            price: Decimal::new(250, 2),
            quantity: 7,
            company_id: Uuid::nil(),
        };
        let json = serde_json::to_value(&product).unwrap();
        assert_eq!(json["companyId"], serde_json::json!(Uuid::nil()));
        assert_eq!(json["quantity"], 7);
    }
}
