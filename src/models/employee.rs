// src/models/employee.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::models::product::ProductAction;

/// Os quatro bits de permissão do funcionário sobre produtos.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct EmployeePermissions {
    #[sqlx(rename = "can_create")]
    pub create: bool,
    #[sqlx(rename = "can_read")]
    pub read: bool,
    #[sqlx(rename = "can_update")]
    pub update: bool,
    #[sqlx(rename = "can_delete")]
    pub delete: bool,
}

impl EmployeePermissions {
    pub fn allows(&self, action: ProductAction) -> bool {
        match action {
            ProductAction::Create => self.create,
            ProductAction::Read => self.read,
            ProductAction::Update => self.update,
            ProductAction::Delete => self.delete,
        }
    }
}

// Representa um funcionário vindo do banco de dados
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Employee {
    pub id: Uuid,
    pub company_id: Uuid,

    #[schema(example = "Ana")]
    pub first_name: String,

    #[schema(example = "Souza")]
    pub last_name: String,

    #[schema(example = "ana@central.com")]
    pub email: String,

    #[serde(skip_serializing)] // IMPORTANTE para segurança
    #[schema(ignore)]
    pub password_hash: String,

    #[sqlx(flatten)]
    pub permissions: EmployeePermissions,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateEmployeePayload {
    #[validate(length(min = 1, message = "O primeiro nome é obrigatório."))]
    pub first_name: String,

    #[validate(length(min = 1, message = "O sobrenome é obrigatório."))]
    pub last_name: String,

    #[validate(email(message = "O e-mail fornecido é inválido."))]
    pub email: String,

    #[validate(length(min = 6, message = "A senha deve ter no mínimo 6 caracteres."))]
    pub password: String,

    #[serde(default)]
    pub permissions: EmployeePermissions,
}
