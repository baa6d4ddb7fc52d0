// src/models/company.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

// ---
// Company (O "Tenant" raiz)
// ---
// Dona de funcionários e produtos. Pode estar dos dois lados de uma concessão.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Company {
    #[schema(example = "550e8400-e29b-41d4-a716-446655440000")]
    pub id: Uuid,

    #[schema(example = "Distribuidora Central")]
    pub name: String,

    // Empresas "main" administram o cadastro de outras empresas
    #[schema(example = false)]
    pub is_main: bool,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateCompanyPayload {
    #[validate(length(min = 1, max = 200, message = "O nome da empresa é obrigatório."))]
    #[schema(example = "Distribuidora Central")]
    pub name: String,

    #[serde(default)]
    #[schema(example = false)]
    pub is_main: bool,
}
