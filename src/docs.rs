// src/docs.rs

use utoipa::OpenApi;
use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use crate::handlers;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Auth ---
        handlers::auth::login,
        handlers::auth::get_me,

        // --- Companies ---
        handlers::companies::list_companies,
        handlers::companies::create_company,
        handlers::companies::get_company,
        handlers::companies::delete_company,

        // --- Employees ---
        handlers::companies::list_employees,
        handlers::companies::create_employee,
        handlers::employees::get_employee,
        handlers::employees::delete_employee,

        // --- Products ---
        handlers::companies::list_company_products,
        handlers::products::create_product,
        handlers::products::get_product,
        handlers::products::update_product,
        handlers::products::delete_product,
        handlers::products::get_product_access,

        // --- Sharing ---
        handlers::sharing::list_grants,
        handlers::sharing::create_grant,
        handlers::sharing::get_grant,
        handlers::sharing::update_grant,
        handlers::sharing::delete_grant,
        handlers::sharing::set_approval,
        handlers::sharing::list_constraints,
        handlers::sharing::create_constraint,
        handlers::sharing::update_constraint,
        handlers::sharing::delete_constraint,
    ),
    components(
        schemas(
            // --- Auth ---
            models::auth::LoginPayload,
            models::auth::AuthResponse,

            // --- Companies / Employees ---
            models::company::Company,
            models::company::CreateCompanyPayload,
            models::employee::Employee,
            models::employee::EmployeePermissions,
            models::employee::CreateEmployeePayload,

            // --- Products ---
            models::product::Product,
            models::product::ProductPayload,

            // --- Sharing ---
            models::sharing::ExternalRightsGrant,
            models::sharing::ApprovalState,
            models::sharing::AccessConstraint,
            models::sharing::CreateGrantPayload,
            models::sharing::UpdateGrantRightsPayload,
            models::sharing::ApprovalPayload,
            models::sharing::ConstraintPayload,
        )
    ),
    tags(
        (name = "Auth", description = "Autenticação"),
        (name = "Companies", description = "Cadastro de Empresas"),
        (name = "Employees", description = "Funcionários e as suas permissões"),
        (name = "Products", description = "Produtos (próprios e partilhados)"),
        (name = "Sharing", description = "Concessões entre empresas, aprovação e restrições")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "api_jwt",
            SecurityScheme::Http(
                Http::new(HttpAuthScheme::Bearer)
            ),
        );
    }
}
