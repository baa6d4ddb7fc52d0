// src/handlers/companies.rs

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::auth::AuthenticatedEmployee,
    models::{
        company::{Company, CreateCompanyPayload},
        employee::{CreateEmployeePayload, Employee},
        product::Product,
    },
};

// ---
// Empresas
// ---
#[utoipa::path(
    get,
    path = "/api/companies",
    tag = "Companies",
    responses(
        (status = 200, description = "Todas as empresas", body = Vec<Company>)
    ),
    security(("api_jwt" = []))
)]
pub async fn list_companies(
    State(app_state): State<AppState>,
    _employee: AuthenticatedEmployee,
) -> Result<impl IntoResponse, AppError> {
    let companies = app_state.company_service.list_companies().await?;
    Ok(Json(companies))
}

#[utoipa::path(
    post,
    path = "/api/companies",
    tag = "Companies",
    request_body = CreateCompanyPayload,
    responses(
        (status = 201, description = "Empresa criada", body = Company),
        (status = 403, description = "Só empresas main cadastram empresas")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_company(
    State(app_state): State<AppState>,
    AuthenticatedEmployee(employee): AuthenticatedEmployee,
    Json(payload): Json<CreateCompanyPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let company = app_state
        .company_service
        .create_company(&employee, &payload)
        .await?;

    Ok((StatusCode::CREATED, Json(company)))
}

#[utoipa::path(
    get,
    path = "/api/companies/{company_id}",
    tag = "Companies",
    params(
        ("company_id" = Uuid, Path, description = "ID da empresa")
    ),
    responses(
        (status = 200, description = "Empresa", body = Company),
        (status = 404, description = "Empresa não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_company(
    State(app_state): State<AppState>,
    _employee: AuthenticatedEmployee,
    Path(company_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let company = app_state.company_service.get_company(company_id).await?;
    Ok(Json(company))
}

#[utoipa::path(
    delete,
    path = "/api/companies/{company_id}",
    tag = "Companies",
    params(
        ("company_id" = Uuid, Path, description = "ID da empresa")
    ),
    responses(
        (status = 204, description = "Empresa removida"),
        (status = 409, description = "Empresa ainda tem funcionários ou produtos")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_company(
    State(app_state): State<AppState>,
    AuthenticatedEmployee(employee): AuthenticatedEmployee,
    Path(company_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    app_state
        .company_service
        .delete_company(&employee, company_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

// ---
// Funcionários de uma empresa
// ---
#[utoipa::path(
    get,
    path = "/api/companies/{company_id}/employees",
    tag = "Employees",
    params(
        ("company_id" = Uuid, Path, description = "ID da empresa")
    ),
    responses(
        (status = 200, description = "Funcionários visíveis", body = Vec<Employee>),
        (status = 403, description = "Sem partilha aprovada com a empresa")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_employees(
    State(app_state): State<AppState>,
    AuthenticatedEmployee(employee): AuthenticatedEmployee,
    Path(company_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let employees = app_state
        .company_service
        .list_employees(&employee, company_id)
        .await?;
    Ok(Json(employees))
}

#[utoipa::path(
    post,
    path = "/api/companies/{company_id}/employees",
    tag = "Employees",
    request_body = CreateEmployeePayload,
    params(
        ("company_id" = Uuid, Path, description = "ID da empresa")
    ),
    responses(
        (status = 201, description = "Funcionário criado", body = Employee),
        (status = 409, description = "E-mail já cadastrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_employee(
    State(app_state): State<AppState>,
    AuthenticatedEmployee(employee): AuthenticatedEmployee,
    Path(company_id): Path<Uuid>,
    Json(payload): Json<CreateEmployeePayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let created = app_state
        .company_service
        .create_employee(&employee, company_id, &payload)
        .await?;

    Ok((StatusCode::CREATED, Json(created)))
}

// ---
// Produtos de uma empresa
// ---
#[utoipa::path(
    get,
    path = "/api/companies/{company_id}/products",
    tag = "Products",
    params(
        ("company_id" = Uuid, Path, description = "ID da empresa")
    ),
    responses(
        (status = 200, description = "Produtos que o funcionário pode ler", body = Vec<Product>)
    ),
    security(("api_jwt" = []))
)]
pub async fn list_company_products(
    State(app_state): State<AppState>,
    AuthenticatedEmployee(employee): AuthenticatedEmployee,
    Path(company_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let products = app_state
        .product_service
        .list_company_products(&employee, company_id)
        .await?;
    Ok(Json(products))
}
