// src/handlers/products.rs

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
        product::{Product, ProductPayload},
        sharing::ExternalRightsGrant,
    },
};

#[utoipa::path(
    post,
    path = "/api/products",
    tag = "Products",
    request_body = ProductPayload,
    responses(
        (status = 201, description = "Produto criado na empresa do funcionário", body = Product),
        (status = 403, description = "Funcionário sem permissão de criação")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_product(
    State(app_state): State<AppState>,
    AuthenticatedEmployee(employee): AuthenticatedEmployee,
    Json(payload): Json<ProductPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let product = app_state
        .product_service
        .create_product(&employee, &payload)
        .await?;

    Ok((StatusCode::CREATED, Json(product)))
}

#[utoipa::path(
    get,
    path = "/api/products/{product_id}",
    tag = "Products",
    params(
        ("product_id" = Uuid, Path, description = "ID do produto")
    ),
    responses(
        (status = 200, description = "Produto", body = Product),
        (status = 403, description = "Sem permissão sobre o produto"),
        (status = 404, description = "Produto não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_product(
    State(app_state): State<AppState>,
    AuthenticatedEmployee(employee): AuthenticatedEmployee,
    Path(product_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let product = app_state
        .product_service
        .get_product(&employee, product_id)
        .await?;
    Ok(Json(product))
}

#[utoipa::path(
    put,
    path = "/api/products/{product_id}",
    tag = "Products",
    request_body = ProductPayload,
    params(
        ("product_id" = Uuid, Path, description = "ID do produto")
    ),
    responses(
        (status = 200, description = "Produto alterado", body = Product),
        (status = 403, description = "Sem permissão sobre o produto")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_product(
    State(app_state): State<AppState>,
    AuthenticatedEmployee(employee): AuthenticatedEmployee,
    Path(product_id): Path<Uuid>,
    Json(payload): Json<ProductPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let product = app_state
        .product_service
        .update_product(&employee, product_id, &payload)
        .await?;
    Ok(Json(product))
}

#[utoipa::path(
    delete,
    path = "/api/products/{product_id}",
    tag = "Products",
    params(
        ("product_id" = Uuid, Path, description = "ID do produto")
    ),
    responses(
        (status = 204, description = "Produto removido"),
        (status = 403, description = "Sem permissão sobre o produto")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_product(
    State(app_state): State<AppState>,
    AuthenticatedEmployee(employee): AuthenticatedEmployee,
    Path(product_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    app_state
        .product_service
        .delete_product(&employee, product_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

// A concessão efetiva da empresa do funcionário sobre um produto de outra empresa
#[utoipa::path(
    get,
    path = "/api/products/{product_id}/access",
    tag = "Products",
    params(
        ("product_id" = Uuid, Path, description = "ID do produto")
    ),
    responses(
        (status = 200, description = "Concessão resolvida (vazia se nenhuma se aplica)", body = ExternalRightsGrant),
        (status = 400, description = "O produto é da própria empresa"),
        (status = 403, description = "Nenhuma concessão entre as empresas")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_product_access(
    State(app_state): State<AppState>,
    AuthenticatedEmployee(employee): AuthenticatedEmployee,
    Path(product_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let grant = app_state
        .product_service
        .product_access(&employee, product_id)
        .await?;
    Ok(Json(grant))
}
