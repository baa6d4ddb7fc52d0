// src/handlers/sharing.rs

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
    models::sharing::{
        AccessConstraint, ApprovalPayload, ConstraintPayload, CreateGrantPayload,
        ExternalRightsGrant, UpdateGrantRightsPayload,
    },
};

// =========================================================================
//  CONCESSÕES
// =========================================================================

#[utoipa::path(
    get,
    path = "/api/grants",
    tag = "Sharing",
    responses(
        (status = 200, description = "Concessões em que a empresa é uma das partes", body = Vec<ExternalRightsGrant>)
    ),
    security(("api_jwt" = []))
)]
pub async fn list_grants(
    State(app_state): State<AppState>,
    AuthenticatedEmployee(employee): AuthenticatedEmployee,
) -> Result<impl IntoResponse, AppError> {
    let grants = app_state
        .sharing_service
        .list_grants(employee.company_id)
        .await?;
    Ok(Json(grants))
}

#[utoipa::path(
    post,
    path = "/api/grants",
    tag = "Sharing",
    request_body = CreateGrantPayload,
    responses(
        (status = 201, description = "Concessão criada (pendente)", body = ExternalRightsGrant),
        (status = 400, description = "Empresa partilhando consigo mesma")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_grant(
    State(app_state): State<AppState>,
    AuthenticatedEmployee(employee): AuthenticatedEmployee,
    Json(payload): Json<CreateGrantPayload>,
) -> Result<impl IntoResponse, AppError> {
    let grant = app_state
        .sharing_service
        .create_grant(employee.company_id, &payload)
        .await?;
    Ok((StatusCode::CREATED, Json(grant)))
}

#[utoipa::path(
    get,
    path = "/api/grants/{grant_id}",
    tag = "Sharing",
    params(
        ("grant_id" = Uuid, Path, description = "ID da concessão")
    ),
    responses(
        (status = 200, description = "Concessão", body = ExternalRightsGrant),
        (status = 404, description = "Concessão não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_grant(
    State(app_state): State<AppState>,
    AuthenticatedEmployee(employee): AuthenticatedEmployee,
    Path(grant_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let grant = app_state
        .sharing_service
        .get_grant(employee.company_id, grant_id)
        .await?;
    Ok(Json(grant))
}

#[utoipa::path(
    put,
    path = "/api/grants/{grant_id}",
    tag = "Sharing",
    request_body = UpdateGrantRightsPayload,
    params(
        ("grant_id" = Uuid, Path, description = "ID da concessão")
    ),
    responses(
        (status = 200, description = "Direitos alterados", body = ExternalRightsGrant),
        (status = 403, description = "Só a empresa que partilha altera os direitos")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_grant(
    State(app_state): State<AppState>,
    AuthenticatedEmployee(employee): AuthenticatedEmployee,
    Path(grant_id): Path<Uuid>,
    Json(payload): Json<UpdateGrantRightsPayload>,
) -> Result<impl IntoResponse, AppError> {
    let grant = app_state
        .sharing_service
        .update_grant_rights(employee.company_id, grant_id, &payload)
        .await?;
    Ok(Json(grant))
}

#[utoipa::path(
    delete,
    path = "/api/grants/{grant_id}",
    tag = "Sharing",
    params(
        ("grant_id" = Uuid, Path, description = "ID da concessão")
    ),
    responses(
        (status = 204, description = "Concessão removida (com as suas restrições)")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_grant(
    State(app_state): State<AppState>,
    AuthenticatedEmployee(employee): AuthenticatedEmployee,
    Path(grant_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    app_state
        .sharing_service
        .delete_grant(employee.company_id, grant_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

// Aprovar / revogar: só a empresa que partilha
#[utoipa::path(
    put,
    path = "/api/grants/{grant_id}/approval",
    tag = "Sharing",
    request_body = ApprovalPayload,
    params(
        ("grant_id" = Uuid, Path, description = "ID da concessão")
    ),
    responses(
        (status = 200, description = "Estado de aprovação atualizado", body = ExternalRightsGrant),
        (status = 403, description = "Empresa sem permissão para aprovar"),
        (status = 404, description = "Concessão não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn set_approval(
    State(app_state): State<AppState>,
    AuthenticatedEmployee(employee): AuthenticatedEmployee,
    Path(grant_id): Path<Uuid>,
    Json(payload): Json<ApprovalPayload>,
) -> Result<impl IntoResponse, AppError> {
    let grant = app_state
        .approval_service
        .set_grant_approval(grant_id, payload.approved, employee.company_id)
        .await?;
    Ok(Json(grant))
}

// =========================================================================
//  RESTRIÇÕES
// =========================================================================

#[utoipa::path(
    get,
    path = "/api/grants/{grant_id}/constraints",
    tag = "Sharing",
    params(
        ("grant_id" = Uuid, Path, description = "ID da concessão")
    ),
    responses(
        (status = 200, description = "Restrições da concessão", body = Vec<AccessConstraint>)
    ),
    security(("api_jwt" = []))
)]
pub async fn list_constraints(
    State(app_state): State<AppState>,
    AuthenticatedEmployee(employee): AuthenticatedEmployee,
    Path(grant_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let constraints = app_state
        .sharing_service
        .list_constraints(employee.company_id, grant_id)
        .await?;
    Ok(Json(constraints))
}

#[utoipa::path(
    post,
    path = "/api/grants/{grant_id}/constraints",
    tag = "Sharing",
    request_body = ConstraintPayload,
    params(
        ("grant_id" = Uuid, Path, description = "ID da concessão")
    ),
    responses(
        (status = 201, description = "Restrição criada", body = AccessConstraint),
        (status = 400, description = "Operador ou valor inválido")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_constraint(
    State(app_state): State<AppState>,
    AuthenticatedEmployee(employee): AuthenticatedEmployee,
    Path(grant_id): Path<Uuid>,
    Json(payload): Json<ConstraintPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let constraint = app_state
        .sharing_service
        .create_constraint(employee.company_id, grant_id, &payload)
        .await?;
    Ok((StatusCode::CREATED, Json(constraint)))
}

#[utoipa::path(
    put,
    path = "/api/constraints/{constraint_id}",
    tag = "Sharing",
    request_body = ConstraintPayload,
    params(
        ("constraint_id" = Uuid, Path, description = "ID da restrição")
    ),
    responses(
        (status = 200, description = "Restrição alterada", body = AccessConstraint)
    ),
    security(("api_jwt" = []))
)]
pub async fn update_constraint(
    State(app_state): State<AppState>,
    AuthenticatedEmployee(employee): AuthenticatedEmployee,
    Path(constraint_id): Path<Uuid>,
    Json(payload): Json<ConstraintPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let constraint = app_state
        .sharing_service
        .update_constraint(employee.company_id, constraint_id, &payload)
        .await?;
    Ok(Json(constraint))
}

#[utoipa::path(
    delete,
    path = "/api/constraints/{constraint_id}",
    tag = "Sharing",
    params(
        ("constraint_id" = Uuid, Path, description = "ID da restrição")
    ),
    responses(
        (status = 204, description = "Restrição removida")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_constraint(
    State(app_state): State<AppState>,
    AuthenticatedEmployee(employee): AuthenticatedEmployee,
    Path(constraint_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    app_state
        .sharing_service
        .delete_constraint(employee.company_id, constraint_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
