// src/handlers/employees.rs

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use uuid::Uuid;

use crate::{
    common::error::AppError, config::AppState, middleware::auth::AuthenticatedEmployee,
    models::employee::Employee,
};

#[utoipa::path(
    get,
    path = "/api/employees/{employee_id}",
    tag = "Employees",
    params(
        ("employee_id" = Uuid, Path, description = "ID do funcionário")
    ),
    responses(
        (status = 200, description = "Funcionário", body = Employee),
        (status = 404, description = "Funcionário não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_employee(
    State(app_state): State<AppState>,
    AuthenticatedEmployee(employee): AuthenticatedEmployee,
    Path(employee_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let found = app_state
        .company_service
        .get_employee(&employee, employee_id)
        .await?;
    Ok(Json(found))
}

#[utoipa::path(
    delete,
    path = "/api/employees/{employee_id}",
    tag = "Employees",
    params(
        ("employee_id" = Uuid, Path, description = "ID do funcionário")
    ),
    responses(
        (status = 204, description = "Funcionário removido")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_employee(
    State(app_state): State<AppState>,
    AuthenticatedEmployee(employee): AuthenticatedEmployee,
    Path(employee_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    app_state
        .company_service
        .delete_employee(&employee, employee_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
