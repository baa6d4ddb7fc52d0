// src/services/company_service.rs

use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{CompanyRepository, EmployeeRepository},
    models::{
        company::{Company, CreateCompanyPayload},
        employee::{CreateEmployeePayload, Employee},
    },
    services::{access_service::AccessService, auth::hash_password},
};

/// Funcionários administram a própria empresa; empresas "main" administram todas.
pub fn can_manage_company(acting: &Employee, acting_company: &Company, target_company_id: Uuid) -> bool {
    acting.company_id == target_company_id || acting_company.is_main
}

#[derive(Clone)]
pub struct CompanyService {
    company_repo: CompanyRepository,
    employee_repo: EmployeeRepository,
    access: AccessService,
    pool: PgPool,
}

impl CompanyService {
    pub fn new(
        company_repo: CompanyRepository,
        employee_repo: EmployeeRepository,
        access: AccessService,
        pool: PgPool,
    ) -> Self {
        Self { company_repo, employee_repo, access, pool }
    }

    async fn acting_company(&self, acting: &Employee) -> Result<Company, AppError> {
        self.company_repo
            .find_by_id(acting.company_id)
            .await?
            .ok_or(AppError::NotFound("company"))
    }

    async fn ensure_main(&self, acting: &Employee) -> Result<(), AppError> {
        if self.acting_company(acting).await?.is_main {
            Ok(())
        } else {
            Err(AppError::Forbidden(
                "only employees of a main company can manage companies".into(),
            ))
        }
    }

    async fn ensure_can_manage(&self, acting: &Employee, company_id: Uuid) -> Result<(), AppError> {
        let acting_company = self.acting_company(acting).await?;
        if can_manage_company(acting, &acting_company, company_id) {
            Ok(())
        } else {
            Err(AppError::Forbidden(
                "your company cannot manage this company's employees".into(),
            ))
        }
    }

    // =========================================================================
    //  EMPRESAS
    // =========================================================================

    pub async fn list_companies(&self) -> Result<Vec<Company>, AppError> {
        self.company_repo.list_all().await
    }

    pub async fn get_company(&self, company_id: Uuid) -> Result<Company, AppError> {
        self.company_repo
            .find_by_id(company_id)
            .await?
            .ok_or(AppError::NotFound("company"))
    }

    pub async fn create_company(
        &self,
        acting: &Employee,
        payload: &CreateCompanyPayload,
    ) -> Result<Company, AppError> {
        self.ensure_main(acting).await?;

        let company = self
            .company_repo
            .create_company(&self.pool, &payload.name, payload.is_main)
            .await?;

        tracing::info!(company_id = %company.id, by = %acting.id, "🏢 empresa criada");
        Ok(company)
    }

    pub async fn delete_company(&self, acting: &Employee, company_id: Uuid) -> Result<(), AppError> {
        self.ensure_main(acting).await?;
        if acting.company_id == company_id {
            return Err(AppError::BadRequest("a company cannot delete itself".into()));
        }

        let rows = self.company_repo.delete_company(&self.pool, company_id).await?;
        if rows == 0 {
            return Err(AppError::NotFound("company"));
        }
        tracing::info!(%company_id, by = %acting.id, "empresa removida");
        Ok(())
    }

    // =========================================================================
    //  FUNCIONÁRIOS
    // =========================================================================

    /// Funcionários da própria empresa sempre; de outra, só com partilha aprovada.
    pub async fn list_employees(
        &self,
        acting: &Employee,
        company_id: Uuid,
    ) -> Result<Vec<Employee>, AppError> {
        if acting.company_id != company_id {
            self.access
                .can_view_employees(acting.company_id, company_id)
                .await?;
        }
        self.employee_repo.list_by_company(company_id).await
    }

    pub async fn get_employee(&self, acting: &Employee, employee_id: Uuid) -> Result<Employee, AppError> {
        let employee = self
            .employee_repo
            .find_by_id(employee_id)
            .await?
            .ok_or(AppError::NotFound("employee"))?;

        if acting.company_id != employee.company_id {
            self.access
                .can_view_employees(acting.company_id, employee.company_id)
                .await?;
        }
        Ok(employee)
    }

    pub async fn create_employee(
        &self,
        acting: &Employee,
        company_id: Uuid,
        payload: &CreateEmployeePayload,
    ) -> Result<Employee, AppError> {
        self.ensure_can_manage(acting, company_id).await?;

        let hashed_password = hash_password(&payload.password).await?;

        let employee = self
            .employee_repo
            .create_employee(
                &self.pool,
                company_id,
                &payload.first_name,
                &payload.last_name,
                &payload.email,
                &hashed_password,
                payload.permissions,
            )
            .await?;

        tracing::info!(employee_id = %employee.id, %company_id, "funcionário criado");
        Ok(employee)
    }

    pub async fn delete_employee(&self, acting: &Employee, employee_id: Uuid) -> Result<(), AppError> {
        if acting.id == employee_id {
            return Err(AppError::BadRequest("employees cannot delete themselves".into()));
        }

        let employee = self
            .employee_repo
            .find_by_id(employee_id)
            .await?
            .ok_or(AppError::NotFound("employee"))?;
        self.ensure_can_manage(acting, employee.company_id).await?;

        let rows = self.employee_repo.delete_employee(&self.pool, employee_id).await?;
        if rows == 0 {
            return Err(AppError::NotFound("employee"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::employee::EmployeePermissions;

    fn employee_of(company_id: Uuid) -> Employee {
        Employee {
            id: Uuid::new_v4(),
            company_id,
            first_name: "Rui".into(),
            last_name: "Lima".into(),
            email: "rui@filial.com".into(),
            password_hash: String::new(),
            permissions: EmployeePermissions::default(),
        }
    }

    fn company(id: Uuid, is_main: bool) -> Company {
        Company {
            id,
            name: "Filial".into(),
            is_main,
        }
    }

    #[test]
    fn own_company_is_manageable() {
        let id = Uuid::new_v4();
        assert!(can_manage_company(&employee_of(id), &company(id, false), id));
    }

    #[test]
    fn other_company_needs_a_main_company() {
        let id = Uuid::new_v4();
        let other = Uuid::new_v4();
        assert!(!can_manage_company(&employee_of(id), &company(id, false), other));
        assert!(can_manage_company(&employee_of(id), &company(id, true), other));
    }
}
