// src/db/employee_repo.rs

use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::employee::{Employee, EmployeePermissions},
};

const EMPLOYEE_COLUMNS: &str = "id, company_id, first_name, last_name, email, password_hash, \
     can_create, can_read, can_update, can_delete";

// O repositório de funcionários, responsável por todas as interações com a tabela 'employees'
#[derive(Clone)]
pub struct EmployeeRepository {
    pool: PgPool,
}

impl EmployeeRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // Busca um funcionário pelo seu e-mail (login)
    pub async fn find_by_email(&self, email: &str) -> Result<Option<Employee>, AppError> {
        let sql = format!("SELECT {EMPLOYEE_COLUMNS} FROM employees WHERE email = $1");
        let employee = sqlx::query_as::<_, Employee>(&sql)
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(employee)
    }

    // Busca um funcionário pelo seu ID
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Employee>, AppError> {
        let sql = format!("SELECT {EMPLOYEE_COLUMNS} FROM employees WHERE id = $1");
        let employee = sqlx::query_as::<_, Employee>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(employee)
    }

    pub async fn list_by_company(&self, company_id: Uuid) -> Result<Vec<Employee>, AppError> {
        let sql = format!(
            "SELECT {EMPLOYEE_COLUMNS} FROM employees WHERE company_id = $1 \
             ORDER BY last_name ASC, first_name ASC"
        );
        let employees = sqlx::query_as::<_, Employee>(&sql)
            .bind(company_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(employees)
    }

    // Cria um novo funcionário no banco de dados
    pub async fn create_employee<'e, E>(
        &self,
        executor: E,
        company_id: Uuid,
        first_name: &str,
        last_name: &str,
        email: &str,
        hashed_password: &str,
        permissions: EmployeePermissions,
    ) -> Result<Employee, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            "INSERT INTO employees \
             (company_id, first_name, last_name, email, password_hash, \
              can_create, can_read, can_update, can_delete) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) \
             RETURNING {EMPLOYEE_COLUMNS}"
        );
        sqlx::query_as::<_, Employee>(&sql)
            .bind(company_id)
            .bind(first_name)
            .bind(last_name)
            .bind(email)
            .bind(hashed_password)
            .bind(permissions.create)
            .bind(permissions.read)
            .bind(permissions.update)
            .bind(permissions.delete)
            .fetch_one(executor)
            .await
            .map_err(|e| {
                // Converte erro de violação de chave única em um erro mais amigável
                if let Some(db_err) = e.as_database_error() {
                    if db_err.is_unique_violation() {
                        return AppError::EmailAlreadyExists;
                    }
                    if db_err.is_foreign_key_violation() {
                        return AppError::NotFound("company");
                    }
                }
                AppError::from(e)
            })
    }

    pub async fn delete_employee<'e, E>(&self, executor: E, id: Uuid) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM employees WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected())
    }
}
