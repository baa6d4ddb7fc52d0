// src/db/product_repo.rs

use rust_decimal::Decimal;
use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{common::error::AppError, models::product::Product};

#[derive(Clone)]
pub struct ProductRepository {
    pool: PgPool,
}

impl ProductRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // ---
    // Funções de "Leitura"
    // ---
    // Sempre lidas da pool: o motor de acesso avalia o estado atual do produto.

    pub async fn find_by_id(&self, product_id: Uuid) -> Result<Option<Product>, AppError> {
        let product = sqlx::query_as::<_, Product>(
            "SELECT id, name, price, quantity, company_id FROM products WHERE id = $1",
        )
        .bind(product_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(product)
    }

    pub async fn list_by_company(&self, company_id: Uuid) -> Result<Vec<Product>, AppError> {
        let products = sqlx::query_as::<_, Product>(
            "SELECT id, name, price, quantity, company_id FROM products \
             WHERE company_id = $1 ORDER BY name ASC",
        )
        .bind(company_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(products)
    }

    // ---
    // Funções de "Escrita"
    // ---

    pub async fn create_product<'e, E>(
        &self,
        executor: E,
        company_id: Uuid,
        name: &str,
        price: Decimal,
        quantity: i32,
    ) -> Result<Product, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Product>(
            r#"
            INSERT INTO products (company_id, name, price, quantity)
            VALUES ($1, $2, $3, $4)
            RETURNING id, name, price, quantity, company_id
            "#,
        )
        .bind(company_id)
        .bind(name)
        .bind(price)
        .bind(quantity)
        .fetch_one(executor)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.is_foreign_key_violation() {
                    return AppError::NotFound("company");
                }
            }
            e.into()
        })
    }

    pub async fn update_product<'e, E>(
        &self,
        executor: E,
        product_id: Uuid,
        name: &str,
        price: Decimal,
        quantity: i32,
    ) -> Result<Option<Product>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let product = sqlx::query_as::<_, Product>(
            r#"
            UPDATE products SET name = $2, price = $3, quantity = $4
            WHERE id = $1
            RETURNING id, name, price, quantity, company_id
            "#,
        )
        .bind(product_id)
        .bind(name)
        .bind(price)
        .bind(quantity)
        .fetch_optional(executor)
        .await?;
        Ok(product)
    }

    pub async fn delete_product<'e, E>(&self, executor: E, product_id: Uuid) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(product_id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected())
    }
}
