// src/services/product_service.rs

use std::sync::Arc;

use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::ProductRepository,
    models::{
        employee::Employee,
        product::{Product, ProductAction, ProductPayload},
        sharing::ExternalRightsGrant,
    },
    services::{
        access_service::AccessService,
        change_feed::{spawn_publish, ChangePublisher, ProductChange},
    },
};

/// Bits do próprio funcionário (vale para produtos da sua e de outras empresas).
pub fn ensure_employee_may(employee: &Employee, action: ProductAction) -> Result<(), AppError> {
    if employee.permissions.allows(action) {
        Ok(())
    } else {
        Err(AppError::Forbidden(format!(
            "employee does not have the '{}' permission",
            action.as_str()
        )))
    }
}

/// Concessão vazia = sem permissão; concessão sem o direito pedido = proibido.
pub fn ensure_grant_allows(grant: &ExternalRightsGrant, action: ProductAction) -> Result<(), AppError> {
    if grant.is_unset() {
        return Err(AppError::NoPermission(
            "you don't have any permission for this product".into(),
        ));
    }
    if grant.allows(action) {
        Ok(())
    } else {
        Err(AppError::Forbidden(format!(
            "the sharing grant does not allow '{}'",
            action.as_str()
        )))
    }
}

/// Produto da própria empresa: só os bits do funcionário.
/// De outra empresa: bits do funcionário E a concessão resolvida.
pub async fn authorize_product_action(
    access: &AccessService,
    acting: &Employee,
    product: &Product,
    action: ProductAction,
) -> Result<(), AppError> {
    ensure_employee_may(acting, action)?;
    if acting.company_id == product.company_id {
        return Ok(());
    }
    let grant = access
        .resolve_product_access(acting.company_id, product.company_id, product)
        .await?;
    ensure_grant_allows(&grant, action)
}

/// Filtra os produtos de `company_id` que o funcionário pode ler.
/// Cada produto é resolvido contra o seu estado atual.
pub async fn readable_products(
    access: &AccessService,
    acting: &Employee,
    company_id: Uuid,
    products: Vec<Product>,
) -> Result<Vec<Product>, AppError> {
    ensure_employee_may(acting, ProductAction::Read)?;
    if acting.company_id == company_id {
        return Ok(products);
    }

    let mut visible = Vec::with_capacity(products.len());
    for product in products {
        let grant = access
            .resolve_product_access(acting.company_id, company_id, &product)
            .await?;
        if !grant.is_unset() && grant.read {
            visible.push(product);
        }
    }
    Ok(visible)
}

/// Concessão efetiva sobre um produto de outra empresa.
pub async fn effective_grant(
    access: &AccessService,
    acting: &Employee,
    product: &Product,
) -> Result<ExternalRightsGrant, AppError> {
    if acting.company_id == product.company_id {
        return Err(AppError::BadRequest(
            "product belongs to your company; no sharing grant applies".into(),
        ));
    }
    access
        .resolve_product_access(acting.company_id, product.company_id, product)
        .await
}

#[derive(Clone)]
pub struct ProductService {
    repo: ProductRepository,
    access: AccessService,
    publisher: Arc<dyn ChangePublisher>,
    pool: PgPool,
}

impl ProductService {
    pub fn new(
        repo: ProductRepository,
        access: AccessService,
        publisher: Arc<dyn ChangePublisher>,
        pool: PgPool,
    ) -> Self {
        Self { repo, access, publisher, pool }
    }

    async fn load(&self, product_id: Uuid) -> Result<Product, AppError> {
        self.repo
            .find_by_id(product_id)
            .await?
            .ok_or(AppError::NotFound("product"))
    }

    pub async fn list_company_products(
        &self,
        acting: &Employee,
        company_id: Uuid,
    ) -> Result<Vec<Product>, AppError> {
        let products = self.repo.list_by_company(company_id).await?;
        readable_products(&self.access, acting, company_id, products).await
    }

    pub async fn get_product(&self, acting: &Employee, product_id: Uuid) -> Result<Product, AppError> {
        let product = self.load(product_id).await?;
        authorize_product_action(&self.access, acting, &product, ProductAction::Read).await?;
        Ok(product)
    }

    /// A concessão efetiva da empresa do funcionário sobre um produto de outra empresa.
    pub async fn product_access(
        &self,
        acting: &Employee,
        product_id: Uuid,
    ) -> Result<ExternalRightsGrant, AppError> {
        let product = self.load(product_id).await?;
        effective_grant(&self.access, acting, &product).await
    }

    /// Produtos só são criados na empresa do próprio funcionário.
    pub async fn create_product(
        &self,
        acting: &Employee,
        payload: &ProductPayload,
    ) -> Result<Product, AppError> {
        ensure_employee_may(acting, ProductAction::Create)?;

        let product = self
            .repo
            .create_product(
                &self.pool,
                acting.company_id,
                &payload.name,
                payload.price,
                payload.quantity,
            )
            .await?;

        tracing::info!(product_id = %product.id, company_id = %product.company_id, "produto criado");
        spawn_publish(&self.publisher, ProductChange::Upsert { product: product.clone() });
        Ok(product)
    }

    pub async fn update_product(
        &self,
        acting: &Employee,
        product_id: Uuid,
        payload: &ProductPayload,
    ) -> Result<Product, AppError> {
        let current = self.load(product_id).await?;
        // A decisão usa o estado ANTES da alteração
        authorize_product_action(&self.access, acting, &current, ProductAction::Update).await?;

        let updated = self
            .repo
            .update_product(
                &self.pool,
                product_id,
                &payload.name,
                payload.price,
                payload.quantity,
            )
            .await?
            .ok_or(AppError::NotFound("product"))?;

        spawn_publish(&self.publisher, ProductChange::Upsert { product: updated.clone() });
        Ok(updated)
    }

    pub async fn delete_product(&self, acting: &Employee, product_id: Uuid) -> Result<(), AppError> {
        let current = self.load(product_id).await?;
        authorize_product_action(&self.access, acting, &current, ProductAction::Delete).await?;

        let rows = self.repo.delete_product(&self.pool, product_id).await?;
        if rows == 0 {
            return Err(AppError::NotFound("product"));
        }

        tracing::info!(%product_id, by_company = %acting.company_id, "produto removido");
        spawn_publish(
            &self.publisher,
            ProductChange::Delete {
                product_id,
                company_id: current.company_id,
            },
        );
        Ok(())
    }
}
