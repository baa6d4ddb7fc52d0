//src/main.rs

use anyhow::Context;
use axum::{
    middleware as axum_middleware,
    routing::{get, post, put},
    Router,
};
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

mod common;
mod config;
mod db;
mod docs;
mod handlers;
mod middleware;
mod models;
mod services;

use crate::config::{AppState, Config};
use crate::docs::ApiDoc;
use crate::middleware::auth::auth_guard;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // RUST_LOG controla o nível; sem ele, "info"
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .compact()
        .init();

    // Se a configuração falhar, a aplicação não deve iniciar.
    let config = Config::from_env()?;
    let app_state = AppState::new(&config)
        .await
        .context("Falha ao inicializar o estado da aplicação.")?;

    // Faz o app rodar as migrações do SQLx na inicialização
    sqlx::migrate!()
        .run(&app_state.db_pool)
        .await
        .context("Falha ao rodar as migrações do banco de dados.")?;

    tracing::info!("✅ Migrações do banco de dados executadas com sucesso!");

    // Rotas públicas
    let auth_routes = Router::new().route("/login", post(handlers::auth::login));

    // Tudo o resto exige um funcionário autenticado
    let protected_routes = Router::new()
        .route("/me", get(handlers::auth::get_me))
        .route(
            "/companies",
            get(handlers::companies::list_companies).post(handlers::companies::create_company),
        )
        .route(
            "/companies/{company_id}",
            get(handlers::companies::get_company).delete(handlers::companies::delete_company),
        )
        .route(
            "/companies/{company_id}/employees",
            get(handlers::companies::list_employees).post(handlers::companies::create_employee),
        )
        .route(
            "/companies/{company_id}/products",
            get(handlers::companies::list_company_products),
        )
        .route(
            "/employees/{employee_id}",
            get(handlers::employees::get_employee).delete(handlers::employees::delete_employee),
        )
        .route("/products", post(handlers::products::create_product))
        .route(
            "/products/{product_id}",
            get(handlers::products::get_product)
                .put(handlers::products::update_product)
                .delete(handlers::products::delete_product),
        )
        .route(
            "/products/{product_id}/access",
            get(handlers::products::get_product_access),
        )
        .route(
            "/grants",
            get(handlers::sharing::list_grants).post(handlers::sharing::create_grant),
        )
        .route(
            "/grants/{grant_id}",
            get(handlers::sharing::get_grant)
                .put(handlers::sharing::update_grant)
                .delete(handlers::sharing::delete_grant),
        )
        .route("/grants/{grant_id}/approval", put(handlers::sharing::set_approval))
        .route(
            "/grants/{grant_id}/constraints",
            get(handlers::sharing::list_constraints).post(handlers::sharing::create_constraint),
        )
        .route(
            "/constraints/{constraint_id}",
            put(handlers::sharing::update_constraint).delete(handlers::sharing::delete_constraint),
        )
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    // Combina tudo no router principal
    let app = Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .route("/api/health", get(|| async { "OK" }))
        .nest("/api/auth", auth_routes)
        .nest("/api", protected_routes)
        .with_state(app_state);

    // Inicia o servidor
    let listener = TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("Falha ao iniciar o listener TCP em {}", config.bind_addr))?;
    tracing::info!("🚀 Servidor escutando em {}", listener.local_addr()?);
    tracing::info!(
        reject_unmatched_grants = config.reject_unmatched_grants,
        strict_constraint_operators = config.strict_constraint_operators,
        "políticas de acesso ativas"
    );

    axum::serve(listener, app).await.context("Erro no servidor Axum")?;
    Ok(())
}
