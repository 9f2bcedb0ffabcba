// src/main.rs

use axum::{
    middleware as axum_middleware,
    routing::{get, patch, post},
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

use crate::config::{AppConfig, AppState};
use crate::docs::ApiDoc;
use crate::middleware::auth::auth_guard;

pub fn build_router(app_state: AppState) -> Router {
    // Rotas públicas
    let auth_routes = Router::new()
        .route("/register", post(handlers::auth::register))
        .route("/login", post(handlers::auth::login));

    let user_routes = Router::new()
        .route("/me", get(handlers::auth::get_me))
        .route("/me/permissions", get(handlers::auth::get_my_permissions));

    let defect_routes = Router::new()
        .route("/", get(handlers::defects::list_defects).post(handlers::defects::create_defect))
        .route("/connectivity", get(handlers::defects::get_connectivity))
        .route("/connectivity/check", post(handlers::defects::force_check_remote))
        .route("/sync", post(handlers::defects::sync_pending))
        .route(
            "/{id}",
            get(handlers::defects::get_defect)
                .patch(handlers::defects::update_defect)
                .delete(handlers::defects::delete_defect),
        )
        .route("/{id}/status", patch(handlers::defects::update_defect_status))
        .route("/{id}/photo", post(handlers::defects::upload_defect_photo));

    let budget_routes = Router::new()
        .route("/items", get(handlers::budget::list_items).post(handlers::budget::create_item))
        .route(
            "/items/{id}",
            patch(handlers::budget::update_item).delete(handlers::budget::delete_item),
        )
        .route("/stats", get(handlers::budget::get_stats))
        .route("/projects/{project_id}", get(handlers::budget::get_project_budget));

    let task_routes = Router::new()
        .route("/", get(handlers::tasks::list_tasks))
        .route("/schema", get(handlers::tasks::get_schema))
        .route("/schema/refresh", post(handlers::tasks::refresh_schema))
        .route("/{id}/progress", patch(handlers::tasks::update_progress));

    let project_routes = Router::new()
        .route("/projects", get(handlers::projects::list_projects).post(handlers::projects::create_project))
        .route("/projects/{id}", get(handlers::projects::get_project))
        .route(
            "/apartments",
            get(handlers::projects::list_apartments).post(handlers::projects::create_apartment),
        )
        .route("/plans", get(handlers::projects::list_plans).post(handlers::projects::upload_plan))
        .route("/plans/{id}", axum::routing::delete(handlers::projects::delete_plan));

    let material_routes = Router::new()
        .route("/", get(handlers::materials::list_materials).post(handlers::materials::create_material))
        .route("/{id}/receive", post(handlers::materials::receive_material))
        .route("/{id}/issue", post(handlers::materials::issue_material))
        .route("/{id}/correct", post(handlers::materials::correct_stock))
        .route("/{id}/movements", get(handlers::materials::list_movements));

    let report_routes = Router::new()
        .route("/defects", get(handlers::reports::defect_report))
        .route("/defects/{apartment_id}/pdf", get(handlers::reports::defect_report_pdf))
        .route("/budget.csv", get(handlers::budget::export_csv));

    let dashboard_routes = Router::new().route("/summary", get(handlers::dashboard::get_summary));

    // Tudo que não é /auth passa pelo guarda de token
    let protected = Router::new()
        .nest("/users", user_routes)
        .nest("/defects", defect_routes)
        .nest("/budget", budget_routes)
        .nest("/tasks", task_routes)
        .nest("/materials", material_routes)
        .nest("/reports", report_routes)
        .nest("/dashboard", dashboard_routes)
        .merge(project_routes)
        .layer(axum_middleware::from_fn_with_state(app_state.clone(), auth_guard));

    Router::new()
        .route("/api/health", get(|| async { "OK" }))
        .nest("/api/auth", auth_routes)
        .nest("/api", protected)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .with_state(app_state)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .compact()
        .init();

    let config = AppConfig::from_env()?;
    let bind_addr = config.bind_addr.clone();

    // Migra, resolve o modo dos defeitos e detecta as colunas de tasks
    let app_state = AppState::new(config).await?;

    let app = build_router(app_state);

    let listener = TcpListener::bind(&bind_addr).await?;
    tracing::info!("🚀 Servidor escutando em {}", listener.local_addr()?);
    axum::serve(listener, app).await?;

    Ok(())
}
