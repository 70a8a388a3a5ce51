use std::sync::{Arc, Mutex};

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use navalha::config::AppConfig;
use navalha::db;
use navalha::handlers;
use navalha::services::messaging::whatsapp::WhatsappHandoff;
use navalha::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = AppConfig::from_env();

    let conn = db::init_db(&config.database_url)?;

    let state = Arc::new(AppState {
        db: Arc::new(Mutex::new(conn)),
        config: config.clone(),
        outbound: Box::new(WhatsappHandoff),
    });

    let app = Router::new()
        .route("/health", get(handlers::health::health))
        .route("/manifest.webmanifest", get(handlers::public::manifest))
        .route("/api/settings", get(handlers::public::get_settings))
        .route("/api/services", get(handlers::public::get_services))
        .route("/api/cuts", get(handlers::public::get_cuts))
        .route("/api/products", get(handlers::public::get_products))
        .route("/api/portfolio", get(handlers::public::get_portfolio))
        .route("/api/testimonials", get(handlers::public::get_testimonials))
        .route("/api/booking/start", post(handlers::booking::start))
        .route("/api/booking/:id", get(handlers::booking::get_session))
        .route(
            "/api/booking/:id/catalog",
            get(handlers::booking::get_catalog),
        )
        .route(
            "/api/booking/:id/action",
            post(handlers::booking::apply_action),
        )
        .route("/api/booking/:id/confirm", post(handlers::booking::confirm))
        .route("/api/admin/status", get(handlers::admin::get_status))
        .route("/api/admin/settings", get(handlers::admin::get_settings))
        .route(
            "/api/admin/settings",
            post(handlers::admin::update_settings),
        )
        .route("/api/admin/services", get(handlers::admin::get_services))
        .route("/api/admin/services", post(handlers::admin::save_services))
        .route("/api/admin/cuts", get(handlers::admin::get_cuts))
        .route("/api/admin/cuts", post(handlers::admin::save_cuts))
        .route("/api/admin/products", get(handlers::admin::get_products))
        .route("/api/admin/products", post(handlers::admin::save_products))
        .route("/api/admin/portfolio", get(handlers::admin::get_portfolio))
        .route(
            "/api/admin/portfolio",
            post(handlers::admin::save_portfolio),
        )
        .route(
            "/api/admin/testimonials",
            get(handlers::admin::get_testimonials),
        )
        .route(
            "/api/admin/testimonials",
            post(handlers::admin::save_testimonials),
        )
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state);

    let addr = format!("0.0.0.0:{}", config.port);
    tracing::info!("starting server on {addr}");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
