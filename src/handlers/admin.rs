use std::sync::Arc;

use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;
use serde::Serialize;

use crate::db::queries;
use crate::errors::AppError;
use crate::models::{
    BusinessSettings, Cut, PortfolioItem, Product, Service, Testimonial, MAX_OPTIONS,
};
use crate::state::AppState;

fn check_auth(headers: &HeaderMap, expected_token: &str) -> Result<(), AppError> {
    let auth = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");

    let token = auth.strip_prefix("Bearer ").unwrap_or("");
    if token != expected_token {
        return Err(AppError::Unauthorized);
    }
    Ok(())
}

// GET /api/admin/status
#[derive(Serialize)]
pub struct StatusResponse {
    services_count: i64,
    cuts_count: i64,
    products_count: i64,
    portfolio_count: i64,
    testimonials_count: i64,
    active_booking_sessions: i64,
}

pub async fn get_status(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<StatusResponse>, AppError> {
    check_auth(&headers, &state.config.admin_token)?;

    let db = state.db.lock().unwrap();
    let counts = queries::collection_counts(&db)?;
    let active_booking_sessions = queries::count_active_sessions(&db)?;

    Ok(Json(StatusResponse {
        services_count: counts.services,
        cuts_count: counts.cuts,
        products_count: counts.products,
        portfolio_count: counts.portfolio,
        testimonials_count: counts.testimonials,
        active_booking_sessions,
    }))
}

// GET /api/admin/settings
pub async fn get_settings(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<BusinessSettings>, AppError> {
    check_auth(&headers, &state.config.admin_token)?;

    let db = state.db.lock().unwrap();
    Ok(Json(queries::get_settings(&db)?))
}

// POST /api/admin/settings — the panel saves the whole document.
pub async fn update_settings(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(settings): Json<BusinessSettings>,
) -> Result<Json<serde_json::Value>, AppError> {
    check_auth(&headers, &state.config.admin_token)?;

    let db = state.db.lock().unwrap();
    queries::save_settings(&db, &settings)?;
    tracing::info!("settings updated");

    Ok(Json(serde_json::json!({"ok": true})))
}

// Collection endpoints. GET returns everything, hidden slots included,
// so the panel can edit them; POST replaces the collection wholesale.

pub async fn get_services(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<Vec<Service>>, AppError> {
    check_auth(&headers, &state.config.admin_token)?;

    let db = state.db.lock().unwrap();
    Ok(Json(queries::get_services(&db)?))
}

pub async fn save_services(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(mut items): Json<Vec<Service>>,
) -> Result<Json<serde_json::Value>, AppError> {
    check_auth(&headers, &state.config.admin_token)?;

    for item in &mut items {
        item.options.truncate(MAX_OPTIONS);
    }

    let mut db = state.db.lock().unwrap();
    queries::replace_services(&mut db, &items)?;
    tracing::info!(count = items.len(), "services replaced");

    Ok(Json(serde_json::json!({"ok": true})))
}

pub async fn get_cuts(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<Vec<Cut>>, AppError> {
    check_auth(&headers, &state.config.admin_token)?;

    let db = state.db.lock().unwrap();
    Ok(Json(queries::get_cuts(&db)?))
}

pub async fn save_cuts(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(mut items): Json<Vec<Cut>>,
) -> Result<Json<serde_json::Value>, AppError> {
    check_auth(&headers, &state.config.admin_token)?;

    for item in &mut items {
        item.options.truncate(MAX_OPTIONS);
    }

    let mut db = state.db.lock().unwrap();
    queries::replace_cuts(&mut db, &items)?;
    tracing::info!(count = items.len(), "cuts replaced");

    Ok(Json(serde_json::json!({"ok": true})))
}

pub async fn get_products(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<Vec<Product>>, AppError> {
    check_auth(&headers, &state.config.admin_token)?;

    let db = state.db.lock().unwrap();
    Ok(Json(queries::get_products(&db)?))
}

pub async fn save_products(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(mut items): Json<Vec<Product>>,
) -> Result<Json<serde_json::Value>, AppError> {
    check_auth(&headers, &state.config.admin_token)?;

    for item in &mut items {
        item.options.truncate(MAX_OPTIONS);
    }

    let mut db = state.db.lock().unwrap();
    queries::replace_products(&mut db, &items)?;
    tracing::info!(count = items.len(), "products replaced");

    Ok(Json(serde_json::json!({"ok": true})))
}

pub async fn get_portfolio(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<Vec<PortfolioItem>>, AppError> {
    check_auth(&headers, &state.config.admin_token)?;

    let db = state.db.lock().unwrap();
    Ok(Json(queries::get_portfolio(&db)?))
}

pub async fn save_portfolio(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(items): Json<Vec<PortfolioItem>>,
) -> Result<Json<serde_json::Value>, AppError> {
    check_auth(&headers, &state.config.admin_token)?;

    let mut db = state.db.lock().unwrap();
    queries::replace_portfolio(&mut db, &items)?;

    Ok(Json(serde_json::json!({"ok": true})))
}

pub async fn get_testimonials(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<Vec<Testimonial>>, AppError> {
    check_auth(&headers, &state.config.admin_token)?;

    let db = state.db.lock().unwrap();
    Ok(Json(queries::get_testimonials(&db)?))
}

pub async fn save_testimonials(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(items): Json<Vec<Testimonial>>,
) -> Result<Json<serde_json::Value>, AppError> {
    check_auth(&headers, &state.config.admin_token)?;

    let mut db = state.db.lock().unwrap();
    queries::replace_testimonials(&mut db, &items)?;

    Ok(Json(serde_json::json!({"ok": true})))
}
