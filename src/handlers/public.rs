use std::sync::Arc;

use axum::extract::State;
use axum::http::header;
use axum::response::IntoResponse;
use axum::Json;

use crate::db::queries;
use crate::errors::AppError;
use crate::models::{BusinessSettings, Cut, PortfolioItem, Product, Service, Testimonial};
use crate::services::manifest::generate_manifest;
use crate::state::AppState;

// The catalog store returns full collections; visibility filtering
// (active + non-empty name) happens here, on the way out.

pub async fn get_settings(
    State(state): State<Arc<AppState>>,
) -> Result<Json<BusinessSettings>, AppError> {
    let db = state.db.lock().unwrap();
    Ok(Json(queries::get_settings(&db)?))
}

pub async fn get_services(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Service>>, AppError> {
    let db = state.db.lock().unwrap();
    let services = queries::get_services(&db)?
        .into_iter()
        .filter(Service::is_visible)
        .collect();
    Ok(Json(services))
}

pub async fn get_cuts(State(state): State<Arc<AppState>>) -> Result<Json<Vec<Cut>>, AppError> {
    let db = state.db.lock().unwrap();
    let cuts = queries::get_cuts(&db)?
        .into_iter()
        .filter(Cut::is_visible)
        .collect();
    Ok(Json(cuts))
}

pub async fn get_products(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Product>>, AppError> {
    let db = state.db.lock().unwrap();
    let products = queries::get_products(&db)?
        .into_iter()
        .filter(Product::is_visible)
        .collect();
    Ok(Json(products))
}

pub async fn get_portfolio(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<PortfolioItem>>, AppError> {
    let db = state.db.lock().unwrap();
    let items: Vec<PortfolioItem> = queries::get_portfolio(&db)?
        .into_iter()
        .filter(|item| item.active)
        .collect();
    Ok(Json(items))
}

pub async fn get_testimonials(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Testimonial>>, AppError> {
    let db = state.db.lock().unwrap();
    let items: Vec<Testimonial> = queries::get_testimonials(&db)?
        .into_iter()
        .filter(|item| item.active)
        .collect();
    Ok(Json(items))
}

// GET /manifest.webmanifest
pub async fn manifest(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, AppError> {
    let settings = {
        let db = state.db.lock().unwrap();
        queries::get_settings(&db)?
    };

    Ok((
        [(header::CONTENT_TYPE, "application/manifest+json")],
        Json(generate_manifest(&settings)),
    ))
}
