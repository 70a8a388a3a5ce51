use std::sync::Arc;

use axum::extract::{Path, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::db::queries;
use crate::errors::AppError;
use crate::models::{
    BookingSession, BookingState, BusinessSettings, Cut, Product, Service, Step,
};
use crate::services::booking::{self, BookingAction, WizardContext};
use crate::services::{message, totals};
use crate::state::AppState;

fn wizard_ctx(settings: &BusinessSettings) -> WizardContext {
    WizardContext {
        products_enabled: settings.products_enabled,
        child_cut_enabled: settings.child_cut_enabled,
        today: chrono::Local::now().format("%d/%m/%Y").to_string(),
    }
}

fn load_session(conn: &rusqlite::Connection, id: &str) -> Result<BookingSession, AppError> {
    queries::get_session(conn, id)?
        .ok_or_else(|| AppError::NotFound(format!("booking session {id}")))
}

#[derive(Serialize)]
pub struct SnapshotResponse {
    pub session_id: String,
    pub step: Step,
    pub step_position: usize,
    pub total_steps: usize,
    pub state: BookingState,
    pub totals: totals::Totals,
    pub flags: totals::FlowFlags,
}

fn snapshot(
    session: &BookingSession,
    services: &[Service],
    products: &[Product],
    settings: &BusinessSettings,
) -> SnapshotResponse {
    let step = booking::normalize_step(session.state.step, settings.products_enabled);
    SnapshotResponse {
        session_id: session.id.clone(),
        step,
        step_position: step.position(settings.products_enabled),
        total_steps: Step::sequence(settings.products_enabled).len(),
        state: session.state.clone(),
        totals: totals::compute(&session.state, services, products),
        flags: totals::flags(&session.state, services, settings.child_cut_enabled),
    }
}

// POST /api/booking/start
#[derive(Deserialize, Default)]
pub struct StartRequest {
    /// One-shot hand-off from the cut suggestions gallery: pre-seeds
    /// the adult style slot.
    #[serde(default)]
    pub preselected_cut_id: Option<String>,
}

pub async fn start(
    State(state): State<Arc<AppState>>,
    body: Option<Json<StartRequest>>,
) -> Result<Json<SnapshotResponse>, AppError> {
    let request = body.map(|Json(b)| b).unwrap_or_default();

    let db = state.db.lock().unwrap();
    let _ = queries::expire_old_sessions(&db);

    let settings = queries::get_settings(&db)?;
    let services = queries::get_services(&db)?;
    let products = queries::get_products(&db)?;

    let session = BookingSession::new(
        uuid::Uuid::new_v4().to_string(),
        request.preselected_cut_id,
    );
    queries::save_session(&db, &session)?;

    tracing::info!(session = %session.id, "booking session started");
    Ok(Json(snapshot(&session, &services, &products, &settings)))
}

// GET /api/booking/:id
pub async fn get_session(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<SnapshotResponse>, AppError> {
    let db = state.db.lock().unwrap();
    let session = load_session(&db, &id)?;
    let settings = queries::get_settings(&db)?;
    let services = queries::get_services(&db)?;
    let products = queries::get_products(&db)?;

    Ok(Json(snapshot(&session, &services, &products, &settings)))
}

// GET /api/booking/:id/catalog
#[derive(Serialize)]
pub struct BookingCatalog {
    pub services: Vec<Service>,
    pub cuts: Vec<Cut>,
    pub products: Vec<Product>,
}

pub async fn get_catalog(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<BookingCatalog>, AppError> {
    let db = state.db.lock().unwrap();
    load_session(&db, &id)?;
    let settings = queries::get_settings(&db)?;

    // Child cuts drop off the bookable list entirely when the feature
    // is switched off.
    let services = queries::get_services(&db)?
        .into_iter()
        .filter(Service::is_visible)
        .filter(|s| settings.child_cut_enabled || !s.is_child)
        .collect();
    let cuts = queries::get_cuts(&db)?
        .into_iter()
        .filter(Cut::is_visible)
        .collect();
    let products = queries::get_products(&db)?
        .into_iter()
        .filter(Product::is_visible)
        .collect();

    Ok(Json(BookingCatalog {
        services,
        cuts,
        products,
    }))
}

// POST /api/booking/:id/action
pub async fn apply_action(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(action): Json<BookingAction>,
) -> Result<Json<SnapshotResponse>, AppError> {
    let db = state.db.lock().unwrap();
    let mut session = load_session(&db, &id)?;
    let settings = queries::get_settings(&db)?;

    let ctx = wizard_ctx(&settings);
    booking::apply(&mut session.state, action, &ctx)?;

    tracing::debug!(
        session = %session.id,
        step = ?session.state.step,
        "booking action applied"
    );

    session.touch();
    queries::save_session(&db, &session)?;

    let services = queries::get_services(&db)?;
    let products = queries::get_products(&db)?;
    Ok(Json(snapshot(&session, &services, &products, &settings)))
}

// POST /api/booking/:id/confirm
#[derive(Serialize)]
pub struct ConfirmResponse {
    pub url: String,
    pub message: String,
}

pub async fn confirm(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<ConfirmResponse>, AppError> {
    let composed = {
        let db = state.db.lock().unwrap();
        let mut session = load_session(&db, &id)?;
        let settings = queries::get_settings(&db)?;
        let services = queries::get_services(&db)?;

        let errors = booking::validate(&session.state, &services);
        if errors.any() {
            return Err(AppError::Validation(errors));
        }

        let cuts = queries::get_cuts(&db)?;
        let products = queries::get_products(&db)?;
        let composed =
            message::compose(&session.state, &services, &cuts, &products, &settings);

        session.touch();
        queries::save_session(&db, &session)?;
        composed
    };

    // Fire-and-forget; a failed hand-off must not fail the booking.
    if let Err(e) = state.outbound.open_link(&composed.url).await {
        tracing::error!(error = %e, "failed to hand off booking link");
    }

    Ok(Json(ConfirmResponse {
        url: composed.url,
        message: composed.message,
    }))
}
