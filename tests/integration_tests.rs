use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::routing::{get, post};
use axum::Router;
use tower::ServiceExt;

use navalha::config::AppConfig;
use navalha::db;
use navalha::handlers;
use navalha::models::BusinessSettings;
use navalha::services::messaging::OutboundMessenger;
use navalha::state::AppState;

// ── Mock outbound ──

struct MockOutbound {
    opened: Arc<Mutex<Vec<String>>>,
}

#[async_trait]
impl OutboundMessenger for MockOutbound {
    async fn open_link(&self, url: &str) -> anyhow::Result<()> {
        self.opened.lock().unwrap().push(url.to_string());
        Ok(())
    }
}

// ── Helpers ──

fn test_config() -> AppConfig {
    AppConfig {
        port: 3000,
        database_url: ":memory:".to_string(),
        admin_token: "test-token".to_string(),
    }
}

fn test_state() -> (Arc<AppState>, Arc<Mutex<Vec<String>>>) {
    let conn = db::init_db(":memory:").unwrap();
    let opened = Arc::new(Mutex::new(vec![]));
    let state = Arc::new(AppState {
        db: Arc::new(Mutex::new(conn)),
        config: test_config(),
        outbound: Box::new(MockOutbound {
            opened: Arc::clone(&opened),
        }),
    });
    (state, opened)
}

fn test_app(state: Arc<AppState>) -> Router {
    Router::new()
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
        .with_state(state)
}

async fn body_json(res: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(res.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn get_request(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn post_json(uri: &str, body: &serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("Content-Type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn admin_get(uri: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header("Authorization", "Bearer test-token")
        .body(Body::empty())
        .unwrap()
}

fn admin_post(uri: &str, body: &serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("Authorization", "Bearer test-token")
        .header("Content-Type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn start_session(state: &Arc<AppState>) -> serde_json::Value {
    let res = test_app(state.clone())
        .oneshot(post_json(
            "/api/booking/start",
            &serde_json::json!({}),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    body_json(res).await
}

async fn apply_action(
    state: &Arc<AppState>,
    session_id: &str,
    action: serde_json::Value,
) -> (StatusCode, serde_json::Value) {
    let res = test_app(state.clone())
        .oneshot(post_json(
            &format!("/api/booking/{session_id}/action"),
            &action,
        ))
        .await
        .unwrap();
    let status = res.status();
    (status, body_json(res).await)
}

async fn set_products_enabled(state: &Arc<AppState>, enabled: bool) {
    let mut settings = serde_json::to_value(BusinessSettings::default()).unwrap();
    settings["products_enabled"] = serde_json::Value::Bool(enabled);
    let res = test_app(state.clone())
        .oneshot(admin_post("/api/admin/settings", &settings))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
}

fn today_string() -> String {
    chrono::Local::now().format("%d/%m/%Y").to_string()
}

// ── Health ──

#[tokio::test]
async fn test_health() {
    let (state, _) = test_state();
    let res = test_app(state)
        .oneshot(get_request("/health"))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
}

// ── Admin auth ──

#[tokio::test]
async fn test_admin_requires_auth() {
    let (state, _) = test_state();
    let res = test_app(state)
        .oneshot(get_request("/api/admin/status"))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_admin_wrong_token() {
    let (state, _) = test_state();
    let res = test_app(state)
        .oneshot(
            Request::builder()
                .uri("/api/admin/status")
                .header("Authorization", "Bearer wrong-token")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_admin_status_counts_seeded_collections() {
    let (state, _) = test_state();
    let res = test_app(state)
        .oneshot(admin_get("/api/admin/status"))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let json = body_json(res).await;
    assert_eq!(json["services_count"], 5);
    assert_eq!(json["cuts_count"], 8);
    assert_eq!(json["products_count"], 5);
    assert_eq!(json["active_booking_sessions"], 0);
}

// ── Settings ──

#[tokio::test]
async fn test_admin_settings_roundtrip() {
    let (state, _) = test_state();

    let res = test_app(state.clone())
        .oneshot(admin_get("/api/admin/settings"))
        .await
        .unwrap();
    let json = body_json(res).await;
    assert_eq!(json["name"], "Fio & Navalha");

    let mut settings = serde_json::to_value(BusinessSettings::default()).unwrap();
    settings["name"] = serde_json::Value::String("Barbearia do Zé".to_string());
    let res = test_app(state.clone())
        .oneshot(admin_post("/api/admin/settings", &settings))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let res = test_app(state)
        .oneshot(get_request("/api/settings"))
        .await
        .unwrap();
    let json = body_json(res).await;
    assert_eq!(json["name"], "Barbearia do Zé");
}

// ── Public catalog ──

#[tokio::test]
async fn test_public_services_filter_hidden_entries() {
    let (state, _) = test_state();

    // Replace the catalog with a mix of visible, inactive and unnamed
    // placeholder rows.
    let services = serde_json::json!([
        {"id": "1", "name": "Corte de Cabelo", "price": 40, "duration_minutes": 40, "active": true, "requires_style": true},
        {"id": "2", "name": "Barba Completa", "price": 30, "duration_minutes": 30, "active": false},
        {"id": "extra-1", "name": "", "price": 0, "duration_minutes": 30, "active": true},
    ]);
    let res = test_app(state.clone())
        .oneshot(admin_post("/api/admin/services", &services))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    // Public list shows only the visible row.
    let res = test_app(state.clone())
        .oneshot(get_request("/api/services"))
        .await
        .unwrap();
    let json = body_json(res).await;
    assert_eq!(json.as_array().unwrap().len(), 1);
    assert_eq!(json[0]["name"], "Corte de Cabelo");

    // The admin list keeps every row, hidden slots included.
    let res = test_app(state)
        .oneshot(admin_get("/api/admin/services"))
        .await
        .unwrap();
    let json = body_json(res).await;
    assert_eq!(json.as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn test_seeded_products_hide_inactive() {
    let (state, _) = test_state();
    let res = test_app(state)
        .oneshot(get_request("/api/products"))
        .await
        .unwrap();
    let json = body_json(res).await;
    // prod-4 and prod-5 are seeded inactive.
    assert_eq!(json.as_array().unwrap().len(), 3);
}

// ── Booking flow ──

#[tokio::test]
async fn test_full_booking_flow_composes_whatsapp_link() {
    let (state, opened) = test_state();

    let snapshot = start_session(&state).await;
    let id = snapshot["session_id"].as_str().unwrap().to_string();
    assert_eq!(snapshot["step"], "services");
    assert_eq!(snapshot["total_steps"], 5);

    // Pick the cut service; totals follow.
    let (status, snap) = apply_action(
        &state,
        &id,
        serde_json::json!({"type": "toggle_service", "service_id": "1"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(snap["totals"]["services_total"], 40);
    assert_eq!(snap["flags"]["show_adult_style_flow"], true);

    let (status, snap) = apply_action(&state, &id, serde_json::json!({"type": "next"})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(snap["step"], "products");

    // One pomade, then one more.
    let (_, _) = apply_action(
        &state,
        &id,
        serde_json::json!({"type": "toggle_product", "product_id": "prod-1"}),
    )
    .await;
    let (_, snap) = apply_action(
        &state,
        &id,
        serde_json::json!({"type": "adjust_product_quantity", "product_id": "prod-1", "delta": 1}),
    )
    .await;
    assert_eq!(snap["state"]["product_quantities"]["prod-1"], 2);
    assert_eq!(snap["totals"]["products_total"], 70);
    assert_eq!(snap["totals"]["grand_total"], 110);

    let (_, snap) = apply_action(&state, &id, serde_json::json!({"type": "next"})).await;
    assert_eq!(snap["step"], "date");

    // Today auto-fills the date and advances.
    let (_, snap) = apply_action(
        &state,
        &id,
        serde_json::json!({"type": "choose_day", "day": "today"}),
    )
    .await;
    assert_eq!(snap["step"], "time");
    assert_eq!(snap["state"]["specific_date"], today_string().as_str());

    let (_, snap) = apply_action(
        &state,
        &id,
        serde_json::json!({"type": "choose_time", "time": "10:00"}),
    )
    .await;
    assert_eq!(snap["step"], "confirm");

    let (_, _) = apply_action(
        &state,
        &id,
        serde_json::json!({"type": "set_names", "client_name": "Carlos"}),
    )
    .await;

    let res = test_app(state.clone())
        .oneshot(post_json(
            &format!("/api/booking/{id}/confirm"),
            &serde_json::json!({}),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let json = body_json(res).await;

    let message = json["message"].as_str().unwrap();
    assert!(message.starts_with("agendamento-fio-e-navalha\n"));
    assert!(message.contains("✂️ *Agendamento – Fio & Navalha*"));
    assert!(message.contains("👤 *Responsável:* Carlos"));
    assert!(message.contains("💈 *Serviços:*\n* Corte de Cabelo – R$ 40,00"));
    assert!(message.contains("🛍️ *Produtos:*\n* Pomada Modeladora (x2) – R$ 70,00"));
    assert!(message.contains("✂️ *Estilo(s) Adulto:*\n- Definir na hora / Escolher no local"));
    assert!(!message.contains("Estilo(s) Infantil"));
    assert!(message.contains("💰 *Total Geral:* R$ 110,00"));
    assert!(message.contains(&format!("📅 *Data:* {}", today_string())));
    assert!(message.contains("🕒 *Horário:* 10:00"));

    let url = json["url"].as_str().unwrap();
    assert!(url.starts_with("https://wa.me/5511999999999?text="));

    let handed_off = opened.lock().unwrap();
    assert_eq!(handed_off.len(), 1);
    assert_eq!(handed_off[0], url);
}

#[tokio::test]
async fn test_next_blocked_without_service_selection() {
    let (state, _) = test_state();
    let snapshot = start_session(&state).await;
    let id = snapshot["session_id"].as_str().unwrap().to_string();

    let (status, json) = apply_action(&state, &id, serde_json::json!({"type": "next"})).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(json["error"], "Selecione um serviço");

    // Still parked on the first step.
    let res = test_app(state)
        .oneshot(get_request(&format!("/api/booking/{id}")))
        .await
        .unwrap();
    let snap = body_json(res).await;
    assert_eq!(snap["step"], "services");
}

#[tokio::test]
async fn test_products_step_unreachable_when_disabled() {
    let (state, _) = test_state();
    set_products_enabled(&state, false).await;

    let snapshot = start_session(&state).await;
    let id = snapshot["session_id"].as_str().unwrap().to_string();
    assert_eq!(snapshot["total_steps"], 4);

    let (_, _) = apply_action(
        &state,
        &id,
        serde_json::json!({"type": "toggle_service", "service_id": "1"}),
    )
    .await;
    let (_, snap) = apply_action(&state, &id, serde_json::json!({"type": "next"})).await;
    assert_eq!(snap["step"], "date");
    assert_eq!(snap["step_position"], 2);

    let (_, snap) = apply_action(&state, &id, serde_json::json!({"type": "back"})).await;
    assert_eq!(snap["step"], "services");
}

#[tokio::test]
async fn test_confirm_blocked_until_names_present() {
    let (state, opened) = test_state();
    let snapshot = start_session(&state).await;
    let id = snapshot["session_id"].as_str().unwrap().to_string();

    // A child service makes both names mandatory.
    let (_, snap) = apply_action(
        &state,
        &id,
        serde_json::json!({"type": "toggle_service", "service_id": "4"}),
    )
    .await;
    assert_eq!(snap["flags"]["has_child_service"], true);

    let res = test_app(state.clone())
        .oneshot(post_json(
            &format!("/api/booking/{id}/confirm"),
            &serde_json::json!({}),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let json = body_json(res).await;
    assert_eq!(json["errors"]["client_name"], true);
    assert_eq!(json["errors"]["child_name"], true);

    // No link left the building.
    assert!(opened.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_child_name_required_even_with_child_cut_flow_disabled() {
    let (state, _) = test_state();

    let mut settings = serde_json::to_value(BusinessSettings::default()).unwrap();
    settings["child_cut_enabled"] = serde_json::Value::Bool(false);
    let res = test_app(state.clone())
        .oneshot(admin_post("/api/admin/settings", &settings))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let snapshot = start_session(&state).await;
    let id = snapshot["session_id"].as_str().unwrap().to_string();

    let (_, snap) = apply_action(
        &state,
        &id,
        serde_json::json!({"type": "toggle_service", "service_id": "4"}),
    )
    .await;
    // The two child gates stay independent: the style sub-flow is off,
    // the name requirement is not.
    assert_eq!(snap["flags"]["has_child_service"], true);
    assert_eq!(snap["flags"]["show_child_style_flow"], false);

    let (_, _) = apply_action(
        &state,
        &id,
        serde_json::json!({"type": "set_names", "client_name": "Carlos"}),
    )
    .await;
    let res = test_app(state.clone())
        .oneshot(post_json(
            &format!("/api/booking/{id}/confirm"),
            &serde_json::json!({}),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let json = body_json(res).await;
    assert_eq!(json["errors"]["client_name"], false);
    assert_eq!(json["errors"]["child_name"], true);
}

#[tokio::test]
async fn test_booking_catalog_hides_child_services_when_disabled() {
    let (state, _) = test_state();

    let mut settings = serde_json::to_value(BusinessSettings::default()).unwrap();
    settings["child_cut_enabled"] = serde_json::Value::Bool(false);
    let res = test_app(state.clone())
        .oneshot(admin_post("/api/admin/settings", &settings))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let snapshot = start_session(&state).await;
    let id = snapshot["session_id"].as_str().unwrap().to_string();

    let res = test_app(state.clone())
        .oneshot(get_request(&format!("/api/booking/{id}/catalog")))
        .await
        .unwrap();
    let json = body_json(res).await;
    let services = json["services"].as_array().unwrap();
    assert!(services.iter().all(|s| s["is_child"] == false));

    // The public services page still lists the child cut.
    let res = test_app(state)
        .oneshot(get_request("/api/services"))
        .await
        .unwrap();
    let json = body_json(res).await;
    assert!(json
        .as_array()
        .unwrap()
        .iter()
        .any(|s| s["is_child"] == true));
}

#[tokio::test]
async fn test_preselected_cut_seeds_adult_style() {
    let (state, _) = test_state();

    let res = test_app(state.clone())
        .oneshot(post_json(
            "/api/booking/start",
            &serde_json::json!({"preselected_cut_id": "3"}),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let snapshot = body_json(res).await;
    assert_eq!(snapshot["state"]["adult_style"], "3");
}

#[tokio::test]
async fn test_unknown_session_is_not_found() {
    let (state, _) = test_state();
    let res = test_app(state)
        .oneshot(get_request("/api/booking/nope"))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

// ── Manifest ──

#[tokio::test]
async fn test_manifest_reflects_settings() {
    let (state, _) = test_state();
    let res = test_app(state)
        .oneshot(get_request("/manifest.webmanifest"))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(
        res.headers().get("content-type").unwrap(),
        "application/manifest+json"
    );
    let json = body_json(res).await;
    assert_eq!(json["name"], "Fio & Navalha");
    assert_eq!(json["display"], "standalone");
}
