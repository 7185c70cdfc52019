//! Integration tests for the garden API endpoints.
//!
//! Tests use Axum's `Router` directly via `tower::ServiceExt` without
//! starting a TCP server. Each test gets a fresh in-memory `SQLite`
//! database and a manual clock, so elapsed time is fully controlled.

#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::float_cmp,
    clippy::indexing_slicing
)]

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::{Value, json};
use tower::ServiceExt;
use verdant_core::{GardenConfig, ManualClock};
use verdant_db::{GardenStore, SqliteDb};
use verdant_server::{AppState, build_router};
use verdant_types::UnixSeconds;

const T0: f64 = 1_700_000_000.0;

struct Harness {
    router: Router,
    clock: Arc<ManualClock>,
    state: Arc<AppState>,
}

async fn harness() -> Harness {
    let db = SqliteDb::connect_url("sqlite::memory:")
        .await
        .expect("Failed to open in-memory SQLite");
    db.run_migrations().await.expect("Failed to run migrations");

    let mut config = GardenConfig::default();
    config.weather.seed = Some(7);

    let clock = Arc::new(ManualClock::new(UnixSeconds(T0)));
    let state = Arc::new(AppState::new(GardenStore::new(db), &config, clock.clone()));
    Harness {
        router: build_router(state.clone()),
        clock,
        state,
    }
}

async fn body_to_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

async fn get(router: &Router, uri: &str) -> (StatusCode, Value) {
    let response = router
        .clone()
        .oneshot(Request::get(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    (status, body_to_json(response.into_body()).await)
}

async fn post(router: &Router, uri: &str, body: &Value) -> (StatusCode, Value) {
    let response = router
        .clone()
        .oneshot(
            Request::post(uri)
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    let status = response.status();
    (status, body_to_json(response.into_body()).await)
}

fn seed_body(author: Option<&str>) -> Value {
    let mut body = json!({
        "x": 320.0,
        "y": 180.5,
        "stemTex": "data:image/png;base64,STEM",
        "leafTex": "data:image/png;base64,LEAF",
        "flowerTex": "data:image/png;base64,FLOWER",
    });
    if let Some(author) = author {
        body["author"] = json!(author);
    }
    body
}

async fn force_weather(router: &Router, weather: Value) {
    let (status, _) = post(router, "/api/admin/update", &json!({ "weather": weather })).await;
    assert_eq!(status, StatusCode::OK);
}

// =============================================================================
// POST /api/plant
// =============================================================================

#[tokio::test]
async fn test_create_plant_returns_view() {
    let h = harness().await;
    let (status, json) = post(&h.router, "/api/plant", &seed_body(Some("Willow"))).await;

    assert_eq!(status, StatusCode::OK);
    assert!(json["id"].as_i64().unwrap() > 0);
    assert_eq!(json["x"], 320.0);
    assert_eq!(json["stemTex"], "data:image/png;base64,STEM");
    assert_eq!(json["author"], "Willow");
    assert_eq!(json["server_time"], T0 * 1000.0);

    let stats = &json["stats"];
    let max_hp = stats["maxHp"].as_f64().unwrap();
    assert!((80.0..=300.0).contains(&max_hp));
    assert_eq!(max_hp.fract(), 0.0);
    assert_eq!(stats["hp"], stats["maxHp"]);
    let vit = stats["vit"].as_f64().unwrap();
    assert!((0.5..=5.0).contains(&vit));
    assert_eq!(stats["dead"], false);
    assert_eq!(stats["death_time"], 0.0);
    assert_eq!(stats["death_cause"], Value::Null);
    assert_eq!(stats["protect_until"], 0.0);
}

#[tokio::test]
async fn test_create_plant_defaults_author() {
    let h = harness().await;
    let (_, json) = post(&h.router, "/api/plant", &seed_body(None)).await;
    assert_eq!(json["author"], "Anonymous");
}

#[tokio::test]
async fn test_create_plant_rejects_missing_texture() {
    let h = harness().await;
    let mut body = seed_body(None);
    body["leafTex"] = json!("");
    let (status, json) = post(&h.router, "/api/plant", &body).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["status"], 400);

    let mut body = seed_body(None);
    body.as_object_mut().unwrap().remove("stemTex");
    let (status, _) = post(&h.router, "/api/plant", &body).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

// =============================================================================
// POST /api/plant/protect
// =============================================================================

#[tokio::test]
async fn test_protect_plant() {
    let h = harness().await;
    let (_, plant) = post(&h.router, "/api/plant", &seed_body(None)).await;
    h.clock.advance(5.0);

    let (status, json) = post(&h.router, "/api/plant/protect", &json!({ "id": plant["id"] })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["success"], true);
    assert_eq!(json["protect_until"], T0 + 65.0);
}

#[tokio::test]
async fn test_protect_unknown_plant_is_404() {
    let h = harness().await;
    let (status, json) = post(&h.router, "/api/plant/protect", &json!({ "id": 424_242 })).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["error"], "Plant not found");
    assert_eq!(json["status"], 404);
}

#[tokio::test]
async fn test_protect_dead_plant_is_too_late() {
    let h = harness().await;
    let (_, plant) = post(&h.router, "/api/plant", &seed_body(None)).await;
    force_weather(&h.router, json!("tornado")).await;
    get(&h.router, "/api/updates").await;

    // 300 s of tornado kills any plant (max health 300, 5 hp/s).
    h.clock.advance(300.0);
    let (_, update) = get(&h.router, "/api/updates").await;
    assert_eq!(update["plants"][0]["stats"]["dead"], true);

    let (status, json) = post(&h.router, "/api/plant/protect", &json!({ "id": plant["id"] })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "Too late, plant is dead.");
}

// =============================================================================
// GET /api/updates
// =============================================================================

#[tokio::test]
async fn test_updates_shape() {
    let h = harness().await;
    post(&h.router, "/api/plant", &seed_body(None)).await;

    let (status, json) = get(&h.router, "/api/updates").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["time"], T0 * 1000.0);
    assert!(json["weather"].is_string());
    assert_eq!(json["env"]["snow_level"], 0.0);
    assert!(json["env"]["puddle_level"].is_number());
    assert_eq!(json["plants"].as_array().unwrap().len(), 1);
    assert_eq!(json["deaths"], 0);
}

#[tokio::test]
async fn test_storm_damage_matches_elapsed_time() {
    let h = harness().await;
    let (_, plant) = post(&h.router, "/api/plant", &seed_body(None)).await;
    let max_hp = plant["stats"]["maxHp"].as_f64().unwrap();

    force_weather(&h.router, json!("storm")).await;
    // Decide the storm; nothing has elapsed yet.
    get(&h.router, "/api/updates").await;

    h.clock.advance(2.0);
    let (_, json) = get(&h.router, "/api/updates").await;
    let hp = json["plants"][0]["stats"]["hp"].as_f64().unwrap();
    assert!((hp - (max_hp - 10.0)).abs() < 1e-6, "hp {hp} max {max_hp}");
    assert_eq!(json["weather"], "storm");
}

#[tokio::test]
async fn test_overlapping_polls_apply_elapsed_time_once() {
    let h = harness().await;
    let (_, plant) = post(&h.router, "/api/plant", &seed_body(None)).await;
    let max_hp = plant["stats"]["maxHp"].as_f64().unwrap();

    force_weather(&h.router, json!("storm")).await;
    get(&h.router, "/api/updates").await;

    h.clock.advance(2.0);
    let ((status_a, a), (status_b, b)) = tokio::join!(
        get(&h.router, "/api/updates"),
        get(&h.router, "/api/updates")
    );
    assert_eq!(status_a, StatusCode::OK);
    assert_eq!(status_b, StatusCode::OK);

    for json in [&a, &b] {
        let hp = json["plants"][0]["stats"]["hp"].as_f64().unwrap();
        assert!((hp - (max_hp - 10.0)).abs() < 1e-6, "hp {hp} max {max_hp}");
    }

    let (_, after) = get(&h.router, "/api/updates").await;
    let hp = after["plants"][0]["stats"]["hp"].as_f64().unwrap();
    assert!((hp - (max_hp - 10.0)).abs() < 1e-6);
}

#[tokio::test]
async fn test_protected_plant_survives_storm() {
    let h = harness().await;
    let (_, plant) = post(&h.router, "/api/plant", &seed_body(None)).await;
    let max_hp = plant["stats"]["maxHp"].as_f64().unwrap();
    post(&h.router, "/api/plant/protect", &json!({ "id": plant["id"] })).await;

    force_weather(&h.router, json!("hail")).await;
    get(&h.router, "/api/updates").await;
    h.clock.advance(30.0);
    let (_, json) = get(&h.router, "/api/updates").await;

    assert_eq!(json["plants"][0]["stats"]["hp"], max_hp);
    assert_eq!(json["plants"][0]["stats"]["dead"], false);
}

#[tokio::test]
async fn test_dead_plant_is_evicted_and_counted() {
    let h = harness().await;
    post(&h.router, "/api/plant", &seed_body(None)).await;
    force_weather(&h.router, json!("blizzard")).await;
    get(&h.router, "/api/updates").await;

    h.clock.advance(300.0);
    let (_, json) = get(&h.router, "/api/updates").await;
    assert_eq!(json["plants"][0]["stats"]["dead"], true);
    assert_eq!(json["plants"][0]["stats"]["death_cause"], "blizzard");
    assert_eq!(json["deaths"], 0);

    h.clock.advance(5.0);
    let (_, json) = get(&h.router, "/api/updates").await;
    assert_eq!(json["plants"].as_array().unwrap().len(), 1);

    h.clock.advance(6.0);
    let (_, json) = get(&h.router, "/api/updates").await;
    assert!(json["plants"].as_array().unwrap().is_empty());
    assert_eq!(json["deaths"], 1);

    h.clock.advance(60.0);
    let (_, json) = get(&h.router, "/api/updates").await;
    assert_eq!(json["deaths"], 1);
}

#[tokio::test]
async fn test_updates_since_filters_plants() {
    let h = harness().await;
    post(&h.router, "/api/plant", &seed_body(Some("early"))).await;
    h.clock.advance(10.0);
    post(&h.router, "/api/plant", &seed_body(Some("late"))).await;

    let uri = format!("/api/updates?since={}", (T0 + 5.0) * 1000.0);
    let (_, json) = get(&h.router, &uri).await;
    let plants = json["plants"].as_array().unwrap();
    assert_eq!(plants.len(), 1);
    assert_eq!(plants[0]["author"], "late");

    let (status, json) = get(&h.router, "/api/updates?since=yesterday").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["plants"].as_array().unwrap().len(), 2);
}

// =============================================================================
// Admin
// =============================================================================

#[tokio::test]
async fn test_admin_update_merges_fields() {
    let h = harness().await;

    let (status, json) = post(
        &h.router,
        "/api/admin/update",
        &json!({ "weather": "aurora_borealis", "time_offset": 2 }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "ok");
    assert_eq!(json["overrides"]["weather"], "aurora_borealis");
    assert_eq!(json["overrides"]["time_offset"], 2.0);

    // Offset only: weather is kept.
    let (_, json) = post(&h.router, "/api/admin/update", &json!({ "time_offset": -1.5 })).await;
    assert_eq!(json["overrides"]["weather"], "aurora_borealis");
    assert_eq!(json["overrides"]["time_offset"], -1.5);

    // Null clears the weather.
    let (_, json) = post(&h.router, "/api/admin/update", &json!({ "weather": null })).await;
    assert_eq!(json["overrides"]["weather"], Value::Null);
    assert_eq!(json["overrides"]["time_offset"], -1.5);
}

#[tokio::test]
async fn test_admin_rejects_unknown_weather() {
    let h = harness().await;
    let (status, json) = post(&h.router, "/api/admin/update", &json!({ "weather": "frogs" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["status"], 400);
    assert_eq!(h.state.world.lock().await.overrides.weather, None);
}

#[tokio::test]
async fn test_time_offset_shifts_display_only() {
    let h = harness().await;
    post(&h.router, "/api/admin/update", &json!({ "time_offset": 3 })).await;
    let (_, json) = get(&h.router, "/api/updates").await;
    assert_eq!(json["time"], (T0 + 3.0 * 3600.0) * 1000.0);
    assert_eq!(h.state.world.lock().await.timer.last_tick(), UnixSeconds(T0));
}

#[tokio::test]
async fn test_forced_weather_is_reported() {
    let h = harness().await;
    force_weather(&h.router, json!("volcanic_ash")).await;
    let (_, json) = get(&h.router, "/api/updates").await;
    assert_eq!(json["weather"], "volcanic_ash");

    let (status, json) = get(&h.router, "/api/admin/overrides").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["overrides"]["weather"], "volcanic_ash");
    assert_eq!(json["weather"], "volcanic_ash");
    assert_eq!(json["weather_types"].as_array().unwrap().len(), 15);
    assert_eq!(json["weather_types"][0], "sunny");
}
