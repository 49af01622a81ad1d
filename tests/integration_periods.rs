mod common;

use axum::http::StatusCode;
use common::{empty_app, get, post_empty, post_json, seeded_app};
use eraport::testing::instant;
use serde_json::json;
use uuid::Uuid;

#[tokio::test]
async fn test_active_period_is_returned() {
    let (app, fixture) = seeded_app().await;

    let (status, body) = get(&app.router, "/api/periods/active").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], fixture.odd.id.to_string());
    assert_eq!(body["semester"], 1);
    assert_eq!(body["is_active"], true);
}

#[tokio::test]
async fn test_no_active_period_is_service_unavailable() {
    let app = empty_app();

    let (status, body) = get(&app.router, "/api/periods/active").await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["kind"]["kind"], "no_active_period");
}

#[tokio::test]
async fn test_active_year_lists_both_semesters_in_order() {
    let (app, fixture) = seeded_app().await;

    let (status, body) = get(&app.router, "/api/periods/active-year").await;

    assert_eq!(status, StatusCode::OK);
    let ids: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["id"].as_str().unwrap())
        .collect();
    assert_eq!(
        ids,
        [fixture.odd.id.to_string(), fixture.even.id.to_string()]
    );
}

#[tokio::test]
async fn test_period_list_includes_previous_years() {
    let (app, _) = seeded_app().await;

    let (status, body) = get(&app.router, "/api/periods").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 4);
}

#[tokio::test]
async fn test_validate_accepts_either_semester_of_the_active_year() {
    let (app, fixture) = seeded_app().await;

    for period in [&fixture.odd, &fixture.even] {
        let uri = format!("/api/periods/{}/validate", period.id);
        let (status, body) = get(&app.router, &uri).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["valid"], true);
        assert!(body.get("reason").is_none());
    }
}

#[tokio::test]
async fn test_validate_rejects_previous_year_and_unknown_periods() {
    let (app, fixture) = seeded_app().await;

    let uri = format!("/api/periods/{}/validate", fixture.previous_even.id);
    let (status, body) = get(&app.router, &uri).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["valid"], false);
    assert_eq!(body["reason"]["kind"], "period_not_editable");

    let uri = format!("/api/periods/{}/validate", Uuid::new_v4());
    let (status, body) = get(&app.router, &uri).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["valid"], false);
    assert_eq!(body["reason"]["kind"], "period_not_found");
}

#[tokio::test]
async fn test_suggested_period_follows_the_school_calendar() {
    let (app, fixture) = seeded_app().await;

    let (_, body) = get(&app.router, "/api/periods/suggested").await;
    assert_eq!(body["id"], fixture.odd.id.to_string());

    // 2026-01-04 18:00 UTC is already 5 January in WIB.
    app.clock.set(instant(2026, 1, 4, 18));
    let (status, body) = get(&app.router, "/api/periods/suggested").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], fixture.even.id.to_string());
}

#[tokio::test]
async fn test_activation_moves_the_active_year() {
    let (app, fixture) = seeded_app().await;

    // Warm the cached context first.
    let (_, before) = get(&app.router, "/api/periods/active").await;
    assert_eq!(before["id"], fixture.odd.id.to_string());

    let uri = format!("/api/periods/{}/activate", fixture.previous_even.id);
    let (status, body) = post_empty(&app.router, &uri).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["is_active"], true);

    let (_, after) = get(&app.router, "/api/periods/active").await;
    assert_eq!(after["id"], fixture.previous_even.id.to_string());

    let uri = format!("/api/periods/{}/validate", fixture.odd.id);
    let (_, validation) = get(&app.router, &uri).await;
    assert_eq!(validation["valid"], false);
}

#[tokio::test]
async fn test_activating_unknown_period_is_not_found() {
    let (app, _) = seeded_app().await;

    let uri = format!("/api/periods/{}/activate", Uuid::new_v4());
    let (status, body) = post_empty(&app.router, &uri).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["kind"]["kind"], "period_not_found");
}

#[tokio::test]
async fn test_create_period_and_reject_duplicates() {
    let (app, _) = seeded_app().await;
    let payload = json!({
        "year": "2026/2027",
        "semester": "ganjil",
        "start_date": "2026-07-13",
        "end_date": "2026-12-18"
    });

    let (status, body) = post_json(&app.router, "/api/periods", payload.clone()).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["semester"], 1);
    assert_eq!(body["is_active"], false);

    let (status, _) = post_json(&app.router, "/api/periods", payload).await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_create_period_validates_input() {
    let (app, _) = seeded_app().await;

    let (status, _) = post_json(
        &app.router,
        "/api/periods",
        json!({
            "year": "2026/2028",
            "semester": 1,
            "start_date": "2026-07-13",
            "end_date": "2026-12-18"
        }),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, _) = post_json(
        &app.router,
        "/api/periods",
        json!({
            "year": "2026/2027",
            "semester": 1,
            "start_date": "2026-12-18",
            "end_date": "2026-07-13"
        }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
