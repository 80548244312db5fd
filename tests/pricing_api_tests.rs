mod common;

use axum::http::StatusCode;
use chrono::{Duration, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde_json::{json, Value};
use std::str::FromStr;

use crate::common::{build_test_router, reference, send, setup_pricing, setup_seeded};

fn decimal(value: &Value) -> Decimal {
    match value {
        Value::String(s) => Decimal::from_str(s).unwrap(),
        Value::Number(n) => Decimal::from_str(&n.to_string()).unwrap(),
        other => panic!("expected a decimal, got {}", other),
    }
}

#[tokio::test]
async fn test_health() {
    let app = build_test_router(setup_pricing().pricing);

    let (status, body) = send(&app, "GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["sweeper"], "idle");
}

#[tokio::test]
async fn test_refresh_and_list_catalog() {
    let ctx = setup_pricing();
    ctx.source.set_prices(vec![
        reference("m1", "acme", dec!(10)),
        reference("m2", "acme", dec!(2)),
    ]);
    let app = build_test_router(ctx.pricing);

    let (status, body) = send(&app, "POST", "/api/catalog/refresh", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["fetched"], 2);
    assert_eq!(body["created"], 2);

    let (status, body) = send(&app, "GET", "/api/catalog", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 2);
    let m1 = &body["items"][0];
    assert_eq!(m1["id"], "m1");
    assert_eq!(decimal(&m1["suggestedPrice"]), dec!(12.70));
    assert_eq!(decimal(&m1["actualPrice"]), dec!(12.70));
}

#[tokio::test]
async fn test_refresh_failure_is_service_unavailable() {
    let ctx = setup_pricing();
    ctx.source.set_failure("feed down");
    let app = build_test_router(ctx.pricing);

    let (status, body) = send(&app, "POST", "/api/catalog/refresh", None).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["code"], "UNAVAILABLE");

    let (_, body) = send(&app, "GET", "/api/catalog", None).await;
    assert_eq!(body["count"], 0);
}

#[tokio::test]
async fn test_set_prices_rejects_whole_batch() {
    let ctx = setup_seeded(vec![reference("m1", "acme", dec!(10))]).await;
    let app = build_test_router(ctx.pricing);

    let (status, body) = send(
        &app,
        "PUT",
        "/api/catalog/prices",
        Some(json!({ "prices": { "m1": "11", "ghost": "3" } })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "NOT_FOUND");

    let (status, _) = send(
        &app,
        "PUT",
        "/api/catalog/prices",
        Some(json!({ "prices": { "m1": "-1" } })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(
        &app,
        "PUT",
        "/api/catalog/prices",
        Some(json!({ "prices": { "m1": "11" } })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["updated"], 1);

    let (_, body) = send(&app, "GET", "/api/history?item_id=m1", None).await;
    assert_eq!(body["count"], 2);
    assert_eq!(body["entries"][0]["changeSource"], "manual");
    assert_eq!(decimal(&body["entries"][0]["newPrice"]), dec!(11));
}

#[tokio::test]
async fn test_settings_round_trip() {
    let ctx = setup_seeded(vec![reference("m1", "acme", dec!(10))]).await;
    let app = build_test_router(ctx.pricing);

    let (status, body) = send(&app, "GET", "/api/settings", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(decimal(&body["percentageMarkup"]), dec!(25));
    assert_eq!(decimal(&body["flatFeeMarkup"]), dec!(0.2));

    let (status, body) = send(
        &app,
        "PUT",
        "/api/settings",
        Some(json!({ "percentageMarkup": "30" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(decimal(&body["percentageMarkup"]), dec!(30));
    assert_eq!(decimal(&body["flatFeeMarkup"]), dec!(0.2));

    let (_, body) = send(&app, "GET", "/api/catalog", None).await;
    assert_eq!(decimal(&body["items"][0]["suggestedPrice"]), dec!(13.20));
    assert_eq!(decimal(&body["items"][0]["actualPrice"]), dec!(12.70));

    let (status, body) = send(
        &app,
        "PUT",
        "/api/settings",
        Some(json!({ "flatFeeMarkup": "-0.5" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "INVALID_ARGUMENT");

    let (status, _) = send(&app, "PUT", "/api/settings", Some(json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_scheduled_change_lifecycle() {
    let ctx = setup_seeded(vec![reference("m1", "acme", dec!(10))]).await;
    let app = build_test_router(ctx.pricing);
    let effective_at = (Utc::now() + Duration::hours(1)).to_rfc3339();

    let (status, created) = send(
        &app,
        "POST",
        "/api/scheduled-changes",
        Some(json!({ "itemId": "m1", "scheduledPrice": "15.00", "effectiveAt": effective_at })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["applied"], false);
    let id = created["id"].as_i64().unwrap();

    let (status, body) = send(&app, "GET", "/api/scheduled-changes?item_id=m1", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 1);
    assert_eq!(body["changes"][0]["itemName"], "m1 (acme)");
    assert_eq!(decimal(&body["changes"][0]["currentPrice"]), dec!(12.70));

    let uri = format!("/api/scheduled-changes/{}/apply", id);
    let (status, item) = send(&app, "POST", &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(decimal(&item["actualPrice"]), dec!(15.00));

    let (status, body) = send(&app, "POST", &uri, None).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "FAILED_PRECONDITION");

    // Applied changes cannot be cancelled and drop out of the pending list
    let uri = format!("/api/scheduled-changes/{}", id);
    let (status, _) = send(&app, "DELETE", &uri, None).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (_, body) = send(&app, "GET", "/api/scheduled-changes", None).await;
    assert_eq!(body["count"], 0);
}

#[tokio::test]
async fn test_create_scheduled_change_validation() {
    let ctx = setup_seeded(vec![reference("m1", "acme", dec!(10))]).await;
    let app = build_test_router(ctx.pricing);
    let future = (Utc::now() + Duration::hours(1)).to_rfc3339();
    let past = (Utc::now() - Duration::minutes(1)).to_rfc3339();

    let (status, _) = send(
        &app,
        "POST",
        "/api/scheduled-changes",
        Some(json!({ "itemId": "m1", "scheduledPrice": "15", "effectiveAt": past })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        &app,
        "POST",
        "/api/scheduled-changes",
        Some(json!({ "itemId": "m1", "scheduledPrice": "-1", "effectiveAt": future })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        &app,
        "POST",
        "/api/scheduled-changes",
        Some(json!({ "itemId": "ghost", "scheduledPrice": "1", "effectiveAt": future })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_cancel_pending_change() {
    let ctx = setup_seeded(vec![reference("m1", "acme", dec!(10))]).await;
    let app = build_test_router(ctx.pricing);
    let effective_at = (Utc::now() + Duration::hours(1)).to_rfc3339();

    let (_, created) = send(
        &app,
        "POST",
        "/api/scheduled-changes",
        Some(json!({ "itemId": "m1", "scheduledPrice": "1", "effectiveAt": effective_at })),
    )
    .await;
    let uri = format!("/api/scheduled-changes/{}", created["id"]);

    let (status, body) = send(&app, "DELETE", &uri, None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert_eq!(body, Value::Null);

    let (status, _) = send(&app, "DELETE", &uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app, "DELETE", "/api/scheduled-changes/9999", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_apply_due_applies_past_changes() {
    let ctx = setup_seeded(vec![
        reference("m1", "acme", dec!(10)),
        reference("m2", "acme", dec!(10)),
    ])
    .await;
    let now = Utc::now();
    ctx.pricing
        .registry()
        .create_at("m1", dec!(8), now - Duration::minutes(5), now - Duration::hours(1))
        .await
        .unwrap();
    ctx.pricing
        .create_scheduled_change("m2", dec!(9), now + Duration::hours(1))
        .await
        .unwrap();
    let app = build_test_router(ctx.pricing);

    let (status, body) = send(&app, "POST", "/api/scheduled-changes/apply-due", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["applied"], 1);
    assert_eq!(body["report"]["due"], 1);
    assert_eq!(body["report"]["failedIds"], json!([]));

    let (_, body) = send(&app, "GET", "/api/scheduled-changes", None).await;
    assert_eq!(body["count"], 1);
    assert_eq!(body["changes"][0]["itemId"], "m2");

    let (_, body) = send(&app, "GET", "/api/history?item_id=m1&limit=1", None).await;
    assert_eq!(body["count"], 1);
    assert_eq!(body["entries"][0]["changeSource"], "scheduled");
}

#[tokio::test]
async fn test_history_unknown_item_is_not_found() {
    let app = build_test_router(setup_pricing().pricing);

    let (status, body) = send(&app, "GET", "/api/history?item_id=ghost", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "NOT_FOUND");
}
