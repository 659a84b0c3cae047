//! Server API tests

use super::*;
use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use chrono::NaiveDate;
use http_body_util::BodyExt;
use subtrack_core::{FixedClock, Frequency, NewSubscription};
use tower::ServiceExt;

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 1, 10).unwrap()
}

fn setup_test_app() -> (Router, Database) {
    let db = Database::in_memory().unwrap();
    let app = create_router_with_clock(
        db.clone(),
        AppConfig::default(),
        Arc::new(FixedClock(today())),
    );
    (app, db)
}

fn add_subscription(db: &Database, user: &str, name: &str, due: Option<&str>) -> i64 {
    db.create_subscription(
        user,
        &NewSubscription {
            name: name.into(),
            amount: 10.0,
            frequency: Frequency::Monthly,
            due_date: due.map(String::from),
        },
    )
    .unwrap()
    .id
}

async fn get_body_json(response: axum::response::Response) -> serde_json::Value {
    let body = response.into_body();
    let bytes = body.collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn json_request(method: &str, uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get_request(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

// ========== Health / Headers ==========

#[tokio::test]
async fn test_health() {
    let (app, _) = setup_test_app();
    let response = app.oneshot(get_request("/api/health")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get("x-content-type-options").unwrap(),
        "nosniff"
    );
    assert_eq!(response.headers().get("x-frame-options").unwrap(), "DENY");

    let json = get_body_json(response).await;
    assert_eq!(json["status"], "ok");
}

// ========== Subscription API Tests ==========

#[tokio::test]
async fn test_create_and_get_subscription() {
    let (app, _) = setup_test_app();

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/subscriptions",
            serde_json::json!({
                "user_id": "alice",
                "name": "Netflix",
                "amount": 15.99,
                "frequency": "monthly",
                "due_date": "2026-02-01T00:00:00.000Z"
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let created = get_body_json(response).await;
    assert_eq!(created["user_id"], "alice");
    assert_eq!(created["due_date"], "2026-02-01");
    let id = created["id"].as_i64().unwrap();

    let response = app
        .oneshot(get_request(&format!("/api/subscriptions/{}", id)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = get_body_json(response).await;
    assert_eq!(json["name"], "Netflix");
}

#[tokio::test]
async fn test_create_subscription_unknown_frequency_defaults_monthly() {
    let (app, _) = setup_test_app();

    let response = app
        .oneshot(json_request(
            "POST",
            "/api/subscriptions",
            serde_json::json!({"name": "Gym", "amount": 30, "frequency": "weekly"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = get_body_json(response).await;
    assert_eq!(json["frequency"], "monthly");
    assert_eq!(json["user_id"], "local");
}

#[tokio::test]
async fn test_create_subscription_invalid_due_date() {
    let (app, _) = setup_test_app();

    let response = app
        .oneshot(json_request(
            "POST",
            "/api/subscriptions",
            serde_json::json!({"name": "Gym", "amount": 30, "frequency": "monthly", "due_date": "next week"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let json = get_body_json(response).await;
    assert!(json["error"].as_str().unwrap().contains("next week"));
}

#[tokio::test]
async fn test_list_subscriptions_sorted_by_due_date() {
    let (app, db) = setup_test_app();
    add_subscription(&db, "alice", "Undated", None);
    add_subscription(&db, "alice", "March", Some("2026-03-01"));
    add_subscription(&db, "alice", "January", Some("2026-01-20"));
    add_subscription(&db, "bob", "Other user", Some("2026-01-01"));

    let response = app
        .oneshot(get_request("/api/subscriptions?user_id=alice"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = get_body_json(response).await;
    let names: Vec<&str> = json
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["January", "March", "Undated"]);
}

#[tokio::test]
async fn test_update_subscription() {
    let (app, db) = setup_test_app();
    let id = add_subscription(&db, "local", "Hulu", Some("2026-01-20"));

    let response = app
        .clone()
        .oneshot(json_request(
            "PUT",
            &format!("/api/subscriptions/{}", id),
            serde_json::json!({"amount": 17.99, "frequency": "yearly"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = get_body_json(response).await;
    assert_eq!(json["amount"], 17.99);
    assert_eq!(json["frequency"], "yearly");
    assert_eq!(json["name"], "Hulu");

    let response = app
        .oneshot(json_request(
            "PUT",
            &format!("/api/subscriptions/{}", id),
            serde_json::json!({}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_delete_subscription() {
    let (app, db) = setup_test_app();
    let id = add_subscription(&db, "local", "Hulu", None);

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri(format!("/api/subscriptions/{}", id))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(db.get_subscription(id).unwrap().is_none());

    let response = app
        .oneshot(get_request(&format!("/api/subscriptions/{}", id)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_missing_subscription_is_404() {
    let (app, _) = setup_test_app();

    let response = app
        .clone()
        .oneshot(json_request(
            "PUT",
            "/api/subscriptions/999",
            serde_json::json!({"name": "Ghost"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app
        .oneshot(json_request("POST", "/api/subscriptions/999/pay", serde_json::json!({})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// ========== Payment Tests ==========

#[tokio::test]
async fn test_pay_subscription_within_window() {
    let (app, db) = setup_test_app();
    let id = add_subscription(&db, "local", "Netflix", Some("2026-01-13"));

    let response = app
        .oneshot(json_request(
            "POST",
            &format!("/api/subscriptions/{}/pay", id),
            serde_json::json!({}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = get_body_json(response).await;
    assert_eq!(json["previous_due_date"], "2026-01-13");
    assert_eq!(json["next_due_date"], "2026-02-13");
    assert_eq!(json["subscription"]["due_date"], "2026-02-13");

    let stored = db.get_subscription(id).unwrap().unwrap();
    assert_eq!(stored.due_date.as_deref(), Some("2026-02-13"));
}

#[tokio::test]
async fn test_pay_subscription_too_early_is_conflict() {
    let (app, db) = setup_test_app();
    let id = add_subscription(&db, "local", "Netflix", Some("2026-01-20"));

    let response = app
        .oneshot(json_request(
            "POST",
            &format!("/api/subscriptions/{}/pay", id),
            serde_json::json!({}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let stored = db.get_subscription(id).unwrap().unwrap();
    assert_eq!(stored.due_date.as_deref(), Some("2026-01-20"));
}

#[tokio::test]
async fn test_pay_subscription_without_due_date_is_bad_request() {
    let (app, db) = setup_test_app();
    let id = add_subscription(&db, "local", "Netflix", None);

    let response = app
        .oneshot(json_request(
            "POST",
            &format!("/api/subscriptions/{}/pay", id),
            serde_json::json!({}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// ========== Summary ==========

#[tokio::test]
async fn test_summary() {
    let (app, db) = setup_test_app();
    add_subscription(&db, "local", "Netflix", Some("2026-01-12"));
    add_subscription(&db, "local", "Spotify", Some("2026-02-01"));
    db.create_subscription(
        "local",
        &NewSubscription {
            name: "Domain".into(),
            amount: 120.0,
            frequency: Frequency::Yearly,
            due_date: Some("2026-06-01".into()),
        },
    )
    .unwrap();

    let response = app
        .oneshot(get_request("/api/subscriptions/summary"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = get_body_json(response).await;
    assert_eq!(json["monthly_count"], 2);
    assert_eq!(json["yearly_count"], 1);
    assert_eq!(json["monthly_total"], 30.0);
    assert_eq!(json["upcoming_count"], 1);
}

// ========== Detection ==========

#[tokio::test]
async fn test_detect_recurring() {
    let (app, _) = setup_test_app();

    let response = app
        .oneshot(json_request(
            "POST",
            "/api/recurring/detect",
            serde_json::json!({
                "transactions": [
                    {"amount": 9.99, "merchant_name": "Spotify", "name": "SPOTIFY", "date": "2025-10-01", "category": ["Service"]},
                    {"amount": 9.99, "merchant_name": "Spotify", "name": "SPOTIFY", "date": "2025-10-31", "category": ["Service"]},
                    {"amount": 150.0, "merchant_name": "AWS", "date": "2025-10-03"},
                    {"amount": 150.0, "merchant_name": "AWS", "date": "2025-11-02"},
                    {"amount": -9.99, "merchant_name": "Spotify", "date": "2025-11-05"},
                    {"amount": 4.50, "name": "COFFEE", "date": "2025-11-06"}
                ]
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = get_body_json(response).await;
    assert_eq!(json["analyzed"], 6);
    let recurring = json["recurring"].as_array().unwrap();
    assert_eq!(recurring.len(), 2);
    assert_eq!(recurring[0]["name"], "AWS");
    assert_eq!(recurring[0]["category"], "Other");
    assert_eq!(recurring[1]["name"], "Spotify");
    assert_eq!(recurring[1]["lastCharge"], "2025-10-31");
    assert_eq!(recurring[1]["frequency"], "monthly");
    assert_eq!(recurring[1]["occurrences"], 2);
}

#[tokio::test]
async fn test_detect_recurring_empty_body() {
    let (app, _) = setup_test_app();

    let response = app
        .oneshot(json_request("POST", "/api/recurring/detect", serde_json::json!({})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = get_body_json(response).await;
    assert_eq!(json["analyzed"], 0);
    assert!(json["recurring"].as_array().unwrap().is_empty());
}

// ========== Billing ==========

#[tokio::test]
async fn test_next_due() {
    let (app, _) = setup_test_app();

    let response = app
        .oneshot(json_request(
            "POST",
            "/api/billing/next-due",
            serde_json::json!({"due_date": "2026-01-15", "frequency": "monthly"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = get_body_json(response).await;
    assert_eq!(json["eligible"], true);
    assert_eq!(json["days_until_due"], 5);
    assert_eq!(json["grace_days"], 7);
    assert_eq!(json["next_due_date"], "2026-02-15");
}

#[tokio::test]
async fn test_next_due_yearly_not_yet_eligible() {
    let (app, _) = setup_test_app();

    let response = app
        .oneshot(json_request(
            "POST",
            "/api/billing/next-due",
            serde_json::json!({"due_date": "2026-03-01", "frequency": "yearly"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = get_body_json(response).await;
    assert_eq!(json["eligible"], false);
    assert_eq!(json["grace_days"], 30);
    assert_eq!(json["next_due_date"], "2027-03-01");
}

#[tokio::test]
async fn test_next_due_invalid_date() {
    let (app, _) = setup_test_app();

    let response = app
        .oneshot(json_request(
            "POST",
            "/api/billing/next-due",
            serde_json::json!({"frequency": "monthly"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let json = get_body_json(response).await;
    assert!(json["error"].as_str().unwrap().contains("Invalid date"));
}

// ========== Error Mapping ==========

#[test]
fn test_core_errors_map_to_status() {
    use subtrack_core::Error as CoreError;

    let cases = [
        (CoreError::InvalidDate("x".into()), StatusCode::BAD_REQUEST),
        (CoreError::InvalidData("x".into()), StatusCode::BAD_REQUEST),
        (CoreError::NotFound("x".into()), StatusCode::NOT_FOUND),
        (
            CoreError::NotYetPayable {
                days_until_due: 10,
                grace_days: 7,
            },
            StatusCode::CONFLICT,
        ),
        (CoreError::Import("x".into()), StatusCode::INTERNAL_SERVER_ERROR),
    ];

    for (err, expected) in cases {
        assert_eq!(AppError::from(err).status(), expected);
    }
}

#[tokio::test]
async fn test_internal_error_body_is_generic() {
    let err = AppError::from(anyhow::anyhow!("disk I/O error at /var/lib/subtrack.db"));
    assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let response = err.into_response();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["error"], "An internal error occurred");
}
