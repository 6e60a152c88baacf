// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! API input validation tests.
//!
//! Every request here is rejected before the database is touched, so the
//! offline mock never gets a chance to turn them into 500s.

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use tower::ServiceExt;

mod common;

fn authed_app() -> (Router, String) {
    let (app, state) = common::create_test_app();
    let token = common::create_test_jwt("user-1", &state.config.jwt_signing_key);
    (app, token)
}

async fn post_json(uri: &str, body: &str) -> StatusCode {
    let (app, token) = authed_app();

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header(header::AUTHORIZATION, format!("Bearer {}", token))
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    response.status()
}

async fn get(uri: &str) -> StatusCode {
    let (app, token) = authed_app();

    let response = app
        .oneshot(
            Request::builder()
                .method("GET")
                .uri(uri)
                .header(header::AUTHORIZATION, format!("Bearer {}", token))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    response.status()
}

#[tokio::test]
async fn test_register_invalid_email() {
    let status = post_json("/api/me", r#"{"email": "not-an-email"}"#).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_flat_name_blank() {
    let status = post_json("/api/flats", r#"{"name": "   ", "max_roommates": 4}"#).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_flat_name_too_long() {
    let body = format!(r#"{{"name": "{}", "max_roommates": 4}}"#, "a".repeat(101));
    let status = post_json("/api/flats", &body).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_flat_capacity_out_of_range() {
    for max_roommates in [0, 1, 21, 100] {
        let body = format!(r#"{{"name": "WG", "max_roommates": {max_roommates}}}"#);
        let status = post_json("/api/flats", &body).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "max_roommates={max_roommates}");
    }
}

#[tokio::test]
async fn test_join_malformed_invite_code() {
    for code in ["", "ABC12", "ABC1234", "AB-123", "ÄBC123"] {
        let body = format!(r#"{{"invite_code": "{code}"}}"#);
        let status = post_json("/api/flats/join", &body).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "code={code:?}");
    }
}

#[tokio::test]
async fn test_task_rotation_days_zero() {
    let status = post_json(
        "/api/flat/tasks",
        r#"{"name": "Trash", "category": "trash", "rotation_days": 0}"#,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_task_points_zero() {
    let status = post_json(
        "/api/flat/tasks",
        r#"{"name": "Trash", "category": "trash", "rotation_days": 7, "points": 0}"#,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_task_name_blank() {
    let status = post_json(
        "/api/flat/tasks",
        r#"{"name": " ", "category": "cleaning", "rotation_days": 7}"#,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_complete_task_with_encoded_slash() {
    let status = post_json("/api/flat/tasks/abc%2Fdef/complete", "").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_expense_amount_not_positive() {
    for amount in ["0", "-5.5"] {
        let body = format!(r#"{{"title": "Soap", "amount": {amount}, "category": "cleaning"}}"#);
        let status = post_json("/api/flat/expenses", &body).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "amount={amount}");
    }
}

#[tokio::test]
async fn test_expense_title_blank() {
    let status = post_json(
        "/api/flat/expenses",
        r#"{"title": "  ", "amount": 12.5, "category": "food"}"#,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_monthly_total_invalid_month() {
    assert_eq!(
        get("/api/flat/expenses/total?month=13&year=2024").await,
        StatusCode::BAD_REQUEST
    );
    assert_eq!(
        get("/api/flat/expenses/total?month=0&year=2024").await,
        StatusCode::BAD_REQUEST
    );
}

#[tokio::test]
async fn test_monthly_total_year_out_of_range() {
    assert_eq!(
        get("/api/flat/expenses/total?month=3&year=1999").await,
        StatusCode::BAD_REQUEST
    );
}

#[tokio::test]
async fn test_expense_list_month_without_year() {
    assert_eq!(
        get("/api/flat/expenses?month=3").await,
        StatusCode::BAD_REQUEST
    );
}
