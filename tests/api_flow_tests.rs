// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! End-to-end API tests through the router against the Firestore emulator.
//!
//! These cover handler wiring: member resolution from the token, status
//! codes and response shapes. Skipped unless `FIRESTORE_EMULATOR_HOST` is set.

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use chrono::{Duration, Utc};
use serde_json::{json, Value};
use sharenest::db::NewTask;
use sharenest::models::TaskCategory;
use sharenest::AppState;
use std::sync::Arc;
use tower::ServiceExt;

mod common;
use common::unique_id;

/// Send a request as `user_id` and return the status and JSON body.
async fn call(
    app: &Router,
    state: &Arc<AppState>,
    user_id: &str,
    method: &str,
    uri: &str,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let token = common::create_test_jwt(user_id, &state.config.jwt_signing_key);
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {}", token));
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

async fn register(app: &Router, state: &Arc<AppState>, prefix: &str) -> String {
    let user_id = unique_id(prefix);
    let (status, body) = call(
        app,
        state,
        &user_id,
        "POST",
        "/api/me",
        Some(json!({ "email": format!("{user_id}@example.com") })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    user_id
}

/// Create a flat as `admin` and return its JSON.
async fn create_flat(app: &Router, state: &Arc<AppState>, admin: &str, max: u32) -> Value {
    let (status, flat) = call(
        app,
        state,
        admin,
        "POST",
        "/api/flats",
        Some(json!({ "name": "Router WG", "max_roommates": max })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{flat}");
    flat
}

#[tokio::test]
async fn test_join_flat_through_router() {
    require_emulator!();

    let (app, state) = common::create_emulator_app().await;
    let admin = register(&app, &state, "admin").await;
    let member = register(&app, &state, "member").await;
    let late = register(&app, &state, "late").await;

    let flat = create_flat(&app, &state, &admin, 2).await;
    let code = flat["invite_code"].as_str().unwrap().to_string();

    // Codes are accepted case-insensitively with surrounding whitespace
    let (status, joined) = call(
        &app,
        &state,
        &member,
        "POST",
        "/api/flats/join",
        Some(json!({ "invite_code": format!(" {} ", code.to_lowercase()) })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{joined}");
    assert_eq!(joined["id"], flat["id"]);
    assert_eq!(joined["members"], json!([admin, member]));

    let (status, body) = call(
        &app,
        &state,
        &late,
        "POST",
        "/api/flats/join",
        Some(json!({ "invite_code": code })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["details"], "flat full");

    let (status, me) = call(&app, &state, &member, "GET", "/api/me", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["flat_id"], flat["id"]);
    assert_eq!(me["is_admin"], false);
}

#[tokio::test]
async fn test_flat_routes_require_membership() {
    require_emulator!();

    let (app, state) = common::create_emulator_app().await;
    let loner = register(&app, &state, "loner").await;

    let (status, body) = call(&app, &state, &loner, "GET", "/api/flat/tasks", None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "forbidden");

    let (status, _) = call(&app, &state, &unique_id("ghost"), "GET", "/api/flat", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_complete_task_through_router() {
    require_emulator!();

    let (app, state) = common::create_emulator_app().await;
    let admin = register(&app, &state, "admin").await;
    let member = register(&app, &state, "member").await;
    let flat = create_flat(&app, &state, &admin, 4).await;
    let code = flat["invite_code"].as_str().unwrap();
    let (status, _) = call(
        &app,
        &state,
        &member,
        "POST",
        "/api/flats/join",
        Some(json!({ "invite_code": code })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, created) = call(
        &app,
        &state,
        &member,
        "POST",
        "/api/flat/tasks",
        Some(json!({ "name": "Dishes", "category": "cleaning", "rotation_days": 2, "points": 15 })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{created}");
    assert_eq!(created["task"]["assigned_to"], json!(admin));
    assert_eq!(created["task"]["status"], "pending");
    assert_eq!(created["rotation"]["current_index"], 0);
    let task_id = created["task"]["id"].as_str().unwrap().to_string();
    let complete_uri = format!("/api/flat/tasks/{task_id}/complete");

    let (status, _) = call(&app, &state, &member, "POST", &complete_uri, None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, done) = call(&app, &state, &admin, "POST", &complete_uri, None).await;
    assert_eq!(status, StatusCode::OK, "{done}");
    assert_eq!(done["points_awarded"], 15);
    assert_eq!(done["total_points"], 15);
    assert_eq!(done["task"]["status"], "completed");
    assert!(done["task"]["completed_at"].is_string());

    let (status, _) = call(&app, &state, &admin, "POST", &complete_uri, None).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, me) = call(&app, &state, &admin, "GET", "/api/me", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["points"], 15);

    let (status, _) = call(
        &app,
        &state,
        &admin,
        "POST",
        "/api/flat/tasks/no-such-task/complete",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_rotation_check_through_router() {
    require_emulator!();

    let (app, state) = common::create_emulator_app().await;
    let admin = register(&app, &state, "admin").await;
    let member = register(&app, &state, "member").await;
    let flat = create_flat(&app, &state, &admin, 4).await;
    let flat_id = flat["id"].as_str().unwrap();
    let code = flat["invite_code"].as_str().unwrap();
    let (status, _) = call(
        &app,
        &state,
        &member,
        "POST",
        "/api/flats/join",
        Some(json!({ "invite_code": code })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, report) = call(&app, &state, &admin, "POST", "/api/flat/rotations/check", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(report, json!({ "created": [], "skipped": 0, "failed": [] }));

    // A task created two days ago with a one-day period is already due
    let past = Utc::now() - Duration::days(2);
    let new_task = NewTask {
        name: "Trash".to_string(),
        category: TaskCategory::Trash,
        rotation_days: 1,
        points: 10,
    };
    let (_, rotation) = state
        .db
        .create_task_atomic(flat_id, &admin, &new_task, unique_id("task"), past)
        .await
        .unwrap();

    let (status, report) = call(&app, &state, &member, "POST", "/api/flat/rotations/check", None).await;
    assert_eq!(status, StatusCode::OK, "{report}");
    let created = report["created"].as_array().unwrap();
    assert_eq!(created.len(), 1);
    assert_eq!(created[0]["assigned_to"], json!(member));
    assert_eq!(created[0]["rotation_id"], json!(rotation.id));
    assert_eq!(created[0]["status"], "pending");
    assert_eq!(report["failed"], json!([]));

    // Already advanced; nothing more to do
    let (status, report) = call(&app, &state, &admin, "POST", "/api/flat/rotations/check", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(report["created"], json!([]));

    let (status, tasks) = call(&app, &state, &member, "GET", "/api/flat/tasks", None).await;
    assert_eq!(status, StatusCode::OK);
    let open = tasks["tasks"].as_array().unwrap();
    assert!(open
        .iter()
        .any(|t| t["assigned_to"] == json!(member) && t["rotation_id"] == json!(rotation.id)));
}
