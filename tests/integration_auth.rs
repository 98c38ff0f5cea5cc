mod common;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::json;
use tower::ServiceExt;

use common::{app, register, send, test_state, TEST_SECRET};
use tickethub::models::user::Role;
use tickethub::services::auth_service;
use tickethub::services::token_service::JwtService;

#[tokio::test]
async fn register_and_login_round_trip() {
    let state = test_state().await;
    let app = app(&state);

    let (status, body) = send(
        &app,
        "POST",
        "/api/auth/register",
        None,
        Some(json!({
            "name": "Alice",
            "email": "a@x.com",
            "password": "secret1",
            "role": "consultant",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["success"], json!(true));
    assert_eq!(body["user"]["name"], json!("Alice"));
    assert_eq!(body["user"]["email"], json!("a@x.com"));
    assert_eq!(body["user"]["role"], json!("consultant"));
    assert!(body["user"].get("passwordHash").is_none());

    let (status, body) = send(
        &app,
        "POST",
        "/api/auth/login",
        None,
        Some(json!({ "email": "a@x.com", "password": "secret1" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    // The issued token decodes back to the stored identity.
    let token = body["token"].as_str().unwrap();
    let verifier = JwtService::new(TEST_SECRET, 3600, false);
    let decoded = verifier.verify(token).unwrap();
    assert_eq!(decoded.id, body["user"]["id"].as_i64().unwrap());
    assert_eq!(decoded.email, "a@x.com");
    assert_eq!(decoded.role, Role::Consultant);
}

#[tokio::test]
async fn duplicate_email_is_rejected_without_a_token() {
    let state = test_state().await;
    let app = app(&state);

    register(&app, "Alice", "a@x.com", "consultant").await;

    let (status, body) = send(
        &app,
        "POST",
        "/api/auth/register",
        None,
        Some(json!({
            "name": "Other",
            "email": "a@x.com",
            "password": "secret2",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], json!(false));
    assert!(body.get("token").is_none());
}

#[tokio::test]
async fn registration_validates_input() {
    let state = test_state().await;
    let app = app(&state);

    for body in [
        json!({ "email": "a@x.com", "password": "secret1" }),
        json!({ "name": "A", "password": "secret1" }),
        json!({ "name": "A", "email": "a@x.com" }),
        json!({ "name": "A", "email": "not-an-email", "password": "secret1" }),
        json!({ "name": "A", "email": "a@x.com", "password": "short" }),
    ] {
        let (status, _) = send(&app, "POST", "/api/auth/register", None, Some(body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}

#[tokio::test]
async fn email_is_normalized_to_lowercase() {
    let state = test_state().await;
    let app = app(&state);

    let (status, body) = send(
        &app,
        "POST",
        "/api/auth/register",
        None,
        Some(json!({ "name": "A", "email": "Alice@Example.COM", "password": "secret1" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["user"]["email"], json!("alice@example.com"));

    let (status, _) = send(
        &app,
        "POST",
        "/api/auth/login",
        None,
        Some(json!({ "email": "alice@example.com", "password": "secret1" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn login_failures() {
    let state = test_state().await;
    let app = app(&state);
    register(&app, "Alice", "a@x.com", "consultant").await;

    // missing fields
    let (status, _) = send(
        &app,
        "POST",
        "/api/auth/login",
        None,
        Some(json!({ "email": "a@x.com" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // wrong password and unknown email look the same
    let (status, body) = send(
        &app,
        "POST",
        "/api/auth/login",
        None,
        Some(json!({ "email": "a@x.com", "password": "wrong-1" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], json!("Invalid credentials"));

    let (status, _) = send(
        &app,
        "POST",
        "/api/auth/login",
        None,
        Some(json!({ "email": "nobody@x.com", "password": "secret1" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn me_returns_the_current_user() {
    let state = test_state().await;
    let app = app(&state);
    let (token, id) = register(&app, "Alice", "a@x.com", "manager").await;

    let (status, body) = send(&app, "GET", "/api/auth/me", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["id"].as_i64(), Some(id));
    assert_eq!(body["user"]["role"], json!("manager"));
    assert!(body["user"].get("passwordHash").is_none());
}

#[tokio::test]
async fn bearer_token_is_required() {
    let state = test_state().await;
    let app = app(&state);

    // no header
    let (status, body) = send(&app, "GET", "/api/auth/me", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["success"], json!(false));

    // header present but not Bearer: same rejection, not a pass-through
    let request = Request::builder()
        .method("GET")
        .uri("/api/auth/me")
        .header(header::AUTHORIZATION, "Token abc")
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["error"], json!("Not authorized, no token"));

    // garbage bearer token
    let (status, _) = send(&app, "GET", "/api/auth/me", Some("nope.nope.nope"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn password_change_rehashes() {
    let state = test_state().await;
    let app = app(&state);
    let (_, id) = register(&app, "Alice", "a@x.com", "consultant").await;

    auth_service::set_password(&state.pool, id, "new-secret")
        .await
        .unwrap();

    let (status, _) = send(
        &app,
        "POST",
        "/api/auth/login",
        None,
        Some(json!({ "email": "a@x.com", "password": "secret1" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(
        &app,
        "POST",
        "/api/auth/login",
        None,
        Some(json!({ "email": "a@x.com", "password": "new-secret" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}
