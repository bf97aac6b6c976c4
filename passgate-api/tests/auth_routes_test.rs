/// HTTP tests for the authentication routes
///
/// These tests drive the full router: CORS, tracing, directory attachment,
/// strategy guards and handlers.

mod common;

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::{middleware, routing::get, Extension, Router};
use common::{bearer_request, login_request, read_json, TestContext, LOGIN, PASSWORD, SECRET, USER_ID};
use passgate_shared::auth::middleware::{require, AuthenticatedUser, Authenticator};
use passgate_shared::auth::strategy::StrategyName;
use serde_json::json;
use tower::Service as _;

#[tokio::test]
async fn test_health_check() {
    let mut ctx = TestContext::new();

    let request = Request::builder().uri("/health").body(Body::empty()).unwrap();
    let (status, body) = read_json(ctx.send(request).await).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn test_login_issues_token_pair() {
    let mut ctx = TestContext::new();

    let response = ctx
        .send(login_request(json!({ "login": LOGIN, "password": PASSWORD })))
        .await;
    let (status, body) = read_json(response).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["id"], USER_ID);
    assert_eq!(body["user"]["login"], LOGIN);
    assert_eq!(body["user"]["name"], "Alice");

    let codec = ctx.state.codec();
    let access = codec
        .decode_and_verify(body["access_token"].as_str().unwrap())
        .unwrap();
    let refresh = codec
        .decode_and_verify(body["refresh_token"].as_str().unwrap())
        .unwrap();

    assert_eq!(access.id, USER_ID);
    assert_eq!(access.is_refresh, None);
    assert_eq!(refresh.id, USER_ID);
    assert_eq!(refresh.is_refresh, Some(true));
}

#[tokio::test]
async fn test_login_from_query_string() {
    let mut ctx = TestContext::new();

    let request = Request::builder()
        .method("POST")
        .uri(format!("/v1/auth/login?login={}&password={}", LOGIN, PASSWORD))
        .body(Body::empty())
        .unwrap();
    let (status, body) = read_json(ctx.send(request).await).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["id"], USER_ID);
}

#[tokio::test]
async fn test_login_from_form_body() {
    let mut ctx = TestContext::new();

    let request = Request::builder()
        .method("POST")
        .uri("/v1/auth/login")
        .header("content-type", "application/x-www-form-urlencoded")
        .body(Body::from(format!("login={}&password={}", LOGIN, PASSWORD)))
        .unwrap();
    let (status, body) = read_json(ctx.send(request).await).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["id"], USER_ID);
    assert!(body["access_token"].is_string());
}

#[tokio::test]
async fn test_login_wrong_password() {
    let mut ctx = TestContext::new();

    let response = ctx
        .send(login_request(json!({ "login": LOGIN, "password": "looking-glass" })))
        .await;
    let (status, body) = read_json(response).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "INVALID_ARGUMENTS");
    assert_eq!(body["message"], "Invalid login or password");
    assert_eq!(body["fields"], json!(["login", "password"]));
}

#[tokio::test]
async fn test_login_unknown_user() {
    let mut ctx = TestContext::new();

    let response = ctx
        .send(login_request(json!({ "login": "bob", "password": PASSWORD })))
        .await;
    let (status, body) = read_json(response).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "INVALID_ARGUMENTS");
}

#[tokio::test]
async fn test_login_missing_credentials() {
    let mut ctx = TestContext::new();

    let (status, body) = read_json(ctx.send(login_request(json!({ "login": LOGIN }))).await).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "INVALID_AUTH");
    assert!(body.get("fields").is_none());
}

#[tokio::test]
async fn test_me_with_access_token() {
    let mut ctx = TestContext::new();
    let token = ctx.access_token();

    let (status, body) = read_json(ctx.send(bearer_request("GET", "/v1/auth/me", &token)).await).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], USER_ID);
    assert_eq!(body["login"], LOGIN);
}

#[tokio::test]
async fn test_me_rejects_refresh_token() {
    let mut ctx = TestContext::new();
    let token = ctx.refresh_token();

    let (status, body) = read_json(ctx.send(bearer_request("GET", "/v1/auth/me", &token)).await).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "INVALID_AUTH_TOKEN");
    assert_eq!(body["message"], "Invalid access token");
}

#[tokio::test]
async fn test_me_without_token() {
    let mut ctx = TestContext::new();

    let request = Request::builder().uri("/v1/auth/me").body(Body::empty()).unwrap();
    let (status, body) = read_json(ctx.send(request).await).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "INVALID_AUTH");
    assert_eq!(body["message"], "No auth token");
}

#[tokio::test]
async fn test_me_with_malformed_token() {
    let mut ctx = TestContext::new();

    let (status, body) = read_json(
        ctx.send(bearer_request("GET", "/v1/auth/me", "not.a.token"))
            .await,
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "INVALID_AUTH");
}

#[tokio::test]
async fn test_refresh_issues_new_pair() {
    let mut ctx = TestContext::new();
    let token = ctx.refresh_token();

    let (status, body) = read_json(
        ctx.send(bearer_request("POST", "/v1/auth/refresh", &token))
            .await,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["id"], USER_ID);

    let refresh = ctx
        .state
        .codec()
        .decode_and_verify(body["refresh_token"].as_str().unwrap())
        .unwrap();
    assert_eq!(refresh.is_refresh, Some(true));
}

#[tokio::test]
async fn test_refresh_rejects_access_token() {
    let mut ctx = TestContext::new();
    let token = ctx.access_token();

    let (status, body) = read_json(
        ctx.send(bearer_request("POST", "/v1/auth/refresh", &token))
            .await,
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "INVALID_AUTH_TOKEN");
    assert_eq!(body["message"], "Invalid refresh token");
}

#[tokio::test]
async fn test_guard_without_application() {
    let auth = Arc::new(Authenticator::from_secret(SECRET));
    let token = auth
        .codec()
        .mint_access_token(&passgate_shared::auth::identity::Identity::new(USER_ID))
        .unwrap();

    async fn handler(Extension(AuthenticatedUser(user)): Extension<AuthenticatedUser>) -> String {
        user.id
    }

    let mut app: Router = Router::new()
        .route("/me", get(handler))
        .route_layer(middleware::from_fn(require(auth, StrategyName::Jwt)));

    let response = app.call(bearer_request("GET", "/me", &token)).await.unwrap();
    let (status, body) = read_json(response).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["code"], "INTERNAL");
    assert_eq!(body["message"], "ApplicationManager is not provided");
}
