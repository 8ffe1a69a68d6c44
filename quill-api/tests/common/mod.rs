//! Shared helpers for HTTP-level tests: router construction mirroring
//! `main.rs`, `oneshot` request helpers, and cookie plumbing.

use axum::{
    Router,
    body::Body,
    http::{Request, Response, StatusCode, header},
};
use http_body_util::BodyExt;
use quill_api::server::{self, ServerState};
use quill_db::client::DbClient;
use sqlx::PgPool;
use std::sync::Arc;
use tower::ServiceExt;

pub fn build_test_app(pool: PgPool) -> Router {
    let state = ServerState {
        db_client: Arc::new(DbClient::new(pool)),
    };

    server::routes().with_state(state)
}

pub async fn send(app: Router, request: Request<Body>) -> Response<Body> {
    app.oneshot(request).await.expect("request should succeed")
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    send(app, request).await
}

pub async fn get_with_cookie(app: Router, uri: &str, cookie: &str) -> Response<Body> {
    let request = Request::builder()
        .uri(uri)
        .header(header::COOKIE, cookie)
        .body(Body::empty())
        .unwrap();
    send(app, request).await
}

pub async fn get_with_bearer(app: Router, uri: &str, token: &str) -> Response<Body> {
    let request = Request::builder()
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap();
    send(app, request).await
}

/// Values must not need percent-encoding; the tests only submit simple
/// identifiers.
pub async fn post_form(app: Router, uri: &str, fields: &[(&str, &str)]) -> Response<Body> {
    let body = fields
        .iter()
        .map(|(name, value)| format!("{name}={value}"))
        .collect::<Vec<_>>()
        .join("&");

    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body))
        .unwrap();
    send(app, request).await
}

pub async fn post_json(
    app: Router,
    uri: &str,
    cookie: Option<&str>,
    body: serde_json::Value,
) -> Response<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }

    let request = builder.body(Body::from(body.to_string())).unwrap();
    send(app, request).await
}

pub async fn body_string(response: Response<Body>) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

pub fn location(response: &Response<Body>) -> &str {
    response
        .headers()
        .get(header::LOCATION)
        .expect("response should carry a location header")
        .to_str()
        .unwrap()
}

pub fn set_cookies(response: &Response<Body>) -> Vec<String> {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .map(|value| value.to_str().unwrap().to_owned())
        .collect()
}

/// The `name=value` pair of a freshly set cookie, ready to send back.
fn cookie_pair(response: &Response<Body>, name: &str) -> String {
    set_cookies(response)
        .into_iter()
        .find(|cookie| cookie.starts_with(&format!("{name}=")))
        .unwrap_or_else(|| panic!("no {name} cookie was set"))
        .split(';')
        .next()
        .unwrap()
        .to_owned()
}

pub fn session_cookie(response: &Response<Body>) -> String {
    cookie_pair(response, "session")
}

pub fn notice_cookie(response: &Response<Body>) -> String {
    cookie_pair(response, "notice")
}

pub async fn register(app: &Router, username: &str, email: &str, password: &str) {
    let response = post_form(
        app.clone(),
        "/register",
        &[
            ("username", username),
            ("email", email),
            ("password", password),
        ],
    )
    .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
}

/// Register and log in, returning the session cookie pair.
pub async fn register_and_login(
    app: &Router,
    username: &str,
    email: &str,
    password: &str,
) -> String {
    register(app, username, email, password).await;

    let response = post_form(
        app.clone(),
        "/login",
        &[("username", username), ("password", password)],
    )
    .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), format!("/{username}"));

    session_cookie(&response)
}
