//! HTTP-level tests for the JSON API surface.

mod common;

use axum::http::StatusCode;
use common::{
    body_json, build_test_app, get, get_with_bearer, get_with_cookie, post_json,
    register_and_login,
};
use serde_json::json;
use sqlx::PgPool;

#[sqlx::test(migrations = "../quill-db/migrations")]
async fn api_requires_a_session(pool: PgPool) {
    let app = build_test_app(pool);

    let response = get(app.clone(), "/api/posts").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = post_json(app, "/api/posts", None, json!({"title": "t", "content": "c"})).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "../quill-db/migrations")]
async fn create_then_list_round_trips(pool: PgPool) {
    let app = build_test_app(pool);
    let cookie = register_and_login(&app, "alice", "a@x.com", "pw123").await;

    let response = post_json(
        app.clone(),
        "/api/posts",
        Some(&cookie),
        json!({"title": "Hi", "content": "body"}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let created = body_json(response).await;
    assert!(created["id"].is_number());
    assert_eq!(created["title"], "Hi");
    assert_eq!(created["content"], "body");
    assert!(created["date_posted"].is_string());

    let response = get_with_cookie(app, "/api/posts", &cookie).await;
    assert_eq!(response.status(), StatusCode::OK);

    let posts = body_json(response).await;
    let posts = posts.as_array().expect("response should be an array");
    assert_eq!(posts.len(), 1);
    assert_eq!(posts[0]["title"], "Hi");
    assert_eq!(posts[0]["content"], "body");
    assert_eq!(posts[0].get("id"), None);
}

#[sqlx::test(migrations = "../quill-db/migrations")]
async fn empty_title_is_a_bad_request(pool: PgPool) {
    let app = build_test_app(pool);
    let cookie = register_and_login(&app, "alice", "a@x.com", "pw123").await;

    let response = post_json(
        app,
        "/api/posts",
        Some(&cookie),
        json!({"title": ""}),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        body_json(response).await,
        json!({"error": "Missing title or content"})
    );
}

#[sqlx::test(migrations = "../quill-db/migrations")]
async fn absent_content_is_a_bad_request(pool: PgPool) {
    let app = build_test_app(pool);
    let cookie = register_and_login(&app, "alice", "a@x.com", "pw123").await;

    let response = post_json(app, "/api/posts", Some(&cookie), json!({"title": "Hi"})).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        body_json(response).await,
        json!({"error": "Missing title or content"})
    );
}

#[sqlx::test(migrations = "../quill-db/migrations")]
async fn listing_is_scoped_to_the_caller(pool: PgPool) {
    let app = build_test_app(pool);

    let alice = register_and_login(&app, "alice", "a@x.com", "pw123").await;
    let response = post_json(
        app.clone(),
        "/api/posts",
        Some(&alice),
        json!({"title": "Alice post", "content": "hers"}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let bob = register_and_login(&app, "bob", "b@x.com", "pw456").await;
    let response = get_with_cookie(app, "/api/posts", &bob).await;
    assert_eq!(response.status(), StatusCode::OK);

    let posts = body_json(response).await;
    assert_eq!(posts.as_array().unwrap().len(), 0);
}

#[sqlx::test(migrations = "../quill-db/migrations")]
async fn listing_is_newest_first(pool: PgPool) {
    let app = build_test_app(pool);
    let cookie = register_and_login(&app, "alice", "a@x.com", "pw123").await;

    for title in ["first", "second", "third"] {
        let response = post_json(
            app.clone(),
            "/api/posts",
            Some(&cookie),
            json!({"title": title, "content": "body"}),
        )
        .await;
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    let response = get_with_cookie(app, "/api/posts", &cookie).await;
    let posts = body_json(response).await;

    let titles: Vec<_> = posts
        .as_array()
        .unwrap()
        .iter()
        .map(|post| post["title"].as_str().unwrap().to_owned())
        .collect();
    assert_eq!(titles, ["third", "second", "first"]);
}

#[sqlx::test(migrations = "../quill-db/migrations")]
async fn bearer_tokens_are_accepted(pool: PgPool) {
    let app = build_test_app(pool);
    let cookie = register_and_login(&app, "alice", "a@x.com", "pw123").await;
    let token = cookie
        .strip_prefix("session=")
        .expect("cookie pair should start with the session name");

    let response = get_with_bearer(app, "/api/posts", token).await;

    assert_eq!(response.status(), StatusCode::OK);
}
