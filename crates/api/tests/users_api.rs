//! HTTP-level tests for the user directory and online status.

mod common;

use axum::http::StatusCode;
use common::{body_json, get, get_auth, register};
use sqlx::PgPool;

#[sqlx::test(migrations = "../../db/migrations")]
async fn user_list_requires_auth(pool: PgPool) {
    let app = common::build_test_app(pool);
    let response = get(app.app(), "/users").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(response).await["login_url"], "/login");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn user_list_reports_online_status(pool: PgPool) {
    let app = common::build_test_app(pool.clone());
    let token = register(app.app(), "alice").await;
    register(app.app(), "bob").await;
    register(app.app(), "carol").await;

    sqlx::query("UPDATE users SET last_seen = NOW() - INTERVAL '1 hour' WHERE username = 'bob'")
        .execute(&pool)
        .await
        .unwrap();

    let response = get_auth(app.app(), "/users", Some(&token)).await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    let users = json["data"].as_array().unwrap();
    let summary: Vec<(&str, bool)> = users
        .iter()
        .map(|u| (u["username"].as_str().unwrap(), u["online"].as_bool().unwrap()))
        .collect();
    // Registering logs carol in, so she counts as seen.
    assert_eq!(
        summary,
        vec![("alice", true), ("bob", false), ("carol", true)]
    );
    assert!(users[0].get("password_hash").is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn registration_records_last_seen(pool: PgPool) {
    let app = common::build_test_app(pool.clone());
    register(app.app(), "dana").await;

    let (last_seen,): (Option<chrono::DateTime<chrono::Utc>>,) =
        sqlx::query_as("SELECT last_seen FROM users WHERE username = 'dana'")
            .fetch_one(&pool)
            .await
            .unwrap();
    assert!(last_seen.is_some());
}
