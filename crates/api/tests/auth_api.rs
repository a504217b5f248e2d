//! HTTP-level tests for registration, login, logout and session handling.

mod common;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use common::{body_json, get, get_auth, post_form, register, send, TEST_PASSWORD};
use deskline_db::repositories::UserRepo;
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Registration
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn register_creates_user_and_starts_session(pool: PgPool) {
    let app = common::build_test_app(pool);

    let body = format!("username=alice&email=alice%40example.com&password={TEST_PASSWORD}");
    let response = post_form(app.app(), "/register", &body, None).await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .expect("register should set the session cookie")
        .to_str()
        .unwrap()
        .to_string();
    assert!(cookie.starts_with("deskline_session="));
    assert!(cookie.contains("HttpOnly"));

    let json = body_json(response).await;
    assert_eq!(json["data"]["user"]["username"], "alice");
    assert_eq!(json["data"]["user"]["email"], "alice@example.com");
    assert!(json["data"]["user"].get("password_hash").is_none());
    assert!(json["data"]["token"].is_string());
    assert_eq!(json["data"]["expires_in"], 24 * 3600);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn duplicate_username_is_rejected_and_not_stored(pool: PgPool) {
    let app = common::build_test_app(pool.clone());
    register(app.app(), "alice").await;

    let body = format!("username=alice&password={TEST_PASSWORD}");
    let response = post_form(app.app(), "/register", &body, None).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert_eq!(body_json(response).await["code"], "CONFLICT");

    assert_eq!(UserRepo::count(&pool).await.unwrap(), 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn duplicate_email_is_rejected(pool: PgPool) {
    let app = common::build_test_app(pool);
    let first = format!("username=alice&email=shared%40example.com&password={TEST_PASSWORD}");
    let second = format!("username=bob&email=shared%40example.com&password={TEST_PASSWORD}");

    assert_eq!(
        post_form(app.app(), "/register", &first, None).await.status(),
        StatusCode::CREATED
    );
    assert_eq!(
        post_form(app.app(), "/register", &second, None).await.status(),
        StatusCode::CONFLICT
    );
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn weak_or_malformed_registration_is_a_validation_error(pool: PgPool) {
    let app = common::build_test_app(pool.clone());

    let short = post_form(app.app(), "/register", "username=alice&password=short", None).await;
    assert_eq!(short.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(short).await["code"], "VALIDATION_ERROR");

    let bad_email = format!("username=alice&email=not-an-email&password={TEST_PASSWORD}");
    let response = post_form(app.app(), "/register", &bad_email, None).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let missing = post_form(app.app(), "/register", "username=alice", None).await;
    assert_eq!(missing.status(), StatusCode::BAD_REQUEST);

    assert_eq!(UserRepo::count(&pool).await.unwrap(), 0);
}

// ---------------------------------------------------------------------------
// Login / logout
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn login_with_wrong_password_is_unauthorized(pool: PgPool) {
    let app = common::build_test_app(pool);
    register(app.app(), "alice").await;

    let response = post_form(app.app(), "/login", "username=alice&password=nope-nope-nope", None).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let json = body_json(response).await;
    assert_eq!(json["code"], "UNAUTHORIZED");
    assert_eq!(json["login_url"], "/login");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn login_with_unknown_user_is_unauthorized(pool: PgPool) {
    let app = common::build_test_app(pool);
    let response = post_form(app.app(), "/login", "username=ghost&password=whatever123", None).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn logout_ends_the_session(pool: PgPool) {
    let app = common::build_test_app(pool);
    register(app.app(), "alice").await;

    let response = post_form(
        app.app(),
        "/login",
        &format!("username=alice&password={TEST_PASSWORD}"),
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let token = body_json(response).await["data"]["token"]
        .as_str()
        .unwrap()
        .to_string();

    let before = get_auth(app.app(), "/users", Some(&token)).await;
    assert_eq!(before.status(), StatusCode::OK);

    let logout = get_auth(app.app(), "/logout", Some(&token)).await;
    assert_eq!(logout.status(), StatusCode::NO_CONTENT);
    let cleared = logout
        .headers()
        .get(header::SET_COOKIE)
        .expect("logout should clear the cookie")
        .to_str()
        .unwrap();
    assert!(cleared.starts_with("deskline_session=;"));

    let after = get_auth(app.app(), "/users", Some(&token)).await;
    assert_eq!(after.status(), StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn logout_without_session_still_succeeds(pool: PgPool) {
    let app = common::build_test_app(pool);
    let response = get(app.app(), "/logout").await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn session_cookie_authenticates_requests(pool: PgPool) {
    let app = common::build_test_app(pool);

    let response = post_form(
        app.app(),
        "/register",
        &format!("username=alice&password={TEST_PASSWORD}"),
        None,
    )
    .await;
    let set_cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    let cookie_pair = set_cookie.split(';').next().unwrap().to_string();

    let request = Request::builder()
        .uri("/users")
        .header(header::COOKIE, cookie_pair)
        .body(Body::empty())
        .unwrap();
    let response = send(app.app(), request).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn garbage_token_is_unauthorized(pool: PgPool) {
    let app = common::build_test_app(pool);
    let response = get_auth(app.app(), "/users", Some("not-a-jwt")).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

// ---------------------------------------------------------------------------
// Form descriptors
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn form_routes_describe_their_fields(pool: PgPool) {
    let app = common::build_test_app(pool);

    let login = body_json(get(app.app(), "/login").await).await;
    assert_eq!(login["data"]["action"], "/login");
    assert_eq!(login["data"]["fields"][1]["kind"], "password");

    let register = body_json(get(app.app(), "/register").await).await;
    assert_eq!(register["data"]["fields"].as_array().unwrap().len(), 3);
}
