//! Repository-level tests for users and sessions.

use chrono::{Duration, Utc};
use deskline_db::models::session::CreateSession;
use deskline_db::models::user::CreateUser;
use deskline_db::repositories::{is_unique_violation, SessionRepo, UserRepo};
use sqlx::PgPool;

fn user(username: &str, email: Option<&str>) -> CreateUser {
    CreateUser {
        username: username.to_string(),
        email: email.map(str::to_string),
        password_hash: "argon2-hash".to_string(),
    }
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn create_and_find_user(pool: PgPool) {
    let created = UserRepo::create(&pool, &user("alice", Some("a@example.com")))
        .await
        .unwrap();
    assert!(!created.is_admin);
    assert!(created.last_seen.is_none());

    let by_name = UserRepo::find_by_username(&pool, "alice").await.unwrap().unwrap();
    assert_eq!(by_name.id, created.id);
    let by_email = UserRepo::find_by_email(&pool, "a@example.com").await.unwrap().unwrap();
    assert_eq!(by_email.id, created.id);
    assert!(UserRepo::find_by_username(&pool, "bob").await.unwrap().is_none());

    UserRepo::touch_last_seen(&pool, created.id).await.unwrap();
    let seen = UserRepo::find_by_id(&pool, created.id).await.unwrap().unwrap();
    assert!(seen.last_seen.is_some());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn usernames_and_emails_are_unique(pool: PgPool) {
    UserRepo::create(&pool, &user("alice", Some("a@example.com")))
        .await
        .unwrap();

    let err = UserRepo::create(&pool, &user("alice", None)).await.unwrap_err();
    assert!(is_unique_violation(&err, "uq_users_username"));

    let err = UserRepo::create(&pool, &user("bob", Some("a@example.com")))
        .await
        .unwrap_err();
    assert!(is_unique_violation(&err, "uq_users_email"));

    // Several users may have no email.
    UserRepo::create(&pool, &user("carol", None)).await.unwrap();
    UserRepo::create(&pool, &user("dave", None)).await.unwrap();

    assert_eq!(UserRepo::count(&pool).await.unwrap(), 3);
    let names: Vec<String> = UserRepo::list(&pool)
        .await
        .unwrap()
        .into_iter()
        .map(|u| u.username)
        .collect();
    assert_eq!(names, vec!["alice", "carol", "dave"]);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn sessions_are_found_until_revoked_or_expired(pool: PgPool) {
    let alice = UserRepo::create(&pool, &user("alice", None)).await.unwrap();

    SessionRepo::create(
        &pool,
        &CreateSession {
            user_id: alice.id,
            token_hash: "live".into(),
            expires_at: Utc::now() + Duration::hours(1),
        },
    )
    .await
    .unwrap();
    SessionRepo::create(
        &pool,
        &CreateSession {
            user_id: alice.id,
            token_hash: "stale".into(),
            expires_at: Utc::now() - Duration::hours(1),
        },
    )
    .await
    .unwrap();

    let live = SessionRepo::find_active_by_token_hash(&pool, "live")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(live.user_id, alice.id);
    assert!(SessionRepo::find_active_by_token_hash(&pool, "stale")
        .await
        .unwrap()
        .is_none());

    assert!(SessionRepo::revoke_by_token_hash(&pool, "live").await.unwrap());
    assert!(!SessionRepo::revoke_by_token_hash(&pool, "live").await.unwrap());
    assert!(SessionRepo::find_active_by_token_hash(&pool, "live")
        .await
        .unwrap()
        .is_none());

    assert_eq!(SessionRepo::cleanup_expired(&pool).await.unwrap(), 2);
}
