//! Integration tests for the start / validate / renew / end flow.

mod helpers;

use chrono::Duration;

use sessionvault_auth::SessionStore;
use sessionvault_entity::session::SessionToken;

#[tokio::test]
async fn test_start_then_validate_returns_same_token() {
    let app = helpers::TestApp::new().await;

    let issued = app.manager.start_session(None).await.unwrap();
    assert!(issued.created);
    assert_eq!(issued.expires_at, helpers::t0() + Duration::minutes(30));

    let session = app
        .manager
        .validate_session(issued.token.expose())
        .await
        .unwrap()
        .into_session()
        .expect("session should be active");
    assert_eq!(session.token, issued.token);
    assert_eq!(session.created_at, helpers::t0());
    assert_eq!(session.owner, None);
}

#[tokio::test]
async fn test_start_with_active_token_creates_nothing() {
    let app = helpers::TestApp::new().await;
    let first = app.manager.start_session(None).await.unwrap();

    app.clock.advance(Duration::minutes(5));
    let second = app
        .manager
        .start_session(Some(first.token.expose()))
        .await
        .unwrap();

    assert!(!second.created);
    assert_eq!(second.token, first.token);
    assert_eq!(second.expires_at, first.expires_at);
    assert_eq!(app.total_rows().await, 1);
}

#[tokio::test]
async fn test_start_with_unknown_token_issues_fresh_one() {
    let app = helpers::TestApp::new().await;
    let issued = app
        .manager
        .start_session(Some("not-a-real-session"))
        .await
        .unwrap();
    assert!(issued.created);
    assert_ne!(issued.token.expose(), "not-a-real-session");
}

#[tokio::test]
async fn test_end_session_is_idempotent() {
    let app = helpers::TestApp::new().await;
    let issued = app.manager.start_session(None).await.unwrap();
    let token = issued.token.expose();

    app.manager.end_session(token).await.unwrap();
    assert!(!app.manager.validate_session(token).await.unwrap().is_active());

    app.manager.end_session(token).await.unwrap();
    assert!(!app.manager.validate_session(token).await.unwrap().is_active());
    assert_eq!(app.total_rows().await, 0);
}

#[tokio::test]
async fn test_abc123_scenario() {
    let app = helpers::TestApp::new().await;
    let t0 = helpers::t0();

    app.store
        .insert(&SessionToken::new("abc123"), Duration::seconds(1800))
        .await
        .unwrap();

    app.clock.set(t0 + Duration::seconds(1700));
    let active = app
        .manager
        .validate_session("abc123")
        .await
        .unwrap()
        .into_session()
        .expect("active at T0+1700s");
    assert_eq!(active.expires_at, t0 + Duration::seconds(1800));

    app.clock.set(t0 + Duration::seconds(1900));
    assert!(!app.manager.validate_session("abc123").await.unwrap().is_active());

    app.manager.end_session("abc123").await.unwrap();
    assert!(!app.manager.validate_session("abc123").await.unwrap().is_active());
    app.manager.end_session("abc123").await.unwrap();
}

#[tokio::test]
async fn test_validation_never_extends_expiry() {
    let app = helpers::TestApp::new().await;
    let issued = app.manager.start_session(None).await.unwrap();
    let token = issued.token.expose();

    for _ in 0..5 {
        app.clock.advance(Duration::minutes(5));
        assert!(app.manager.validate_session(token).await.unwrap().is_active());
    }

    app.clock.advance(Duration::minutes(5));
    assert!(!app.manager.validate_session(token).await.unwrap().is_active());
}

#[tokio::test]
async fn test_renew_resets_window_from_now() {
    let app = helpers::TestApp::new().await;
    let issued = app.manager.start_session(None).await.unwrap();
    let token = issued.token.expose();

    app.clock.advance(Duration::minutes(29));
    let renewed = app
        .manager
        .renew_session(token)
        .await
        .unwrap()
        .into_session()
        .expect("renewable while active");
    assert_eq!(
        renewed.expires_at,
        helpers::t0() + Duration::minutes(29) + Duration::minutes(30)
    );
    assert_eq!(renewed.updated_at, helpers::t0() + Duration::minutes(29));

    app.clock.advance(Duration::minutes(20));
    assert!(app.manager.validate_session(token).await.unwrap().is_active());
}

#[tokio::test]
async fn test_renew_cannot_revive_expired_session() {
    let app = helpers::TestApp::new().await;
    let issued = app.manager.start_session(None).await.unwrap();

    app.clock.advance(Duration::minutes(31));
    let status = app
        .manager
        .renew_session(issued.token.expose())
        .await
        .unwrap();
    assert!(!status.is_active());

    let again = app
        .manager
        .start_session(Some(issued.token.expose()))
        .await
        .unwrap();
    assert!(again.created);
    assert_ne!(again.token, issued.token);
}

#[tokio::test]
async fn test_malformed_tokens_never_reach_storage_as_errors() {
    let app = helpers::TestApp::new().await;
    let oversized = "a".repeat(1024);
    for bad in ["", "with space", "new\nline", oversized.as_str()] {
        assert!(!app.manager.validate_session(bad).await.unwrap().is_active());
        app.manager.end_session(bad).await.unwrap();
    }
}

#[tokio::test]
async fn test_closed_pool_surfaces_storage_unavailable() {
    let app = helpers::TestApp::new().await;
    app.db_pool.close().await;

    let err = app.manager.start_session(None).await.unwrap_err();
    assert_eq!(
        err.kind,
        sessionvault_core::error::ErrorKind::StorageUnavailable
    );
}
