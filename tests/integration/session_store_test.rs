//! Integration tests for the SQLite session store contract.

mod helpers;

use std::sync::Arc;

use chrono::Duration;

use sessionvault_auth::{DatabaseSessionStore, SessionStore};
use sessionvault_core::config::DatabaseConfig;
use sessionvault_core::error::ErrorKind;
use sessionvault_core::traits::ManualClock;
use sessionvault_entity::session::SessionToken;

#[tokio::test]
async fn test_zero_and_negative_ttl_are_never_active() {
    let app = helpers::TestApp::new().await;

    for (name, ttl) in [("zero", Duration::zero()), ("neg", Duration::seconds(-60))] {
        let token = SessionToken::new(name);
        let record = app.store.insert(&token, ttl).await.unwrap();
        assert!(record.expires_at <= record.created_at);
        assert!(app.store.find_active(&token).await.unwrap().is_none());
    }
    assert_eq!(app.store.count_active().await.unwrap(), 0);
}

#[tokio::test]
async fn test_expiry_boundary_is_exclusive() {
    let app = helpers::TestApp::new().await;
    let token = SessionToken::new("edge");
    app.store.insert(&token, Duration::seconds(60)).await.unwrap();

    app.clock.advance(Duration::milliseconds(59_999));
    assert!(app.store.find_active(&token).await.unwrap().is_some());

    app.clock.advance(Duration::milliseconds(1));
    assert!(app.store.find_active(&token).await.unwrap().is_none());
}

#[tokio::test]
async fn test_active_token_cannot_be_inserted_twice() {
    let app = helpers::TestApp::new().await;
    let token = SessionToken::new("taken");
    app.store.insert(&token, Duration::minutes(30)).await.unwrap();

    let err = app
        .store
        .insert(&token, Duration::minutes(30))
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::DuplicateToken);
    assert!(!err.to_string().contains("taken"));
}

#[tokio::test]
async fn test_expired_token_can_be_reinserted() {
    let app = helpers::TestApp::new().await;
    let token = SessionToken::new("recycled");
    let first = app.store.insert(&token, Duration::minutes(1)).await.unwrap();

    app.clock.advance(Duration::minutes(2));
    let second = app.store.insert(&token, Duration::minutes(30)).await.unwrap();

    assert!(second.id > first.id);
    assert_eq!(app.total_rows().await, 1);
    assert_eq!(
        app.store.find_active(&token).await.unwrap().map(|s| s.id),
        Some(second.id)
    );
}

#[tokio::test]
async fn test_delete_ignores_expiry() {
    let app = helpers::TestApp::new().await;
    let token = SessionToken::new("old");
    app.store.insert(&token, Duration::minutes(1)).await.unwrap();
    app.clock.advance(Duration::minutes(10));

    app.store.delete(&token).await.unwrap();
    assert_eq!(app.total_rows().await, 0);
    app.store.delete(&token).await.unwrap();
}

#[tokio::test]
async fn test_list_active_is_newest_first() {
    let app = helpers::TestApp::new().await;
    for name in ["one", "two", "three"] {
        app.store
            .insert(&SessionToken::new(name), Duration::minutes(30))
            .await
            .unwrap();
    }

    let listed = app.store.list_active(2).await.unwrap();
    let tokens: Vec<&str> = listed.iter().map(|s| s.token.expose()).collect();
    assert_eq!(tokens, ["three", "two"]);
}

#[tokio::test]
async fn test_file_database_survives_reconnect() {
    let tmp = tempfile::tempdir().unwrap();
    let config = DatabaseConfig {
        url: format!("sqlite://{}", tmp.path().join("sessions.db").display()),
        ..DatabaseConfig::default()
    };

    let app = helpers::TestApp::with_database(config.clone()).await;
    let issued = app.manager.start_session(None).await.unwrap();
    app.db_pool.close().await;

    let pool = sessionvault_database::DatabasePool::connect(&config)
        .await
        .unwrap();
    let store = DatabaseSessionStore::new(
        pool.pool().clone(),
        Arc::new(ManualClock::new(helpers::t0())),
        config.operation_timeout(),
    );
    store.initialize().await.unwrap();

    let found = store.find_active(&issued.token).await.unwrap();
    assert_eq!(found.map(|s| s.expires_at), Some(issued.expires_at));
    pool.close().await;
}
