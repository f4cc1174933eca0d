//! Integration tests for expired-session cleanup.

mod helpers;

use std::sync::Arc;

use chrono::Duration;

use sessionvault_auth::{SessionCleanup, SessionStore};
use sessionvault_core::config::ReaperConfig;
use sessionvault_entity::session::SessionToken;

#[tokio::test]
async fn test_cleanup_removes_only_expired_rows() {
    let app = helpers::TestApp::new().await;
    app.store
        .insert(&SessionToken::new("short"), Duration::minutes(1))
        .await
        .unwrap();
    let live = app.manager.start_session(None).await.unwrap();

    let cleanup = SessionCleanup::new(app.store.clone(), Duration::zero());

    assert_eq!(cleanup.run_cleanup().await.unwrap(), 0);

    app.clock.advance(Duration::minutes(2));
    assert_eq!(cleanup.run_cleanup().await.unwrap(), 1);
    assert_eq!(app.total_rows().await, 1);
    assert!(
        app.manager
            .validate_session(live.token.expose())
            .await
            .unwrap()
            .is_active()
    );
}

#[tokio::test]
async fn test_cleanup_respects_grace_period() {
    let app = helpers::TestApp::new().await;
    app.store
        .insert(&SessionToken::new("lingering"), Duration::minutes(1))
        .await
        .unwrap();

    let config = ReaperConfig {
        grace_seconds: 300,
        ..ReaperConfig::default()
    };
    let cleanup = SessionCleanup::from_config(app.store.clone(), &config);

    app.clock.advance(Duration::minutes(4));
    assert_eq!(cleanup.run_cleanup().await.unwrap(), 0);
    assert_eq!(app.total_rows().await, 1);

    app.clock.advance(Duration::minutes(3));
    assert_eq!(cleanup.run_cleanup().await.unwrap(), 1);
    assert_eq!(app.total_rows().await, 0);
}

#[tokio::test]
async fn test_validity_does_not_depend_on_cleanup() {
    let app = helpers::TestApp::new().await;
    let issued = app.manager.start_session(None).await.unwrap();

    app.clock.advance(Duration::minutes(45));

    // The row is still stored but no read treats it as valid.
    assert_eq!(app.total_rows().await, 1);
    assert!(
        !app.manager
            .validate_session(issued.token.expose())
            .await
            .unwrap()
            .is_active()
    );
    assert_eq!(app.store.count_active().await.unwrap(), 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_scheduled_reaper_shares_store() {
    let app = helpers::TestApp::new().await;
    app.store
        .insert(&SessionToken::new("doomed"), Duration::seconds(-1))
        .await
        .unwrap();

    let cleanup = Arc::new(SessionCleanup::new(app.store.clone(), Duration::zero()));
    let mut scheduler = sessionvault_worker::CronScheduler::new().await.unwrap();
    scheduler
        .register_session_reaper(Arc::clone(&cleanup), "* * * * * *")
        .await
        .unwrap();
    scheduler.start().await.unwrap();

    let mut reaped = false;
    for _ in 0..50 {
        if app.total_rows().await == 0 {
            reaped = true;
            break;
        }
        tokio::time::sleep(std::time::Duration::from_millis(100)).await;
    }
    scheduler.shutdown().await.unwrap();

    assert!(reaped, "scheduled reaper never purged the expired row");
}
