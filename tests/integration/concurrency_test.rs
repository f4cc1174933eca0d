//! Integration tests for concurrent session operations.

mod helpers;

use std::collections::HashSet;

use chrono::Duration;
use futures::future::join_all;

use sessionvault_auth::SessionStore;
use sessionvault_core::config::DatabaseConfig;
use sessionvault_core::error::ErrorKind;
use sessionvault_entity::session::SessionToken;

const CALLERS: usize = 64;

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_starts_yield_distinct_tokens() {
    let app = helpers::TestApp::new().await;

    let handles: Vec<_> = (0..CALLERS)
        .map(|_| {
            let manager = app.manager.clone();
            tokio::spawn(async move { manager.start_session(None).await })
        })
        .collect();

    let mut tokens = HashSet::new();
    for handle in handles {
        let issued = handle.await.unwrap().unwrap();
        assert!(issued.created);
        assert!(tokens.insert(issued.token.into_inner()));
    }

    assert_eq!(tokens.len(), CALLERS);
    assert_eq!(app.store.count_active().await.unwrap(), CALLERS as u64);
}

#[tokio::test]
async fn test_racing_inserts_of_one_token_admit_exactly_one() {
    let app = helpers::TestApp::new().await;
    let token = SessionToken::new("contested");

    let results = join_all(
        (0..16).map(|_| app.store.insert(&token, Duration::minutes(30))),
    )
    .await;

    let winners = results.iter().filter(|r| r.is_ok()).count();
    let duplicates = results
        .iter()
        .filter(|r| matches!(r, Err(e) if e.kind == ErrorKind::DuplicateToken))
        .count();
    assert_eq!(winners, 1);
    assert_eq!(duplicates, 15);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_file_backed_concurrency() {
    let tmp = tempfile::tempdir().unwrap();
    let config = DatabaseConfig {
        url: format!("sqlite://{}", tmp.path().join("sessions.db").display()),
        busy_timeout_ms: 5_000,
        operation_timeout_ms: 10_000,
        ..DatabaseConfig::default()
    };
    let app = helpers::TestApp::with_database(config).await;

    let issued = join_all((0..32).map(|_| app.manager.start_session(None))).await;
    let tokens: HashSet<String> = issued
        .into_iter()
        .map(|r| r.unwrap().token.into_inner())
        .collect();
    assert_eq!(tokens.len(), 32);

    let validations = join_all(tokens.iter().map(|t| app.manager.validate_session(t))).await;
    assert!(validations.into_iter().all(|r| r.unwrap().is_active()));

    let ends = join_all(tokens.iter().map(|t| app.manager.end_session(t))).await;
    assert!(ends.into_iter().all(|r| r.is_ok()));
    assert_eq!(app.total_rows().await, 0);

    app.db_pool.close().await;
}
