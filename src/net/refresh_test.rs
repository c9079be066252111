use std::time::Duration;

use super::*;
use crate::session::{Role, Session};
use crate::test_helpers::{MockBackend, auth_data, authed_store, fail, make_user, ok};
use crate::net::transport::TransportError;

#[tokio::test]
async fn successful_refresh_writes_new_session() {
    let backend = MockBackend::new(|_| ok(auth_data("fresh", Role::Admin)));
    let store = Arc::new(SessionStore::in_memory());
    let refresher = RefreshCoordinator::new(backend.clone(), Arc::clone(&store));

    assert!(refresher.refresh().await);
    assert_eq!(
        store.state(),
        Session::Authenticated { access_token: "fresh".to_owned(), user: make_user(Role::Admin) }
    );
    assert!(!refresher.is_pending());
}

#[tokio::test]
async fn refresh_sends_no_bearer_and_no_body() {
    let backend = MockBackend::new(|_| ok(auth_data("fresh", Role::User)));
    let store = authed_store("stale", Role::User);
    let refresher = RefreshCoordinator::new(backend.clone(), store);

    refresher.refresh().await;
    let requests = backend.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].method, Method::POST);
    assert_eq!(requests[0].path, REFRESH_PATH);
    assert_eq!(requests[0].bearer, None);
    assert_eq!(requests[0].body, None);
}

#[tokio::test]
async fn rejected_refresh_keeps_existing_session() {
    let backend = MockBackend::new(|_| fail(401, "AUTH_REFRESH_INVALID"));
    let store = authed_store("stale", Role::User);
    let refresher = RefreshCoordinator::new(backend.clone(), Arc::clone(&store));

    assert!(!refresher.refresh().await);
    assert_eq!(store.access_token().as_deref(), Some("stale"));
}

#[tokio::test]
async fn transport_failure_reports_false() {
    let backend = MockBackend::new(|_| Err(TransportError::Timeout));
    let store = authed_store("stale", Role::User);
    let refresher = RefreshCoordinator::new(backend.clone(), Arc::clone(&store));

    assert!(!refresher.refresh().await);
    assert!(store.state().is_authenticated());
}

#[tokio::test]
async fn malformed_payload_reports_false() {
    let store = Arc::new(SessionStore::in_memory());

    let missing_user = MockBackend::new(|_| ok(serde_json::json!({ "accessToken": "t" })));
    assert!(!RefreshCoordinator::new(missing_user, Arc::clone(&store)).refresh().await);

    let empty_token = MockBackend::new(|_| ok(auth_data("", Role::User)));
    assert!(!RefreshCoordinator::new(empty_token, Arc::clone(&store)).refresh().await);

    let no_data = MockBackend::new(|_| ok(serde_json::Value::Null));
    assert!(!RefreshCoordinator::new(no_data, Arc::clone(&store)).refresh().await);

    assert_eq!(store.state(), Session::Anonymous);
}

#[tokio::test]
async fn concurrent_callers_share_one_refresh_call() {
    let backend = MockBackend::with_refresh_delay(Duration::from_millis(30), |_| ok(auth_data("fresh", Role::User)));
    let store = Arc::new(SessionStore::in_memory());
    let refresher = RefreshCoordinator::new(backend.clone(), Arc::clone(&store));

    let results = futures::future::join_all((0..5).map(|_| refresher.refresh())).await;

    assert_eq!(results, vec![true; 5]);
    assert_eq!(backend.refresh_count(), 1);
    assert!(!refresher.is_pending());
}

#[tokio::test]
async fn settled_refresh_releases_slot_for_next_attempt() {
    let backend = MockBackend::new(|_| fail(401, "AUTH_REFRESH_INVALID"));
    let store = Arc::new(SessionStore::in_memory());
    let refresher = RefreshCoordinator::new(backend.clone(), store);

    assert!(!refresher.refresh().await);
    assert!(!refresher.refresh().await);
    assert_eq!(backend.refresh_count(), 2);
}

#[tokio::test]
async fn dropped_waiter_does_not_wedge_the_slot() {
    let backend = MockBackend::with_refresh_delay(Duration::from_millis(50), |_| ok(auth_data("fresh", Role::User)));
    let store = Arc::new(SessionStore::in_memory());
    let refresher = RefreshCoordinator::new(backend.clone(), Arc::clone(&store));

    let abandoned = tokio::time::timeout(Duration::from_millis(5), refresher.refresh()).await;
    assert!(abandoned.is_err());
    assert!(refresher.is_pending());

    // A later caller drives the same attempt to completion.
    assert!(refresher.refresh().await);
    assert_eq!(backend.refresh_count(), 1);
    assert!(!refresher.is_pending());
}

#[tokio::test]
async fn settle_without_pending_refresh_sends_nothing() {
    let backend = MockBackend::new(|_| ok(auth_data("fresh", Role::User)));
    let refresher = RefreshCoordinator::new(backend.clone(), authed_store("stale", Role::User));

    refresher.settle().await;
    assert_eq!(backend.refresh_count(), 0);
}

#[tokio::test]
async fn settle_waits_for_claimed_refresh() {
    let backend = MockBackend::with_refresh_delay(Duration::from_millis(30), |_| ok(auth_data("fresh", Role::User)));
    let store = authed_store("stale", Role::User);
    let refresher = RefreshCoordinator::new(backend.clone(), Arc::clone(&store));

    let background = tokio::spawn(refresher.begin());
    refresher.settle().await;
    assert!(!refresher.is_pending());
    assert_eq!(store.access_token().as_deref(), Some("fresh"));
    assert!(background.await.unwrap());
    assert_eq!(backend.refresh_count(), 1);
}

#[tokio::test]
async fn generation_is_pinned_when_slot_is_claimed() {
    let backend = MockBackend::new(|_| ok(auth_data("fresh", Role::User)));
    let store = authed_store("stale", Role::User);
    let refresher = RefreshCoordinator::new(backend.clone(), Arc::clone(&store));

    let pending = refresher.begin();
    store.clear();
    assert!(!pending.await);
    assert_eq!(store.state(), Session::Anonymous);
}
