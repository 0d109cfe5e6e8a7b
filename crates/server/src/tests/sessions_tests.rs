use super::*;

use axum::http::HeaderValue;

#[test]
fn reads_session_cookie_among_others() {
    let id = Uuid::new_v4();
    let mut headers = HeaderMap::new();
    headers.insert(
        header::COOKIE,
        HeaderValue::from_str(&format!("theme=dark; {SESSION_COOKIE}={id}; lang=es"))
            .expect("header"),
    );

    assert_eq!(visitor_from_headers(&headers), Some(VisitorId(id)));
}

#[test]
fn ignores_malformed_or_missing_cookie() {
    let mut headers = HeaderMap::new();
    assert_eq!(visitor_from_headers(&headers), None);

    headers.insert(
        header::COOKIE,
        HeaderValue::from_static("banner_session=not-a-uuid"),
    );
    assert_eq!(visitor_from_headers(&headers), None);
}

#[tokio::test]
async fn sessions_are_isolated_per_visitor() {
    let registry = SessionRegistry::default();
    let alice = VisitorId(Uuid::new_v4());
    let bob = VisitorId(Uuid::new_v4());

    registry
        .with_session(alice, |session| session.form.title = "Burger".into())
        .await;

    let alice_title = registry
        .with_session(alice, |session| session.form.title.clone())
        .await;
    let bob_title = registry
        .with_session(bob, |session| session.form.title.clone())
        .await;

    assert_eq!(alice_title, "Burger");
    assert!(bob_title.is_empty());
    assert_eq!(registry.len().await, 2);
}

#[tokio::test]
async fn reading_an_unknown_visitor_creates_nothing() {
    let registry = SessionRegistry::default();
    let stranger = VisitorId(Uuid::new_v4());

    let is_admin = registry
        .read(stranger, |session| session.controller.is_admin())
        .await;

    assert!(!is_admin);
    assert_eq!(registry.len().await, 0);
}

#[tokio::test]
async fn idle_sessions_are_dropped_when_a_new_one_arrives() {
    let registry = SessionRegistry::new(Duration::ZERO, DEFAULT_MAX_SESSIONS);
    let first = VisitorId(Uuid::new_v4());
    let second = VisitorId(Uuid::new_v4());

    registry
        .with_session(first, |session| session.form.title = "Burger".into())
        .await;
    registry.with_session(second, |_| ()).await;

    assert_eq!(registry.len().await, 1);
    let title = registry
        .read(first, |session| session.form.title.clone())
        .await;
    assert!(title.is_empty());
}

#[tokio::test]
async fn registry_is_capped_by_evicting_least_recently_seen() {
    let registry = SessionRegistry::new(DEFAULT_IDLE_TIMEOUT, 2);
    let oldest = VisitorId(Uuid::new_v4());
    let recent = VisitorId(Uuid::new_v4());
    let newcomer = VisitorId(Uuid::new_v4());

    registry
        .with_session(oldest, |session| session.form.title = "old".into())
        .await;
    tokio::time::sleep(Duration::from_millis(5)).await;
    registry
        .with_session(recent, |session| session.form.title = "recent".into())
        .await;
    tokio::time::sleep(Duration::from_millis(5)).await;
    registry.with_session(newcomer, |_| ()).await;

    assert_eq!(registry.len().await, 2);
    let kept = registry
        .read(recent, |session| session.form.title.clone())
        .await;
    let evicted = registry
        .read(oldest, |session| session.form.title.clone())
        .await;
    assert_eq!(kept, "recent");
    assert!(evicted.is_empty());
}
