mod common;

use common::{context, MockTransport};
use reqwest::Method;
use trello_cards::{endpoint, BoardError, LookupStep};

#[tokio::test]
async fn test_resolve_list_id_by_names() {
    let mock = MockTransport::new();
    mock.on(
        Method::GET,
        "/1/members/me/boards",
        200,
        r#"[{"name":"Projects","id":"B1"},{"name":"Chores","id":"B2"}]"#,
    );
    mock.on(
        Method::GET,
        "/1/boards/B1/lists",
        200,
        r#"[{"name":"Homework","id":"L9"}]"#,
    );
    let ctx = context(&mock);

    let list_id = ctx.resolve_list_id("Projects", "Homework").await.unwrap();
    assert_eq!(list_id, "L9");

    let calls = mock.calls();
    assert_eq!(calls.len(), 2);
    assert_eq!(
        calls[0].url,
        "https://api.trello.com/1/members/me/boards?key=K&token=T&filter=open"
    );
    assert!(calls[1].url.contains("B1"));
    assert!(calls.iter().all(|c| c.method == Method::GET));
}

#[tokio::test]
async fn test_board_not_found_stops_before_list_lookup() {
    let mock = MockTransport::new();
    mock.on(Method::GET, "/1/members/me/boards", 200, r#"[{"name":"Chores","id":"B2"}]"#);
    let ctx = context(&mock);

    let err = ctx.resolve_list_id("Projects", "Homework").await.unwrap_err();
    assert_eq!(err.step(), Some(LookupStep::Board));
    assert!(err.is_not_found());
    assert_eq!(mock.call_count(), 1);
}

#[tokio::test]
async fn test_list_failure_carries_list_step() {
    let mock = MockTransport::new();
    mock.on(Method::GET, "/1/members/me/boards", 200, r#"[{"name":"Projects","id":"B1"}]"#);
    mock.on(
        Method::GET,
        "/1/boards/B1/lists",
        200,
        r#"[{"name":"Homework","id":"L1"},{"name":"Homework","id":"L2"}]"#,
    );
    let ctx = context(&mock);

    let err = ctx.resolve_list_id("Projects", "Homework").await.unwrap_err();
    assert_eq!(err.step(), Some(LookupStep::List));
    match err.root_cause() {
        BoardError::AmbiguousName { name, count } => {
            assert_eq!(name, "Homework");
            assert_eq!(*count, 2);
        }
        other => panic!("expected AmbiguousName, got {:?}", other),
    }
}

#[tokio::test]
async fn test_resolve_id_exact_match_only() {
    let mock = MockTransport::new();
    mock.on(
        Method::GET,
        "/1/members/me/boards",
        200,
        r#"[{"name":"projects","id":"B1"},{"name":"Projects ","id":"B2"}]"#,
    );
    let ctx = context(&mock);

    let err = ctx
        .resolve_id(endpoint::OPEN_BOARDS, &[], "Projects")
        .await
        .unwrap_err();
    assert!(matches!(err, BoardError::NotFound { .. }));
}

#[tokio::test]
async fn test_lookup_transport_error_keeps_body() {
    let mock = MockTransport::new();
    mock.on(Method::GET, "/1/members/me/boards", 401, "invalid token");
    let ctx = context(&mock);

    let err = ctx.resolve_board_id("Projects").await.unwrap_err();
    assert_eq!(err.status_code(), Some(401));
    match err.root_cause() {
        BoardError::LookupTransport { body, .. } => assert_eq!(body, "invalid token"),
        other => panic!("expected LookupTransport, got {:?}", other),
    }
}

#[tokio::test]
async fn test_malformed_collection() {
    let mock = MockTransport::new();
    mock.on(Method::GET, "/1/members/me/boards", 200, r#"[{"name":"Projects"}]"#);
    let ctx = context(&mock);

    let err = ctx.resolve_board_id("Projects").await.unwrap_err();
    assert!(matches!(err.root_cause(), BoardError::MalformedResponse(_)));
}

#[tokio::test]
async fn test_custom_field_lookup_is_cached() {
    let mock = MockTransport::new();
    mock.on(
        Method::GET,
        "/1/boards/B1/customFields",
        200,
        r#"[{"name":"Points","id":"F1"},{"name":"Owner","id":"F2"}]"#,
    );
    let ctx = context(&mock);

    let first = ctx.resolve_custom_field_id("B1", "Points").await.unwrap();
    let second = ctx.resolve_custom_field_id("B1", "Points").await.unwrap();
    assert_eq!(first, "F1");
    assert_eq!(second, "F1");
    assert_eq!(mock.call_count(), 1);

    // a clone shares the cache
    let clone = ctx.clone();
    clone.resolve_custom_field_id("B1", "Points").await.unwrap();
    assert_eq!(mock.call_count(), 1);

    clone.resolve_custom_field_id("B1", "Owner").await.unwrap();
    assert_eq!(mock.call_count(), 2);
    assert_eq!(ctx.field_cache().len(), 2);
}

#[tokio::test]
async fn test_failed_custom_field_lookup_is_not_cached() {
    let mock = MockTransport::new();
    mock.on(Method::GET, "/1/boards/B1/customFields", 200, "[]");
    let ctx = context(&mock);

    let err = ctx.resolve_custom_field_id("B1", "Points").await.unwrap_err();
    assert_eq!(err.step(), Some(LookupStep::CustomField));
    assert!(err.is_not_found());
    assert!(ctx.field_cache().is_empty());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_custom_field_lookups() {
    let mock = MockTransport::new();
    mock.on(
        Method::GET,
        "/1/boards/B1/customFields",
        200,
        r#"[{"name":"Points","id":"F1"}]"#,
    );
    let ctx = context(&mock);

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let ctx = ctx.clone();
            tokio::spawn(async move { ctx.resolve_custom_field_id("B1", "Points").await })
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.await.unwrap().unwrap(), "F1");
    }

    // racing misses may each fetch, but the binding is stored once
    let calls = mock.call_count();
    assert!((1..=8).contains(&calls));
    assert_eq!(ctx.field_cache().len(), 1);

    ctx.resolve_custom_field_id("B1", "Points").await.unwrap();
    assert_eq!(mock.call_count(), calls);
}
