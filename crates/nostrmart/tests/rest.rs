//! RestClient against an in-process PostgREST-style server.

mod common;

use std::sync::atomic::Ordering;
use std::time::Duration;

use common::{MockRest, API_KEY, SERVICE_KEY, UNREACHABLE};
use nostrmart::{
    EventQuery, InsertResult, NewMediaObject, RestClient, RestConfig, Store, StoreError,
};
use nostrmart_testkit::TestFixture;

fn client(url: &str, retry_max: u32) -> RestClient {
    RestClient::new(RestConfig {
        retry_max,
        initial_backoff: Duration::from_millis(1),
        ..RestConfig::new(url, API_KEY)
    })
    .unwrap()
}

fn media(url: &str, uploader: &str) -> NewMediaObject {
    NewMediaObject {
        url: url.to_string(),
        uploader_pubkey: uploader.to_string(),
        size_bytes: 5,
        mime_type: Some("text/plain".into()),
        checksum: "2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824".into(),
    }
}

#[tokio::test]
async fn test_event_roundtrip() {
    let server = MockRest::start().await;
    let store = client(&server.url, 0);
    let fixture = TestFixture::new();
    let event = fixture.note("hello");

    assert_eq!(store.insert_event(&event).await.unwrap(), InsertResult::Inserted);
    assert_eq!(
        store.insert_event(&event).await.unwrap(),
        InsertResult::AlreadyExists
    );
    assert_eq!(server.state.rows("nostr_events").len(), 1);

    let fetched = store.get_event(&event.id).await.unwrap();
    assert_eq!(fetched, Some(event));
    assert!(store.get_event(&"0".repeat(64)).await.unwrap().is_none());
}

#[tokio::test]
async fn test_list_events_filters() {
    let server = MockRest::start().await;
    let store = client(&server.url, 0);
    let alice = TestFixture::with_seed(1);
    let bob = TestFixture::with_seed(2);

    for (i, fixture) in [&alice, &bob, &alice, &alice].iter().enumerate() {
        let event = fixture.note_at(&format!("n{}", i), 1_700_000_000 + i as u64);
        store.insert_event(&event).await.unwrap();
    }
    store
        .insert_event(&alice.auth_event_at("c", 1_700_000_100))
        .await
        .unwrap();

    let notes = store
        .list_events(&EventQuery {
            pubkey: Some(alice.pubkey_hex()),
            kind: Some(1),
            limit: 2,
            offset: 0,
        })
        .await
        .unwrap();
    let contents: Vec<_> = notes.iter().map(|e| e.content.as_str()).collect();
    assert_eq!(contents, vec!["n3", "n2"]);

    let page_two = store
        .list_events(&EventQuery {
            pubkey: Some(alice.pubkey_hex()),
            kind: Some(1),
            limit: 2,
            offset: 2,
        })
        .await
        .unwrap();
    assert_eq!(page_two.len(), 1);
    assert_eq!(page_two[0].content, "n0");
}

#[tokio::test]
async fn test_retries_transient_failures() {
    let server = MockRest::start().await;
    let store = client(&server.url, 2);
    server.state.fail_next.store(2, Ordering::SeqCst);

    let event = TestFixture::new().note("retry");
    assert_eq!(store.insert_event(&event).await.unwrap(), InsertResult::Inserted);
    assert_eq!(server.state.request_count(), 3);
}

#[tokio::test]
async fn test_gives_up_after_retry_max() {
    let server = MockRest::start().await;
    let store = client(&server.url, 1);
    server.state.fail_next.store(5, Ordering::SeqCst);

    let err = store.get_event(&"0".repeat(64)).await.unwrap_err();
    assert!(matches!(err, StoreError::Status { status: 503, .. }));
    assert_eq!(server.state.request_count(), 2);
}

#[tokio::test]
async fn test_client_errors_not_retried() {
    let server = MockRest::start().await;
    let store = RestClient::new(RestConfig {
        retry_max: 3,
        ..RestConfig::new(&server.url, "wrong-key")
    })
    .unwrap();

    let err = store.get_event(&"0".repeat(64)).await.unwrap_err();
    assert!(matches!(err, StoreError::Status { status: 401, .. }));
    assert!(!err.is_transient());
    assert_eq!(server.state.request_count(), 1);
}

#[tokio::test]
async fn test_unreachable_store() {
    let store = client(UNREACHABLE, 1);
    let err = store.get_event(&"0".repeat(64)).await.unwrap_err();
    assert!(matches!(err, StoreError::Transport(_)));
}

#[tokio::test]
async fn test_media_objects() {
    let server = MockRest::start().await;
    let store = RestClient::new(RestConfig {
        service_key: Some(SERVICE_KEY.into()),
        ..RestConfig::new(&server.url, API_KEY)
    })
    .unwrap();

    let first = store
        .insert_media_object(&media("https://cdn/1", "aa"))
        .await
        .unwrap();
    store
        .insert_media_object(&media("https://cdn/2", "bb"))
        .await
        .unwrap();
    let third = store
        .insert_media_object(&media("https://cdn/3", "aa"))
        .await
        .unwrap();
    assert_eq!(first.size_bytes, Some(5));
    assert!(first.created_at.is_some());

    let listed = store.list_media_by_uploader("aa", 10, 0).await.unwrap();
    let ids: Vec<_> = listed.iter().map(|m| m.id.as_str()).collect();
    assert_eq!(ids, vec![third.id.as_str(), first.id.as_str()]);

    let got = store.get_media_object(&first.id).await.unwrap().unwrap();
    assert_eq!(got.url, "https://cdn/1");

    // inserts use the service key, reads the public key
    let keys = server.state.keys.lock().unwrap().clone();
    assert_eq!(&keys[..3], &[SERVICE_KEY, SERVICE_KEY, SERVICE_KEY]);
    assert_eq!(keys[3], API_KEY);
}
