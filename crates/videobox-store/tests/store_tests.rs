//! Integration tests for the event store actions.
//!
//! Every test drives an [`EventStore`] backed by the in-memory gateway.
//! Timer behaviour runs on tokio's paused clock, so message lifetimes are
//! checked to the millisecond without real waiting.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use std::time::Duration;

use serde_json::json;
use videobox_store::{
    ApiError, ApiOperation, ErrorSurfacing, EventStore, InMemoryGateway, StoreConfig, StoreError,
};
use videobox_types::{Event, EventDraft, MessageEvent, VideoData, VideoId};

fn event(id: i64, title: &str) -> Event {
    Event::new(
        VideoId::new(id),
        format!("https://cdn.example/{id}.mp4"),
        title,
    )
}

fn build_store(events: Vec<Event>, surfacing: ErrorSurfacing) -> (EventStore, InMemoryGateway) {
    let gateway = InMemoryGateway::with_events(events);
    let config = StoreConfig {
        error_surfacing: surfacing,
        ..StoreConfig::default()
    };
    (EventStore::new(gateway.clone(), &config), gateway)
}

async fn loaded_store(events: Vec<Event>) -> (EventStore, InMemoryGateway) {
    let (store, gateway) = build_store(events, ErrorSurfacing::Uniform);
    store.load_all().await.unwrap();
    (store, gateway)
}

// =========================================================================
// load_all
// =========================================================================

#[tokio::test(start_paused = true)]
async fn load_all_replaces_list_in_server_order() {
    let (store, _) = loaded_store(vec![event(2, "b"), event(1, "a")]).await;

    let ids: Vec<i64> = store
        .events()
        .iter()
        .map(|e| e.id_video.into_inner())
        .collect();
    assert_eq!(ids, [2, 1]);
    assert!(store.message_event().is_none());
}

#[tokio::test(start_paused = true)]
async fn load_all_failure_leaves_list_intact() {
    let (store, gateway) = loaded_store(vec![event(1, "a"), event(2, "b")]).await;
    let before = store.snapshot();

    gateway
        .fail_next(
            ApiOperation::List,
            ApiError::Transport(String::from("connection refused")),
        )
        .await;
    let result = store.load_all().await;

    assert!(matches!(result, Err(StoreError::Api(ApiError::Transport(_)))));
    assert_eq!(store.snapshot(), before);
    assert!(store.message_event().is_none());
}

// =========================================================================
// create
// =========================================================================

#[tokio::test(start_paused = true)]
async fn create_appends_returned_event() {
    let (store, gateway) = loaded_store(vec![event(1, "a"), event(2, "b")]).await;
    let prior = store.events();

    store
        .create(&EventDraft::new("https://cdn.example/new.mp4", "Launch"))
        .await
        .unwrap();

    let events = store.events();
    assert_eq!(events.len(), 3);
    assert_eq!(events[..2], prior[..]);

    let created = events.last().unwrap();
    assert_eq!(created.id_video, VideoId::new(3));
    assert_eq!(created.title, "Launch");
    assert_eq!(Some(created), gateway.stored_events().await.last());
    assert_eq!(
        store.message_event(),
        Some(MessageEvent::success("Video created"))
    );
}

#[tokio::test(start_paused = true)]
async fn create_failure_surfaces_error_payload() {
    let (store, _) = loaded_store(vec![event(1, "a")]).await;

    let result = store.create(&EventDraft::new("", "Untitled")).await;

    assert!(matches!(
        result,
        Err(StoreError::Api(ApiError::Rejected { status: 400, .. }))
    ));
    assert_eq!(store.events().len(), 1);
    assert_eq!(
        store.message_event(),
        Some(MessageEvent::failure(["url is required"]))
    );
}

#[tokio::test(start_paused = true)]
async fn create_transport_failure_is_a_malformed_payload() {
    let (store, gateway) = loaded_store(vec![event(1, "a")]).await;
    gateway
        .fail_next(
            ApiOperation::Create,
            ApiError::Transport(String::from("network unreachable")),
        )
        .await;

    let result = store
        .create(&EventDraft::new("https://cdn.example/x.mp4", "X"))
        .await;

    assert!(matches!(result, Err(StoreError::MalformedErrorPayload(_))));
    assert_eq!(store.events().len(), 1);
    assert!(store.message_event().is_none());
}

// =========================================================================
// publish / update
// =========================================================================

#[tokio::test(start_paused = true)]
async fn update_replaces_by_id_and_preserves_order() {
    let (store, _) = loaded_store(vec![event(1, "a"), event(2, "b")]).await;
    let untouched = store.events()[1].clone();

    store
        .update(VideoId::new(1), &VideoData::new().with("title", "a2"))
        .await
        .unwrap();

    let events = store.events();
    assert_eq!(events.len(), 2);
    assert_eq!(events[0].id_video, VideoId::new(1));
    assert_eq!(events[0].title, "a2");
    assert_eq!(events[1], untouched);
    assert_eq!(
        store.message_event(),
        Some(MessageEvent::success("Video updated"))
    );
}

#[tokio::test(start_paused = true)]
async fn publish_replaces_record_wholesale() {
    let (store, _) = loaded_store(vec![event(1, "a"), event(2, "b")]).await;

    store
        .publish(VideoId::new(2), &VideoData::new().with("category", "talks"))
        .await
        .unwrap();

    let published = store.events()[1].clone();
    assert!(published.is_published());
    assert_eq!(published.extra_field("category"), Some(&json!("talks")));
    assert!(!store.events()[0].is_published());
}

#[tokio::test(start_paused = true)]
async fn update_failure_surfaces_error_payload() {
    let (store, _) = loaded_store(vec![event(1, "a")]).await;
    let before = store.events();

    let result = store.update(VideoId::new(42), &VideoData::new()).await;

    assert!(result.is_err());
    assert_eq!(store.events(), before);
    assert_eq!(
        store.message_event(),
        Some(MessageEvent::failure(["video 42 not found"]))
    );
}

#[tokio::test(start_paused = true)]
async fn malformed_error_body_skips_message() {
    let (store, gateway) = loaded_store(vec![event(1, "a")]).await;
    let before = store.snapshot();
    gateway
        .fail_next(
            ApiOperation::Update,
            ApiError::Rejected {
                status: 500,
                body: Some(json!("Internal Server Error")),
            },
        )
        .await;

    let result = store
        .update(VideoId::new(1), &VideoData::new().with("title", "z"))
        .await;

    assert!(matches!(result, Err(StoreError::MalformedErrorPayload(_))));
    assert_eq!(store.snapshot(), before);
}

#[tokio::test(start_paused = true)]
async fn publish_failure_is_surfaced_when_uniform() {
    let (store, gateway) = loaded_store(vec![event(1, "a")]).await;
    gateway
        .fail_next(
            ApiOperation::Publish,
            ApiError::rejected_with(503, &MessageEvent::failure(["publishing is paused"])),
        )
        .await;

    let result = store.publish(VideoId::new(1), &VideoData::new()).await;

    assert!(result.is_err());
    assert!(!store.events()[0].is_published());
    assert_eq!(
        store.message_event(),
        Some(MessageEvent::failure(["publishing is paused"]))
    );
}

#[tokio::test(start_paused = true)]
async fn legacy_surfacing_only_logs_publish_and_delete_failures() {
    let (store, gateway) = build_store(vec![event(1, "a")], ErrorSurfacing::Legacy);
    store.load_all().await.unwrap();

    gateway
        .fail_next(
            ApiOperation::Publish,
            ApiError::rejected_with(503, &MessageEvent::failure(["publishing is paused"])),
        )
        .await;
    assert!(store.publish(VideoId::new(1), &VideoData::new()).await.is_err());
    assert!(store.message_event().is_none());

    assert!(store.delete(VideoId::new(42)).await.is_err());
    assert!(store.message_event().is_none());
    assert_eq!(store.events().len(), 1);

    // Update failures still surface in legacy mode.
    assert!(store.update(VideoId::new(42), &VideoData::new()).await.is_err());
    assert_eq!(
        store.message_event(),
        Some(MessageEvent::failure(["video 42 not found"]))
    );
}

// =========================================================================
// delete
// =========================================================================

#[tokio::test(start_paused = true)]
async fn delete_removes_every_match() {
    let (store, _) = loaded_store(vec![event(5, "x"), event(6, "y"), event(5, "z")]).await;

    store.delete(VideoId::new(5)).await.unwrap();

    assert_eq!(store.events(), vec![event(6, "y")]);
    assert_eq!(
        store.message_event(),
        Some(MessageEvent::success("Video deleted"))
    );
}

#[tokio::test(start_paused = true)]
async fn delete_failure_leaves_list_intact() {
    let (store, gateway) = loaded_store(vec![event(1, "a")]).await;
    gateway
        .fail_next(
            ApiOperation::Delete,
            ApiError::Transport(String::from("timeout")),
        )
        .await;

    let result = store.delete(VideoId::new(1)).await;

    assert!(matches!(result, Err(StoreError::MalformedErrorPayload(_))));
    assert_eq!(store.events().len(), 1);
}

// =========================================================================
// select_active
// =========================================================================

#[tokio::test(start_paused = true)]
async fn select_active_touches_only_the_selection() {
    let (store, gateway) = loaded_store(vec![event(1, "a"), event(2, "b")]).await;
    let before = store.snapshot();
    let calls_before = gateway.total_calls().await;

    store.select_active(before.events[1].clone());

    let after = store.snapshot();
    assert_eq!(after.active_event, Some(before.events[1].clone()));
    assert_eq!(after.events, before.events);
    assert_eq!(after.message_event, before.message_event);
    assert_eq!(gateway.total_calls().await, calls_before);
}

#[tokio::test(start_paused = true)]
async fn selection_survives_delete_of_its_event() {
    let (store, _) = loaded_store(vec![event(1, "a"), event(2, "b")]).await;
    store.select_active(event(1, "a"));

    store.delete(VideoId::new(1)).await.unwrap();

    assert_eq!(store.active_event(), Some(event(1, "a")));
    assert!(store.events().iter().all(|e| e.id_video != VideoId::new(1)));
}

#[tokio::test(start_paused = true)]
async fn select_active_accepts_unknown_event() {
    let (store, _) = loaded_store(Vec::new()).await;
    store.select_active(event(99, "ghost"));
    assert_eq!(store.active_event().map(|e| e.id_video), Some(VideoId::new(99)));
    assert!(store.events().is_empty());
}

// =========================================================================
// Message lifetime
// =========================================================================

#[tokio::test(start_paused = true)]
async fn message_clears_after_ttl() {
    let (store, _) = loaded_store(vec![event(1, "a")]).await;

    store
        .update(VideoId::new(1), &VideoData::new().with("title", "b"))
        .await
        .unwrap();
    assert!(store.message_event().is_some());

    tokio::time::sleep(Duration::from_millis(2_999)).await;
    assert!(store.message_event().is_some());

    tokio::time::sleep(Duration::from_millis(2)).await;
    assert!(store.message_event().is_none());
}

#[tokio::test(start_paused = true)]
async fn failure_message_clears_after_ttl() {
    let (store, _) = loaded_store(Vec::new()).await;

    assert!(store.create(&EventDraft::new("", "")).await.is_err());
    assert!(store.message_event().is_some());

    tokio::time::sleep(Duration::from_millis(3_001)).await;
    assert!(store.message_event().is_none());
}

#[tokio::test(start_paused = true)]
async fn older_timer_does_not_wipe_newer_message() {
    let (store, _) = loaded_store(vec![event(1, "a")]).await;

    store
        .create(&EventDraft::new("https://cdn.example/2.mp4", "b"))
        .await
        .unwrap();
    tokio::time::sleep(Duration::from_millis(2_000)).await;

    store
        .update(VideoId::new(1), &VideoData::new().with("title", "a2"))
        .await
        .unwrap();

    // The create's clear fires at 3s but the update's message is newer.
    tokio::time::sleep(Duration::from_millis(1_500)).await;
    assert_eq!(
        store.message_event(),
        Some(MessageEvent::success("Video updated"))
    );

    tokio::time::sleep(Duration::from_millis(1_501)).await;
    assert!(store.message_event().is_none());
}

#[tokio::test(start_paused = true)]
async fn custom_ttl_is_honoured() {
    let gateway = InMemoryGateway::with_events(vec![event(1, "a")]);
    let config = StoreConfig {
        message_ttl: Duration::from_millis(500),
        ..StoreConfig::default()
    };
    let store = EventStore::new(gateway, &config);

    store.delete(VideoId::new(1)).await.unwrap();
    tokio::time::sleep(Duration::from_millis(499)).await;
    assert!(store.message_event().is_some());
    tokio::time::sleep(Duration::from_millis(2)).await;
    assert!(store.message_event().is_none());
}

#[tokio::test(start_paused = true)]
async fn dismiss_message_clears_immediately() {
    let (store, _) = loaded_store(vec![event(1, "a")]).await;
    store.delete(VideoId::new(1)).await.unwrap();

    store.dismiss_message();
    assert!(store.message_event().is_none());
}

// =========================================================================
// Concurrency
// =========================================================================

#[tokio::test(start_paused = true)]
async fn overlapping_updates_both_land() {
    let (store, gateway) = loaded_store(vec![event(1, "a"), event(2, "b")]).await;
    gateway
        .set_latency(ApiOperation::Update, Duration::from_millis(100))
        .await;

    let first = VideoData::new().with("title", "a2");
    let second = VideoData::new().with("title", "b2");
    let (r1, r2) = tokio::join!(
        store.update(VideoId::new(1), &first),
        store.update(VideoId::new(2), &second),
    );
    r1.unwrap();
    r2.unwrap();

    let titles: Vec<String> = store.events().into_iter().map(|e| e.title).collect();
    assert_eq!(titles, ["a2", "b2"]);
}

#[tokio::test(start_paused = true)]
async fn create_during_slow_delete_is_kept() {
    let (store, gateway) = loaded_store(vec![event(1, "a")]).await;
    gateway
        .set_latency(ApiOperation::Delete, Duration::from_millis(200))
        .await;

    let draft = EventDraft::new("https://cdn.example/2.mp4", "b");
    let (deleted, created) = tokio::join!(store.delete(VideoId::new(1)), store.create(&draft));
    deleted.unwrap();
    created.unwrap();

    let ids: Vec<i64> = store
        .events()
        .iter()
        .map(|e| e.id_video.into_inner())
        .collect();
    assert_eq!(ids, [2]);
}

// =========================================================================
// Subscriptions
// =========================================================================

#[tokio::test(start_paused = true)]
async fn subscribers_see_every_write() {
    let (store, _) = build_store(vec![event(1, "a")], ErrorSurfacing::Uniform);
    let mut changes = store.subscribe();
    assert!(!changes.has_changed().unwrap());

    store.load_all().await.unwrap();
    assert!(changes.has_changed().unwrap());
    assert_eq!(changes.borrow_and_update().events.len(), 1);

    store.select_active(event(1, "a"));
    assert!(changes.has_changed().unwrap());
    assert!(changes.borrow_and_update().active_event.is_some());

    tokio::time::sleep(Duration::from_secs(4)).await;
    // No message was ever set, so nothing further was published.
    assert!(!changes.has_changed().unwrap());
}
