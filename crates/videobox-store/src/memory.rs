//! Process-local stand-in for the remote event API.
//!
//! [`InMemoryGateway`] keeps its own list of events and answers the five
//! operations the way the server does: ids are assigned on create, publish
//! and update merge `dataVideo` into the stored record and return it whole,
//! delete drops every record with the id. Validation failures come back as
//! [`ApiError::Rejected`] with a well-formed `{ok, msg}` body.
//!
//! For driving the store through specific situations it also supports a
//! per-operation latency and one-shot scripted failures. Handles are cheap
//! to clone and share the same backend.

use std::collections::{BTreeMap, VecDeque};
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use serde_json::Value;
use tokio::sync::Mutex;
use tracing::debug;
use videobox_types::{
    CreateEventResponse, DeleteEventResponse, Event, EventDraft, EventsListResponse,
    MessageEntry, MessageEvent, VideoData, VideoId, VideoResponse,
};

use crate::error::ApiError;
use crate::gateway::ApiOperation;

/// HTTP status used for validation failures.
const STATUS_BAD_REQUEST: u16 = 400;

/// HTTP status used for unknown ids.
const STATUS_NOT_FOUND: u16 = 404;

/// Mutable backend shared by every handle.
#[derive(Debug, Default)]
struct Backend {
    /// Stored events, in insertion order.
    events: Vec<Event>,
    /// Next id handed out on create.
    next_id: i64,
    /// Artificial delay per operation.
    latency: BTreeMap<ApiOperation, Duration>,
    /// Scripted failures, consumed one per call.
    failures: BTreeMap<ApiOperation, VecDeque<ApiError>>,
    /// Calls received per operation.
    calls: BTreeMap<ApiOperation, u64>,
}

impl Backend {
    /// Record a call and return its latency and any scripted failure.
    fn begin(&mut self, operation: ApiOperation) -> (Duration, Option<ApiError>) {
        let count = self.calls.entry(operation).or_insert(0);
        *count = count.saturating_add(1);

        let latency = self.latency.get(&operation).copied().unwrap_or_default();
        let failure = self
            .failures
            .get_mut(&operation)
            .and_then(VecDeque::pop_front);
        (latency, failure)
    }

    fn position(&self, id: VideoId) -> Option<usize> {
        self.events.iter().position(|event| event.id_video == id)
    }
}

/// In-memory implementation of the remote event API.
#[derive(Debug, Clone, Default)]
pub struct InMemoryGateway {
    backend: Arc<Mutex<Backend>>,
}

impl InMemoryGateway {
    /// An empty API.
    pub fn new() -> Self {
        Self::default()
    }

    /// An API already holding `events`.
    ///
    /// Duplicate ids are kept as given. New ids continue after the largest
    /// seeded one.
    pub fn with_events(events: Vec<Event>) -> Self {
        let next_id = events
            .iter()
            .map(|event| event.id_video.into_inner())
            .max()
            .unwrap_or(0)
            .saturating_add(1);
        Self {
            backend: Arc::new(Mutex::new(Backend {
                events,
                next_id,
                ..Backend::default()
            })),
        }
    }

    /// Delay every future `operation` call by `latency` before it applies.
    pub async fn set_latency(&self, operation: ApiOperation, latency: Duration) {
        self.backend.lock().await.latency.insert(operation, latency);
    }

    /// Make the next `operation` call fail with `error`.
    ///
    /// Repeated calls queue further failures in order.
    pub async fn fail_next(&self, operation: ApiOperation, error: ApiError) {
        self.backend
            .lock()
            .await
            .failures
            .entry(operation)
            .or_default()
            .push_back(error);
    }

    /// Number of `operation` calls received so far.
    pub async fn calls(&self, operation: ApiOperation) -> u64 {
        self.backend
            .lock()
            .await
            .calls
            .get(&operation)
            .copied()
            .unwrap_or(0)
    }

    /// Total calls received across all operations.
    pub async fn total_calls(&self) -> u64 {
        self.backend
            .lock()
            .await
            .calls
            .values()
            .fold(0_u64, |acc, n| acc.saturating_add(*n))
    }

    /// Snapshot of the server-side events.
    pub async fn stored_events(&self) -> Vec<Event> {
        self.backend.lock().await.events.clone()
    }

    /// Apply latency and scripted failures for one call.
    ///
    /// The lock is released while sleeping so overlapping calls proceed
    /// independently.
    async fn begin(&self, operation: ApiOperation) -> Result<(), ApiError> {
        let (latency, failure) = self.backend.lock().await.begin(operation);
        debug!(%operation, latency_ms = latency.as_millis(), "in-memory API call");
        if !latency.is_zero() {
            tokio::time::sleep(latency).await;
        }
        failure.map_or(Ok(()), Err)
    }

    pub(crate) async fn list_events(&self) -> Result<EventsListResponse, ApiError> {
        self.begin(ApiOperation::List).await?;
        Ok(EventsListResponse {
            events: self.stored_events().await,
        })
    }

    pub(crate) async fn create_event(
        &self,
        draft: &EventDraft,
    ) -> Result<CreateEventResponse, ApiError> {
        self.begin(ApiOperation::Create).await?;

        let mut problems = Vec::new();
        if draft.url.trim().is_empty() {
            problems.push("url is required");
        }
        if draft.title.trim().is_empty() {
            problems.push("title is required");
        }
        if !problems.is_empty() {
            return Err(ApiError::rejected_with(
                STATUS_BAD_REQUEST,
                &MessageEvent::failure(problems),
            ));
        }

        let mut backend = self.backend.lock().await;
        let id = VideoId::new(backend.next_id.max(1));
        backend.next_id = id.into_inner().saturating_add(1);

        let mut event = Event::new(id, draft.url.clone(), draft.title.clone());
        event
            .extra
            .insert(String::from("published"), Value::Bool(false));
        event.extra.insert(
            String::from("created_at"),
            Value::String(Utc::now().to_rfc3339()),
        );
        backend.events.push(event.clone());

        Ok(CreateEventResponse {
            event,
            ok: true,
            msg: vec![MessageEntry::new("Video created")],
        })
    }

    pub(crate) async fn publish_event(
        &self,
        id_video: VideoId,
        data_video: &VideoData,
    ) -> Result<VideoResponse, ApiError> {
        self.begin(ApiOperation::Publish).await?;
        self.modify(id_video, data_video, true, "Video published")
            .await
    }

    pub(crate) async fn update_event(
        &self,
        id: VideoId,
        data_video: &VideoData,
    ) -> Result<VideoResponse, ApiError> {
        self.begin(ApiOperation::Update).await?;
        self.modify(id, data_video, false, "Video updated").await
    }

    pub(crate) async fn delete_event(&self, id: VideoId) -> Result<DeleteEventResponse, ApiError> {
        self.begin(ApiOperation::Delete).await?;

        let mut backend = self.backend.lock().await;
        if backend.position(id).is_none() {
            return Err(not_found(id));
        }
        backend.events.retain(|event| event.id_video != id);

        Ok(DeleteEventResponse {
            ok: true,
            msg: vec![MessageEntry::new("Video deleted")],
        })
    }

    /// Merge `data_video` into every stored record with `id`, returning the
    /// first one.
    async fn modify(
        &self,
        id: VideoId,
        data_video: &VideoData,
        publish: bool,
        message: &str,
    ) -> Result<VideoResponse, ApiError> {
        let mut backend = self.backend.lock().await;
        let Some(first) = backend.position(id) else {
            return Err(not_found(id));
        };

        let published_at = Utc::now().to_rfc3339();
        for event in backend.events.iter_mut().filter(|e| e.id_video == id) {
            merge_fields(event, data_video);
            if publish {
                event
                    .extra
                    .insert(String::from("published"), Value::Bool(true));
                event.extra.insert(
                    String::from("published_at"),
                    Value::String(published_at.clone()),
                );
            }
        }

        let video = backend
            .events
            .get(first)
            .cloned()
            .ok_or_else(|| not_found(id))?;

        Ok(VideoResponse {
            video,
            ok: true,
            msg: vec![MessageEntry::new(message)],
        })
    }
}

/// Copy `data_video` onto a record. Known string fields replace the typed
/// ones; the id is immutable; everything else lands in the extras.
fn merge_fields(event: &mut Event, data_video: &VideoData) {
    for (key, value) in data_video.fields() {
        match (key.as_str(), value.as_str()) {
            ("id_video", _) => {}
            ("url", Some(url)) => url.clone_into(&mut event.url),
            ("title", Some(title)) => title.clone_into(&mut event.title),
            _ => {
                event.extra.insert(key.clone(), value.clone());
            }
        }
    }
}

fn not_found(id: VideoId) -> ApiError {
    ApiError::rejected_with(
        STATUS_NOT_FOUND,
        &MessageEvent::failure([format!("video {id} not found")]),
    )
}
