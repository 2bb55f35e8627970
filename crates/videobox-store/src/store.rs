//! The observable event store.
//!
//! [`EventStore`] mirrors the remote event collection for a UI. Each action
//! makes one gateway call and then merges its outcome into the state with a
//! single write. Subscribers receive a fresh [`StoreState`] through a
//! [`watch`] channel after every write.
//!
//! # Concurrency
//!
//! Actions may overlap freely. Writes are applied to the state as it is when
//! the response lands, under the channel's lock, so two in-flight updates of
//! different events both survive.
//!
//! Feedback messages are cleared one TTL after the action that set them.
//! Every message write bumps a generation counter and each scheduled clear
//! only fires if the generation it captured is still current, so an older
//! timer never wipes a newer message.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;

use tokio::sync::watch;
use tokio::time::Instant;
use tracing::{debug, error, info, warn};
use videobox_types::{Event, EventDraft, MessageEvent, VideoData, VideoId};

use crate::config::{ErrorSurfacing, StoreConfig};
use crate::error::{ApiError, StoreError};
use crate::gateway::{ApiGateway, ApiOperation};
use crate::state::StoreState;

/// Shared internals behind every [`EventStore`] handle.
struct StoreInner {
    /// Gateway to the remote API.
    gateway: ApiGateway,
    /// Current state; receivers are the subscribers.
    state: watch::Sender<StoreState>,
    /// Bumped on every message write or dismissal.
    message_generation: AtomicU64,
    /// Delay between a message write and its scheduled clear.
    message_ttl: Duration,
    /// Which failures set the message.
    error_surfacing: ErrorSurfacing,
}

impl StoreInner {
    fn current_generation(&self) -> u64 {
        self.message_generation.load(Ordering::Acquire)
    }

    /// Apply `mutate` and optionally set the message in one state write.
    ///
    /// Returns the message generation as of this write.
    fn commit<F>(&self, mutate: F, message: Option<MessageEvent>) -> u64
    where
        F: FnOnce(&mut StoreState),
    {
        let mut generation = 0;
        self.state.send_modify(|state| {
            mutate(state);
            generation = match message {
                Some(message) => {
                    state.message_event = Some(message);
                    self.message_generation
                        .fetch_add(1, Ordering::AcqRel)
                        .wrapping_add(1)
                }
                None => self.current_generation(),
            };
        });
        generation
    }

    /// Clear the message if no newer one was written since `generation`.
    fn clear_message_if_current(&self, generation: u64) -> bool {
        self.state.send_if_modified(|state| {
            if self.current_generation() != generation {
                return false;
            }
            state.message_event.take().is_some()
        })
    }
}

/// Client-side mirror of the remote event collection.
///
/// Cheap to clone; all clones share one state. Construct one per app and
/// pass it to whatever needs it.
///
/// Actions spawn their message-clearing timer on the current tokio runtime.
#[derive(Clone)]
pub struct EventStore {
    inner: Arc<StoreInner>,
}

impl EventStore {
    /// Create an empty store backed by `gateway`.
    pub fn new(gateway: impl Into<ApiGateway>, config: &StoreConfig) -> Self {
        let gateway = gateway.into();
        debug!(
            gateway = gateway.name(),
            message_ttl_ms = config.message_ttl.as_millis(),
            error_surfacing = %config.error_surfacing,
            "event store created"
        );
        let (state, _) = watch::channel(StoreState::default());
        Self {
            inner: Arc::new(StoreInner {
                gateway,
                state,
                message_generation: AtomicU64::new(0),
                message_ttl: config.message_ttl,
                error_surfacing: config.error_surfacing,
            }),
        }
    }

    // -----------------------------------------------------------------------
    // Reads
    // -----------------------------------------------------------------------

    /// A copy of the current state.
    pub fn snapshot(&self) -> StoreState {
        self.inner.state.borrow().clone()
    }

    /// Subscribe to state changes.
    ///
    /// The receiver starts at the current state and is marked changed after
    /// every write.
    pub fn subscribe(&self) -> watch::Receiver<StoreState> {
        self.inner.state.subscribe()
    }

    /// The cached event list.
    pub fn events(&self) -> Vec<Event> {
        self.inner.state.borrow().events.clone()
    }

    /// The selected event, if any.
    pub fn active_event(&self) -> Option<Event> {
        self.inner.state.borrow().active_event.clone()
    }

    /// The current feedback message, if any.
    pub fn message_event(&self) -> Option<MessageEvent> {
        self.inner.state.borrow().message_event.clone()
    }

    /// The gateway this store talks to.
    pub fn gateway(&self) -> &ApiGateway {
        &self.inner.gateway
    }

    // -----------------------------------------------------------------------
    // Actions
    // -----------------------------------------------------------------------

    /// Replace the cached list with the server's.
    ///
    /// A failure leaves the list untouched and never sets the message.
    pub async fn load_all(&self) -> Result<(), StoreError> {
        match self.inner.gateway.list_events().await {
            Ok(response) => {
                info!(count = response.events.len(), "events loaded");
                self.inner
                    .state
                    .send_modify(|state| state.events = response.events);
                Ok(())
            }
            Err(err) => {
                warn!(error = %err, "failed to load events");
                Err(err.into())
            }
        }
    }

    /// Create an event and append the server's record to the list.
    pub async fn create(&self, draft: &EventDraft) -> Result<(), StoreError> {
        let outcome = match self.inner.gateway.create_event(draft).await {
            Ok(response) => {
                let (event, message) = response.into_parts();
                info!(id_video = %event.id_video, title = event.title, "event created");
                let generation = self
                    .inner
                    .commit(|state| state.append_event(event), Some(message));
                (generation, Ok(()))
            }
            Err(err) => self.fail(ApiOperation::Create, err),
        };
        self.settle(outcome)
    }

    /// Publish an event and replace every cached copy with the server's
    /// record.
    pub async fn publish(
        &self,
        id_video: VideoId,
        data_video: &VideoData,
    ) -> Result<(), StoreError> {
        let outcome = match self
            .inner
            .gateway
            .publish_event(id_video, data_video)
            .await
        {
            Ok(response) => {
                let generation =
                    self.replace(ApiOperation::Publish, id_video, response.into_parts());
                (generation, Ok(()))
            }
            Err(err) => self.fail(ApiOperation::Publish, err),
        };
        self.settle(outcome)
    }

    /// Update an event and replace every cached copy with the server's
    /// record.
    pub async fn update(&self, id: VideoId, data_video: &VideoData) -> Result<(), StoreError> {
        let outcome = match self.inner.gateway.update_event(id, data_video).await {
            Ok(response) => {
                let generation = self.replace(ApiOperation::Update, id, response.into_parts());
                (generation, Ok(()))
            }
            Err(err) => self.fail(ApiOperation::Update, err),
        };
        self.settle(outcome)
    }

    /// Delete an event and drop every cached copy.
    pub async fn delete(&self, id: VideoId) -> Result<(), StoreError> {
        let outcome = match self.inner.gateway.delete_event(id).await {
            Ok(response) => {
                let mut removed = 0;
                let generation = self.inner.commit(
                    |state| removed = state.remove_by_id(id),
                    Some(MessageEvent::from(response)),
                );
                info!(id_video = %id, removed, "event deleted");
                (generation, Ok(()))
            }
            Err(err) => self.fail(ApiOperation::Delete, err),
        };
        self.settle(outcome)
    }

    /// Mark `event` as the UI's current selection.
    ///
    /// No network call and no check that the event is in the list.
    pub fn select_active(&self, event: Event) {
        debug!(id_video = %event.id_video, "active event selected");
        self.inner
            .state
            .send_modify(|state| state.active_event = Some(event));
    }

    /// Drop the current selection.
    pub fn clear_active(&self) {
        self.inner
            .state
            .send_if_modified(|state| state.active_event.take().is_some());
    }

    /// Clear the message now and cancel its pending clear.
    pub fn dismiss_message(&self) {
        self.inner.state.send_if_modified(|state| {
            self.inner.message_generation.fetch_add(1, Ordering::AcqRel);
            state.message_event.take().is_some()
        });
    }

    // -----------------------------------------------------------------------
    // Outcome handling
    // -----------------------------------------------------------------------

    /// Write a publish/update result into the list and set its message.
    fn replace(&self, operation: ApiOperation, id: VideoId, parts: (Event, MessageEvent)) -> u64 {
        let (video, message) = parts;
        let mut replaced = 0;
        let generation = self.inner.commit(
            |state| replaced = state.replace_by_id(id, &video),
            Some(message),
        );
        info!(%operation, id_video = %id, replaced, "event replaced");
        generation
    }

    /// Log a failed call and, if configured, surface its error body.
    ///
    /// Returns the generation to clear and the error for the caller.
    fn fail(&self, operation: ApiOperation, err: ApiError) -> (u64, Result<(), StoreError>) {
        warn!(%operation, error = %err, "API call failed");

        if !self.inner.error_surfacing.surfaces(operation) {
            return (self.inner.current_generation(), Err(err.into()));
        }

        match err.error_payload() {
            Ok(payload) => {
                let generation = self.inner.commit(|_| {}, Some(payload));
                (generation, Err(err.into()))
            }
            Err(fault) => {
                error!(%operation, error = %fault, "failed response carries no usable message");
                (self.inner.current_generation(), Err(fault))
            }
        }
    }

    /// Schedule the message clear for an action and hand back its result.
    fn settle(&self, outcome: (u64, Result<(), StoreError>)) -> Result<(), StoreError> {
        let (generation, result) = outcome;
        schedule_message_clear(
            Arc::downgrade(&self.inner),
            generation,
            self.inner.message_ttl,
        );
        result
    }
}

/// Clear the message after `ttl` unless a newer one was written meanwhile.
///
/// Holds only a weak handle so a dropped store is not kept alive by its
/// timers.
fn schedule_message_clear(inner: Weak<StoreInner>, generation: u64, ttl: Duration) {
    // The deadline is fixed now, not when the task is first polled.
    let deadline = Instant::now().checked_add(ttl);
    tokio::spawn(async move {
        match deadline {
            Some(deadline) => tokio::time::sleep_until(deadline).await,
            None => tokio::time::sleep(ttl).await,
        }
        let Some(inner) = inner.upgrade() else {
            return;
        };
        if inner.clear_message_if_current(generation) {
            debug!(generation, "message cleared");
        }
    });
}
