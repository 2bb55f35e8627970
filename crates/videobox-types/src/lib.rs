//! Shared type definitions for the `VideoBox` event store.
//!
//! These types mirror the JSON exchanged with the remote event API and the
//! state the store exposes to the UI. They flow downstream to `TypeScript`
//! via `ts-rs` so the UI and the store agree on one shape.
//!
//! # Modules
//!
//! - [`ids`] -- Type-safe wrapper for the server-assigned `id_video`
//! - [`event`] -- The video event record, creation drafts, update payloads
//! - [`message`] -- Transient `{ok, msg}` feedback records
//! - [`api`] -- Request and response envelopes of the remote API

pub mod api;
pub mod event;
pub mod ids;
pub mod message;

// Re-export all public types at crate root for convenience.
pub use api::{
    CreateEventResponse, DeleteEventResponse, EventsListResponse, VideoDataRequest, VideoResponse,
};
pub use event::{Event, EventDraft, VideoData};
pub use ids::VideoId;
pub use message::{MessageEntry, MessageEvent};
