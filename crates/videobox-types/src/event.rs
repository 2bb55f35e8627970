//! The video event record and its creation/update payloads.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use ts_rs::TS;

use crate::ids::VideoId;

// ---------------------------------------------------------------------------
// Event
// ---------------------------------------------------------------------------

/// A video record as served by the remote API.
///
/// Only `id_video`, `url` and `title` are interpreted by the store. Every
/// other field the server attaches (publish status, timestamps, owner) is
/// kept in [`Event::extra`] and written back unchanged on serialization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Event {
    /// Server-assigned identifier, unique per event.
    pub id_video: VideoId,
    /// Location of the video resource.
    pub url: String,
    /// Human-readable title.
    pub title: String,
    /// Server-assigned fields that are opaque to the client.
    #[serde(flatten)]
    #[ts(skip)]
    pub extra: Map<String, Value>,
}

impl Event {
    /// Build an event with no server-assigned extras.
    pub fn new(id_video: VideoId, url: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id_video,
            url: url.into(),
            title: title.into(),
            extra: Map::new(),
        }
    }

    /// Look up an opaque server-assigned field.
    pub fn extra_field(&self, key: &str) -> Option<&Value> {
        self.extra.get(key)
    }

    /// Whether the server reports this event as published.
    ///
    /// Absent or non-boolean `published` fields count as unpublished.
    pub fn is_published(&self) -> bool {
        self.extra
            .get("published")
            .and_then(Value::as_bool)
            .unwrap_or(false)
    }
}

// ---------------------------------------------------------------------------
// Drafts and payloads
// ---------------------------------------------------------------------------

/// Client-side input for creating a new event. The server assigns the id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct EventDraft {
    /// Location of the video resource.
    pub url: String,
    /// Human-readable title.
    pub title: String,
}

impl EventDraft {
    /// Create a draft from a url and title.
    pub fn new(url: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            title: title.into(),
        }
    }
}

/// Free-form field set sent as `dataVideo` with publish and update calls.
///
/// The store never inspects it; the server decides which keys it accepts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct VideoData(#[ts(type = "Record<string, unknown>")] pub Map<String, Value>);

impl VideoData {
    /// An empty field set.
    pub fn new() -> Self {
        Self(Map::new())
    }

    /// Builder-style insert of a single field.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    /// Iterate over the contained fields.
    pub fn fields(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    /// Whether no fields are set.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
