//! Request and response envelopes of the remote event API.
//!
//! Success bodies carry the same `ok`/`msg` pair as [`MessageEvent`] next to
//! their payload. `msg` defaults to empty on success since some endpoints
//! omit it.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::event::{Event, VideoData};
use crate::message::{MessageEntry, MessageEvent};

/// Body of the publish and update requests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct VideoDataRequest {
    /// Fields to apply to the video.
    #[serde(rename = "dataVideo")]
    pub data_video: VideoData,
}

/// Response of the list operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct EventsListResponse {
    /// All events, in server order.
    pub events: Vec<Event>,
}

/// Response of the create operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct CreateEventResponse {
    /// The newly created event, with its server-assigned id.
    pub event: Event,
    /// Whether the server reports success.
    pub ok: bool,
    /// Feedback lines.
    #[serde(default)]
    pub msg: Vec<MessageEntry>,
}

impl CreateEventResponse {
    /// Split into the created event and its feedback record.
    pub fn into_parts(self) -> (Event, MessageEvent) {
        (
            self.event,
            MessageEvent {
                ok: self.ok,
                msg: self.msg,
            },
        )
    }
}

/// Response of the publish and update operations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct VideoResponse {
    /// The full replacement record for the video.
    pub video: Event,
    /// Whether the server reports success.
    pub ok: bool,
    /// Feedback lines.
    #[serde(default)]
    pub msg: Vec<MessageEntry>,
}

impl VideoResponse {
    /// Split into the replacement record and its feedback record.
    pub fn into_parts(self) -> (Event, MessageEvent) {
        (
            self.video,
            MessageEvent {
                ok: self.ok,
                msg: self.msg,
            },
        )
    }
}

/// Response of the delete operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct DeleteEventResponse {
    /// Whether the server reports success.
    pub ok: bool,
    /// Feedback lines.
    #[serde(default)]
    pub msg: Vec<MessageEntry>,
}

impl From<DeleteEventResponse> for MessageEvent {
    fn from(response: DeleteEventResponse) -> Self {
        Self {
            ok: response.ok,
            msg: response.msg,
        }
    }
}
