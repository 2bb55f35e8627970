//! The state the store exposes to the UI.
//!
//! [`StoreState`] is what subscribers receive on every change. Its mutation
//! helpers implement the list semantics of the actions: append on create,
//! replace-by-id on publish and update, remove-by-id on delete. Duplicate
//! ids are never merged; every matching entry is replaced or removed.

use videobox_types::{Event, MessageEvent, VideoId};

/// Snapshot of the store.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoreState {
    /// Events in server order.
    pub events: Vec<Event>,
    /// The event currently selected in the UI.
    ///
    /// Set only by explicit selection and never validated against
    /// [`events`](Self::events); it may reference a deleted event.
    pub active_event: Option<Event>,
    /// Feedback from the last mutating action, until it is cleared.
    pub message_event: Option<MessageEvent>,
}

impl StoreState {
    /// Append an event at the end of the list.
    pub fn append_event(&mut self, event: Event) {
        self.events.push(event);
    }

    /// Replace every event whose `id_video` equals `id` with `video`.
    ///
    /// Order and non-matching events are preserved. Returns how many
    /// entries were replaced.
    pub fn replace_by_id(&mut self, id: VideoId, video: &Event) -> usize {
        let mut replaced: usize = 0;
        for slot in self.events.iter_mut().filter(|event| event.id_video == id) {
            slot.clone_from(video);
            replaced = replaced.saturating_add(1);
        }
        replaced
    }

    /// Remove every event whose `id_video` equals `id`.
    ///
    /// Returns how many entries were removed.
    pub fn remove_by_id(&mut self, id: VideoId) -> usize {
        let before = self.events.len();
        self.events.retain(|event| event.id_video != id);
        before.saturating_sub(self.events.len())
    }

    /// First event with the given id.
    pub fn find(&self, id: VideoId) -> Option<&Event> {
        self.events.iter().find(|event| event.id_video == id)
    }
}
