//! Transient feedback shown to the user after a mutating action.
//!
//! The API reports outcomes as `{ok, msg: [{message}, ...]}` on both
//! success and failure bodies, so the same type carries either.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// One human-readable line of feedback.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct MessageEntry {
    /// The text to display.
    pub message: String,
}

impl MessageEntry {
    /// Wrap a message string.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Outcome record of the last mutating action.
///
/// Both fields are required when deserializing: a failed response whose body
/// lacks either is treated as malformed rather than as an empty message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct MessageEvent {
    /// Whether the action succeeded.
    pub ok: bool,
    /// Ordered feedback lines.
    pub msg: Vec<MessageEntry>,
}

impl MessageEvent {
    /// A successful outcome with a single line.
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            ok: true,
            msg: vec![MessageEntry::new(message)],
        }
    }

    /// A failed outcome with the given lines.
    pub fn failure<I, S>(messages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            ok: false,
            msg: messages.into_iter().map(MessageEntry::new).collect(),
        }
    }

    /// The feedback lines as plain strings, in order.
    pub fn lines(&self) -> Vec<&str> {
        self.msg.iter().map(|entry| entry.message.as_str()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_validation_failure_body() {
        let body = serde_json::json!({
            "ok": false,
            "msg": [{"message": "url is required"}, {"message": "title is required"}]
        });
        let parsed: Result<MessageEvent, _> = serde_json::from_value(body);
        let parsed = parsed.ok();
        assert_eq!(
            parsed.as_ref().map(MessageEvent::lines),
            Some(vec!["url is required", "title is required"])
        );
        assert_eq!(parsed.map(|m| m.ok), Some(false));
    }

    #[test]
    fn rejects_body_without_msg() {
        let body = serde_json::json!({"ok": false, "error": "boom"});
        let parsed: Result<MessageEvent, _> = serde_json::from_value(body);
        assert!(parsed.is_err());
    }
}
