//! Error types for the event store.
//!
//! Uses `thiserror` for typed errors at the two layers: [`ApiError`] for
//! anything the gateway reports, and [`StoreError`] for what an action
//! returns to its caller.

use videobox_types::MessageEvent;

/// Errors reported by an [`ApiGateway`](crate::gateway::ApiGateway) call.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    /// The request never produced a response (connection refused, timeout).
    #[error("transport error: {0}")]
    Transport(String),

    /// The API answered with a non-success status.
    ///
    /// `body` holds the parsed JSON body when there was one.
    #[error("API rejected request with status {status}")]
    Rejected {
        /// HTTP status code of the response.
        status: u16,
        /// Parsed JSON body of the failed response, if any.
        body: Option<serde_json::Value>,
    },

    /// A success response could not be decoded into the expected envelope.
    #[error("response decode error: {0}")]
    Decode(String),
}

impl ApiError {
    /// Build a rejection carrying a well-formed `{ok, msg}` body.
    pub fn rejected_with(status: u16, payload: &MessageEvent) -> Self {
        Self::Rejected {
            status,
            body: serde_json::to_value(payload).ok(),
        }
    }

    /// Read the `{ok, msg}` feedback record out of a failed response body.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::MalformedErrorPayload`] when there is no
    /// response body (transport and decode failures) or the body does not
    /// have the `{ok: boolean, msg: [{message}]}` shape.
    pub fn error_payload(&self) -> Result<MessageEvent, StoreError> {
        match self {
            Self::Rejected {
                body: Some(body), ..
            } => serde_json::from_value(body.clone())
                .map_err(|e| StoreError::MalformedErrorPayload(e.to_string())),
            Self::Rejected { status, body: None } => Err(StoreError::MalformedErrorPayload(
                format!("status {status} response has no JSON body"),
            )),
            Self::Transport(_) | Self::Decode(_) => Err(StoreError::MalformedErrorPayload(
                String::from("failure carries no response body"),
            )),
        }
    }
}

/// Errors returned by [`EventStore`](crate::store::EventStore) actions.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// The remote call failed. State was left unchanged.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// The remote call failed and its body could not be read as a
    /// feedback record, so no message was set.
    #[error("malformed error payload: {0}")]
    MalformedErrorPayload(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_well_formed_payload() {
        let err = ApiError::Rejected {
            status: 400,
            body: Some(serde_json::json!({
                "ok": false,
                "msg": [{"message": "title is required"}]
            })),
        };
        let payload = err.error_payload();
        assert_eq!(
            payload,
            Ok(MessageEvent::failure(["title is required"]))
        );
    }

    #[test]
    fn round_trips_through_rejected_with() {
        let payload = MessageEvent::failure(["video not found"]);
        let err = ApiError::rejected_with(404, &payload);
        assert_eq!(err.error_payload(), Ok(payload));
    }

    #[test]
    fn wrong_shape_is_malformed() {
        let err = ApiError::Rejected {
            status: 500,
            body: Some(serde_json::json!("Internal Server Error")),
        };
        assert!(matches!(
            err.error_payload(),
            Err(StoreError::MalformedErrorPayload(_))
        ));
    }

    #[test]
    fn transport_failure_is_malformed() {
        let err = ApiError::Transport(String::from("connection refused"));
        assert!(matches!(
            err.error_payload(),
            Err(StoreError::MalformedErrorPayload(_))
        ));

        let err = ApiError::Rejected {
            status: 502,
            body: None,
        };
        assert!(matches!(
            err.error_payload(),
            Err(StoreError::MalformedErrorPayload(_))
        ));
    }
}
