//! Remote event API abstraction and implementations.
//!
//! Defines an enum-based dispatch for gateways, avoiding the
//! dyn-compatibility issues with async trait methods. The HTTP gateway talks
//! to the real API via `reqwest`; the in-memory gateway in
//! [`memory`](crate::memory) stands in for it offline and in tests.
//!
//! The store makes exactly one gateway call per action and never retries.

use std::fmt;

use serde::de::DeserializeOwned;
use tracing::debug;
use videobox_types::{
    CreateEventResponse, DeleteEventResponse, EventDraft, EventsListResponse, VideoData,
    VideoDataRequest, VideoId, VideoResponse,
};

use crate::config::StoreConfig;
use crate::error::ApiError;
use crate::memory::InMemoryGateway;

/// The remote operations the store can invoke.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ApiOperation {
    /// Fetch every event.
    List,
    /// Create an event from a draft.
    Create,
    /// Publish an existing event.
    Publish,
    /// Update fields of an existing event.
    Update,
    /// Delete an event.
    Delete,
}

impl ApiOperation {
    /// Stable lowercase name for logging.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::List => "list",
            Self::Create => "create",
            Self::Publish => "publish",
            Self::Update => "update",
            Self::Delete => "delete",
        }
    }
}

impl fmt::Display for ApiOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Unified gateway enum (dyn-compatible alternative to async trait)
// ---------------------------------------------------------------------------

/// A gateway to the remote event API.
///
/// Uses enum dispatch instead of trait objects because async methods
/// are not dyn-compatible in Rust.
pub enum ApiGateway {
    /// REST API over HTTP.
    Http(HttpGateway),
    /// Process-local stand-in for the API.
    InMemory(InMemoryGateway),
}

impl ApiGateway {
    /// Fetch every event.
    pub async fn list_events(&self) -> Result<EventsListResponse, ApiError> {
        match self {
            Self::Http(gateway) => gateway.list_events().await,
            Self::InMemory(gateway) => gateway.list_events().await,
        }
    }

    /// Create an event from a draft.
    pub async fn create_event(&self, draft: &EventDraft) -> Result<CreateEventResponse, ApiError> {
        match self {
            Self::Http(gateway) => gateway.create_event(draft).await,
            Self::InMemory(gateway) => gateway.create_event(draft).await,
        }
    }

    /// Publish the event identified by `id_video`.
    pub async fn publish_event(
        &self,
        id_video: VideoId,
        data_video: &VideoData,
    ) -> Result<VideoResponse, ApiError> {
        match self {
            Self::Http(gateway) => gateway.publish_event(id_video, data_video).await,
            Self::InMemory(gateway) => gateway.publish_event(id_video, data_video).await,
        }
    }

    /// Update the event identified by `id`.
    pub async fn update_event(
        &self,
        id: VideoId,
        data_video: &VideoData,
    ) -> Result<VideoResponse, ApiError> {
        match self {
            Self::Http(gateway) => gateway.update_event(id, data_video).await,
            Self::InMemory(gateway) => gateway.update_event(id, data_video).await,
        }
    }

    /// Delete the event identified by `id`.
    pub async fn delete_event(&self, id: VideoId) -> Result<DeleteEventResponse, ApiError> {
        match self {
            Self::Http(gateway) => gateway.delete_event(id).await,
            Self::InMemory(gateway) => gateway.delete_event(id).await,
        }
    }

    /// Human-readable name for logging.
    pub const fn name(&self) -> &str {
        match self {
            Self::Http(_) => "http",
            Self::InMemory(_) => "in-memory",
        }
    }
}

impl From<HttpGateway> for ApiGateway {
    fn from(gateway: HttpGateway) -> Self {
        Self::Http(gateway)
    }
}

impl From<InMemoryGateway> for ApiGateway {
    fn from(gateway: InMemoryGateway) -> Self {
        Self::InMemory(gateway)
    }
}

// ---------------------------------------------------------------------------
// HTTP gateway
// ---------------------------------------------------------------------------

/// Gateway for the REST event API.
///
/// Routes, relative to the configured base URL:
/// - `GET /events`
/// - `POST /events`
/// - `PUT /events/publish/{idVideo}`
/// - `PUT /events/{id}`
/// - `DELETE /events/{id}`
pub struct HttpGateway {
    client: reqwest::Client,
    base_url: String,
    api_token: Option<String>,
}

impl HttpGateway {
    /// Create a gateway from the store configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Transport`] if the HTTP client cannot be built
    /// (e.g. the TLS backend fails to initialize).
    pub fn new(config: &StoreConfig) -> Result<Self, ApiError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| ApiError::Transport(format!("HTTP client init failed: {e}")))?;

        Ok(Self {
            client,
            base_url: config.api_url.trim_end_matches('/').to_owned(),
            api_token: config.api_token.clone(),
        })
    }

    /// The configured base URL, without a trailing slash.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn list_events(&self) -> Result<EventsListResponse, ApiError> {
        let url = format!("{}/events", self.base_url);
        self.send(ApiOperation::List, self.client.get(&url)).await
    }

    async fn create_event(&self, draft: &EventDraft) -> Result<CreateEventResponse, ApiError> {
        let url = format!("{}/events", self.base_url);
        self.send(ApiOperation::Create, self.client.post(&url).json(draft))
            .await
    }

    async fn publish_event(
        &self,
        id_video: VideoId,
        data_video: &VideoData,
    ) -> Result<VideoResponse, ApiError> {
        let url = format!("{}/events/publish/{id_video}", self.base_url);
        let body = VideoDataRequest {
            data_video: data_video.clone(),
        };
        self.send(ApiOperation::Publish, self.client.put(&url).json(&body))
            .await
    }

    async fn update_event(
        &self,
        id: VideoId,
        data_video: &VideoData,
    ) -> Result<VideoResponse, ApiError> {
        let url = format!("{}/events/{id}", self.base_url);
        let body = VideoDataRequest {
            data_video: data_video.clone(),
        };
        self.send(ApiOperation::Update, self.client.put(&url).json(&body))
            .await
    }

    async fn delete_event(&self, id: VideoId) -> Result<DeleteEventResponse, ApiError> {
        let url = format!("{}/events/{id}", self.base_url);
        self.send(ApiOperation::Delete, self.client.delete(&url))
            .await
    }

    /// Send a request and decode its success body.
    ///
    /// Non-success statuses become [`ApiError::Rejected`] carrying the body
    /// when it parses as JSON.
    async fn send<T: DeserializeOwned>(
        &self,
        operation: ApiOperation,
        request: reqwest::RequestBuilder,
    ) -> Result<T, ApiError> {
        let request = match &self.api_token {
            Some(token) => request.bearer_auth(token),
            None => request,
        };

        let response = request
            .send()
            .await
            .map_err(|e| ApiError::Transport(format!("{operation} request failed: {e}")))?;

        let status = response.status();
        debug!(%operation, status = status.as_u16(), "API response received");

        if !status.is_success() {
            let body = response
                .bytes()
                .await
                .ok()
                .and_then(|bytes| serde_json::from_slice(&bytes).ok());
            return Err(ApiError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        response
            .json()
            .await
            .map_err(|e| ApiError::Decode(format!("{operation} response parse failed: {e}")))
    }
}

/// Build the HTTP gateway described by the configuration.
///
/// The in-memory gateway has no configuration and is constructed directly.
///
/// # Errors
///
/// See [`HttpGateway::new`].
pub fn create_gateway(config: &StoreConfig) -> Result<ApiGateway, ApiError> {
    let gateway = HttpGateway::new(config)?;
    debug!(base_url = gateway.base_url(), "HTTP gateway configured");
    Ok(ApiGateway::Http(gateway))
}
