//! Client-side store for the `VideoBox` event API.
//!
//! This crate keeps an in-memory mirror of the remote collection of video
//! events for a UI layer:
//!
//! - **State** ([`StoreState`]): the cached event list, the UI's active
//!   selection, and a transient feedback message
//! - **Actions** on [`EventStore`]: `load_all`, `create`, `publish`,
//!   `update`, `delete` (one gateway call each) and `select_active`
//! - **Subscriptions** via [`tokio::sync::watch`] so views re-render on
//!   every state write
//! - **Gateways** ([`ApiGateway`]): the REST API over `reqwest`, or an
//!   in-memory stand-in for offline use and tests
//!
//! # Architecture
//!
//! ```text
//! UI --> EventStore action --> ApiGateway --> remote API
//!                  |
//!                  +--> StoreState write --> watch subscribers
//!                  +--> message clear timer (generation-checked)
//! ```
//!
//! The store is an explicitly constructed handle, not a global. Configuration
//! comes from the environment via [`StoreConfig::from_env`].

pub mod config;
pub mod error;
pub mod gateway;
pub mod memory;
pub mod state;
pub mod store;

// Re-export primary types for convenience.
pub use config::{ConfigError, ErrorSurfacing, StoreConfig};
pub use error::{ApiError, StoreError};
pub use gateway::{ApiGateway, ApiOperation, HttpGateway, create_gateway};
pub use memory::InMemoryGateway;
pub use state::StoreState;
pub use store::EventStore;
