//! Headless monitor for the `VideoBox` event API.
//!
//! Builds an HTTP-backed [`EventStore`], loads the event list, and then
//! reloads it on a fixed interval, logging every state change the store
//! publishes. Useful for checking that the API and the store agree without
//! running the UI.
//!
//! # Architecture
//!
//! ```text
//! interval --> EventStore::load_all --> HTTP API
//!                     |
//!                     +--> watch --> log
//! ```

use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use videobox_store::{EventStore, StoreConfig, StoreState, create_gateway};

/// Application entry point.
///
/// Initializes logging, loads configuration from environment variables,
/// then runs the refresh loop until `Ctrl-C`.
///
/// # Errors
///
/// Returns an error if configuration is invalid, the HTTP client cannot be
/// built, or the initial load fails.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize structured logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    info!("videobox-monitor starting");

    // Load configuration from environment
    let config = StoreConfig::from_env()?;
    info!(
        api_url = config.api_url,
        authenticated = config.api_token.is_some(),
        message_ttl_ms = config.message_ttl.as_millis(),
        refresh_interval_ms = config.refresh_interval.as_millis(),
        error_surfacing = %config.error_surfacing,
        "configuration loaded"
    );

    let gateway = create_gateway(&config)?;
    let store = EventStore::new(gateway, &config);
    let mut changes = store.subscribe();

    // The first load must succeed; later refresh failures are only logged.
    store.load_all().await?;
    for event in store.events() {
        info!(
            id_video = %event.id_video,
            title = event.title,
            url = event.url,
            published = event.is_published(),
            "event"
        );
    }
    drop(changes.borrow_and_update());

    let mut refresh = tokio::time::interval(config.refresh_interval);
    // The first tick completes immediately; the initial load already ran.
    refresh.tick().await;

    loop {
        tokio::select! {
            _ = refresh.tick() => {
                if let Err(e) = store.load_all().await {
                    warn!(error = %e, "refresh failed, keeping cached events");
                }
            }
            changed = changes.changed() => {
                if changed.is_err() {
                    break;
                }
                let state = changes.borrow_and_update().clone();
                log_state(&state);
            }
            _ = tokio::signal::ctrl_c() => {
                info!("shutdown requested");
                break;
            }
        }
    }

    info!("videobox-monitor stopped");
    Ok(())
}

/// Log a summary of a published state.
fn log_state(state: &StoreState) {
    info!(
        events = state.events.len(),
        published = state.events.iter().filter(|e| e.is_published()).count(),
        active = ?state.active_event.as_ref().map(|e| e.id_video),
        message = ?state.message_event.as_ref().map(|m| m.lines()),
        "state changed"
    );
}
