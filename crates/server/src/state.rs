//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::PgPool;
use tokio::sync::broadcast;

use voltstore_core::ChangeEvent;

use crate::config::ServerConfig;
use crate::services::auth::TokenService;
use crate::services::images::ImageService;

/// Capacity of the invalidation-channel fan-out buffer. Receivers that fall
/// further behind miss events, consistent with the at-most-once contract.
const EVENT_CHANNEL_CAPACITY: usize = 64;

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to shared
/// resources like the database pool, configuration, and the broadcast sender
/// feeding every connected WebSocket.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: ServerConfig,
    pool: PgPool,
    tokens: TokenService,
    images: ImageService,
    events: broadcast::Sender<ChangeEvent>,
}

impl AppState {
    /// Create a new application state.
    #[must_use]
    pub fn new(config: ServerConfig, pool: PgPool) -> Self {
        let tokens = TokenService::new(&config.jwt_secret, config.token_ttl_days);
        let images = ImageService::new(config.asset_host.clone());
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);

        Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                tokens,
                images,
                events,
            }),
        }
    }

    /// Get a reference to the server configuration.
    #[must_use]
    pub fn config(&self) -> &ServerConfig {
        &self.inner.config
    }

    /// Get a reference to the database connection pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    /// Get a reference to the bearer token service.
    #[must_use]
    pub fn tokens(&self) -> &TokenService {
        &self.inner.tokens
    }

    /// Get a reference to the image upload service.
    #[must_use]
    pub fn images(&self) -> &ImageService {
        &self.inner.images
    }

    /// Subscribe to the invalidation channel.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<ChangeEvent> {
        self.inner.events.subscribe()
    }

    /// Broadcast an event to every connected client.
    ///
    /// Best effort: the result is intentionally discarded. A send only fails
    /// when no client is connected, and a failed notification must never
    /// block the mutation that triggered it.
    pub fn notify(&self, event: ChangeEvent) {
        let _ = self.inner.events.send(event);
    }
}
