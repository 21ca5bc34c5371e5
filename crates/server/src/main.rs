//! Voltstore Server binary.
//!
//! Serves the storefront JSON API, the admin API, and the real-time
//! invalidation WebSocket on a single port (default 3000).

#![cfg_attr(not(test), forbid(unsafe_code))]

use voltstore_server::config::ServerConfig;
use voltstore_server::db::CounterRepository;
use voltstore_server::db::counter::VISITORS_KEY;
use voltstore_server::services::auth::seed_admin;
use voltstore_server::state::AppState;
use voltstore_server::{app, db};

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    // Load configuration from environment
    let config = ServerConfig::from_env().expect("Failed to load configuration");

    // Initialize tracing with EnvFilter
    // Defaults to info level for our crate if RUST_LOG is not set
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "voltstore_server=info,tower_http=debug".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Lazy database pool: a down store is logged, never fatal. Requests
    // against it fail individually until it comes back.
    let pool = db::create_pool(&config.database_url).expect("Invalid database URL");
    match sqlx::query("SELECT 1").fetch_one(&pool).await {
        Ok(_) => tracing::info!("database reachable"),
        Err(e) => tracing::warn!(error = %e, "database unreachable at startup"),
    }

    // NOTE: Migrations are NOT run automatically on startup.
    // Run them explicitly via: cargo run -p voltstore-cli -- migrate

    let state = AppState::new(config.clone(), pool);

    // Best-effort startup fixups: the visitor counter row and the seeded
    // admin account. Failures are logged and the server starts anyway.
    if let Err(e) = CounterRepository::new(state.pool()).ensure(VISITORS_KEY).await {
        tracing::warn!(error = %e, "could not ensure visitor counter");
    }
    if let Some(seed) = &config.admin_seed
        && let Err(e) = seed_admin(state.pool(), seed).await
    {
        tracing::warn!(error = %e, "could not seed admin account");
    }

    let router = app(state);

    // Start server
    let addr = config.socket_addr();
    tracing::info!("voltstore-server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown");
}
