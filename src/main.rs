// Main entry point for the go-eats ordering service

use go_eats::api::{create_router, AppState};
use go_eats::config::Config;
use go_eats::core::meal::SystemClock;
use go_eats::store::{Datastore, MemoryStore, PgStore};

use anyhow::Context;
use std::sync::Arc;
use tokio::signal;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Configuration comes first so logging can honor LOG_LEVEL / LOG_FORMAT
    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            std::process::exit(1);
        }
    };

    init_tracing(&config)?;

    info!("Starting go-eats");
    info!(
        bind_address = %config.bind_address,
        port = config.port,
        session_ttl_days = config.session_ttl_days,
        meal_utc_offset_minutes = config.meal_utc_offset_minutes,
        "Configuration loaded"
    );

    let store: Arc<dyn Datastore> = match config.database_url {
        Some(ref database_url) => {
            let store = PgStore::connect(database_url, config.database_max_connections)
                .await
                .map_err(|e| {
                    error!(error = %e, "Failed to connect to database");
                    e
                })?;
            info!("Database pool initialized");

            if config.run_migrations {
                store.migrate().await?;
            }
            Arc::new(store)
        }
        None => {
            warn!("DATABASE_URL not set, using in-memory store; data is lost on restart");
            Arc::new(MemoryStore::new())
        }
    };

    let clock = Arc::new(SystemClock::new(config.meal_offset()?));
    let addr = format!("{}:{}", config.bind_address, config.port);

    let router = create_router(AppState::new(store, clock, config));

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    info!(addr = %addr, "Server listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| {
            error!(error = %e, "Server error");
            e
        })?;

    info!("Server shutdown complete");
    Ok(())
}

/// Initialize tracing subscriber based on configuration
///
/// `RUST_LOG` takes precedence over `LOG_LEVEL`.
fn init_tracing(config: &Config) -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let subscriber = fmt()
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .with_env_filter(filter);

    if config.log_format == "json" {
        subscriber.json().init();
    } else {
        subscriber.init();
    }

    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        use signal::unix::{signal, SignalKind};
        signal(SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Ctrl+C received, starting graceful shutdown");
        },
        _ = terminate => {
            info!("SIGTERM received, starting graceful shutdown");
        },
    }
}
