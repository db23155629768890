use taskmaster_backend::{
    app,
    config::{Config, StoreKind},
    store::{InMemoryTaskStore, RedisTaskStore, StoreError, TaskStore},
    AppState,
};
use tokio::net::TcpListener;
use tokio::signal;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "taskmaster_backend=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(error) => {
            tracing::error!(%error, "Configuration error");
            std::process::exit(1);
        }
    };

    let address = match config.socket_addr() {
        Ok(address) => address,
        Err(error) => {
            tracing::error!(%error, "Configuration error");
            std::process::exit(1);
        }
    };

    let state = match open_store(&config).await {
        Ok(state) => state,
        Err(error) => {
            tracing::error!(%error, "Failed to initialize task store");
            std::process::exit(1);
        }
    };

    let router = app(state, &config.static_dir);

    let listener = match TcpListener::bind(address).await {
        Ok(listener) => listener,
        Err(error) => {
            tracing::error!(%error, "Failed to bind to address {}", address);
            std::process::exit(1);
        }
    };
    tracing::info!("Server running on http://{}", address);

    if let Err(error) = axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        tracing::error!(%error, "Server error");
        std::process::exit(1);
    }

    tracing::info!("Server shutdown complete");
}

// An unreachable Redis is not fatal: the server starts and requests answer 500
// until it comes back.
async fn open_store(config: &Config) -> Result<AppState, StoreError> {
    match config.store {
        StoreKind::Memory => {
            tracing::warn!("Using in-memory task store, tasks are lost on restart");
            Ok(AppState::new(InMemoryTaskStore::new()))
        }
        StoreKind::Redis => {
            let store = RedisTaskStore::open(&config.redis_url)?;
            match store.ping().await {
                Ok(()) => tracing::info!(redis_url = %config.redis_url, "Redis connected"),
                Err(error) => {
                    tracing::error!(%error, redis_url = %config.redis_url, "Redis connection error")
                }
            }
            Ok(AppState::new(store))
        }
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(error) = signal::ctrl_c().await {
            tracing::warn!(%error, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(error) => {
                tracing::warn!(%error, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => tracing::info!("Received Ctrl+C, shutting down"),
        () = terminate => tracing::info!("Received SIGTERM, shutting down"),
    }
}
