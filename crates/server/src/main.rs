use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use darkroom_core::{
    create_authenticator, load_config, validate_config, AuthMethod, Authenticator, ImageWorker,
    JobQueue, MemoryJobQueue, MemoryObjectStore, HttpObjectStore, ObjectStore,
    ObjectStoreBackend, SqliteTaskStore, SqliteUserStore, TaskOrchestrator, TaskStore,
    TokenSigner, UserStore,
};

use darkroom_server::api::create_router;
use darkroom_server::state::AppState;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("Fatal error: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Determine config path
    let config_path = std::env::var("DARKROOM_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("config.toml"));

    info!("Loading configuration from {:?}", config_path);
    let config = load_config(&config_path)
        .with_context(|| format!("Failed to load config from {:?}", config_path))?;

    validate_config(&config).context("Configuration validation failed")?;

    info!("Configuration loaded successfully");
    info!("Auth method: {:?}", config.auth.method);
    info!("Database path: {:?}", config.database.path);

    // Create SQLite stores
    let users: Arc<dyn UserStore> = Arc::new(
        SqliteUserStore::new(&config.database.path).context("Failed to create user store")?,
    );
    let tasks: Arc<dyn TaskStore> = Arc::new(
        SqliteTaskStore::new(&config.database.path).context("Failed to create task store")?,
    );
    info!("Stores initialized");

    // Create object store from the configured backend
    let objects: Arc<dyn ObjectStore> = match config.object_store.backend {
        ObjectStoreBackend::Memory => {
            info!("Using in-memory object store");
            Arc::new(MemoryObjectStore::new())
        }
        ObjectStoreBackend::Http => {
            let http_config = config
                .object_store
                .http
                .as_ref()
                .context("http backend selected but no [object_store.http] section")?;
            info!("Using HTTP object store at {}", http_config.url);
            Arc::new(
                HttpObjectStore::new(http_config, &config.object_store.bucket)
                    .context("Failed to create HTTP object store")?,
            )
        }
    };

    // Create job queue and worker
    let queue: Arc<dyn JobQueue> = Arc::new(MemoryJobQueue::new());
    let worker = Arc::new(ImageWorker::new(
        Arc::clone(&queue),
        Arc::clone(&objects),
        Arc::clone(&tasks),
    ));
    worker.start().await;
    info!("Image worker started");

    // Create orchestrator
    let orchestrator = Arc::new(TaskOrchestrator::new(
        Arc::clone(&queue),
        Arc::clone(&tasks),
        Arc::clone(&objects),
    ));

    // Create authenticator and token signer
    let authenticator: Arc<dyn Authenticator> = Arc::from(
        create_authenticator(&config.auth, Arc::clone(&users))
            .context("Failed to create authenticator")?,
    );
    info!("Using authenticator: {}", authenticator.method_name());

    let signer = match config.auth.method {
        AuthMethod::Token => {
            let secret = config
                .auth
                .secret
                .clone()
                .context("token auth requires a secret")?;
            Some(Arc::new(TokenSigner::new(
                secret,
                config.auth.token_ttl_minutes,
            )))
        }
        AuthMethod::None => None,
    };

    // Create app state and router
    let state = Arc::new(AppState::new(
        config.clone(),
        authenticator,
        signer,
        users,
        orchestrator,
    ));
    let app = create_router(state);

    // Start server
    let addr = SocketAddr::new(config.server.host, config.server.port);
    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutting down...");
    worker.stop().await;
    info!("Image worker stopped");

    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
