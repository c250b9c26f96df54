//! Application Startup
//!
//! Application building and server initialization.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use axum::Router;
use sqlx::PgPool;
use tokio::net::TcpListener;
use tower_http::compression::CompressionLayer;

use crate::config::Settings;
use crate::infrastructure::database;
use crate::infrastructure::storage::{LocalStorage, ObjectStorage};
use crate::presentation::http::routes;
use crate::presentation::middleware::{create_cors_layer, create_trace_layer};
use crate::shared::shutdown::CleanupRegistry;

/// How long each registered cleanup action may take on shutdown.
const CLEANUP_TIMEOUT: Duration = Duration::from_secs(10);

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub storage: Arc<dyn ObjectStorage>,
    pub settings: Arc<Settings>,
}

/// Application instance
pub struct Application {
    listener: TcpListener,
    router: Router,
    cleanup: Arc<CleanupRegistry>,
}

impl Application {
    /// Build the application from settings
    pub async fn build(settings: Settings) -> Result<Self> {
        // Create database pool
        let db = database::create_pool(&settings.database)
            .await
            .context("Failed to create database pool")?;
        tracing::info!("Database connection pool created");

        if settings.database.run_migrations {
            database::run_migrations(&db)
                .await
                .context("Failed to run migrations")?;
            tracing::info!("Database migrations applied");
        }

        // Object storage for uploads
        let storage: Arc<dyn ObjectStorage> =
            Arc::new(LocalStorage::from_settings(&settings.storage));

        // Cleanup actions run in reverse registration order on shutdown.
        let cleanup = Arc::new(CleanupRegistry::new());
        {
            let db = db.clone();
            cleanup.register("database-pool", move || async move {
                db.close().await;
            });
        }

        // Create app state
        let state = AppState {
            db,
            storage,
            settings: Arc::new(settings.clone()),
        };

        // Build router with middleware
        let router = routes::create_router(state)
            .layer(create_trace_layer())
            .layer(create_cors_layer(&settings.cors))
            .layer(CompressionLayer::new());

        // Bind to address
        let addr: SocketAddr = settings
            .server_addr()
            .parse()
            .context("Invalid server address configuration")?;
        let listener = TcpListener::bind(addr).await?;
        tracing::info!("Listening on {}", addr);

        Ok(Self {
            listener,
            router,
            cleanup,
        })
    }

    /// Run the server until a shutdown signal arrives, then drain and run
    /// the cleanup registry.
    pub async fn run_until_stopped(self) -> Result<()> {
        let cleanup = Arc::clone(&self.cleanup);

        axum::serve(self.listener, self.router)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        cleanup.run_all(CLEANUP_TIMEOUT).await;
        Ok(())
    }

    /// Get the bound address
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        return;
    }
    tracing::info!("Shutdown signal received");
}
