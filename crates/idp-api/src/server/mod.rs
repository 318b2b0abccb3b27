//! Server setup and initialization
//!
//! Provides the application builder and server runner.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use idp_common::{AppConfig, AppError, JwtService, MobileCipher, StoreBackend};
use idp_core::{AccountRepository, NotificationDispatcher};
use idp_db::{
    create_pool, run_migrations, MemoryAccountRepository, PgAccountRepository, MIGRATIONS_DIR,
};
use idp_service::{LocalFileStore, ServiceContextBuilder, ServiceSettings};
use tokio::net::TcpListener;
use tracing::{info, warn};

use crate::middleware::{apply_middleware, apply_middleware_with_config};
use crate::routes::{create_router, health_routes};
use crate::state::AppState;

/// Build the complete Axum application with all routes and middleware
///
/// # Errors
/// Returns `AppError::Config` if the rate limit settings are unusable
pub fn create_app(state: AppState) -> Result<Router, AppError> {
    let config = state.config();

    let api = apply_middleware_with_config(
        create_router(state.service_context().settings().max_upload_bytes),
        &config.rate_limit,
        &config.cors,
        config.app.env.is_production(),
    )?;
    let health = apply_middleware(health_routes());

    Ok(api.merge(health).with_state(state))
}

/// Initialize all dependencies and create AppState
pub async fn create_app_state(config: AppConfig) -> Result<AppState, AppError> {
    let dispatcher = idp_mail::build_dispatcher(&config.mail)?;
    create_app_state_with(config, dispatcher).await
}

/// Create AppState with an explicit notification dispatcher
pub async fn create_app_state_with(
    config: AppConfig,
    dispatcher: Arc<dyn NotificationDispatcher>,
) -> Result<AppState, AppError> {
    let account_repo = create_account_repo(&config).await?;
    info!(dispatcher = dispatcher.name(), "Notification dispatcher ready");

    let jwt_service = Arc::new(JwtService::new(
        &config.jwt.secret,
        config.jwt.session_token_expiry,
    ));
    let mobile_cipher = Arc::new(MobileCipher::new(&config.encryption.mobile_secret));
    let file_store = Arc::new(LocalFileStore::new(&config.storage.upload_dir));

    let service_context = ServiceContextBuilder::new()
        .account_repo(account_repo)
        .dispatcher(dispatcher)
        .file_store(file_store)
        .jwt_service(jwt_service)
        .mobile_cipher(mobile_cipher)
        .settings(ServiceSettings::from_config(&config))
        .build()
        .map_err(|e| AppError::Config(e.to_string()))?;

    Ok(AppState::new(service_context, config))
}

async fn create_account_repo(config: &AppConfig) -> Result<Arc<dyn AccountRepository>, AppError> {
    match config.store.backend {
        StoreBackend::Postgres => {
            let db_config = config
                .database
                .as_ref()
                .ok_or_else(|| AppError::Config("DATABASE_URL is required".to_string()))?;

            info!("Connecting to PostgreSQL...");
            let pool = create_pool(db_config)
                .await
                .map_err(|e| AppError::Database(e.to_string()))?;
            run_migrations(&pool, MIGRATIONS_DIR)
                .await
                .map_err(|e| AppError::Database(e.to_string()))?;
            info!("PostgreSQL connection established");

            Ok(Arc::new(PgAccountRepository::new(pool)))
        }
        StoreBackend::Memory => {
            warn!("Using the in-memory credential store; accounts are lost on restart");
            Ok(Arc::new(MemoryAccountRepository::new()))
        }
    }
}

/// Run the HTTP server
pub async fn run_server(app: Router, addr: SocketAddr) -> Result<(), AppError> {
    info!("Starting HTTP server on {}", addr);

    let listener = TcpListener::bind(addr)
        .await
        .map_err(|e| AppError::Config(format!("Failed to bind to {addr}: {e}")))?;

    info!("Server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| AppError::Config(format!("Server error: {e}")))?;

    Ok(())
}

/// Run the complete server with configuration
pub async fn run(config: AppConfig) -> Result<(), AppError> {
    let address = config.api.address();
    let addr = tokio::net::lookup_host(&address)
        .await
        .map_err(|e| AppError::Config(format!("Invalid listen address {address}: {e}")))?
        .next()
        .ok_or_else(|| AppError::Config(format!("Listen address {address} did not resolve")))?;

    let state = create_app_state(config).await?;
    let app = create_app(state)?;

    run_server(app, addr).await
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
