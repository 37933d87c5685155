//! Application wiring: state construction, routes, server startup.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use filevet_core::{Config, ValidatorMode};
use filevet_service::{
    DummyValidator, ExternalValidatorClient, RenderService, RetentionSweeper,
    ValidationOrchestrator, ValidationStrategy,
};
use filevet_store::create_status_store;
use filevet_transfer::{FileRetriever, FileStoreApi, HttpFileStore};

use crate::handlers;
use crate::state::AppState;

/// Build the status store, retriever, services, and router, and start the
/// background sweep task.
pub async fn initialize_app(config: Config) -> Result<(Arc<AppState>, Router)> {
    let store = create_status_store(&config)
        .await
        .context("Failed to create status store")?;

    let file_store: Arc<dyn FileStoreApi> = Arc::new(
        HttpFileStore::new(
            config.file_store_url.clone(),
            config.file_store_api_key.clone(),
        )
        .context("Failed to create file store client")?,
    );
    let retriever = FileRetriever::new(file_store, config.retry);

    let strategy = match config.validator_mode {
        ValidatorMode::Dummy => ValidationStrategy::Inline(Arc::new(DummyValidator)),
        ValidatorMode::External => ValidationStrategy::Callback(Arc::new(
            ExternalValidatorClient::new(
                config.validator_url.clone(),
                config.callback_base_url.clone(),
            )
            .context("Failed to create external validator client")?,
        )),
    };

    let orchestrator = Arc::new(ValidationOrchestrator::new(
        store.clone(),
        retriever.clone(),
        strategy,
    ));
    let render = Arc::new(
        RenderService::new(retriever.clone(), config.render_service_url.clone())
            .context("Failed to create render service")?,
    );
    let sweeper = Arc::new(RetentionSweeper::new(
        store,
        retriever,
        config.retention_days,
        Duration::from_secs(config.sweep_interval_secs),
    ));
    let sweep_task = sweeper.clone().start();

    let state = Arc::new(AppState {
        orchestrator,
        render,
        sweeper,
        sweep_task,
    });
    let router = setup_routes(state.clone());

    Ok((state, router))
}

/// Setup all application routes
pub fn setup_routes(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route(
            "/api/validate/{file_id}",
            post(handlers::submit).get(handlers::get_status),
        )
        .route(
            "/api/validate/{file_id}/result",
            post(handlers::save_results),
        )
        .route("/api/render/{file_id}", get(handlers::render_pdf))
        .route("/api/maintenance/cleanup", post(handlers::cleanup))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

pub async fn start_server(config: &Config, router: Router) -> Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    tracing::info!(%addr, "Server listening");
    axum::serve(listener, router)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("Shutdown signal received");
        })
        .await
        .context("Server error")?;
    Ok(())
}
