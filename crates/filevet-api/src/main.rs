use filevet_core::Config;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Load configuration
    let config = Config::from_env()?;

    // Initialize the application (store, services, routes)
    let (state, router) = filevet_api::setup::initialize_app(config.clone()).await?;

    // Start the server
    filevet_api::setup::start_server(&config, router).await?;

    // Drain background work before exiting
    state.orchestrator.shutdown().await;
    state.sweep_task.abort();

    Ok(())
}
