use anyhow::Context as _;

use recipe_compass::{
    api::{create_router, AppState},
    config::Config,
    logging,
    services::{loader, FileSource},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logging::init()?;

    let config = Config::from_env()?;

    // Without a dataset there is nothing to filter; stop instead of serving empty results
    let source = FileSource::new(&config.data_path);
    let catalog = loader::load(&source)
        .await
        .with_context(|| format!("Error initializing data from {}", config.data_path))?;

    // Initialize application state
    let state = AppState::new(catalog, &config)?;

    // Create the router with all routes
    let app = create_router(state);

    // Start the server
    let address = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .with_context(|| format!("bind {}", address))?;
    tracing::info!(address = %address, "Server running");
    axum::serve(listener, app).await?;

    Ok(())
}
