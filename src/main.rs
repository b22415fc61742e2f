use tracing_subscriber::EnvFilter;

use corpus_rag::api;
use corpus_rag::config::Config;
use corpus_rag::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env();
    tracing::info!("Profiles: {}", config.profiles_path.display());
    tracing::info!("Generation endpoint: {}", config.generation.base_url);
    tracing::info!("distllm endpoint: {}", config.distllm.base_url);
    tracing::info!("Corpus search endpoint: {}", config.corpus_search.base_url);

    let state = AppState::new(config.clone())?;
    let app = api::router(state);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    tracing::info!("Server listening on {}", config.bind_addr);

    axum::serve(listener, app).await?;
    Ok(())
}
