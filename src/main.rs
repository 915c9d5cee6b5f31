use std::net::SocketAddr;
use std::sync::Arc;

use pdf_chat::config::Config;
use pdf_chat::gemini::GeminiClient;
use pdf_chat::server::{AppState, create_router};
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pdf_chat=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // A missing credential is fatal to startup.
    let config = Config::from_env()?;
    info!(
        "Configuration loaded: index at {}, models {}/{}",
        config.index_dir.display(),
        config.gemini.embedding_model,
        config.gemini.generation_model
    );

    let gemini = GeminiClient::new(&config.gemini)?;

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    let state = AppState {
        config: Arc::new(config),
        gemini: Arc::new(gemini),
    };

    let app = create_router(state);

    info!("Server listening on {}", addr);
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
