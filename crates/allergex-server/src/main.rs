//! allergex server
//!
//! Run with: cargo run -p allergex-server --bin allergex-server

use std::sync::Arc;

use allergex_config::Settings;
use allergex_nlp::Engine;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("allergex=debug,info")),
        )
        .init();

    info!("Booting allergex server v{}", env!("CARGO_PKG_VERSION"));
    let settings = Settings::load()?;

    info!("Loading engine...");
    let annotator = settings.annotator.build()?;
    let engine = Arc::new(Engine::new(settings.lexicon(), annotator).await?);

    let listener = tokio::net::TcpListener::bind(settings.address()).await?;
    allergex_server::serve(listener, engine, settings.max_frame_bytes).await?;

    Ok(())
}
