//! Psychic Chat - streaming cold-reading chat API
//!
//! Screens each request, picks the conversation phase from the length of the
//! client-supplied history, assembles the persona prompt, and relays the
//! upstream model's tokens back as a server-sent event stream.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod config;
mod conversation;
mod core;
mod knowledge;
mod providers;
mod routes;

use crate::config::Config;
use crate::core::ChatEngine;
use crate::knowledge::KnowledgeLoader;
use crate::providers::Provider;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub chat_engine: Arc<ChatEngine>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "psychic_chat=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::load()?;
    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;

    let gateway = Provider::from_config(&config)?;
    tracing::info!(
        "Upstream: {} ({}, max {} tokens)",
        gateway.name(),
        gateway.model(),
        config.max_tokens
    );

    let knowledge = KnowledgeLoader::new(&config.knowledge_dir, config.knowledge_max_file_size);
    tracing::info!("Reference text from {}", knowledge.dir().display());

    let chat_engine = Arc::new(ChatEngine::new(gateway, knowledge));

    let state = AppState {
        config,
        chat_engine,
    };

    let app = Router::new()
        .merge(routes::router())
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    tracing::info!("Psychic Chat API running at http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
