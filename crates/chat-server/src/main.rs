//! wallet-chat HTTP Server
//!
//! Axum-based server exposing the tool-calling chat loop. Every chat
//! request names its provider (or uses the server default) and may carry
//! a connected wallet address that the model can query with the Solana
//! tools.

mod config;
mod handlers;
mod state;

use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use chat_core::ToolRegistry;
use solana_tools::{
    ChainClient, HttpPriceFeed, MockChainClient, MockPriceFeed, PriceFeed, RpcChainClient,
};

use crate::config::ServerConfig;
use crate::handlers::{chat_handler, health_check, list_tools};
use crate::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment first so RUST_LOG from .env applies
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,tower_http=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ServerConfig::from_env()?;

    // Chain and market data backends
    let (chain, prices): (Arc<dyn ChainClient>, Arc<dyn PriceFeed>) = if config.mock_chain {
        tracing::warn!("⚠ SOLANA_MOCK_DATA set - serving fixture wallet data");
        (Arc::new(MockChainClient::new()), Arc::new(MockPriceFeed::new()))
    } else {
        tracing::info!("✓ Solana RPC: {}", config.chain.rpc_url);
        (
            Arc::new(RpcChainClient::new(config.chain.clone())?),
            Arc::new(HttpPriceFeed::new(config.prices.clone())?),
        )
    };
    tracing::info!("✓ Chain backend: {}, price feed: {}", chain.name(), prices.name());

    let mut tools = ToolRegistry::new();
    solana_tools::register_all(&mut tools, chain, prices)?;

    tracing::info!("Registered {} tools:", tools.len());
    for name in tools.names() {
        tracing::info!("  • {}", name);
    }

    let state = AppState::new(&config, tools, AppState::providers_from_env())?;

    let configured = state.configured();
    if configured.is_empty() {
        tracing::warn!("⚠ No AI provider configured - chat requests will fail");
        tracing::warn!("  Set ANTHROPIC_API_KEY, OPENAI_API_KEY, GEMINI_API_KEY or DOUBAO_API_KEY in .env");
    } else {
        for kind in &configured {
            tracing::info!("✓ Provider configured: {}", kind);
        }
    }
    if !configured.contains(&config.default_provider) {
        tracing::warn!("⚠ Default provider {} has no API key", config.default_provider);
    }

    let addr = config.bind_addr.clone();
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("══════════════════════════════════════════════════");
    tracing::info!("🚀 wallet-chat server running on http://{}", addr);
    tracing::info!("══════════════════════════════════════════════════");
    tracing::info!("");
    tracing::info!("Endpoints:");
    tracing::info!("  GET  /health     - Health check");
    tracing::info!("  GET  /api/tools  - List tool declarations");
    tracing::info!("  POST /api/chat   - Send conversation");
    tracing::info!("");

    axum::serve(listener, app(state)).await?;

    Ok(())
}

/// Router with all routes and middleware
fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health_check))
        .route("/api/tools", get(list_tools))
        .route("/api/chat", post(chat_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
