mod config;
mod errors;
mod insights;
mod llm_client;
mod models;
mod routes;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::insights::pipeline::{InsightPipeline, PipelineSettings};
use crate::llm_client::{GatewayConfig, GatewayOptions, HttpModelGateway};
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing credential or bad values)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Mentor API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize model gateway
    let gateway = HttpModelGateway::new(GatewayConfig {
        provider: config.llm_provider,
        api_key: config.llm_api_key.clone(),
        model: config.llm_model.clone(),
        endpoint: config.llm_endpoint.clone(),
        retry_base_delay: config.llm_retry_base_delay,
    })?;
    info!(
        "Model gateway initialized (provider: {}, model: {})",
        gateway.provider().as_str(),
        gateway.model()
    );

    // Initialize insight pipeline
    let pipeline = InsightPipeline::new(
        Arc::new(gateway),
        PipelineSettings {
            gateway_options: GatewayOptions {
                timeout: config.llm_timeout,
                max_retries: config.llm_max_retries,
                backend: None,
            },
            risk_thresholds: config.risk_thresholds,
            roadmap_weeks: config.roadmap_weeks,
            cache_ttl: config.insight_cache_ttl,
        },
    );
    match pipeline.cache() {
        Some(_) => info!(
            "Insight cache enabled (ttl: {}s)",
            config.insight_cache_ttl.as_secs()
        ),
        None => info!("Insight cache disabled"),
    }
    spawn_cache_purge(pipeline.clone(), config.insight_cache_ttl);

    // Build app state
    let state = AppState {
        pipeline,
        config: config.clone(),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: restrict CORS origins once the web client domain is fixed

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Periodically drops expired cache entries so distinct one-off requests do
/// not accumulate for the lifetime of the process.
fn spawn_cache_purge(pipeline: InsightPipeline, ttl: std::time::Duration) {
    if pipeline.cache().is_none() {
        return;
    }
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(ttl);
        interval.tick().await;
        loop {
            interval.tick().await;
            let Some(cache) = pipeline.cache() else {
                return;
            };
            if cache.is_empty() {
                continue;
            }
            let purged = cache.purge_expired();
            if purged > 0 {
                tracing::debug!(
                    "Purged {purged} expired insight cache entries, {} remaining",
                    cache.len()
                );
            }
        }
    });
}
