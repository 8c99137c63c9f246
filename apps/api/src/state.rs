use crate::config::Config;
use crate::insights::pipeline::InsightPipeline;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Owns the model gateway (`Arc<dyn ModelGateway>`) and the insight cache.
    pub pipeline: InsightPipeline,
    pub config: Config,
}
