use std::sync::Arc;

use crate::pipeline::formalizer::ReportPipeline;
use crate::reports::store::ReportStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Generator is pluggable behind `TextGenerator`; production uses the Gemini client.
    pub pipeline: ReportPipeline,
    pub store: Arc<ReportStore>,
}
