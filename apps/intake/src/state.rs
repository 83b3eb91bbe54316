use std::sync::Arc;

use sqlx::PgPool;

use crate::config::Config;
use crate::extraction::render::PdfiumRenderer;
use crate::extraction::LayeredExtractor;
use crate::storage::ObjectStore;
use crate::structuring::ResumeStructurer;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub store: ObjectStore,
    /// Profile-photo bucket on the same S3 connection.
    pub photos: ObjectStore,
    /// Pluggable structuring backend. Default: LlmResumeStructurer.
    pub structurer: Arc<dyn ResumeStructurer>,
    /// Layered text extractor, run on the blocking pool.
    pub extractor: Arc<LayeredExtractor>,
    pub renderer: PdfiumRenderer,
    pub config: Config,
}
