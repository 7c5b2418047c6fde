pub mod analyze;
pub mod config;
pub mod server;

use crate::error::{AnalysisError, Result};
use crate::models::config::OcrConfig;
use crate::services::ocr::{create_engine, OcrEngine};
use std::sync::Arc;

/// Build the configured engine and probe it, off the async workers.
///
/// The HTTP engine uses a blocking client, which must not be created or
/// driven from inside the runtime.
pub(crate) async fn prepare_engine(config: &OcrConfig) -> Result<Arc<dyn OcrEngine>> {
    let config = config.clone();
    tokio::task::spawn_blocking(move || {
        let engine = create_engine(&config)?;
        if !engine.is_available() {
            tracing::warn!(
                engine = engine.name(),
                "OCR engine is not reachable; analysis will fail until it is"
            );
        }
        Ok::<_, AnalysisError>(engine)
    })
    .await
    .map_err(|e| AnalysisError::ocr(format!("engine setup task failed: {}", e)))?
}
