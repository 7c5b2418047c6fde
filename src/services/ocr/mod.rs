pub mod engine;
pub mod http_ocr;
pub mod line_grouping;
pub mod parser;
pub mod preprocessing;
pub mod tesseract;

// Re-export main types
pub use engine::OcrEngine;
pub use http_ocr::HttpOcrClient;
pub use line_grouping::group_words_into_lines;
pub use parser::{parse_lab_results, parse_line};
pub use preprocessing::PreprocessingService;
pub use tesseract::TesseractEngine;

use crate::error::Result;
use crate::models::config::{OcrBackend, OcrConfig};
use std::sync::Arc;

/// Build the configured OCR engine
pub fn create_engine(config: &OcrConfig) -> Result<Arc<dyn OcrEngine>> {
    let engine: Arc<dyn OcrEngine> = match config.engine {
        OcrBackend::Tesseract => Arc::new(TesseractEngine::new(config)),
        OcrBackend::Http => Arc::new(HttpOcrClient::new(config)?),
    };

    tracing::info!(engine = engine.name(), "OCR engine configured");
    Ok(engine)
}
