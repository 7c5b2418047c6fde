pub mod analyzer;
pub mod config;
pub mod ocr;
pub mod reference_ranges;
pub mod report_renderer;
