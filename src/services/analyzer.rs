use crate::error::{AnalysisError, Result};
use crate::models::config::AppConfig;
use crate::models::lab_result::AnalysisReport;
use crate::models::ocr_result::OcrWord;
use crate::services::ocr::{group_words_into_lines, parse_lab_results, OcrEngine, PreprocessingService};
use crate::services::reference_ranges::analyze_results;
use image::{DynamicImage, GenericImageView, ImageFormat};
use std::path::Path;
use std::sync::Arc;

/// File extensions accepted for report uploads
pub const SUPPORTED_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png"];

/// Runs the report pipeline: preprocess -> OCR -> group lines -> parse -> classify
#[derive(Clone)]
pub struct Analyzer {
    engine: Arc<dyn OcrEngine>,
    bucket_size: u32,
    preprocessing: Arc<PreprocessingService>,
}

impl Analyzer {
    pub fn new(engine: Arc<dyn OcrEngine>, config: &AppConfig) -> Self {
        Self {
            engine,
            bucket_size: config.grouping.bucket_size,
            preprocessing: Arc::new(PreprocessingService::new(config.preprocessing.clone())),
        }
    }

    pub fn engine(&self) -> &Arc<dyn OcrEngine> {
        &self.engine
    }

    /// Analyze a decoded image
    pub fn analyze_image(&self, image: &DynamicImage) -> Result<AnalysisReport> {
        let prepared = self.preprocessing.preprocess(image);
        let mut words = self.engine.recognize_words(&prepared)?;
        rescale_words(&mut words, image.dimensions(), prepared.dimensions());
        let lines = group_words_into_lines(&words, self.bucket_size);

        tracing::debug!(
            words = words.len(),
            lines = lines.len(),
            bucket_size = self.bucket_size,
            "Grouped OCR words into lines"
        );

        Ok(self.analyze_lines(lines))
    }

    /// Decode JPEG/PNG bytes and analyze them
    pub fn analyze_bytes(&self, bytes: &[u8]) -> Result<AnalysisReport> {
        let image = decode_report_image(bytes)?;
        self.analyze_image(&image)
    }

    /// Parse and classify lines that are already split
    pub fn analyze_lines(&self, lines: Vec<String>) -> AnalysisReport {
        let extracted = parse_lab_results(&lines);
        let results = analyze_results(extracted);

        tracing::info!(
            lines = lines.len(),
            results = results.len(),
            "Lab report analyzed"
        );

        AnalysisReport::new(lines, results)
    }
}

/// Map word boxes from the preprocessed image back to original-image pixels,
/// so the bucket size keeps its meaning when the image was resized
fn rescale_words(words: &mut [OcrWord], original: (u32, u32), prepared: (u32, u32)) {
    if original == prepared || prepared.0 == 0 || prepared.1 == 0 {
        return;
    }

    let sx = original.0 as f64 / prepared.0 as f64;
    let sy = original.1 as f64 / prepared.1 as f64;
    let map = |v: u32, s: f64| (v as f64 * s).round() as u32;

    for word in words.iter_mut() {
        word.left = map(word.left, sx);
        word.width = map(word.width, sx);
        word.top = map(word.top, sy);
        word.height = map(word.height, sy);
    }
}

/// Reject file names whose extension is not JPG, JPEG or PNG; names without
/// an extension pass and are checked by content when decoded
pub fn check_file_extension(file_name: &str) -> Result<()> {
    let ext = Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());

    match ext {
        Some(ext) if !SUPPORTED_EXTENSIONS.contains(&ext.as_str()) => {
            Err(AnalysisError::UnsupportedFormat(ext))
        }
        _ => Ok(()),
    }
}

/// Decode an uploaded report, accepting only JPEG and PNG
pub fn decode_report_image(bytes: &[u8]) -> Result<DynamicImage> {
    if bytes.is_empty() {
        return Err(AnalysisError::invalid_upload("image file is empty"));
    }

    let format = image::guess_format(bytes)?;
    if !matches!(format, ImageFormat::Jpeg | ImageFormat::Png) {
        return Err(AnalysisError::UnsupportedFormat(format!("{:?}", format)));
    }

    Ok(image::load_from_memory_with_format(bytes, format)?)
}
