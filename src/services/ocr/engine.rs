use crate::error::Result;
use crate::models::ocr_result::OcrWord;
use image::DynamicImage;

/// OCR Engine trait - abstraction over the external recognizers.
///
/// Implementations block; async callers should run them on
/// `tokio::task::spawn_blocking`.
pub trait OcrEngine: Send + Sync {
    /// Short identifier used in logs and errors
    fn name(&self) -> &'static str;

    /// Recognize words with their bounding boxes
    fn recognize_words(&self, image: &DynamicImage) -> Result<Vec<OcrWord>>;

    /// Check if the OCR engine can currently be reached
    fn is_available(&self) -> bool;
}

/// Encode an image as PNG bytes for handing to an engine
pub(crate) fn encode_png(image: &DynamicImage) -> Result<Vec<u8>> {
    let mut buffer: Vec<u8> = Vec::new();
    image.write_to(&mut std::io::Cursor::new(&mut buffer), image::ImageFormat::Png)?;
    Ok(buffer)
}
