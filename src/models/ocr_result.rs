use serde::{Deserialize, Serialize};

/// Single recognized word with its bounding box in image pixels
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OcrWord {
    pub text: String,
    pub left: u32,
    pub top: u32,
    pub width: u32,
    pub height: u32,
    /// Engine confidence, 0-100 for Tesseract, 0-1 for the HTTP server
    pub confidence: f64,
}

impl OcrWord {
    /// Create a word with zero-size box and full confidence
    pub fn new(text: impl Into<String>, left: u32, top: u32) -> Self {
        Self {
            text: text.into(),
            left,
            top,
            width: 0,
            height: 0,
            confidence: 100.0,
        }
    }

    /// Check if the word carries at least one ASCII letter or digit
    pub fn has_alphanumeric(&self) -> bool {
        self.text.trim().chars().any(|c| c.is_ascii_alphanumeric())
    }
}
