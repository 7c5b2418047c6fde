use thiserror::Error;

/// Errors surfaced by the analysis pipeline and its outer surfaces.
///
/// Per-line parse failures are not errors: the parser skips those lines.
#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to decode image: {0}")]
    ImageDecode(#[from] image::ImageError),

    #[error("Unsupported image format: {0} (expected JPG or PNG)")]
    UnsupportedFormat(String),

    #[error("Invalid upload: {message}")]
    InvalidUpload { message: String },

    #[error("Upload exceeds the {limit} byte limit")]
    UploadTooLarge { limit: usize },

    #[error("OCR engine '{engine}' is not available: {message}")]
    EngineUnavailable { engine: String, message: String },

    #[error("OCR failed: {message}")]
    Ocr { message: String },

    #[error("OCR server request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    Config { message: String },
}

impl AnalysisError {
    pub fn ocr(message: impl Into<String>) -> Self {
        Self::Ocr {
            message: message.into(),
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    pub fn invalid_upload(message: impl Into<String>) -> Self {
        Self::InvalidUpload {
            message: message.into(),
        }
    }

    /// True when the failure came from the caller's input rather than from us
    /// or the OCR collaborator.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::ImageDecode(_)
                | Self::UnsupportedFormat(_)
                | Self::InvalidUpload { .. }
                | Self::UploadTooLarge { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, AnalysisError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_error_classification() {
        assert!(AnalysisError::UnsupportedFormat("gif".into()).is_client_error());
        assert!(AnalysisError::invalid_upload("missing file").is_client_error());
        assert!(AnalysisError::UploadTooLarge { limit: 10 }.is_client_error());
        assert!(!AnalysisError::ocr("boom").is_client_error());
        assert!(!AnalysisError::config("bad").is_client_error());
    }

    #[test]
    fn test_error_messages() {
        let err = AnalysisError::EngineUnavailable {
            engine: "tesseract".into(),
            message: "not found".into(),
        };
        assert_eq!(
            err.to_string(),
            "OCR engine 'tesseract' is not available: not found"
        );
    }
}
