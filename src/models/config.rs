use serde::{Deserialize, Serialize};

/// OCR backend choice
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OcrBackend {
    /// Local `tesseract` binary
    Tesseract,
    /// Remote OCR server speaking the `/ocr` box protocol
    Http,
}

impl Default for OcrBackend {
    fn default() -> Self {
        Self::Tesseract
    }
}

/// OCR engine configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct OcrConfig {
    pub engine: OcrBackend,
    pub tesseract_path: String,
    pub language: String,
    /// Tesseract page segmentation mode (3 = fully automatic)
    pub page_seg_mode: u8,
    pub server_url: String,
    pub timeout_secs: u64,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            engine: OcrBackend::Tesseract,
            tesseract_path: "tesseract".to_string(),
            language: "eng".to_string(),
            page_seg_mode: 3,
            server_url: "http://127.0.0.1:39835".to_string(),
            timeout_secs: 30,
        }
    }
}

/// Line grouping configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct GroupingConfig {
    /// Vertical bucket height in pixels; words with equal `top / bucket_size` form one line
    pub bucket_size: u32,
}

impl Default for GroupingConfig {
    fn default() -> Self {
        Self { bucket_size: 10 }
    }
}

/// Image preprocessing configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PreprocessingConfig {
    pub grayscale: bool,
    pub scale_factor: f64,
    pub threshold: bool,
}

impl Default for PreprocessingConfig {
    fn default() -> Self {
        Self {
            grayscale: true,
            scale_factor: 1.0,
            threshold: false,
        }
    }
}

/// Web form server configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub max_upload_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8501,
            max_upload_bytes: 20 * 1024 * 1024,
        }
    }
}

/// Complete application configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub ocr: OcrConfig,
    #[serde(default)]
    pub grouping: GroupingConfig,
    #[serde(default)]
    pub preprocessing: PreprocessingConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

impl AppConfig {
    /// Reject values the pipeline cannot work with
    pub fn validate(&self) -> Result<(), String> {
        if self.grouping.bucket_size == 0 {
            return Err("grouping.bucket_size must be greater than 0".to_string());
        }

        if !(self.preprocessing.scale_factor > 0.0) {
            return Err(format!(
                "preprocessing.scale_factor must be positive, got {}",
                self.preprocessing.scale_factor
            ));
        }

        if self.server.port == 0 {
            return Err("server.port must be non-zero".to_string());
        }

        if self.ocr.language.trim().is_empty() {
            return Err("ocr.language must not be empty".to_string());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_config_default() {
        let config = AppConfig::default();

        assert_eq!(config.ocr.engine, OcrBackend::Tesseract);
        assert_eq!(config.ocr.language, "eng");
        assert_eq!(config.grouping.bucket_size, 10);
        assert!(config.preprocessing.grayscale);
        assert_eq!(config.preprocessing.scale_factor, 1.0);
        assert!(!config.preprocessing.threshold);
        assert_eq!(config.server.port, 8501);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_app_config_serialization() {
        let config = AppConfig::default();
        let json = serde_json::to_string_pretty(&config).unwrap();

        let deserialized: AppConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(config, deserialized);
    }

    #[test]
    fn test_partial_config_fills_defaults() {
        let json = r#"{ "grouping": { "bucket_size": 14 }, "ocr": { "engine": "http" } }"#;
        let config: AppConfig = serde_json::from_str(json).unwrap();

        assert_eq!(config.grouping.bucket_size, 14);
        assert_eq!(config.ocr.engine, OcrBackend::Http);
        assert_eq!(config.ocr.tesseract_path, "tesseract");
        assert_eq!(config.server, ServerConfig::default());
    }

    #[test]
    fn test_backend_serialization() {
        assert_eq!(
            serde_json::to_string(&OcrBackend::Tesseract).unwrap(),
            "\"tesseract\""
        );
        assert_eq!(serde_json::to_string(&OcrBackend::Http).unwrap(), "\"http\"");
    }

    #[test]
    fn test_validate_rejects_zero_bucket() {
        let mut config = AppConfig::default();
        config.grouping.bucket_size = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_bad_scale() {
        let mut config = AppConfig::default();
        config.preprocessing.scale_factor = 0.0;
        assert!(config.validate().is_err());

        config.preprocessing.scale_factor = f64::NAN;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_zero_port() {
        let mut config = AppConfig::default();
        config.server.port = 0;
        assert!(config.validate().is_err());
    }
}
