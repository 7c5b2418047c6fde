use super::engine::{encode_png, OcrEngine};
use crate::error::{AnalysisError, Result};
use crate::models::config::OcrConfig;
use crate::models::ocr_result::OcrWord;
use image::DynamicImage;
use serde::Deserialize;
use std::io::Write;
use std::process::{Command, Stdio};

/// Tesseract `level` value for word rows in TSV output
const WORD_LEVEL: u32 = 5;

/// Tesseract OCR engine driving the `tesseract` binary
pub struct TesseractEngine {
    binary: String,
    language: String,
    page_seg_mode: u8,
}

/// One row of `tesseract ... tsv` output
#[derive(Debug, Deserialize)]
struct TsvRow {
    level: u32,
    left: i64,
    top: i64,
    width: i64,
    height: i64,
    conf: f64,
    #[serde(default)]
    text: String,
}

impl TesseractEngine {
    /// Create a new Tesseract engine from OCR configuration
    pub fn new(config: &OcrConfig) -> Self {
        Self {
            binary: config.tesseract_path.clone(),
            language: config.language.clone(),
            page_seg_mode: config.page_seg_mode,
        }
    }

    fn command(&self) -> Command {
        let mut cmd = Command::new(&self.binary);
        cmd.arg("stdin")
            .arg("stdout")
            .arg("-l")
            .arg(&self.language)
            .arg("--psm")
            .arg(self.page_seg_mode.to_string())
            .arg("tsv");
        cmd
    }

    /// Run tesseract on PNG bytes and return raw TSV
    fn run(&self, png: Vec<u8>) -> Result<String> {
        let mut child = self
            .command()
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| AnalysisError::EngineUnavailable {
                engine: self.name().to_string(),
                message: format!("failed to start '{}': {}", self.binary, e),
            })?;

        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| AnalysisError::ocr("tesseract stdin was not captured"))?;

        // Feed the image from a separate thread so a full stdout pipe cannot stall us
        let writer = std::thread::spawn(move || stdin.write_all(&png));

        let output = child.wait_with_output()?;
        let written = writer
            .join()
            .map_err(|_| AnalysisError::ocr("tesseract stdin writer panicked"))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(AnalysisError::ocr(format!(
                "tesseract exited with {}: {}",
                output.status,
                stderr.trim()
            )));
        }
        written?;

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

/// Parse Tesseract TSV output into word boxes.
///
/// Only word-level rows with non-blank text are kept; negative coordinates
/// are clamped to zero.
pub fn parse_tsv(tsv: &str) -> Result<Vec<OcrWord>> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .quoting(false)
        .flexible(true)
        .from_reader(tsv.as_bytes());

    let mut words = Vec::new();
    for row in reader.deserialize::<TsvRow>() {
        let row = row.map_err(|e| AnalysisError::ocr(format!("malformed tesseract TSV: {}", e)))?;

        if row.level != WORD_LEVEL || row.text.trim().is_empty() {
            continue;
        }

        words.push(OcrWord {
            text: row.text,
            left: row.left.max(0) as u32,
            top: row.top.max(0) as u32,
            width: row.width.max(0) as u32,
            height: row.height.max(0) as u32,
            confidence: row.conf,
        });
    }

    Ok(words)
}

impl OcrEngine for TesseractEngine {
    fn name(&self) -> &'static str {
        "tesseract"
    }

    fn recognize_words(&self, image: &DynamicImage) -> Result<Vec<OcrWord>> {
        let png = encode_png(image)?;
        let tsv = self.run(png)?;
        let words = parse_tsv(&tsv)?;

        tracing::debug!(words = words.len(), lang = %self.language, "Tesseract recognized words");
        Ok(words)
    }

    fn is_available(&self) -> bool {
        Command::new(&self.binary)
            .arg("--version")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map(|status| status.success())
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_TSV: &str = "level\tpage_num\tblock_num\tpar_num\tline_num\tword_num\tleft\ttop\twidth\theight\tconf\ttext
1\t1\t0\t0\t0\t0\t0\t0\t800\t600\t-1\t
2\t1\t1\t0\t0\t0\t40\t98\t400\t30\t-1\t
4\t1\t1\t1\t1\t0\t40\t98\t400\t30\t-1\t
5\t1\t1\t1\t1\t1\t40\t100\t120\t20\t96.5\tHemoglobin
5\t1\t1\t1\t1\t2\t300\t102\t40\t18\t91.2\t12.0
5\t1\t1\t1\t1\t3\t360\t101\t40\t18\t88\t\"g/dL\"
5\t1\t1\t1\t2\t1\t40\t140\t10\t20\t12.0\t
";

    #[test]
    fn test_parse_tsv_keeps_word_rows() {
        let words = parse_tsv(SAMPLE_TSV).unwrap();

        assert_eq!(words.len(), 3);
        assert_eq!(words[0].text, "Hemoglobin");
        assert_eq!(words[0].left, 40);
        assert_eq!(words[0].top, 100);
        assert_eq!(words[0].height, 20);
        assert_eq!(words[1].text, "12.0");
        assert!((words[1].confidence - 91.2).abs() < 1e-9);
    }

    #[test]
    fn test_parse_tsv_does_not_unquote() {
        let words = parse_tsv(SAMPLE_TSV).unwrap();
        assert_eq!(words[2].text, "\"g/dL\"");
    }

    #[test]
    fn test_parse_tsv_header_only() {
        let words = parse_tsv(
            "level\tpage_num\tblock_num\tpar_num\tline_num\tword_num\tleft\ttop\twidth\theight\tconf\ttext\n",
        )
        .unwrap();
        assert!(words.is_empty());
    }

    #[test]
    fn test_parse_tsv_malformed() {
        let result = parse_tsv("level\tleft\ttop\twidth\theight\tconf\ttext\nfive\t1\t2\t3\t4\t5\tx\n");
        assert!(result.is_err());
    }

    #[test]
    fn test_missing_binary_is_unavailable() {
        let config = OcrConfig {
            tesseract_path: "/nonexistent/tesseract-binary".to_string(),
            ..OcrConfig::default()
        };
        let engine = TesseractEngine::new(&config);

        assert!(!engine.is_available());

        let image = DynamicImage::new_luma8(8, 8);
        let err = engine.recognize_words(&image).unwrap_err();
        assert!(matches!(err, AnalysisError::EngineUnavailable { .. }));
    }

    #[test]
    #[ignore] // Requires tesseract installed on the system
    fn test_recognize_blank_image() {
        let engine = TesseractEngine::new(&OcrConfig::default());
        let blank = DynamicImage::new_luma8(200, 60);

        let words = engine.recognize_words(&blank).unwrap();
        assert!(words.is_empty());
    }
}
