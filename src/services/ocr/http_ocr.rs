use super::engine::{encode_png, OcrEngine};
use crate::error::{AnalysisError, Result};
use crate::models::config::OcrConfig;
use crate::models::ocr_result::OcrWord;
use base64::{engine::general_purpose, Engine as _};
use image::DynamicImage;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Boxes overlapping more than this are treated as duplicate detections
const DUPLICATE_IOU_THRESHOLD: f64 = 0.3;

/// HTTP OCR client that talks to a remote OCR server
#[derive(Clone)]
pub struct HttpOcrClient {
    client: reqwest::blocking::Client,
    base_url: String,
}

#[derive(Serialize)]
struct ImageRequest {
    image_base64: String,
}

/// Single text box with bounding box coordinates
#[derive(Deserialize, Clone, Debug)]
struct TextBox {
    #[serde(rename = "box")]
    bbox: Vec<Vec<f64>>, // 4 corner points [[x1,y1], [x2,y2], [x3,y3], [x4,y4]]
    text: String,
    #[serde(default)]
    score: f64,
}

/// OCR response from the server
#[derive(Deserialize)]
struct OcrResponse {
    boxes: Vec<TextBox>,
}

impl TextBox {
    /// Get bounding box as (x_min, y_min, x_max, y_max)
    fn get_bbox_rect(&self) -> (f64, f64, f64, f64) {
        let xs = self.bbox.iter().filter_map(|p| p.first().copied());
        let ys = self.bbox.iter().filter_map(|p| p.get(1).copied());

        let (x_min, x_max) = xs.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), x| {
            (lo.min(x), hi.max(x))
        });
        let (y_min, y_max) = ys.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), y| {
            (lo.min(y), hi.max(y))
        });

        (x_min, y_min, x_max, y_max)
    }

    /// A box needs at least one complete corner point
    fn is_valid(&self) -> bool {
        self.bbox.iter().any(|p| p.len() >= 2)
    }

    /// Compute IoU (Intersection over Union) with another box
    fn iou(&self, other: &TextBox) -> f64 {
        let (x1_min, y1_min, x1_max, y1_max) = self.get_bbox_rect();
        let (x2_min, y2_min, x2_max, y2_max) = other.get_bbox_rect();

        let inter_x_min = x1_min.max(x2_min);
        let inter_y_min = y1_min.max(y2_min);
        let inter_x_max = x1_max.min(x2_max);
        let inter_y_max = y1_max.min(y2_max);

        if inter_x_max <= inter_x_min || inter_y_max <= inter_y_min {
            return 0.0;
        }

        let inter_area = (inter_x_max - inter_x_min) * (inter_y_max - inter_y_min);
        let union_area = self.area() + other.area() - inter_area;

        if union_area <= 0.0 {
            return 0.0;
        }

        inter_area / union_area
    }

    /// Get box area
    fn area(&self) -> f64 {
        let (x_min, y_min, x_max, y_max) = self.get_bbox_rect();
        (x_max - x_min) * (y_max - y_min)
    }

    fn into_word(self) -> OcrWord {
        let (x_min, y_min, x_max, y_max) = self.get_bbox_rect();
        OcrWord {
            left: x_min.max(0.0).round() as u32,
            top: y_min.max(0.0).round() as u32,
            width: (x_max - x_min).max(0.0).round() as u32,
            height: (y_max - y_min).max(0.0).round() as u32,
            confidence: self.score,
            text: self.text,
        }
    }
}

/// Drop boxes that overlap a larger kept box by more than `iou_threshold`
fn filter_overlapping_boxes(boxes: Vec<TextBox>, iou_threshold: f64) -> Vec<TextBox> {
    let mut remaining = boxes;
    remaining.sort_by(|a, b| {
        b.area()
            .partial_cmp(&a.area())
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let mut kept: Vec<TextBox> = Vec::with_capacity(remaining.len());
    for candidate in remaining {
        if kept.iter().all(|k| k.iou(&candidate) <= iou_threshold) {
            kept.push(candidate);
        }
    }
    kept
}

impl HttpOcrClient {
    /// Create a new HTTP OCR client
    pub fn new(config: &OcrConfig) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: config.server_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Check if server is healthy
    pub fn health_check(&self) -> Result<()> {
        let url = format!("{}/health", self.base_url);
        let response = self.client.get(&url).send()?;

        if !response.status().is_success() {
            return Err(AnalysisError::EngineUnavailable {
                engine: self.name().to_string(),
                message: format!("health check returned {}", response.status()),
            });
        }
        Ok(())
    }

    /// Encode image to base64
    fn encode_image(image: &DynamicImage) -> Result<String> {
        let buffer = encode_png(image)?;
        Ok(general_purpose::STANDARD.encode(&buffer))
    }

    /// Call the OCR endpoint and return the raw boxes
    fn request_boxes(&self, image: &DynamicImage) -> Result<Vec<TextBox>> {
        let image_base64 = Self::encode_image(image)?;
        let url = format!("{}/ocr", self.base_url);

        let response = self
            .client
            .post(&url)
            .json(&ImageRequest { image_base64 })
            .send()?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AnalysisError::ocr(format!(
                "OCR server error ({}): {}",
                status, error_text
            )));
        }

        let data: OcrResponse = response.json()?;
        Ok(data.boxes)
    }
}

impl OcrEngine for HttpOcrClient {
    fn name(&self) -> &'static str {
        "http"
    }

    fn recognize_words(&self, image: &DynamicImage) -> Result<Vec<OcrWord>> {
        let boxes: Vec<TextBox> = self
            .request_boxes(image)?
            .into_iter()
            .filter(TextBox::is_valid)
            .collect();
        let received = boxes.len();

        let words: Vec<OcrWord> = filter_overlapping_boxes(boxes, DUPLICATE_IOU_THRESHOLD)
            .into_iter()
            .map(TextBox::into_word)
            .collect();

        tracing::debug!(
            received,
            kept = words.len(),
            server = %self.base_url,
            "HTTP OCR recognized words"
        );
        Ok(words)
    }

    fn is_available(&self) -> bool {
        self.health_check().is_ok()
    }
}
