use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Classification of a value against its reference range
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum TestStatus {
    Normal,
    Low,
    High,
    Unknown,
}

impl TestStatus {
    /// Display color used by the report renderer
    pub fn color(&self) -> &'static str {
        match self {
            Self::Normal => "green",
            Self::Low | Self::High => "orange",
            Self::Unknown => "gray",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Normal => "Normal",
            Self::Low => "Low",
            Self::High => "High",
            Self::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for TestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Test name and value pulled out of one OCR line, before classification
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractedValue {
    pub test: String,
    pub value: f64,
}

/// Classified lab result
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LabResult {
    pub test: String,
    pub value: f64,
    pub status: TestStatus,
}

/// Everything produced by one analysis run
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AnalysisReport {
    /// Lines after grouping, top to bottom
    pub lines: Vec<String>,
    pub results: Vec<LabResult>,
    pub generated_at: DateTime<Local>,
}

impl AnalysisReport {
    pub fn new(lines: Vec<String>, results: Vec<LabResult>) -> Self {
        Self {
            lines,
            results,
            generated_at: Local::now(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// Results whose status is Low or High
    pub fn abnormal(&self) -> impl Iterator<Item = &LabResult> {
        self.results
            .iter()
            .filter(|r| matches!(r.status, TestStatus::Low | TestStatus::High))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_colors() {
        assert_eq!(TestStatus::Normal.color(), "green");
        assert_eq!(TestStatus::Low.color(), "orange");
        assert_eq!(TestStatus::High.color(), "orange");
        assert_eq!(TestStatus::Unknown.color(), "gray");
    }

    #[test]
    fn test_lab_result_json_shape() {
        let result = LabResult {
            test: "Glucose".to_string(),
            value: 70.0,
            status: TestStatus::Normal,
        };
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"test": "Glucose", "value": 70.0, "status": "Normal"})
        );
    }

    #[test]
    fn test_report_abnormal_filter() {
        let report = AnalysisReport::new(
            vec![],
            vec![
                LabResult { test: "RBC".into(), value: 5.0, status: TestStatus::Normal },
                LabResult { test: "Glucose".into(), value: 120.0, status: TestStatus::High },
                LabResult { test: "Hemoglobin".into(), value: 12.0, status: TestStatus::Low },
            ],
        );
        let abnormal: Vec<&str> = report.abnormal().map(|r| r.test.as_str()).collect();
        assert_eq!(abnormal, vec!["Glucose", "Hemoglobin"]);
        assert!(!report.is_empty());
    }
}
