use crate::models::lab_result::{ExtractedValue, LabResult, TestStatus};

/// Clinically normal interval for a lab value, bounds inclusive
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReferenceRange {
    pub low: f64,
    pub high: f64,
}

impl ReferenceRange {
    pub const fn new(low: f64, high: f64) -> Self {
        Self { low, high }
    }

    /// Classify a value; both bounds count as Normal
    pub fn classify(&self, value: f64) -> TestStatus {
        if value < self.low {
            TestStatus::Low
        } else if value > self.high {
            TestStatus::High
        } else {
            TestStatus::Normal
        }
    }
}

/// Canonical test name -> reference range
pub const REFERENCE_RANGES: &[(&str, ReferenceRange)] = &[
    ("Hemoglobin", ReferenceRange::new(13.5, 17.5)),
    ("WBC", ReferenceRange::new(4000.0, 11000.0)),
    ("RBC", ReferenceRange::new(4.5, 5.9)),
    ("Platelets", ReferenceRange::new(150000.0, 450000.0)),
    ("Glucose", ReferenceRange::new(70.0, 99.0)),
    ("Creatinine", ReferenceRange::new(0.6, 1.2)),
    ("Urea", ReferenceRange::new(10.0, 50.0)),
    ("Cholesterol", ReferenceRange::new(125.0, 200.0)),
    ("Hematocrit", ReferenceRange::new(38.3, 48.6)),
    ("MCH", ReferenceRange::new(27.0, 33.0)),
    ("MCHC", ReferenceRange::new(31.5, 35.5)),
    ("RDW", ReferenceRange::new(11.5, 14.5)),
    ("Total Leucocyte Count", ReferenceRange::new(4000.0, 11000.0)),
    ("Neutrophils", ReferenceRange::new(40.0, 70.0)),
    ("Lymphocytes", ReferenceRange::new(20.0, 40.0)),
    ("Monocytes", ReferenceRange::new(2.0, 8.0)),
    ("Eosinophils", ReferenceRange::new(1.0, 6.0)),
    ("Basophils", ReferenceRange::new(0.0, 1.0)),
];

/// Lowercase alias -> canonical test name.
///
/// Searched in order and the first alias contained in a line wins, so an
/// alias must come before every shorter alias it contains as a substring.
pub const TEST_ALIASES: &[(&str, &str)] = &[
    ("mean corpuscular hemoglobin concentration", "MCHC"),
    ("mean corpuscular haemoglobin concentration", "MCHC"),
    ("mchc", "MCHC"),
    ("mean corpuscular hemoglobin", "MCH"),
    ("mean corpuscular haemoglobin", "MCH"),
    ("mch", "MCH"),
    ("hemoglobin (hb)", "Hemoglobin"),
    ("haemoglobin", "Hemoglobin"),
    ("hemoglobin", "Hemoglobin"),
    ("hb", "Hemoglobin"),
    ("total leucocyte count", "Total Leucocyte Count"),
    ("total leukocyte count", "Total Leucocyte Count"),
    ("tlc", "Total Leucocyte Count"),
    ("white blood cell", "WBC"),
    ("wbc", "WBC"),
    ("red cell distribution width", "RDW"),
    ("rdw", "RDW"),
    ("red blood cell", "RBC"),
    ("rbc", "RBC"),
    ("platelets", "Platelets"),
    ("platelet", "Platelets"),
    ("plt", "Platelets"),
    ("fasting blood sugar", "Glucose"),
    ("glucose", "Glucose"),
    ("fbs", "Glucose"),
    ("creatinine", "Creatinine"),
    ("urea", "Urea"),
    ("cholesterol", "Cholesterol"),
    ("hematocrit", "Hematocrit"),
    ("hct", "Hematocrit"),
    ("neutrophils", "Neutrophils"),
    ("lymphocytes", "Lymphocytes"),
    ("monocytes", "Monocytes"),
    ("eosinophils", "Eosinophils"),
    ("basophils", "Basophils"),
];

/// Look up the reference range of a canonical test name
pub fn reference_range(test: &str) -> Option<ReferenceRange> {
    REFERENCE_RANGES
        .iter()
        .find(|(name, _)| *name == test)
        .map(|(_, range)| *range)
}

/// Classify a value for a test; tests missing from the table are Unknown
pub fn classify(test: &str, value: f64) -> TestStatus {
    reference_range(test)
        .map(|range| range.classify(value))
        .unwrap_or(TestStatus::Unknown)
}

/// Classify every extracted value, keeping input order
pub fn analyze_results(values: Vec<ExtractedValue>) -> Vec<LabResult> {
    values
        .into_iter()
        .map(|extracted| {
            let status = classify(&extracted.test, extracted.value);
            LabResult {
                test: extracted.test,
                value: extracted.value,
                status,
            }
        })
        .collect()
}
