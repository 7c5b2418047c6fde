use crate::models::lab_result::ExtractedValue;
use crate::services::reference_ranges::TEST_ALIASES;
use once_cell::sync::Lazy;
use regex::Regex;

/// Decimal or integer, optionally digit-grouped ("7,500", "2,50,000")
static NUMBER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\d{1,3}(?:,\d{2,3})*,\d{3}(?:\.\d+)?|\d+\.\d+|\d+")
        .expect("number pattern is valid")
});

/// Decimal or integer without grouping
static PLAIN_NUMBER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\d+\.\d+|\d+").expect("number pattern is valid"));

/// Alias hit inside a line
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AliasMatch {
    pub alias: &'static str,
    pub test: &'static str,
    /// Byte offset just past the alias in the lowercased line
    pub end: usize,
}

/// Find the first alias (in table order) contained in the line, case-insensitive
pub fn match_alias(line: &str) -> Option<AliasMatch> {
    let lower = line.to_lowercase();
    TEST_ALIASES.iter().find_map(|&(alias, test)| {
        lower.find(alias).map(|start| AliasMatch {
            alias,
            test,
            end: start + alias.len(),
        })
    })
}

/// Parse the first number in the text.
///
/// A digit group must end the number: in "1,2345" the comma is not a
/// separator and only "1" is read. Returns `None` when there is no numeric
/// token, or when the token is not a finite float.
pub fn first_number(text: &str) -> Option<f64> {
    let found = NUMBER_RE.find(text)?;
    let token = if found.as_str().contains(',')
        && text[found.end()..].starts_with(|c: char| c.is_ascii_digit())
    {
        PLAIN_NUMBER_RE.find_at(text, found.start())?.as_str()
    } else {
        found.as_str()
    };
    let cleaned = token.replace(',', "");
    match cleaned.parse::<f64>() {
        Ok(value) if value.is_finite() => Some(value),
        Ok(value) => {
            tracing::debug!(token, value, "Ignoring non-finite number");
            None
        }
        Err(e) => {
            tracing::debug!(token, error = %e, "Ignoring malformed number");
            None
        }
    }
}

/// Extract one test/value pair from a line.
///
/// The first matching alias decides the test; the value is the first number
/// after that alias. Lines without an alias, or without a number after it,
/// yield nothing.
pub fn parse_line(line: &str) -> Option<ExtractedValue> {
    let hit = match_alias(line)?;
    let lower = line.to_lowercase();
    let rest = lower.get(hit.end..)?;

    match first_number(rest) {
        Some(value) => Some(ExtractedValue {
            test: hit.test.to_string(),
            value,
        }),
        None => {
            tracing::debug!(line, alias = hit.alias, "Alias matched but no value follows");
            None
        }
    }
}

/// Extract test/value pairs from every line, in line order
pub fn parse_lab_results<S: AsRef<str>>(lines: &[S]) -> Vec<ExtractedValue> {
    lines
        .iter()
        .filter_map(|line| parse_line(line.as_ref()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parsed(line: &str) -> Option<(String, f64)> {
        parse_line(line).map(|v| (v.test, v.value))
    }

    // ============================================================
    // Alias matching
    // ============================================================

    #[test]
    fn test_parse_hemoglobin() {
        assert_eq!(parsed("Hemoglobin 12.0"), Some(("Hemoglobin".to_string(), 12.0)));
    }

    #[test]
    fn test_parse_case_insensitive() {
        assert_eq!(parsed("GLUCOSE 70"), Some(("Glucose".to_string(), 70.0)));
        assert_eq!(parsed("fbs: 88 mg/dl"), Some(("Glucose".to_string(), 88.0)));
    }

    #[test]
    fn test_parse_british_spelling() {
        assert_eq!(parsed("Haemoglobin 14.2 g/dL"), Some(("Hemoglobin".to_string(), 14.2)));
    }

    #[test]
    fn test_mchc_not_mistaken_for_mch() {
        assert_eq!(parsed("MCHC 33.0 g/dL"), Some(("MCHC".to_string(), 33.0)));
        assert_eq!(
            parsed("Mean Corpuscular Hemoglobin Concentration 34.1"),
            Some(("MCHC".to_string(), 34.1))
        );
        assert_eq!(
            parsed("Mean Corpuscular Hemoglobin 29.5 pg"),
            Some(("MCH".to_string(), 29.5))
        );
    }

    #[test]
    fn test_total_leucocyte_count() {
        assert_eq!(
            parsed("Total Leucocyte Count 8200 /cumm"),
            Some(("Total Leucocyte Count".to_string(), 8200.0))
        );
    }

    #[test]
    fn test_unrecognized_line_dropped() {
        assert_eq!(parsed("Vitamin D 32.5 ng/mL"), None);
        assert_eq!(parsed("Patient Name: John Smith Age 45"), None);
    }

    #[test]
    fn test_alias_without_number_dropped() {
        assert_eq!(parsed("Hemoglobin"), None);
        assert_eq!(parsed("Platelet count (see remarks)"), None);
    }

    #[test]
    fn test_number_before_alias_ignored() {
        assert_eq!(parsed("3 Creatinine"), None);
        assert_eq!(parsed("4. Creatinine 0.9 mg/dL"), Some(("Creatinine".to_string(), 0.9)));
    }

    #[test]
    fn test_first_following_number_wins() {
        // Value, then the reference interval
        assert_eq!(
            parsed("Glucose 105 70 - 99 mg/dL"),
            Some(("Glucose".to_string(), 105.0))
        );
    }

    #[test]
    fn test_match_alias_reports_position() {
        let hit = match_alias("Result: WBC 7000").unwrap();
        assert_eq!(hit.test, "WBC");
        assert_eq!(hit.alias, "wbc");
        assert_eq!(hit.end, "Result: WBC".len());
    }

    // ============================================================
    // Number extraction
    // ============================================================

    #[test]
    fn test_first_number_decimal() {
        assert_eq!(first_number(" 4.85 mill/cumm"), Some(4.85));
    }

    #[test]
    fn test_first_number_thousands_separator() {
        assert_eq!(first_number(" 7,500 /cumm"), Some(7500.0));
        assert_eq!(first_number(" 2,50,000"), Some(250000.0));
        assert_eq!(first_number(" 1,234,567"), Some(1234567.0));
        assert_eq!(first_number(" 250,000.5"), Some(250000.5));
    }

    #[test]
    fn test_first_number_broken_grouping() {
        assert_eq!(first_number(" 1,2345"), Some(1.0));
        assert_eq!(first_number(" 12,3456 /cumm"), Some(12.0));
        assert_eq!(first_number(" 7,500mg"), Some(7500.0));
        assert_eq!(first_number(" 105, 110"), Some(105.0));
    }

    #[test]
    fn test_first_number_none() {
        assert_eq!(first_number(" g/dL"), None);
        assert_eq!(first_number(""), None);
    }

    #[test]
    fn test_parse_lab_results_multiple_lines() {
        let lines = vec![
            "Complete Blood Count".to_string(),
            "Hemoglobin 12.0 g/dL".to_string(),
            "RBC 5.1".to_string(),
            "Comments: none".to_string(),
            "Platelets 2,10,000".to_string(),
        ];

        let results = parse_lab_results(&lines);
        let names: Vec<&str> = results.iter().map(|r| r.test.as_str()).collect();
        assert_eq!(names, vec!["Hemoglobin", "RBC", "Platelets"]);
        assert_eq!(results[1].value, 5.1);
        assert_eq!(results[2].value, 210000.0);
    }
}
