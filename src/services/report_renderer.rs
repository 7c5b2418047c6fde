//! HTML and plain-text rendering of analysis reports.

use crate::models::lab_result::{AnalysisReport, LabResult};
use base64::{engine::general_purpose, Engine as _};

pub const PAGE_TITLE: &str = "Easylab - Lab Report Analyzer";
pub const NO_RESULTS_MESSAGE: &str = "No recognizable lab results found in the image.";

/// Uploaded image to echo back on the results page
pub struct UploadedImage<'a> {
    pub bytes: &'a [u8],
    pub mime: &'a str,
}

/// Inputs for a full page render; everything optional so the same template
/// serves the empty form, the results, and the error view
#[derive(Default)]
pub struct PageContext<'a> {
    pub report: Option<&'a AnalysisReport>,
    pub image: Option<UploadedImage<'a>>,
    pub error: Option<&'a str>,
}

/// Format a value the way reports print it: integral values keep one decimal
pub fn format_value(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{:.1}", value)
    } else {
        value.to_string()
    }
}

/// One color-coded result block
pub fn render_result_block(result: &LabResult) -> String {
    let color = result.status.color();
    format!(
        r#"<div class="result" style="border-left: 5px solid {color}; padding: 0.5rem 1rem; margin-bottom: 1rem; background-color: #f9f9f9; border-radius: 6px;">
    <strong>{test}</strong><br>
    Value: {value}
    <span style="color:{color}; font-weight: bold;">({status})</span>
</div>"#,
        color = color,
        test = html_escape(&result.test),
        value = html_escape(&format_value(result.value)),
        status = result.status,
    )
}

/// Results section: heading plus one block per result, or the no-results warning
pub fn render_results(report: &AnalysisReport) -> String {
    if report.is_empty() {
        return format!(
            r#"<div class="warning">{}</div>"#,
            html_escape(NO_RESULTS_MESSAGE)
        );
    }

    let blocks = report
        .results
        .iter()
        .map(render_result_block)
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "<h2>Lab Test Results</h2>\n{blocks}\n<p class=\"generated\">Generated {generated}</p>",
        blocks = blocks,
        generated = report.generated_at.format("%Y-%m-%d %H:%M:%S"),
    )
}

/// Full HTML page with the upload form
pub fn render_page(ctx: &PageContext<'_>) -> String {
    let error_html = ctx
        .error
        .map(|e| format!(r#"<div class="error">{}</div>"#, html_escape(e)))
        .unwrap_or_default();

    let image_html = ctx
        .image
        .as_ref()
        .map(|img| {
            format!(
                r#"<figure><img src="data:{mime};base64,{data}" alt="Uploaded Report"><figcaption>Uploaded Report</figcaption></figure>"#,
                mime = html_escape(img.mime),
                data = general_purpose::STANDARD.encode(img.bytes),
            )
        })
        .unwrap_or_default();

    let results_html = ctx.report.map(render_results).unwrap_or_default();

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="UTF-8">
<title>{title}</title>
<style>
body {{ font-family: system-ui, sans-serif; max-width: 760px; margin: 2rem auto; padding: 0 1rem; color: #222; }}
form {{ margin: 1.5rem 0; padding: 1rem; border: 1px dashed #bbb; border-radius: 6px; }}
figure img {{ max-width: 100%; border: 1px solid #ddd; }}
figcaption {{ color: #666; font-size: 0.85rem; }}
.warning {{ padding: 0.75rem 1rem; background: #fff8e1; border-left: 5px solid #f0ad4e; border-radius: 6px; }}
.error {{ padding: 0.75rem 1rem; background: #fdecea; border-left: 5px solid #d9534f; border-radius: 6px; }}
.generated {{ color: #888; font-size: 0.8rem; }}
</style>
</head>
<body>
<h1>{title}</h1>
<p>Upload a photo or scan of your blood test report.</p>
<form action="/analyze" method="post" enctype="multipart/form-data">
<label for="report">Choose an image file (JPG, PNG)</label>
<input type="file" id="report" name="report" accept=".jpg,.jpeg,.png,image/jpeg,image/png" required>
<button type="submit">Analyze</button>
</form>
{error}
{image}
{results}
</body>
</html>"#,
        title = html_escape(PAGE_TITLE),
        error = error_html,
        image = image_html,
        results = results_html,
    )
}

/// Plain-text table for terminal output
pub fn render_text(report: &AnalysisReport) -> String {
    if report.is_empty() {
        return format!("{}\n", NO_RESULTS_MESSAGE);
    }

    let width = report
        .results
        .iter()
        .map(|r| r.test.len())
        .max()
        .unwrap_or(0)
        .max("Test".len());

    let mut out = format!("{:<width$}  {:>12}  {}\n", "Test", "Value", "Status", width = width);
    for result in &report.results {
        out.push_str(&format!(
            "{:<width$}  {:>12}  {}\n",
            result.test,
            format_value(result.value),
            result.status,
            width = width
        ));
    }

    let flagged: Vec<String> = report
        .abnormal()
        .map(|r| format!("{} ({})", r.test, r.status))
        .collect();
    if !flagged.is_empty() {
        out.push_str(&format!(
            "\n{} of {} outside reference range: {}\n",
            flagged.len(),
            report.results.len(),
            flagged.join(", ")
        ));
    }
    out
}

fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::lab_result::TestStatus;

    fn result(test: &str, value: f64, status: TestStatus) -> LabResult {
        LabResult {
            test: test.to_string(),
            value,
            status,
        }
    }

    #[test]
    fn test_format_value() {
        assert_eq!(format_value(12.0), "12.0");
        assert_eq!(format_value(7500.0), "7500.0");
        assert_eq!(format_value(4.85), "4.85");
        assert_eq!(format_value(0.0), "0.0");
    }

    #[test]
    fn test_block_uses_status_color() {
        let html = render_result_block(&result("Hemoglobin", 12.0, TestStatus::Low));
        assert!(html.contains("border-left: 5px solid orange"));
        assert!(html.contains("<strong>Hemoglobin</strong>"));
        assert!(html.contains("Value: 12.0"));
        assert!(html.contains("(Low)"));

        let normal = render_result_block(&result("Glucose", 70.0, TestStatus::Normal));
        assert!(normal.contains("solid green"));

        let unknown = render_result_block(&result("Ferritin", 70.0, TestStatus::Unknown));
        assert!(unknown.contains("solid gray"));
    }

    #[test]
    fn test_block_escapes_test_name() {
        let html = render_result_block(&result("<script>", 1.0, TestStatus::Unknown));
        assert!(html.contains("&lt;script&gt;"));
        assert!(!html.contains("<script>"));
    }

    #[test]
    fn test_results_one_block_per_result() {
        let report = AnalysisReport::new(
            vec![],
            vec![
                result("RBC", 5.0, TestStatus::Normal),
                result("WBC", 12000.0, TestStatus::High),
            ],
        );
        let html = render_results(&report);
        assert!(html.contains("Lab Test Results"));
        assert_eq!(html.matches(r#"class="result""#).count(), 2);
    }

    #[test]
    fn test_empty_report_shows_warning() {
        let report = AnalysisReport::new(vec!["noise".into()], vec![]);
        let html = render_results(&report);
        assert!(html.contains(NO_RESULTS_MESSAGE));
        assert!(!html.contains("Lab Test Results"));
    }

    #[test]
    fn test_page_without_report_is_form_only() {
        let html = render_page(&PageContext::default());
        assert!(html.contains(PAGE_TITLE));
        assert!(html.contains(r#"name="report""#));
        assert!(!html.contains("Lab Test Results"));
        assert!(!html.contains(NO_RESULTS_MESSAGE));
    }

    #[test]
    fn test_page_embeds_image_and_error() {
        let html = render_page(&PageContext {
            report: None,
            image: Some(UploadedImage {
                bytes: b"abc",
                mime: "image/png",
            }),
            error: Some("OCR failed: <boom>"),
        });
        assert!(html.contains("data:image/png;base64,YWJj"));
        assert!(html.contains("OCR failed: &lt;boom&gt;"));
    }

    #[test]
    fn test_render_text_table() {
        let report = AnalysisReport::new(
            vec![],
            vec![result("Total Leucocyte Count", 8200.0, TestStatus::Normal)],
        );
        let text = render_text(&report);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("Test"));
        assert!(lines[1].contains("8200.0"));
        assert!(lines[1].ends_with("Normal"));
    }

    #[test]
    fn test_render_text_summarizes_abnormal() {
        let report = AnalysisReport::new(
            vec![],
            vec![
                result("Hemoglobin", 12.0, TestStatus::Low),
                result("Glucose", 70.0, TestStatus::Normal),
                result("WBC", 12500.0, TestStatus::High),
            ],
        );
        let text = render_text(&report);
        assert_eq!(
            text.lines().last(),
            Some("2 of 3 outside reference range: Hemoglobin (Low), WBC (High)")
        );
    }

    #[test]
    fn test_render_text_empty() {
        let report = AnalysisReport::new(vec![], vec![]);
        assert_eq!(render_text(&report), format!("{}\n", NO_RESULTS_MESSAGE));
    }
}
