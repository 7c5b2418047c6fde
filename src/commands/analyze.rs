use crate::cli::{AnalyzeArgs, OutputFormat};
use crate::error::{AnalysisError, Result};
use crate::models::config::AppConfig;
use crate::models::lab_result::AnalysisReport;
use crate::services::analyzer::{check_file_extension, Analyzer};
use crate::services::report_renderer::{render_page, render_text, PageContext, UploadedImage};

/// Analyze one image file and print or write the rendered report
pub async fn run_analyze(args: &AnalyzeArgs, config: &AppConfig) -> Result<()> {
    check_file_extension(&args.image.to_string_lossy())?;
    let bytes = tokio::fs::read(&args.image).await?;
    tracing::info!(path = %args.image.display(), bytes = bytes.len(), "Analyzing report image");

    let engine = super::prepare_engine(&config.ocr).await?;
    let analyzer = Analyzer::new(engine, config);

    let report = {
        let bytes = bytes.clone();
        tokio::task::spawn_blocking(move || analyzer.analyze_bytes(&bytes))
            .await
            .map_err(|e| AnalysisError::ocr(format!("analysis task failed: {}", e)))??
    };

    let rendered = render_output(&report, args.format, &bytes)?;

    match &args.output {
        Some(path) => {
            tokio::fs::write(path, rendered).await?;
            tracing::info!(path = %path.display(), "Report written");
        }
        None => print!("{}", rendered),
    }

    Ok(())
}

/// Render a report in the requested format
pub fn render_output(report: &AnalysisReport, format: OutputFormat, image: &[u8]) -> Result<String> {
    match format {
        OutputFormat::Text => Ok(render_text(report)),
        OutputFormat::Json => Ok(serde_json::to_string_pretty(report)? + "\n"),
        OutputFormat::Html => {
            let mime = match image::guess_format(image) {
                Ok(image::ImageFormat::Png) => "image/png",
                _ => "image/jpeg",
            };
            Ok(render_page(&PageContext {
                report: Some(report),
                image: Some(UploadedImage { bytes: image, mime }),
                error: None,
            }))
        }
    }
}
