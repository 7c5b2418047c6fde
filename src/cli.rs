use crate::models::config::{AppConfig, OcrBackend};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug, Clone)]
#[command(name = "easylab")]
#[command(about = "Extract and classify lab test values from blood test report images")]
#[command(version)]
pub struct Cli {
    /// Config file (defaults to the platform config directory)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Analyze a report image and print the results
    Analyze(AnalyzeArgs),
    /// Serve the upload form over HTTP
    Serve(ServeArgs),
    /// Inspect or create the config file
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Overrides shared by commands that run the pipeline
#[derive(clap::Args, Debug, Clone, Default)]
pub struct PipelineArgs {
    /// Vertical bucket height in pixels used to group words into lines
    #[arg(long)]
    pub bucket_size: Option<u32>,

    /// OCR backend
    #[arg(long, value_enum)]
    pub engine: Option<OcrBackend>,

    /// Base URL of the OCR server (http engine)
    #[arg(long)]
    pub ocr_url: Option<String>,

    /// Tesseract language code
    #[arg(long)]
    pub lang: Option<String>,
}

impl PipelineArgs {
    /// Overlay command-line values onto the loaded configuration
    pub fn apply(&self, config: &mut AppConfig) {
        if let Some(bucket_size) = self.bucket_size {
            config.grouping.bucket_size = bucket_size;
        }
        if let Some(engine) = self.engine {
            config.ocr.engine = engine;
        }
        if let Some(url) = &self.ocr_url {
            config.ocr.server_url = url.clone();
        }
        if let Some(lang) = &self.lang {
            config.ocr.language = lang.clone();
        }
    }
}

#[derive(clap::Args, Debug, Clone)]
pub struct AnalyzeArgs {
    /// JPG or PNG image of the report
    pub image: PathBuf,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Write output to a file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    #[command(flatten)]
    pub pipeline: PipelineArgs,
}

#[derive(clap::Args, Debug, Clone)]
pub struct ServeArgs {
    #[arg(long)]
    pub host: Option<String>,

    #[arg(short, long)]
    pub port: Option<u16>,

    #[command(flatten)]
    pub pipeline: PipelineArgs,
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigAction {
    /// Print the effective configuration as JSON
    Show,
    /// Write the default configuration if none exists
    Init,
    /// Print the config file path
    Path,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
    Html,
}
