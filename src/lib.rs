pub mod cli;
pub mod commands;
pub mod error;
pub mod models;
pub mod services;
pub mod utils;

use cli::{Cli, Command};
use commands::config::{init_config_manager, load_config, run_config_action};
use commands::server::{start_server, ServerState};
use error::{AnalysisError, Result};
use services::analyzer::Analyzer;
use std::net::SocketAddr;

pub use models::lab_result::{AnalysisReport, LabResult, TestStatus};

/// Entry point shared by the binary: load config, apply flags, dispatch
pub async fn run(cli: Cli) -> Result<()> {
    utils::logger::init_logger(cli.verbose, cli.json_logs);

    let manager = init_config_manager(cli.config.as_deref())?;

    match &cli.command {
        Command::Config { action } => {
            println!("{}", run_config_action(&manager, *action)?);
            Ok(())
        }
        Command::Analyze(args) => {
            let mut config = load_config(&manager)?;
            args.pipeline.apply(&mut config);
            config.validate().map_err(AnalysisError::config)?;

            commands::analyze::run_analyze(args, &config).await
        }
        Command::Serve(args) => {
            let mut config = load_config(&manager)?;
            args.pipeline.apply(&mut config);
            if let Some(host) = &args.host {
                config.server.host = host.clone();
            }
            if let Some(port) = args.port {
                config.server.port = port;
            }
            config.validate().map_err(AnalysisError::config)?;

            let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
                .parse()
                .map_err(|e| AnalysisError::config(format!("Invalid listen address: {}", e)))?;

            let engine = commands::prepare_engine(&config.ocr).await?;
            let analyzer = Analyzer::new(engine, &config);
            let state = ServerState::new(analyzer, config.server.max_upload_bytes);
            start_server(addr, state).await
        }
    }
}
