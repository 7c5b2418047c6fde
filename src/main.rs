use clap::Parser;
use easylab_lib::cli::Cli;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(e) = easylab_lib::run(cli).await {
        tracing::error!(error = %e, "easylab failed");
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
