//! sessionfold CLI binary entry point.

use clap::Parser;
use tracing_subscriber::EnvFilter;

use sessionfold::cli::{commands, Cli, Commands};
use sessionfold::config::RelayConfig;

#[tokio::main]
async fn main() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("sessionfold=info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .compact()
        .try_init();

    let cli = Cli::parse();
    let config = match RelayConfig::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };

    let result = match cli.command {
        Commands::Run(args) => commands::handle_run(args, &config).await,
        Commands::Digest(args) => commands::handle_digest(args, &config).await,
        Commands::Batch(args) => commands::handle_batch(args, &config).await,
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
