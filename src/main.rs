use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::{error, info};

use locara::config::DEFAULT_CONFIG_PATH;
use locara::web::WebServer;
use locara::{ArchiveStore, Config};

/// Locara - self-hosted file archive.
#[derive(Parser, Debug)]
#[command(name = "locara", version, about)]
struct Cli {
    /// Path to configuration file.
    #[arg(long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Server port (overrides config file).
    #[arg(long, value_parser = clap::value_parser!(u16).range(1..))]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Load configuration
    let mut config = match Config::load_with_env(&cli.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load {}: {e}", cli.config.display());
            return ExitCode::FAILURE;
        }
    };

    if let Some(port) = cli.port {
        config.port = port;
    }

    if let Err(e) = config.validate() {
        eprintln!("Invalid configuration: {e}");
        return ExitCode::FAILURE;
    }

    // Initialize logging
    if let Err(e) = locara::logging::init(&config.logging) {
        eprintln!("Failed to initialize logging: {e}");
        locara::logging::init_console_only(&config.logging.level);
    }

    info!("Starting Locara server on port {}", config.port);
    info!("Using uploads directory: {}", config.use_directory);
    info!("Configured {} user(s)", config.users.len());

    if let Ok(proxies) = std::env::var("TRUSTED_PROXIES") {
        if !proxies.is_empty() {
            info!("Running behind reverse proxy, TRUSTED_PROXIES={}", proxies);
        }
    }

    let store = match ArchiveStore::new(&config.use_directory) {
        Ok(store) => store,
        Err(e) => {
            error!("Failed to open archive directory: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let server = match WebServer::new(&config, store) {
        Ok(server) => server,
        Err(e) => {
            error!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = server.run().await {
        error!("Server failed: {}", e);
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}
