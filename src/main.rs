use std::sync::Arc;

use tracing::{error, info};

use filebay::{Config, LocalDrive, WebServer};

#[tokio::main]
async fn main() {
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "config.toml".to_string());

    // Load configuration
    let mut config = match Config::load(&config_path) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load {config_path}: {e}");
            eprintln!("Using default configuration.");
            Config::default()
        }
    };
    config.apply_env_overrides();

    // Initialize logging
    if let Err(e) = filebay::logging::init(&config.logging) {
        eprintln!("Failed to initialize logging: {e}");
        // Fall back to console-only logging
        filebay::logging::init_console_only(&config.logging.level);
    }

    if let Err(e) = config.validate() {
        error!("Invalid configuration: {}", e);
        std::process::exit(1);
    }

    info!("filebay - remote file manager");

    let drive = match LocalDrive::new(&config.storage.root) {
        Ok(drive) => drive,
        Err(e) => {
            error!("Failed to open storage root {}: {}", config.storage.root, e);
            std::process::exit(1);
        }
    };
    info!("Serving files from {}", drive.root().display());

    let server = match WebServer::new(&config, Arc::new(drive)) {
        Ok(server) => server,
        Err(e) => {
            error!("{}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = server.run().await {
        error!("Web server error: {}", e);
        std::process::exit(1);
    }
}
