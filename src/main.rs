//! Atlas Swap terminal client - Main executable
//!
//! Signs customers and administrators in against the hosted backend and
//! drives the swap desk screens from line commands on stdin.
use anyhow::Context;
use atlas_swap::{App, AppConfig, ServiceContainer};
use dotenv::dotenv;
use log::{error, info};
use tokio::io::{AsyncBufReadExt, BufReader};

/// Application entry point
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenv().ok();

    // Initialize logging with default level of "info"
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));
    info!("Starting Atlas Swap v{}", atlas_swap::VERSION);

    let config = AppConfig::load().context("Failed to load configuration")?;
    let services = ServiceContainer::new(config).context("Failed to create services")?;

    let mut app = App::new(services);
    app.start().await?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let line = tokio::select! {
            line = lines.next_line() => line.context("Failed to read from stdin")?,
            _ = tokio::signal::ctrl_c() => None,
        };
        let Some(line) = line else {
            break;
        };

        match app.handle_line(&line).await {
            Ok(true) => {}
            Ok(false) => break,
            Err(e) => error!("Command failed: {}", e),
        }
    }

    info!("Goodbye");
    Ok(())
}
