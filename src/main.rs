use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;

use readly::comms::http_api;
use readly::config::Config;
use readly::security::password;
use readly::utils;

#[derive(Parser)]
#[command(name = "readly", version, about = "Readly book review API")]
struct AppCli {
    /// Config file path (JSON); environment variables override it
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP API
    Serve {
        /// Overrides the configured port
        #[arg(long)]
        port: Option<u16>,
    },
    /// Print a bcrypt hash of a secret, using the configured cost
    HashPassword { password: String },
}

#[tokio::main]
async fn main() -> Result<()> {
    utils::logging::init();

    let args = AppCli::parse();
    let mut config = Config::load(args.config.as_deref())?;

    match args.command.unwrap_or(Commands::Serve { port: None }) {
        Commands::Serve { port } => {
            if let Some(port) = port {
                config.port = port;
            }
            info!(version = readly::VERSION, port = config.port, "starting readly");
            http_api::serve(config).await?;
        }
        Commands::HashPassword { password } => {
            let hash = password::hash_blocking(password, config.password_cost)
                .await
                .context("hashing password")?;
            println!("{hash}");
        }
    }

    Ok(())
}
