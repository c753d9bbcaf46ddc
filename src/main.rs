use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{generate, Shell};
use std::io;
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod cli;
mod core;
mod daemon;
mod notifier;
mod providers;

use crate::core::settings::{Credentials, Settings};

#[derive(Parser)]
#[command(name = "homework-bot")]
#[command(author, version, about = "Relays homework review status changes to Telegram")]
struct Cli {
    /// Path to config.toml (default: platform config dir)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log output format
    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Text)]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Poll for status changes and send notifications until stopped
    Run,

    /// Fetch current statuses once and print them without notifying
    Status {
        /// Output as JSON
        #[arg(long)]
        json: bool,

        /// Look back this many hours instead of the configured lookback
        #[arg(long)]
        since_hours: Option<u32>,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

fn init_logging(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    match format {
        LogFormat::Text => registry.with(tracing_subscriber::fmt::layer()).init(),
        LogFormat::Json => registry
            .with(tracing_subscriber::fmt::layer().json())
            .init(),
    }
}

fn load_config(path: Option<&Path>) -> anyhow::Result<(Settings, Credentials)> {
    let mut settings = Settings::load(path)?;
    settings.apply_env_overrides(|key| std::env::var(key).ok())?;
    settings.validate()?;

    let credentials = Credentials::from_env()?;
    Ok((settings, credentials))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Run => {
            dotenvy::dotenv().ok();
            init_logging(cli.log_format);
            let (settings, credentials) = load_config(cli.config.as_deref()).inspect_err(|e| {
                tracing::error!(error = %e, "Configuration error, not starting");
            })?;
            daemon::run(settings, credentials).await
        }
        Commands::Status { json, since_hours } => {
            dotenvy::dotenv().ok();
            init_logging(cli.log_format);
            let (settings, credentials) = load_config(cli.config.as_deref())?;
            cli::status::run(settings, credentials, json, since_hours).await
        }
        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            let name = cmd.get_name().to_string();
            generate(shell, &mut cmd, name, &mut io::stdout());
            Ok(())
        }
    }
}
