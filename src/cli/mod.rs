use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

pub mod ask;
pub mod chat;

use crate::core::AppConfig;

#[derive(Subcommand)]
enum Command {
    /// Start an interactive chat session (default)
    Chat {
        /// Override the model used for completions
        #[arg(long)]
        model: Option<String>,

        /// Override the API host
        #[arg(long)]
        host: Option<String>,
    },
    /// Send a single message and print the reply
    Ask {
        message: String,

        /// Override the model used for completions
        #[arg(long)]
        model: Option<String>,

        /// Override the API host
        #[arg(long)]
        host: Option<String>,
    },
}

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

pub async fn run() -> Result<()> {
    let args = Cli::parse();

    // Logs go to stderr so they don't end up in the middle of the
    // transcript
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("{}=warn", env!("CARGO_CRATE_NAME")).into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match args.command {
        Some(Command::Chat { model, host }) => {
            chat::run(AppConfig::default().with_overrides(model, host)).await?;
        }
        Some(Command::Ask {
            message,
            model,
            host,
        }) => {
            ask::run(&message, AppConfig::default().with_overrides(model, host)).await?;
        }
        None => {
            chat::run(AppConfig::default()).await?;
        }
    }

    Ok(())
}
