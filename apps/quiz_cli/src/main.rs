use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use client_core::{QuizController, QuizHttpClient, QuizService};
use tokio::io::BufReader;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod config;
mod ui;

use config::load_settings;

#[derive(Parser, Debug)]
#[command(about = "Take multiple-choice quizzes served by a remote quiz service")]
struct Cli {
    /// Base url of the quiz service api, e.g. http://127.0.0.1:8000/api
    #[arg(long)]
    api_base_url: Option<String>,
    #[arg(long, default_value = "quiz.toml")]
    config: PathBuf,
    /// Directory for stats images (defaults to the system temp dir)
    #[arg(long)]
    stats_dir: Option<PathBuf>,
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug, Default)]
enum Command {
    /// Interactive quiz session
    #[default]
    Play,
    /// List the categories the service has loaded
    Categories,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut settings = load_settings(&cli.config)?;
    if let Some(url) = cli.api_base_url {
        settings.api_base_url = url;
    }
    if let Some(dir) = cli.stats_dir {
        settings.stats_dir = Some(dir);
    }

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&settings.log_filter))
        .context("invalid log filter")?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let client = QuizHttpClient::new(&settings.api_base_url).with_context(|| {
        format!(
            "failed to configure quiz service client for '{}'",
            settings.api_base_url
        )
    })?;
    info!(api_base_url = %client.base_url(), "quiz service configured");

    match cli.command.unwrap_or_default() {
        Command::Categories => {
            let categories = client
                .list_categories()
                .await
                .context("failed to list categories")?;
            for category in categories {
                println!("{category}");
            }
        }
        Command::Play => {
            let mut controller = QuizController::new(client);
            if let Some(dir) = settings.stats_dir {
                std::fs::create_dir_all(&dir).with_context(|| {
                    format!("failed to create stats directory '{}'", dir.display())
                })?;
                controller = controller.with_stats_dir(dir);
            }
            let stdin = BufReader::new(tokio::io::stdin());
            let mut stdout = std::io::stdout();
            ui::run(&mut controller, stdin, &mut stdout).await?;
        }
    }

    Ok(())
}
