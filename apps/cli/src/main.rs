use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use client_core::{
    config::parse_service_url, load_settings, AskSubmission, QaController, SelectedFile,
};
use shared::domain::FlowStatus;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "paper-qa", about = "Ask questions about a PDF indexed by the Q&A service")]
struct Cli {
    /// Overrides the configured service base address.
    #[arg(long)]
    service_url: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Upload a PDF; the service answers later questions from it.
    Upload { path: PathBuf },
    Ask {
        #[arg(required = true, num_args = 1..)]
        query: Vec<String>,
    },
    /// Optionally upload a PDF, then ask one question per stdin line.
    Chat {
        #[arg(long)]
        file: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();
    let cli = Cli::parse();

    let mut settings = load_settings()?;
    if let Some(url) = &cli.service_url {
        settings.service_url = parse_service_url(url)?;
    }
    let controller =
        QaController::from_settings(&settings).context("failed to build http client")?;

    match cli.command {
        Command::Upload { path } => upload(&controller, &path).await,
        Command::Ask { query } => {
            controller.set_query(query.join(" ")).await;
            match ask(&controller).await? {
                Some(true) | None => Ok(()),
                Some(false) => bail!("question could not be answered"),
            }
        }
        Command::Chat { file } => chat(&controller, file).await,
    }
}

async fn upload(controller: &Arc<QaController>, path: &Path) -> Result<()> {
    let file = SelectedFile::from_path(path).await?;
    controller.select_file(file).await;

    let state = controller.submit_upload().await?;
    let message = state.message.unwrap_or_default();
    match state.status {
        FlowStatus::Succeeded => {
            println!("{message}");
            Ok(())
        }
        _ => bail!("{message}"),
    }
}

/// `None` when the query was blank, otherwise whether an answer came back.
async fn ask(controller: &Arc<QaController>) -> Result<Option<bool>> {
    match controller.submit_ask().await? {
        AskSubmission::Skipped => Ok(None),
        AskSubmission::Settled(state) => {
            if let Some(text) = state.display_text() {
                println!("{text}");
            }
            Ok(Some(state.status == FlowStatus::Succeeded))
        }
    }
}

async fn chat(controller: &Arc<QaController>, file: Option<PathBuf>) -> Result<()> {
    if let Some(path) = file {
        upload(controller, &path).await?;
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        controller.set_query(line).await;
        ask(controller).await?;
    }
    Ok(())
}
