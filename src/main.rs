//! Command line entry point for the pipeline stages and the web server.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::info;

use wineq::api::{build_router, AppState};
use wineq::common::{log, AppCfg};
use wineq::evaluation::service::{evaluate, DEFAULT_MODEL_NAME};
use wineq::{data, features, training};

#[derive(Parser)]
#[command(name = "wineq", about = "Wine quality classification pipeline")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Split the raw dataset into train and test partitions.
    Prepare,
    /// Engineer features and binary labels for both partitions.
    Features,
    /// Fit the fixed-configuration random forest.
    Train,
    /// Grid-search forest hyperparameters with cross-validation.
    Optimize,
    /// Score a stored model on the test split and update the results report.
    Evaluate {
        /// Model artefact to score; defaults to the trainer's output.
        #[arg(long)]
        model_path: Option<PathBuf>,

        /// Name recorded in the results report.
        #[arg(long, default_value = DEFAULT_MODEL_NAME)]
        name: String,
    },
    /// prepare, features, train and evaluate in sequence.
    Run,
    /// Serve the prediction form.
    Serve {
        /// Listen address; overrides WINEQ_ADDR.
        #[arg(long)]
        addr: Option<String>,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let cfg = AppCfg::load();
    log::init(&cfg);

    match cli.command {
        Command::Prepare => {
            data::service::prepare_dataset(&cfg)?;
        }
        Command::Features => {
            features::service::build_features(&cfg)?;
        }
        Command::Train => {
            training::service::train(&cfg)?;
        }
        Command::Optimize => {
            training::service::optimize(&cfg)?;
        }
        Command::Evaluate { model_path, name } => {
            evaluate(&cfg, model_path.as_deref(), &name)?;
        }
        Command::Run => {
            data::service::prepare_dataset(&cfg)?;
            features::service::build_features(&cfg)?;
            training::service::train(&cfg)?;
            evaluate(&cfg, None, DEFAULT_MODEL_NAME)?;
            info!("pipeline finished");
        }
        Command::Serve { addr } => {
            let addr = addr.unwrap_or_else(|| cfg.listen_addr.clone());
            tokio::runtime::Runtime::new()
                .context("failed to start async runtime")?
                .block_on(serve(&cfg, addr))?;
        }
    }
    Ok(())
}

async fn serve(cfg: &AppCfg, addr: String) -> anyhow::Result<()> {
    let state = Arc::new(AppState::load(cfg));
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!(%addr, "prediction service listening");
    axum::serve(listener, app).await?;
    Ok(())
}
