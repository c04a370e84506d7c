mod cli;
mod error;
mod logging;
mod views;

use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;

use chrono::Utc;
use clap::Parser;
use log::{debug, error, info, warn};
use tokio::sync::broadcast::error::RecvError;
use tracing::Instrument;

use buildscan::model::UploadFile;
use buildscan::{
    load_effective_config, BuildscanError, ClientConfig, Endpoints, HttpScanClient, Lifecycle,
    ScanController,
};
use cli::{Cli, Commands};
use error::CliError;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init_tracing(cli.verbose);

    let result = match load_effective_config(cli.config.as_deref()) {
        Ok(config) => match cli.command {
            Commands::Scan { file, json } => {
                let span = tracing::info_span!("scan", file = %file.display());
                run_scan(&config, &file, json).instrument(span).await
            }
            Commands::Status => run_status(&config).await,
            Commands::Jobs => run_jobs(&config).await,
            Commands::Config => print_config(&config),
        },
        Err(e) => Err(e.into()),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(CliError::Cancelled) => {
            warn!("Scan cancelled");
            ExitCode::from(130)
        }
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run_scan(config: &ClientConfig, path: &Path, json: bool) -> Result<(), CliError> {
    let file = UploadFile::read(path)
        .await
        .map_err(|source| BuildscanError::ReadUpload {
            path: path.to_path_buf(),
            source,
        })?;

    let controller = Arc::new(ScanController::from_config(config)?);
    let endpoints = Endpoints::new(&config.api_base);
    let mut events = controller.subscribe();

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    let spinner = views::upload_spinner(file.file_name());
    let receipt = tokio::select! {
        receipt = controller.submit(file) => receipt,
        _ = &mut ctrl_c => {
            controller.start_new_scan();
            spinner.abandon_with_message("cancelled");
            return Err(CliError::Cancelled);
        }
    };
    spinner.finish_and_clear();
    let receipt = receipt?;
    info!("{}", receipt.message);

    let bar = views::progress_bar(receipt.total_count);

    let finished_at = loop {
        tokio::select! {
            _ = &mut ctrl_c => {
                controller.start_new_scan();
                bar.abandon_with_message("cancelled");
                return Err(CliError::Cancelled);
            }
            event = events.recv() => match event {
                Ok(event) if event.lifecycle == Lifecycle::Polling => {
                    if let Some(progress) = &event.progress {
                        views::update_progress(&bar, progress);
                    }
                }
                Ok(event) if event.lifecycle.is_terminal() => break event.timestamp,
                Ok(event) => debug!("Ignoring {} event", event.lifecycle),
                Err(RecvError::Lagged(skipped)) => {
                    debug!("Progress display skipped {} events", skipped);
                    if controller.lifecycle().is_terminal() {
                        break Utc::now();
                    }
                }
                Err(RecvError::Closed) => break Utc::now(),
            }
        }
    };

    let view = controller.snapshot();
    match view.lifecycle {
        Lifecycle::Completed => {
            bar.finish_and_clear();
            if json {
                if let Some(report) = views::ScanReport::new(&view, &endpoints, finished_at) {
                    println!("{}", serde_json::to_string_pretty(&report)?);
                }
            } else {
                views::print_report(&view, &endpoints, finished_at);
            }
            if view.transient_failures > 0 {
                debug!(
                    "{} status polls failed transiently during the job",
                    view.transient_failures
                );
            }
            Ok(())
        }
        _ => {
            bar.abandon();
            Err(CliError::JobFailed(
                view.error.unwrap_or_else(|| "Job failed".to_string()),
            ))
        }
    }
}

async fn run_status(config: &ClientConfig) -> Result<(), CliError> {
    let client = HttpScanClient::new(config)?;
    println!("Service: {}", client.endpoints().base());

    let health = client.health().await?;
    println!(
        "Health:  {}{}",
        health.status,
        health
            .message
            .as_deref()
            .map(|m| format!(" ({})", m))
            .unwrap_or_default()
    );
    for (key, configured) in &health.keys_configured {
        println!(
            "  {:<24} {}",
            key,
            if *configured { "configured" } else { "missing" }
        );
    }

    match client.rate_limit().await {
        Ok(quota) => println!(
            "Quota:   {}/{} buildings used, {} remaining, resets in {} min",
            quota.buildings_used,
            quota.limit,
            quota.buildings_remaining,
            quota.reset_in_seconds.div_ceil(60)
        ),
        Err(e) => warn!("Could not fetch rate limit: {}", e),
    }

    Ok(())
}

async fn run_jobs(config: &ClientConfig) -> Result<(), CliError> {
    let client = HttpScanClient::new(config)?;
    let jobs = client.list_jobs().await?;
    if jobs.is_empty() {
        println!("No jobs on {}", client.endpoints().base());
        return Ok(());
    }
    views::print_jobs(&jobs);
    Ok(())
}

fn print_config(config: &ClientConfig) -> Result<(), CliError> {
    println!("{}", serde_json::to_string_pretty(config)?);
    Ok(())
}
