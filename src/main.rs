use anyhow::{Context, Result, anyhow};
use chrono::Local;
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use signed_docs_export::cli::Args;
use signed_docs_export::downloader::RunOutcome;
use signed_docs_export::state::Status;
use signed_docs_export::{Downloader, ExportConfig, HttpTransport, Ledger, logging};
use std::path::Path;
use tracing::{error, info};

/// Resolves on Ctrl+C. If the handler cannot be installed it never resolves.
async fn interrupt() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "could not listen for Ctrl+C");
        std::future::pending::<()>().await;
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let progress = ProgressBar::new(0);
    progress.set_style(
        ProgressStyle::default_bar()
            .template("{msg:30} {bar:40} {pos}/{len}")
            .context("Invalid progress template")?
            .progress_chars("=>-"),
    );
    logging::init(&args.log_level, &progress);

    let config = ExportConfig::from_args(args, &Local::now())?;

    let transport = HttpTransport::new(
        config.credentials.clone(),
        config.timeout,
        config.proxy.as_deref(),
    )
    .context("Failed to build HTTP client")?;

    let downloader = Downloader::new(transport, config.retry, &config.base_url, &config.output_dir)
        .context("Failed to create output directory")?
        .with_progress(progress.clone());

    info!(
        base_url = %config.base_url,
        output = %config.output_dir.display(),
        page_size = config.page_size,
        max_retries = config.retry.max_retries,
        "starting export"
    );

    let status_path = config.status_path();
    let mut ledger = Ledger::new();
    let report = downloader
        .export_until(
            config.page_size,
            &config.selection,
            &mut ledger,
            interrupt(),
            &status_path,
        )
        .await;

    print_summary(&ledger, report.flushed.is_ok().then_some(status_path.as_path()));

    match report.outcome {
        RunOutcome::Finished(Ok(())) => Ok(()),
        RunOutcome::Finished(Err(e)) => Err(anyhow::Error::new(e).context("Export aborted")),
        RunOutcome::Interrupted => Err(anyhow!("Interrupted after {} item(s)", ledger.len())),
    }
}

fn print_summary(ledger: &Ledger, status_path: Option<&Path>) {
    let summary = ledger.summary();

    for entry in ledger.entries() {
        if entry.state() == Status::Error {
            println!(
                "  failed: {} ({}) - {}",
                entry.identifier(),
                entry.display_name(),
                entry.error_detail().unwrap_or("unknown error")
            );
        }
    }

    println!(
        "\nDone: {} success, {} failed, {} skipped",
        summary.success, summary.error, summary.skipped
    );
    if summary.unfinished > 0 {
        println!("{} item(s) did not finish", summary.unfinished);
    }
    if let Some(path) = status_path {
        println!("Status log: {}", path.display());
    }
}
