use crate::config::Selection;
use crate::error::{Error, Result};
use crate::models::Record;
use crate::naming;
use crate::pagination;
use crate::retry::RetryPolicy;
use crate::state::{Ledger, StatusEntry};
use crate::transport::Transport;
use indicatif::ProgressBar;
use std::collections::HashSet;
use std::fs;
use std::future::Future;
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};

pub const FILE_TYPE: &str = "pdf";

enum Fetched {
    Saved(PathBuf),
    Rejected(u16),
}

/// How an export raced against its shutdown signal ended.
#[derive(Debug)]
pub enum RunOutcome {
    Finished(Result<()>),
    Interrupted,
}

#[derive(Debug)]
pub struct ExportReport {
    pub outcome: RunOutcome,
    /// Result of writing the status log after the run stopped.
    pub flushed: Result<()>,
}

/// Sequentially downloads every record's PDF into `output_dir`, recording each
/// outcome in a [`Ledger`].
pub struct Downloader<T> {
    transport: T,
    policy: RetryPolicy,
    base_url: String,
    output_dir: PathBuf,
    progress: ProgressBar,
}

impl<T: Transport> Downloader<T> {
    pub fn new(
        transport: T,
        policy: RetryPolicy,
        base_url: &str,
        output_dir: impl Into<PathBuf>,
    ) -> Result<Self> {
        let output_dir = output_dir.into();
        if !output_dir.exists() {
            fs::create_dir_all(&output_dir)?;
        }

        Ok(Self {
            transport,
            policy,
            base_url: base_url.trim_end_matches('/').to_string(),
            output_dir,
            progress: ProgressBar::hidden(),
        })
    }

    pub fn with_progress(mut self, progress: ProgressBar) -> Self {
        self.progress = progress;
        self
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub fn file_url(&self, identifier: &str) -> String {
        format!("{}/signature_request/files/{}", self.base_url, identifier)
    }

    pub async fn collect(&self, page_size: u32) -> Result<Vec<Record>> {
        pagination::collect_all(&self.transport, &self.policy, &self.base_url, page_size).await
    }

    /// Download `records` in order. One entry is appended per record before
    /// its request goes out. Per-item failures end up as `Error` entries.
    /// A fatal error marks the current entry failed, stops the loop and is
    /// returned; everything appended so far stays in `ledger`.
    pub async fn run(&self, records: &[Record], ledger: &mut Ledger) -> Result<()> {
        let result = self.download_each(records, ledger).await;
        self.progress.finish_and_clear();
        result
    }

    async fn download_each(&self, records: &[Record], ledger: &mut Ledger) -> Result<()> {
        self.progress.set_length(records.len() as u64);
        let mut used_names = HashSet::new();

        for record in records {
            let entry = ledger.append(StatusEntry::new(
                record.identifier.as_str(),
                record.display_name.as_str(),
            ));

            self.progress.set_message(record.identifier.clone());
            entry.start()?;

            match self.fetch(record, &mut used_names).await {
                Ok(Fetched::Saved(path)) => {
                    info!(id = %record.identifier, path = %path.display(), "saved");
                    entry.succeed(path)?;
                }
                Ok(Fetched::Rejected(status)) => {
                    error!(id = %record.identifier, status, "download rejected");
                    entry.fail(format!("HTTP {status}"))?;
                }
                Err(e) if e.is_fatal() => {
                    entry.fail(e.to_string())?;
                    return Err(e);
                }
                Err(e) => {
                    error!(id = %record.identifier, error = %e, "download failed");
                    entry.fail(e.to_string())?;
                }
            }

            self.progress.inc(1);
        }

        Ok(())
    }

    /// Collect the listing, narrow it to `selection`, then download.
    pub async fn export(
        &self,
        page_size: u32,
        selection: &Selection,
        ledger: &mut Ledger,
    ) -> Result<()> {
        let records = self.collect(page_size).await?;
        let records = match selection {
            Selection::All => records,
            Selection::Single(id) => select_single(records, id)?,
            Selection::Range { start, end } => select_range(records, *start, *end)?,
        };

        info!(records = records.len(), output = %self.output_dir.display(), "downloading");
        self.run(&records, ledger).await
    }

    /// Run [`Self::export`] until it ends or `shutdown` resolves, then write
    /// `ledger` to `status_path` either way.
    pub async fn export_until<S>(
        &self,
        page_size: u32,
        selection: &Selection,
        ledger: &mut Ledger,
        shutdown: S,
        status_path: &Path,
    ) -> ExportReport
    where
        S: Future<Output = ()>,
    {
        let outcome = tokio::select! {
            result = self.export(page_size, selection, &mut *ledger) => RunOutcome::Finished(result),
            () = shutdown => RunOutcome::Interrupted,
        };
        self.progress.finish_and_clear();

        if matches!(outcome, RunOutcome::Interrupted) {
            warn!(entries = ledger.len(), "interrupted, flushing status log");
        }

        let flushed = ledger.write_json(status_path);
        if let Err(e) = &flushed {
            error!(path = %status_path.display(), error = %e, "failed to write status log");
        }

        ExportReport { outcome, flushed }
    }

    async fn fetch(&self, record: &Record, used_names: &mut HashSet<String>) -> Result<Fetched> {
        let url = self.file_url(&record.identifier);
        let query = [("fileType", FILE_TYPE.to_string())];

        let response = self
            .policy
            .run(&url, || self.transport.get(&url, &query))
            .await?;

        if !response.is_ok() {
            return Ok(Fetched::Rejected(response.status));
        }

        let path = self.target_path(record, used_names);
        fs::write(&path, &response.body)?;

        Ok(Fetched::Saved(path))
    }

    fn target_path(&self, record: &Record, used_names: &mut HashSet<String>) -> PathBuf {
        let mut stem = naming::base_name(&record.display_name, &record.identifier);
        if used_names.contains(&stem) {
            let with_id = naming::disambiguated_name(&record.display_name, &record.identifier);
            stem = with_id.clone();
            let mut n = 2u32;
            while used_names.contains(&stem) {
                stem = format!("{with_id}_{n}");
                n += 1;
            }
        }
        used_names.insert(stem.clone());

        self.output_dir.join(format!("{stem}.{FILE_TYPE}"))
    }
}

/// Drop records outside the selected identifier.
pub fn select_single(records: Vec<Record>, identifier: &str) -> Result<Vec<Record>> {
    let selected: Vec<Record> = records
        .into_iter()
        .filter(|r| r.identifier == identifier)
        .collect();

    if selected.is_empty() {
        return Err(Error::Config(format!(
            "signature request not found in listing: {identifier}"
        )));
    }
    Ok(selected)
}

/// Keep `records[start..=end]` in discovery order.
pub fn select_range(records: Vec<Record>, start: usize, end: usize) -> Result<Vec<Record>> {
    if start > end || end >= records.len() {
        return Err(Error::Config(format!(
            "invalid range: start={start}, end={end}, total={}",
            records.len()
        )));
    }
    Ok(records[start..=end].to_vec())
}
