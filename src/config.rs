use crate::cli::{Args, DownloadMode};
use crate::error::{Error, Result};
use crate::naming;
use crate::retry::RetryPolicy;
use crate::transport::Credentials;
use chrono::{DateTime, TimeZone};
use std::path::PathBuf;
use std::time::Duration;

pub const STATUS_FILE_NAME: &str = "download_status.json";

/// Which discovered records get downloaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    All,
    Single(String),
    Range { start: usize, end: usize },
}

/// Everything a run needs, resolved once at startup.
#[derive(Debug, Clone)]
pub struct ExportConfig {
    pub credentials: Credentials,
    pub base_url: String,
    pub page_size: u32,
    pub output_dir: PathBuf,
    pub retry: RetryPolicy,
    pub timeout: Duration,
    pub proxy: Option<String>,
    pub selection: Selection,
}

impl ExportConfig {
    pub fn from_args<Tz: TimeZone>(args: Args, now: &DateTime<Tz>) -> Result<Self>
    where
        Tz::Offset: std::fmt::Display,
    {
        let api_key = args
            .api_key
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| {
                Error::Config("an API key is required (--api-key or HELLOSIGN_API_KEY)".to_string())
            })?;

        let selection = match args.mode {
            DownloadMode::All => Selection::All,
            DownloadMode::Single => Selection::Single(args.id.ok_or_else(|| {
                Error::Config("--id is required for single mode".to_string())
            })?),
            DownloadMode::Range => match (args.start, args.end) {
                (Some(start), Some(end)) => Selection::Range { start, end },
                _ => {
                    return Err(Error::Config(
                        "--start and --end are required for range mode".to_string(),
                    ));
                }
            },
        };

        let folder = args.folder.unwrap_or_else(|| naming::run_folder_name(now));

        Ok(Self {
            credentials: Credentials::new(api_key),
            base_url: args.base_url.trim_end_matches('/').to_string(),
            page_size: args.page_size,
            output_dir: args.output.join(folder),
            retry: RetryPolicy::new(args.retries, Duration::from_millis(args.initial_backoff_ms)),
            timeout: Duration::from_secs(args.timeout_secs),
            proxy: args.proxy,
            selection,
        })
    }

    pub fn status_path(&self) -> PathBuf {
        self.output_dir.join(STATUS_FILE_NAME)
    }
}
