use clap::{Parser, ValueEnum};
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum DownloadMode {
    All,
    Single,
    Range,
}

#[derive(Parser, Debug)]
#[command(name = "signed-docs-export")]
#[command(author, version, about = "Export every signed document of an e-signature account", long_about = None)]
pub struct Args {
    /// API key (sent as the HTTP Basic username)
    #[arg(long, env = "HELLOSIGN_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// API base URL
    #[arg(long, env = "HELLOSIGN_BASE_URL", default_value = "https://api.hellosign.com/v3")]
    pub base_url: String,

    /// Listing page size
    #[arg(long, default_value = "100", value_parser = clap::value_parser!(u32).range(1..=100))]
    pub page_size: u32,

    /// Directory under which the run folder is created
    #[arg(short, long, default_value = ".")]
    pub output: PathBuf,

    /// Run folder name (default: signed_documents_<timestamp>)
    #[arg(long)]
    pub folder: Option<String>,

    /// Download mode
    #[arg(short, long, value_enum, default_value = "all")]
    pub mode: DownloadMode,

    /// Signature request id for single mode
    #[arg(short, long)]
    pub id: Option<String>,

    /// Start index for range download (inclusive)
    #[arg(long, requires = "end")]
    pub start: Option<usize>,

    /// End index for range download (inclusive)
    #[arg(long, requires = "start")]
    pub end: Option<usize>,

    /// Number of retry attempts on rate limiting or connection failure
    #[arg(short, long, default_value = "5")]
    pub retries: u32,

    /// First backoff delay in milliseconds, doubled on every retry
    #[arg(long, default_value = "1000")]
    pub initial_backoff_ms: u64,

    /// Request timeout in seconds
    #[arg(long, default_value = "300")]
    pub timeout_secs: u64,

    /// Proxy URL (e.g., http://127.0.0.1:7890)
    #[arg(long)]
    pub proxy: Option<String>,

    /// Log level when RUST_LOG is unset
    #[arg(long, default_value = "info")]
    pub log_level: String,
}
