//! Export every signature request of an e-signature account as local PDFs,
//! with a JSON status log describing the outcome of each one.
//!
//! The pipeline is strictly sequential: [`pagination::collect_all`] walks the
//! listing, then [`downloader::Downloader::run`] fetches each document through
//! the [`retry::RetryPolicy`] and records the result in a [`state::Ledger`].

pub mod cli;
pub mod config;
pub mod downloader;
pub mod error;
pub mod logging;
pub mod models;
pub mod naming;
pub mod pagination;
pub mod retry;
pub mod state;
#[cfg(test)]
mod test_support;
pub mod transport;

pub use config::{ExportConfig, Selection};
pub use downloader::{Downloader, ExportReport, RunOutcome};
pub use error::{Error, Result};
pub use models::Record;
pub use retry::RetryPolicy;
pub use state::{Ledger, Status, StatusEntry, Summary};
pub use transport::{Credentials, HttpTransport, Response, Transport};
