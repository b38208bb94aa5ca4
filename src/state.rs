//! Per-item status entries and the append-only ledger written as the run's
//! status log.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Pending,
    Downloading,
    Success,
    Error,
    Skipped,
}

impl Status {
    pub fn as_str(self) -> &'static str {
        match self {
            Status::Pending => "pending",
            Status::Downloading => "downloading",
            Status::Success => "success",
            Status::Error => "error",
            Status::Skipped => "skipped",
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, Status::Success | Status::Error | Status::Skipped)
    }

    fn can_move_to(self, next: Status) -> bool {
        matches!(
            (self, next),
            (Status::Pending, Status::Downloading)
                | (Status::Pending, Status::Skipped)
                | (Status::Downloading, Status::Success)
                | (Status::Downloading, Status::Error)
                | (Status::Downloading, Status::Skipped)
        )
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of one record. `saved_path` is set only in `Success`,
/// `error_detail` only in `Error` or `Skipped`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusEntry {
    identifier: String,
    display_name: String,
    saved_path: Option<PathBuf>,
    state: Status,
    error_detail: Option<String>,
}

impl StatusEntry {
    pub fn new(identifier: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            display_name: display_name.into(),
            saved_path: None,
            state: Status::Pending,
            error_detail: None,
        }
    }

    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    pub fn saved_path(&self) -> Option<&Path> {
        self.saved_path.as_deref()
    }

    pub fn state(&self) -> Status {
        self.state
    }

    pub fn error_detail(&self) -> Option<&str> {
        self.error_detail.as_deref()
    }

    fn transition(&mut self, next: Status) -> Result<()> {
        if !self.state.can_move_to(next) {
            return Err(Error::InvalidTransition {
                identifier: self.identifier.clone(),
                from: self.state,
                to: next,
            });
        }
        self.state = next;
        Ok(())
    }

    pub fn start(&mut self) -> Result<()> {
        self.transition(Status::Downloading)
    }

    pub fn succeed(&mut self, path: impl Into<PathBuf>) -> Result<()> {
        self.transition(Status::Success)?;
        self.saved_path = Some(path.into());
        self.error_detail = None;
        Ok(())
    }

    pub fn fail(&mut self, detail: impl Into<String>) -> Result<()> {
        self.transition(Status::Error)?;
        self.error_detail = Some(detail.into());
        Ok(())
    }

    /// Not used by the download loop; available to callers that decide to
    /// pass over a record without fetching it.
    pub fn skip(&mut self, reason: impl Into<String>) -> Result<()> {
        self.transition(Status::Skipped)?;
        self.error_detail = Some(reason.into());
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Summary {
    pub success: usize,
    pub error: usize,
    pub skipped: usize,
    /// Entries left `Pending` or `Downloading`, e.g. after an interrupt.
    pub unfinished: usize,
}

/// Append-only, ordered collection of status entries.
#[derive(Debug, Clone, Default)]
pub struct Ledger {
    entries: Vec<StatusEntry>,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry and hand it back for its transitions.
    pub fn append(&mut self, entry: StatusEntry) -> &mut StatusEntry {
        self.entries.push(entry);
        let last = self.entries.len() - 1;
        &mut self.entries[last]
    }

    pub fn entries(&self) -> &[StatusEntry] {
        &self.entries
    }

    pub fn snapshot_all(&self) -> Vec<StatusEntry> {
        self.entries.clone()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn summary(&self) -> Summary {
        let mut summary = Summary::default();
        for entry in &self.entries {
            match entry.state {
                Status::Success => summary.success += 1,
                Status::Error => summary.error += 1,
                Status::Skipped => summary.skipped += 1,
                Status::Pending | Status::Downloading => summary.unfinished += 1,
            }
        }
        summary
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.entries)?)
    }

    /// Write the current entries to `path` through a sibling temp file, so a
    /// crash mid-write never leaves a truncated log. Safe to call repeatedly.
    pub fn write_json(&self, path: &Path) -> Result<()> {
        let content = self.to_json()?;

        let mut tmp = path.as_os_str().to_owned();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);

        fs::write(&tmp, content)?;
        fs::rename(&tmp, path)?;

        Ok(())
    }

    pub fn load_json(path: &Path) -> Result<Vec<StatusEntry>> {
        let content = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    fn sample() -> Ledger {
        let mut ledger = Ledger::new();

        let mut a = StatusEntry::new("a", "T");
        a.start().unwrap();
        a.succeed("a.pdf").unwrap();
        ledger.append(a);

        let mut b = StatusEntry::new("b", "");
        b.start().unwrap();
        b.fail("HTTP 500").unwrap();
        ledger.append(b);

        ledger
    }

    #[test]
    fn happy_path_transitions() {
        let mut entry = StatusEntry::new("id", "Title");
        assert_eq!(entry.state(), Status::Pending);
        entry.start().unwrap();
        assert_eq!(entry.state(), Status::Downloading);
        entry.succeed("out/Title.pdf").unwrap();
        assert_eq!(entry.state(), Status::Success);
        assert_eq!(entry.saved_path(), Some(Path::new("out/Title.pdf")));
        assert_eq!(entry.error_detail(), None);
    }

    #[test]
    fn terminal_states_never_regress() {
        let mut entry = StatusEntry::new("id", "");
        entry.start().unwrap();
        entry.fail("HTTP 404").unwrap();

        let err = entry.succeed("x.pdf").unwrap_err();
        assert!(matches!(
            err,
            Error::InvalidTransition {
                from: Status::Error,
                to: Status::Success,
                ..
            }
        ));
        assert!(entry.start().is_err());
        assert_eq!(entry.state(), Status::Error);
        assert_eq!(entry.saved_path(), None);
    }

    #[test]
    fn cannot_finish_without_starting() {
        let mut entry = StatusEntry::new("id", "");
        assert!(entry.succeed("x.pdf").is_err());
        assert!(entry.fail("nope").is_err());
        assert_eq!(entry.state(), Status::Pending);
    }

    #[test]
    fn skip_is_reachable_and_records_reason() {
        let mut entry = StatusEntry::new("id", "");
        entry.skip("listing page unavailable").unwrap();
        assert_eq!(entry.state(), Status::Skipped);
        assert_eq!(entry.error_detail(), Some("listing page unavailable"));
        assert!(entry.start().is_err());
    }

    #[test]
    fn serializes_with_nulls_for_absent_fields() {
        let parsed: Value = serde_json::from_str(&sample().to_json().unwrap()).unwrap();
        let items = parsed.as_array().unwrap();
        assert_eq!(items.len(), 2);

        assert_eq!(items[0]["identifier"], "a");
        assert_eq!(items[0]["displayName"], "T");
        assert_eq!(items[0]["state"], "success");
        assert_eq!(items[0]["savedPath"], "a.pdf");
        assert!(items[0]["errorDetail"].is_null());

        assert_eq!(items[1]["identifier"], "b");
        assert_eq!(items[1]["displayName"], "");
        assert_eq!(items[1]["state"], "error");
        assert!(items[1]["savedPath"].is_null());
        assert_eq!(items[1]["errorDetail"], "HTTP 500");
    }

    #[test]
    fn write_is_repeatable_and_reloads() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("download_status.json");
        let mut ledger = sample();

        ledger.write_json(&path).unwrap();
        ledger.append(StatusEntry::new("c", "pending one"));
        ledger.write_json(&path).unwrap();

        let loaded = Ledger::load_json(&path).unwrap();
        assert_eq!(loaded, ledger.snapshot_all());
        assert_eq!(loaded[2].state(), Status::Pending);
        assert!(!dir.path().join("download_status.json.tmp").exists());
    }

    #[test]
    fn summary_counts_states() {
        let mut ledger = sample();
        let mut in_flight = StatusEntry::new("c", "");
        in_flight.start().unwrap();
        ledger.append(in_flight);

        assert_eq!(
            ledger.summary(),
            Summary {
                success: 1,
                error: 1,
                skipped: 0,
                unfinished: 1,
            }
        );
    }
}
