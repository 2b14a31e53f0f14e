//! The durable action journal
//!
//! Append-only CSV, one row per processed file. The header row is written
//! once when the file is first created; every run after that appends. This
//! is the data log operators reconcile against, separate from diagnostic
//! tracing output.

use crate::error::Result;
use chrono::{DateTime, Utc};
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};

/// Journal column order.
const HEADER: [&str; 6] = [
    "nsc_file_name",
    "local_file_name",
    "rule",
    "file_date_time",
    "status",
    "date_time",
];

const DT_DISPLAY_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Final status of one processed file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Fetched, classified, renamed into the receive directory
    Received,
    /// Convention fields parsed but no rule pattern matched
    Unmatched,
    /// Filename does not fit the naming convention
    Unparsed,
    /// Template rendering failed; file left staged under its original name
    RenderFailed,
    /// Remote acknowledgment failed; file left staged, not renamed
    AckFailed,
    /// Received and the external import completed
    Imported,
    /// Received but the external import failed
    ImportFailed,
    /// Uploaded to the remote send path and archived
    Sent,
}

impl Outcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Received => "received",
            Self::Unmatched => "unmatched",
            Self::Unparsed => "unparsed",
            Self::RenderFailed => "render_failed",
            Self::AckFailed => "ack_failed",
            Self::Imported => "imported",
            Self::ImportFailed => "import_failed",
            Self::Sent => "sent",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "received" => Some(Self::Received),
            "unmatched" => Some(Self::Unmatched),
            "unparsed" => Some(Self::Unparsed),
            "render_failed" => Some(Self::RenderFailed),
            "ack_failed" => Some(Self::AckFailed),
            "imported" => Some(Self::Imported),
            "import_failed" => Some(Self::ImportFailed),
            "sent" => Some(Self::Sent),
            _ => None,
        }
    }
}

/// One journal row
#[derive(Debug, Clone)]
pub struct JournalEntry {
    /// Name on the remote endpoint (or the local name when sending)
    pub remote_name: String,
    /// Local name after processing
    pub local_name: String,
    /// Matched rule, if any
    pub rule: Option<String>,
    /// The file's own timestamp (remote mtime on receive, local on send)
    pub file_datetime: Option<DateTime<Utc>>,
    pub outcome: Outcome,
}

/// Append-only CSV journal
#[derive(Debug, Clone)]
pub struct Journal {
    path: PathBuf,
}

impl Journal {
    /// Open the journal, creating it (and its parent directory) with a
    /// header row if it does not exist yet.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        if !path.exists() {
            let mut writer = csv::Writer::from_path(path)?;
            writer.write_record(HEADER)?;
            writer.flush()?;
        }
        Ok(Self {
            path: path.to_path_buf(),
        })
    }

    /// Append one row.
    pub fn record(&self, entry: &JournalEntry) -> Result<()> {
        let file = OpenOptions::new().append(true).open(&self.path)?;
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(file);

        let file_dt = entry
            .file_datetime
            .map(|dt| dt.format(DT_DISPLAY_FORMAT).to_string())
            .unwrap_or_default();
        let logged_at = Utc::now().format(DT_DISPLAY_FORMAT).to_string();
        writer.write_record([
            entry.remote_name.as_str(),
            entry.local_name.as_str(),
            entry.rule.as_deref().unwrap_or(""),
            file_dt.as_str(),
            entry.outcome.as_str(),
            logged_at.as_str(),
        ])?;
        writer.flush()?;
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}
