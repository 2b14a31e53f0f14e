//! The send pipeline
//!
//! Uploads everything waiting in the local send directory to the remote
//! send path, journals each upload, then archives the local copy with a
//! run timestamp so the send directory drains to empty.

use crate::config::ExchangeConfig;
use crate::error::Result;
use crate::journal::{Journal, JournalEntry, Outcome};
use crate::transport::Transport;
use chrono::{DateTime, Local, Utc};
use nsc_engine::COMPACT_DT_FORMAT;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Statistics from a send run
#[derive(Debug, Default, Serialize)]
pub struct SendReport {
    /// Files found in the local send directory
    pub listed: usize,
    /// Files uploaded and archived
    pub sent: usize,
    /// Files that failed to upload (left in the send directory)
    pub upload_failed: usize,
}

/// Archive name for a sent file: `{stem}_{YYYYMMDD_HHMMSS}{.ext}`.
fn archive_name(file_name: &Path, stamp: &str) -> PathBuf {
    let stem = file_name
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("file");
    match file_name.extension().and_then(|e| e.to_str()) {
        Some(ext) => PathBuf::from(format!("{stem}_{stamp}.{ext}")),
        None => PathBuf::from(format!("{stem}_{stamp}")),
    }
}

/// Run the send pipeline once.
pub fn send_files(
    config: &ExchangeConfig,
    transport: &mut dyn Transport,
    journal: &Journal,
) -> Result<SendReport> {
    fs::create_dir_all(&config.local.send_path)?;
    fs::create_dir_all(&config.local.archive_path)?;

    let mut files: Vec<PathBuf> = fs::read_dir(&config.local.send_path)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.is_file())
        .collect();
    files.sort();

    let mut report = SendReport {
        listed: files.len(),
        ..Default::default()
    };
    if files.is_empty() {
        info!("no files to send");
        return Ok(report);
    }

    // One timestamp per run so a batch archives consistently.
    let stamp = Local::now().format(COMPACT_DT_FORMAT).to_string();

    for local_file in files {
        let name = match local_file.file_name().and_then(|n| n.to_str()) {
            Some(name) => name.to_string(),
            None => continue,
        };

        info!(file = %name, "uploading file");
        if let Err(err) = transport.upload(&local_file, &name) {
            warn!(file = %name, error = %err, "upload failed, file left in send directory");
            report.upload_failed += 1;
            continue;
        }

        let file_datetime: Option<DateTime<Utc>> = fs::metadata(&local_file)
            .and_then(|m| m.modified())
            .ok()
            .map(Into::into);

        journal.record(&JournalEntry {
            remote_name: format!("{}/{}", config.ftp.send_path.trim_end_matches('/'), name),
            local_name: name.clone(),
            rule: None,
            file_datetime,
            outcome: Outcome::Sent,
        })?;

        let archived = config
            .local
            .archive_path
            .join(archive_name(Path::new(&name), &stamp));
        fs::rename(&local_file, &archived)?;
        report.sent += 1;
    }

    info!(sent = report.sent, failed = report.upload_failed, "send run complete");
    Ok(report)
}
