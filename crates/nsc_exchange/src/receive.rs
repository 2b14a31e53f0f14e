//! The receive pipeline
//!
//! Drives the classification core per retrieved file: list remote entries,
//! skip anything not newer than the high-water cursor, fetch to staging,
//! parse/classify/render, acknowledge the remote copy, move the file into
//! the receive directory under its new name, dispatch the import, journal.
//!
//! Ordering invariant: a file is never renamed locally before its remote
//! acknowledgment succeeds, so a failure between rename and archive cannot
//! lose it. One bad file never blocks the rest of the batch.

use crate::config::ExchangeConfig;
use crate::error::Result;
use crate::import::{run_import, ImportOutcome};
use crate::journal::{Journal, JournalEntry, Outcome};
use crate::transport::{RemoteEntry, Transport};
use chrono::{DateTime, Utc};
use nsc_engine::{build_invocation, classify, should_import, ConventionFields, MatchResult};
use serde::Serialize;
use std::fs;
use std::path::Path;
use tracing::{info, warn};

/// High-water cursor kept in the local receive directory.
const CURSOR_FILE: &str = "__latest_file_date";

/// Options for one receive run
#[derive(Debug, Clone, Copy, Default)]
pub struct ReceiveOptions {
    /// Classify and report without fetching, moving, or importing
    pub dry_run: bool,
}

/// Statistics from a receive run
#[derive(Debug, Default, Serialize)]
pub struct ReceiveReport {
    /// Entries visible on the remote endpoint
    pub listed: usize,
    /// Entries not newer than the cursor
    pub skipped_older: usize,
    /// Entries that could not be fetched
    pub fetch_failed: usize,
    /// Files renamed into the receive directory (no import ran)
    pub received: usize,
    /// Files with convention fields but no matching rule
    pub unmatched: usize,
    /// Files that do not fit the naming convention
    pub unparsed: usize,
    /// Files whose template failed to render (left staged)
    pub render_failed: usize,
    /// Files whose remote acknowledgment failed (left staged)
    pub ack_failed: usize,
    /// Files received and imported successfully
    pub imported: usize,
    /// Files received whose import failed
    pub import_failed: usize,
}

/// Per-file classification outcome, decided before any local move.
enum Plan<'r> {
    Classified {
        fields: ConventionFields,
        result: MatchResult<'r>,
        rendered: String,
    },
    Unmatched,
    Unparsed,
}

fn plan_for<'r>(config: &'r ExchangeConfig, name: &str) -> std::result::Result<Plan<'r>, String> {
    let fields = match ConventionFields::parse(name) {
        Ok(fields) => fields,
        Err(err) => {
            warn!(file = name, error = %err, "filename does not fit the naming convention");
            return Ok(Plan::Unparsed);
        }
    };

    match classify(&fields.submitted, &config.rules) {
        Some(result) => match result.render(&fields) {
            Ok(rendered) => Ok(Plan::Classified {
                fields,
                result,
                rendered,
            }),
            Err(err) => Err(err.to_string()),
        },
        None => Ok(Plan::Unmatched),
    }
}

/// Run the receive pipeline once.
pub fn receive_files(
    config: &ExchangeConfig,
    transport: &mut dyn Transport,
    journal: &Journal,
    options: &ReceiveOptions,
) -> Result<ReceiveReport> {
    fs::create_dir_all(&config.local.receive_path)?;
    fs::create_dir_all(&config.local.file_path)?;

    let cursor = read_cursor(&config.local.receive_path);
    let entries = transport.list()?;

    let mut report = ReceiveReport {
        listed: entries.len(),
        ..Default::default()
    };
    let mut newest: Option<DateTime<Utc>> = None;

    for entry in entries {
        if let Some(cursor) = cursor {
            if entry.mtime <= cursor {
                report.skipped_older += 1;
                continue;
            }
        }

        if options.dry_run {
            preview_entry(config, &entry, &mut report);
            continue;
        }

        if let Some(placed_at) = process_entry(config, transport, journal, &entry, &mut report)? {
            newest = Some(newest.map_or(placed_at, |n| n.max(placed_at)));
        }
    }

    if let Some(ts) = newest {
        if cursor.map_or(true, |c| ts > c) {
            write_cursor(&config.local.receive_path, ts)?;
        }
    }

    info!(
        listed = report.listed,
        received = report.received,
        imported = report.imported,
        unmatched = report.unmatched,
        unparsed = report.unparsed,
        "receive run complete"
    );
    Ok(report)
}

/// Dry run: classify and count without touching anything.
fn preview_entry(config: &ExchangeConfig, entry: &RemoteEntry, report: &mut ReceiveReport) {
    match plan_for(config, &entry.name) {
        Ok(Plan::Classified {
            result, rendered, ..
        }) => {
            info!(
                file = %entry.name,
                rule = %result.rule.name,
                %rendered,
                "would receive"
            );
            report.received += 1;
        }
        Ok(Plan::Unmatched) => {
            info!(file = %entry.name, "no rule matches; would quarantine");
            report.unmatched += 1;
        }
        Ok(Plan::Unparsed) => {
            report.unparsed += 1;
        }
        Err(reason) => {
            warn!(file = %entry.name, %reason, "template would fail to render");
            report.render_failed += 1;
        }
    }
}

/// Fetch, acknowledge, move, dispatch, and journal one remote entry.
///
/// Returns the entry's mtime when the file ended up placed locally, for the
/// cursor; `None` when it was left staged or not fetched.
fn process_entry(
    config: &ExchangeConfig,
    transport: &mut dyn Transport,
    journal: &Journal,
    entry: &RemoteEntry,
    report: &mut ReceiveReport,
) -> Result<Option<DateTime<Utc>>> {
    info!(file = %entry.name, mtime = %entry.mtime, "retrieving file");

    let staged = config.local.file_path.join(&entry.name);
    if let Err(err) = transport.fetch(&entry.name, &staged) {
        warn!(file = %entry.name, error = %err, "fetch failed, will retry next run");
        report.fetch_failed += 1;
        return Ok(None);
    }

    let plan = match plan_for(config, &entry.name) {
        Ok(plan) => plan,
        Err(reason) => {
            // Unreachable for a validated rule set; fail loudly for this
            // file and leave it staged under its original name.
            warn!(file = %entry.name, %reason, "template rendering failed");
            journal.record(&JournalEntry {
                remote_name: entry.name.clone(),
                local_name: staged.display().to_string(),
                rule: None,
                file_datetime: Some(entry.mtime),
                outcome: Outcome::RenderFailed,
            })?;
            report.render_failed += 1;
            return Ok(None);
        }
    };

    // The remote copy must be acknowledged before the local file takes its
    // new name.
    if let Err(err) = transport.acknowledge(&entry.name) {
        warn!(file = %entry.name, error = %err, "remote acknowledgment failed");
        journal.record(&JournalEntry {
            remote_name: entry.name.clone(),
            local_name: staged.display().to_string(),
            rule: None,
            file_datetime: Some(entry.mtime),
            outcome: Outcome::AckFailed,
        })?;
        report.ack_failed += 1;
        return Ok(None);
    }

    let (local_name, rule, outcome) = match &plan {
        Plan::Classified {
            result, rendered, ..
        } => (
            rendered.clone(),
            Some(result.rule.name.clone()),
            Outcome::Received,
        ),
        Plan::Unmatched => (entry.name.clone(), None, Outcome::Unmatched),
        Plan::Unparsed => (entry.name.clone(), None, Outcome::Unparsed),
    };

    let target = config.local.receive_path.join(&local_name);
    fs::rename(&staged, &target)?;

    let outcome = match &plan {
        Plan::Classified { fields, result, .. } => {
            dispatch_import(config, &target, fields, result, report)
                .unwrap_or(outcome)
        }
        _ => {
            match outcome {
                Outcome::Unmatched => report.unmatched += 1,
                Outcome::Unparsed => report.unparsed += 1,
                _ => {}
            }
            outcome
        }
    };
    if outcome == Outcome::Received {
        report.received += 1;
    }

    journal.record(&JournalEntry {
        remote_name: entry.name.clone(),
        local_name,
        rule,
        file_datetime: Some(entry.mtime),
        outcome,
    })?;

    Ok(Some(entry.mtime))
}

/// Run the import dispatch for a classified file.
///
/// Returns `Some(outcome)` when an import was attempted, `None` when the
/// file is not eligible.
fn dispatch_import(
    config: &ExchangeConfig,
    entry_path: &Path,
    fields: &ConventionFields,
    result: &MatchResult<'_>,
    report: &mut ReceiveReport,
) -> Option<Outcome> {
    let import = config.import.as_ref()?;
    if !should_import(result.rule, fields, import.report_type) {
        return None;
    }

    let invocation =
        match build_invocation(&import.cmd, &entry_path.display().to_string(), fields) {
            Ok(invocation) => invocation,
            Err(err) => {
                warn!(file = %entry_path.display(), error = %err, "cannot build import command");
                report.import_failed += 1;
                return Some(Outcome::ImportFailed);
            }
        };

    match run_import(&invocation) {
        Ok(ImportOutcome::Completed { duration_ms }) => {
            info!(file = %entry_path.display(), duration_ms, "import completed");
            report.imported += 1;
            Some(Outcome::Imported)
        }
        Ok(ImportOutcome::Failed {
            exit_code, stderr, ..
        }) => {
            warn!(
                file = %entry_path.display(),
                ?exit_code,
                stderr = stderr.trim(),
                "import failed"
            );
            report.import_failed += 1;
            Some(Outcome::ImportFailed)
        }
        Err(err) => {
            warn!(file = %entry_path.display(), error = %err, "import could not run");
            report.import_failed += 1;
            Some(Outcome::ImportFailed)
        }
    }
}

/// Read the high-water cursor, if any.
pub fn read_cursor(receive_dir: &Path) -> Option<DateTime<Utc>> {
    let content = fs::read_to_string(receive_dir.join(CURSOR_FILE)).ok()?;
    DateTime::parse_from_rfc3339(content.trim())
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Persist the high-water cursor.
pub fn write_cursor(receive_dir: &Path, ts: DateTime<Utc>) -> Result<()> {
    fs::write(receive_dir.join(CURSOR_FILE), ts.to_rfc3339())?;
    Ok(())
}
