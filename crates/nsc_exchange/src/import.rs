//! External import execution
//!
//! Runs the configured import command as a subprocess: argv invocation, no
//! shell, captured output. A failing import affects only its own file; the
//! caller records the outcome and moves on.

use crate::error::Result;
use nsc_engine::ImportInvocation;
use std::process::Command;
use std::time::Instant;
use tracing::debug;

/// Result of running the import command for one file
#[derive(Debug, Clone)]
pub enum ImportOutcome {
    /// Import exited zero
    Completed { duration_ms: u64 },
    /// Import exited non-zero (or was killed by a signal)
    Failed {
        exit_code: Option<i32>,
        stderr: String,
        duration_ms: u64,
    },
}

impl ImportOutcome {
    pub fn success(&self) -> bool {
        matches!(self, Self::Completed { .. })
    }

    pub fn duration_ms(&self) -> u64 {
        match self {
            Self::Completed { duration_ms } => *duration_ms,
            Self::Failed { duration_ms, .. } => *duration_ms,
        }
    }
}

/// Execute one import invocation, capturing its exit status and stderr.
///
/// An I/O failure to spawn the process (missing program, permissions) is an
/// error for the caller; a non-zero exit is a per-file `Failed` outcome.
pub fn run_import(invocation: &ImportInvocation) -> Result<ImportOutcome> {
    debug!(program = %invocation.program, args = ?invocation.args, "running import command");
    let started = Instant::now();
    let output = Command::new(&invocation.program)
        .args(&invocation.args)
        .output()?;
    let duration_ms = started.elapsed().as_millis() as u64;

    if output.status.success() {
        Ok(ImportOutcome::Completed { duration_ms })
    } else {
        Ok(ImportOutcome::Failed {
            exit_code: output.status.code(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            duration_ms,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn invocation(program: &str, args: &[&str]) -> ImportInvocation {
        ImportInvocation {
            program: program.to_string(),
            args: args.iter().map(|a| a.to_string()).collect(),
        }
    }

    #[test]
    fn zero_exit_completes() {
        let outcome = run_import(&invocation("true", &["entry", "fn", "dt"])).unwrap();
        assert!(outcome.success());
    }

    #[test]
    fn nonzero_exit_fails() {
        let outcome = run_import(&invocation("false", &[])).unwrap();
        match outcome {
            ImportOutcome::Failed { exit_code, .. } => assert_eq!(exit_code, Some(1)),
            ImportOutcome::Completed { .. } => panic!("expected failure"),
        }
    }

    #[test]
    fn missing_program_is_an_error() {
        assert!(run_import(&invocation("definitely-not-a-real-program", &[])).is_err());
    }
}
