//! Error types for the classification engine
//!
//! Each failure class gets its own type because each is handled differently:
//! a `ConfigError` aborts startup, a `ParseError` routes one file to the
//! unclassified outcome, and a `RenderError` fails one file loudly.

use thiserror::Error;

/// Malformed rule set or import configuration. Fatal at load time; a bad
/// configuration never reaches per-file processing.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("rule '{rule}': unknown mode '{mode}' (expected SE or PA)")]
    UnknownMode { rule: String, mode: String },

    #[error("rule '{rule}': invalid pattern: {source}")]
    InvalidPattern {
        rule: String,
        #[source]
        source: regex::Error,
    },

    #[error("rule '{rule}': malformed template '{template}': {reason}")]
    MalformedTemplate {
        rule: String,
        template: String,
        reason: String,
    },

    #[error("rule '{rule}': placeholder '{{{placeholder}}}' resolves from neither a capture group nor a convention field")]
    UnresolvedPlaceholder { rule: String, placeholder: String },

    #[error("duplicate rule name '{rule}'")]
    DuplicateRule { rule: String },

    #[error("unknown report type '{value}' for import filter")]
    UnknownImportType { value: String },

    #[error("import command template is empty")]
    EmptyImportCommand,

    #[error("import command placeholder '{{{placeholder}}}' is not one of entry, fn, dt")]
    UnknownImportPlaceholder { placeholder: String },
}

/// A filename that does not fit the delivery naming convention. Recoverable
/// per file; the orchestrator routes it to the unclassified outcome.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ParseError {
    #[error("expected {expected} underscore-delimited segments, found {found}")]
    Segments { expected: usize, found: usize },

    #[error("unknown report type '{0}'")]
    UnknownReportType(String),

    #[error("unknown report mode '{0}'")]
    UnknownReportMode(String),

    #[error("timestamp '{0}' is not MMDDYYYYHHMMSS")]
    Timestamp(String),

    #[error("missing file extension")]
    MissingExtension,
}

/// A template placeholder with no value in the merged context. Unreachable
/// for rule sets that passed load-time validation, but checked anyway so a
/// validation bug can never emit a malformed filename.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum RenderError {
    #[error("unresolved placeholder '{{{placeholder}}}' in template '{template}'")]
    Unresolved {
        placeholder: String,
        template: String,
    },

    #[error("malformed template '{template}': {reason}")]
    Malformed { template: String, reason: String },
}
