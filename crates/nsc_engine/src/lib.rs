//! NSC Engine - Classification & Rename Core
//!
//! The pure core of the clearinghouse file exchange: given one incoming
//! filename, decompose it into convention fields, select the first
//! configured rule whose pattern matches the submitted fragment, render the
//! output filename from the rule's template, and decide whether the file
//! triggers the external import.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐     ┌──────────────┐
//! │  Convention │     │ Classifier  │     │  Renderer   │     │   Dispatch   │
//! │   Parser    │────▶│ (first rule │────▶│ (template → │────▶│ (import yes/ │
//! │             │     │    wins)    │     │  filename)  │     │  no + argv)  │
//! └─────────────┘     └─────────────┘     └─────────────┘     └──────────────┘
//! ```
//!
//! Everything here is synchronous, deterministic, and free of I/O. The
//! orchestrating binary owns transports, filesystem moves, journalling, and
//! subprocess execution.

pub mod classifier;
pub mod convention;
pub mod dispatch;
pub mod error;
pub mod rules;
pub mod template;

// Re-exports for convenience
pub use classifier::{classify, MatchResult};
pub use convention::{
    ConventionFields, ReportMode, ReportType, COMPACT_DT_FORMAT, CONVENTION_DT_FORMAT,
    CONVENTION_FIELDS,
};
pub use dispatch::{build_invocation, should_import, validate_command_template, ImportInvocation};
pub use error::{ConfigError, ParseError, RenderError};
pub use rules::{Rule, RuleDef, RuleSet};
