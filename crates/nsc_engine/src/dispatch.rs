//! Import dispatch decision
//!
//! Decides whether a classified file should trigger the external import
//! collaborator and builds the invocation descriptor for it. No execution
//! happens here; the orchestrator owns the subprocess.

use crate::convention::{ConventionFields, ReportType, COMPACT_DT_FORMAT};
use crate::error::{ConfigError, RenderError};
use crate::rules::Rule;
use crate::template;
use serde::Serialize;
use std::collections::BTreeMap;

/// Placeholders the import command template may reference.
const IMPORT_PLACEHOLDERS: &[&str] = &["entry", "fn", "dt"];

/// A fully substituted external import command: argv, no shell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImportInvocation {
    pub program: String,
    pub args: Vec<String>,
}

/// Whether a matched file is eligible for the external import.
///
/// Requires both the rule's import flag and a derived report type equal to
/// the single globally configured import type. The comparison uses the
/// file's own derived type, not anything on the rule.
pub fn should_import(rule: &Rule, fields: &ConventionFields, import_type: ReportType) -> bool {
    rule.import && fields.nsctype == import_type
}

/// Validate the configured import command template at load time.
pub fn validate_command_template(cmd: &str) -> Result<(), ConfigError> {
    if cmd.split_whitespace().next().is_none() {
        return Err(ConfigError::EmptyImportCommand);
    }
    let referenced = template::placeholders(cmd).map_err(|reason| {
        ConfigError::MalformedTemplate {
            rule: "import".to_string(),
            template: cmd.to_string(),
            reason,
        }
    })?;
    for placeholder in referenced {
        if !IMPORT_PLACEHOLDERS.contains(&placeholder.as_str()) {
            return Err(ConfigError::UnknownImportPlaceholder { placeholder });
        }
    }
    Ok(())
}

/// Build the import invocation for one file.
///
/// `{entry}` is the full local path of the renamed file, `{fn}` the original
/// submitted fragment, `{dt}` the submission timestamp in `YYYYMMDD_HHMMSS`.
/// The template is split on whitespace before substitution, so substituted
/// values never re-tokenize the command.
pub fn build_invocation(
    cmd_template: &str,
    entry: &str,
    fields: &ConventionFields,
) -> Result<ImportInvocation, RenderError> {
    let mut context = BTreeMap::new();
    context.insert("entry".to_string(), entry.to_string());
    context.insert("fn".to_string(), fields.submitted.clone());
    context.insert(
        "dt".to_string(),
        fields.subdatetime_dt.format(COMPACT_DT_FORMAT).to_string(),
    );

    let mut tokens = cmd_template.split_whitespace();
    let program = match tokens.next() {
        Some(token) => template::render(token, &context)?,
        None => {
            return Err(RenderError::Malformed {
                template: cmd_template.to_string(),
                reason: "empty command".to_string(),
            });
        }
    };
    let args = tokens
        .map(|token| template::render(token, &context))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(ImportInvocation { program, args })
}
