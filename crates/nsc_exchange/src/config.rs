//! Exchange configuration
//!
//! One YAML document, loaded once at startup and validated eagerly into an
//! immutable [`ExchangeConfig`]. A malformed rule or import section aborts
//! here, before any file is touched. The config object is passed by
//! reference into every component; there is no ambient global state.

use crate::error::{ExchangeError, Result};
use nsc_engine::{validate_command_template, ConfigError, ReportType, RuleDef, RuleSet};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Remote endpoint settings (`nsc.ftp`).
///
/// The secure channel itself is an external collaborator; these settings are
/// carried for it. The `local` protocol treats `receive_path`/`send_path`
/// as directories on this host (a mounted exchange share or spool).
#[derive(Debug, Clone, Deserialize)]
pub struct FtpConfig {
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    pub username: String,
    pub password: String,
    #[serde(default = "default_protocol")]
    pub protocol: String,
    pub receive_path: String,
    pub send_path: String,
}

fn default_port() -> u16 {
    22
}

fn default_protocol() -> String {
    "sftp".to_string()
}

/// Local directory layout (`nsc.local`).
#[derive(Debug, Clone, Deserialize)]
pub struct LocalConfig {
    /// Where renamed (and quarantined) deliveries land
    pub receive_path: PathBuf,
    /// Outbound files waiting for upload
    pub send_path: PathBuf,
    /// Archived copies of sent files
    pub archive_path: PathBuf,
    /// Append-only CSV journal
    pub log_file: PathBuf,
    /// Staging directory for in-flight fetches
    pub file_path: PathBuf,
}

/// Import section as authored (`nsc.import`).
#[derive(Debug, Clone, Deserialize)]
pub struct ImportDef {
    /// Report type that triggers the import (e.g. "DETLRPT")
    #[serde(rename = "type")]
    pub report_type: String,
    /// Command template with `{entry}`, `{fn}`, `{dt}` placeholders
    pub cmd: String,
}

#[derive(Debug, Clone, Deserialize)]
struct NscSection {
    ftp: FtpConfig,
    local: LocalConfig,
    #[serde(default)]
    rename: Vec<RuleDef>,
    #[serde(default)]
    import: Option<ImportDef>,
}

#[derive(Debug, Clone, Deserialize)]
struct ConfigFile {
    nsc: NscSection,
}

/// Validated import settings.
#[derive(Debug, Clone)]
pub struct ImportSettings {
    pub report_type: ReportType,
    pub cmd: String,
}

/// The validated, immutable runtime configuration.
#[derive(Debug, Clone)]
pub struct ExchangeConfig {
    pub ftp: FtpConfig,
    pub local: LocalConfig,
    pub rules: RuleSet,
    pub import: Option<ImportSettings>,
}

impl ExchangeConfig {
    /// Load and validate configuration from a YAML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            ExchangeError::ConfigFile(format!("cannot read {}: {e}", path.display()))
        })?;
        Self::from_yaml(&content)
    }

    /// Parse and validate a YAML configuration document.
    pub fn from_yaml(content: &str) -> Result<Self> {
        let file: ConfigFile = serde_yaml::from_str(content)?;
        let NscSection {
            ftp,
            local,
            rename,
            import,
        } = file.nsc;

        let rules = RuleSet::load(rename)?;

        let import = match import {
            Some(def) => {
                let report_type = ReportType::parse(&def.report_type).ok_or(
                    ConfigError::UnknownImportType {
                        value: def.report_type.clone(),
                    },
                )?;
                validate_command_template(&def.cmd)?;
                Some(ImportSettings {
                    report_type,
                    cmd: def.cmd,
                })
            }
            None => None,
        };

        Ok(Self {
            ftp,
            local,
            rules,
            import,
        })
    }
}
