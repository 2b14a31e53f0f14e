//! The delivery naming convention
//!
//! Every incoming file is named `CODE_IDX_TYPE_MODE_DATETIME_submitted.ext`:
//! an underscore-delimited fixed prefix, a free-form submitted name, and a
//! dot-delimited extension. This module decomposes a raw filename into those
//! fields or reports exactly why it does not fit.

use crate::error::ParseError;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Timestamp layout used in the fixed prefix (`01152024093000`).
pub const CONVENTION_DT_FORMAT: &str = "%m%d%Y%H%M%S";

/// Filename-safe timestamp layout used in rendered names and the import
/// contract (`20240115_093000`).
pub const COMPACT_DT_FORMAT: &str = "%Y%m%d_%H%M%S";

/// Field names available to every rename template, in addition to the
/// matched rule's own capture groups.
pub const CONVENTION_FIELDS: &[&str] = &[
    "schoolcode",
    "idx",
    "nsctype",
    "nscmode",
    "subdatetime",
    "subdatetime_dt",
    "fn",
    "ext",
];

/// Report type carried in the third prefix segment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ReportType {
    Aggrrpt,
    Analysisrdy,
    Cntlrpt,
    Detlrpt,
}

impl ReportType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Aggrrpt => "AGGRRPT",
            Self::Analysisrdy => "ANALYSISRDY",
            Self::Cntlrpt => "CNTLRPT",
            Self::Detlrpt => "DETLRPT",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "AGGRRPT" => Some(Self::Aggrrpt),
            "ANALYSISRDY" => Some(Self::Analysisrdy),
            "CNTLRPT" => Some(Self::Cntlrpt),
            "DETLRPT" => Some(Self::Detlrpt),
            _ => None,
        }
    }
}

/// Report mode carried in the fourth prefix segment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ReportMode {
    Se,
    Pa,
}

impl ReportMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Se => "SE",
            Self::Pa => "PA",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "SE" => Some(Self::Se),
            "PA" => Some(Self::Pa),
            _ => None,
        }
    }
}

/// The fields embedded in a conforming filename
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConventionFields {
    /// School code (first segment, opaque)
    pub schoolcode: String,
    /// Run index (second segment, opaque)
    pub idx: String,
    /// Report type (third segment)
    pub nsctype: ReportType,
    /// Report mode (fourth segment)
    pub nscmode: ReportMode,
    /// Raw submission timestamp as delivered
    pub subdatetime: String,
    /// Parsed submission timestamp
    pub subdatetime_dt: NaiveDateTime,
    /// Submitted name fragment, lower-cased unconditionally
    #[serde(rename = "fn")]
    pub submitted: String,
    /// File extension (after the last dot)
    pub ext: String,
}

impl ConventionFields {
    /// Decompose a raw filename into convention fields.
    ///
    /// The prefix is split from the left on exactly five underscores; the
    /// remainder is split on its last dot into submitted fragment and
    /// extension. Parsing is total and deterministic: the same input always
    /// yields the same fields or the same error.
    pub fn parse(raw: &str) -> Result<Self, ParseError> {
        let parts: Vec<&str> = raw.splitn(6, '_').collect();
        if parts.len() < 6 {
            return Err(ParseError::Segments {
                expected: 6,
                found: parts.len(),
            });
        }

        let nsctype = ReportType::parse(parts[2])
            .ok_or_else(|| ParseError::UnknownReportType(parts[2].to_string()))?;
        let nscmode = ReportMode::parse(parts[3])
            .ok_or_else(|| ParseError::UnknownReportMode(parts[3].to_string()))?;

        let subdatetime = parts[4];
        if subdatetime.len() != 14 || !subdatetime.bytes().all(|b| b.is_ascii_digit()) {
            return Err(ParseError::Timestamp(subdatetime.to_string()));
        }
        let subdatetime_dt = NaiveDateTime::parse_from_str(subdatetime, CONVENTION_DT_FORMAT)
            .map_err(|_| ParseError::Timestamp(subdatetime.to_string()))?;

        let (submitted, ext) = parts[5]
            .rsplit_once('.')
            .ok_or(ParseError::MissingExtension)?;
        if ext.is_empty() {
            return Err(ParseError::MissingExtension);
        }

        Ok(Self {
            schoolcode: parts[0].to_string(),
            idx: parts[1].to_string(),
            nsctype,
            nscmode,
            subdatetime: subdatetime.to_string(),
            subdatetime_dt,
            submitted: submitted.to_lowercase(),
            ext: ext.to_string(),
        })
    }

    /// Placeholder context contributed by the convention fields.
    pub fn context(&self) -> BTreeMap<String, String> {
        let mut ctx = BTreeMap::new();
        ctx.insert("schoolcode".to_string(), self.schoolcode.clone());
        ctx.insert("idx".to_string(), self.idx.clone());
        ctx.insert("nsctype".to_string(), self.nsctype.as_str().to_string());
        ctx.insert("nscmode".to_string(), self.nscmode.as_str().to_string());
        ctx.insert("subdatetime".to_string(), self.subdatetime.clone());
        ctx.insert(
            "subdatetime_dt".to_string(),
            self.subdatetime_dt.format(COMPACT_DT_FORMAT).to_string(),
        );
        ctx.insert("fn".to_string(), self.submitted.clone());
        ctx.insert("ext".to_string(), self.ext.clone());
        ctx
    }
}
