//! Classification rules
//!
//! A rule pairs a match pattern (regular expression with named capture
//! groups) with a rename template and an import flag. Rules are loaded once
//! from configuration, validated eagerly, and never mutated afterwards.
//! Configuration order is significant: the classifier applies rules
//! first-match-wins, so the ordered list is preserved exactly as authored.

use crate::convention::{ReportMode, CONVENTION_FIELDS};
use crate::error::ConfigError;
use crate::template;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// A rule as authored in configuration, before compilation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleDef {
    /// Unique rule name (e.g. "IPEDS")
    pub name: String,
    /// Mode tag (SE or PA)
    pub mode: String,
    /// Regular expression with named capture groups, matched against the
    /// entire submitted-name fragment
    pub pattern: String,
    /// Rename template with `{name}` placeholders
    pub replace: String,
    /// Free-text description, non-functional
    #[serde(default)]
    pub desc: String,
    /// Whether matched files are eligible for the external import
    #[serde(default)]
    pub import: bool,
}

/// A compiled, validated rule.
#[derive(Debug, Clone)]
pub struct Rule {
    pub name: String,
    pub mode: ReportMode,
    /// Pattern source text as authored (for display and logs)
    pub pattern: String,
    pub replace: String,
    pub desc: String,
    pub import: bool,
    regex: Regex,
    capture_names: Vec<String>,
}

impl Rule {
    /// The compiled pattern, anchored to the full submitted fragment.
    pub fn regex(&self) -> &Regex {
        &self.regex
    }

    /// Names of the pattern's named capture groups.
    pub fn capture_names(&self) -> &[String] {
        &self.capture_names
    }
}

/// Ordered, immutable collection of compiled rules.
#[derive(Debug, Clone, Default)]
pub struct RuleSet {
    rules: Vec<Rule>,
}

impl RuleSet {
    /// Compile and validate rule definitions, preserving authored order.
    ///
    /// Fails fast: every rule's mode must be recognized, its pattern must
    /// compile, and every placeholder in its template must resolve from the
    /// union of the pattern's capture groups and the convention fields. A
    /// bad rule is a startup error, never a silent per-file miss.
    pub fn load(defs: Vec<RuleDef>) -> Result<Self, ConfigError> {
        let mut seen: HashSet<String> = HashSet::new();
        let mut rules = Vec::with_capacity(defs.len());

        for def in defs {
            if !seen.insert(def.name.clone()) {
                return Err(ConfigError::DuplicateRule { rule: def.name });
            }

            let mode = ReportMode::parse(&def.mode).ok_or_else(|| ConfigError::UnknownMode {
                rule: def.name.clone(),
                mode: def.mode.clone(),
            })?;

            // Anchor so partial matches never classify.
            let regex = Regex::new(&format!("^(?:{})$", def.pattern)).map_err(|source| {
                ConfigError::InvalidPattern {
                    rule: def.name.clone(),
                    source,
                }
            })?;
            let capture_names: Vec<String> = regex
                .capture_names()
                .flatten()
                .map(str::to_string)
                .collect();

            let referenced =
                template::placeholders(&def.replace).map_err(|reason| {
                    ConfigError::MalformedTemplate {
                        rule: def.name.clone(),
                        template: def.replace.clone(),
                        reason,
                    }
                })?;
            for placeholder in referenced {
                let resolvable = capture_names.iter().any(|c| *c == placeholder)
                    || CONVENTION_FIELDS.contains(&placeholder.as_str());
                if !resolvable {
                    return Err(ConfigError::UnresolvedPlaceholder {
                        rule: def.name,
                        placeholder,
                    });
                }
            }

            rules.push(Rule {
                name: def.name,
                mode,
                pattern: def.pattern,
                replace: def.replace,
                desc: def.desc,
                import: def.import,
                regex,
                capture_names,
            });
        }

        tracing::debug!(rules = rules.len(), "compiled rule set");
        Ok(Self { rules })
    }

    /// Rules in configuration order.
    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Look up a rule by name.
    pub fn get(&self, name: &str) -> Option<&Rule> {
        self.rules.iter().find(|r| r.name == name)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}
