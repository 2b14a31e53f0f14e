//! Rule classification and name rendering
//!
//! Matches a submitted-name fragment against the rule set, first match
//! wins. Pure: no side effects, no shared state, safe to fan out across
//! parallel workers.

use crate::convention::ConventionFields;
use crate::error::RenderError;
use crate::rules::{Rule, RuleSet};
use crate::template;
use std::collections::BTreeMap;

/// The rule selected for a submitted-name fragment plus its captured fields.
#[derive(Debug, Clone)]
pub struct MatchResult<'r> {
    pub rule: &'r Rule,
    /// Capture-group name to captured value. A named group that did not
    /// participate in the match captures the empty string, so optional
    /// groups can appear in templates.
    pub captures: BTreeMap<String, String>,
}

impl<'r> MatchResult<'r> {
    /// Render the output filename for this match.
    ///
    /// Builds one placeholder context by laying the captures over the
    /// convention fields (captures win on key collision, as rule-specific
    /// overrides) and substitutes the rule's template from it.
    pub fn render(&self, fields: &ConventionFields) -> Result<String, RenderError> {
        let mut context = fields.context();
        for (name, value) in &self.captures {
            context.insert(name.clone(), value.clone());
        }
        template::render(&self.rule.replace, &context)
    }
}

/// Select the first rule whose pattern matches the entire fragment.
///
/// Configuration order is the precedence order; partial matches never
/// classify. Returns `None` when no rule matches.
pub fn classify<'r>(submitted: &str, rules: &'r RuleSet) -> Option<MatchResult<'r>> {
    for rule in rules.rules() {
        if let Some(caps) = rule.regex().captures(submitted) {
            let captures = rule
                .capture_names()
                .iter()
                .map(|name| {
                    let value = caps
                        .name(name)
                        .map(|m| m.as_str().to_string())
                        .unwrap_or_default();
                    (name.clone(), value)
                })
                .collect();
            return Some(MatchResult { rule, captures });
        }
    }
    None
}
