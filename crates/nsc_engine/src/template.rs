//! Rename-template substitution
//!
//! Templates reference values by `{name}` placeholders over a closed set
//! discovered at load time. Substitution is an explicit scan, not a generic
//! formatting facility, so an unresolved placeholder surfaces as a
//! first-class [`RenderError`] instead of leaking into an output filename.

use crate::error::RenderError;
use std::collections::BTreeMap;

/// One piece of a tokenized template.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Placeholder(String),
}

fn is_placeholder_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || ch == '_'
}

/// Tokenize a template into literal and placeholder segments.
///
/// `{` always opens a placeholder; placeholder names are `[A-Za-z0-9_]+`.
/// A stray `}` outside a placeholder is literal text.
fn tokenize(template: &str) -> Result<Vec<Segment>, String> {
    let mut segments = Vec::new();
    let mut literal = String::new();
    let mut chars = template.chars();

    while let Some(ch) = chars.next() {
        if ch != '{' {
            literal.push(ch);
            continue;
        }

        if !literal.is_empty() {
            segments.push(Segment::Literal(std::mem::take(&mut literal)));
        }

        let mut name = String::new();
        loop {
            match chars.next() {
                Some('}') => break,
                Some(c) if is_placeholder_char(c) => name.push(c),
                Some(c) => {
                    return Err(format!("unexpected character '{c}' in placeholder"));
                }
                None => return Err("unclosed '{'".to_string()),
            }
        }
        if name.is_empty() {
            return Err("empty placeholder '{}'".to_string());
        }
        segments.push(Segment::Placeholder(name));
    }

    if !literal.is_empty() {
        segments.push(Segment::Literal(literal));
    }
    Ok(segments)
}

/// The placeholder names a template references, in order of appearance.
/// Duplicates are preserved; callers that need the set deduplicate.
pub fn placeholders(template: &str) -> Result<Vec<String>, String> {
    Ok(tokenize(template)?
        .into_iter()
        .filter_map(|seg| match seg {
            Segment::Placeholder(name) => Some(name),
            Segment::Literal(_) => None,
        })
        .collect())
}

/// Substitute every placeholder in `template` from `context`.
///
/// Deterministic: identical inputs always produce the identical string.
pub fn render(
    template: &str,
    context: &BTreeMap<String, String>,
) -> Result<String, RenderError> {
    let segments = tokenize(template).map_err(|reason| RenderError::Malformed {
        template: template.to_string(),
        reason,
    })?;

    let mut out = String::with_capacity(template.len());
    for segment in segments {
        match segment {
            Segment::Literal(text) => out.push_str(&text),
            Segment::Placeholder(name) => match context.get(&name) {
                Some(value) => out.push_str(value),
                None => {
                    return Err(RenderError::Unresolved {
                        placeholder: name,
                        template: template.to_string(),
                    });
                }
            },
        }
    }
    Ok(out)
}
