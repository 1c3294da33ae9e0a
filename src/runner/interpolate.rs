//! Variable interpolation for configuration text
//!
//! Substitution is textual and happens on the raw YAML document before it
//! is re-parsed: `${name}` is replaced with a resolved option value, `$$`
//! escapes to a literal `$` and shields whatever follows it, and any other
//! `$...` form passes through unchanged. The `$$` escape survives every
//! substitution pass and is collapsed exactly once by [`escape`] at the end
//! of the pipeline.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

static REFERENCE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\$\$|\$\{([A-Za-z0-9_][A-Za-z0-9_-]*)\}").unwrap()
});

static ESCAPE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\$\$").unwrap());

/// Replace `${name}` with a value throughout a text fragment
///
/// Occurrences shielded by a `$$` escape are left alone, as is every other
/// `${...}` token.
pub fn apply(text: &str, name: &str, value: &str) -> String {
    let pattern = Regex::new(&format!(r"\$\$|\$\{{{}\}}", regex::escape(name)))
        .expect("escaped option name is a valid pattern");

    pattern
        .replace_all(text, |caps: &Captures| {
            if &caps[0] == "$$" {
                "$$".to_string()
            } else {
                value.to_string()
            }
        })
        .to_string()
}

/// Collapse each `$$` escape to a single `$`
///
/// Called once, after the last substitution pass.
pub fn escape(text: &str) -> String {
    ESCAPE_RE.replace_all(text, regex::NoExpand("$")).to_string()
}

/// Names referenced as `${name}` in a text fragment, in order of first use
///
/// `$$`-shielded tokens are not references.
pub fn references(text: &str) -> Vec<String> {
    let mut names = Vec::new();
    for caps in REFERENCE_RE.captures_iter(text) {
        if let Some(name) = caps.get(1) {
            let name = name.as_str().to_string();
            if !names.contains(&name) {
                names.push(name);
            }
        }
    }
    names
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_substitution() {
        let result = apply("Hello, ${name}!", "name", "world");
        assert_eq!(result, "Hello, world!");
    }

    #[test]
    fn test_substitution_is_per_name() {
        let text = "${first} ${last}";
        let result = apply(text, "first", "Ada");
        assert_eq!(result, "Ada ${last}");
        let result = apply(&result, "last", "Lovelace");
        assert_eq!(result, "Ada Lovelace");
    }

    #[test]
    fn test_escape_shields_substitution() {
        let result = apply("literal $${name} here", "name", "value");
        assert_eq!(result, "literal $${name} here");
    }

    #[test]
    fn test_escape_survives_multiple_passes() {
        let mut text = "cost: $$5 and $${HOME}".to_string();
        for name in ["a", "b", "c"] {
            text = apply(&text, name, "x");
        }
        assert_eq!(text, "cost: $$5 and $${HOME}");
        assert_eq!(escape(&text), "cost: $5 and ${HOME}");
    }

    #[test]
    fn test_other_dollar_forms_pass_through() {
        let result = apply("echo $NAME ${other}", "name", "value");
        assert_eq!(result, "echo $NAME ${other}");
    }

    #[test]
    fn test_escape_collapses_pairs() {
        assert_eq!(escape("$$"), "$");
        assert_eq!(escape("$$$$"), "$$");
        assert_eq!(escape("a$$b$$c"), "a$b$c");
    }

    #[test]
    fn test_idempotent_without_tokens() {
        let text = "plain text with $VAR and nothing else";
        assert_eq!(apply(text, "name", "value"), text);
        assert_eq!(escape(text), text);
    }

    #[test]
    fn test_value_is_inserted_literally() {
        let result = apply("path: ${dir}", "dir", "a$1b");
        assert_eq!(result, "path: a$1b");
    }

    #[test]
    fn test_references() {
        let refs = references("echo ${a} ${b-c} $${shielded} ${a}");
        assert_eq!(refs, vec!["a".to_string(), "b-c".to_string()]);
    }

    #[test]
    fn test_references_empty() {
        assert!(references("no tokens, just $PLAIN and $$").is_empty());
    }
}
