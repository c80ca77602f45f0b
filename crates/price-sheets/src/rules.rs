//! Ordered first-match text rules
//!
//! Section headers, discovery content markers and pricing labels are all
//! declared as ordered `(pattern, target)` lists. Rules are evaluated top to
//! bottom and the first matching rule wins, so precedence is exactly the
//! declaration order.

use serde::{Deserialize, Serialize};

/// A single `(pattern, target)` rule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Rule<T> {
    /// Text to look for
    pub pattern: String,
    /// Compare case-insensitively (only meaningful for Latin patterns)
    #[serde(default)]
    pub ignore_case: bool,
    /// What a match resolves to
    pub target: T,
}

impl<T> Rule<T> {
    /// Case-sensitive rule
    pub fn new<S: Into<String>>(pattern: S, target: T) -> Self {
        Self {
            pattern: pattern.into(),
            ignore_case: false,
            target,
        }
    }

    /// Case-insensitive rule
    pub fn ignore_case<S: Into<String>>(pattern: S, target: T) -> Self {
        Self {
            pattern: pattern.into(),
            ignore_case: true,
            target,
        }
    }

    /// Whether `text` contains the pattern
    pub fn contained_in(&self, text: &str) -> bool {
        if self.ignore_case {
            text.to_lowercase().contains(&self.pattern.to_lowercase())
        } else {
            text.contains(self.pattern.as_str())
        }
    }

    /// Whether trimmed `text` equals the pattern
    pub fn equals(&self, text: &str) -> bool {
        let text = text.trim();
        if self.ignore_case {
            text.to_lowercase() == self.pattern.trim().to_lowercase()
        } else {
            text == self.pattern.trim()
        }
    }
}

/// An ordered list of rules evaluated top to bottom
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RuleSet<T>(pub Vec<Rule<T>>);

impl<T> RuleSet<T> {
    /// Create a rule set from rules in precedence order
    pub fn new(rules: Vec<Rule<T>>) -> Self {
        Self(rules)
    }

    /// Target of the first rule whose pattern occurs in `text`
    pub fn first_match(&self, text: &str) -> Option<&T> {
        self.0
            .iter()
            .find(|rule| rule.contained_in(text))
            .map(|rule| &rule.target)
    }

    /// Target of the first rule whose pattern equals `text`
    pub fn first_equal(&self, text: &str) -> Option<&T> {
        self.0
            .iter()
            .find(|rule| rule.equals(text))
            .map(|rule| &rule.target)
    }

    /// Check if the set has no rules
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over the rules in precedence order
    pub fn iter(&self) -> impl Iterator<Item = &Rule<T>> {
        self.0.iter()
    }
}
