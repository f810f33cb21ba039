//! Ordered (pattern, verdict) rule tables with a single generic matcher.

use serde::{Deserialize, Serialize};

/// How a rule's text is compared against a failure message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "match", content = "text", rename_all = "snake_case")]
pub enum MessagePattern {
    Exact(String),
    Prefix(String),
    Contains(String),
    ContainsIgnoreCase(String),
}

impl MessagePattern {
    pub fn exact(text: impl Into<String>) -> Self {
        Self::Exact(text.into())
    }

    pub fn prefix(text: impl Into<String>) -> Self {
        Self::Prefix(text.into())
    }

    pub fn contains(text: impl Into<String>) -> Self {
        Self::Contains(text.into())
    }

    pub fn contains_ignore_case(text: impl Into<String>) -> Self {
        Self::ContainsIgnoreCase(text.into())
    }

    pub fn matches(&self, message: &str) -> bool {
        match self {
            Self::Exact(text) => message == text,
            Self::Prefix(text) => message.starts_with(text.as_str()),
            Self::Contains(text) => message.contains(text.as_str()),
            Self::ContainsIgnoreCase(text) => message
                .to_lowercase()
                .contains(&text.to_lowercase()),
        }
    }
}

/// One entry of a rule table. A rule without `method` applies to every method.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rule<V> {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
    pub pattern: MessagePattern,
    pub verdict: V,
}

impl<V> Rule<V> {
    pub fn any_method(pattern: MessagePattern, verdict: V) -> Self {
        Self {
            method: None,
            pattern,
            verdict,
        }
    }

    pub fn for_method(method: impl Into<String>, pattern: MessagePattern, verdict: V) -> Self {
        Self {
            method: Some(method.into()),
            pattern,
            verdict,
        }
    }

    fn applies(&self, method: &str, message: &str) -> bool {
        self.method.as_deref().map_or(true, |m| m == method) && self.pattern.matches(message)
    }
}

/// An ordered rule table; the first applicable rule wins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RuleTable<V> {
    rules: Vec<Rule<V>>,
}

impl<V: Copy> RuleTable<V> {
    pub fn new(rules: Vec<Rule<V>>) -> Self {
        Self { rules }
    }

    /// Verdict of the first rule matching `method` and `message`.
    pub fn first_match(&self, method: &str, message: &str) -> Option<V> {
        self.rules
            .iter()
            .find(|rule| rule.applies(method, message))
            .map(|rule| rule.verdict)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}
