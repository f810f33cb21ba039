//! Effect classifier: did a failed call reach far enough to have side effects?

use std::fmt;

use serde::{Deserialize, Serialize};

use super::pattern::{MessagePattern, Rule, RuleTable};

/// Whether a failed call's side effects reached the node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutedVerdict {
    /// The node provably did not act on the request.
    NotExecuted,
    /// The node provably acted on the request.
    Executed,
    /// Side effects may or may not have happened.
    Unknown,
}

impl ExecutedVerdict {
    /// `Some(false)` / `Some(true)` / `None`, for callers that want a nullable flag.
    pub fn as_option(self) -> Option<bool> {
        match self {
            Self::NotExecuted => Some(false),
            Self::Executed => Some(true),
            Self::Unknown => None,
        }
    }
}

impl fmt::Display for ExecutedVerdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotExecuted => write!(f, "not-executed"),
            Self::Executed => write!(f, "executed"),
            Self::Unknown => write!(f, "unknown"),
        }
    }
}

/// What a message pattern can prove. A message alone never proves execution,
/// so there is no `Executed` evidence; `Unknown` rules let a table carve
/// exceptions ahead of broader `NotExecuted` rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EffectEvidence {
    NotExecuted,
    Unknown,
}

impl From<EffectEvidence> for ExecutedVerdict {
    fn from(evidence: EffectEvidence) -> Self {
        match evidence {
            EffectEvidence::NotExecuted => Self::NotExecuted,
            EffectEvidence::Unknown => Self::Unknown,
        }
    }
}

/// Node states in which requests are rejected before dispatch.
const NODE_NOT_READY: &[&str] = &[
    "Work queue depth exceeded",
    "Loading block index",
    "Rewinding blocks",
    "Loading P2P addresses",
    "Verifying blocks",
    "Verifying wallet",
    "Loading wallet",
    "Activating best chain",
    "Parsing Omni Layer transactions",
    "Upgrading",
];

/// Transaction construction failures raised before broadcast.
const CONSTRUCTION_FAILED: &[&str] = &[
    "Error creating transaction",
    "Error with selected inputs",
    "Sender has insufficient balance",
    "fees may not be sufficient",
    "Error choosing inputs for the send transaction",
    "Error committing transaction",
];

/// The built-in Bitcoin Core / Omni Core effect table.
pub fn default_effect_rules() -> RuleTable<EffectEvidence> {
    let mut rules: Vec<Rule<EffectEvidence>> = NODE_NOT_READY
        .iter()
        .map(|text| Rule::any_method(MessagePattern::prefix(*text), EffectEvidence::NotExecuted))
        .collect();

    rules.extend(CONSTRUCTION_FAILED.iter().map(|text| {
        Rule::any_method(
            MessagePattern::contains_ignore_case(*text),
            EffectEvidence::NotExecuted,
        )
    }));
    rules.extend([
        Rule::any_method(
            MessagePattern::contains_ignore_case("insufficient funds"),
            EffectEvidence::NotExecuted,
        ),
        Rule::any_method(MessagePattern::prefix("Invalid amount"), EffectEvidence::NotExecuted),
        Rule::any_method(MessagePattern::contains("ECONNREFUSED"), EffectEvidence::NotExecuted),
        Rule::any_method(MessagePattern::prefix("connect error to "), EffectEvidence::NotExecuted),
        Rule::any_method(
            MessagePattern::contains_ignore_case("connection refused"),
            EffectEvidence::NotExecuted,
        ),
    ]);
    RuleTable::new(rules)
}

/// Classify a failure message. No matching rule yields `Unknown`.
pub fn classify_execution(
    rules: &RuleTable<EffectEvidence>,
    method: &str,
    message: &str,
) -> ExecutedVerdict {
    rules
        .first_match(method, message)
        .map_or(ExecutedVerdict::Unknown, ExecutedVerdict::from)
}
