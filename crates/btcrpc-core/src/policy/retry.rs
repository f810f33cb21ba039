//! Side-effect aware retry policy with a fixed inter-attempt delay.
//!
//! For a failure on attempt `n`:
//! ```text
//! executed    = classify_execution(method, message)
//! had_effects = !pure(method) && executed != NotExecuted
//! retry       = !had_effects && override(method, message) != NoRetry
//!
//! n == max_attempts  → stop (AttemptsExhausted)
//! retry              → sleep(delay), attempt n + 1
//! otherwise          → stop (Unretryable)
//! ```

use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::effect::{classify_execution, default_effect_rules, EffectEvidence, ExecutedVerdict};
use super::pattern::{MessagePattern, Rule, RuleTable};
use super::purity::PurityRegistry;
use crate::error::StopReason;

pub const DEFAULT_MAX_ATTEMPTS: u32 = 5;
pub const DEFAULT_DELAY_BETWEEN_ATTEMPTS: Duration = Duration::from_millis(5000);

/// Configuration for the retry loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryConfig {
    /// Total attempts per logical call, including the first. 0 is treated as 1.
    pub max_attempts: u32,
    /// Fixed delay before every retry.
    pub delay_between_attempts: Duration,
}

impl RetryConfig {
    pub fn attempts(&self) -> u32 {
        self.max_attempts.max(1)
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            delay_between_attempts: DEFAULT_DELAY_BETWEEN_ATTEMPTS,
        }
    }
}

/// Method-specific retry exception.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RetryOverride {
    Retry,
    NoRetry,
}

/// Failures that are permanent, so retrying only burns the attempt budget.
pub fn default_retry_overrides() -> RuleTable<RetryOverride> {
    let mut rules = vec![
        Rule::any_method(MessagePattern::exact("Insufficient funds"), RetryOverride::NoRetry),
        Rule::for_method(
            "gettransaction",
            MessagePattern::contains("Invalid or non-wallet transaction id"),
            RetryOverride::NoRetry,
        ),
        Rule::for_method(
            "getrawtransaction",
            MessagePattern::contains("No such mempool"),
            RetryOverride::NoRetry,
        ),
    ];
    for method in ["omni_funded_send", "omni_send"] {
        for text in [
            "Error creating transaction",
            "Error choosing inputs",
            "Error with selected inputs",
            "Error committing transaction",
        ] {
            rules.push(Rule::for_method(
                method,
                MessagePattern::contains(text),
                RetryOverride::NoRetry,
            ));
        }
    }
    RuleTable::new(rules)
}

/// The message-pattern tables, kept as data so they can be audited and
/// replaced to match the error strings of the node actually deployed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassificationPolicy {
    pub effect_rules: RuleTable<EffectEvidence>,
    pub retry_overrides: RuleTable<RetryOverride>,
}

impl ClassificationPolicy {
    /// Load a policy from JSON. Missing tables fall back to the built-ins;
    /// unknown keys are rejected.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        #[derive(Deserialize)]
        #[serde(deny_unknown_fields)]
        struct Partial {
            effect_rules: Option<RuleTable<EffectEvidence>>,
            retry_overrides: Option<RuleTable<RetryOverride>>,
        }
        let partial: Partial = serde_json::from_str(json)?;
        Ok(Self {
            effect_rules: partial.effect_rules.unwrap_or_else(default_effect_rules),
            retry_overrides: partial
                .retry_overrides
                .unwrap_or_else(default_retry_overrides),
        })
    }

    pub fn classify(&self, method: &str, message: &str) -> ExecutedVerdict {
        classify_execution(&self.effect_rules, method, message)
    }

    /// Decide whether a failed call may be retried.
    pub fn decide(&self, method: &str, method_is_pure: bool, message: &str) -> RetryDecision {
        let executed = self.classify(method, message);
        let had_effects = !method_is_pure && executed != ExecutedVerdict::NotExecuted;
        let should_retry = !had_effects
            && self.retry_overrides.first_match(method, message) != Some(RetryOverride::NoRetry);
        RetryDecision {
            executed,
            had_effects,
            should_retry,
        }
    }
}

impl Default for ClassificationPolicy {
    fn default() -> Self {
        Self {
            effect_rules: default_effect_rules(),
            retry_overrides: default_retry_overrides(),
        }
    }
}

/// Outcome of classifying one failed attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RetryDecision {
    pub executed: ExecutedVerdict,
    pub had_effects: bool,
    pub should_retry: bool,
}

/// What the call loop does after a failed attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NextStep {
    RetryAfter(Duration),
    Stop(StopReason),
}

/// Retry configuration, classification tables and purity registry.
/// Immutable once built; shared by every call of a client.
#[derive(Debug, Clone, Default)]
pub struct RetryPolicy {
    pub config: RetryConfig,
    pub classification: ClassificationPolicy,
    pub purity: PurityRegistry,
}

impl RetryPolicy {
    pub fn new(config: RetryConfig) -> Self {
        Self {
            config,
            ..Default::default()
        }
    }

    pub fn with_classification(mut self, classification: ClassificationPolicy) -> Self {
        self.classification = classification;
        self
    }

    pub fn with_purity(mut self, purity: PurityRegistry) -> Self {
        self.purity = purity;
        self
    }

    pub fn is_pure(&self, method: &str) -> bool {
        self.purity.is_pure(method)
    }

    pub fn max_attempts(&self) -> u32 {
        self.config.attempts()
    }

    pub fn decide(&self, method: &str, message: &str) -> RetryDecision {
        self.classification
            .decide(method, self.is_pure(method), message)
    }

    /// Transition out of a failed `attempt` (1-based).
    pub fn next_step(&self, attempt: u32, decision: &RetryDecision) -> NextStep {
        if attempt >= self.max_attempts() {
            NextStep::Stop(StopReason::AttemptsExhausted)
        } else if decision.should_retry {
            NextStep::RetryAfter(self.config.delay_between_attempts)
        } else {
            NextStep::Stop(StopReason::Unretryable)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy() -> RetryPolicy {
        RetryPolicy::default()
    }

    #[test]
    fn defaults() {
        let config = RetryConfig::default();
        assert_eq!(config.max_attempts, 5);
        assert_eq!(config.delay_between_attempts, Duration::from_millis(5000));
    }

    #[test]
    fn zero_attempts_means_one() {
        let config = RetryConfig {
            max_attempts: 0,
            ..Default::default()
        };
        assert_eq!(config.attempts(), 1);
    }

    #[test]
    fn insufficient_funds_is_not_retried() {
        let d = policy().decide("sendtoaddress", "Insufficient funds");
        assert_eq!(d.executed, ExecutedVerdict::NotExecuted);
        assert!(!d.had_effects);
        assert!(!d.should_retry);
    }

    #[test]
    fn connection_refused_is_retried_for_mutating_method() {
        let d = policy().decide("sendtoaddress", "connect ECONNREFUSED 127.0.0.1:8332");
        assert_eq!(d.executed, ExecutedVerdict::NotExecuted);
        assert!(!d.had_effects);
        assert!(d.should_retry);
    }

    #[test]
    fn unknown_failure_on_mutating_method_is_not_retried() {
        let d = policy().decide("sendtoaddress", "socket hang up");
        assert_eq!(d.executed, ExecutedVerdict::Unknown);
        assert!(d.had_effects);
        assert!(!d.should_retry);
    }

    #[test]
    fn unknown_failure_on_pure_method_is_retried() {
        let d = policy().decide("getrawmempool", "socket hang up");
        assert_eq!(d.executed, ExecutedVerdict::Unknown);
        assert!(!d.had_effects);
        assert!(d.should_retry);
    }

    #[test]
    fn method_specific_overrides() {
        let p = policy();
        assert!(!p
            .decide("gettransaction", "Invalid or non-wallet transaction id")
            .should_retry);
        assert!(!p
            .decide("getrawtransaction", "No such mempool transaction. Use -txindex")
            .should_retry);
        assert!(!p
            .decide("omni_funded_send", "Error choosing inputs for the send transaction")
            .should_retry);
        // The same text on another pure method is still retried.
        assert!(p.decide("getblock", "Invalid or non-wallet transaction id").should_retry);
    }

    #[test]
    fn next_step_state_machine() {
        let p = RetryPolicy::new(RetryConfig {
            max_attempts: 3,
            delay_between_attempts: Duration::from_millis(10),
        });
        let retry = RetryDecision {
            executed: ExecutedVerdict::NotExecuted,
            had_effects: false,
            should_retry: true,
        };
        let stop = RetryDecision {
            should_retry: false,
            ..retry
        };
        assert_eq!(p.next_step(1, &retry), NextStep::RetryAfter(Duration::from_millis(10)));
        assert_eq!(p.next_step(2, &retry), NextStep::RetryAfter(Duration::from_millis(10)));
        assert_eq!(p.next_step(3, &retry), NextStep::Stop(StopReason::AttemptsExhausted));
        assert_eq!(p.next_step(1, &stop), NextStep::Stop(StopReason::Unretryable));
        assert_eq!(p.next_step(3, &stop), NextStep::Stop(StopReason::AttemptsExhausted));
    }

    #[test]
    fn policy_from_json_keeps_missing_tables() {
        let json = r#"{
            "effect_rules": [
                {"pattern": {"match": "contains", "text": "warming up"}, "verdict": "not_executed"}
            ]
        }"#;
        let classification = ClassificationPolicy::from_json(json).unwrap();
        assert_eq!(classification.effect_rules.len(), 1);
        assert_eq!(
            classification.classify("sendtoaddress", "node warming up"),
            ExecutedVerdict::NotExecuted
        );
        assert_eq!(classification.retry_overrides, default_retry_overrides());
    }

    #[test]
    fn policy_from_json_rejects_misspelled_table() {
        let json = r#"{
            "effect_rule": [
                {"pattern": {"match": "contains", "text": "warming up"}, "verdict": "not_executed"}
            ]
        }"#;
        let err = ClassificationPolicy::from_json(json).unwrap_err();
        assert!(err.to_string().contains("effect_rule"), "got {err}");
    }
}
