//! Policy engine: decides, per failed attempt, whether a call may have had
//! side effects and whether it is safe to try again.
//!
//! ```text
//! RpcFailure → [effect rules] → ExecutedVerdict ─┐
//!              [purity registry] ────────────────┼→ RetryDecision → NextStep
//!              [retry overrides] ────────────────┘
//! ```

pub mod effect;
pub mod pattern;
pub mod purity;
pub mod retry;

pub use effect::{classify_execution, default_effect_rules, EffectEvidence, ExecutedVerdict};
pub use pattern::{MessagePattern, Rule, RuleTable};
pub use purity::{PurityRegistry, PURE_METHODS};
pub use retry::{
    default_retry_overrides, ClassificationPolicy, NextStep, RetryConfig, RetryDecision,
    RetryOverride, RetryPolicy,
};
