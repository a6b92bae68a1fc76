//! Error types for disambiguation.

use super::types::RuleError;
use thiserror::Error;

/// Errors raised while configuring or evaluating a rule chain.
#[derive(Debug, Error)]
pub enum DisambiguationError {
    /// A chain or rule was configured with invalid parameters.
    #[error("invalid rule configuration: {reason}")]
    Configuration { reason: String },

    /// A rule failed during `apply`. Evaluation for the attribute was
    /// abandoned; no marks from the failing rule are used.
    #[error(
        "rule #{rule_index} ({rule_name}) failed while disambiguating attribute \
         '{attribute}' between values [{}]: {source}",
        candidate_values.join(", ")
    )]
    RuleExecution {
        /// Attribute being disambiguated.
        attribute: String,
        /// Position of the failing rule in the chain.
        rule_index: usize,
        /// Name reported by the failing rule.
        rule_name: String,
        /// Distinct candidate values presented to the rule, `Debug`-rendered.
        candidate_values: Vec<String>,
        #[source]
        source: RuleError,
    },
}

impl DisambiguationError {
    pub(crate) fn configuration(reason: impl Into<String>) -> Self {
        DisambiguationError::Configuration {
            reason: reason.into(),
        }
    }
}
