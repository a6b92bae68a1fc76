//! Attribute disambiguation by ordered rule chains.
//!
//! Given the values several competing candidates define for one
//! attribute, a [`RuleChain`] narrows them to the subset that matches
//! best, or reports that no narrowing is possible.
//!
//! - **Ordered evaluation**: Rules run in append order; the first rule
//!   that marks a value decides and later rules never run.
//! - **Value equivalence**: Rules mark values, not candidates, so every
//!   candidate carrying a marked value survives.
//! - **Fallback**: When no rule expresses a preference the chain either
//!   keeps every candidate ([`FallbackPolicy::SelectAll`]) or none
//!   ([`FallbackPolicy::SelectNone`]).
//!
//! # Core Types
//!
//! - [`DisambiguationRule`]: Pluggable selection logic
//! - [`RuleChain`]: Ordered rules plus fallback policy (configuration)
//! - [`Disambiguator`]: Evaluates a frozen chain against candidate sets
//! - [`ComparatorRule`]: Built-in "pick the extreme value" rule
//!
//! # Design
//!
//! The engine holds no state between evaluations and performs no I/O.
//! Deciding what an empty or multi-candidate result means is left to the
//! caller.

mod chain;
mod context;
mod error;
mod rules;
mod runner;
mod types;

pub use chain::{FallbackPolicy, RuleChain, SharedRule};
pub use context::SelectionContext;
pub use error::DisambiguationError;
pub use rules::{rule_fn, Comparator, ComparatorRule, Extremum, FnRule, PreferRequested};
pub use runner::{DisambiguationRequest, DisambiguationResult, Disambiguator, Outcome};
pub use types::{Attribute, AttributeValue, Candidate, DisambiguationRule, RuleError};
