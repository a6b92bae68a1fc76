//! Domain-agnostic attribute disambiguation.
//!
//! When several candidates (artifact variants, build outputs, anything a
//! resolver has to choose between) are equally eligible, this crate
//! narrows them using an ordered chain of rules over one attribute at a
//! time:
//!
//! - **Rules**: Pluggable [`DisambiguationRule`](disambiguation::DisambiguationRule)
//!   implementations that mark preferred values.
//! - **Built-ins**: Comparator-based pick-first / pick-last rules, explicit
//!   preference orders and a requested-value rule.
//! - **Execution**: Short-circuiting evaluation with a configurable
//!   fallback, safe to share across threads.
//!
//! # Architecture
//!
//! This crate is a leaf algorithm: it knows nothing about dependency
//! graphs or how a resolver reacts to zero, one or many survivors. Those
//! policies belong to the consumer.

pub mod disambiguation;
