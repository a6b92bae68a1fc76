//! Rule chain execution.
//!
//! [`Disambiguator`] evaluates a frozen [`RuleChain`] against one candidate
//! set at a time: collect distinct present values → run rules in order →
//! stop at the first rule that marks a value → otherwise apply the
//! fallback policy.

use super::chain::{FallbackPolicy, RuleChain};
use super::context::SelectionContext;
use super::error::DisambiguationError;
use super::types::{Attribute, Candidate};
use std::collections::HashSet;
use std::fmt::Debug;
use std::hash::Hash;
use tracing::{debug, trace, warn};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// How an evaluation ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Outcome {
    /// A rule marked at least one value.
    Decided,
    /// No rule expressed a preference; every present candidate survives.
    FellBackToAll,
    /// No rule expressed a preference and the chain selects none.
    Unresolved,
}

/// Result of evaluating a chain against one candidate set.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DisambiguationResult {
    /// Indices of the surviving candidates, ascending.
    pub survivors: Vec<usize>,

    /// How the evaluation ended.
    pub outcome: Outcome,

    /// Position of the rule that decided, if any.
    pub decided_by: Option<usize>,

    /// Number of rules whose `apply` ran.
    pub rules_evaluated: usize,
}

impl DisambiguationResult {
    /// Whether the evaluation narrowed the candidates to exactly one.
    pub fn is_unique(&self) -> bool {
        self.survivors.len() == 1
    }
}

/// One candidate set to disambiguate, used by
/// [`Disambiguator::select_batch`].
#[derive(Debug)]
pub struct DisambiguationRequest<'a, C, T> {
    pub attribute: &'a Attribute<T>,
    pub candidates: &'a [Candidate<C, T>],
    pub requested: Option<&'a T>,
}

impl<C, T> Clone for DisambiguationRequest<'_, C, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<C, T> Copy for DisambiguationRequest<'_, C, T> {}

/// Evaluates a rule chain against candidate sets.
///
/// Owns its chain, so the rule list cannot change once evaluation is
/// possible. Evaluation only needs `&self`: share one instance behind an
/// `Arc` to run many evaluations from several threads.
///
/// # Usage
///
/// ```
/// use u_disambig::disambiguation::{Attribute, Candidate, Disambiguator, RuleChain};
///
/// let mut chain = RuleChain::<u32>::new();
/// chain.pick_last(|a, b| a.cmp(b));
/// let engine = Disambiguator::new(chain);
///
/// let jvm = Attribute::of("org.jvm.version");
/// let candidates = vec![
///     Candidate::new("lib-8", 8),
///     Candidate::new("lib-17", 17),
///     Candidate::new("lib-11", 11),
/// ];
/// let survivors = engine.select(&jvm, &candidates, None).unwrap();
/// assert_eq!(survivors.len(), 1);
/// assert_eq!(survivors[0].id, "lib-17");
/// ```
#[derive(Debug, Clone)]
pub struct Disambiguator<T> {
    chain: RuleChain<T>,
}

impl<T> Disambiguator<T> {
    /// Freezes `chain` for evaluation.
    pub fn new(chain: RuleChain<T>) -> Self {
        Self { chain }
    }

    /// Returns the frozen chain this engine evaluates.
    pub fn chain(&self) -> &RuleChain<T> {
        &self.chain
    }
}

impl<T: Clone + Eq + Hash + Debug> Disambiguator<T> {
    /// Runs the chain and returns indices of the surviving candidates.
    ///
    /// Candidates whose value is absent are never selected, whatever the
    /// rules or fallback policy.
    ///
    /// # Errors
    ///
    /// Returns [`DisambiguationError::RuleExecution`] if a rule fails. The
    /// error names the attribute, the failing rule and the candidate values
    /// it was shown.
    pub fn select_indices<C>(
        &self,
        attribute: &Attribute<T>,
        candidates: &[Candidate<C, T>],
        requested: Option<&T>,
    ) -> Result<DisambiguationResult, DisambiguationError> {
        let present: Vec<(usize, &T)> = candidates
            .iter()
            .enumerate()
            .filter_map(|(i, c)| c.value.get().map(|v| (i, v)))
            .collect();
        let distinct = distinct_values(&present);

        for (index, rule) in self.chain.rules().iter().enumerate() {
            trace!(attribute = %attribute, rule = rule.name(), index, "applying rule");

            let mut ctx = SelectionContext::new(&distinct, requested);
            rule.apply(&mut ctx)
                .map_err(|source| DisambiguationError::RuleExecution {
                    attribute: attribute.name().to_string(),
                    rule_index: index,
                    rule_name: rule.name().to_string(),
                    candidate_values: distinct.iter().map(|v| format!("{v:?}")).collect(),
                    source,
                })?;

            if !ctx.has_marks() {
                continue;
            }

            let winners = ctx.into_marks();
            let winner_set: HashSet<&T> = winners.iter().collect();
            let survivors: Vec<usize> = present
                .iter()
                .filter(|(_, v)| winner_set.contains(v))
                .map(|(i, _)| *i)
                .collect();

            if survivors.is_empty() {
                warn!(
                    attribute = %attribute,
                    rule = rule.name(),
                    marked = ?winners,
                    "rule marked values no candidate carries"
                );
            }
            debug!(
                attribute = %attribute,
                rule = rule.name(),
                index,
                survivors = survivors.len(),
                "rule expressed a preference"
            );
            return Ok(DisambiguationResult {
                survivors,
                outcome: Outcome::Decided,
                decided_by: Some(index),
                rules_evaluated: index + 1,
            });
        }

        let (survivors, outcome): (Vec<usize>, Outcome) = match self.chain.fallback() {
            FallbackPolicy::SelectAll => (
                present.iter().map(|(i, _)| *i).collect(),
                Outcome::FellBackToAll,
            ),
            FallbackPolicy::SelectNone => (Vec::new(), Outcome::Unresolved),
        };
        debug!(
            attribute = %attribute,
            fallback = ?self.chain.fallback(),
            survivors = survivors.len(),
            "no rule expressed a preference"
        );
        Ok(DisambiguationResult {
            survivors,
            outcome,
            decided_by: None,
            rules_evaluated: self.chain.len(),
        })
    }

    /// Runs the chain and returns references to the surviving candidates,
    /// in input order.
    ///
    /// # Errors
    ///
    /// See [`select_indices`](Self::select_indices).
    pub fn select<'c, C>(
        &self,
        attribute: &Attribute<T>,
        candidates: &'c [Candidate<C, T>],
        requested: Option<&T>,
    ) -> Result<Vec<&'c Candidate<C, T>>, DisambiguationError> {
        let result = self.select_indices(attribute, candidates, requested)?;
        Ok(result.survivors.into_iter().map(|i| &candidates[i]).collect())
    }
}

impl<T: Clone + Eq + Hash + Debug + Send + Sync> Disambiguator<T> {
    /// Evaluates independent candidate sets against the same chain.
    ///
    /// Each request gets its own result; a failing rule only affects the
    /// request it failed on. With the `parallel` feature the requests are
    /// spread over the rayon thread pool.
    pub fn select_batch<C: Sync>(
        &self,
        requests: &[DisambiguationRequest<'_, C, T>],
    ) -> Vec<Result<DisambiguationResult, DisambiguationError>> {
        #[cfg(feature = "parallel")]
        {
            requests
                .par_iter()
                .map(|r| self.select_indices(r.attribute, r.candidates, r.requested))
                .collect()
        }
        #[cfg(not(feature = "parallel"))]
        {
            requests
                .iter()
                .map(|r| self.select_indices(r.attribute, r.candidates, r.requested))
                .collect()
        }
    }
}

/// Distinct values in order of first appearance.
fn distinct_values<T: Clone + Eq + Hash>(present: &[(usize, &T)]) -> Vec<T> {
    let mut seen: HashSet<&T> = HashSet::with_capacity(present.len());
    present
        .iter()
        .filter(|(_, v)| seen.insert(*v))
        .map(|(_, v)| (*v).clone())
        .collect()
}
