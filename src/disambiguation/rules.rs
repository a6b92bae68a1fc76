//! Built-in rules.
//!
//! Built-ins implement [`DisambiguationRule`] like any user rule; the
//! chain does not treat them specially.

use super::context::SelectionContext;
use super::error::DisambiguationError;
use super::types::{DisambiguationRule, RuleError};
use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;
use std::sync::Arc;

/// Shared ordering function used by [`ComparatorRule`].
pub type Comparator<T> = Arc<dyn Fn(&T, &T) -> Ordering + Send + Sync>;

type Eligibility<T> = Arc<dyn Fn(&T) -> bool + Send + Sync>;

/// Which end of the ordering a [`ComparatorRule`] selects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Extremum {
    /// The value(s) sorting lowest.
    First,
    /// The value(s) sorting highest.
    Last,
}

/// Selects the candidate value(s) at one extreme of an ordering.
///
/// Every value comparing equal to the extremum is marked, so ties survive
/// together and the caller may still see more than one candidate.
///
/// With an inconsistent comparator the extremum is whatever a single
/// left-to-right scan over the candidate values (in first-appearance
/// order) produces, which is deterministic for a fixed input.
///
/// # Examples
///
/// ```
/// use u_disambig::disambiguation::{ComparatorRule, DisambiguationRule, SelectionContext};
///
/// let rule = ComparatorRule::pick_last(|a: &u32, b: &u32| a.cmp(b));
/// let values = [8, 17, 11];
/// let mut ctx = SelectionContext::new(&values, None);
/// rule.apply(&mut ctx).unwrap();
/// assert_eq!(ctx.marked_values(), &[17]);
/// ```
pub struct ComparatorRule<T> {
    name: String,
    extremum: Extremum,
    compare: Comparator<T>,
    eligible: Option<Eligibility<T>>,
}

impl<T> ComparatorRule<T> {
    /// Creates a rule selecting `extremum` under `compare`.
    pub fn new<F>(extremum: Extremum, compare: F) -> Self
    where
        F: Fn(&T, &T) -> Ordering + Send + Sync + 'static,
    {
        let name = match extremum {
            Extremum::First => "PickFirst",
            Extremum::Last => "PickLast",
        };
        Self {
            name: name.to_string(),
            extremum,
            compare: Arc::new(compare),
            eligible: None,
        }
    }

    /// Selects the lowest value(s).
    pub fn pick_first<F>(compare: F) -> Self
    where
        F: Fn(&T, &T) -> Ordering + Send + Sync + 'static,
    {
        Self::new(Extremum::First, compare)
    }

    /// Selects the highest value(s).
    pub fn pick_last<F>(compare: F) -> Self
    where
        F: Fn(&T, &T) -> Ordering + Send + Sync + 'static,
    {
        Self::new(Extremum::Last, compare)
    }

    /// Renames the rule for diagnostics.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Which end of the ordering this rule selects.
    pub fn extremum(&self) -> Extremum {
        self.extremum
    }

    /// Finds the extremum in a single scan. The first value seen wins
    /// among equals.
    fn extreme<'v>(&self, mut iter: impl Iterator<Item = &'v T>) -> Option<&'v T>
    where
        T: 'v,
    {
        let wanted = match self.extremum {
            Extremum::First => Ordering::Less,
            Extremum::Last => Ordering::Greater,
        };
        let mut best = iter.next()?;
        for v in iter {
            if (self.compare)(v, best) == wanted {
                best = v;
            }
        }
        Some(best)
    }
}

impl<T: Eq + Hash + Send + Sync + 'static> ComparatorRule<T> {
    /// Builds a rule from an explicit preference order.
    ///
    /// For [`Extremum::First`] the earliest listed value wins, for
    /// [`Extremum::Last`] the latest. Unlisted values never win; when no
    /// candidate value is listed the rule marks nothing and later rules
    /// decide.
    ///
    /// # Errors
    ///
    /// Returns [`DisambiguationError::Configuration`] if `order` is empty
    /// or lists a value twice.
    pub fn in_order(extremum: Extremum, order: Vec<T>) -> Result<Self, DisambiguationError> {
        if order.is_empty() {
            return Err(DisambiguationError::configuration(
                "preference order must list at least one value",
            ));
        }
        let len = order.len();
        let ranks: HashMap<T, usize> = order.into_iter().enumerate().map(|(i, v)| (v, i)).collect();
        if ranks.len() != len {
            return Err(DisambiguationError::configuration(
                "preference order lists a value more than once",
            ));
        }

        let ranks = Arc::new(ranks);
        let listed = Arc::clone(&ranks);
        let mut rule = Self::new(extremum, move |a: &T, b: &T| ranks.get(a).cmp(&ranks.get(b)));
        rule.eligible = Some(Arc::new(move |v: &T| listed.contains_key(v)));
        Ok(rule.with_name(match extremum {
            Extremum::First => "PickFirstInOrder",
            Extremum::Last => "PickLastInOrder",
        }))
    }
}

impl<T> Clone for ComparatorRule<T> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            extremum: self.extremum,
            compare: Arc::clone(&self.compare),
            eligible: self.eligible.clone(),
        }
    }
}

impl<T> fmt::Debug for ComparatorRule<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComparatorRule")
            .field("name", &self.name)
            .field("extremum", &self.extremum)
            .finish_non_exhaustive()
    }
}

impl<T: Clone + PartialEq + Send + Sync> DisambiguationRule<T> for ComparatorRule<T> {
    fn name(&self) -> &str {
        &self.name
    }

    fn apply(&self, context: &mut SelectionContext<'_, T>) -> Result<(), RuleError> {
        let values = context.candidate_values();
        let eligible = |v: &&T| match &self.eligible {
            Some(listed) => listed(*v),
            None => true,
        };
        let Some(best) = self.extreme(values.iter().filter(eligible)) else {
            return Ok(());
        };
        for v in values.iter().filter(eligible) {
            if (self.compare)(v, best) == Ordering::Equal {
                context.mark_closest(v.clone());
            }
        }
        Ok(())
    }
}

/// Marks the consumer-requested value when a candidate carries it.
///
/// Expresses no preference when nothing was requested or no candidate
/// matches, letting later rules decide.
#[derive(Debug, Clone, Copy, Default)]
pub struct PreferRequested;

impl<T: Clone + PartialEq + Send + Sync> DisambiguationRule<T> for PreferRequested {
    fn name(&self) -> &str {
        "PreferRequested"
    }

    fn apply(&self, context: &mut SelectionContext<'_, T>) -> Result<(), RuleError> {
        if let Some(requested) = context.requested_value() {
            if context.candidate_values().contains(requested) {
                context.mark_closest(requested.clone());
            }
        }
        Ok(())
    }
}

type RuleFn<T> = dyn Fn(&mut SelectionContext<'_, T>) -> Result<(), RuleError> + Send + Sync;

/// A rule backed by a closure.
///
/// Built with [`rule_fn`].
pub struct FnRule<T> {
    name: String,
    f: Box<RuleFn<T>>,
}

impl<T> fmt::Debug for FnRule<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnRule")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

impl<T> DisambiguationRule<T> for FnRule<T> {
    fn name(&self) -> &str {
        &self.name
    }

    fn apply(&self, context: &mut SelectionContext<'_, T>) -> Result<(), RuleError> {
        (self.f)(context)
    }
}

/// Wraps a closure as a named rule.
///
/// # Examples
///
/// ```
/// use u_disambig::disambiguation::{rule_fn, RuleChain, SelectionContext};
///
/// let mut chain = RuleChain::<&str>::new();
/// chain.add(rule_fn("PreferJar", |ctx: &mut SelectionContext<'_, &str>| {
///     if ctx.candidate_values().contains(&"jar") {
///         ctx.mark_closest("jar");
///     }
///     Ok(())
/// }));
/// assert_eq!(chain.rule_names(), vec!["PreferJar"]);
/// ```
pub fn rule_fn<T, F>(name: impl Into<String>, f: F) -> FnRule<T>
where
    F: Fn(&mut SelectionContext<'_, T>) -> Result<(), RuleError> + Send + Sync + 'static,
{
    FnRule {
        name: name.into(),
        f: Box::new(f),
    }
}
