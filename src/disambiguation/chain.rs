//! Rule chain configuration.

use super::error::DisambiguationError;
use super::rules::{ComparatorRule, Extremum};
use super::types::DisambiguationRule;
use std::cmp::Ordering;
use std::fmt;
use std::hash::Hash;
use std::sync::Arc;

/// A rule shared between a chain and any handles returned to the caller.
pub type SharedRule<T> = Arc<dyn DisambiguationRule<T>>;

/// What happens when no rule in the chain expresses a preference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FallbackPolicy {
    /// Give up narrowing: every candidate with a present value survives.
    #[default]
    SelectAll,
    /// Declare the ambiguity unresolved: nothing survives.
    SelectNone,
}

/// An ordered list of disambiguation rules plus a fallback policy.
///
/// Rules run in append order and evaluation stops at the first rule that
/// marks a value. A new chain is empty with [`FallbackPolicy::SelectAll`],
/// so by default it performs no disambiguation at all.
///
/// The chain is plain configuration state. Hand it to a
/// [`Disambiguator`](super::Disambiguator) to evaluate it; from then on it
/// can no longer be mutated.
///
/// # Examples
///
/// ```
/// use u_disambig::disambiguation::{FallbackPolicy, PreferRequested, RuleChain};
///
/// let mut chain = RuleChain::<u32>::new();
/// chain.add(PreferRequested);
/// chain.pick_last(|a, b| a.cmp(b));
/// chain.eventually_select_none();
///
/// assert_eq!(chain.rule_names(), vec!["PreferRequested", "PickLast"]);
/// assert_eq!(chain.fallback(), FallbackPolicy::SelectNone);
/// ```
pub struct RuleChain<T> {
    rules: Vec<SharedRule<T>>,
    fallback: FallbackPolicy,
}

impl<T> RuleChain<T> {
    /// Creates an empty chain that selects all candidates when exhausted.
    pub fn new() -> Self {
        Self {
            rules: Vec::new(),
            fallback: FallbackPolicy::default(),
        }
    }

    /// Appends a rule. The same rule may be added more than once.
    pub fn add<R: DisambiguationRule<T> + 'static>(&mut self, rule: R) -> &mut Self {
        self.rules.push(Arc::new(rule));
        self
    }

    /// Appends an already shared rule.
    pub fn add_shared(&mut self, rule: SharedRule<T>) -> &mut Self {
        self.rules.push(rule);
        self
    }

    /// Replaces every rule with `rules`, discarding the previous order.
    pub fn set_rules<I>(&mut self, rules: I) -> &mut Self
    where
        I: IntoIterator<Item = SharedRule<T>>,
    {
        self.rules = rules.into_iter().collect();
        self
    }

    /// Selects all remaining candidates if no rule expresses a preference.
    pub fn eventually_select_all(&mut self) -> &mut Self {
        self.fallback = FallbackPolicy::SelectAll;
        self
    }

    /// Selects no candidate if no rule expresses a preference.
    pub fn eventually_select_none(&mut self) -> &mut Self {
        self.fallback = FallbackPolicy::SelectNone;
        self
    }

    /// Builder form of [`add`](Self::add).
    pub fn with_rule<R: DisambiguationRule<T> + 'static>(mut self, rule: R) -> Self {
        self.add(rule);
        self
    }

    /// Sets the fallback policy.
    pub fn with_fallback(mut self, fallback: FallbackPolicy) -> Self {
        self.fallback = fallback;
        self
    }

    /// Returns the policy applied when no rule expresses a preference.
    pub fn fallback(&self) -> FallbackPolicy {
        self.fallback
    }

    /// Rules in evaluation order.
    pub fn rules(&self) -> &[SharedRule<T>] {
        &self.rules
    }

    /// Returns the number of rules in this chain.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Whether the chain has no rules.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Returns the names of all rules in order.
    pub fn rule_names(&self) -> Vec<&str> {
        self.rules.iter().map(|r| r.name()).collect()
    }
}

impl<T: Clone + PartialEq + Send + Sync + 'static> RuleChain<T> {
    /// Appends a rule selecting the lowest value(s) under `compare`.
    ///
    /// Returns a handle to the appended rule.
    pub fn pick_first<F>(&mut self, compare: F) -> Arc<ComparatorRule<T>>
    where
        F: Fn(&T, &T) -> Ordering + Send + Sync + 'static,
    {
        self.push_comparator(ComparatorRule::pick_first(compare))
    }

    /// Appends a rule selecting the highest value(s) under `compare`.
    ///
    /// Returns a handle to the appended rule.
    pub fn pick_last<F>(&mut self, compare: F) -> Arc<ComparatorRule<T>>
    where
        F: Fn(&T, &T) -> Ordering + Send + Sync + 'static,
    {
        self.push_comparator(ComparatorRule::pick_last(compare))
    }

    fn push_comparator(&mut self, rule: ComparatorRule<T>) -> Arc<ComparatorRule<T>> {
        let rule = Arc::new(rule);
        self.rules.push(rule.clone());
        rule
    }
}

impl<T: Clone + Eq + Hash + Send + Sync + 'static> RuleChain<T> {
    /// Appends a rule preferring the earliest listed value.
    ///
    /// # Errors
    ///
    /// Fails without touching the chain if `order` is empty or has
    /// duplicates.
    pub fn pick_first_in_order(
        &mut self,
        order: Vec<T>,
    ) -> Result<Arc<ComparatorRule<T>>, DisambiguationError> {
        let rule = ComparatorRule::in_order(Extremum::First, order)?;
        Ok(self.push_comparator(rule))
    }

    /// Appends a rule preferring the latest listed value.
    ///
    /// # Errors
    ///
    /// Fails without touching the chain if `order` is empty or has
    /// duplicates.
    pub fn pick_last_in_order(
        &mut self,
        order: Vec<T>,
    ) -> Result<Arc<ComparatorRule<T>>, DisambiguationError> {
        let rule = ComparatorRule::in_order(Extremum::Last, order)?;
        Ok(self.push_comparator(rule))
    }
}

impl<T> Default for RuleChain<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for RuleChain<T> {
    fn clone(&self) -> Self {
        Self {
            rules: self.rules.clone(),
            fallback: self.fallback,
        }
    }
}

impl<T> fmt::Debug for RuleChain<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RuleChain")
            .field("rules", &self.rule_names())
            .field("fallback", &self.fallback)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::disambiguation::rules::PreferRequested;

    #[test]
    fn test_new_chain_is_empty_select_all() {
        let chain = RuleChain::<i32>::new();
        assert!(chain.is_empty());
        assert_eq!(chain.fallback(), FallbackPolicy::SelectAll);
    }

    #[test]
    fn test_add_preserves_order_and_duplicates() {
        let mut chain = RuleChain::<i32>::new();
        chain.add(PreferRequested);
        chain.pick_first(|a, b| a.cmp(b));
        chain.add(PreferRequested);
        assert_eq!(
            chain.rule_names(),
            vec!["PreferRequested", "PickFirst", "PreferRequested"]
        );
    }

    #[test]
    fn test_pick_handles_share_the_appended_rule() {
        let mut chain = RuleChain::<i32>::new();
        let handle = chain.pick_last(|a, b| a.cmp(b));
        assert_eq!(handle.extremum(), Extremum::Last);
        assert_eq!(Arc::strong_count(&handle), 2);
    }

    #[test]
    fn test_set_rules_replaces() {
        let mut chain = RuleChain::<i32>::new();
        chain.add(PreferRequested);
        let last: SharedRule<i32> = Arc::new(ComparatorRule::pick_last(|a: &i32, b: &i32| a.cmp(b)));
        chain.set_rules(vec![last]);
        assert_eq!(chain.rule_names(), vec!["PickLast"]);
    }

    #[test]
    fn test_add_shared_runs_each_copy_in_order() {
        use crate::disambiguation::context::SelectionContext;
        use crate::disambiguation::rules::rule_fn;
        use std::sync::atomic::{AtomicUsize, Ordering as AtomicOrdering};

        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let counting: SharedRule<i32> = Arc::new(rule_fn(
            "Counting",
            move |_ctx: &mut SelectionContext<'_, i32>| {
                counter.fetch_add(1, AtomicOrdering::SeqCst);
                Ok(())
            },
        ));

        let mut chain = RuleChain::<i32>::new();
        chain.add_shared(counting.clone()).add_shared(counting.clone());
        chain.pick_first(|a, b| a.cmp(b));
        assert_eq!(chain.rule_names(), vec!["Counting", "Counting", "PickFirst"]);
        assert!(Arc::ptr_eq(&chain.rules()[0], &chain.rules()[1]));

        let values = [4, 2];
        for rule in chain.rules().iter().take(2) {
            let mut ctx = SelectionContext::new(&values, None);
            rule.apply(&mut ctx).unwrap();
            assert!(!ctx.has_marks());
        }
        assert_eq!(calls.load(AtomicOrdering::SeqCst), 2);
    }

    #[test]
    fn test_fallback_last_write_wins() {
        let mut chain = RuleChain::<i32>::new();
        chain.eventually_select_none().eventually_select_all();
        assert_eq!(chain.fallback(), FallbackPolicy::SelectAll);
        chain.eventually_select_none();
        assert_eq!(chain.fallback(), FallbackPolicy::SelectNone);
    }

    #[test]
    fn test_builder_form() {
        let chain = RuleChain::<i32>::new()
            .with_rule(PreferRequested)
            .with_fallback(FallbackPolicy::SelectNone);
        assert_eq!(chain.len(), 1);
        assert_eq!(chain.fallback(), FallbackPolicy::SelectNone);
    }

    #[test]
    fn test_invalid_order_leaves_chain_untouched() {
        let mut chain = RuleChain::<&str>::new();
        assert!(chain.pick_first_in_order(vec![]).is_err());
        assert!(chain.pick_last_in_order(vec!["a", "a"]).is_err());
        assert!(chain.is_empty());

        chain.pick_first_in_order(vec!["a", "b"]).unwrap();
        assert_eq!(chain.rule_names(), vec!["PickFirstInOrder"]);
    }

    #[test]
    fn test_debug_lists_rule_names() {
        let chain = RuleChain::<i32>::new().with_rule(PreferRequested);
        let dbg = format!("{chain:?}");
        assert!(dbg.contains("PreferRequested"));
        assert!(dbg.contains("SelectAll"));
    }
}
