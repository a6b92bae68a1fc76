//! Per-invocation view handed to a rule.

/// What a rule sees during one `apply` call.
///
/// Holds the distinct present values across all candidates (in order of
/// first appearance), the value the consumer asked for, if any, and the
/// buffer of values the rule marks as closest matches.
///
/// A fresh context is created for every rule invocation and dropped
/// afterwards, so marks never leak from one rule to the next.
///
/// # Examples
///
/// ```
/// use u_disambig::disambiguation::SelectionContext;
///
/// let values = [1, 2, 3];
/// let mut ctx = SelectionContext::new(&values, None);
/// assert!(!ctx.has_marks());
///
/// ctx.mark_closest(2);
/// ctx.mark_closest(2);
/// assert_eq!(ctx.marked_values(), &[2]);
/// ```
#[derive(Debug)]
pub struct SelectionContext<'a, T> {
    candidate_values: &'a [T],
    requested_value: Option<&'a T>,
    marks: Vec<T>,
}

impl<'a, T: PartialEq> SelectionContext<'a, T> {
    /// Creates a context over `candidate_values`, which must already be
    /// distinct.
    pub fn new(candidate_values: &'a [T], requested_value: Option<&'a T>) -> Self {
        Self {
            candidate_values,
            requested_value,
            marks: Vec::new(),
        }
    }

    /// Distinct present values across all candidates.
    pub fn candidate_values(&self) -> &'a [T] {
        self.candidate_values
    }

    /// The value requested by the consumer, if any.
    pub fn requested_value(&self) -> Option<&'a T> {
        self.requested_value
    }

    /// Marks `value` as a closest match. Repeated marks of an equal value
    /// are recorded once.
    pub fn mark_closest(&mut self, value: T) {
        if !self.marks.contains(&value) {
            self.marks.push(value);
        }
    }

    /// Whether at least one value has been marked.
    pub fn has_marks(&self) -> bool {
        !self.marks.is_empty()
    }

    /// Values marked so far, in marking order.
    pub fn marked_values(&self) -> &[T] {
        &self.marks
    }

    pub(crate) fn into_marks(self) -> Vec<T> {
        self.marks
    }
}
