//! Core value types and the rule trait.

use super::context::SelectionContext;
use std::fmt;
use std::marker::PhantomData;

/// Error type returned by a failing rule.
///
/// Rules are arbitrary user code, so any error type is accepted.
pub type RuleError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// The value a candidate defines for the attribute under disambiguation.
///
/// Two values are equal iff both are `Absent`, or both are `Present` with
/// equal payloads. This is the same equality the engine uses to group
/// candidates into value buckets.
///
/// # Examples
///
/// ```
/// use u_disambig::disambiguation::AttributeValue;
///
/// let v = AttributeValue::of(3);
/// assert!(v.is_present());
/// assert_eq!(v.get(), Some(&3));
/// assert_eq!(AttributeValue::<i32>::from(None), AttributeValue::Absent);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AttributeValue<T> {
    /// The candidate defines this value.
    Present(T),
    /// The candidate does not define the attribute.
    Absent,
}

impl<T> AttributeValue<T> {
    /// Creates a present value.
    pub fn of(value: T) -> Self {
        AttributeValue::Present(value)
    }

    /// Creates an absent value.
    pub fn missing() -> Self {
        AttributeValue::Absent
    }

    /// Whether the candidate defines a value.
    pub fn is_present(&self) -> bool {
        matches!(self, AttributeValue::Present(_))
    }

    /// Returns the payload, if present.
    pub fn get(&self) -> Option<&T> {
        match self {
            AttributeValue::Present(v) => Some(v),
            AttributeValue::Absent => None,
        }
    }
}

impl<T> From<Option<T>> for AttributeValue<T> {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(v) => AttributeValue::Present(v),
            None => AttributeValue::Absent,
        }
    }
}

/// A named classification dimension with value type `T`.
///
/// The type parameter ties an attribute to the rule chains and candidates
/// that may be evaluated for it.
pub struct Attribute<T> {
    name: String,
    _value: PhantomData<fn() -> T>,
}

impl<T> Attribute<T> {
    /// Creates an attribute with the given name.
    pub fn of(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            _value: PhantomData,
        }
    }

    /// Returns the attribute name.
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl<T> Clone for Attribute<T> {
    fn clone(&self) -> Self {
        Self::of(self.name.clone())
    }
}

impl<T> PartialEq for Attribute<T> {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl<T> Eq for Attribute<T> {}

impl<T> fmt::Debug for Attribute<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Attribute")
            .field("name", &self.name)
            .field("type", &std::any::type_name::<T>())
            .finish()
    }
}

impl<T> fmt::Display for Attribute<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// One of several competing artifacts, paired with its value for the
/// attribute being disambiguated.
///
/// `C` is an opaque identifier owned by the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Candidate<C, T> {
    /// Caller-owned identifier.
    pub id: C,
    /// Value for the attribute under disambiguation.
    pub value: AttributeValue<T>,
}

impl<C, T> Candidate<C, T> {
    /// Creates a candidate defining `value`.
    pub fn new(id: C, value: T) -> Self {
        Self {
            id,
            value: AttributeValue::Present(value),
        }
    }

    /// Creates a candidate that does not define the attribute.
    pub fn without_value(id: C) -> Self {
        Self {
            id,
            value: AttributeValue::Absent,
        }
    }
}

/// A unit of selection logic in a [`RuleChain`](super::RuleChain).
///
/// A rule inspects the [`SelectionContext`] and marks zero or more values
/// as closest matches. Marking at least one value stops the chain.
///
/// Rules are shared across concurrent evaluations, so `apply` must only
/// touch the context it is given and state captured at construction time.
///
/// # Examples
///
/// ```
/// use u_disambig::disambiguation::{DisambiguationRule, RuleError, SelectionContext};
///
/// // Prefer any "release" flavor over everything else.
/// struct PreferRelease;
///
/// impl DisambiguationRule<String> for PreferRelease {
///     fn name(&self) -> &str { "PreferRelease" }
///     fn apply(&self, ctx: &mut SelectionContext<'_, String>) -> Result<(), RuleError> {
///         let release: Vec<String> = ctx
///             .candidate_values()
///             .iter()
///             .filter(|v| v.starts_with("release"))
///             .cloned()
///             .collect();
///         for v in release {
///             ctx.mark_closest(v);
///         }
///         Ok(())
///     }
/// }
/// ```
pub trait DisambiguationRule<T>: Send + Sync {
    /// Returns the name of this rule, used in diagnostics.
    fn name(&self) -> &str;

    /// Applies the rule to one selection context.
    ///
    /// Returning an error aborts evaluation for the current attribute.
    fn apply(&self, context: &mut SelectionContext<'_, T>) -> Result<(), RuleError>;
}
