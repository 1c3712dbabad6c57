//! Group verifiers for pattern fields.
//!
//! Every group of a field pattern is governed by a [`GroupVerifier`]. A
//! verifier always answers whether a candidate group text is acceptable; it
//! may additionally support any of the optional [`Capability`]s, which the
//! edit engine queries through [`GroupVerifier::supports`] instead of
//! inspecting concrete types.
//!
//! The whole field value is passed explicitly to the calls that depend on it,
//! so verifiers are immutable after construction and can be shared.
//!
//! # Built-in Verifiers
//!
//! - [`BoundedIntegerVerifier`]: decimal integers within a range
//! - [`HexRangeVerifier`]: hexadecimal integers within a range
//! - [`EnumeratedStringVerifier`]: one of a fixed, ordered list of strings
//! - [`TemporalFieldVerifier`]: one calendar field of a date or time
//! - [`RegexVerifier`]: free text matching a regular expression
//! - [`Projected`]: adds field projection to any other verifier
//!
//! # Example
//!
//! ```
//! use horizon_fields::verifier::{Adjustment, BoundedIntegerVerifier, GroupValue, GroupVerifier};
//!
//! let octet = BoundedIntegerVerifier::new(0, 255);
//! assert!(GroupVerifier::<()>::accepts(&octet, "255", None));
//! assert!(!GroupVerifier::<()>::accepts(&octet, "256", None));
//!
//! let next = GroupVerifier::<()>::adjust(&octet, &GroupValue::Integer(255), Adjustment::Next, true, None);
//! assert_eq!(next, Ok(GroupValue::Integer(0)));
//! ```

mod enums;
mod integer;
mod projected;
mod temporal;
mod text;

pub use enums::EnumeratedStringVerifier;
pub use integer::{BoundedIntegerVerifier, HexRangeVerifier};
pub use projected::Projected;
pub use temporal::{TemporalField, TemporalFieldVerifier, TemporalValue};
pub use text::RegexVerifier;

use std::fmt;
use std::sync::Arc;

use crate::error::VerifyError;
use crate::grammar::LengthHint;

/// Number of units a page adjustment moves.
pub const PAGE_STEP: i64 = 10;

/// The sub-value held by one group.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum GroupValue {
    /// A numeric sub-value (integer fields, calendar fields, list indices).
    Integer(i64),
    /// A textual sub-value (enumerations, free text).
    Text(String),
}

impl GroupValue {
    /// The integer payload, if this is an integer value.
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            GroupValue::Integer(v) => Some(*v),
            GroupValue::Text(_) => None,
        }
    }

    /// The text payload, if this is a text value.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            GroupValue::Text(s) => Some(s),
            GroupValue::Integer(_) => None,
        }
    }
}

impl fmt::Display for GroupValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GroupValue::Integer(v) => write!(f, "{}", v),
            GroupValue::Text(s) => f.write_str(s),
        }
    }
}

/// Optional verifier capabilities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    /// [`GroupVerifier::range`] reports bounds.
    Range,
    /// [`GroupVerifier::length`] reports a length hint.
    Length,
    /// [`GroupVerifier::format`] renders sub-values.
    Format,
    /// [`GroupVerifier::parse`] reads sub-values.
    Parse,
    /// [`GroupVerifier::adjust`] steps sub-values.
    Adjust,
    /// [`GroupVerifier::project`] and [`GroupVerifier::inject`] map between
    /// the whole field value and this group's sub-value.
    FieldValue,
}

/// Step operations for spinner-like value changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Adjustment {
    /// One unit up.
    Next,
    /// One unit down.
    Previous,
    /// [`PAGE_STEP`] units up.
    PageNext,
    /// [`PAGE_STEP`] units down.
    PagePrevious,
    /// Jump to the minimum.
    Home,
    /// Jump to the maximum.
    End,
}

/// Per-group validation, formatting, parsing and adjustment.
///
/// `V` is the type of the whole field value. Verifiers that never look at the
/// field value implement this trait for every `V`.
///
/// Only [`accepts`](Self::accepts) is required. The optional operations
/// default to "unsupported"; a verifier that overrides one should also report
/// it from [`supports`](Self::supports).
pub trait GroupVerifier<V>: Send + Sync {
    /// Whether `candidate` is acceptable text for this group.
    ///
    /// `field` is the current whole field value, when there is one. Empty
    /// candidates are never acceptable.
    fn accepts(&self, candidate: &str, field: Option<&V>) -> bool;

    /// Whether this verifier implements `capability`.
    fn supports(&self, _capability: Capability) -> bool {
        false
    }

    /// Inclusive bounds of the sub-value, possibly depending on `field`.
    fn range(&self, _field: Option<&V>) -> Option<(i64, i64)> {
        None
    }

    /// Declared character length of complete group text.
    fn length(&self) -> Option<LengthHint> {
        None
    }

    /// Render a sub-value as group text.
    fn format(&self, _value: &GroupValue) -> Result<String, VerifyError> {
        Err(VerifyError::unsupported("format"))
    }

    /// Read group text into a sub-value.
    fn parse(&self, _text: &str) -> Result<GroupValue, VerifyError> {
        Err(VerifyError::unsupported("parse"))
    }

    /// Step `current` by `adjustment`.
    ///
    /// When the step leaves the range, `restart` wraps to the other end and
    /// its absence clamps.
    fn adjust(
        &self,
        _current: &GroupValue,
        _adjustment: Adjustment,
        _restart: bool,
        _field: Option<&V>,
    ) -> Result<GroupValue, VerifyError> {
        Err(VerifyError::unsupported("adjust"))
    }

    /// Extract this group's sub-value from the whole field value.
    fn project(&self, _field: &V) -> Option<GroupValue> {
        None
    }

    /// Build a new whole value from `field` with this group set to `value`.
    fn inject(&self, _field: &V, _value: &GroupValue) -> Option<V> {
        None
    }
}

// Allow using Arc<dyn GroupVerifier> as a GroupVerifier
impl<V, T: GroupVerifier<V> + ?Sized> GroupVerifier<V> for Arc<T> {
    fn accepts(&self, candidate: &str, field: Option<&V>) -> bool {
        (**self).accepts(candidate, field)
    }
    fn supports(&self, capability: Capability) -> bool {
        (**self).supports(capability)
    }
    fn range(&self, field: Option<&V>) -> Option<(i64, i64)> {
        (**self).range(field)
    }
    fn length(&self) -> Option<LengthHint> {
        (**self).length()
    }
    fn format(&self, value: &GroupValue) -> Result<String, VerifyError> {
        (**self).format(value)
    }
    fn parse(&self, text: &str) -> Result<GroupValue, VerifyError> {
        (**self).parse(text)
    }
    fn adjust(
        &self,
        current: &GroupValue,
        adjustment: Adjustment,
        restart: bool,
        field: Option<&V>,
    ) -> Result<GroupValue, VerifyError> {
        (**self).adjust(current, adjustment, restart, field)
    }
    fn project(&self, field: &V) -> Option<GroupValue> {
        (**self).project(field)
    }
    fn inject(&self, field: &V, value: &GroupValue) -> Option<V> {
        (**self).inject(field, value)
    }
}

// Allow using Box<dyn GroupVerifier> as a GroupVerifier
impl<V, T: GroupVerifier<V> + ?Sized> GroupVerifier<V> for Box<T> {
    fn accepts(&self, candidate: &str, field: Option<&V>) -> bool {
        (**self).accepts(candidate, field)
    }
    fn supports(&self, capability: Capability) -> bool {
        (**self).supports(capability)
    }
    fn range(&self, field: Option<&V>) -> Option<(i64, i64)> {
        (**self).range(field)
    }
    fn length(&self) -> Option<LengthHint> {
        (**self).length()
    }
    fn format(&self, value: &GroupValue) -> Result<String, VerifyError> {
        (**self).format(value)
    }
    fn parse(&self, text: &str) -> Result<GroupValue, VerifyError> {
        (**self).parse(text)
    }
    fn adjust(
        &self,
        current: &GroupValue,
        adjustment: Adjustment,
        restart: bool,
        field: Option<&V>,
    ) -> Result<GroupValue, VerifyError> {
        (**self).adjust(current, adjustment, restart, field)
    }
    fn project(&self, field: &V) -> Option<GroupValue> {
        (**self).project(field)
    }
    fn inject(&self, field: &V, value: &GroupValue) -> Option<V> {
        (**self).inject(field, value)
    }
}

/// Step an integer inside `[min, max]`, wrapping when `restart` is set and
/// clamping otherwise.
pub fn step_in_range(current: i64, adjustment: Adjustment, restart: bool, min: i64, max: i64) -> i64 {
    let (min, max) = (min.min(max), min.max(max));
    let delta = match adjustment {
        Adjustment::Home => return min,
        Adjustment::End => return max,
        Adjustment::Next => 1,
        Adjustment::Previous => -1,
        Adjustment::PageNext => PAGE_STEP,
        Adjustment::PagePrevious => -PAGE_STEP,
    };
    let target = current.clamp(min, max).saturating_add(delta);
    if target > max {
        if restart { min } else { max }
    } else if target < min {
        if restart { max } else { min }
    } else {
        target
    }
}

/// Strictly parse a signed decimal integer.
///
/// Unlike `str::parse`, a leading `+` and surrounding whitespace are refused.
pub(crate) fn parse_decimal(text: &str) -> Result<i64, VerifyError> {
    let digits = text.strip_prefix('-').unwrap_or(text);
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return Err(VerifyError::parse(text, "not an integer"));
    }
    text.parse::<i64>()
        .map_err(|e| VerifyError::parse(text, e.to_string()))
}
