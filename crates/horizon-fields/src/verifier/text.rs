//! Free-text group verifier.

use super::{Capability, GroupValue, GroupVerifier};
use crate::error::VerifyError;
use crate::grammar::LengthHint;

/// Verifier for group text matching a regular expression.
///
/// The expression is anchored automatically. An optional length hint lets the
/// group sit next to another group without a literal separator.
///
/// # Example
///
/// ```
/// use horizon_fields::verifier::{GroupVerifier, RegexVerifier};
///
/// let decimal = RegexVerifier::new(r"-?\d*\.?\d*").unwrap();
/// assert!(GroupVerifier::<()>::accepts(&decimal, "-1.5", None));
/// assert!(!GroupVerifier::<()>::accepts(&decimal, "1.5.2", None));
/// ```
#[derive(Debug, Clone)]
pub struct RegexVerifier {
    pattern: regex::Regex,
    length: Option<LengthHint>,
}

impl RegexVerifier {
    /// Create a new verifier for the given expression.
    pub fn new(pattern: &str) -> Result<Self, regex::Error> {
        Ok(Self {
            pattern: regex::Regex::new(&format!("^(?:{})$", pattern))?,
            length: None,
        })
    }

    /// Declare a length hint for grammar disambiguation.
    pub fn with_length(mut self, length: LengthHint) -> Self {
        self.length = Some(length);
        self
    }

    /// Get the anchored pattern string.
    pub fn pattern(&self) -> &str {
        self.pattern.as_str()
    }
}

impl<V> GroupVerifier<V> for RegexVerifier {
    fn accepts(&self, candidate: &str, _field: Option<&V>) -> bool {
        !candidate.is_empty()
            && self.pattern.is_match(candidate)
            && self
                .length
                .is_none_or(|h| candidate.chars().count() <= h.max)
    }

    fn supports(&self, capability: Capability) -> bool {
        match capability {
            Capability::Format | Capability::Parse => true,
            Capability::Length => self.length.is_some(),
            _ => false,
        }
    }

    fn length(&self) -> Option<LengthHint> {
        self.length
    }

    fn format(&self, value: &GroupValue) -> Result<String, VerifyError> {
        Ok(value.to_string())
    }

    fn parse(&self, text: &str) -> Result<GroupValue, VerifyError> {
        if self.pattern.is_match(text) {
            Ok(GroupValue::Text(text.to_string()))
        } else {
            Err(VerifyError::parse(text, "does not match"))
        }
    }
}
