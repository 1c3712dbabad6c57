//! Verifier for a fixed list of strings.

use super::{Adjustment, Capability, GroupValue, GroupVerifier, step_in_range};
use crate::error::VerifyError;
use crate::grammar::LengthHint;

/// Verifier whose group text must be one of an ordered list of strings.
///
/// A candidate is accepted when it equals an element, or when it is a prefix
/// of exactly one element. Parsing completes such a prefix to the element, so
/// typing `"Ja"` into a month list resolves to `"January"`. Adjustment moves
/// through the list in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumeratedStringVerifier {
    values: Vec<String>,
    case_sensitive: bool,
}

impl EnumeratedStringVerifier {
    /// Create a verifier for the given values, matched case-sensitively.
    pub fn new<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            values: values.into_iter().map(Into::into).collect(),
            case_sensitive: true,
        }
    }

    /// Match candidates ignoring case.
    pub fn with_case_sensitive(mut self, case_sensitive: bool) -> Self {
        self.case_sensitive = case_sensitive;
        self
    }

    /// The values in order.
    pub fn values(&self) -> &[String] {
        &self.values
    }

    /// Index of the element `candidate` resolves to.
    ///
    /// An exact match wins; otherwise the candidate must be a prefix of
    /// exactly one element.
    pub fn resolve(&self, candidate: &str) -> Option<usize> {
        if candidate.is_empty() {
            return None;
        }
        let fold = |s: &str| {
            if self.case_sensitive {
                s.to_string()
            } else {
                s.to_lowercase()
            }
        };
        let needle = fold(candidate);
        if let Some(i) = self.values.iter().position(|v| fold(v) == needle) {
            return Some(i);
        }
        let mut prefixed = self
            .values
            .iter()
            .enumerate()
            .filter(|(_, v)| fold(v).starts_with(&needle));
        match (prefixed.next(), prefixed.next()) {
            (Some((i, _)), None) => Some(i),
            _ => None,
        }
    }

    fn index_of(&self, value: &GroupValue) -> Result<usize, VerifyError> {
        match value {
            GroupValue::Integer(i) => usize::try_from(*i)
                .ok()
                .filter(|i| *i < self.values.len())
                .ok_or_else(|| VerifyError::format(format!("no element at index {}", i))),
            GroupValue::Text(s) => self
                .resolve(s)
                .ok_or_else(|| VerifyError::parse(s.clone(), "not an element")),
        }
    }
}

impl<V> GroupVerifier<V> for EnumeratedStringVerifier {
    fn accepts(&self, candidate: &str, _field: Option<&V>) -> bool {
        self.resolve(candidate).is_some()
    }

    fn supports(&self, capability: Capability) -> bool {
        !matches!(capability, Capability::FieldValue)
    }

    fn range(&self, _field: Option<&V>) -> Option<(i64, i64)> {
        if self.values.is_empty() {
            None
        } else {
            Some((0, self.values.len() as i64 - 1))
        }
    }

    fn length(&self) -> Option<LengthHint> {
        let lens = self.values.iter().map(|v| v.chars().count());
        let min = lens.clone().min()?;
        let max = lens.max()?;
        Some(LengthHint::new(min, max))
    }

    fn format(&self, value: &GroupValue) -> Result<String, VerifyError> {
        let i = self.index_of(value)?;
        Ok(self.values[i].clone())
    }

    fn parse(&self, text: &str) -> Result<GroupValue, VerifyError> {
        self.resolve(text)
            .map(|i| GroupValue::Text(self.values[i].clone()))
            .ok_or_else(|| VerifyError::parse(text, "not an element"))
    }

    fn adjust(
        &self,
        current: &GroupValue,
        adjustment: Adjustment,
        restart: bool,
        _field: Option<&V>,
    ) -> Result<GroupValue, VerifyError> {
        let index = self.index_of(current)? as i64;
        let last = self.values.len() as i64 - 1;
        let next = step_in_range(index, adjustment, restart, 0, last);
        Ok(GroupValue::Text(self.values[next as usize].clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn months() -> EnumeratedStringVerifier {
        EnumeratedStringVerifier::new([
            "January", "February", "March", "April", "May", "June", "July",
        ])
    }

    #[test]
    fn test_exact_and_unique_prefix() {
        let v = months();
        assert!(GroupVerifier::<()>::accepts(&v, "May", None));
        assert!(GroupVerifier::<()>::accepts(&v, "Ja", None));
        assert!(GroupVerifier::<()>::accepts(&v, "Jul", None));
        // "Ju" is a prefix of both June and July
        assert!(!GroupVerifier::<()>::accepts(&v, "Ju", None));
        assert!(!GroupVerifier::<()>::accepts(&v, "Xyz", None));
        assert!(!GroupVerifier::<()>::accepts(&v, "", None));
    }

    #[test]
    fn test_exact_match_beats_longer_prefix() {
        let v = EnumeratedStringVerifier::new(["A", "AB"]);
        assert_eq!(v.resolve("A"), Some(0));
        assert_eq!(v.resolve("AB"), Some(1));
    }

    #[test]
    fn test_parse_completes_prefix() {
        let v = months();
        assert_eq!(
            GroupVerifier::<()>::parse(&v, "Feb"),
            Ok(GroupValue::Text("February".into()))
        );
    }

    #[test]
    fn test_case_insensitive() {
        let v = months().with_case_sensitive(false);
        assert!(GroupVerifier::<()>::accepts(&v, "mar", None));
        assert_eq!(
            GroupVerifier::<()>::format(&v, &GroupValue::Text("MARCH".into())),
            Ok("March".into())
        );
    }

    #[test]
    fn test_adjust_wraps_and_clamps() {
        let v = months();
        let step = |s: &str, a, r| GroupVerifier::<()>::adjust(&v, &GroupValue::Text(s.into()), a, r, None);
        assert_eq!(step("July", Adjustment::Next, true), Ok(GroupValue::Text("January".into())));
        assert_eq!(step("July", Adjustment::Next, false), Ok(GroupValue::Text("July".into())));
        assert_eq!(step("March", Adjustment::Previous, false), Ok(GroupValue::Text("February".into())));
        assert_eq!(step("March", Adjustment::Home, false), Ok(GroupValue::Text("January".into())));
    }

    #[test]
    fn test_length_hint_spans_elements() {
        let v = months();
        assert_eq!(GroupVerifier::<()>::length(&v), Some(LengthHint::new(3, 8)));
        assert_eq!(GroupVerifier::<()>::range(&v, None), Some((0, 6)));
    }
}
