//! Integer range verifiers in decimal and hexadecimal.

use super::{Adjustment, Capability, GroupValue, GroupVerifier, parse_decimal, step_in_range};
use crate::error::VerifyError;
use crate::grammar::LengthHint;

/// Verifier for decimal integers within `[minimum, maximum]`.
///
/// Text is accepted iff it is a strict integer (optional leading `-`, digits
/// only), its value lies in the range, and it is no longer than the longest
/// value of the range. When the range reaches below zero, a bare `-` and
/// negative entries that more digits would bring into range are accepted as
/// partial input. With `fixed_length`, formatting zero-pads to the digit
/// count of `maximum`.
///
/// # Example
///
/// ```
/// use horizon_fields::verifier::{BoundedIntegerVerifier, GroupVerifier};
///
/// let octet = BoundedIntegerVerifier::new(0, 255);
/// for (text, ok) in [("256", false), ("255", true), ("0", true), ("-1", false)] {
///     assert_eq!(GroupVerifier::<()>::accepts(&octet, text, None), ok);
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoundedIntegerVerifier {
    minimum: i64,
    maximum: i64,
    fixed_length: bool,
}

impl BoundedIntegerVerifier {
    /// Create a verifier for the given inclusive range.
    pub fn new(minimum: i64, maximum: i64) -> Self {
        Self {
            minimum: minimum.min(maximum),
            maximum: minimum.max(maximum),
            fixed_length: false,
        }
    }

    /// Whether appending digits to the negative entry `value` can reach the
    /// range.
    fn extends_into_range(&self, candidate: &str, value: i64) -> bool {
        let room = self.max_length().saturating_sub(candidate.chars().count());
        (1..=room).any(|extra| {
            let scale = 10_i64.pow(extra as u32);
            let nearest = value.saturating_mul(scale);
            let farthest = nearest.saturating_sub(scale - 1);
            farthest <= self.maximum && self.minimum <= nearest
        })
    }

    /// Zero-pad formatted values to the width of the maximum.
    pub fn with_fixed_length(mut self, fixed_length: bool) -> Self {
        self.fixed_length = fixed_length;
        self
    }

    /// Get the minimum value.
    pub fn minimum(&self) -> i64 {
        self.minimum
    }

    /// Get the maximum value.
    pub fn maximum(&self) -> i64 {
        self.maximum
    }

    /// Whether formatted values are zero-padded.
    pub fn is_fixed_length(&self) -> bool {
        self.fixed_length
    }

    /// Longest text any in-range value can have.
    pub fn max_length(&self) -> usize {
        self.minimum
            .to_string()
            .len()
            .max(self.maximum.to_string().len())
    }

    /// The value after `current`, wrapping to the minimum when `restart`.
    pub fn next_value(&self, current: i64, restart: bool) -> i64 {
        step_in_range(current, Adjustment::Next, restart, self.minimum, self.maximum)
    }

    /// The value before `current`, wrapping to the maximum when `restart`.
    pub fn previous_value(&self, current: i64, restart: bool) -> i64 {
        step_in_range(current, Adjustment::Previous, restart, self.minimum, self.maximum)
    }

    fn check(&self, value: i64) -> Result<i64, VerifyError> {
        if (self.minimum..=self.maximum).contains(&value) {
            Ok(value)
        } else {
            Err(VerifyError::OutOfRange {
                value,
                min: self.minimum,
                max: self.maximum,
            })
        }
    }
}

impl<V> GroupVerifier<V> for BoundedIntegerVerifier {
    fn accepts(&self, candidate: &str, _field: Option<&V>) -> bool {
        if candidate == "-" {
            return self.minimum < 0;
        }
        if candidate.chars().count() > self.max_length() {
            return false;
        }
        match parse_decimal(candidate) {
            Ok(value) => {
                self.check(value).is_ok() || (value < 0 && self.extends_into_range(candidate, value))
            }
            Err(_) => false,
        }
    }

    fn supports(&self, capability: Capability) -> bool {
        !matches!(capability, Capability::FieldValue)
    }

    fn range(&self, _field: Option<&V>) -> Option<(i64, i64)> {
        Some((self.minimum, self.maximum))
    }

    fn length(&self) -> Option<LengthHint> {
        Some(if self.fixed_length {
            LengthHint::exact(self.maximum.to_string().len())
        } else {
            LengthHint::new(1, self.max_length())
        })
    }

    fn format(&self, value: &GroupValue) -> Result<String, VerifyError> {
        let value = value
            .as_integer()
            .ok_or_else(|| VerifyError::format("expected an integer"))?;
        let value = self.check(value)?;
        if self.fixed_length {
            let width = self.maximum.to_string().len();
            Ok(format!("{:0width$}", value, width = width))
        } else {
            Ok(value.to_string())
        }
    }

    fn parse(&self, text: &str) -> Result<GroupValue, VerifyError> {
        parse_decimal(text).map(GroupValue::Integer)
    }

    fn adjust(
        &self,
        current: &GroupValue,
        adjustment: Adjustment,
        restart: bool,
        _field: Option<&V>,
    ) -> Result<GroupValue, VerifyError> {
        let current = current
            .as_integer()
            .ok_or_else(|| VerifyError::format("expected an integer"))?;
        Ok(GroupValue::Integer(step_in_range(
            current,
            adjustment,
            restart,
            self.minimum,
            self.maximum,
        )))
    }
}

/// Verifier for hexadecimal integers within `[minimum, maximum]`.
///
/// Negative values are not representable; a negative minimum is raised to 0.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HexRangeVerifier {
    minimum: i64,
    maximum: i64,
    width: Option<usize>,
    uppercase: bool,
}

impl HexRangeVerifier {
    /// Create a verifier for the given inclusive range.
    pub fn new(minimum: i64, maximum: i64) -> Self {
        let (lo, hi) = (minimum.min(maximum).max(0), minimum.max(maximum).max(0));
        Self {
            minimum: lo,
            maximum: hi,
            width: None,
            uppercase: true,
        }
    }

    /// Zero-pad formatted values to `width` digits.
    pub fn with_width(mut self, width: usize) -> Self {
        self.width = Some(width.max(1));
        self
    }

    /// Format with upper- or lower-case digits.
    pub fn with_uppercase(mut self, uppercase: bool) -> Self {
        self.uppercase = uppercase;
        self
    }

    /// Get the minimum value.
    pub fn minimum(&self) -> i64 {
        self.minimum
    }

    /// Get the maximum value.
    pub fn maximum(&self) -> i64 {
        self.maximum
    }

    /// Longest text any in-range value can have.
    pub fn max_length(&self) -> usize {
        let digits = format!("{:x}", self.maximum).len();
        self.width.map_or(digits, |w| w.max(digits))
    }

    fn parse_hex(text: &str) -> Result<i64, VerifyError> {
        if text.is_empty() || !text.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(VerifyError::parse(text, "not a hexadecimal number"));
        }
        i64::from_str_radix(text, 16).map_err(|e| VerifyError::parse(text, e.to_string()))
    }

    fn check(&self, value: i64) -> Result<i64, VerifyError> {
        if (self.minimum..=self.maximum).contains(&value) {
            Ok(value)
        } else {
            Err(VerifyError::OutOfRange {
                value,
                min: self.minimum,
                max: self.maximum,
            })
        }
    }
}

impl<V> GroupVerifier<V> for HexRangeVerifier {
    fn accepts(&self, candidate: &str, _field: Option<&V>) -> bool {
        candidate.len() <= self.max_length()
            && Self::parse_hex(candidate).and_then(|v| self.check(v)).is_ok()
    }

    fn supports(&self, capability: Capability) -> bool {
        !matches!(capability, Capability::FieldValue)
    }

    fn range(&self, _field: Option<&V>) -> Option<(i64, i64)> {
        Some((self.minimum, self.maximum))
    }

    fn length(&self) -> Option<LengthHint> {
        Some(match self.width {
            Some(w) => LengthHint::exact(w.max(format!("{:x}", self.maximum).len())),
            None => LengthHint::new(1, self.max_length()),
        })
    }

    fn format(&self, value: &GroupValue) -> Result<String, VerifyError> {
        let value = value
            .as_integer()
            .ok_or_else(|| VerifyError::format("expected an integer"))?;
        let value = self.check(value)?;
        let width = self.width.unwrap_or(0);
        Ok(if self.uppercase {
            format!("{:0width$X}", value, width = width)
        } else {
            format!("{:0width$x}", value, width = width)
        })
    }

    fn parse(&self, text: &str) -> Result<GroupValue, VerifyError> {
        Self::parse_hex(text).map(GroupValue::Integer)
    }

    fn adjust(
        &self,
        current: &GroupValue,
        adjustment: Adjustment,
        restart: bool,
        _field: Option<&V>,
    ) -> Result<GroupValue, VerifyError> {
        let current = current
            .as_integer()
            .ok_or_else(|| VerifyError::format("expected an integer"))?;
        Ok(GroupValue::Integer(step_in_range(
            current,
            adjustment,
            restart,
            self.minimum,
            self.maximum,
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn accepts<T: GroupVerifier<()>>(v: &T, text: &str) -> bool {
        v.accepts(text, None)
    }

    // =========================================================================
    // BoundedIntegerVerifier Tests
    // =========================================================================

    #[test]
    fn test_octet_range() {
        let v = BoundedIntegerVerifier::new(0, 255);
        assert!(!accepts(&v, "256"));
        assert!(accepts(&v, "255"));
        assert!(accepts(&v, "0"));
        assert!(!accepts(&v, "-1"));
        assert!(!accepts(&v, ""));
        assert!(!accepts(&v, "1a"));
    }

    #[test]
    fn test_length_limit_rejects_leading_zeros() {
        let v = BoundedIntegerVerifier::new(0, 255);
        assert!(accepts(&v, "007"));
        assert!(!accepts(&v, "0007"));
    }

    #[test]
    fn test_negative_range() {
        let v = BoundedIntegerVerifier::new(-50, 50);
        assert!(accepts(&v, "-50"));
        assert!(!accepts(&v, "-51"));
        assert_eq!(v.max_length(), 3);
    }

    #[test]
    fn test_negative_entries_typed_one_char_at_a_time() {
        let v = BoundedIntegerVerifier::new(-10, -5);
        assert!(accepts(&v, "-"));
        assert!(accepts(&v, "-1"));
        assert!(accepts(&v, "-10"));
        assert!(accepts(&v, "-7"));
        assert!(!accepts(&v, "-2"));
        assert!(!accepts(&v, "-11"));

        assert!(!accepts(&BoundedIntegerVerifier::new(0, 9), "-"));
    }

    #[test]
    fn test_wrap_and_clamp() {
        let v = BoundedIntegerVerifier::new(0, 12);
        assert_eq!(v.next_value(12, false), 12);
        assert_eq!(v.next_value(12, true), 0);
        assert_eq!(v.previous_value(0, true), 12);
        assert_eq!(v.previous_value(0, false), 0);
    }

    #[test]
    fn test_fixed_length_format() {
        let v = BoundedIntegerVerifier::new(1, 12).with_fixed_length(true);
        let f = |n| GroupVerifier::<()>::format(&v, &GroupValue::Integer(n));
        assert_eq!(f(3).unwrap(), "03");
        assert_eq!(f(12).unwrap(), "12");
        assert!(matches!(f(13), Err(VerifyError::OutOfRange { .. })));
        assert_eq!(GroupVerifier::<()>::length(&v), Some(LengthHint::exact(2)));
    }

    #[test]
    fn test_adjust_pages() {
        let v = BoundedIntegerVerifier::new(0, 100);
        let step = |n, a| GroupVerifier::<()>::adjust(&v, &GroupValue::Integer(n), a, false, None);
        assert_eq!(step(95, Adjustment::PageNext), Ok(GroupValue::Integer(100)));
        assert_eq!(step(50, Adjustment::PagePrevious), Ok(GroupValue::Integer(40)));
        assert_eq!(step(50, Adjustment::End), Ok(GroupValue::Integer(100)));
    }

    #[test]
    fn test_integer_capabilities() {
        let v = BoundedIntegerVerifier::new(0, 1);
        assert!(GroupVerifier::<()>::supports(&v, Capability::Adjust));
        assert!(!GroupVerifier::<()>::supports(&v, Capability::FieldValue));
    }

    // =========================================================================
    // HexRangeVerifier Tests
    // =========================================================================

    #[test]
    fn test_hex_accepts() {
        let v = HexRangeVerifier::new(0, 0xFF);
        assert!(accepts(&v, "ff"));
        assert!(accepts(&v, "A0"));
        assert!(!accepts(&v, "100"));
        assert!(!accepts(&v, "g"));
        assert!(!accepts(&v, "-1"));
    }

    #[test]
    fn test_hex_format_width_and_case() {
        let v = HexRangeVerifier::new(0, 0xFF).with_width(2);
        let f = |n| GroupVerifier::<()>::format(&v, &GroupValue::Integer(n)).unwrap();
        assert_eq!(f(0xA), "0A");

        let lower = v.clone().with_uppercase(false);
        assert_eq!(GroupVerifier::<()>::format(&lower, &GroupValue::Integer(0xAB)).unwrap(), "ab");
        assert_eq!(GroupVerifier::<()>::length(&lower), Some(LengthHint::exact(2)));
    }

    #[test]
    fn test_hex_parse_and_wrap() {
        let v = HexRangeVerifier::new(0, 0xFF);
        assert_eq!(GroupVerifier::<()>::parse(&v, "fF"), Ok(GroupValue::Integer(255)));
        let next = GroupVerifier::<()>::adjust(&v, &GroupValue::Integer(255), Adjustment::Next, true, None);
        assert_eq!(next, Ok(GroupValue::Integer(0)));
    }
}
