//! Conversion contexts.

use std::collections::HashMap;
use std::fmt;
use std::hash::{Hash, Hasher};

/// Well-known context names.
///
/// Any other name may be used without registration; these are the ones the
/// built-in converters register under.
pub mod names {
    /// The default context.
    pub const DEFAULT: &str = "";
    /// Time-of-day values.
    pub const TIME: &str = "Time";
    /// Combined date and time values.
    pub const DATE_TIME: &str = "DateTime";
    /// Monetary amounts.
    pub const CURRENCY: &str = "Currency";
    /// Ratios rendered as percentages.
    pub const PERCENT: &str = "Percent";
    /// Short date style.
    pub const SHORT: &str = "Short";
    /// Medium date style.
    pub const MEDIUM: &str = "Medium";
    /// Long date style.
    pub const LONG: &str = "Long";
    /// Prefix of the fixed-fraction-digit contexts (`Fraction0` .. `Fraction4`).
    pub const FRACTION_PREFIX: &str = "Fraction";
}

/// A named conversion mode with an optional property bag.
///
/// Two contexts are equal iff their names are equal; the properties are not
/// part of the identity. A registry lookup with `Currency {symbol: "€"}`
/// therefore finds the converter registered under plain `Currency`, and that
/// converter reads the symbol from the context it is handed.
#[derive(Clone, Default)]
pub struct ConverterContext {
    name: String,
    properties: HashMap<String, String>,
}

impl ConverterContext {
    /// Create a context with the given name and no properties.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            properties: HashMap::new(),
        }
    }

    /// The default (unnamed) context.
    pub fn default_context() -> Self {
        Self::new(names::DEFAULT)
    }

    /// The `Time` context.
    pub fn time() -> Self {
        Self::new(names::TIME)
    }

    /// The `DateTime` context.
    pub fn date_time() -> Self {
        Self::new(names::DATE_TIME)
    }

    /// The `Currency` context.
    pub fn currency() -> Self {
        Self::new(names::CURRENCY)
    }

    /// The `Percent` context.
    pub fn percent() -> Self {
        Self::new(names::PERCENT)
    }

    /// The fixed-fraction-digit context, e.g. `Fraction2`.
    pub fn fraction(digits: u8) -> Self {
        Self::new(format!("{}{}", names::FRACTION_PREFIX, digits))
    }

    /// Attach a property.
    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    /// The context name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether this is the default context.
    pub fn is_default(&self) -> bool {
        self.name.is_empty()
    }

    /// Look up a property.
    pub fn property(&self, key: &str) -> Option<&str> {
        self.properties.get(key).map(String::as_str)
    }

    /// All properties.
    pub fn properties(&self) -> &HashMap<String, String> {
        &self.properties
    }

    /// Number of fraction digits if this is a `FractionN` context.
    pub fn fraction_digits(&self) -> Option<usize> {
        self.name
            .strip_prefix(names::FRACTION_PREFIX)
            .and_then(|d| d.parse().ok())
    }
}

impl PartialEq for ConverterContext {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for ConverterContext {}

impl Hash for ConverterContext {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
    }
}

impl fmt::Debug for ConverterContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = f.debug_struct("ConverterContext");
        s.field("name", &self.name);
        if !self.properties.is_empty() {
            s.field("properties", &self.properties);
        }
        s.finish()
    }
}

impl fmt::Display for ConverterContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_default() {
            f.write_str("<default>")
        } else {
            f.write_str(&self.name)
        }
    }
}

impl From<&str> for ConverterContext {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn equality_ignores_properties() {
        let a = ConverterContext::currency().with_property("symbol", "€");
        let b = ConverterContext::currency();
        assert_eq!(a, b);

        let mut set = HashSet::new();
        set.insert(a);
        assert!(set.contains(&b));
    }

    #[test]
    fn fraction_contexts() {
        assert_eq!(ConverterContext::fraction(2).name(), "Fraction2");
        assert_eq!(ConverterContext::fraction(3).fraction_digits(), Some(3));
        assert_eq!(ConverterContext::percent().fraction_digits(), None);
    }

    #[test]
    fn default_context() {
        assert!(ConverterContext::default().is_default());
        assert_eq!(ConverterContext::default(), ConverterContext::default_context());
        assert_eq!(ConverterContext::default().to_string(), "<default>");
    }
}
