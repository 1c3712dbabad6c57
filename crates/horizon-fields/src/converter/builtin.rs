//! Scalar converters: strings, booleans, numbers.

use std::fmt::{self, Display};
use std::marker::PhantomData;
use std::str::FromStr;

use super::{ConverterContext, ValueConverter, names};
use crate::error::ConvertError;

/// Identity converter for `String`.
#[derive(Debug, Clone, Copy, Default)]
pub struct StringConverter;

impl ValueConverter<String> for StringConverter {
    fn to_text(&self, value: &String, _context: &ConverterContext) -> Result<String, ConvertError> {
        Ok(value.clone())
    }

    fn from_text(&self, text: &str, _context: &ConverterContext) -> Option<String> {
        Some(text.to_string())
    }
}

/// Converter for `bool` with configurable labels.
///
/// Parsing compares case-insensitively with the labels and then with the
/// English words `true`/`false`, so text written under a different label set
/// still reads back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BooleanConverter {
    true_label: String,
    false_label: String,
}

impl BooleanConverter {
    /// Create a converter with the `True`/`False` labels.
    pub fn new() -> Self {
        Self::with_labels("True", "False")
    }

    /// Create a converter with custom labels.
    pub fn with_labels(true_label: impl Into<String>, false_label: impl Into<String>) -> Self {
        Self {
            true_label: true_label.into(),
            false_label: false_label.into(),
        }
    }
}

impl Default for BooleanConverter {
    fn default() -> Self {
        Self::new()
    }
}

impl ValueConverter<bool> for BooleanConverter {
    fn to_text(&self, value: &bool, _context: &ConverterContext) -> Result<String, ConvertError> {
        Ok(if *value {
            self.true_label.clone()
        } else {
            self.false_label.clone()
        })
    }

    fn from_text(&self, text: &str, _context: &ConverterContext) -> Option<bool> {
        let text = text.trim();
        let lower = text.to_lowercase();
        let is = |label: &str| lower == label.to_lowercase();
        if is(&self.true_label) || is("true") {
            Some(true)
        } else if is(&self.false_label) || is("false") {
            Some(false)
        } else {
            None
        }
    }
}

/// Converter for any `Display + FromStr` type.
///
/// Parsing trims surrounding whitespace first.
pub struct DisplayConverter<T> {
    _value: PhantomData<fn() -> T>,
}

impl<T> DisplayConverter<T> {
    /// Create a new converter.
    pub fn new() -> Self {
        Self {
            _value: PhantomData,
        }
    }
}

impl<T> Default for DisplayConverter<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for DisplayConverter<T> {
    fn clone(&self) -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for DisplayConverter<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DisplayConverter<{}>", std::any::type_name::<T>())
    }
}

impl<T: Display + FromStr> ValueConverter<T> for DisplayConverter<T> {
    fn to_text(&self, value: &T, _context: &ConverterContext) -> Result<String, ConvertError> {
        Ok(value.to_string())
    }

    fn from_text(&self, text: &str, _context: &ConverterContext) -> Option<T> {
        text.trim().parse().ok()
    }
}

/// How a [`NumberConverter`] renders numbers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumberStyle {
    /// Shortest round-tripping representation.
    Plain,
    /// Exactly this many fraction digits.
    Fraction(usize),
    /// Ratio times 100 with a `%` suffix: 0.5 is `50%`.
    Percent,
    /// Two fraction digits, thousands separators and a currency symbol.
    Currency,
}

impl NumberStyle {
    /// The style a context name selects.
    pub fn from_context(context: &ConverterContext) -> Self {
        if let Some(digits) = context.fraction_digits() {
            return NumberStyle::Fraction(digits);
        }
        match context.name() {
            names::PERCENT => NumberStyle::Percent,
            names::CURRENCY => NumberStyle::Currency,
            _ => NumberStyle::Plain,
        }
    }
}

/// Floating-point types handled by [`NumberConverter`].
pub trait Float: Copy + Display + FromStr + Send + Sync + 'static {
    /// Widen to `f64`.
    fn to_f64(self) -> f64;
    /// Narrow from `f64`.
    fn from_f64(value: f64) -> Self;
}

impl Float for f64 {
    fn to_f64(self) -> f64 {
        self
    }
    fn from_f64(value: f64) -> Self {
        value
    }
}

impl Float for f32 {
    fn to_f64(self) -> f64 {
        self as f64
    }
    fn from_f64(value: f64) -> Self {
        value as f32
    }
}

/// Converter for `f32`/`f64` in plain, fixed-fraction, percent and currency
/// styles.
///
/// Unless fixed with [`with_style`](Self::with_style), the style follows the
/// context name. The currency symbol comes from the context property
/// `symbol` and defaults to `$`.
#[derive(Debug, Clone, Copy, Default)]
pub struct NumberConverter {
    style: Option<NumberStyle>,
}

/// Context property naming the currency symbol.
pub const CURRENCY_SYMBOL_PROPERTY: &str = "symbol";

impl NumberConverter {
    /// Create a converter whose style follows the context.
    pub fn new() -> Self {
        Self { style: None }
    }

    /// Create a converter with a fixed style.
    pub fn with_style(style: NumberStyle) -> Self {
        Self { style: Some(style) }
    }

    fn style(&self, context: &ConverterContext) -> NumberStyle {
        self.style.unwrap_or_else(|| NumberStyle::from_context(context))
    }
}

fn finite<T: ?Sized>(value: f64) -> Result<f64, ConvertError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(ConvertError::format::<T>(format!("{} has no fixed-point form", value)))
    }
}

/// Format with at most `digits` fraction digits, dropping trailing zeros.
fn trimmed(value: f64, digits: usize) -> String {
    let s = format!("{:.*}", digits, value);
    if s.contains('.') {
        let s = s.trim_end_matches('0').trim_end_matches('.');
        if s == "-0" { "0".to_string() } else { s.to_string() }
    } else {
        s
    }
}

fn group_thousands(integer: &str) -> String {
    let mut out = String::with_capacity(integer.len() + integer.len() / 3);
    for (i, c) in integer.chars().enumerate() {
        if i > 0 && (integer.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

impl<F: Float> ValueConverter<F> for NumberConverter {
    fn to_text(&self, value: &F, context: &ConverterContext) -> Result<String, ConvertError> {
        let v = value.to_f64();
        Ok(match self.style(context) {
            NumberStyle::Plain => value.to_string(),
            NumberStyle::Fraction(digits) => format!("{:.*}", digits, finite::<F>(v)?),
            NumberStyle::Percent => format!("{}%", trimmed(finite::<F>(v)? * 100.0, 2)),
            NumberStyle::Currency => {
                let v = finite::<F>(v)?;
                let symbol = context.property(CURRENCY_SYMBOL_PROPERTY).unwrap_or("$");
                let fixed = format!("{:.2}", v.abs());
                let (integer, fraction) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));
                let sign = if v < 0.0 && fixed != "0.00" { "-" } else { "" };
                format!("{}{}{}.{}", sign, symbol, group_thousands(integer), fraction)
            }
        })
    }

    fn from_text(&self, text: &str, context: &ConverterContext) -> Option<F> {
        let text = text.trim();
        let value = match self.style(context) {
            NumberStyle::Plain | NumberStyle::Fraction(_) => text.parse::<f64>().ok()?,
            NumberStyle::Percent => {
                let number = text.strip_suffix('%').unwrap_or(text).trim();
                number.parse::<f64>().ok()? / 100.0
            }
            NumberStyle::Currency => {
                let symbol = context.property(CURRENCY_SYMBOL_PROPERTY).unwrap_or("$");
                let (negative, body) = match text.strip_prefix('-') {
                    Some(rest) => (true, rest.trim_start()),
                    None => match text.strip_prefix('(').and_then(|t| t.strip_suffix(')')) {
                        Some(inner) => (true, inner.trim()),
                        None => (false, text),
                    },
                };
                let body = body.strip_prefix(symbol).unwrap_or(body).trim();
                let amount = body.replace(',', "").parse::<f64>().ok()?;
                if negative { -amount } else { amount }
            }
        };
        Some(F::from_f64(value))
    }
}
