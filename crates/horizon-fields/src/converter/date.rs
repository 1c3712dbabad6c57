//! Date and time converters with a best-effort parse chain.
//!
//! Parsing tries formats in a fixed order and the first success wins:
//!
//! 1. the explicit format (converter override, else the context property
//!    `format`), otherwise the style the context selects (medium by default)
//! 2. the short, medium and long styles
//! 3. a list of common literal formats
//!
//! For dates the literal list is `M/d/yyyy`, `MM/dd/yyyy`, `yyyy-MM-dd`,
//! `yy-MM-dd`, `yyyyMMdd`, `yyMMdd`, `dd-MMM-yy`, `dd-MMM-yyyy`, in that
//! order. [`TemporalConverter::candidate_formats`] exposes the full chain.

use std::fmt::Write as _;
use std::marker::PhantomData;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use horizon_fields_core::logging::targets;

use super::{ConverterContext, ValueConverter, names};
use crate::error::ConvertError;

/// Context property holding an explicit chrono format string.
pub const FORMAT_PROPERTY: &str = "format";

/// Short, medium and long presentation styles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DateStyle {
    /// Numeric, e.g. `3/9/24`.
    Short,
    /// Abbreviated month name, e.g. `Mar 9, 2024`.
    #[default]
    Medium,
    /// Full month name, e.g. `March 9, 2024`.
    Long,
}

impl DateStyle {
    /// All styles in fallback order.
    pub const ALL: [DateStyle; 3] = [DateStyle::Short, DateStyle::Medium, DateStyle::Long];

    /// The style a context name selects; anything unrecognized is medium.
    pub fn from_context(context: &ConverterContext) -> Self {
        match context.name() {
            names::SHORT => DateStyle::Short,
            names::LONG => DateStyle::Long,
            _ => DateStyle::Medium,
        }
    }
}

/// chrono types the [`TemporalConverter`] can handle.
pub trait TemporalFormats: Sized + Send + Sync + 'static {
    /// The chrono format string for a presentation style.
    fn style_format(style: DateStyle) -> &'static str;

    /// Literal fallback formats, tried after every style.
    fn fallback_formats() -> &'static [&'static str];

    /// Parse `text` with a chrono format string.
    fn parse_with(text: &str, format: &str) -> Option<Self>;

    /// Render with a chrono format string, or `None` if the format does not
    /// apply to this type.
    fn format_with(&self, format: &str) -> Option<String>;
}

const DATE_FALLBACKS: &[&str] = &[
    "%-m/%-d/%Y", // M/d/yyyy
    "%m/%d/%Y",   // MM/dd/yyyy
    "%Y-%m-%d",   // yyyy-MM-dd
    "%y-%m-%d",   // yy-MM-dd
    "%Y%m%d",     // yyyyMMdd
    "%y%m%d",     // yyMMdd
    "%d-%b-%y",   // dd-MMM-yy
    "%d-%b-%Y",   // dd-MMM-yyyy
];

const TIME_FALLBACKS: &[&str] = &[
    "%H:%M:%S",
    "%H:%M",
    "%I:%M:%S %p",
    "%I:%M %p",
    "%H%M%S",
    "%H%M",
];

const DATE_TIME_FALLBACKS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%-m/%-d/%Y %H:%M:%S",
    "%-m/%-d/%Y %H:%M",
    "%-m/%-d/%Y",
    "%m/%d/%Y",
    "%Y-%m-%d",
    "%y-%m-%d",
    "%Y%m%d",
    "%y%m%d",
    "%d-%b-%y",
    "%d-%b-%Y",
];

fn render<T: std::fmt::Display>(value: T) -> Option<String> {
    let mut out = String::new();
    write!(out, "{}", value).ok()?;
    Some(out)
}

impl TemporalFormats for NaiveDate {
    fn style_format(style: DateStyle) -> &'static str {
        match style {
            DateStyle::Short => "%-m/%-d/%y",
            DateStyle::Medium => "%b %-d, %Y",
            DateStyle::Long => "%B %-d, %Y",
        }
    }

    fn fallback_formats() -> &'static [&'static str] {
        DATE_FALLBACKS
    }

    fn parse_with(text: &str, format: &str) -> Option<Self> {
        NaiveDate::parse_from_str(text, format).ok()
    }

    fn format_with(&self, format: &str) -> Option<String> {
        render(self.format(format))
    }
}

impl TemporalFormats for NaiveTime {
    fn style_format(style: DateStyle) -> &'static str {
        match style {
            DateStyle::Short => "%H:%M",
            DateStyle::Medium => "%H:%M:%S",
            DateStyle::Long => "%I:%M:%S %p",
        }
    }

    fn fallback_formats() -> &'static [&'static str] {
        TIME_FALLBACKS
    }

    fn parse_with(text: &str, format: &str) -> Option<Self> {
        NaiveTime::parse_from_str(text, format).ok()
    }

    fn format_with(&self, format: &str) -> Option<String> {
        render(self.format(format))
    }
}

impl TemporalFormats for NaiveDateTime {
    fn style_format(style: DateStyle) -> &'static str {
        match style {
            DateStyle::Short => "%-m/%-d/%y %H:%M",
            DateStyle::Medium => "%b %-d, %Y %H:%M:%S",
            DateStyle::Long => "%B %-d, %Y %I:%M:%S %p",
        }
    }

    fn fallback_formats() -> &'static [&'static str] {
        DATE_TIME_FALLBACKS
    }

    fn parse_with(text: &str, format: &str) -> Option<Self> {
        NaiveDateTime::parse_from_str(text, format)
            .ok()
            .or_else(|| NaiveDate::parse_from_str(text, format).ok().map(|d| d.and_time(NaiveTime::MIN)))
    }

    fn format_with(&self, format: &str) -> Option<String> {
        render(self.format(format))
    }
}

/// Converter for `NaiveDate`, `NaiveTime` and `NaiveDateTime`.
pub struct TemporalConverter<T> {
    format: Option<String>,
    _value: PhantomData<fn() -> T>,
}

impl<T: TemporalFormats> TemporalConverter<T> {
    /// Create a converter that formats with the context's style.
    pub fn new() -> Self {
        Self {
            format: None,
            _value: PhantomData,
        }
    }

    /// Create a converter with an explicit chrono format string.
    pub fn with_format(format: impl Into<String>) -> Self {
        Self {
            format: Some(format.into()),
            _value: PhantomData,
        }
    }

    fn primary_format(&self, context: &ConverterContext) -> String {
        self.format
            .clone()
            .or_else(|| context.property(FORMAT_PROPERTY).map(str::to_string))
            .unwrap_or_else(|| T::style_format(DateStyle::from_context(context)).to_string())
    }

    /// Every format `from_text` tries, in order.
    pub fn candidate_formats(&self, context: &ConverterContext) -> Vec<String> {
        let mut formats = vec![self.primary_format(context)];
        let styles = DateStyle::ALL.iter().map(|s| T::style_format(*s));
        for format in styles.chain(T::fallback_formats().iter().copied()) {
            if !formats.iter().any(|f| f == format) {
                formats.push(format.to_string());
            }
        }
        formats
    }
}

impl<T: TemporalFormats> Default for TemporalConverter<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> std::fmt::Debug for TemporalConverter<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TemporalConverter")
            .field("type", &std::any::type_name::<T>())
            .field("format", &self.format)
            .finish()
    }
}

impl<T: TemporalFormats> ValueConverter<T> for TemporalConverter<T> {
    fn to_text(&self, value: &T, context: &ConverterContext) -> Result<String, ConvertError> {
        let format = self.primary_format(context);
        value
            .format_with(&format)
            .ok_or_else(|| ConvertError::format::<T>(format!("format '{}' does not apply", format)))
    }

    fn from_text(&self, text: &str, context: &ConverterContext) -> Option<T> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }
        for format in self.candidate_formats(context) {
            if let Some(value) = T::parse_with(text, &format) {
                tracing::trace!(target: targets::CONVERTER, text, format = %format, "parsed temporal value");
                return Some(value);
            }
        }
        None
    }
}
