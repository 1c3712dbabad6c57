//! Converters for enumerations.
//!
//! An [`EnumConverter`] needs the full variant list of its enum. The registry
//! stores a [`LazyEnumConverter`] instead and completes it on first lookup,
//! so registering many enum types costs nothing until one is used.

use std::fmt;
use std::marker::PhantomData;

use super::{ConverterContext, DeferredConverter, ValueConverter};
use crate::error::ConvertError;

/// An enum whose variants can be listed.
pub trait EnumVariants: Clone + PartialEq + Send + Sync + 'static {
    /// Every variant, in display order.
    fn variants() -> &'static [Self];

    /// The variant's identifier, e.g. `DarkRed`.
    fn name(&self) -> &'static str;
}

/// How variant identifiers become labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LabelStyle {
    /// The identifier unchanged: `DarkRed`.
    #[default]
    Identifier,
    /// Words split at case changes: `Dark Red`.
    Words,
    /// `DARK_RED`.
    UpperSnake,
    /// `dark-red`.
    Kebab,
}

impl LabelStyle {
    fn apply(self, name: &str) -> String {
        let words = split_words(name);
        match self {
            LabelStyle::Identifier => name.to_string(),
            LabelStyle::Words => words.join(" "),
            LabelStyle::UpperSnake => words
                .iter()
                .map(|w| w.to_uppercase())
                .collect::<Vec<_>>()
                .join("_"),
            LabelStyle::Kebab => words
                .iter()
                .map(|w| w.to_lowercase())
                .collect::<Vec<_>>()
                .join("-"),
        }
    }
}

fn split_words(name: &str) -> Vec<String> {
    let mut words: Vec<String> = Vec::new();
    let mut prev_lower = false;
    for c in name.chars() {
        if c == '_' || c == '-' || c == ' ' {
            prev_lower = false;
            words.push(String::new());
            continue;
        }
        if c.is_uppercase() && prev_lower {
            words.push(String::new());
        }
        match words.last_mut() {
            Some(word) => word.push(c),
            None => words.push(c.to_string()),
        }
        prev_lower = c.is_lowercase() || c.is_ascii_digit();
    }
    words.retain(|w| !w.is_empty());
    words
}

/// Ready converter mapping each variant to a label.
///
/// Parsing compares case-insensitively against the labels and then against
/// the raw identifiers.
#[derive(Clone)]
pub struct EnumConverter<E> {
    labels: Vec<(E, String)>,
}

impl<E: EnumVariants> EnumConverter<E> {
    /// Label every variant with its identifier.
    pub fn new() -> Self {
        Self::with_style(LabelStyle::Identifier)
    }

    /// Label every variant with the given style.
    pub fn with_style(style: LabelStyle) -> Self {
        let labels = E::variants()
            .iter()
            .map(|v| (v.clone(), style.apply(v.name())))
            .collect();
        Self { labels }
    }

    /// Replace the label of one variant.
    pub fn with_label(mut self, variant: E, label: impl Into<String>) -> Self {
        let label = label.into();
        if let Some(entry) = self.labels.iter_mut().find(|(v, _)| *v == variant) {
            entry.1 = label;
        }
        self
    }

    /// Labels in variant order.
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.labels.iter().map(|(_, l)| l.as_str())
    }
}

impl<E: EnumVariants> Default for EnumConverter<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> fmt::Debug for EnumConverter<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EnumConverter")
            .field("type", &std::any::type_name::<E>())
            .field("labels", &self.labels.iter().map(|(_, l)| l).collect::<Vec<_>>())
            .finish()
    }
}

impl<E: EnumVariants> ValueConverter<E> for EnumConverter<E> {
    fn to_text(&self, value: &E, _context: &ConverterContext) -> Result<String, ConvertError> {
        self.labels
            .iter()
            .find(|(v, _)| v == value)
            .map(|(_, l)| l.clone())
            .ok_or_else(|| ConvertError::format::<E>(format!("variant '{}' has no label", value.name())))
    }

    fn from_text(&self, text: &str, _context: &ConverterContext) -> Option<E> {
        let text = text.trim();
        self.labels
            .iter()
            .find(|(_, l)| l.eq_ignore_ascii_case(text))
            .or_else(|| self.labels.iter().find(|(v, _)| v.name().eq_ignore_ascii_case(text)))
            .map(|(v, _)| v.clone())
    }
}

/// Uninitialized phase of an [`EnumConverter`].
pub struct LazyEnumConverter<E> {
    style: LabelStyle,
    _value: PhantomData<fn() -> E>,
}

impl<E> LazyEnumConverter<E> {
    /// Defer a converter using identifier labels.
    pub fn new() -> Self {
        Self::with_style(LabelStyle::Identifier)
    }

    /// Defer a converter using the given label style.
    pub fn with_style(style: LabelStyle) -> Self {
        Self {
            style,
            _value: PhantomData,
        }
    }
}

impl<E> Default for LazyEnumConverter<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> fmt::Debug for LazyEnumConverter<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LazyEnumConverter")
            .field("type", &std::any::type_name::<E>())
            .field("style", &self.style)
            .finish()
    }
}

impl<E: EnumVariants> DeferredConverter<E> for LazyEnumConverter<E> {
    type Ready = EnumConverter<E>;

    fn initialize(&self) -> EnumConverter<E> {
        EnumConverter::with_style(self.style)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq)]
    enum Shade {
        Light,
        DarkRed,
        HTMLBlue,
    }

    impl EnumVariants for Shade {
        fn variants() -> &'static [Self] {
            &[Shade::Light, Shade::DarkRed, Shade::HTMLBlue]
        }

        fn name(&self) -> &'static str {
            match self {
                Shade::Light => "Light",
                Shade::DarkRed => "DarkRed",
                Shade::HTMLBlue => "HTMLBlue",
            }
        }
    }

    #[test]
    fn test_label_styles() {
        assert_eq!(LabelStyle::Words.apply("DarkRed"), "Dark Red");
        assert_eq!(LabelStyle::UpperSnake.apply("DarkRed"), "DARK_RED");
        assert_eq!(LabelStyle::Kebab.apply("DarkRed"), "dark-red");
        assert_eq!(LabelStyle::Words.apply("HTMLBlue"), "HTMLBlue");
        assert_eq!(LabelStyle::Identifier.apply("DarkRed"), "DarkRed");
    }

    #[test]
    fn test_enum_round_trip() {
        let c = EnumConverter::<Shade>::with_style(LabelStyle::Words);
        let ctx = ConverterContext::default();
        assert_eq!(c.to_text(&Shade::DarkRed, &ctx).unwrap(), "Dark Red");
        assert_eq!(c.from_text("dark red", &ctx), Some(Shade::DarkRed));
        assert_eq!(c.from_text("DARKRED", &ctx), Some(Shade::DarkRed));
        assert_eq!(c.from_text("purple", &ctx), None);
    }

    #[test]
    fn test_custom_label() {
        let c = EnumConverter::new().with_label(Shade::Light, "Pale");
        let ctx = ConverterContext::default();
        assert_eq!(c.to_text(&Shade::Light, &ctx).unwrap(), "Pale");
        assert_eq!(c.labels().collect::<Vec<_>>(), vec!["Pale", "DarkRed", "HTMLBlue"]);
    }

    #[test]
    fn test_lazy_initializes_into_ready() {
        let ready = LazyEnumConverter::<Shade>::with_style(LabelStyle::Kebab).initialize();
        assert_eq!(ready.to_text(&Shade::DarkRed, &ConverterContext::default()).unwrap(), "dark-red");
    }
}
