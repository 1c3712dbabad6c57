//! Conversion between typed values and their text.
//!
//! A [`ValueConverter`] renders a value as text and reads it back, selecting
//! among formatting variants through a [`ConverterContext`]. The
//! [`ConverterRegistry`] maps (type, context) pairs to converters and supplies
//! the fallbacks that make its `to_text` total.
//!
//! # Built-in Converters
//!
//! - [`StringConverter`], [`BooleanConverter`], [`DisplayConverter`]
//! - [`NumberConverter`]: plain, `FractionN`, `Percent` and `Currency` styles
//! - [`TemporalConverter`]: dates and times with a fixed fallback chain
//! - [`GeometryConverter`] for [`Point`], [`Dimension`], [`Rectangle`], [`Insets`]
//! - [`ColorConverter`] for [`Color`]
//! - [`EnumConverter`], built in two phases from a [`LazyEnumConverter`]
//! - [`ArrayConverter`] for `Vec<T>`
//!
//! # Example
//!
//! ```
//! use horizon_fields::converter::{ConverterContext, ConverterRegistry};
//!
//! let registry = ConverterRegistry::new();
//! let percent = ConverterContext::percent();
//! assert_eq!(registry.to_text(Some(&0.5_f64), &percent), "50%");
//! assert_eq!(registry.from_text::<f64>("50", &percent), Some(0.5));
//! ```

mod array;
mod builtin;
mod context;
mod date;
mod enums;
mod geometry;
mod registry;

pub use array::{ArrayConverter, ELEMENT_SEPARATOR};
pub use builtin::{
    BooleanConverter, CURRENCY_SYMBOL_PROPERTY, DisplayConverter, Float, NumberConverter, NumberStyle,
    StringConverter,
};
pub use context::{ConverterContext, names};
pub use date::{DateStyle, FORMAT_PROPERTY, TemporalConverter, TemporalFormats};
pub use enums::{EnumConverter, EnumVariants, LabelStyle, LazyEnumConverter};
pub use geometry::{
    Color, ColorConverter, Dimension, Geometry, GeometryConverter, Insets, ParseGeometryError, Point,
    Rectangle, SEPARATOR_PROPERTY,
};
pub use registry::{ConverterRegistry, global_registry};

use std::sync::Arc;

use crate::error::ConvertError;

/// Bidirectional mapping between a `T` and its text.
pub trait ValueConverter<T>: Send + Sync {
    /// Render `value` for `context`.
    fn to_text(&self, value: &T, context: &ConverterContext) -> Result<String, ConvertError>;

    /// Read `text` for `context`.
    ///
    /// `None` means the text could not be understood; callers treat it as
    /// "no change", never as "clear the value".
    fn from_text(&self, text: &str, context: &ConverterContext) -> Option<T>;
}

impl<T, C: ValueConverter<T> + ?Sized> ValueConverter<T> for Arc<C> {
    fn to_text(&self, value: &T, context: &ConverterContext) -> Result<String, ConvertError> {
        (**self).to_text(value, context)
    }

    fn from_text(&self, text: &str, context: &ConverterContext) -> Option<T> {
        (**self).from_text(text, context)
    }
}

impl<T, C: ValueConverter<T> + ?Sized> ValueConverter<T> for Box<C> {
    fn to_text(&self, value: &T, context: &ConverterContext) -> Result<String, ConvertError> {
        (**self).to_text(value, context)
    }

    fn from_text(&self, text: &str, context: &ConverterContext) -> Option<T> {
        (**self).from_text(text, context)
    }
}

/// First phase of a converter that is completed by the registry.
///
/// The registry calls [`initialize`](Self::initialize) on the first lookup
/// of the entry and stores the result in its place. If initialization panics
/// the entry stays deferred and the next lookup tries again.
pub trait DeferredConverter<T>: Send + Sync + 'static {
    /// The ready converter produced by initialization.
    type Ready: ValueConverter<T> + 'static;

    /// Complete the converter for the concrete type `T`.
    fn initialize(&self) -> Self::Ready;
}
