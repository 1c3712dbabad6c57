//! Geometry and color value types with their converters.
//!
//! Geometry values render as their components joined by `"; "`, e.g.
//! `Point { x: 1.0, y: 2.5 }` is `1; 2.5`. Parsing accepts `;` or `,` between
//! components.

use std::fmt;
use std::marker::PhantomData;
use std::str::FromStr;

use super::{ConverterContext, ValueConverter};
use crate::error::ConvertError;

/// Context property overriding the component separator on output.
pub const SEPARATOR_PROPERTY: &str = "separator";

const DEFAULT_SEPARATOR: &str = "; ";

/// A value made of a fixed number of `f64` components.
pub trait Geometry: Sized + Send + Sync + 'static {
    /// Number of components.
    const ARITY: usize;

    /// Components in text order.
    fn components(&self) -> Vec<f64>;

    /// Build from exactly [`ARITY`](Self::ARITY) components.
    fn from_components(components: &[f64]) -> Option<Self>;
}

fn join(components: &[f64], separator: &str) -> String {
    components
        .iter()
        .map(f64::to_string)
        .collect::<Vec<_>>()
        .join(separator)
}

fn split<G: Geometry>(text: &str) -> Option<G> {
    let components = text
        .split([';', ','])
        .map(|part| part.trim().parse::<f64>().ok().filter(|v| v.is_finite()))
        .collect::<Option<Vec<_>>>()?;
    if components.len() != G::ARITY {
        return None;
    }
    G::from_components(&components)
}

/// Parse failure for geometry and color text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseGeometryError {
    type_name: &'static str,
}

impl fmt::Display for ParseGeometryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid {} text", self.type_name)
    }
}

impl std::error::Error for ParseGeometryError {}

macro_rules! geometry {
    ($(#[$meta:meta])* $name:ident { $($field:ident),+ }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Default)]
        pub struct $name {
            $(pub $field: f64,)+
        }

        impl $name {
            /// Create a new value.
            pub const fn new($($field: f64),+) -> Self {
                Self { $($field),+ }
            }
        }

        impl Geometry for $name {
            const ARITY: usize = [$(stringify!($field)),+].len();

            fn components(&self) -> Vec<f64> {
                vec![$(self.$field),+]
            }

            fn from_components(components: &[f64]) -> Option<Self> {
                let mut it = components.iter().copied();
                let value = Self { $($field: it.next()?),+ };
                it.next().is_none().then_some(value)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&join(&self.components(), DEFAULT_SEPARATOR))
            }
        }

        impl FromStr for $name {
            type Err = ParseGeometryError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                split(s).ok_or(ParseGeometryError { type_name: stringify!($name) })
            }
        }
    };
}

geometry!(
    /// A position.
    Point { x, y }
);

geometry!(
    /// A size.
    Dimension { width, height }
);

geometry!(
    /// A position and size.
    Rectangle { x, y, width, height }
);

geometry!(
    /// Edge distances, clockwise from the top.
    Insets { top, right, bottom, left }
);

/// Converter for the [`Geometry`] types.
pub struct GeometryConverter<T> {
    _value: PhantomData<fn() -> T>,
}

impl<T> GeometryConverter<T> {
    /// Create a new converter.
    pub fn new() -> Self {
        Self { _value: PhantomData }
    }
}

impl<T> Default for GeometryConverter<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for GeometryConverter<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "GeometryConverter<{}>", std::any::type_name::<T>())
    }
}

impl<T: Geometry> ValueConverter<T> for GeometryConverter<T> {
    fn to_text(&self, value: &T, context: &ConverterContext) -> Result<String, ConvertError> {
        let components = value.components();
        if components.iter().any(|c| !c.is_finite()) {
            return Err(ConvertError::format::<T>("component is not finite"));
        }
        let separator = context.property(SEPARATOR_PROPERTY).unwrap_or(DEFAULT_SEPARATOR);
        Ok(join(&components, separator))
    }

    fn from_text(&self, text: &str, _context: &ConverterContext) -> Option<T> {
        split(text)
    }
}

/// An 8-bit RGBA color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    /// Create an opaque color.
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Create a color with alpha.
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Parse `#RGB`, `#RGBA`, `#RRGGBB` or `#RRGGBBAA`; the `#` is optional.
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.trim();
        let hex = hex.strip_prefix('#').unwrap_or(hex);
        if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return None;
        }
        let expanded: String = match hex.len() {
            3 | 4 => hex.chars().flat_map(|c| [c, c]).collect(),
            6 | 8 => hex.to_string(),
            _ => return None,
        };
        let byte = |i: usize| u8::from_str_radix(&expanded[i..i + 2], 16).ok();
        let a = if expanded.len() == 8 { byte(6)? } else { 255 };
        Some(Self::rgba(byte(0)?, byte(2)?, byte(4)?, a))
    }

    /// Render as hex. Alpha is written when requested or not opaque.
    pub fn to_hex(&self, uppercase: bool, include_alpha: bool) -> String {
        let mut bytes = vec![self.r, self.g, self.b];
        if include_alpha || self.a != 255 {
            bytes.push(self.a);
        }
        let digits: String = bytes
            .iter()
            .map(|b| {
                if uppercase {
                    format!("{:02X}", b)
                } else {
                    format!("{:02x}", b)
                }
            })
            .collect();
        format!("#{}", digits)
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex(true, false))
    }
}

impl FromStr for Color {
    type Err = ParseGeometryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s).ok_or(ParseGeometryError { type_name: "Color" })
    }
}

/// Hex converter for [`Color`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColorConverter {
    uppercase: bool,
    include_alpha: bool,
}

impl ColorConverter {
    /// Uppercase digits, alpha only when not opaque.
    pub fn new() -> Self {
        Self {
            uppercase: true,
            include_alpha: false,
        }
    }

    /// Use lowercase digits.
    pub fn lowercase(mut self) -> Self {
        self.uppercase = false;
        self
    }

    /// Always write the alpha channel.
    pub fn with_alpha(mut self) -> Self {
        self.include_alpha = true;
        self
    }
}

impl Default for ColorConverter {
    fn default() -> Self {
        Self::new()
    }
}

impl ValueConverter<Color> for ColorConverter {
    fn to_text(&self, value: &Color, _context: &ConverterContext) -> Result<String, ConvertError> {
        Ok(value.to_hex(self.uppercase, self.include_alpha))
    }

    fn from_text(&self, text: &str, _context: &ConverterContext) -> Option<Color> {
        Color::from_hex(text)
    }
}
