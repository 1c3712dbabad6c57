//! Converter for sequences of values.

use std::sync::Arc;

use super::{ConverterContext, ValueConverter};
use crate::error::ConvertError;

/// Separator written between elements.
pub const ELEMENT_SEPARATOR: &str = "; ";

/// Converter for `Vec<T>` built on an element converter.
///
/// Elements are joined with `"; "`. An element whose own text contains `;`
/// (a [`Point`](super::Point) renders as `"1; 2"`) or starts with `[` is
/// written inside brackets, so `[Point(1, 2), Point(3, 4)]` becomes
/// `"[1; 2]; [3; 4]"`. Parsing splits on `;` outside brackets, trims each
/// piece, strips one pair of enclosing brackets and fails as a whole if any
/// element fails. Empty text reads as an empty vector.
pub struct ArrayConverter<T> {
    element: Arc<dyn ValueConverter<T>>,
}

impl<T> ArrayConverter<T> {
    /// Wrap an element converter.
    pub fn new(element: Arc<dyn ValueConverter<T>>) -> Self {
        Self { element }
    }
}

impl<T> Clone for ArrayConverter<T> {
    fn clone(&self) -> Self {
        Self {
            element: Arc::clone(&self.element),
        }
    }
}

impl<T> std::fmt::Debug for ArrayConverter<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ArrayConverter<{}>", std::any::type_name::<T>())
    }
}

impl<T> ValueConverter<Vec<T>> for ArrayConverter<T> {
    fn to_text(&self, value: &Vec<T>, context: &ConverterContext) -> Result<String, ConvertError> {
        let parts = value
            .iter()
            .map(|v| self.element.to_text(v, context).map(enclose))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(parts.join(ELEMENT_SEPARATOR))
    }

    fn from_text(&self, text: &str, context: &ConverterContext) -> Option<Vec<T>> {
        if text.trim().is_empty() {
            return Some(Vec::new());
        }
        split_elements(text)
            .into_iter()
            .map(|part| self.element.from_text(unenclose(part.trim()), context))
            .collect()
    }
}

fn enclose(text: String) -> String {
    if text.contains(';') || text.starts_with('[') {
        format!("[{text}]")
    } else {
        text
    }
}

fn unenclose(text: &str) -> &str {
    text.strip_prefix('[')
        .and_then(|inner| inner.strip_suffix(']'))
        .unwrap_or(text)
}

/// Split on `;` at bracket depth zero.
fn split_elements(text: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for (i, ch) in text.char_indices() {
        match ch {
            '[' => depth += 1,
            ']' => depth = depth.saturating_sub(1),
            ';' if depth == 0 => {
                parts.push(&text[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(&text[start..]);
    parts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::converter::{DisplayConverter, GeometryConverter, Point, StringConverter};

    fn ints() -> ArrayConverter<i32> {
        ArrayConverter::new(Arc::new(DisplayConverter::<i32>::new()))
    }

    #[test]
    fn test_join_and_split() {
        let c = ints();
        let ctx = ConverterContext::default();
        assert_eq!(c.to_text(&vec![1, 2, 3], &ctx).unwrap(), "1; 2; 3");
        assert_eq!(c.from_text("1;2 ;  3", &ctx), Some(vec![1, 2, 3]));
        assert_eq!(c.from_text("", &ctx), Some(vec![]));
    }

    #[test]
    fn test_elements_containing_separator_are_bracketed() {
        let points = ArrayConverter::new(Arc::new(GeometryConverter::<Point>::new()));
        let ctx = ConverterContext::default();
        let value = vec![Point::new(1.0, 2.0), Point::new(3.0, 4.0)];

        let text = points.to_text(&value, &ctx).unwrap();
        assert_eq!(text, "[1; 2]; [3; 4]");
        assert_eq!(points.from_text(&text, &ctx), Some(value));
        assert_eq!(points.from_text("[1; 2]", &ctx), Some(vec![Point::new(1.0, 2.0)]));
    }

    #[test]
    fn test_bracketed_text_elements() {
        let strings = ArrayConverter::new(Arc::new(StringConverter));
        let ctx = ConverterContext::default();
        let value = vec!["a;b".to_string(), "[c]".to_string(), "d".to_string()];

        let text = strings.to_text(&value, &ctx).unwrap();
        assert_eq!(text, "[a;b]; [[c]]; d");
        assert_eq!(strings.from_text(&text, &ctx), Some(value));
    }

    #[test]
    fn test_one_bad_element_fails_all() {
        assert_eq!(ints().from_text("1; x; 3", &ConverterContext::default()), None);
    }
}
