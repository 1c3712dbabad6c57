//! Fixed-width character masks.
//!
//! A [`Mask`] maps every position of the text to exactly one mask character.
//! A [`MaskEngine`] holds the text being edited under a mask, with a caret.
//!
//! # Mask Characters
//!
//! | Char | Accepts |
//! |------|---------|
//! | `A`  | Letter |
//! | `N`  | Letter or digit |
//! | `X`  | Any non-space character |
//! | `H`  | Hex digit (0-9, A-F, a-f) |
//! | `D`  | Digit 1-9 |
//! | `9`  | Digit 0-9 |
//! | `8`..`1` | Digit from 0 up to the mask character |
//! | `0`  | Only `0` |
//!
//! Every other character is literal text that is shown but never edited.
//!
//! # Conversion and Required Masks
//!
//! Two optional strings of the same length as the mask refine each position:
//!
//! - conversion: `U` uppercases, `L` lowercases, `_` leaves the character alone
//! - required: `R` must be filled, `_` may stay blank. Without one, every
//!   editable position is required.
//!
//! # Example
//!
//! ```
//! use horizon_fields::mask::MaskEngine;
//!
//! let mut phone = MaskEngine::new("(999) 999-9999").unwrap();
//! assert_eq!(phone.text(), "(___) ___-____");
//!
//! phone.insert_str("5551234567");
//! assert_eq!(phone.text(), "(555) 123-4567");
//! assert_eq!(phone.input_text(), "5551234567");
//! assert!(phone.is_complete());
//! ```

use std::fmt;

use horizon_fields_core::Signal;
use horizon_fields_core::logging::targets;

use crate::error::MaskError;

/// Placeholder shown in unfilled positions unless configured otherwise.
pub const DEFAULT_PLACEHOLDER: char = '_';

/// Case conversion applied to a typed character.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CaseMode {
    /// No case conversion.
    #[default]
    None,
    /// Convert to uppercase.
    Upper,
    /// Convert to lowercase.
    Lower,
}

impl CaseMode {
    fn from_mask_char(c: char) -> Option<Self> {
        match c {
            'U' => Some(Self::Upper),
            'L' => Some(Self::Lower),
            '_' => Some(Self::None),
            _ => None,
        }
    }

    /// Apply the conversion to `ch`.
    pub fn apply(self, ch: char) -> char {
        match self {
            CaseMode::None => ch,
            CaseMode::Upper => ch.to_uppercase().next().unwrap_or(ch),
            CaseMode::Lower => ch.to_lowercase().next().unwrap_or(ch),
        }
    }
}

/// Character class of an editable position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CharClass {
    /// Letter - mask char: A
    Letter,
    /// Letter or digit - mask char: N
    Alphanumeric,
    /// Any non-space character - mask char: X
    NonSpace,
    /// Hexadecimal (0-9, A-F, a-f) - mask char: H
    Hex,
    /// Non-zero digit (1-9) - mask char: D
    NonZeroDigit,
    /// Digit (0-9) - mask char: 9
    Digit,
    /// Digit no greater than the bound - mask chars: 8 down to 0
    DigitUpTo(u8),
}

impl CharClass {
    fn from_mask_char(c: char) -> Option<Self> {
        Some(match c {
            'A' => Self::Letter,
            'N' => Self::Alphanumeric,
            'X' => Self::NonSpace,
            'H' => Self::Hex,
            'D' => Self::NonZeroDigit,
            '9' => Self::Digit,
            '0'..='8' => Self::DigitUpTo(c as u8 - b'0'),
            _ => return None,
        })
    }

    /// Check if a character belongs to this character class.
    pub fn accepts(&self, ch: char) -> bool {
        match self {
            CharClass::Letter => ch.is_alphabetic(),
            CharClass::Alphanumeric => ch.is_alphanumeric(),
            CharClass::NonSpace => !ch.is_whitespace(),
            CharClass::Hex => ch.is_ascii_hexdigit(),
            CharClass::NonZeroDigit => ch.is_ascii_digit() && ch != '0',
            CharClass::Digit => ch.is_ascii_digit(),
            CharClass::DigitUpTo(max) => ch
                .to_digit(10)
                .is_some_and(|d| d <= u32::from(*max)),
        }
    }
}

/// One position of a parsed mask.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MaskElement {
    /// A literal character that is displayed but cannot be edited.
    Literal(char),
    /// An editable position.
    Slot {
        class: CharClass,
        case: CaseMode,
        required: bool,
    },
}

impl MaskElement {
    /// Returns true if this element is a literal (separator).
    pub fn is_literal(&self) -> bool {
        matches!(self, MaskElement::Literal(_))
    }

    /// Returns true if this element can accept user input (not a literal).
    pub fn is_editable(&self) -> bool {
        !self.is_literal()
    }

    /// Returns true if this element must be filled.
    pub fn is_required(&self) -> bool {
        matches!(self, MaskElement::Slot { required: true, .. })
    }

    /// Convert `ch` for this position and check it.
    ///
    /// Returns the character to store, or `None` if it is rejected.
    pub fn admit(&self, ch: char) -> Option<char> {
        match self {
            MaskElement::Literal(lit) => (ch == *lit).then_some(ch),
            MaskElement::Slot { class, case, .. } => {
                let converted = case.apply(ch);
                class.accepts(converted).then_some(converted)
            }
        }
    }
}

/// A parsed character mask.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mask {
    pattern: String,
    elements: Vec<MaskElement>,
    placeholder: char,
}

impl Mask {
    /// Parse `pattern` with every editable position required.
    pub fn new(pattern: &str) -> Result<Self, MaskError> {
        Self::with_masks(pattern, None, None)
    }

    /// Parse `pattern` with optional conversion and required masks.
    ///
    /// Characters of the conversion mask other than `U` and `L` mean "leave
    /// alone"; characters of the required mask other than `R` mean "optional".
    pub fn with_masks(
        pattern: &str,
        conversion: Option<&str>,
        required: Option<&str>,
    ) -> Result<Self, MaskError> {
        if pattern.is_empty() {
            return Err(MaskError::EmptyMask);
        }
        let len = pattern.chars().count();
        let conversion = Self::aligned("conversion", conversion, len)?;
        let required = Self::aligned("required", required, len)?;

        let elements = pattern
            .chars()
            .enumerate()
            .map(|(i, c)| match CharClass::from_mask_char(c) {
                Some(class) => MaskElement::Slot {
                    class,
                    case: conversion
                        .as_ref()
                        .and_then(|m| CaseMode::from_mask_char(m[i]))
                        .unwrap_or_default(),
                    required: required.as_ref().is_none_or(|m| m[i] == 'R'),
                },
                None => MaskElement::Literal(c),
            })
            .collect();

        Ok(Self {
            pattern: pattern.to_string(),
            elements,
            placeholder: DEFAULT_PLACEHOLDER,
        })
    }

    fn aligned(which: &'static str, mask: Option<&str>, expected: usize) -> Result<Option<Vec<char>>, MaskError> {
        let Some(mask) = mask else {
            return Ok(None);
        };
        let chars: Vec<char> = mask.chars().collect();
        if chars.len() != expected {
            return Err(MaskError::LengthMismatch {
                which,
                expected,
                actual: chars.len(),
            });
        }
        Ok(Some(chars))
    }

    /// Use `placeholder` for unfilled positions.
    pub fn with_placeholder(mut self, placeholder: char) -> Self {
        self.placeholder = placeholder;
        self
    }

    /// Get the original pattern string.
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Get the placeholder character.
    pub fn placeholder(&self) -> char {
        self.placeholder
    }

    /// Get the number of positions.
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    /// Always false; empty masks are rejected at parse time.
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// The parsed positions.
    pub fn elements(&self) -> &[MaskElement] {
        &self.elements
    }

    /// Get the mask element at a given position.
    pub fn element_at(&self, pos: usize) -> Option<&MaskElement> {
        self.elements.get(pos)
    }

    /// Get the number of editable positions (non-literal).
    pub fn editable_count(&self) -> usize {
        self.elements.iter().filter(|e| e.is_editable()).count()
    }

    /// Find the next editable position at or after the given position.
    pub fn next_editable_pos(&self, from: usize) -> Option<usize> {
        (from..self.elements.len()).find(|&i| self.elements[i].is_editable())
    }

    /// Find the previous editable position before the given position.
    pub fn prev_editable_pos(&self, from: usize) -> Option<usize> {
        (0..from.min(self.elements.len()))
            .rev()
            .find(|&i| self.elements[i].is_editable())
    }

    /// Whether `ch` may be placed at `pos`, after conversion.
    pub fn accepts(&self, ch: char, pos: usize) -> bool {
        self.elements.get(pos).and_then(|e| e.admit(ch)).is_some()
    }

    /// The text of a mask with nothing filled in.
    pub fn blank_text(&self) -> String {
        self.elements
            .iter()
            .map(|e| match e {
                MaskElement::Literal(c) => *c,
                MaskElement::Slot { .. } => self.placeholder,
            })
            .collect()
    }
}

impl fmt::Display for Mask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.pattern)
    }
}

/// Text being edited under a [`Mask`].
///
/// The text always has exactly one character per mask position. Positions
/// are character indices.
pub struct MaskEngine {
    mask: Mask,
    buffer: Vec<char>,
    cursor_pos: usize,

    /// Signal emitted with the new text whenever it changes.
    pub text_changed: Signal<String>,
}

impl MaskEngine {
    /// Create an engine for `pattern` with every position required.
    pub fn new(pattern: &str) -> Result<Self, MaskError> {
        Ok(Self::with_mask(Mask::new(pattern)?))
    }

    /// Create an engine for an already parsed mask.
    pub fn with_mask(mask: Mask) -> Self {
        let buffer = mask.blank_text().chars().collect();
        let cursor_pos = mask.next_editable_pos(0).unwrap_or(0);
        Self {
            mask,
            buffer,
            cursor_pos,
            text_changed: Signal::new(),
        }
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// The mask.
    pub fn mask(&self) -> &Mask {
        &self.mask
    }

    /// The full text, literals and placeholders included.
    pub fn text(&self) -> String {
        self.buffer.iter().collect()
    }

    /// The filled editable characters, without literals or placeholders.
    pub fn input_text(&self) -> String {
        self.buffer
            .iter()
            .zip(&self.mask.elements)
            .filter(|(c, e)| e.is_editable() && **c != self.mask.placeholder)
            .map(|(c, _)| *c)
            .collect()
    }

    /// Whether every required position is filled.
    pub fn is_complete(&self) -> bool {
        self.buffer
            .iter()
            .zip(&self.mask.elements)
            .all(|(c, e)| !e.is_required() || *c != self.mask.placeholder)
    }

    /// Whether `ch` may be placed at `pos`, after conversion.
    pub fn accepts(&self, ch: char, pos: usize) -> bool {
        self.mask.accepts(ch, pos)
    }

    // =========================================================================
    // Caret
    // =========================================================================

    /// Caret position.
    pub fn cursor_position(&self) -> usize {
        self.cursor_pos
    }

    /// Move the caret, clamped to the text.
    pub fn set_cursor_position(&mut self, pos: usize) {
        self.cursor_pos = pos.min(self.buffer.len());
    }

    /// Move the caret to the previous editable position.
    pub fn cursor_backward(&mut self) {
        if let Some(pos) = self.mask.prev_editable_pos(self.cursor_pos) {
            self.cursor_pos = pos;
        }
    }

    /// Move the caret past the next editable position.
    pub fn cursor_forward(&mut self) {
        if let Some(pos) = self.mask.next_editable_pos(self.cursor_pos) {
            self.cursor_pos = pos + 1;
        }
    }

    /// Move the caret to the first editable position.
    pub fn home(&mut self) {
        self.cursor_pos = self.mask.next_editable_pos(0).unwrap_or(0);
    }

    /// Move the caret to the end of the text.
    pub fn end(&mut self) {
        self.cursor_pos = self.buffer.len();
    }

    // =========================================================================
    // Editing
    // =========================================================================

    /// Type one character at the caret.
    ///
    /// The character is converted first. Literal positions that reject it are
    /// skipped; a typed literal that matches the position is passed through.
    /// Returns whether the character was placed or passed through.
    pub fn insert(&mut self, ch: char) -> bool {
        let mut pos = self.cursor_pos;
        while let Some(element) = self.mask.elements.get(pos) {
            match (element, element.admit(ch)) {
                (MaskElement::Literal(_), Some(_)) => {
                    self.cursor_pos = pos + 1;
                    return true;
                }
                (MaskElement::Literal(_), None) => pos += 1,
                (MaskElement::Slot { .. }, Some(stored)) => {
                    self.write(pos, stored);
                    self.cursor_pos = pos + 1;
                    return true;
                }
                (MaskElement::Slot { .. }, None) => break,
            }
        }
        tracing::trace!(target: targets::MASK, ch = %ch, pos, "character rejected");
        false
    }

    /// Type `text` at the caret. Returns how many characters were placed.
    pub fn insert_str(&mut self, text: &str) -> usize {
        text.chars().filter(|c| self.insert(*c)).count()
    }

    /// Blank the editable position before the caret, skipping literals.
    pub fn delete_backward(&mut self) -> bool {
        let Some(pos) = self.mask.prev_editable_pos(self.cursor_pos) else {
            return false;
        };
        self.cursor_pos = pos;
        self.write(pos, self.mask.placeholder);
        true
    }

    /// Blank the editable position at or after the caret, skipping literals.
    pub fn delete_forward(&mut self) -> bool {
        let Some(pos) = self.mask.next_editable_pos(self.cursor_pos) else {
            return false;
        };
        self.cursor_pos = pos;
        self.write(pos, self.mask.placeholder);
        true
    }

    /// Reset to the placeholder-filled text.
    pub fn clear(&mut self) {
        self.replace_buffer(self.mask.blank_text().chars().collect());
        self.home();
    }

    /// Replace the whole text.
    ///
    /// Text as long as the mask is read position by position: literals must
    /// match and placeholders leave a position blank. Shorter text fills the
    /// editable positions in order, skipping literals it repeats. Nothing
    /// changes if any character is rejected.
    pub fn set_text(&mut self, text: &str) -> Result<(), MaskError> {
        let chars: Vec<char> = text.chars().collect();
        let buffer = if chars.len() == self.mask.len() {
            self.positional(&chars)?
        } else {
            self.sequential(&chars)?
        };
        self.replace_buffer(buffer);
        self.end();
        Ok(())
    }

    fn positional(&self, chars: &[char]) -> Result<Vec<char>, MaskError> {
        chars
            .iter()
            .zip(&self.mask.elements)
            .enumerate()
            .map(|(position, (&ch, element))| match element {
                MaskElement::Slot { .. } if ch == self.mask.placeholder => Ok(ch),
                _ => element.admit(ch).ok_or(MaskError::Rejected { position, ch }),
            })
            .collect()
    }

    fn sequential(&self, chars: &[char]) -> Result<Vec<char>, MaskError> {
        let mut buffer: Vec<char> = self.mask.blank_text().chars().collect();
        let mut pos = 0;
        for &ch in chars {
            loop {
                let Some(element) = self.mask.elements.get(pos) else {
                    return Err(MaskError::Rejected { position: pos, ch });
                };
                match element {
                    MaskElement::Literal(lit) if *lit == ch => {
                        pos += 1;
                        break;
                    }
                    MaskElement::Literal(_) => pos += 1,
                    MaskElement::Slot { .. } => {
                        buffer[pos] = element
                            .admit(ch)
                            .ok_or(MaskError::Rejected { position: pos, ch })?;
                        pos += 1;
                        break;
                    }
                }
            }
        }
        Ok(buffer)
    }

    fn write(&mut self, pos: usize, ch: char) {
        if self.buffer[pos] != ch {
            self.buffer[pos] = ch;
            self.text_changed.emit(self.text());
        }
    }

    fn replace_buffer(&mut self, buffer: Vec<char>) {
        if self.buffer != buffer {
            self.buffer = buffer;
            self.text_changed.emit(self.text());
        }
    }
}

impl fmt::Debug for MaskEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MaskEngine")
            .field("mask", &self.mask.pattern)
            .field("text", &self.text())
            .field("cursor_pos", &self.cursor_pos)
            .finish_non_exhaustive()
    }
}

static_assertions::assert_impl_all!(MaskEngine: Send, Sync);

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    // =========================================================================
    // Parsing
    // =========================================================================

    #[test]
    fn test_parse_simple_mask() {
        let mask = Mask::new("999-999-9999").unwrap();
        assert_eq!(mask.len(), 12);
        assert_eq!(mask.editable_count(), 10);
        assert_eq!(mask.placeholder(), '_');
        assert_eq!(mask.blank_text(), "___-___-____");
    }

    #[test]
    fn test_mask_errors() {
        assert_eq!(Mask::new(""), Err(MaskError::EmptyMask));
        assert_eq!(
            Mask::with_masks("AAA", Some("UU"), None),
            Err(MaskError::LengthMismatch {
                which: "conversion",
                expected: 3,
                actual: 2
            })
        );
        assert!(matches!(
            Mask::with_masks("AAA", None, Some("RRRR")),
            Err(MaskError::LengthMismatch { which: "required", .. })
        ));
    }

    #[test]
    fn test_char_classes() {
        assert!(CharClass::Digit.accepts('9'));
        assert!(!CharClass::NonZeroDigit.accepts('0'));
        assert!(CharClass::Hex.accepts('F'));
        assert!(!CharClass::Hex.accepts('g'));
        assert!(!CharClass::NonSpace.accepts(' '));
        assert!(CharClass::Alphanumeric.accepts('7'));
        assert!(!CharClass::Letter.accepts('5'));
    }

    #[test]
    fn test_capped_digits() {
        let mask = Mask::new("50").unwrap();
        assert!(mask.accepts('5', 0));
        assert!(!mask.accepts('6', 0));
        assert!(mask.accepts('0', 1));
        assert!(!mask.accepts('1', 1));
    }

    // =========================================================================
    // Editing
    // =========================================================================

    #[test]
    fn test_phone_auto_advance() {
        let mut engine = MaskEngine::new("(999) 999-9999").unwrap();
        assert_eq!(engine.cursor_position(), 1);
        assert_eq!(engine.insert_str("555"), 3);
        assert_eq!(engine.text(), "(555) ___-____");
        assert!(engine.insert('1'));
        assert_eq!(engine.text(), "(555) 1__-____");
        assert_eq!(engine.cursor_position(), 7);
        assert!(!engine.is_complete());
    }

    #[test]
    fn test_typed_literal_passes_through() {
        let mut engine = MaskEngine::new("(999) 999-9999").unwrap();
        engine.insert_str("555) 123-4567");
        assert_eq!(engine.text(), "(555) 123-4567");
        assert!(engine.is_complete());
    }

    #[test]
    fn test_rejected_char_does_not_skip_slot() {
        let mut engine = MaskEngine::new("99-99").unwrap();
        assert!(!engine.insert('x'));
        assert_eq!(engine.cursor_position(), 0);
        assert_eq!(engine.text(), "__-__");
    }

    #[test]
    fn test_conversion_mask_uppercases() {
        let mask = Mask::with_masks("AAA-999", Some("UUL____"), None).unwrap();
        let mut engine = MaskEngine::with_mask(mask);
        engine.insert_str("abC123");
        assert_eq!(engine.text(), "ABc-123");
    }

    #[test]
    fn test_delete_writes_placeholder() {
        let mut engine = MaskEngine::new("99-99").unwrap();
        engine.insert_str("1234");
        assert!(engine.delete_backward());
        assert_eq!(engine.text(), "12-3_");
        assert!(engine.delete_backward());
        assert_eq!(engine.text(), "12-__");
        assert_eq!(engine.cursor_position(), 3);
        assert!(engine.delete_backward());
        assert_eq!(engine.text(), "1_-__");
        assert_eq!(engine.cursor_position(), 1);

        engine.set_cursor_position(0);
        assert!(engine.delete_forward());
        assert_eq!(engine.text(), "__-__");
    }

    #[test]
    fn test_required_mask() {
        let mask = Mask::with_masks("99-99", None, Some("RR___")).unwrap();
        let mut engine = MaskEngine::with_mask(mask);
        assert!(!engine.is_complete());
        engine.insert_str("12");
        assert!(engine.is_complete());
        assert_eq!(engine.input_text(), "12");
    }

    #[test]
    fn test_set_text_and_clear() {
        let mut engine = MaskEngine::new("99-99").unwrap();
        engine.set_text("12-34").unwrap();
        assert_eq!(engine.text(), "12-34");
        engine.set_text("5678").unwrap();
        assert_eq!(engine.text(), "56-78");
        assert_eq!(engine.set_text("12-3x"), Err(MaskError::Rejected { position: 4, ch: 'x' }));
        assert_eq!(engine.text(), "56-78");
        engine.set_text("1_-__").unwrap();
        assert_eq!(engine.input_text(), "1");

        engine.clear();
        assert_eq!(engine.text(), "__-__");
        assert_eq!(engine.cursor_position(), 0);
    }

    #[test]
    fn test_text_changed_fires_on_change() {
        let mut engine = MaskEngine::new("99").unwrap();
        let count = Arc::new(AtomicUsize::new(0));
        let c = count.clone();
        engine.text_changed.connect(move |_| {
            c.fetch_add(1, Ordering::SeqCst);
        });

        engine.insert('1');
        engine.set_cursor_position(0);
        engine.insert('1');
        engine.clear();
        engine.clear();
        assert_eq!(count.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_caret_navigation() {
        let mut engine = MaskEngine::new("(99)").unwrap();
        engine.end();
        assert_eq!(engine.cursor_position(), 4);
        engine.cursor_backward();
        assert_eq!(engine.cursor_position(), 2);
        engine.cursor_backward();
        assert_eq!(engine.cursor_position(), 1);
        engine.cursor_forward();
        assert_eq!(engine.cursor_position(), 2);
        engine.home();
        assert_eq!(engine.cursor_position(), 1);
    }
}
