//! Group grammars derived from field patterns.
//!
//! A pattern such as `"h.h.h.h"` or `"yyyy-MM-dd"` is split into *groups*
//! (substrings equal to a registered verifier name) and *literal text*
//! (everything else). The grammar turns that split into an anchored regular
//! expression with one capture per group, which can then partition any
//! candidate text into named ranges.
//!
//! # Derivation
//!
//! 1. The pattern is tokenized left to right. Names are tried longest first,
//!    so `"y"` never matches inside `"yyyy"`.
//! 2. Literal text is escaped. Each group becomes `(.*)`.
//! 3. The pattern is matched against its own expression. Every capture must
//!    reproduce its group name exactly.
//! 4. If that fails, groups that declare a [`LengthHint`] become
//!    `(.{min,max})` and the check is repeated. If it still fails the
//!    pattern is rejected with [`GrammarError::AmbiguousGrammar`].
//!
//! There is no escape syntax: a literal character that equals a group name
//! is read as that group. Choose group names that do not occur as literals.
//!
//! # Example
//!
//! ```
//! use horizon_fields::grammar::{GrammarKey, GroupGrammar};
//!
//! let key = GrammarKey::new("h.h.h.h", [("h", None)]);
//! let grammar = GroupGrammar::compile(&key).unwrap();
//!
//! let groups = grammar.match_groups("192.168.0.1").unwrap();
//! let texts: Vec<_> = groups.iter().map(|g| g.text("192.168.0.1")).collect();
//! assert_eq!(texts, ["192", "168", "0", "1"]);
//! ```

mod cache;

pub use cache::{GrammarCache, grammar_cache};

use horizon_fields_core::logging::{PerfSpan, span_names, targets};
use regex::Regex;

use crate::error::GrammarError;

/// Declared character length bounds for a group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LengthHint {
    /// Minimum number of characters of complete group text.
    pub min: usize,
    /// Maximum number of characters of group text.
    pub max: usize,
}

impl LengthHint {
    /// Create a length hint, swapping the bounds if given in reverse.
    pub fn new(min: usize, max: usize) -> Self {
        Self {
            min: min.min(max),
            max: min.max(max),
        }
    }

    /// A hint for groups that are always exactly `len` characters.
    pub fn exact(len: usize) -> Self {
        Self::new(len, len)
    }

    /// Check whether a character count satisfies this hint.
    pub fn contains(&self, len: usize) -> bool {
        (self.min..=self.max).contains(&len)
    }
}

/// Identity of a compiled grammar: the pattern plus the group names and hints.
///
/// Groups are kept sorted by name, so two keys built from the same
/// registrations in a different order compare equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GrammarKey {
    pattern: String,
    groups: Vec<(String, Option<LengthHint>)>,
}

impl GrammarKey {
    /// Build a key from a pattern and its `(name, hint)` registrations.
    pub fn new<I, S>(pattern: impl Into<String>, groups: I) -> Self
    where
        I: IntoIterator<Item = (S, Option<LengthHint>)>,
        S: Into<String>,
    {
        let mut groups: Vec<_> = groups.into_iter().map(|(n, h)| (n.into(), h)).collect();
        groups.sort_by(|a, b| a.0.cmp(&b.0));
        groups.dedup_by(|a, b| a.0 == b.0);
        Self {
            pattern: pattern.into(),
            groups,
        }
    }

    /// The pattern string.
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    fn hint_for(&self, name: &str) -> Option<LengthHint> {
        self.groups
            .iter()
            .find(|(n, _)| n == name)
            .and_then(|(_, h)| *h)
    }
}

/// One piece of a tokenized pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PatternToken {
    /// Text copied verbatim into the field.
    Literal(String),
    /// Placeholder for the group with this name.
    Group(String),
}

/// A named range of a matched text, in character indices.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupMatch {
    /// Group name.
    pub name: String,
    /// Index of the group among the pattern's groups.
    pub index: usize,
    /// First character of the group.
    pub start: usize,
    /// One past the last character of the group.
    pub end: usize,
}

impl GroupMatch {
    /// Number of characters in the group.
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    /// Whether the group currently holds no text.
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Whether `pos` lies inside the group or on either of its edges.
    pub fn touches(&self, pos: usize) -> bool {
        (self.start..=self.end).contains(&pos)
    }

    /// Slice this group's text out of the text it was matched against.
    pub fn text<'a>(&self, text: &'a str) -> &'a str {
        let begin = char_to_byte(text, self.start);
        let end = char_to_byte(text, self.end);
        &text[begin..end]
    }
}

/// A compiled, immutable grammar for one pattern.
#[derive(Debug, Clone)]
pub struct GroupGrammar {
    pattern: String,
    tokens: Vec<PatternToken>,
    groups: Vec<String>,
    /// Expression used to check the pattern itself.
    strict: Regex,
    /// Expression used while editing; hinted groups may be shorter than `min`.
    editing: Regex,
    hinted: bool,
}

impl GroupGrammar {
    /// Derive the grammar for a key.
    ///
    /// Fails with [`GrammarError`] if the pattern is empty, has no groups, or
    /// cannot be partitioned even with the declared length hints.
    pub fn compile(key: &GrammarKey) -> Result<Self, GrammarError> {
        let _span = PerfSpan::new(span_names::GRAMMAR_COMPILE);
        let pattern = key.pattern();
        if pattern.is_empty() {
            return Err(GrammarError::EmptyPattern);
        }

        let tokens = tokenize(pattern, key.groups.iter().map(|(n, _)| n.as_str()));
        let groups: Vec<String> = tokens
            .iter()
            .filter_map(|t| match t {
                PatternToken::Group(name) => Some(name.clone()),
                PatternToken::Literal(_) => None,
            })
            .collect();
        if groups.is_empty() {
            return Err(GrammarError::NoGroups {
                pattern: pattern.to_string(),
            });
        }

        let wildcard = build_regex(pattern, &tokens, |_| None)?;
        if let Err(first) = self_match(&wildcard, pattern, &groups) {
            tracing::debug!(
                target: targets::GRAMMAR,
                pattern,
                reason = %first,
                "wildcard grammar rejected, retrying with length hints"
            );
            let hint = |name: &str| key.hint_for(name);
            let hinted = build_regex(pattern, &tokens, hint)?;
            return match self_match(&hinted, pattern, &groups) {
                Ok(()) => {
                    let editing = build_regex(pattern, &tokens, |name| {
                        hint(name).map(|h| LengthHint::new(0, h.max))
                    })?;
                    tracing::debug!(target: targets::GRAMMAR, pattern, "compiled hinted grammar");
                    Ok(Self {
                        pattern: pattern.to_string(),
                        tokens,
                        groups,
                        strict: hinted,
                        editing,
                        hinted: true,
                    })
                }
                Err(reason) => Err(GrammarError::ambiguous(pattern, reason)),
            };
        }

        tracing::debug!(target: targets::GRAMMAR, pattern, "compiled wildcard grammar");
        Ok(Self {
            pattern: pattern.to_string(),
            tokens,
            groups,
            strict: wildcard.clone(),
            editing: wildcard,
            hinted: false,
        })
    }

    /// The pattern this grammar was derived from.
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// The tokenized pattern.
    pub fn tokens(&self) -> &[PatternToken] {
        &self.tokens
    }

    /// Group names in left-to-right order. A name used twice appears twice.
    pub fn group_names(&self) -> &[String] {
        &self.groups
    }

    /// Whether the grammar needed length hints to disambiguate its groups.
    pub fn is_hinted(&self) -> bool {
        self.hinted
    }

    /// The derived expression used for editing, as a string.
    pub fn as_regex_str(&self) -> &str {
        self.editing.as_str()
    }

    /// The pattern's literal text with every group left empty.
    ///
    /// This is what a field with no value displays.
    pub fn literal_skeleton(&self) -> String {
        self.tokens
            .iter()
            .filter_map(|t| match t {
                PatternToken::Literal(s) => Some(s.as_str()),
                PatternToken::Group(_) => None,
            })
            .collect()
    }

    /// Partition `text` into groups.
    ///
    /// Returns `None` if the text does not have the pattern's shape, that is
    /// its literal text is missing or a group exceeds its hinted length.
    /// Groups may be empty or shorter than their hinted minimum.
    pub fn match_groups(&self, text: &str) -> Option<Vec<GroupMatch>> {
        Self::captures(&self.editing, &self.groups, text)
    }

    /// Partition `text`, additionally requiring hinted groups to reach their
    /// minimum length.
    pub fn match_complete(&self, text: &str) -> Option<Vec<GroupMatch>> {
        Self::captures(&self.strict, &self.groups, text)
    }

    /// The group containing the caret, if any.
    ///
    /// A caret on the boundary of two abutting groups belongs to the group on
    /// its right, unless that group is at the end of the text.
    pub fn group_at(&self, text: &str, caret: usize) -> Option<GroupMatch> {
        let groups = self.match_groups(text)?;
        let inside = groups
            .iter()
            .position(|g| g.start <= caret && caret < g.end);
        let index = inside.or_else(|| groups.iter().position(|g| g.touches(caret)))?;
        groups.into_iter().nth(index)
    }

    fn captures(regex: &Regex, names: &[String], text: &str) -> Option<Vec<GroupMatch>> {
        let caps = regex.captures(text)?;
        let mut out = Vec::with_capacity(names.len());
        for (index, name) in names.iter().enumerate() {
            let m = caps.get(index + 1)?;
            out.push(GroupMatch {
                name: name.clone(),
                index,
                start: byte_to_char(text, m.start()),
                end: byte_to_char(text, m.end()),
            });
        }
        Some(out)
    }
}

fn tokenize<'a>(pattern: &str, names: impl Iterator<Item = &'a str>) -> Vec<PatternToken> {
    let mut names: Vec<&str> = names.filter(|n| !n.is_empty()).collect();
    names.sort_by(|a, b| b.len().cmp(&a.len()).then(a.cmp(b)));

    let mut tokens = Vec::new();
    let mut literal = String::new();
    let mut rest = pattern;
    while !rest.is_empty() {
        if let Some(name) = names.iter().find(|n| rest.starts_with(**n)) {
            if !literal.is_empty() {
                tokens.push(PatternToken::Literal(std::mem::take(&mut literal)));
            }
            tokens.push(PatternToken::Group((*name).to_string()));
            rest = &rest[name.len()..];
        } else {
            let mut chars = rest.chars();
            if let Some(c) = chars.next() {
                literal.push(c);
            }
            rest = chars.as_str();
        }
    }
    if !literal.is_empty() {
        tokens.push(PatternToken::Literal(literal));
    }
    tokens
}

fn build_regex<F>(pattern: &str, tokens: &[PatternToken], hint: F) -> Result<Regex, GrammarError>
where
    F: Fn(&str) -> Option<LengthHint>,
{
    let mut expr = String::from("^");
    for token in tokens {
        match token {
            PatternToken::Literal(s) => expr.push_str(&regex::escape(s)),
            PatternToken::Group(name) => match hint(name) {
                Some(h) => expr.push_str(&format!("(.{{{},{}}})", h.min, h.max)),
                None => expr.push_str("(.*)"),
            },
        }
    }
    expr.push('$');
    Regex::new(&expr).map_err(|source| GrammarError::Regex {
        pattern: pattern.to_string(),
        source,
    })
}

/// Check that the pattern partitions into exactly its own group names.
fn self_match(regex: &Regex, pattern: &str, groups: &[String]) -> Result<(), String> {
    let caps = regex
        .captures(pattern)
        .ok_or_else(|| format!("expression {} does not match the pattern", regex.as_str()))?;
    for (i, name) in groups.iter().enumerate() {
        let got = caps.get(i + 1).map(|m| m.as_str()).unwrap_or_default();
        if got.is_empty() {
            return Err(format!("group {} ('{}') captured no text", i + 1, name));
        }
        if got != name {
            return Err(format!("group {} captured '{}' instead of '{}'", i + 1, got, name));
        }
    }
    Ok(())
}

pub(crate) fn char_to_byte(text: &str, index: usize) -> usize {
    text.char_indices()
        .nth(index)
        .map(|(b, _)| b)
        .unwrap_or(text.len())
}

fn byte_to_char(text: &str, byte: usize) -> usize {
    text[..byte].chars().count()
}
