//! Pattern-driven editing of typed values.
//!
//! An [`EditEngine`] owns the display text of one field and the typed value
//! behind it. The text is shaped by a pattern such as `"h.h.h.h"`: every
//! group is checked by its [`GroupVerifier`] on each keystroke, and the
//! literal text between groups can be typed over but never removed.
//!
//! The value only changes on [`commit`](EditEngine::commit), on an
//! adjustment, or through [`set_value`](EditEngine::set_value). A commit that
//! the converter cannot read restores the text of the last good value.
//!
//! # Example
//!
//! ```
//! use std::net::Ipv4Addr;
//! use horizon_fields::converter::DisplayConverter;
//! use horizon_fields::edit::EditEngine;
//! use horizon_fields::verifier::BoundedIntegerVerifier;
//!
//! let mut engine = EditEngine::builder("h.h.h.h", DisplayConverter::<Ipv4Addr>::new())
//!     .verifier("h", BoundedIntegerVerifier::new(0, 255))
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(engine.text(), "...");
//! engine.insert("192.168.0.1");
//! assert!(engine.commit());
//! assert_eq!(engine.value(), Some(Ipv4Addr::new(192, 168, 0, 1)));
//! ```

use std::collections::HashMap;
use std::fmt;
use std::ops::Range;
use std::sync::Arc;

use horizon_fields_core::logging::{PerfSpan, span_names, targets};
use horizon_fields_core::{Property, Signal};

use crate::converter::{ConverterContext, ValueConverter};
use crate::error::GrammarError;
use crate::grammar::{GrammarKey, GroupGrammar, GroupMatch, char_to_byte, grammar_cache};
use crate::verifier::{Adjustment, Capability, GroupValue, GroupVerifier};

/// Lifecycle of an edit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EditState {
    /// Text shows the committed value.
    #[default]
    Idle,
    /// Text has uncommitted changes.
    Editing,
    /// A commit is converting the text.
    Committing,
}

/// Behavior switches for an [`EditEngine`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EditConfig {
    /// Retry a rejected character at later positions.
    pub auto_advance: bool,
    /// Try overwriting the character at the caret when inserting fails.
    pub overwrite: bool,
    /// Commit pending edits before moving to another group.
    pub commit_on_navigation: bool,
    /// Whether `increase_value`/`decrease_value` wrap around at the range ends.
    pub wrap: bool,
}

impl EditConfig {
    /// Create the default configuration.
    pub fn new() -> Self {
        Self {
            auto_advance: true,
            overwrite: true,
            commit_on_navigation: true,
            wrap: false,
        }
    }

    /// Set `auto_advance`.
    pub fn auto_advance(mut self, enabled: bool) -> Self {
        self.auto_advance = enabled;
        self
    }

    /// Set `overwrite`.
    pub fn overwrite(mut self, enabled: bool) -> Self {
        self.overwrite = enabled;
        self
    }

    /// Set `commit_on_navigation`.
    pub fn commit_on_navigation(mut self, enabled: bool) -> Self {
        self.commit_on_navigation = enabled;
        self
    }

    /// Set `wrap`.
    pub fn wrap(mut self, enabled: bool) -> Self {
        self.wrap = enabled;
        self
    }
}

impl Default for EditConfig {
    fn default() -> Self {
        Self::new()
    }
}

type VerifierMap<V> = HashMap<String, Arc<dyn GroupVerifier<V>>>;

fn compile<V>(pattern: &str, verifiers: &VerifierMap<V>) -> Result<Arc<GroupGrammar>, GrammarError> {
    let key = GrammarKey::new(
        pattern,
        verifiers.iter().map(|(name, v)| (name.clone(), v.length())),
    );
    grammar_cache().get_or_compile(&key)
}

/// Stands in for deleted characters of a group that abuts another group, so
/// that every group keeps its position.
pub const FILL: char = ' ';

fn char_len(text: &str) -> usize {
    text.chars().count()
}

fn splice(text: &str, range: Range<usize>, replacement: &str) -> String {
    let begin = char_to_byte(text, range.start);
    let end = char_to_byte(text, range.end);
    let mut out = String::with_capacity(text.len() + replacement.len());
    out.push_str(&text[..begin]);
    out.push_str(replacement);
    out.push_str(&text[end..]);
    out
}

/// Builder for [`EditEngine`].
pub struct EditEngineBuilder<V> {
    pattern: String,
    verifiers: VerifierMap<V>,
    converter: Arc<dyn ValueConverter<V>>,
    context: ConverterContext,
    config: EditConfig,
    value: Option<V>,
}

impl<V: Clone + PartialEq + Send + Sync + 'static> EditEngineBuilder<V> {
    /// Register the verifier for the group called `name`.
    pub fn verifier(mut self, name: impl Into<String>, verifier: impl GroupVerifier<V> + 'static) -> Self {
        self.verifiers.insert(name.into(), Arc::new(verifier));
        self
    }

    /// Use `context` for conversions.
    pub fn context(mut self, context: ConverterContext) -> Self {
        self.context = context;
        self
    }

    /// Use `config` instead of the defaults.
    pub fn config(mut self, config: EditConfig) -> Self {
        self.config = config;
        self
    }

    /// Start with `value`.
    pub fn value(mut self, value: Option<V>) -> Self {
        self.value = value;
        self
    }

    /// Derive the grammar and build the engine.
    pub fn build(self) -> Result<EditEngine<V>, GrammarError> {
        let grammar = compile(&self.pattern, &self.verifiers)?;
        let mut engine = EditEngine {
            pattern: self.pattern,
            verifiers: self.verifiers,
            grammar,
            converter: self.converter,
            context: self.context,
            config: self.config,
            value: Property::new(None),
            text: Property::new(String::new()),
            cursor_pos: 0,
            selection_anchor: None,
            focused_group: None,
            state: EditState::Idle,
        };
        let text = engine.render(self.value.as_ref());
        engine.value.set_silent(self.value);
        engine.text.set_silent(text);
        Ok(engine)
    }
}

/// Edits the text of one typed value under a group pattern.
///
/// Positions (caret, selection, group ranges) are character indices.
pub struct EditEngine<V> {
    pattern: String,
    verifiers: VerifierMap<V>,
    grammar: Arc<GroupGrammar>,
    converter: Arc<dyn ValueConverter<V>>,
    context: ConverterContext,
    config: EditConfig,
    value: Property<Option<V>>,
    text: Property<String>,
    cursor_pos: usize,
    selection_anchor: Option<usize>,
    /// Index of the group the caret was last in; restored on revert.
    focused_group: Option<usize>,
    state: EditState,
}

impl<V: Clone + PartialEq + Send + Sync + 'static> EditEngine<V> {
    /// Start building an engine for `pattern`.
    pub fn builder(
        pattern: impl Into<String>,
        converter: impl ValueConverter<V> + 'static,
    ) -> EditEngineBuilder<V> {
        EditEngineBuilder {
            pattern: pattern.into(),
            verifiers: HashMap::new(),
            converter: Arc::new(converter),
            context: ConverterContext::default(),
            config: EditConfig::default(),
            value: None,
        }
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// The committed value.
    pub fn value(&self) -> Option<V> {
        self.value.get()
    }

    /// The displayed text.
    pub fn text(&self) -> String {
        self.text.get()
    }

    /// Emitted with the new value whenever the committed value changes.
    pub fn value_changed(&self) -> &Signal<Option<V>> {
        self.value.changed()
    }

    /// Emitted with the new text whenever the displayed text changes.
    pub fn text_changed(&self) -> &Signal<String> {
        self.text.changed()
    }

    /// The current edit state.
    pub fn state(&self) -> EditState {
        self.state
    }

    /// The field pattern.
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// The compiled grammar.
    pub fn grammar(&self) -> &Arc<GroupGrammar> {
        &self.grammar
    }

    /// The conversion context.
    pub fn context(&self) -> &ConverterContext {
        &self.context
    }

    /// The behavior switches.
    pub fn config(&self) -> EditConfig {
        self.config
    }

    /// Replace the behavior switches.
    pub fn set_config(&mut self, config: EditConfig) {
        self.config = config;
    }

    /// Caret position.
    pub fn cursor_position(&self) -> usize {
        self.cursor_pos
    }

    /// Whether a non-empty range is selected.
    pub fn has_selection(&self) -> bool {
        self.selection_anchor.is_some_and(|a| a != self.cursor_pos)
    }

    /// The selected range, if any.
    pub fn selection(&self) -> Option<Range<usize>> {
        let anchor = self.selection_anchor.filter(|a| *a != self.cursor_pos)?;
        Some(anchor.min(self.cursor_pos)..anchor.max(self.cursor_pos))
    }

    /// The group under the caret.
    pub fn group_at_caret(&self) -> Option<GroupMatch> {
        self.grammar.group_at(&self.text.get(), self.cursor_pos)
    }

    /// Whether every group holds complete text its verifier accepts.
    ///
    /// Partial entries a verifier tolerates while typing, such as a lone `-`,
    /// are not complete: a group that parses to an integer must also be in
    /// range.
    pub fn is_complete(&self) -> bool {
        let text = self.text.get();
        let value = self.field_context(&text);
        self.grammar.match_complete(&text).is_some_and(|groups| {
            groups.iter().all(|g| {
                let group_text = g.text(&text);
                self.verifiers.get(&g.name).is_some_and(|v| {
                    if !v.accepts(group_text, value.as_ref()) {
                        return false;
                    }
                    match v.parse(group_text) {
                        Ok(GroupValue::Integer(n)) => v
                            .range(value.as_ref())
                            .is_none_or(|(min, max)| (min..=max).contains(&n)),
                        Ok(_) => true,
                        Err(_) => !v.supports(Capability::Parse),
                    }
                })
            })
        })
    }

    // =========================================================================
    // Value and Configuration
    // =========================================================================

    /// Replace the value and show its text, discarding pending edits.
    pub fn set_value(&mut self, value: Option<V>) {
        let text = self.render(value.as_ref());
        self.value.set(value);
        self.show(text);
        self.state = EditState::Idle;
    }

    /// Switch the conversion context and re-render the value.
    pub fn set_context(&mut self, context: ConverterContext) {
        self.context = context;
        self.reset_text();
    }

    /// Switch the converter and re-render the value.
    pub fn set_converter(&mut self, converter: impl ValueConverter<V> + 'static) {
        self.converter = Arc::new(converter);
        self.reset_text();
    }

    /// Switch to a new pattern.
    ///
    /// On error the previous pattern stays in effect.
    pub fn set_pattern(&mut self, pattern: impl Into<String>) -> Result<(), GrammarError> {
        let pattern = pattern.into();
        self.grammar = compile(&pattern, &self.verifiers)?;
        self.pattern = pattern;
        self.reset_text();
        Ok(())
    }

    /// Register or replace the verifier for group `name`.
    ///
    /// On error the previous verifier set stays in effect.
    pub fn set_verifier(
        &mut self,
        name: impl Into<String>,
        verifier: impl GroupVerifier<V> + 'static,
    ) -> Result<(), GrammarError> {
        let mut verifiers = self.verifiers.clone();
        verifiers.insert(name.into(), Arc::new(verifier));
        self.replace_verifiers(verifiers)
    }

    /// Remove the verifier for group `name`.
    ///
    /// On error the previous verifier set stays in effect.
    pub fn remove_verifier(&mut self, name: &str) -> Result<(), GrammarError> {
        let mut verifiers = self.verifiers.clone();
        if verifiers.remove(name).is_none() {
            return Ok(());
        }
        self.replace_verifiers(verifiers)
    }

    fn replace_verifiers(&mut self, verifiers: VerifierMap<V>) -> Result<(), GrammarError> {
        self.grammar = compile(&self.pattern, &verifiers)?;
        self.verifiers = verifiers;
        self.reset_text();
        Ok(())
    }

    // =========================================================================
    // Caret and Selection
    // =========================================================================

    /// Move the caret, clearing the selection.
    pub fn set_caret(&mut self, pos: usize) {
        self.cursor_pos = pos.min(self.text.with(|text| char_len(text)));
        self.selection_anchor = None;
        self.update_focus();
    }

    /// Select `range`; the caret ends at `range.end`.
    pub fn select(&mut self, range: Range<usize>) {
        let len = self.text.with(|text| char_len(text));
        self.selection_anchor = Some(range.start.min(len));
        self.cursor_pos = range.end.min(len);
        self.update_focus();
    }

    /// Select the first group called `name`.
    pub fn select_group(&mut self, name: &str) -> bool {
        let index = self
            .grammar
            .match_groups(&self.text.get())
            .and_then(|groups| groups.iter().find(|g| g.name == name).map(|g| g.index));
        match index {
            Some(index) => self.select_group_index(index),
            None => false,
        }
    }

    /// Select the group after the caret's group.
    pub fn next_group(&mut self) -> bool {
        self.navigate(true)
    }

    /// Select the group before the caret's group.
    pub fn previous_group(&mut self) -> bool {
        self.navigate(false)
    }

    fn navigate(&mut self, forward: bool) -> bool {
        if self.config.commit_on_navigation && self.state == EditState::Editing {
            self.commit();
        }
        let text = self.text.get();
        let Some(groups) = self.grammar.match_groups(&text) else {
            return false;
        };
        let caret = self.cursor_pos;
        let current = self
            .focused_group
            .filter(|i| groups.get(*i).is_some_and(|g| g.touches(caret)))
            .or_else(|| groups.iter().position(|g| g.start <= caret && caret < g.end))
            .or_else(|| groups.iter().position(|g| g.touches(caret)));
        let target = match (current, forward) {
            (Some(i), true) => Some(i + 1),
            (Some(i), false) => i.checked_sub(1),
            (None, true) => groups.iter().position(|g| g.start >= caret),
            (None, false) => groups.iter().rposition(|g| g.end <= caret),
        };
        match target {
            Some(index) if index < groups.len() => self.select_group_index(index),
            _ => false,
        }
    }

    fn select_group_index(&mut self, index: usize) -> bool {
        let Some(group) = self
            .grammar
            .match_groups(&self.text.get())
            .and_then(|groups| groups.into_iter().nth(index))
        else {
            return false;
        };
        self.selection_anchor = Some(group.start);
        self.cursor_pos = group.end;
        self.focused_group = Some(index);
        true
    }

    fn update_focus(&mut self) {
        if let Some(group) = self.group_at_caret() {
            self.focused_group = Some(group.index);
        }
    }

    // =========================================================================
    // Text Mutation
    // =========================================================================

    /// Type one character at the caret. Returns whether it was placed.
    pub fn insert_char(&mut self, c: char) -> bool {
        if self.has_selection() && !self.delete_selection() {
            return false;
        }
        self.place_char(c)
    }

    /// Type `text` character by character. Returns how many were placed.
    pub fn insert(&mut self, text: &str) -> usize {
        if text.is_empty() {
            return 0;
        }
        self.replace_selection(text)
    }

    /// Replace the selection with `text`, which may be empty.
    pub fn replace_selection(&mut self, text: &str) -> usize {
        if self.has_selection() && !self.delete_selection() {
            return 0;
        }
        text.chars().filter(|c| self.place_char(*c)).count()
    }

    /// Insert clipboard text; line breaks and tabs are dropped.
    pub fn paste(&mut self, text: &str) -> usize {
        let cleaned: String = text.chars().filter(|c| !c.is_control()).collect();
        tracing::debug!(target: targets::EDIT, len = cleaned.len(), "paste");
        self.replace_selection(&cleaned)
    }

    fn place_char(&mut self, c: char) -> bool {
        let text = self.text.get();
        let len = char_len(&text);
        let mut positions = vec![self.cursor_pos];
        if self.config.auto_advance
            && let Some(groups) = self.grammar.match_groups(&text)
        {
            let mut later: Vec<usize> = groups
                .iter()
                .flat_map(|g| [g.start, g.end])
                .chain((self.cursor_pos..len).filter(|p| self.is_literal_at(&text, *p)))
                .filter(|p| *p > self.cursor_pos)
                .collect();
            later.sort_unstable();
            later.dedup();
            positions.extend(later);
        }

        let typed = c.to_string();
        for pos in positions {
            if text.chars().nth(pos) == Some(c) && self.is_literal_at(&text, pos) {
                self.cursor_pos = pos + 1;
                self.selection_anchor = None;
                self.update_focus();
                return true;
            }
            let inserted = splice(&text, pos..pos, &typed);
            if self.validate(&text, &inserted, false) {
                self.apply_edit(inserted, pos + 1);
                return true;
            }
            if self.config.overwrite && pos < len && !self.is_literal_at(&text, pos) {
                let overwritten = splice(&text, pos..pos + 1, &typed);
                if self.validate(&text, &overwritten, false) {
                    self.apply_edit(overwritten, pos + 1);
                    return true;
                }
            }
        }
        tracing::trace!(target: targets::EDIT, ch = %c, caret = self.cursor_pos, "character rejected");
        false
    }

    /// Delete the character before the caret, or the selection.
    ///
    /// On literal text only the caret moves. Returns whether the text changed.
    pub fn delete_backward(&mut self) -> bool {
        if self.has_selection() {
            return self.delete_selection();
        }
        let Some(pos) = self.cursor_pos.checked_sub(1) else {
            return false;
        };
        let text = self.text.get();
        if self.is_literal_at(&text, pos) {
            self.set_caret(pos);
            return false;
        }
        self.delete_range(&text, pos..pos + 1)
    }

    /// Delete the character after the caret, or the selection.
    ///
    /// On literal text only the caret moves. Returns whether the text changed.
    pub fn delete_forward(&mut self) -> bool {
        if self.has_selection() {
            return self.delete_selection();
        }
        let text = self.text.get();
        let pos = self.cursor_pos;
        if pos >= char_len(&text) {
            return false;
        }
        if self.is_literal_at(&text, pos) {
            self.set_caret(pos + 1);
            return false;
        }
        self.delete_range(&text, pos..pos + 1)
    }

    /// Delete the group text inside the selection; literal text stays.
    pub fn delete_selection(&mut self) -> bool {
        let Some(range) = self.selection() else {
            return false;
        };
        let text = self.text.get();
        self.delete_range(&text, range)
    }

    fn delete_range(&mut self, text: &str, range: Range<usize>) -> bool {
        let Some(groups) = self.grammar.match_groups(text) else {
            let candidate = splice(text, range.clone(), "");
            return self.apply_deletion(text, candidate, range.start);
        };
        let in_group = |i: usize| groups.iter().any(|g| g.start <= i && i < g.end);

        // Removing text from abutting groups would shift every later group, so
        // their characters are blanked in place.
        if abuts(&groups, &range) {
            let filled: String = text
                .chars()
                .enumerate()
                .map(|(i, c)| if range.contains(&i) && in_group(i) { FILL } else { c })
                .collect();
            return self.apply_deletion(text, filled, range.start);
        }

        let candidate: String = text
            .chars()
            .enumerate()
            .filter(|(i, _)| !(range.contains(i) && in_group(*i)))
            .map(|(_, c)| c)
            .collect();
        self.apply_deletion(text, candidate, range.start)
    }

    fn apply_deletion(&mut self, text: &str, candidate: String, caret: usize) -> bool {
        if candidate == text {
            self.set_caret(caret);
            return false;
        }
        if !self.validate(text, &candidate, true) {
            tracing::trace!(target: targets::EDIT, caret, "deletion rejected");
            return false;
        }
        self.apply_edit(candidate, caret);
        true
    }

    fn apply_edit(&mut self, text: String, caret: usize) {
        self.text.set(text);
        self.cursor_pos = caret;
        self.selection_anchor = None;
        self.state = EditState::Editing;
        self.update_focus();
    }

    fn is_literal_at(&self, text: &str, pos: usize) -> bool {
        pos < char_len(text)
            && self
                .grammar
                .match_groups(text)
                .is_some_and(|groups| !groups.iter().any(|g| g.start <= pos && pos < g.end))
    }

    /// Whether `candidate` may replace `current`.
    ///
    /// The candidate must have the pattern's shape, and every group whose text
    /// changed must be accepted by its verifier. Changed groups that became
    /// empty or blank pass only when `allow_empty` is set.
    fn validate(&self, current: &str, candidate: &str, allow_empty: bool) -> bool {
        let Some(groups) = self.grammar.match_groups(candidate) else {
            return false;
        };
        let before = self.grammar.match_groups(current);
        let value = self.field_context(candidate);
        groups.iter().all(|g| {
            let new_text = g.text(candidate);
            let old_text = before
                .as_ref()
                .and_then(|b| b.get(g.index))
                .map(|b| b.text(current));
            if old_text == Some(new_text) {
                return true;
            }
            if new_text.chars().all(|c| c == FILL) {
                return allow_empty;
            }
            // A blanked group being typed over is checked without its blanks.
            let typed: String = if old_text.is_some_and(|t| t.contains(FILL)) {
                new_text.chars().filter(|c| *c != FILL).collect()
            } else {
                new_text.to_string()
            };
            self.verifiers
                .get(&g.name)
                .is_some_and(|v| v.accepts(&typed, value.as_ref()))
        })
    }

    /// The committed value with every group of `text` its verifier can read
    /// injected, so that ranges such as the last day of the month follow
    /// uncommitted edits. Groups that do not read or inject are skipped.
    fn field_context(&self, text: &str) -> Option<V> {
        let mut value = self.value.get()?;
        let Some(groups) = self.grammar.match_groups(text) else {
            return Some(value);
        };
        for group in &groups {
            let Some(verifier) = self.verifiers.get(&group.name) else {
                continue;
            };
            if !verifier.supports(Capability::FieldValue) {
                continue;
            }
            if let Some(updated) = verifier
                .parse(group.text(text))
                .ok()
                .and_then(|parsed| verifier.inject(&value, &parsed))
            {
                value = updated;
            }
        }
        Some(value)
    }

    // =========================================================================
    // Commit and Revert
    // =========================================================================

    /// Convert the text into the value.
    ///
    /// Text whose groups are all empty or blanked clears the value. Text the
    /// converter cannot read is reverted. Returns whether the text was
    /// accepted.
    pub fn commit(&mut self) -> bool {
        let _span = PerfSpan::new(span_names::COMMIT);
        self.state = EditState::Committing;
        let text = self.text.get();

        let accepted = if self.is_blank(&text) {
            self.value.set(None);
            self.show(self.grammar.literal_skeleton());
            tracing::debug!(target: targets::EDIT, "committed empty value");
            true
        } else if let Some(value) = self.converter.from_text(&text, &self.context) {
            let normalized = self.render(Some(&value));
            self.value.set(Some(value));
            self.show(normalized);
            tracing::debug!(target: targets::EDIT, text = %text, "committed");
            true
        } else {
            tracing::debug!(target: targets::EDIT, text = %text, "commit rejected, reverting");
            self.revert();
            false
        };

        self.state = EditState::Idle;
        accepted
    }

    /// Whether no group holds anything but blanks.
    fn is_blank(&self, text: &str) -> bool {
        text == self.grammar.literal_skeleton()
            || self.grammar.match_groups(text).is_some_and(|groups| {
                groups.iter().all(|g| g.text(text).chars().all(|c| c == FILL))
            })
    }

    /// Discard pending edits without parsing them.
    pub fn cancel(&mut self) {
        tracing::debug!(target: targets::EDIT, "edit cancelled");
        self.revert();
        self.state = EditState::Idle;
    }

    fn revert(&mut self) {
        let text = self.render(self.value.get().as_ref());
        self.show(text);
        if let Some(index) = self.focused_group {
            self.select_group_index(index);
        }
    }

    fn reset_text(&mut self) {
        let text = self.render(self.value.get().as_ref());
        self.show(text);
        self.focused_group = None;
        self.state = EditState::Idle;
    }

    /// Display `text`, keeping the caret inside it.
    fn show(&mut self, text: String) {
        let len = char_len(&text);
        self.text.set(text);
        self.cursor_pos = self.cursor_pos.min(len);
        self.selection_anchor = self.selection_anchor.map(|a| a.min(len));
    }

    fn render(&self, value: Option<&V>) -> String {
        let Some(value) = value else {
            return self.grammar.literal_skeleton();
        };
        self.converter
            .to_text(value, &self.context)
            .unwrap_or_else(|err| {
                tracing::warn!(target: targets::EDIT, error = %err, "value has no text, showing skeleton");
                self.grammar.literal_skeleton()
            })
    }

    // =========================================================================
    // Adjustment
    // =========================================================================

    /// Step the group at the caret up by one.
    pub fn increase_value(&mut self) -> bool {
        self.adjust(Adjustment::Next, self.config.wrap)
    }

    /// Step the group at the caret down by one.
    pub fn decrease_value(&mut self) -> bool {
        self.adjust(Adjustment::Previous, self.config.wrap)
    }

    /// Apply `adjustment` to the group at the caret, or the next group when
    /// the caret is on literal text.
    ///
    /// `restart` wraps at the ends of the group's range instead of clamping.
    /// The adjusted group is selected afterwards. Returns whether the value
    /// was updated.
    pub fn adjust(&mut self, adjustment: Adjustment, restart: bool) -> bool {
        let _span = PerfSpan::new(span_names::ADJUST);
        let text = self.text.get();
        let Some(groups) = self.grammar.match_groups(&text) else {
            return false;
        };
        let caret = self.cursor_pos;
        let group = groups
            .iter()
            .find(|g| g.start <= caret && caret < g.end)
            .or_else(|| groups.iter().find(|g| g.touches(caret)))
            .or_else(|| groups.iter().find(|g| g.start >= caret))
            .cloned();
        let Some(group) = group else {
            return false;
        };
        let Some(verifier) = self.verifiers.get(&group.name).cloned() else {
            return false;
        };
        let required = [Capability::Adjust, Capability::Format, Capability::Parse];
        if !required.iter().all(|c| verifier.supports(*c)) {
            return false;
        }

        let projects = verifier.supports(Capability::FieldValue);
        if projects && self.state == EditState::Editing {
            // Projection starts from the value; fold pending edits into it first.
            self.commit();
            let start = self
                .grammar
                .match_groups(&self.text.get())
                .and_then(|groups| groups.get(group.index).map(|g| g.start));
            if let Some(start) = start {
                self.set_caret(start);
            }
            return self.adjust(adjustment, restart);
        }

        let value = self.field_context(&text);
        let current = value
            .as_ref()
            .filter(|_| projects)
            .and_then(|v| verifier.project(v))
            .or_else(|| verifier.parse(group.text(&text)).ok());
        let next = match current {
            Some(current) => verifier.adjust(&current, adjustment, restart, value.as_ref()),
            None => {
                let (min, _) = verifier.range(value.as_ref()).unwrap_or((0, 0));
                let start = match adjustment {
                    Adjustment::Next | Adjustment::PageNext | Adjustment::Home => Adjustment::Home,
                    Adjustment::Previous | Adjustment::PagePrevious | Adjustment::End => Adjustment::End,
                };
                verifier.adjust(&GroupValue::Integer(min), start, restart, value.as_ref())
            }
        };
        let Ok(next) = next else {
            return false;
        };
        let Ok(formatted) = verifier.format(&next) else {
            return false;
        };
        if !verifier.accepts(&formatted, value.as_ref()) {
            tracing::trace!(target: targets::EDIT, group = %group.name, text = %formatted, "adjusted text rejected");
            return false;
        }
        tracing::debug!(target: targets::EDIT, group = %group.name, ?adjustment, to = %next, "adjusting");

        if projects && let Some(updated) = value.as_ref().and_then(|v| verifier.inject(v, &next)) {
            let text = self.render(Some(&updated));
            self.value.set(Some(updated));
            self.show(text);
            self.state = EditState::Idle;
            return self.select_group_index(group.index);
        }

        let candidate = splice(&text, group.start..group.end, &formatted);
        if self.grammar.match_groups(&candidate).is_none() {
            return false;
        }
        self.text.set(candidate);
        self.state = EditState::Editing;
        self.focused_group = Some(group.index);
        let committed = self.commit();
        self.select_group_index(group.index);
        committed
    }
}

impl<V> fmt::Debug for EditEngine<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EditEngine")
            .field("pattern", &self.pattern)
            .field("groups", &self.verifiers.keys().collect::<Vec<_>>())
            .field("context", &self.context)
            .field("config", &self.config)
            .field("cursor_pos", &self.cursor_pos)
            .field("selection_anchor", &self.selection_anchor)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

fn abuts(groups: &[GroupMatch], range: &Range<usize>) -> bool {
    groups.iter().enumerate().any(|(i, g)| {
        let touched = g.start < range.end && range.start < g.end;
        let before = i.checked_sub(1).and_then(|j| groups.get(j)).is_some_and(|p| p.end == g.start);
        let after = groups.get(i + 1).is_some_and(|n| n.start == g.end);
        touched && (before || after)
    })
}

static_assertions::assert_impl_all!(EditEngine<std::net::Ipv4Addr>: Send, Sync);
