//! Suggestion list state: scope identifiers first, dictionary words after

use crate::buffer::{floor_char_boundary, LineBuffer, Position};
use crate::scope::ScopedIdentifier;
use crate::trie::Trie;
use indexmap::IndexSet;

/// Where the word being completed starts
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Anchor {
    pub row: usize,
    pub col: usize,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AutocompleteState {
    pub suggestions: Vec<String>,
    pub selected: usize,
    pub active: bool,
    pub anchor: Anchor,
    /// The typed word the suggestions complete
    pub current_word: String,
}

impl AutocompleteState {
    fn reset(&mut self) {
        self.suggestions.clear();
        self.selected = 0;
        self.active = false;
    }
}

/// Limits the suggestion engine works under
#[derive(Clone, Copy, Debug)]
pub struct SuggestionLimits {
    pub max_suggestions: usize,
    pub min_word_len: usize,
}

impl Default for SuggestionLimits {
    fn default() -> Self {
        Self {
            max_suggestions: 10,
            min_word_len: 2,
        }
    }
}

pub struct SuggestionEngine {
    dictionary: Option<Trie>,
    limits: SuggestionLimits,
    state: AutocompleteState,
}

fn is_identifier(word: &str) -> bool {
    word.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'_')
}

impl SuggestionEngine {
    pub fn new(dictionary: Option<Trie>, limits: SuggestionLimits) -> Self {
        Self {
            dictionary,
            limits,
            state: AutocompleteState::default(),
        }
    }

    pub fn has_dictionary(&self) -> bool {
        self.dictionary.is_some()
    }

    pub fn limits(&self) -> SuggestionLimits {
        self.limits
    }

    pub fn state(&self) -> &AutocompleteState {
        &self.state
    }

    /// Minimum word length before suggestions are worth computing
    pub fn accepts_word(&self, word: &str) -> bool {
        word.len() >= self.limits.min_word_len
    }

    /// Rebuild the list for `word`, typed with the cursor at `(row, col)`
    ///
    /// `scoped` is the scope resolver's output for the same word; it fills the
    /// list first and dictionary matches take whatever room is left.
    pub fn update(&mut self, word: &str, row: usize, col: usize, scoped: Vec<ScopedIdentifier>) {
        self.state.reset();
        if !self.accepts_word(word) {
            return;
        }

        let limit = self.limits.max_suggestions;
        let mut merged: IndexSet<String> = scoped
            .into_iter()
            .map(|id| id.name)
            .take(limit)
            .collect();

        if let Some(trie) = &self.dictionary {
            if is_identifier(word) && merged.len() < limit {
                let normalized = word.to_ascii_lowercase();
                for candidate in trie.prefix_suggestions(&normalized, limit) {
                    if merged.len() >= limit {
                        break;
                    }
                    merged.insert(candidate);
                }
            }
        }

        self.state.current_word = word.to_string();
        self.state.anchor = Anchor {
            row,
            col: col.saturating_sub(word.len()),
        };
        self.state.suggestions = merged.into_iter().collect();
        self.state.active = !self.state.suggestions.is_empty();
        tracing::debug!(
            word,
            count = self.state.suggestions.len(),
            "suggestions updated"
        );
    }

    pub fn is_active(&self) -> bool {
        self.state.active && !self.state.suggestions.is_empty()
    }

    pub fn suggestions(&self) -> &[String] {
        &self.state.suggestions
    }

    pub fn selected(&self) -> usize {
        self.state.selected
    }

    pub fn selected_suggestion(&self) -> Option<&str> {
        if !self.is_active() {
            return None;
        }
        self.state
            .suggestions
            .get(self.state.selected)
            .map(String::as_str)
    }

    pub fn select_next(&mut self) {
        if !self.is_active() {
            return;
        }
        self.state.selected = (self.state.selected + 1) % self.state.suggestions.len();
    }

    pub fn select_prev(&mut self) {
        if !self.is_active() {
            return;
        }
        let count = self.state.suggestions.len();
        self.state.selected = (self.state.selected + count - 1) % count;
    }

    pub fn dismiss(&mut self) {
        self.state.reset();
    }

    /// Dismiss unless the cursor still sits right after the anchored word
    pub fn follow_cursor(&mut self, cursor: Position) {
        if !self.is_active() {
            return;
        }
        let anchor = self.state.anchor;
        let expected = anchor.col + self.state.current_word.len();
        if cursor.row != anchor.row || cursor.col != expected {
            self.dismiss();
        }
    }

    /// Replace the anchored word with the selected suggestion
    ///
    /// The anchor is clamped to the row as it is now, which may differ from
    /// when the suggestions were computed. Returns whether the buffer changed.
    pub fn accept(&mut self, buffer: &mut impl LineBuffer) -> bool {
        let Some(suggestion) = self.selected_suggestion().map(str::to_string) else {
            return false;
        };
        let anchor = self.state.anchor;
        if anchor.row >= buffer.row_count() {
            self.dismiss();
            return false;
        }

        let row_text = buffer.row_text(anchor.row);
        let start = floor_char_boundary(row_text, anchor.col);
        let end = floor_char_boundary(row_text, start + self.state.current_word.len());

        buffer.replace_range(anchor.row, start..end, &suggestion);
        buffer.set_cursor(Position::new(anchor.row, start + suggestion.len()));
        buffer.mark_modified();
        tracing::debug!(suggestion, row = anchor.row, col = start, "accepted suggestion");

        self.dismiss();
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::Buffer;
    use crate::scope::ScopeKind;

    fn local(name: &str) -> ScopedIdentifier {
        ScopedIdentifier {
            name: name.to_string(),
            kind: ScopeKind::Local,
        }
    }

    fn engine(words: &[&str]) -> SuggestionEngine {
        SuggestionEngine::new(Some(Trie::from_words(words)), SuggestionLimits::default())
    }

    #[test]
    fn test_scoped_first_then_dictionary() {
        let mut engine = engine(&["printf", "print"]);
        engine.update("pri", 0, 3, vec![local("prime")]);

        assert!(engine.is_active());
        assert_eq!(engine.suggestions(), &["prime", "print", "printf"]);
        assert_eq!(engine.state().anchor, Anchor { row: 0, col: 0 });
    }

    #[test]
    fn test_short_word_stays_inactive() {
        let mut engine = engine(&["int"]);
        engine.update("i", 0, 1, vec![]);
        assert!(!engine.is_active());
        assert!(engine.suggestions().is_empty());
    }

    #[test]
    fn test_dictionary_skipped_for_non_identifier() {
        let mut engine = engine(&["include"]);
        engine.update("#in", 0, 3, vec![]);
        assert!(!engine.is_active());
    }

    #[test]
    fn test_without_dictionary_scope_still_works() {
        let mut engine = SuggestionEngine::new(None, SuggestionLimits::default());
        engine.update("co", 0, 2, vec![local("count")]);
        assert_eq!(engine.suggestions(), &["count"]);
    }

    #[test]
    fn test_duplicates_and_cap() {
        let limits = SuggestionLimits {
            max_suggestions: 3,
            min_word_len: 2,
        };
        let mut engine =
            SuggestionEngine::new(Some(Trie::from_words(["whilea", "whileb", "whilec"])), limits);
        engine.update("whi", 0, 3, vec![local("whilea"), local("whilez")]);
        assert_eq!(engine.suggestions(), &["whilea", "whilez", "whileb"]);
    }

    #[test]
    fn test_selection_cycles() {
        let mut engine = engine(&["aa", "ab", "ac"]);
        engine.select_next();
        assert_eq!(engine.selected(), 0);

        engine.update("aa", 0, 2, vec![]);
        engine.update("a_", 0, 2, vec![]);
        assert!(!engine.is_active());

        engine.update("ab", 0, 2, vec![local("abc"), local("abd")]);
        assert_eq!(engine.suggestions(), &["abc", "abd", "ab"]);
        engine.select_prev();
        assert_eq!(engine.selected(), 2);
        engine.select_next();
        assert_eq!(engine.selected(), 0);
        engine.select_next();
        assert_eq!(engine.selected_suggestion(), Some("abd"));
    }

    #[test]
    fn test_accept_replaces_word_and_moves_cursor() {
        let mut buffer = Buffer::from_str("x = pri;");
        buffer.set_cursor(Position::new(0, 7));
        let mut engine = engine(&["printf"]);
        engine.update("pri", 0, 7, vec![]);

        assert!(engine.accept(&mut buffer));
        assert_eq!(buffer.rows(), &["x = printf;"]);
        assert_eq!(buffer.cursor(), Position::new(0, 10));
        assert!(buffer.is_dirty());
        assert!(!engine.is_active());
        assert!(!engine.accept(&mut buffer));
    }

    #[test]
    fn test_accept_clamps_shifted_anchor() {
        // The row shrank after the suggestions were computed; the anchor is
        // clamped and whatever is left of the span gets replaced.
        let mut buffer = Buffer::from_str("ab");
        let mut engine = engine(&["abacus"]);
        engine.update("aba", 0, 5, vec![]);
        assert_eq!(engine.state().anchor.col, 2);

        assert!(engine.accept(&mut buffer));
        assert_eq!(buffer.rows(), &["ababacus"]);
        assert_eq!(buffer.cursor(), Position::new(0, 8));
    }

    #[test]
    fn test_cursor_leaving_anchor_dismisses() {
        let mut engine = engine(&["return"]);
        engine.update("re", 2, 6, vec![]);
        engine.follow_cursor(Position::new(2, 6));
        assert!(engine.is_active());
        engine.follow_cursor(Position::new(2, 5));
        assert!(!engine.is_active());
    }
}
