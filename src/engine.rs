//! The code-assistance context owned by the editor
//!
//! Ties the text mirror, structural index, highlighter, scope resolver and
//! suggestion engine together. Features whose setup fails are switched off for
//! the session instead of failing the editor.

use crate::autocomplete::{AutocompleteState, SuggestionEngine, SuggestionLimits};
use crate::buffer::{LineBuffer, Position};
use crate::config::EngineConfig;
use crate::error::{AssistError, Result};
use crate::scope::{cursor_on_declarator_name, ScopeResolver, ScopedIdentifier};
use crate::structural::{LanguageConfig, StructuralIndex};
use crate::syntax::{HighlightSpan, Highlighter};
use crate::text_mirror::TextMirror;
use crate::theme::Theme;
use crate::trie::Trie;

pub struct AssistEngine {
    mirror: TextMirror,
    index: Option<StructuralIndex>,
    highlighter: Option<Highlighter>,
    scopes: Option<ScopeResolver>,
    suggestions: SuggestionEngine,
    max_spans: usize,
}

impl AssistEngine {
    /// Load the dictionary and highlight query named by `config`
    ///
    /// Without a `language` (a file that isn't C) the parser, highlighting and
    /// scope completion stay off; dictionary completion still works.
    pub fn new(config: &EngineConfig, language: Option<LanguageConfig>) -> Self {
        let dictionary = config.dictionary.as_ref().and_then(|path| {
            Trie::load(path)
                .inspect_err(|err| tracing::warn!("dictionary completion disabled: {err}"))
                .ok()
        });

        let highlights = match (&config.highlights, &language) {
            (_, None) => None,
            (Some(path), Some(_)) => match std::fs::read_to_string(path) {
                Ok(source) => Some(source),
                Err(source) => {
                    let err = AssistError::Io {
                        path: path.clone(),
                        source,
                    };
                    tracing::warn!("highlighting disabled: {err}");
                    None
                }
            },
            (None, Some(language)) => Some(language.highlights_query.to_string()),
        };

        Self::with_language(config, language, dictionary, highlights.as_deref(), Theme::c())
    }

    /// C engine from an already loaded dictionary and highlight query source
    ///
    /// `None` for either switches that feature off.
    pub fn with_parts(
        config: &EngineConfig,
        dictionary: Option<Trie>,
        highlights_query: Option<&str>,
        theme: Theme,
    ) -> Self {
        Self::with_language(
            config,
            Some(LanguageConfig::c()),
            dictionary,
            highlights_query,
            theme,
        )
    }

    pub fn with_language(
        config: &EngineConfig,
        language: Option<LanguageConfig>,
        dictionary: Option<Trie>,
        highlights_query: Option<&str>,
        theme: Theme,
    ) -> Self {
        let mut index = language.and_then(|language| {
            StructuralIndex::new(&language)
                .inspect_err(|err| tracing::warn!("syntax features disabled: {err}"))
                .ok()
        });

        let highlighter = index.as_mut().zip(highlights_query).and_then(|(index, source)| {
            Highlighter::new(index, source, theme)
                .inspect_err(|err| tracing::warn!("highlighting disabled: {err}"))
                .ok()
        });
        let scopes = index.as_mut().and_then(|index| {
            ScopeResolver::new(index, config.max_word_len)
                .inspect_err(|err| tracing::warn!("scope completion disabled: {err}"))
                .ok()
        });

        tracing::info!(
            parser = index.is_some(),
            highlighting = highlighter.is_some(),
            scopes = scopes.is_some(),
            dictionary = dictionary.is_some(),
            "assist engine ready"
        );

        Self {
            mirror: TextMirror::new(),
            index,
            highlighter,
            scopes,
            suggestions: SuggestionEngine::new(
                dictionary,
                SuggestionLimits {
                    max_suggestions: config.max_suggestions,
                    min_word_len: config.min_word_len,
                },
            ),
            max_spans: config.max_spans,
        }
    }

    /// Re-flatten the buffer and reparse it in one step
    pub fn sync(&mut self, buffer: &impl LineBuffer) -> Result<()> {
        self.mirror.rebuild(buffer);
        match self.index.as_mut() {
            Some(index) => index.reparse(self.mirror.text(), self.mirror.revision()),
            None => Ok(()),
        }
    }

    pub fn mirror(&self) -> &TextMirror {
        &self.mirror
    }

    pub fn index(&self) -> Option<&StructuralIndex> {
        self.index.as_ref()
    }

    /// Index whose tree matches the current mirror, if any
    fn current_index(&self) -> Option<&StructuralIndex> {
        self.index
            .as_ref()
            .filter(|index| index.parsed_revision() == Some(self.mirror.revision()))
    }

    pub fn highlighting_enabled(&self) -> bool {
        self.highlighter.is_some()
    }

    /// Highlight spans for `first_row..=last_row` as of the last sync
    pub fn visible_spans(&self, first_row: usize, last_row: usize) -> Vec<HighlightSpan> {
        match (&self.highlighter, self.current_index()) {
            (Some(highlighter), Some(index)) => {
                highlighter.visible_spans(&self.mirror, index, first_row, last_row, self.max_spans)
            }
            _ => Vec::new(),
        }
    }

    pub fn cursor_on_declarator_name(&self, row: usize, col: usize) -> bool {
        self.current_index()
            .is_some_and(|index| cursor_on_declarator_name(&self.mirror, index, row, col))
    }

    pub fn identifiers_in_scope(&self, prefix: &str, row: usize, col: usize) -> Vec<ScopedIdentifier> {
        match (&self.scopes, self.current_index()) {
            (Some(scopes), Some(index)) => scopes.identifiers_in_scope(
                &self.mirror,
                index,
                prefix,
                row,
                col,
                self.suggestions.limits().max_suggestions,
            ),
            _ => Vec::new(),
        }
    }

    /// Recompute suggestions for `word` ending at the cursor `(row, col)`
    pub fn update(&mut self, word: &str, row: usize, col: usize) {
        if self.cursor_on_declarator_name(row, col) {
            self.suggestions.dismiss();
            return;
        }
        let scoped = if self.suggestions.accepts_word(word) {
            self.identifiers_in_scope(word, row, col)
        } else {
            Vec::new()
        };
        self.suggestions.update(word, row, col, scoped);
    }

    pub fn select_next(&mut self) {
        self.suggestions.select_next();
    }

    pub fn select_prev(&mut self) {
        self.suggestions.select_prev();
    }

    pub fn accept(&mut self, buffer: &mut impl LineBuffer) -> bool {
        self.suggestions.accept(buffer)
    }

    pub fn dismiss(&mut self) {
        self.suggestions.dismiss();
    }

    pub fn follow_cursor(&mut self, cursor: Position) {
        self.suggestions.follow_cursor(cursor);
    }

    pub fn is_active(&self) -> bool {
        self.suggestions.is_active()
    }

    pub fn current_suggestions(&self) -> &[String] {
        self.suggestions.suggestions()
    }

    pub fn autocomplete(&self) -> &AutocompleteState {
        self.suggestions.state()
    }

    /// Parse tree of the last sync as an S-expression
    pub fn dump_tree(&self) -> Option<String> {
        self.current_index().and_then(StructuralIndex::to_sexp)
    }
}
