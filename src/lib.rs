extern crate lazy_static;

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

pub mod autocomplete;
pub mod buffer;
pub mod config;
pub mod editor;
pub mod engine;
pub mod error;
pub mod logging;
pub mod render;
pub mod scope;
pub mod structural;
pub mod syntax;
pub mod terminal;
pub mod text_mirror;
pub mod theme;
pub mod trie;

// Re-export core types
pub use autocomplete::{Anchor, AutocompleteState, SuggestionEngine, SuggestionLimits};
pub use buffer::{Buffer, LineBuffer, Motion, Position};
pub use config::{Args, EngineConfig};
pub use editor::Editor;
pub use engine::AssistEngine;
pub use error::{AssistError, Result};
pub use scope::{ScopeKind, ScopeResolver, ScopedIdentifier};
pub use structural::{LanguageConfig, StructuralIndex};
pub use syntax::{HighlightSpan, Highlighter};
pub use text_mirror::TextMirror;
pub use theme::{ColorId, Theme};
pub use trie::Trie;
