#![allow(dead_code)]

use tiny_kilo::{AssistEngine, Buffer, EngineConfig, Theme, Trie};

pub fn engine_with(config: &EngineConfig, words: &[&str]) -> AssistEngine {
    AssistEngine::with_parts(
        config,
        Some(Trie::from_words(words)),
        Some(tree_sitter_c::HIGHLIGHT_QUERY),
        Theme::c(),
    )
}

/// Engine synced to `text`, with the buffer it was synced from
pub fn synced(text: &str, words: &[&str]) -> (Buffer, AssistEngine) {
    let buffer = Buffer::from_str(text);
    let mut engine = engine_with(&EngineConfig::default(), words);
    engine.sync(&buffer).unwrap();
    (buffer, engine)
}
