//! Static dictionary trie for prefix completion
//!
//! Lowercase ASCII only. Non-letter bytes in inserted words are skipped rather
//! than rejected, so a token like `errno.h` lands as `errnoh`.

use crate::error::{AssistError, Result};
use std::path::Path;

const ALPHABET_SIZE: usize = 26;

#[derive(Default)]
struct TrieNode {
    children: [Option<Box<TrieNode>>; ALPHABET_SIZE],
    is_word: bool,
}

/// Prefix tree built once from a word list
#[derive(Default)]
pub struct Trie {
    root: TrieNode,
    words: usize,
}

fn letter_index(byte: u8) -> Option<usize> {
    byte.is_ascii_alphabetic()
        .then(|| (byte.to_ascii_lowercase() - b'a') as usize)
}

impl Trie {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from any word source, one word per item
    pub fn from_words<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut trie = Self::new();
        for word in words {
            trie.insert(word.as_ref());
        }
        trie
    }

    /// Load a word list: UTF-8, one word per line, blank lines skipped
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|source| AssistError::Dictionary {
            path: path.to_path_buf(),
            source,
        })?;
        let text = simdutf8::basic::from_utf8(&bytes).map_err(|_| AssistError::Dictionary {
            path: path.to_path_buf(),
            source: std::io::Error::new(std::io::ErrorKind::InvalidData, "word list is not UTF-8"),
        })?;

        let trie = Self::from_words(
            text.lines()
                .map(|line| line.trim_end_matches('\r'))
                .filter(|line| !line.is_empty())
                .map(str::to_ascii_lowercase),
        );
        tracing::info!(path = %path.display(), words = trie.len(), "dictionary loaded");
        Ok(trie)
    }

    /// Insert a word, skipping anything that isn't an ASCII letter
    pub fn insert(&mut self, word: &str) {
        let mut node = &mut self.root;
        let mut letters = 0;
        for index in word.bytes().filter_map(letter_index) {
            node = node.children[index].get_or_insert_with(Box::default).as_mut();
            letters += 1;
        }
        // Letterless words would mark the root as the empty word
        if letters > 0 && !node.is_word {
            node.is_word = true;
            self.words += 1;
        }
    }

    /// Number of distinct words stored
    pub fn len(&self) -> usize {
        self.words
    }

    pub fn is_empty(&self) -> bool {
        self.words == 0
    }

    fn walk(&self, prefix: &str) -> Option<&TrieNode> {
        let mut node = &self.root;
        for byte in prefix.bytes() {
            node = node.children[letter_index(byte)?].as_deref()?;
        }
        Some(node)
    }

    /// Exact membership, case-insensitive
    pub fn contains(&self, word: &str) -> bool {
        !word.is_empty() && self.walk(word).is_some_and(|node| node.is_word)
    }

    /// Words starting with `prefix`, lexicographic, at most `limit`
    ///
    /// A prefix containing anything but ASCII letters matches nothing.
    pub fn prefix_suggestions(&self, prefix: &str, limit: usize) -> Vec<String> {
        let mut out = Vec::new();
        if limit == 0 {
            return out;
        }
        let Some(start) = self.walk(prefix) else {
            return out;
        };

        let mut spelling = prefix.to_ascii_lowercase();
        collect(start, &mut spelling, limit, &mut out);
        out
    }
}

fn collect(node: &TrieNode, spelling: &mut String, limit: usize, out: &mut Vec<String>) {
    if out.len() >= limit {
        return;
    }
    if node.is_word {
        out.push(spelling.clone());
    }
    for (index, child) in node.children.iter().enumerate() {
        let Some(child) = child else { continue };
        if out.len() >= limit {
            break;
        }
        spelling.push((b'a' + index as u8) as char);
        collect(child, spelling, limit, out);
        spelling.pop();
    }
}
