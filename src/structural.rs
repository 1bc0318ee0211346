//! Structural index over the C parse tree
//!
//! Owns the parser and the current tree. The tree is replaced wholesale on
//! every reparse; there is no incremental edit path.

use crate::error::{AssistError, Result};
use std::collections::HashMap;
use std::ops::{ControlFlow, Range};
use std::path::Path;
use std::sync::Arc;
use tree_sitter::{Language, Node, Parser, Query, QueryCursor, StreamingIterator, Tree};

/// Language configuration for the index
pub struct LanguageConfig {
    pub language: Language,
    pub highlights_query: &'static str,
    pub name: &'static str,
}

impl LanguageConfig {
    /// C grammar with its bundled highlight query
    pub fn c() -> Self {
        Self {
            language: tree_sitter_c::LANGUAGE.into(),
            highlights_query: tree_sitter_c::HIGHLIGHT_QUERY,
            name: "c",
        }
    }

    /// Language for a file by extension; `None` for anything that isn't C
    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension().and_then(|ext| ext.to_str())? {
            "c" | "h" => Some(Self::c()),
            _ => None,
        }
    }
}

pub struct StructuralIndex {
    parser: Parser,
    language: Language,
    name: &'static str,
    tree: Option<Tree>,
    /// Mirror revision the current tree was parsed from
    parsed_revision: Option<u64>,
    /// Compiled queries keyed by source
    queries: HashMap<String, Arc<Query>>,
}

impl StructuralIndex {
    pub fn new(config: &LanguageConfig) -> Result<Self> {
        let mut parser = Parser::new();
        parser.set_language(&config.language)?;

        Ok(Self {
            parser,
            language: config.language.clone(),
            name: config.name,
            tree: None,
            parsed_revision: None,
            queries: HashMap::new(),
        })
    }

    pub fn name(&self) -> &str {
        self.name
    }

    /// Parse `text` from scratch, replacing the previous tree
    ///
    /// On failure the old tree is dropped as well, so nothing downstream reads
    /// a tree older than the text it is paired with.
    pub fn reparse(&mut self, text: &str, revision: u64) -> Result<()> {
        self.tree = None;
        self.parsed_revision = None;

        let tree = self.parser.parse(text, None).ok_or(AssistError::ParseFailed)?;
        tracing::debug!(
            bytes = text.len(),
            revision,
            has_error = tree.root_node().has_error(),
            "reparsed"
        );
        self.tree = Some(tree);
        self.parsed_revision = Some(revision);
        Ok(())
    }

    pub fn tree(&self) -> Option<&Tree> {
        self.tree.as_ref()
    }

    pub fn parsed_revision(&self) -> Option<u64> {
        self.parsed_revision
    }

    pub fn root(&self) -> Option<Node<'_>> {
        self.tree.as_ref().map(Tree::root_node)
    }

    /// Smallest node covering `byte`
    pub fn node_at(&self, byte: usize) -> Option<Node<'_>> {
        self.root()?.descendant_for_byte_range(byte, byte)
    }

    /// Compile a query, or hand back the cached one for the same source
    pub fn compile(&mut self, name: &str, source: &str) -> Result<Arc<Query>> {
        if let Some(query) = self.queries.get(source) {
            return Ok(query.clone());
        }
        let query = Query::new(&self.language, source).map_err(|source| AssistError::Query {
            name: name.to_string(),
            source,
        })?;
        tracing::debug!(
            name,
            patterns = query.pattern_count(),
            captures = query.capture_names().len(),
            "compiled query"
        );
        let query = Arc::new(query);
        self.queries.insert(source.to_string(), query.clone());
        Ok(query)
    }

    /// S-expression of the whole tree, for debugging
    pub fn to_sexp(&self) -> Option<String> {
        self.root().map(|root| root.to_sexp())
    }
}

/// Nearest ancestor of `node` (itself included) whose kind is `kind`
pub fn enclosing<'tree>(node: Node<'tree>, kind: &str) -> Option<Node<'tree>> {
    let mut current = Some(node);
    while let Some(n) = current {
        if n.kind() == kind {
            return Some(n);
        }
        current = n.parent();
    }
    None
}

/// Run `query` under `scope`, optionally restricted to `byte_range`
///
/// Each capture is handed to `visit` as it is produced; returning
/// `ControlFlow::Break` stops the query. Capture ids missing from the query's
/// capture table are dropped.
pub fn run_query<'tree>(
    query: &Query,
    scope: Node<'tree>,
    text: &[u8],
    byte_range: Option<Range<usize>>,
    mut visit: impl FnMut(&str, Node<'tree>) -> ControlFlow<()>,
) {
    let mut cursor = QueryCursor::new();
    if let Some(range) = byte_range {
        cursor.set_byte_range(range);
    }

    let capture_names = query.capture_names();
    let mut matches = cursor.matches(query, scope, text);
    while let Some(m) = matches.next() {
        for capture in m.captures {
            let Some(name) = capture_names.get(capture.index as usize) else {
                continue;
            };
            if visit(name, capture.node).is_break() {
                return;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parsed(text: &str) -> StructuralIndex {
        let mut index = StructuralIndex::new(&LanguageConfig::c()).unwrap();
        index.reparse(text, 1).unwrap();
        index
    }

    #[test]
    fn test_node_at_and_enclosing() {
        let text = "int main(void) {\n    return 0;\n}";
        let index = parsed(text);

        let zero = text.find('0').unwrap();
        let node = index.node_at(zero).unwrap();
        assert_eq!(node.kind(), "number_literal");

        let func = enclosing(node, "function_definition").unwrap();
        assert_eq!(func.start_byte(), 0);
        assert!(enclosing(node, "struct_specifier").is_none());
    }

    #[test]
    fn test_file_extension_detection() {
        let c = LanguageConfig::from_path(Path::new("src/main.c"));
        assert_eq!(c.map(|config| config.name), Some("c"));

        let header = LanguageConfig::from_path(Path::new("include/list.h"));
        assert!(header.is_some());

        assert!(LanguageConfig::from_path(Path::new("notes.txt")).is_none());
        assert!(LanguageConfig::from_path(Path::new("Makefile")).is_none());
        assert!(LanguageConfig::from_path(Path::new("main.cpp")).is_none());
    }

    #[test]
    fn test_query_cache_reuses_compiled_query() {
        let mut index = parsed("int x;");
        let a = index.compile("ids", "(identifier) @id").unwrap();
        let b = index.compile("ids", "(identifier) @id").unwrap();
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn test_bad_query_is_an_error() {
        let mut index = parsed("int x;");
        let err = index.compile("broken", "(not_a_node_kind) @x").unwrap_err();
        assert!(matches!(err, AssistError::Query { .. }));
    }

    #[test]
    fn test_run_query_with_range_and_break() {
        let text = "int a;\nint b;\nint c;";
        let mut index = parsed(text);
        let query = index.compile("ids", "(identifier) @id").unwrap();
        let root = index.root().unwrap();

        let mut seen = Vec::new();
        run_query(&query, root, text.as_bytes(), Some(7..13), |name, node| {
            assert_eq!(name, "id");
            seen.push(&text[node.byte_range()]);
            ControlFlow::Continue(())
        });
        assert_eq!(seen, vec!["b"]);

        let mut count = 0;
        run_query(&query, root, text.as_bytes(), None, |_, _| {
            count += 1;
            ControlFlow::Break(())
        });
        assert_eq!(count, 1);
    }

    #[test]
    fn test_reparse_replaces_tree() {
        let mut index = parsed("int a;");
        index.reparse("int a; int b;", 2).unwrap();
        assert_eq!(index.parsed_revision(), Some(2));
        assert_eq!(index.root().unwrap().named_child_count(), 2);
    }
}
