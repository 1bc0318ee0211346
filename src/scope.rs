//! Lexical scope lookup for identifier completion
//!
//! Each scope kind names the node that encloses it and a query listing the
//! names it declares. Kinds are consulted in a fixed priority order and the
//! first kind to offer a name keeps it.

use crate::error::Result;
use crate::structural::{enclosing, run_query, StructuralIndex};
use crate::text_mirror::TextMirror;
use indexmap::IndexMap;
use std::ops::ControlFlow;
use std::sync::Arc;
use tree_sitter::{Node, Query};

const LOCALS_QUERY: &str = r#"
(parameter_declaration declarator: (identifier) @local)
(parameter_declaration declarator: (pointer_declarator declarator: (identifier) @local))
(declaration declarator: (identifier) @local)
(declaration declarator: (init_declarator declarator: (identifier) @local))
(declaration declarator: (pointer_declarator declarator: (identifier) @local))
(declaration declarator: (init_declarator declarator: (pointer_declarator declarator: (identifier) @local)))
"#;

const FIELDS_QUERY: &str = "(field_identifier) @field";

const GLOBALS_QUERY: &str = r#"
(translation_unit (declaration declarator: (identifier) @global))
(translation_unit (declaration declarator: (init_declarator declarator: (identifier) @global)))
(translation_unit (declaration declarator: (pointer_declarator declarator: (identifier) @global)))
(translation_unit (declaration declarator: (function_declarator declarator: (identifier) @global)))
(translation_unit (function_definition declarator: (function_declarator declarator: (identifier) @global)))
(translation_unit (type_definition declarator: (type_identifier) @global))
(struct_specifier name: (type_identifier) @global)
(union_specifier name: (type_identifier) @global)
(enum_specifier name: (type_identifier) @global)
(enumerator name: (identifier) @global)
(preproc_def name: (identifier) @global)
(preproc_function_def name: (identifier) @global)
"#;

/// Where a suggested identifier was declared, in priority order
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ScopeKind {
    Local,
    StructField,
    UnionField,
    Global,
}

impl ScopeKind {
    pub const PRIORITY: [ScopeKind; 4] = [
        ScopeKind::Local,
        ScopeKind::StructField,
        ScopeKind::UnionField,
        ScopeKind::Global,
    ];

    /// Node kind bounding the scope; `None` means the whole document
    pub fn enclosing_kind(self) -> Option<&'static str> {
        match self {
            ScopeKind::Local => Some("function_definition"),
            ScopeKind::StructField => Some("struct_specifier"),
            ScopeKind::UnionField => Some("union_specifier"),
            ScopeKind::Global => None,
        }
    }

    fn query_source(self) -> &'static str {
        match self {
            ScopeKind::Local => LOCALS_QUERY,
            ScopeKind::StructField | ScopeKind::UnionField => FIELDS_QUERY,
            ScopeKind::Global => GLOBALS_QUERY,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScopedIdentifier {
    pub name: String,
    pub kind: ScopeKind,
}

pub struct ScopeResolver {
    queries: Vec<(ScopeKind, Arc<Query>)>,
    /// Longest identifier worth suggesting, in bytes
    max_word_len: usize,
}

impl ScopeResolver {
    pub fn new(index: &mut StructuralIndex, max_word_len: usize) -> Result<Self> {
        let queries = ScopeKind::PRIORITY
            .iter()
            .map(|&kind| {
                let query = index.compile(&format!("{kind:?} scope"), kind.query_source())?;
                Ok((kind, query))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            queries,
            max_word_len,
        })
    }

    /// Identifiers starting with `prefix` visible from the cursor at `(row, col)`
    ///
    /// The column left of the cursor decides the context. Any identifier
    /// occurrence covering that byte is skipped so the word being typed never
    /// suggests itself.
    pub fn identifiers_in_scope(
        &self,
        mirror: &TextMirror,
        index: &StructuralIndex,
        prefix: &str,
        row: usize,
        col: usize,
        limit: usize,
    ) -> Vec<ScopedIdentifier> {
        let Some(root) = index.root() else {
            return Vec::new();
        };
        if limit == 0 {
            return Vec::new();
        }

        let cursor_byte = mirror.byte_offset(row, col.saturating_sub(1));
        let Some(at_cursor) = index.node_at(cursor_byte) else {
            return Vec::new();
        };

        let text = mirror.text();
        let mut found: IndexMap<String, ScopeKind> = IndexMap::new();

        for (kind, query) in &self.queries {
            let scope: Node = match kind.enclosing_kind() {
                Some(node_kind) => match enclosing(at_cursor, node_kind) {
                    Some(node) => node,
                    None => continue,
                },
                None => root,
            };

            run_query(query, scope, mirror.as_bytes(), None, |_, node| {
                let range = node.byte_range();
                if range.contains(&cursor_byte) {
                    return ControlFlow::Continue(());
                }
                let Some(name) = text.get(range) else {
                    return ControlFlow::Continue(());
                };
                if name.is_empty() || name.len() >= self.max_word_len || !name.starts_with(prefix) {
                    return ControlFlow::Continue(());
                }

                found.entry(name.to_string()).or_insert(*kind);
                if found.len() >= limit {
                    ControlFlow::Break(())
                } else {
                    ControlFlow::Continue(())
                }
            });

            if found.len() >= limit {
                break;
            }
        }

        found
            .into_iter()
            .map(|(name, kind)| ScopedIdentifier { name, kind })
            .collect()
    }
}

/// Is the cursor on the name being declared by an `init_declarator`?
///
/// Suggestions are suppressed there: `int cou|nt = 0;` shouldn't offer
/// `counter` while the new name is still being written.
pub fn cursor_on_declarator_name(
    mirror: &TextMirror,
    index: &StructuralIndex,
    row: usize,
    col: usize,
) -> bool {
    let cursor_byte = mirror.byte_offset(row, col.saturating_sub(1));
    let Some(node) = index.node_at(cursor_byte) else {
        return false;
    };
    let Some(declarator) = enclosing(node, "init_declarator") else {
        return false;
    };
    declarator
        .child_by_field_name("declarator")
        .is_some_and(|name| name.byte_range().contains(&cursor_byte))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::structural::LanguageConfig;

    fn setup(rows: &[&str]) -> (TextMirror, StructuralIndex, ScopeResolver) {
        let mirror = TextMirror::from_rows(rows);
        let mut index = StructuralIndex::new(&LanguageConfig::c()).unwrap();
        index.reparse(mirror.text(), mirror.revision()).unwrap();
        let resolver = ScopeResolver::new(&mut index, 256).unwrap();
        (mirror, index, resolver)
    }

    fn names(ids: &[ScopedIdentifier]) -> Vec<&str> {
        ids.iter().map(|id| id.name.as_str()).collect()
    }

    #[test]
    fn test_parameters_are_locals() {
        let (mirror, index, resolver) = setup(&[
            "int add(int alpha, int beta) {",
            "    return alpha + beta;",
            "}",
        ]);
        // cursor after "al" in "return alpha"
        let ids = resolver.identifiers_in_scope(&mirror, &index, "al", 1, 13, 10);
        assert_eq!(
            ids,
            vec![ScopedIdentifier {
                name: "alpha".into(),
                kind: ScopeKind::Local
            }]
        );
    }

    #[test]
    fn test_limit_caps_results() {
        let (mirror, index, resolver) = setup(&[
            "int va1;",
            "int va2;",
            "int va3;",
            "int main(void) {",
            "    return 0;",
            "}",
        ]);
        let ids = resolver.identifiers_in_scope(&mirror, &index, "va", 4, 4, 2);
        assert_eq!(names(&ids), vec!["va1", "va2"]);
    }

    #[test]
    fn test_no_tree_means_no_identifiers() {
        let mirror = TextMirror::from_rows(["int x;"]);
        let mut index = StructuralIndex::new(&LanguageConfig::c()).unwrap();
        let resolver = ScopeResolver::new(&mut index, 256).unwrap();
        assert!(resolver
            .identifiers_in_scope(&mirror, &index, "x", 0, 5, 10)
            .is_empty());
        assert!(!cursor_on_declarator_name(&mirror, &index, 0, 5));
    }
}
