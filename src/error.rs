//! Error taxonomy for the assistance engine and its host

use std::io;
use std::path::PathBuf;
use thiserror::Error;

pub type Result<T, E = AssistError> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum AssistError {
    /// Parser language binding rejected (ABI mismatch)
    #[error("language binding unavailable: {0}")]
    Language(#[from] tree_sitter::LanguageError),

    /// Query source does not compile against the grammar
    #[error("{name} query incompatible with grammar: {source}")]
    Query {
        name: String,
        #[source]
        source: tree_sitter::QueryError,
    },

    #[error("could not load dictionary {}: {source}", path.display())]
    Dictionary {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("i/o error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Parser returned no tree
    #[error("parser rejected the document")]
    ParseFailed,
}
