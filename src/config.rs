//! Command line and engine configuration

use clap::Parser;
use std::path::PathBuf;

/// Terminal C editor with tree-sitter highlighting and scope-aware completion
#[derive(Debug, Parser)]
#[command(name = "tiny-kilo", version, about)]
pub struct Args {
    /// File to edit; starts on an empty `temp.c` when omitted
    pub file: Option<PathBuf>,

    /// Word list for dictionary completion, one word per line
    #[arg(long, default_value = "assets/ckeys.txt")]
    pub dictionary: PathBuf,

    /// Highlight query to use instead of the bundled C one
    #[arg(long)]
    pub highlights: Option<PathBuf>,

    /// Write logs here (nothing is logged otherwise)
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Log filter, e.g. `debug` or `tiny_kilo::syntax=trace`
    #[arg(long)]
    pub log_level: Option<String>,

    /// Write the initial parse tree as an S-expression and keep going
    #[arg(long)]
    pub dump_tree: Option<PathBuf>,

    /// Most suggestions shown at once
    #[arg(long, default_value_t = 10)]
    pub max_suggestions: usize,
}

/// Knobs for the assistance engine
#[derive(Clone, Debug)]
pub struct EngineConfig {
    pub dictionary: Option<PathBuf>,
    pub highlights: Option<PathBuf>,
    pub max_suggestions: usize,
    pub min_word_len: usize,
    pub max_spans: usize,
    /// Identifiers this long or longer are never suggested
    pub max_word_len: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            dictionary: None,
            highlights: None,
            max_suggestions: 10,
            min_word_len: 2,
            max_spans: 1024,
            max_word_len: 256,
        }
    }
}

impl From<&Args> for EngineConfig {
    fn from(args: &Args) -> Self {
        Self {
            dictionary: Some(args.dictionary.clone()),
            highlights: args.highlights.clone(),
            max_suggestions: args.max_suggestions,
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_from_cli() {
        let args = Args::parse_from(["tiny-kilo"]);
        let config = EngineConfig::from(&args);

        assert!(args.file.is_none());
        assert_eq!(config.dictionary, Some(PathBuf::from("assets/ckeys.txt")));
        assert_eq!(config.max_suggestions, 10);
        assert_eq!(config.max_spans, 1024);
    }

    #[test]
    fn test_overrides() {
        let args = Args::parse_from([
            "tiny-kilo",
            "main.c",
            "--max-suggestions",
            "4",
            "--highlights",
            "q.scm",
        ]);
        let config = EngineConfig::from(&args);

        assert_eq!(args.file, Some(PathBuf::from("main.c")));
        assert_eq!(config.max_suggestions, 4);
        assert_eq!(config.highlights, Some(PathBuf::from("q.scm")));
    }
}
