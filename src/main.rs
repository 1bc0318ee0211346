//! tiny-kilo: terminal C editor entry point

use anyhow::Context;
use clap::Parser;
use std::io::{self, BufWriter};
use std::path::PathBuf;
use tiny_kilo::terminal::{self, Input, TerminalGuard};
use tiny_kilo::{logging, Args, AssistEngine, Buffer, Editor, EngineConfig, LanguageConfig};

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let _guard = logging::init(args.log_file.as_deref(), args.log_level.as_deref())
        .context("failed to set up logging")?;

    let path = args.file.clone().unwrap_or_else(|| PathBuf::from("temp.c"));
    let buffer = if path.exists() {
        Buffer::open(&path).with_context(|| format!("failed to open {}", path.display()))?
    } else {
        let mut buffer = Buffer::new();
        buffer.set_path(&path);
        buffer
    };

    let config = EngineConfig::from(&args);
    let language = LanguageConfig::from_path(&path);
    if language.is_none() {
        tracing::info!(path = %path.display(), "not a C file, syntax features off");
    }
    let mut engine = AssistEngine::new(&config, language);

    if let Some(dump) = &args.dump_tree {
        if let Err(err) = engine.sync(&buffer) {
            tracing::warn!("could not parse for tree dump: {err}");
        }
        let sexp = engine.dump_tree().unwrap_or_default();
        std::fs::write(dump, sexp)
            .with_context(|| format!("failed to write parse tree to {}", dump.display()))?;
    }

    let term = TerminalGuard::enter().context("failed to enter raw mode")?;
    let (cols, rows) = term.size()?;
    let mut editor = Editor::new(buffer, engine, cols, rows);
    let mut out = BufWriter::new(io::stdout());

    while !editor.should_quit() {
        editor.draw(&mut out)?;
        match terminal::read_input()? {
            Input::Key(key) => editor.handle_key(key)?,
            Input::Resize(cols, rows) => editor.resize(cols, rows),
        }
    }

    tracing::info!("bye");
    Ok(())
}
