//! Command-line entry point: reads an LC-3 assembly file, assembles it,
//! and writes the object byte stream. Diagnostic rendering (line/column,
//! caret underline) lives here, not in the library.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use lc3asm::error::{AssemblerError, LineIndex};
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(name = "lc3asm", about = "Assembles LC-3 source into a raw object byte stream")]
struct Cli {
    /// LC-3 assembly source file (.asm)
    input: PathBuf,

    /// Where to write the assembled object bytes. Defaults to `<input>.obj`.
    #[arg(short, long)]
    output: Option<PathBuf>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let output_path = cli.output.clone().unwrap_or_else(|| cli.input.with_extension("obj"));

    let source = fs::read_to_string(&cli.input)
        .with_context(|| format!("failed to read {}", cli.input.display()))?;
    info!(path = %cli.input.display(), bytes = source.len(), "read source");

    match lc3asm::assemble(&source) {
        Ok(bytes) => {
            fs::write(&output_path, &bytes)
                .with_context(|| format!("failed to write {}", output_path.display()))?;
            info!(path = %output_path.display(), words = bytes.len() / 2, "wrote object file");
            Ok(())
        }
        Err(errors) => {
            let index = LineIndex::new(&source);
            for err in &errors {
                error!("{}", render(&source, &index, &err));
            }
            anyhow::bail!("{} error(s) assembling {}", errors.len(), cli.input.display());
        }
    }
}

/// Renders an `AssemblerError` as `line:col: message` followed by the
/// offending source line and a caret underline.
fn render(source: &str, index: &LineIndex, err: &AssemblerError) -> String {
    let span = err.span();
    let position = index.position(span.start);
    let line_text = source.lines().nth(position.line - 1).unwrap_or("");
    let caret = " ".repeat(position.column) + "^";
    format!("{}:{}: {err}\n{line_text}\n{caret}", position.line, position.column)
}
