use super::{read_input, resolve_format, write_output};
use anyhow::{anyhow, Result};
use clap::Args;
use colored::Colorize;
use mindmap_codecs::{export as render, parse};
use std::path::PathBuf;

#[derive(Debug, Args)]
pub struct ExportArgs {
    /// Mind map to export
    pub input: PathBuf,

    /// Export format (dot, html, slides, outline)
    #[arg(short, long)]
    pub to: Option<String>,

    /// Output file (prints to stdout when omitted)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

pub fn export(args: ExportArgs) -> Result<()> {
    let from = resolve_format(None, Some(&args.input))?;
    let to = resolve_format(args.to.as_deref(), args.output.as_deref())?;
    if to.is_parseable() {
        return Err(anyhow!("{} is not an export format; use `mindmap convert`", to));
    }

    let tree = parse(from, &read_input(&args.input)?)?;
    write_output(args.output.as_deref(), &render(to, &tree)?)?;

    if let Some(path) = &args.output {
        eprintln!("{} Exported {} as {}", "✓".green(), path.display(), to);
    }
    Ok(())
}
