use super::{read_input, resolve_format, write_output};
use anyhow::{anyhow, Result};
use clap::Args;
use colored::Colorize;
use mindmap_codecs::{parse, serialize};
use std::path::PathBuf;

#[derive(Debug, Args)]
pub struct ConvertArgs {
    /// Mind map to convert
    pub input: PathBuf,

    /// Target format (json, freemind, opml, markdown, yaml, dot, html, slides, outline)
    #[arg(short, long)]
    pub to: Option<String>,

    /// Source format (inferred from the input extension by default)
    #[arg(short, long)]
    pub from: Option<String>,

    /// Output file (prints to stdout when omitted)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

pub fn convert(args: ConvertArgs) -> Result<()> {
    let from = resolve_format(args.from.as_deref(), Some(&args.input))?;
    let to = resolve_format(args.to.as_deref(), args.output.as_deref())?;
    if !from.is_parseable() {
        return Err(anyhow!("{} files cannot be read back", from));
    }

    let text = read_input(&args.input)?;
    let tree = parse(from, &text)?;
    let output = serialize(to, &tree)?;
    write_output(args.output.as_deref(), &output)?;

    if let Some(path) = &args.output {
        eprintln!(
            "{} {} ({}) → {} ({}), {} nodes",
            "✓".green(),
            args.input.display(),
            from,
            path.display(),
            to,
            tree.node_count()
        );
    }
    Ok(())
}
