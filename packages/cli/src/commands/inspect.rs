use super::{read_input, resolve_format};
use anyhow::Result;
use clap::Args;
use colored::Colorize;
use mindmap_codecs::parse;
use mindmap_model::tree_to_flow;
use std::path::PathBuf;

#[derive(Debug, Args)]
pub struct InspectArgs {
    /// Mind map to inspect
    pub input: PathBuf,

    /// Source format (inferred from the extension by default)
    #[arg(short, long)]
    pub from: Option<String>,

    /// Print the graph projection as JSON
    #[arg(long)]
    pub graph: bool,
}

pub fn inspect(args: InspectArgs) -> Result<()> {
    let format = resolve_format(args.from.as_deref(), Some(&args.input))?;
    let tree = parse(format, &read_input(&args.input)?)?;

    if args.graph {
        println!("{}", serde_json::to_string_pretty(&tree_to_flow(&tree))?);
        return Ok(());
    }

    let cross_links: usize = tree.walk().map(|(_, n)| n.cross_links().len()).sum();
    let with_notes = tree.walk().filter(|(_, n)| n.notes().is_some()).count();

    println!("{} {}", "Mind map:".bright_blue().bold(), tree.content);
    println!("  Format:      {}", format);
    println!("  Nodes:       {}", tree.node_count());
    println!("  Depth:       {}", tree.depth());
    println!("  Branches:    {}", tree.children.len());
    println!("  Cross-links: {}", cross_links);
    println!("  With notes:  {}", with_notes);
    println!();

    for (depth, node) in tree.walk() {
        let marker = if node.is_leaf() { "-" } else { "+" };
        println!("{}{} {}", "  ".repeat(depth), marker.dimmed(), node.content);
    }
    Ok(())
}
