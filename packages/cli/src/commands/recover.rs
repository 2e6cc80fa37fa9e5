use super::{resolve_format, write_output};
use crate::config::MindMapConfig;
use anyhow::{anyhow, Result};
use chrono::{Local, Offset, Utc};
use clap::{Args, Subcommand};
use colored::Colorize;
use mindmap_codecs::{serialize, Format};
use mindmap_editor::{Autosave, AutosaveRecord, FileStorage};
use mindmap_model::{flow_to_tree, TreeNode};
use std::path::{Path, PathBuf};

#[derive(Debug, Args)]
pub struct RecoverArgs {
    #[command(subcommand)]
    pub action: RecoverAction,
}

#[derive(Debug, Subcommand)]
pub enum RecoverAction {
    /// List save slots, newest first
    List,

    /// Write a save slot out as a file
    Restore {
        /// Slot index as shown by `list`
        index: usize,

        /// Output file (prints native JSON to stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Delete a save slot
    Delete {
        /// Slot index as shown by `list`
        index: usize,
    },
}

pub fn recover(args: RecoverArgs, cwd: &Path) -> Result<()> {
    let config = MindMapConfig::load(cwd)?;
    let dir = config.get_storage_dir(cwd);
    let mut autosave = Autosave::new(FileStorage::new(&dir), config.autosave_config());

    match args.action {
        RecoverAction::List => {
            let slots = autosave.slots()?;
            if slots.is_empty() {
                println!("No save slots in {}", dir.display());
                return Ok(());
            }

            let now = Utc::now();
            let offset = Local::now().offset().fix();
            println!("{} {}", "Save slots:".bright_blue().bold(), dir.display());
            for (index, slot) in slots.iter().enumerate() {
                println!(
                    "  {} {:<24} {} nodes",
                    format!("[{}]", index).bold(),
                    slot.display_label(now, offset),
                    slot.record.nodes.len()
                );
            }
        }
        RecoverAction::Restore { index, output } => {
            let slot = autosave
                .restore_slot(index)?
                .ok_or_else(|| anyhow!("No save slot {}", index))?;
            let format = match output.as_deref() {
                Some(path) => resolve_format(None, Some(path))?,
                None => Format::Native,
            };

            let tree = record_tree(&slot.record)?;
            write_output(output.as_deref(), &serialize(format, &tree)?)?;
            if let Some(path) = &output {
                eprintln!("{} Restored {} to {}", "✓".green(), slot.label, path.display());
            }
        }
        RecoverAction::Delete { index } => {
            let slot = autosave
                .delete_slot(index)?
                .ok_or_else(|| anyhow!("No save slot {}", index))?;
            println!("{} Deleted {}", "✓".green(), slot.label);
        }
    }
    Ok(())
}

/// The tree stored with a record, rebuilt from its graph for older records
fn record_tree(record: &AutosaveRecord) -> Result<TreeNode> {
    match &record.tree {
        Some(tree) => Ok(tree.clone()),
        None => Ok(flow_to_tree(&record.nodes, &record.edges)?),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use mindmap_editor::{SaveOutcome, Storage};
    use mindmap_model::tree_to_flow;

    fn save_one(dir: &Path) {
        let tree = TreeNode::new("root", "Plan").with_child(TreeNode::new("a", "Research"));
        let graph = tree_to_flow(&tree);
        let mut autosave = Autosave::new(FileStorage::new(dir), Default::default());
        let record = AutosaveRecord {
            nodes: graph.nodes,
            edges: graph.edges,
            tree: None,
            saved_at: Utc.with_ymd_and_hms(2024, 3, 1, 10, 0, 0).unwrap(),
        };
        let outcome = autosave.save(&record, Utc.fix()).unwrap();
        assert_eq!(outcome, SaveOutcome::Saved);
    }

    #[test]
    fn test_restore_rebuilds_tree_from_graph() {
        let cwd = tempfile::tempdir().unwrap();
        save_one(&cwd.path().join(".mindmap"));

        let out = cwd.path().join("restored.opml");
        let args = RecoverArgs {
            action: RecoverAction::Restore {
                index: 0,
                output: Some(out.clone()),
            },
        };
        recover(args, cwd.path()).unwrap();

        let text = std::fs::read_to_string(out).unwrap();
        assert!(text.contains("Research"));
    }

    #[test]
    fn test_delete_missing_slot_fails() {
        let cwd = tempfile::tempdir().unwrap();
        save_one(&cwd.path().join(".mindmap"));

        let args = RecoverArgs {
            action: RecoverAction::Delete { index: 4 },
        };
        assert!(recover(args, cwd.path()).is_err());

        let storage = FileStorage::new(cwd.path().join(".mindmap"));
        assert!(storage.read(mindmap_editor::storage::SLOTS_KEY).unwrap().is_some());
    }
}
