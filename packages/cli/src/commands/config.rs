use crate::config::{MindMapConfig, DEFAULT_CONFIG_NAME};
use anyhow::Result;
use colored::Colorize;
use std::path::Path;

/// Print the effective settings
pub fn show_config(cwd: &Path) -> Result<()> {
    let config = MindMapConfig::load(cwd)?;
    let history = config.history_config();
    let autosave = config.autosave_config();

    let source = cwd.join(DEFAULT_CONFIG_NAME);
    if source.exists() {
        println!("{} {}", "Config:".bright_blue().bold(), source.display());
    } else {
        println!("{} {}", "Config:".bright_blue().bold(), "defaults".dimmed());
    }
    println!("  Undo levels:        {}", history.limit);
    println!("  Autosave after:     {}s", autosave.interval.as_secs());
    println!("  Conflict threshold: {}ms", autosave.conflict_threshold.as_millis());
    println!("  Save slots:         {}", autosave.slot_limit);
    println!("  Storage:            {}", config.get_storage_dir(cwd).display());
    Ok(())
}
