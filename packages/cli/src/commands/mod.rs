pub mod config;
pub mod convert;
pub mod export;
pub mod inspect;
pub mod recover;

pub use config::show_config;
pub use convert::{convert, ConvertArgs};
pub use export::{export, ExportArgs};
pub use inspect::{inspect, InspectArgs};
pub use recover::{recover, RecoverArgs};

use anyhow::{anyhow, Context, Result};
use mindmap_codecs::Format;
use std::fs;
use std::path::Path;

/// Format from an explicit name, else from the file extension
pub fn resolve_format(explicit: Option<&str>, path: Option<&Path>) -> Result<Format> {
    if let Some(name) = explicit {
        return Ok(name.parse()?);
    }
    match path {
        Some(path) => Format::from_path(path)
            .ok_or_else(|| anyhow!("Cannot infer a format from {}; pass it explicitly", path.display())),
        None => Err(anyhow!("No format given and no file to infer it from")),
    }
}

pub fn read_input(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
}

/// Write to `out`, or to stdout when no path is given
pub fn write_output(out: Option<&Path>, text: &str) -> Result<()> {
    match out {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent)?;
            }
            fs::write(path, text).with_context(|| format!("Failed to write {}", path.display()))
        }
        None => {
            print!("{}", text);
            Ok(())
        }
    }
}
