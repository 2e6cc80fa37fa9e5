//! Export-only renderers.
//!
//! These formats are derived from the tree and cannot be read back. Each one
//! renders every node and escapes text for its target; none of them fails
//! on a valid tree.

mod dot;
mod outline;
mod print;
mod slides;

pub use dot::DotExporter;
pub use outline::OutlineExporter;
pub use print::PrintExporter;
pub use slides::SlidesExporter;

/// Collapse a possibly multi-line label onto one line
pub(crate) fn one_line(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
