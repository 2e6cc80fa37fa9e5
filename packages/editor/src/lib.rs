//! # Mindmap Editor
//!
//! Editing engine for mind maps: undo/redo history, autosave with conflict
//! recovery, and the session object that ties them to one document.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │ canvas / CLI: produce edited node+edge lists│
//! └─────────────────────────────────────────────┘
//!                     ↓ apply_change
//! ┌─────────────────────────────────────────────┐
//! │ session: MindMapSession                     │
//! │  - History: labelled snapshots, undo/redo   │
//! │  - Autosave: debounce, slots, conflicts     │
//! │  - import/export through mindmap-codecs     │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ storage: FileStorage / MemoryStorage        │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! ## Core Principles
//!
//! 1. **Snapshots, not diffs**: every history entry is a full graph state
//! 2. **One writer per session**: no locking inside the engine
//! 3. **Conflicts need a decision**: an old autosave is never applied or overwritten silently
//!
//! ## Usage
//!
//! ```rust,ignore
//! use mindmap_editor::{ConflictChoice, FileStorage, InitOutcome, MindMapSession};
//!
//! let (mut session, outcome) = MindMapSession::open(FileStorage::new(".mindmap"));
//! if let InitOutcome::Conflict(_) = outcome {
//!     session.resolve_conflict(ConflictChoice::Restore)?;
//! }
//!
//! session.apply_change(nodes, edges)?;
//! session.tick(); // call periodically; saves after 30s without changes
//! session.close()?;
//! ```

pub mod autosave;
pub mod clock;
mod errors;
pub mod history;
pub mod labels;
pub mod session;
pub mod storage;

#[cfg(feature = "async")]
pub mod driver;

pub use autosave::{
    slot_label, Autosave, AutosaveConfig, AutosaveObserver, AutosaveRecord, DebounceTimer,
    InitOutcome, SaveOutcome, SaveSlot, SaveStatus,
};
pub use clock::{Clock, ManualClock, SystemClock};
pub use errors::{HistoryError, SessionError, StorageError};
pub use history::{History, HistoryConfig, HistoryEntry, HistoryListEntry, HistoryPosition, Snapshot};
pub use labels::{derive_label, LabelRule, LABEL_RULES};
pub use session::{ConflictChoice, MindMapSession, SessionBuilder, SessionConfig};
pub use storage::{FileStorage, MemoryStorage, Storage};

#[cfg(feature = "async")]
pub use driver::spawn_autosave_loop;
