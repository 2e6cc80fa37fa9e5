//! # Autosave
//!
//! Debounced persistence of the working graph with recovery slots and
//! conflict detection across sessions.
//!
//! ## Records
//!
//! ```text
//! mindmap-autosave          latest AutosaveRecord (overwritten by every save)
//! mindmap-autosave-history  [SaveSlot], most recent first, bounded
//! ```
//!
//! ## Lifecycle
//!
//! ```text
//! load ──► Fresh | Continued(record) | Conflict(record)
//!
//! mark_dirty ──► status Unsaved, timer (re)scheduled
//! fire (deadline passed) or manual save ──► Saving ──► Saved | Error
//! ```
//!
//! A record older than the conflict threshold belongs to another session.
//! It is reported once through [`AutosaveObserver::on_conflict`] and blocks
//! every save until the caller takes it with [`Autosave::take_conflict`], so
//! a stale session can never silently overwrite it.

use chrono::{DateTime, FixedOffset, Utc};
use mindmap_model::{GraphEdge, GraphNode, TreeNode};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

use crate::errors::StorageError;
use crate::storage::{Storage, LATEST_KEY, SLOTS_KEY};

pub const DEFAULT_AUTOSAVE_INTERVAL: Duration = Duration::from_secs(30);
pub const DEFAULT_CONFLICT_THRESHOLD: Duration = Duration::from_millis(60_000);
pub const DEFAULT_SLOT_LIMIT: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AutosaveConfig {
    /// Quiet period after the last change before saving
    pub interval: Duration,

    /// Records older than this on load are treated as a conflict
    pub conflict_threshold: Duration,

    /// Maximum number of recovery slots kept
    pub slot_limit: usize,
}

impl Default for AutosaveConfig {
    fn default() -> Self {
        Self {
            interval: DEFAULT_AUTOSAVE_INTERVAL,
            conflict_threshold: DEFAULT_CONFLICT_THRESHOLD,
            slot_limit: DEFAULT_SLOT_LIMIT,
        }
    }
}

/// The latest saved state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AutosaveRecord {
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<GraphEdge>,

    /// Tree derived from the graph, absent if the graph was not a tree
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tree: Option<TreeNode>,

    pub saved_at: DateTime<Utc>,
}

impl AutosaveRecord {
    /// Age of the record at `now`; records from the future count as fresh
    pub fn age(&self, now: DateTime<Utc>) -> Duration {
        (now - self.saved_at).to_std().unwrap_or(Duration::ZERO)
    }
}

/// A labelled recovery snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveSlot {
    /// Label computed when the slot was written
    pub label: String,

    #[serde(flatten)]
    pub record: AutosaveRecord,
}

impl SaveSlot {
    /// Label relative to `now`, for listings shown later than the save
    pub fn display_label(&self, now: DateTime<Utc>, offset: FixedOffset) -> String {
        slot_label(self.record.saved_at, now, offset)
    }
}

/// Format a save time relative to `now` in the viewer's time zone
pub fn slot_label(saved_at: DateTime<Utc>, now: DateTime<Utc>, offset: FixedOffset) -> String {
    let saved = saved_at.with_timezone(&offset);
    let today = now.with_timezone(&offset).date_naive();
    let time = saved.format("%H:%M");

    if saved.date_naive() == today {
        format!("Today at {}", time)
    } else if today.pred_opt() == Some(saved.date_naive()) {
        format!("Yesterday at {}", time)
    } else {
        saved.format("%b %-d, %Y at %H:%M").to_string()
    }
}

/// Explicit cancellable deadline for the debounced save
#[derive(Debug, Clone)]
pub struct DebounceTimer {
    interval: Duration,
    deadline: Option<DateTime<Utc>>,
}

impl DebounceTimer {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            deadline: None,
        }
    }

    /// Start or restart the quiet period at `now`
    pub fn schedule(&mut self, now: DateTime<Utc>) {
        let interval = chrono::Duration::from_std(self.interval).unwrap_or(chrono::Duration::MAX);
        self.deadline = Some(now.checked_add_signed(interval).unwrap_or(DateTime::<Utc>::MAX_UTC));
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    pub fn deadline(&self) -> Option<DateTime<Utc>> {
        self.deadline
    }

    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        self.deadline.map_or(false, |deadline| now >= deadline)
    }

    /// Consume the deadline if it has passed
    pub fn fire(&mut self, now: DateTime<Utc>) -> bool {
        if self.is_due(now) {
            self.deadline = None;
            true
        } else {
            false
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveStatus {
    Saved,
    Unsaved,
    Saving,
    /// Last save failed; the change is still unsaved
    Error(String),
}

impl SaveStatus {
    pub fn has_unsaved_changes(&self) -> bool {
        matches!(self, SaveStatus::Unsaved | SaveStatus::Error(_))
    }
}

impl fmt::Display for SaveStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SaveStatus::Saved => write!(f, "saved"),
            SaveStatus::Unsaved => write!(f, "unsaved"),
            SaveStatus::Saving => write!(f, "saving"),
            SaveStatus::Error(message) => write!(f, "error: {}", message),
        }
    }
}

/// Receives status changes and conflicts
pub trait AutosaveObserver: Send {
    fn on_status(&mut self, _status: &SaveStatus) {}

    fn on_conflict(&mut self, _record: &AutosaveRecord, _age: Duration) {}
}

/// What loading the latest record found
#[derive(Debug, Clone, PartialEq)]
pub enum InitOutcome {
    /// Nothing stored
    Fresh,
    /// A recent record from the same working session
    Continued(AutosaveRecord),
    /// An old record that must be restored or discarded explicitly
    Conflict(AutosaveRecord),
}

/// Result of a save attempt that did not fail
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    Saved,
    /// Skipped because a conflict is waiting for a decision
    Suppressed,
}

pub struct Autosave<S: Storage> {
    storage: S,
    config: AutosaveConfig,
    timer: DebounceTimer,
    status: SaveStatus,
    pending_conflict: Option<AutosaveRecord>,
    observers: Vec<Box<dyn AutosaveObserver>>,
}

impl<S: Storage> Autosave<S> {
    pub fn new(storage: S, config: AutosaveConfig) -> Self {
        Self {
            storage,
            config,
            timer: DebounceTimer::new(config.interval),
            status: SaveStatus::Saved,
            pending_conflict: None,
            observers: Vec::new(),
        }
    }

    pub fn add_observer(&mut self, observer: Box<dyn AutosaveObserver>) {
        self.observers.push(observer);
    }

    pub fn config(&self) -> &AutosaveConfig {
        &self.config
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn status(&self) -> &SaveStatus {
        &self.status
    }

    pub fn timer(&self) -> &DebounceTimer {
        &self.timer
    }

    pub fn pending_conflict(&self) -> Option<&AutosaveRecord> {
        self.pending_conflict.as_ref()
    }

    /// Read the latest record and classify it against `now`
    pub fn load(&mut self, now: DateTime<Utc>) -> InitOutcome {
        let record = match self.read_latest() {
            Ok(Some(record)) => record,
            Ok(None) => return InitOutcome::Fresh,
            Err(e) => {
                tracing::warn!("Ignoring unreadable autosave: {}", e);
                return InitOutcome::Fresh;
            }
        };

        let age = record.age(now);
        if age > self.config.conflict_threshold {
            tracing::warn!(
                "Found autosave from {} ({}s old), waiting for restore or discard",
                record.saved_at,
                age.as_secs()
            );
            for observer in &mut self.observers {
                observer.on_conflict(&record, age);
            }
            self.pending_conflict = Some(record.clone());
            InitOutcome::Conflict(record)
        } else {
            tracing::debug!("Continuing autosave from {}", record.saved_at);
            InitOutcome::Continued(record)
        }
    }

    /// Take the pending conflict so the caller can restore or discard it
    pub fn take_conflict(&mut self) -> Option<AutosaveRecord> {
        self.pending_conflict.take()
    }

    /// Delete the latest record after the user chose not to restore it
    pub fn discard_latest(&mut self) -> Result<(), StorageError> {
        self.storage.remove(LATEST_KEY)?;
        tracing::info!("Discarded previous autosave");
        Ok(())
    }

    /// Note a change at `now` and restart the quiet period
    pub fn mark_dirty(&mut self, now: DateTime<Utc>) {
        self.timer.schedule(now);
        if self.status != SaveStatus::Unsaved {
            self.set_status(SaveStatus::Unsaved);
        }
    }

    /// Whether the debounced save should run at `now`; consumes the deadline
    pub fn fire(&mut self, now: DateTime<Utc>) -> bool {
        self.timer.fire(now)
    }

    /// Persist `record` as the latest state and prepend a recovery slot
    ///
    /// Failures are reported through the status before being returned, and
    /// the timer is rescheduled so the next quiet period retries.
    pub fn save(
        &mut self,
        record: &AutosaveRecord,
        offset: FixedOffset,
    ) -> Result<SaveOutcome, StorageError> {
        if self.pending_conflict.is_some() {
            tracing::debug!("Autosave suppressed until the pending conflict is resolved");
            return Ok(SaveOutcome::Suppressed);
        }

        self.timer.cancel();
        self.set_status(SaveStatus::Saving);

        match self.write_record(record, offset) {
            Ok(()) => {
                tracing::info!(
                    "Autosaved {} nodes at {}",
                    record.nodes.len(),
                    record.saved_at
                );
                self.set_status(SaveStatus::Saved);
                Ok(SaveOutcome::Saved)
            }
            Err(e) => {
                tracing::warn!("Autosave failed: {}", e);
                self.timer.schedule(record.saved_at);
                self.set_status(SaveStatus::Error(e.to_string()));
                Err(e)
            }
        }
    }

    /// Recovery slots, most recent first
    pub fn slots(&self) -> Result<Vec<SaveSlot>, StorageError> {
        match self.storage.read(SLOTS_KEY)? {
            Some(text) => Ok(serde_json::from_str(&text)?),
            None => Ok(Vec::new()),
        }
    }

    /// The slot at `index`; storage is left as is
    pub fn restore_slot(&self, index: usize) -> Result<Option<SaveSlot>, StorageError> {
        let mut slots = self.slots()?;
        if index >= slots.len() {
            return Ok(None);
        }
        Ok(Some(slots.swap_remove(index)))
    }

    /// Remove the slot at `index` and persist the rest in order
    pub fn delete_slot(&mut self, index: usize) -> Result<Option<SaveSlot>, StorageError> {
        let mut slots = self.slots()?;
        if index >= slots.len() {
            return Ok(None);
        }
        let removed = slots.remove(index);
        self.storage.write(SLOTS_KEY, &serde_json::to_string(&slots)?)?;
        tracing::info!("Deleted save slot {:?}", removed.label);
        Ok(Some(removed))
    }

    fn read_latest(&self) -> Result<Option<AutosaveRecord>, StorageError> {
        match self.storage.read(LATEST_KEY)? {
            Some(text) => Ok(Some(serde_json::from_str(&text)?)),
            None => Ok(None),
        }
    }

    fn write_record(&mut self, record: &AutosaveRecord, offset: FixedOffset) -> Result<(), StorageError> {
        // A corrupt slot list is replaced; any other read failure aborts the
        // save before anything is written so existing slots are never lost
        let mut slots = match self.slots() {
            Ok(slots) => slots,
            Err(StorageError::Corrupt(e)) => {
                tracing::warn!("Replacing corrupt save slots: {}", e);
                Vec::new()
            }
            Err(e) => return Err(e),
        };

        self.storage.write(LATEST_KEY, &serde_json::to_string(record)?)?;
        slots.insert(
            0,
            SaveSlot {
                label: slot_label(record.saved_at, record.saved_at, offset),
                record: record.clone(),
            },
        );
        slots.truncate(self.config.slot_limit);
        self.storage.write(SLOTS_KEY, &serde_json::to_string(&slots)?)?;
        Ok(())
    }

    fn set_status(&mut self, status: SaveStatus) {
        for observer in &mut self.observers {
            observer.on_status(&status);
        }
        self.status = status;
    }
}
