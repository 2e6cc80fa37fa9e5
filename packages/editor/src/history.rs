//! # Undo/Redo History
//!
//! Records full graph snapshots and moves between them.
//!
//! ## Design
//!
//! - `past` holds committed snapshots, oldest first; its last entry is the
//!   state currently shown
//! - `future` holds undone snapshots; the next one to redo is last
//! - Undo moves the last `past` entry to `future`, redo moves it back
//! - A new commit clears `future`
//! - `past` is bounded; the oldest entries are evicted first and fold into
//!   the baseline, so `current()` is defined even after eviction
//!
//! ## Example
//!
//! ```rust,ignore
//! let mut history = History::new();
//! history.reset(graph.nodes.clone(), graph.edges.clone());
//!
//! history.commit(edited.nodes, edited.edges, Utc::now())?;
//! assert_eq!(history.undo_label(), Some("Added child node"));
//!
//! history.undo();
//! let shown = history.current();
//! ```

use chrono::{DateTime, Utc};
use mindmap_model::graph::duplicate_id;
use mindmap_model::{GraphEdge, GraphNode};
use serde::{Deserialize, Serialize};

use crate::errors::HistoryError;
use crate::labels::{derive_label, Change, LabelRule, LABEL_RULES};

/// Default number of undo levels
pub const DEFAULT_HISTORY_LIMIT: usize = 50;

/// Label of the synthesized entry that marks the shown state in a listing
pub const CURRENT_STATE_LABEL: &str = "Current state";

/// Complete graph state
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<GraphEdge>,
}

/// A committed snapshot and what produced it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub snapshot: Snapshot,
    pub label: String,
    pub timestamp: DateTime<Utc>,
}

/// Address of an entry for [`History::jump_to`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryPosition {
    /// Index into the past, oldest first
    Past(usize),
    /// Index into the future, nearest first
    Future(usize),
}

/// One row of [`History::full_history`]
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryListEntry {
    pub label: String,
    pub timestamp: DateTime<Utc>,
    pub is_current: bool,
    /// `None` for the synthesized current-state row
    pub position: Option<HistoryPosition>,
}

#[derive(Debug, Clone, Copy)]
pub struct HistoryConfig {
    /// Maximum number of past entries (at least 1)
    pub limit: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            limit: DEFAULT_HISTORY_LIMIT,
        }
    }
}

/// Bounded undo/redo log of graph snapshots
#[derive(Debug)]
pub struct History {
    /// State before the oldest entry in `past`
    baseline: Option<Snapshot>,

    /// Committed entries (most recent last)
    past: Vec<HistoryEntry>,

    /// Undone entries (next to redo last)
    future: Vec<HistoryEntry>,

    limit: usize,

    rules: &'static [LabelRule],
}

impl History {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_HISTORY_LIMIT)
    }

    pub fn with_capacity(limit: usize) -> Self {
        Self::with_rules(limit, LABEL_RULES)
    }

    /// History with a custom label table
    pub fn with_rules(limit: usize, rules: &'static [LabelRule]) -> Self {
        Self {
            baseline: None,
            past: Vec::new(),
            future: Vec::new(),
            limit: limit.max(1),
            rules,
        }
    }

    pub fn from_config(config: HistoryConfig) -> Self {
        Self::with_capacity(config.limit)
    }

    /// Forget all entries and start from `nodes`/`edges` without recording them
    pub fn reset(&mut self, nodes: Vec<GraphNode>, edges: Vec<GraphEdge>) {
        self.baseline = Some(Snapshot { nodes, edges });
        self.past.clear();
        self.future.clear();
    }

    /// Record a new state, labelled against the state it replaces
    pub fn commit(
        &mut self,
        nodes: Vec<GraphNode>,
        edges: Vec<GraphEdge>,
        at: DateTime<Utc>,
    ) -> Result<&HistoryEntry, HistoryError> {
        if let Some(id) = duplicate_id(&nodes) {
            return Err(HistoryError::DuplicateNodeId(id.to_string()));
        }

        let empty = Snapshot::default();
        let previous = self.current().unwrap_or(&empty);
        let label = derive_label(
            self.rules,
            &Change {
                before_nodes: &previous.nodes,
                before_edges: &previous.edges,
                after_nodes: &nodes,
                after_edges: &edges,
            },
        );

        self.past.push(HistoryEntry {
            snapshot: Snapshot { nodes, edges },
            label,
            timestamp: at,
        });

        if self.past.len() > self.limit {
            let evicted = self.past.remove(0);
            self.baseline = Some(evicted.snapshot);
        }

        // A new edit makes every undone entry unreachable
        self.future.clear();

        let entry = &self.past[self.past.len() - 1];
        tracing::debug!("Recorded history entry {:?} ({} past)", entry.label, self.past.len());
        Ok(entry)
    }

    /// The state that should be shown
    pub fn current(&self) -> Option<&Snapshot> {
        self.past
            .last()
            .map(|entry| &entry.snapshot)
            .or(self.baseline.as_ref())
    }

    /// Undo the most recent entry, returning it; restore [`History::current`] afterwards
    pub fn undo(&mut self) -> Option<&HistoryEntry> {
        let entry = self.past.pop()?;
        self.future.push(entry);
        self.future.last()
    }

    /// Redo the most recently undone entry, returning the state to restore
    pub fn redo(&mut self) -> Option<&HistoryEntry> {
        let entry = self.future.pop()?;
        self.past.push(entry);
        self.past.last()
    }

    /// Make the addressed entry current, moving every entry crossed to the other side
    pub fn jump_to(&mut self, position: HistoryPosition) -> Option<&Snapshot> {
        match position {
            HistoryPosition::Past(index) => {
                if index >= self.past.len() {
                    return None;
                }
                while self.past.len() > index + 1 {
                    if let Some(entry) = self.past.pop() {
                        self.future.push(entry);
                    }
                }
            }
            HistoryPosition::Future(index) => {
                if index >= self.future.len() {
                    return None;
                }
                for _ in 0..=index {
                    if let Some(entry) = self.future.pop() {
                        self.past.push(entry);
                    }
                }
            }
        }
        self.current()
    }

    /// Past entries, then the current state, then future entries nearest first
    pub fn full_history(&self) -> Vec<HistoryListEntry> {
        let mut list: Vec<HistoryListEntry> = self
            .past
            .iter()
            .enumerate()
            .map(|(index, entry)| HistoryListEntry {
                label: entry.label.clone(),
                timestamp: entry.timestamp,
                is_current: false,
                position: Some(HistoryPosition::Past(index)),
            })
            .collect();

        list.push(HistoryListEntry {
            label: CURRENT_STATE_LABEL.to_string(),
            timestamp: self
                .past
                .last()
                .map(|entry| entry.timestamp)
                .unwrap_or_else(Utc::now),
            is_current: true,
            position: None,
        });

        list.extend(self.future.iter().rev().enumerate().map(|(index, entry)| {
            HistoryListEntry {
                label: entry.label.clone(),
                timestamp: entry.timestamp,
                is_current: false,
                position: Some(HistoryPosition::Future(index)),
            }
        }));

        list
    }

    pub fn can_undo(&self) -> bool {
        !self.past.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.future.is_empty()
    }

    pub fn past_len(&self) -> usize {
        self.past.len()
    }

    pub fn future_len(&self) -> usize {
        self.future.len()
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn past(&self) -> &[HistoryEntry] {
        &self.past
    }

    /// Label of the entry the next undo would revert
    pub fn undo_label(&self) -> Option<&str> {
        self.past.last().map(|entry| entry.label.as_str())
    }

    /// Label of the entry the next redo would reapply
    pub fn redo_label(&self) -> Option<&str> {
        self.future.last().map(|entry| entry.label.as_str())
    }

    /// Drop every entry, keeping the current state as the new baseline
    pub fn clear(&mut self) {
        if let Some(entry) = self.past.pop() {
            self.baseline = Some(entry.snapshot);
        }
        self.past.clear();
        self.future.clear();
    }
}

impl Default for History {
    fn default() -> Self {
        Self::new()
    }
}
