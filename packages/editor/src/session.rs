//! # Editing Session
//!
//! One open mind map: the working graph, its undo history and its autosave
//! engine, with an explicit open/close lifecycle.
//!
//! ```text
//! builder(storage).open() ──► apply_change / undo / redo / import ...
//!                                   │            (each one marks dirty)
//!                      tick() ──────┤ debounced save when the quiet period ends
//!                  save_now() ──────┘ immediate save, cancels the timer
//!                     close() ──► final save
//! ```
//!
//! Dropping an open session runs [`MindMapSession::close`].

use mindmap_codecs::Format;
use mindmap_model::{
    flow_to_tree, tree_to_flow, tree_to_flow_preserving, Graph, GraphEdge, GraphNode, TreeNode,
};

use crate::autosave::{
    Autosave, AutosaveConfig, AutosaveObserver, AutosaveRecord, InitOutcome, SaveOutcome,
    SaveSlot, SaveStatus,
};
use crate::clock::{Clock, SystemClock};
use crate::errors::SessionError;
use crate::history::{History, HistoryConfig, HistoryListEntry, HistoryPosition};
use crate::storage::Storage;

/// Root of a brand new map
pub const DEFAULT_ROOT_ID: &str = "root";
pub const DEFAULT_ROOT_CONTENT: &str = "Central Topic";

#[derive(Debug, Clone, Copy, Default)]
pub struct SessionConfig {
    pub history: HistoryConfig,
    pub autosave: AutosaveConfig,
}

/// How to settle an autosave conflict found on open
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictChoice {
    /// Replace the working graph with the stored record and save it again
    Restore,
    /// Delete the stored record and keep the working graph
    Discard,
}

pub struct SessionBuilder<S: Storage> {
    storage: S,
    config: SessionConfig,
    clock: Box<dyn Clock + Send>,
    observers: Vec<Box<dyn AutosaveObserver>>,
    initial: Option<TreeNode>,
}

impl<S: Storage> SessionBuilder<S> {
    pub fn config(mut self, config: SessionConfig) -> Self {
        self.config = config;
        self
    }

    pub fn clock(mut self, clock: impl Clock + Send + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    /// Register an observer before the stored record is loaded
    pub fn observer(mut self, observer: impl AutosaveObserver + 'static) -> Self {
        self.observers.push(Box::new(observer));
        self
    }

    /// Tree to start from when nothing is continued
    pub fn initial(mut self, tree: TreeNode) -> Self {
        self.initial = Some(tree);
        self
    }

    /// Load the latest autosave and start the session
    ///
    /// A recent record is continued. An old one is reported as a conflict
    /// and the session starts from the initial tree until it is resolved.
    pub fn open(self) -> (MindMapSession<S>, InitOutcome) {
        let mut autosave = Autosave::new(self.storage, self.config.autosave);
        for observer in self.observers {
            autosave.add_observer(observer);
        }

        let outcome = autosave.load(self.clock.now());
        let graph = match &outcome {
            InitOutcome::Continued(record) => Graph::new(record.nodes.clone(), record.edges.clone()),
            InitOutcome::Fresh | InitOutcome::Conflict(_) => {
                let tree = self
                    .initial
                    .unwrap_or_else(|| TreeNode::new(DEFAULT_ROOT_ID, DEFAULT_ROOT_CONTENT));
                tree_to_flow(&tree)
            }
        };

        let mut history = History::from_config(self.config.history);
        history.reset(graph.nodes.clone(), graph.edges.clone());
        tracing::debug!("Opened session with {} nodes", graph.nodes.len());

        let session = MindMapSession {
            graph,
            history,
            autosave,
            clock: self.clock,
            open: true,
        };
        (session, outcome)
    }
}

/// An open mind map document
pub struct MindMapSession<S: Storage> {
    graph: Graph,
    history: History,
    autosave: Autosave<S>,
    clock: Box<dyn Clock + Send>,
    open: bool,
}

impl<S: Storage> MindMapSession<S> {
    pub fn builder(storage: S) -> SessionBuilder<S> {
        SessionBuilder {
            storage,
            config: SessionConfig::default(),
            clock: Box::new(SystemClock),
            observers: Vec::new(),
            initial: None,
        }
    }

    /// Open with default settings and the system clock
    pub fn open(storage: S) -> (Self, InitOutcome) {
        Self::builder(storage).open()
    }

    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn status(&self) -> &SaveStatus {
        self.autosave.status()
    }

    pub fn autosave(&self) -> &Autosave<S> {
        &self.autosave
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    /// Replace the working graph with an edited one and record it
    ///
    /// Returns the history label of the change.
    pub fn apply_change(
        &mut self,
        nodes: Vec<GraphNode>,
        edges: Vec<GraphEdge>,
    ) -> Result<String, SessionError> {
        self.ensure_open()?;
        let now = self.clock.now();

        let label = self
            .history
            .commit(nodes.clone(), edges.clone(), now)?
            .label
            .clone();
        self.graph = Graph::new(nodes, edges);
        self.autosave.mark_dirty(now);
        Ok(label)
    }

    /// Undo the latest change, returning its label
    pub fn undo(&mut self) -> Option<String> {
        if !self.open {
            return None;
        }
        let label = self.history.undo()?.label.clone();
        self.show_current();
        Some(label)
    }

    /// Redo the latest undone change, returning its label
    pub fn redo(&mut self) -> Option<String> {
        if !self.open {
            return None;
        }
        let label = self.history.redo()?.label.clone();
        self.show_current();
        Some(label)
    }

    /// Jump to any listed history entry; `false` if the position is out of range
    pub fn jump_to_history(&mut self, position: HistoryPosition) -> bool {
        if !self.open || self.history.jump_to(position).is_none() {
            return false;
        }
        self.show_current();
        true
    }

    pub fn full_history(&self) -> Vec<HistoryListEntry> {
        self.history.full_history()
    }

    /// The working graph as a tree
    pub fn tree(&self) -> Result<TreeNode, SessionError> {
        Ok(flow_to_tree(&self.graph.nodes, &self.graph.edges)?)
    }

    /// Replace the map with a parsed document; nothing changes if parsing fails
    pub fn import(&mut self, format: Format, text: &str) -> Result<String, SessionError> {
        self.ensure_open()?;
        let tree = mindmap_codecs::parse(format, text)?;
        let graph = tree_to_flow_preserving(&tree, &self.graph.nodes);
        tracing::info!("Imported {} document with {} nodes", format, graph.nodes.len());
        self.apply_change(graph.nodes, graph.edges)
    }

    /// Render the map in `format`
    pub fn export(&self, format: Format) -> Result<String, SessionError> {
        let tree = self.tree()?;
        Ok(mindmap_codecs::serialize(format, &tree)?)
    }

    /// Run the debounced save if its quiet period has ended
    ///
    /// Failures only show up in the status; the next quiet period retries.
    pub fn tick(&mut self) -> Option<SaveOutcome> {
        if !self.open || !self.autosave.fire(self.clock.now()) {
            return None;
        }
        let record = self.record();
        self.autosave.save(&record, self.clock.local_offset()).ok()
    }

    /// Save immediately, cancelling any pending debounced save
    pub fn save_now(&mut self) -> Result<SaveOutcome, SessionError> {
        self.ensure_open()?;
        if self.autosave.pending_conflict().is_some() {
            return Err(SessionError::ConflictPending);
        }
        let record = self.record();
        Ok(self.autosave.save(&record, self.clock.local_offset())?)
    }

    /// Settle the conflict reported by `open`
    pub fn resolve_conflict(&mut self, choice: ConflictChoice) -> Result<(), SessionError> {
        self.ensure_open()?;
        let record = self.autosave.take_conflict().ok_or(SessionError::NoConflict)?;

        match choice {
            ConflictChoice::Restore => {
                tracing::info!("Restoring autosave from {}", record.saved_at);
                self.graph = Graph::new(record.nodes, record.edges);
                self.history.reset(self.graph.nodes.clone(), self.graph.edges.clone());

                // Rewrite the record with a fresh timestamp so the next open continues it
                self.autosave.mark_dirty(self.clock.now());
                if let Err(e) = self.save_now() {
                    tracing::warn!("Restored state not saved yet: {}", e);
                }
            }
            ConflictChoice::Discard => {
                self.autosave.discard_latest()?;
                self.autosave.mark_dirty(self.clock.now());
            }
        }
        Ok(())
    }

    /// Recovery slots, most recent first
    pub fn save_slots(&self) -> Result<Vec<SaveSlot>, SessionError> {
        Ok(self.autosave.slots()?)
    }

    /// Load a recovery slot into the working graph as an undoable change
    pub fn restore_save_slot(&mut self, index: usize) -> Result<SaveSlot, SessionError> {
        self.ensure_open()?;
        let slot = self
            .autosave
            .restore_slot(index)?
            .ok_or(SessionError::NoSuchSlot(index))?;
        self.apply_change(slot.record.nodes.clone(), slot.record.edges.clone())?;
        tracing::info!("Restored save slot {:?}", slot.label);
        Ok(slot)
    }

    pub fn delete_save_slot(&mut self, index: usize) -> Result<SaveSlot, SessionError> {
        self.autosave
            .delete_slot(index)?
            .ok_or(SessionError::NoSuchSlot(index))
    }

    /// Final save and teardown; later calls are no-ops
    pub fn close(&mut self) -> Result<(), SessionError> {
        if !self.open {
            return Ok(());
        }
        self.open = false;

        if self.autosave.status().has_unsaved_changes() && self.autosave.pending_conflict().is_none() {
            let record = self.record();
            self.autosave.save(&record, self.clock.local_offset())?;
        }
        tracing::debug!("Closed session");
        Ok(())
    }

    fn ensure_open(&self) -> Result<(), SessionError> {
        if self.open {
            Ok(())
        } else {
            Err(SessionError::Closed)
        }
    }

    fn show_current(&mut self) {
        self.graph = match self.history.current() {
            Some(snapshot) => Graph::new(snapshot.nodes.clone(), snapshot.edges.clone()),
            None => Graph::default(),
        };
        self.autosave.mark_dirty(self.clock.now());
    }

    fn record(&self) -> AutosaveRecord {
        let tree = match self.tree() {
            Ok(tree) => Some(tree),
            Err(e) => {
                tracing::warn!("Saving graph without tree: {}", e);
                None
            }
        };
        AutosaveRecord {
            nodes: self.graph.nodes.clone(),
            edges: self.graph.edges.clone(),
            tree,
            saved_at: self.clock.now(),
        }
    }
}

impl<S: Storage> Drop for MindMapSession<S> {
    fn drop(&mut self) {
        if let Err(e) = self.close() {
            tracing::warn!("Final save failed: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::storage::MemoryStorage;
    use chrono::{TimeZone, Utc};

    fn clock() -> ManualClock {
        ManualClock::new(Utc.with_ymd_and_hms(2024, 4, 2, 9, 0, 0).unwrap())
    }

    fn sample() -> TreeNode {
        TreeNode::new("root", "Root").with_child(TreeNode::new("a", "A"))
    }

    fn with_child(session: &MindMapSession<MemoryStorage>, id: &str, parent: &str) -> Graph {
        let mut graph = session.graph().clone();
        graph.nodes.push(GraphNode::new(id, id.to_uppercase()));
        graph.edges.push(GraphEdge::hierarchical(parent, id));
        graph
    }

    #[test]
    fn test_fresh_session_starts_from_initial_tree() {
        let (session, outcome) = MindMapSession::builder(MemoryStorage::new())
            .clock(clock())
            .initial(sample())
            .open();

        assert_eq!(outcome, InitOutcome::Fresh);
        assert_eq!(session.tree().unwrap(), sample());
        assert_eq!(session.status(), &SaveStatus::Saved);
        assert!(!session.history().can_undo());
    }

    #[test]
    fn test_change_then_undo_redo() {
        let (mut session, _) = MindMapSession::builder(MemoryStorage::new())
            .clock(clock())
            .initial(sample())
            .open();

        let graph = with_child(&session, "b", "a");
        assert_eq!(session.apply_change(graph.nodes, graph.edges).unwrap(), "Added child node");
        assert_eq!(session.status(), &SaveStatus::Unsaved);

        assert_eq!(session.undo().as_deref(), Some("Added child node"));
        assert_eq!(session.tree().unwrap(), sample());

        session.redo();
        assert_eq!(session.graph().nodes.len(), 3);
        assert_eq!(session.undo().as_deref(), Some("Added child node"));
        assert!(session.undo().is_none());
    }

    #[test]
    fn test_failed_import_leaves_state_untouched() {
        let (mut session, _) = MindMapSession::builder(MemoryStorage::new())
            .clock(clock())
            .initial(sample())
            .open();

        let before = session.graph().clone();
        assert!(session.import(Format::Opml, "<opml><body>").is_err());
        assert!(session.import(Format::Dot, "digraph {}").is_err());
        assert_eq!(session.graph(), &before);
        assert_eq!(session.history().past_len(), 0);
    }

    #[test]
    fn test_import_keeps_positions_of_known_nodes() {
        let (mut session, _) = MindMapSession::builder(MemoryStorage::new())
            .clock(clock())
            .initial(sample())
            .open();

        let mut graph = session.graph().clone();
        graph.nodes[1].position.x = 777.0;
        session.apply_change(graph.nodes, graph.edges).unwrap();

        let json = r#"{"id":"root","content":"Root","children":[{"id":"a","content":"A2"}]}"#;
        assert_eq!(session.import(Format::Native, json).unwrap(), "Edited text: \"A2\"");
        assert_eq!(session.graph().node("a").unwrap().position.x, 777.0);
    }

    #[test]
    fn test_tick_saves_after_quiet_period() {
        let storage = MemoryStorage::new();
        let clock = clock();
        let (mut session, _) = MindMapSession::builder(storage.clone())
            .clock(clock.clone())
            .initial(sample())
            .open();

        let graph = with_child(&session, "b", "root");
        session.apply_change(graph.nodes, graph.edges).unwrap();

        clock.advance(chrono::Duration::seconds(29));
        assert_eq!(session.tick(), None);
        clock.advance(chrono::Duration::seconds(1));
        assert_eq!(session.tick(), Some(SaveOutcome::Saved));
        assert_eq!(session.status(), &SaveStatus::Saved);
        assert_eq!(session.save_slots().unwrap().len(), 1);
    }

    #[test]
    fn test_drop_performs_final_save() {
        let storage = MemoryStorage::new();
        {
            let (mut session, _) = MindMapSession::builder(storage.clone())
                .clock(clock())
                .initial(sample())
                .open();
            let graph = with_child(&session, "b", "root");
            session.apply_change(graph.nodes, graph.edges).unwrap();
        }

        let (session, outcome) = MindMapSession::builder(storage).clock(clock()).open();
        assert!(matches!(outcome, InitOutcome::Continued(_)));
        assert_eq!(session.graph().nodes.len(), 3);
    }

    #[test]
    fn test_closed_session_rejects_changes() {
        let (mut session, _) = MindMapSession::builder(MemoryStorage::new()).clock(clock()).open();
        session.close().unwrap();

        let graph = session.graph().clone();
        assert!(matches!(
            session.apply_change(graph.nodes, graph.edges),
            Err(SessionError::Closed)
        ));
        assert!(session.undo().is_none());
    }
}
