//! Integration tests for the editor
//!
//! Tests complete workflows: editing, history, autosave, recovery

use chrono::{DateTime, TimeZone, Utc};
use mindmap_codecs::Format;
use mindmap_editor::{
    AutosaveObserver, AutosaveRecord, ConflictChoice, FileStorage, History, HistoryPosition,
    InitOutcome, ManualClock, MemoryStorage, MindMapSession, SaveOutcome, SaveStatus, SessionError,
};
use mindmap_model::{tree_to_flow, GraphEdge, GraphNode, TreeNode};
use std::sync::{Arc, Mutex};
use std::time::Duration;

fn start() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 9, 10, 14, 0, 0).unwrap()
}

fn plan() -> TreeNode {
    TreeNode::new("root", "Plan")
        .with_child(TreeNode::new("a", "Research").with_notes("papers first"))
        .with_child(TreeNode::new("b", "Build"))
}

#[derive(Clone, Default)]
struct ConflictCounter(Arc<Mutex<Vec<Duration>>>);

impl AutosaveObserver for ConflictCounter {
    fn on_conflict(&mut self, _record: &AutosaveRecord, age: Duration) {
        self.0.lock().unwrap().push(age);
    }
}

// ========== History ==========

#[test]
fn test_sixty_commits_keep_fifty() {
    let mut history = History::new();
    for i in 0..60 {
        let nodes: Vec<GraphNode> = (0..=i).map(|n| GraphNode::new(format!("n{}", n), "x")).collect();
        history.commit(nodes, vec![], start()).unwrap();
    }

    assert_eq!(history.past_len(), 50);
    // Entries with 1..=10 nodes were evicted first
    assert_eq!(history.past()[0].snapshot.nodes.len(), 11);
}

#[test]
fn test_undo_then_redo_restores_state() {
    let mut history = History::new();
    let graph = tree_to_flow(&plan());
    history.reset(vec![], vec![]);
    history.commit(graph.nodes.clone(), graph.edges.clone(), start()).unwrap();

    let mut edited = graph.clone();
    edited.nodes[1].label = "Reading".to_string();
    history.commit(edited.nodes.clone(), edited.edges.clone(), start()).unwrap();

    let before = history.current().cloned();
    history.undo();
    history.redo();
    assert_eq!(history.current().cloned(), before);
}

#[test]
fn test_commit_after_undo_clears_future() {
    let mut history = History::new();
    history.commit(vec![GraphNode::new("a", "A")], vec![], start()).unwrap();
    history.commit(vec![GraphNode::new("a", "B")], vec![], start()).unwrap();

    history.undo();
    assert_eq!(history.future_len(), 1);

    history.commit(vec![GraphNode::new("a", "C")], vec![], start()).unwrap();
    assert_eq!(history.future_len(), 0);
    assert!(history.redo().is_none());
}

#[test]
fn test_child_and_sibling_labels_through_session() {
    let (mut session, _) = MindMapSession::builder(MemoryStorage::new())
        .clock(ManualClock::new(start()))
        .initial(plan())
        .open();

    let mut child = session.graph().clone();
    child.nodes.push(GraphNode::new("a1", "Survey"));
    child.edges.push(GraphEdge::hierarchical("a", "a1"));
    assert_eq!(session.apply_change(child.nodes, child.edges).unwrap(), "Added child node");

    // A detached node has no incoming hierarchical edge
    let mut loose = session.graph().clone();
    loose.nodes.push(GraphNode::new("c", "Ship"));
    assert_eq!(session.apply_change(loose.nodes, loose.edges).unwrap(), "Added sibling node");
    assert!(matches!(session.tree(), Err(SessionError::Convert(_))));
}

#[test]
fn test_jump_through_session_history() {
    let (mut session, _) = MindMapSession::builder(MemoryStorage::new())
        .clock(ManualClock::new(start()))
        .initial(plan())
        .open();

    for text in ["one", "two", "three"] {
        let mut graph = session.graph().clone();
        graph.nodes[0].label = text.to_string();
        session.apply_change(graph.nodes, graph.edges).unwrap();
    }

    assert!(session.jump_to_history(HistoryPosition::Past(0)));
    assert_eq!(session.graph().nodes[0].label, "one");

    let listing = session.full_history();
    assert_eq!(listing.len(), 4);
    assert!(listing[1].is_current);
    assert_eq!(listing[2].label, "Edited text: \"two\"");

    assert!(!session.jump_to_history(HistoryPosition::Future(5)));
    assert!(session.jump_to_history(HistoryPosition::Future(1)));
    assert_eq!(session.graph().nodes[0].label, "three");
}

// ========== Autosave and recovery ==========

#[test]
fn test_conflict_boundary_at_sixty_seconds() {
    for (age_ms, conflict) in [(60_000, false), (60_001, true)] {
        let storage = MemoryStorage::new();
        let clock = ManualClock::new(start());
        {
            let (mut session, _) = MindMapSession::builder(storage.clone())
                .clock(clock.clone())
                .initial(plan())
                .open();
            session.save_now().unwrap();
        }

        clock.advance(chrono::Duration::milliseconds(age_ms));
        let counter = ConflictCounter::default();
        let (_session, outcome) = MindMapSession::builder(storage)
            .clock(clock)
            .observer(counter.clone())
            .open();

        assert_eq!(matches!(outcome, InitOutcome::Conflict(_)), conflict, "age {}", age_ms);
        assert_eq!(counter.0.lock().unwrap().len(), conflict as usize, "age {}", age_ms);
    }
}

#[test]
fn test_conflict_restore_and_discard() {
    let storage = MemoryStorage::new();
    let clock = ManualClock::new(start());
    {
        let (mut session, _) = MindMapSession::builder(storage.clone())
            .clock(clock.clone())
            .initial(plan())
            .open();
        session.save_now().unwrap();
    }
    clock.advance(chrono::Duration::hours(3));

    // Restore brings the old graph back
    let (mut restored, _) = MindMapSession::builder(storage.clone()).clock(clock.clone()).open();
    assert!(matches!(restored.save_now(), Err(SessionError::ConflictPending)));
    restored.resolve_conflict(ConflictChoice::Restore).unwrap();
    assert_eq!(restored.tree().unwrap(), plan());
    assert!(matches!(
        restored.resolve_conflict(ConflictChoice::Restore),
        Err(SessionError::NoConflict)
    ));
    drop(restored);

    // Discard deletes the record and keeps the fresh map
    clock.advance(chrono::Duration::hours(3));
    let (mut discarded, outcome) = MindMapSession::builder(storage.clone()).clock(clock.clone()).open();
    assert!(matches!(outcome, InitOutcome::Conflict(_)));
    discarded.resolve_conflict(ConflictChoice::Discard).unwrap();
    assert_eq!(discarded.graph().nodes.len(), 1);
    assert_eq!(discarded.status(), &SaveStatus::Unsaved);
}

#[test]
fn test_restored_conflict_does_not_come_back() {
    let storage = MemoryStorage::new();
    let clock = ManualClock::new(start());
    {
        let (mut session, _) = MindMapSession::builder(storage.clone())
            .clock(clock.clone())
            .initial(plan())
            .open();
        session.save_now().unwrap();
    }
    clock.advance(chrono::Duration::hours(3));

    let (mut session, outcome) = MindMapSession::builder(storage.clone()).clock(clock.clone()).open();
    assert!(matches!(outcome, InitOutcome::Conflict(_)));
    session.resolve_conflict(ConflictChoice::Restore).unwrap();
    assert_eq!(session.status(), &SaveStatus::Saved);
    session.close().unwrap();
    drop(session);

    clock.advance(chrono::Duration::seconds(5));
    let (session, outcome) = MindMapSession::builder(storage).clock(clock).open();
    assert!(matches!(outcome, InitOutcome::Continued(_)));
    assert_eq!(session.tree().unwrap(), plan());
}

#[test]
fn test_conflict_reported_once_per_open() {
    let storage = MemoryStorage::new();
    let clock = ManualClock::new(start());
    {
        let (mut session, _) = MindMapSession::builder(storage.clone())
            .clock(clock.clone())
            .initial(plan())
            .open();
        session.save_now().unwrap();
    }
    clock.advance(chrono::Duration::hours(1));

    let counter = ConflictCounter::default();
    let (mut session, _) = MindMapSession::builder(storage.clone())
        .clock(clock.clone())
        .observer(counter.clone())
        .open();

    // Edits and timer ticks while undecided never report it again
    let mut graph = session.graph().clone();
    graph.nodes[0].label = "Renamed".to_string();
    session.apply_change(graph.nodes, graph.edges).unwrap();
    clock.advance(chrono::Duration::seconds(30));
    assert_eq!(session.tick(), Some(SaveOutcome::Suppressed));
    clock.advance(chrono::Duration::seconds(30));
    session.tick();
    assert!(matches!(session.save_now(), Err(SessionError::ConflictPending)));
    assert_eq!(counter.0.lock().unwrap().len(), 1);

    session.resolve_conflict(ConflictChoice::Discard).unwrap();
    drop(session);

    let (_session, outcome) = MindMapSession::builder(storage)
        .clock(clock)
        .observer(counter.clone())
        .open();
    assert!(matches!(outcome, InitOutcome::Continued(_)));
    assert_eq!(counter.0.lock().unwrap().len(), 1);
}

#[test]
fn test_delete_slot_keeps_relative_order() {
    let clock = ManualClock::new(start());
    let (mut session, _) = MindMapSession::builder(MemoryStorage::new())
        .clock(clock.clone())
        .initial(plan())
        .open();

    for _ in 0..4 {
        clock.advance(chrono::Duration::minutes(1));
        session.save_now().unwrap();
    }
    let before: Vec<String> = session.save_slots().unwrap().into_iter().map(|s| s.label).collect();
    assert_eq!(
        before,
        vec!["Today at 14:04", "Today at 14:03", "Today at 14:02", "Today at 14:01"]
    );

    session.delete_save_slot(2).unwrap();
    let after: Vec<String> = session.save_slots().unwrap().into_iter().map(|s| s.label).collect();
    assert_eq!(after, vec!["Today at 14:04", "Today at 14:03", "Today at 14:01"]);

    assert!(matches!(session.delete_save_slot(3), Err(SessionError::NoSuchSlot(3))));
}

#[test]
fn test_restore_slot_is_undoable() {
    let clock = ManualClock::new(start());
    let (mut session, _) = MindMapSession::builder(MemoryStorage::new())
        .clock(clock.clone())
        .initial(plan())
        .open();
    session.save_now().unwrap();

    let json = r#"{"id":"root","content":"Other","children":[]}"#;
    session.import(Format::Native, json).unwrap();
    assert_eq!(session.graph().nodes.len(), 1);

    session.restore_save_slot(0).unwrap();
    assert_eq!(session.tree().unwrap(), plan());
    assert_eq!(session.save_slots().unwrap().len(), 1);

    session.undo();
    assert_eq!(session.graph().nodes.len(), 1);
}

#[test]
fn test_restore_first_and_last_slot() {
    let clock = ManualClock::new(start());
    let (mut session, _) = MindMapSession::builder(MemoryStorage::new())
        .clock(clock.clone())
        .initial(plan())
        .open();

    for version in 1..=5 {
        let mut graph = session.graph().clone();
        graph.nodes[0].label = format!("Plan v{}", version);
        session.apply_change(graph.nodes, graph.edges).unwrap();
        clock.advance(chrono::Duration::minutes(1));
        session.save_now().unwrap();
    }
    assert_eq!(session.save_slots().unwrap().len(), 5);

    session.restore_save_slot(4).unwrap();
    assert_eq!(session.tree().unwrap().content, "Plan v1");

    session.restore_save_slot(0).unwrap();
    assert_eq!(session.tree().unwrap().content, "Plan v5");

    assert!(matches!(session.restore_save_slot(5), Err(SessionError::NoSuchSlot(5))));
    assert_eq!(session.undo().as_deref(), Some("Edited text: \"Plan v5\""));
    assert_eq!(session.tree().unwrap().content, "Plan v1");
}

#[test]
fn test_failed_writes_surface_in_status() {
    let storage = MemoryStorage::new();
    let clock = ManualClock::new(start());
    let (mut session, _) = MindMapSession::builder(storage.clone())
        .clock(clock.clone())
        .initial(plan())
        .open();

    let mut graph = session.graph().clone();
    graph.nodes[2].label = "Ship".to_string();
    session.apply_change(graph.nodes, graph.edges).unwrap();

    storage.set_fail_writes(true);
    clock.advance(chrono::Duration::seconds(30));
    assert_eq!(session.tick(), None);
    assert!(matches!(session.status(), SaveStatus::Error(_)));

    storage.set_fail_writes(false);
    clock.advance(chrono::Duration::seconds(30));
    assert!(session.tick().is_some());
    assert_eq!(session.status(), &SaveStatus::Saved);
}

#[test]
fn test_file_storage_survives_restart() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let clock = ManualClock::new(start());
    {
        let (mut session, _) = MindMapSession::builder(FileStorage::new(dir.path()))
            .clock(clock.clone())
            .initial(plan())
            .open();
        let markdown = session.export(Format::Markdown)?;
        session.import(Format::Markdown, &format!("{}- Extra\n", markdown))?;
    }

    let (session, outcome) = MindMapSession::builder(FileStorage::new(dir.path()))
        .clock(clock)
        .open();
    assert!(matches!(outcome, InitOutcome::Continued(_)));
    let tree = session.tree()?;
    assert_eq!(tree.children[1].children[0].content, "Extra");
    Ok(())
}
