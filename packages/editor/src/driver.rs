//! Background autosave for sessions shared with async code.
//!
//! The loop only polls [`MindMapSession::tick`]; the session's own debounce
//! timer decides when a save actually runs. It stops once the session is
//! closed.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

use crate::session::MindMapSession;
use crate::storage::Storage;

/// Default polling period of the loop
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Poll `session` every `period` until it is closed
pub fn spawn_autosave_loop<S>(session: Arc<Mutex<MindMapSession<S>>>, period: Duration) -> JoinHandle<()>
where
    S: Storage + Send + 'static,
{
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            interval.tick().await;

            let mut session = session.lock().await;
            if !session.is_open() {
                tracing::debug!("Session closed, stopping autosave loop");
                break;
            }
            if let Some(outcome) = session.tick() {
                tracing::debug!("Background autosave: {:?}", outcome);
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::autosave::SaveStatus;
    use crate::clock::ManualClock;
    use crate::storage::MemoryStorage;
    use chrono::{TimeZone, Utc};
    use mindmap_model::{GraphEdge, GraphNode, TreeNode};

    #[tokio::test(start_paused = true)]
    async fn test_loop_saves_and_stops_on_close() {
        let clock = ManualClock::new(Utc.with_ymd_and_hms(2024, 4, 2, 9, 0, 0).unwrap());
        let storage = MemoryStorage::new();
        let (session, _) = MindMapSession::builder(storage.clone())
            .clock(clock.clone())
            .initial(TreeNode::new("root", "Root"))
            .open();
        let session = Arc::new(Mutex::new(session));

        let handle = spawn_autosave_loop(session.clone(), DEFAULT_POLL_INTERVAL);

        {
            let mut session = session.lock().await;
            let mut graph = session.graph().clone();
            graph.nodes.push(GraphNode::new("a", "A"));
            graph.edges.push(GraphEdge::hierarchical("root", "a"));
            session.apply_change(graph.nodes, graph.edges).unwrap();
        }

        clock.advance(chrono::Duration::seconds(30));
        tokio::time::sleep(Duration::from_secs(2)).await;
        assert_eq!(session.lock().await.status(), &SaveStatus::Saved);
        assert_eq!(storage.keys().len(), 2);

        session.lock().await.close().unwrap();
        tokio::time::sleep(Duration::from_secs(2)).await;
        assert!(handle.is_finished());
    }
}
