//! Workflow event types and event bus
//!
//! Events are broadcast after a transition commits so observers (XP ledger,
//! notification delivery) can react without participating in the state
//! machine. Losing an event never affects stored state.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::debug;

use crate::db::models::ApplicationStatus;

/// Glossary workflow event types
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum GlossaryEvent {
    /// A new application (term or edit) entered the pipeline
    ApplicationSubmitted {
        application_id: String,
        term_id: Option<String>,
        submitter_id: String,
        status: ApplicationStatus,
        timestamp: DateTime<Utc>,
    },

    /// An application moved to a new status
    ApplicationStatusChanged {
        application_id: String,
        term_id: Option<String>,
        old_status: ApplicationStatus,
        new_status: ApplicationStatus,
        actor_id: String,
        timestamp: DateTime<Utc>,
    },

    /// An approved application's content was merged into the catalog
    TermPublished {
        term_id: String,
        application_id: String,
        timestamp: DateTime<Utc>,
    },

    /// An application was deleted by its submitter or an administrator
    ApplicationDeleted {
        application_id: String,
        term_id: Option<String>,
        requested_by: String,
        timestamp: DateTime<Utc>,
    },
}

/// Broadcast-based event bus shared across request handlers
#[derive(Debug, Clone)]
pub struct EventBus {
    sender: broadcast::Sender<GlossaryEvent>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<GlossaryEvent> {
        self.sender.subscribe()
    }

    /// Publish an event to all subscribers
    ///
    /// A send error only means no subscriber is currently listening.
    pub fn publish(&self, event: GlossaryEvent) {
        if self.sender.send(event.clone()).is_err() {
            debug!(?event, "No subscribers for workflow event");
        }
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn subscriber_receives_published_event() {
        let bus = EventBus::new(8);
        let mut rx = bus.subscribe();

        bus.publish(GlossaryEvent::TermPublished {
            term_id: "t-1".to_string(),
            application_id: "a-1".to_string(),
            timestamp: Utc::now(),
        });

        match rx.recv().await.unwrap() {
            GlossaryEvent::TermPublished { term_id, .. } => assert_eq!(term_id, "t-1"),
            other => panic!("Unexpected event: {:?}", other),
        }
    }

    #[test]
    fn publish_without_subscribers_is_harmless() {
        let bus = EventBus::new(8);
        bus.publish(GlossaryEvent::ApplicationDeleted {
            application_id: "a-1".to_string(),
            term_id: None,
            requested_by: "u-1".to_string(),
            timestamp: Utc::now(),
        });
    }
}
