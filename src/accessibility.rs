//! Accessibility notifications.

use crate::frame_node::NodeId;
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::debug;

/// Accessibility events the pipeline sends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessibilityEventType {
    /// The content of a page changed structurally.
    PageChange,
}

/// Receives accessibility events.
pub trait AccessibilityNotifier {
    fn send_event(&self, node: NodeId, event: AccessibilityEventType);
}

/// Logs events and does nothing else.
#[derive(Debug, Default)]
pub struct LoggingNotifier;

impl AccessibilityNotifier for LoggingNotifier {
    fn send_event(&self, node: NodeId, event: AccessibilityEventType) {
        debug!("accessibility event {:?} on {}", event, node);
    }
}

/// Keeps every event for later inspection. Clones share the same log.
#[derive(Debug, Clone, Default)]
pub struct RecordingNotifier {
    events: Arc<Mutex<Vec<(NodeId, AccessibilityEventType)>>>,
}

impl RecordingNotifier {
    pub fn new() -> RecordingNotifier {
        RecordingNotifier::default()
    }

    pub fn events(&self) -> Vec<(NodeId, AccessibilityEventType)> {
        self.events.lock().clone()
    }
}

impl AccessibilityNotifier for RecordingNotifier {
    fn send_event(&self, node: NodeId, event: AccessibilityEventType) {
        self.events.lock().push((node, event));
    }
}
