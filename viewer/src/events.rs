//! Event broadcasting for pipeline notifications.

use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::debug;
use v3xctrl_gst_types::ViewerEvent;

/// Fan-out of [`ViewerEvent`]s to any number of listeners.
#[derive(Clone)]
pub struct EventBroadcaster {
    /// Broadcast channel for events
    sender: Arc<broadcast::Sender<ViewerEvent>>,
}

impl EventBroadcaster {
    /// Create a new event broadcaster with a buffer size.
    pub fn new(buffer_size: usize) -> Self {
        let (sender, _) = broadcast::channel(buffer_size);
        Self {
            sender: Arc::new(sender),
        }
    }

    /// Broadcast an event to all listeners.
    pub fn broadcast(&self, event: ViewerEvent) {
        debug!("Broadcasting event: {}", event.description());
        // No listeners is fine, the host may not have subscribed
        let _ = self.sender.send(event);
    }

    /// Subscribe to events emitted from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<ViewerEvent> {
        self.sender.subscribe()
    }

    /// Get the number of active subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBroadcaster {
    fn default() -> Self {
        Self::new(64)
    }
}
