//! Listener callbacks
//!
//! Listeners are invoked synchronously on the thread that triggered the event.

use tokio::sync::mpsc;

use crate::error::ClientError;

/// Receives the outcome of a connection session
pub trait ClientStateListener: Send + Sync {
    /// The session is established and guarded calls may run
    fn on_ready(&self);

    /// Something went wrong; see [`ClientError`] for the categories
    fn on_error(&self, error: ClientError);
}

/// Event forwarded by [`EventListener`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListenerEvent {
    Ready,
    Error(ClientError),
}

/// Listener that forwards callbacks into a channel
///
/// Lets async hosts await the outcome of a blocking `start_connection`
/// that ran on a worker thread.
#[derive(Debug, Clone)]
pub struct EventListener {
    tx: mpsc::UnboundedSender<ListenerEvent>,
}

impl EventListener {
    /// Create a listener and the receiving end of its channel
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<ListenerEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl ClientStateListener for EventListener {
    fn on_ready(&self) {
        // Receiver dropped means nobody is waiting anymore
        let _ = self.tx.send(ListenerEvent::Ready);
    }

    fn on_error(&self, error: ClientError) {
        let _ = self.tx.send(ListenerEvent::Error(error));
    }
}
