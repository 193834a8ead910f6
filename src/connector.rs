//! Connector capabilities
//!
//! A connector is one way of reaching the counterpart process. The manager
//! only needs to start and stop it; how bytes move is up to the implementation.

use std::sync::Arc;

use bytes::Bytes;

/// A transport that can be started and stopped synchronously
pub trait Connector: Send + Sync {
    /// Human-readable name for this connector
    fn name(&self) -> &'static str;

    /// Attempt to connect; `true` means the connector is now connected
    fn start_connection(&self) -> bool;

    /// Best-effort teardown. Must not panic.
    fn stop_connection(&self);
}

/// Message delivered by a [`ReceiverRegistry`](crate::ReceiverRegistry)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Broadcast {
    /// Action identifier chosen by the counterpart
    pub action: String,
    /// Opaque payload
    pub payload: Bytes,
}

impl Broadcast {
    pub fn new(action: impl Into<String>, payload: impl Into<Bytes>) -> Self {
        Self {
            action: action.into(),
            payload: payload.into(),
        }
    }
}

/// Something that wants broadcasts from a receiver registry
pub trait BroadcastObserver: Send + Sync {
    fn on_broadcast(&self, broadcast: &Broadcast);
}

/// A connector product, tagged with its capabilities
///
/// Whether a connector also observes broadcasts is decided when the
/// `Connection` is built, so the manager never has to probe the type.
#[derive(Clone)]
pub enum Connection {
    /// Plain connector
    Direct(Arc<dyn Connector>),
    /// Connector that must be registered with the receiver registry
    Receiver {
        connector: Arc<dyn Connector>,
        observer: Arc<dyn BroadcastObserver>,
    },
}

impl Connection {
    /// Wrap a plain connector
    pub fn direct<C>(connector: Arc<C>) -> Self
    where
        C: Connector + 'static,
    {
        Connection::Direct(connector)
    }

    /// Wrap a connector that also observes broadcasts
    pub fn receiver<C>(connector: Arc<C>) -> Self
    where
        C: Connector + BroadcastObserver + 'static,
    {
        Connection::Receiver {
            connector: connector.clone(),
            observer: connector,
        }
    }

    /// The underlying connector
    pub fn connector(&self) -> &Arc<dyn Connector> {
        match self {
            Connection::Direct(connector) => connector,
            Connection::Receiver { connector, .. } => connector,
        }
    }

    /// The observer side, if this connection is receiver-capable
    pub fn observer(&self) -> Option<&Arc<dyn BroadcastObserver>> {
        match self {
            Connection::Direct(_) => None,
            Connection::Receiver { observer, .. } => Some(observer),
        }
    }

    pub fn name(&self) -> &'static str {
        self.connector().name()
    }

    pub fn is_receiver(&self) -> bool {
        matches!(self, Connection::Receiver { .. })
    }
}

impl std::fmt::Debug for Connection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Connection")
            .field("name", &self.name())
            .field("receiver", &self.is_receiver())
            .finish()
    }
}

/// Produces a connector on demand; `None` means this transport is unavailable
pub type ConnectorFactory = Box<dyn Fn() -> Option<Connection> + Send + Sync>;
