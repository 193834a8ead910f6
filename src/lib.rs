//! ServiceBase - client-side connection manager
//!
//! Establishes and supervises a session with a privileged counterpart
//! process. A primary connector is tried first and a broadcast-style
//! fallback second; the counterpart must be installed and recent enough
//! before either is attempted.

pub mod config;
pub mod connection;
pub mod connector;
pub mod context;
pub mod error;
pub mod listener;
pub mod metrics;
pub mod presence;
pub mod registry;
pub mod util;

pub use config::ClientConfig;
pub use connection::{ConnectionManager, ConnectionState, ManagerBuilder, ManagerInfo};
pub use connector::{Broadcast, BroadcastObserver, Connection, Connector, ConnectorFactory};
pub use context::{ExecutionContext, ThreadAffinity};
pub use error::{BuildError, ClientError, ContractViolation};
pub use listener::{ClientStateListener, EventListener, ListenerEvent};
pub use presence::{FixedPresence, ManifestPresence, PresenceQuery};
pub use registry::{BroadcastRegistry, ReceiverRegistry};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
