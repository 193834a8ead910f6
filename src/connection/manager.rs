//! Connection manager
//!
//! Validates preconditions, drives the primary-then-fallback connect
//! protocol and guards access to the established session.

use parking_lot::{Mutex, RwLock};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::builder::ManagerBuilder;
use super::state::{ConnectionState, StateCell};
use crate::connector::{Connection, ConnectorFactory};
use crate::context::ExecutionContext;
use crate::error::{ClientError, ContractViolation};
use crate::listener::ClientStateListener;
use crate::metrics::{ConnectionStats, StatsSnapshot};
use crate::presence::PresenceQuery;
use crate::registry::ReceiverRegistry;

/// Supervises one session with the counterpart process
///
/// `start_connection` blocks while connectors start, so it must be called
/// off the forbidden execution context. Accessors and guarded calls may run
/// on any thread.
pub struct ConnectionManager {
    /// Minimum counterpart version code
    supported_client_version: u64,
    presence: Arc<dyn PresenceQuery>,
    context: Arc<dyn ExecutionContext>,
    registry: Arc<dyn ReceiverRegistry>,
    primary: Option<ConnectorFactory>,
    secondary: Option<ConnectorFactory>,
    state: StateCell,
    /// Set iff state is `Connected`
    connection: RwLock<Option<Connection>>,
    listener: Mutex<Option<Arc<dyn ClientStateListener>>>,
    stats: ConnectionStats,
}

/// Serializable view of a manager
#[derive(Debug, Clone, Serialize)]
pub struct ManagerInfo {
    pub state: ConnectionState,
    pub active_connector: Option<&'static str>,
    pub supported_client_version: u64,
    pub stats: StatsSnapshot,
}

impl ConnectionManager {
    /// Start building a manager
    pub fn builder() -> ManagerBuilder {
        ManagerBuilder::new()
    }

    pub(crate) fn from_parts(
        supported_client_version: u64,
        presence: Arc<dyn PresenceQuery>,
        context: Arc<dyn ExecutionContext>,
        registry: Arc<dyn ReceiverRegistry>,
        primary: Option<ConnectorFactory>,
        secondary: Option<ConnectorFactory>,
    ) -> Self {
        Self {
            supported_client_version,
            presence,
            context,
            registry,
            primary,
            secondary,
            state: StateCell::default(),
            connection: RwLock::new(None),
            listener: Mutex::new(None),
            stats: ConnectionStats::new(),
        }
    }

    /// Establish a session, reporting the outcome to `listener`.
    ///
    /// Environment failures and misuse reach the listener. Only a call from
    /// the forbidden execution context fails the call itself.
    ///
    /// Checks run in this order: execution context, counterpart presence,
    /// counterpart version, attempt in progress. The context check comes
    /// first so a forbidden call stores no listener and queries nothing.
    pub fn start_connection(
        &self,
        listener: Arc<dyn ClientStateListener>,
    ) -> Result<(), ContractViolation> {
        if self.context.is_forbidden() {
            warn!("start_connection called on the forbidden execution context");
            return Err(ContractViolation::ForbiddenContext);
        }

        *self.listener.lock() = Some(listener.clone());

        let Some(version) = self.presence.installed_version() else {
            warn!("Counterpart is not installed");
            self.fail_precondition(listener.as_ref(), ClientError::not_installed());
            return Ok(());
        };

        if version < self.supported_client_version {
            warn!(
                installed = version,
                required = self.supported_client_version,
                "Counterpart version is not compatible"
            );
            self.fail_precondition(listener.as_ref(), ClientError::not_compatible());
            return Ok(());
        }

        loop {
            match self.state.load() {
                ConnectionState::Connecting => {
                    warn!("Connection attempt already in progress");
                    self.stats.start_rejected();
                    listener.on_error(ClientError::already_started());
                    return Ok(());
                }
                ConnectionState::Connected if self.is_ready() => {
                    debug!("Already connected");
                    listener.on_ready();
                    return Ok(());
                }
                current => {
                    // Lost the race: re-read and decide again
                    if self
                        .state
                        .transition(current, ConnectionState::Connecting)
                        .is_ok()
                    {
                        break;
                    }
                }
            }
        }

        self.try_to_connect(listener.as_ref());
        Ok(())
    }

    /// Tear down the session. Safe to call in any state, any number of times.
    pub fn end_connection(&self) {
        self.listener.lock().take();

        let active = self.take_connection();
        if let Some(connection) = active {
            self.release(&connection);
            self.stats.teardown();
            info!(connector = connection.name(), "Connection ended");
        }
    }

    /// Report a failure that happened after the session was established.
    ///
    /// Dropped when no listener is attached.
    pub fn error_occurred(&self, message: impl Into<String>, code: i32) {
        let listener = self.listener.lock().clone();
        match listener {
            Some(listener) => {
                self.stats.runtime_error();
                listener.on_error(ClientError::runtime(message, code));
            }
            None => {
                debug!(code, "Runtime error with no listener attached");
            }
        }
    }

    /// Run `block` against the active connection, only if the session is ready.
    ///
    /// Every operation a concrete client exposes goes through here before it
    /// touches the connection.
    pub fn run_if_ready<T, F>(&self, block: F) -> Result<T, ContractViolation>
    where
        F: FnOnce(&Connection) -> T,
    {
        let connection = match self.state.load() {
            ConnectionState::Connected => self.connection.read().clone(),
            _ => None,
        };

        match connection {
            Some(connection) => Ok(block(&connection)),
            None => Err(ContractViolation::NotStarted),
        }
    }

    /// Current state
    pub fn state(&self) -> ConnectionState {
        self.state.load()
    }

    /// `Connected` and holding an active connection
    pub fn is_ready(&self) -> bool {
        self.state.load() == ConnectionState::Connected && self.connection.read().is_some()
    }

    /// Name of the connector currently holding the session
    pub fn active_connector(&self) -> Option<&'static str> {
        self.connection.read().as_ref().map(Connection::name)
    }

    pub fn supported_client_version(&self) -> u64 {
        self.supported_client_version
    }

    pub fn stats(&self) -> StatsSnapshot {
        self.stats.snapshot()
    }

    pub fn info(&self) -> ManagerInfo {
        ManagerInfo {
            state: self.state(),
            active_connector: self.active_connector(),
            supported_client_version: self.supported_client_version,
            stats: self.stats(),
        }
    }

    /// Primary first, then fallback. Entered with state already `Connecting`.
    fn try_to_connect(&self, listener: &dyn ClientStateListener) {
        self.stats.attempt();
        debug!(
            required = self.supported_client_version,
            "Connecting to counterpart"
        );

        if let Some(connection) = self.primary.as_ref().and_then(|factory| factory()) {
            if connection.connector().start_connection() {
                self.stats.primary_connected();
                self.connected(connection, listener);
                return;
            }
            debug!(connector = connection.name(), "Primary connector failed to start");
        }

        if let Some(connection) = self.secondary.as_ref().and_then(|factory| factory()) {
            if let Some(observer) = connection.observer() {
                self.registry.add_observer(observer.clone());
            }

            if connection.connector().start_connection() {
                self.stats.fallback_connected();
                self.connected(connection, listener);
                return;
            }

            debug!(connector = connection.name(), "Fallback connector failed to start");
            if let Some(observer) = connection.observer() {
                self.registry.remove_observer(observer);
            }
        }

        self.state.store(ConnectionState::Disconnected);
        self.stats.connect_failed();
        warn!("No connector could reach the counterpart");
        listener.on_error(ClientError::could_not_connect());
    }

    fn connected(&self, connection: Connection, listener: &dyn ClientStateListener) {
        let name = connection.name();
        {
            // Slot and state change together with respect to take_connection
            let mut slot = self.connection.write();
            if self
                .state
                .transition(ConnectionState::Connecting, ConnectionState::Connected)
                .is_ok()
            {
                *slot = Some(connection);
            } else {
                drop(slot);
                debug!(connector = name, "Torn down while connecting, releasing");
                self.release(&connection);
                return;
            }
        }

        info!(connector = name, "Connected to counterpart");
        listener.on_ready();
    }

    fn fail_precondition(&self, listener: &dyn ClientStateListener, error: ClientError) {
        // A stale session must not outlive the Connected state
        if let Some(connection) = self.take_connection() {
            self.release(&connection);
        }

        self.stats.precondition_failed();
        listener.on_error(error);
    }

    /// Empty the slot and move to `Disconnected` under the slot lock.
    fn take_connection(&self) -> Option<Connection> {
        let mut slot = self.connection.write();
        let active = slot.take();
        self.state.store(ConnectionState::Disconnected);
        active
    }

    fn release(&self, connection: &Connection) {
        if let Some(observer) = connection.observer() {
            self.registry.remove_observer(observer);
        }
        connection.connector().stop_connection();
    }
}

impl std::fmt::Debug for ConnectionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionManager")
            .field("state", &self.state())
            .field("active_connector", &self.active_connector())
            .field("supported_client_version", &self.supported_client_version)
            .finish_non_exhaustive()
    }
}
