//! Manager construction

use std::sync::Arc;

use super::manager::ConnectionManager;
use crate::config::ClientConfig;
use crate::connector::{Connection, ConnectorFactory};
use crate::context::{ExecutionContext, ThreadAffinity};
use crate::error::BuildError;
use crate::presence::{ManifestPresence, PresenceQuery};
use crate::registry::{BroadcastRegistry, ReceiverRegistry};

/// Builder for [`ConnectionManager`]
///
/// A presence query is required. The execution context defaults to
/// [`ThreadAffinity::unrestricted`] and the registry to
/// [`BroadcastRegistry::global`].
#[derive(Default)]
pub struct ManagerBuilder {
    supported_client_version: u64,
    presence: Option<Arc<dyn PresenceQuery>>,
    context: Option<Arc<dyn ExecutionContext>>,
    registry: Option<Arc<dyn ReceiverRegistry>>,
    primary: Option<ConnectorFactory>,
    secondary: Option<ConnectorFactory>,
}

impl ManagerBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the minimum version and a manifest-backed presence query
    pub fn from_config(config: &ClientConfig) -> Self {
        Self::new()
            .supported_client_version(config.counterpart.min_version)
            .presence(Arc::new(ManifestPresence::from_config(&config.counterpart)))
    }

    /// Minimum counterpart version code this client works with
    pub fn supported_client_version(mut self, version: u64) -> Self {
        self.supported_client_version = version;
        self
    }

    pub fn presence(mut self, presence: Arc<dyn PresenceQuery>) -> Self {
        self.presence = Some(presence);
        self
    }

    /// Predicate for the context where connecting is forbidden
    pub fn execution_context(mut self, context: Arc<dyn ExecutionContext>) -> Self {
        self.context = Some(context);
        self
    }

    pub fn registry(mut self, registry: Arc<dyn ReceiverRegistry>) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Factory for the primary connector, tried first
    pub fn primary<F>(mut self, factory: F) -> Self
    where
        F: Fn() -> Option<Connection> + Send + Sync + 'static,
    {
        self.primary = Some(Box::new(factory));
        self
    }

    /// Factory for the fallback connector, tried only when the primary
    /// is unavailable or fails to start
    pub fn secondary<F>(mut self, factory: F) -> Self
    where
        F: Fn() -> Option<Connection> + Send + Sync + 'static,
    {
        self.secondary = Some(Box::new(factory));
        self
    }

    pub fn build(self) -> Result<ConnectionManager, BuildError> {
        let presence = self.presence.ok_or(BuildError::MissingPresence)?;
        let context = self.context.unwrap_or_else(|| {
            let unrestricted: Arc<dyn ExecutionContext> = Arc::new(ThreadAffinity::unrestricted());
            unrestricted
        });
        let registry = self.registry.unwrap_or_else(|| {
            let global: Arc<dyn ReceiverRegistry> = BroadcastRegistry::global();
            global
        });

        Ok(ConnectionManager::from_parts(
            self.supported_client_version,
            presence,
            context,
            registry,
            self.primary,
            self.secondary,
        ))
    }
}
