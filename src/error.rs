//! Error types
//!
//! [`ClientError`] is what a listener receives. [`ContractViolation`] is
//! returned from the call itself when the caller broke the usage contract.

use thiserror::Error;

/// Counterpart application is not present
pub const NOT_INSTALLED_CODE: i32 = 1;
pub const NOT_INSTALLED_MESSAGE: &str = "Counterpart application is not installed";

/// Counterpart application is older than the supported version
pub const NOT_COMPATIBLE_CODE: i32 = 2;
pub const NOT_COMPATIBLE_MESSAGE: &str =
    "Installed counterpart version is not compatible with this client";

/// Neither the primary nor the secondary connector could start
pub const COULD_NOT_CONNECT_CODE: i32 = 3;
pub const COULD_NOT_CONNECT_MESSAGE: &str = "Could not connect to the counterpart service";

/// A connection attempt was already in flight
pub const ALREADY_STARTED_CODE: i32 = 100;
pub const ALREADY_STARTED_MESSAGE: &str =
    "A connection is already being established. Wait for the listener before starting again.";

/// Errors reported to a [`ClientStateListener`](crate::ClientStateListener)
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClientError {
    /// The counterpart is missing, too old, or could not be reached
    #[error("service unavailable ({code}): {message}")]
    ServiceUnavailable { message: String, code: i32 },

    /// The caller misused the manager
    #[error("developer error ({code}): {message}")]
    DeveloperError { message: String, code: i32 },

    /// Failure reported after the session was established
    #[error("runtime error ({code}): {message}")]
    RunTime { message: String, code: i32 },
}

impl ClientError {
    pub fn not_installed() -> Self {
        Self::ServiceUnavailable {
            message: NOT_INSTALLED_MESSAGE.to_string(),
            code: NOT_INSTALLED_CODE,
        }
    }

    pub fn not_compatible() -> Self {
        Self::ServiceUnavailable {
            message: NOT_COMPATIBLE_MESSAGE.to_string(),
            code: NOT_COMPATIBLE_CODE,
        }
    }

    pub fn could_not_connect() -> Self {
        Self::ServiceUnavailable {
            message: COULD_NOT_CONNECT_MESSAGE.to_string(),
            code: COULD_NOT_CONNECT_CODE,
        }
    }

    pub fn already_started() -> Self {
        Self::DeveloperError {
            message: ALREADY_STARTED_MESSAGE.to_string(),
            code: ALREADY_STARTED_CODE,
        }
    }

    pub fn runtime(message: impl Into<String>, code: i32) -> Self {
        Self::RunTime {
            message: message.into(),
            code,
        }
    }

    /// Numeric code carried by every variant
    pub fn code(&self) -> i32 {
        match self {
            ClientError::ServiceUnavailable { code, .. }
            | ClientError::DeveloperError { code, .. }
            | ClientError::RunTime { code, .. } => *code,
        }
    }

    /// Human-readable message carried by every variant
    pub fn message(&self) -> &str {
        match self {
            ClientError::ServiceUnavailable { message, .. }
            | ClientError::DeveloperError { message, .. }
            | ClientError::RunTime { message, .. } => message,
        }
    }
}

/// Caller contract violations; these fail the call instead of reaching the listener
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ContractViolation {
    /// `start_connection` ran on the forbidden execution context
    #[error("This function has to call off the main thread.")]
    ForbiddenContext,

    /// A guarded operation ran before the session was ready
    #[error("Service not connected. Please start a connection before using the service.")]
    NotStarted,
}

/// Errors from [`ManagerBuilder::build`](crate::ManagerBuilder::build)
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("a presence query is required")]
    MissingPresence,
}
