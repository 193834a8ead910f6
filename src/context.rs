//! Execution context checks
//!
//! Connecting blocks, so it must never run on the host's UI/main thread.
//! The host tells the manager which context that is.

use std::thread::{self, ThreadId};

/// Predicate identifying the execution context where connecting is forbidden
pub trait ExecutionContext: Send + Sync {
    /// `true` when the current call runs on the forbidden context
    fn is_forbidden(&self) -> bool;
}

/// Forbids one designated thread
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThreadAffinity {
    forbidden: Option<ThreadId>,
}

impl ThreadAffinity {
    /// Forbid the calling thread; call this from the host's main thread
    pub fn current() -> Self {
        Self::for_thread(thread::current().id())
    }

    pub fn for_thread(id: ThreadId) -> Self {
        Self {
            forbidden: Some(id),
        }
    }

    /// Forbid nothing
    pub fn unrestricted() -> Self {
        Self { forbidden: None }
    }
}

impl ExecutionContext for ThreadAffinity {
    fn is_forbidden(&self) -> bool {
        self.forbidden == Some(thread::current().id())
    }
}
