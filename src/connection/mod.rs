//! Connection management
//!
//! Handles connection state, the connect protocol, and teardown.

mod builder;
mod manager;
mod state;

pub use builder::ManagerBuilder;
pub use manager::{ConnectionManager, ManagerInfo};
pub use state::{ConnectionState, StateCell};
