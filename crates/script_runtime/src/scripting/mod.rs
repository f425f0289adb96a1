//! Script components and the update scheduler
//!
//! Scripts are owned by a [`ScriptHost`] and identified by [`ScriptHandle`].
//! The [`ScriptComponentManager`] keeps the handles of active scripts sorted by
//! priority and runs the update, fixed update and late update passes over
//! them. Scripts can register and unregister scripts from inside any callback.

pub mod component;
pub mod context;
pub mod host;
pub mod manager;
pub mod phase;
pub mod priority;

#[cfg(test)]
mod tests;

pub use component::{ScriptComponent, ScriptError, ScriptHandle, ScriptResult, ScriptType};
pub use context::ScriptContext;
pub use host::{HostDispatch, ScriptHost, ScriptState};
pub use manager::{PhaseDispatch, SchedulerError, ScriptComponentManager};
pub use phase::{Callback, Phase};
pub use priority::{PriorityTable, DEFAULT_PRIORITY};
