//! Script component trait and identity types

use std::fmt;

use thiserror::Error;

use super::context::ScriptContext;
use super::manager::SchedulerError;

slotmap::new_key_type! {
    /// Arena key identifying one script instance owned by the host
    ///
    /// `ScriptHandle::null()` (from [`slotmap::Key`]) never refers to a live
    /// script and is ignored by the scheduler.
    pub struct ScriptHandle;
}

/// Type tag a script implementation declares for priority lookup
///
/// Every instance of the same script implementation reports the same tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ScriptType(&'static str);

impl ScriptType {
    /// Create a type tag from a stable name
    pub const fn new(name: &'static str) -> Self {
        Self(name)
    }

    /// The name used as the priority table key
    pub const fn name(self) -> &'static str {
        self.0
    }
}

impl fmt::Display for ScriptType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

/// Result type returned by every script callback
pub type ScriptResult = Result<(), ScriptError>;

/// Script component lifecycle and per-frame hooks
///
/// All hooks default to doing nothing. Returning an error from a per-frame
/// hook aborts the rest of that pass and reaches the host's frame loop.
pub trait ScriptComponent: 'static {
    /// Type tag used to look up this script's priority
    fn script_type(&self) -> ScriptType;

    /// Called once when the host creates the script
    fn on_create(&mut self, _ctx: &mut ScriptContext<'_>) -> ScriptResult {
        Ok(())
    }

    /// Called whenever the script becomes enabled
    fn on_enable(&mut self, _ctx: &mut ScriptContext<'_>) -> ScriptResult {
        Ok(())
    }

    /// Called once, before the first update, while the script is enabled
    fn on_start(&mut self, _ctx: &mut ScriptContext<'_>) -> ScriptResult {
        Ok(())
    }

    /// Called whenever the script becomes disabled
    fn on_disable(&mut self, _ctx: &mut ScriptContext<'_>) -> ScriptResult {
        Ok(())
    }

    /// Called once before the host drops the script
    fn on_destroy(&mut self, _ctx: &mut ScriptContext<'_>) -> ScriptResult {
        Ok(())
    }

    /// Called every frame
    fn on_update(&mut self, _ctx: &mut ScriptContext<'_>) -> ScriptResult {
        Ok(())
    }

    /// Called on every fixed step
    fn on_fixed_update(&mut self, _ctx: &mut ScriptContext<'_>) -> ScriptResult {
        Ok(())
    }

    /// Called every frame after all updates
    fn on_late_update(&mut self, _ctx: &mut ScriptContext<'_>) -> ScriptResult {
        Ok(())
    }
}

/// Script-level errors
#[derive(Error, Debug)]
pub enum ScriptError {
    /// A script callback failed
    #[error("Script fault: {0}")]
    Fault(String),

    /// The handle does not refer to a live script
    #[error("Stale script handle: {0:?}")]
    StaleHandle(ScriptHandle),

    /// Scheduler misuse
    #[error("Scheduler error: {0}")]
    Scheduler(#[from] SchedulerError),
}

impl ScriptError {
    /// Build a fault error from a message
    pub fn fault(message: impl Into<String>) -> Self {
        Self::Fault(message.into())
    }
}
