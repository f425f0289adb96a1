//! Callback context handed to scripts

use super::component::{ScriptComponent, ScriptError, ScriptHandle, ScriptResult, ScriptType};
use super::host::ScriptHost;
use super::manager::ScriptComponentManager;
use crate::foundation::collections::Key;
use crate::foundation::time::Time;

/// Everything a script may touch from inside one of its hooks
///
/// The calling script itself is checked out of the host while the hook runs,
/// so lifecycle signals aimed at it take effect on the scheduler immediately
/// but its own hooks are queued until the current hook returns.
pub struct ScriptContext<'a> {
    handle: ScriptHandle,
    script_type: ScriptType,
    scheduler: &'a mut ScriptComponentManager,
    host: &'a mut ScriptHost,
    time: &'a Time,
}

impl<'a> ScriptContext<'a> {
    pub(crate) fn new(
        handle: ScriptHandle,
        script_type: ScriptType,
        scheduler: &'a mut ScriptComponentManager,
        host: &'a mut ScriptHost,
        time: &'a Time,
    ) -> Self {
        Self {
            handle,
            script_type,
            scheduler,
            host,
            time,
        }
    }

    /// Handle of the script receiving the callback
    pub fn handle(&self) -> ScriptHandle {
        self.handle
    }

    /// Type tag of the script receiving the callback
    pub fn script_type(&self) -> ScriptType {
        self.script_type
    }

    /// Frame timing for the current pass
    pub fn time(&self) -> &Time {
        self.time
    }

    /// Read-only view of the scheduler
    pub fn scheduler(&self) -> &ScriptComponentManager {
        self.scheduler
    }

    /// Register a script with the scheduler directly, bypassing lifecycle state
    ///
    /// A null handle is ignored. Fails if the handle is stale or its script
    /// has been destroyed.
    pub fn add(&mut self, handle: ScriptHandle) -> ScriptResult {
        if handle.is_null() {
            return Ok(());
        }
        let script_type = self
            .host
            .script_type(handle)
            .filter(|_| self.host.is_alive(handle))
            .ok_or(ScriptError::StaleHandle(handle))?;
        self.scheduler.add(handle, script_type);
        Ok(())
    }

    /// Unregister a script from the scheduler directly, bypassing lifecycle state
    pub fn remove(&mut self, handle: ScriptHandle) {
        self.scheduler.remove(handle);
    }

    /// Insert, create, enable and start a new script
    ///
    /// The new script is registered for the next pass, not the current one.
    pub fn spawn<S: ScriptComponent>(&mut self, script: S) -> Result<ScriptHandle, ScriptError> {
        self.host.spawn(self.scheduler, self.time, script)
    }

    /// Enable a script
    pub fn enable(&mut self, handle: ScriptHandle) -> ScriptResult {
        self.host.enable(self.scheduler, self.time, handle)
    }

    /// Disable a script
    pub fn disable(&mut self, handle: ScriptHandle) -> ScriptResult {
        self.host.disable(self.scheduler, self.time, handle)
    }

    /// Destroy a script
    ///
    /// Destroying the calling script drops it once the current hook returns.
    pub fn destroy(&mut self, handle: ScriptHandle) -> ScriptResult {
        self.host.destroy(self.scheduler, self.time, handle)
    }

    /// Change the priority for a script type; applies to later registrations
    pub fn set_priority(&mut self, script_type: ScriptType, priority: i32) {
        self.scheduler.set_priority(script_type, priority);
    }

    /// Whether the handle refers to a live, not destroyed script
    pub fn is_alive(&self, handle: ScriptHandle) -> bool {
        self.host.is_alive(handle)
    }
}
