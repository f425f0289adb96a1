//! System manager facade
//!
//! The frame loop owns one [`SystemManager`] and feeds it timing data. Each
//! frame method publishes the timing to [`Time`] and then runs the matching
//! scheduler pass over the host's scripts.

use log::info;

use crate::core::config::ScriptingConfig;
use crate::foundation::logging::SCRIPTING_TARGET;
use crate::foundation::time::Time;
use crate::scripting::{
    ScriptComponent, ScriptComponentManager, ScriptError, ScriptHandle, ScriptHost, ScriptResult,
    ScriptType,
};

/// Per-frame timing record as delivered by a native host
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct UpdateInfo {
    /// Seconds since the previous frame
    pub delta_time: f32,
    /// Global time scale
    pub time_scale: f32,
    /// Host frame counter
    pub frame_count: i64,
}

/// Fixed-step timing record as delivered by a native host
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FixedUpdateInfo {
    /// Seconds covered by the fixed step
    pub delta_time: f32,
}

/// Owns the scheduler, the script host and the published time state
#[derive(Default)]
pub struct SystemManager {
    scheduler: ScriptComponentManager,
    host: ScriptHost,
    time: Time,
}

impl SystemManager {
    /// Create a manager with the default priority table
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a manager from configuration
    pub fn with_config(config: &ScriptingConfig) -> Self {
        let scheduler = ScriptComponentManager::from_config(config);
        info!(
            target: SCRIPTING_TARGET,
            "Initializing system manager ({} script priorities, default {})",
            scheduler.priorities().len(),
            scheduler.priorities().default_priority()
        );
        Self {
            scheduler,
            host: ScriptHost::new(),
            time: Time {
                time_scale: config.time_scale,
                fixed_delta_time: config.fixed_time_step,
                ..Time::default()
            },
        }
    }

    /// Publish frame timing, then run the update pass
    pub fn on_frame_update(
        &mut self,
        delta_time: f32,
        time_scale: f32,
        frame_count: i64,
    ) -> ScriptResult {
        self.time.delta_time = delta_time;
        self.time.time_scale = time_scale;
        self.time.frame_count = frame_count;
        self.scheduler.invoke_update(&mut self.host.dispatcher(&self.time))
    }

    /// Publish the fixed step, then run the fixed update pass
    pub fn on_fixed_update(&mut self, delta_time: f32) -> ScriptResult {
        self.time.fixed_delta_time = delta_time;
        self.scheduler.invoke_fixed_update(&mut self.host.dispatcher(&self.time))
    }

    /// Run the late update pass
    pub fn on_late_update(&mut self) -> ScriptResult {
        self.scheduler.invoke_late_update(&mut self.host.dispatcher(&self.time))
    }

    /// [`on_frame_update`](Self::on_frame_update) from a host record
    pub fn on_update_info(&mut self, info: UpdateInfo) -> ScriptResult {
        self.on_frame_update(info.delta_time, info.time_scale, info.frame_count)
    }

    /// [`on_fixed_update`](Self::on_fixed_update) from a host record
    pub fn on_fixed_update_info(&mut self, info: FixedUpdateInfo) -> ScriptResult {
        self.on_fixed_update(info.delta_time)
    }

    /// Insert, create, enable and start a script
    pub fn spawn<S: ScriptComponent>(&mut self, script: S) -> Result<ScriptHandle, ScriptError> {
        self.host.spawn(&mut self.scheduler, &self.time, script)
    }

    /// Place a script in the host without running any hook
    pub fn insert<S: ScriptComponent>(&mut self, script: S) -> ScriptHandle {
        self.host.insert(script)
    }

    /// Signal that a script was created
    pub fn create(&mut self, handle: ScriptHandle) -> ScriptResult {
        self.host.create(&mut self.scheduler, &self.time, handle)
    }

    /// Signal that a script was enabled
    pub fn enable(&mut self, handle: ScriptHandle) -> ScriptResult {
        self.host.enable(&mut self.scheduler, &self.time, handle)
    }

    /// Signal that a script should start
    pub fn start(&mut self, handle: ScriptHandle) -> ScriptResult {
        self.host.start(&mut self.scheduler, &self.time, handle)
    }

    /// Signal that a script was disabled
    pub fn disable(&mut self, handle: ScriptHandle) -> ScriptResult {
        self.host.disable(&mut self.scheduler, &self.time, handle)
    }

    /// Destroy a script
    pub fn destroy(&mut self, handle: ScriptHandle) -> ScriptResult {
        self.host.destroy(&mut self.scheduler, &self.time, handle)
    }

    /// Destroy every script and empty the scheduler
    pub fn unload(&mut self) -> ScriptResult {
        info!(target: SCRIPTING_TARGET, "Unloading {} scripts", self.host.len());
        let destroyed = self.host.destroy_all(&mut self.scheduler, &self.time);
        self.scheduler.clear()?;
        destroyed
    }

    /// Change the priority for a script type; applies to later registrations
    pub fn set_priority(&mut self, script_type: ScriptType, priority: i32) {
        self.scheduler.set_priority(script_type, priority);
    }

    /// Time state as last published
    pub fn time(&self) -> &Time {
        &self.time
    }

    /// The scheduler
    pub fn scheduler(&self) -> &ScriptComponentManager {
        &self.scheduler
    }

    /// The script host
    pub fn host(&self) -> &ScriptHost {
        &self.host
    }
}
