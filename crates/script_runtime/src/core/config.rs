//! # Unified Configuration System
//!
//! All configuration structures for the script runtime live here. Every section
//! deserializes with defaults for missing fields, so a config file only needs to
//! mention what it changes.
//!
//! ```toml
//! [runtime]
//! log_level = "debug"
//!
//! [scripting]
//! fixed_time_step = 0.02
//!
//! [scripting.priorities]
//! PlayerController = -10
//! CameraFollow = 200
//! ```

use std::collections::BTreeMap;

use serde::{Serialize, Deserialize};

// Loader trait and errors are shared with every config section
pub use crate::config::{Config, ConfigError};

use crate::scripting::priority::DEFAULT_PRIORITY;

/// # Scripting Configuration
///
/// Priority table and timing parameters for the script scheduler.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScriptingConfig {
    /// Priority applied to script types missing from `priorities`
    pub default_priority: i32,
    /// Time scale published before the first frame update
    pub time_scale: f32,
    /// Length of one fixed update step in seconds
    pub fixed_time_step: f32,
    /// Upper bound on fixed updates run in a single frame
    pub max_fixed_steps_per_frame: u32,
    /// Per script type priority; lower runs earlier
    pub priorities: BTreeMap<String, i32>,
}

impl ScriptingConfig {
    /// Create a new scripting configuration
    pub fn new() -> Self {
        Self {
            default_priority: DEFAULT_PRIORITY,
            time_scale: 1.0,
            fixed_time_step: 1.0 / 60.0,
            max_fixed_steps_per_frame: 5,
            priorities: BTreeMap::new(),
        }
    }

    /// Set the priority for a script type
    pub fn with_priority(mut self, script_type: impl Into<String>, priority: i32) -> Self {
        self.priorities.insert(script_type.into(), priority);
        self
    }

    /// Set the fallback priority
    pub fn with_default_priority(mut self, priority: i32) -> Self {
        self.default_priority = priority;
        self
    }

    /// Set the fixed update step
    pub fn with_fixed_time_step(mut self, step: f32, max_steps_per_frame: u32) -> Self {
        self.fixed_time_step = step;
        self.max_fixed_steps_per_frame = max_steps_per_frame;
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.fixed_time_step.is_finite() && self.fixed_time_step > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "fixed_time_step must be positive, got {}",
                self.fixed_time_step
            )));
        }

        if self.max_fixed_steps_per_frame == 0 {
            return Err(ConfigError::Invalid(
                "max_fixed_steps_per_frame must be at least 1".to_string(),
            ));
        }

        if !(self.time_scale.is_finite() && self.time_scale >= 0.0) {
            return Err(ConfigError::Invalid(format!(
                "time_scale must be a non-negative number, got {}",
                self.time_scale
            )));
        }

        if let Some(name) = self.priorities.keys().find(|name| name.is_empty()) {
            return Err(ConfigError::Invalid(format!("empty script type name {name:?}")));
        }

        Ok(())
    }
}

impl Default for ScriptingConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// # Runtime Configuration
///
/// Frame loop behavior of the host application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    /// Default log filter, overridden by `RUST_LOG`
    pub log_level: String,
    /// Target FPS for frame rate limiting
    pub target_fps: Option<u32>,
    /// Stop after this many frames (unbounded when unset)
    pub frame_limit: Option<u64>,
}

impl RuntimeConfig {
    /// Create a new runtime configuration
    pub fn new() -> Self {
        Self {
            log_level: "info".to_string(),
            target_fps: Some(60),
            frame_limit: None,
        }
    }

    /// Set the number of frames to run
    pub fn with_frame_limit(mut self, frames: u64) -> Self {
        self.frame_limit = Some(frames);
        self
    }
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// # Complete Application Configuration
///
/// Top-level configuration applications load from disk.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApplicationConfig {
    /// Frame loop configuration
    pub runtime: RuntimeConfig,
    /// Script scheduler configuration
    pub scripting: ScriptingConfig,
}

impl ApplicationConfig {
    /// Validate the entire configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.scripting.validate()
    }
}

impl Config for ApplicationConfig {}
impl Config for ScriptingConfig {}
