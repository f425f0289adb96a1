//! # Script Runtime
//!
//! Priority-ordered update scheduling for game script components.
//!
//! ## Features
//!
//! - **Priority Ordering**: Scripts run by ascending type priority, ties in registration order
//! - **Re-entrant Registration**: Scripts can spawn, disable and destroy scripts mid-pass,
//!   themselves included
//! - **Lifecycle Routing**: Lifecycle signals drive scheduler registration
//! - **Configuration**: Priority tables and timing loaded from TOML or RON
//!
//! ## Quick Start
//!
//! ```rust
//! use script_runtime::prelude::*;
//!
//! struct Spinner {
//!     angle: f32,
//! }
//!
//! impl ScriptComponent for Spinner {
//!     fn script_type(&self) -> ScriptType {
//!         ScriptType::new("Spinner")
//!     }
//!
//!     fn on_update(&mut self, ctx: &mut ScriptContext<'_>) -> ScriptResult {
//!         self.angle += ctx.time().scaled_delta_time();
//!         Ok(())
//!     }
//! }
//!
//! fn main() -> Result<(), ScriptError> {
//!     let config = ScriptingConfig::new().with_priority("Spinner", -10);
//!     let mut system = SystemManager::with_config(&config);
//!     system.spawn(Spinner { angle: 0.0 })?;
//!
//!     system.on_frame_update(1.0 / 60.0, 1.0, 1)?;
//!     system.on_fixed_update(1.0 / 60.0)?;
//!     system.on_late_update()?;
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

pub mod config;
pub mod core;
pub mod foundation;
pub mod scripting;
pub mod system;

pub use scripting::{ScriptComponentManager, ScriptError, SchedulerError};
pub use system::{FixedUpdateInfo, SystemManager, UpdateInfo};

/// Common imports for runtime users
pub mod prelude {
    pub use crate::{
        core::config::{ApplicationConfig, Config, ConfigError, RuntimeConfig, ScriptingConfig},
        foundation::time::{FixedStepClock, Time, Timer},
        scripting::{
            Phase, ScriptComponent, ScriptContext, ScriptError, ScriptHandle, ScriptResult,
            ScriptType,
        },
        system::{FixedUpdateInfo, SystemManager, UpdateInfo},
    };
}
