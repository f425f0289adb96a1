//! Orbit demo application
//!
//! Runs a headless frame loop over a handful of sample scripts. Each frame it
//! runs one update, as many fixed updates as the fixed step clock allows, and
//! one late update. Configuration is read from `orbit_app.toml` when present.

mod scripts;

use std::path::Path;
use std::time::{Duration, Instant};

use script_runtime::foundation::logging;
use script_runtime::prelude::*;
use thiserror::Error;

use scripts::{Census, Spawner};

const CONFIG_PATH: &str = "orbit_app.toml";
const DEFAULT_FRAME_LIMIT: u64 = 600;

/// Demo application errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration could not be loaded or is invalid
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// A script callback failed
    #[error("Script error: {0}")]
    Script(#[from] ScriptError),
}

/// Frame loop around a [`SystemManager`]
pub struct OrbitApp {
    config: ApplicationConfig,
    system: SystemManager,
    timer: Timer,
    fixed_clock: FixedStepClock,
    frame_count: i64,
}

impl OrbitApp {
    /// Build the app from configuration
    pub fn new(config: ApplicationConfig) -> Self {
        let system = SystemManager::with_config(&config.scripting);
        let fixed_clock = FixedStepClock::new(
            config.scripting.fixed_time_step,
            config.scripting.max_fixed_steps_per_frame,
        );

        Self {
            config,
            system,
            timer: Timer::new(),
            fixed_clock,
            frame_count: 0,
        }
    }

    /// Spawn the initial scripts
    pub fn initialize(&mut self) -> Result<(), AppError> {
        log::info!("Initializing orbit demo...");
        self.system.spawn(Spawner::new(0.25, 12, 0x5eed))?;
        self.system.spawn(Census::new(60))?;
        Ok(())
    }

    /// Run frames until the frame limit is reached
    pub fn run(&mut self) -> Result<(), AppError> {
        self.initialize()?;

        let frame_limit = self.config.runtime.frame_limit.unwrap_or(DEFAULT_FRAME_LIMIT);
        let frame_budget = self
            .config
            .runtime
            .target_fps
            .filter(|&fps| fps > 0)
            .map(|fps| Duration::from_secs_f64(1.0 / f64::from(fps)));
        log::info!("Starting frame loop for {frame_limit} frames");

        for _ in 0..frame_limit {
            let frame_start = Instant::now();
            self.frame()?;

            if let Some(budget) = frame_budget {
                if let Some(remaining) = budget.checked_sub(frame_start.elapsed()) {
                    std::thread::sleep(remaining);
                }
            }
        }

        log::info!(
            "Finished {} frames at {:.1} average fps",
            self.timer.frame_count(),
            self.timer.average_fps()
        );
        self.system.unload()?;
        Ok(())
    }

    fn frame(&mut self) -> Result<(), AppError> {
        self.timer.update();
        self.frame_count += 1;
        let delta_time = self.timer.delta_time();

        self.system.on_update_info(UpdateInfo {
            delta_time,
            time_scale: self.config.scripting.time_scale,
            frame_count: self.frame_count,
        })?;

        let steps = self.fixed_clock.advance(delta_time);
        for _ in 0..steps {
            self.system.on_fixed_update_info(FixedUpdateInfo {
                delta_time: self.fixed_clock.step(),
            })?;
        }

        self.system.on_late_update()?;
        Ok(())
    }
}

fn load_config(path: &Path) -> Result<ApplicationConfig, AppError> {
    let config = ApplicationConfig::load_or_default(path)?;
    config.validate()?;
    Ok(config)
}

fn main() -> Result<(), AppError> {
    let config = load_config(Path::new(CONFIG_PATH))?;
    logging::init_with_filter(&config.runtime.log_level);

    let mut app = OrbitApp::new(config);
    if let Err(e) = app.run() {
        log::error!("Orbit demo failed: {e}");
        return Err(e);
    }

    log::info!("Orbit demo shutdown complete");
    Ok(())
}
