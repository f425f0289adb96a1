//! Sample scripts for the orbit demo
//!
//! A [`Spawner`] launches [`Orbiter`]s on random axes. Each orbiter integrates
//! its angle on the fixed step, reports its position on late update and
//! destroys itself once its lifetime runs out. A [`Census`] runs last and logs
//! how many scripts the scheduler is tracking.

use nalgebra::{Point3, Unit, UnitQuaternion, Vector3};
use rand::prelude::*;
use script_runtime::prelude::*;

/// Type tag of [`Spawner`]
pub const SPAWNER: ScriptType = ScriptType::new("Spawner");
/// Type tag of [`Orbiter`]
pub const ORBITER: ScriptType = ScriptType::new("Orbiter");
/// Type tag of [`Census`]
pub const CENSUS: ScriptType = ScriptType::new("Census");

/// Spawns an orbiter every `interval` seconds until `budget` is used up
pub struct Spawner {
    interval: f32,
    cooldown: f32,
    budget: u32,
    rng: StdRng,
}

impl Spawner {
    /// Create a spawner with a seeded random source
    pub fn new(interval: f32, budget: u32, seed: u64) -> Self {
        Self {
            interval,
            cooldown: 0.0,
            budget,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    fn random_orbiter(&mut self) -> Orbiter {
        let axis = Vector3::new(
            self.rng.gen_range(-1.0..1.0),
            self.rng.gen_range(-1.0..1.0),
            self.rng.gen_range(-1.0..1.0),
        );
        // Degenerate axes fall back to +Y
        let axis = Unit::try_new(axis, 1.0e-3).unwrap_or_else(Vector3::y_axis);
        let radius = self.rng.gen_range(1.0..5.0);
        let angular_speed = self.rng.gen_range(0.5..std::f32::consts::TAU);
        let lifetime = self.rng.gen_range(0.5..2.0);
        Orbiter::new(axis, radius, angular_speed, lifetime)
    }
}

impl ScriptComponent for Spawner {
    fn script_type(&self) -> ScriptType {
        SPAWNER
    }

    fn on_update(&mut self, ctx: &mut ScriptContext<'_>) -> ScriptResult {
        if self.budget == 0 {
            log::info!("Spawner exhausted, disabling");
            let me = ctx.handle();
            return ctx.disable(me);
        }

        self.cooldown -= ctx.time().scaled_delta_time();
        if self.cooldown <= 0.0 {
            self.cooldown += self.interval;
            self.budget -= 1;
            let orbiter = self.random_orbiter();
            let handle = ctx.spawn(orbiter)?;
            log::debug!("Spawned orbiter {handle:?}, {} left", self.budget);
        }
        Ok(())
    }
}

/// Circles the origin around a fixed axis for a limited time
pub struct Orbiter {
    axis: Unit<Vector3<f32>>,
    radius: f32,
    angular_speed: f32,
    angle: f32,
    remaining: f32,
}

impl Orbiter {
    /// Create an orbiter
    pub fn new(axis: Unit<Vector3<f32>>, radius: f32, angular_speed: f32, lifetime: f32) -> Self {
        Self {
            axis,
            radius,
            angular_speed,
            angle: 0.0,
            remaining: lifetime,
        }
    }

    /// Current position on the orbit
    pub fn position(&self) -> Point3<f32> {
        let start = perpendicular(&self.axis) * self.radius;
        let rotation = UnitQuaternion::from_axis_angle(&self.axis, self.angle);
        Point3::from(rotation * start)
    }
}

impl ScriptComponent for Orbiter {
    fn script_type(&self) -> ScriptType {
        ORBITER
    }

    fn on_fixed_update(&mut self, ctx: &mut ScriptContext<'_>) -> ScriptResult {
        let step = ctx.time().fixed_delta_time * ctx.time().time_scale;
        self.angle = (self.angle + self.angular_speed * step) % std::f32::consts::TAU;
        self.remaining -= step;
        if self.remaining <= 0.0 {
            let me = ctx.handle();
            ctx.destroy(me)?;
        }
        Ok(())
    }

    fn on_late_update(&mut self, _ctx: &mut ScriptContext<'_>) -> ScriptResult {
        let position = self.position();
        log::trace!("Orbiter at ({:.2}, {:.2}, {:.2})", position.x, position.y, position.z);
        Ok(())
    }

    fn on_destroy(&mut self, ctx: &mut ScriptContext<'_>) -> ScriptResult {
        log::debug!("Orbiter {:?} expired at angle {:.2}", ctx.handle(), self.angle);
        Ok(())
    }
}

/// Unit vector perpendicular to `axis`
fn perpendicular(axis: &Unit<Vector3<f32>>) -> Vector3<f32> {
    let reference = if axis.x.abs() < 0.9 { Vector3::x() } else { Vector3::y() };
    axis.cross(&reference).normalize()
}

/// Logs the scheduler population every `every` frames
pub struct Census {
    every: i64,
}

impl Census {
    /// Create a census reporting every `every` frames
    pub fn new(every: i64) -> Self {
        Self { every: every.max(1) }
    }
}

impl ScriptComponent for Census {
    fn script_type(&self) -> ScriptType {
        CENSUS
    }

    fn on_late_update(&mut self, ctx: &mut ScriptContext<'_>) -> ScriptResult {
        let frame = ctx.time().frame_count;
        if frame % self.every == 0 {
            log::info!("Frame {frame}: {} active scripts", ctx.scheduler().len());
        }
        Ok(())
    }
}
