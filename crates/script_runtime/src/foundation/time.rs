//! Time management utilities

use std::time::Instant;

/// Frame timing published to scripts before each callback pass
///
/// Overwritten by the system manager on every update and fixed update. Scripts
/// only ever see it through a shared reference.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Time {
    /// Seconds since the previous frame update
    pub delta_time: f32,
    /// Global time scale reported by the host
    pub time_scale: f32,
    /// Seconds covered by one fixed update step
    pub fixed_delta_time: f32,
    /// Host frame counter
    pub frame_count: i64,
}

impl Default for Time {
    fn default() -> Self {
        Self {
            delta_time: 0.0,
            time_scale: 1.0,
            fixed_delta_time: 0.0,
            frame_count: 0,
        }
    }
}

impl Time {
    /// Delta time multiplied by the time scale
    pub fn scaled_delta_time(&self) -> f32 {
        self.delta_time * self.time_scale
    }
}

/// High-precision timer for frame timing
pub struct Timer {
    last_frame: Instant,
    delta_time: f32,
    total_time: f32,
    frame_count: u64,
}

impl Default for Timer {
    fn default() -> Self {
        Self::new()
    }
}

impl Timer {
    /// Create a new timer
    pub fn new() -> Self {
        let now = Instant::now();
        Self {
            last_frame: now,
            delta_time: 0.0,
            total_time: 0.0,
            frame_count: 0,
        }
    }

    /// Update the timer (should be called once per frame)
    pub fn update(&mut self) {
        let now = Instant::now();
        let elapsed = now.duration_since(self.last_frame);
        self.delta_time = elapsed.as_secs_f32();
        self.total_time += self.delta_time;
        self.last_frame = now;
        self.frame_count += 1;
    }

    /// Get the time since the last frame in seconds
    pub fn delta_time(&self) -> f32 {
        self.delta_time
    }

    /// Get the total elapsed time since timer creation
    pub fn total_time(&self) -> f32 {
        self.total_time
    }

    /// Get the current frame count
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Get the average FPS since timer creation
    pub fn average_fps(&self) -> f32 {
        if self.total_time > 0.0 {
            self.frame_count as f32 / self.total_time
        } else {
            0.0
        }
    }
}

/// Accumulator that turns variable frame times into whole fixed steps
///
/// The host calls [`FixedStepClock::advance`] once per frame and then runs the
/// fixed update that many times. Leftover time carries into the next frame.
#[derive(Debug, Clone)]
pub struct FixedStepClock {
    step: f32,
    max_steps: u32,
    accumulator: f32,
}

impl FixedStepClock {
    /// Create a clock with the given step length and per-frame step cap
    pub fn new(step: f32, max_steps: u32) -> Self {
        Self {
            step: step.max(f32::EPSILON),
            max_steps: max_steps.max(1),
            accumulator: 0.0,
        }
    }

    /// Seconds covered by one step
    pub fn step(&self) -> f32 {
        self.step
    }

    /// Time accumulated but not yet consumed by a step
    pub fn accumulated(&self) -> f32 {
        self.accumulator
    }

    /// Add a frame's delta time and return how many steps to run
    ///
    /// When the cap is hit the excess time is dropped so a long stall does not
    /// snowball into ever longer frames. Negative and non-finite delta times
    /// add nothing.
    pub fn advance(&mut self, delta_time: f32) -> u32 {
        if !delta_time.is_finite() {
            log::warn!("Ignoring non-finite frame delta {delta_time}");
            return self.advance(0.0);
        }
        self.accumulator = (self.accumulator + delta_time.max(0.0)).min(f32::MAX);
        let mut steps = 0;
        while self.accumulator >= self.step && steps < self.max_steps {
            self.accumulator -= self.step;
            steps += 1;
        }
        if steps == self.max_steps && self.accumulator >= self.step {
            log::debug!(
                "Fixed step cap reached, dropping {:.4}s of accumulated time",
                self.accumulator
            );
            self.accumulator %= self.step;
        }
        steps
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_time_defaults() {
        let time = Time::default();
        assert_eq!(time.frame_count, 0);
        assert_relative_eq!(time.time_scale, 1.0);
        assert_relative_eq!(time.delta_time, 0.0);
    }

    #[test]
    fn test_scaled_delta_time() {
        let time = Time { delta_time: 0.02, time_scale: 0.5, ..Time::default() };
        assert_relative_eq!(time.scaled_delta_time(), 0.01);
    }

    #[test]
    fn test_fixed_step_accumulates_across_frames() {
        let mut clock = FixedStepClock::new(0.02, 5);

        assert_eq!(clock.advance(0.015), 0);
        assert_eq!(clock.advance(0.015), 1);
        assert_relative_eq!(clock.accumulated(), 0.01, epsilon = 1e-6);
    }

    #[test]
    fn test_fixed_step_multiple_steps_per_frame() {
        let mut clock = FixedStepClock::new(0.01, 10);
        assert_eq!(clock.advance(0.035), 3);
        assert_relative_eq!(clock.accumulated(), 0.005, epsilon = 1e-6);
    }

    #[test]
    fn test_fixed_step_cap_drops_backlog() {
        let mut clock = FixedStepClock::new(0.01, 2);
        assert_eq!(clock.advance(1.0), 2);
        assert!(clock.accumulated() < clock.step());
    }

    #[test]
    fn test_negative_delta_is_ignored() {
        let mut clock = FixedStepClock::new(0.01, 2);
        assert_eq!(clock.advance(-1.0), 0);
        assert_relative_eq!(clock.accumulated(), 0.0);
    }

    #[test]
    fn test_non_finite_delta_does_not_wedge_the_clock() {
        let mut clock = FixedStepClock::new(0.02, 3);
        assert_eq!(clock.advance(f32::INFINITY), 0);
        assert_eq!(clock.advance(f32::NAN), 0);
        assert!(clock.accumulated().is_finite());

        assert_eq!(clock.advance(0.025), 1);
        assert_relative_eq!(clock.accumulated(), 0.005, epsilon = 1e-6);
    }

    #[test]
    fn test_huge_deltas_stay_capped() {
        let mut clock = FixedStepClock::new(0.02, 3);
        assert_eq!(clock.advance(f32::MAX), 3);
        assert_eq!(clock.advance(f32::MAX), 3);
        assert!(clock.accumulated() < clock.step());
        assert_eq!(clock.advance(0.0), 0);
    }

    #[test]
    fn test_timer_counts_frames() {
        let mut timer = Timer::new();
        timer.update();
        timer.update();
        assert_eq!(timer.frame_count(), 2);
        assert!(timer.total_time() >= 0.0);
    }
}
