//! Jog wheel accumulation and velocity shaping.
//!
//! Reports add their wheel delta to a running count. Once per poll cycle the
//! engine compares that count with the value it last acted on and derives a
//! smoothed jog velocity, a per-cycle increment and direction flags for the
//! selected axis. When the wheel stops, the velocity decays and drops to
//! zero after [`JOG_IDLE_TIMEOUT`].

use std::time::{Duration, Instant};

use tracing::trace;

use crate::mode::{Axis, AxisPosition, StepSize};

/// Weight of the new target velocity in the exponential smoothing.
pub const VELOCITY_SMOOTHING: f32 = 0.05;

/// Time without wheel motion after which jogging stops.
pub const JOG_IDLE_TIMEOUT: Duration = Duration::from_millis(250);

/// Result of one engine tick.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct JogTick {
    /// Counts consumed by this tick.
    pub delta_counts: i32,
    /// Smoothed jog velocity.
    pub velocity: f32,
    /// Distance of the last wheel movement.
    pub increment: f32,
    /// Positive direction flags in [`Axis::ALL`] order.
    pub plus: [bool; 6],
    /// Negative direction flags in [`Axis::ALL`] order.
    pub minus: [bool; 6],
}

/// Jog count accumulator and velocity shaper.
#[derive(Debug, Clone, Default)]
pub struct JogEngine {
    raw_counts: i32,
    last_counts: i32,
    last_sample_time: Option<Instant>,
    velocity: f32,
    increment: f32,
    plus: [bool; 6],
    minus: [bool; 6],
}

impl JogEngine {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add the wheel delta of one report.
    pub fn on_report(&mut self, step_delta: i8) {
        self.raw_counts = self.raw_counts.wrapping_add(i32::from(step_delta));
    }

    /// Total counts since the session started.
    #[must_use]
    pub fn raw_counts(&self) -> i32 {
        self.raw_counts
    }

    /// Negated total counts, for controllers that jog in the other direction.
    #[must_use]
    pub fn counts_neg(&self) -> i32 {
        self.raw_counts.wrapping_neg()
    }

    #[must_use]
    pub fn velocity(&self) -> f32 {
        self.velocity
    }

    #[must_use]
    pub fn increment(&self) -> f32 {
        self.increment
    }

    /// Direction flags `(plus, minus)` of one axis.
    #[must_use]
    pub fn direction(&self, axis: Axis) -> (bool, bool) {
        let i = axis.index();
        (
            self.plus.get(i).copied().unwrap_or(false),
            self.minus.get(i).copied().unwrap_or(false),
        )
    }

    /// Advance the engine to `now`.
    ///
    /// The first call only records the time. Calls with no elapsed time do
    /// nothing.
    pub fn tick(
        &mut self,
        now: Instant,
        step_size: StepSize,
        axis: AxisPosition,
        max_velocity: f32,
    ) -> JogTick {
        let Some(last_sample_time) = self.last_sample_time else {
            self.last_sample_time = Some(now);
            return self.snapshot(0);
        };
        let elapsed = now.saturating_duration_since(last_sample_time);
        if elapsed.is_zero() {
            return self.snapshot(0);
        }

        let delta_counts = self.raw_counts.wrapping_sub(self.last_counts);
        let keep = 1.0 - VELOCITY_SMOOTHING;
        if delta_counts != 0 {
            let scale = step_size.scale();
            let delta_pos = delta_counts as f32 * scale;
            let target = max_velocity * 60.0 * scale;
            self.velocity = keep * self.velocity + VELOCITY_SMOOTHING * target;

            self.clear_directions();
            if let Some(axis) = axis.axis() {
                let i = axis.index();
                if let Some(plus) = self.plus.get_mut(i) {
                    *plus = delta_pos > 0.0;
                }
                if let Some(minus) = self.minus.get_mut(i) {
                    *minus = delta_pos < 0.0;
                }
            }

            self.increment = if step_size.is_distance() {
                delta_pos.abs()
            } else {
                0.0
            };
            self.last_counts = self.raw_counts;
            self.last_sample_time = Some(now);
            trace!(
                delta_counts,
                delta_pos,
                velocity = self.velocity,
                ?axis,
                "jog wheel moved"
            );
        } else {
            self.velocity *= keep;
            if elapsed > JOG_IDLE_TIMEOUT {
                self.velocity = 0.0;
                self.clear_directions();
            }
        }

        self.snapshot(delta_counts)
    }

    /// Forget accumulated motion; the next tick primes the clock again.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    fn clear_directions(&mut self) {
        self.plus = [false; 6];
        self.minus = [false; 6];
    }

    fn snapshot(&self, delta_counts: i32) -> JogTick {
        JogTick {
            delta_counts,
            velocity: self.velocity,
            increment: self.increment,
            plus: self.plus,
            minus: self.minus,
        }
    }
}
