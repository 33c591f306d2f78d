//! Stand-in machine for running without a motion controller.
//!
//! Each cycle the jog counts gained since the previous cycle, multiplied by
//! the jog scale, are added to the absolute and relative position inputs of
//! the enabled axis. The display then follows the wheel as if a controller
//! had executed the jog.

use tracing::trace;

use crate::bus::{Pin, SignalBus};
use crate::mode::Axis;

/// Position integrator fed from the published jog signals.
#[derive(Debug, Clone, Default)]
pub struct MachineSimulator {
    last_counts: Option<i32>,
}

impl MachineSimulator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Move the enabled axis by the counts gained since the previous call.
    ///
    /// Returns the distance moved.
    pub fn step<B: SignalBus + ?Sized>(&mut self, bus: &mut B) -> f64 {
        let counts = bus.s32(Pin::JogCounts);
        let last = self.last_counts.replace(counts).unwrap_or(counts);
        let delta = counts.wrapping_sub(last);
        if delta == 0 {
            return 0.0;
        }

        let Some(axis) = Axis::ALL
            .into_iter()
            .find(|axis| bus.bit(Pin::JogEnable((*axis).into())))
        else {
            return 0.0;
        };

        let distance = f64::from(delta) * bus.float(Pin::JogScale);
        for pin in [Pin::PosAbsolute(axis), Pin::PosRelative(axis)] {
            let position = bus.float(pin) + distance;
            bus.set_float(pin, position);
        }
        trace!(?axis, distance, "simulated jog");
        distance
    }
}
