//! Prelude for xhc-pendant.
//!
//! Re-exports the types needed to drive a session.

pub use crate::bus::{MemoryBus, Pin, PinDirection, PinKind, PinValue, SignalBus};
pub use crate::buttons::{ButtonResolver, ButtonsState};
pub use crate::config::{PendantConfig, PendantConfigBuilder};
pub use crate::context::{PendantContext, PendantEvent};
pub use crate::error::{PendantError, PendantResult};
pub use crate::jog::{JogEngine, JogTick};
pub use crate::mock::MockTransport;
pub use crate::mode::{Axis, AxisPosition, JogMode, ModeResolver, StepSize};
pub use crate::session::{
    CycleReport, FrameOutcome, PendantSession, PendantSnapshot, PendantTransport, SharedState,
    StopHandle,
};
pub use crate::simulate::MachineSimulator;
pub use crate::sleep::{SleepDetector, SleepVerdict};
