//! Poll-cycle driver.
//!
//! A session owns a transport, a signal bus and a [`PendantContext`]. Each
//! cycle it waits for at most one input report, feeds it to the context,
//! advances the jog engine, optionally runs the machine simulation, and
//! sends one display update. Cycles are never interleaved; a stop request
//! takes effect between cycles.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use hid_xhc_protocol::OUTPUT_BLOCK_LEN;
use parking_lot::RwLock;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::bus::{Pin, PinDirection, SignalBus};
use crate::config::PendantConfig;
use crate::context::PendantContext;
use crate::error::{PendantError, PendantResult};
use crate::jog::JogTick;
use crate::mode::{AxisPosition, JogMode, StepSize};
use crate::simulate::MachineSimulator;
use crate::sleep::SleepVerdict;

/// Size of the receive buffer handed to the transport.
pub const RX_BUFFER_LEN: usize = 64;

/// Raw report channel to the pendant receiver.
pub trait PendantTransport {
    /// Wait up to `timeout` for one input transfer and copy it into `buf`.
    ///
    /// Returns the transfer length, or `None` if nothing arrived in time. A
    /// length larger than `buf` means the transfer was truncated.
    ///
    /// # Errors
    ///
    /// Returns an error if the device is gone or the transfer failed.
    fn receive(&mut self, buf: &mut [u8], timeout: Duration) -> PendantResult<Option<usize>>;

    /// Send one framed output block.
    ///
    /// # Errors
    ///
    /// Returns an error if the device is gone or the transfer failed.
    fn send_block(&mut self, block: &[u8; OUTPUT_BLOCK_LEN]) -> PendantResult<()>;
}

/// Cooperative cancellation flag shared with other threads.
#[derive(Debug, Clone, Default)]
pub struct StopHandle {
    stopped: Arc<AtomicBool>,
}

impl StopHandle {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Request the session to stop after the current cycle.
    pub fn stop(&self) {
        self.stopped.store(true, Ordering::Release);
    }

    #[must_use]
    pub fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::Acquire)
    }
}

/// Per-cycle state for observers on other threads.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PendantSnapshot {
    pub mode: JogMode,
    pub step_size: StepSize,
    pub sleeping: bool,
    pub velocity: f32,
    /// Signal name of the held key combination, empty if none.
    pub meta_button: &'static str,
    pub axis: AxisPosition,
    /// Completed poll cycles.
    pub cycles: u64,
}

impl Default for PendantSnapshot {
    fn default() -> Self {
        Self {
            mode: JogMode::default(),
            step_size: StepSize::Undefined,
            sleeping: false,
            velocity: 0.0,
            meta_button: "",
            axis: AxisPosition::Undefined,
            cycles: 0,
        }
    }
}

/// Snapshot cell: written once per cycle by the session, read by anyone.
#[derive(Debug, Clone, Default)]
pub struct SharedState {
    inner: Arc<RwLock<PendantSnapshot>>,
}

impl SharedState {
    /// Copy of the last published snapshot.
    #[must_use]
    pub fn snapshot(&self) -> PendantSnapshot {
        self.inner.read().clone()
    }

    fn publish(&self, snapshot: PendantSnapshot) {
        *self.inner.write() = snapshot;
    }
}

/// What happened to the frame of one cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FrameOutcome {
    /// Nothing arrived before the timeout.
    Timeout,
    /// Wrong size; skipped.
    Malformed,
    /// Sleep handshake framing; skipped.
    Dropped,
    /// Decoded and applied.
    Applied,
}

/// Result of one poll cycle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CycleReport {
    pub outcome: FrameOutcome,
    pub jog: JogTick,
}

/// A running pendant session.
#[derive(Debug)]
pub struct PendantSession<T, B> {
    config: PendantConfig,
    transport: T,
    bus: B,
    context: PendantContext,
    simulator: Option<MachineSimulator>,
    stop: StopHandle,
    shared: SharedState,
    rx_buf: [u8; RX_BUFFER_LEN],
    cycles: u64,
}

impl<T: PendantTransport, B: SignalBus> PendantSession<T, B> {
    /// Validate `config`, initialize every output signal and mark the
    /// pendant connected.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn new(config: PendantConfig, transport: T, mut bus: B) -> PendantResult<Self> {
        config.validate()?;

        for pin in Pin::all() {
            if pin.direction() == PinDirection::Out {
                bus.set(pin, pin.default_value());
            }
        }
        bus.set_bit(Pin::Connected, true);
        bus.set_bit(Pin::RequirePendant, config.require_pendant);

        info!(
            component = %config.component_name,
            model = config.model().name(),
            simulate = config.simulate_machine,
            "pendant session started"
        );

        Ok(Self {
            context: PendantContext::new(&config),
            simulator: config.simulate_machine.then(MachineSimulator::new),
            config,
            transport,
            bus,
            stop: StopHandle::new(),
            shared: SharedState::default(),
            rx_buf: [0u8; RX_BUFFER_LEN],
            cycles: 0,
        })
    }

    /// Handle for stopping [`run`](Self::run) from another thread.
    #[must_use]
    pub fn stop_handle(&self) -> StopHandle {
        self.stop.clone()
    }

    /// Snapshot cell updated after every cycle.
    #[must_use]
    pub fn shared_state(&self) -> SharedState {
        self.shared.clone()
    }

    /// Run one poll cycle at `now`.
    ///
    /// # Errors
    ///
    /// Returns [`PendantError::Transport`] if the transport fails. The
    /// `connected` signal is cleared first.
    pub fn poll_cycle(&mut self, now: Instant) -> PendantResult<CycleReport> {
        let received = match self
            .transport
            .receive(&mut self.rx_buf, self.config.receive_timeout())
        {
            Ok(received) => received,
            Err(error) => return Err(self.fail(error)),
        };

        let outcome = match received {
            None => FrameOutcome::Timeout,
            Some(len) => match self.rx_buf.get(..len) {
                None => {
                    warn!(len, "skipping truncated transfer");
                    FrameOutcome::Malformed
                }
                Some(frame) => match self.context.handle_frame(frame, now, &mut self.bus) {
                    Ok(SleepVerdict::Forward) => FrameOutcome::Applied,
                    Ok(SleepVerdict::Drop) => FrameOutcome::Dropped,
                    Err(error) => {
                        warn!(%error, "skipping frame");
                        FrameOutcome::Malformed
                    }
                },
            },
        };

        let jog = self.context.tick(now, &mut self.bus);
        if let Some(simulator) = self.simulator.as_mut() {
            simulator.step(&mut self.bus);
        }

        let blocks = self.context.display_state(&self.bus).encode();
        for block in &blocks {
            if let Err(error) = self.transport.send_block(block) {
                return Err(self.fail(error));
            }
        }

        self.cycles = self.cycles.saturating_add(1);
        self.publish(jog);
        debug!(cycle = self.cycles, ?outcome, "poll cycle complete");
        Ok(CycleReport { outcome, jog })
    }

    /// Poll until the stop handle is triggered.
    ///
    /// # Errors
    ///
    /// Returns the first transport failure.
    pub fn run(&mut self) -> PendantResult<()> {
        while !self.stop.is_stopped() {
            self.poll_cycle(Instant::now())?;
        }
        self.bus.set_bit(Pin::Connected, false);
        info!(cycles = self.cycles, "pendant session stopped");
        Ok(())
    }

    #[must_use]
    pub fn config(&self) -> &PendantConfig {
        &self.config
    }

    #[must_use]
    pub fn context(&self) -> &PendantContext {
        &self.context
    }

    #[must_use]
    pub fn bus(&self) -> &B {
        &self.bus
    }

    /// Mutable bus access, for hosts that feed machine state in between
    /// cycles.
    pub fn bus_mut(&mut self) -> &mut B {
        &mut self.bus
    }

    #[must_use]
    pub fn transport(&self) -> &T {
        &self.transport
    }

    #[must_use]
    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    /// Tear the session down, returning its transport and bus.
    pub fn into_parts(self) -> (T, B) {
        (self.transport, self.bus)
    }

    fn fail(&mut self, error: PendantError) -> PendantError {
        warn!(%error, "pendant transport failed");
        self.bus.set_bit(Pin::Connected, false);
        match error {
            PendantError::Transport(_) => error,
            other => PendantError::transport(other.to_string()),
        }
    }

    fn publish(&self, jog: JogTick) {
        let current = self.context.current();
        self.shared.publish(PendantSnapshot {
            mode: current.mode,
            step_size: current.step_size,
            sleeping: self.context.is_sleeping(),
            velocity: jog.velocity,
            meta_button: current.meta_button.signal_name(),
            axis: current.axis,
            cycles: self.cycles,
        });
    }
}
