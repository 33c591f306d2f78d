//! Power-down handshake detection.
//!
//! Before the pendant powers down it sends two framing reports: one with
//! every signature byte zero, then one with every signature byte `0xff`.
//! Neither carries input. The first marks the device as sleeping, the second
//! is expected and dropped. Any later report wakes the device up.

use std::time::{Duration, Instant};

use hid_xhc_protocol::InputReport;
use tracing::{info, warn};

/// What to do with a received report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SleepVerdict {
    /// Regular input; process it.
    Forward,
    /// Handshake framing; ignore it.
    Drop,
}

/// Detector state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SleepState {
    #[default]
    Awake,
    /// The empty report was seen; the next report is the sleep report.
    PendingDrop,
}

/// Two-state sleep handshake recognizer.
#[derive(Debug, Clone, Default)]
pub struct SleepDetector {
    state: SleepState,
    sleeping: bool,
    last_transition: Option<Instant>,
}

impl SleepDetector {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn state(&self) -> SleepState {
        self.state
    }

    #[must_use]
    pub fn is_sleeping(&self) -> bool {
        self.sleeping
    }

    /// Classify one report received at `now`.
    pub fn classify(&mut self, report: &InputReport, now: Instant) -> SleepVerdict {
        if self.state == SleepState::PendingDrop {
            self.state = SleepState::Awake;
            if !report.is_sleep_signature() {
                warn!(%report, "expected sleep report after empty report, dropping it anyway");
            }
            return SleepVerdict::Drop;
        }

        if report.is_empty_signature() {
            info!(
                idle_secs = self.since_transition(now).as_secs(),
                "pendant going to sleep"
            );
            self.sleeping = true;
            self.state = SleepState::PendingDrop;
            self.last_transition = Some(now);
            return SleepVerdict::Drop;
        }

        if self.sleeping {
            info!(
                slept_secs = self.since_transition(now).as_secs(),
                "pendant woke up"
            );
            self.sleeping = false;
            self.last_transition = Some(now);
        }
        SleepVerdict::Forward
    }

    fn since_transition(&self, now: Instant) -> Duration {
        self.last_transition
            .map_or(Duration::ZERO, |t| now.saturating_duration_since(t))
    }
}
