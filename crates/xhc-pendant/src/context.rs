//! Per-session pendant state and report orchestration.
//!
//! [`PendantContext`] owns every piece of session state: the sleep detector,
//! the dial resolver, the jog engine and the previous/current logical button
//! state. It turns raw frames into signal bus writes and edge events, and
//! gathers the display content from bus read-backs.

use std::time::Instant;

use hid_xhc_protocol::keys::{self, KeyCode, META_BUTTONS, MetaButton, button};
use hid_xhc_protocol::{
    DisplayFlags, INPUT_REPORT_LEN, InputReport, OutputState, StepModeIndicator,
    parse_input_report,
};
use tracing::{debug, trace};

use crate::bus::{Pin, SignalBus};
use crate::buttons::{ButtonResolver, ButtonsState};
use crate::config::PendantConfig;
use crate::error::{PendantError, PendantResult};
use crate::jog::{JogEngine, JogTick};
use crate::mode::{Axis, AxisPosition, JogMode, ModeResolver};
use crate::sleep::{SleepDetector, SleepVerdict};

/// Edge-triggered change observed while applying a report.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PendantEvent {
    ButtonPressed(MetaButton),
    ButtonReleased(MetaButton),
    AxisActive(AxisPosition),
    AxisInactive(AxisPosition),
    FeedActive(KeyCode),
    FeedInactive(KeyCode),
    /// Jog wheel moved by the given counts.
    JogDial(i8),
    ModeChanged(JogMode),
}

/// Session state of one pendant.
#[derive(Debug, Clone)]
pub struct PendantContext {
    display_machine_coordinates: bool,
    display_day: u8,
    sleep: SleepDetector,
    modes: ModeResolver,
    jog: JogEngine,
    previous: ButtonsState,
    current: ButtonsState,
    events: Vec<PendantEvent>,
}

impl PendantContext {
    /// Create a context with fresh state.
    #[must_use]
    pub fn new(config: &PendantConfig) -> Self {
        Self {
            display_machine_coordinates: config.display_machine_coordinates,
            display_day: config.display_day,
            sleep: SleepDetector::new(),
            modes: ModeResolver::new(),
            jog: JogEngine::new(),
            previous: ButtonsState::default(),
            current: ButtonsState::default(),
            events: Vec::with_capacity(8),
        }
    }

    /// Process one raw transfer buffer received at `now`.
    ///
    /// # Errors
    ///
    /// Returns [`PendantError::MalformedFrame`] if `frame` is not exactly one
    /// input report long. Nothing is changed in that case.
    pub fn handle_frame<B: SignalBus + ?Sized>(
        &mut self,
        frame: &[u8],
        now: Instant,
        bus: &mut B,
    ) -> PendantResult<SleepVerdict> {
        let Ok(report) = parse_input_report(frame) else {
            return Err(PendantError::malformed_frame(INPUT_REPORT_LEN, frame.len()));
        };
        self.events.clear();
        trace!(%report, "input report");

        let verdict = self.sleep.classify(&report, now);
        bus.set_bit(Pin::Sleeping, self.sleep.is_sleeping());
        if verdict == SleepVerdict::Forward {
            self.apply_report(&report, bus);
        }
        Ok(verdict)
    }

    /// Apply a decoded report: resolve it, emit edge events and publish the
    /// result on the bus.
    pub fn apply_report<B: SignalBus + ?Sized>(&mut self, report: &InputReport, bus: &mut B) {
        self.events.clear();

        let (pressed_key, modifier) = ButtonResolver::resolve(report.key1, report.key2);
        let meta_button = keys::find_meta_button(pressed_key, modifier);
        let mode_change = self.modes.on_button(&meta_button);
        let axis = ModeResolver::resolve_axis(report.axis_code);
        let step_size = self.modes.resolve_step_size(report.feed_code);

        self.previous = self.current;
        self.current = ButtonsState {
            pressed_key,
            modifier,
            meta_button,
            axis,
            feed: keys::find_feed_position(report.feed_code),
            mode: self.modes.mode(),
            step_size,
        };
        self.collect_events(mode_change, report.step_delta);

        let active = keys::meta_button_index(&meta_button);
        for index in 0..META_BUTTONS.len() {
            bus.set_bit(Pin::Button(index), active == Some(index));
        }
        for (position, enabled) in AxisPosition::REAL.into_iter().zip(axis.enable_flags()) {
            bus.set_bit(Pin::JogEnable(position), enabled);
        }
        bus.set_float(Pin::StepSize, f64::from(step_size.table_value()));
        bus.set_float(Pin::JogScale, f64::from(step_size.scale()));

        self.jog.on_report(report.step_delta);
        bus.set_s32(Pin::JogCounts, self.jog.raw_counts());
        bus.set_s32(Pin::JogCountsNeg, self.jog.counts_neg());
    }

    /// Run the jog engine for one poll cycle and publish its outputs.
    pub fn tick<B: SignalBus + ?Sized>(&mut self, now: Instant, bus: &mut B) -> JogTick {
        let max_velocity = bus.float(Pin::JogMaxVelocity) as f32;
        let tick = self.jog.tick(
            now,
            self.current.step_size,
            self.current.axis,
            max_velocity,
        );

        bus.set_float(Pin::JogVelocity, f64::from(tick.velocity));
        bus.set_float(Pin::JogIncrement, f64::from(tick.increment));
        for ((axis, plus), minus) in Axis::ALL.into_iter().zip(tick.plus).zip(tick.minus) {
            bus.set_bit(Pin::JogPlus(axis), plus);
            bus.set_bit(Pin::JogMinus(axis), minus);
        }
        tick
    }

    /// Gather the display content from the current state and bus read-backs.
    #[must_use]
    pub fn display_state<B: SignalBus + ?Sized>(&self, bus: &B) -> OutputState {
        let rows = match self.current.axis {
            AxisPosition::A | AxisPosition::B | AxisPosition::C => [Axis::A, Axis::B, Axis::C],
            _ => [Axis::X, Axis::Y, Axis::Z],
        };
        let coordinates = rows.map(|axis| {
            let pin = if self.display_machine_coordinates {
                Pin::PosAbsolute(axis)
            } else {
                Pin::PosRelative(axis)
            };
            bus.float(pin)
        });

        let step_mode = match self.current.mode {
            JogMode::Step => StepModeIndicator::Step,
            JogMode::Continuous => StepModeIndicator::Continuous,
        };
        let flags = DisplayFlags {
            step_mode,
            reserved: 0,
            is_reset: self.current.is_pressed(button::RESET),
            is_machine_coordinate: self.display_machine_coordinates,
        };

        OutputState::new()
            .with_day(self.display_day)
            .with_flags(flags)
            .with_coordinates(coordinates)
            .with_feed_rate(per_minute(bus.float(Pin::FeedValue)))
            .with_spindle_speed(per_minute(bus.float(Pin::SpindleRps)))
    }

    /// Events emitted by the last [`handle_frame`](Self::handle_frame) or
    /// [`apply_report`](Self::apply_report) call.
    #[must_use]
    pub fn events(&self) -> &[PendantEvent] {
        &self.events
    }

    #[must_use]
    pub fn is_sleeping(&self) -> bool {
        self.sleep.is_sleeping()
    }

    #[must_use]
    pub fn current(&self) -> &ButtonsState {
        &self.current
    }

    #[must_use]
    pub fn previous(&self) -> &ButtonsState {
        &self.previous
    }

    #[must_use]
    pub fn modes(&self) -> &ModeResolver {
        &self.modes
    }

    #[must_use]
    pub fn jog(&self) -> &JogEngine {
        &self.jog
    }

    fn collect_events(&mut self, mode_change: Option<JogMode>, step_delta: i8) {
        let previous = self.previous;
        let current = self.current;

        if previous.meta_button != current.meta_button {
            if !previous.meta_button.is_undefined() {
                self.events
                    .push(PendantEvent::ButtonReleased(previous.meta_button));
            }
            if !current.meta_button.is_undefined() {
                debug!(
                    button = current.meta_button.signal_name(),
                    "button pressed"
                );
                self.events
                    .push(PendantEvent::ButtonPressed(current.meta_button));
            }
        }

        if previous.axis != current.axis {
            if previous.axis != AxisPosition::Undefined {
                self.events.push(PendantEvent::AxisInactive(previous.axis));
            }
            if current.axis != AxisPosition::Undefined {
                debug!(axis = ?current.axis, "axis selected");
                self.events.push(PendantEvent::AxisActive(current.axis));
            }
        }

        if previous.feed != current.feed {
            if !previous.feed.is_undefined() {
                self.events.push(PendantEvent::FeedInactive(previous.feed));
            }
            if !current.feed.is_undefined() {
                debug!(step_size = ?current.step_size, "feed position selected");
                self.events.push(PendantEvent::FeedActive(current.feed));
            }
        }

        if step_delta != 0 {
            self.events.push(PendantEvent::JogDial(step_delta));
        }

        if let Some(mode) = mode_change {
            debug!(?mode, "jog mode changed");
            self.events.push(PendantEvent::ModeChanged(mode));
        }
    }
}

/// Convert a per-second rate to a per-minute display value.
fn per_minute(per_second: f64) -> u16 {
    if per_second.is_nan() {
        return 0;
    }
    (per_second * 60.0).round().clamp(0.0, f64::from(u16::MAX)) as u16
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bus::MemoryBus;
    use crate::mode::StepSize;
    use std::time::Duration;

    fn context() -> PendantContext {
        PendantContext::new(&PendantConfig::default())
    }

    fn frame(key1: u8, key2: u8, feed: u8, axis: u8, delta: i8) -> [u8; 8] {
        [0x04, 0x10, key1, key2, feed, axis, delta as u8, 0x00]
    }

    #[test]
    fn test_malformed_frame_changes_nothing() {
        let mut ctx = context();
        let mut bus = MemoryBus::new();
        let result = ctx.handle_frame(&[0x04, 0x00], Instant::now(), &mut bus);
        assert_eq!(result, Err(PendantError::malformed_frame(8, 2)));
        assert!(bus.is_empty());
        assert_eq!(ctx.current(), &ButtonsState::default());
    }

    #[test]
    fn test_button_signals_are_exclusive() -> PendantResult<()> {
        let mut ctx = context();
        let mut bus = MemoryBus::new();
        ctx.handle_frame(&frame(0x0c, 0x02, 0x0d, 0x11, 0), Instant::now(), &mut bus)?;

        let held: Vec<usize> = (0..META_BUTTONS.len())
            .filter(|i| bus.bit(Pin::Button(*i)))
            .collect();
        assert_eq!(held, vec![3]);
        Ok(())
    }

    #[test]
    fn test_press_and_release_events() -> PendantResult<()> {
        let mut ctx = context();
        let mut bus = MemoryBus::new();
        let now = Instant::now();

        ctx.handle_frame(&frame(0x01, 0x00, 0x0d, 0x11, 0), now, &mut bus)?;
        assert!(ctx.events().contains(&PendantEvent::ButtonPressed(
            ButtonResolver::resolve_meta(0x01, 0x00)
        )));
        assert!(ctx.events().contains(&PendantEvent::AxisActive(AxisPosition::X)));
        assert!(ctx.events().contains(&PendantEvent::FeedActive(keys::feed::SPEED_0_001)));

        ctx.handle_frame(&frame(0x00, 0x00, 0x0d, 0x11, 0), now, &mut bus)?;
        assert_eq!(
            ctx.events(),
            &[PendantEvent::ButtonReleased(ButtonResolver::resolve_meta(
                0x01, 0x00
            ))]
        );
        Ok(())
    }

    #[test]
    fn test_axis_change_events_and_enables() -> PendantResult<()> {
        let mut ctx = context();
        let mut bus = MemoryBus::new();
        let now = Instant::now();
        ctx.handle_frame(&frame(0, 0, 0x0d, 0x11, 0), now, &mut bus)?;
        ctx.handle_frame(&frame(0, 0, 0x0d, 0x13, 0), now, &mut bus)?;

        assert_eq!(
            ctx.events(),
            &[
                PendantEvent::AxisInactive(AxisPosition::X),
                PendantEvent::AxisActive(AxisPosition::Z),
            ]
        );
        assert!(bus.bit(Pin::JogEnable(AxisPosition::Z)));
        assert!(!bus.bit(Pin::JogEnable(AxisPosition::X)));
        assert!(!bus.bit(Pin::JogEnable(AxisPosition::Off)));
        Ok(())
    }

    #[test]
    fn test_mode_button_switches_step_size() -> PendantResult<()> {
        let mut ctx = context();
        let mut bus = MemoryBus::new();
        let now = Instant::now();

        ctx.handle_frame(&frame(0, 0, 0x0e, 0x11, 0), now, &mut bus)?;
        assert_eq!(ctx.current().step_size, StepSize::Continuous(5));
        assert!((bus.float(Pin::JogScale) - 0.05).abs() < 1e-6);

        ctx.handle_frame(&frame(0x0f, 0, 0x0e, 0x11, 0), now, &mut bus)?;
        assert_eq!(ctx.current().mode, JogMode::Step);
        assert_eq!(ctx.current().step_size, StepSize::Step(0.01));
        assert!(ctx.events().contains(&PendantEvent::ModeChanged(JogMode::Step)));
        assert!((bus.float(Pin::StepSize) - 0.01).abs() < 1e-6);
        Ok(())
    }

    #[test]
    fn test_jog_counts_published() -> PendantResult<()> {
        let mut ctx = context();
        let mut bus = MemoryBus::new();
        let now = Instant::now();
        ctx.handle_frame(&frame(0, 0, 0x0d, 0x11, 3), now, &mut bus)?;
        ctx.handle_frame(&frame(0, 0, 0x0d, 0x11, -5), now, &mut bus)?;
        assert_eq!(bus.s32(Pin::JogCounts), -2);
        assert_eq!(bus.s32(Pin::JogCountsNeg), 2);
        assert_eq!(ctx.events(), &[PendantEvent::JogDial(-5)]);
        Ok(())
    }

    #[test]
    fn test_sleep_handshake_is_not_applied() -> PendantResult<()> {
        let mut ctx = context();
        let mut bus = MemoryBus::new();
        let now = Instant::now();
        ctx.handle_frame(&frame(0, 0, 0x0d, 0x11, 0), now, &mut bus)?;

        let verdict = ctx.handle_frame(&[0x04, 0xff, 0, 0, 0, 0, 0, 0xff], now, &mut bus)?;
        assert_eq!(verdict, SleepVerdict::Drop);
        assert!(bus.bit(Pin::Sleeping));
        assert_eq!(ctx.current().axis, AxisPosition::X);
        assert!(ctx.events().is_empty());

        ctx.handle_frame(&[0xff; 8], now, &mut bus)?;
        ctx.handle_frame(&frame(0, 0, 0x0d, 0x11, 0), now, &mut bus)?;
        assert!(!bus.bit(Pin::Sleeping));
        Ok(())
    }

    #[test]
    fn test_tick_publishes_direction() -> PendantResult<()> {
        let mut ctx = context();
        let mut bus = MemoryBus::new();
        bus.set_float(Pin::JogMaxVelocity, 10.0);
        let t0 = Instant::now();

        ctx.handle_frame(&frame(0, 0, 0x0d, 0x12, 0), t0, &mut bus)?;
        ctx.tick(t0, &mut bus);
        ctx.handle_frame(&frame(0, 0, 0x0d, 0x12, -1), t0, &mut bus)?;
        let tick = ctx.tick(t0 + Duration::from_millis(20), &mut bus);

        assert_eq!(tick.delta_counts, -1);
        assert!(bus.bit(Pin::JogMinus(Axis::Y)));
        assert!(!bus.bit(Pin::JogPlus(Axis::Y)));
        assert!(bus.float(Pin::JogVelocity) > 0.0);
        Ok(())
    }

    #[test]
    fn test_display_rows_follow_axis_dial() -> PendantResult<()> {
        let mut ctx = context();
        let mut bus = MemoryBus::new();
        bus.set_float(Pin::PosRelative(Axis::X), 1.0);
        bus.set_float(Pin::PosRelative(Axis::B), -2.5);
        bus.set_float(Pin::PosAbsolute(Axis::X), 9.0);

        ctx.handle_frame(&frame(0, 0, 0x0d, 0x11, 0), Instant::now(), &mut bus)?;
        let state = ctx.display_state(&bus);
        assert!((state.coordinates[0].value() - 1.0).abs() < 1e-9);

        ctx.handle_frame(&frame(0, 0, 0x0d, 0x15, 0), Instant::now(), &mut bus)?;
        let state = ctx.display_state(&bus);
        assert!((state.coordinates[1].value() + 2.5).abs() < 1e-9);
        assert!(!state.flags.is_machine_coordinate);
        Ok(())
    }

    #[test]
    fn test_display_machine_coordinates_and_rates() -> PendantResult<()> {
        let config = PendantConfig::builder()
            .display_machine_coordinates(true)
            .build()?;
        let mut ctx = PendantContext::new(&config);
        let mut bus = MemoryBus::new();
        bus.set_float(Pin::PosAbsolute(Axis::Z), 12.34);
        bus.set_float(Pin::FeedValue, 0.35);
        bus.set_float(Pin::SpindleRps, 2000.0);

        ctx.handle_frame(&frame(0x01, 0, 0x0d, 0x13, 0), Instant::now(), &mut bus)?;
        let state = ctx.display_state(&bus);
        assert_eq!(state.coordinates[2].integer, 12);
        assert_eq!(state.coordinates[2].fraction, 3400);
        assert_eq!(state.feed_rate, 21);
        assert_eq!(state.spindle_speed, u16::MAX);
        assert!(state.flags.is_machine_coordinate);
        assert!(state.flags.is_reset);
        assert_eq!(state.flags.step_mode, StepModeIndicator::Continuous);
        Ok(())
    }

    #[test]
    fn test_per_minute_clamps() {
        assert_eq!(per_minute(-1.0), 0);
        assert_eq!(per_minute(f64::NAN), 0);
        assert_eq!(per_minute(0.7), 42);
        assert_eq!(per_minute(1.0e9), u16::MAX);
    }
}
