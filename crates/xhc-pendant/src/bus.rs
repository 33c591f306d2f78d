//! Signal bus seam.
//!
//! The engine publishes its state as named signals and reads machine state
//! (positions, feed, spindle, jog limits) back from the same bus. Pins are
//! addressed by the typed [`Pin`] key; their external names are derived from
//! the component name, e.g. `xhc-whb04b-6.jog.enable-x`.

use std::collections::HashMap;

use hid_xhc_protocol::keys::META_BUTTONS;
use serde::{Deserialize, Serialize};

use crate::mode::{Axis, AxisPosition};

/// Value of one signal.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum PinValue {
    Bit(bool),
    Float(f64),
    S32(i32),
}

/// Signal type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PinKind {
    Bit,
    Float,
    S32,
}

/// Who writes the signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PinDirection {
    /// Written by the machine, read by the engine.
    In,
    /// Written by the engine.
    Out,
}

/// Every signal the engine knows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Pin {
    /// One key combination, by index into [`META_BUTTONS`].
    Button(usize),
    /// Jog enable for a dial position; `Off` included, `Undefined` has none.
    JogEnable(AxisPosition),
    JogPlus(Axis),
    JogMinus(Axis),
    JogScale,
    JogCounts,
    JogCountsNeg,
    JogVelocity,
    JogMaxVelocity,
    JogIncrement,
    PosAbsolute(Axis),
    PosRelative(Axis),
    FeedValue,
    FeedOverride,
    SpindleRps,
    SpindleOverride,
    Sleeping,
    Connected,
    StepSize,
    RequirePendant,
}

impl Pin {
    /// Signal type.
    #[must_use]
    pub fn kind(self) -> PinKind {
        match self {
            Self::Button(_)
            | Self::JogEnable(_)
            | Self::JogPlus(_)
            | Self::JogMinus(_)
            | Self::Sleeping
            | Self::Connected
            | Self::RequirePendant => PinKind::Bit,
            Self::JogCounts | Self::JogCountsNeg => PinKind::S32,
            Self::JogScale
            | Self::JogVelocity
            | Self::JogMaxVelocity
            | Self::JogIncrement
            | Self::PosAbsolute(_)
            | Self::PosRelative(_)
            | Self::FeedValue
            | Self::FeedOverride
            | Self::SpindleRps
            | Self::SpindleOverride
            | Self::StepSize => PinKind::Float,
        }
    }

    /// Signal direction.
    #[must_use]
    pub fn direction(self) -> PinDirection {
        match self {
            Self::JogMaxVelocity
            | Self::PosAbsolute(_)
            | Self::PosRelative(_)
            | Self::FeedValue
            | Self::FeedOverride
            | Self::SpindleRps
            | Self::SpindleOverride => PinDirection::In,
            _ => PinDirection::Out,
        }
    }

    /// Initial value of the signal.
    #[must_use]
    pub fn default_value(self) -> PinValue {
        match self.kind() {
            PinKind::Bit => PinValue::Bit(false),
            PinKind::Float => PinValue::Float(0.0),
            PinKind::S32 => PinValue::S32(0),
        }
    }

    /// Signal name without the component prefix, or `None` for a pin that
    /// has no external name (an out-of-range button or the undefined axis
    /// position).
    #[must_use]
    pub fn suffix(self) -> Option<String> {
        let suffix = match self {
            Self::Button(index) => META_BUTTONS.get(index)?.signal_name().to_string(),
            Self::JogEnable(AxisPosition::Off) => "jog.enable-off".to_string(),
            Self::JogEnable(position) => format!("jog.enable-{}", position.axis()?.letter()),
            Self::JogPlus(axis) => format!("jog.plus-{}", axis.letter()),
            Self::JogMinus(axis) => format!("jog.minus-{}", axis.letter()),
            Self::JogScale => "jog.scale".to_string(),
            Self::JogCounts => "jog.counts".to_string(),
            Self::JogCountsNeg => "jog.counts-neg".to_string(),
            Self::JogVelocity => "jog.velocity".to_string(),
            Self::JogMaxVelocity => "jog.max-velocity".to_string(),
            Self::JogIncrement => "jog.increment".to_string(),
            Self::PosAbsolute(axis) => format!("{}.pos-absolute", axis.letter()),
            Self::PosRelative(axis) => format!("{}.pos-relative", axis.letter()),
            Self::FeedValue => "feed-value".to_string(),
            Self::FeedOverride => "feed-override".to_string(),
            Self::SpindleRps => "spindle-rps".to_string(),
            Self::SpindleOverride => "spindle-override".to_string(),
            Self::Sleeping => "sleeping".to_string(),
            Self::Connected => "connected".to_string(),
            Self::StepSize => "stepsize".to_string(),
            Self::RequirePendant => "require_pendant".to_string(),
        };
        Some(suffix)
    }

    /// Full signal name under `prefix`.
    #[must_use]
    pub fn name(self, prefix: &str) -> Option<String> {
        self.suffix().map(|suffix| format!("{prefix}.{suffix}"))
    }

    /// Every signal in registration order.
    #[must_use]
    pub fn all() -> Vec<Pin> {
        let mut pins: Vec<Pin> = (0..META_BUTTONS.len()).map(Pin::Button).collect();
        pins.extend(Axis::ALL.map(Pin::PosAbsolute));
        pins.extend(Axis::ALL.map(Pin::PosRelative));
        pins.extend([
            Pin::FeedValue,
            Pin::FeedOverride,
            Pin::SpindleRps,
            Pin::SpindleOverride,
            Pin::Sleeping,
            Pin::Connected,
            Pin::StepSize,
            Pin::RequirePendant,
        ]);
        pins.extend(AxisPosition::REAL.map(Pin::JogEnable));
        pins.extend([
            Pin::JogScale,
            Pin::JogCounts,
            Pin::JogCountsNeg,
            Pin::JogVelocity,
            Pin::JogMaxVelocity,
            Pin::JogIncrement,
        ]);
        pins.extend(Axis::ALL.map(Pin::JogPlus));
        pins.extend(Axis::ALL.map(Pin::JogMinus));
        pins
    }
}

/// Named read/write slots shared with the machine.
pub trait SignalBus {
    /// Write a signal.
    fn set(&mut self, pin: Pin, value: PinValue);

    /// Read a signal; `None` if it was never written.
    fn get(&self, pin: Pin) -> Option<PinValue>;

    /// Write a bit signal.
    fn set_bit(&mut self, pin: Pin, value: bool) {
        self.set(pin, PinValue::Bit(value));
    }

    /// Write a float signal.
    fn set_float(&mut self, pin: Pin, value: f64) {
        self.set(pin, PinValue::Float(value));
    }

    /// Write a signed 32-bit signal.
    fn set_s32(&mut self, pin: Pin, value: i32) {
        self.set(pin, PinValue::S32(value));
    }

    /// Read a bit signal; anything else reads as `false`.
    fn bit(&self, pin: Pin) -> bool {
        matches!(self.get(pin), Some(PinValue::Bit(true)))
    }

    /// Read a numeric signal as float; unset and bit signals read as zero.
    fn float(&self, pin: Pin) -> f64 {
        match self.get(pin) {
            Some(PinValue::Float(value)) => value,
            Some(PinValue::S32(value)) => f64::from(value),
            Some(PinValue::Bit(_)) | None => 0.0,
        }
    }

    /// Read a signed 32-bit signal; anything else reads as zero.
    fn s32(&self, pin: Pin) -> i32 {
        match self.get(pin) {
            Some(PinValue::S32(value)) => value,
            _ => 0,
        }
    }
}

/// In-process signal bus.
#[derive(Debug, Clone, Default)]
pub struct MemoryBus {
    values: HashMap<Pin, PinValue>,
}

impl MemoryBus {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A bus with every known signal at its initial value.
    #[must_use]
    pub fn with_all_pins() -> Self {
        let values = Pin::all()
            .into_iter()
            .map(|pin| (pin, pin.default_value()))
            .collect();
        Self { values }
    }

    /// Number of signals that hold a value.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Named dump of every written signal, sorted by name.
    #[must_use]
    pub fn dump(&self, prefix: &str) -> Vec<(String, PinValue)> {
        let mut entries: Vec<(String, PinValue)> = self
            .values
            .iter()
            .filter_map(|(pin, value)| pin.name(prefix).map(|name| (name, *value)))
            .collect();
        entries.sort_by(|a, b| a.0.cmp(&b.0));
        entries
    }
}

impl SignalBus for MemoryBus {
    fn set(&mut self, pin: Pin, value: PinValue) {
        self.values.insert(pin, value);
    }

    fn get(&self, pin: Pin) -> Option<PinValue> {
        self.values.get(&pin).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_pin_names() {
        let prefix = "xhc-whb04b-6";
        assert_eq!(
            Pin::JogEnable(AxisPosition::X).name(prefix).as_deref(),
            Some("xhc-whb04b-6.jog.enable-x")
        );
        assert_eq!(
            Pin::JogEnable(AxisPosition::Off).name(prefix).as_deref(),
            Some("xhc-whb04b-6.jog.enable-off")
        );
        assert_eq!(
            Pin::PosRelative(Axis::B).name(prefix).as_deref(),
            Some("xhc-whb04b-6.b.pos-relative")
        );
        assert_eq!(
            Pin::Button(3).name(prefix).as_deref(),
            Some("xhc-whb04b-6.Macro-12")
        );
        assert_eq!(Pin::JogEnable(AxisPosition::Undefined).name(prefix), None);
        assert_eq!(Pin::Button(99).name(prefix), None);
    }

    #[test]
    fn test_all_pins_have_unique_names() {
        let pins = Pin::all();
        let names: HashSet<String> = pins.iter().filter_map(|p| p.name("p")).collect();
        assert_eq!(names.len(), pins.len());
        assert_eq!(pins.len(), 31 + 6 + 6 + 8 + 7 + 6 + 6 + 6);
    }

    #[test]
    fn test_pin_directions() {
        assert_eq!(Pin::JogMaxVelocity.direction(), PinDirection::In);
        assert_eq!(Pin::PosAbsolute(Axis::X).direction(), PinDirection::In);
        assert_eq!(Pin::JogVelocity.direction(), PinDirection::Out);
        assert_eq!(Pin::Button(0).direction(), PinDirection::Out);
        assert_eq!(Pin::JogCounts.kind(), PinKind::S32);
    }

    #[test]
    fn test_typed_helpers() {
        let mut bus = MemoryBus::new();
        assert!(!bus.bit(Pin::Sleeping));
        assert!(bus.float(Pin::FeedValue).abs() < f64::EPSILON);

        bus.set_bit(Pin::Sleeping, true);
        bus.set_float(Pin::FeedValue, 2.5);
        bus.set_s32(Pin::JogCounts, -7);

        assert!(bus.bit(Pin::Sleeping));
        assert!((bus.float(Pin::FeedValue) - 2.5).abs() < f64::EPSILON);
        assert_eq!(bus.s32(Pin::JogCounts), -7);
        assert!((bus.float(Pin::JogCounts) + 7.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_with_all_pins() {
        let bus = MemoryBus::with_all_pins();
        assert_eq!(bus.len(), Pin::all().len());
        assert_eq!(bus.get(Pin::JogCounts), Some(PinValue::S32(0)));
        assert_eq!(bus.get(Pin::Connected), Some(PinValue::Bit(false)));
    }
}
