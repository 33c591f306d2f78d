//! Rotary dial resolution: axis selection, jog mode and step size.
//!
//! The feed dial has one set of positions but two meanings. In step mode a
//! position is a distance per jog count, in continuous mode it is a share of
//! the maximum jog velocity. The lead position means the same in both. Only
//! one table is ever live: the active index is a single tagged value.

use hid_xhc_protocol::keys::{
    self, FEED_LEAD_INDEX, FEED_POSITIONS, FEED_UNDEFINED_INDEX, KeyCode, MetaButton, button,
};
use serde::{Deserialize, Serialize};

/// Distance per jog count in step mode, indexed by feed dial position.
pub const STEP_TABLE: [Option<f32>; 8] = [
    Some(0.001),
    Some(0.01),
    Some(0.1),
    Some(1.0),
    None,
    None,
    None,
    None,
];

/// Percent of maximum velocity in continuous mode, indexed by feed dial position.
pub const CONTINUOUS_TABLE: [Option<u8>; 8] = [
    Some(2),
    Some(5),
    Some(10),
    Some(30),
    Some(60),
    Some(100),
    None,
    None,
];

/// Lead multiplier, indexed by feed dial position.
pub const LEAD_TABLE: [Option<f32>; 8] = [None, None, None, None, None, None, Some(1.0), None];

/// A motion axis the pendant can jog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Axis {
    X,
    Y,
    Z,
    A,
    B,
    C,
}

impl Axis {
    /// All axes in display order.
    pub const ALL: [Axis; 6] = [Axis::X, Axis::Y, Axis::Z, Axis::A, Axis::B, Axis::C];

    /// Lower-case axis letter as used in signal names.
    #[must_use]
    pub fn letter(self) -> &'static str {
        match self {
            Self::X => "x",
            Self::Y => "y",
            Self::Z => "z",
            Self::A => "a",
            Self::B => "b",
            Self::C => "c",
        }
    }

    /// Position in [`Axis::ALL`].
    #[must_use]
    pub fn index(self) -> usize {
        self as usize
    }
}

/// Position of the axis selector dial.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum AxisPosition {
    Off,
    X,
    Y,
    Z,
    A,
    B,
    C,
    #[default]
    Undefined,
}

impl AxisPosition {
    /// The seven real dial positions, in enable-signal order.
    pub const REAL: [AxisPosition; 7] = [
        AxisPosition::Off,
        AxisPosition::X,
        AxisPosition::Y,
        AxisPosition::Z,
        AxisPosition::A,
        AxisPosition::B,
        AxisPosition::C,
    ];

    /// Classify a raw axis dial code.
    #[must_use]
    pub fn from_code(code: u8) -> Self {
        let key = keys::find_axis_position(code);
        Self::REAL
            .iter()
            .copied()
            .find(|p| p.key() == key)
            .unwrap_or(Self::Undefined)
    }

    /// Catalog entry for this position.
    #[must_use]
    pub fn key(self) -> KeyCode {
        match self {
            Self::Off => keys::axis::OFF,
            Self::X => keys::axis::X,
            Self::Y => keys::axis::Y,
            Self::Z => keys::axis::Z,
            Self::A => keys::axis::A,
            Self::B => keys::axis::B,
            Self::C => keys::axis::C,
            Self::Undefined => keys::axis::UNDEFINED,
        }
    }

    /// The jogged axis, if the dial selects one.
    #[must_use]
    pub fn axis(self) -> Option<Axis> {
        match self {
            Self::X => Some(Axis::X),
            Self::Y => Some(Axis::Y),
            Self::Z => Some(Axis::Z),
            Self::A => Some(Axis::A),
            Self::B => Some(Axis::B),
            Self::C => Some(Axis::C),
            Self::Off | Self::Undefined => None,
        }
    }

    /// Jog enable flags in [`AxisPosition::REAL`] order.
    ///
    /// Exactly one flag is set for a real position, none for `Undefined`.
    #[must_use]
    pub fn enable_flags(self) -> [bool; 7] {
        Self::REAL.map(|p| p == self)
    }
}

impl From<Axis> for AxisPosition {
    fn from(axis: Axis) -> Self {
        match axis {
            Axis::X => Self::X,
            Axis::Y => Self::Y,
            Axis::Z => Self::Z,
            Axis::A => Self::A,
            Axis::B => Self::B,
            Axis::C => Self::C,
        }
    }
}

/// Jog wheel interpretation selected with the Step/Continuous button.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum JogMode {
    Step,
    #[default]
    Continuous,
}

/// Resolved meaning of the feed dial.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub enum StepSize {
    /// Machine units per jog count.
    Step(f32),
    /// Percent of maximum jog velocity.
    Continuous(u8),
    /// Lead (spindle-synchronised) jogging.
    Lead,
    #[default]
    Undefined,
}

impl StepSize {
    /// Multiplier applied to jog counts.
    #[must_use]
    pub fn scale(self) -> f32 {
        match self {
            Self::Step(distance) => distance,
            Self::Continuous(percent) => f32::from(percent) / 100.0,
            Self::Lead => LEAD_TABLE[FEED_LEAD_INDEX].unwrap_or(0.0),
            Self::Undefined => 0.0,
        }
    }

    /// The table value as printed on the dial.
    #[must_use]
    pub fn table_value(self) -> f32 {
        match self {
            Self::Step(distance) => distance,
            Self::Continuous(percent) => f32::from(percent),
            Self::Lead => self.scale(),
            Self::Undefined => 0.0,
        }
    }

    /// Returns `true` if jog counts translate into a distance.
    #[must_use]
    pub fn is_distance(self) -> bool {
        matches!(self, Self::Step(_) | Self::Lead)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ActiveIndex {
    Step(usize),
    Continuous(usize),
    Lead,
}

/// Tracks the jog mode and resolves the feed dial against it.
#[derive(Debug, Clone)]
pub struct ModeResolver {
    mode: JogMode,
    active: ActiveIndex,
    feed_code: u8,
}

impl Default for ModeResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl ModeResolver {
    /// Start in continuous mode with the feed dial unknown.
    #[must_use]
    pub fn new() -> Self {
        Self {
            mode: JogMode::default(),
            active: ActiveIndex::Continuous(FEED_UNDEFINED_INDEX),
            feed_code: keys::feed::UNDEFINED.code,
        }
    }

    #[must_use]
    pub fn mode(&self) -> JogMode {
        self.mode
    }

    /// Classify a raw axis dial code.
    #[must_use]
    pub fn resolve_axis(axis_code: u8) -> AxisPosition {
        AxisPosition::from_code(axis_code)
    }

    /// Apply a button press. Returns the new mode if it changed.
    ///
    /// The Step/Continuous key selects step mode; with Fn it selects
    /// continuous mode.
    pub fn on_button(&mut self, meta: &MetaButton) -> Option<JogMode> {
        if meta.key != button::STEP_CONTINUOUS {
            return None;
        }
        let mode = if meta.is_modified() {
            JogMode::Continuous
        } else {
            JogMode::Step
        };
        if mode == self.mode {
            return None;
        }
        self.set_mode(mode);
        Some(mode)
    }

    /// Switch mode and re-resolve the last seen feed position.
    pub fn set_mode(&mut self, mode: JogMode) {
        self.mode = mode;
        self.resolve_step_size(self.feed_code);
    }

    /// Resolve a raw feed dial code into the active step size.
    pub fn resolve_step_size(&mut self, feed_code: u8) -> StepSize {
        self.feed_code = feed_code;
        let index = keys::feed_position_index(feed_code);
        self.active = if index == FEED_LEAD_INDEX {
            ActiveIndex::Lead
        } else {
            match self.mode {
                JogMode::Step => ActiveIndex::Step(index),
                JogMode::Continuous => ActiveIndex::Continuous(index),
            }
        };
        self.step_size()
    }

    /// Current step size.
    #[must_use]
    pub fn step_size(&self) -> StepSize {
        match self.active {
            ActiveIndex::Step(index) => STEP_TABLE
                .get(index)
                .copied()
                .flatten()
                .map_or(StepSize::Undefined, StepSize::Step),
            ActiveIndex::Continuous(index) => CONTINUOUS_TABLE
                .get(index)
                .copied()
                .flatten()
                .map_or(StepSize::Undefined, StepSize::Continuous),
            ActiveIndex::Lead => StepSize::Lead,
        }
    }

    /// Current feed dial position.
    #[must_use]
    pub fn feed(&self) -> KeyCode {
        keys::find_feed_position(self.feed_code)
    }

    /// Index into [`STEP_TABLE`], or [`FEED_UNDEFINED_INDEX`] when step mode
    /// is not live.
    #[must_use]
    pub fn step_table_index(&self) -> usize {
        match self.active {
            ActiveIndex::Step(index) => index,
            _ => FEED_UNDEFINED_INDEX,
        }
    }

    /// Index into [`CONTINUOUS_TABLE`], or [`FEED_UNDEFINED_INDEX`] when
    /// continuous mode is not live.
    #[must_use]
    pub fn continuous_table_index(&self) -> usize {
        match self.active {
            ActiveIndex::Continuous(index) => index,
            _ => FEED_UNDEFINED_INDEX,
        }
    }
}

const _: () = assert!(FEED_POSITIONS.len() == STEP_TABLE.len());

#[cfg(test)]
mod tests {
    use super::*;
    use hid_xhc_protocol::keys::{META_BUTTONS, feed};

    fn step_button(modified: bool) -> MetaButton {
        let modifier = if modified {
            button::FUNCTION
        } else {
            button::UNDEFINED
        };
        MetaButton::new(button::STEP_CONTINUOUS, modifier)
    }

    #[test]
    fn test_axis_resolution() {
        assert_eq!(ModeResolver::resolve_axis(0x11), AxisPosition::X);
        assert_eq!(ModeResolver::resolve_axis(0x06), AxisPosition::Off);
        assert_eq!(ModeResolver::resolve_axis(0x16), AxisPosition::C);
        assert_eq!(ModeResolver::resolve_axis(0x00), AxisPosition::Undefined);
        assert_eq!(ModeResolver::resolve_axis(0x42), AxisPosition::Undefined);
    }

    #[test]
    fn test_enable_flags_are_exclusive() {
        for position in AxisPosition::REAL {
            let flags = position.enable_flags();
            assert_eq!(flags.iter().filter(|f| **f).count(), 1, "{position:?}");
        }
        assert_eq!(AxisPosition::Undefined.enable_flags(), [false; 7]);
    }

    #[test]
    fn test_default_mode_is_continuous() {
        let mut resolver = ModeResolver::new();
        assert_eq!(resolver.mode(), JogMode::Continuous);
        assert_eq!(
            resolver.resolve_step_size(feed::SPEED_0_01.code),
            StepSize::Continuous(5)
        );
    }

    #[test]
    fn test_step_button_switches_mode() {
        let mut resolver = ModeResolver::new();
        resolver.resolve_step_size(feed::SPEED_0_1.code);

        assert_eq!(resolver.on_button(&step_button(false)), Some(JogMode::Step));
        assert_eq!(resolver.step_size(), StepSize::Step(0.1));
        assert_eq!(resolver.on_button(&step_button(false)), None);

        assert_eq!(
            resolver.on_button(&step_button(true)),
            Some(JogMode::Continuous)
        );
        assert_eq!(resolver.step_size(), StepSize::Continuous(10));
    }

    #[test]
    fn test_other_buttons_leave_mode() {
        let mut resolver = ModeResolver::new();
        for meta in META_BUTTONS
            .iter()
            .filter(|m| m.key != button::STEP_CONTINUOUS)
        {
            assert_eq!(resolver.on_button(meta), None);
        }
        assert_eq!(resolver.mode(), JogMode::Continuous);
    }

    #[test]
    fn test_only_one_table_is_live() {
        let mut resolver = ModeResolver::new();
        resolver.set_mode(JogMode::Step);
        resolver.resolve_step_size(feed::SPEED_1.code);
        assert_eq!(resolver.step_table_index(), 3);
        assert_eq!(resolver.continuous_table_index(), FEED_UNDEFINED_INDEX);

        resolver.set_mode(JogMode::Continuous);
        assert_eq!(resolver.continuous_table_index(), 3);
        assert_eq!(resolver.step_table_index(), FEED_UNDEFINED_INDEX);
        assert_eq!(resolver.step_size(), StepSize::Continuous(30));
    }

    #[test]
    fn test_percent_positions_have_no_step_distance() {
        let mut resolver = ModeResolver::new();
        resolver.set_mode(JogMode::Step);
        assert_eq!(
            resolver.resolve_step_size(feed::PERCENT_60.code),
            StepSize::Undefined
        );
        resolver.set_mode(JogMode::Continuous);
        assert_eq!(resolver.step_size(), StepSize::Continuous(60));
    }

    #[test]
    fn test_lead_ignores_mode() {
        let mut resolver = ModeResolver::new();
        assert_eq!(resolver.resolve_step_size(feed::LEAD.code), StepSize::Lead);
        resolver.set_mode(JogMode::Step);
        assert_eq!(resolver.step_size(), StepSize::Lead);
        assert_eq!(resolver.step_table_index(), FEED_UNDEFINED_INDEX);
        assert_eq!(resolver.continuous_table_index(), FEED_UNDEFINED_INDEX);
    }

    #[test]
    fn test_unknown_feed_code_is_undefined() {
        let mut resolver = ModeResolver::new();
        assert_eq!(resolver.resolve_step_size(0x99), StepSize::Undefined);
        assert!(resolver.feed().is_undefined());
    }

    #[test]
    fn test_step_size_scale() {
        assert!((StepSize::Step(0.01).scale() - 0.01).abs() < f32::EPSILON);
        assert!((StepSize::Continuous(30).scale() - 0.3).abs() < f32::EPSILON);
        assert!((StepSize::Lead.scale() - 1.0).abs() < f32::EPSILON);
        assert!(StepSize::Undefined.scale().abs() < f32::EPSILON);
        assert!(StepSize::Lead.is_distance());
        assert!(!StepSize::Continuous(2).is_distance());
    }
}
