//! Key catalogs of the WHB04B pendant.
//!
//! Every physical control reports a one-byte code. The catalogs below map
//! those codes to the text printed on the pendant (`label`) and to the text
//! printed under it for the Fn layer (`alt_label`). Codes that are not in a
//! catalog resolve to that catalog's undefined sentinel (code `0x00`, empty
//! labels); an unknown code is never an error.

use core::fmt;

/// One catalogued key or dial position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyCode {
    /// Raw code reported by the pendant.
    pub code: u8,
    /// Primary text.
    pub label: &'static str,
    /// Fn-layer text.
    pub alt_label: &'static str,
}

impl KeyCode {
    /// Create a catalog entry.
    pub const fn new(code: u8, label: &'static str, alt_label: &'static str) -> Self {
        Self {
            code,
            label,
            alt_label,
        }
    }

    /// Returns `true` for the undefined sentinel.
    pub const fn is_undefined(&self) -> bool {
        self.code == 0x00
    }
}

impl fmt::Display for KeyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_undefined() {
            return f.write_str("<undefined>");
        }
        write!(f, "{} (0x{:02x})", self.label, self.code)
    }
}

/// Push buttons.
pub mod button {
    use super::KeyCode;

    pub const RESET: KeyCode = KeyCode::new(0x01, "RESET", "Macro-11");
    pub const STOP: KeyCode = KeyCode::new(0x02, "STOP", "Macro-12");
    pub const START: KeyCode = KeyCode::new(0x03, "Start", "Pause");
    pub const FEED_PLUS: KeyCode = KeyCode::new(0x04, "Feed+", "Macro-1");
    pub const FEED_MINUS: KeyCode = KeyCode::new(0x05, "Feed-", "Macro-2");
    pub const SPINDLE_PLUS: KeyCode = KeyCode::new(0x06, "Spindle+", "Macro-3");
    pub const SPINDLE_MINUS: KeyCode = KeyCode::new(0x07, "Spindle-", "Macro-4");
    pub const MACHINE_HOME: KeyCode = KeyCode::new(0x08, "M-HOME", "Macro-5");
    pub const SAFE_Z: KeyCode = KeyCode::new(0x09, "Safe-Z", "Macro-6");
    pub const WORKPIECE_HOME: KeyCode = KeyCode::new(0x0a, "W-HOME", "Macro-7");
    pub const SPINDLE_ON_OFF: KeyCode = KeyCode::new(0x0b, "S-ON/OFF", "Macro-8");
    /// The modifier key.
    pub const FUNCTION: KeyCode = KeyCode::new(0x0c, "Fn", "Fnx");
    pub const PROBE_Z: KeyCode = KeyCode::new(0x0d, "Probe-Z", "Macro-9");
    pub const MACRO10: KeyCode = KeyCode::new(0x10, "Macro-10", "Macro-13");
    /// Manual pulse generator.
    pub const MPG: KeyCode = KeyCode::new(0x0e, "MPG", "Macro-14");
    pub const STEP_CONTINUOUS: KeyCode = KeyCode::new(0x0f, "STEP", "Continuous");
    pub const UNDEFINED: KeyCode = KeyCode::new(0x00, "", "");
}

/// Axis selector dial positions.
pub mod axis {
    use super::KeyCode;

    pub const OFF: KeyCode = KeyCode::new(0x06, "OFF", "");
    pub const X: KeyCode = KeyCode::new(0x11, "X", "");
    pub const Y: KeyCode = KeyCode::new(0x12, "Y", "");
    pub const Z: KeyCode = KeyCode::new(0x13, "Z", "");
    pub const A: KeyCode = KeyCode::new(0x14, "A", "");
    pub const B: KeyCode = KeyCode::new(0x15, "B", "");
    pub const C: KeyCode = KeyCode::new(0x16, "C", "");
    pub const UNDEFINED: KeyCode = KeyCode::new(0x00, "", "");
}

/// Feed (step size) selector dial positions.
///
/// `label` is the step distance printed for step mode, `alt_label` the
/// percentage printed for continuous mode.
pub mod feed {
    use super::KeyCode;

    pub const SPEED_0_001: KeyCode = KeyCode::new(0x0d, "0.001", "2%");
    pub const SPEED_0_01: KeyCode = KeyCode::new(0x0e, "0.01", "5%");
    pub const SPEED_0_1: KeyCode = KeyCode::new(0x0f, "0.1", "10%");
    pub const SPEED_1: KeyCode = KeyCode::new(0x10, "1", "30%");
    pub const PERCENT_60: KeyCode = KeyCode::new(0x1a, "", "60%");
    pub const PERCENT_100: KeyCode = KeyCode::new(0x1b, "", "100%");
    pub const LEAD: KeyCode = KeyCode::new(0x1c, "Lead", "");
    pub const UNDEFINED: KeyCode = KeyCode::new(0x00, "", "");
}

/// Button catalog, undefined sentinel last.
pub const BUTTONS: [KeyCode; 17] = [
    button::RESET,
    button::STOP,
    button::START,
    button::FEED_PLUS,
    button::FEED_MINUS,
    button::SPINDLE_PLUS,
    button::SPINDLE_MINUS,
    button::MACHINE_HOME,
    button::SAFE_Z,
    button::WORKPIECE_HOME,
    button::SPINDLE_ON_OFF,
    button::FUNCTION,
    button::PROBE_Z,
    button::MACRO10,
    button::MPG,
    button::STEP_CONTINUOUS,
    button::UNDEFINED,
];

/// Axis dial catalog, undefined sentinel last.
pub const AXIS_POSITIONS: [KeyCode; 8] = [
    axis::OFF,
    axis::X,
    axis::Y,
    axis::Z,
    axis::A,
    axis::B,
    axis::C,
    axis::UNDEFINED,
];

/// Feed dial catalog, undefined sentinel last.
///
/// The index of an entry is its position in the step size tables.
pub const FEED_POSITIONS: [KeyCode; 8] = [
    feed::SPEED_0_001,
    feed::SPEED_0_01,
    feed::SPEED_0_1,
    feed::SPEED_1,
    feed::PERCENT_60,
    feed::PERCENT_100,
    feed::LEAD,
    feed::UNDEFINED,
];

/// Index of the lead position in [`FEED_POSITIONS`].
pub const FEED_LEAD_INDEX: usize = 6;

/// Index of the undefined sentinel in [`FEED_POSITIONS`].
pub const FEED_UNDEFINED_INDEX: usize = 7;

/// Look up a button by its raw code.
pub fn find_button(code: u8) -> KeyCode {
    find_in(&BUTTONS, code).unwrap_or(button::UNDEFINED)
}

/// Look up an axis dial position by its raw code.
pub fn find_axis_position(code: u8) -> KeyCode {
    find_in(&AXIS_POSITIONS, code).unwrap_or(axis::UNDEFINED)
}

/// Look up a feed dial position by its raw code.
pub fn find_feed_position(code: u8) -> KeyCode {
    find_in(&FEED_POSITIONS, code).unwrap_or(feed::UNDEFINED)
}

/// Catalog index of a feed dial code; unknown codes map to
/// [`FEED_UNDEFINED_INDEX`].
pub fn feed_position_index(code: u8) -> usize {
    FEED_POSITIONS
        .iter()
        .position(|k| k.code == code)
        .unwrap_or(FEED_UNDEFINED_INDEX)
}

fn find_in(catalog: &[KeyCode], code: u8) -> Option<KeyCode> {
    catalog.iter().find(|k| k.code == code).copied()
}

/// A key combined with its modifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MetaButton {
    pub key: KeyCode,
    pub modifier: KeyCode,
}

impl MetaButton {
    pub const fn new(key: KeyCode, modifier: KeyCode) -> Self {
        Self { key, modifier }
    }

    /// Returns `true` for the no-op meta-button.
    pub const fn is_undefined(&self) -> bool {
        self.key.is_undefined() && self.modifier.is_undefined()
    }

    /// Returns `true` if the Fn key is held.
    pub const fn is_modified(&self) -> bool {
        self.modifier.code == button::FUNCTION.code
    }

    /// Name of the signal published for this combination.
    ///
    /// The key label when unmodified, the key's Fn-layer label when combined
    /// with Fn. Fn held on its own is `"Fn"`.
    pub fn signal_name(&self) -> &'static str {
        if !self.is_modified() {
            self.key.label
        } else if self.key.is_undefined() {
            button::FUNCTION.label
        } else {
            self.key.alt_label
        }
    }
}

/// The no-op meta-button returned for unmatched combinations.
pub const META_UNDEFINED: MetaButton = MetaButton::new(button::UNDEFINED, button::UNDEFINED);

const fn plain(key: KeyCode) -> MetaButton {
    MetaButton::new(key, button::UNDEFINED)
}

const fn with_fn(key: KeyCode) -> MetaButton {
    MetaButton::new(key, button::FUNCTION)
}

/// Every published key combination, in signal registration order.
pub const META_BUTTONS: [MetaButton; 31] = [
    plain(button::RESET),
    with_fn(button::RESET),
    plain(button::STOP),
    with_fn(button::STOP),
    plain(button::START),
    with_fn(button::START),
    plain(button::FEED_PLUS),
    with_fn(button::FEED_PLUS),
    plain(button::FEED_MINUS),
    with_fn(button::FEED_MINUS),
    plain(button::SPINDLE_PLUS),
    with_fn(button::SPINDLE_PLUS),
    plain(button::SPINDLE_MINUS),
    with_fn(button::SPINDLE_MINUS),
    plain(button::MACHINE_HOME),
    with_fn(button::MACHINE_HOME),
    plain(button::SAFE_Z),
    with_fn(button::SAFE_Z),
    plain(button::WORKPIECE_HOME),
    with_fn(button::WORKPIECE_HOME),
    plain(button::SPINDLE_ON_OFF),
    with_fn(button::SPINDLE_ON_OFF),
    with_fn(button::UNDEFINED),
    plain(button::PROBE_Z),
    with_fn(button::PROBE_Z),
    plain(button::MACRO10),
    with_fn(button::MACRO10),
    plain(button::MPG),
    with_fn(button::MPG),
    plain(button::STEP_CONTINUOUS),
    with_fn(button::STEP_CONTINUOUS),
];

/// Find the catalog entry for `(key, modifier)`, or [`META_UNDEFINED`].
pub fn find_meta_button(key: KeyCode, modifier: KeyCode) -> MetaButton {
    META_BUTTONS
        .iter()
        .find(|m| m.key.code == key.code && m.modifier.code == modifier.code)
        .copied()
        .unwrap_or(META_UNDEFINED)
}

/// Catalog index of `meta`, or `None` for unmatched combinations.
pub fn meta_button_index(meta: &MetaButton) -> Option<usize> {
    META_BUTTONS
        .iter()
        .position(|m| m.key.code == meta.key.code && m.modifier.code == meta.modifier.code)
}
