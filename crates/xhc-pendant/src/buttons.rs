//! Push button resolution.
//!
//! The pendant reports up to two held keys per report. Fn is a modifier: when
//! it occupies either slot, the other slot is the key and the combination
//! selects the key's Fn-layer function.

use hid_xhc_protocol::keys::{self, KeyCode, META_UNDEFINED, MetaButton, button};

use crate::mode::{AxisPosition, JogMode, StepSize};

/// Resolves raw key slots into a key, a modifier and a meta-button.
#[derive(Debug, Clone, Copy, Default)]
pub struct ButtonResolver;

impl ButtonResolver {
    /// Resolve the two key slots of a report into `(key, modifier)`.
    ///
    /// 1. key1 is Fn: key2 with Fn.
    /// 2. key2 is Fn: key1 with Fn.
    /// 3. key2 is held: key2 alone.
    /// 4. otherwise key1 alone.
    ///
    /// Codes missing from the catalog resolve to the undefined key.
    #[must_use]
    pub fn resolve(key1: u8, key2: u8) -> (KeyCode, KeyCode) {
        let function = button::FUNCTION.code;
        if key1 == function {
            (keys::find_button(key2), button::FUNCTION)
        } else if key2 == function {
            (keys::find_button(key1), button::FUNCTION)
        } else if key2 != button::UNDEFINED.code {
            (keys::find_button(key2), button::UNDEFINED)
        } else {
            (keys::find_button(key1), button::UNDEFINED)
        }
    }

    /// Resolve the two key slots straight into a meta-button.
    #[must_use]
    pub fn resolve_meta(key1: u8, key2: u8) -> MetaButton {
        let (key, modifier) = Self::resolve(key1, key2);
        keys::find_meta_button(key, modifier)
    }
}

/// Logical pendant state after one report.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ButtonsState {
    /// Resolved `(key, modifier)` pair.
    pub pressed_key: KeyCode,
    pub modifier: KeyCode,
    pub meta_button: MetaButton,
    pub axis: AxisPosition,
    pub feed: KeyCode,
    pub mode: JogMode,
    pub step_size: StepSize,
}

impl Default for ButtonsState {
    fn default() -> Self {
        Self {
            pressed_key: button::UNDEFINED,
            modifier: button::UNDEFINED,
            meta_button: META_UNDEFINED,
            axis: AxisPosition::Undefined,
            feed: keys::feed::UNDEFINED,
            mode: JogMode::default(),
            step_size: StepSize::Undefined,
        }
    }
}

impl ButtonsState {
    /// Returns `true` while `key` is held without Fn.
    #[must_use]
    pub fn is_pressed(&self, key: KeyCode) -> bool {
        self.meta_button.key == key && !self.meta_button.is_modified()
    }
}
