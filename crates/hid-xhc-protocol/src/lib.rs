//! HID protocol implementation for the XHC WHB04B wireless CNC pendant
//!
//! The WHB04B is a handheld machine-control pendant: push buttons with an
//! Fn layer, an axis selector dial, a feed (step size) selector dial, a jog
//! wheel and a small LCD. The host talks to it through a USB radio receiver
//! that exposes one vendor HID interface.
//!
//! This crate is I/O-free and allocation-free. It provides:
//! - USB identifiers and report IDs ([`ids`]) and model classification ([`types`])
//! - Static key catalogs with display labels and Fn-layer labels ([`keys`])
//! - Bit-exact decoding of the 8-byte input report ([`input`])
//! - Encoding of the display update into three 8-byte blocks ([`output`])

#![deny(unsafe_op_in_unsafe_fn)]
#![deny(clippy::unwrap_used)]

pub mod ids;
pub mod input;
pub mod keys;
pub mod output;
pub mod types;

pub use ids::{
    DEFAULT_DISPLAY_DAY, INPUT_REPORT_LEN, OUTPUT_BLOCK_COUNT, OUTPUT_BLOCK_LEN,
    OUTPUT_BLOCK_PAYLOAD_LEN, OUTPUT_HEADER, XHC_VENDOR_ID, is_supported_device, product_ids,
    report_ids,
};
pub use input::{InputReport, parse_input_report};
pub use keys::{KeyCode, META_BUTTONS, META_UNDEFINED, MetaButton};
pub use output::{
    AxisCoordinate, DisplayFlags, OUTPUT_PAYLOAD_LEN, OutputBlocks, OutputState,
    StepModeIndicator,
};
pub use types::XhcModel;

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum XhcError {
    #[error("Invalid report size: expected {expected}, got {actual}")]
    InvalidReportSize { expected: usize, actual: usize },

    #[error("Invalid report ID: expected 0x{expected:02x}, got 0x{actual:02x}")]
    InvalidReportId { expected: u8, actual: u8 },

    #[error("Invalid display header: 0x{0:04x}")]
    InvalidHeader(u16),
}

pub type XhcResult<T> = Result<T, XhcError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = XhcError::InvalidReportSize {
            expected: 8,
            actual: 5,
        };
        assert_eq!(err.to_string(), "Invalid report size: expected 8, got 5");
        assert_eq!(
            XhcError::InvalidHeader(0x1234).to_string(),
            "Invalid display header: 0x1234"
        );
    }
}
