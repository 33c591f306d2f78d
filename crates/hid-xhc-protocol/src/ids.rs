//! XHC USB vendor and product ID constants.
//!
//! The WHB04B family enumerates as a single HID interface behind a USB
//! wireless receiver. The receiver reports the pendant model through its
//! product ID; the radio link itself is invisible to the host.
//!
//! | Model | Axes | PID |
//! |-------|------|-----|
//! | WHB04B-4 | X Y Z A | `0xEB70` |
//! | WHB04B-6 | X Y Z A B C | `0xEB93` |

#![deny(static_mut_refs)]

/// XHC USB vendor ID (Chengdu Xinhecheng Technology).
pub const XHC_VENDOR_ID: u16 = 0x10CE;

/// Product IDs of the WHB04B wireless receivers.
pub mod product_ids {
    /// WHB04B-4: four axis pendant (X, Y, Z, A).
    pub const WHB04B_4: u16 = 0xEB70;
    /// WHB04B-6: six axis pendant (X, Y, Z, A, B, C).
    pub const WHB04B_6: u16 = 0xEB93;
}

/// Report IDs used on the pendant channel.
pub mod report_ids {
    /// Input report: buttons, dials and jog wheel.
    pub const INPUT: u8 = 0x04;
    /// Output report: display update block.
    pub const OUTPUT: u8 = 0x06;
}

/// Size of one input report including the report ID byte.
pub const INPUT_REPORT_LEN: usize = 8;

/// Size of one output block including the report ID byte.
pub const OUTPUT_BLOCK_LEN: usize = 8;

/// Payload bytes carried by one output block (everything after the report ID).
pub const OUTPUT_BLOCK_PAYLOAD_LEN: usize = OUTPUT_BLOCK_LEN - 1;

/// Number of output blocks needed for one display update.
pub const OUTPUT_BLOCK_COUNT: usize = 3;

/// Display data header marker, sent little-endian as `FE FD`.
pub const OUTPUT_HEADER: u16 = 0xFDFE;

/// Day byte the stock receiver uses in display updates.
pub const DEFAULT_DISPLAY_DAY: u8 = 0x0C;

/// Return `true` if the vendor/product pair is a supported WHB04B receiver.
pub fn is_supported_device(vendor_id: u16, product_id: u16) -> bool {
    vendor_id == XHC_VENDOR_ID
        && matches!(product_id, product_ids::WHB04B_4 | product_ids::WHB04B_6)
}
