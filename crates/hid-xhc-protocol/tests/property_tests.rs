//! Property-based tests for the WHB04B HID protocol.
//!
//! Uses proptest with 500 cases to verify invariants on input parsing, key
//! catalog lookups, coordinate conversion and display framing.

use hid_xhc_protocol::keys::{
    self, BUTTONS, FEED_UNDEFINED_INDEX, button, feed_position_index, find_axis_position,
    find_button, find_meta_button,
};
use hid_xhc_protocol::{
    AxisCoordinate, DisplayFlags, INPUT_REPORT_LEN, InputReport, OutputState, parse_input_report,
    report_ids,
};
use proptest::prelude::*;

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    /// parse_input_report must accept exactly 8-byte buffers.
    #[test]
    fn prop_parse_accepts_only_full_reports(
        data in proptest::collection::vec(any::<u8>(), 0..=32),
    ) {
        let result = parse_input_report(&data);
        prop_assert_eq!(
            result.is_ok(),
            data.len() == INPUT_REPORT_LEN,
            "unexpected result for {} bytes", data.len()
        );
    }

    /// Every field comes from its fixed offset; the jog byte is two's complement.
    #[test]
    fn prop_decode_field_offsets(data in any::<[u8; 8]>()) {
        let report = InputReport::decode(&data);
        prop_assert_eq!(report.key1, data[2]);
        prop_assert_eq!(report.key2, data[3]);
        prop_assert_eq!(report.feed_code, data[4]);
        prop_assert_eq!(report.axis_code, data[5]);
        prop_assert_eq!(i16::from(report.step_delta), i16::from(data[6] as i8));
        prop_assert_eq!(report.encode(), data);
    }

    /// Lookups never fail: the result is either the matching entry or the sentinel.
    #[test]
    fn prop_lookups_are_total(code in any::<u8>()) {
        let b = find_button(code);
        prop_assert!(b.code == code || b.is_undefined());
        let a = find_axis_position(code);
        prop_assert!(a.code == code || a.is_undefined());
        let index = feed_position_index(code);
        prop_assert!(index <= FEED_UNDEFINED_INDEX);
    }

    /// Key1 == Fn with any catalogued key in slot two finds the Fn-layer entry.
    #[test]
    fn prop_every_key_has_fn_layer(index in 0usize..BUTTONS.len()) {
        let key = BUTTONS[index];
        prop_assume!(key != button::FUNCTION);
        let meta = find_meta_button(key, button::FUNCTION);
        prop_assert_eq!(meta.key, key);
        prop_assert_eq!(meta.modifier, button::FUNCTION);
        prop_assert!(!meta.signal_name().is_empty());
    }

    /// Display conversion is accurate to the last shown digit.
    #[test]
    fn prop_coordinate_precision(value in -65535.0f64..65535.0f64) {
        let coordinate = AxisCoordinate::from_value(value);
        prop_assert!(coordinate.fraction <= 9999);
        prop_assert!(
            (coordinate.value() - value).abs() <= 0.000_051,
            "{} shown as {}", value, coordinate.value()
        );
    }

    /// Bytes decode to the same coordinate they were encoded from.
    #[test]
    fn prop_coordinate_bytes(value in -65535.0f64..65535.0f64) {
        let coordinate = AxisCoordinate::from_value(value);
        prop_assert_eq!(AxisCoordinate::from_bytes(coordinate.to_bytes()), coordinate);
    }

    /// The flags byte, reserved bits included, survives parsing.
    #[test]
    fn prop_flags_byte_passthrough(byte in any::<u8>()) {
        prop_assert_eq!(DisplayFlags::from_byte(byte).to_byte(), byte);
    }

    /// Encoding is deterministic, every block is framed and the pad byte is zero.
    #[test]
    fn prop_output_framing(
        coords in any::<[i32; 3]>(),
        feed_rate in any::<u16>(),
        spindle_speed in any::<u16>(),
        flags in any::<u8>(),
        day in any::<u8>(),
    ) {
        let state = OutputState::new()
            .with_day(day)
            .with_flags(DisplayFlags::from_byte(flags))
            .with_coordinates(coords.map(|c| f64::from(c) / 1000.0))
            .with_feed_rate(feed_rate)
            .with_spindle_speed(spindle_speed);
        let blocks = state.encode();
        prop_assert_eq!(blocks, state.encode());
        for block in &blocks {
            prop_assert_eq!(block[0], report_ids::OUTPUT);
        }
        prop_assert_eq!(blocks[0][1], 0xfe);
        prop_assert_eq!(blocks[0][2], 0xfd);
        prop_assert_eq!(blocks[2][7], 0x00);
        prop_assert_eq!(OutputState::decode(&blocks), Ok(state));
    }
}

#[test]
fn sentinel_codes_are_zero() {
    assert_eq!(keys::button::UNDEFINED.code, 0);
    assert_eq!(keys::axis::UNDEFINED.code, 0);
    assert_eq!(keys::feed::UNDEFINED.code, 0);
}
