//! WHB04B HID input report parsing.
//!
//! The pendant sends one 8-byte report per state change:
//!
//! | Byte | Field |
//! |------|-------|
//! | 0 | header, `0x04` |
//! | 1 | day (random per power cycle) |
//! | 2 | key 1 |
//! | 3 | key 2 |
//! | 4 | feed dial code |
//! | 5 | axis dial code |
//! | 6 | jog wheel delta (two's complement) |
//! | 7 | crc |
//!
//! The crc byte is carried but not validated. All functions are pure and
//! allocation-free.

use core::fmt;

use crate::ids::{INPUT_REPORT_LEN, report_ids};
use crate::{XhcError, XhcResult};

/// One decoded input report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct InputReport {
    pub header: u8,
    pub day: u8,
    pub key1: u8,
    pub key2: u8,
    pub feed_code: u8,
    pub axis_code: u8,
    /// Signed jog wheel counts since the previous report.
    pub step_delta: i8,
    pub crc: u8,
}

impl Default for InputReport {
    fn default() -> Self {
        Self {
            header: report_ids::INPUT,
            day: 0,
            key1: 0,
            key2: 0,
            feed_code: 0,
            axis_code: 0,
            step_delta: 0,
            crc: 0,
        }
    }
}

impl InputReport {
    /// Decode a full report. Total: every byte pattern yields a report.
    pub fn decode(data: &[u8; INPUT_REPORT_LEN]) -> Self {
        let [header, day, key1, key2, feed_code, axis_code, step_delta, crc] = *data;
        Self {
            header,
            day,
            key1,
            key2,
            feed_code,
            axis_code,
            step_delta: step_delta as i8,
            crc,
        }
    }

    /// Encode back into the wire layout.
    pub fn encode(&self) -> [u8; INPUT_REPORT_LEN] {
        [
            self.header,
            self.day,
            self.key1,
            self.key2,
            self.feed_code,
            self.axis_code,
            self.step_delta as u8,
            self.crc,
        ]
    }

    /// The bytes the sleep handshake is recognised by: both key slots, both
    /// dials and the jog delta. Header, day and crc are not part of it.
    pub fn signature(&self) -> [u8; 5] {
        [
            self.key1,
            self.key2,
            self.feed_code,
            self.axis_code,
            self.step_delta as u8,
        ]
    }

    /// First report of the power-down handshake: all signature bytes zero.
    pub fn is_empty_signature(&self) -> bool {
        self.signature() == [0x00; 5]
    }

    /// Second report of the power-down handshake: all signature bytes `0xff`.
    pub fn is_sleep_signature(&self) -> bool {
        self.signature() == [0xff; 5]
    }
}

impl fmt::Display for InputReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "header=0x{:02x} day=0x{:02x} key1=0x{:02x} key2=0x{:02x} feed=0x{:02x} axis=0x{:02x} delta={:+} crc=0x{:02x}",
            self.header,
            self.day,
            self.key1,
            self.key2,
            self.feed_code,
            self.axis_code,
            self.step_delta,
            self.crc
        )
    }
}

/// Parse a raw transfer buffer into an [`InputReport`].
///
/// # Errors
///
/// Returns [`XhcError::InvalidReportSize`] unless `data` is exactly
/// [`INPUT_REPORT_LEN`] bytes.
pub fn parse_input_report(data: &[u8]) -> XhcResult<InputReport> {
    let Ok(bytes) = <&[u8; INPUT_REPORT_LEN]>::try_from(data) else {
        return Err(XhcError::InvalidReportSize {
            expected: INPUT_REPORT_LEN,
            actual: data.len(),
        });
    };
    Ok(InputReport::decode(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_fields() {
        let report = InputReport::decode(&[0x04, 0x2a, 0x0c, 0x02, 0x0f, 0x11, 0xfe, 0x77]);
        assert_eq!(report.header, 0x04);
        assert_eq!(report.day, 0x2a);
        assert_eq!(report.key1, 0x0c);
        assert_eq!(report.key2, 0x02);
        assert_eq!(report.feed_code, 0x0f);
        assert_eq!(report.axis_code, 0x11);
        assert_eq!(report.step_delta, -2);
        assert_eq!(report.crc, 0x77);
    }

    #[test]
    fn test_step_delta_is_not_masked() {
        let report = InputReport::decode(&[0x04, 0, 0, 0, 0, 0, 0x80, 0]);
        assert_eq!(report.step_delta, i8::MIN);
        let report = InputReport::decode(&[0x04, 0, 0, 0, 0, 0, 0x7f, 0]);
        assert_eq!(report.step_delta, 127);
    }

    #[test]
    fn test_parse_rejects_wrong_size() {
        let err = parse_input_report(&[0x04, 0, 0]);
        assert_eq!(
            err,
            Err(XhcError::InvalidReportSize {
                expected: 8,
                actual: 3
            })
        );
        assert!(parse_input_report(&[0u8; 9]).is_err());
        assert!(parse_input_report(&[]).is_err());
    }

    #[test]
    fn test_sleep_signatures() {
        let empty = InputReport::decode(&[0x04, 0xff, 0, 0, 0, 0, 0, 0xff]);
        assert!(empty.is_empty_signature());
        assert!(!empty.is_sleep_signature());

        let sleep = InputReport::decode(&[0xff; 8]);
        assert!(sleep.is_sleep_signature());
        assert!(!sleep.is_empty_signature());

        let idle = InputReport::decode(&[0x04, 0x01, 0, 0, 0x0d, 0x11, 0, 0]);
        assert!(!idle.is_empty_signature());
        assert!(!idle.is_sleep_signature());
    }

    #[test]
    fn test_display() {
        let report = InputReport::decode(&[0x04, 0x0c, 0x01, 0x00, 0x0d, 0x11, 0x03, 0x00]);
        assert_eq!(
            report.to_string(),
            "header=0x04 day=0x0c key1=0x01 key2=0x00 feed=0x0d axis=0x11 delta=+3 crc=0x00"
        );
    }
}
