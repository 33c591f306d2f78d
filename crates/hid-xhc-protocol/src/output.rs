//! WHB04B display report encoding.
//!
//! One display update is a 20-byte data stream plus one zero pad byte:
//!
//! | Offset | Size | Field |
//! |--------|------|-------|
//! | 0 | 2 | header `0xfdfe` (LE) |
//! | 2 | 1 | day |
//! | 3 | 1 | display flags |
//! | 4 | 4 | coordinate row 1 |
//! | 8 | 4 | coordinate row 2 |
//! | 12 | 4 | coordinate row 3 |
//! | 16 | 2 | feed rate (LE) |
//! | 18 | 2 | spindle speed (LE) |
//! | 20 | 1 | pad |
//!
//! The receiver accepts 7 payload bytes per HID report, so the stream is
//! cut by position into three slices, each sent behind report ID `0x06`.

use crate::ids::{
    DEFAULT_DISPLAY_DAY, OUTPUT_BLOCK_COUNT, OUTPUT_BLOCK_LEN, OUTPUT_BLOCK_PAYLOAD_LEN,
    OUTPUT_HEADER, report_ids,
};
use crate::{XhcError, XhcResult};

/// Length of the display stream including the trailing pad byte.
pub const OUTPUT_PAYLOAD_LEN: usize = OUTPUT_BLOCK_PAYLOAD_LEN * OUTPUT_BLOCK_COUNT;

/// Three framed blocks of one display update.
pub type OutputBlocks = [[u8; OUTPUT_BLOCK_LEN]; OUTPUT_BLOCK_COUNT];

/// Largest magnitude a coordinate row can show.
pub const MAX_COORDINATE: f64 = 65535.9999;

/// Step mode shown in the display corner (flag bits 0-1).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum StepModeIndicator {
    #[default]
    Continuous = 0,
    Step = 1,
    Mpg = 2,
    /// Bit pattern `0b11`, not used by the stock firmware.
    Reserved = 3,
}

impl StepModeIndicator {
    pub fn from_bits(bits: u8) -> Self {
        match bits & 0x03 {
            0 => Self::Continuous,
            1 => Self::Step,
            2 => Self::Mpg,
            _ => Self::Reserved,
        }
    }

    pub fn bits(self) -> u8 {
        self as u8
    }
}

/// The flags byte of a display update.
///
/// Bits 2-5 have no known meaning; they are kept as given and passed
/// through unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct DisplayFlags {
    pub step_mode: StepModeIndicator,
    /// Raw bits 2-5, right-aligned.
    pub reserved: u8,
    pub is_reset: bool,
    pub is_machine_coordinate: bool,
}

impl DisplayFlags {
    pub fn to_byte(self) -> u8 {
        let mut byte = self.step_mode.bits();
        byte |= (self.reserved & 0x0f) << 2;
        if self.is_reset {
            byte |= 1 << 6;
        }
        if self.is_machine_coordinate {
            byte |= 1 << 7;
        }
        byte
    }

    pub fn from_byte(byte: u8) -> Self {
        Self {
            step_mode: StepModeIndicator::from_bits(byte),
            reserved: (byte >> 2) & 0x0f,
            is_reset: byte & (1 << 6) != 0,
            is_machine_coordinate: byte & (1 << 7) != 0,
        }
    }
}

/// One display row in sign-magnitude fixed point.
///
/// `integer` holds the whole units, `fraction` the ten-thousandths
/// (0..=9999, 15 bits), `negative` the sign bit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct AxisCoordinate {
    pub integer: u16,
    pub fraction: u16,
    pub negative: bool,
}

impl AxisCoordinate {
    /// Convert a position for display.
    ///
    /// The magnitude is rounded to the nearest ten-thousandth (ties to even)
    /// before it is split, so a carry such as `0.99996` lands in the integer
    /// part. Magnitudes above [`MAX_COORDINATE`] saturate; NaN shows as zero.
    pub fn from_value(value: f64) -> Self {
        if value.is_nan() {
            return Self::default();
        }
        let magnitude = value.abs().min(MAX_COORDINATE);
        let scaled = (magnitude * 10_000.0).round_ties_even() as u32;
        Self {
            integer: (scaled / 10_000) as u16,
            fraction: (scaled % 10_000) as u16,
            negative: value < 0.0,
        }
    }

    /// The displayed value.
    pub fn value(&self) -> f64 {
        let magnitude = f64::from(self.integer) + f64::from(self.fraction) / 10_000.0;
        if self.negative { -magnitude } else { magnitude }
    }

    pub fn to_bytes(&self) -> [u8; 4] {
        let mut fraction = self.fraction & 0x7fff;
        if self.negative {
            fraction |= 0x8000;
        }
        let [i0, i1] = self.integer.to_le_bytes();
        let [f0, f1] = fraction.to_le_bytes();
        [i0, i1, f0, f1]
    }

    pub fn from_bytes(bytes: [u8; 4]) -> Self {
        let [i0, i1, f0, f1] = bytes;
        let fraction = u16::from_le_bytes([f0, f1]);
        Self {
            integer: u16::from_le_bytes([i0, i1]),
            fraction: fraction & 0x7fff,
            negative: fraction & 0x8000 != 0,
        }
    }
}

/// Complete content of one display update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OutputState {
    pub header: u16,
    pub day: u8,
    pub flags: DisplayFlags,
    pub coordinates: [AxisCoordinate; 3],
    /// Feed rate in machine units per minute.
    pub feed_rate: u16,
    /// Spindle speed in revolutions per minute.
    pub spindle_speed: u16,
}

impl Default for OutputState {
    fn default() -> Self {
        Self {
            header: OUTPUT_HEADER,
            day: DEFAULT_DISPLAY_DAY,
            flags: DisplayFlags::default(),
            coordinates: [AxisCoordinate::default(); 3],
            feed_rate: 0,
            spindle_speed: 0,
        }
    }
}

impl OutputState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_day(mut self, day: u8) -> Self {
        self.day = day;
        self
    }

    pub fn with_flags(mut self, flags: DisplayFlags) -> Self {
        self.flags = flags;
        self
    }

    pub fn with_coordinates(mut self, values: [f64; 3]) -> Self {
        self.coordinates = values.map(AxisCoordinate::from_value);
        self
    }

    pub fn with_feed_rate(mut self, feed_rate: u16) -> Self {
        self.feed_rate = feed_rate;
        self
    }

    pub fn with_spindle_speed(mut self, spindle_speed: u16) -> Self {
        self.spindle_speed = spindle_speed;
        self
    }

    /// The unframed display stream, pad byte included.
    pub fn payload(&self) -> [u8; OUTPUT_PAYLOAD_LEN] {
        let [h0, h1] = self.header.to_le_bytes();
        let [c0, c1, c2] = self.coordinates.map(|c| c.to_bytes());
        let [fr0, fr1] = self.feed_rate.to_le_bytes();
        let [sp0, sp1] = self.spindle_speed.to_le_bytes();
        let [a0, a1, a2, a3] = c0;
        let [b0, b1, b2, b3] = c1;
        let [d0, d1, d2, d3] = c2;
        [
            h0,
            h1,
            self.day,
            self.flags.to_byte(),
            a0,
            a1,
            a2,
            a3,
            b0,
            b1,
            b2,
            b3,
            d0,
            d1,
            d2,
            d3,
            fr0,
            fr1,
            sp0,
            sp1,
            0x00,
        ]
    }

    /// Frame the display stream into three HID output blocks.
    pub fn encode(&self) -> OutputBlocks {
        let payload = self.payload();
        let mut blocks = [[0u8; OUTPUT_BLOCK_LEN]; OUTPUT_BLOCK_COUNT];
        for (block, slice) in blocks
            .iter_mut()
            .zip(payload.chunks_exact(OUTPUT_BLOCK_PAYLOAD_LEN))
        {
            let [id, body @ ..] = block;
            *id = report_ids::OUTPUT;
            body.copy_from_slice(slice);
        }
        blocks
    }

    /// Reassemble a display update from its three blocks.
    ///
    /// # Errors
    ///
    /// [`XhcError::InvalidReportId`] if a block does not carry report ID
    /// `0x06`, [`XhcError::InvalidHeader`] if the stream does not start with
    /// `0xfdfe`.
    pub fn decode(blocks: &OutputBlocks) -> XhcResult<Self> {
        let mut payload = [0u8; OUTPUT_PAYLOAD_LEN];
        for (block, slice) in blocks
            .iter()
            .zip(payload.chunks_exact_mut(OUTPUT_BLOCK_PAYLOAD_LEN))
        {
            let [id, body @ ..] = block;
            if *id != report_ids::OUTPUT {
                return Err(XhcError::InvalidReportId {
                    expected: report_ids::OUTPUT,
                    actual: *id,
                });
            }
            slice.copy_from_slice(body);
        }

        let [
            h0, h1, day, flags, a0, a1, a2, a3, b0, b1, b2, b3, d0, d1, d2, d3, fr0, fr1, sp0, sp1,
            _pad,
        ] = payload;
        let header = u16::from_le_bytes([h0, h1]);
        if header != OUTPUT_HEADER {
            return Err(XhcError::InvalidHeader(header));
        }

        Ok(Self {
            header,
            day,
            flags: DisplayFlags::from_byte(flags),
            coordinates: [
                AxisCoordinate::from_bytes([a0, a1, a2, a3]),
                AxisCoordinate::from_bytes([b0, b1, b2, b3]),
                AxisCoordinate::from_bytes([d0, d1, d2, d3]),
            ],
            feed_rate: u16::from_le_bytes([fr0, fr1]),
            spindle_speed: u16::from_le_bytes([sp0, sp1]),
        })
    }
}
