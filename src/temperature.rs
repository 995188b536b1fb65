// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Au-Zone Technologies. All Rights Reserved.

//! Device temperature tracking from packet status bytes.
//!
//! The status bytes alternate between frame types; only frames flagged
//! with [`TEMPERATURE_FLAG`] carry a temperature reading, bit-packed as
//! sign/magnitude across two bytes in 1/16 °C steps. Frames without a
//! reading, and readings outside the physically plausible range, retain
//! the previous estimate rather than erroring.
//!
//! The estimate indexes the temperature dimension of the distance
//! calibration table: slot 0 corresponds to [`TEMPERATURE_MIN`] °C, one
//! slot per degree, clamped to the table bounds.

use tracing::debug;

/// Coldest calibrated temperature in °C; table slot 0.
pub const TEMPERATURE_MIN: i32 = 31;

/// Number of temperature slots in the distance calibration table.
pub const TEMPERATURE_SLOTS: usize = 51;

/// Status frames with this flag byte carry a temperature encoding.
pub const TEMPERATURE_FLAG: u8 = 0xa1;

/// Physically plausible device temperature range in °C.
const PLAUSIBLE_MIN: f32 = -40.0;
const PLAUSIBLE_MAX: f32 = 150.0;

/// Decode the two-byte sign/magnitude temperature encoding.
///
/// The high byte holds the sign bit and the upper seven magnitude bits;
/// the low byte contributes five more bits in its upper half. One count
/// is 1/16 °C. Returns `None` for values outside the plausible range.
pub fn decode_temperature(lo: u8, hi: u8) -> Option<f32> {
    let magnitude = ((hi & 0x7f) as f32 * 32.0 + (lo >> 3) as f32) * 0.0625;
    let celsius = if hi & 0x80 != 0 { -magnitude } else { magnitude };
    (PLAUSIBLE_MIN..=PLAUSIBLE_MAX)
        .contains(&celsius)
        .then_some(celsius)
}

/// Rolling device temperature estimate.
#[derive(Clone, Copy, Debug)]
pub struct TemperatureTracker {
    celsius: f32,
}

impl TemperatureTracker {
    /// Consume one packet's status bytes, updating the estimate when they
    /// carry a valid temperature frame.
    pub fn update(&mut self, status: &[u8; 4]) {
        if status[0] != TEMPERATURE_FLAG {
            return;
        }
        match decode_temperature(status[1], status[2]) {
            Some(celsius) => self.celsius = celsius,
            None => debug!("implausible temperature encoding, keeping {}", self.celsius),
        }
    }

    /// Current estimate in °C.
    pub fn celsius(&self) -> f32 {
        self.celsius
    }

    /// Clamped index into the calibration table's temperature dimension.
    pub fn index(&self) -> usize {
        (self.celsius.round() as i32 - TEMPERATURE_MIN).clamp(0, TEMPERATURE_SLOTS as i32 - 1)
            as usize
    }
}

impl Default for TemperatureTracker {
    fn default() -> Self {
        // Matches the coldest calibrated slot until the device reports.
        Self {
            celsius: TEMPERATURE_MIN as f32,
        }
    }
}
