// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Au-Zone Technologies. All Rights Reserved.

//! Per-channel azimuth interpolation and correction.
//!
//! All channels in a block share the block's rotation code, but they are
//! sampled at slightly different instants during the block's acquisition
//! window. The decoder measures the azimuth delta between consecutive
//! packets and spreads it across the channel positions; these functions
//! keep that math pure so the only cross-packet state is the previous
//! rotation code held by the decoder.

use crate::packet::{CHANNELS_PER_BLOCK, ROTATION_MAX};

/// Substitute azimuth step (hundredths of a degree per packet) used for
/// the first packet of a session or when the measured delta is
/// implausible. Tunable; 0.10° matches a nominal 10 Hz scan.
pub const AZIMUTH_STEP_DEFAULT: f32 = 10.0;

/// Largest believable packet-to-packet azimuth delta in hundredths of a
/// degree. Deltas beyond this signal a dropped packet or counter glitch
/// and are replaced by [`AZIMUTH_STEP_DEFAULT`]. Tunable.
pub const AZIMUTH_STEP_MAX: f32 = 100.0;

/// Reduce an angle in hundredths of a degree into `[0, ROTATION_MAX)`.
///
/// Idempotent; handles negative angles from calibration offsets.
#[inline]
pub fn wrap(hundredths: i32) -> u16 {
    hundredths.rem_euclid(ROTATION_MAX as i32) as u16
}

/// Measure the forward azimuth delta between consecutive packets.
///
/// Returns `None` when the delta is zero or exceeds [`AZIMUTH_STEP_MAX`];
/// the caller substitutes the default step in that case.
pub fn measure_step(prev: u16, cur: u16) -> Option<f32> {
    let delta = (ROTATION_MAX as u32 + cur as u32 - prev as u32) % ROTATION_MAX as u32;
    let delta = delta as f32;
    (delta > 0.0 && delta <= AZIMUTH_STEP_MAX).then_some(delta)
}

/// Interpolate a channel's azimuth within its block's acquisition window.
///
/// The block's rotation code is the azimuth of channel 0; later channel
/// positions advance by an equal share of the packet-to-packet step.
#[inline]
pub fn interpolate(base: u16, step: f32, channel: usize) -> f32 {
    base as f32 + step * channel as f32 / CHANNELS_PER_BLOCK as f32
}

/// Apply a channel's calibration offset and reduce into `[0, ROTATION_MAX)`.
#[inline]
pub fn correct(interpolated: f32, offset: i32) -> u16 {
    wrap(interpolated as i32 + offset)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrap_reduces_and_is_idempotent() {
        assert_eq!(wrap(0), 0);
        assert_eq!(wrap(35999), 35999);
        assert_eq!(wrap(36000), 0);
        assert_eq!(wrap(72001), 1);
        assert_eq!(wrap(-1), 35999);
        assert_eq!(wrap(-36000), 0);

        for angle in [-72000, -1, 0, 9000, 35999, 36000, 100000] {
            let once = wrap(angle);
            assert_eq!(wrap(once as i32), once);
        }
    }

    #[test]
    fn test_measure_step_nominal() {
        assert_eq!(measure_step(1000, 1020), Some(20.0));
        assert_eq!(measure_step(0, 100), Some(100.0));
    }

    #[test]
    fn test_measure_step_across_zero() {
        // Wrap through 0 still yields the small forward delta
        assert_eq!(measure_step(35990, 10), Some(20.0));
    }

    #[test]
    fn test_measure_step_implausible() {
        assert_eq!(measure_step(1000, 1000), None);
        assert_eq!(measure_step(1000, 1101), None);
        // Backwards motion shows up as a huge forward delta
        assert_eq!(measure_step(1000, 900), None);
    }

    #[test]
    fn test_interpolate_spreads_step_across_channels() {
        assert_eq!(interpolate(9000, 20.0, 0), 9000.0);
        assert_eq!(interpolate(9000, 20.0, 64), 9010.0);
        assert_eq!(interpolate(9000, 20.0, 127), 9000.0 + 20.0 * 127.0 / 128.0);
    }

    #[test]
    fn test_correct_applies_offset_and_wraps() {
        assert_eq!(correct(9000.0, 0), 9000);
        assert_eq!(correct(9000.0, 150), 9150);
        assert_eq!(correct(9000.0, -150), 8850);
        assert_eq!(correct(35990.0, 20), 10);
        assert_eq!(correct(10.0, -20), 35990);
    }
}
