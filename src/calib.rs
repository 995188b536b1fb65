// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Au-Zone Technologies. All Rights Reserved.

//! Calibration store and distance calibration.
//!
//! The store is built once from externally loaded tables plus the runtime
//! configuration and is immutable afterwards, so it can be shared across
//! decoder instances without locking. It holds:
//!
//! - per-channel vertical angles (fixed beam elevations)
//! - per-channel azimuth corrections
//! - the per-channel × per-temperature distance threshold table
//! - the optical-center offset, valid distance range, azimuth window and
//!   return-mode selection
//!
//! Distance calibration follows the device's model: the raw code is a
//! count of 5mm steps with a temperature-dependent per-channel zero
//! threshold; codes at or below the threshold carry no usable return.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::azimuth;
use crate::error::Error;
use crate::packet::{CHANNELS_PER_BLOCK, DISTANCE_RESOLUTION, ROTATION_MAX};
use crate::temperature::TEMPERATURE_SLOTS;

/// Which echoes to emit when the device reports multiple returns per
/// channel per packet.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum ReturnMode {
    /// Keep only the first-listed echo of each channel.
    First,
    /// Keep the highest-intensity echo of each channel.
    #[default]
    Strongest,
    /// Emit every echo, possibly multiple points per channel per packet.
    All,
}

/// Raw numeric calibration tables, as parsed from the device's
/// calibration files. Loading from disk is the caller's concern; the
/// store only validates and consumes the numbers.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RawTables {
    /// Fixed vertical angle per channel, hundredths of a degree, signed.
    pub vertical_angles: Vec<i32>,
    /// Azimuth correction per channel, hundredths of a degree, signed.
    pub azimuth_offsets: Vec<i32>,
    /// Distance zero threshold in raw counts, per channel per temperature
    /// slot (`CHANNELS_PER_BLOCK` rows of `TEMPERATURE_SLOTS` columns).
    pub distance_thresholds: Vec<Vec<u16>>,
}

impl RawTables {
    /// All-zero tables: no beam tilt, no azimuth correction, no distance
    /// threshold. Useful for tests and for running uncalibrated.
    pub fn flat() -> Self {
        Self {
            vertical_angles: vec![0; CHANNELS_PER_BLOCK],
            azimuth_offsets: vec![0; CHANNELS_PER_BLOCK],
            distance_thresholds: vec![vec![0; TEMPERATURE_SLOTS]; CHANNELS_PER_BLOCK],
        }
    }
}

/// Azimuth acceptance window in hundredths of a degree, half-open
/// `[start, end)`, possibly wrapping through zero.
#[derive(Clone, Copy, Debug)]
pub struct AzimuthWindow {
    start: u16,
    end: u16,
    full: bool,
}

impl AzimuthWindow {
    /// Build a window from start/end angles in degrees. A span of 360° or
    /// more accepts every azimuth.
    pub fn new(start_deg: f32, end_deg: f32) -> Self {
        let start = azimuth::wrap((start_deg * 100.0) as i32);
        let end = azimuth::wrap((end_deg * 100.0) as i32);
        Self {
            start,
            end,
            full: (end_deg - start_deg) * 100.0 >= ROTATION_MAX as f32 || start == end,
        }
    }

    /// Whether an azimuth (hundredths, already reduced) is accepted.
    #[inline]
    pub fn contains(&self, az: u16) -> bool {
        if self.full {
            true
        } else if self.start < self.end {
            az >= self.start && az < self.end
        } else {
            // Window wraps through zero
            az >= self.start || az < self.end
        }
    }
}

/// Translation from the rotating mirror's origin to the device reference
/// frame, in meters.
#[derive(Clone, Copy, Debug, Default)]
pub struct OpticalCenter {
    pub rx: f32,
    /// Accepted for interface completeness; the projection does not use
    /// the y component, matching the device documentation.
    pub ry: f32,
    pub rz: f32,
}

/// Runtime decoder configuration.
#[derive(Clone, Debug)]
pub struct DecoderConfig {
    /// Azimuth window start angle in degrees.
    pub start_angle: f32,
    /// Azimuth window end angle in degrees.
    pub end_angle: f32,
    /// Minimum valid corrected distance in meters.
    pub min_distance: f32,
    /// Maximum valid corrected distance in meters.
    pub max_distance: f32,
    pub return_mode: ReturnMode,
    pub optical_center: OpticalCenter,
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            start_angle: 0.0,
            end_angle: 360.0,
            min_distance: 0.5,
            max_distance: 200.0,
            return_mode: ReturnMode::default(),
            optical_center: OpticalCenter::default(),
        }
    }
}

/// Immutable calibration data consulted by every decode call.
pub struct CalibrationStore {
    vertical_angles: [i32; CHANNELS_PER_BLOCK],
    azimuth_offsets: [i32; CHANNELS_PER_BLOCK],
    distance_thresholds: Vec<[u16; TEMPERATURE_SLOTS]>,
    min_distance: f32,
    max_distance: f32,
    pub window: AzimuthWindow,
    pub return_mode: ReturnMode,
    pub optical_center: OpticalCenter,
}

impl CalibrationStore {
    /// Validate the raw tables against the configuration and build the
    /// store. Fails with [`Error::Config`] on any missing or
    /// out-of-documented-range entry.
    pub fn load(tables: RawTables, config: DecoderConfig) -> Result<Self, Error> {
        let vertical_angles: [i32; CHANNELS_PER_BLOCK] =
            tables.vertical_angles.try_into().map_err(|v: Vec<i32>| {
                Error::Config(format!(
                    "expected {CHANNELS_PER_BLOCK} vertical angles, got {}",
                    v.len()
                ))
            })?;
        let azimuth_offsets: [i32; CHANNELS_PER_BLOCK] =
            tables.azimuth_offsets.try_into().map_err(|v: Vec<i32>| {
                Error::Config(format!(
                    "expected {CHANNELS_PER_BLOCK} azimuth offsets, got {}",
                    v.len()
                ))
            })?;

        for (channel, &angle) in vertical_angles.iter().enumerate() {
            // Beam elevations are physically within ±90°
            if angle.abs() > 9000 {
                return Err(Error::Config(format!(
                    "vertical angle {angle} out of range for channel {channel}"
                )));
            }
        }
        for (channel, &offset) in azimuth_offsets.iter().enumerate() {
            if offset.abs() >= ROTATION_MAX as i32 {
                return Err(Error::Config(format!(
                    "azimuth offset {offset} out of range for channel {channel}"
                )));
            }
        }

        if tables.distance_thresholds.len() != CHANNELS_PER_BLOCK {
            return Err(Error::Config(format!(
                "expected {CHANNELS_PER_BLOCK} distance threshold rows, got {}",
                tables.distance_thresholds.len()
            )));
        }
        let mut distance_thresholds = Vec::with_capacity(CHANNELS_PER_BLOCK);
        for (channel, row) in tables.distance_thresholds.into_iter().enumerate() {
            let row: [u16; TEMPERATURE_SLOTS] = row.try_into().map_err(|r: Vec<u16>| {
                Error::Config(format!(
                    "expected {TEMPERATURE_SLOTS} temperature slots for channel {channel}, got {}",
                    r.len()
                ))
            })?;
            distance_thresholds.push(row);
        }

        if !(config.min_distance >= 0.0 && config.min_distance < config.max_distance) {
            return Err(Error::Config(format!(
                "invalid distance range [{}, {}]",
                config.min_distance, config.max_distance
            )));
        }

        Ok(Self {
            vertical_angles,
            azimuth_offsets,
            distance_thresholds,
            min_distance: config.min_distance,
            max_distance: config.max_distance,
            window: AzimuthWindow::new(config.start_angle, config.end_angle),
            return_mode: config.return_mode,
            optical_center: config.optical_center,
        })
    }

    /// Fixed vertical angle of a channel, hundredths of a degree.
    #[inline]
    pub fn vertical_angle(&self, channel: usize) -> i32 {
        self.vertical_angles[channel]
    }

    /// Azimuth correction of a channel, hundredths of a degree.
    #[inline]
    pub fn azimuth_offset(&self, channel: usize) -> i32 {
        self.azimuth_offsets[channel]
    }

    /// Map a raw distance code to a corrected metric distance.
    ///
    /// Returns `None` for the no-return sentinel (raw code 0), codes at or
    /// below the channel's temperature-dependent threshold, and corrected
    /// distances outside the configured valid range. Monotonically
    /// non-decreasing in the raw code for a fixed channel and temperature.
    #[inline]
    pub fn corrected_distance(&self, channel: usize, raw: u16, temp_index: usize) -> Option<f32> {
        if raw == 0 {
            return None;
        }
        let threshold =
            self.distance_thresholds[channel][temp_index.min(TEMPERATURE_SLOTS - 1)];
        if raw <= threshold {
            return None;
        }
        let meters = (raw - threshold) as f32 * DISTANCE_RESOLUTION;
        (self.min_distance..=self.max_distance)
            .contains(&meters)
            .then_some(meters)
    }
}
