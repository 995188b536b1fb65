// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Au-Zone Technologies. All Rights Reserved.

//! Per-packet decode pipeline and device state.
//!
//! One [`Decoder`] owns the cross-packet device state (last rotation
//! code, azimuth step estimate, temperature estimate) and a shared
//! reference to the immutable [`CalibrationStore`]. Each call to
//! [`Decoder::decode`] is synchronous: parse the packet, update the
//! device state, run every surviving channel sample through calibration,
//! azimuth correction and projection, and append accepted points to the
//! caller's [`Points`].
//!
//! A malformed packet returns an error before any state is touched, so
//! decoding resumes cleanly on the next packet. Per-sample rejections are
//! silent. Concurrent streams need separate decoder instances; the state
//! updates within one decode call are not atomic as a group.

use std::sync::Arc;

use crate::azimuth::{self, AZIMUTH_STEP_DEFAULT};
use crate::calib::{CalibrationStore, ReturnMode};
use crate::error::Error;
use crate::packet::{self, Bank, Block, Packet, BLOCKS_PER_PACKET, CHANNELS_PER_BLOCK};
use crate::points::Points;
use crate::projector::Projector;
use crate::temperature::TemperatureTracker;

/// Mutable per-decoder state carried across packets.
#[derive(Clone, Copy, Debug)]
pub struct DeviceState {
    /// Rotation code of the previous packet's first block.
    pub last_rotation: Option<u16>,
    /// Current packet-to-packet azimuth step estimate, hundredths.
    pub azimuth_step: f32,
    pub temperature: TemperatureTracker,
}

impl Default for DeviceState {
    fn default() -> Self {
        Self {
            last_rotation: None,
            azimuth_step: AZIMUTH_STEP_DEFAULT,
            temperature: TemperatureTracker::default(),
        }
    }
}

/// Result of decoding one packet.
#[derive(Clone, Copy, Debug)]
pub struct PacketSummary {
    /// Rotation code of the packet's first block, for frame-boundary
    /// detection by the caller.
    pub rotation: u16,
    /// Number of points appended by this packet.
    pub points: usize,
    /// Current temperature estimate in °C, for telemetry.
    pub temperature: f32,
}

pub struct Decoder {
    store: Arc<CalibrationStore>,
    projector: Projector,
    state: DeviceState,
}

impl Decoder {
    pub fn new(store: Arc<CalibrationStore>) -> Self {
        let projector = Projector::new(store.optical_center, store.window);
        Self {
            store,
            projector,
            state: DeviceState::default(),
        }
    }

    /// Current temperature estimate in °C.
    pub fn temperature(&self) -> f32 {
        self.state.temperature.celsius()
    }

    pub fn state(&self) -> &DeviceState {
        &self.state
    }

    /// Decode one packet, appending accepted points to `out`.
    pub fn decode(&mut self, data: &[u8], out: &mut Points) -> Result<PacketSummary, Error> {
        // Parse fully before mutating any state so a malformed packet
        // leaves the device state from before it intact.
        let pkt = packet::parse(data)?;

        self.state.temperature.update(&pkt.status);

        let base = pkt.blocks[0].rotation;
        if let Some(prev) = self.state.last_rotation {
            self.state.azimuth_step =
                azimuth::measure_step(prev, base).unwrap_or(AZIMUTH_STEP_DEFAULT);
        }
        self.state.last_rotation = Some(base);

        let before = out.len();
        match self.store.return_mode {
            ReturnMode::All => {
                for block in &pkt.blocks {
                    self.decode_block(block, out);
                }
            }
            ReturnMode::First => {
                for block in pkt.blocks.iter().filter(|b| b.bank == Bank::Upper) {
                    self.decode_block(block, out);
                }
            }
            ReturnMode::Strongest => self.decode_strongest(&pkt, out),
        }

        Ok(PacketSummary {
            rotation: base,
            points: out.len() - before,
            temperature: self.state.temperature.celsius(),
        })
    }

    fn decode_block(&self, block: &Block, out: &mut Points) {
        let temp_index = self.state.temperature.index();
        for (channel, record) in block.records.iter().enumerate() {
            if let Some(distance) =
                self.store
                    .corrected_distance(channel, record.distance, temp_index)
            {
                self.emit(block.rotation, channel, distance, record.intensity, out);
            }
        }
    }

    /// Strongest-return selection: blocks sharing a rotation code carry
    /// echoes of the same firing, so keep only the highest-intensity
    /// valid echo per channel (ties go to the earlier-listed block).
    fn decode_strongest(&self, pkt: &Packet, out: &mut Points) {
        let temp_index = self.state.temperature.index();
        let mut grouped = [false; BLOCKS_PER_PACKET];

        for first in 0..BLOCKS_PER_PACKET {
            if grouped[first] {
                continue;
            }
            let rotation = pkt.blocks[first].rotation;
            let mut peers = [false; BLOCKS_PER_PACKET];
            for (i, block) in pkt.blocks.iter().enumerate().skip(first) {
                if block.rotation == rotation {
                    peers[i] = true;
                    grouped[i] = true;
                }
            }

            for channel in 0..CHANNELS_PER_BLOCK {
                let mut best: Option<(f32, u8)> = None;
                for (i, block) in pkt.blocks.iter().enumerate() {
                    if !peers[i] {
                        continue;
                    }
                    let record = block.records[channel];
                    let Some(distance) =
                        self.store
                            .corrected_distance(channel, record.distance, temp_index)
                    else {
                        continue;
                    };
                    if best.map_or(true, |(_, intensity)| record.intensity > intensity) {
                        best = Some((distance, record.intensity));
                    }
                }
                if let Some((distance, intensity)) = best {
                    self.emit(rotation, channel, distance, intensity, out);
                }
            }
        }
    }

    fn emit(&self, rotation: u16, channel: usize, distance: f32, intensity: u8, out: &mut Points) {
        let interpolated = azimuth::interpolate(rotation, self.state.azimuth_step, channel);
        let az = azimuth::correct(interpolated, self.store.azimuth_offset(channel));
        if let Some((x, y, z)) =
            self.projector
                .project(distance, self.store.vertical_angle(channel), az)
        {
            out.push(x, y, z, intensity);
        }
    }
}
