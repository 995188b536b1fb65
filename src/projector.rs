// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Au-Zone Technologies. All Rights Reserved.

//! Spherical-to-Cartesian point projection.
//!
//! Corrected (distance, vertical angle, azimuth) triples become Cartesian
//! coordinates through the precomputed trig table, translated by the
//! optical-center offset: the mirror's optical center sits `rx` meters
//! off the rotation axis (so that term rotates with the azimuth) and `rz`
//! above the device origin. Azimuths outside the configured window are
//! rejected before any trig work.

use crate::azimuth;
use crate::calib::{AzimuthWindow, OpticalCenter};
use crate::trig::TrigTable;

pub struct Projector {
    trig: TrigTable,
    center: OpticalCenter,
    window: AzimuthWindow,
}

impl Projector {
    pub fn new(center: OpticalCenter, window: AzimuthWindow) -> Self {
        Self {
            trig: TrigTable::new(),
            center,
            window,
        }
    }

    /// Project one corrected sample.
    ///
    /// `vertical` is the channel's fixed vertical angle in signed
    /// hundredths of a degree; `az` the corrected azimuth already reduced
    /// into `[0, 36000)`. Returns `None` when the azimuth falls outside
    /// the configured window.
    #[inline]
    pub fn project(&self, distance: f32, vertical: i32, az: u16) -> Option<(f32, f32, f32)> {
        if !self.window.contains(az) {
            return None;
        }

        let (cos_h, sin_h) = self.trig.lookup(az);
        let (cos_v, sin_v) = self.trig.lookup(azimuth::wrap(vertical));
        let d = distance as f64;
        let rx = self.center.rx as f64;

        let x = d * cos_v * cos_h + rx * cos_h;
        let y = -(d * cos_v * sin_h + rx * sin_h);
        let z = d * sin_v + self.center.rz as f64;
        Some((x as f32, y as f32, z as f32))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_window() -> AzimuthWindow {
        AzimuthWindow::new(0.0, 360.0)
    }

    #[test]
    fn test_round_trip_at_zero_angles() {
        let projector = Projector::new(OpticalCenter::default(), full_window());
        let (x, y, z) = projector.project(20.0, 0, 0).unwrap();
        assert!((x - 20.0).abs() < 1e-5);
        assert!(y.abs() < 1e-5);
        assert!(z.abs() < 1e-5);
    }

    #[test]
    fn test_quarter_turn() {
        let projector = Projector::new(OpticalCenter::default(), full_window());
        let (x, y, z) = projector.project(20.0, 0, 9000).unwrap();
        assert!(x.abs() < 1e-4);
        assert!((y + 20.0).abs() < 1e-4);
        assert!(z.abs() < 1e-5);
    }

    #[test]
    fn test_vertical_tilt() {
        let projector = Projector::new(OpticalCenter::default(), full_window());
        // 30° up at azimuth 0
        let (x, y, z) = projector.project(10.0, 3000, 0).unwrap();
        assert!((x - 10.0 * 0.75f32.sqrt()).abs() < 1e-4);
        assert!(y.abs() < 1e-5);
        assert!((z - 5.0).abs() < 1e-4);

        // Negative tilt points down
        let (_, _, z) = projector.project(10.0, -3000, 0).unwrap();
        assert!((z + 5.0).abs() < 1e-4);
    }

    #[test]
    fn test_optical_center_offset() {
        let center = OpticalCenter {
            rx: 0.04,
            ry: 0.0,
            rz: 0.03,
        };
        let projector = Projector::new(center, full_window());
        let (x, y, z) = projector.project(20.0, 0, 0).unwrap();
        assert!((x - 20.04).abs() < 1e-4);
        assert!(y.abs() < 1e-5);
        assert!((z - 0.03).abs() < 1e-5);
    }

    #[test]
    fn test_window_rejection() {
        let projector = Projector::new(OpticalCenter::default(), AzimuthWindow::new(0.0, 90.0));
        assert!(projector.project(20.0, 0, 4500).is_some());
        assert!(projector.project(20.0, 0, 9500).is_none());
    }
}
