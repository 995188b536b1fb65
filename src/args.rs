// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Au-Zone Technologies. All Rights Reserved.

use std::fs::File;
use std::path::PathBuf;

use clap::Parser;
use serde_json::json;
use tracing::level_filters::LevelFilter;
use zenoh::config::{Config, ValidatedMap, WhatAmI};

use crate::calib::{DecoderConfig, OpticalCenter, RawTables, ReturnMode};
use crate::error::Error;

#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// UDP address to bind for device MSOP packets.
    #[arg(env, default_value = "0.0.0.0:6699")]
    pub bind: String,

    /// Azimuth window start angle in degrees.
    /// The 0 degree point is the rear connector of the LiDAR.
    #[arg(long, env, default_value = "0")]
    pub start_angle: f32,

    /// Azimuth window end angle in degrees.
    #[arg(long, env, default_value = "360")]
    pub end_angle: f32,

    /// Minimum valid distance in meters.
    #[arg(long, env, default_value = "0.5")]
    pub min_distance: f32,

    /// Maximum valid distance in meters.
    #[arg(long, env, default_value = "200")]
    pub max_distance: f32,

    /// Which echoes to keep when the device reports multiple returns.
    #[arg(long, env, value_enum, default_value_t = ReturnMode::Strongest)]
    pub return_mode: ReturnMode,

    /// Optical center offset (Rx Ry Rz) in meters.
    #[arg(
        long,
        env,
        default_value = "0 0 0",
        value_delimiter = ' ',
        num_args = 3
    )]
    pub optical_center: Vec<f32>,

    /// Calibration tables file (JSON). Flat tables are used when absent.
    #[arg(long, env)]
    pub calibration: Option<PathBuf>,

    /// The name of the lidar frame
    #[arg(long, env, default_value = "lidar")]
    pub frame_id: String,

    /// lidar base topic
    #[arg(long, env, default_value = "rt/lidar")]
    pub lidar_topic: String,

    /// Application log level
    #[arg(long, env, default_value = "info")]
    pub rust_log: LevelFilter,

    /// zenoh connection mode
    #[arg(long, env, default_value = "peer")]
    mode: WhatAmI,

    /// connect to zenoh endpoints
    #[arg(long, env)]
    connect: Vec<String>,

    /// listen to zenoh endpoints
    #[arg(long, env)]
    listen: Vec<String>,

    /// disable zenoh multicast scouting
    #[arg(long, env)]
    no_multicast_scouting: bool,
}

impl Args {
    pub fn decoder_config(&self) -> DecoderConfig {
        DecoderConfig {
            start_angle: self.start_angle,
            end_angle: self.end_angle,
            min_distance: self.min_distance,
            max_distance: self.max_distance,
            return_mode: self.return_mode,
            optical_center: OpticalCenter {
                rx: self.optical_center[0],
                ry: self.optical_center[1],
                rz: self.optical_center[2],
            },
        }
    }

    /// Load the calibration tables named on the command line, or flat
    /// tables when no file was given.
    pub fn raw_tables(&self) -> Result<RawTables, Error> {
        match &self.calibration {
            Some(path) => {
                let file = File::open(path)?;
                serde_json::from_reader(file)
                    .map_err(|e| Error::Config(format!("calibration file {path:?}: {e}")))
            }
            None => Ok(RawTables::flat()),
        }
    }
}

impl From<Args> for Config {
    fn from(args: Args) -> Self {
        let mut config = Config::default();

        config
            .insert_json5("mode", &json!(args.mode).to_string())
            .unwrap();

        if !args.connect.is_empty() {
            config
                .insert_json5("connect/endpoints", &json!(args.connect).to_string())
                .unwrap();
        }

        if !args.listen.is_empty() {
            config
                .insert_json5("listen/endpoints", &json!(args.listen).to_string())
                .unwrap();
        }

        if args.no_multicast_scouting {
            config
                .insert_json5("scouting/multicast/enabled", &json!(false).to_string())
                .unwrap();
        }

        config
    }
}
