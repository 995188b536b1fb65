// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Au-Zone Technologies. All Rights Reserved.

//! RS128 rotating LiDAR packet decoder.
//!
//! This library turns fixed-format MSOP packets from a 128-channel
//! rotating laser rangefinder into calibrated Cartesian points.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────┐     ┌──────────────────────────────┐
//! │  PacketSource   │ ──► │          Decoder             │
//! │  (UDP / test)   │     │  parse → calibrate → project │
//! └─────────────────┘     └──────────────┬───────────────┘
//!                                        │ consults
//!                 ┌──────────────────────┼─────────────────────┐
//!                 ▼                      ▼                     ▼
//!        ┌────────────────┐   ┌──────────────────┐   ┌──────────────┐
//!        │ CalibrationStore│  │   DeviceState    │   │  TrigTable   │
//!        │ (immutable,     │  │ (per decoder:    │   │ (precomputed │
//!        │  shareable)     │  │  rotation, temp, │   │  cos/sin)    │
//!        └────────────────┘   │  azimuth step)   │   └──────────────┘
//!                             └──────────────────┘
//! ```
//!
//! The caller owns the output [`Points`] container and provides it
//! mutably to every decode call; accepted points are appended and the
//! caller clears the buffer between frames. The [`CalibrationStore`] and
//! trig table are read-only after construction and may be shared across
//! decoder instances; the per-instance [`decoder::DeviceState`] is not,
//! so concurrent streams need separate decoders.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use rslidarpub::{CalibrationStore, Decoder, DecoderConfig, Points, RawTables};
//!
//! let store = CalibrationStore::load(RawTables::flat(), DecoderConfig::default()).unwrap();
//! let mut decoder = Decoder::new(Arc::new(store));
//! let mut cloud = Points::with_capacity(300_000);
//!
//! let packet = vec![0u8; 100]; // not a real packet
//! assert!(decoder.decode(&packet, &mut cloud).is_err());
//! ```

pub mod args;
pub mod azimuth;
pub mod calib;
pub mod decoder;
pub mod error;
pub mod msg;
pub mod packet;
pub mod packet_source;
pub mod points;
pub mod projector;
pub mod temperature;
pub mod trig;

// Re-exports for convenience
pub use calib::{CalibrationStore, DecoderConfig, OpticalCenter, RawTables, ReturnMode};
pub use decoder::{Decoder, PacketSummary};
pub use error::Error;
pub use packet_source::PacketSource;
pub use points::Points;
