// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Au-Zone Technologies. All Rights Reserved.

//! Common error type for decoder operations.
//!
//! Only structural failures surface as errors: a calibration store that
//! cannot be built ([`Error::Config`]) aborts startup, and a packet that
//! does not match the device layout ([`Error::InvalidPacket`]) is dropped
//! by the caller while decoding resumes on the next packet. Per-sample
//! rejections (no-return sentinel, out-of-range distance, azimuth outside
//! the configured window) and temperature decode anomalies are not errors;
//! those samples are simply excluded from the output.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// Calibration table missing, malformed, or out of documented range.
    /// Fatal to initialization.
    #[error("calibration error: {0}")]
    Config(String),

    /// Packet buffer length mismatch or unrecognized bank marker. The
    /// offending packet is dropped; decoder state is left untouched.
    #[error("invalid packet: {0}")]
    InvalidPacket(String),

    /// I/O error (socket, calibration file).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
