// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Au-Zone Technologies. All Rights Reserved.

//! Minimal ROS2 message types for zenoh publication.
//!
//! Only the fields needed to publish `sensor_msgs/msg/PointCloud2` and
//! the temperature telemetry `std_msgs/msg/Float32` are modeled; the
//! structs serialize to the ROS2 RMW wire format with the `cdr` crate.

use serde::{Deserialize, Serialize};

use crate::points::Points;

#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize)]
pub struct Time {
    pub sec: i32,
    pub nanosec: u32,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Header {
    pub stamp: Time,
    pub frame_id: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PointField {
    pub name: String,
    pub offset: u32,
    pub datatype: u8,
    pub count: u32,
}

/// `sensor_msgs/msg/PointField` datatype codes.
pub mod field_type {
    pub const UINT8: u8 = 2;
    pub const FLOAT32: u8 = 7;
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PointCloud2 {
    pub header: Header,
    pub height: u32,
    pub width: u32,
    pub fields: Vec<PointField>,
    pub is_bigendian: bool,
    pub point_step: u32,
    pub row_step: u32,
    pub data: Vec<u8>,
    pub is_dense: bool,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct Float32 {
    pub data: f32,
}

/// Bytes per point in the published layout: x, y, z as f32 plus one
/// intensity byte.
pub const POINT_STEP: u32 = 13;

/// Pack a point buffer into a `PointCloud2` message.
pub fn pointcloud2(frame_id: &str, stamp: Time, points: &Points) -> PointCloud2 {
    let fields = vec![
        PointField {
            name: String::from("x"),
            offset: 0,
            datatype: field_type::FLOAT32,
            count: 1,
        },
        PointField {
            name: String::from("y"),
            offset: 4,
            datatype: field_type::FLOAT32,
            count: 1,
        },
        PointField {
            name: String::from("z"),
            offset: 8,
            datatype: field_type::FLOAT32,
            count: 1,
        },
        PointField {
            name: String::from("intensity"),
            offset: 12,
            datatype: field_type::UINT8,
            count: 1,
        },
    ];

    let n_points = points.len();
    let mut data = Vec::with_capacity(n_points * POINT_STEP as usize);
    for i in 0..n_points {
        data.extend_from_slice(&points.x()[i].to_le_bytes());
        data.extend_from_slice(&points.y()[i].to_le_bytes());
        data.extend_from_slice(&points.z()[i].to_le_bytes());
        data.push(points.intensity()[i]);
    }

    PointCloud2 {
        header: Header {
            stamp,
            frame_id: frame_id.to_string(),
        },
        height: 1,
        width: n_points as u32,
        fields,
        is_bigendian: false,
        point_step: POINT_STEP,
        row_step: POINT_STEP * n_points as u32,
        data,
        is_dense: true,
    }
}
