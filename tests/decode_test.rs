// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Au-Zone Technologies. All Rights Reserved.

//! End-to-end decode tests over synthetic packet streams.

use std::sync::Arc;

use rslidarpub::{
    packet::{
        BLOCKS_PER_PACKET, BLOCK_HEADER_SIZE, BLOCK_SIZE, HEADER_SIZE, PACKET_SIZE, RECORD_SIZE,
        UPPER_BANK,
    },
    packet_source::{PacketSource, TestSource},
    CalibrationStore, Decoder, DecoderConfig, Points, RawTables,
};

/// Build a packet whose three upper-bank blocks sweep from `rotation` in
/// `step` increments, every channel returning `raw` counts.
fn sweep_packet(rotation: u16, step: u16, raw: u16) -> Vec<u8> {
    let mut data = vec![0u8; PACKET_SIZE];
    for i in 0..BLOCKS_PER_PACKET {
        let start = HEADER_SIZE + i * BLOCK_SIZE;
        data[start..start + 2].copy_from_slice(&UPPER_BANK.to_le_bytes());
        let block_rotation = (rotation + i as u16 * step) % 36000;
        data[start + 2..start + 4].copy_from_slice(&block_rotation.to_le_bytes());
        for channel in 0..128 {
            let offset = start + BLOCK_HEADER_SIZE + channel * RECORD_SIZE;
            data[offset..offset + 2].copy_from_slice(&raw.to_le_bytes());
            data[offset + 2] = channel as u8;
        }
    }
    data
}

fn decoder() -> Decoder {
    let store = CalibrationStore::load(RawTables::flat(), DecoderConfig::default()).unwrap();
    Decoder::new(Arc::new(store))
}

#[test]
fn test_full_packet_yields_point_per_channel_per_block() {
    let mut dec = decoder();
    let mut cloud = Points::with_capacity(4096);

    let summary = dec.decode(&sweep_packet(9000, 20, 4000), &mut cloud).unwrap();
    assert_eq!(summary.rotation, 9000);
    assert_eq!(summary.points, 3 * 128);

    // Every point sits 20m from the origin
    for i in 0..cloud.len() {
        let range =
            (cloud.x()[i].powi(2) + cloud.y()[i].powi(2) + cloud.z()[i].powi(2)).sqrt();
        assert!((range - 20.0).abs() < 1e-3);
    }
}

#[test]
fn test_stream_survives_malformed_packet() {
    let mut dec = decoder();
    let mut cloud = Points::with_capacity(4096);

    dec.decode(&sweep_packet(0, 20, 4000), &mut cloud).unwrap();
    let good = cloud.len();

    // Truncated packet is rejected without disturbing the stream
    assert!(dec.decode(&[0u8; 600], &mut cloud).is_err());
    assert_eq!(cloud.len(), good);

    let summary = dec.decode(&sweep_packet(60, 20, 4000), &mut cloud).unwrap();
    assert_eq!(summary.points, 3 * 128);
}

#[tokio::test]
async fn test_replayed_stream_wraps_into_frames() {
    // One simulated revolution at 60 units per packet, then a bit more.
    let mut packets = Vec::new();
    let mut rotation = 0u32;
    for _ in 0..650 {
        packets.push(sweep_packet((rotation % 36000) as u16, 20, 2000));
        rotation += 60;
    }

    let mut source = TestSource::new(packets);
    let mut dec = decoder();
    let mut cloud = Points::with_capacity(600_000);
    let mut buf = [0u8; 2048];

    let mut frames = 0;
    let mut last_rotation: Option<u16> = None;
    while source.has_more() {
        let len = source.recv(&mut buf).await.unwrap();
        let summary = dec.decode(&buf[..len], &mut cloud).unwrap();

        if last_rotation.is_some_and(|prev| summary.rotation < prev) {
            frames += 1;
            cloud.clear();
        }
        last_rotation = Some(summary.rotation);
    }

    // 650 packets * 60 units = 39000 units: one wrap
    assert_eq!(frames, 1);
    assert!(!cloud.is_empty());
}

#[test]
fn test_calibration_offsets_shift_output() {
    // A 90° azimuth correction on channel 0 rotates its point; a vertical
    // angle lifts it.
    let mut tables = RawTables::flat();
    tables.azimuth_offsets[0] = 9000;
    tables.vertical_angles[1] = 3000;
    let store = CalibrationStore::load(tables, DecoderConfig::default()).unwrap();
    let mut dec = Decoder::new(Arc::new(store));
    let mut cloud = Points::with_capacity(4096);

    dec.decode(&sweep_packet(0, 0, 4000), &mut cloud).unwrap();

    // Channel 0 of the first block: azimuth 0 + 90° correction
    assert!(cloud.x()[0].abs() < 0.1);
    assert!((cloud.y()[0] + 20.0).abs() < 0.1);

    // Channel 1: 30° above horizontal
    assert!((cloud.z()[1] - 10.0).abs() < 0.1);
}
