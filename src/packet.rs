// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Au-Zone Technologies. All Rights Reserved.

//! Structural decode of the RS128 MSOP packet layout.
//!
//! A packet is exactly [`PACKET_SIZE`] bytes:
//!
//! - 80-byte header: sync and device info, the revolution counter at
//!   bytes 8..10 and four status bytes at 10..14
//! - 3 × 388-byte data blocks, each a 2-byte bank marker, a 2-byte
//!   rotation code and 128 3-byte channel records
//! - 4-byte reserved tail
//!
//! All 16-bit fields are transmitted low byte first. The parser performs
//! no calibration; it yields raw rotation codes, status bytes and
//! per-channel records for the decode pipeline. Record fields are located
//! through an explicit byte-offset table ([`RecordLayout`]) rather than
//! reinterpreting the misaligned wire data in place, so the decode is
//! independent of host byte order.

use crate::error::Error;

/// Total MSOP packet size in bytes.
pub const PACKET_SIZE: usize = 1248;

/// MSOP header size in bytes.
pub const HEADER_SIZE: usize = 80;

/// Reserved tail size in bytes.
pub const TAIL_SIZE: usize = 4;

/// Number of data blocks per packet.
pub const BLOCKS_PER_PACKET: usize = 3;

/// Channel records per block; also the physical channel count.
pub const CHANNELS_PER_BLOCK: usize = 128;

/// Size of one channel record in bytes.
pub const RECORD_SIZE: usize = 3;

/// Bank marker plus rotation code.
pub const BLOCK_HEADER_SIZE: usize = 4;

/// Size of one data block in bytes (388).
pub const BLOCK_SIZE: usize = BLOCK_HEADER_SIZE + CHANNELS_PER_BLOCK * RECORD_SIZE;

/// Bank marker for upper-bank (first return) blocks.
pub const UPPER_BANK: u16 = 0xeeff;

/// Bank marker for lower-bank (second return) blocks.
pub const LOWER_BANK: u16 = 0xddff;

/// Rotation codes count hundredths of a degree, wrapping at one turn.
pub const ROTATION_MAX: u16 = 36000;

/// Degrees per rotation code unit.
pub const ROTATION_RESOLUTION: f32 = 0.01;

/// Meters per raw distance code unit (5mm).
pub const DISTANCE_RESOLUTION: f32 = 0.005;

/// Byte offset of the revolution counter within the header.
const REVOLUTION_OFFSET: usize = 8;

/// Byte offset of the status bytes within the header.
const STATUS_OFFSET: usize = 10;

/// Bank identity of a data block.
///
/// The device emits three upper-bank blocks for every lower-bank block;
/// lower-bank blocks carry the second echo of the same channels when
/// dual-echo mode is active.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Bank {
    Upper,
    Lower,
}

impl Bank {
    /// Map a wire marker to a bank, `None` for unrecognized markers.
    pub fn from_marker(marker: u16) -> Option<Bank> {
        match marker {
            UPPER_BANK => Some(Bank::Upper),
            LOWER_BANK => Some(Bank::Lower),
            _ => None,
        }
    }

    /// Echo index carried by blocks of this bank.
    pub fn echo(self) -> u8 {
        match self {
            Bank::Upper => 0,
            Bank::Lower => 1,
        }
    }
}

/// One raw channel sample: distance code plus intensity byte.
///
/// A distance code of zero is the device's "no return" sentinel.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Record {
    pub distance: u16,
    pub intensity: u8,
}

/// Byte offsets of the fields within one channel record.
#[derive(Clone, Copy, Debug)]
pub struct RecordLayout {
    pub distance_lo: usize,
    pub distance_hi: usize,
    pub intensity: usize,
}

/// Layout of the 3-byte RS128 record: distance low byte, distance high
/// byte, intensity.
pub const RECORD_LAYOUT: RecordLayout = RecordLayout {
    distance_lo: 0,
    distance_hi: 1,
    intensity: 2,
};

impl RecordLayout {
    /// Read one record from a `RECORD_SIZE` slice.
    #[inline]
    pub fn read(&self, bytes: &[u8]) -> Record {
        Record {
            distance: u16::from_le_bytes([bytes[self.distance_lo], bytes[self.distance_hi]]),
            intensity: bytes[self.intensity],
        }
    }
}

/// One parsed data block.
#[derive(Clone, Copy, Debug)]
pub struct Block {
    pub bank: Bank,
    /// Rotation code, already reduced into `[0, ROTATION_MAX)`.
    pub rotation: u16,
    /// Raw channel samples; the record position is the physical channel
    /// index.
    pub records: [Record; CHANNELS_PER_BLOCK],
}

/// One parsed packet.
#[derive(Clone, Copy, Debug)]
pub struct Packet {
    /// Revolution counter, incrementing mod 65536 per physical turn.
    pub revolution: u16,
    /// Status bytes; carry either a temperature encoding or the microcode
    /// level depending on the frame.
    pub status: [u8; 4],
    pub blocks: [Block; BLOCKS_PER_PACKET],
}

/// Parse one packet buffer.
///
/// Fails with [`Error::InvalidPacket`] if the buffer is not exactly
/// [`PACKET_SIZE`] bytes or any block's bank marker matches neither
/// recognized sentinel.
pub fn parse(data: &[u8]) -> Result<Packet, Error> {
    if data.len() != PACKET_SIZE {
        return Err(Error::InvalidPacket(format!(
            "unexpected length {} bytes, expected {}",
            data.len(),
            PACKET_SIZE
        )));
    }

    let revolution = u16::from_le_bytes([data[REVOLUTION_OFFSET], data[REVOLUTION_OFFSET + 1]]);
    let status = [
        data[STATUS_OFFSET],
        data[STATUS_OFFSET + 1],
        data[STATUS_OFFSET + 2],
        data[STATUS_OFFSET + 3],
    ];

    let block = |index: usize| {
        let start = HEADER_SIZE + index * BLOCK_SIZE;
        parse_block(&data[start..start + BLOCK_SIZE])
    };

    Ok(Packet {
        revolution,
        status,
        blocks: [block(0)?, block(1)?, block(2)?],
    })
}

fn parse_block(bytes: &[u8]) -> Result<Block, Error> {
    let marker = u16::from_le_bytes([bytes[0], bytes[1]]);
    let bank = Bank::from_marker(marker)
        .ok_or_else(|| Error::InvalidPacket(format!("unknown bank marker {marker:#06x}")))?;

    let rotation = u16::from_le_bytes([bytes[2], bytes[3]]) % ROTATION_MAX;

    let mut records = [Record::default(); CHANNELS_PER_BLOCK];
    for (channel, record) in records.iter_mut().enumerate() {
        let offset = BLOCK_HEADER_SIZE + channel * RECORD_SIZE;
        *record = RECORD_LAYOUT.read(&bytes[offset..offset + RECORD_SIZE]);
    }

    Ok(Block {
        bank,
        rotation,
        records,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn empty_packet() -> Vec<u8> {
        let mut data = vec![0u8; PACKET_SIZE];
        for i in 0..BLOCKS_PER_PACKET {
            let start = HEADER_SIZE + i * BLOCK_SIZE;
            data[start..start + 2].copy_from_slice(&UPPER_BANK.to_le_bytes());
        }
        data
    }

    #[test]
    fn test_layout_constants() {
        assert_eq!(BLOCK_SIZE, 388);
        assert_eq!(
            HEADER_SIZE + BLOCKS_PER_PACKET * BLOCK_SIZE + TAIL_SIZE,
            PACKET_SIZE
        );
    }

    #[test]
    fn test_record_layout_low_byte_first() {
        let record = RECORD_LAYOUT.read(&[0x34, 0x12, 0x7f]);
        assert_eq!(record.distance, 0x1234);
        assert_eq!(record.intensity, 0x7f);
    }

    #[test]
    fn test_parse_rejects_wrong_length() {
        assert!(parse(&[0u8; PACKET_SIZE - 1]).is_err());
        assert!(parse(&[0u8; PACKET_SIZE + 1]).is_err());
        assert!(parse(&[]).is_err());
    }

    #[test]
    fn test_parse_rejects_unknown_bank_marker() {
        let mut data = empty_packet();
        // Corrupt the second block's marker
        let start = HEADER_SIZE + BLOCK_SIZE;
        data[start..start + 2].copy_from_slice(&0xbeefu16.to_le_bytes());
        match parse(&data) {
            Err(Error::InvalidPacket(msg)) => assert!(msg.contains("bank marker")),
            other => panic!("expected InvalidPacket, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_header_fields() {
        let mut data = empty_packet();
        data[8..10].copy_from_slice(&4660u16.to_le_bytes());
        data[10..14].copy_from_slice(&[0xa1, 0x20, 0x03, 0x00]);

        let packet = parse(&data).unwrap();
        assert_eq!(packet.revolution, 4660);
        assert_eq!(packet.status, [0xa1, 0x20, 0x03, 0x00]);
    }

    #[test]
    fn test_parse_blocks_and_records() {
        let mut data = empty_packet();

        // First block: lower bank, rotation 9000, channel 5 has a sample
        let start = HEADER_SIZE;
        data[start..start + 2].copy_from_slice(&LOWER_BANK.to_le_bytes());
        data[start + 2..start + 4].copy_from_slice(&9000u16.to_le_bytes());
        let record = start + BLOCK_HEADER_SIZE + 5 * RECORD_SIZE;
        data[record..record + 3].copy_from_slice(&[0xa0, 0x0f, 200]);

        let packet = parse(&data).unwrap();
        let block = &packet.blocks[0];
        assert_eq!(block.bank, Bank::Lower);
        assert_eq!(block.bank.echo(), 1);
        assert_eq!(block.rotation, 9000);
        assert_eq!(block.records[5].distance, 0x0fa0);
        assert_eq!(block.records[5].intensity, 200);
        assert_eq!(block.records[6], Record::default());
        assert_eq!(packet.blocks[1].bank, Bank::Upper);
    }

    #[test]
    fn test_rotation_reduced_modulo_one_turn() {
        let mut data = empty_packet();
        let start = HEADER_SIZE;
        data[start + 2..start + 4].copy_from_slice(&37000u16.to_le_bytes());

        let packet = parse(&data).unwrap();
        assert_eq!(packet.blocks[0].rotation, 1000);
    }
}
