//! Zero-offset calibration table
//!
//! Stores the per-hand distance (in steps) between the magnet sensor edge
//! and true 12 o'clock. Persisted to flash and loaded on boot.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::{HANDS_PER_CLOCK, MAX_CLOCKS};
use crate::clock::HandId;

/// Magic number to identify a valid offset table
pub const OFFSETS_MAGIC: u32 = 0x5A45524F; // "ZERO"

/// Current offset table version
pub const OFFSETS_VERSION: u8 = 1;

/// Largest encoded table size (postcard varints)
pub const MAX_ENCODED_SIZE: usize = 64;

/// Complete zero-offset table stored in flash
///
/// Indexed by clock, then motor (0 = inner hand, 1 = outer hand).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ZeroOffsetTable {
    /// Magic number for validation
    pub magic: u32,
    /// Data format version
    pub version: u8,
    /// Offsets in steps
    pub offsets: [[i16; HANDS_PER_CLOCK]; MAX_CLOCKS],
    /// CRC32 checksum (calculated over magic..offsets)
    pub crc: u32,
}

impl Default for ZeroOffsetTable {
    fn default() -> Self {
        Self::new()
    }
}

impl ZeroOffsetTable {
    /// Create a table with all offsets zero
    pub const fn new() -> Self {
        Self {
            magic: OFFSETS_MAGIC,
            version: OFFSETS_VERSION,
            offsets: [[0; HANDS_PER_CLOCK]; MAX_CLOCKS],
            crc: 0,
        }
    }

    /// Check if the header is valid (magic and version match)
    pub fn is_valid(&self) -> bool {
        self.magic == OFFSETS_MAGIC && self.version == OFFSETS_VERSION
    }

    /// Offset for a hand, 0 for hands outside the table
    pub fn get(&self, hand: HandId) -> i16 {
        self.offsets
            .get(hand.clock as usize)
            .and_then(|clock| clock.get(hand.motor as usize))
            .copied()
            .unwrap_or(0)
    }

    /// Set the offset for a hand
    ///
    /// Returns false if the hand is outside the table.
    pub fn set(&mut self, hand: HandId, offset: i16) -> bool {
        match self
            .offsets
            .get_mut(hand.clock as usize)
            .and_then(|clock| clock.get_mut(hand.motor as usize))
        {
            Some(slot) => {
                *slot = offset;
                true
            }
            None => false,
        }
    }

    /// Calculate CRC32 for the table (excluding the crc field itself)
    pub fn calculate_crc(&self) -> u32 {
        let mut crc: u32 = 0xFFFFFFFF;

        crc = crc32_update(crc, &self.magic.to_le_bytes());
        crc = crc32_update(crc, &[self.version]);
        for clock in &self.offsets {
            for offset in clock {
                crc = crc32_update(crc, &offset.to_le_bytes());
            }
        }

        !crc
    }

    /// Update the CRC field
    pub fn update_crc(&mut self) {
        self.crc = self.calculate_crc();
    }

    /// Verify the CRC is correct
    pub fn verify_crc(&self) -> bool {
        self.crc == self.calculate_crc()
    }
}

#[cfg(feature = "serde")]
impl ZeroOffsetTable {
    /// Serialize into `buffer` with an up-to-date CRC
    pub fn encode<'a>(&mut self, buffer: &'a mut [u8]) -> Result<&'a mut [u8], crate::traits::StorageError> {
        self.update_crc();
        postcard::to_slice(self, buffer).map_err(|_| crate::traits::StorageError::Serialize)
    }

    /// Deserialize and validate a stored table
    pub fn decode(bytes: &[u8]) -> Result<Self, crate::traits::StorageError> {
        let table: ZeroOffsetTable =
            postcard::from_bytes(bytes).map_err(|_| crate::traits::StorageError::Deserialize)?;
        if !table.is_valid() || !table.verify_crc() {
            return Err(crate::traits::StorageError::Corrupted);
        }
        Ok(table)
    }
}

/// Simple CRC32 update function (IEEE 802.3 polynomial)
fn crc32_update(crc: u32, data: &[u8]) -> u32 {
    const POLY: u32 = 0xEDB88320;
    let mut crc = crc;

    for &byte in data {
        crc ^= byte as u32;
        for _ in 0..8 {
            if crc & 1 != 0 {
                crc = (crc >> 1) ^ POLY;
            } else {
                crc >>= 1;
            }
        }
    }

    crc
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offset_table_default() {
        let table = ZeroOffsetTable::default();
        assert!(table.is_valid());
        assert_eq!(table.get(HandId::new(3, 1)), 0);
    }

    #[test]
    fn test_set_and_get_offset() {
        let mut table = ZeroOffsetTable::new();
        assert!(table.set(HandId::new(2, 1), -37));
        assert_eq!(table.get(HandId::new(2, 1)), -37);
        assert_eq!(table.get(HandId::new(2, 0)), 0);
    }

    #[test]
    fn test_out_of_range_hand() {
        let mut table = ZeroOffsetTable::new();
        assert!(!table.set(HandId::new(MAX_CLOCKS as u8, 0), 5));
        assert!(!table.set(HandId::new(0, 2), 5));
        assert_eq!(table.get(HandId::new(0, 2)), 0);
    }

    #[test]
    fn test_crc_consistency() {
        let mut table = ZeroOffsetTable::new();
        table.set(HandId::new(0, 0), 120);
        table.update_crc();
        assert!(table.verify_crc());

        // Modify data without updating CRC
        table.offsets[0][0] = 121;
        assert!(!table.verify_crc());
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_decode_rejects_corrupted_table() {
        let mut table = ZeroOffsetTable::new();
        table.set(HandId::new(1, 0), -12);
        let mut buffer = [0u8; MAX_ENCODED_SIZE];
        let len = table.encode(&mut buffer).map(|b| b.len()).unwrap();

        let decoded = ZeroOffsetTable::decode(&buffer[..len]).unwrap();
        assert_eq!(decoded.get(HandId::new(1, 0)), -12);

        let mut bad = table;
        bad.crc ^= 1;
        let len = postcard::to_slice(&bad, &mut buffer).unwrap().len();
        assert_eq!(
            ZeroOffsetTable::decode(&buffer[..len]),
            Err(crate::traits::StorageError::Corrupted)
        );
    }
}
