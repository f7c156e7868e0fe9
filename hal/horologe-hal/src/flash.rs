//! Persistent records for calibration data
//!
//! The clock keeps one record per key in on-chip flash. Today that is the
//! zero-offset table written by `offs` and read once at boot.

/// Record selector, stored as a single byte ahead of the payload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum StorageKey {
    /// Zero-offset table, postcard encoded with its CRC
    ZeroOffsets = 0,
}

impl StorageKey {
    /// On-flash tag byte
    pub fn as_u8(self) -> u8 {
        self as u8
    }

    /// Tag byte back to a key, `None` for tags this build does not know
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(StorageKey::ZeroOffsets),
            _ => None,
        }
    }
}

/// Record read or write failures
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FlashError {
    /// The flash peripheral reported an error
    Flash,
    /// The record map could not be read or updated
    Storage,
    /// No record for the key, as on a freshly erased chip
    NotFound,
    /// The stored record does not fit the caller's buffer
    BufferTooSmall,
}

/// Record store backed by chip flash
///
/// A write supersedes the previous record under the same key. Readers only
/// ever see a complete record, so an interrupted offset update leaves the
/// old table in place.
pub trait FlashStorage {
    /// Copy the latest record for `key` into `buffer`
    ///
    /// Returns the record length.
    fn read(&mut self, key: StorageKey, buffer: &mut [u8]) -> impl core::future::Future<Output = Result<usize, FlashError>>;

    /// Store `data` as the latest record for `key`
    fn write(&mut self, key: StorageKey, data: &[u8]) -> impl core::future::Future<Output = Result<(), FlashError>>;
}

#[cfg(feature = "sequential-storage")]
impl sequential_storage::map::Key for StorageKey {
    fn serialize_into(
        &self,
        buffer: &mut [u8],
    ) -> Result<usize, sequential_storage::map::SerializationError> {
        if buffer.is_empty() {
            return Err(sequential_storage::map::SerializationError::BufferTooSmall);
        }
        buffer[0] = self.as_u8();
        Ok(1)
    }

    fn deserialize_from(
        buffer: &[u8],
    ) -> Result<(Self, usize), sequential_storage::map::SerializationError> {
        if buffer.is_empty() {
            return Err(sequential_storage::map::SerializationError::BufferTooSmall);
        }
        match StorageKey::from_u8(buffer[0]) {
            Some(key) => Ok((key, 1)),
            None => Err(sequential_storage::map::SerializationError::InvalidFormat),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_byte_values() {
        assert_eq!(StorageKey::ZeroOffsets.as_u8(), 0);
        assert_eq!(StorageKey::from_u8(0), Some(StorageKey::ZeroOffsets));
        assert_eq!(StorageKey::from_u8(1), None);
    }

    #[cfg(feature = "sequential-storage")]
    #[test]
    fn test_key_serialization() {
        use sequential_storage::map::Key;

        let mut buf = [0u8; 4];
        assert_eq!(StorageKey::ZeroOffsets.serialize_into(&mut buf).ok(), Some(1));
        assert_eq!(StorageKey::deserialize_from(&buf).ok(), Some((StorageKey::ZeroOffsets, 1)));
        assert!(StorageKey::serialize_into(&StorageKey::ZeroOffsets, &mut []).is_err());
    }
}
