//! Zero-offset storage trait
//!
//! The calibration table is owned by an external storage collaborator
//! (flash on the real board, memory in tests).

use core::future::Future;

use crate::clock::HandId;
use crate::config::ZeroOffsetTable;

/// Errors from offset storage operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StorageError {
    /// Underlying flash operation failed
    Flash,
    /// Table could not be serialized
    Serialize,
    /// Stored bytes could not be decoded
    Deserialize,
    /// Magic, version or CRC mismatch
    Corrupted,
}

/// Persistent zero-offset table
pub trait OffsetStore {
    /// Current table, or `None` when storage is erased
    fn table(&self) -> Option<ZeroOffsetTable>;

    /// Offset for a single hand (0 when storage is erased)
    fn zero_offset(&self, hand: HandId) -> i16 {
        self.table().map(|t| t.get(hand)).unwrap_or(0)
    }

    /// Persist a complete table
    ///
    /// On success, subsequent `table()` calls return the written table.
    fn write_offsets(
        &mut self,
        table: &ZeroOffsetTable,
    ) -> impl Future<Output = Result<(), StorageError>>;
}
