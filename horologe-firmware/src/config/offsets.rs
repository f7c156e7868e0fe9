//! Zero-offset persistence
//!
//! Loads and saves the per-hand zero-offset table to flash storage. The
//! table is cached in RAM; flash is only touched on boot and on writes.

use defmt::*;

use horologe_core::config::{ZeroOffsetTable, MAX_ENCODED_SIZE};
use horologe_core::traits::{OffsetStore, StorageError};
use horologe_hal_rp2040::flash::{FlashError, Rp2040FlashStorage, StorageKey};
use horologe_hal_rp2040::FlashStorageTrait;

/// Flash-backed offset table
pub struct FlashOffsetStore<'d> {
    storage: Rp2040FlashStorage<'d>,
    table: Option<ZeroOffsetTable>,
}

impl<'d> FlashOffsetStore<'d> {
    /// Load the stored table
    ///
    /// Missing or invalid data leaves the store erased; `offs 12` or
    /// `zero` will then run without offsets until a table is written.
    pub async fn load(mut storage: Rp2040FlashStorage<'d>) -> Self {
        let table = match load_inner(&mut storage).await {
            Ok(Some(table)) => {
                info!("Loaded zero offsets from flash");
                log_offsets(&table);
                Some(table)
            }
            Ok(None) => {
                info!("No zero offsets in flash");
                None
            }
            Err(e) => {
                warn!("Failed to load zero offsets: {:?}, treating flash as erased", e);
                None
            }
        };
        Self { storage, table }
    }
}

/// Inner function that returns errors
async fn load_inner(
    storage: &mut Rp2040FlashStorage<'_>,
) -> Result<Option<ZeroOffsetTable>, StorageError> {
    let mut buffer = [0u8; MAX_ENCODED_SIZE];
    let len = match storage.read(StorageKey::ZeroOffsets, &mut buffer).await {
        Ok(len) => len,
        Err(FlashError::NotFound) => return Ok(None),
        Err(FlashError::BufferTooSmall) => return Err(StorageError::Corrupted),
        Err(_) => return Err(StorageError::Flash),
    };

    debug!("Read {} bytes of zero offsets from flash", len);

    ZeroOffsetTable::decode(&buffer[..len]).map(Some)
}

impl<'d> OffsetStore for FlashOffsetStore<'d> {
    fn table(&self) -> Option<ZeroOffsetTable> {
        self.table
    }

    async fn write_offsets(&mut self, table: &ZeroOffsetTable) -> Result<(), StorageError> {
        let mut table = *table;
        let mut buffer = [0u8; MAX_ENCODED_SIZE];
        let bytes = table.encode(&mut buffer)?;

        debug!("Saving {} bytes of zero offsets to flash", bytes.len());

        self.storage
            .write(StorageKey::ZeroOffsets, bytes)
            .await
            .map_err(|e| {
                error!("Flash write failed: {:?}", e);
                StorageError::Flash
            })?;

        self.table = Some(table);
        info!("Saved zero offsets to flash");
        log_offsets(&table);

        Ok(())
    }
}

/// Log the offsets of every clock
fn log_offsets(table: &ZeroOffsetTable) {
    for (clock, offsets) in table.offsets.iter().enumerate() {
        debug!("  Clock {}: inner={} outer={}", clock, offsets[0], offsets[1]);
    }
}
