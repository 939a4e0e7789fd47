use embedded_storage::{ReadStorage, Storage};
use esp_bootloader_esp_idf::partitions::{
    DataPartitionSubType, PARTITION_TABLE_MAX_LEN, PartitionType, read_partition_table,
};
use esp_rom_sys::rom::spiflash::{
    ESP_ROM_SPIFLASH_RESULT_OK, esp_rom_spiflash_erase_sector, esp_rom_spiflash_read,
    esp_rom_spiflash_unlock, esp_rom_spiflash_write,
};
use krang_core::settings::{
    RECORD_LEN, RecordError, SettingKey, SettingValue, SettingsRecord, SettingsStore,
};
use log::{info, warn};

const FLASH_SECTOR_SIZE: u32 = 4096;
const DEFAULT_FLASH_CAPACITY_BYTES: usize = 16 * 1024 * 1024;

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum FlashSettingsError {
    PartitionTable,
    SettingsPartitionMissing,
    PartitionTooSmall,
    FlashOpFailed(i32),
    Corrupted,
    TypeMismatch,
    Unsupported,
}

impl From<RecordError> for FlashSettingsError {
    fn from(err: RecordError) -> Self {
        match err {
            RecordError::Corrupted => Self::Corrupted,
            RecordError::TypeMismatch => Self::TypeMismatch,
        }
    }
}

#[derive(Debug)]
struct RawFlash;

impl RawFlash {
    fn new() -> Result<Self, FlashSettingsError> {
        let rc = unsafe { esp_rom_spiflash_unlock() };
        if rc != ESP_ROM_SPIFLASH_RESULT_OK {
            return Err(FlashSettingsError::FlashOpFailed(rc));
        }
        Ok(Self)
    }

    fn erase_sector(&mut self, sector_addr: u32) -> Result<(), FlashSettingsError> {
        if !sector_addr.is_multiple_of(FLASH_SECTOR_SIZE) {
            return Err(FlashSettingsError::Unsupported);
        }

        let rc = unsafe { esp_rom_spiflash_erase_sector(sector_addr / FLASH_SECTOR_SIZE) };
        if rc != ESP_ROM_SPIFLASH_RESULT_OK {
            return Err(FlashSettingsError::FlashOpFailed(rc));
        }
        Ok(())
    }

    fn read_word(&mut self, addr: u32) -> Result<u32, FlashSettingsError> {
        if !addr.is_multiple_of(4) {
            return Err(FlashSettingsError::Unsupported);
        }

        let mut word = 0u32;
        let rc = unsafe { esp_rom_spiflash_read(addr, &mut word as *mut u32 as *const u32, 4) };
        if rc != ESP_ROM_SPIFLASH_RESULT_OK {
            return Err(FlashSettingsError::FlashOpFailed(rc));
        }
        Ok(word)
    }

    fn write_word(&mut self, addr: u32, word: u32) -> Result<(), FlashSettingsError> {
        if !addr.is_multiple_of(4) {
            return Err(FlashSettingsError::Unsupported);
        }

        let rc = unsafe { esp_rom_spiflash_write(addr, &word as *const u32, 4) };
        if rc != ESP_ROM_SPIFLASH_RESULT_OK {
            return Err(FlashSettingsError::FlashOpFailed(rc));
        }
        Ok(())
    }

    /// Unaligned read assembled from aligned words.
    fn read_bytes(&mut self, addr: u32, out: &mut [u8]) -> Result<(), FlashSettingsError> {
        let start = addr & !0b11;
        let end = (addr + out.len() as u32 + 3) & !0b11;

        for word_addr in (start..end).step_by(4) {
            let bytes = self.read_word(word_addr)?.to_le_bytes();
            for (i, b) in bytes.iter().enumerate() {
                let dst = (word_addr + i as u32).wrapping_sub(addr) as usize;
                if word_addr + (i as u32) >= addr && dst < out.len() {
                    out[dst] = *b;
                }
            }
        }
        Ok(())
    }

    /// Programs `data` at a word-aligned, freshly erased address.
    fn write_erased_bytes(&mut self, addr: u32, data: &[u8]) -> Result<(), FlashSettingsError> {
        if !addr.is_multiple_of(4) {
            return Err(FlashSettingsError::Unsupported);
        }

        for (index, chunk) in data.chunks(4).enumerate() {
            let mut bytes = [0xFFu8; 4];
            bytes[..chunk.len()].copy_from_slice(chunk);
            self.write_word(addr + index as u32 * 4, u32::from_le_bytes(bytes))?;
        }
        Ok(())
    }
}

impl ReadStorage for RawFlash {
    type Error = FlashSettingsError;

    fn read(&mut self, offset: u32, bytes: &mut [u8]) -> Result<(), Self::Error> {
        self.read_bytes(offset, bytes)
    }

    fn capacity(&self) -> usize {
        DEFAULT_FLASH_CAPACITY_BYTES
    }
}

impl Storage for RawFlash {
    fn write(&mut self, _offset: u32, _bytes: &[u8]) -> Result<(), Self::Error> {
        Err(FlashSettingsError::Unsupported)
    }
}

/// Settings slots kept as one [`SettingsRecord`] in the last sector of a
/// writable data partition. Writes are staged in RAM and reads see them;
/// `commit` rewrites the sector once when anything changed.
#[derive(Debug)]
pub struct FlashSettingsStore {
    flash: RawFlash,
    settings_sector_addr: u32,
    record: SettingsRecord,
    dirty: bool,
}

impl FlashSettingsStore {
    pub fn new() -> Result<Self, FlashSettingsError> {
        let mut flash = RawFlash::new()?;

        let mut table_buf = [0u8; PARTITION_TABLE_MAX_LEN];
        let table = read_partition_table(&mut flash, &mut table_buf)
            .map_err(|_| FlashSettingsError::PartitionTable)?;

        let mut best_data_undefined: Option<(u32, u32)> = None;
        let mut fallback_nvs: Option<(u32, u32)> = None;

        for entry in table.iter() {
            if entry.is_read_only() || entry.len() < FLASH_SECTOR_SIZE {
                continue;
            }

            match entry.partition_type() {
                PartitionType::Data(DataPartitionSubType::Undefined) => {
                    best_data_undefined = Some((entry.offset(), entry.len()));
                    break;
                }
                PartitionType::Data(DataPartitionSubType::Nvs) => {
                    if fallback_nvs.is_none() {
                        fallback_nvs = Some((entry.offset(), entry.len()));
                    }
                }
                _ => {}
            }
        }

        let (offset, len) = best_data_undefined
            .or(fallback_nvs)
            .ok_or(FlashSettingsError::SettingsPartitionMissing)?;

        if len < FLASH_SECTOR_SIZE {
            return Err(FlashSettingsError::PartitionTooSmall);
        }

        let settings_sector_addr = offset + len - FLASH_SECTOR_SIZE;
        let mut store = Self {
            flash,
            settings_sector_addr,
            record: SettingsRecord::empty(),
            dirty: false,
        };
        store.record = store.load_record()?;

        info!(
            "settings: flash sector 0x{:08X} record={}",
            settings_sector_addr,
            if store.record.is_empty() { "empty" } else { "present" }
        );
        Ok(store)
    }

    /// Reads the stored record; a corrupted one is discarded.
    fn load_record(&mut self) -> Result<SettingsRecord, FlashSettingsError> {
        let mut buf = [0u8; RECORD_LEN];
        self.flash.read_bytes(self.settings_sector_addr, &mut buf)?;

        match SettingsRecord::decode(&buf) {
            Ok(Some(record)) => Ok(record),
            Ok(None) => Ok(SettingsRecord::empty()),
            Err(err) => {
                warn!("settings: discarding stored record: {:?}", err);
                Ok(SettingsRecord::empty())
            }
        }
    }

    fn persist(&mut self, record: &SettingsRecord) -> Result<(), FlashSettingsError> {
        let bytes = record.encode();
        self.flash.erase_sector(self.settings_sector_addr)?;
        self.flash
            .write_erased_bytes(self.settings_sector_addr, &bytes)?;
        Ok(())
    }
}

impl SettingsStore for FlashSettingsStore {
    type Error = FlashSettingsError;

    fn read(&mut self, key: SettingKey) -> Result<Option<SettingValue>, Self::Error> {
        Ok(self.record.get(key))
    }

    fn write(&mut self, key: SettingKey, value: SettingValue) -> Result<(), Self::Error> {
        let mut next = self.record;
        next.set(key, value)?;
        if next != self.record {
            self.record = next;
            self.dirty = true;
        }
        Ok(())
    }

    fn commit(&mut self) -> Result<(), Self::Error> {
        if !self.dirty {
            return Ok(());
        }

        let record = self.record;
        self.persist(&record)?;
        self.dirty = false;
        info!("settings: record committed");
        Ok(())
    }
}
