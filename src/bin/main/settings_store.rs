use krang_core::settings::{MemorySettingsStore, SettingKey, SettingValue, SettingsStore};
use krang_hal_esp32s3::storage::flash_settings::{FlashSettingsError, FlashSettingsStore};
use log::{info, warn};

/// Flash-backed store, or a RAM store when no settings partition is usable.
#[derive(Debug)]
pub enum BootSettingsStore {
    Flash(FlashSettingsStore),
    Volatile(MemorySettingsStore),
}

impl BootSettingsStore {
    pub fn open() -> Self {
        match FlashSettingsStore::new() {
            Ok(store) => Self::Flash(store),
            Err(err) => {
                warn!("settings: flash store unavailable ({:?}); changes will not persist", err);
                Self::Volatile(MemorySettingsStore::new())
            }
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Flash(_) => "flash",
            Self::Volatile(_) => "volatile",
        }
    }
}

impl SettingsStore for BootSettingsStore {
    type Error = FlashSettingsError;

    fn read(&mut self, key: SettingKey) -> Result<Option<SettingValue>, Self::Error> {
        match self {
            Self::Flash(store) => store.read(key),
            Self::Volatile(store) => store.read(key).map_err(FlashSettingsError::from),
        }
    }

    fn write(&mut self, key: SettingKey, value: SettingValue) -> Result<(), Self::Error> {
        let result = match self {
            Self::Flash(store) => store.write(key, value),
            Self::Volatile(store) => store.write(key, value).map_err(FlashSettingsError::from),
        };
        if result.is_ok() {
            info!("settings: staged {:?} = {:?}", key, value);
        }
        result
    }

    fn commit(&mut self) -> Result<(), Self::Error> {
        match self {
            Self::Flash(store) => store.commit(),
            Self::Volatile(store) => store.commit().map_err(FlashSettingsError::from),
        }
    }
}
