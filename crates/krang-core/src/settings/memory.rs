use super::{RecordError, SettingKey, SettingValue, SettingsRecord, SettingsStore};

/// Volatile store; contents are lost on reset.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct MemorySettingsStore {
    record: SettingsRecord,
}

impl MemorySettingsStore {
    pub const fn new() -> Self {
        Self {
            record: SettingsRecord::empty(),
        }
    }

    pub const fn from_record(record: SettingsRecord) -> Self {
        Self { record }
    }

    pub const fn record(&self) -> &SettingsRecord {
        &self.record
    }
}

impl SettingsStore for MemorySettingsStore {
    type Error = RecordError;

    fn read(&mut self, key: SettingKey) -> Result<Option<SettingValue>, Self::Error> {
        Ok(self.record.get(key))
    }

    fn write(&mut self, key: SettingKey, value: SettingValue) -> Result<(), Self::Error> {
        self.record.set(key, value)
    }
}
