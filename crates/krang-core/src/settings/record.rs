use super::{SettingKey, SettingValue};

const MAGIC: [u8; 4] = *b"KRF1";
const VERSION: u8 = 1;
const CHECKSUM_OFFSET: usize = 20;

/// Encoded size of a [`SettingsRecord`].
pub const RECORD_LEN: usize = 24;

const FLAG_USE_24_HOUR: u8 = 0x01;
const FLAG_CUSTOMIZED: u8 = 0x02;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum RecordError {
    /// Checksum or length mismatch.
    Corrupted,
    /// A colour written to a flag slot or the other way round.
    TypeMismatch,
}

/// All slots of the settings store in one fixed-size block.
///
/// Layout (little endian): magic `KRF1`, version, presence mask (one bit per
/// [`SettingKey`]), flag bits, reserved byte, background/time/date colours,
/// FNV-1a checksum of the preceding 20 bytes.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct SettingsRecord {
    present: u8,
    flags: u8,
    colors: [u32; 3],
}

impl SettingsRecord {
    pub const fn empty() -> Self {
        Self {
            present: 0,
            flags: 0,
            colors: [0; 3],
        }
    }

    const fn presence_bit(key: SettingKey) -> u8 {
        1 << key as u8
    }

    const fn color_index(key: SettingKey) -> Option<usize> {
        match key {
            SettingKey::BackgroundColor => Some(0),
            SettingKey::TimeColor => Some(1),
            SettingKey::DateColor => Some(2),
            SettingKey::Use24Hour | SettingKey::Customized => None,
        }
    }

    const fn flag_bit(key: SettingKey) -> u8 {
        match key {
            SettingKey::Customized => FLAG_CUSTOMIZED,
            _ => FLAG_USE_24_HOUR,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.present == 0
    }

    pub fn get(&self, key: SettingKey) -> Option<SettingValue> {
        if self.present & Self::presence_bit(key) == 0 {
            return None;
        }

        Some(match Self::color_index(key) {
            Some(index) => SettingValue::Color(self.colors[index]),
            None => SettingValue::Flag(self.flags & Self::flag_bit(key) != 0),
        })
    }

    pub fn set(&mut self, key: SettingKey, value: SettingValue) -> Result<(), RecordError> {
        match (Self::color_index(key), value) {
            (Some(index), SettingValue::Color(color)) => self.colors[index] = color & 0x00FF_FFFF,
            (None, SettingValue::Flag(flag)) => {
                let bit = Self::flag_bit(key);
                if flag {
                    self.flags |= bit;
                } else {
                    self.flags &= !bit;
                }
            }
            _ => return Err(RecordError::TypeMismatch),
        }

        self.present |= Self::presence_bit(key);
        Ok(())
    }

    pub fn encode(&self) -> [u8; RECORD_LEN] {
        let mut buf = [0u8; RECORD_LEN];
        buf[0..4].copy_from_slice(&MAGIC);
        buf[4] = VERSION;
        buf[5] = self.present;
        buf[6] = self.flags;
        for (index, color) in self.colors.iter().enumerate() {
            let at = 8 + index * 4;
            buf[at..at + 4].copy_from_slice(&color.to_le_bytes());
        }
        let checksum = checksum32(&buf[..CHECKSUM_OFFSET]);
        buf[CHECKSUM_OFFSET..].copy_from_slice(&checksum.to_le_bytes());
        buf
    }

    /// `Ok(None)` for erased flash, a foreign magic or an unknown version.
    pub fn decode(buf: &[u8]) -> Result<Option<Self>, RecordError> {
        if buf.len() < RECORD_LEN {
            return Err(RecordError::Corrupted);
        }
        let buf = &buf[..RECORD_LEN];

        if buf.iter().all(|b| *b == 0xFF) || buf[0..4] != MAGIC || buf[4] != VERSION {
            return Ok(None);
        }

        let expected = u32::from_le_bytes([buf[20], buf[21], buf[22], buf[23]]);
        if checksum32(&buf[..CHECKSUM_OFFSET]) != expected {
            return Err(RecordError::Corrupted);
        }

        let mut colors = [0u32; 3];
        for (index, color) in colors.iter_mut().enumerate() {
            let at = 8 + index * 4;
            *color = u32::from_le_bytes([buf[at], buf[at + 1], buf[at + 2], buf[at + 3]]);
        }

        Ok(Some(Self {
            present: buf[5] & 0x1F,
            flags: buf[6] & (FLAG_USE_24_HOUR | FLAG_CUSTOMIZED),
            colors,
        }))
    }
}

/// 32-bit FNV-1a.
pub fn checksum32(bytes: &[u8]) -> u32 {
    let mut hash = 0x811C9DC5u32;
    for b in bytes {
        hash ^= *b as u32;
        hash = hash.wrapping_mul(16777619);
    }
    hash
}
