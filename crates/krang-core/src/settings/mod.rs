//! Persisted display settings.
//!
//! The backing store exposes four independent scalar slots plus a
//! "customized" flag. Until that flag is set the compiled-in defaults win,
//! and each slot falls back to its own default when it cannot be read.

mod memory;
mod record;

use core::fmt::Debug;

use log::{debug, info, warn};

pub use memory::MemorySettingsStore;
pub use record::{RECORD_LEN, RecordError, SettingsRecord, checksum32};

use crate::color::{CHROME_YELLOW, INDIGO, WHITE, mask_rgb};

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct DisplaySettings {
    pub background_color: u32,
    pub time_color: u32,
    pub date_color: u32,
    pub use_24_hour: bool,
}

impl DisplaySettings {
    pub const DEFAULT: Self = Self {
        background_color: CHROME_YELLOW,
        time_color: INDIGO,
        date_color: WHITE,
        use_24_hour: true,
    };

    fn default_for(key: SettingKey) -> SettingValue {
        let defaults = Self::DEFAULT;
        match key {
            SettingKey::BackgroundColor => SettingValue::Color(defaults.background_color),
            SettingKey::TimeColor => SettingValue::Color(defaults.time_color),
            SettingKey::DateColor => SettingValue::Color(defaults.date_color),
            SettingKey::Use24Hour => SettingValue::Flag(defaults.use_24_hour),
            SettingKey::Customized => SettingValue::Flag(false),
        }
    }
}

impl Default for DisplaySettings {
    fn default() -> Self {
        Self::DEFAULT
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SettingKey {
    BackgroundColor,
    TimeColor,
    DateColor,
    Use24Hour,
    /// Set once any update has been applied.
    Customized,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SettingValue {
    /// Packed `0xRRGGBB`.
    Color(u32),
    Flag(bool),
}

/// Sparse change set; `None` leaves the stored slot untouched.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct SettingsUpdate {
    pub background_color: Option<u32>,
    pub time_color: Option<u32>,
    pub date_color: Option<u32>,
    pub use_24_hour: Option<bool>,
}

impl SettingsUpdate {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Present fields as store writes, in slot order.
    pub fn writes(&self) -> impl Iterator<Item = (SettingKey, SettingValue)> {
        [
            self.background_color
                .map(|c| (SettingKey::BackgroundColor, SettingValue::Color(mask_rgb(c)))),
            self.time_color
                .map(|c| (SettingKey::TimeColor, SettingValue::Color(mask_rgb(c)))),
            self.date_color
                .map(|c| (SettingKey::DateColor, SettingValue::Color(mask_rgb(c)))),
            self.use_24_hour
                .map(|f| (SettingKey::Use24Hour, SettingValue::Flag(f))),
        ]
        .into_iter()
        .flatten()
    }
}

/// Key/value persistence backend.
pub trait SettingsStore {
    type Error: Debug;

    fn read(&mut self, key: SettingKey) -> Result<Option<SettingValue>, Self::Error>;
    /// Stages one slot; backends may hold it until [`SettingsStore::commit`].
    fn write(&mut self, key: SettingKey, value: SettingValue) -> Result<(), Self::Error>;

    /// Makes staged writes durable in one step.
    fn commit(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}

fn read_or_default<S>(store: &mut S, key: SettingKey) -> SettingValue
where
    S: SettingsStore,
{
    let fallback = DisplaySettings::default_for(key);
    match store.read(key) {
        Ok(Some(value)) if core::mem::discriminant(&value) == core::mem::discriminant(&fallback) => {
            value
        }
        Ok(Some(value)) => {
            warn!("settings: {:?} holds {:?}, using default", key, value);
            fallback
        }
        Ok(None) => fallback,
        Err(err) => {
            warn!("settings: read {:?} failed: {:?}", key, err);
            fallback
        }
    }
}

fn color_or_default<S: SettingsStore>(store: &mut S, key: SettingKey, default: u32) -> u32 {
    match read_or_default(store, key) {
        SettingValue::Color(color) => mask_rgb(color),
        SettingValue::Flag(_) => default,
    }
}

fn flag_or_default<S: SettingsStore>(store: &mut S, key: SettingKey, default: bool) -> bool {
    match read_or_default(store, key) {
        SettingValue::Flag(flag) => flag,
        SettingValue::Color(_) => default,
    }
}

/// Current settings; never fails.
pub fn load_persisted<S>(store: &mut S) -> DisplaySettings
where
    S: SettingsStore,
{
    let defaults = DisplaySettings::DEFAULT;
    if !flag_or_default(store, SettingKey::Customized, false) {
        debug!("settings: not customized, using defaults");
        return defaults;
    }

    DisplaySettings {
        background_color: color_or_default(
            store,
            SettingKey::BackgroundColor,
            defaults.background_color,
        ),
        time_color: color_or_default(store, SettingKey::TimeColor, defaults.time_color),
        date_color: color_or_default(store, SettingKey::DateColor, defaults.date_color),
        use_24_hour: flag_or_default(store, SettingKey::Use24Hour, defaults.use_24_hour),
    }
}

fn stage_update<S>(store: &mut S, update: &SettingsUpdate) -> Result<(), S::Error>
where
    S: SettingsStore,
{
    for (key, value) in update.writes() {
        store.write(key, value)?;
        debug!("settings: {:?} <- {:?}", key, value);
    }
    store.write(SettingKey::Customized, SettingValue::Flag(true))
}

/// Writes each present field on its own, marks the store customized,
/// commits once and returns the reloaded settings.
///
/// A write failure stops at the failing field; fields staged before it are
/// still committed.
pub fn apply_incoming_settings<S>(
    store: &mut S,
    update: &SettingsUpdate,
) -> Result<DisplaySettings, S::Error>
where
    S: SettingsStore,
{
    let staged = stage_update(store, update);
    let committed = store.commit();
    staged?;
    committed?;

    let settings = load_persisted(store);
    info!(
        "settings: applied bg=#{:06X} time=#{:06X} date=#{:06X} 24h={}",
        settings.background_color, settings.time_color, settings.date_color, settings.use_24_hour
    );
    Ok(settings)
}
