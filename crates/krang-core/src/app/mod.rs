//! Watchface state machine driven by host callbacks.

use chrono::NaiveDateTime;
use embedded_graphics::{draw_target::DrawTarget, geometry::Size, pixelcolor::Rgb888};
use log::{debug, info, warn};

use crate::{
    battery::BatteryChargeState,
    clock_text::{
        DATE_FONT, TIME_FONT, date_anchor, date_label, draw_centered, time_anchor, time_label,
    },
    color,
    flower::{AnimationState, Direction, Flower, FlowerConfig},
    geometry::Point,
    message::{MessageError, decode_settings_update},
    render::{RenderError, TickResult},
    settings::{
        DisplaySettings, SettingsStore, SettingsUpdate, apply_incoming_settings, load_persisted,
    },
    status::{StatusLayer, StatusLayout, StatusPalette, StatusSnapshot, draw_layer},
};

/// One entry of the frame's paint order.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum FaceLayer {
    /// Fills the whole canvas with the background colour.
    Background,
    Status(StatusLayer),
    Flower,
    Time,
    Date,
}

pub const DEFAULT_LAYERS: [FaceLayer; 10] = [
    FaceLayer::Background,
    FaceLayer::Status(StatusLayer::InnerBorder),
    FaceLayer::Status(StatusLayer::OuterBorder),
    FaceLayer::Status(StatusLayer::DateBackground),
    FaceLayer::Status(StatusLayer::BatteryGauge),
    FaceLayer::Status(StatusLayer::ChargingGlyph),
    FaceLayer::Status(StatusLayer::BluetoothGlyph),
    FaceLayer::Flower,
    FaceLayer::Time,
    FaceLayer::Date,
];

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WatchfaceConfig {
    pub flower: FlowerConfig,
    pub direction: Direction,
    pub layers: &'static [FaceLayer],
    pub status_palette: StatusPalette,
}

impl Default for WatchfaceConfig {
    fn default() -> Self {
        Self {
            flower: FlowerConfig::default(),
            direction: Direction::Forward,
            layers: &DEFAULT_LAYERS,
            status_palette: StatusPalette::default(),
        }
    }
}

/// Everything a frame reads besides the animation step and the clock.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct RenderState {
    pub bounds: Size,
    pub battery: BatteryChargeState,
    pub connected: bool,
    pub settings: DisplaySettings,
}

impl RenderState {
    pub const fn status_snapshot(&self) -> StatusSnapshot {
        StatusSnapshot {
            battery: self.battery,
            connected: self.connected,
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum InboxError<E> {
    Message(MessageError),
    Store(E),
}

pub struct WatchfaceApp<S>
where
    S: SettingsStore,
{
    store: S,
    config: WatchfaceConfig,
    flower: Flower,
    state: RenderState,
    animation: AnimationState,
    now: Option<NaiveDateTime>,
    pending_redraw: bool,
}

include!("runtime.rs");
include!("view.rs");

#[cfg(test)]
mod tests;
