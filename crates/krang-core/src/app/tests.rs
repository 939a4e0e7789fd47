use std::cell::RefCell;

use chrono::{NaiveDate, NaiveDateTime};
use embedded_graphics::pixelcolor::RgbColor;

use super::*;
use crate::{
    color::{CHROME_YELLOW, INDIGO},
    flower::DrawPolicy,
    polygon::DrawMode,
    render::RenderError,
    settings::{MemorySettingsStore, RecordError, SettingKey, SettingValue, SettingsRecord},
    test_canvas::{Canvas, FailingCanvas},
};

const BOUNDS: Size = Size::new(176, 176);

fn app() -> WatchfaceApp<MemorySettingsStore> {
    WatchfaceApp::new(
        MemorySettingsStore::new(),
        WatchfaceConfig::default(),
        BOUNDS,
    )
}

fn noon() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2026, 10, 16)
        .unwrap()
        .and_hms_opt(12, 34, 0)
        .unwrap()
}

fn tuple(out: &mut Vec<u8>, key: u32, value: u32) {
    out.extend_from_slice(&key.to_le_bytes());
    out.push(2);
    out.extend_from_slice(&4u16.to_le_bytes());
    out.extend_from_slice(&value.to_le_bytes());
}

fn uint_message(tuples: &[(u32, u32)]) -> Vec<u8> {
    let mut out = vec![tuples.len() as u8];
    for (key, value) in tuples {
        tuple(&mut out, *key, *value);
    }
    out
}

fn rendered(app: &WatchfaceApp<MemorySettingsStore>) -> Canvas {
    let mut canvas = Canvas::new(BOUNDS.width, BOUNDS.height);
    app.render(&mut canvas).unwrap();
    canvas
}

fn count_in_rows(canvas: &Canvas, rows: core::ops::Range<i32>, color: Rgb888) -> usize {
    rows.flat_map(|y| (0..176).map(move |x| (x, y)))
        .filter(|(x, y)| canvas.pixel(*x, *y) == Some(color))
        .count()
}

#[test]
fn first_start_uses_defaults_and_requests_a_frame() {
    let mut app = app();
    assert_eq!(app.settings(), DisplaySettings::DEFAULT);
    assert_eq!(app.poll_redraw(), TickResult::RenderRequested);
    assert_eq!(app.poll_redraw(), TickResult::NoRender);
}

#[test]
fn persisted_settings_are_loaded_at_start() {
    let mut store = MemorySettingsStore::new();
    store
        .write(SettingKey::BackgroundColor, SettingValue::Color(0x000055))
        .unwrap();
    store
        .write(SettingKey::Customized, SettingValue::Flag(true))
        .unwrap();

    let app = WatchfaceApp::new(store, WatchfaceConfig::default(), BOUNDS);
    assert_eq!(app.settings().background_color, 0x000055);
    assert_eq!(app.settings().time_color, INDIGO);
}

#[test]
fn boots_from_a_stored_record() {
    let mut record = SettingsRecord::empty();
    record
        .set(SettingKey::Use24Hour, SettingValue::Flag(false))
        .unwrap();
    record
        .set(SettingKey::Customized, SettingValue::Flag(true))
        .unwrap();
    let stored = SettingsRecord::decode(&record.encode()).unwrap().unwrap();

    let app = WatchfaceApp::new(
        MemorySettingsStore::from_record(stored),
        WatchfaceConfig::default(),
        BOUNDS,
    );
    assert!(!app.settings().use_24_hour);
    assert_eq!(app.settings().background_color, CHROME_YELLOW);
}

struct SharedStore<'a>(&'a RefCell<MemorySettingsStore>);

impl SettingsStore for SharedStore<'_> {
    type Error = RecordError;

    fn read(&mut self, key: SettingKey) -> Result<Option<SettingValue>, Self::Error> {
        self.0.borrow_mut().read(key)
    }

    fn write(&mut self, key: SettingKey, value: SettingValue) -> Result<(), Self::Error> {
        self.0.borrow_mut().write(key, value)
    }
}

#[test]
fn external_store_changes_apply_after_reload() {
    let backing = RefCell::new(MemorySettingsStore::new());
    let mut app = WatchfaceApp::new(SharedStore(&backing), WatchfaceConfig::default(), BOUNDS);
    let _ = app.poll_redraw();

    {
        let mut store = backing.borrow_mut();
        store
            .write(SettingKey::DateColor, SettingValue::Color(0x00FF00))
            .unwrap();
        store
            .write(SettingKey::Customized, SettingValue::Flag(true))
            .unwrap();
    }
    assert_eq!(app.settings(), DisplaySettings::DEFAULT);

    app.on_settings_changed();
    assert_eq!(app.settings().date_color, 0x00FF00);
    assert_eq!(app.poll_redraw(), TickResult::RenderRequested);
}

#[test]
fn dirty_marks_coalesce_into_one_redraw() {
    let mut app = app();
    let _ = app.poll_redraw();

    app.on_tick(noon(), 1);
    app.on_battery(BatteryChargeState::new(80, false));
    app.on_connection(true);
    app.on_tick(noon(), 1);

    assert_eq!(app.poll_redraw(), TickResult::RenderRequested);
    assert_eq!(app.poll_redraw(), TickResult::NoRender);
}

#[test]
fn unchanged_status_does_not_request_a_frame() {
    let mut app = app();
    app.on_battery(BatteryChargeState::new(50, false));
    app.on_connection(true);
    let _ = app.poll_redraw();

    app.on_battery(BatteryChargeState::new(50, false));
    app.on_connection(true);
    assert_eq!(app.poll_redraw(), TickResult::NoRender);
}

#[test]
fn six_ticks_turn_the_flower_sixty_degrees() {
    let mut app = app();
    for _ in 0..6 {
        app.on_tick(noon(), 1);
    }
    assert_eq!(app.animation().step(), 6);
    assert_eq!(app.animation().angle_degrees(), 60);
    assert_eq!(app.now(), Some(noon()));
}

#[test]
fn partial_message_keeps_other_fields() {
    let mut app = app();
    app.on_message(&uint_message(&[(1, 0x00FF00), (3, 0)]))
        .unwrap();
    let before = app.settings();
    let _ = app.poll_redraw();

    app.on_message(&uint_message(&[(0, 0x112233)])).unwrap();

    let after = app.settings();
    assert_eq!(after.background_color, 0x112233);
    assert_eq!(after.time_color, before.time_color);
    assert_eq!(after.date_color, before.date_color);
    assert_eq!(after.use_24_hour, before.use_24_hour);
    assert_eq!(app.poll_redraw(), TickResult::RenderRequested);

    let mut store = *app.store();
    assert_eq!(load_persisted(&mut store), after);
}

#[test]
fn malformed_message_changes_nothing() {
    let mut app = app();
    let _ = app.poll_redraw();

    let mut bytes = uint_message(&[(0, 0x112233)]);
    bytes.truncate(bytes.len() - 1);

    assert_eq!(
        app.on_message(&bytes),
        Err(InboxError::Message(MessageError::Truncated))
    );
    assert_eq!(app.settings(), DisplaySettings::DEFAULT);
    assert!(app.store().record().is_empty());
    assert_eq!(app.poll_redraw(), TickResult::NoRender);
}

struct ReadOnlyStore;

impl SettingsStore for ReadOnlyStore {
    type Error = RecordError;

    fn read(&mut self, _key: SettingKey) -> Result<Option<SettingValue>, Self::Error> {
        Ok(None)
    }

    fn write(&mut self, _key: SettingKey, _value: SettingValue) -> Result<(), Self::Error> {
        Err(RecordError::Corrupted)
    }
}

#[test]
fn store_failure_is_reported_and_defaults_remain() {
    let mut app = WatchfaceApp::new(ReadOnlyStore, WatchfaceConfig::default(), BOUNDS);
    assert_eq!(
        app.on_message(&uint_message(&[(0, 0x112233)])),
        Err(InboxError::Store(RecordError::Corrupted))
    );
    assert_eq!(app.settings(), DisplaySettings::DEFAULT);
}

#[test]
fn frame_paints_background_status_and_labels() {
    let mut app = app();
    app.on_message(&uint_message(&[(1, 0x00FF00)])).unwrap();
    app.on_connection(true);
    app.on_tick(noon(), 1);

    let canvas = rendered(&app);
    let green = Rgb888::new(0, 255, 0);

    assert_eq!(canvas.pixel(2, 60), Some(color::to_rgb888(CHROME_YELLOW)));
    assert_eq!(canvas.pixel(152, 12), Some(color::to_rgb888(INDIGO)));
    assert_eq!(canvas.pixel(88, 55), Some(green));
    assert!(count_in_rows(&canvas, 120..165, green) > 0);
    assert!(count_in_rows(&canvas, 108..126, Rgb888::WHITE) > 0);
}

#[test]
fn labels_wait_for_the_first_tick() {
    let app = app();
    let canvas = rendered(&app);
    assert_eq!(count_in_rows(&canvas, 108..126, Rgb888::WHITE), 0);
}

#[test]
fn layer_list_controls_what_is_drawn() {
    static ONLY_GAUGE: [FaceLayer; 1] = [FaceLayer::Status(StatusLayer::BatteryGauge)];
    let app = WatchfaceApp::new(
        MemorySettingsStore::new(),
        WatchfaceConfig {
            layers: &ONLY_GAUGE,
            ..WatchfaceConfig::default()
        },
        BOUNDS,
    );

    let canvas = rendered(&app);
    assert_eq!(canvas.pixel(2, 60), None);
    assert_eq!(canvas.pixel(6, 6), Some(color::to_rgb888(INDIGO)));
}

#[test]
fn invalid_flower_skips_the_whole_frame() {
    let app = WatchfaceApp::new(
        MemorySettingsStore::new(),
        WatchfaceConfig {
            flower: FlowerConfig {
                sides: 2,
                ..FlowerConfig::default()
            },
            ..WatchfaceConfig::default()
        },
        BOUNDS,
    );

    let mut canvas = Canvas::new(BOUNDS.width, BOUNDS.height);
    assert_eq!(app.render(&mut canvas), Err(RenderError::InvalidArgument));
    assert_eq!(canvas.drawn_pixels(), 0);
}

#[test]
fn fixed_policy_fills_the_centre_polygon_on_even_steps() {
    let app = WatchfaceApp::new(
        MemorySettingsStore::new(),
        WatchfaceConfig {
            flower: FlowerConfig {
                policy: DrawPolicy::Fixed(DrawMode::Filled),
                ..FlowerConfig::default()
            },
            ..WatchfaceConfig::default()
        },
        BOUNDS,
    );
    assert_eq!(app.animation().step(), 0);

    let canvas = rendered(&app);
    assert_eq!(canvas.pixel(88, 55), Some(color::to_rgb888(INDIGO)));
}

#[test]
fn draw_errors_propagate() {
    let app = app();
    assert_eq!(app.render(&mut FailingCanvas), Err(RenderError::Draw(())));
}

#[test]
fn flower_sits_above_the_frame() {
    assert_eq!(flower_center(BOUNDS), Point::new(88.0, 55.0));
}
