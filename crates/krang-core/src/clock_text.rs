//! Time and date labels.

use core::fmt::Write;

use chrono::{Datelike, NaiveDateTime, Timelike};
use embedded_graphics::{
    Drawable,
    draw_target::DrawTarget,
    geometry::{Point, Size},
    mono_font::{MonoFont, MonoTextStyle, ascii::FONT_6X13_BOLD},
    pixelcolor::Rgb888,
    text::{Alignment, Baseline, Text, TextStyleBuilder},
};

/// Fits the longest label, `"Www DD  | Mmm"` (13 bytes).
pub type Label = heapless::String<16>;

pub const TIME_FONT: &MonoFont<'static> = &profont::PROFONT_24_POINT;
pub const DATE_FONT: &MonoFont<'static> = &FONT_6X13_BOLD;

const TIME_BOX_HEIGHT: i32 = 42;
const TIME_BOX_BOTTOM_OFFSET: i32 = 15;
const DATE_BOX_OFFSET: i32 = 20;
const DATE_BOX_HEIGHT: i32 = 16;

const WEEKDAYS: [&str; 7] = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];
const MONTHS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// `HH:MM` on a 24-hour clock, `H:MM` on a 12-hour one.
pub fn time_label(time: &NaiveDateTime, use_24_hour: bool) -> Label {
    let mut label = Label::new();
    let written = if use_24_hour {
        write!(label, "{:02}:{:02}", time.hour(), time.minute())
    } else {
        let (_, hour) = time.hour12();
        write!(label, "{}:{:02}", hour, time.minute())
    };
    debug_assert!(written.is_ok(), "time label overflow");
    label
}

/// `Www DD  | Mmm`.
pub fn date_label(time: &NaiveDateTime) -> Label {
    let weekday = WEEKDAYS[time.weekday().num_days_from_monday() as usize % 7];
    let month = MONTHS[time.month0() as usize % 12];

    let mut label = Label::new();
    let written = write!(label, "{} {:02}  | {}", weekday, time.day(), month);
    debug_assert!(written.is_ok(), "date label overflow");
    label
}

/// Centre of the time text box.
pub fn time_anchor(bounds: Size) -> Point {
    let top = bounds.height as i32 - TIME_BOX_HEIGHT - TIME_BOX_BOTTOM_OFFSET;
    Point::new(bounds.width as i32 / 2, top + TIME_BOX_HEIGHT / 2)
}

/// Centre of the date text box.
pub fn date_anchor(bounds: Size) -> Point {
    let top = bounds.height as i32 / 2 + DATE_BOX_OFFSET;
    Point::new(bounds.width as i32 / 2, top + DATE_BOX_HEIGHT / 2)
}

pub fn draw_centered<D>(
    target: &mut D,
    text: &str,
    anchor: Point,
    font: &MonoFont<'_>,
    color: Rgb888,
) -> Result<(), D::Error>
where
    D: DrawTarget<Color = Rgb888>,
{
    let style = TextStyleBuilder::new()
        .alignment(Alignment::Center)
        .baseline(Baseline::Middle)
        .build();
    Text::with_text_style(text, anchor, MonoTextStyle::new(font, color), style).draw(target)?;
    Ok(())
}
