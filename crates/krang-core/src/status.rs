//! Border frame, date plate, battery gauge and link glyphs.
//!
//! Every layer is a pure function of the [`StatusSnapshot`]; the caller picks
//! the order, and later layers paint over earlier ones.

use embedded_graphics::{
    Drawable,
    draw_target::DrawTarget,
    geometry::{Point, Size},
    pixelcolor::Rgb888,
    primitives::{
        Line, Primitive, PrimitiveStyle, PrimitiveStyleBuilder, Rectangle, RoundedRectangle,
        StrokeAlignment,
    },
};

use crate::{
    battery::BatteryChargeState,
    color::{self, BLACK, FASHION_MAGENTA, INDIGO, ORANGE, WHITE},
};

pub const MARGIN: i32 = 6;
pub const BORDER_HEIGHT: u32 = 60;
pub const BORDER_INSET: i32 = 2;
pub const BORDER_CORNER_RADIUS: u32 = 15;
pub const INNER_BORDER_STROKE: u32 = 4;

pub const GAUGE_WIDTH: u32 = 15;
pub const GAUGE_HEIGHT: u32 = 11;
pub const GAUGE_FILL_HEIGHT: u32 = 10;

pub const BLUETOOTH_WIDTH: i32 = 18;

const DATE_PLATE_OFFSET: i32 = 23;
const DATE_PLATE_HEIGHT: u32 = 14;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum StatusLayer {
    InnerBorder,
    OuterBorder,
    DateBackground,
    BatteryGauge,
    ChargingGlyph,
    BluetoothGlyph,
}

impl StatusLayer {
    pub const DEFAULT_ORDER: [StatusLayer; 6] = [
        StatusLayer::InnerBorder,
        StatusLayer::OuterBorder,
        StatusLayer::DateBackground,
        StatusLayer::BatteryGauge,
        StatusLayer::ChargingGlyph,
        StatusLayer::BluetoothGlyph,
    ];
}

/// Packed `0xRRGGBB` colour per layer part.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct StatusPalette {
    pub inner_border: u32,
    pub outer_border: u32,
    pub date_background: u32,
    pub gauge_fill: u32,
    pub gauge_outline: u32,
    pub charging_glyph: u32,
    pub bluetooth_glyph: u32,
}

impl Default for StatusPalette {
    fn default() -> Self {
        Self {
            inner_border: ORANGE,
            outer_border: BLACK,
            date_background: INDIGO,
            gauge_fill: FASHION_MAGENTA,
            gauge_outline: INDIGO,
            charging_glyph: WHITE,
            bluetooth_glyph: INDIGO,
        }
    }
}

/// The fields of the render state the status layers read.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct StatusSnapshot {
    pub battery: BatteryChargeState,
    pub connected: bool,
}

/// Screen positions derived from the canvas size.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct StatusLayout {
    bounds: Size,
}

impl StatusLayout {
    pub const fn new(bounds: Size) -> Self {
        Self { bounds }
    }

    pub const fn bounds(&self) -> Size {
        self.bounds
    }

    fn width(&self) -> i32 {
        self.bounds.width as i32
    }

    fn height(&self) -> i32 {
        self.bounds.height as i32
    }

    pub fn outer_border(&self) -> Rectangle {
        Rectangle::new(
            Point::new(MARGIN, self.height() - BORDER_HEIGHT as i32 - MARGIN),
            Size::new(
                self.bounds.width.saturating_sub(2 * MARGIN as u32),
                BORDER_HEIGHT,
            ),
        )
    }

    pub fn inner_border(&self) -> Rectangle {
        let outer = self.outer_border();
        let inset = 2 * BORDER_INSET as u32;
        Rectangle::new(
            outer.top_left + Point::new(BORDER_INSET, BORDER_INSET),
            Size::new(
                outer.size.width.saturating_sub(inset),
                outer.size.height.saturating_sub(inset),
            ),
        )
    }

    pub fn date_background(&self) -> Rectangle {
        Rectangle::new(
            Point::new(2 * MARGIN, self.height() / 2 + DATE_PLATE_OFFSET),
            Size::new(
                self.bounds.width.saturating_sub(4 * MARGIN as u32),
                DATE_PLATE_HEIGHT,
            ),
        )
    }

    pub fn gauge_outline(&self) -> Rectangle {
        Rectangle::new(
            Point::new(MARGIN, MARGIN),
            Size::new(GAUGE_WIDTH, GAUGE_HEIGHT),
        )
    }

    pub fn gauge_fill(&self, battery: &BatteryChargeState) -> Rectangle {
        Rectangle::new(
            Point::new(MARGIN, MARGIN),
            Size::new(gauge_fill_width(battery), GAUGE_FILL_HEIGHT),
        )
    }

    pub fn gauge_cap(&self) -> Rectangle {
        Rectangle::new(
            Point::new(MARGIN + GAUGE_WIDTH as i32, MARGIN + 3),
            Size::new(2, 4),
        )
    }

    /// Left end of the plug's cord.
    pub fn charging_anchor(&self) -> Point {
        self.gauge_outline().top_left + Point::new(3, 5)
    }

    /// Left end of the rune's horizontal stroke.
    pub fn bluetooth_pivot(&self) -> Point {
        Point::new(self.width() - MARGIN - BLUETOOTH_WIDTH, MARGIN + 6)
    }
}

/// Filled width of the gauge, truncated; a charging battery reads full.
pub fn gauge_fill_width(battery: &BatteryChargeState) -> u32 {
    GAUGE_WIDTH * battery.display_percent() as u32 / 100
}

fn stroke(color: u32, width: u32) -> PrimitiveStyle<Rgb888> {
    PrimitiveStyleBuilder::new()
        .stroke_color(color::to_rgb888(color))
        .stroke_width(width)
        .build()
}

fn hairline(color: u32) -> PrimitiveStyle<Rgb888> {
    PrimitiveStyleBuilder::new()
        .stroke_color(color::to_rgb888(color))
        .stroke_width(1)
        .stroke_alignment(StrokeAlignment::Inside)
        .build()
}

fn line<D>(target: &mut D, from: Point, to: Point, color: u32) -> Result<(), D::Error>
where
    D: DrawTarget<Color = Rgb888>,
{
    Line::new(from, to)
        .into_styled(PrimitiveStyle::with_stroke(color::to_rgb888(color), 1))
        .draw(target)
}

pub fn draw_layer<D>(
    target: &mut D,
    layer: StatusLayer,
    layout: &StatusLayout,
    snapshot: &StatusSnapshot,
    palette: &StatusPalette,
) -> Result<(), D::Error>
where
    D: DrawTarget<Color = Rgb888>,
{
    let corners = Size::new(BORDER_CORNER_RADIUS, BORDER_CORNER_RADIUS);

    match layer {
        StatusLayer::InnerBorder => {
            RoundedRectangle::with_equal_corners(layout.inner_border(), corners)
                .into_styled(stroke(palette.inner_border, INNER_BORDER_STROKE))
                .draw(target)?;
        }
        StatusLayer::OuterBorder => {
            RoundedRectangle::with_equal_corners(layout.outer_border(), corners)
                .into_styled(hairline(palette.outer_border))
                .draw(target)?;
        }
        StatusLayer::DateBackground => {
            layout
                .date_background()
                .into_styled(PrimitiveStyle::with_fill(color::to_rgb888(
                    palette.date_background,
                )))
                .draw(target)?;
        }
        StatusLayer::BatteryGauge => {
            layout
                .gauge_fill(&snapshot.battery)
                .into_styled(PrimitiveStyle::with_fill(color::to_rgb888(palette.gauge_fill)))
                .draw(target)?;
            layout
                .gauge_outline()
                .into_styled(hairline(palette.gauge_outline))
                .draw(target)?;
            layout
                .gauge_cap()
                .into_styled(hairline(palette.gauge_outline))
                .draw(target)?;
        }
        StatusLayer::ChargingGlyph => {
            if !snapshot.battery.is_charging {
                return Ok(());
            }
            let color = palette.charging_glyph;
            let from = layout.charging_anchor();
            let to = from + Point::new(3, 0);

            line(target, from, to, color)?;
            Rectangle::new(to - Point::new(0, 2), Size::new(3, 5))
                .into_styled(hairline(color))
                .draw(target)?;
            line(target, to + Point::new(3, -1), to + Point::new(4, -1), color)?;
            line(target, to + Point::new(3, 1), to + Point::new(4, 1), color)?;
        }
        StatusLayer::BluetoothGlyph => {
            if !snapshot.connected {
                return Ok(());
            }
            let color = palette.bluetooth_glyph;
            let pivot = layout.bluetooth_pivot();
            let tip = pivot + Point::new(BLUETOOTH_WIDTH, 0);
            let upper_right = pivot + Point::new(BLUETOOTH_WIDTH - 5, -5);
            let upper_left = pivot + Point::new(5, -5);

            line(target, pivot, tip, color)?;
            line(target, tip, upper_right, color)?;
            line(target, pivot + Point::new(5, 3), upper_right, color)?;
            line(target, pivot, upper_left, color)?;
            line(
                target,
                pivot + Point::new(BLUETOOTH_WIDTH - 5, 3),
                upper_left,
                color,
            )?;
        }
    }

    Ok(())
}

/// Draws `order` front to back; repeated layers are drawn again.
pub fn render_status<D>(
    target: &mut D,
    order: &[StatusLayer],
    layout: &StatusLayout,
    snapshot: &StatusSnapshot,
    palette: &StatusPalette,
) -> Result<(), D::Error>
where
    D: DrawTarget<Color = Rgb888>,
{
    for layer in order {
        draw_layer(target, *layer, layout, snapshot, palette)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_canvas::Canvas;

    const SIZE: Size = Size::new(176, 176);

    fn render(order: &[StatusLayer], snapshot: StatusSnapshot) -> Canvas {
        let mut canvas = Canvas::new(SIZE.width, SIZE.height);
        render_status(
            &mut canvas,
            order,
            &StatusLayout::new(SIZE),
            &snapshot,
            &StatusPalette::default(),
        )
        .unwrap();
        canvas
    }

    fn snapshot(percent: u8, charging: bool, connected: bool) -> StatusSnapshot {
        StatusSnapshot {
            battery: BatteryChargeState::new(percent, charging),
            connected,
        }
    }

    #[test]
    fn gauge_width_truncates_and_charging_reads_full() {
        for pct in 0..=100u8 {
            let discharging = BatteryChargeState::new(pct, false);
            assert_eq!(gauge_fill_width(&discharging), 15 * pct as u32 / 100);
            assert_eq!(gauge_fill_width(&BatteryChargeState::new(pct, true)), 15);
        }
        assert_eq!(gauge_fill_width(&BatteryChargeState::new(99, false)), 14);
        assert_eq!(gauge_fill_width(&BatteryChargeState::new(6, false)), 0);
    }

    #[test]
    fn layout_matches_canvas_geometry() {
        let layout = StatusLayout::new(SIZE);
        assert_eq!(
            layout.outer_border(),
            Rectangle::new(Point::new(6, 110), Size::new(164, 60))
        );
        assert_eq!(
            layout.inner_border(),
            Rectangle::new(Point::new(8, 112), Size::new(160, 56))
        );
        assert_eq!(
            layout.date_background(),
            Rectangle::new(Point::new(12, 111), Size::new(152, 14))
        );
        assert_eq!(layout.bluetooth_pivot(), Point::new(152, 12));
        assert_eq!(layout.charging_anchor(), Point::new(9, 11));
    }

    #[test]
    fn gauge_fill_sits_under_outline() {
        let canvas = render(&[StatusLayer::BatteryGauge], snapshot(60, false, false));
        let magenta = color::to_rgb888(FASHION_MAGENTA);
        let indigo = color::to_rgb888(INDIGO);

        assert_eq!(canvas.pixel(6, 6), Some(indigo));
        assert_eq!(canvas.pixel(8, 8), Some(magenta));
        // 15 * 60 / 100 = 9 columns, x = 6..=14
        assert_eq!(canvas.pixel(14, 8), Some(magenta));
        assert_eq!(canvas.pixel(15, 8), None);
        assert_eq!(canvas.pixel(21, 9), Some(indigo));
    }

    #[test]
    fn charging_glyph_only_while_charging() {
        let white = color::to_rgb888(WHITE);
        let order = [StatusLayer::ChargingGlyph];

        assert_eq!(render(&order, snapshot(40, false, false)).count_color(white), 0);

        let canvas = render(&order, snapshot(40, true, false));
        assert_eq!(canvas.pixel(9, 11), Some(white));
        assert_eq!(canvas.pixel(12, 9), Some(white));
        assert_eq!(canvas.pixel(16, 10), Some(white));
        assert_eq!(canvas.pixel(16, 12), Some(white));
    }

    #[test]
    fn bluetooth_glyph_only_while_connected() {
        let order = [StatusLayer::BluetoothGlyph];
        assert_eq!(render(&order, snapshot(50, false, false)).drawn_pixels(), 0);

        let canvas = render(&order, snapshot(50, false, true));
        let indigo = color::to_rgb888(INDIGO);
        for (x, y) in [(152, 12), (170, 12), (165, 7), (157, 7), (157, 15), (165, 15)] {
            assert_eq!(canvas.pixel(x, y), Some(indigo), "({x}, {y})");
        }
    }

    #[test]
    fn later_layers_paint_over_earlier_ones() {
        let state = snapshot(50, false, false);
        let black = color::to_rgb888(BLACK);
        let orange = color::to_rgb888(ORANGE);

        let default = render(&StatusLayer::DEFAULT_ORDER, state);
        assert_eq!(default.pixel(6, 140), Some(black));
        assert_eq!(default.pixel(8, 140), Some(orange));

        let swapped = render(
            &[StatusLayer::OuterBorder, StatusLayer::InnerBorder],
            state,
        );
        assert_eq!(swapped.pixel(6, 140), Some(orange));
    }

    #[test]
    fn rendering_is_repeatable() {
        let state = snapshot(73, true, true);
        let first = render(&StatusLayer::DEFAULT_ORDER, state);
        let second = render(&StatusLayer::DEFAULT_ORDER, state);
        for y in 0..176 {
            for x in 0..176 {
                assert_eq!(first.pixel(x, y), second.pixel(x, y));
            }
        }
    }
}
