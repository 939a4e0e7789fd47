use core::convert::Infallible;

use embedded_graphics_core::{
    Pixel,
    draw_target::DrawTarget,
    geometry::{OriginDimensions, Size},
    pixelcolor::{Rgb888, RgbColor},
};

use crate::{Color3, FrameBuffer, protocol};

impl From<Rgb888> for Color3 {
    fn from(color: Rgb888) -> Self {
        Color3::from_channels(color.r() >= 0x80, color.g() >= 0x80, color.b() >= 0x80)
    }
}

impl DrawTarget for FrameBuffer {
    type Color = Rgb888;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(point, color) in pixels {
            if point.x < 0 || point.y < 0 {
                continue;
            }

            let x = point.x as usize;
            let y = point.y as usize;
            let _ = self.set_pixel(x, y, color.into());
        }

        Ok(())
    }
}

impl OriginDimensions for FrameBuffer {
    fn size(&self) -> Size {
        Size::new(protocol::WIDTH as u32, protocol::HEIGHT as u32)
    }
}

#[cfg(test)]
mod tests {
    use embedded_graphics_core::geometry::Point;

    use super::*;

    #[test]
    fn channels_threshold_at_half_intensity() {
        assert_eq!(Color3::from(Rgb888::new(0xFF, 0xAA, 0x00)), Color3::YELLOW);
        assert_eq!(Color3::from(Rgb888::new(0x55, 0x00, 0xAA)), Color3::BLUE);
        assert_eq!(Color3::from(Rgb888::new(0x7F, 0x7F, 0x7F)), Color3::BLACK);
    }

    #[test]
    fn negative_coordinates_are_skipped() {
        let mut fb = FrameBuffer::new();
        let pixels = [
            Pixel(Point::new(-1, 0), Rgb888::WHITE),
            Pixel(Point::new(2, 2), Rgb888::RED),
        ];

        fb.draw_iter(pixels).unwrap();
        assert_eq!(fb.pixel(0, 0), Some(Color3::BLACK));
        assert_eq!(fb.pixel(2, 2), Some(Color3::RED));
    }
}
