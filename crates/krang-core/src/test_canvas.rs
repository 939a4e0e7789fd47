use core::convert::Infallible;

use embedded_graphics::{
    Pixel,
    draw_target::DrawTarget,
    geometry::{OriginDimensions, Size},
    pixelcolor::Rgb888,
};

/// Recording draw target; pixels never written stay `None`.
pub struct Canvas {
    width: u32,
    height: u32,
    pixels: Vec<Option<Rgb888>>,
}

impl Canvas {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![None; (width * height) as usize],
        }
    }

    fn index(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 || x as u32 >= self.width || y as u32 >= self.height {
            return None;
        }
        Some(y as usize * self.width as usize + x as usize)
    }

    pub fn pixel(&self, x: i32, y: i32) -> Option<Rgb888> {
        self.index(x, y).and_then(|i| self.pixels[i])
    }

    pub fn drawn_pixels(&self) -> usize {
        self.pixels.iter().filter(|p| p.is_some()).count()
    }

    pub fn count_color(&self, color: Rgb888) -> usize {
        self.pixels.iter().filter(|p| **p == Some(color)).count()
    }
}

impl OriginDimensions for Canvas {
    fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }
}

impl DrawTarget for Canvas {
    type Color = Rgb888;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(point, color) in pixels {
            if let Some(i) = self.index(point.x, point.y) {
                self.pixels[i] = Some(color);
            }
        }
        Ok(())
    }
}

/// Draw target whose every draw call fails.
pub struct FailingCanvas;

impl OriginDimensions for FailingCanvas {
    fn size(&self) -> Size {
        Size::new(176, 176)
    }
}

impl DrawTarget for FailingCanvas {
    type Color = Rgb888;
    type Error = ();

    fn draw_iter<I>(&mut self, _pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        Err(())
    }
}
