//! In-memory framebuffer for LPM013M126.

use core::convert::TryFrom;

use crate::protocol::{BITS_PER_PIXEL, BUFFER_SIZE, HEIGHT, LINE_BYTES, WIDTH};

/// One panel pixel in 3-bit colour: bit 2 = red, bit 1 = green, bit 0 = blue.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Color3(u8);

impl Color3 {
    pub const BLACK: Self = Self(0b000);
    pub const BLUE: Self = Self(0b001);
    pub const GREEN: Self = Self(0b010);
    pub const CYAN: Self = Self(0b011);
    pub const RED: Self = Self(0b100);
    pub const MAGENTA: Self = Self(0b101);
    pub const YELLOW: Self = Self(0b110);
    pub const WHITE: Self = Self(0b111);

    pub const fn from_bits(bits: u8) -> Self {
        Self(bits & 0b111)
    }

    pub const fn from_channels(red: bool, green: bool, blue: bool) -> Self {
        Self(((red as u8) << 2) | ((green as u8) << 1) | blue as u8)
    }

    pub const fn bits(self) -> u8 {
        self.0
    }
}

/// 3bpp framebuffer for the panel.
///
/// Pixels are packed back to back in wire order: red, green, blue, with the
/// first bit of a line in bit 7 of its first byte.
#[derive(Clone)]
pub struct FrameBuffer {
    bytes: [u8; BUFFER_SIZE],
}

impl Default for FrameBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameBuffer {
    /// Creates a new black framebuffer.
    pub const fn new() -> Self {
        Self {
            bytes: [0u8; BUFFER_SIZE],
        }
    }

    /// Returns the underlying framebuffer bytes.
    pub fn bytes(&self) -> &[u8; BUFFER_SIZE] {
        &self.bytes
    }

    /// Fills the whole framebuffer with one colour.
    pub fn clear(&mut self, color: Color3) {
        for y in 0..HEIGHT {
            for x in 0..WIDTH {
                self.set_pixel(x, y, color);
            }
        }
    }

    /// Sets a pixel colour.
    ///
    /// Returns `true` when pixel is in bounds, `false` otherwise.
    pub fn set_pixel(&mut self, x: usize, y: usize, color: Color3) -> bool {
        if x >= WIDTH || y >= HEIGHT {
            return false;
        }

        let line_start = y * LINE_BYTES * 8;
        for channel in 0..BITS_PER_PIXEL {
            let bit = line_start + x * BITS_PER_PIXEL + channel;
            let mask = 1u8 << (7 - (bit % 8));
            let on = (color.bits() >> (BITS_PER_PIXEL - 1 - channel)) & 1 != 0;
            if on {
                self.bytes[bit / 8] |= mask;
            } else {
                self.bytes[bit / 8] &= !mask;
            }
        }

        true
    }

    /// Reads a pixel colour.
    pub fn pixel(&self, x: usize, y: usize) -> Option<Color3> {
        if x >= WIDTH || y >= HEIGHT {
            return None;
        }

        let line_start = y * LINE_BYTES * 8;
        let mut bits = 0u8;
        for channel in 0..BITS_PER_PIXEL {
            let bit = line_start + x * BITS_PER_PIXEL + channel;
            let mask = 1u8 << (7 - (bit % 8));
            bits = (bits << 1) | u8::from(self.bytes[bit / 8] & mask != 0);
        }
        Some(Color3::from_bits(bits))
    }

    /// Returns a line payload for line 1..=176.
    pub fn line(&self, line: u16) -> Option<&[u8; LINE_BYTES]> {
        if !(1..=HEIGHT as u16).contains(&line) {
            return None;
        }

        let start = (line as usize - 1) * LINE_BYTES;
        let end = start + LINE_BYTES;
        <&[u8; LINE_BYTES]>::try_from(&self.bytes[start..end]).ok()
    }
}
