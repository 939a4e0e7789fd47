//! Packed `0xRRGGBB` colours and the watch palette.

use embedded_graphics::pixelcolor::{Rgb888, RgbColor};

pub const BLACK: u32 = 0x000000;
pub const WHITE: u32 = 0xFFFFFF;
pub const ORANGE: u32 = 0xFF5500;
pub const INDIGO: u32 = 0x5500AA;
pub const FASHION_MAGENTA: u32 = 0xFF00AA;
pub const CHROME_YELLOW: u32 = 0xFFAA00;

const RGB_MASK: u32 = 0x00FF_FFFF;

/// Drops anything above the low 24 bits.
pub const fn mask_rgb(packed: u32) -> u32 {
    packed & RGB_MASK
}

pub const fn to_rgb888(packed: u32) -> Rgb888 {
    Rgb888::new(
        ((packed >> 16) & 0xFF) as u8,
        ((packed >> 8) & 0xFF) as u8,
        (packed & 0xFF) as u8,
    )
}

pub fn from_rgb888(color: Rgb888) -> u32 {
    ((color.r() as u32) << 16) | ((color.g() as u32) << 8) | color.b() as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn packed_channels_map_in_order() {
        let color = to_rgb888(INDIGO);
        assert_eq!((color.r(), color.g(), color.b()), (0x55, 0x00, 0xAA));
        assert_eq!(from_rgb888(color), INDIGO);
    }

    #[test]
    fn high_byte_is_ignored() {
        assert_eq!(to_rgb888(0xAB11_2233), to_rgb888(0x11_2233));
        assert_eq!(mask_rgb(0xFF12_3456), 0x12_3456);
    }
}
