//! RGB565 color helpers.
//!
//! The controller takes every color parameter as a single 16-bit RGB565 word.

use crate::{Error, Result};

pub const BLACK: u16 = 0x0000;
pub const WHITE: u16 = 0xFFFF;
pub const RED: u16 = 0xF800;
pub const GREEN: u16 = 0x07E0;
pub const BLUE: u16 = 0x001F;
pub const YELLOW: u16 = 0xFFE0;
pub const CYAN: u16 = 0x07FF;
pub const MAGENTA: u16 = 0xF81F;

/// Converts RGB888 to RGB565.
pub fn rgb888_to_rgb565(r: u8, g: u8, b: u8) -> u16 {
    let r5 = (r >> 3) as u16;
    let g6 = (g >> 2) as u16;
    let b5 = (b >> 3) as u16;
    (r5 << 11) | (g6 << 5) | b5
}

/// Converts RGB565 to RGB888, expanding each channel to the full 8-bit range.
pub fn rgb565_to_rgb888(color: u16) -> (u8, u8, u8) {
    let r = ((color >> 11) & 0x1F) as u8;
    let g = ((color >> 5) & 0x3F) as u8;
    let b = (color & 0x1F) as u8;
    ((r << 3) | (r >> 2), (g << 2) | (g >> 4), (b << 3) | (b >> 2))
}

/// Parses `#RRGGBB` (leading `#` optional) into an RGB565 word.
pub fn parse_hex_color(hex: &str) -> Result<u16> {
    let digits = hex.trim_start_matches('#');
    if digits.len() != 6 || !digits.is_ascii() {
        return Err(Error::InvalidColor(hex.to_string()));
    }
    let channel = |range: std::ops::Range<usize>| {
        u8::from_str_radix(&digits[range], 16).map_err(|_| Error::InvalidColor(hex.to_string()))
    };
    Ok(rgb888_to_rgb565(channel(0..2)?, channel(2..4)?, channel(4..6)?))
}
