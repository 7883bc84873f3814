//! Picaso serial protocol definitions and encoding.
//!
//! Protocol structure:
//! - Word-mode commands: opcode word followed by parameter words, each sent
//!   as two bytes, high byte first. No framing, length prefix or checksum.
//! - Raw-mode commands (Put String): opcode byte pair followed by one byte per
//!   character and a 0x00 terminator.
//! - Every command is answered by a single ACK byte (0x06), followed by a
//!   response whose length is fixed by the command.

use crate::{Error, Result, MAX_STRING_LENGTH};

/// Acknowledge byte sent by the device after every accepted command.
pub const ACK: u8 = 0x06;

/// An opcode together with the number of response bytes that follow its ACK.
///
/// The device never announces response lengths, so they live here next to
/// the opcode rather than at each call site.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Command {
    pub opcode: u16,
    pub response_len: usize,
}

impl Command {
    const fn new(opcode: u16, response_len: usize) -> Self {
        Self {
            opcode,
            response_len,
        }
    }
}

// Graphics
pub const CLEAR_SCREEN: Command = Command::new(0xFFCD, 0);
pub const PUT_PIXEL: Command = Command::new(0xFFC1, 0);
pub const LINE: Command = Command::new(0xFFC8, 0);
pub const RECTANGLE: Command = Command::new(0xFFC5, 0);
pub const RECTANGLE_FILLED: Command = Command::new(0xFFC4, 0);
pub const ELLIPSE: Command = Command::new(0xFFB2, 0);
pub const ELLIPSE_FILLED: Command = Command::new(0xFFB1, 0);
pub const POLYLINE: Command = Command::new(0x0015, 0);
pub const POLYGON: Command = Command::new(0x0013, 0);
pub const POLYGON_FILLED: Command = Command::new(0x0014, 0);

// Configuration
pub const CONTRAST: Command = Command::new(0xFF9C, 2);
pub const ORIENTATION: Command = Command::new(0xFF9E, 2);
pub const DISPLAY_SIZE: Command = Command::new(0xFFA6, 2);
pub const BACKGROUND_COLOR: Command = Command::new(0xFFA4, 2);

// Text
pub const MOVE_CURSOR: Command = Command::new(0xFFE9, 0);
pub const PUT_CHARACTER: Command = Command::new(0xFFFE, 0);
pub const PUT_STRING: Command = Command::new(0x0018, 2);
pub const FONT: Command = Command::new(0xFFE5, 2);
pub const FONT_WIDTH: Command = Command::new(0xFFE4, 2);
pub const FONT_HEIGHT: Command = Command::new(0xFFE3, 2);
pub const TEXT_COLOR: Command = Command::new(0xFFE7, 2);

/// Display size query selectors.
pub const AXIS_X: u16 = 0;
pub const AXIS_Y: u16 = 1;

/// Splits a word into its big-endian byte pair.
pub fn encode_word(value: u16) -> [u8; 2] {
    [(value >> 8) as u8, (value & 0xFF) as u8]
}

/// Reassembles a word from a big-endian byte pair.
pub fn decode_word(high: u8, low: u8) -> u16 {
    ((high as u16) << 8) | low as u16
}

/// Encodes a word-mode command into its wire bytes.
pub fn encode_words(words: &[u16]) -> Vec<u8> {
    words.iter().flat_map(|&word| encode_word(word)).collect()
}

/// Converts a count to a word, rejecting values that would need truncation.
pub fn checked_word(value: usize) -> Result<u16> {
    u16::try_from(value).map_err(|_| Error::WordOverflow(value))
}

/// Picks the polyline opcode. Filled implies closed.
pub fn polyline_command(closed: bool, filled: bool) -> Command {
    if filled {
        POLYGON_FILLED
    } else if closed {
        POLYGON
    } else {
        POLYLINE
    }
}

/// Builds the words of a polyline command.
///
/// Layout: opcode, vertex count, every X in order, every Y in order, color.
pub fn build_polyline(command: Command, vertices: &[(u16, u16)], color: u16) -> Result<Vec<u16>> {
    let count = checked_word(vertices.len())?;

    let mut words = Vec::with_capacity(vertices.len() * 2 + 3);
    words.push(command.opcode);
    words.push(count);
    words.extend(vertices.iter().map(|&(x, _)| x));
    words.extend(vertices.iter().map(|&(_, y)| y));
    words.push(color);
    Ok(words)
}

/// Builds the raw bytes of a Put String command.
///
/// Rejects strings longer than [`MAX_STRING_LENGTH`], non-ASCII characters
/// and NUL, which would terminate the string early.
pub fn build_string(text: &str) -> Result<Vec<u8>> {
    let length = text.chars().count();
    if length > MAX_STRING_LENGTH {
        return Err(Error::StringTooLong {
            length,
            max: MAX_STRING_LENGTH,
        });
    }
    if let Some(c) = text.chars().find(|c| !c.is_ascii() || *c == '\0') {
        return Err(Error::InvalidCharacter(c));
    }

    let mut bytes = Vec::with_capacity(length + 3);
    bytes.extend_from_slice(&encode_word(PUT_STRING.opcode));
    bytes.extend_from_slice(text.as_bytes());
    bytes.push(0x00);
    Ok(bytes)
}

/// Returns true if the character is printable ASCII.
pub fn is_printable(c: char) -> bool {
    c.is_ascii() && !c.is_ascii_control()
}
