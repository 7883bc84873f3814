//! Text placement and text attributes.

use crate::{Error, Result};
use std::io::{Read, Write};
use tracing::{debug, warn};

use super::device::LcdDevice;
use super::protocol::{
    build_string, decode_word, is_printable, FONT, FONT_HEIGHT, FONT_WIDTH, MOVE_CURSOR,
    PUT_CHARACTER, PUT_STRING, TEXT_COLOR,
};

/// Text fonts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Font {
    /// Font1, the system font.
    System,
    /// Font2.
    Medium,
    /// Font3, selected at power-on.
    #[default]
    Default,
    /// Any other font word, e.g. a font loaded onto the module.
    Other(u16),
}

impl Font {
    /// Returns the word sent to the device.
    pub fn word(&self) -> u16 {
        match self {
            Font::System => 0,
            Font::Medium => 1,
            Font::Default => 3,
            Font::Other(word) => *word,
        }
    }
}

impl From<u16> for Font {
    fn from(word: u16) -> Self {
        match word {
            0 => Font::System,
            1 => Font::Medium,
            3 => Font::Default,
            other => Font::Other(other),
        }
    }
}

impl std::fmt::Display for Font {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Font::System => write!(f, "system"),
            Font::Medium => write!(f, "medium"),
            Font::Default => write!(f, "default"),
            Font::Other(word) => write!(f, "font {}", word),
        }
    }
}

/// Text subsystem of an [`LcdDevice`].
pub struct Text<'a, P> {
    device: &'a LcdDevice<P>,
}

impl<'a, P: Read + Write> Text<'a, P> {
    pub(super) fn new(device: &'a LcdDevice<P>) -> Self {
        Self { device }
    }

    /// Moves the text cursor to a line and column of the current font.
    /// Line 0, column 0 is the top left corner.
    pub fn move_cursor(&self, line: u16, column: u16) -> Result<()> {
        self.device.lock().command(MOVE_CURSOR, &[line, column])
    }

    /// Prints a single printable ASCII character at the cursor.
    pub fn put_character(&self, c: char) -> Result<()> {
        if !is_printable(c) {
            return Err(Error::InvalidCharacter(c));
        }
        self.device.lock().command(PUT_CHARACTER, &[c as u16])
    }

    /// Prints a string at the cursor (at most 511 characters).
    ///
    /// The device reports how many characters it wrote; a count that differs
    /// from the input fails with [`Error::LengthMismatch`].
    pub fn put_string(&self, text: &str) -> Result<()> {
        let command = build_string(text)?;

        let echoed = {
            let mut inner = self.device.lock();
            let transport = inner.transport();
            transport.send_raw(&command)?;
            let payload = transport.await_ack(PUT_STRING.response_len)?;
            match payload.as_deref() {
                Some(&[high, low]) => decode_word(high, low),
                _ => {
                    return Err(Error::Io(std::io::Error::new(
                        std::io::ErrorKind::InvalidData,
                        "put string has no length response",
                    )))
                }
            }
        };

        let sent = text.len();
        if echoed as usize != sent {
            warn!("Device wrote {} characters, expected {}", echoed, sent);
            return Err(Error::LengthMismatch { sent, echoed });
        }
        debug!("Wrote {} characters", sent);
        Ok(())
    }

    /// Selects a font and returns the previous one.
    pub fn set_font(&self, font: impl Into<Font>) -> Result<Font> {
        let word = self.device.lock().query(FONT, &[font.into().word()])?;
        Ok(Font::from(word))
    }

    /// Sets the width and height multipliers and returns the previous pair.
    pub fn set_font_size(&self, size: u16) -> Result<(u16, u16)> {
        let mut inner = self.device.lock();
        let width = inner.query(FONT_WIDTH, &[size])?;
        let height = inner.query(FONT_HEIGHT, &[size])?;
        Ok((width, height))
    }

    /// Sets the text foreground color and returns the previous one.
    pub fn set_text_color(&self, color: u16) -> Result<u16> {
        self.device.lock().query(TEXT_COLOR, &[color])
    }
}
