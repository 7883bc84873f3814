//! Picaso LCD Library
//!
//! Serial driver for 4D Systems graphics/text display modules built on the
//! Picaso controller. Commands are sent as big-endian 16-bit words (or raw
//! bytes for strings) and every command is confirmed with a one-byte ACK,
//! optionally followed by a fixed-length response.

pub mod color;
pub mod error;
pub mod lcd;
pub mod orientation;

pub use error::{Error, ErrorKind, Result};
pub use lcd::{Font, LcdDevice, Text, Transport};
pub use orientation::Orientation;

/// Default baud rate of the serial link (SPE2 rev 1.1).
pub const DEFAULT_BAUD_RATE: u32 = 9600;

/// Longest string accepted by the Put String command.
pub const MAX_STRING_LENGTH: usize = 511;
