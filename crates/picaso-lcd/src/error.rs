//! Error types for the Picaso LCD driver.

use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Broad failure category of an [`Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The serial channel failed (open, write, short read, timeout).
    Io,
    /// A byte other than ACK arrived where ACK was expected.
    Protocol,
    /// Caller input was rejected before anything was transmitted.
    Validation,
    /// The device acknowledged but its response contradicts the request.
    Consistency,
}

/// Errors that can occur when talking to the display.
#[derive(Error, Debug)]
pub enum Error {
    /// Serial device path does not exist.
    #[error("Serial device not found at {0}")]
    PortNotFound(String),

    /// Serial port could not be opened or configured.
    #[error("Serial port error: {0}")]
    Serial(#[from] tokio_serial::Error),

    /// Serial I/O error.
    #[error("Serial I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Device answered with something other than ACK.
    #[error("Expected ACK (0x06), device returned 0x{received:02X}")]
    Protocol { received: u8 },

    /// String exceeds the device's maximum length.
    #[error("String too long: {length} characters (max {max})")]
    StringTooLong { length: usize, max: usize },

    /// Character cannot be sent as a single byte.
    #[error("Character {0:?} is not printable ASCII")]
    InvalidCharacter(char),

    /// Value does not fit in a 16-bit word.
    #[error("Value {0} does not fit in a 16-bit word")]
    WordOverflow(usize),

    /// Invalid orientation value.
    #[error("Invalid orientation: {0}")]
    InvalidOrientation(String),

    /// Invalid color string.
    #[error("Invalid color: {0}")]
    InvalidColor(String),

    /// Device echoed a different string length than was sent.
    #[error("Device wrote {echoed} characters, expected {sent}")]
    LengthMismatch { sent: usize, echoed: u16 },

    /// Response word is outside the values the command can return.
    #[error("Unexpected response 0x{value:04X} to command 0x{opcode:04X}")]
    UnexpectedResponse { opcode: u16, value: u16 },
}

impl Error {
    /// Returns the failure category of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::PortNotFound(_) | Error::Serial(_) | Error::Io(_) => ErrorKind::Io,
            Error::Protocol { .. } => ErrorKind::Protocol,
            Error::StringTooLong { .. }
            | Error::InvalidCharacter(_)
            | Error::WordOverflow(_)
            | Error::InvalidOrientation(_)
            | Error::InvalidColor(_) => ErrorKind::Validation,
            Error::LengthMismatch { .. } | Error::UnexpectedResponse { .. } => {
                ErrorKind::Consistency
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kind() {
        let io = Error::Io(std::io::Error::from(std::io::ErrorKind::UnexpectedEof));
        assert_eq!(io.kind(), ErrorKind::Io);
        assert_eq!(Error::Protocol { received: 0x15 }.kind(), ErrorKind::Protocol);
        assert_eq!(
            Error::StringTooLong {
                length: 512,
                max: 511
            }
            .kind(),
            ErrorKind::Validation
        );
        assert_eq!(
            Error::LengthMismatch { sent: 2, echoed: 3 }.kind(),
            ErrorKind::Consistency
        );
    }

    #[test]
    fn test_protocol_message() {
        let err = Error::Protocol { received: 0x15 };
        assert_eq!(
            err.to_string(),
            "Expected ACK (0x06), device returned 0x15"
        );
    }
}
