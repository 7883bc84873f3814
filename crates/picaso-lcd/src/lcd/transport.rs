//! Command/acknowledge transport over a byte channel.
//!
//! The link is half-duplex request/response: a command is written, then the
//! caller must read its ACK (and any response bytes) before sending anything
//! else. Nothing here retries or resynchronises; a failure leaves the channel
//! to the caller.

use crate::{Error, Result};
use std::io::{Read, Write};
use tracing::{debug, warn};

use super::protocol::{encode_words, Command, ACK};

/// Transport wrapping a serial byte channel.
pub struct Transport<P> {
    port: P,
}

impl<P: Read + Write> Transport<P> {
    /// Wraps an open byte channel.
    pub fn new(port: P) -> Self {
        Self { port }
    }

    /// Writes a word-mode command, each word high byte first.
    pub fn send_words(&mut self, words: &[u16]) -> Result<()> {
        let bytes = encode_words(words);
        debug!("Sending words: {:04X?}", words);
        self.write(&bytes)
    }

    /// Writes a raw-mode command byte for byte.
    pub fn send_raw(&mut self, bytes: &[u8]) -> Result<()> {
        debug!("Sending raw bytes: {:02X?}", bytes);
        self.write(bytes)
    }

    fn write(&mut self, bytes: &[u8]) -> Result<()> {
        self.port.write_all(bytes)?;
        self.port.flush()?;
        Ok(())
    }

    /// Reads the ACK byte and then exactly `response_len` response bytes.
    ///
    /// Returns `None` when no response was requested. A non-ACK byte fails
    /// with [`Error::Protocol`] without reading anything further.
    pub fn await_ack(&mut self, response_len: usize) -> Result<Option<Vec<u8>>> {
        let mut ack = [0u8; 1];
        self.port.read_exact(&mut ack)?;
        if ack[0] != ACK {
            warn!("Expected ACK, received 0x{:02X}", ack[0]);
            return Err(Error::Protocol { received: ack[0] });
        }

        if response_len == 0 {
            return Ok(None);
        }

        let mut payload = vec![0u8; response_len];
        self.port.read_exact(&mut payload)?;
        debug!("Response: {:02X?}", payload);
        Ok(Some(payload))
    }

    /// Sends a word-mode command with its parameters and awaits its ACK and
    /// catalogued response.
    pub fn transact(&mut self, command: Command, params: &[u16]) -> Result<Option<Vec<u8>>> {
        let mut words = Vec::with_capacity(params.len() + 1);
        words.push(command.opcode);
        words.extend_from_slice(params);
        self.send_words(&words)?;
        self.await_ack(command.response_len)
    }

    /// Returns the underlying channel.
    pub fn into_inner(self) -> P {
        self.port
    }
}
