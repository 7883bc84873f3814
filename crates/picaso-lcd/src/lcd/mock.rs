//! In-memory serial channel for tests.

use std::collections::VecDeque;
use std::io::{self, Read, Write};

/// Scripted device: hands out queued response bytes and records writes.
#[derive(Default)]
pub struct MockPort {
    rx: VecDeque<u8>,
    tx: Vec<u8>,
    fail_writes: bool,
}

impl MockPort {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_responses(bytes: &[u8]) -> Self {
        Self {
            rx: bytes.iter().copied().collect(),
            ..Self::default()
        }
    }

    pub fn failing_writes() -> Self {
        Self {
            fail_writes: true,
            ..Self::default()
        }
    }

    /// Everything written so far.
    pub fn written(&self) -> &[u8] {
        &self.tx
    }

    /// Number of scripted bytes not yet read.
    pub fn unread(&self) -> usize {
        self.rx.len()
    }
}

impl Read for MockPort {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = buf.len().min(self.rx.len());
        for (slot, byte) in buf.iter_mut().zip(self.rx.drain(..n)) {
            *slot = byte;
        }
        Ok(n)
    }
}

impl Write for MockPort {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if self.fail_writes {
            return Err(io::Error::new(io::ErrorKind::BrokenPipe, "port closed"));
        }
        self.tx.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
