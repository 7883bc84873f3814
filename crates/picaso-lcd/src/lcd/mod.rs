//! LCD display module.
//!
//! Provides control over a Picaso display over a serial link.

mod device;
mod text;
mod transport;

#[cfg(test)]
mod mock;

pub mod protocol;

pub use device::{LcdDevice, DEFAULT_CONTRAST};
pub use protocol::Command;
pub use text::{Font, Text};
pub use transport::Transport;
