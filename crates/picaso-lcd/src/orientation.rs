//! Display orientation support.
//!
//! The controller rotates its own coordinate system, so every orientation is
//! a hardware mode selected by a single word.

use crate::{Error, Result};
use std::str::FromStr;

/// Display orientation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u16)]
pub enum Orientation {
    /// Landscape, the power-on default.
    #[default]
    Landscape = 0,
    /// Landscape rotated 180°.
    LandscapeReverse = 1,
    /// Portrait.
    Portrait = 2,
    /// Portrait rotated 180°.
    PortraitReverse = 3,
}

impl Orientation {
    /// Returns the word sent to the device.
    pub fn word(&self) -> u16 {
        *self as u16
    }

    /// Converts a word returned by the device.
    pub fn from_word(value: u16) -> Option<Self> {
        match value {
            0 => Some(Orientation::Landscape),
            1 => Some(Orientation::LandscapeReverse),
            2 => Some(Orientation::Portrait),
            3 => Some(Orientation::PortraitReverse),
            _ => None,
        }
    }

    /// Returns true if this is a portrait orientation.
    pub fn is_portrait(&self) -> bool {
        matches!(self, Orientation::Portrait | Orientation::PortraitReverse)
    }
}

impl FromStr for Orientation {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "landscape" => Ok(Orientation::Landscape),
            "landscape-reverse" | "landscape_reverse" => Ok(Orientation::LandscapeReverse),
            "portrait" => Ok(Orientation::Portrait),
            "portrait-reverse" | "portrait_reverse" => Ok(Orientation::PortraitReverse),
            _ => Err(Error::InvalidOrientation(s.to_string())),
        }
    }
}

impl std::fmt::Display for Orientation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Orientation::Landscape => write!(f, "landscape"),
            Orientation::LandscapeReverse => write!(f, "landscape-reverse"),
            Orientation::Portrait => write!(f, "portrait"),
            Orientation::PortraitReverse => write!(f, "portrait-reverse"),
        }
    }
}
