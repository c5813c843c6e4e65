//! Board variant pin assignments.
//!
//! Each supported carrier board wires the RFM69 module to different
//! microcontroller I/O lines. The variant compiled in by default is picked
//! with a cargo feature; at runtime it can be overridden by name.
//!
//! | Board | CS | INT | IRQ | RST |
//! |-------|----|-----|-----|-----|
//! | Adafruit Feather M0 | 8 | 3 | - | 4 |
//! | Arduino Pro Mini | 10 | 2 | 0 | 9 |

use super::ConfigError;
use std::fmt;

#[cfg(all(feature = "board-ada-m0", feature = "board-pro-mini"))]
compile_error!("features `board-ada-m0` and `board-pro-mini` are mutually exclusive");

#[cfg(not(any(feature = "board-ada-m0", feature = "board-pro-mini")))]
compile_error!("enable exactly one board feature: `board-ada-m0` or `board-pro-mini`");

/// Environment variable consulted for a runtime board override.
pub const BOARD_ENV_VAR: &str = "RFM69_BOARD";

/// Microcontroller pins used to talk to the radio module.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PinAssignment {
    /// SPI chip select (NSS).
    pub chip_select: u8,
    /// DIO0 interrupt input.
    pub interrupt: u8,
    /// External interrupt number for `interrupt`, on boards that need it.
    pub irq_number: Option<u8>,
    /// Module reset line.
    pub reset: u8,
}

/// Supported carrier board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BoardProfile {
    /// Adafruit Feather M0 with on-board RFM69.
    AdafruitM0,
    /// Arduino Pro Mini with an RFM69 breakout.
    ProMini,
}

impl BoardProfile {
    /// All supported boards.
    pub const ALL: [BoardProfile; 2] = [Self::AdafruitM0, Self::ProMini];

    /// Pin assignment for this board.
    pub const fn pins(self) -> PinAssignment {
        match self {
            Self::AdafruitM0 => PinAssignment {
                chip_select: 8,
                interrupt: 3,
                irq_number: None,
                reset: 4,
            },
            Self::ProMini => PinAssignment {
                chip_select: 10,
                interrupt: 2,
                // Pin 2 is IRQ 0
                irq_number: Some(0),
                reset: 9,
            },
        }
    }

    /// Canonical name, as accepted by [`FromStr`](std::str::FromStr).
    pub fn as_str(self) -> &'static str {
        match self {
            Self::AdafruitM0 => "ada-m0",
            Self::ProMini => "pro-mini",
        }
    }

    /// Board named by `RFM69_BOARD`, if any.
    pub fn from_env() -> Result<Option<Self>, ConfigError> {
        Self::from_env_value(std::env::var(BOARD_ENV_VAR).ok().as_deref())
    }

    /// Interpret a raw `RFM69_BOARD` value.
    ///
    /// An unset or blank value names no board, so a lower-precedence source
    /// applies. An unrecognised name is an error.
    pub fn from_env_value(value: Option<&str>) -> Result<Option<Self>, ConfigError> {
        match value {
            Some(name) if !name.trim().is_empty() => name.parse().map(Some),
            _ => Ok(None),
        }
    }
}

impl Default for BoardProfile {
    fn default() -> Self {
        #[cfg(feature = "board-pro-mini")]
        return Self::ProMini;
        #[cfg(not(feature = "board-pro-mini"))]
        Self::AdafruitM0
    }
}

impl std::str::FromStr for BoardProfile {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('_', "-").as_str() {
            "ada-m0" | "adafruit-m0" | "feather-m0" => Ok(Self::AdafruitM0),
            "pro-mini" | "promini" => Ok(Self::ProMini),
            _ => Err(ConfigError::UnknownBoard(s.to_string())),
        }
    }
}

impl fmt::Display for BoardProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl serde::Serialize for BoardProfile {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> serde::Deserialize<'de> for BoardProfile {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        name.parse().map_err(serde::de::Error::custom)
    }
}
