//! Radio node configuration.
//!
//! Compiled-in defaults for one node, collected into an immutable
//! [`RadioConfig`] that is handed to [`initialize_radio`](crate::radio::initialize_radio).
//! A JSON file may override any subset of the fields.
//!
//! # Example
//!
//! ```
//! use rfm69_node::config::{BoardProfile, RadioConfig};
//!
//! let config = RadioConfig::from_json(r#"{ "node_id": 42, "board": "pro-mini" }"#).unwrap();
//! assert_eq!(config.node_id, 42);
//! assert_eq!(config.network_id, 100);
//! assert_eq!(config.board, BoardProfile::ProMini);
//! ```

use super::band::is_tunable;
use super::{BoardProfile, PinAssignment};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// Network ID, the same on all nodes that talk to each other.
pub const NETWORK_ID: u8 = 100;

/// This node's address.
pub const NODE_ID: u8 = 10;

/// Address meaning "all nodes".
pub const BROADCAST_ADDRESS: u8 = 255;

/// Largest application message, in bytes.
pub const MAX_MESSAGE_LEN: u8 = 68;

/// Default destination for outgoing messages.
pub const RECIPIENT_ID: u8 = BROADCAST_ADDRESS;

/// Carrier frequency in MHz. Must match the radio's hardware band and the peer's frequency.
pub const FREQUENCY_MHZ: f32 = 434.0;

/// Set for RFM69HCW (high-power) modules.
pub const IS_HIGH_POWER: bool = true;

/// Transmit power in dBm.
pub const TX_POWER_DBM: i8 = 20;

/// Transmit power range for high-power (HW/HCW) modules.
pub const HIGH_POWER_TX_RANGE: (i8, i8) = (-2, 20);

/// Transmit power range for standard (W/CW) modules.
pub const STANDARD_TX_RANGE: (i8, i8) = (-18, 13);

/// Configuration for one radio node.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RadioConfig {
    /// Shared network identifier.
    pub network_id: u8,
    /// This node's address within the network.
    pub node_id: u8,
    /// Address meaning "all nodes".
    pub broadcast_address: u8,
    /// Upper bound on a single payload, in bytes.
    pub max_message_len: u8,
    /// Default destination address.
    pub recipient_id: u8,
    /// Carrier frequency in MHz.
    pub frequency_mhz: f32,
    /// RFM69HW/HCW module with the high-power PA.
    pub is_high_power: bool,
    /// Transmit power in dBm.
    pub tx_power_dbm: i8,
    /// Carrier board, which determines the pin wiring.
    pub board: BoardProfile,
}

impl Default for RadioConfig {
    fn default() -> Self {
        Self {
            network_id: NETWORK_ID,
            node_id: NODE_ID,
            broadcast_address: BROADCAST_ADDRESS,
            max_message_len: MAX_MESSAGE_LEN,
            recipient_id: RECIPIENT_ID,
            frequency_mhz: FREQUENCY_MHZ,
            is_high_power: IS_HIGH_POWER,
            tx_power_dbm: TX_POWER_DBM,
            board: BoardProfile::default(),
        }
    }
}

impl RadioConfig {
    /// Compiled-in defaults wired for `board`.
    pub fn for_board(board: BoardProfile) -> Self {
        Self {
            board,
            ..Self::default()
        }
    }

    /// Pins of the configured board.
    pub fn pins(&self) -> PinAssignment {
        self.board.pins()
    }

    /// Allowed transmit power range for the configured module type.
    pub fn tx_power_range(&self) -> (i8, i8) {
        if self.is_high_power {
            HIGH_POWER_TX_RANGE
        } else {
            STANDARD_TX_RANGE
        }
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.node_id == self.broadcast_address {
            return Err(ConfigError::NodeIsBroadcast {
                node_id: self.node_id,
            });
        }

        if self.max_message_len == 0 {
            return Err(ConfigError::EmptyMessageLen);
        }

        if !is_tunable(self.frequency_mhz) {
            return Err(ConfigError::FrequencyOutOfRange {
                mhz: self.frequency_mhz,
            });
        }

        let (min, max) = self.tx_power_range();
        if !(min..=max).contains(&self.tx_power_dbm) {
            return Err(ConfigError::TxPowerOutOfRange {
                dbm: self.tx_power_dbm,
                min,
                max,
            });
        }

        Ok(())
    }

    /// Check `max_message_len` against a driver's payload limit.
    pub fn check_payload_limit(&self, max_payload_len: usize) -> Result<(), ConfigError> {
        let len = self.max_message_len as usize;
        if len > max_payload_len {
            return Err(ConfigError::MessageTooLong {
                len,
                max: max_payload_len,
            });
        }
        Ok(())
    }

    /// Parse a JSON configuration. Missing fields take the compiled-in defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load a JSON configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(format!("{}: {}", path.display(), e)))?;
        Self::from_json(&json)
    }
}

/// Errors that can occur while building a configuration.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// Node address collides with the broadcast address.
    NodeIsBroadcast { node_id: u8 },
    /// Maximum message length is zero.
    EmptyMessageLen,
    /// Maximum message length exceeds the driver's payload limit.
    MessageTooLong { len: usize, max: usize },
    /// Frequency the RFM69 synthesizer cannot tune to.
    FrequencyOutOfRange { mhz: f32 },
    /// Transmit power outside the module's range.
    TxPowerOutOfRange { dbm: i8, min: i8, max: i8 },
    /// Unrecognised board name.
    UnknownBoard(String),
    /// Unrecognised frequency band.
    UnknownBand(String),
    /// Malformed configuration file.
    Parse(String),
    /// Configuration file could not be read.
    Io(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NodeIsBroadcast { node_id } => {
                write!(f, "node id {} is the broadcast address", node_id)
            }
            Self::EmptyMessageLen => write!(f, "max message length cannot be zero"),
            Self::MessageTooLong { len, max } => {
                write!(f, "max message length too large: {} bytes (max {})", len, max)
            }
            Self::FrequencyOutOfRange { mhz } => {
                write!(f, "frequency {} MHz is outside the RFM69 tuning range", mhz)
            }
            Self::TxPowerOutOfRange { dbm, min, max } => {
                write!(f, "tx power {} dBm out of range ({} to {})", dbm, min, max)
            }
            Self::UnknownBoard(name) => write!(f, "unknown board: {}", name),
            Self::UnknownBand(name) => write!(f, "unknown frequency band: {}", name),
            Self::Parse(msg) => write!(f, "invalid config: {}", msg),
            Self::Io(msg) => write!(f, "cannot read config: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;

    // ==================== Defaults ====================

    #[test]
    fn test_default_values() {
        let config = RadioConfig::default();
        assert_eq!(config.network_id, 100);
        assert_eq!(config.node_id, 10);
        assert_eq!(config.broadcast_address, 255);
        assert_eq!(config.max_message_len, 68);
        assert_eq!(config.recipient_id, config.broadcast_address);
        assert_eq!(config.frequency_mhz.to_bits(), 434.0f32.to_bits());
        assert!(config.is_high_power);
        assert_eq!(config.board, BoardProfile::default());
    }

    #[test]
    fn test_default_is_valid() {
        assert!(RadioConfig::default().validate().is_ok());
    }

    #[test]
    fn test_for_board_keeps_defaults() {
        let config = RadioConfig::for_board(BoardProfile::ProMini);
        assert_eq!(config.board, BoardProfile::ProMini);
        assert_eq!(config.pins().chip_select, 10);
        assert_eq!(config.network_id, NETWORK_ID);
    }

    // ==================== Validation ====================

    #[test]
    fn test_node_is_broadcast() {
        let config = RadioConfig {
            node_id: 255,
            ..RadioConfig::default()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigError::NodeIsBroadcast { node_id: 255 })
        );
    }

    #[test]
    fn test_empty_message_len() {
        let config = RadioConfig {
            max_message_len: 0,
            ..RadioConfig::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::EmptyMessageLen));
    }

    #[test]
    fn test_payload_limit() {
        let config = RadioConfig::default();
        assert!(config.check_payload_limit(255).is_ok());
        assert!(config.check_payload_limit(68).is_ok());
        assert_eq!(
            config.check_payload_limit(61),
            Err(ConfigError::MessageTooLong { len: 68, max: 61 })
        );
    }

    #[test]
    fn test_frequency_out_of_range() {
        let config = RadioConfig {
            frequency_mhz: 2400.0,
            ..RadioConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::FrequencyOutOfRange { .. })
        ));
    }

    #[test]
    fn test_tx_power_limits() {
        let high = RadioConfig {
            tx_power_dbm: -3,
            ..RadioConfig::default()
        };
        assert_eq!(
            high.validate(),
            Err(ConfigError::TxPowerOutOfRange {
                dbm: -3,
                min: -2,
                max: 20
            })
        );

        let standard = RadioConfig {
            is_high_power: false,
            tx_power_dbm: 20,
            ..RadioConfig::default()
        };
        assert!(matches!(
            standard.validate(),
            Err(ConfigError::TxPowerOutOfRange { max: 13, .. })
        ));

        let standard_ok = RadioConfig {
            is_high_power: false,
            tx_power_dbm: 13,
            ..RadioConfig::default()
        };
        assert!(standard_ok.validate().is_ok());
    }

    // ==================== JSON ====================

    #[test]
    fn test_json_empty_object_is_default() {
        assert_eq!(RadioConfig::from_json("{}").unwrap(), RadioConfig::default());
    }

    #[test]
    fn test_json_overrides() {
        let config = RadioConfig::from_json(
            r#"{ "network_id": 7, "frequency_mhz": 915.0, "board": "ada-m0" }"#,
        )
        .unwrap();
        assert_eq!(config.network_id, 7);
        assert_eq!(config.frequency_mhz, 915.0);
        assert_eq!(config.board, BoardProfile::AdafruitM0);
        assert_eq!(config.node_id, NODE_ID);
    }

    #[test]
    fn test_json_unknown_field() {
        let result = RadioConfig::from_json(r#"{ "encrypt_key": "sampleEncryptKey" }"#);
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_json_unknown_board() {
        let result = RadioConfig::from_json(r#"{ "board": "uno" }"#);
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_json_message_len_over_u8() {
        let result = RadioConfig::from_json(r#"{ "max_message_len": 300 }"#);
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_json_invalid_values_rejected() {
        let result = RadioConfig::from_json(r#"{ "node_id": 255 }"#);
        assert!(matches!(result, Err(ConfigError::NodeIsBroadcast { .. })));
    }

    #[test]
    fn test_load_missing_file() {
        let result = RadioConfig::load("/nonexistent/rfm69-node.json");
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }

    #[test]
    fn test_load_file() {
        let path = std::env::temp_dir().join(format!("rfm69-node-{}.json", std::process::id()));
        std::fs::write(&path, r#"{ "node_id": 3 }"#).unwrap();
        let config = RadioConfig::load(&path).unwrap();
        std::fs::remove_file(&path).ok();
        assert_eq!(config.node_id, 3);
    }
}
