//! Node configuration.
//!
//! # Components
//!
//! - [`radio`] - network/node identifiers, frequency and power settings
//! - [`board`] - per-board pin assignments
//! - [`band`] - manufactured frequency bands and tuning ranges

mod band;
mod board;
mod radio;

pub use band::{is_tunable, FrequencyBand, SYNTHESIZER_RANGES_MHZ};
pub use board::{BoardProfile, PinAssignment, BOARD_ENV_VAR};
pub use radio::{
    ConfigError, RadioConfig, BROADCAST_ADDRESS, FREQUENCY_MHZ, HIGH_POWER_TX_RANGE,
    IS_HIGH_POWER, MAX_MESSAGE_LEN, NETWORK_ID, NODE_ID, RECIPIENT_ID, STANDARD_TX_RANGE,
    TX_POWER_DBM,
};
