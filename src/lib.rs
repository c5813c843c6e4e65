//! RFM69 radio node bring-up.
//!
//! Board configuration for an RFM69 sub-GHz transceiver (network and node
//! ids, carrier frequency, per-board pin wiring) and the one-shot
//! [`initialize_radio`] that applies it to a driver. Everything here is
//! platform-independent and can be tested on the host.

pub mod cli;
pub mod config;
pub mod radio;

// Re-export commonly used items
pub use config::{BoardProfile, ConfigError, FrequencyBand, PinAssignment, RadioConfig};
pub use radio::{
    initialize_radio, InitError, InitStage, Precondition, RadioDriver, Rfm69, Rfm69Error,
    SimError, SimulatedRadio,
};
