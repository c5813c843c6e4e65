//! RFM69 radio support.
//!
//! This module contains:
//! - [`driver`]: the operations bring-up needs from a radio driver
//! - [`init`]: board bring-up ([`initialize_radio`])
//! - [`rfm69`]: register-level RFM69 driver over `embedded-hal`
//! - [`sim`]: simulated module for host runs and tests

mod driver;
mod init;
mod rfm69;
mod sim;

pub use driver::RadioDriver;
pub use init::{initialize_radio, InitError, InitStage, Precondition};
pub use rfm69::{frf_for_mhz, pa_level, Rfm69, Rfm69Error, CHIP_VERSION, MAX_PAYLOAD_LEN};
pub use sim::{SimError, SimulatedRadio};
