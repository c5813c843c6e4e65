//! Radio driver interface.

use crate::config::PinAssignment;

/// Operations board bring-up needs from a radio driver.
///
/// Implemented by the register-level [`Rfm69`](super::Rfm69) driver and by
/// [`SimulatedRadio`](super::SimulatedRadio) for host runs.
pub trait RadioDriver {
    /// Driver-specific failure.
    type Error;

    /// Whether the driver has completed a successful [`init`](Self::init).
    fn is_initialized(&self) -> bool;

    /// Largest payload the driver can carry, in bytes.
    fn max_payload_len(&self) -> usize;

    /// Wire the driver to the board's chip select, interrupt and reset lines.
    fn attach_pins(&mut self, pins: PinAssignment) -> Result<(), Self::Error>;

    /// Pulse the reset line and wait for the module to come back up.
    fn hardware_reset(&mut self) -> Result<(), Self::Error>;

    /// Bring the module up as `node_id` on network `network_id`.
    fn init(&mut self, network_id: u8, node_id: u8) -> Result<(), Self::Error>;

    /// Tune the carrier.
    fn set_frequency(&mut self, freq_mhz: f32) -> Result<(), Self::Error>;

    /// Select the high-power PA path (RFM69HW/HCW).
    fn set_high_power(&mut self, enabled: bool) -> Result<(), Self::Error>;

    /// Set transmit power in dBm.
    fn set_tx_power(&mut self, dbm: i8) -> Result<(), Self::Error>;
}
