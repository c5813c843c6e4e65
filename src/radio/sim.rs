//! Simulated RFM69 module for host runs and tests.
//!
//! Records every value applied during bring-up and can be told to behave
//! like a module that does not answer on the bus, one manufactured for a
//! different band than the configured frequency, or one that fails at a
//! chosen bring-up step.

use super::rfm69::MAX_PAYLOAD_LEN;
use super::{InitStage, RadioDriver};
use crate::config::{FrequencyBand, PinAssignment};
use log::debug;
use std::fmt;

/// In-memory stand-in for an RFM69 module.
#[derive(Debug, Clone)]
pub struct SimulatedRadio {
    band: FrequencyBand,
    responsive: bool,
    fault: Option<InitStage>,
    max_payload_len: usize,
    pins: Option<PinAssignment>,
    reset_count: u32,
    init_attempts: u32,
    module_up: bool,
    // Set only by a successful `set_tx_power`
    ready: bool,
    network_id: Option<u8>,
    node_id: Option<u8>,
    frequency_mhz: Option<f32>,
    high_power: Option<bool>,
    tx_power_dbm: Option<i8>,
}

impl SimulatedRadio {
    /// A responsive module manufactured for `band`.
    pub fn new(band: FrequencyBand) -> Self {
        Self {
            band,
            responsive: true,
            fault: None,
            max_payload_len: MAX_PAYLOAD_LEN,
            pins: None,
            reset_count: 0,
            init_attempts: 0,
            module_up: false,
            ready: false,
            network_id: None,
            node_id: None,
            frequency_mhz: None,
            high_power: None,
            tx_power_dbm: None,
        }
    }

    /// Set whether the module answers on the bus.
    pub fn responsive(mut self, responsive: bool) -> Self {
        self.responsive = responsive;
        self
    }

    /// Make the given step fail with [`SimError::Fault`] until cleared.
    pub fn fail_at(mut self, stage: InitStage) -> Self {
        self.fault = Some(stage);
        self
    }

    pub fn clear_fault(&mut self) {
        self.fault = None;
    }

    /// Override the reported payload limit.
    pub fn with_max_payload_len(mut self, len: usize) -> Self {
        self.max_payload_len = len;
        self
    }

    /// Plug or unplug the module after construction.
    pub fn set_responsive(&mut self, responsive: bool) {
        self.responsive = responsive;
    }

    pub fn band(&self) -> FrequencyBand {
        self.band
    }

    pub fn pins(&self) -> Option<PinAssignment> {
        self.pins
    }

    /// Number of reset pulses seen.
    pub fn reset_count(&self) -> u32 {
        self.reset_count
    }

    /// Number of `init` calls, successful or not.
    pub fn init_attempts(&self) -> u32 {
        self.init_attempts
    }

    pub fn network_id(&self) -> Option<u8> {
        self.network_id
    }

    pub fn node_id(&self) -> Option<u8> {
        self.node_id
    }

    pub fn frequency_mhz(&self) -> Option<f32> {
        self.frequency_mhz
    }

    pub fn high_power(&self) -> Option<bool> {
        self.high_power
    }

    pub fn tx_power_dbm(&self) -> Option<i8> {
        self.tx_power_dbm
    }

    fn check_fault(&self, stage: InitStage) -> Result<(), SimError> {
        if self.fault == Some(stage) {
            debug!("sim: injected fault at {}", stage);
            return Err(SimError::Fault(stage));
        }
        Ok(())
    }

    fn require_pins(&self) -> Result<(), SimError> {
        if self.pins.is_none() {
            return Err(SimError::PinsNotAttached);
        }
        Ok(())
    }

    fn require_module_up(&self) -> Result<(), SimError> {
        self.require_pins()?;
        if !self.module_up {
            return Err(SimError::NotInitialized);
        }
        Ok(())
    }
}

impl RadioDriver for SimulatedRadio {
    type Error = SimError;

    fn is_initialized(&self) -> bool {
        self.ready
    }

    fn max_payload_len(&self) -> usize {
        self.max_payload_len
    }

    fn attach_pins(&mut self, pins: PinAssignment) -> Result<(), SimError> {
        self.check_fault(InitStage::AttachPins)?;
        debug!("sim: pins attached {:?}", pins);
        self.pins = Some(pins);
        Ok(())
    }

    fn hardware_reset(&mut self) -> Result<(), SimError> {
        self.require_pins()?;
        self.check_fault(InitStage::Reset)?;
        self.reset_count += 1;
        self.module_up = false;
        self.ready = false;
        self.frequency_mhz = None;
        Ok(())
    }

    fn init(&mut self, network_id: u8, node_id: u8) -> Result<(), SimError> {
        self.require_pins()?;
        self.init_attempts += 1;
        self.ready = false;
        self.check_fault(InitStage::Init)?;
        if !self.responsive {
            return Err(SimError::NoResponse);
        }
        self.network_id = Some(network_id);
        self.node_id = Some(node_id);
        self.module_up = true;
        Ok(())
    }

    fn set_frequency(&mut self, freq_mhz: f32) -> Result<(), SimError> {
        self.require_module_up()?;
        self.ready = false;
        self.check_fault(InitStage::Frequency)?;
        if !self.band.contains(freq_mhz) {
            return Err(SimError::BandMismatch {
                band: self.band,
                mhz: freq_mhz,
            });
        }
        self.frequency_mhz = Some(freq_mhz);
        Ok(())
    }

    fn set_high_power(&mut self, enabled: bool) -> Result<(), SimError> {
        self.require_module_up()?;
        self.ready = false;
        self.check_fault(InitStage::HighPower)?;
        self.high_power = Some(enabled);
        Ok(())
    }

    fn set_tx_power(&mut self, dbm: i8) -> Result<(), SimError> {
        self.require_module_up()?;
        self.ready = false;
        self.check_fault(InitStage::TxPower)?;
        self.tx_power_dbm = Some(dbm);
        self.ready = self.frequency_mhz.is_some();
        Ok(())
    }
}

/// Simulated module errors.
#[derive(Debug, Clone, PartialEq)]
pub enum SimError {
    /// No response on the bus.
    NoResponse,
    /// Operation before pins were attached.
    PinsNotAttached,
    /// Operation before a successful `init`.
    NotInitialized,
    /// Frequency outside the module's manufactured band.
    BandMismatch { band: FrequencyBand, mhz: f32 },
    /// Failure injected with [`SimulatedRadio::fail_at`].
    Fault(InitStage),
}

impl fmt::Display for SimError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoResponse => write!(f, "radio not responding"),
            Self::PinsNotAttached => write!(f, "pins not attached"),
            Self::NotInitialized => write!(f, "radio not initialized"),
            Self::BandMismatch { band, mhz } => {
                write!(f, "{} MHz is outside the module's {} band", mhz, band)
            }
            Self::Fault(stage) => write!(f, "injected fault at {}", stage),
        }
    }
}

impl std::error::Error for SimError {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BoardProfile;

    fn attached() -> SimulatedRadio {
        let mut radio = SimulatedRadio::new(FrequencyBand::Mhz868);
        radio.attach_pins(BoardProfile::AdafruitM0.pins()).unwrap();
        radio
    }

    #[test]
    fn test_requires_pins() {
        let mut radio = SimulatedRadio::new(FrequencyBand::Mhz868);
        assert_eq!(radio.hardware_reset(), Err(SimError::PinsNotAttached));
        assert_eq!(radio.init(1, 2), Err(SimError::PinsNotAttached));
    }

    #[test]
    fn test_frequency_before_init() {
        let mut radio = attached();
        assert_eq!(radio.set_frequency(868.0), Err(SimError::NotInitialized));
    }

    #[test]
    fn test_ready_only_after_tx_power() {
        let mut radio = attached();
        radio.init(1, 2).unwrap();
        radio.set_frequency(868.0).unwrap();
        assert!(!radio.is_initialized());
        radio.set_high_power(true).unwrap();
        assert!(!radio.is_initialized());
        radio.set_tx_power(20).unwrap();
        assert!(radio.is_initialized());
    }

    #[test]
    fn test_tx_power_without_frequency_not_ready() {
        let mut radio = attached();
        radio.init(1, 2).unwrap();
        radio.set_tx_power(20).unwrap();
        assert!(!radio.is_initialized());
    }

    #[test]
    fn test_fault_until_cleared() {
        let mut radio = SimulatedRadio::new(FrequencyBand::Mhz868).fail_at(InitStage::Init);
        radio.attach_pins(BoardProfile::AdafruitM0.pins()).unwrap();
        assert_eq!(radio.init(1, 2), Err(SimError::Fault(InitStage::Init)));
        assert_eq!(radio.init(1, 2), Err(SimError::Fault(InitStage::Init)));
        radio.clear_fault();
        radio.init(1, 2).unwrap();
        assert_eq!(radio.init_attempts(), 3);
        assert_eq!(radio.node_id(), Some(2));
    }

    #[test]
    fn test_fault_leaves_value_unapplied() {
        let mut radio = attached().fail_at(InitStage::TxPower);
        radio.init(1, 2).unwrap();
        radio.set_frequency(868.0).unwrap();
        radio.set_high_power(true).unwrap();
        assert_eq!(radio.set_tx_power(20), Err(SimError::Fault(InitStage::TxPower)));
        assert_eq!(radio.tx_power_dbm(), None);
        assert!(!radio.is_initialized());
    }

    #[test]
    fn test_reset_clears_state() {
        let mut radio = attached();
        radio.init(1, 2).unwrap();
        radio.set_frequency(868.0).unwrap();
        radio.set_high_power(true).unwrap();
        radio.set_tx_power(20).unwrap();
        assert!(radio.is_initialized());
        radio.hardware_reset().unwrap();
        assert!(!radio.is_initialized());
        assert_eq!(radio.reset_count(), 1);
    }

    #[test]
    fn test_band_mismatch() {
        let mut radio = attached();
        radio.init(1, 2).unwrap();
        assert!(matches!(
            radio.set_frequency(434.0),
            Err(SimError::BandMismatch {
                band: FrequencyBand::Mhz868,
                ..
            })
        ));
        assert_eq!(radio.frequency_mhz(), None);
    }

    #[test]
    fn test_default_payload_limit() {
        let radio = SimulatedRadio::new(FrequencyBand::Mhz433);
        assert_eq!(radio.max_payload_len(), 255);
    }
}
