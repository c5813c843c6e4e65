//! Radio bring-up.
//!
//! [`initialize_radio`] applies a [`RadioConfig`] to a driver that has been
//! constructed but not yet initialized. It runs once during startup, before
//! any send or receive. Failures are returned as-is; retrying is the
//! caller's decision.

use super::RadioDriver;
use crate::config::{ConfigError, RadioConfig};
use log::{debug, info, warn};
use std::fmt;

/// Bring-up step, reported with driver failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitStage {
    /// Wiring chip select, interrupt and reset lines.
    AttachPins,
    /// Hardware reset pulse.
    Reset,
    /// Module initialization with network and node ids.
    Init,
    /// Carrier frequency.
    Frequency,
    /// High-power PA selection.
    HighPower,
    /// Transmit power.
    TxPower,
}

impl InitStage {
    /// Every step, in the order bring-up runs them.
    pub const ALL: [InitStage; 6] = [
        Self::AttachPins,
        Self::Reset,
        Self::Init,
        Self::Frequency,
        Self::HighPower,
        Self::TxPower,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AttachPins => "attach pins",
            Self::Reset => "reset",
            Self::Init => "init",
            Self::Frequency => "set frequency",
            Self::HighPower => "set high power",
            Self::TxPower => "set tx power",
        }
    }
}

impl fmt::Display for InitStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Why a bring-up request was refused before touching the hardware.
#[derive(Debug, Clone, PartialEq)]
pub enum Precondition {
    /// The driver has already been initialized.
    AlreadyInitialized,
    /// The configuration is invalid for this driver.
    InvalidConfig(ConfigError),
}

impl fmt::Display for Precondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AlreadyInitialized => write!(f, "radio already initialized"),
            Self::InvalidConfig(e) => write!(f, "invalid configuration: {}", e),
        }
    }
}

/// Bring-up errors.
#[derive(Debug)]
pub enum InitError<E> {
    /// Invalid driver state or configuration; no hardware was touched.
    PreconditionViolation(Precondition),
    /// The driver reported a failure.
    InitializationFailed { stage: InitStage, source: E },
}

impl<E> InitError<E> {
    /// Whether the request was refused before any hardware access.
    pub fn is_precondition(&self) -> bool {
        matches!(self, Self::PreconditionViolation(_))
    }

    /// Failed step, for driver errors.
    pub fn stage(&self) -> Option<InitStage> {
        match self {
            Self::PreconditionViolation(_) => None,
            Self::InitializationFailed { stage, .. } => Some(*stage),
        }
    }
}

impl<E> From<ConfigError> for InitError<E> {
    fn from(e: ConfigError) -> Self {
        Self::PreconditionViolation(Precondition::InvalidConfig(e))
    }
}

impl<E: fmt::Display> fmt::Display for InitError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PreconditionViolation(p) => write!(f, "precondition violated: {}", p),
            Self::InitializationFailed { stage, source } => {
                write!(f, "radio initialization failed at {}: {}", stage, source)
            }
        }
    }
}

impl<E: std::error::Error + 'static> std::error::Error for InitError<E> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::PreconditionViolation(Precondition::InvalidConfig(e)) => Some(e),
            Self::PreconditionViolation(Precondition::AlreadyInitialized) => None,
            Self::InitializationFailed { source, .. } => Some(source),
        }
    }
}

fn failed<E>(stage: InitStage) -> impl FnOnce(E) -> InitError<E> {
    move |source| InitError::InitializationFailed { stage, source }
}

/// Apply `config` to an uninitialized driver.
///
/// Wires the board's pins, pulses reset, initializes the module with the
/// network and node ids, then sets frequency and power. A driver that is
/// already initialized is rejected with
/// [`Precondition::AlreadyInitialized`] and left untouched.
pub fn initialize_radio<D: RadioDriver>(
    driver: &mut D,
    config: &RadioConfig,
) -> Result<(), InitError<D::Error>> {
    config.validate()?;
    config.check_payload_limit(driver.max_payload_len())?;

    if driver.is_initialized() {
        warn!("Refusing to re-initialize radio");
        return Err(InitError::PreconditionViolation(
            Precondition::AlreadyInitialized,
        ));
    }

    let pins = config.pins();
    info!(
        "Initializing RFM69 on {} (CS={}, INT={}, RST={})",
        config.board, pins.chip_select, pins.interrupt, pins.reset
    );

    driver
        .attach_pins(pins)
        .map_err(failed(InitStage::AttachPins))?;

    driver.hardware_reset().map_err(failed(InitStage::Reset))?;

    driver
        .init(config.network_id, config.node_id)
        .map_err(failed(InitStage::Init))?;
    debug!(
        "Radio up as node {} on network {}",
        config.node_id, config.network_id
    );

    driver
        .set_frequency(config.frequency_mhz)
        .map_err(failed(InitStage::Frequency))?;

    driver
        .set_high_power(config.is_high_power)
        .map_err(failed(InitStage::HighPower))?;

    driver
        .set_tx_power(config.tx_power_dbm)
        .map_err(failed(InitStage::TxPower))?;

    info!(
        "RFM69 initialized: {} MHz, {} dBm{}",
        config.frequency_mhz,
        config.tx_power_dbm,
        if config.is_high_power { " (high power)" } else { "" }
    );

    Ok(())
}
