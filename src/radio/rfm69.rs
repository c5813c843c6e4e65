//! Register-level RFM69 driver.
//!
//! Blocking driver over `embedded-hal` 1.0 traits. Covers what board
//! bring-up needs: reset, version check, addressing, sync word, carrier
//! frequency and PA configuration.
//!
//! # Example
//!
//! ```ignore
//! use rfm69_node::config::RadioConfig;
//! use rfm69_node::radio::{initialize_radio, Rfm69};
//!
//! let mut radio = Rfm69::new(spi_device, reset_pin, delay);
//! initialize_radio(&mut radio, &RadioConfig::default())?;
//! ```

use super::RadioDriver;
use crate::config::{is_tunable, PinAssignment};
use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;
use embedded_hal::spi::SpiDevice;
use log::{debug, info};
use std::fmt;

/// Largest payload, bounded by `RegPayloadLength`.
///
/// Payloads above the 66-byte FIFO must be streamed while the packet is on air.
pub const MAX_PAYLOAD_LEN: usize = 255;

/// Value of `RegVersion` on RFM69 silicon.
pub const CHIP_VERSION: u8 = 0x24;

/// First sync byte; the second carries the network id.
const SYNC_PREFIX: u8 = 0x2D;

/// Longest register burst written in one transfer (the three FRF bytes).
const MAX_BURST_LEN: usize = 3;

/// Polls of `RegIrqFlags1` before giving up on ModeReady (1 ms apart).
const MODE_READY_POLLS: u32 = 100;

/// Register addresses.
mod reg {
    pub const OP_MODE: u8 = 0x01;
    pub const FRF_MSB: u8 = 0x07;
    pub const VERSION: u8 = 0x10;
    pub const PA_LEVEL: u8 = 0x11;
    pub const OCP: u8 = 0x13;
    pub const IRQ_FLAGS1: u8 = 0x27;
    pub const SYNC_CONFIG: u8 = 0x2E;
    pub const SYNC_VALUE1: u8 = 0x2F;
    pub const PACKET_CONFIG1: u8 = 0x37;
    pub const PAYLOAD_LENGTH: u8 = 0x38;
    pub const NODE_ADRS: u8 = 0x39;
    pub const BROADCAST_ADRS: u8 = 0x3A;
    pub const TEST_PA1: u8 = 0x5A;
    pub const TEST_PA2: u8 = 0x5C;
}

const WRITE_FLAG: u8 = 0x80;

const OP_MODE_STANDBY: u8 = 0x04;
const OP_MODE_MASK: u8 = 0x1C;
const IRQ1_MODE_READY: u8 = 0x80;

// SyncOn, FIFO fill on sync address, 2 sync bytes
const SYNC_CONFIG_2_BYTES: u8 = 0x88;
// Variable length, CRC on, accept node address or broadcast
const PACKET_CONFIG1_DEFAULT: u8 = 0x94;

const OCP_ON: u8 = 0x1A;
const OCP_OFF: u8 = 0x0F;
const TEST_PA1_NORMAL: u8 = 0x55;
const TEST_PA2_NORMAL: u8 = 0x70;

const PA0_ON: u8 = 0x80;
const PA1_ON: u8 = 0x40;
const PA2_ON: u8 = 0x20;
const OUTPUT_POWER_MASK: u8 = 0x1F;

/// Broadcast address written to `RegBroadcastAdrs`.
const BROADCAST_ADDRESS: u8 = 0xFF;

/// Convert a carrier frequency to the 24-bit FRF register value.
///
/// `FRF = f / Fstep` with `Fstep = 32 MHz / 2^19`, i.e. `f_MHz * 16384`.
pub fn frf_for_mhz(freq_mhz: f32) -> u32 {
    (freq_mhz as f64 * 16384.0).round() as u32
}

/// PA level register value for `dbm`, clamped to the module's range.
pub fn pa_level(dbm: i8, high_power: bool) -> u8 {
    if high_power {
        let p = dbm.clamp(-2, 20);
        if p <= 13 {
            // -2 to +13 dBm: PA1 only
            PA1_ON | ((p + 18) as u8 & OUTPUT_POWER_MASK)
        } else if p >= 18 {
            // +18 to +20 dBm: PA1+PA2 with boost
            PA1_ON | PA2_ON | ((p + 11) as u8 & OUTPUT_POWER_MASK)
        } else {
            // +14 to +17 dBm: PA1+PA2
            PA1_ON | PA2_ON | ((p + 14) as u8 & OUTPUT_POWER_MASK)
        }
    } else {
        let p = dbm.clamp(-18, 13);
        PA0_ON | ((p + 18) as u8 & OUTPUT_POWER_MASK)
    }
}

/// RFM69 driver.
///
/// Generic over SPI device, reset pin and delay provider. Chip select is
/// handled by the [`SpiDevice`]; DIO0 is not needed for bring-up.
pub struct Rfm69<SPI, RESET, D> {
    spi: SPI,
    reset: RESET,
    delay: D,
    pins: Option<PinAssignment>,
    module_up: bool,
    frequency_mhz: Option<f32>,
    high_power: bool,
    tx_power_dbm: i8,
    // Set only by the last bring-up step; any earlier step or a reset clears it.
    ready: bool,
}

impl<SPI, RESET, D> Rfm69<SPI, RESET, D>
where
    SPI: SpiDevice,
    RESET: OutputPin,
    D: DelayNs,
{
    /// Create a driver. Nothing is sent to the module until bring-up.
    #[must_use]
    pub fn new(spi: SPI, reset: RESET, delay: D) -> Self {
        Self {
            spi,
            reset,
            delay,
            pins: None,
            module_up: false,
            frequency_mhz: None,
            high_power: false,
            tx_power_dbm: 13,
            ready: false,
        }
    }

    /// Pins recorded by [`attach_pins`](RadioDriver::attach_pins).
    pub fn pins(&self) -> Option<PinAssignment> {
        self.pins
    }

    /// Tuned carrier frequency, once set.
    pub fn frequency_mhz(&self) -> Option<f32> {
        self.frequency_mhz
    }

    /// Last transmit power written, in dBm.
    pub fn tx_power_dbm(&self) -> i8 {
        self.tx_power_dbm
    }

    /// Read `RegVersion`.
    pub fn read_version(&mut self) -> Result<u8, Rfm69Error> {
        self.read_register(reg::VERSION)
    }

    /// Release the bus and pins.
    pub fn release(self) -> (SPI, RESET, D) {
        (self.spi, self.reset, self.delay)
    }

    fn set_standby(&mut self) -> Result<(), Rfm69Error> {
        let mode = self.read_register(reg::OP_MODE)?;
        self.write_register(reg::OP_MODE, (mode & !OP_MODE_MASK) | OP_MODE_STANDBY)?;

        for _ in 0..MODE_READY_POLLS {
            if self.read_register(reg::IRQ_FLAGS1)? & IRQ1_MODE_READY != 0 {
                return Ok(());
            }
            self.delay.delay_ms(1);
        }
        Err(Rfm69Error::Timeout)
    }

    fn require_pins(&self) -> Result<(), Rfm69Error> {
        if self.pins.is_none() {
            return Err(Rfm69Error::PinsNotAttached);
        }
        Ok(())
    }

    fn require_module_up(&self) -> Result<(), Rfm69Error> {
        if !self.module_up {
            return Err(Rfm69Error::NotInitialized);
        }
        Ok(())
    }

    fn write_register(&mut self, addr: u8, value: u8) -> Result<(), Rfm69Error> {
        self.write_many(addr, &[value])
    }

    fn write_many(&mut self, addr: u8, values: &[u8]) -> Result<(), Rfm69Error> {
        // Burst writes auto-increment the address.
        debug_assert!(
            values.len() <= MAX_BURST_LEN,
            "burst of {} bytes exceeds {}",
            values.len(),
            MAX_BURST_LEN
        );
        let mut buf = [0u8; MAX_BURST_LEN + 1];
        let len = values.len().min(MAX_BURST_LEN);
        buf[0] = addr | WRITE_FLAG;
        buf[1..=len].copy_from_slice(&values[..len]);
        self.spi
            .write(&buf[..=len])
            .map_err(|_| Rfm69Error::Spi)
    }

    fn read_register(&mut self, addr: u8) -> Result<u8, Rfm69Error> {
        let mut buf = [addr & !WRITE_FLAG, 0];
        self.spi
            .transfer_in_place(&mut buf)
            .map_err(|_| Rfm69Error::Spi)?;
        Ok(buf[1])
    }
}

impl<SPI, RESET, D> RadioDriver for Rfm69<SPI, RESET, D>
where
    SPI: SpiDevice,
    RESET: OutputPin,
    D: DelayNs,
{
    type Error = Rfm69Error;

    fn is_initialized(&self) -> bool {
        self.ready
    }

    fn max_payload_len(&self) -> usize {
        MAX_PAYLOAD_LEN
    }

    fn attach_pins(&mut self, pins: PinAssignment) -> Result<(), Rfm69Error> {
        debug!(
            "RFM69 wired: CS={} INT={} RST={}",
            pins.chip_select, pins.interrupt, pins.reset
        );
        self.pins = Some(pins);
        Ok(())
    }

    fn hardware_reset(&mut self) -> Result<(), Rfm69Error> {
        self.require_pins()?;
        debug!("Resetting radio");
        self.ready = false;
        self.module_up = false;
        self.frequency_mhz = None;

        self.reset.set_high().map_err(|_| Rfm69Error::Reset)?;
        self.delay.delay_us(100);
        self.reset.set_low().map_err(|_| Rfm69Error::Reset)?;
        self.delay.delay_ms(5);
        Ok(())
    }

    fn init(&mut self, network_id: u8, node_id: u8) -> Result<(), Rfm69Error> {
        self.require_pins()?;
        self.ready = false;

        let version = self.read_version()?;
        debug!("RFM69 version: {:#04x}", version);
        if version != CHIP_VERSION {
            return Err(Rfm69Error::UnexpectedVersion(version));
        }

        self.set_standby()?;

        self.write_register(reg::SYNC_CONFIG, SYNC_CONFIG_2_BYTES)?;
        self.write_many(reg::SYNC_VALUE1, &[SYNC_PREFIX, network_id])?;
        self.write_register(reg::PACKET_CONFIG1, PACKET_CONFIG1_DEFAULT)?;
        self.write_register(reg::PAYLOAD_LENGTH, MAX_PAYLOAD_LEN as u8)?;
        self.write_register(reg::NODE_ADRS, node_id)?;
        self.write_register(reg::BROADCAST_ADRS, BROADCAST_ADDRESS)?;

        self.module_up = true;
        info!("RFM69 up: network {}, node {}", network_id, node_id);
        Ok(())
    }

    fn set_frequency(&mut self, freq_mhz: f32) -> Result<(), Rfm69Error> {
        self.require_module_up()?;
        self.ready = false;
        if !is_tunable(freq_mhz) {
            return Err(Rfm69Error::FrequencyOutOfRange { mhz: freq_mhz });
        }

        let frf = frf_for_mhz(freq_mhz);
        let bytes = [(frf >> 16) as u8, (frf >> 8) as u8, frf as u8];
        self.write_many(reg::FRF_MSB, &bytes)?;

        self.frequency_mhz = Some(freq_mhz);
        debug!("FRF = {:#08x} ({} MHz)", frf, freq_mhz);
        Ok(())
    }

    fn set_high_power(&mut self, enabled: bool) -> Result<(), Rfm69Error> {
        self.require_module_up()?;
        // PA level depends on the PA path, so tx power must be applied again.
        self.ready = false;
        self.write_register(reg::OCP, if enabled { OCP_OFF } else { OCP_ON })?;
        // Boost is only switched on around TX; keep the PA in its receive setting.
        self.write_register(reg::TEST_PA1, TEST_PA1_NORMAL)?;
        self.write_register(reg::TEST_PA2, TEST_PA2_NORMAL)?;
        self.high_power = enabled;
        Ok(())
    }

    fn set_tx_power(&mut self, dbm: i8) -> Result<(), Rfm69Error> {
        self.require_module_up()?;
        self.ready = false;
        self.write_register(reg::PA_LEVEL, pa_level(dbm, self.high_power))?;
        self.tx_power_dbm = dbm;
        self.ready = self.frequency_mhz.is_some();
        Ok(())
    }
}

/// RFM69 driver errors.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Rfm69Error {
    /// SPI transfer failed.
    Spi,
    /// Reset pin could not be driven.
    Reset,
    /// `RegVersion` did not read back as an RFM69 (module absent or miswired).
    UnexpectedVersion(u8),
    /// Frequency outside the synthesizer's ranges.
    FrequencyOutOfRange { mhz: f32 },
    /// Bring-up attempted before pins were attached.
    PinsNotAttached,
    /// Configuration attempted before `init`.
    NotInitialized,
    /// Module never reported ModeReady.
    Timeout,
}

impl fmt::Display for Rfm69Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Spi => write!(f, "SPI transfer failed"),
            Self::Reset => write!(f, "cannot drive reset pin"),
            Self::UnexpectedVersion(v) => {
                write!(f, "unexpected chip version {:#04x} (expected {:#04x})", v, CHIP_VERSION)
            }
            Self::FrequencyOutOfRange { mhz } => {
                write!(f, "frequency {} MHz out of range", mhz)
            }
            Self::PinsNotAttached => write!(f, "pins not attached"),
            Self::NotInitialized => write!(f, "radio not initialized"),
            Self::Timeout => write!(f, "radio timeout"),
        }
    }
}

impl std::error::Error for Rfm69Error {}
