//! RFM69 frequency bands.
//!
//! RFM69 modules are manufactured with a matching network for one band.
//! A module tuned outside its band will not link, even though the
//! synthesizer itself covers a wider range.

use super::ConfigError;
use std::fmt;

/// Synthesizer ranges supported by the RFM69 (MHz, inclusive).
pub const SYNTHESIZER_RANGES_MHZ: [(f32, f32); 3] =
    [(290.0, 340.0), (424.0, 510.0), (862.0, 1020.0)];

/// Check whether the RFM69 synthesizer can tune to `freq_mhz`.
pub fn is_tunable(freq_mhz: f32) -> bool {
    freq_mhz.is_finite()
        && SYNTHESIZER_RANGES_MHZ
            .iter()
            .any(|&(lo, hi)| (lo..=hi).contains(&freq_mhz))
}

/// Manufactured module band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FrequencyBand {
    /// 433 MHz ISM modules (424-510 MHz).
    Mhz433,
    /// 868 MHz SRD modules (862-890 MHz).
    Mhz868,
    /// 915 MHz ISM modules (890-1020 MHz).
    Mhz915,
}

impl FrequencyBand {
    /// Nominal frequency in MHz.
    pub fn nominal_mhz(self) -> f32 {
        match self {
            Self::Mhz433 => 433.0,
            Self::Mhz868 => 868.0,
            Self::Mhz915 => 915.0,
        }
    }

    /// Whether a module built for this band can operate at `freq_mhz`.
    pub fn contains(self, freq_mhz: f32) -> bool {
        match self {
            Self::Mhz433 => (424.0..=510.0).contains(&freq_mhz),
            Self::Mhz868 => (862.0..890.0).contains(&freq_mhz),
            Self::Mhz915 => (890.0..=1020.0).contains(&freq_mhz),
        }
    }

    /// Band a frequency belongs to, if any.
    pub fn for_frequency(freq_mhz: f32) -> Option<Self> {
        [Self::Mhz433, Self::Mhz868, Self::Mhz915]
            .into_iter()
            .find(|band| band.contains(freq_mhz))
    }
}

impl std::str::FromStr for FrequencyBand {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().trim_end_matches("mhz").trim() {
            "433" | "434" => Ok(Self::Mhz433),
            "868" => Ok(Self::Mhz868),
            "915" => Ok(Self::Mhz915),
            _ => Err(ConfigError::UnknownBand(s.to_string())),
        }
    }
}

impl fmt::Display for FrequencyBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} MHz", self.nominal_mhz())
    }
}
