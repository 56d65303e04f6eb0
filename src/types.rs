//! Shared types used across the USB-core firmware
//!
//! Wire-level enumerations decode through `from_u16`/`from_u8`, which return
//! `None` for values outside the known set so callers can stall before any
//! state is touched.

use core::fmt;

/// Transceiver operating mode
///
/// Exactly one mode is active at a time. The numeric values are the ones the
/// host sends in the setup packet's `value` field.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum TransceiverMode {
    /// Radio idle, no streaming
    #[default]
    Off = 0,
    /// Receive: RF core produces, USB core consumes
    Rx = 1,
    /// Transmit: USB core produces, RF core consumes
    Tx = 2,
    /// CPLD bitstream update
    CpldUpdate = 4,
    /// Frequency sweep receive
    RxSweep = 5,
}

impl TransceiverMode {
    /// Decode a mode from its wire value
    #[must_use]
    pub const fn from_u16(value: u16) -> Option<Self> {
        match value {
            0 => Some(Self::Off),
            1 => Some(Self::Rx),
            2 => Some(Self::Tx),
            4 => Some(Self::CpldUpdate),
            5 => Some(Self::RxSweep),
            _ => None,
        }
    }

    /// Wire value of this mode
    #[must_use]
    pub const fn as_u8(self) -> u8 {
        self as u8
    }

    /// Whether a bulk streaming loop runs in this mode
    #[must_use]
    pub const fn is_streaming(self) -> bool {
        matches!(self, Self::Rx | Self::Tx)
    }
}

#[cfg(feature = "embedded")]
impl defmt::Format for TransceiverMode {
    fn format(&self, f: defmt::Formatter) {
        match self {
            Self::Off => defmt::write!(f, "OFF"),
            Self::Rx => defmt::write!(f, "RX"),
            Self::Tx => defmt::write!(f, "TX"),
            Self::CpldUpdate => defmt::write!(f, "CPLD_UPDATE"),
            Self::RxSweep => defmt::write!(f, "RX_SWEEP"),
        }
    }
}

/// Hardware synchronisation input mode
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum HwSyncMode {
    /// Start streaming immediately
    #[default]
    Off = 0,
    /// Wait for the external trigger input
    On = 1,
}

impl HwSyncMode {
    /// Decode from the setup packet value
    #[must_use]
    pub const fn from_u16(value: u16) -> Option<Self> {
        match value {
            0 => Some(Self::Off),
            1 => Some(Self::On),
            _ => None,
        }
    }
}

#[cfg(feature = "embedded")]
impl defmt::Format for HwSyncMode {
    fn format(&self, f: defmt::Formatter) {
        match self {
            Self::Off => defmt::write!(f, "SYNC-OFF"),
            Self::On => defmt::write!(f, "SYNC-ON"),
        }
    }
}

/// Mode tag published in the statistics block for the RF core
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "embedded", derive(defmt::Format))]
#[repr(u32)]
pub enum BufferMode {
    /// Not streaming
    #[default]
    Idle = 0,
    /// RF core writes samples into the buffer
    Rx = 1,
    /// TX armed: the RF core sends filler until host data arrives
    TxStart = 2,
    /// TX running: a missing block is an underrun
    TxRun = 3,
}

impl BufferMode {
    /// Decode from the statistics block word
    #[must_use]
    pub const fn from_u32(value: u32) -> Option<Self> {
        match value {
            0 => Some(Self::Idle),
            1 => Some(Self::Rx),
            2 => Some(Self::TxStart),
            3 => Some(Self::TxRun),
            _ => None,
        }
    }

    /// Raw word stored in the statistics block
    #[must_use]
    pub const fn as_u32(self) -> u32 {
        self as u32
    }
}

/// Direction of the RF signal path
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "embedded", derive(defmt::Format))]
pub enum RfPathDirection {
    /// Everything switched off
    #[default]
    Off,
    /// Antenna to receiver
    Rx,
    /// Transmitter to antenna
    Tx,
}

/// Image-rejection filter path for explicit tuning
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "embedded", derive(defmt::Format))]
#[repr(u8)]
pub enum RfPathFilter {
    /// Mixer bypassed, IF used directly
    Bypass = 0,
    /// Low-pass image filter
    LowPass = 1,
    /// High-pass image filter
    HighPass = 2,
}

impl RfPathFilter {
    /// Decode from the explicit-frequency record
    #[must_use]
    pub const fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::Bypass),
            1 => Some(Self::LowPass),
            2 => Some(Self::HighPass),
            _ => None,
        }
    }
}

/// State of the two mode indicator LEDs
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "embedded", derive(defmt::Format))]
pub struct LedPattern {
    /// Receive indicator
    pub rx: bool,
    /// Transmit indicator
    pub tx: bool,
}

impl LedPattern {
    /// Both indicators dark
    pub const OFF: Self = Self { rx: false, tx: false };

    /// Receive indicator lit
    pub const RX: Self = Self { rx: true, tx: false };

    /// Transmit indicator lit
    pub const TX: Self = Self { rx: false, tx: true };
}

/// Bulk endpoint selector
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "embedded", derive(defmt::Format))]
pub enum BulkEndpoint {
    /// Device to host (RX samples)
    In,
    /// Host to device (TX samples)
    Out,
}

/// Configuration rejected by the RF front-end
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "embedded", derive(defmt::Format))]
pub enum ConfigError {
    /// Frequency outside the tunable range
    FrequencyOutOfRange,
    /// Baseband filter bandwidth not available
    BandwidthUnsupported,
    /// Sample rate or divider not achievable
    SampleRateUnsupported,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FrequencyOutOfRange => f.write_str("frequency out of range"),
            Self::BandwidthUnsupported => f.write_str("unsupported baseband bandwidth"),
            Self::SampleRateUnsupported => f.write_str("unsupported sample rate"),
        }
    }
}

/// Result of a front-end configuration call
pub type ConfigResult = Result<(), ConfigError>;
