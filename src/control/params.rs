//! Pending request parameters
//!
//! Records received in a control DATA stage. They only mean something while
//! the transfer that staged them is in flight and are overwritten by the
//! next request of the same kind. All fields are little-endian with C layout.

/// Set-frequency record: `{ freq_mhz: u32, freq_hz: u32 }`
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "embedded", derive(defmt::Format))]
pub struct SetFreqParams {
    /// Whole megahertz
    pub freq_mhz: u32,
    /// Remaining hertz
    pub freq_hz: u32,
}

impl SetFreqParams {
    /// Wire size
    pub const LEN: usize = 8;

    /// Decode; None unless exactly [`Self::LEN`] bytes
    #[must_use]
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        let bytes: &[u8; Self::LEN] = bytes.try_into().ok()?;
        Some(Self {
            freq_mhz: read_u32(bytes, 0),
            freq_hz: read_u32(bytes, 4),
        })
    }

    /// Encode for the host side of a transfer
    #[must_use]
    pub fn to_bytes(&self) -> [u8; Self::LEN] {
        let mut out = [0u8; Self::LEN];
        out[..4].copy_from_slice(&self.freq_mhz.to_le_bytes());
        out[4..].copy_from_slice(&self.freq_hz.to_le_bytes());
        out
    }

    /// Combined frequency in hertz
    #[must_use]
    pub const fn frequency_hz(&self) -> u64 {
        self.freq_mhz as u64 * 1_000_000 + self.freq_hz as u64
    }
}

/// Explicit tuning record: `{ if_freq_hz: u64, lo_freq_hz: u64, path: u8 }`
///
/// The C layout pads the record to 24 bytes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "embedded", derive(defmt::Format))]
pub struct SetFreqExplicitParams {
    /// Intermediate frequency
    pub if_freq_hz: u64,
    /// Front-end local oscillator frequency
    pub lo_freq_hz: u64,
    /// Raw image-rejection path value
    pub path: u8,
}

impl SetFreqExplicitParams {
    /// Wire size including padding
    pub const LEN: usize = 24;

    /// Decode; None unless exactly [`Self::LEN`] bytes
    #[must_use]
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        let bytes: &[u8; Self::LEN] = bytes.try_into().ok()?;
        Some(Self {
            if_freq_hz: read_u64(bytes, 0),
            lo_freq_hz: read_u64(bytes, 8),
            path: bytes[16],
        })
    }

    /// Encode for the host side of a transfer
    #[must_use]
    pub fn to_bytes(&self) -> [u8; Self::LEN] {
        let mut out = [0u8; Self::LEN];
        out[..8].copy_from_slice(&self.if_freq_hz.to_le_bytes());
        out[8..16].copy_from_slice(&self.lo_freq_hz.to_le_bytes());
        out[16] = self.path;
        out
    }
}

/// Fractional sample rate record: `{ freq_hz: u32, divider: u32 }`
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "embedded", derive(defmt::Format))]
pub struct SetSampleRateParams {
    /// Sample rate numerator in hertz
    pub freq_hz: u32,
    /// Integer divider
    pub divider: u32,
}

impl SetSampleRateParams {
    /// Wire size
    pub const LEN: usize = 8;

    /// Decode; None unless exactly [`Self::LEN`] bytes
    #[must_use]
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        let bytes: &[u8; Self::LEN] = bytes.try_into().ok()?;
        Some(Self {
            freq_hz: read_u32(bytes, 0),
            divider: read_u32(bytes, 4),
        })
    }

    /// Encode for the host side of a transfer
    #[must_use]
    pub fn to_bytes(&self) -> [u8; Self::LEN] {
        let mut out = [0u8; Self::LEN];
        out[..4].copy_from_slice(&self.freq_hz.to_le_bytes());
        out[4..].copy_from_slice(&self.divider.to_le_bytes());
        out
    }

    /// Rate handed to the sample clock, which counts both clock edges
    #[must_use]
    pub const fn doubled_freq_hz(&self) -> Option<u32> {
        self.freq_hz.checked_mul(2)
    }
}

/// Staging area for records received in DATA stages
///
/// A DATA stage decodes its record into here and the driver call is made
/// from the staged copy. The record stays until the next request of the
/// same kind overwrites it, whether or not the driver accepted it.
#[derive(Clone, Copy, Debug, Default)]
pub struct PendingParams {
    /// Last set-frequency record
    pub freq: SetFreqParams,
    /// Last explicit tuning record
    pub freq_explicit: SetFreqExplicitParams,
    /// Last sample rate record
    pub sample_rate: SetSampleRateParams,
}

fn read_u32(bytes: &[u8], at: usize) -> u32 {
    let mut word = [0u8; 4];
    word.copy_from_slice(&bytes[at..at + 4]);
    u32::from_le_bytes(word)
}

fn read_u64(bytes: &[u8], at: usize) -> u64 {
    let mut word = [0u8; 8];
    word.copy_from_slice(&bytes[at..at + 8]);
    u64::from_le_bytes(word)
}
