//! System configuration and hardware constants
//!
//! USB identifiers, endpoint layout, RF core block size and the front-end
//! tables used to validate host requests. Shared memory addresses live in
//! [`crate::layout`] so the build script can read them too.

pub use crate::layout::{
    BUFFER_STATS_ADDR, BULK_BUFFER_ADDR, BULK_BUFFER_CHUNK_SIZE, BULK_BUFFER_NUM_CHUNKS,
    BULK_BUFFER_SIZE,
};

/// USB VID (use test VID for development)
pub const USB_VID: u16 = 0x1209;

/// USB PID (get from pid.codes for production)
pub const USB_PID: u16 = 0x0002;

/// Bulk IN endpoint address (RX samples to host)
pub const BULK_IN_EP_ADDR: u8 = 0x81;

/// Bulk OUT endpoint address (TX samples from host)
pub const BULK_OUT_EP_ADDR: u8 = 0x02;

/// Bulk endpoint max packet size (full speed)
pub const BULK_PACKET_SIZE: u16 = 64;

/// Control endpoint max packet size
pub const CONTROL_PACKET_SIZE: u8 = 64;

/// Largest control DATA stage any vendor request uses
pub const CONTROL_BUFFER_SIZE: usize = 64;

/// Bytes the RF core moves per sample-clock block
pub const RF_BLOCK_SIZE: u32 = 32;

/// Default TX underrun limit (0 = never fatal)
pub const DEFAULT_TX_UNDERRUN_LIMIT: u32 = 0;

/// Default RX overrun limit (0 = never fatal)
pub const DEFAULT_RX_OVERRUN_LIMIT: u32 = 0;

/// Front-end tuning and gain limits
pub mod frontend {
    //! Limits enforced by the front-end model before touching hardware

    /// Lowest tunable frequency
    pub const FREQ_MIN_HZ: u64 = 0;

    /// Highest tunable frequency
    pub const FREQ_MAX_HZ: u64 = 7_250_000_000;

    /// IF range accepted by explicit tuning
    pub const IF_MIN_HZ: u64 = 2_000_000_000;

    /// IF range accepted by explicit tuning
    pub const IF_MAX_HZ: u64 = 3_000_000_000;

    /// LO range accepted by explicit tuning (non-bypass paths)
    pub const LO_MIN_HZ: u64 = 84_375_000;

    /// LO range accepted by explicit tuning (non-bypass paths)
    pub const LO_MAX_HZ: u64 = 5_400_000_000;

    /// Highest sample rate after doubling
    pub const SAMPLE_RATE_MAX_HZ: u32 = 40_000_000;

    /// Lowest sample rate after doubling
    pub const SAMPLE_RATE_MIN_HZ: u32 = 4_000_000;

    /// LNA gain ceiling in dB
    pub const LNA_GAIN_MAX_DB: u16 = 40;

    /// LNA gain step in dB
    pub const LNA_GAIN_STEP_DB: u16 = 8;

    /// VGA gain ceiling in dB
    pub const VGA_GAIN_MAX_DB: u16 = 62;

    /// VGA gain step in dB
    pub const VGA_GAIN_STEP_DB: u16 = 2;

    /// TX VGA gain ceiling in dB
    pub const TXVGA_GAIN_MAX_DB: u16 = 47;

    /// Baseband filter bandwidths the front-end supports, ascending
    pub const BASEBAND_BANDWIDTHS_HZ: &[u32] = &[
        1_750_000, 2_500_000, 3_500_000, 5_000_000, 5_500_000, 6_000_000, 7_000_000,
        8_000_000, 9_000_000, 10_000_000, 12_000_000, 14_000_000, 15_000_000, 20_000_000,
        24_000_000, 28_000_000,
    ];
}
