//! External collaborators
//!
//! The RF front-end, the board (baseband stream, LEDs, clocks, sync), the
//! bulk USB transport and the UI are capability providers. The control plane
//! only talks to them through these traits; embedded implementations live in
//! `drivers` and `usb`, tests provide recording mocks.

use crate::streaming::buffer::Chunk;
use crate::types::{BulkEndpoint, ConfigResult, HwSyncMode, LedPattern, RfPathDirection, RfPathFilter};

/// RF front-end driver
pub trait RfFrontend {
    /// Switch the signal path direction
    fn set_direction(&mut self, direction: RfPathDirection);

    /// Enable or disable the RF amplifier
    fn set_amp(&mut self, enable: bool);

    /// Enable or disable antenna port power
    fn set_antenna(&mut self, enable: bool);

    /// Tune to `hz`
    fn set_frequency(&mut self, hz: u64) -> ConfigResult;

    /// Tune with explicit IF, LO and image filter path
    fn set_frequency_explicit(&mut self, if_hz: u64, lo_hz: u64, path: RfPathFilter) -> ConfigResult;

    /// Set the sample clock to `freq_hz / divider`
    fn set_sample_rate_frac(&mut self, freq_hz: u32, divider: u32) -> ConfigResult;

    /// Set the baseband filter bandwidth
    fn set_baseband_filter_bandwidth(&mut self, hz: u32) -> ConfigResult;

    /// Set LNA gain; nonzero return means the gain was applied
    fn set_lna_gain(&mut self, db: u16) -> u8;

    /// Set RX VGA gain; nonzero return means the gain was applied
    fn set_vga_gain(&mut self, db: u16) -> u8;

    /// Set TX VGA gain; nonzero return means the gain was applied
    fn set_txvga_gain(&mut self, db: u16) -> u8;
}

/// Board-level control used by mode sequencing
pub trait Board {
    /// Start the real-time sample stream to/from the RF core
    fn baseband_streaming_enable(&mut self);

    /// Stop the real-time sample stream
    fn baseband_streaming_disable(&mut self);

    /// Forget any sweep/dwell timer state
    fn sweep_timer_reset(&mut self);

    /// Drive the mode indicator LEDs
    fn set_leds(&mut self, leds: LedPattern);

    /// Switch to the best reference clock available
    fn activate_best_clock_source(&mut self);

    /// Engage or release the external trigger input
    fn hw_sync_enable(&mut self, mode: HwSyncMode);
}

/// Bulk data plane
///
/// A scheduled chunk must eventually report its byte count through
/// [`UsbCounter::transfer_complete`](crate::streaming::stats::UsbCounter::transfer_complete)
/// unless it is flushed first.
pub trait BulkTransport {
    /// Queue a transfer of the whole chunk on `endpoint`
    fn schedule_block(&mut self, endpoint: BulkEndpoint, chunk: Chunk<'_>);

    /// Discard everything queued on `endpoint`
    fn flush(&mut self, endpoint: BulkEndpoint);
}

/// Front panel / display notifications
pub trait UiIndicator {
    /// LNA gain was changed
    fn set_lna_gain(&mut self, _db: u16) {}

    /// RX VGA gain was changed
    fn set_vga_gain(&mut self, _db: u16) {}

    /// TX VGA gain was changed
    fn set_txvga_gain(&mut self, _db: u16) {}
}

/// All collaborators a device needs
pub struct Peripherals<R, B, T, U> {
    /// RF front-end
    pub rf: R,
    /// Board control
    pub board: B,
    /// Bulk transport
    pub bulk: T,
    /// UI
    pub ui: U,
}
