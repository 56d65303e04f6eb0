//! Transceiver Mode State Machine
//!
//! Owns the current mode and sequences the hardware on every transition.
//! A transition always runs the full sequence, even when the requested mode
//! is already active:
//!
//! 1. disable baseband streaming
//! 2. reset the sweep timer
//! 3. flush both bulk endpoints
//! 4. record the new mode
//! 5. apply the mode profile (LEDs, RF direction, buffer tag, limit)
//! 6. for any mode but OFF: best clock source, hardware sync, stats reset
//!
//! Flushing before the new mode is recorded keeps stale transfers from the
//! previous session out of the new session's counters.

use core::sync::atomic::{AtomicU32, AtomicU8, Ordering};

use crate::platform::{Board, BulkTransport, RfFrontend};
use crate::streaming::stats::StatsControl;
use crate::types::{BufferMode, BulkEndpoint, HwSyncMode, LedPattern, RfPathDirection, TransceiverMode};

/// Mode flag read by the streaming loop
///
/// Besides the mode it counts transitions, so a session can tell that the
/// mode it runs in was set again. Only [`Transceiver`] stores to it.
pub struct ModeCell {
    mode: AtomicU8,
    generation: AtomicU32,
}

impl ModeCell {
    /// Cell holding OFF, generation 0
    #[must_use]
    pub const fn new() -> Self {
        Self {
            mode: AtomicU8::new(TransceiverMode::Off.as_u8()),
            generation: AtomicU32::new(0),
        }
    }

    /// Re-read the current mode
    #[must_use]
    pub fn load(&self) -> TransceiverMode {
        TransceiverMode::from_u16(u16::from(self.mode.load(Ordering::Acquire)))
            .unwrap_or(TransceiverMode::Off)
    }

    /// Number of transitions so far, wrapping
    #[must_use]
    pub fn generation(&self) -> u32 {
        self.generation.load(Ordering::Acquire)
    }

    fn store(&self, mode: TransceiverMode) {
        self.mode.store(mode.as_u8(), Ordering::Release);
        let next = self.generation.load(Ordering::Relaxed).wrapping_add(1);
        self.generation.store(next, Ordering::Release);
    }
}

impl Default for ModeCell {
    fn default() -> Self {
        Self::new()
    }
}

/// Which configured shortfall limit a mode publishes
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "embedded", derive(defmt::Format))]
pub enum LimitSource {
    /// RX overrun limit
    RxOverrun,
    /// TX underrun limit
    TxUnderrun,
    /// Leave the published limit as it is
    Keep,
}

/// Direction-specific side effects of entering a mode
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "embedded", derive(defmt::Format))]
pub struct ModeProfile {
    /// Indicator LEDs
    pub leds: LedPattern,
    /// RF path direction
    pub direction: RfPathDirection,
    /// Tag published for the RF core
    pub buffer_mode: BufferMode,
    /// Shortfall limit to publish
    pub limit: LimitSource,
}

impl ModeProfile {
    /// Profile for `mode`
    #[must_use]
    pub const fn for_mode(mode: TransceiverMode) -> Self {
        match mode {
            TransceiverMode::Rx | TransceiverMode::RxSweep => Self {
                leds: LedPattern::RX,
                direction: RfPathDirection::Rx,
                buffer_mode: BufferMode::Rx,
                limit: LimitSource::RxOverrun,
            },
            TransceiverMode::Tx => Self {
                leds: LedPattern::TX,
                direction: RfPathDirection::Tx,
                buffer_mode: BufferMode::TxStart,
                limit: LimitSource::TxUnderrun,
            },
            TransceiverMode::Off | TransceiverMode::CpldUpdate => Self {
                leds: LedPattern::OFF,
                direction: RfPathDirection::Off,
                buffer_mode: BufferMode::Idle,
                limit: LimitSource::Keep,
            },
        }
    }
}

/// Shortfall limits applied at the next activation
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "embedded", derive(defmt::Format))]
pub struct ShortfallLimits {
    /// Bytes of TX underrun tolerated (0 = unlimited)
    pub tx_underrun: u32,
    /// Bytes of RX overrun tolerated (0 = unlimited)
    pub rx_overrun: u32,
}

/// Mode state machine
pub struct Transceiver<'a, const SIZE: usize> {
    mode: &'a ModeCell,
    stats: StatsControl<'a, SIZE>,
    hw_sync: HwSyncMode,
    limits: ShortfallLimits,
}

impl<'a, const SIZE: usize> Transceiver<'a, SIZE> {
    /// State machine in OFF with default limits
    #[must_use]
    pub fn new(mode: &'a ModeCell, stats: StatsControl<'a, SIZE>) -> Self {
        Self {
            mode,
            stats,
            hw_sync: HwSyncMode::Off,
            limits: ShortfallLimits {
                tx_underrun: crate::config::DEFAULT_TX_UNDERRUN_LIMIT,
                rx_overrun: crate::config::DEFAULT_RX_OVERRUN_LIMIT,
            },
        }
    }

    /// Active mode
    #[must_use]
    pub fn mode(&self) -> TransceiverMode {
        self.mode.load()
    }

    /// Mode flag shared with the streaming loop
    #[must_use]
    pub const fn mode_cell(&self) -> &'a ModeCell {
        self.mode
    }

    /// Configured hardware sync mode
    #[must_use]
    pub const fn hw_sync_mode(&self) -> HwSyncMode {
        self.hw_sync
    }

    /// Select the hardware sync mode used at the next activation
    pub fn set_hw_sync_mode(&mut self, mode: HwSyncMode) {
        self.hw_sync = mode;
    }

    /// Configured shortfall limits
    #[must_use]
    pub const fn limits(&self) -> ShortfallLimits {
        self.limits
    }

    /// Store the TX underrun limit for the next activation
    pub fn set_tx_underrun_limit(&mut self, limit: u32) {
        self.limits.tx_underrun = limit;
    }

    /// Store the RX overrun limit for the next activation
    pub fn set_rx_overrun_limit(&mut self, limit: u32) {
        self.limits.rx_overrun = limit;
    }

    /// Statistics access for the host query
    #[must_use]
    pub const fn stats(&self) -> &StatsControl<'a, SIZE> {
        &self.stats
    }

    /// Run the transition sequence into `mode`
    pub fn set_mode<R, B, T>(&mut self, mode: TransceiverMode, rf: &mut R, board: &mut B, bulk: &mut T)
    where
        R: RfFrontend,
        B: Board,
        T: BulkTransport,
    {
        info!("transceiver mode {:?} -> {:?}", self.mode.load(), mode);

        board.baseband_streaming_disable();
        board.sweep_timer_reset();

        bulk.flush(BulkEndpoint::In);
        bulk.flush(BulkEndpoint::Out);

        self.mode.store(mode);

        let profile = ModeProfile::for_mode(mode);
        board.set_leds(profile.leds);
        rf.set_direction(profile.direction);
        self.stats.set_mode(profile.buffer_mode);
        match profile.limit {
            LimitSource::RxOverrun => self.stats.set_shortfall_limit(self.limits.rx_overrun),
            LimitSource::TxUnderrun => self.stats.set_shortfall_limit(self.limits.tx_underrun),
            LimitSource::Keep => {}
        }

        if mode != TransceiverMode::Off {
            board.activate_best_clock_source();
            board.hw_sync_enable(self.hw_sync);
            self.stats.reset_for_activation();
            debug!("stats reset, hw sync {:?}", self.hw_sync);
        }
    }
}
