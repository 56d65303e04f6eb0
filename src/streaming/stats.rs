//! Buffer Statistics Block
//!
//! Fixed-layout record shared by both cores. Every field has exactly one
//! writer; the writer handles are handed out once by [`BufferStats::split`]:
//!
//! | field | writer |
//! |---|---|
//! | `rf_count`, margins, shortfalls | [`RfCounter`] (RF core) |
//! | `usb_count` | [`UsbCounter`] (USB transfer completion) |
//! | `mode`, `shortfall_limit` | [`StatsControl`] (mode state machine) |
//!
//! `StatsControl` also rewrites every field on mode activation, which only
//! happens while baseband streaming is disabled. The one exception to the
//! table is the TX phase: the RF core moves the tag from `TxStart` to `TxRun`
//! when the first block of host data arrives, and only if the tag still
//! reads `TxStart`.

use core::sync::atomic::{AtomicU32, Ordering};

use crate::types::BufferMode;

/// Size of the statistics record on the wire
pub const STATS_WIRE_SIZE: usize = 32;

/// Shared statistics record for a buffer of `SIZE` bytes
#[repr(C)]
pub struct BufferStats<const SIZE: usize> {
    mode: AtomicU32,
    rf_count: AtomicU32,
    usb_count: AtomicU32,
    max_margin: AtomicU32,
    min_margin: AtomicU32,
    num_shortfalls: AtomicU32,
    longest_shortfall: AtomicU32,
    shortfall_limit: AtomicU32,
}

impl<const SIZE: usize> BufferStats<SIZE> {
    #[allow(clippy::cast_possible_truncation)]
    const BUFFER_SIZE: u32 = SIZE as u32;

    /// Statistics in their power-on state
    #[must_use]
    pub const fn new() -> Self {
        Self {
            mode: AtomicU32::new(BufferMode::Idle.as_u32()),
            rf_count: AtomicU32::new(0),
            usb_count: AtomicU32::new(0),
            max_margin: AtomicU32::new(0),
            min_margin: AtomicU32::new(Self::BUFFER_SIZE),
            num_shortfalls: AtomicU32::new(0),
            longest_shortfall: AtomicU32::new(0),
            shortfall_limit: AtomicU32::new(0),
        }
    }

    /// Hand out the per-writer handles
    ///
    /// The exclusive borrow guarantees each handle exists once.
    pub fn split(&mut self) -> (RfCounter<'_, SIZE>, UsbCounter<'_>, StatsControl<'_, SIZE>) {
        let stats: &Self = self;
        (
            RfCounter {
                stats,
                shortfall_length: 0,
            },
            UsbCounter {
                usb_count: &stats.usb_count,
                rf_count: &stats.rf_count,
            },
            StatsControl { stats },
        )
    }

    /// Copy every field
    #[must_use]
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            mode: self.mode.load(Ordering::Acquire),
            rf_count: self.rf_count.load(Ordering::Acquire),
            usb_count: self.usb_count.load(Ordering::Acquire),
            max_margin: self.max_margin.load(Ordering::Relaxed),
            min_margin: self.min_margin.load(Ordering::Relaxed),
            num_shortfalls: self.num_shortfalls.load(Ordering::Relaxed),
            longest_shortfall: self.longest_shortfall.load(Ordering::Relaxed),
            shortfall_limit: self.shortfall_limit.load(Ordering::Relaxed),
        }
    }
}

impl<const SIZE: usize> Default for BufferStats<SIZE> {
    fn default() -> Self {
        Self::new()
    }
}

/// Read-only view of one counter, given to the peer
#[derive(Clone, Copy)]
pub struct CounterView<'a> {
    counter: &'a AtomicU32,
}

impl CounterView<'_> {
    /// Re-read the counter from shared memory
    #[must_use]
    pub fn load(&self) -> u32 {
        self.counter.load(Ordering::Acquire)
    }
}

/// USB-core writer of `usb_count`
pub struct UsbCounter<'a> {
    usb_count: &'a AtomicU32,
    rf_count: &'a AtomicU32,
}

impl<'a> UsbCounter<'a> {
    /// Bulk transfer completion: account the bytes moved
    ///
    /// This is the only write to `usb_count`.
    pub fn transfer_complete(&self, bytes: u32) {
        let next = self.usb_count.load(Ordering::Relaxed).wrapping_add(bytes);
        self.usb_count.store(next, Ordering::Release);
    }

    /// Current value of the USB-core counter
    #[must_use]
    pub fn count(&self) -> u32 {
        self.usb_count.load(Ordering::Relaxed)
    }

    /// View of the RF-core counter for the handoff loop
    #[must_use]
    pub fn rf_view(&self) -> CounterView<'a> {
        CounterView {
            counter: self.rf_count,
        }
    }
}

/// Outcome of one RF-core block
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "embedded", derive(defmt::Format))]
pub enum BlockOutcome {
    /// Block moved and counted
    Transferred,
    /// TX has not received data yet, filler emitted
    Filler,
    /// Overrun (RX) or underrun (TX), block lost
    Shortfall,
    /// Shortfall streak reached the configured limit
    LimitReached,
}

/// RF-core writer of `rf_count`, margins and shortfall fields
pub struct RfCounter<'a, const SIZE: usize> {
    stats: &'a BufferStats<SIZE>,
    shortfall_length: u32,
}

impl<'a, const SIZE: usize> RfCounter<'a, SIZE> {
    /// Current value of the RF-core counter
    #[must_use]
    pub fn count(&self) -> u32 {
        self.stats.rf_count.load(Ordering::Relaxed)
    }

    /// View of the USB-core counter
    #[must_use]
    pub fn usb_view(&self) -> CounterView<'a> {
        CounterView {
            counter: &self.stats.usb_count,
        }
    }

    /// Advance the counter after `bytes` have been committed to the buffer
    pub fn advance(&mut self, bytes: u32) {
        let next = self.count().wrapping_add(bytes);
        self.stats.rf_count.store(next, Ordering::Release);
    }

    /// Length of the shortfall streak in progress, 0 if none
    ///
    /// A streak never outlives the activation it started in: once the
    /// activation reset has cleared `num_shortfalls`, the streak is gone.
    #[must_use]
    pub fn shortfall_length(&self) -> u32 {
        if self.stats.num_shortfalls.load(Ordering::Relaxed) == 0 {
            0
        } else {
            self.shortfall_length
        }
    }

    /// Move one block of `len` bytes in the direction of the published mode
    ///
    /// `transfer` receives the buffer offset and must finish writing (RX) or
    /// reading (TX) the block before it returns; the counter only advances
    /// afterwards. In idle mode nothing happens.
    pub fn process_block(&mut self, len: u32, transfer: impl FnOnce(usize)) -> BlockOutcome {
        let mode = BufferMode::from_u32(self.stats.mode.load(Ordering::Acquire));
        let usb = self.usb_view().load();
        let rf = self.count();

        let margin = match mode {
            Some(BufferMode::Rx) => {
                BufferStats::<SIZE>::BUFFER_SIZE.saturating_sub(rf.wrapping_sub(usb))
            }
            Some(BufferMode::TxStart | BufferMode::TxRun) => usb.wrapping_sub(rf),
            Some(BufferMode::Idle) | None => {
                self.shortfall_length = 0;
                return BlockOutcome::Filler;
            }
        };

        if mode == Some(BufferMode::TxStart) {
            if margin < len {
                self.shortfall_length = 0;
                return BlockOutcome::Filler;
            }
            // a concurrent activation wins over the phase change
            let _ = self.stats.mode.compare_exchange(
                BufferMode::TxStart.as_u32(),
                BufferMode::TxRun.as_u32(),
                Ordering::AcqRel,
                Ordering::Acquire,
            );
        }

        if margin < len {
            return self.record_shortfall(len);
        }

        self.record_margin(margin);
        self.shortfall_length = 0;
        transfer((rf % BufferStats::<SIZE>::BUFFER_SIZE) as usize);
        self.advance(len);
        BlockOutcome::Transferred
    }

    fn record_margin(&self, margin: u32) {
        if margin > self.stats.max_margin.load(Ordering::Relaxed) {
            self.stats.max_margin.store(margin, Ordering::Relaxed);
        }
        if margin < self.stats.min_margin.load(Ordering::Relaxed) {
            self.stats.min_margin.store(margin, Ordering::Relaxed);
        }
    }

    fn record_shortfall(&mut self, len: u32) -> BlockOutcome {
        let n = self.stats.num_shortfalls.load(Ordering::Relaxed);
        if self.shortfall_length == 0 || n == 0 {
            self.shortfall_length = 0;
            self.stats
                .num_shortfalls
                .store(n.wrapping_add(1), Ordering::Relaxed);
        }
        self.shortfall_length = self.shortfall_length.saturating_add(len);
        if self.shortfall_length > self.stats.longest_shortfall.load(Ordering::Relaxed) {
            self.stats
                .longest_shortfall
                .store(self.shortfall_length, Ordering::Relaxed);
        }

        let limit = self.stats.shortfall_limit.load(Ordering::Relaxed);
        if limit != 0 && self.shortfall_length >= limit {
            BlockOutcome::LimitReached
        } else {
            BlockOutcome::Shortfall
        }
    }
}

/// Mode state machine access to the statistics block
pub struct StatsControl<'a, const SIZE: usize> {
    stats: &'a BufferStats<SIZE>,
}

impl<const SIZE: usize> StatsControl<'_, SIZE> {
    /// Publish the buffer mode tag
    pub fn set_mode(&self, mode: BufferMode) {
        self.stats.mode.store(mode.as_u32(), Ordering::Release);
    }

    /// Publish the shortfall limit for the coming session
    pub fn set_shortfall_limit(&self, limit: u32) {
        self.stats.shortfall_limit.store(limit, Ordering::Release);
    }

    /// Reset counters and extrema for a new session
    ///
    /// Margins go back to their neutral extremes: max to 0, min to the
    /// buffer size.
    pub fn reset_for_activation(&self) {
        self.stats.rf_count.store(0, Ordering::Relaxed);
        self.stats.usb_count.store(0, Ordering::Relaxed);
        self.stats.max_margin.store(0, Ordering::Relaxed);
        self.stats
            .min_margin
            .store(BufferStats::<SIZE>::BUFFER_SIZE, Ordering::Relaxed);
        self.stats.num_shortfalls.store(0, Ordering::Relaxed);
        self.stats.longest_shortfall.store(0, Ordering::Release);
    }

    /// Copy of the whole record for the host
    #[must_use]
    pub fn snapshot(&self) -> StatsSnapshot {
        self.stats.snapshot()
    }
}

/// Plain copy of the statistics record
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "embedded", derive(defmt::Format))]
pub struct StatsSnapshot {
    /// Buffer mode tag (see [`BufferMode`])
    pub mode: u32,
    /// Bytes moved by the RF core
    pub rf_count: u32,
    /// Bytes moved by the USB core
    pub usb_count: u32,
    /// Largest margin seen this session
    pub max_margin: u32,
    /// Smallest margin seen this session
    pub min_margin: u32,
    /// Number of shortfall streaks
    pub num_shortfalls: u32,
    /// Longest shortfall streak in bytes
    pub longest_shortfall: u32,
    /// Limit the RF core compares streaks against
    pub shortfall_limit: u32,
}

impl StatsSnapshot {
    /// Decoded buffer mode tag
    #[must_use]
    pub const fn buffer_mode(&self) -> Option<BufferMode> {
        BufferMode::from_u32(self.mode)
    }

    /// Little-endian wire encoding, field order as in shared memory
    #[must_use]
    pub fn to_le_bytes(&self) -> [u8; STATS_WIRE_SIZE] {
        let words = [
            self.mode,
            self.rf_count,
            self.usb_count,
            self.max_margin,
            self.min_margin,
            self.num_shortfalls,
            self.longest_shortfall,
            self.shortfall_limit,
        ];
        let mut out = [0u8; STATS_WIRE_SIZE];
        for (dst, word) in out.chunks_exact_mut(4).zip(words) {
            dst.copy_from_slice(&word.to_le_bytes());
        }
        out
    }

    /// Decode the wire encoding
    #[must_use]
    pub fn from_le_bytes(bytes: &[u8; STATS_WIRE_SIZE]) -> Self {
        let mut words = [0u32; 8];
        for (word, src) in words.iter_mut().zip(bytes.chunks_exact(4)) {
            *word = u32::from_le_bytes([src[0], src[1], src[2], src[3]]);
        }
        let [mode, rf_count, usb_count, max_margin, min_margin, num_shortfalls, longest_shortfall, shortfall_limit] =
            words;
        Self {
            mode,
            rf_count,
            usb_count,
            max_margin,
            min_margin,
            num_shortfalls,
            longest_shortfall,
            shortfall_limit,
        }
    }
}
