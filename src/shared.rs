//! Shared region placed at a fixed address
//!
//! The RF core image links against the same [`crate::layout`] constants, so
//! the field offsets here are checked against them at compile time.

use core::mem::{offset_of, size_of};

use crate::layout::{
    BUFFER_STATS_ADDR, BUFFER_STATS_RESERVED, BULK_BUFFER_ADDR, BULK_BUFFER_NUM_CHUNKS,
    BULK_BUFFER_SIZE, SHARED_REGION_SIZE,
};
use crate::streaming::stats::STATS_WIRE_SIZE;
use crate::streaming::{BufferStats, StreamingBuffer};

/// Streaming buffer at production size
pub type BulkBuffer = StreamingBuffer<BULK_BUFFER_SIZE, BULK_BUFFER_NUM_CHUNKS>;

/// Statistics block at production size
pub type BulkStats = BufferStats<BULK_BUFFER_SIZE>;

/// Everything both cores share
#[repr(C)]
pub struct SharedRegion {
    /// Sample ring buffer
    pub buffer: BulkBuffer,
    /// Streaming statistics
    pub stats: BulkStats,
}

const _: () = {
    assert!(offset_of!(SharedRegion, buffer) == 0);
    assert!(offset_of!(SharedRegion, stats) == BUFFER_STATS_ADDR - BULK_BUFFER_ADDR);
    assert!(size_of::<BulkStats>() == STATS_WIRE_SIZE);
    assert!(size_of::<BulkStats>() <= BUFFER_STATS_RESERVED);
    assert!(size_of::<SharedRegion>() <= SHARED_REGION_SIZE);
};

impl SharedRegion {
    /// Region in its power-on state
    #[must_use]
    pub const fn new() -> Self {
        Self {
            buffer: BulkBuffer::new(),
            stats: BulkStats::new(),
        }
    }
}

impl Default for SharedRegion {
    fn default() -> Self {
        Self::new()
    }
}
