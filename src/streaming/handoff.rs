//! Chunk Handoff Protocol
//!
//! Decides which chunk the USB core may hand to the bulk transport next.
//! The candidate is always the chunk after the last one queued; it is only
//! released when the RF core's counter does not point into it.
//!
//! With four chunks this keeps two full chunks of slack between producer
//! and consumer.

use super::buffer::ChunkGeometry;

/// Handoff state for one streaming session
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ChunkHandoff {
    geometry: ChunkGeometry,
    last_queued: usize,
}

impl ChunkHandoff {
    /// Fresh session; the first candidate is chunk 0
    #[must_use]
    pub const fn new(geometry: ChunkGeometry) -> Self {
        Self {
            geometry,
            last_queued: geometry.num_chunks() - 1,
        }
    }

    /// Session whose first chunk was queued without a check (TX start)
    #[must_use]
    pub const fn after_first(geometry: ChunkGeometry, first: usize) -> Self {
        Self {
            geometry,
            last_queued: first % geometry.num_chunks(),
        }
    }

    /// Chunk geometry in use
    #[must_use]
    pub const fn geometry(&self) -> ChunkGeometry {
        self.geometry
    }

    /// Chunk most recently handed to the transport
    #[must_use]
    pub const fn last_queued(&self) -> usize {
        self.last_queued
    }

    /// Chunk the peer is currently touching
    #[must_use]
    pub const fn peer_chunk(&self, peer_counter: u32) -> usize {
        self.geometry.chunk_of(peer_counter)
    }

    /// Next chunk in round-robin order
    #[must_use]
    pub const fn candidate(&self) -> usize {
        self.geometry.next(self.last_queued)
    }

    /// One handoff decision against a freshly read peer counter
    ///
    /// Returns the chunk to queue and records it as queued, or None if the
    /// peer is still inside the candidate.
    pub fn next_chunk(&mut self, peer_counter: u32) -> Option<usize> {
        let candidate = self.candidate();
        if candidate == self.peer_chunk(peer_counter) {
            return None;
        }
        self.last_queued = candidate;
        Some(candidate)
    }
}
