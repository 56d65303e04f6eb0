//! Streaming Session
//!
//! USB-core side of one RX or TX activation. The session busy-polls: every
//! iteration re-reads the mode flag and the RF-core counter exactly once and
//! queues at most one chunk. It ends as soon as the mode is set again, to
//! another mode or to the same one; queued transfers are left for the mode
//! state machine to flush. The caller starts a fresh session, which
//! re-enables streaming and begins the handoff at chunk 0.

use super::buffer::StreamingBuffer;
use super::handoff::ChunkHandoff;
use super::stats::CounterView;
use crate::platform::{Board, BulkTransport};
use crate::transceiver::mode::ModeCell;
use crate::types::{BulkEndpoint, TransceiverMode};

/// Result of one poll
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "embedded", derive(defmt::Format))]
pub enum PollState {
    /// A chunk was queued this iteration
    Queued(usize),
    /// The peer is still inside the candidate chunk
    Waiting,
    /// The mode was set again, the session is over
    Ended,
}

/// One streaming activation
pub struct StreamSession<'a, const SIZE: usize, const CHUNKS: usize> {
    buffer: &'a StreamingBuffer<SIZE, CHUNKS>,
    peer: CounterView<'a>,
    mode: &'a ModeCell,
    entered: TransceiverMode,
    generation: u32,
    endpoint: BulkEndpoint,
    handoff: ChunkHandoff,
}

impl<'a, const SIZE: usize, const CHUNKS: usize> StreamSession<'a, SIZE, CHUNKS> {
    /// Start a session for the mode currently active
    ///
    /// RX enables baseband streaming and waits for the first full chunk.
    /// TX queues chunk 0 unconditionally before enabling streaming; the RF
    /// core sends filler until that transfer lands. Returns None if the
    /// active mode has no bulk loop.
    pub fn start<B, T>(
        buffer: &'a StreamingBuffer<SIZE, CHUNKS>,
        peer: CounterView<'a>,
        mode: &'a ModeCell,
        board: &mut B,
        bulk: &mut T,
    ) -> Option<Self>
    where
        B: Board,
        T: BulkTransport,
    {
        let geometry = StreamingBuffer::<SIZE, CHUNKS>::geometry();
        let entered = mode.load();
        let generation = mode.generation();

        let session = match entered {
            TransceiverMode::Rx => Self {
                buffer,
                peer,
                mode,
                entered,
                generation,
                endpoint: BulkEndpoint::In,
                handoff: ChunkHandoff::new(geometry),
            },
            TransceiverMode::Tx => {
                let first = buffer.chunk(0)?;
                bulk.schedule_block(BulkEndpoint::Out, first);
                Self {
                    buffer,
                    peer,
                    mode,
                    entered,
                    generation,
                    endpoint: BulkEndpoint::Out,
                    handoff: ChunkHandoff::after_first(geometry, 0),
                }
            }
            TransceiverMode::Off | TransceiverMode::CpldUpdate | TransceiverMode::RxSweep => {
                return None;
            }
        };

        board.baseband_streaming_enable();
        debug!("stream session {:?} started", entered);
        Some(session)
    }

    /// Mode the session was started in
    #[must_use]
    pub const fn mode(&self) -> TransceiverMode {
        self.entered
    }

    /// Endpoint chunks are queued on
    #[must_use]
    pub const fn endpoint(&self) -> BulkEndpoint {
        self.endpoint
    }

    /// Chunk most recently queued
    #[must_use]
    pub const fn last_queued(&self) -> usize {
        self.handoff.last_queued()
    }

    /// One busy-poll iteration
    pub fn poll<T: BulkTransport>(&mut self, bulk: &mut T) -> PollState {
        if self.mode.load() != self.entered || self.mode.generation() != self.generation {
            return PollState::Ended;
        }

        let peer_counter = self.peer.load();
        let Some(index) = self.handoff.next_chunk(peer_counter) else {
            return PollState::Waiting;
        };

        match self.buffer.chunk(index) {
            Some(chunk) => {
                trace!("queue chunk {}", index);
                bulk.schedule_block(self.endpoint, chunk);
                PollState::Queued(index)
            }
            None => PollState::Ended,
        }
    }

    /// Poll until the mode is set again
    pub fn run<T: BulkTransport>(mut self, bulk: &mut T) {
        while self.poll(bulk) != PollState::Ended {}
        debug!("stream session {:?} ended", self.entered);
    }
}

/// Run the bulk loop for the active mode, returns when the mode is set again
///
/// Modes without a bulk loop return immediately.
pub fn run_for_mode<const SIZE: usize, const CHUNKS: usize, B, T>(
    buffer: &StreamingBuffer<SIZE, CHUNKS>,
    peer: CounterView<'_>,
    mode: &ModeCell,
    board: &mut B,
    bulk: &mut T,
) where
    B: Board,
    T: BulkTransport,
{
    if let Some(session) = StreamSession::start(buffer, peer, mode, board, bulk) {
        session.run(bulk);
    }
}
