//! Bulk Transport
//!
//! The streaming loop queues chunk indices on a per-direction channel; a
//! single bulk task moves each chunk through its endpoint in max-size
//! packets and reports the byte count to the USB-core counter when the
//! whole chunk has gone through. Flushing an endpoint drops queued chunks
//! and bumps its epoch, so a transfer already in flight finishes without
//! being counted.

use core::sync::atomic::{AtomicU32, Ordering};

use embassy_futures::select::{select, Either};
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use embassy_usb::driver::{EndpointError, EndpointIn, EndpointOut};

use crate::config::{BULK_BUFFER_NUM_CHUNKS, BULK_PACKET_SIZE};
use crate::platform::BulkTransport;
use crate::streaming::buffer::{Chunk, StreamingBuffer};
use crate::streaming::stats::UsbCounter;
use crate::types::BulkEndpoint;

type ChunkQueue = Channel<CriticalSectionRawMutex, usize, BULK_BUFFER_NUM_CHUNKS>;

/// Queues and flush epochs for both directions
pub struct BulkQueues {
    in_queue: ChunkQueue,
    out_queue: ChunkQueue,
    in_epoch: AtomicU32,
    out_epoch: AtomicU32,
}

impl BulkQueues {
    /// Empty queues for a `static`
    #[must_use]
    pub const fn new() -> Self {
        Self {
            in_queue: Channel::new(),
            out_queue: Channel::new(),
            in_epoch: AtomicU32::new(0),
            out_epoch: AtomicU32::new(0),
        }
    }

    fn queue(&self, endpoint: BulkEndpoint) -> &ChunkQueue {
        match endpoint {
            BulkEndpoint::In => &self.in_queue,
            BulkEndpoint::Out => &self.out_queue,
        }
    }

    fn epoch(&self, endpoint: BulkEndpoint) -> &AtomicU32 {
        match endpoint {
            BulkEndpoint::In => &self.in_epoch,
            BulkEndpoint::Out => &self.out_epoch,
        }
    }
}

impl Default for BulkQueues {
    fn default() -> Self {
        Self::new()
    }
}

/// [`BulkTransport`] handle feeding the bulk task
#[derive(Clone, Copy)]
pub struct ChannelTransport {
    queues: &'static BulkQueues,
}

impl ChannelTransport {
    /// Handle onto `queues`
    #[must_use]
    pub const fn new(queues: &'static BulkQueues) -> Self {
        Self { queues }
    }
}

impl BulkTransport for ChannelTransport {
    fn schedule_block(&mut self, endpoint: BulkEndpoint, chunk: Chunk<'_>) {
        if self.queues.queue(endpoint).try_send(chunk.index()).is_err() {
            warn!("bulk {:?} queue full, chunk {} dropped", endpoint, chunk.index());
        }
    }

    fn flush(&mut self, endpoint: BulkEndpoint) {
        self.queues.queue(endpoint).clear();
        self.queues.epoch(endpoint).fetch_add(1, Ordering::AcqRel);
        trace!("bulk {:?} flushed", endpoint);
    }
}

/// How a chunk transfer ended
enum Moved {
    Complete(u32),
    Flushed,
}

/// A flush that landed during the last packet still discards the chunk
#[allow(clippy::cast_possible_truncation)]
fn finish(chunk: Chunk<'_>, current: u32, started: u32) -> Moved {
    if current == started {
        Moved::Complete(chunk.len() as u32)
    } else {
        Moved::Flushed
    }
}

async fn send_chunk<E: EndpointIn>(
    ep: &mut E,
    chunk: Chunk<'_>,
    queues: &BulkQueues,
    epoch: u32,
) -> Result<Moved, EndpointError> {
    let mut packet = [0u8; BULK_PACKET_SIZE as usize];
    let mut at = 0;
    while at < chunk.len() {
        if queues.in_epoch.load(Ordering::Acquire) != epoch {
            return Ok(Moved::Flushed);
        }
        let n = chunk.read_at(at, &mut packet);
        ep.write(&packet[..n]).await?;
        at += n;
    }
    Ok(finish(chunk, queues.in_epoch.load(Ordering::Acquire), epoch))
}

async fn receive_chunk<E: EndpointOut>(
    ep: &mut E,
    chunk: Chunk<'_>,
    queues: &BulkQueues,
    epoch: u32,
) -> Result<Moved, EndpointError> {
    let mut packet = [0u8; BULK_PACKET_SIZE as usize];
    let mut at = 0;
    while at < chunk.len() {
        let n = ep.read(&mut packet).await?;
        if queues.out_epoch.load(Ordering::Acquire) != epoch {
            return Ok(Moved::Flushed);
        }
        at += chunk.write_at(at, &packet[..n]);
    }
    Ok(finish(chunk, queues.out_epoch.load(Ordering::Acquire), epoch))
}

/// Move queued chunks through the bulk endpoints, forever
pub async fn run_bulk<I, O, const SIZE: usize, const CHUNKS: usize>(
    mut ep_in: I,
    mut ep_out: O,
    buffer: &'static StreamingBuffer<SIZE, CHUNKS>,
    queues: &'static BulkQueues,
    counter: UsbCounter<'static>,
) -> !
where
    I: EndpointIn,
    O: EndpointOut,
{
    loop {
        ep_in.wait_enabled().await;
        info!("bulk endpoints enabled");

        loop {
            let (endpoint, index) =
                match select(queues.in_queue.receive(), queues.out_queue.receive()).await {
                    Either::First(index) => (BulkEndpoint::In, index),
                    Either::Second(index) => (BulkEndpoint::Out, index),
                };
            let Some(chunk) = buffer.chunk(index) else {
                continue;
            };
            let epoch = queues.epoch(endpoint).load(Ordering::Acquire);

            let moved = match endpoint {
                BulkEndpoint::In => send_chunk(&mut ep_in, chunk, queues, epoch).await,
                BulkEndpoint::Out => receive_chunk(&mut ep_out, chunk, queues, epoch).await,
            };

            match moved {
                Ok(Moved::Complete(bytes)) => {
                    counter.transfer_complete(bytes);
                    trace!("bulk {:?} chunk {} done", endpoint, index);
                }
                Ok(Moved::Flushed) => trace!("bulk {:?} chunk {} discarded", endpoint, index),
                Err(EndpointError::Disabled) => {
                    warn!("bulk endpoints disabled");
                    break;
                }
                Err(EndpointError::BufferOverflow) => {
                    error!("bulk {:?} packet overflow", endpoint);
                }
            }
        }
    }
}
