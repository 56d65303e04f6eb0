//! Streaming Data Plane
//!
//! Shared ring buffer, statistics block, chunk handoff and the USB-core
//! streaming session built on them.

pub mod buffer;
pub mod handoff;
pub mod session;
pub mod stats;

pub use buffer::{Chunk, ChunkGeometry, StreamingBuffer};
pub use handoff::ChunkHandoff;
pub use session::{run_for_mode, PollState, StreamSession};
pub use stats::{
    BlockOutcome, BufferStats, CounterView, RfCounter, StatsControl, StatsSnapshot, UsbCounter,
};
