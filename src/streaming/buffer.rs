//! Streaming Ring Buffer
//!
//! Fixed-size byte buffer shared with the RF core, partitioned into equal
//! chunks. Bytes are `AtomicU8` cells so both cores (and the USB DMA) can
//! hold shared references without `unsafe`; the handoff protocol guarantees
//! that a chunk is only touched by its current owner.

use core::ops::Range;
use core::sync::atomic::{AtomicU8, Ordering};

/// Chunk arithmetic for a buffer of `buffer_size` bytes split into `num_chunks`
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ChunkGeometry {
    buffer_size: u32,
    num_chunks: u32,
}

impl ChunkGeometry {
    /// Build a geometry, returns None unless there are at least three chunks
    /// and the buffer divides evenly into them
    ///
    /// Counters wrap at `u32::MAX`, so only power-of-two buffer sizes keep
    /// `counter % buffer_size` continuous across the wrap.
    #[must_use]
    pub const fn new(buffer_size: u32, num_chunks: u32) -> Option<Self> {
        if num_chunks < 3 || buffer_size == 0 || buffer_size % num_chunks != 0 {
            return None;
        }
        Some(Self {
            buffer_size,
            num_chunks,
        })
    }

    /// Total buffer size in bytes
    #[must_use]
    pub const fn buffer_size(self) -> u32 {
        self.buffer_size
    }

    /// Number of chunks
    #[must_use]
    pub const fn num_chunks(self) -> usize {
        self.num_chunks as usize
    }

    /// Bytes per chunk
    #[must_use]
    pub const fn chunk_size(self) -> u32 {
        self.buffer_size / self.num_chunks
    }

    /// Chunk a byte counter currently points into
    #[must_use]
    pub const fn chunk_of(self, counter: u32) -> usize {
        ((counter % self.buffer_size) / self.chunk_size()) as usize
    }

    /// Chunk following `chunk` in round-robin order
    #[must_use]
    pub const fn next(self, chunk: usize) -> usize {
        (chunk + 1) % self.num_chunks()
    }

    /// Byte offset of a chunk within the buffer
    #[must_use]
    pub const fn offset_of(self, chunk: usize) -> usize {
        chunk * self.chunk_size() as usize
    }
}

#[cfg(feature = "embedded")]
impl defmt::Format for ChunkGeometry {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "{}x{}B", self.num_chunks, self.chunk_size());
    }
}

#[allow(clippy::declare_interior_mutable_const)]
const ZERO: AtomicU8 = AtomicU8::new(0);

/// Streaming buffer of `SIZE` bytes in `CHUNKS` chunks
#[repr(C, align(32))]
pub struct StreamingBuffer<const SIZE: usize, const CHUNKS: usize> {
    bytes: [AtomicU8; SIZE],
}

impl<const SIZE: usize, const CHUNKS: usize> StreamingBuffer<SIZE, CHUNKS> {
    const VALID: () = {
        assert!(SIZE.is_power_of_two(), "buffer size must be a power of two");
        assert!(CHUNKS.is_power_of_two(), "chunk count must be a power of two");
        assert!(CHUNKS >= 4, "handoff needs at least four chunks of slack");
        assert!(SIZE <= u32::MAX as usize, "counters are 32 bits wide");
    };

    /// Bytes per chunk
    pub const CHUNK_SIZE: usize = SIZE / CHUNKS;

    /// Create a zeroed buffer
    #[must_use]
    #[allow(clippy::let_unit_value)]
    pub const fn new() -> Self {
        let () = Self::VALID;
        Self {
            bytes: [ZERO; SIZE],
        }
    }

    /// Chunk arithmetic for this buffer
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub const fn geometry() -> ChunkGeometry {
        ChunkGeometry {
            buffer_size: SIZE as u32,
            num_chunks: CHUNKS as u32,
        }
    }

    /// Borrow one chunk, None if `index` is out of range
    #[must_use]
    pub fn chunk(&self, index: usize) -> Option<Chunk<'_>> {
        if index >= CHUNKS {
            return None;
        }
        let range = Self::chunk_range(index);
        Some(Chunk {
            index,
            offset: range.start,
            bytes: &self.bytes[range],
        })
    }

    /// Iterate over all chunks in index order
    pub fn chunks(&self) -> impl Iterator<Item = Chunk<'_>> {
        self.bytes
            .chunks_exact(Self::CHUNK_SIZE)
            .enumerate()
            .map(|(index, bytes)| Chunk {
                index,
                offset: index * Self::CHUNK_SIZE,
                bytes,
            })
    }

    /// Base address, used to check link-time placement
    #[must_use]
    pub fn as_ptr(&self) -> *const u8 {
        self.bytes.as_ptr().cast()
    }

    fn chunk_range(index: usize) -> Range<usize> {
        let start = index * Self::CHUNK_SIZE;
        start..start + Self::CHUNK_SIZE
    }
}

impl<const SIZE: usize, const CHUNKS: usize> Default for StreamingBuffer<SIZE, CHUNKS> {
    fn default() -> Self {
        Self::new()
    }
}

/// One chunk of the streaming buffer
#[derive(Clone, Copy)]
pub struct Chunk<'a> {
    index: usize,
    offset: usize,
    bytes: &'a [AtomicU8],
}

impl<'a> Chunk<'a> {
    /// Chunk index
    #[must_use]
    pub const fn index(&self) -> usize {
        self.index
    }

    /// Byte offset within the buffer
    #[must_use]
    pub const fn offset(&self) -> usize {
        self.offset
    }

    /// Length in bytes
    #[must_use]
    pub const fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Always false, chunks are never empty
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Start address for DMA descriptors
    #[must_use]
    pub fn as_ptr(&self) -> *const u8 {
        self.bytes.as_ptr().cast()
    }

    /// Copy bytes starting at `at` into `out`, returns bytes copied
    pub fn read_at(&self, at: usize, out: &mut [u8]) -> usize {
        let src = self.bytes.get(at..).unwrap_or(&[]);
        let n = src.len().min(out.len());
        for (dst, cell) in out.iter_mut().zip(&src[..n]) {
            *dst = cell.load(Ordering::Relaxed);
        }
        n
    }

    /// Copy `data` into the chunk starting at `at`, returns bytes copied
    pub fn write_at(&self, at: usize, data: &[u8]) -> usize {
        let dst = self.bytes.get(at..).unwrap_or(&[]);
        let n = dst.len().min(data.len());
        for (cell, &byte) in dst[..n].iter().zip(data) {
            cell.store(byte, Ordering::Relaxed);
        }
        n
    }

    /// Set every byte of the chunk to `value`
    pub fn fill(&self, value: u8) {
        for cell in self.bytes {
            cell.store(value, Ordering::Relaxed);
        }
    }
}

impl core::fmt::Debug for Chunk<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Chunk")
            .field("index", &self.index)
            .field("offset", &self.offset)
            .field("len", &self.bytes.len())
            .finish()
    }
}

#[cfg(feature = "embedded")]
impl defmt::Format for Chunk<'_> {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "Chunk({}@{:#X})", self.index, self.offset);
    }
}
