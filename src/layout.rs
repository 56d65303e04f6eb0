//! Shared memory layout between the USB core and the RF core
//!
//! Both core images resolve these addresses independently, so this file is
//! the only place they are defined. `build.rs` includes it verbatim to emit
//! the linker fragment that pins the shared region; the library re-exports it
//! as `sdr_usb_firmware::layout`. Keep it free of crate paths.

/// Base address of the streaming buffer (start of D2 SRAM1)
pub const BULK_BUFFER_ADDR: usize = 0x3000_0000;

/// Total streaming buffer size in bytes
pub const BULK_BUFFER_SIZE: usize = 0x1_0000;

/// Number of equal chunks the buffer is divided into
pub const BULK_BUFFER_NUM_CHUNKS: usize = 4;

/// Size of one chunk, the unit of USB handoff
pub const BULK_BUFFER_CHUNK_SIZE: usize = BULK_BUFFER_SIZE / BULK_BUFFER_NUM_CHUNKS;

/// Address of the buffer statistics block (directly after the buffer)
pub const BUFFER_STATS_ADDR: usize = BULK_BUFFER_ADDR + BULK_BUFFER_SIZE;

/// Bytes reserved for the statistics block
pub const BUFFER_STATS_RESERVED: usize = 0x40;

/// Total size of the shared region
pub const SHARED_REGION_SIZE: usize = BULK_BUFFER_SIZE + BUFFER_STATS_RESERVED;

/// Base of D3 SRAM, holds the clock/init handshake both cores read at boot
pub const RAM_D3_ADDR: usize = 0x3800_0000;

/// Size of D3 SRAM
pub const RAM_D3_SIZE: usize = 0x1_0000;
