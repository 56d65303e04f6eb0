//! SDR USB-Core Firmware Library
//!
//! Control plane and streaming data plane for the USB-facing core of a
//! dual-core software defined radio peripheral. The RF core fills or drains
//! a shared ring buffer at the sample clock; this core moves the buffer to
//! and from the host over USB bulk endpoints and answers vendor control
//! requests that configure the radio.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     CONTROL PLANE                            │
//! │  Vendor Requests  │  Mode State Machine  │  Front-End Model  │
//! ├─────────────────────────────────────────────────────────────┤
//! │                     DATA PLANE                               │
//! │  Chunk Handoff  │  Stream Session  │  Statistics Block       │
//! ├─────────────────────────────────────────────────────────────┤
//! │                 SHARED MEMORY (fixed address)                │
//! │       64 KiB ring buffer (4 chunks)  │  8 x u32 stats        │
//! ├─────────────────────────────────────────────────────────────┤
//! │                HAL / DRIVER / USB LAYER                      │
//! │  GPIO  │  OLED  │  embassy-usb vendor class + bulk           │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Design Principles
//!
//! - **One writer per shared word**: the statistics block hands out
//!   per-core writer handles, the peer only ever gets a read-only view
//! - **Stall before commit**: request handlers validate everything before
//!   touching state
//! - **No unsafe in library code**: shared memory is made of atomics
//! - **Collaborators behind traits**: hardware sits behind `platform`
//!   traits so the whole control plane runs on the host under test

#![cfg_attr(feature = "embedded", no_std)]
#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

#[macro_use]
mod fmt;

// Re-export dependencies needed by the binary (only in embedded mode)
#[cfg(feature = "embedded")]
pub use embassy_executor;
#[cfg(feature = "embedded")]
pub use embassy_stm32;
#[cfg(feature = "embedded")]
pub use embassy_time;
#[cfg(feature = "embedded")]
pub use embassy_usb;

/// Shared memory addresses and sizes
pub mod layout;

/// System configuration and constants
pub mod config;

/// Shared types used across modules
pub mod types;

/// Collaborator traits (front-end, board, bulk transport, UI)
pub mod platform;

/// Validating RF front-end model
pub mod frontend;

/// Ring buffer, statistics block and chunk handoff
pub mod streaming;

/// Fixed-address region shared with the RF core
pub mod shared;

/// Transceiver mode state machine
pub mod transceiver;

/// Vendor control requests
pub mod control;

/// Hardware Abstraction Layer
///
/// Pin wrappers over STM32H755 GPIO.
#[cfg(feature = "embedded")]
pub mod hal;

/// Peripheral Drivers
///
/// Board control and the status display.
#[cfg(feature = "embedded")]
pub mod drivers;

/// USB Subsystem
///
/// Vendor control bridge and bulk transport.
#[cfg(feature = "embedded")]
pub mod usb;

/// User Interface
///
/// Status panel on the OLED.
#[cfg(feature = "embedded")]
pub mod ui;

/// Prelude module for common imports
pub mod prelude {
    //! Convenient re-exports for common types and traits.

    pub use crate::config::*;
    pub use crate::control::{ControlEndpoint, Device, RequestStatus, TransferStage};
    pub use crate::platform::{Board, BulkTransport, Peripherals, RfFrontend, UiIndicator};
    pub use crate::shared::SharedRegion;
    pub use crate::streaming::{PollState, StreamSession};
    pub use crate::transceiver::{ModeCell, Transceiver};
    pub use crate::types::*;

    // Embassy
    #[cfg(feature = "embedded")]
    pub use embassy_time::{Duration, Instant, Timer};

    // HAL traits
    #[cfg(feature = "embedded")]
    pub use embedded_hal::digital::{InputPin, OutputPin};

    // Logging
    #[cfg(feature = "embedded")]
    pub use defmt::{debug, error, info, trace, warn};
}
