//! Hardware Abstraction Layer
//!
//! Pin-level wrappers over the STM32H755 GPIO used by the USB core.

pub mod gpio;
