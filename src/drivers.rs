//! Peripheral Drivers
//!
//! Board-level implementations of the collaborator traits in
//! [`crate::platform`], built on the pin wrappers in [`crate::hal`].

pub mod board;
pub mod display;
