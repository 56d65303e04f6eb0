//! Transceiver Control
//!
//! Operating mode state machine and the settings it applies on activation.

pub mod mode;

pub use mode::{LimitSource, ModeCell, ModeProfile, ShortfallLimits, Transceiver};
