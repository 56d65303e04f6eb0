//! USB Subsystem
//!
//! Vendor-class device with one bulk IN and one bulk OUT endpoint. Control
//! requests are bridged into [`crate::control`]; bulk transfers are fed
//! chunk by chunk from the streaming buffer.

pub mod bulk;
pub mod vendor;

pub use bulk::{run_bulk, BulkQueues, ChannelTransport};
pub use vendor::VendorControl;
