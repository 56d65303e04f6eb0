//! Control Plane
//!
//! Vendor requests on the default control endpoint: setup decoding, staged
//! parameter records and the per-request handlers that drive the mode state
//! machine and the RF front-end.

pub mod device;
mod handlers;
pub mod params;
pub mod setup;

pub use device::Device;
pub use params::{PendingParams, SetFreqExplicitParams, SetFreqParams, SetSampleRateParams};
pub use setup::{ControlEndpoint, RequestStatus, SetupPacket, TransferStage, VendorRequest};
