//! Vendor Control Bridge
//!
//! embassy-usb hands a handler the whole control transfer at once: OUT
//! requests arrive with their data already received, IN requests provide a
//! buffer for the response. [`VendorControl`] replays that as the SETUP,
//! DATA and STATUS stages the request handlers expect.

use embassy_usb::control::{Direction, InResponse, OutResponse, Request, RequestType};
use embassy_usb::Handler;
use heapless::Vec;

use crate::config::CONTROL_BUFFER_SIZE;
use crate::control::{ControlEndpoint, Device, RequestStatus, SetupPacket, TransferStage};
use crate::platform::{Board, BulkTransport, RfFrontend, UiIndicator};

/// Acknowledge scheduled by a handler
#[derive(Clone, Copy, Debug, PartialEq, Eq, defmt::Format)]
enum Ack {
    In,
    Out,
}

/// One control transfer as seen by the request handlers
struct Transfer<'b> {
    setup: SetupPacket,
    received: &'b [u8],
    expected: Option<usize>,
    response: Vec<u8, CONTROL_BUFFER_SIZE>,
    ack: Option<Ack>,
}

impl<'b> Transfer<'b> {
    fn new(req: &Request, received: &'b [u8]) -> Self {
        let request_type = match req.direction {
            Direction::In => SetupPacket::VENDOR_IN,
            Direction::Out => SetupPacket::VENDOR_OUT,
        };
        Self {
            setup: SetupPacket {
                request_type,
                request: req.request,
                value: req.value,
                index: req.index,
                length: req.length,
            },
            received,
            expected: None,
            response: Vec::new(),
            ack: None,
        }
    }
}

impl ControlEndpoint for Transfer<'_> {
    fn setup(&self) -> SetupPacket {
        self.setup
    }

    fn schedule_block_in(&mut self, data: &[u8]) {
        self.response.clear();
        if self.response.extend_from_slice(data).is_err() {
            warn!("control response of {} bytes truncated", data.len());
            let n = self.response.capacity();
            let _ = self.response.extend_from_slice(&data[..n]);
        }
    }

    fn schedule_block_out(&mut self, len: usize) {
        self.expected = Some(len);
    }

    fn schedule_ack_in(&mut self) {
        self.ack = Some(Ack::In);
    }

    fn schedule_ack_out(&mut self) {
        self.ack = Some(Ack::Out);
    }

    fn received(&self) -> &[u8] {
        self.received
    }
}

/// [`Handler`] driving a [`Device`]
pub struct VendorControl<'a, R, B, T, U, const SIZE: usize> {
    device: Device<'a, R, B, T, U, SIZE>,
}

impl<'a, R, B, T, U, const SIZE: usize> VendorControl<'a, R, B, T, U, SIZE>
where
    R: RfFrontend,
    B: Board,
    T: BulkTransport,
    U: UiIndicator,
{
    /// Bridge for `device`
    pub fn new(device: Device<'a, R, B, T, U, SIZE>) -> Self {
        Self { device }
    }

    /// Underlying device
    pub fn device(&self) -> &Device<'a, R, B, T, U, SIZE> {
        &self.device
    }

    fn run(&mut self, transfer: &mut Transfer<'_>) -> RequestStatus {
        if self.device.handle_request(transfer, TransferStage::Setup) == RequestStatus::Stall {
            return RequestStatus::Stall;
        }
        if transfer.expected.is_some()
            && self.device.handle_request(transfer, TransferStage::Data) == RequestStatus::Stall
        {
            return RequestStatus::Stall;
        }
        self.device.handle_request(transfer, TransferStage::Status)
    }
}

impl<R, B, T, U, const SIZE: usize> Handler for VendorControl<'_, R, B, T, U, SIZE>
where
    R: RfFrontend,
    B: Board,
    T: BulkTransport,
    U: UiIndicator,
{
    fn control_out(&mut self, req: Request, data: &[u8]) -> Option<OutResponse> {
        if req.request_type != RequestType::Vendor {
            return None;
        }
        let mut transfer = Transfer::new(&req, data);
        Some(match self.run(&mut transfer) {
            RequestStatus::Ok => OutResponse::Accepted,
            RequestStatus::Stall => OutResponse::Rejected,
        })
    }

    fn control_in<'b>(&'b mut self, req: Request, buf: &'b mut [u8]) -> Option<InResponse<'b>> {
        if req.request_type != RequestType::Vendor {
            return None;
        }
        let mut transfer = Transfer::new(&req, &[]);
        if self.run(&mut transfer) == RequestStatus::Stall {
            return Some(InResponse::Rejected);
        }
        let n = transfer
            .response
            .len()
            .min(buf.len())
            .min(usize::from(req.length));
        buf[..n].copy_from_slice(&transfer.response[..n]);
        trace!("vendor request {} ack {:?}", req.request, transfer.ack);
        Some(InResponse::Accepted(&buf[..n]))
    }
}
