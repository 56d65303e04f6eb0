//! Vendor Request Dispatch
//!
//! Every configuration request follows the same three-stage contract:
//!
//! - SETUP: complete immediately (validate the 16-bit fields, apply, ack),
//!   stage a receive of a parameter record, or stage a response record
//!   followed by an OUT ack.
//! - DATA: a handler that staged a record validates and applies it, then
//!   acks.
//! - anything else: no-op that reports success.
//!
//! A stall is always decided before anything is committed.

use super::params::PendingParams;
use super::setup::{ControlEndpoint, RequestStatus, TransferStage, VendorRequest};
use crate::platform::{Board, BulkTransport, Peripherals, RfFrontend, UiIndicator};
use crate::transceiver::Transceiver;
use crate::types::TransceiverMode;

/// USB-core control plane: mode state machine, collaborators and staging
pub struct Device<'a, R, B, T, U, const SIZE: usize> {
    pub(super) transceiver: Transceiver<'a, SIZE>,
    pub(super) peripherals: Peripherals<R, B, T, U>,
    pub(super) pending: PendingParams,
}

impl<'a, R, B, T, U, const SIZE: usize> Device<'a, R, B, T, U, SIZE>
where
    R: RfFrontend,
    B: Board,
    T: BulkTransport,
    U: UiIndicator,
{
    /// Assemble a device around its state machine and collaborators
    pub fn new(transceiver: Transceiver<'a, SIZE>, peripherals: Peripherals<R, B, T, U>) -> Self {
        Self {
            transceiver,
            peripherals,
            pending: PendingParams::default(),
        }
    }

    /// Mode state machine
    #[must_use]
    pub const fn transceiver(&self) -> &Transceiver<'a, SIZE> {
        &self.transceiver
    }

    /// Collaborators
    #[must_use]
    pub const fn peripherals(&self) -> &Peripherals<R, B, T, U> {
        &self.peripherals
    }

    /// Collaborators, mutably
    pub fn peripherals_mut(&mut self) -> &mut Peripherals<R, B, T, U> {
        &mut self.peripherals
    }

    /// Records staged by the most recent DATA stages
    #[must_use]
    pub const fn pending(&self) -> &PendingParams {
        &self.pending
    }

    /// Run a mode transition outside of a control transfer
    pub fn set_transceiver_mode(&mut self, mode: TransceiverMode) {
        let Peripherals { rf, board, bulk, .. } = &mut self.peripherals;
        self.transceiver.set_mode(mode, rf, board, bulk);
    }

    /// Route one stage of a vendor request to its handler
    pub fn handle_request<E: ControlEndpoint>(
        &mut self,
        endpoint: &mut E,
        stage: TransferStage,
    ) -> RequestStatus {
        let setup = endpoint.setup();
        let Some(request) = VendorRequest::from_u8(setup.request) else {
            warn!("unknown vendor request {}", setup.request);
            return RequestStatus::Stall;
        };

        let status = match request {
            VendorRequest::SetTransceiverMode => self.set_transceiver_mode_request(endpoint, stage),
            VendorRequest::SampleRateSet => self.set_sample_rate_frac(endpoint, stage),
            VendorRequest::BasebandFilterBandwidthSet => {
                self.set_baseband_filter_bandwidth(endpoint, stage)
            }
            VendorRequest::SetFreq => self.set_freq(endpoint, stage),
            VendorRequest::AmpEnable => self.set_amp_enable(endpoint, stage),
            VendorRequest::SetLnaGain => self.set_lna_gain(endpoint, stage),
            VendorRequest::SetVgaGain => self.set_vga_gain(endpoint, stage),
            VendorRequest::SetTxvgaGain => self.set_txvga_gain(endpoint, stage),
            VendorRequest::AntennaEnable => self.set_antenna_enable(endpoint, stage),
            VendorRequest::SetFreqExplicit => self.set_freq_explicit(endpoint, stage),
            VendorRequest::SetHwSyncMode => self.set_hw_sync_mode(endpoint, stage),
            VendorRequest::ReadBufferStats => self.read_buffer_stats(endpoint, stage),
            VendorRequest::SetTxUnderrunLimit => self.set_tx_underrun_limit(endpoint, stage),
            VendorRequest::SetRxOverrunLimit => self.set_rx_overrun_limit(endpoint, stage),
        };

        if status == RequestStatus::Stall {
            warn!("stall {:?} in {:?} stage", request, stage);
        }
        status
    }
}
