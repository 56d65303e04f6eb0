//! Vendor request handlers

use super::device::Device;
use super::params::{SetFreqExplicitParams, SetFreqParams, SetSampleRateParams};
use super::setup::{ControlEndpoint, RequestStatus, TransferStage};
use crate::platform::{Board, BulkTransport, RfFrontend, UiIndicator};
use crate::types::{ConfigResult, HwSyncMode, RfPathFilter, TransceiverMode};

/// Acknowledge with an IN status packet if the driver accepted the change
fn ack_result<E: ControlEndpoint>(endpoint: &mut E, result: ConfigResult) -> RequestStatus {
    match result {
        Ok(()) => {
            endpoint.schedule_ack_in();
            RequestStatus::Ok
        }
        Err(e) => {
            warn!("rejected by driver: {:?}", e);
            RequestStatus::Stall
        }
    }
}

/// Boolean switch carried in `wValue`
const fn switch_value(value: u16) -> Option<bool> {
    match value {
        0 => Some(false),
        1 => Some(true),
        _ => None,
    }
}

impl<R, B, T, U, const SIZE: usize> Device<'_, R, B, T, U, SIZE>
where
    R: RfFrontend,
    B: Board,
    T: BulkTransport,
    U: UiIndicator,
{
    // ========================================================================
    // Mode and Sync
    // ========================================================================

    pub(super) fn set_transceiver_mode_request<E: ControlEndpoint>(
        &mut self,
        endpoint: &mut E,
        stage: TransferStage,
    ) -> RequestStatus {
        if stage != TransferStage::Setup {
            return RequestStatus::Ok;
        }
        let Some(mode) = TransceiverMode::from_u16(endpoint.setup().value) else {
            return RequestStatus::Stall;
        };
        self.set_transceiver_mode(mode);
        endpoint.schedule_ack_in();
        RequestStatus::Ok
    }

    pub(super) fn set_hw_sync_mode<E: ControlEndpoint>(
        &mut self,
        endpoint: &mut E,
        stage: TransferStage,
    ) -> RequestStatus {
        if stage != TransferStage::Setup {
            return RequestStatus::Ok;
        }
        let Some(mode) = HwSyncMode::from_u16(endpoint.setup().value) else {
            return RequestStatus::Stall;
        };
        self.transceiver.set_hw_sync_mode(mode);
        endpoint.schedule_ack_in();
        RequestStatus::Ok
    }

    // ========================================================================
    // Tuning
    // ========================================================================

    pub(super) fn set_freq<E: ControlEndpoint>(
        &mut self,
        endpoint: &mut E,
        stage: TransferStage,
    ) -> RequestStatus {
        match stage {
            TransferStage::Setup => {
                endpoint.schedule_block_out(SetFreqParams::LEN);
                RequestStatus::Ok
            }
            TransferStage::Data => {
                let Some(params) = SetFreqParams::from_bytes(endpoint.received()) else {
                    return RequestStatus::Stall;
                };
                self.pending.freq = params;
                let staged = &self.pending.freq;
                debug!("set freq {} MHz + {} Hz", staged.freq_mhz, staged.freq_hz);
                let result = self.peripherals.rf.set_frequency(staged.frequency_hz());
                ack_result(endpoint, result)
            }
            TransferStage::Status => RequestStatus::Ok,
        }
    }

    pub(super) fn set_freq_explicit<E: ControlEndpoint>(
        &mut self,
        endpoint: &mut E,
        stage: TransferStage,
    ) -> RequestStatus {
        match stage {
            TransferStage::Setup => {
                endpoint.schedule_block_out(SetFreqExplicitParams::LEN);
                RequestStatus::Ok
            }
            TransferStage::Data => {
                let Some(params) = SetFreqExplicitParams::from_bytes(endpoint.received()) else {
                    return RequestStatus::Stall;
                };
                self.pending.freq_explicit = params;
                let staged = &self.pending.freq_explicit;
                let Some(path) = RfPathFilter::from_u8(staged.path) else {
                    return RequestStatus::Stall;
                };
                let result = self.peripherals.rf.set_frequency_explicit(
                    staged.if_freq_hz,
                    staged.lo_freq_hz,
                    path,
                );
                ack_result(endpoint, result)
            }
            TransferStage::Status => RequestStatus::Ok,
        }
    }

    pub(super) fn set_sample_rate_frac<E: ControlEndpoint>(
        &mut self,
        endpoint: &mut E,
        stage: TransferStage,
    ) -> RequestStatus {
        match stage {
            TransferStage::Setup => {
                endpoint.schedule_block_out(SetSampleRateParams::LEN);
                RequestStatus::Ok
            }
            TransferStage::Data => {
                let Some(params) = SetSampleRateParams::from_bytes(endpoint.received()) else {
                    return RequestStatus::Stall;
                };
                self.pending.sample_rate = params;
                let staged = &self.pending.sample_rate;
                let Some(freq_hz) = staged.doubled_freq_hz() else {
                    return RequestStatus::Stall;
                };
                let result = self
                    .peripherals
                    .rf
                    .set_sample_rate_frac(freq_hz, staged.divider);
                ack_result(endpoint, result)
            }
            TransferStage::Status => RequestStatus::Ok,
        }
    }

    pub(super) fn set_baseband_filter_bandwidth<E: ControlEndpoint>(
        &mut self,
        endpoint: &mut E,
        stage: TransferStage,
    ) -> RequestStatus {
        if stage != TransferStage::Setup {
            return RequestStatus::Ok;
        }
        let hz = endpoint.setup().value_u32();
        let result = self.peripherals.rf.set_baseband_filter_bandwidth(hz);
        ack_result(endpoint, result)
    }

    // ========================================================================
    // Switches
    // ========================================================================

    pub(super) fn set_amp_enable<E: ControlEndpoint>(
        &mut self,
        endpoint: &mut E,
        stage: TransferStage,
    ) -> RequestStatus {
        if stage != TransferStage::Setup {
            return RequestStatus::Ok;
        }
        let Some(enable) = switch_value(endpoint.setup().value) else {
            return RequestStatus::Stall;
        };
        self.peripherals.rf.set_amp(enable);
        endpoint.schedule_ack_in();
        RequestStatus::Ok
    }

    pub(super) fn set_antenna_enable<E: ControlEndpoint>(
        &mut self,
        endpoint: &mut E,
        stage: TransferStage,
    ) -> RequestStatus {
        if stage != TransferStage::Setup {
            return RequestStatus::Ok;
        }
        let Some(enable) = switch_value(endpoint.setup().value) else {
            return RequestStatus::Stall;
        };
        self.peripherals.rf.set_antenna(enable);
        endpoint.schedule_ack_in();
        RequestStatus::Ok
    }

    // ========================================================================
    // Gains
    //
    // The driver result goes back to the host as a single byte. The UI only
    // hears about gains the driver actually applied.
    // ========================================================================

    pub(super) fn set_lna_gain<E: ControlEndpoint>(
        &mut self,
        endpoint: &mut E,
        stage: TransferStage,
    ) -> RequestStatus {
        if stage != TransferStage::Setup {
            return RequestStatus::Ok;
        }
        let db = endpoint.setup().index;
        let applied = self.peripherals.rf.set_lna_gain(db);
        endpoint.schedule_block_in(&[applied]);
        if applied != 0 {
            self.peripherals.ui.set_lna_gain(db);
        }
        endpoint.schedule_ack_out();
        RequestStatus::Ok
    }

    pub(super) fn set_vga_gain<E: ControlEndpoint>(
        &mut self,
        endpoint: &mut E,
        stage: TransferStage,
    ) -> RequestStatus {
        if stage != TransferStage::Setup {
            return RequestStatus::Ok;
        }
        let db = endpoint.setup().index;
        let applied = self.peripherals.rf.set_vga_gain(db);
        endpoint.schedule_block_in(&[applied]);
        if applied != 0 {
            self.peripherals.ui.set_vga_gain(db);
        }
        endpoint.schedule_ack_out();
        RequestStatus::Ok
    }

    pub(super) fn set_txvga_gain<E: ControlEndpoint>(
        &mut self,
        endpoint: &mut E,
        stage: TransferStage,
    ) -> RequestStatus {
        if stage != TransferStage::Setup {
            return RequestStatus::Ok;
        }
        let db = endpoint.setup().index;
        let applied = self.peripherals.rf.set_txvga_gain(db);
        endpoint.schedule_block_in(&[applied]);
        if applied != 0 {
            self.peripherals.ui.set_txvga_gain(db);
        }
        endpoint.schedule_ack_out();
        RequestStatus::Ok
    }

    // ========================================================================
    // Streaming Statistics
    // ========================================================================

    pub(super) fn read_buffer_stats<E: ControlEndpoint>(
        &mut self,
        endpoint: &mut E,
        stage: TransferStage,
    ) -> RequestStatus {
        if stage != TransferStage::Setup {
            return RequestStatus::Ok;
        }
        let bytes = self.transceiver.stats().snapshot().to_le_bytes();
        endpoint.schedule_block_in(&bytes);
        endpoint.schedule_ack_out();
        RequestStatus::Ok
    }

    pub(super) fn set_tx_underrun_limit<E: ControlEndpoint>(
        &mut self,
        endpoint: &mut E,
        stage: TransferStage,
    ) -> RequestStatus {
        if stage == TransferStage::Setup {
            let limit = endpoint.setup().value_u32();
            self.transceiver.set_tx_underrun_limit(limit);
            endpoint.schedule_ack_in();
        }
        RequestStatus::Ok
    }

    pub(super) fn set_rx_overrun_limit<E: ControlEndpoint>(
        &mut self,
        endpoint: &mut E,
        stage: TransferStage,
    ) -> RequestStatus {
        if stage == TransferStage::Setup {
            let limit = endpoint.setup().value_u32();
            self.transceiver.set_rx_overrun_limit(limit);
            endpoint.schedule_ack_in();
        }
        RequestStatus::Ok
    }
}
