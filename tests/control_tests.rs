//! Vendor Request Tests
//!
//! Tests for the control-transfer handlers: stage contract, parameter
//! records, validation and stalls.
//! Run with: cargo test --test control_tests

mod common;

use common::{vendor_in, vendor_out, Call, CallLog, EndpointCall, Fixture, MockEndpoint, TEST_BUFFER_SIZE};
use sdr_usb_firmware::control::{
    RequestStatus, SetFreqExplicitParams, SetFreqParams, SetSampleRateParams, SetupPacket,
    TransferStage, VendorRequest,
};
use sdr_usb_firmware::streaming::StatsSnapshot;
use sdr_usb_firmware::types::{
    BufferMode, ConfigError, HwSyncMode, RfPathFilter, TransceiverMode,
};

/// Setup packet for a request whose 32-bit argument is split over value/index
fn split_u32(request: VendorRequest, arg: u32) -> SetupPacket {
    vendor_out(request, (arg & 0xFFFF) as u16, (arg >> 16) as u16, 0)
}

// =============================================================================
// Dispatch
// =============================================================================

#[test]
fn test_unknown_request_stalls() {
    let log = CallLog::default();
    let mut fixture = Fixture::new();
    let mut device = fixture.device(&log);

    let mut ep = MockEndpoint::new(SetupPacket {
        request_type: SetupPacket::VENDOR_OUT,
        request: 99,
        value: 0,
        index: 0,
        length: 0,
    });
    assert_eq!(device.handle_request(&mut ep, TransferStage::Setup), RequestStatus::Stall);
    assert!(ep.calls.is_empty());
    assert!(log.calls().is_empty());
}

#[test]
fn test_non_setup_stages_are_noops() {
    let log = CallLog::default();
    let mut fixture = Fixture::new();
    let mut device = fixture.device(&log);

    let requests = [
        split_u32(VendorRequest::BasebandFilterBandwidthSet, 1_750_000),
        vendor_out(VendorRequest::AmpEnable, 1, 0, 0),
        vendor_out(VendorRequest::AntennaEnable, 1, 0, 0),
        vendor_out(VendorRequest::SetTransceiverMode, 1, 0, 0),
        vendor_out(VendorRequest::SetHwSyncMode, 1, 0, 0),
        vendor_in(VendorRequest::SetLnaGain, 0, 8, 1),
        vendor_in(VendorRequest::ReadBufferStats, 0, 0, 32),
        split_u32(VendorRequest::SetTxUnderrunLimit, 1),
    ];
    for setup in requests {
        for stage in [TransferStage::Data, TransferStage::Status] {
            let mut ep = MockEndpoint::new(setup);
            assert_eq!(device.handle_request(&mut ep, stage), RequestStatus::Ok);
            assert!(ep.calls.is_empty());
        }
    }
    assert!(log.calls().is_empty());
}

// =============================================================================
// Transceiver Mode
// =============================================================================

#[test]
fn test_set_mode_rx_acks_and_activates() {
    let log = CallLog::default();
    let mut fixture = Fixture::new();
    let mut device = fixture.device(&log);

    let mut ep = MockEndpoint::new(vendor_out(VendorRequest::SetTransceiverMode, 1, 0, 0));
    assert_eq!(device.handle_request(&mut ep, TransferStage::Setup), RequestStatus::Ok);
    assert_eq!(ep.calls, vec![EndpointCall::AckIn]);
    assert_eq!(device.transceiver().mode(), TransceiverMode::Rx);
    assert_eq!(
        device.transceiver().stats().snapshot().buffer_mode(),
        Some(BufferMode::Rx)
    );
    assert!(log.contains(&Call::BestClock));
}

#[test]
fn test_invalid_mode_stalls_without_side_effects() {
    let log = CallLog::default();
    let mut fixture = Fixture::new();
    let mut device = fixture.device(&log);
    device.set_transceiver_mode(TransceiverMode::Rx);
    let before = device.transceiver().stats().snapshot();
    log.clear();

    for value in [3, 6, 99, 0xFFFF] {
        let mut ep = MockEndpoint::new(vendor_out(VendorRequest::SetTransceiverMode, value, 0, 0));
        assert_eq!(device.handle_request(&mut ep, TransferStage::Setup), RequestStatus::Stall);
        assert!(ep.calls.is_empty());
    }

    assert_eq!(device.transceiver().mode(), TransceiverMode::Rx);
    assert_eq!(device.transceiver().stats().snapshot(), before);
    assert!(log.calls().is_empty(), "no collaborator may be touched");
}

#[test]
fn test_hw_sync_mode_validated() {
    let log = CallLog::default();
    let mut fixture = Fixture::new();
    let mut device = fixture.device(&log);

    let mut ep = MockEndpoint::new(vendor_out(VendorRequest::SetHwSyncMode, 1, 0, 0));
    assert_eq!(device.handle_request(&mut ep, TransferStage::Setup), RequestStatus::Ok);
    assert_eq!(ep.calls, vec![EndpointCall::AckIn]);
    assert_eq!(device.transceiver().hw_sync_mode(), HwSyncMode::On);

    let mut ep = MockEndpoint::new(vendor_out(VendorRequest::SetHwSyncMode, 2, 0, 0));
    assert_eq!(device.handle_request(&mut ep, TransferStage::Setup), RequestStatus::Stall);
    assert_eq!(device.transceiver().hw_sync_mode(), HwSyncMode::On);

    // applied at the next activation
    device.set_transceiver_mode(TransceiverMode::Tx);
    assert!(log.contains(&Call::HwSync(HwSyncMode::On)));
}

// =============================================================================
// Tuning
// =============================================================================

#[test]
fn test_set_freq_two_stage() {
    let log = CallLog::default();
    let mut fixture = Fixture::new();
    let mut device = fixture.device(&log);
    let setup = vendor_out(VendorRequest::SetFreq, 0, 0, 8);

    let mut ep = MockEndpoint::new(setup);
    assert_eq!(device.handle_request(&mut ep, TransferStage::Setup), RequestStatus::Ok);
    assert_eq!(ep.calls, vec![EndpointCall::BlockOut(SetFreqParams::LEN)]);
    assert!(log.calls().is_empty(), "nothing applied before DATA");

    let params = SetFreqParams {
        freq_mhz: 915,
        freq_hz: 250_000,
    };
    let mut ep = MockEndpoint::with_data(setup, &params.to_bytes());
    assert_eq!(device.handle_request(&mut ep, TransferStage::Data), RequestStatus::Ok);
    assert_eq!(ep.calls, vec![EndpointCall::AckIn]);
    assert_eq!(log.calls(), vec![Call::Frequency(915_250_000)]);
    assert_eq!(device.pending().freq, params);
}

#[test]
fn test_set_freq_rejected_by_driver_stalls() {
    let log = CallLog::default();
    let mut fixture = Fixture::new();
    let mut device = fixture.device(&log);
    device.peripherals_mut().rf.config_result = Err(ConfigError::FrequencyOutOfRange);

    let params = SetFreqParams {
        freq_mhz: 9_000,
        freq_hz: 0,
    };
    let mut ep = MockEndpoint::with_data(vendor_out(VendorRequest::SetFreq, 0, 0, 8), &params.to_bytes());
    assert_eq!(device.handle_request(&mut ep, TransferStage::Data), RequestStatus::Stall);
    assert!(ep.calls.is_empty(), "no ack after a rejected tune");
}

#[test]
fn test_data_length_mismatch_stalls() {
    let log = CallLog::default();
    let mut fixture = Fixture::new();
    let mut device = fixture.device(&log);

    let cases = [
        (VendorRequest::SetFreq, 7),
        (VendorRequest::SetFreq, 9),
        (VendorRequest::SetFreqExplicit, 17),
        (VendorRequest::SampleRateSet, 4),
    ];
    for (request, len) in cases {
        let data = vec![0u8; len];
        let mut ep = MockEndpoint::with_data(vendor_out(request, 0, 0, len as u16), &data);
        assert_eq!(device.handle_request(&mut ep, TransferStage::Data), RequestStatus::Stall);
        assert!(ep.calls.is_empty());
    }
    assert!(log.calls().is_empty());
}

#[test]
fn test_set_freq_explicit() {
    let log = CallLog::default();
    let mut fixture = Fixture::new();
    let mut device = fixture.device(&log);
    let setup = vendor_out(VendorRequest::SetFreqExplicit, 0, 0, 24);

    let mut ep = MockEndpoint::new(setup);
    assert_eq!(device.handle_request(&mut ep, TransferStage::Setup), RequestStatus::Ok);
    assert_eq!(ep.calls, vec![EndpointCall::BlockOut(SetFreqExplicitParams::LEN)]);

    let params = SetFreqExplicitParams {
        if_freq_hz: 2_400_000_000,
        lo_freq_hz: 1_000_000_000,
        path: 1,
    };
    let mut ep = MockEndpoint::with_data(setup, &params.to_bytes());
    assert_eq!(device.handle_request(&mut ep, TransferStage::Data), RequestStatus::Ok);
    assert_eq!(ep.calls, vec![EndpointCall::AckIn]);
    assert_eq!(
        log.calls(),
        vec![Call::FrequencyExplicit(2_400_000_000, 1_000_000_000, RfPathFilter::LowPass)]
    );
}

#[test]
fn test_set_freq_explicit_invalid_path_stalls_before_driver() {
    let log = CallLog::default();
    let mut fixture = Fixture::new();
    let mut device = fixture.device(&log);

    let params = SetFreqExplicitParams {
        if_freq_hz: 2_400_000_000,
        lo_freq_hz: 1_000_000_000,
        path: 3,
    };
    let mut ep = MockEndpoint::with_data(
        vendor_out(VendorRequest::SetFreqExplicit, 0, 0, 24),
        &params.to_bytes(),
    );
    assert_eq!(device.handle_request(&mut ep, TransferStage::Data), RequestStatus::Stall);
    assert!(ep.calls.is_empty());
    assert!(log.calls().is_empty());
}

#[test]
fn test_sample_rate_is_doubled() {
    let log = CallLog::default();
    let mut fixture = Fixture::new();
    let mut device = fixture.device(&log);
    let setup = vendor_out(VendorRequest::SampleRateSet, 0, 0, 8);

    let mut ep = MockEndpoint::new(setup);
    assert_eq!(device.handle_request(&mut ep, TransferStage::Setup), RequestStatus::Ok);
    assert_eq!(ep.calls, vec![EndpointCall::BlockOut(SetSampleRateParams::LEN)]);

    for (freq_hz, divider) in [(10_000_001, 1), (8_000_000, 2)] {
        log.clear();
        let params = SetSampleRateParams { freq_hz, divider };
        let mut ep = MockEndpoint::with_data(setup, &params.to_bytes());
        assert_eq!(device.handle_request(&mut ep, TransferStage::Data), RequestStatus::Ok);
        assert_eq!(ep.calls, vec![EndpointCall::AckIn]);
        assert_eq!(log.calls(), vec![Call::SampleRate(freq_hz * 2, divider)]);
    }
}

#[test]
fn test_driver_receives_staged_records() {
    let log = CallLog::default();
    let mut fixture = Fixture::new();
    let mut device = fixture.device(&log);

    let explicit = SetFreqExplicitParams {
        if_freq_hz: 2_600_000_000,
        lo_freq_hz: 400_000_000,
        path: 2,
    };
    let mut ep = MockEndpoint::with_data(
        vendor_out(VendorRequest::SetFreqExplicit, 0, 0, 24),
        &explicit.to_bytes(),
    );
    assert_eq!(device.handle_request(&mut ep, TransferStage::Data), RequestStatus::Ok);
    assert_eq!(device.pending().freq_explicit, explicit);

    let rate = SetSampleRateParams {
        freq_hz: 10_000_000,
        divider: 1,
    };
    let mut ep = MockEndpoint::with_data(vendor_out(VendorRequest::SampleRateSet, 0, 0, 8), &rate.to_bytes());
    assert_eq!(device.handle_request(&mut ep, TransferStage::Data), RequestStatus::Ok);
    assert_eq!(device.pending().sample_rate, rate);

    assert_eq!(
        log.calls(),
        vec![
            Call::FrequencyExplicit(2_600_000_000, 400_000_000, RfPathFilter::HighPass),
            Call::SampleRate(20_000_000, 1),
        ]
    );

    // a rejected record stays staged, earlier records of other kinds are kept
    device.peripherals_mut().rf.config_result = Err(ConfigError::FrequencyOutOfRange);
    let freq = SetFreqParams {
        freq_mhz: 9_000,
        freq_hz: 1,
    };
    let mut ep = MockEndpoint::with_data(vendor_out(VendorRequest::SetFreq, 0, 0, 8), &freq.to_bytes());
    assert_eq!(device.handle_request(&mut ep, TransferStage::Data), RequestStatus::Stall);
    assert_eq!(device.pending().freq, freq);
    assert_eq!(device.pending().freq_explicit, explicit);
    assert_eq!(device.pending().sample_rate, rate);
}

#[test]
fn test_sample_rate_doubling_overflow_stalls() {
    let log = CallLog::default();
    let mut fixture = Fixture::new();
    let mut device = fixture.device(&log);

    let params = SetSampleRateParams {
        freq_hz: u32::MAX / 2 + 1,
        divider: 1,
    };
    let mut ep = MockEndpoint::with_data(vendor_out(VendorRequest::SampleRateSet, 0, 0, 8), &params.to_bytes());
    assert_eq!(device.handle_request(&mut ep, TransferStage::Data), RequestStatus::Stall);
    assert!(log.calls().is_empty());
}

#[test]
fn test_baseband_bandwidth_from_split_fields() {
    let log = CallLog::default();
    let mut fixture = Fixture::new();
    let mut device = fixture.device(&log);

    let mut ep = MockEndpoint::new(split_u32(VendorRequest::BasebandFilterBandwidthSet, 1_750_000));
    assert_eq!(device.handle_request(&mut ep, TransferStage::Setup), RequestStatus::Ok);
    assert_eq!(ep.calls, vec![EndpointCall::AckIn]);
    assert_eq!(log.calls(), vec![Call::Bandwidth(1_750_000)]);

    device.peripherals_mut().rf.config_result = Err(ConfigError::BandwidthUnsupported);
    let mut ep = MockEndpoint::new(split_u32(VendorRequest::BasebandFilterBandwidthSet, 30_000_000));
    assert_eq!(device.handle_request(&mut ep, TransferStage::Setup), RequestStatus::Stall);
    assert!(ep.calls.is_empty());
}

// =============================================================================
// Switches
// =============================================================================

#[test]
fn test_amp_and_antenna_switches() {
    let log = CallLog::default();
    let mut fixture = Fixture::new();
    let mut device = fixture.device(&log);

    for (request, value, call) in [
        (VendorRequest::AmpEnable, 1, Call::Amp(true)),
        (VendorRequest::AmpEnable, 0, Call::Amp(false)),
        (VendorRequest::AntennaEnable, 1, Call::Antenna(true)),
        (VendorRequest::AntennaEnable, 0, Call::Antenna(false)),
    ] {
        log.clear();
        let mut ep = MockEndpoint::new(vendor_out(request, value, 0, 0));
        assert_eq!(device.handle_request(&mut ep, TransferStage::Setup), RequestStatus::Ok);
        assert_eq!(ep.calls, vec![EndpointCall::AckIn]);
        assert_eq!(log.calls(), vec![call]);
    }
}

#[test]
fn test_switch_out_of_range_stalls_without_driver_call() {
    let log = CallLog::default();
    let mut fixture = Fixture::new();
    let mut device = fixture.device(&log);

    for request in [VendorRequest::AmpEnable, VendorRequest::AntennaEnable] {
        for value in [2, 0x100, 0xFFFF] {
            let mut ep = MockEndpoint::new(vendor_out(request, value, 0, 0));
            assert_eq!(device.handle_request(&mut ep, TransferStage::Setup), RequestStatus::Stall);
            assert!(ep.calls.is_empty());
        }
    }
    assert!(log.calls().is_empty());
}

// =============================================================================
// Gains
// =============================================================================

#[test]
fn test_gain_applied_reports_and_notifies_ui() {
    let log = CallLog::default();
    let mut fixture = Fixture::new();
    let mut device = fixture.device(&log);

    let cases = [
        (VendorRequest::SetLnaGain, 16, Call::LnaGain(16), Call::UiLna(16)),
        (VendorRequest::SetVgaGain, 20, Call::VgaGain(20), Call::UiVga(20)),
        (VendorRequest::SetTxvgaGain, 30, Call::TxvgaGain(30), Call::UiTxvga(30)),
    ];
    for (request, db, driver, ui) in cases {
        log.clear();
        let mut ep = MockEndpoint::new(vendor_in(request, 0, db, 1));
        assert_eq!(device.handle_request(&mut ep, TransferStage::Setup), RequestStatus::Ok);
        assert_eq!(ep.calls, vec![EndpointCall::BlockIn(vec![1]), EndpointCall::AckOut]);
        assert_eq!(log.calls(), vec![driver, ui]);
    }
}

#[test]
fn test_gain_rejected_reports_zero_without_ui() {
    let log = CallLog::default();
    let mut fixture = Fixture::new();
    let mut device = fixture.device(&log);
    device.peripherals_mut().rf.gain_result = 0;

    let mut ep = MockEndpoint::new(vendor_in(VendorRequest::SetLnaGain, 0, 41, 1));
    assert_eq!(device.handle_request(&mut ep, TransferStage::Setup), RequestStatus::Ok);
    assert_eq!(ep.calls, vec![EndpointCall::BlockIn(vec![0]), EndpointCall::AckOut]);
    assert_eq!(log.calls(), vec![Call::LnaGain(41)]);
}

// =============================================================================
// Streaming Statistics and Limits
// =============================================================================

#[test]
fn test_limits_stored_and_published_on_activation() {
    let log = CallLog::default();
    let mut fixture = Fixture::new();
    let mut device = fixture.device(&log);

    let mut ep = MockEndpoint::new(split_u32(VendorRequest::SetRxOverrunLimit, 0x0002_0040));
    assert_eq!(device.handle_request(&mut ep, TransferStage::Setup), RequestStatus::Ok);
    assert_eq!(ep.calls, vec![EndpointCall::AckIn]);
    let mut ep = MockEndpoint::new(split_u32(VendorRequest::SetTxUnderrunLimit, 4096));
    assert_eq!(device.handle_request(&mut ep, TransferStage::Setup), RequestStatus::Ok);

    assert_eq!(device.transceiver().limits().rx_overrun, 0x0002_0040);
    assert_eq!(device.transceiver().limits().tx_underrun, 4096);
    assert_eq!(device.transceiver().stats().snapshot().shortfall_limit, 0);

    device.set_transceiver_mode(TransceiverMode::Rx);
    assert_eq!(device.transceiver().stats().snapshot().shortfall_limit, 0x0002_0040);
    device.set_transceiver_mode(TransceiverMode::Tx);
    assert_eq!(device.transceiver().stats().snapshot().shortfall_limit, 4096);
}

#[test]
fn test_read_buffer_stats_returns_snapshot() {
    let log = CallLog::default();
    let mut fixture = Fixture::new();
    let mut device = fixture.device(&log);
    device.set_transceiver_mode(TransceiverMode::Rx);

    let mut ep = MockEndpoint::new(vendor_in(VendorRequest::ReadBufferStats, 0, 0, 32));
    assert_eq!(device.handle_request(&mut ep, TransferStage::Setup), RequestStatus::Ok);
    assert_eq!(ep.calls.len(), 2);
    assert_eq!(ep.calls[1], EndpointCall::AckOut);

    let EndpointCall::BlockIn(bytes) = &ep.calls[0] else {
        panic!("expected a data stage, got {:?}", ep.calls[0]);
    };
    let bytes: [u8; 32] = bytes.as_slice().try_into().unwrap();
    let snapshot = StatsSnapshot::from_le_bytes(&bytes);
    assert_eq!(snapshot.buffer_mode(), Some(BufferMode::Rx));
    assert_eq!(snapshot.min_margin, TEST_BUFFER_SIZE as u32);
    assert_eq!(snapshot.max_margin, 0);
    assert_eq!(snapshot, device.transceiver().stats().snapshot());
}
