//! Types Module Tests
//!
//! Tests for wire-level enumerations, setup packet decoding and the DATA
//! stage parameter records.
//! Run with: cargo test --test types_tests

use sdr_usb_firmware::control::{
    SetFreqExplicitParams, SetFreqParams, SetSampleRateParams, SetupPacket, VendorRequest,
};
use sdr_usb_firmware::types::{
    BufferMode, ConfigError, HwSyncMode, RfPathFilter, TransceiverMode,
};

// =============================================================================
// TransceiverMode Tests
// =============================================================================

#[test]
fn test_transceiver_mode_wire_values() {
    assert_eq!(TransceiverMode::from_u16(0), Some(TransceiverMode::Off));
    assert_eq!(TransceiverMode::from_u16(1), Some(TransceiverMode::Rx));
    assert_eq!(TransceiverMode::from_u16(2), Some(TransceiverMode::Tx));
    assert_eq!(TransceiverMode::from_u16(4), Some(TransceiverMode::CpldUpdate));
    assert_eq!(TransceiverMode::from_u16(5), Some(TransceiverMode::RxSweep));
}

#[test]
fn test_transceiver_mode_unknown_values() {
    // 3 is the retired signal-source mode
    for value in [3, 6, 99, 0x100, u16::MAX] {
        assert_eq!(TransceiverMode::from_u16(value), None, "{value}");
    }
}

#[test]
fn test_transceiver_mode_round_trip() {
    for mode in [
        TransceiverMode::Off,
        TransceiverMode::Rx,
        TransceiverMode::Tx,
        TransceiverMode::CpldUpdate,
        TransceiverMode::RxSweep,
    ] {
        assert_eq!(TransceiverMode::from_u16(u16::from(mode.as_u8())), Some(mode));
    }
}

#[test]
fn test_only_rx_and_tx_stream() {
    assert!(TransceiverMode::Rx.is_streaming());
    assert!(TransceiverMode::Tx.is_streaming());
    assert!(!TransceiverMode::Off.is_streaming());
    assert!(!TransceiverMode::RxSweep.is_streaming());
    assert!(!TransceiverMode::CpldUpdate.is_streaming());
    assert_eq!(TransceiverMode::default(), TransceiverMode::Off);
}

// =============================================================================
// Other Enumerations
// =============================================================================

#[test]
fn test_hw_sync_mode() {
    assert_eq!(HwSyncMode::from_u16(0), Some(HwSyncMode::Off));
    assert_eq!(HwSyncMode::from_u16(1), Some(HwSyncMode::On));
    assert_eq!(HwSyncMode::from_u16(2), None);
    assert_eq!(HwSyncMode::default(), HwSyncMode::Off);
}

#[test]
fn test_buffer_mode_words() {
    for mode in [
        BufferMode::Idle,
        BufferMode::Rx,
        BufferMode::TxStart,
        BufferMode::TxRun,
    ] {
        assert_eq!(BufferMode::from_u32(mode.as_u32()), Some(mode));
    }
    assert_eq!(BufferMode::Rx.as_u32(), 1);
    assert_eq!(BufferMode::TxStart.as_u32(), 2);
    assert_eq!(BufferMode::TxRun.as_u32(), 3);
    assert_eq!(BufferMode::from_u32(4), None);
}

#[test]
fn test_rf_path_filter() {
    assert_eq!(RfPathFilter::from_u8(0), Some(RfPathFilter::Bypass));
    assert_eq!(RfPathFilter::from_u8(1), Some(RfPathFilter::LowPass));
    assert_eq!(RfPathFilter::from_u8(2), Some(RfPathFilter::HighPass));
    assert_eq!(RfPathFilter::from_u8(3), None);
}

#[test]
fn test_config_error_display() {
    assert_eq!(
        ConfigError::FrequencyOutOfRange.to_string(),
        "frequency out of range"
    );
    assert_eq!(
        ConfigError::SampleRateUnsupported.to_string(),
        "unsupported sample rate"
    );
    assert_eq!(
        ConfigError::BandwidthUnsupported.to_string(),
        "unsupported baseband bandwidth"
    );
}

// =============================================================================
// Setup Packet Tests
// =============================================================================

#[test]
fn test_setup_packet_from_bytes() {
    let setup = SetupPacket::from_bytes([0x40, 16, 0x34, 0x12, 0x78, 0x56, 8, 0]);
    assert_eq!(setup.request_type, SetupPacket::VENDOR_OUT);
    assert_eq!(setup.request, VendorRequest::SetFreq.as_u8());
    assert_eq!(setup.value, 0x1234);
    assert_eq!(setup.index, 0x5678);
    assert_eq!(setup.length, 8);
}

#[test]
fn test_value_u32_uses_index_as_high_word() {
    let setup = SetupPacket {
        index: 0x0017,
        value: 0xD840,
        ..SetupPacket::default()
    };
    assert_eq!(setup.value_u32(), 1_562_688);
    assert_eq!(
        SetupPacket {
            index: 0xFFFF,
            value: 0xFFFF,
            ..SetupPacket::default()
        }
        .value_u32(),
        u32::MAX
    );
}

#[test]
fn test_vendor_request_codes() {
    let known = [
        (1, VendorRequest::SetTransceiverMode),
        (6, VendorRequest::SampleRateSet),
        (7, VendorRequest::BasebandFilterBandwidthSet),
        (16, VendorRequest::SetFreq),
        (17, VendorRequest::AmpEnable),
        (19, VendorRequest::SetLnaGain),
        (20, VendorRequest::SetVgaGain),
        (21, VendorRequest::SetTxvgaGain),
        (23, VendorRequest::AntennaEnable),
        (24, VendorRequest::SetFreqExplicit),
        (29, VendorRequest::SetHwSyncMode),
        (41, VendorRequest::ReadBufferStats),
        (42, VendorRequest::SetTxUnderrunLimit),
        (43, VendorRequest::SetRxOverrunLimit),
    ];
    for (code, request) in known {
        assert_eq!(VendorRequest::from_u8(code), Some(request));
        assert_eq!(request.as_u8(), code);
    }
    for code in [0, 2, 15, 18, 40, 44, 255] {
        assert_eq!(VendorRequest::from_u8(code), None, "{code}");
    }
}

// =============================================================================
// Parameter Records
// =============================================================================

#[test]
fn test_set_freq_record() {
    let raw = [0x93, 0x03, 0, 0, 0x90, 0xD0, 0x03, 0];
    let params = SetFreqParams::from_bytes(&raw).unwrap();
    assert_eq!(params.freq_mhz, 915);
    assert_eq!(params.freq_hz, 250_000);
    assert_eq!(params.frequency_hz(), 915_250_000);
    assert_eq!(params.to_bytes(), raw);
}

#[test]
fn test_set_freq_does_not_overflow() {
    let params = SetFreqParams {
        freq_mhz: u32::MAX,
        freq_hz: u32::MAX,
    };
    assert_eq!(
        params.frequency_hz(),
        u64::from(u32::MAX) * 1_000_000 + u64::from(u32::MAX)
    );
}

#[test]
fn test_records_require_exact_length() {
    assert!(SetFreqParams::from_bytes(&[0; 7]).is_none());
    assert!(SetFreqParams::from_bytes(&[0; 9]).is_none());
    assert!(SetSampleRateParams::from_bytes(&[0; 4]).is_none());
    assert!(SetFreqExplicitParams::from_bytes(&[0; 17]).is_none());
    assert!(SetFreqExplicitParams::from_bytes(&[0; SetFreqExplicitParams::LEN]).is_some());
}

#[test]
fn test_explicit_record_layout() {
    let params = SetFreqExplicitParams {
        if_freq_hz: 2_450_000_000,
        lo_freq_hz: 1_000_000_000,
        path: 2,
    };
    let raw = params.to_bytes();
    assert_eq!(raw.len(), 24);
    assert_eq!(&raw[0..8], &2_450_000_000u64.to_le_bytes());
    assert_eq!(&raw[8..16], &1_000_000_000u64.to_le_bytes());
    assert_eq!(raw[16], 2);
    assert!(raw[17..].iter().all(|b| *b == 0));
    assert_eq!(SetFreqExplicitParams::from_bytes(&raw), Some(params));
}

#[test]
fn test_sample_rate_doubling() {
    let odd = SetSampleRateParams {
        freq_hz: 10_000_001,
        divider: 1,
    };
    assert_eq!(odd.doubled_freq_hz(), Some(20_000_002));

    let even = SetSampleRateParams {
        freq_hz: 8_000_000,
        divider: 2,
    };
    assert_eq!(even.doubled_freq_hz(), Some(16_000_000));

    let huge = SetSampleRateParams {
        freq_hz: u32::MAX / 2 + 1,
        divider: 1,
    };
    assert_eq!(huge.doubled_freq_hz(), None);
}
