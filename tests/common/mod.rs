//! Recording mocks shared by the integration tests
//!
//! Every collaborator appends to one shared call log so tests can check the
//! order of side effects across the RF front-end, the board and the bulk
//! transport.

#![allow(dead_code)]

use std::cell::RefCell;
use std::rc::Rc;

use sdr_usb_firmware::control::{ControlEndpoint, SetupPacket, VendorRequest};
use sdr_usb_firmware::platform::{Board, BulkTransport, Peripherals, RfFrontend, UiIndicator};
use sdr_usb_firmware::streaming::Chunk;
use sdr_usb_firmware::types::{
    BulkEndpoint, ConfigResult, HwSyncMode, LedPattern, RfPathDirection, RfPathFilter,
};

/// One observed side effect
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Call {
    BasebandEnable,
    BasebandDisable,
    SweepReset,
    Leds(LedPattern),
    BestClock,
    HwSync(HwSyncMode),
    Schedule(BulkEndpoint, usize),
    Flush(BulkEndpoint),
    Direction(RfPathDirection),
    Amp(bool),
    Antenna(bool),
    Frequency(u64),
    FrequencyExplicit(u64, u64, RfPathFilter),
    SampleRate(u32, u32),
    Bandwidth(u32),
    LnaGain(u16),
    VgaGain(u16),
    TxvgaGain(u16),
    UiLna(u16),
    UiVga(u16),
    UiTxvga(u16),
}

/// Shared call log
#[derive(Clone, Default)]
pub struct CallLog(Rc<RefCell<Vec<Call>>>);

impl CallLog {
    pub fn push(&self, call: Call) {
        self.0.borrow_mut().push(call);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.0.borrow().clone()
    }

    pub fn clear(&self) {
        self.0.borrow_mut().clear();
    }

    pub fn count(&self, pred: impl Fn(&Call) -> bool) -> usize {
        self.0.borrow().iter().filter(|c| pred(c)).count()
    }

    pub fn contains(&self, call: &Call) -> bool {
        self.0.borrow().contains(call)
    }

    /// Chunks scheduled on `endpoint`, in order
    pub fn scheduled(&self, endpoint: BulkEndpoint) -> Vec<usize> {
        self.0
            .borrow()
            .iter()
            .filter_map(|c| match c {
                Call::Schedule(ep, index) if *ep == endpoint => Some(*index),
                _ => None,
            })
            .collect()
    }
}

// =============================================================================
// Collaborators
// =============================================================================

pub struct MockRf {
    pub log: CallLog,
    pub config_result: ConfigResult,
    pub gain_result: u8,
}

impl MockRf {
    pub fn new(log: &CallLog) -> Self {
        Self {
            log: log.clone(),
            config_result: Ok(()),
            gain_result: 1,
        }
    }
}

impl RfFrontend for MockRf {
    fn set_direction(&mut self, direction: RfPathDirection) {
        self.log.push(Call::Direction(direction));
    }

    fn set_amp(&mut self, enable: bool) {
        self.log.push(Call::Amp(enable));
    }

    fn set_antenna(&mut self, enable: bool) {
        self.log.push(Call::Antenna(enable));
    }

    fn set_frequency(&mut self, hz: u64) -> ConfigResult {
        self.log.push(Call::Frequency(hz));
        self.config_result
    }

    fn set_frequency_explicit(&mut self, if_hz: u64, lo_hz: u64, path: RfPathFilter) -> ConfigResult {
        self.log.push(Call::FrequencyExplicit(if_hz, lo_hz, path));
        self.config_result
    }

    fn set_sample_rate_frac(&mut self, freq_hz: u32, divider: u32) -> ConfigResult {
        self.log.push(Call::SampleRate(freq_hz, divider));
        self.config_result
    }

    fn set_baseband_filter_bandwidth(&mut self, hz: u32) -> ConfigResult {
        self.log.push(Call::Bandwidth(hz));
        self.config_result
    }

    fn set_lna_gain(&mut self, db: u16) -> u8 {
        self.log.push(Call::LnaGain(db));
        self.gain_result
    }

    fn set_vga_gain(&mut self, db: u16) -> u8 {
        self.log.push(Call::VgaGain(db));
        self.gain_result
    }

    fn set_txvga_gain(&mut self, db: u16) -> u8 {
        self.log.push(Call::TxvgaGain(db));
        self.gain_result
    }
}

pub struct MockBoard {
    pub log: CallLog,
}

impl MockBoard {
    pub fn new(log: &CallLog) -> Self {
        Self { log: log.clone() }
    }
}

impl Board for MockBoard {
    fn baseband_streaming_enable(&mut self) {
        self.log.push(Call::BasebandEnable);
    }

    fn baseband_streaming_disable(&mut self) {
        self.log.push(Call::BasebandDisable);
    }

    fn sweep_timer_reset(&mut self) {
        self.log.push(Call::SweepReset);
    }

    fn set_leds(&mut self, leds: LedPattern) {
        self.log.push(Call::Leds(leds));
    }

    fn activate_best_clock_source(&mut self) {
        self.log.push(Call::BestClock);
    }

    fn hw_sync_enable(&mut self, mode: HwSyncMode) {
        self.log.push(Call::HwSync(mode));
    }
}

/// Bulk transport that records and holds scheduled chunks
///
/// Held transfers complete only when the test says so, in FIFO order.
pub struct MockBulk {
    pub log: CallLog,
    pub pending_in: Vec<(usize, u32)>,
    pub pending_out: Vec<(usize, u32)>,
}

impl MockBulk {
    pub fn new(log: &CallLog) -> Self {
        Self {
            log: log.clone(),
            pending_in: Vec::new(),
            pending_out: Vec::new(),
        }
    }

    fn pending(&mut self, endpoint: BulkEndpoint) -> &mut Vec<(usize, u32)> {
        match endpoint {
            BulkEndpoint::In => &mut self.pending_in,
            BulkEndpoint::Out => &mut self.pending_out,
        }
    }

    /// Complete the oldest transfer on `endpoint`, returns (chunk, bytes)
    pub fn complete_next(&mut self, endpoint: BulkEndpoint) -> Option<(usize, u32)> {
        let pending = self.pending(endpoint);
        if pending.is_empty() {
            None
        } else {
            Some(pending.remove(0))
        }
    }

    pub fn in_flight(&self) -> usize {
        self.pending_in.len() + self.pending_out.len()
    }
}

impl BulkTransport for MockBulk {
    fn schedule_block(&mut self, endpoint: BulkEndpoint, chunk: Chunk<'_>) {
        self.log.push(Call::Schedule(endpoint, chunk.index()));
        let len = u32::try_from(chunk.len()).unwrap();
        self.pending(endpoint).push((chunk.index(), len));
    }

    fn flush(&mut self, endpoint: BulkEndpoint) {
        self.log.push(Call::Flush(endpoint));
        self.pending(endpoint).clear();
    }
}

pub struct MockUi {
    pub log: CallLog,
}

impl UiIndicator for MockUi {
    fn set_lna_gain(&mut self, db: u16) {
        self.log.push(Call::UiLna(db));
    }

    fn set_vga_gain(&mut self, db: u16) {
        self.log.push(Call::UiVga(db));
    }

    fn set_txvga_gain(&mut self, db: u16) {
        self.log.push(Call::UiTxvga(db));
    }
}

pub type MockPeripherals = Peripherals<MockRf, MockBoard, MockBulk, MockUi>;

pub fn peripherals(log: &CallLog) -> MockPeripherals {
    Peripherals {
        rf: MockRf::new(log),
        board: MockBoard::new(log),
        bulk: MockBulk::new(log),
        ui: MockUi { log: log.clone() },
    }
}

// =============================================================================
// Control endpoint
// =============================================================================

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EndpointCall {
    BlockIn(Vec<u8>),
    BlockOut(usize),
    AckIn,
    AckOut,
}

pub struct MockEndpoint {
    pub setup: SetupPacket,
    pub received: Vec<u8>,
    pub calls: Vec<EndpointCall>,
}

impl MockEndpoint {
    pub fn new(setup: SetupPacket) -> Self {
        Self {
            setup,
            received: Vec::new(),
            calls: Vec::new(),
        }
    }

    pub fn with_data(setup: SetupPacket, data: &[u8]) -> Self {
        Self {
            setup,
            received: data.to_vec(),
            calls: Vec::new(),
        }
    }
}

impl ControlEndpoint for MockEndpoint {
    fn setup(&self) -> SetupPacket {
        self.setup
    }

    fn schedule_block_in(&mut self, data: &[u8]) {
        self.calls.push(EndpointCall::BlockIn(data.to_vec()));
    }

    fn schedule_block_out(&mut self, len: usize) {
        self.calls.push(EndpointCall::BlockOut(len));
    }

    fn schedule_ack_in(&mut self) {
        self.calls.push(EndpointCall::AckIn);
    }

    fn schedule_ack_out(&mut self) {
        self.calls.push(EndpointCall::AckOut);
    }

    fn received(&self) -> &[u8] {
        &self.received
    }
}

/// Vendor OUT setup packet
pub fn vendor_out(request: VendorRequest, value: u16, index: u16, length: u16) -> SetupPacket {
    SetupPacket {
        request_type: SetupPacket::VENDOR_OUT,
        request: request.as_u8(),
        value,
        index,
        length,
    }
}

/// Vendor IN setup packet
pub fn vendor_in(request: VendorRequest, value: u16, index: u16, length: u16) -> SetupPacket {
    SetupPacket {
        request_type: SetupPacket::VENDOR_IN,
        request: request.as_u8(),
        value,
        index,
        length,
    }
}

// =============================================================================
// Device fixture
// =============================================================================

use sdr_usb_firmware::control::Device;
use sdr_usb_firmware::streaming::BufferStats;
use sdr_usb_firmware::transceiver::{ModeCell, Transceiver};

/// Buffer size used by host tests
pub const TEST_BUFFER_SIZE: usize = 1024;

pub type MockDevice<'a> = Device<'a, MockRf, MockBoard, MockBulk, MockUi, TEST_BUFFER_SIZE>;

/// Owns the shared state a device borrows
pub struct Fixture {
    pub mode: ModeCell,
    pub stats: BufferStats<TEST_BUFFER_SIZE>,
}

impl Fixture {
    pub fn new() -> Self {
        Self {
            mode: ModeCell::new(),
            stats: BufferStats::new(),
        }
    }

    pub fn device(&mut self, log: &CallLog) -> MockDevice<'_> {
        let Self { mode, stats } = self;
        let (_rf, _usb, control) = stats.split();
        Device::new(Transceiver::new(mode, control), peripherals(log))
    }
}
