//! Control Transfer Primitives
//!
//! Setup packet decoding, transfer stages and the endpoint operations a
//! request handler may stage. The USB substrate drives the stages; handlers
//! only decide what to schedule and whether to stall.

/// Decoded 8-byte setup packet
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "embedded", derive(defmt::Format))]
pub struct SetupPacket {
    /// `bmRequestType`
    pub request_type: u8,
    /// `bRequest`
    pub request: u8,
    /// `wValue`
    pub value: u16,
    /// `wIndex`
    pub index: u16,
    /// `wLength`
    pub length: u16,
}

impl SetupPacket {
    /// Vendor request, host to device
    pub const VENDOR_OUT: u8 = 0x40;

    /// Vendor request, device to host
    pub const VENDOR_IN: u8 = 0xC0;

    /// Decode from the raw setup bytes
    #[must_use]
    pub const fn from_bytes(raw: [u8; 8]) -> Self {
        Self {
            request_type: raw[0],
            request: raw[1],
            value: u16::from_le_bytes([raw[2], raw[3]]),
            index: u16::from_le_bytes([raw[4], raw[5]]),
            length: u16::from_le_bytes([raw[6], raw[7]]),
        }
    }

    /// 32-bit parameter carried as `index << 16 | value`
    #[must_use]
    pub const fn value_u32(&self) -> u32 {
        ((self.index as u32) << 16) | self.value as u32
    }
}

/// Stage of a control transfer
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "embedded", derive(defmt::Format))]
pub enum TransferStage {
    /// Setup packet received
    Setup,
    /// Data stage finished
    Data,
    /// Status handshake finished
    Status,
}

/// Handler verdict
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "embedded", derive(defmt::Format))]
pub enum RequestStatus {
    /// Continue the transfer
    Ok,
    /// Stall the control pipe
    Stall,
}

/// Control endpoint pair (IN + OUT) as seen by a request handler
pub trait ControlEndpoint {
    /// Setup packet of the transfer in progress
    fn setup(&self) -> SetupPacket;

    /// Send `data` to the host as the IN data stage
    fn schedule_block_in(&mut self, data: &[u8]);

    /// Receive `len` bytes from the host as the OUT data stage
    fn schedule_block_out(&mut self, len: usize);

    /// Zero-length IN status packet (acknowledges an OUT or no-data request)
    fn schedule_ack_in(&mut self);

    /// Zero-length OUT status packet (acknowledges an IN request)
    fn schedule_ack_out(&mut self);

    /// Bytes received by the last OUT data stage
    fn received(&self) -> &[u8];
}

/// Vendor request codes
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "embedded", derive(defmt::Format))]
#[repr(u8)]
pub enum VendorRequest {
    /// Change the operating mode
    SetTransceiverMode = 1,
    /// Fractional sample rate
    SampleRateSet = 6,
    /// Baseband filter bandwidth
    BasebandFilterBandwidthSet = 7,
    /// Tune (MHz + Hz)
    SetFreq = 16,
    /// RF amplifier switch
    AmpEnable = 17,
    /// LNA gain
    SetLnaGain = 19,
    /// RX VGA gain
    SetVgaGain = 20,
    /// TX VGA gain
    SetTxvgaGain = 21,
    /// Antenna port power switch
    AntennaEnable = 23,
    /// Tune with explicit IF/LO/path
    SetFreqExplicit = 24,
    /// External trigger mode
    SetHwSyncMode = 29,
    /// Statistics block snapshot
    ReadBufferStats = 41,
    /// TX underrun limit
    SetTxUnderrunLimit = 42,
    /// RX overrun limit
    SetRxOverrunLimit = 43,
}

impl VendorRequest {
    /// Decode `bRequest`
    #[must_use]
    pub const fn from_u8(request: u8) -> Option<Self> {
        Some(match request {
            1 => Self::SetTransceiverMode,
            6 => Self::SampleRateSet,
            7 => Self::BasebandFilterBandwidthSet,
            16 => Self::SetFreq,
            17 => Self::AmpEnable,
            19 => Self::SetLnaGain,
            20 => Self::SetVgaGain,
            21 => Self::SetTxvgaGain,
            23 => Self::AntennaEnable,
            24 => Self::SetFreqExplicit,
            29 => Self::SetHwSyncMode,
            41 => Self::ReadBufferStats,
            42 => Self::SetTxUnderrunLimit,
            43 => Self::SetRxOverrunLimit,
            _ => return None,
        })
    }

    /// `bRequest` value
    #[must_use]
    pub const fn as_u8(self) -> u8 {
        self as u8
    }
}
