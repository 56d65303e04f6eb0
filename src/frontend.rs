//! RF Front-End Model
//!
//! Validating implementation of [`RfFrontend`]. Every request is checked
//! against the limits in [`crate::config::frontend`] before anything is
//! changed; accepted settings are remembered and the switch-level parts
//! (direction, amplifier, antenna power) are forwarded to an [`RfSwitches`]
//! implementation. On the target the switches are GPIO pins, on the host
//! they are whatever the test wants them to be.

use crate::config::frontend::{
    BASEBAND_BANDWIDTHS_HZ, FREQ_MAX_HZ, FREQ_MIN_HZ, IF_MAX_HZ, IF_MIN_HZ, LNA_GAIN_MAX_DB,
    LNA_GAIN_STEP_DB, LO_MAX_HZ, LO_MIN_HZ, SAMPLE_RATE_MAX_HZ, SAMPLE_RATE_MIN_HZ,
    TXVGA_GAIN_MAX_DB, VGA_GAIN_MAX_DB, VGA_GAIN_STEP_DB,
};
use crate::platform::RfFrontend;
use crate::types::{ConfigError, ConfigResult, RfPathDirection, RfPathFilter};

/// Switch-level controls of the RF path
pub trait RfSwitches {
    /// Route the signal path
    fn set_direction(&mut self, direction: RfPathDirection);

    /// Amplifier bypass switch
    fn set_amp(&mut self, enable: bool);

    /// Antenna port bias power
    fn set_antenna(&mut self, enable: bool);
}

/// Switches that do nothing
#[derive(Clone, Copy, Debug, Default)]
pub struct NoSwitches;

impl RfSwitches for NoSwitches {
    fn set_direction(&mut self, _direction: RfPathDirection) {}
    fn set_amp(&mut self, _enable: bool) {}
    fn set_antenna(&mut self, _enable: bool) {}
}

/// Explicit tuning request that was accepted
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "embedded", derive(defmt::Format))]
pub struct ExplicitTuning {
    /// Intermediate frequency
    pub if_hz: u64,
    /// Local oscillator frequency
    pub lo_hz: u64,
    /// Image-rejection path
    pub path: RfPathFilter,
}

/// Settings currently applied
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "embedded", derive(defmt::Format))]
pub struct FrontendState {
    /// Signal path direction
    pub direction: RfPathDirection,
    /// Amplifier enabled
    pub amp: bool,
    /// Antenna power enabled
    pub antenna: bool,
    /// Tuned frequency (last plain tune)
    pub frequency_hz: u64,
    /// Explicit tuning, cleared by a plain tune
    pub explicit: Option<ExplicitTuning>,
    /// Sample clock numerator
    pub sample_rate_hz: u32,
    /// Sample clock divider
    pub sample_rate_divider: u32,
    /// Baseband filter bandwidth actually selected
    pub bandwidth_hz: u32,
    /// LNA gain in dB
    pub lna_gain_db: u16,
    /// RX VGA gain in dB
    pub vga_gain_db: u16,
    /// TX VGA gain in dB
    pub txvga_gain_db: u16,
}

impl FrontendState {
    /// Power-on settings
    pub const POWER_ON: Self = Self {
        direction: RfPathDirection::Off,
        amp: false,
        antenna: false,
        frequency_hz: 0,
        explicit: None,
        sample_rate_hz: 0,
        sample_rate_divider: 1,
        bandwidth_hz: 0,
        lna_gain_db: 0,
        vga_gain_db: 0,
        txvga_gain_db: 0,
    };
}

impl Default for FrontendState {
    fn default() -> Self {
        Self::POWER_ON
    }
}

/// Smallest supported bandwidth at or above `hz`
#[must_use]
pub fn select_bandwidth(hz: u32) -> Option<u32> {
    BASEBAND_BANDWIDTHS_HZ.iter().copied().find(|&bw| bw >= hz)
}

/// Validating front-end
pub struct Frontend<S> {
    switches: S,
    state: FrontendState,
}

impl<S: RfSwitches> Frontend<S> {
    /// Front-end in its power-on state
    pub fn new(mut switches: S) -> Self {
        switches.set_direction(RfPathDirection::Off);
        switches.set_amp(false);
        switches.set_antenna(false);
        Self {
            switches,
            state: FrontendState::POWER_ON,
        }
    }

    /// Settings currently applied
    #[must_use]
    pub const fn state(&self) -> &FrontendState {
        &self.state
    }

    /// Underlying switches
    pub fn switches_mut(&mut self) -> &mut S {
        &mut self.switches
    }
}

impl<S: RfSwitches> RfFrontend for Frontend<S> {
    fn set_direction(&mut self, direction: RfPathDirection) {
        self.switches.set_direction(direction);
        self.state.direction = direction;
    }

    fn set_amp(&mut self, enable: bool) {
        self.switches.set_amp(enable);
        self.state.amp = enable;
    }

    fn set_antenna(&mut self, enable: bool) {
        self.switches.set_antenna(enable);
        self.state.antenna = enable;
    }

    fn set_frequency(&mut self, hz: u64) -> ConfigResult {
        if !(FREQ_MIN_HZ..=FREQ_MAX_HZ).contains(&hz) {
            return Err(ConfigError::FrequencyOutOfRange);
        }
        self.state.frequency_hz = hz;
        self.state.explicit = None;
        debug!("tuned to {} Hz", hz);
        Ok(())
    }

    fn set_frequency_explicit(&mut self, if_hz: u64, lo_hz: u64, path: RfPathFilter) -> ConfigResult {
        if !(IF_MIN_HZ..=IF_MAX_HZ).contains(&if_hz) {
            return Err(ConfigError::FrequencyOutOfRange);
        }
        if path != RfPathFilter::Bypass && !(LO_MIN_HZ..=LO_MAX_HZ).contains(&lo_hz) {
            return Err(ConfigError::FrequencyOutOfRange);
        }
        self.state.explicit = Some(ExplicitTuning { if_hz, lo_hz, path });
        debug!("explicit tune if {} lo {} path {:?}", if_hz, lo_hz, path);
        Ok(())
    }

    fn set_sample_rate_frac(&mut self, freq_hz: u32, divider: u32) -> ConfigResult {
        if divider == 0 {
            return Err(ConfigError::SampleRateUnsupported);
        }
        let rate = freq_hz / divider;
        if !(SAMPLE_RATE_MIN_HZ..=SAMPLE_RATE_MAX_HZ).contains(&rate) {
            return Err(ConfigError::SampleRateUnsupported);
        }
        self.state.sample_rate_hz = freq_hz;
        self.state.sample_rate_divider = divider;
        Ok(())
    }

    fn set_baseband_filter_bandwidth(&mut self, hz: u32) -> ConfigResult {
        let selected = select_bandwidth(hz).ok_or(ConfigError::BandwidthUnsupported)?;
        self.state.bandwidth_hz = selected;
        Ok(())
    }

    fn set_lna_gain(&mut self, db: u16) -> u8 {
        if db > LNA_GAIN_MAX_DB || db % LNA_GAIN_STEP_DB != 0 {
            return 0;
        }
        self.state.lna_gain_db = db;
        1
    }

    fn set_vga_gain(&mut self, db: u16) -> u8 {
        if db > VGA_GAIN_MAX_DB || db % VGA_GAIN_STEP_DB != 0 {
            return 0;
        }
        self.state.vga_gain_db = db;
        1
    }

    fn set_txvga_gain(&mut self, db: u16) -> u8 {
        if db > TXVGA_GAIN_MAX_DB {
            return 0;
        }
        self.state.txvga_gain_db = db;
        1
    }
}
