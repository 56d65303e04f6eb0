//! GPIO Abstractions
//!
//! Type-safe pin wrappers for the mode LEDs, the RF path switches and the
//! lines shared with the RF core.

use embassy_stm32::gpio::{Input, Output};

use crate::frontend::RfSwitches;
use crate::types::{LedPattern, RfPathDirection};

/// Single indicator LED
pub struct StatusLed<'d> {
    pin: Output<'d>,
    lit: bool,
}

impl<'d> StatusLed<'d> {
    /// Create a new status LED (initially off)
    #[must_use]
    pub fn new(mut pin: Output<'d>) -> Self {
        pin.set_low();
        Self { pin, lit: false }
    }

    /// Light or darken the LED
    pub fn set(&mut self, lit: bool) {
        if lit {
            self.pin.set_high();
        } else {
            self.pin.set_low();
        }
        self.lit = lit;
    }

    /// Whether the LED is lit
    #[must_use]
    pub const fn is_lit(&self) -> bool {
        self.lit
    }
}

/// RX and TX mode indicators
pub struct ModeLeds<'d> {
    rx: StatusLed<'d>,
    tx: StatusLed<'d>,
}

impl<'d> ModeLeds<'d> {
    /// Both indicators dark
    #[must_use]
    pub fn new(rx: Output<'d>, tx: Output<'d>) -> Self {
        Self {
            rx: StatusLed::new(rx),
            tx: StatusLed::new(tx),
        }
    }

    /// Show `pattern`
    pub fn set(&mut self, pattern: LedPattern) {
        self.rx.set(pattern.rx);
        self.tx.set(pattern.tx);
    }

    /// Pattern currently shown
    #[must_use]
    pub const fn pattern(&self) -> LedPattern {
        LedPattern {
            rx: self.rx.is_lit(),
            tx: self.tx.is_lit(),
        }
    }
}

/// RF path switch pins
///
/// The TX and RX switch lines are never driven high together; the path is
/// opened before the other side is closed.
pub struct RfSwitchPins<'d> {
    tx_path: Output<'d>,
    rx_path: Output<'d>,
    amp_enable: Output<'d>,
    antenna_power: Output<'d>,
}

impl<'d> RfSwitchPins<'d> {
    /// All switches open, amplifier and antenna power off
    #[must_use]
    pub fn new(
        tx_path: Output<'d>,
        rx_path: Output<'d>,
        amp_enable: Output<'d>,
        antenna_power: Output<'d>,
    ) -> Self {
        let mut pins = Self {
            tx_path,
            rx_path,
            amp_enable,
            antenna_power,
        };
        pins.set_direction(RfPathDirection::Off);
        pins.set_amp(false);
        pins.set_antenna(false);
        pins
    }
}

impl RfSwitches for RfSwitchPins<'_> {
    fn set_direction(&mut self, direction: RfPathDirection) {
        self.tx_path.set_low();
        self.rx_path.set_low();
        match direction {
            RfPathDirection::Off => {}
            RfPathDirection::Rx => self.rx_path.set_high(),
            RfPathDirection::Tx => self.tx_path.set_high(),
        }
    }

    fn set_amp(&mut self, enable: bool) {
        if enable {
            self.amp_enable.set_high();
        } else {
            self.amp_enable.set_low();
        }
    }

    fn set_antenna(&mut self, enable: bool) {
        if enable {
            self.antenna_power.set_high();
        } else {
            self.antenna_power.set_low();
        }
    }
}

/// Output line to the RF core or an external device
pub struct ControlLine<'d> {
    pin: Output<'d>,
}

impl<'d> ControlLine<'d> {
    /// Line driven low
    #[must_use]
    pub fn new(mut pin: Output<'d>) -> Self {
        pin.set_low();
        Self { pin }
    }

    /// Drive the line
    pub fn set(&mut self, asserted: bool) {
        if asserted {
            self.pin.set_high();
        } else {
            self.pin.set_low();
        }
    }
}

/// External reference clock detector (active high)
pub struct ClockDetect<'d> {
    pin: Input<'d>,
}

impl<'d> ClockDetect<'d> {
    /// Wrap the detector input
    #[must_use]
    pub fn new(pin: Input<'d>) -> Self {
        Self { pin }
    }

    /// Whether an external reference is present
    #[must_use]
    pub fn is_present(&self) -> bool {
        self.pin.is_high()
    }
}
