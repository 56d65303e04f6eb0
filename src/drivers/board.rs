//! Board Control
//!
//! LEDs, the baseband stream line to the RF core, the reference clock mux
//! and the hardware trigger gate. The pins live in a static blocking mutex
//! so the control handler and the streaming task can both drive them
//! through cheap [`BoardHandle`] copies.

use core::cell::RefCell;

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::blocking_mutex::Mutex;

use crate::hal::gpio::{ClockDetect, ControlLine, ModeLeds};
use crate::platform::Board;
use crate::types::{HwSyncMode, LedPattern};

/// Reference clock in use
#[derive(Clone, Copy, Debug, PartialEq, Eq, defmt::Format)]
pub enum ClockSource {
    /// On-board crystal
    Internal,
    /// External reference input
    External,
}

/// Pins owned by the board controller
pub struct BoardPins<'d> {
    /// Mode indicators
    pub leds: ModeLeds<'d>,
    /// Baseband stream enable towards the RF core
    pub stream_enable: ControlLine<'d>,
    /// Hardware trigger gate
    pub hw_sync: ControlLine<'d>,
    /// Reference clock mux select (high = external)
    pub clock_select: ControlLine<'d>,
    /// External reference detector
    pub clock_detect: ClockDetect<'d>,
}

/// Storage for the board pins
pub type BoardCell = Mutex<CriticalSectionRawMutex, RefCell<Option<BoardPins<'static>>>>;

/// Empty cell for a `static`
#[must_use]
pub const fn board_cell() -> BoardCell {
    Mutex::new(RefCell::new(None))
}

/// Shared handle to the board pins
#[derive(Clone, Copy)]
pub struct BoardHandle {
    cell: &'static BoardCell,
}

impl BoardHandle {
    /// Move `pins` into `cell` and return a handle to them
    pub fn install(cell: &'static BoardCell, pins: BoardPins<'static>) -> Self {
        cell.lock(|slot| {
            if let Ok(mut slot) = slot.try_borrow_mut() {
                *slot = Some(pins);
            }
        });
        Self { cell }
    }

    fn with<F: FnOnce(&mut BoardPins<'static>)>(&self, f: F) {
        self.cell.lock(|slot| match slot.try_borrow_mut() {
            Ok(mut slot) => {
                if let Some(pins) = slot.as_mut() {
                    f(pins);
                }
            }
            Err(_) => error!("board pins busy"),
        });
    }
}

impl Board for BoardHandle {
    fn baseband_streaming_enable(&mut self) {
        self.with(|pins| pins.stream_enable.set(true));
        debug!("baseband streaming on");
    }

    fn baseband_streaming_disable(&mut self) {
        self.with(|pins| pins.stream_enable.set(false));
        debug!("baseband streaming off");
    }

    /// Sweeping runs on the RF core; this board has no sweep timer here.
    fn sweep_timer_reset(&mut self) {}

    fn set_leds(&mut self, leds: LedPattern) {
        self.with(|pins| pins.leds.set(leds));
    }

    fn activate_best_clock_source(&mut self) {
        self.with(|pins| {
            let source = if pins.clock_detect.is_present() {
                ClockSource::External
            } else {
                ClockSource::Internal
            };
            pins.clock_select.set(source == ClockSource::External);
            info!("reference clock {:?}", source);
        });
    }

    fn hw_sync_enable(&mut self, mode: HwSyncMode) {
        self.with(|pins| pins.hw_sync.set(mode == HwSyncMode::On));
    }
}
