//! User Interface
//!
//! Status panel fed by gain notifications from the control handlers and the
//! mode flag. The control path only updates a small shared record and raises
//! a signal; drawing and I2C traffic happen in the panel task.

use core::cell::Cell;

use embassy_futures::select::select;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::blocking_mutex::Mutex;
use embassy_sync::signal::Signal;
use embassy_time::{Duration, Timer};
use embedded_hal_async::i2c::I2c;

use crate::drivers::display::{Display, PanelStatus, StatusRenderer};
use crate::platform::UiIndicator;
use crate::transceiver::ModeCell;

/// Panel refresh interval when nothing changes (mode is polled)
const REFRESH_INTERVAL: Duration = Duration::from_millis(250);

/// State shared between the control path and the panel task
pub struct PanelShared {
    status: Mutex<CriticalSectionRawMutex, Cell<PanelStatus>>,
    changed: Signal<CriticalSectionRawMutex, ()>,
}

impl PanelShared {
    /// Empty panel for a `static`
    #[must_use]
    pub const fn new() -> Self {
        Self {
            status: Mutex::new(Cell::new(PanelStatus {
                mode: crate::types::TransceiverMode::Off,
                lna_gain_db: 0,
                vga_gain_db: 0,
                txvga_gain_db: 0,
            })),
            changed: Signal::new(),
        }
    }

    /// Current panel contents
    pub fn status(&self) -> PanelStatus {
        self.status.lock(Cell::get)
    }

    fn update(&self, f: impl FnOnce(&mut PanelStatus)) {
        self.status.lock(|cell| {
            let mut status = cell.get();
            f(&mut status);
            cell.set(status);
        });
        self.changed.signal(());
    }
}

impl Default for PanelShared {
    fn default() -> Self {
        Self::new()
    }
}

/// [`UiIndicator`] handed to the control handlers
#[derive(Clone, Copy)]
pub struct PanelUi {
    shared: &'static PanelShared,
}

impl PanelUi {
    /// Handle onto `shared`
    #[must_use]
    pub const fn new(shared: &'static PanelShared) -> Self {
        Self { shared }
    }
}

impl UiIndicator for PanelUi {
    fn set_lna_gain(&mut self, db: u16) {
        self.shared.update(|s| s.lna_gain_db = db);
    }

    fn set_vga_gain(&mut self, db: u16) {
        self.shared.update(|s| s.vga_gain_db = db);
    }

    fn set_txvga_gain(&mut self, db: u16) {
        self.shared.update(|s| s.txvga_gain_db = db);
    }
}

/// Redraw the panel whenever something changes
pub async fn run_panel<I: I2c>(
    mut display: Display<I>,
    shared: &'static PanelShared,
    mode: &'static ModeCell,
) -> ! {
    if display.init().await.is_err() {
        warn!("display init failed");
    }

    let mut shown: Option<PanelStatus> = None;
    loop {
        let mut status = shared.status();
        status.mode = mode.load();

        if shown != Some(status) {
            StatusRenderer::render(display.buffer_mut(), &status);
            match display.flush().await {
                Ok(()) => shown = Some(status),
                Err(_) => warn!("display flush failed"),
            }
        }

        select(shared.changed.wait(), Timer::after(REFRESH_INTERVAL)).await;
    }
}
