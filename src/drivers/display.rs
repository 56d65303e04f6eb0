//! OLED Status Display
//!
//! 128x64 monochrome framebuffer with an embedded-graphics `DrawTarget`, a
//! small SSD1306 driver over any async I2C bus, and the renderer for the
//! status panel.

use embedded_graphics::mono_font::ascii::FONT_6X10;
use embedded_graphics::mono_font::MonoTextStyle;
use embedded_graphics::pixelcolor::BinaryColor;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::{PrimitiveStyle, Rectangle};
use embedded_graphics::text::{Baseline, Text};
use embedded_hal_async::i2c::I2c;
use heapless::String;

use crate::types::TransceiverMode;

/// Display width in pixels
pub const DISPLAY_WIDTH: u32 = 128;

/// Display height in pixels
pub const DISPLAY_HEIGHT: u32 = 64;

/// SSD1306 7-bit bus address
pub const SSD1306_ADDR: u8 = 0x3C;

/// SSD1306 commands
mod cmd {
    pub const SET_CONTRAST: u8 = 0x81;
    pub const DISPLAY_ALL_ON_RESUME: u8 = 0xA4;
    pub const NORMAL_DISPLAY: u8 = 0xA6;
    pub const DISPLAY_OFF: u8 = 0xAE;
    pub const DISPLAY_ON: u8 = 0xAF;
    pub const SET_DISPLAY_OFFSET: u8 = 0xD3;
    pub const SET_COM_PINS: u8 = 0xDA;
    pub const SET_VCOM_DETECT: u8 = 0xDB;
    pub const SET_DISPLAY_CLOCK_DIV: u8 = 0xD5;
    pub const SET_PRECHARGE: u8 = 0xD9;
    pub const SET_MULTIPLEX: u8 = 0xA8;
    pub const SET_START_LINE: u8 = 0x40;
    pub const MEMORY_MODE: u8 = 0x20;
    pub const COLUMN_ADDR: u8 = 0x21;
    pub const PAGE_ADDR: u8 = 0x22;
    pub const COM_SCAN_DEC: u8 = 0xC8;
    pub const SEG_REMAP: u8 = 0xA0;
    pub const CHARGE_PUMP: u8 = 0x8D;
}

const INIT_SEQUENCE: [u8; 25] = [
    cmd::DISPLAY_OFF,
    cmd::SET_DISPLAY_CLOCK_DIV,
    0x80,
    cmd::SET_MULTIPLEX,
    0x3F,
    cmd::SET_DISPLAY_OFFSET,
    0x00,
    cmd::SET_START_LINE,
    cmd::CHARGE_PUMP,
    0x14,
    cmd::MEMORY_MODE,
    0x00,
    cmd::SEG_REMAP | 0x01,
    cmd::COM_SCAN_DEC,
    cmd::SET_COM_PINS,
    0x12,
    cmd::SET_CONTRAST,
    0xCF,
    cmd::SET_PRECHARGE,
    0xF1,
    cmd::SET_VCOM_DETECT,
    0x40,
    cmd::DISPLAY_ALL_ON_RESUME,
    cmd::NORMAL_DISPLAY,
    cmd::DISPLAY_ON,
];

/// Display buffer (1 bit per pixel, page-major)
pub struct DisplayBuffer {
    buffer: [u8; 1024],
}

impl DisplayBuffer {
    /// Create a new empty display buffer
    #[must_use]
    pub const fn new() -> Self {
        Self { buffer: [0; 1024] }
    }

    /// Clear the buffer
    pub fn clear(&mut self) {
        self.buffer.fill(0);
    }

    /// Set a pixel, out of range coordinates are ignored
    pub fn set_pixel(&mut self, x: u32, y: u32, on: bool) {
        if x >= DISPLAY_WIDTH || y >= DISPLAY_HEIGHT {
            return;
        }

        let byte_idx = (y / 8 * DISPLAY_WIDTH + x) as usize;
        let bit = 1 << (y % 8);

        if on {
            self.buffer[byte_idx] |= bit;
        } else {
            self.buffer[byte_idx] &= !bit;
        }
    }

    /// Raw page data
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.buffer
    }
}

impl Default for DisplayBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl DrawTarget for DisplayBuffer {
    type Color = BinaryColor;
    type Error = core::convert::Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(coord, color) in pixels {
            if let (Ok(x), Ok(y)) = (u32::try_from(coord.x), u32::try_from(coord.y)) {
                self.set_pixel(x, y, color.is_on());
            }
        }
        Ok(())
    }
}

impl OriginDimensions for DisplayBuffer {
    fn size(&self) -> Size {
        Size::new(DISPLAY_WIDTH, DISPLAY_HEIGHT)
    }
}

/// SSD1306 on an async I2C bus
pub struct Display<I> {
    bus: I,
    buffer: DisplayBuffer,
}

impl<I: I2c> Display<I> {
    /// Wrap the bus; call [`Self::init`] before drawing
    pub fn new(bus: I) -> Self {
        Self {
            bus,
            buffer: DisplayBuffer::new(),
        }
    }

    /// Run the power-up sequence and blank the panel
    pub async fn init(&mut self) -> Result<(), I::Error> {
        for &c in &INIT_SEQUENCE {
            self.send_command(c).await?;
        }
        self.buffer.clear();
        self.flush().await
    }

    async fn send_command(&mut self, c: u8) -> Result<(), I::Error> {
        self.bus.write(SSD1306_ADDR, &[0x00, c]).await
    }

    /// Push the framebuffer to the panel
    pub async fn flush(&mut self) -> Result<(), I::Error> {
        for c in [cmd::COLUMN_ADDR, 0, 127, cmd::PAGE_ADDR, 0, 7] {
            self.send_command(c).await?;
        }

        // data control byte followed by up to 32 bytes of page data
        let mut packet = [0u8; 33];
        packet[0] = 0x40;
        for page in self.buffer.as_bytes().chunks(32) {
            packet[1..=page.len()].copy_from_slice(page);
            self.bus.write(SSD1306_ADDR, &packet[..=page.len()]).await?;
        }
        Ok(())
    }

    /// Framebuffer for drawing
    pub fn buffer_mut(&mut self) -> &mut DisplayBuffer {
        &mut self.buffer
    }
}

/// Values shown on the status panel
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct PanelStatus {
    /// Active transceiver mode
    pub mode: TransceiverMode,
    /// LNA gain in dB
    pub lna_gain_db: u16,
    /// RX VGA gain in dB
    pub vga_gain_db: u16,
    /// TX VGA gain in dB
    pub txvga_gain_db: u16,
}

/// Status panel renderer
pub struct StatusRenderer;

impl StatusRenderer {
    /// Redraw the whole panel
    pub fn render(buffer: &mut DisplayBuffer, status: &PanelStatus) {
        buffer.clear();
        Self::render_mode(buffer, status.mode);
        Self::render_gains(buffer, status);
    }

    /// Mode banner, inverted while streaming
    pub fn render_mode(buffer: &mut DisplayBuffer, mode: TransceiverMode) {
        let text = match mode {
            TransceiverMode::Off => "OFF",
            TransceiverMode::Rx => "RX",
            TransceiverMode::Tx => "TX",
            TransceiverMode::CpldUpdate => "CPLD",
            TransceiverMode::RxSweep => "SWEEP",
        };

        if mode.is_streaming() {
            let rect = Rectangle::new(Point::new(0, 0), Size::new(DISPLAY_WIDTH, 12));
            let _ = rect
                .into_styled(PrimitiveStyle::with_fill(BinaryColor::On))
                .draw(buffer);
            let style = MonoTextStyle::new(&FONT_6X10, BinaryColor::Off);
            let _ = Text::with_baseline(text, Point::new(2, 1), style, Baseline::Top).draw(buffer);
        } else {
            let style = MonoTextStyle::new(&FONT_6X10, BinaryColor::On);
            let _ = Text::with_baseline(text, Point::new(2, 1), style, Baseline::Top).draw(buffer);
        }
    }

    /// One line per gain stage
    pub fn render_gains(buffer: &mut DisplayBuffer, status: &PanelStatus) {
        let style = MonoTextStyle::new(&FONT_6X10, BinaryColor::On);
        let rows = [
            ("LNA", status.lna_gain_db, 16),
            ("VGA", status.vga_gain_db, 28),
            ("TXV", status.txvga_gain_db, 40),
        ];
        for (label, db, y) in rows {
            let mut s: String<16> = String::new();
            core::fmt::write(&mut s, format_args!("{label} {db:2} dB")).ok();
            let _ = Text::with_baseline(&s, Point::new(2, y), style, Baseline::Top).draw(buffer);
        }
    }
}
