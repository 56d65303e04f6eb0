//! SDR USB-Core Main Application
//!
//! Entry point for the Cortex-M7 core of the STM32H755. Places the shared
//! region, brings up the USB vendor device and spawns the USB, bulk,
//! streaming and panel tasks.

#![no_std]
#![no_main]

use core::mem::MaybeUninit;

use defmt::{info, unwrap};
use embassy_executor::Spawner;
use embassy_futures::yield_now;
use embassy_stm32::gpio::{Input, Level, Output, Pull, Speed};
use embassy_stm32::i2c::{self, I2c};
use embassy_stm32::mode::Async;
use embassy_stm32::time::Hertz;
use embassy_stm32::usb::{self, Driver};
use embassy_stm32::{bind_interrupts, peripherals, SharedData};
use embassy_usb::descriptor::{SynchronizationType, UsageType};
use embassy_usb::driver::{Driver as _, Endpoint as _, EndpointType};
use embassy_usb::{Builder, UsbDevice};
use static_cell::{ConstStaticCell, StaticCell};
use {defmt_rtt as _, panic_probe as _};

use sdr_usb_firmware::drivers::board::{board_cell, BoardCell, BoardHandle, BoardPins};
use sdr_usb_firmware::drivers::display::Display;
use sdr_usb_firmware::frontend::Frontend;
use sdr_usb_firmware::hal::gpio::{ClockDetect, ControlLine, ModeLeds, RfSwitchPins};
use sdr_usb_firmware::prelude::*;
use sdr_usb_firmware::shared::BulkBuffer;
use sdr_usb_firmware::streaming::CounterView;
use sdr_usb_firmware::streaming::UsbCounter;
use sdr_usb_firmware::ui::{run_panel, PanelShared, PanelUi};
use sdr_usb_firmware::usb::{run_bulk, BulkQueues, ChannelTransport, VendorControl};

bind_interrupts!(struct Irqs {
    OTG_FS => usb::InterruptHandler<peripherals::USB_OTG_FS>;
    I2C1_EV => i2c::EventInterruptHandler<peripherals::I2C1>;
    I2C1_ER => i2c::ErrorInterruptHandler<peripherals::I2C1>;
});

type UsbDriver = Driver<'static, peripherals::USB_OTG_FS>;
type BulkIn = <UsbDriver as embassy_usb::driver::Driver<'static>>::EndpointIn;
type BulkOut = <UsbDriver as embassy_usb::driver::Driver<'static>>::EndpointOut;
type Control = VendorControl<
    'static,
    Frontend<RfSwitchPins<'static>>,
    BoardHandle,
    ChannelTransport,
    PanelUi,
    BULK_BUFFER_SIZE,
>;

/// Vendor-specific interface class
const VENDOR_CLASS: u8 = 0xFF;

/// Streaming task back-off while no streaming mode is active
const IDLE_POLL: Duration = Duration::from_millis(1);

// Ring buffer and statistics block at the fixed address both cores agree on.
// The section is NOLOAD, so the contents are undefined until reset below.
#[link_section = ".shared_ram"]
static mut SHARED: SharedRegion = SharedRegion::new();

// Dual-core clock and init handshake with the RF core
#[link_section = ".ram_d3"]
static SHARED_DATA: MaybeUninit<SharedData> = MaybeUninit::uninit();

static MODE: ModeCell = ModeCell::new();
static BOARD: BoardCell = board_cell();
static BULK_QUEUES: BulkQueues = BulkQueues::new();
static PANEL: PanelShared = PanelShared::new();

static CONTROL: StaticCell<Control> = StaticCell::new();
static EP_OUT_BUFFER: ConstStaticCell<[u8; 256]> = ConstStaticCell::new([0; 256]);
static CONFIG_DESC: ConstStaticCell<[u8; 256]> = ConstStaticCell::new([0; 256]);
static BOS_DESC: ConstStaticCell<[u8; 256]> = ConstStaticCell::new([0; 256]);
static MSOS_DESC: ConstStaticCell<[u8; 256]> = ConstStaticCell::new([0; 256]);
static CONTROL_BUF: ConstStaticCell<[u8; 64]> = ConstStaticCell::new([0; CONTROL_BUFFER_SIZE]);

/// Main entry point
#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("SDR USB core firmware v{}", env!("CARGO_PKG_VERSION"));

    let mut config = embassy_stm32::Config::default();
    {
        use embassy_stm32::rcc::*;
        config.rcc.hsi = Some(HSIPrescaler::DIV1);
        config.rcc.csi = true;
        config.rcc.hsi48 = Some(Hsi48Config {
            sync_from_usb: true,
        });
        config.rcc.pll1 = Some(Pll {
            source: PllSource::HSI,
            prediv: PllPreDiv::DIV4,
            mul: PllMul::MUL50,
            divp: Some(PllDiv::DIV2),
            divq: None,
            divr: None,
        });
        config.rcc.sys = Sysclk::PLL1_P;
        config.rcc.ahb_pre = AHBPrescaler::DIV2;
        config.rcc.apb1_pre = APBPrescaler::DIV2;
        config.rcc.apb2_pre = APBPrescaler::DIV2;
        config.rcc.apb3_pre = APBPrescaler::DIV2;
        config.rcc.apb4_pre = APBPrescaler::DIV2;
        config.rcc.voltage_scale = VoltageScale::Scale1;
        config.rcc.supply_config = SupplyConfig::DirectSMPS;
        config.rcc.mux.usbsel = mux::Usbsel::HSI48;
    }
    let p = embassy_stm32::init_primary(config, &SHARED_DATA);

    info!("Peripherals initialized");

    // SAFETY: the only reference to SHARED is created here, once, before any
    // task that could observe it is spawned.
    #[allow(unsafe_code)]
    let shared: &'static mut SharedRegion = unsafe { &mut *core::ptr::addr_of_mut!(SHARED) };
    let SharedRegion { buffer, stats } = shared;
    let buffer: &'static BulkBuffer = buffer;
    let (_rf_core, usb_counter, stats_control) = stats.split();
    stats_control.set_mode(BufferMode::Idle);
    stats_control.reset_for_activation();
    let peer = usb_counter.rf_view();

    // Board: LD1 = RX, LD3 = TX on the Nucleo-H755ZI-Q
    let board = BoardHandle::install(
        &BOARD,
        BoardPins {
            leds: ModeLeds::new(
                Output::new(p.PB0, Level::Low, Speed::Low),
                Output::new(p.PB14, Level::Low, Speed::Low),
            ),
            stream_enable: ControlLine::new(Output::new(p.PG0, Level::Low, Speed::High)),
            hw_sync: ControlLine::new(Output::new(p.PG1, Level::Low, Speed::Low)),
            clock_select: ControlLine::new(Output::new(p.PG2, Level::Low, Speed::Low)),
            clock_detect: ClockDetect::new(Input::new(p.PG3, Pull::Down)),
        },
    );

    let rf = Frontend::new(RfSwitchPins::new(
        Output::new(p.PD0, Level::Low, Speed::Low),
        Output::new(p.PD1, Level::Low, Speed::Low),
        Output::new(p.PD2, Level::Low, Speed::Low),
        Output::new(p.PD3, Level::Low, Speed::Low),
    ));
    let bulk = ChannelTransport::new(&BULK_QUEUES);

    // USB vendor device
    let mut usb_config = usb::Config::default();
    usb_config.vbus_detection = false;
    let mut driver = Driver::new_fs(
        p.USB_OTG_FS,
        Irqs,
        p.PA12,
        p.PA11,
        EP_OUT_BUFFER.take(),
        usb_config,
    );
    let (ep_in, ep_out) = allocate_bulk_endpoints(&mut driver);

    let mut device_config = embassy_usb::Config::new(USB_VID, USB_PID);
    device_config.manufacturer = Some("SDR Project");
    device_config.product = Some("SDR USB Transceiver");
    device_config.serial_number = Some(env!("CARGO_PKG_VERSION"));
    device_config.max_power = 500;
    device_config.max_packet_size_0 = CONTROL_PACKET_SIZE;
    device_config.device_class = VENDOR_CLASS;
    device_config.device_sub_class = 0;
    device_config.device_protocol = 0;
    device_config.composite_with_iads = false;

    let mut builder = Builder::new(
        driver,
        device_config,
        CONFIG_DESC.take(),
        BOS_DESC.take(),
        MSOS_DESC.take(),
        CONTROL_BUF.take(),
    );

    let mut func = builder.function(VENDOR_CLASS, 0, 0);
    let mut interface = func.interface();
    let mut alt = interface.alt_setting(VENDOR_CLASS, 0, 0, None);
    alt.endpoint_descriptor(
        &ep_in.info().clone(),
        SynchronizationType::NoSynchronization,
        UsageType::DataEndpoint,
        &[],
    );
    alt.endpoint_descriptor(
        &ep_out.info().clone(),
        SynchronizationType::NoSynchronization,
        UsageType::DataEndpoint,
        &[],
    );
    drop(func);

    let transceiver = Transceiver::new(&MODE, stats_control);
    let control = CONTROL.init(VendorControl::new(Device::new(
        transceiver,
        Peripherals {
            rf,
            board,
            bulk,
            ui: PanelUi::new(&PANEL),
        },
    )));
    builder.handler(control);
    let usb = builder.build();

    info!("USB vendor device built");

    // Status display on I2C1: PB8 = SCL, PB9 = SDA
    let i2c = I2c::new(
        p.I2C1,
        p.PB8,
        p.PB9,
        Irqs,
        p.DMA1_CH0,
        p.DMA1_CH1,
        Hertz(400_000),
        Default::default(),
    );

    unwrap!(spawner.spawn(usb_task(usb)));
    unwrap!(spawner.spawn(bulk_task(ep_in, ep_out, buffer, usb_counter)));
    unwrap!(spawner.spawn(stream_task(buffer, peer, &MODE, board, bulk)));
    unwrap!(spawner.spawn(panel_task(Display::new(i2c))));

    info!("Tasks spawned");
}

/// Claim IN 0x81 and OUT 0x02 so host tools find the endpoints they expect
fn allocate_bulk_endpoints(driver: &mut UsbDriver) -> (BulkIn, BulkOut) {
    let ep_in = loop {
        let ep = unwrap!(driver.alloc_endpoint_in(EndpointType::Bulk, BULK_PACKET_SIZE, 0));
        if u8::from(ep.info().addr) == BULK_IN_EP_ADDR {
            break ep;
        }
    };
    let ep_out = loop {
        let ep = unwrap!(driver.alloc_endpoint_out(EndpointType::Bulk, BULK_PACKET_SIZE, 0));
        if u8::from(ep.info().addr) == BULK_OUT_EP_ADDR {
            break ep;
        }
    };
    (ep_in, ep_out)
}

#[embassy_executor::task]
async fn usb_task(mut usb: UsbDevice<'static, UsbDriver>) -> ! {
    usb.run().await
}

#[embassy_executor::task]
async fn bulk_task(
    ep_in: BulkIn,
    ep_out: BulkOut,
    buffer: &'static BulkBuffer,
    counter: UsbCounter<'static>,
) -> ! {
    run_bulk(ep_in, ep_out, buffer, &BULK_QUEUES, counter).await
}

/// Streaming loop: one session per RX/TX activation
#[embassy_executor::task]
async fn stream_task(
    buffer: &'static BulkBuffer,
    peer: CounterView<'static>,
    mode: &'static ModeCell,
    mut board: BoardHandle,
    mut bulk: ChannelTransport,
) -> ! {
    loop {
        match StreamSession::start(buffer, peer, mode, &mut board, &mut bulk) {
            Some(mut session) => {
                while session.poll(&mut bulk) != PollState::Ended {
                    yield_now().await;
                }
                info!("stream session {:?} ended", session.mode());
            }
            None => Timer::after(IDLE_POLL).await,
        }
    }
}

#[embassy_executor::task]
async fn panel_task(display: Display<I2c<'static, Async>>) -> ! {
    run_panel(display, &PANEL, &MODE).await
}
