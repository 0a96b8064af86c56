//! Aubade - Window Blind Firmware
//!
//! Main firmware binary for an RP2040 driving a stepper window blind.
//! The blind follows a daily schedule (gradual pre-open, open, close)
//! and takes dashboard commands relayed by a network bridge over UART.

#![no_std]
#![no_main]

use defmt::*;
use embassy_executor::Spawner;
use embassy_rp::bind_interrupts;
use embassy_rp::gpio::{Level, Output};
use embassy_rp::peripherals::UART0;
use embassy_rp::uart::{BufferedInterruptHandler, Config as UartConfig, Uart};
use embassy_time::Timer;
use static_cell::StaticCell;
use {defmt_rtt as _, panic_probe as _};

use aubade_core::config::{parse_config, BlindConfig};
use aubade_drivers::stepper::Uln2003;

/// Embedded configuration (compiled into firmware)
/// Edit blind.toml and rebuild to customize
const EMBEDDED_CONFIG: &str = include_str!("../blind.toml");

mod channels;
mod tasks;

bind_interrupts!(struct Irqs {
    UART0_IRQ => BufferedInterruptHandler<UART0>;
});

// Static cells for UART buffers (must live forever)
static TX_BUF: StaticCell<[u8; 256]> = StaticCell::new();
static RX_BUF: StaticCell<[u8; 256]> = StaticCell::new();

static CONFIG: StaticCell<BlindConfig> = StaticCell::new();

/// Main entry point
#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("Aubade firmware starting...");

    let p = embassy_rp::init(Default::default());
    info!("Peripherals initialized");

    let config = match parse_config(EMBEDDED_CONFIG) {
        Ok(config) => config,
        Err(e) => {
            // No calibration to fall back on; keep the motor unpowered
            error!("Failed to parse embedded config: {:?}", e);
            park().await
        }
    };
    let config: &'static BlindConfig = CONFIG.init(config);
    info!(
        "Travel: {} steps at {} steps/s, timeout {} ms",
        config.travel.full_travel_steps,
        config.travel.max_speed_sps,
        config.travel.move_timeout_ms
    );
    let turns_x10 = config.travel_revolutions_x10();
    info!(
        "Travel: {}.{} shaft revolutions at {} steps/rev",
        turns_x10 / 10,
        turns_x10 % 10,
        config.motor.steps_per_revolution
    );

    // Setup UART for bridge communication
    // Pin assignments are board-specific (Pico: GPIO0 TX, GPIO1 RX)
    let mut uart_config = UartConfig::default();
    uart_config.baudrate = config.bridge.baud_rate;

    let tx_buf = TX_BUF.init([0u8; 256]);
    let rx_buf = RX_BUF.init([0u8; 256]);

    let uart = Uart::new_blocking(p.UART0, p.PIN_0, p.PIN_1, uart_config);
    let uart = uart.into_buffered(Irqs, tx_buf, rx_buf);
    let (tx, rx) = uart.split();

    info!("UART initialized for bridge communication");

    // Setup ULN2003 coil outputs
    // Pin assignments are board-specific (IN1..IN4 on GPIO2..GPIO5)
    let coils = [
        Output::new(p.PIN_2, Level::Low),
        Output::new(p.PIN_3, Level::Low),
        Output::new(p.PIN_4, Level::Low),
        Output::new(p.PIN_5, Level::Low),
    ];
    let driver = match Uln2003::new(coils, config.motor.invert_direction) {
        Ok(driver) => driver,
        Err(e) => {
            error!("Failed to initialize coil driver: {:?}", e);
            park().await
        }
    };

    info!("ULN2003 stepper initialized");

    spawner.spawn(tasks::tick_task()).unwrap();
    spawner.spawn(tasks::bridge_rx_task(rx)).unwrap();
    spawner.spawn(tasks::bridge_tx_task(tx)).unwrap();
    spawner
        .spawn(tasks::stepper_task(
            driver,
            config.travel,
            config.motor.release_when_idle,
        ))
        .unwrap();
    spawner.spawn(tasks::controller_task(config)).unwrap();

    info!("All tasks spawned, firmware running");

    loop {
        Timer::after_secs(60).await;
        trace!("Main loop heartbeat");
    }
}

/// Idle forever after a fatal boot error
async fn park() -> ! {
    loop {
        Timer::after_secs(60).await;
        error!("Firmware halted: fix blind.toml and reflash");
    }
}
