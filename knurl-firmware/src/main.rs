//! Knurl - rotary-input gadget firmware
//!
//! Main firmware binary for RP2040-based boards. Core 0 runs the input
//! polling loop, the peripheral owner tasks and the navigator; core 1
//! runs the supervised background workers, so a blocking stop wait on
//! core 0 never starves the worker it is waiting for.

#![no_std]
#![no_main]

use defmt::*;
use embassy_executor::{Executor, SendSpawner, Spawner};
use embassy_rp::bind_interrupts;
use embassy_rp::gpio::{Input, Pull};
use embassy_rp::multicore::{spawn_core1, Stack};
use embassy_rp::peripherals::PIO0;
use embassy_rp::pio::Pio;
use embassy_rp::pio_programs::ws2812::{PioWs2812, PioWs2812Program};
use embassy_rp::pwm::Pwm;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;
use static_cell::StaticCell;
use {defmt_rtt as _, panic_probe as _};

use knurl_core::supervisor::Supervisor;

use crate::runtime::EmbassyRuntime;

mod channels;
mod navigator;
mod runtime;
mod tasks;

bind_interrupts!(struct Irqs {
    PIO0_IRQ_0 => embassy_rp::pio::InterruptHandler<PIO0>;
});

static mut CORE1_STACK: Stack<4096> = Stack::new();
static EXECUTOR1: StaticCell<Executor> = StaticCell::new();

/// Core 1 hands its spawner back to core 0 through this signal
static CORE1_SPAWNER: Signal<CriticalSectionRawMutex, SendSpawner> = Signal::new();

/// Main entry point
#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("Knurl firmware starting...");

    let p = embassy_rp::init(Default::default());

    // Encoder A/B lines and the integrated button, active-low with
    // pull-ups enabled
    let enc_a = Input::new(p.PIN_10, Pull::Up);
    let enc_b = Input::new(p.PIN_11, Pull::Up);
    let enc_sw = Input::new(p.PIN_12, Pull::Up);

    // WS2812 strip on PIO0
    let Pio {
        mut common, sm0, ..
    } = Pio::new(p.PIO0, Irqs);
    let ws2812_program = PioWs2812Program::new(&mut common);
    let strip = PioWs2812::new(&mut common, sm0, p.DMA_CH0, p.PIN_16, &ws2812_program);

    // Passive buzzer on PWM slice 0 channel A
    let buzzer = Pwm::new_output_a(p.PWM_SLICE0, p.PIN_0, Default::default());

    // Worker executor on core 1
    #[allow(static_mut_refs)]
    spawn_core1(p.CORE1, unsafe { &mut CORE1_STACK }, || {
        let executor1 = EXECUTOR1.init(Executor::new());
        executor1.run(|spawner| CORE1_SPAWNER.signal(spawner.make_send()));
    });
    let core1 = CORE1_SPAWNER.wait().await;
    info!("Core 1 worker executor up");

    let supervisor = Supervisor::new(EmbassyRuntime::new(core1));

    unwrap!(spawner.spawn(tasks::input_task(enc_a, enc_b, enc_sw)));
    unwrap!(spawner.spawn(tasks::led_task(strip)));
    unwrap!(spawner.spawn(tasks::tone_task(buzzer)));
    unwrap!(spawner.spawn(navigator::navigator_task(supervisor)));

    info!("Knurl ready");
}
