//! LED strip owner task
//!
//! Sole owner of the WS2812 strip. Everything else - workers, the
//! supervisor's safe-off - goes through [`LED_CMD`], which makes the
//! off command naturally idempotent.

use defmt::*;
use embassy_rp::peripherals::PIO0;
use embassy_rp::pio_programs::ws2812::PioWs2812;
use smart_leds::RGB8;

use crate::channels::{LedCommand, LED_CMD, NUM_LEDS};

/// LED strip task - applies the latest command to the hardware
#[embassy_executor::task]
pub async fn led_task(mut strip: PioWs2812<'static, PIO0, 0, NUM_LEDS>) {
    info!("LED task started");

    // Known-dark strip at boot
    let mut frame = [RGB8::default(); NUM_LEDS];
    strip.write(&frame).await;

    loop {
        frame = match LED_CMD.wait().await {
            LedCommand::Off => [RGB8::default(); NUM_LEDS],
            LedCommand::Frame(frame) => frame,
        };
        strip.write(&frame).await;
    }
}
