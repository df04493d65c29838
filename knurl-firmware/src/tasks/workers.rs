//! Supervised background workers
//!
//! These run on the core-1 executor under supervisor control. Each one
//! checks its stop flag at bounded intervals, commands its peripheral's
//! safe state on the way out (the supervisor repeats that idempotently),
//! and marks its slot done as the last thing it does.

use defmt::*;
use embassy_time::{Duration, Timer};
use smart_leds::RGB8;

use knurl_core::traits::StopFlag;

use crate::channels::{LedCommand, ToneCommand, LED_CMD, NUM_LEDS, TONE_CMD};
use crate::runtime::SlotFlag;

/// Interval between stop-flag checks; keeps workers stoppable within
/// tens of milliseconds
const STOP_CHECK_MS: u64 = 20;

/// Rainbow animation worker for the LED strip
#[embassy_executor::task]
pub async fn led_rainbow(stop: SlotFlag) {
    info!("led rainbow worker started");

    let mut hue: u8 = 0;
    while !stop.is_requested() {
        let mut frame = [RGB8::default(); NUM_LEDS];
        for (i, px) in frame.iter_mut().enumerate() {
            *px = wheel(hue.wrapping_add((i as u8).wrapping_mul(32)));
        }
        LED_CMD.signal(LedCommand::Frame(frame));
        hue = hue.wrapping_add(4);
        Timer::after(Duration::from_millis(STOP_CHECK_MS)).await;
    }

    LED_CMD.signal(LedCommand::Off);
    info!("led rainbow worker exiting");
    stop.mark_done();
}

/// Two-tone beacon worker for the buzzer
#[embassy_executor::task]
pub async fn tone_beacon(stop: SlotFlag) {
    info!("tone beacon worker started");

    let mut high = true;
    'outer: while !stop.is_requested() {
        TONE_CMD.signal(ToneCommand::Note(if high { 880 } else { 440 }));
        high = !high;
        // 250 ms per note, stop flag checked throughout
        for _ in 0..(250 / STOP_CHECK_MS) {
            if stop.is_requested() {
                break 'outer;
            }
            Timer::after(Duration::from_millis(STOP_CHECK_MS)).await;
        }
    }

    TONE_CMD.signal(ToneCommand::Silence);
    info!("tone beacon worker exiting");
    stop.mark_done();
}

/// Classic 256-position color wheel
fn wheel(pos: u8) -> RGB8 {
    match pos {
        0..=84 => RGB8::new(255 - pos * 3, pos * 3, 0),
        85..=169 => {
            let pos = pos - 85;
            RGB8::new(0, 255 - pos * 3, pos * 3)
        }
        _ => {
            let pos = pos - 170;
            RGB8::new(pos * 3, 0, 255 - pos * 3)
        }
    }
}
