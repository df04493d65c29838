//! Tone generator owner task
//!
//! Sole owner of the buzzer's PWM slice. Commands arrive on
//! [`TONE_CMD`]; silence drops the compare value to zero, which parks
//! the pin low and is safe to repeat.

use defmt::*;
use embassy_rp::pwm::{Config as PwmConfig, Pwm};
use fixed::traits::ToFixed;

use crate::channels::{ToneCommand, TONE_CMD};

/// System clock divider; 125 MHz / 125 = 1 MHz PWM counter clock
const PWM_DIVIDER: u8 = 125;
const PWM_COUNTER_HZ: u32 = 1_000_000;

/// Tone task - applies the latest command to the PWM slice
#[embassy_executor::task]
pub async fn tone_task(mut pwm: Pwm<'static>) {
    info!("Tone task started");

    let mut config = PwmConfig::default();
    config.divider = PWM_DIVIDER.to_fixed();
    config.compare_a = 0;
    pwm.set_config(&config);

    loop {
        match TONE_CMD.wait().await {
            ToneCommand::Silence => {
                config.compare_a = 0;
            }
            ToneCommand::Note(freq_hz) => {
                let top = (PWM_COUNTER_HZ / u32::from(freq_hz.max(1))).min(0xffff) as u16;
                config.top = top;
                // 50% duty square wave
                config.compare_a = top / 2;
            }
        }
        pwm.set_config(&config);
    }
}
