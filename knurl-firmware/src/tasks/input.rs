//! Input polling task
//!
//! Samples the encoder lines and the button at 500 Hz (well above the
//! recognizers' 100 Hz minimum), publishes navigation events on the
//! input channel and the long-press hold progress on its signal.

use defmt::*;
use embassy_rp::gpio::Input;
use embassy_time::{Duration, Instant, Ticker};

use knurl_core::config::InputConfig;
use knurl_core::input::{InputEvent, RotaryInput};

use crate::channels::{HOLD_PROGRESS, INPUT_CHANNEL};

/// Poll interval; 2 ms matches the decoder's default debounce window
const POLL_INTERVAL_MS: u64 = 2;

/// Input polling task - the only place the encoder GPIOs are read
#[embassy_executor::task]
pub async fn input_task(a: Input<'static>, b: Input<'static>, sw: Input<'static>) {
    info!("Input task started");

    let mut input = RotaryInput::new(InputConfig::default());
    input.sync(a.is_high(), b.is_high());

    let mut ticker = Ticker::every(Duration::from_millis(POLL_INTERVAL_MS));
    let start = Instant::now();
    let mut progress_shown = false;

    loop {
        ticker.next().await;
        let now_ms = start.elapsed().as_millis();

        let step = input.poll_step(a.is_high(), b.is_high(), now_ms);
        if let Some(event) = InputEvent::from_step(step) {
            publish(event);
        }
        if let Some(event) = input.poll_button(sw.is_high(), now_ms) {
            publish(event.into());
        }

        match input.long_press_progress(now_ms) {
            Some(progress) => {
                progress_shown = true;
                HOLD_PROGRESS.signal(Some(progress));
            }
            // One clearing signal when the hold ends short of confirmation
            None if progress_shown => {
                progress_shown = false;
                HOLD_PROGRESS.signal(None);
            }
            None => {}
        }
    }
}

/// Publish without blocking the polling loop; a lagging consumer loses
/// events rather than input timing
fn publish(event: InputEvent) {
    if INPUT_CHANNEL.try_send(event).is_err() {
        warn!("input channel full, dropping {}", event);
    }
}
