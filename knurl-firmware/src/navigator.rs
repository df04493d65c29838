//! Demo menu navigator
//!
//! Stand-in for the real menu system: consumes navigation events,
//! switches between a quiet home screen and a light-show screen, and
//! drives the supervisor on every transition. Also logs the long-press
//! hold progress in place of the progress-bar renderer.

use defmt::*;
use embassy_futures::select::{select, Either};

use knurl_core::input::InputEvent;
use knurl_core::supervisor::Supervisor;
use knurl_core::traits::{PeripheralSet, Priority, ScreenId, WorkerSpec};

use crate::channels::{HOLD_PROGRESS, INPUT_CHANNEL};
use crate::runtime::{EmbassyRuntime, WorkerEntry};

/// Quiet screen, no workers
pub const SCREEN_HOME: ScreenId = ScreenId(0);
/// Screen with the LED and tone workers running
pub const SCREEN_SHOW: ScreenId = ScreenId(1);

/// Per-worker stop budget; the original firmware waited up to 1.5 s
/// for its tasks to delete themselves
const STOP_TIMEOUT_MS: u32 = 1500;

/// Navigator task - screen switching and worker lifecycle
#[embassy_executor::task]
pub async fn navigator_task(mut sup: Supervisor<EmbassyRuntime>) {
    info!("Navigator started on home screen");
    let mut screen = SCREEN_HOME;

    loop {
        let event = match select(INPUT_CHANNEL.receive(), HOLD_PROGRESS.wait()).await {
            Either::First(event) => event,
            Either::Second(progress) => {
                // The display renderer is out of scope; log instead
                match progress {
                    Some(p) => info!("hold progress {}%", (p * 100.0) as u8),
                    None => info!("hold progress cleared"),
                }
                continue;
            }
        };

        match (screen, event) {
            (SCREEN_HOME, InputEvent::Click) => {
                if enter_show(&mut sup) {
                    screen = SCREEN_SHOW;
                }
            }
            (SCREEN_SHOW, InputEvent::Click) | (SCREEN_SHOW, InputEvent::LongPress) => {
                leave_show(&mut sup);
                screen = SCREEN_HOME;
            }
            (_, InputEvent::StepCw) | (_, InputEvent::StepCcw) => {
                info!("scroll {}", event);
            }
            (_, InputEvent::DoubleClick) => {
                info!("double click on screen {}", screen.0);
            }
            _ => {}
        }
    }
}

fn enter_show(sup: &mut Supervisor<EmbassyRuntime>) -> bool {
    let led = WorkerSpec::new("led", SCREEN_SHOW)
        .priority(Priority::NORMAL)
        .pinned(1)
        .owns(PeripheralSet::LED_STRIP);
    let tone = WorkerSpec::new("tone", SCREEN_SHOW)
        .priority(Priority::NORMAL)
        .pinned(1)
        .owns(PeripheralSet::TONE);

    let mut ok = sup.start(led, WorkerEntry::LedRainbow);
    ok &= sup.start(tone, WorkerEntry::ToneBeacon);
    if !ok {
        warn!("show screen workers did not all start, rolling back");
        sup.stop_all_for_screen(SCREEN_SHOW, &[], STOP_TIMEOUT_MS);
    }
    ok
}

fn leave_show(sup: &mut Supervisor<EmbassyRuntime>) {
    // Tone first: it shares its cadence with the LED animation
    sup.stop_all_for_screen(SCREEN_SHOW, &["tone", "led"], STOP_TIMEOUT_MS);
    info!("show screen stopped");
}
