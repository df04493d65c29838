//! Inter-task communication channels
//!
//! Defines the static channels used for communication between Embassy
//! tasks. Uses embassy-sync primitives for safe async communication.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use embassy_sync::signal::Signal;
use smart_leds::RGB8;

use knurl_core::input::InputEvent;

/// Channel capacity for input events
const INPUT_CHANNEL_SIZE: usize = 8;

/// Pixels on the LED strip
pub const NUM_LEDS: usize = 8;

/// Command for the task owning the LED strip
#[derive(Clone, Copy, PartialEq)]
pub enum LedCommand {
    /// All pixels dark; the strip's safe state
    Off,
    /// Display one full frame
    Frame([RGB8; NUM_LEDS]),
}

/// Command for the task owning the tone PWM slice
#[derive(Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ToneCommand {
    /// Output low; the buzzer's safe state
    Silence,
    /// Square wave at the given frequency
    Note(u16),
}

/// Navigation events from the input recognizers
pub static INPUT_CHANNEL: Channel<CriticalSectionRawMutex, InputEvent, INPUT_CHANNEL_SIZE> =
    Channel::new();

/// Long-press hold progress in [0, 1]; None clears the indicator
pub static HOLD_PROGRESS: Signal<CriticalSectionRawMutex, Option<f32>> = Signal::new();

/// Latest LED strip command (workers and supervisor write, LED task applies)
pub static LED_CMD: Signal<CriticalSectionRawMutex, LedCommand> = Signal::new();

/// Latest tone command (workers and supervisor write, tone task applies)
pub static TONE_CMD: Signal<CriticalSectionRawMutex, ToneCommand> = Signal::new();
