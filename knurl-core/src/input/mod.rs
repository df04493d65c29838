//! Input recognition for the rotary encoder and its push button
//!
//! Both recognizers are synchronous state machines driven by the caller's
//! polling loop. They never block and never allocate; timing is derived
//! from the millisecond timestamps the caller passes in.
//!
//! Operating constraint: the polling loop must run at 100 Hz or faster.
//! The recognizers degrade gracefully under irregular polling (a late
//! poll still measures real elapsed time), but encoder detents are lost
//! if samples are skipped, and a double-click is missed entirely if the
//! poll gap exceeds the double-click window.

pub mod button;
pub mod events;
pub mod quadrature;

pub use button::{ButtonClassifier, ButtonEvent};
pub use events::InputEvent;
pub use quadrature::QuadratureDecoder;

use crate::config::InputConfig;

/// Combined front-end for one rotary encoder with an integrated button
///
/// Thin façade over [`QuadratureDecoder`] and [`ButtonClassifier`] for
/// screen code that polls a single input device. Pin levels are passed
/// raw; the button line is active-low (pull-up enabled, pressed = low).
pub struct RotaryInput {
    decoder: QuadratureDecoder,
    button: ButtonClassifier,
}

impl RotaryInput {
    /// Create a front-end with the given timing configuration
    pub fn new(config: InputConfig) -> Self {
        Self {
            decoder: QuadratureDecoder::new(config),
            button: ButtonClassifier::new(config),
        }
    }

    /// Latch the encoder's resting pin state without decoding
    ///
    /// Call once at startup so the first real transition is not compared
    /// against a stale power-on value.
    pub fn sync(&mut self, a_high: bool, b_high: bool) {
        self.decoder.sync(a_high, b_high);
    }

    /// Poll the encoder lines; returns -1, 0 or +1 detents
    pub fn poll_step(&mut self, a_high: bool, b_high: bool, now_ms: u64) -> i8 {
        self.decoder.decode(a_high, b_high, now_ms)
    }

    /// Poll the button line; `sw_high` is the raw (active-low) level
    pub fn poll_button(&mut self, sw_high: bool, now_ms: u64) -> Option<ButtonEvent> {
        self.button.poll(!sw_high, now_ms)
    }

    /// Long-press hold progress in [0, 1], if the indicator should show
    pub fn long_press_progress(&self, now_ms: u64) -> Option<f32> {
        self.button.long_press_progress(now_ms)
    }
}
