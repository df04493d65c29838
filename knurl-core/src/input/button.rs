//! Button gesture classifier
//!
//! Classifies a single debounced active-low button line into Click,
//! DoubleClick and LongPress events. Exactly one terminal event is
//! produced per physical press/release gesture: a long press suppresses
//! the trailing click, and the first release of a double-click is never
//! reported as a lone click.
//!
//! Timing is wall-clock, so a late poll still measures real elapsed
//! time; only the double-click window is sensitive to poll gaps larger
//! than the window itself.

use crate::config::InputConfig;

/// Terminal event of one button gesture
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ButtonEvent {
    /// Single press, released, no second press within the window
    Click,
    /// Two presses with both gaps inside the double-click window
    DoubleClick,
    /// Press held past the long-press threshold (fires while still held)
    LongPress,
}

/// Classifier phases
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
enum Phase {
    Idle,
    Pressed,
    ReleasedPendingDouble,
    DoublePressed,
}

/// Button gesture state machine
///
/// Mutated only by [`poll`](Self::poll); must be polled at the same or
/// higher rate as the encoder decoder.
pub struct ButtonClassifier {
    double_click_window_ms: u32,
    progress_start_ms: u32,
    long_press_ms: u32,
    phase: Phase,
    press_start_ms: u64,
    first_release_ms: u64,
    long_press_handled: bool,
    click_handled: bool,
}

impl ButtonClassifier {
    /// Create a classifier with the given timing configuration
    pub fn new(config: InputConfig) -> Self {
        Self {
            double_click_window_ms: config.double_click_window_ms,
            progress_start_ms: config.progress_start_ms,
            long_press_ms: config.long_press_ms,
            phase: Phase::Idle,
            press_start_ms: 0,
            first_release_ms: 0,
            long_press_handled: false,
            click_handled: false,
        }
    }

    /// Poll the classifier with the current (debounced) pressed level
    ///
    /// Returns the terminal event of a gesture at most once.
    pub fn poll(&mut self, pressed: bool, now_ms: u64) -> Option<ButtonEvent> {
        match self.phase {
            Phase::Idle => {
                if pressed {
                    self.phase = Phase::Pressed;
                    self.press_start_ms = now_ms;
                    self.long_press_handled = false;
                    self.click_handled = false;
                }
                None
            }
            Phase::Pressed => {
                if !pressed {
                    self.first_release_ms = now_ms;
                    self.phase = Phase::ReleasedPendingDouble;
                    return None;
                }
                let held = now_ms.saturating_sub(self.press_start_ms);
                if held >= u64::from(self.long_press_ms) && !self.long_press_handled {
                    self.long_press_handled = true;
                    // The release that ends this gesture must not count
                    // as a click.
                    self.click_handled = true;
                    return Some(ButtonEvent::LongPress);
                }
                None
            }
            Phase::ReleasedPendingDouble => {
                if pressed {
                    self.phase = Phase::DoublePressed;
                    self.press_start_ms = now_ms;
                    return None;
                }
                let gap = now_ms.saturating_sub(self.first_release_ms);
                if gap > u64::from(self.double_click_window_ms) {
                    self.phase = Phase::Idle;
                    if !self.click_handled {
                        self.click_handled = true;
                        return Some(ButtonEvent::Click);
                    }
                }
                None
            }
            Phase::DoublePressed => {
                if !pressed {
                    self.phase = Phase::Idle;
                    return Some(ButtonEvent::DoubleClick);
                }
                None
            }
        }
    }

    /// Long-press hold progress in [0, 1]
    ///
    /// Some only while the button is held between the progress-start
    /// time and the confirmation threshold; the external progress-bar
    /// renderer shows it. Returns None as soon as the gesture leaves the
    /// pressed phase or the long press has been confirmed - the caller
    /// clears its rendering on that transition.
    pub fn long_press_progress(&self, now_ms: u64) -> Option<f32> {
        if self.phase != Phase::Pressed || self.long_press_handled {
            return None;
        }
        let held = now_ms.saturating_sub(self.press_start_ms);
        if held < u64::from(self.progress_start_ms) {
            return None;
        }
        let span = self
            .long_press_ms
            .saturating_sub(self.progress_start_ms)
            .max(1);
        let progress = (held - u64::from(self.progress_start_ms)) as f32 / span as f32;
        Some(if progress > 1.0 { 1.0 } else { progress })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classifier() -> ButtonClassifier {
        ButtonClassifier::new(InputConfig::default())
    }

    /// Poll every 10 ms over [from, to) with a fixed level, collecting
    /// at most one event
    fn poll_span(
        btn: &mut ButtonClassifier,
        pressed: bool,
        from_ms: u64,
        to_ms: u64,
    ) -> Option<ButtonEvent> {
        let mut event = None;
        let mut t = from_ms;
        while t < to_ms {
            if let Some(e) = btn.poll(pressed, t) {
                assert!(event.is_none(), "second event {:?} in one gesture", e);
                event = Some(e);
            }
            t += 10;
        }
        event
    }

    #[test]
    fn test_single_click_after_window() {
        let mut btn = classifier();
        assert_eq!(poll_span(&mut btn, true, 100, 150), None);
        assert_eq!(poll_span(&mut btn, false, 150, 450), None);
        // First poll past the 300 ms window
        assert_eq!(btn.poll(false, 460), Some(ButtonEvent::Click));
        assert_eq!(btn.poll(false, 470), None);
    }

    #[test]
    fn test_double_click_yields_no_click() {
        let mut btn = classifier();
        assert_eq!(poll_span(&mut btn, true, 100, 150), None);
        assert_eq!(poll_span(&mut btn, false, 150, 290), None);
        assert_eq!(poll_span(&mut btn, true, 290, 350), None);
        assert_eq!(btn.poll(false, 350), Some(ButtonEvent::DoubleClick));
        // Well past every window: nothing else may surface
        assert_eq!(poll_span(&mut btn, false, 360, 1500), None);
    }

    #[test]
    fn test_long_press_fires_once_at_threshold() {
        let mut btn = classifier();
        // Held 2500 ms starting at t=100; threshold is 2000 ms
        assert_eq!(poll_span(&mut btn, true, 100, 2100), None);
        assert_eq!(btn.poll(true, 2100), Some(ButtonEvent::LongPress));
        assert_eq!(poll_span(&mut btn, true, 2110, 2600), None);
        // Release produces no trailing click, ever
        assert_eq!(poll_span(&mut btn, false, 2600, 3500), None);
    }

    #[test]
    fn test_progress_ramp_and_clamp() {
        let mut btn = classifier();
        btn.poll(true, 100);
        assert_eq!(btn.long_press_progress(600), None); // held 500 < 1000
        assert_eq!(btn.long_press_progress(1100), Some(0.0));
        let mid = btn.long_press_progress(1600).unwrap();
        assert!((mid - 0.5).abs() < 1e-6);
        let near = btn.long_press_progress(2090).unwrap();
        assert!(near <= 1.0 && near > 0.9);
    }

    #[test]
    fn test_progress_cleared_on_release_before_confirm() {
        let mut btn = classifier();
        btn.poll(true, 100);
        assert!(btn.long_press_progress(1600).is_some());
        btn.poll(false, 1700);
        assert_eq!(btn.long_press_progress(1700), None);
        // Held 1600 ms: past progress start but short of the threshold,
        // so the gesture resolves as a plain click
        assert_eq!(btn.poll(false, 2100), Some(ButtonEvent::Click));
    }

    #[test]
    fn test_progress_gone_after_confirmation() {
        let mut btn = classifier();
        btn.poll(true, 0);
        assert_eq!(btn.poll(true, 2000), Some(ButtonEvent::LongPress));
        assert_eq!(btn.long_press_progress(2010), None);
    }

    #[test]
    fn test_gestures_are_independent() {
        let mut btn = classifier();
        btn.poll(true, 0);
        assert_eq!(btn.poll(true, 2000), Some(ButtonEvent::LongPress));
        btn.poll(false, 2100);
        assert_eq!(poll_span(&mut btn, false, 2110, 2500), None);
        // Fresh gesture classifies on its own merits
        btn.poll(true, 3000);
        btn.poll(false, 3050);
        assert_eq!(btn.poll(false, 3400), Some(ButtonEvent::Click));
    }
}
