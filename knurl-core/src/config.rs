//! Configuration type definitions
//!
//! Timing parameters for the input recognizer. The hardware variants this
//! firmware replaces shipped with different constants (300 vs 500 ms
//! double-click window, 1000 vs 2000 ms long-press threshold), so all of
//! them are configuration fields rather than hard-coded values.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Input timing configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct InputConfig {
    /// Encoder debounce window in milliseconds.
    ///
    /// Samples arriving closer together than this are ignored as contact
    /// bounce. Useful range is 2-5 ms; larger values start to drop real
    /// transitions on fast spins.
    pub debounce_ms: u32,
    /// Maximum gap between the first release and the second press that
    /// still counts as a double-click
    pub double_click_window_ms: u32,
    /// Hold time after which the long-press progress indicator starts
    pub progress_start_ms: u32,
    /// Hold time after which a long-press is confirmed
    pub long_press_ms: u32,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            debounce_ms: 2,
            double_click_window_ms: 300,
            progress_start_ms: 1000,
            long_press_ms: 2000,
        }
    }
}
