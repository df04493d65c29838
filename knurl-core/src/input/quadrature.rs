//! Quadrature decoder for the rotary encoder
//!
//! Converts the two debounced encoder lines into signed detent steps
//! using a 16-entry transition table. Invalid transitions (both pins
//! changed in one sample) are contact noise and contribute nothing;
//! every valid transition contributes a signed quarter step, so a full
//! Gray cycle accumulates exactly one detent and partial travel that
//! backs out never does.

use crate::config::InputConfig;

/// Sub-steps that make up one full detent (one quarter per valid
/// transition of the Gray cycle)
const DETENT_SUBSTEPS: i8 = 4;

/// Transition table indexed by `(old_pins << 2) | new_pins` where a pin
/// pair is encoded as `(a << 1) | b`.
///
/// Clockwise rest-to-rest sequence is `11 -> 01 -> 00 -> 10 -> 11`; each
/// of its four transitions carries +1, their mirror images carry -1, and
/// all no-change or invalid double-change indices carry zero. The table
/// is symmetric, so stepping back inside a detent produces the opposite
/// sign and the reversal reset in [`decode`](QuadratureDecoder::decode)
/// keeps rocking from ever reaching the threshold.
const TRANSITION_TABLE: [i8; 16] = [
    0, -1, 1, 0, // from 00
    1, 0, 0, -1, // from 01
    -1, 0, 0, 1, // from 10
    0, 1, -1, 0, // from 11
];

/// Quadrature decoder state
///
/// Mutated only by [`decode`](Self::decode); owns no pins. The caller
/// samples the GPIO lines and must do so at 100 Hz or faster - slower
/// polling silently drops detents.
pub struct QuadratureDecoder {
    debounce_ms: u32,
    /// Last latched 2-bit pin sample, `(a << 1) | b`
    last_pins: u8,
    /// Accumulated sub-steps toward the next detent
    substeps: i8,
    /// Timestamp of the last accepted sample
    last_sample_ms: Option<u64>,
}

impl QuadratureDecoder {
    /// Create a decoder; assumes the encoder rests with both lines high
    /// (pull-ups enabled) until [`sync`](Self::sync) is called
    pub fn new(config: InputConfig) -> Self {
        Self {
            debounce_ms: config.debounce_ms,
            last_pins: 0b11,
            substeps: 0,
            last_sample_ms: None,
        }
    }

    /// Latch the current pin levels without decoding
    pub fn sync(&mut self, a_high: bool, b_high: bool) {
        self.last_pins = Self::encode(a_high, b_high);
        self.substeps = 0;
    }

    /// Decode one sample of the encoder lines
    ///
    /// Returns -1, 0 or +1 detents; never more than one step per call,
    /// so the caller must keep up with the physical detent rate. Samples
    /// inside the debounce window of the previous one are discarded
    /// without being latched.
    pub fn decode(&mut self, a_high: bool, b_high: bool, now_ms: u64) -> i8 {
        if let Some(last) = self.last_sample_ms {
            if now_ms.saturating_sub(last) < u64::from(self.debounce_ms) {
                return 0;
            }
        }
        self.last_sample_ms = Some(now_ms);

        let pins = Self::encode(a_high, b_high);
        if pins == self.last_pins {
            return 0;
        }
        let delta = TRANSITION_TABLE[usize::from((self.last_pins << 2) | pins)];
        self.last_pins = pins;

        if delta == 0 {
            return 0;
        }
        // Direction reversal mid-detent: discard the partial progress
        // instead of letting the accumulator cross zero, so reversing
        // never emits a spurious step.
        if self.substeps != 0 && (self.substeps < 0) != (delta < 0) {
            self.substeps = delta;
            return 0;
        }
        self.substeps += delta;
        if self.substeps >= DETENT_SUBSTEPS {
            self.substeps = 0;
            return 1;
        }
        if self.substeps <= -DETENT_SUBSTEPS {
            self.substeps = 0;
            return -1;
        }
        0
    }

    fn encode(a_high: bool, b_high: bool) -> u8 {
        (u8::from(a_high) << 1) | u8::from(b_high)
    }
}
