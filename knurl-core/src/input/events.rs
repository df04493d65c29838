//! Navigation events produced by the input recognizers

use super::button::ButtonEvent;

/// A clean navigation event, ready for menu/screen consumption
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum InputEvent {
    /// Encoder rotated clockwise (1 detent)
    StepCw,
    /// Encoder rotated counter-clockwise (1 detent)
    StepCcw,
    /// Single short press
    Click,
    /// Two presses within the double-click window
    DoubleClick,
    /// Press held past the long-press threshold
    LongPress,
}

impl InputEvent {
    /// Convert a decoder step (-1, 0, +1) into an event
    pub fn from_step(step: i8) -> Option<Self> {
        match step {
            1 => Some(InputEvent::StepCw),
            -1 => Some(InputEvent::StepCcw),
            _ => None,
        }
    }

    /// Returns true if this is a rotation event
    pub fn is_rotation(&self) -> bool {
        matches!(self, InputEvent::StepCw | InputEvent::StepCcw)
    }

    /// Returns true if this is a button event
    pub fn is_button(&self) -> bool {
        !self.is_rotation()
    }
}

impl From<ButtonEvent> for InputEvent {
    fn from(event: ButtonEvent) -> Self {
        match event {
            ButtonEvent::Click => InputEvent::Click,
            ButtonEvent::DoubleClick => InputEvent::DoubleClick,
            ButtonEvent::LongPress => InputEvent::LongPress,
        }
    }
}
