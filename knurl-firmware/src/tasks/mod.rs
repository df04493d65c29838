//! Embassy async tasks
//!
//! Each task runs independently and communicates via channels/signals.

pub mod input;
pub mod led;
pub mod tone;
pub mod workers;

pub use input::input_task;
pub use led::led_task;
pub use tone::tone_task;
