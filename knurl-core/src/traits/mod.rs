//! Platform abstraction traits
//!
//! The supervisor is board-agnostic; everything that actually spawns,
//! observes or tears down a concurrent worker lives behind these traits
//! and is implemented per platform (Embassy executor on target, plain
//! threads in host tests).

pub mod worker;

pub use worker::{
    Affinity, PeripheralSet, Priority, ScreenId, SpawnError, StopFlag, WorkerRuntime, WorkerSpec,
};
