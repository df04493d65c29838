//! Worker registry records

use crate::traits::{PeripheralSet, ScreenId, WorkerRuntime};

/// Maximum concurrently registered workers
pub const MAX_WORKERS: usize = 8;

/// Lifecycle state of a registered worker
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum WorkerState {
    /// Spawned and not yet asked to stop
    Running,
    /// Stop flag raised, supervisor waiting for exit
    StopRequested,
    /// Exited (gracefully or by force); about to leave the registry
    Stopped,
}

/// How a stop request concluded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StopOutcome {
    /// Worker observed its stop flag and exited within the timeout
    Graceful,
    /// Worker missed the timeout and was torn down preemptively
    ForcedTermination,
}

/// One registered worker
pub(crate) struct WorkerRecord<R: WorkerRuntime> {
    pub(crate) name: &'static str,
    pub(crate) screen: ScreenId,
    pub(crate) owns: PeripheralSet,
    pub(crate) state: WorkerState,
    pub(crate) stop: R::StopFlag,
    pub(crate) handle: R::Handle,
}
