//! Worker runtime trait and the vocabulary types shared with it

use core::ops::{BitOr, BitOrAssign};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Scheduling priority of a worker, higher is more urgent
///
/// Advisory on cooperative executors; preemptive runtimes map it to
/// their native priority levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Priority(pub u8);

impl Priority {
    /// Background animation and playback loops
    pub const NORMAL: Priority = Priority(1);
    /// One-shot initialization work
    pub const HIGH: Priority = Priority(2);
}

/// Execution-core placement of a worker
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Affinity {
    /// Scheduler may place the worker anywhere
    Any,
    /// Worker must run on the given core
    Pinned(u8),
}

/// Identifier of the menu screen a worker belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ScreenId(pub u8);

/// Set of peripherals a worker owns while running
///
/// Peripherals are single-owner-at-a-time: the supervisor refuses to
/// start a worker whose set overlaps a live worker's, and drives the set
/// back to its safe state when the worker stops.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PeripheralSet(u8);

impl PeripheralSet {
    /// No peripherals
    pub const EMPTY: PeripheralSet = PeripheralSet(0);
    /// The addressable LED strip
    pub const LED_STRIP: PeripheralSet = PeripheralSet(1 << 0);
    /// The single tone/buzzer channel
    pub const TONE: PeripheralSet = PeripheralSet(1 << 1);
    /// The display surface
    pub const DISPLAY: PeripheralSet = PeripheralSet(1 << 2);
    /// The shared sensor bus
    pub const SENSOR_BUS: PeripheralSet = PeripheralSet(1 << 3);

    /// Returns true if no peripheral is in the set
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Returns true if the two sets share any peripheral
    pub const fn intersects(self, other: PeripheralSet) -> bool {
        self.0 & other.0 != 0
    }

    /// Returns true if every peripheral of `other` is in the set
    pub const fn contains(self, other: PeripheralSet) -> bool {
        self.0 & other.0 == other.0
    }
}

impl BitOr for PeripheralSet {
    type Output = PeripheralSet;

    fn bitor(self, rhs: PeripheralSet) -> PeripheralSet {
        PeripheralSet(self.0 | rhs.0)
    }
}

impl BitOrAssign for PeripheralSet {
    fn bitor_assign(&mut self, rhs: PeripheralSet) {
        self.0 |= rhs.0;
    }
}

/// Static description of a worker to be started
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct WorkerSpec {
    /// Unique name while the worker is running
    pub name: &'static str,
    /// Scheduling priority
    pub priority: Priority,
    /// Core placement
    pub affinity: Affinity,
    /// Screen the worker belongs to
    pub screen: ScreenId,
    /// Peripherals the worker owns
    pub owns: PeripheralSet,
}

impl WorkerSpec {
    /// Create a spec with normal priority, no pinning and no peripherals
    pub const fn new(name: &'static str, screen: ScreenId) -> Self {
        Self {
            name,
            priority: Priority::NORMAL,
            affinity: Affinity::Any,
            screen,
            owns: PeripheralSet::EMPTY,
        }
    }

    /// Set the scheduling priority
    pub const fn priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    /// Pin the worker to a core
    pub const fn pinned(mut self, core: u8) -> Self {
        self.affinity = Affinity::Pinned(core);
        self
    }

    /// Declare the peripherals the worker owns
    pub const fn owns(mut self, owns: PeripheralSet) -> Self {
        self.owns = owns;
        self
    }
}

/// Errors the runtime can report when spawning a worker
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SpawnError {
    /// The runtime's task slots are exhausted
    NoSlot,
    /// The runtime has no entry matching the request (e.g. unknown
    /// pinned core)
    Unsupported,
}

/// Cooperative stop request flag
///
/// Exactly one writer (the supervisor) and one reader (the worker), so
/// no mutex is involved. Workers must check the flag at bounded
/// intervals - tens of milliseconds - to remain stoppable.
pub trait StopFlag: Clone {
    /// Raise the flag; the worker should wind down promptly
    fn request(&self);

    /// Read the flag from the worker side
    fn is_requested(&self) -> bool;
}

/// Platform runtime the supervisor drives workers through
///
/// Implementations decide what a worker body looks like (`Entry`), how
/// liveness is observed and what forced termination means. On runtimes
/// without preemptive task deletion, `terminate` may only abandon the
/// worker; peripheral safety is still guaranteed because the supervisor
/// calls [`make_safe`](Self::make_safe) afterwards in every case.
pub trait WorkerRuntime {
    /// Stop flag handed to the worker at spawn time
    type StopFlag: StopFlag;
    /// Handle for observing and terminating a spawned worker
    type Handle;
    /// Platform-specific worker body
    type Entry;

    /// Allocate a fresh stop flag, or None if the pool is exhausted
    fn allocate_stop_flag(&mut self) -> Option<Self::StopFlag>;

    /// Return an allocated flag whose worker never spawned
    ///
    /// Called on the spawn-failure path so pooled implementations can
    /// reclaim the slot.
    fn release_stop_flag(&mut self, stop: Self::StopFlag);

    /// Spawn a worker running `entry` with `stop` as its stop flag
    fn spawn(
        &mut self,
        spec: &WorkerSpec,
        entry: Self::Entry,
        stop: Self::StopFlag,
    ) -> Result<Self::Handle, SpawnError>;

    /// Returns true once the worker has exited
    fn is_finished(&mut self, handle: &Self::Handle) -> bool;

    /// Preemptively tear the worker down
    ///
    /// Reserved for workers that failed to observe their stop flag
    /// within the supervisor's timeout.
    fn terminate(&mut self, handle: &mut Self::Handle);

    /// Drive the given peripherals to their off/safe state
    ///
    /// Must be idempotent: the worker may already have cleaned up on its
    /// own before exiting.
    fn make_safe(&mut self, owned: PeripheralSet);

    /// Block the caller for `ms` milliseconds of wall-clock time
    fn delay_ms(&mut self, ms: u32);
}
