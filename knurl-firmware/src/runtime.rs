//! Embassy-backed worker runtime
//!
//! Implements [`WorkerRuntime`] on top of the core-1 executor. Workers
//! run on core 1 so the supervisor's blocking wait on core 0 cannot
//! starve them of the cycles they need to observe their stop flags.
//!
//! Platform note: the cooperative executor cannot preempt a task, so
//! forced termination degrades to abandoning the worker. Its slot and
//! task-pool entry stay occupied, which makes a later start of the same
//! worker fail loudly instead of racing the zombie for its peripherals.
//! Peripheral safety is unaffected either way because the supervisor
//! commands the safe state itself after every stop.

use defmt::*;
use embassy_executor::SendSpawner;
use embassy_time::Duration;
use portable_atomic::{AtomicBool, Ordering};

use knurl_core::traits::{
    Affinity, PeripheralSet, SpawnError, StopFlag, WorkerRuntime, WorkerSpec,
};

use crate::channels::{LedCommand, ToneCommand, LED_CMD, TONE_CMD};
use crate::tasks::workers;

/// Stop/done flag slots available to workers
pub const WORKER_SLOTS: usize = 8;

/// One stop/done flag pair
///
/// `stop` has exactly one writer (the supervisor) and one reader (the
/// worker); `done` the reverse. `busy` is only touched on the
/// supervisor side.
pub struct WorkerSlot {
    stop: AtomicBool,
    done: AtomicBool,
    busy: AtomicBool,
}

impl WorkerSlot {
    const fn new() -> Self {
        Self {
            stop: AtomicBool::new(false),
            done: AtomicBool::new(false),
            busy: AtomicBool::new(false),
        }
    }
}

const SLOT_INIT: WorkerSlot = WorkerSlot::new();
static SLOTS: [WorkerSlot; WORKER_SLOTS] = [SLOT_INIT; WORKER_SLOTS];

/// Stop flag handed to a worker; also serves as the worker handle
#[derive(Clone, Copy)]
pub struct SlotFlag(&'static WorkerSlot);

impl SlotFlag {
    /// Worker-side: mark the slot finished just before returning
    pub(crate) fn mark_done(&self) {
        self.0.done.store(true, Ordering::Release);
    }
}

impl StopFlag for SlotFlag {
    fn request(&self) {
        self.0.stop.store(true, Ordering::Release);
    }

    fn is_requested(&self) -> bool {
        self.0.stop.load(Ordering::Acquire)
    }
}

/// Worker bodies this firmware can spawn
#[derive(Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum WorkerEntry {
    /// Rainbow animation on the LED strip
    LedRainbow,
    /// Two-tone beacon on the buzzer
    ToneBeacon,
}

/// Worker runtime running on the core-1 executor
pub struct EmbassyRuntime {
    core1: SendSpawner,
}

impl EmbassyRuntime {
    /// Create a runtime spawning onto the given core-1 spawner
    pub fn new(core1: SendSpawner) -> Self {
        Self { core1 }
    }
}

impl WorkerRuntime for EmbassyRuntime {
    type StopFlag = SlotFlag;
    type Handle = SlotFlag;
    type Entry = WorkerEntry;

    fn allocate_stop_flag(&mut self) -> Option<SlotFlag> {
        for slot in SLOTS.iter() {
            let reusable = !slot.busy.load(Ordering::Acquire) || slot.done.load(Ordering::Acquire);
            if reusable {
                slot.busy.store(true, Ordering::Release);
                slot.stop.store(false, Ordering::Release);
                slot.done.store(false, Ordering::Release);
                return Some(SlotFlag(slot));
            }
        }
        None
    }

    fn release_stop_flag(&mut self, stop: SlotFlag) {
        // No worker ever ran in this slot; marking it done makes it
        // reclaimable by the next allocation.
        stop.mark_done();
    }

    fn spawn(
        &mut self,
        spec: &WorkerSpec,
        entry: WorkerEntry,
        stop: SlotFlag,
    ) -> Result<SlotFlag, SpawnError> {
        // All workers live on core 1 on this board; the supervisor's
        // blocking stop wait runs on core 0.
        if let Affinity::Pinned(core) = spec.affinity {
            if core != 1 {
                warn!("worker '{}' pinned to unsupported core {}", spec.name, core);
                return Err(SpawnError::Unsupported);
            }
        }
        let token = match entry {
            WorkerEntry::LedRainbow => self.core1.spawn(workers::led_rainbow(stop)),
            WorkerEntry::ToneBeacon => self.core1.spawn(workers::tone_beacon(stop)),
        };
        match token {
            Ok(()) => Ok(stop),
            Err(_) => Err(SpawnError::NoSlot),
        }
    }

    fn is_finished(&mut self, handle: &SlotFlag) -> bool {
        handle.0.done.load(Ordering::Acquire)
    }

    fn terminate(&mut self, handle: &mut SlotFlag) {
        // No preemptive deletion on this executor; abandon the task and
        // leave its slot busy so the name cannot be reused while the
        // zombie might still run.
        warn!("cannot preempt worker task, abandoning it");
        let _ = handle;
    }

    fn make_safe(&mut self, owned: PeripheralSet) {
        if owned.intersects(PeripheralSet::LED_STRIP) {
            LED_CMD.signal(LedCommand::Off);
        }
        if owned.intersects(PeripheralSet::TONE) {
            TONE_CMD.signal(ToneCommand::Silence);
        }
    }

    fn delay_ms(&mut self, ms: u32) {
        embassy_time::block_for(Duration::from_millis(u64::from(ms)));
    }
}
