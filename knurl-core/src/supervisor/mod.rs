//! Worker lifecycle supervision
//!
//! Screens start named background workers (LED animations, tone
//! playback, sensor polling) and stop them again when the user navigates
//! away. The supervisor owns the registry of live workers and enforces
//! the shutdown protocol:
//!
//! 1. raise the worker's stop flag (single writer, single reader),
//! 2. wait up to a bounded timeout for the worker to exit on its own,
//! 3. force-terminate if it has not - logged as a non-fatal anomaly,
//! 4. drive the peripherals the worker owned back to their safe state
//!    exactly once, whichever path was taken.
//!
//! Peripherals are single-owner-at-a-time: a worker whose peripheral set
//! overlaps a live worker's is refused at start.

mod registry;

pub use registry::{StopOutcome, WorkerState, MAX_WORKERS};

use heapless::Vec;

use crate::traits::{ScreenId, StopFlag, WorkerRuntime, WorkerSpec};
use registry::WorkerRecord;

/// Interval between liveness checks while waiting for a worker to stop
pub const STOP_POLL_INTERVAL_MS: u32 = 5;

/// Supervisor for named concurrent workers
///
/// Generic over the platform runtime that actually spawns and observes
/// workers; see [`WorkerRuntime`].
pub struct Supervisor<R: WorkerRuntime> {
    runtime: R,
    workers: Vec<WorkerRecord<R>, MAX_WORKERS>,
}

impl<R: WorkerRuntime> Supervisor<R> {
    /// Create a supervisor with an empty registry
    pub fn new(runtime: R) -> Self {
        Self {
            runtime,
            workers: Vec::new(),
        }
    }

    /// Access the platform runtime
    pub fn runtime(&self) -> &R {
        &self.runtime
    }

    /// Mutable access to the platform runtime
    pub fn runtime_mut(&mut self) -> &mut R {
        &mut self.runtime
    }

    /// Start a worker
    ///
    /// Returns false without side effects if a worker with the same name
    /// is already registered, if the worker's peripheral set overlaps a
    /// live worker's, if the registry is full, or if the runtime cannot
    /// spawn it. Callers must check the return value.
    pub fn start(&mut self, spec: WorkerSpec, entry: R::Entry) -> bool {
        if self.workers.iter().any(|w| w.name == spec.name) {
            log::warn!("start refused: worker '{}' already running", spec.name);
            return false;
        }
        if let Some(owner) = self
            .workers
            .iter()
            .find(|w| w.owns.intersects(spec.owns))
        {
            log::warn!(
                "start refused: '{}' needs a peripheral still owned by '{}'",
                spec.name,
                owner.name
            );
            return false;
        }
        if self.workers.is_full() {
            log::warn!("start refused: registry full ({} workers)", MAX_WORKERS);
            return false;
        }
        let Some(stop) = self.runtime.allocate_stop_flag() else {
            log::warn!("start refused: stop flag pool exhausted");
            return false;
        };
        let handle = match self.runtime.spawn(&spec, entry, stop.clone()) {
            Ok(handle) => handle,
            Err(err) => {
                log::warn!("start refused: spawn of '{}' failed: {:?}", spec.name, err);
                // The worker never ran; give its slot back to the pool.
                self.runtime.release_stop_flag(stop);
                return false;
            }
        };
        // Capacity was checked above.
        let _ = self.workers.push(WorkerRecord {
            name: spec.name,
            screen: spec.screen,
            owns: spec.owns,
            state: WorkerState::Running,
            stop,
            handle,
        });
        log::info!("worker '{}' started for screen {}", spec.name, spec.screen.0);
        true
    }

    /// Request a worker to stop, waiting up to `timeout_ms`
    ///
    /// Returns None if no such worker is registered. Otherwise raises the
    /// stop flag, polls liveness every [`STOP_POLL_INTERVAL_MS`], and
    /// force-terminates on timeout. In both outcomes the peripherals the
    /// worker owned are driven to their safe state exactly once before
    /// the registry entry is removed.
    pub fn request_stop(&mut self, name: &str, timeout_ms: u32) -> Option<StopOutcome> {
        let idx = self.workers.iter().position(|w| w.name == name)?;

        self.workers[idx].stop.request();
        self.workers[idx].state = WorkerState::StopRequested;

        let mut waited = 0;
        let outcome = loop {
            if self.runtime.is_finished(&self.workers[idx].handle) {
                break StopOutcome::Graceful;
            }
            if waited >= timeout_ms {
                // Non-fatal anomaly: the worker missed its stop flag.
                log::warn!(
                    "worker '{}' ignored stop for {} ms, terminating",
                    name,
                    timeout_ms
                );
                self.runtime.terminate(&mut self.workers[idx].handle);
                break StopOutcome::ForcedTermination;
            }
            let step = STOP_POLL_INTERVAL_MS.min(timeout_ms - waited);
            self.runtime.delay_ms(step);
            waited += step;
        };

        self.workers[idx].state = WorkerState::Stopped;
        let record = self.workers.swap_remove(idx);
        // Idempotent: the worker may already have cleaned up on its own.
        self.runtime.make_safe(record.owns);
        log::info!("worker '{}' stopped: {:?}", name, outcome);
        Some(outcome)
    }

    /// Stop every worker registered under `screen`
    ///
    /// Workers named in `ordered_names` are stopped first, in caller
    /// order (so an audio worker can go down before the LED worker it
    /// shares timing with); any remaining workers of the screen are then
    /// swept. Always completes within the bounded per-worker timeouts,
    /// so the navigator can proceed regardless of forced terminations.
    pub fn stop_all_for_screen(
        &mut self,
        screen: ScreenId,
        ordered_names: &[&'static str],
        timeout_ms: u32,
    ) {
        for name in ordered_names {
            if self
                .workers
                .iter()
                .any(|w| w.name == *name && w.screen == screen)
            {
                let _ = self.request_stop(name, timeout_ms);
            }
        }
        while let Some(name) = self
            .workers
            .iter()
            .find(|w| w.screen == screen)
            .map(|w| w.name)
        {
            let _ = self.request_stop(name, timeout_ms);
        }
    }

    /// Lifecycle state of a registered worker, if any
    pub fn worker_state(&self, name: &str) -> Option<WorkerState> {
        self.workers.iter().find(|w| w.name == name).map(|w| w.state)
    }

    /// Returns true if a worker with this name is registered
    pub fn is_registered(&self, name: &str) -> bool {
        self.workers.iter().any(|w| w.name == name)
    }

    /// Number of registered workers
    pub fn worker_count(&self) -> usize {
        self.workers.len()
    }

    /// Number of workers registered under `screen`
    pub fn screen_worker_count(&self, screen: ScreenId) -> usize {
        self.workers.iter().filter(|w| w.screen == screen).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::{PeripheralSet, SpawnError};
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;
    use std::vec::Vec as StdVec;

    /// Shared single-writer/single-reader flag for the fake runtime
    #[derive(Clone)]
    struct FakeFlag(Rc<Cell<bool>>);

    impl crate::traits::StopFlag for FakeFlag {
        fn request(&self) {
            self.0.set(true);
        }

        fn is_requested(&self) -> bool {
            self.0.get()
        }
    }

    /// Scripted worker body: exits this long after its stop flag rises,
    /// or never (None) to simulate a worker that ignores the protocol
    struct FakeEntry {
        exits_after_stop_ms: Option<u32>,
    }

    struct FakeHandle {
        name: &'static str,
        stop: FakeFlag,
        exits_after_stop_ms: Option<u32>,
        stop_seen_at_ms: Cell<Option<u64>>,
        terminated: Cell<bool>,
    }

    /// Deterministic runtime with a virtual clock
    struct FakeRuntime {
        now_ms: u64,
        flag_limit: usize,
        flags_allocated: usize,
        fail_spawns: usize,
        safe_calls: Rc<RefCell<StdVec<PeripheralSet>>>,
        terminations: Rc<RefCell<StdVec<&'static str>>>,
    }

    impl FakeRuntime {
        fn new() -> Self {
            Self {
                now_ms: 0,
                flag_limit: usize::MAX,
                flags_allocated: 0,
                fail_spawns: 0,
                safe_calls: Rc::new(RefCell::new(StdVec::new())),
                terminations: Rc::new(RefCell::new(StdVec::new())),
            }
        }
    }

    impl WorkerRuntime for FakeRuntime {
        type StopFlag = FakeFlag;
        type Handle = FakeHandle;
        type Entry = FakeEntry;

        fn allocate_stop_flag(&mut self) -> Option<FakeFlag> {
            if self.flags_allocated >= self.flag_limit {
                return None;
            }
            self.flags_allocated += 1;
            Some(FakeFlag(Rc::new(Cell::new(false))))
        }

        fn release_stop_flag(&mut self, _stop: FakeFlag) {
            self.flags_allocated -= 1;
        }

        fn spawn(
            &mut self,
            spec: &WorkerSpec,
            entry: FakeEntry,
            stop: FakeFlag,
        ) -> Result<FakeHandle, SpawnError> {
            if self.fail_spawns > 0 {
                self.fail_spawns -= 1;
                return Err(SpawnError::NoSlot);
            }
            Ok(FakeHandle {
                name: spec.name,
                stop,
                exits_after_stop_ms: entry.exits_after_stop_ms,
                stop_seen_at_ms: Cell::new(None),
                terminated: Cell::new(false),
            })
        }

        fn is_finished(&mut self, handle: &FakeHandle) -> bool {
            if handle.terminated.get() {
                return true;
            }
            if !handle.stop.is_requested() {
                return false;
            }
            let seen = match handle.stop_seen_at_ms.get() {
                Some(t) => t,
                None => {
                    handle.stop_seen_at_ms.set(Some(self.now_ms));
                    self.now_ms
                }
            };
            match handle.exits_after_stop_ms {
                Some(lag) => self.now_ms - seen >= u64::from(lag),
                None => false,
            }
        }

        fn terminate(&mut self, handle: &mut FakeHandle) {
            handle.terminated.set(true);
            self.terminations.borrow_mut().push(handle.name);
        }

        fn make_safe(&mut self, owned: PeripheralSet) {
            self.safe_calls.borrow_mut().push(owned);
        }

        fn delay_ms(&mut self, ms: u32) {
            self.now_ms += u64::from(ms);
        }
    }

    fn prompt_entry() -> FakeEntry {
        FakeEntry {
            exits_after_stop_ms: Some(0),
        }
    }

    fn led_spec() -> WorkerSpec {
        WorkerSpec::new("led", ScreenId(1)).owns(PeripheralSet::LED_STRIP)
    }

    #[test]
    fn test_duplicate_start_refused() {
        let mut sup = Supervisor::new(FakeRuntime::new());
        assert!(sup.start(led_spec(), prompt_entry()));
        assert!(!sup.start(led_spec(), prompt_entry()));
        assert_eq!(sup.worker_count(), 1);
        assert_eq!(sup.worker_state("led"), Some(WorkerState::Running));
    }

    #[test]
    fn test_graceful_stop_makes_peripherals_safe() {
        let mut sup = Supervisor::new(FakeRuntime::new());
        assert!(sup.start(led_spec(), prompt_entry()));
        let outcome = sup.request_stop("led", 500);
        assert_eq!(outcome, Some(StopOutcome::Graceful));
        assert!(!sup.is_registered("led"));
        let safe = sup.runtime().safe_calls.borrow().clone();
        assert_eq!(safe, [PeripheralSet::LED_STRIP]);
        assert!(sup.runtime().terminations.borrow().is_empty());
    }

    #[test]
    fn test_slow_worker_still_stops_gracefully() {
        let mut sup = Supervisor::new(FakeRuntime::new());
        let entry = FakeEntry {
            exits_after_stop_ms: Some(40),
        };
        assert!(sup.start(led_spec(), entry));
        assert_eq!(sup.request_stop("led", 500), Some(StopOutcome::Graceful));
        // Waited roughly the worker's wind-down time, not the timeout
        assert!(sup.runtime().now_ms >= 40 && sup.runtime().now_ms < 100);
    }

    #[test]
    fn test_stubborn_worker_is_terminated() {
        let mut sup = Supervisor::new(FakeRuntime::new());
        let entry = FakeEntry {
            exits_after_stop_ms: None,
        };
        assert!(sup.start(led_spec(), entry));
        let outcome = sup.request_stop("led", 100);
        assert_eq!(outcome, Some(StopOutcome::ForcedTermination));
        assert!(!sup.is_registered("led"));
        // Cleanup runs on the forced path too
        let safe = sup.runtime().safe_calls.borrow().clone();
        assert_eq!(safe, [PeripheralSet::LED_STRIP]);
        assert_eq!(sup.runtime().terminations.borrow().clone(), ["led"]);
        assert_eq!(sup.runtime().now_ms, 100);
    }

    #[test]
    fn test_zero_timeout_terminates_immediately() {
        let mut sup = Supervisor::new(FakeRuntime::new());
        let entry = FakeEntry {
            exits_after_stop_ms: None,
        };
        assert!(sup.start(led_spec(), entry));
        assert_eq!(
            sup.request_stop("led", 0),
            Some(StopOutcome::ForcedTermination)
        );
        assert_eq!(sup.runtime().now_ms, 0);
    }

    #[test]
    fn test_unknown_worker_is_none() {
        let mut sup = Supervisor::new(FakeRuntime::new());
        assert_eq!(sup.request_stop("ghost", 100), None);
    }

    #[test]
    fn test_peripheral_conflict_refused() {
        let mut sup = Supervisor::new(FakeRuntime::new());
        assert!(sup.start(led_spec(), prompt_entry()));
        let rival = WorkerSpec::new("led2", ScreenId(1)).owns(PeripheralSet::LED_STRIP);
        assert!(!sup.start(rival, prompt_entry()));
        // A disjoint set is fine
        let tone = WorkerSpec::new("tone", ScreenId(1)).owns(PeripheralSet::TONE);
        assert!(sup.start(tone, prompt_entry()));
    }

    #[test]
    fn test_stop_flag_pool_exhaustion_refused() {
        let mut runtime = FakeRuntime::new();
        runtime.flag_limit = 1;
        let mut sup = Supervisor::new(runtime);
        assert!(sup.start(led_spec(), prompt_entry()));
        let tone = WorkerSpec::new("tone", ScreenId(1)).owns(PeripheralSet::TONE);
        assert!(!sup.start(tone, prompt_entry()));
        assert_eq!(sup.worker_count(), 1);
    }

    #[test]
    fn test_spawn_failure_returns_flag_to_pool() {
        let mut runtime = FakeRuntime::new();
        runtime.flag_limit = 1;
        runtime.fail_spawns = 1;
        let mut sup = Supervisor::new(runtime);
        // The spawn fails; the only flag in the pool must come back
        assert!(!sup.start(led_spec(), prompt_entry()));
        assert_eq!(sup.worker_count(), 0);
        assert!(sup.start(led_spec(), prompt_entry()));
        assert_eq!(sup.worker_count(), 1);
    }

    #[test]
    fn test_stop_all_for_screen_ordered_then_swept() {
        let mut sup = Supervisor::new(FakeRuntime::new());
        let audio = WorkerSpec::new("audio", ScreenId(1)).owns(PeripheralSet::TONE);
        let led = WorkerSpec::new("led", ScreenId(1)).owns(PeripheralSet::LED_STRIP);
        let sensor = WorkerSpec::new("sensor", ScreenId(1)).owns(PeripheralSet::SENSOR_BUS);
        let other = WorkerSpec::new("clock", ScreenId(2)).owns(PeripheralSet::DISPLAY);
        assert!(sup.start(audio, prompt_entry()));
        assert!(sup.start(led, prompt_entry()));
        assert!(sup.start(sensor, prompt_entry()));
        assert!(sup.start(other, prompt_entry()));

        // Audio must go down before the LED worker sharing timing with
        // it; the sensor worker is swept afterwards.
        sup.stop_all_for_screen(ScreenId(1), &["audio", "led"], 200);

        assert_eq!(sup.screen_worker_count(ScreenId(1)), 0);
        assert!(sup.is_registered("clock"));
        let safe = sup.runtime().safe_calls.borrow().clone();
        assert_eq!(
            safe,
            [
                PeripheralSet::TONE,
                PeripheralSet::LED_STRIP,
                PeripheralSet::SENSOR_BUS
            ]
        );
    }

    #[test]
    fn test_stop_all_ignores_names_from_other_screens() {
        let mut sup = Supervisor::new(FakeRuntime::new());
        let clock = WorkerSpec::new("clock", ScreenId(2)).owns(PeripheralSet::DISPLAY);
        assert!(sup.start(clock, prompt_entry()));
        sup.stop_all_for_screen(ScreenId(1), &["clock"], 200);
        assert!(sup.is_registered("clock"));
    }

    #[test]
    fn test_restart_after_stop_allowed() {
        let mut sup = Supervisor::new(FakeRuntime::new());
        assert!(sup.start(led_spec(), prompt_entry()));
        assert_eq!(sup.request_stop("led", 100), Some(StopOutcome::Graceful));
        assert!(sup.start(led_spec(), prompt_entry()));
        assert_eq!(sup.worker_count(), 1);
    }
}
