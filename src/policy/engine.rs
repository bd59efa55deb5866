//! Policy engine orchestration.

use super::bank::QueueBank;
use super::config::PolicyConfig;
use super::dispatch::EventDispatcher;
use super::event::{Action, Event, Task, TaskId};
use super::select::select_and_migrate;

/// Deadline-aware multi-level feedback queue dispatch engine.
///
/// One instance owns the two queue banks and the simulated clock; one
/// [`decide`](Self::decide) call is one scheduling cycle. The engine is
/// single-writer and fully synchronous, with no internal locking and no
/// suspension points, so embedders in concurrent hosts must serialize calls
/// externally (one call at a time per instance).
///
/// # Fail-soft contract
///
/// `decide` never errors. Logically inconsistent input (a duplicate arrival,
/// a removal targeting an id absent from the expected bank) is absorbed
/// silently, because every removal is safe on a missing id. Hosts that need
/// diagnostics must validate event streams before submission.
#[derive(Clone, Debug)]
pub struct PolicyEngine {
    config: PolicyConfig,
    cpu_bank: QueueBank,
    io_bank: QueueBank,
    now: u64,
}

impl Default for PolicyEngine {
    fn default() -> Self {
        Self::new(PolicyConfig::default())
    }
}

impl PolicyEngine {
    /// Create an engine with empty banks at tick 0.
    ///
    /// # Panics
    ///
    /// Panics if `config` is invalid (see [`PolicyConfig`]).
    pub fn new(config: PolicyConfig) -> Self {
        config.validate();
        let levels = config.levels;
        Self {
            config,
            cpu_bank: QueueBank::new(levels),
            io_bank: QueueBank::new(levels),
            now: 0,
        }
    }

    /// Run one scheduling cycle.
    ///
    /// Applies `events` in order, advancing the clock to the last event's
    /// timestamp, then picks the next CPU occupant from the lowest-numbered
    /// non-empty CPU level, then (only when `current_io` is idle) the next
    /// IO occupant the same way. Each selection migrates the winner one level
    /// down its bank (wrapping); the winner stays queued until a later event
    /// removes it.
    ///
    /// A resource with no eligible work keeps the occupant passed in; the IO
    /// device is never preempted while busy. Absence of work is a normal,
    /// non-error outcome.
    pub fn decide(&mut self, events: &[Event], current_cpu: TaskId, current_io: TaskId) -> Action {
        let mut action = Action {
            cpu: current_cpu,
            io: current_io,
        };

        EventDispatcher::new(
            &self.config,
            &mut self.cpu_bank,
            &mut self.io_bank,
            &mut self.now,
        )
        .apply(events);

        if let Some(task) = Self::scan(&self.config, &mut self.cpu_bank, self.now) {
            action.cpu = task.id;
        }

        if current_io.is_idle() {
            if let Some(task) = Self::scan(&self.config, &mut self.io_bank, self.now) {
                action.io = task.id;
            }
        }

        action
    }

    /// Scan levels from highest priority down; the first level that yields a
    /// selection wins and the scan stops.
    fn scan(config: &PolicyConfig, bank: &mut QueueBank, now: u64) -> Option<Task> {
        for level in 0..config.levels {
            let to_level = config.next_level(level);
            if let Some(task) = select_and_migrate(bank, level, to_level, now, config) {
                return Some(task);
            }
        }
        None
    }

    /// Current simulated time: the timestamp of the most recently applied
    /// event.
    #[inline]
    pub fn now_ticks(&self) -> u64 {
        self.now
    }

    /// The CPU-waiting bank (read-only).
    #[inline]
    pub fn cpu_bank(&self) -> &QueueBank {
        &self.cpu_bank
    }

    /// The IO-waiting bank (read-only).
    #[inline]
    pub fn io_bank(&self) -> &QueueBank {
        &self.io_bank
    }

    /// The active configuration.
    #[inline]
    pub fn config(&self) -> &PolicyConfig {
        &self.config
    }
}

// ============================================================================
// Tests
// ============================================================================
