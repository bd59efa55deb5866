//! Boundary data model: task snapshots, lifecycle events, dispatch actions.
//!
//! These are the types exchanged with the driver each cycle. They are
//! intentionally small and `Copy` so batches pass through the engine without
//! allocation overhead.

use serde::{Deserialize, Serialize};

// ============================================================================
// TaskId
// ============================================================================

/// Identifier for a task known to the driver.
///
/// Real tasks carry positive ids. Id 0 is reserved as the idle sentinel at
/// the [`Action`] boundary ([`TaskId::IDLE`]) and never names a real task.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TaskId(pub u32);

impl TaskId {
    /// Idle sentinel: no task occupies the slot.
    pub const IDLE: TaskId = TaskId(0);

    /// Returns `true` if this id is the idle sentinel.
    #[inline]
    pub fn is_idle(&self) -> bool {
        *self == Self::IDLE
    }

    /// Get the raw id value.
    #[inline]
    pub fn raw(&self) -> u32 {
        self.0
    }
}

// ============================================================================
// Priority / TaskStatus
// ============================================================================

/// Static priority class, fixed when the task arrives.
///
/// Priority only determines the bank level a task enters at; from then on the
/// feedback levels and scoring take over.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Priority {
    High,
    Low,
}

/// Dynamic scheduling status.
///
/// `JustReturnedFromIo` is set by the engine when an IO completion is applied
/// and is never reset by any later event: once a task has returned from IO it
/// keeps its scoring discount for the rest of its CPU-bank lifetime. Drivers
/// that want a one-shot boost must resubmit the task themselves.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TaskStatus {
    Normal,
    JustReturnedFromIo,
}

// ============================================================================
// Task
// ============================================================================

/// Snapshot of a task as supplied by the driver with an event.
///
/// The caller sets `status` on arrival; the engine overwrites it on IO
/// completion only. `deadline` is an absolute tick on the simulated clock and
/// may already be in the past when the snapshot is scored.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub priority: Priority,
    /// Absolute deadline on the simulated clock, in ticks.
    pub deadline: u64,
    pub status: TaskStatus,
}

// ============================================================================
// Event
// ============================================================================

/// Lifecycle event kinds consumed by the engine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventKind {
    /// A new task enters the CPU bank at its priority's entry level.
    Arrival,
    /// The task leaves the CPU bank and queues for the IO device.
    IoRequest,
    /// The task's IO completed: it re-enters the CPU bank with
    /// `JustReturnedFromIo` status.
    IoEnd,
    /// The task is done. Clears the CPU bank only; an entry still sitting in
    /// the IO bank is deliberately left behind, so drivers must issue
    /// `Finish` only for tasks they know to be CPU-resident.
    Finish,
    /// No queue mutation; forces a fresh selection pass even when nothing
    /// else happened this tick.
    Timer,
}

/// One timestamped lifecycle event.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub kind: EventKind,
    /// Absolute tick at which the event occurred. Batches must be supplied in
    /// non-decreasing `at` order; the clock is overwritten, not clamped.
    pub at: u64,
    /// Task snapshot relevant to this event.
    pub task: Task,
}

// ============================================================================
// Action
// ============================================================================

/// The engine's decision for one cycle: which task id should occupy the CPU
/// and which should occupy the IO device. [`TaskId::IDLE`] means idle or
/// unchanged.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Action {
    pub cpu: TaskId,
    pub io: TaskId,
}

// ============================================================================
// Compile-time assertions
// ============================================================================

const _: () = {
    // TaskId must stay a bare u32; drivers embed it in packed event records.
    assert!(std::mem::size_of::<TaskId>() == 4);
};

// ============================================================================
// Tests
// ============================================================================
