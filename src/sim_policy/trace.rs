//! Bounded decision trace for replay and failure forensics.
//!
//! Trace events are retained in a fixed-capacity ring; when full, the oldest
//! events are evicted first. Two runs of the same scenario must produce
//! identical traces.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::policy::TaskId;

/// Minimal event set for determinism checks and failure forensics.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TraceEvent {
    /// One engine cycle: batch size in, occupants out.
    Decision {
        tick: u64,
        events: u32,
        cpu: TaskId,
        io: TaskId,
    },
    TaskArrived { tick: u64, id: TaskId },
    IoRequested { tick: u64, id: TaskId },
    IoCompleted { tick: u64, id: TaskId },
    TaskFinished { tick: u64, id: TaskId },
    InvariantFail { code: u32 },
}

/// Fixed-capacity ring buffer of trace events.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TraceRing {
    cap: usize,
    buf: VecDeque<TraceEvent>,
}

impl TraceRing {
    /// Create a trace ring with at least one slot.
    pub fn new(cap: usize) -> Self {
        let cap = cap.max(1);
        Self {
            cap,
            buf: VecDeque::with_capacity(cap),
        }
    }

    /// Maximum number of events retained.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.cap
    }

    /// Append an event, evicting the oldest when full.
    pub fn push(&mut self, event: TraceEvent) {
        if self.buf.len() == self.cap {
            self.buf.pop_front();
        }
        self.buf.push_back(event);

        debug_assert!(self.buf.len() <= self.cap);
    }

    /// Number of retained events.
    #[inline]
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Retained events, oldest first.
    pub fn events(&self) -> impl Iterator<Item = &TraceEvent> {
        self.buf.iter()
    }

    /// Drain into a plain vector, oldest first.
    pub fn into_vec(self) -> Vec<TraceEvent> {
        self.buf.into_iter().collect()
    }
}

// ============================================================================
// Tests
// ============================================================================
