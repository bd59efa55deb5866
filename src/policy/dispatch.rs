//! Event application over the queue banks.

use super::bank::QueueBank;
use super::config::PolicyConfig;
use super::event::{Event, EventKind, TaskStatus};

/// Applies one batch of lifecycle events to the queue banks.
///
/// Borrows the engine's banks and clock for the duration of a batch. The
/// clock is overwritten with each event's timestamp, so drivers must supply
/// events in non-decreasing time order.
pub(crate) struct EventDispatcher<'a> {
    config: &'a PolicyConfig,
    cpu: &'a mut QueueBank,
    io: &'a mut QueueBank,
    now: &'a mut u64,
}

impl<'a> EventDispatcher<'a> {
    pub(crate) fn new(
        config: &'a PolicyConfig,
        cpu: &'a mut QueueBank,
        io: &'a mut QueueBank,
        now: &'a mut u64,
    ) -> Self {
        Self {
            config,
            cpu,
            io,
            now,
        }
    }

    /// Apply `events` strictly in the order given.
    pub(crate) fn apply(&mut self, events: &[Event]) {
        for event in events {
            *self.now = event.at;
            self.apply_one(event);
        }
    }

    fn apply_one(&mut self, event: &Event) {
        let mut task = event.task;
        let entry = self.config.entry_level(task.priority);

        match event.kind {
            EventKind::Arrival => {
                self.cpu.insert(entry, task);
            }
            EventKind::IoRequest => {
                self.cpu.remove_by_id(task.id);
                self.io.insert(entry, task);
            }
            EventKind::IoEnd => {
                self.io.remove_by_id(task.id);
                task.status = TaskStatus::JustReturnedFromIo;
                self.cpu.insert(entry, task);
            }
            EventKind::Finish => {
                // CPU bank only; an IO-bank entry stays behind. Drivers must
                // issue Finish only for tasks they know to be CPU-resident.
                self.cpu.remove_by_id(task.id);
            }
            EventKind::Timer => {
                // No queue mutation. The clock update above is the point.
            }
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
