//! Priority-ordered task queues for one resource.

use serde::{Deserialize, Serialize};

use super::event::{Task, TaskId};

/// One bank of N ordered task levels, index 0 = highest priority.
///
/// Two independent banks exist per engine: CPU-waiting and IO-waiting. Every
/// cross-bank move is a remove-by-id from the source bank followed by an
/// insert into the destination, which keeps each id in at most one level of
/// one bank for well-formed event streams. There is no capacity limit.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct QueueBank {
    levels: Vec<Vec<Task>>,
}

impl QueueBank {
    /// Create a bank with `levels` empty levels.
    ///
    /// # Panics
    ///
    /// Panics if `levels` is 0.
    pub fn new(levels: usize) -> Self {
        assert!(levels > 0, "bank must have at least one level");
        Self {
            levels: vec![Vec::new(); levels],
        }
    }

    /// Append `task` to the tail of `level`.
    ///
    /// Insertion order within a level is preserved; selection ties resolve to
    /// the earliest-stored task.
    pub fn insert(&mut self, level: usize, task: Task) {
        debug_assert!(
            level < self.levels.len(),
            "level {} out of range ({} levels)",
            level,
            self.levels.len()
        );
        self.levels[level].push(task);
    }

    /// Remove every entry with `id` from every level.
    ///
    /// Removing an absent id is a valid no-op, not an error. Returns the
    /// number of entries removed (more than one only after duplicate
    /// arrivals).
    pub fn remove_by_id(&mut self, id: TaskId) -> usize {
        let mut removed = 0;
        for level in &mut self.levels {
            let before = level.len();
            level.retain(|t| t.id != id);
            removed += before - level.len();
        }
        removed
    }

    /// Remove every entry with `id` from a single level.
    pub(crate) fn remove_in_level(&mut self, level: usize, id: TaskId) {
        self.levels[level].retain(|t| t.id != id);
    }

    /// Tasks queued at `level`, in stored order.
    #[inline]
    pub fn level(&self, level: usize) -> &[Task] {
        &self.levels[level]
    }

    /// Number of levels in this bank.
    #[inline]
    pub fn level_count(&self) -> usize {
        self.levels.len()
    }

    /// Total queued tasks across all levels.
    pub fn len(&self) -> usize {
        self.levels.iter().map(Vec::len).sum()
    }

    /// Returns `true` if no level holds any task.
    pub fn is_empty(&self) -> bool {
        self.levels.iter().all(Vec::is_empty)
    }

    /// Returns `true` if any level holds an entry with `id`.
    pub fn contains(&self, id: TaskId) -> bool {
        self.levels.iter().any(|l| l.iter().any(|t| t.id == id))
    }
}

// ============================================================================
// Tests
// ============================================================================
