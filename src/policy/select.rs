//! Urgency scoring and select-and-migrate.
//!
//! Lower score = more urgent. Deadline slack is the primary signal; tasks
//! just back from IO have their slack discounted so they preempt CPU-bound
//! tasks with equal slack; overdue tasks are pushed behind every on-time task
//! by a large additive penalty but stay internally ordered by deadline, so
//! the earliest-deadline one among them is dispatched first.

use super::bank::QueueBank;
use super::config::PolicyConfig;
use super::event::{Task, TaskStatus};

/// Urgency score for `task` at time `now`. Lower is more urgent.
///
/// Not overdue (`deadline > now`): deadline slack scaled by the status
/// factor. Overdue (`deadline <= now`): `overdue_penalty` plus the
/// non-positive slack.
///
/// Scores are computed fresh at every selection and never persisted.
pub fn urgency_score(task: &Task, now: u64, config: &PolicyConfig) -> f64 {
    let slack = task.deadline as i64 - now as i64;
    if slack > 0 {
        let factor = match task.status {
            TaskStatus::JustReturnedFromIo => config.io_return_factor,
            TaskStatus::Normal => config.normal_factor,
        };
        factor * slack as f64
    } else {
        config.overdue_penalty + slack as f64
    }
}

/// Pick the most urgent task at `from_level`, migrate it to `to_level` of the
/// same bank, and return it. Returns `None` when the level is empty.
///
/// The scan keeps the strictly smallest score seen; on equal scores the
/// earlier-stored task wins because the comparison never replaces on
/// equality. Dispatch compatibility depends on this exact tie-break; do not
/// substitute a different stable-sort policy.
pub fn select_and_migrate(
    bank: &mut QueueBank,
    from_level: usize,
    to_level: usize,
    now: u64,
    config: &PolicyConfig,
) -> Option<Task> {
    let mut selected: Option<Task> = None;
    let mut min_score = f64::MAX;

    for task in bank.level(from_level) {
        let score = urgency_score(task, now, config);
        if score < min_score {
            min_score = score;
            selected = Some(*task);
        }
    }

    if let Some(task) = selected {
        // Remove by id, not by index: duplicate arrivals can leave multiple
        // copies in a level, and every copy of the winner leaves together.
        bank.remove_in_level(from_level, task.id);
        bank.insert(to_level, task);
    }

    selected
}

// ============================================================================
// Tests
// ============================================================================
