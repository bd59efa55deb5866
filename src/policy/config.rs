//! Policy constants surfaced as configuration.
//!
//! The level count, priority entry levels, and scoring factors encode policy
//! intent (new and returning tasks get two levels of slack before the lowest
//! tier), so they are named configuration rather than embedded literals.

use serde::{Deserialize, Serialize};

use super::event::Priority;

/// Configuration for the feedback-queue dispatch policy.
///
/// # Defaults
///
/// Four levels per bank; `High` tasks enter at level 0 and `Low` tasks at
/// level 2; tasks just back from IO have their deadline slack discounted to
/// 0.4x; overdue tasks carry a 100 000 additive penalty.
///
/// # Validation
///
/// Validated when passed to [`super::PolicyEngine::new`]. Invalid
/// configurations (zero levels, out-of-range entry levels, non-positive or
/// non-finite factors) panic.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PolicyConfig {
    /// Number of feedback levels per bank. Level 0 is the highest priority.
    pub levels: usize,

    /// Insertion level for [`Priority::High`] tasks.
    pub high_entry_level: usize,

    /// Insertion level for [`Priority::Low`] tasks.
    pub low_entry_level: usize,

    /// Deadline-slack multiplier for tasks that just returned from IO.
    /// Keep it below `normal_factor` for the boost to mean anything; only
    /// positivity is enforced.
    pub io_return_factor: f64,

    /// Deadline-slack multiplier for every other non-overdue task.
    pub normal_factor: f64,

    /// Additive penalty for overdue tasks. Must exceed the largest slack the
    /// driver will produce, or overdue tasks can preempt on-time ones.
    pub overdue_penalty: f64,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            levels: 4,
            high_entry_level: 0,
            low_entry_level: 2,
            io_return_factor: 0.4,
            normal_factor: 1.0,
            overdue_penalty: 100_000.0,
        }
    }
}

impl PolicyConfig {
    /// Insertion level for a task of the given priority.
    #[inline]
    pub fn entry_level(&self, priority: Priority) -> usize {
        match priority {
            Priority::High => self.high_entry_level,
            Priority::Low => self.low_entry_level,
        }
    }

    /// Destination level for a task dispatched from `level`: one level down,
    /// wrapping from the last level back to 0.
    #[inline]
    pub fn next_level(&self, level: usize) -> usize {
        debug_assert!(level < self.levels, "level {} out of range", level);
        (level + 1) % self.levels
    }

    /// Validate the configuration.
    ///
    /// # Panics
    ///
    /// Panics if:
    /// - `levels` is 0
    /// - either entry level is `>= levels`
    /// - any factor or the penalty is non-finite or `<= 0`
    pub(crate) fn validate(&self) {
        assert!(self.levels > 0, "levels must be > 0");
        assert!(
            self.high_entry_level < self.levels,
            "high_entry_level {} out of range (levels = {})",
            self.high_entry_level,
            self.levels
        );
        assert!(
            self.low_entry_level < self.levels,
            "low_entry_level {} out of range (levels = {})",
            self.low_entry_level,
            self.levels
        );
        assert!(
            self.io_return_factor.is_finite() && self.io_return_factor > 0.0,
            "io_return_factor must be finite and > 0"
        );
        assert!(
            self.normal_factor.is_finite() && self.normal_factor > 0.0,
            "normal_factor must be finite and > 0"
        );
        assert!(
            self.overdue_penalty.is_finite() && self.overdue_penalty > 0.0,
            "overdue_penalty must be finite and > 0"
        );
    }
}

// ============================================================================
// Tests
// ============================================================================
