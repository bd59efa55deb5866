//! Seed-derived workload scenarios.
//!
//! A scenario is a pure function of its configuration: the same config always
//! expands to the same task plans, so any failing run can be reproduced from
//! the serialized config alone.

use serde::{Deserialize, Serialize};

use crate::policy::{Priority, TaskId};

use super::rng::XorShift64;

/// Configuration for one simulated driver run.
///
/// # Validation
///
/// Validated by [`Scenario::generate`]. Invalid configurations panic.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SimPolicyConfig {
    /// Master seed; every random draw in the run derives from it.
    pub seed: u64,
    /// Number of tasks in the workload.
    pub task_count: u32,
    /// Hard cap on simulated ticks before the run is declared hung.
    pub max_ticks: u64,
    /// Ticks between an IO request being dispatched and its completion.
    pub io_latency: u64,
    /// Percentage of tasks arriving as [`Priority::High`].
    pub high_ratio_pct: u8,
    /// Deadline slack range past arrival, in ticks.
    pub min_deadline_slack: u64,
    pub max_deadline_slack: u64,
    /// Chance (percent) that a dispatched task requests IO on a given run.
    pub io_request_pct: u8,
    /// Number of dispatched intervals after which a task finishes.
    pub finish_after_runs: u32,
    /// Consecutive ticks without a task finishing (while live tasks exist)
    /// before the run is declared hung.
    pub hang_bound: u64,
    /// Decision-trace ring capacity.
    pub trace_capacity: usize,
}

impl Default for SimPolicyConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            task_count: 16,
            max_ticks: 2_000,
            io_latency: 3,
            high_ratio_pct: 50,
            min_deadline_slack: 10,
            max_deadline_slack: 200,
            io_request_pct: 30,
            finish_after_runs: 3,
            hang_bound: 128,
            trace_capacity: 4_096,
        }
    }
}

impl SimPolicyConfig {
    /// Convenience: default workload with a specific seed.
    pub fn with_seed(seed: u64) -> Self {
        Self {
            seed,
            ..Self::default()
        }
    }

    fn validate(&self) {
        assert!(self.max_ticks > 0, "max_ticks must be > 0");
        assert!(self.io_latency > 0, "io_latency must be > 0");
        assert!(self.high_ratio_pct <= 100, "high_ratio_pct must be <= 100");
        assert!(self.io_request_pct <= 100, "io_request_pct must be <= 100");
        assert!(
            self.min_deadline_slack <= self.max_deadline_slack,
            "deadline slack range is empty"
        );
        assert!(self.finish_after_runs > 0, "finish_after_runs must be > 0");
        assert!(self.hang_bound > 0, "hang_bound must be > 0");
    }
}

/// One task's plan: everything the driver knows about it up front.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskPlan {
    pub id: TaskId,
    pub priority: Priority,
    /// Tick at which the arrival event fires.
    pub arrival: u64,
    /// Absolute deadline.
    pub deadline: u64,
}

/// A fully-expanded scenario.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Scenario {
    pub cfg: SimPolicyConfig,
    /// Task plans sorted by `(arrival, id)` so event batches come out in
    /// non-decreasing time order.
    pub tasks: Vec<TaskPlan>,
}

impl Scenario {
    /// Expand `cfg` into concrete task plans.
    ///
    /// # Panics
    ///
    /// Panics if `cfg` is invalid.
    pub fn generate(cfg: SimPolicyConfig) -> Self {
        cfg.validate();

        let mut rng = XorShift64::new(cfg.seed);
        // Arrivals land in the first half of the run so the workload has
        // room to drain before max_ticks.
        let arrival_window = (cfg.max_ticks / 2).max(1);

        let mut tasks = Vec::with_capacity(cfg.task_count as usize);
        for i in 0..cfg.task_count {
            // Id 0 is the idle sentinel; real tasks start at 1.
            let id = TaskId(i + 1);
            let priority = if rng.chance(cfg.high_ratio_pct) {
                Priority::High
            } else {
                Priority::Low
            };
            let arrival = rng.next_below(arrival_window);
            let deadline =
                arrival + rng.in_range(cfg.min_deadline_slack, cfg.max_deadline_slack);
            tasks.push(TaskPlan {
                id,
                priority,
                arrival,
                deadline,
            });
        }

        tasks.sort_by_key(|t| (t.arrival, t.id));
        Self { cfg, tasks }
    }
}

// ============================================================================
// Tests
// ============================================================================
