//! Closed-loop driver emulation and oracles.
//!
//! The runner plays the external driver's role: it owns the event stream,
//! the device occupancy model, and time advancement, while the engine under
//! test makes every dispatch decision. After each cycle the runner checks
//! safety oracles (bank exclusivity, occupant preservation) and a liveness
//! bound (some task must finish within `hang_bound` ticks whenever live
//! tasks exist).

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::policy::{
    Action, Event, EventKind, PolicyEngine, Task, TaskId, TaskStatus,
};

use super::rng::XorShift64;
use super::scenario::Scenario;
use super::trace::{TraceEvent, TraceRing};

/// Result of a simulation run.
#[derive(Clone, Debug, PartialEq)]
pub enum RunOutcome {
    Ok,
    Failed(FailureReport),
}

/// Failure details for simulation runs.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FailureReport {
    pub kind: FailureKind,
    pub message: String,
    pub tick: u64,
}

/// Failure classification.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum FailureKind {
    /// Live tasks exist but nothing finished within the hang bound, or the
    /// workload outlived `max_ticks`.
    Hang,
    /// A safety oracle failed; `code` identifies which one.
    InvariantViolation { code: u32 },
}

/// Everything a run leaves behind.
#[derive(Clone, Debug)]
pub struct SimReport {
    pub outcome: RunOutcome,
    /// Decision trace, oldest first (bounded by the configured capacity).
    pub trace: Vec<TraceEvent>,
    /// Tick at which the run ended.
    pub ticks: u64,
    /// Tasks that ran to completion.
    pub finished: u32,
}

/// Drives one [`PolicyEngine`] through a scenario.
pub struct SimPolicyRunner {
    scenario: Scenario,
    engine: PolicyEngine,
    rng: XorShift64,
    trace: TraceRing,

    // Driver-side model.
    current_cpu: TaskId,
    current_io: TaskId,
    next_plan: usize,
    table: BTreeMap<TaskId, Task>,
    runs: BTreeMap<TaskId, u32>,
    live: BTreeSet<TaskId>,
    pending_io_end: BTreeMap<u64, Vec<TaskId>>,
    finished: u32,
    ticks_since_finish: u64,
}

impl SimPolicyRunner {
    pub fn new(scenario: Scenario) -> Self {
        let trace = TraceRing::new(scenario.cfg.trace_capacity);
        // Fork the driver stream off the scenario seed so workload shape and
        // runtime choices stay independent.
        let rng = XorShift64::new(scenario.cfg.seed ^ 0xD1B5_4A32_D192_ED03);
        Self {
            scenario,
            engine: PolicyEngine::default(),
            rng,
            trace,
            current_cpu: TaskId::IDLE,
            current_io: TaskId::IDLE,
            next_plan: 0,
            table: BTreeMap::new(),
            runs: BTreeMap::new(),
            live: BTreeSet::new(),
            pending_io_end: BTreeMap::new(),
            finished: 0,
            ticks_since_finish: 0,
        }
    }

    /// Execute the scenario until the workload drains or a check fails.
    pub fn run(mut self) -> SimReport {
        let max_ticks = self.scenario.cfg.max_ticks;

        for tick in 0..max_ticks {
            let batch = self.build_batch(tick);

            let pre_cpu = self.current_cpu;
            let pre_io = self.current_io;
            let action = self.engine.decide(&batch, pre_cpu, pre_io);

            if let Some((code, message)) = self.check_oracles(pre_cpu, pre_io, &action) {
                self.trace.push(TraceEvent::InvariantFail { code });
                return self.fail(
                    FailureKind::InvariantViolation { code },
                    message,
                    tick,
                );
            }

            self.trace.push(TraceEvent::Decision {
                tick,
                events: batch.len() as u32,
                cpu: action.cpu,
                io: action.io,
            });

            self.adopt(tick, pre_io, &action);

            if self.live.is_empty() && self.next_plan == self.scenario.tasks.len() {
                debug_assert!(self.pending_io_end.is_empty());
                return self.done(tick);
            }

            if self.live.is_empty() {
                self.ticks_since_finish = 0;
            } else {
                self.ticks_since_finish += 1;
                if self.ticks_since_finish > self.scenario.cfg.hang_bound {
                    return self.fail(
                        FailureKind::Hang,
                        "no task finished within the hang bound",
                        tick,
                    );
                }
            }
        }

        self.fail(FailureKind::Hang, "workload outlived max_ticks", max_ticks)
    }

    /// Assemble the event batch the driver would submit at `tick`.
    fn build_batch(&mut self, tick: u64) -> Vec<Event> {
        let mut batch = Vec::new();

        // IO completions due now free the device.
        if let Some(ids) = self.pending_io_end.remove(&tick) {
            for id in ids {
                let mut snapshot = match self.table.get(&id) {
                    Some(&snapshot) => snapshot,
                    None => {
                        debug_assert!(false, "pending IO for unknown task {:?}", id);
                        continue;
                    }
                };
                batch.push(Event {
                    kind: EventKind::IoEnd,
                    at: tick,
                    task: snapshot,
                });
                // Mirror the engine's status flip in the driver's table so
                // later snapshots carry it.
                snapshot.status = TaskStatus::JustReturnedFromIo;
                self.table.insert(id, snapshot);
                self.current_io = TaskId::IDLE;
                self.trace.push(TraceEvent::IoCompleted { tick, id });
            }
        }

        // Arrivals due now.
        while self.next_plan < self.scenario.tasks.len()
            && self.scenario.tasks[self.next_plan].arrival == tick
        {
            let plan = &self.scenario.tasks[self.next_plan];
            let task = Task {
                id: plan.id,
                priority: plan.priority,
                deadline: plan.deadline,
                status: TaskStatus::Normal,
            };
            self.table.insert(task.id, task);
            self.runs.insert(task.id, 0);
            self.live.insert(task.id);
            batch.push(Event {
                kind: EventKind::Arrival,
                at: tick,
                task,
            });
            self.trace.push(TraceEvent::TaskArrived { tick, id: task.id });
            self.next_plan += 1;
        }

        // The task that held the CPU for the last interval either finishes,
        // requests IO, or keeps running.
        if let Some(&snapshot) = self.table.get(&self.current_cpu) {
            let id = snapshot.id;
            let ran = self.runs.entry(id).or_insert(0);
            *ran += 1;

            if *ran >= self.scenario.cfg.finish_after_runs {
                batch.push(Event {
                    kind: EventKind::Finish,
                    at: tick,
                    task: snapshot,
                });
                self.live.remove(&id);
                self.table.remove(&id);
                self.finished += 1;
                self.ticks_since_finish = 0;
                self.current_cpu = TaskId::IDLE;
                self.trace.push(TraceEvent::TaskFinished { tick, id });
            } else if self.rng.chance(self.scenario.cfg.io_request_pct) {
                batch.push(Event {
                    kind: EventKind::IoRequest,
                    at: tick,
                    task: snapshot,
                });
                self.current_cpu = TaskId::IDLE;
                self.trace.push(TraceEvent::IoRequested { tick, id });
            }
        }

        // Nothing happened this tick; a timer tick still forces a fresh
        // selection pass.
        if batch.is_empty() {
            batch.push(Event {
                kind: EventKind::Timer,
                at: tick,
                task: Task {
                    id: TaskId::IDLE,
                    priority: crate::policy::Priority::High,
                    deadline: 0,
                    status: TaskStatus::Normal,
                },
            });
        }

        batch
    }

    /// Fold the engine's decision back into the driver model.
    fn adopt(&mut self, tick: u64, pre_io: TaskId, action: &Action) {
        self.current_cpu = action.cpu;

        if pre_io.is_idle() && !action.io.is_idle() {
            // Device starts on the chosen task; completion fires after the
            // configured latency.
            self.current_io = action.io;
            self.pending_io_end
                .entry(tick + self.scenario.cfg.io_latency)
                .or_default()
                .push(action.io);
        }
    }

    /// Safety oracles, checked after every decision.
    ///
    /// Codes: 1 duplicate id within a bank, 2 id present in both banks,
    /// 3 busy IO occupant replaced, 4 chosen CPU task not queued, 5 chosen
    /// IO task not queued, 6 CPU occupant changed with an empty bank,
    /// 7 IO occupant changed with an empty bank.
    fn check_oracles(
        &self,
        pre_cpu: TaskId,
        pre_io: TaskId,
        action: &Action,
    ) -> Option<(u32, &'static str)> {
        let cpu_ids = match bank_ids(self.engine.cpu_bank()) {
            Ok(ids) => ids,
            Err(()) => return Some((1, "duplicate id within the CPU bank")),
        };
        let io_ids = match bank_ids(self.engine.io_bank()) {
            Ok(ids) => ids,
            Err(()) => return Some((1, "duplicate id within the IO bank")),
        };
        if cpu_ids.intersection(&io_ids).next().is_some() {
            return Some((2, "task id present in both banks"));
        }

        if !pre_io.is_idle() && action.io != pre_io {
            return Some((3, "busy IO occupant was replaced"));
        }
        if action.cpu != pre_cpu && !cpu_ids.contains(&action.cpu) {
            return Some((4, "chosen CPU task is not queued"));
        }
        if action.io != pre_io && !io_ids.contains(&action.io) {
            return Some((5, "chosen IO task is not queued"));
        }
        if cpu_ids.is_empty() && action.cpu != pre_cpu {
            return Some((6, "CPU occupant changed with an empty bank"));
        }
        if pre_io.is_idle() && io_ids.is_empty() && action.io != pre_io {
            return Some((7, "IO occupant changed with an empty bank"));
        }

        None
    }

    fn done(self, tick: u64) -> SimReport {
        SimReport {
            outcome: RunOutcome::Ok,
            trace: self.trace.into_vec(),
            ticks: tick,
            finished: self.finished,
        }
    }

    fn fail(self, kind: FailureKind, message: &str, tick: u64) -> SimReport {
        SimReport {
            outcome: RunOutcome::Failed(FailureReport {
                kind,
                message: message.to_string(),
                tick,
            }),
            trace: self.trace.into_vec(),
            ticks: tick,
            finished: self.finished,
        }
    }
}

/// All ids in a bank, or `Err` if any level holds a duplicate.
fn bank_ids(bank: &crate::policy::QueueBank) -> Result<BTreeSet<TaskId>, ()> {
    let mut ids = BTreeSet::new();
    for level in 0..bank.level_count() {
        for task in bank.level(level) {
            if !ids.insert(task.id) {
                return Err(());
            }
        }
    }
    Ok(ids)
}

/// Run the scenario twice and require identical outcomes and traces.
///
/// # Panics
///
/// Panics on any divergence; the engine and the driver model are both meant
/// to be pure functions of the scenario.
pub fn assert_deterministic(cfg: &super::scenario::SimPolicyConfig) {
    let first = SimPolicyRunner::new(Scenario::generate(cfg.clone())).run();
    let second = SimPolicyRunner::new(Scenario::generate(cfg.clone())).run();

    assert_eq!(
        first.outcome, second.outcome,
        "outcome diverged for seed {}",
        cfg.seed
    );
    assert_eq!(
        first.trace, second.trace,
        "trace diverged for seed {}",
        cfg.seed
    );
}

// ============================================================================
// Tests
// ============================================================================
