//! Deterministic closed-loop simulation harness.
//!
//! This module emulates the external driver the engine is designed for:
//! seed-derived workloads arrive, run, request IO, and finish, with the
//! engine making every dispatch decision. The runner checks safety and
//! liveness oracles after each cycle and records a bounded decision trace so
//! failures can be replayed from the scenario alone.

pub mod rng;
pub mod scenario;
pub mod trace;

mod runner;

pub use rng::XorShift64;
pub use scenario::{Scenario, SimPolicyConfig, TaskPlan};
pub use trace::{TraceEvent, TraceRing};

pub use runner::{
    assert_deterministic, FailureKind, FailureReport, RunOutcome, SimPolicyRunner, SimReport,
};
