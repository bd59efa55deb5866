#![allow(dead_code)] // Embedding API is intentionally wider than internal use.
//! Deadline-aware multi-level feedback queue dispatch policy.
//!
//! ## Scope
//! This crate is a discrete-event scheduling *policy* core: given a batch of
//! timestamped task lifecycle events plus the currently-occupied CPU and IO
//! slots, it decides which task id should hold the CPU and which should hold
//! the IO device for the next interval. An external driver owns event
//! generation, time advancement, and actual task execution; this crate is
//! invoked once per simulated tick and does nothing else.
//!
//! ## Key invariants
//! - Two fully independent queue banks (CPU-waiting, IO-waiting), each with N
//!   priority-ordered levels; a task id lives in at most one level of one
//!   bank for well-formed event streams.
//! - Selection is score-driven: lower score is more urgent, deadline slack is
//!   the primary signal, tasks just back from IO get a configurable discount,
//!   and overdue tasks are pushed behind on-time ones but keep their deadline
//!   order among themselves.
//! - Every dispatched task migrates one level down its bank, wrapping from
//!   the last level back to the top.
//! - A busy IO device is never preempted; a resource with no eligible work
//!   keeps whatever occupant the caller passed in.
//! - Malformed input (removals of absent ids, duplicate arrivals) is absorbed
//!   silently; the engine raises no errors.
//!
//! ## Cycle flow (one `decide` call)
//! 1) Apply the event batch in order, advancing the simulated clock to each
//!    event's timestamp.
//! 2) Scan CPU levels from the top; the first level that yields a selection
//!    names the new CPU occupant.
//! 3) Only if the IO device is idle, repeat the scan over the IO bank.
//!
//! ## Notable entry points
//! - [`PolicyEngine`] / [`PolicyConfig`]: the decision core.
//! - [`policy::urgency_score`] / [`policy::select_and_migrate`]: the scoring
//!   primitives, exposed for embedders that need to audit decisions.
//! - [`sim_policy::SimPolicyRunner`]: deterministic closed-loop driver
//!   emulation with safety and liveness oracles, for testing embeddings.

pub mod policy;
pub mod sim_policy;

pub use policy::{
    Action, Event, EventKind, PolicyConfig, PolicyEngine, Priority, QueueBank, Task, TaskId,
    TaskStatus,
};
