//! Property tests for bank consistency under arbitrary event streams.

use proptest::prelude::*;

use mlfq_rs::{
    Event, EventKind, PolicyEngine, Priority, Task, TaskId, TaskStatus,
};

/// Compact generator-side event description.
#[derive(Clone, Debug)]
struct GenEvent {
    kind: u8,
    id: u32,
    high: bool,
    deadline: u64,
    dt: u64,
}

fn gen_events() -> impl Strategy<Value = Vec<GenEvent>> {
    prop::collection::vec(
        (0u8..5, 1u32..8, any::<bool>(), 0u64..500, 0u64..5).prop_map(
            |(kind, id, high, deadline, dt)| GenEvent {
                kind,
                id,
                high,
                deadline,
                dt,
            },
        ),
        0..64,
    )
}

fn make_event(g: &GenEvent, at: u64) -> Event {
    let kind = match g.kind {
        0 => EventKind::Arrival,
        1 => EventKind::IoRequest,
        2 => EventKind::IoEnd,
        3 => EventKind::Finish,
        _ => EventKind::Timer,
    };
    Event {
        kind,
        at,
        task: Task {
            id: TaskId(g.id),
            priority: if g.high { Priority::High } else { Priority::Low },
            deadline: g.deadline,
            status: TaskStatus::Normal,
        },
    }
}

/// Expand generated descriptions into a well-timed event batch.
fn expand(gen: &[GenEvent]) -> Vec<Event> {
    let mut at = 0;
    gen.iter()
        .map(|g| {
            at += g.dt;
            make_event(g, at)
        })
        .collect()
}

/// Where the model says a task currently lives.
#[derive(Clone, Copy, PartialEq, Eq)]
enum Loc {
    Out,
    Cpu,
    Io,
}

/// Ids present in a bank, and whether any level held a duplicate.
fn collect_ids(bank: &mlfq_rs::QueueBank) -> (std::collections::BTreeSet<TaskId>, bool) {
    let mut ids = std::collections::BTreeSet::new();
    let mut dup = false;
    for level in 0..bank.level_count() {
        for task in bank.level(level) {
            dup |= !ids.insert(task.id);
        }
    }
    (ids, dup)
}

proptest! {
    /// After any well-formed event stream, no id occupies two levels of a
    /// bank or both banks at once.
    ///
    /// Well-formed means each lifecycle event fires from the task state it
    /// belongs to (no duplicate arrivals, no IoEnd for a CPU-resident task):
    /// misuse is defined to silently produce duplicate entries, so the
    /// exclusivity guarantee is scoped to streams a correct driver emits.
    #[test]
    fn banks_stay_exclusive(gen in gen_events()) {
        let mut engine = PolicyEngine::default();
        let mut loc: std::collections::BTreeMap<u32, Loc> = std::collections::BTreeMap::new();
        let mut at = 0u64;

        for g in &gen {
            let here = *loc.get(&g.id).unwrap_or(&Loc::Out);
            let well_formed = match g.kind {
                0 => here == Loc::Out, // Arrival
                1 => here == Loc::Cpu, // IoRequest
                2 => here == Loc::Io,  // IoEnd
                _ => true,             // Finish / Timer are safe anywhere
            };
            if !well_formed {
                continue;
            }
            match g.kind {
                0 => {
                    loc.insert(g.id, Loc::Cpu);
                }
                1 => {
                    loc.insert(g.id, Loc::Io);
                }
                2 => {
                    loc.insert(g.id, Loc::Cpu);
                }
                3 => {
                    // Finish clears the CPU bank only.
                    if here == Loc::Cpu {
                        loc.insert(g.id, Loc::Out);
                    }
                }
                _ => {}
            }

            at += g.dt;
            let batch = [make_event(g, at)];
            engine.decide(&batch, TaskId::IDLE, TaskId::IDLE);

            let (cpu_ids, cpu_dup) = collect_ids(engine.cpu_bank());
            let (io_ids, io_dup) = collect_ids(engine.io_bank());
            prop_assert!(!cpu_dup, "duplicate id within CPU bank");
            prop_assert!(!io_dup, "duplicate id within IO bank");
            prop_assert!(
                cpu_ids.intersection(&io_ids).next().is_none(),
                "id present in both banks"
            );
        }
    }

    /// A changed occupant always names a task still queued in its bank; an
    /// unchanged occupant is always legal.
    #[test]
    fn chosen_occupants_are_queued(gen in gen_events(), cpu in 0u32..10, io in 0u32..10) {
        let mut engine = PolicyEngine::default();
        let batch = expand(&gen);

        let current_cpu = TaskId(cpu);
        let current_io = TaskId(io);
        let action = engine.decide(&batch, current_cpu, current_io);

        if action.cpu != current_cpu {
            prop_assert!(engine.cpu_bank().contains(action.cpu));
        }
        if action.io != current_io {
            prop_assert!(engine.io_bank().contains(action.io));
        }
    }

    /// A busy IO device is returned untouched, and the IO bank ends up
    /// exactly where event dispatch alone puts it: no selection migration.
    #[test]
    fn busy_io_passes_through(gen in gen_events(), io in 1u32..10) {
        let mut engine = PolicyEngine::default();
        let batch = expand(&gen);

        // Independent model of the IO bank under dispatch alone.
        let mut model: Vec<Vec<TaskId>> = vec![Vec::new(); 4];
        for e in &batch {
            match e.kind {
                EventKind::IoRequest => {
                    let entry = if e.task.priority == Priority::High { 0 } else { 2 };
                    model[entry].push(e.task.id);
                }
                EventKind::IoEnd => {
                    for level in &mut model {
                        level.retain(|&t| t != e.task.id);
                    }
                }
                _ => {}
            }
        }

        let busy = TaskId(io);
        let action = engine.decide(&batch, TaskId::IDLE, busy);
        prop_assert_eq!(action.io, busy);

        for (level, expected) in model.iter().enumerate() {
            let got: Vec<TaskId> =
                engine.io_bank().level(level).iter().map(|t| t.id).collect();
            prop_assert_eq!(&got, expected, "IO level {} diverged", level);
        }
    }

    /// With no queued work, both occupants pass through verbatim.
    #[test]
    fn empty_banks_preserve_occupants(cpu in 0u32..100, io in 0u32..100, at in 0u64..1_000) {
        let mut engine = PolicyEngine::default();
        let batch = [Event {
            kind: EventKind::Timer,
            at,
            task: Task {
                id: TaskId::IDLE,
                priority: Priority::High,
                deadline: 0,
                status: TaskStatus::Normal,
            },
        }];

        let action = engine.decide(&batch, TaskId(cpu), TaskId(io));
        prop_assert_eq!(action.cpu, TaskId(cpu));
        prop_assert_eq!(action.io, TaskId(io));
    }
}
