//! Property tests for urgency scoring and selection.

use proptest::prelude::*;

use mlfq_rs::policy::{select_and_migrate, urgency_score, QueueBank};
use mlfq_rs::{PolicyConfig, Priority, Task, TaskId, TaskStatus};

fn task(id: u32, deadline: u64, status: TaskStatus) -> Task {
    Task {
        id: TaskId(id),
        priority: Priority::High,
        deadline,
        status,
    }
}

proptest! {
    /// Smaller slack means strictly smaller score for equal status.
    #[test]
    fn score_monotonic_in_slack(
        now in 0u64..100_000,
        slack_a in 1u64..50_000,
        slack_b in 1u64..50_000,
        returned in any::<bool>(),
    ) {
        prop_assume!(slack_a != slack_b);
        let status = if returned {
            TaskStatus::JustReturnedFromIo
        } else {
            TaskStatus::Normal
        };
        let cfg = PolicyConfig::default();

        let a = urgency_score(&task(1, now + slack_a, status), now, &cfg);
        let b = urgency_score(&task(2, now + slack_b, status), now, &cfg);
        if slack_a < slack_b {
            prop_assert!(a < b);
        } else {
            prop_assert!(a > b);
        }
    }

    /// An IO-returning task never scores worse than a normal task with the
    /// same deadline; on-time it scores strictly better.
    #[test]
    fn io_return_scores_strictly_better_on_time(
        now in 0u64..100_000,
        slack in 1u64..50_000,
    ) {
        let cfg = PolicyConfig::default();
        let normal = urgency_score(&task(1, now + slack, TaskStatus::Normal), now, &cfg);
        let boosted =
            urgency_score(&task(2, now + slack, TaskStatus::JustReturnedFromIo), now, &cfg);

        prop_assert!(boosted < normal);
        prop_assert_eq!(boosted, 0.4 * normal);
    }

    /// For realistic deadline ranges, every overdue task scores above every
    /// on-time task.
    #[test]
    fn overdue_never_preempts_on_time(
        now in 0u64..1_000_000,
        on_time_slack in 1u64..50_000,
        lateness in 0u64..50_000,
    ) {
        let cfg = PolicyConfig::default();
        let overdue_deadline = now.saturating_sub(lateness);

        let on_time = urgency_score(&task(1, now + on_time_slack, TaskStatus::Normal), now, &cfg);
        let overdue = urgency_score(&task(2, overdue_deadline, TaskStatus::Normal), now, &cfg);

        prop_assert!(overdue > on_time);
    }

    /// Selection agrees with a strict-minimum scan in stored order: the
    /// first task whose score nothing strictly undercuts wins.
    #[test]
    fn selection_matches_strict_minimum(
        now in 0u64..10_000,
        deadlines in prop::collection::vec(0u64..20_000, 1..16),
        returned_mask in prop::collection::vec(any::<bool>(), 1..16),
    ) {
        let cfg = PolicyConfig::default();
        let mut bank = QueueBank::new(cfg.levels);

        let tasks: Vec<Task> = deadlines
            .iter()
            .zip(returned_mask.iter().cycle())
            .enumerate()
            .map(|(i, (&deadline, &returned))| {
                let status = if returned {
                    TaskStatus::JustReturnedFromIo
                } else {
                    TaskStatus::Normal
                };
                task(i as u32 + 1, deadline, status)
            })
            .collect();
        for t in &tasks {
            bank.insert(0, *t);
        }

        let mut expected = tasks[0];
        let mut min = urgency_score(&tasks[0], now, &cfg);
        for t in &tasks[1..] {
            let s = urgency_score(t, now, &cfg);
            if s < min {
                min = s;
                expected = *t;
            }
        }

        let chosen = select_and_migrate(&mut bank, 0, 1, now, &cfg).unwrap();
        prop_assert_eq!(chosen.id, expected.id);

        // The winner moved to the destination level; everyone else stayed.
        prop_assert!(bank.level(0).iter().all(|t| t.id != chosen.id));
        prop_assert_eq!(bank.level(1).last().unwrap().id, chosen.id);
    }

    /// Equal-score groups always resolve to the earliest-stored member.
    #[test]
    fn ties_resolve_to_first_stored(
        now in 0u64..10_000,
        slack in 1u64..10_000,
        count in 2usize..12,
    ) {
        let cfg = PolicyConfig::default();
        let mut bank = QueueBank::new(cfg.levels);
        for i in 0..count {
            // Same deadline and status for everyone: all scores tie.
            bank.insert(0, task(i as u32 + 1, now + slack, TaskStatus::Normal));
        }

        let chosen = select_and_migrate(&mut bank, 0, 1, now, &cfg).unwrap();
        prop_assert_eq!(chosen.id, TaskId(1));
    }
}
