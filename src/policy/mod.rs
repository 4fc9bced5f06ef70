/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Priority rules.
//!
//! A rule is a pure ordering of the ready queue at time `t`; the engine
//! only ever consults the head afterwards. The four rules differ solely in
//! their primary key:
//!
//! | Rule | Primary key (ascending) | Class |
//! |---|---|---|
//! | Rate Monotonic | `task.period` | static |
//! | Deadline Monotonic | `task.relative_deadline` | static |
//! | Earliest Deadline First | `absolute_deadline` | dynamic |
//! | Least Slack Time | `slack(t)` | dynamic, time-dependent |
//!
//! Every rule breaks ties on ascending job id (FIFO by creation), which
//! makes traces fully deterministic. The server job participates with its
//! own period and deadline exactly like any other periodic job.

use std::fmt;

use crate::task::Job;

/// The scheduling decision rule, modelled as a tagged variant rather than a
/// trait object – there is exactly one level of dispatch and no state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PriorityRule {
    RateMonotonic,
    DeadlineMonotonic,
    EarliestDeadlineFirst,
    LeastSlackTime,
}

impl PriorityRule {
    /// Map the driver's fixed menu (1–4) onto a rule.
    pub fn from_menu_choice(choice: u32) -> Option<Self> {
        match choice {
            1 => Some(PriorityRule::RateMonotonic),
            2 => Some(PriorityRule::DeadlineMonotonic),
            3 => Some(PriorityRule::EarliestDeadlineFirst),
            4 => Some(PriorityRule::LeastSlackTime),
            _ => None,
        }
    }

    /// Sort `ready` into priority order for time `t`, highest priority
    /// first. Total: every comparison falls back to job id.
    pub fn order(&self, ready: &mut [Job], t: u64) {
        match self {
            PriorityRule::RateMonotonic => {
                ready.sort_by(|a, b| a.task.period.cmp(&b.task.period).then(a.id.cmp(&b.id)));
            }
            PriorityRule::DeadlineMonotonic => {
                ready.sort_by(|a, b| {
                    a.task
                        .relative_deadline
                        .cmp(&b.task.relative_deadline)
                        .then(a.id.cmp(&b.id))
                });
            }
            PriorityRule::EarliestDeadlineFirst => {
                ready.sort_by(|a, b| {
                    a.absolute_deadline
                        .cmp(&b.absolute_deadline)
                        .then(a.id.cmp(&b.id))
                });
            }
            PriorityRule::LeastSlackTime => {
                ready.sort_by(|a, b| a.slack(t).cmp(&b.slack(t)).then(a.id.cmp(&b.id)));
            }
        }
    }
}

impl fmt::Display for PriorityRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PriorityRule::RateMonotonic => write!(f, "Rate Monotonic"),
            PriorityRule::DeadlineMonotonic => write!(f, "Deadline Monotonic"),
            PriorityRule::EarliestDeadlineFirst => write!(f, "Earliest Deadline First"),
            PriorityRule::LeastSlackTime => write!(f, "Least Slack Time"),
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::{Task, TaskKind};

    fn job(id: u32, r: u64, e: u64, p: u64, d: u64, arrival: u64) -> Job {
        Job::new(id, Task::new(id, TaskKind::Periodic, r, e, p, d), arrival)
    }

    fn head_ids(rule: PriorityRule, mut ready: Vec<Job>, t: u64) -> Vec<u32> {
        rule.order(&mut ready, t);
        ready.iter().map(|j| j.id).collect()
    }

    #[test]
    fn rate_monotonic_orders_by_period() {
        let ready = vec![job(1, 0, 1, 8, 8, 0), job(2, 0, 1, 4, 4, 0), job(3, 0, 1, 6, 6, 0)];
        assert_eq!(head_ids(PriorityRule::RateMonotonic, ready, 0), vec![2, 3, 1]);
    }

    #[test]
    fn deadline_monotonic_orders_by_relative_deadline() {
        // Same periods, different deadlines – RM could not tell these apart.
        let ready = vec![job(1, 0, 1, 10, 9, 0), job(2, 0, 1, 10, 3, 0)];
        assert_eq!(head_ids(PriorityRule::DeadlineMonotonic, ready, 0), vec![2, 1]);
    }

    #[test]
    fn edf_orders_by_absolute_deadline() {
        // Job 1 arrived earlier, so its absolute deadline is sooner even
        // though both share a relative deadline.
        let ready = vec![job(2, 0, 1, 10, 10, 5), job(1, 0, 1, 10, 10, 0)];
        assert_eq!(head_ids(PriorityRule::EarliestDeadlineFirst, ready, 5), vec![1, 2]);
    }

    #[test]
    fn lst_orders_by_slack_at_t() {
        // slack = deadline − t − remaining.
        // job 1: 10 − 0 − 5 = 5; job 2: 8 − 0 − 1 = 7.
        let ready = vec![job(1, 0, 5, 10, 10, 0), job(2, 0, 1, 8, 8, 0)];
        assert_eq!(head_ids(PriorityRule::LeastSlackTime, ready.clone(), 0), vec![1, 2]);
        // At t = 4 with job 1 fully run down to 1 remaining the order flips.
        let mut later = ready;
        later[0].remaining = 1;
        assert_eq!(head_ids(PriorityRule::LeastSlackTime, later, 4), vec![2, 1]);
    }

    #[test]
    fn lst_handles_negative_slack() {
        let mut late = job(1, 0, 3, 5, 5, 0);
        late.remaining = 3;
        let ready = vec![job(2, 0, 1, 20, 20, 0), late];
        // slack(6): job 1 = 5 − 6 − 3 = −4, job 2 = 20 − 6 − 1 = 13.
        assert_eq!(head_ids(PriorityRule::LeastSlackTime, ready, 6), vec![1, 2]);
    }

    #[test]
    fn ties_break_on_job_id_for_every_rule() {
        for rule in [
            PriorityRule::RateMonotonic,
            PriorityRule::DeadlineMonotonic,
            PriorityRule::EarliestDeadlineFirst,
            PriorityRule::LeastSlackTime,
        ] {
            let ready = vec![job(3, 0, 1, 4, 4, 0), job(1, 0, 1, 4, 4, 0), job(2, 0, 1, 4, 4, 0)];
            assert_eq!(head_ids(rule, ready, 0), vec![1, 2, 3], "rule {rule}");
        }
    }

    #[test]
    fn menu_mapping_covers_the_four_rules() {
        assert_eq!(PriorityRule::from_menu_choice(1), Some(PriorityRule::RateMonotonic));
        assert_eq!(PriorityRule::from_menu_choice(2), Some(PriorityRule::DeadlineMonotonic));
        assert_eq!(
            PriorityRule::from_menu_choice(3),
            Some(PriorityRule::EarliestDeadlineFirst)
        );
        assert_eq!(PriorityRule::from_menu_choice(4), Some(PriorityRule::LeastSlackTime));
        assert_eq!(PriorityRule::from_menu_choice(0), None);
        assert_eq!(PriorityRule::from_menu_choice(5), None);
    }
}
