/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Aperiodic servers.
//!
//! A server is a synthetic periodic task whose budget (the server job's
//! remaining execution time) is spent servicing the aperiodic FIFO one tick
//! at a time. The two policies differ only in what happens when the server
//! is dispatched with nothing to serve:
//!
//! * **Polling** – forfeits the rest of its budget on the spot; the engine
//!   removes the server job and re-selects this same tick.
//! * **Deferrable** – keeps its budget and steps aside; the engine runs the
//!   next-ranked ready job for this tick. The preserved budget lives only
//!   until the server job expires at its period boundary.
//!
//! Replenishment needs no extra machinery: a fresh server job with full
//! budget arrives through the ordinary periodic-arrival rule, and stale
//! server jobs are cleaned up at the start of each tick before arrivals.

use std::collections::VecDeque;
use std::fmt;

use tracing::debug;

use crate::task::Job;
use crate::timeline::{EventKind, Timeline};

// ── Policy kind ───────────────────────────────────────────────────────────────

/// Global aperiodic-service policy for a workload.
///
/// `Background` means no server exists at all: aperiodic jobs only run in
/// ticks where the ready queue is empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerPolicyKind {
    Background,
    Poller,
    Deferrable,
}

impl ServerPolicyKind {
    /// `true` when a synthetic server task participates in scheduling.
    pub fn is_active(&self) -> bool {
        !matches!(self, ServerPolicyKind::Background)
    }
}

impl fmt::Display for ServerPolicyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServerPolicyKind::Background => write!(f, "Background"),
            ServerPolicyKind::Poller => write!(f, "Poller"),
            ServerPolicyKind::Deferrable => write!(f, "Deferrable"),
        }
    }
}

// ── Server tick ───────────────────────────────────────────────────────────────

/// What the server did with its dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerDecision {
    /// One tick of an aperiodic job was executed; this was the tick's work.
    Serviced,
    /// Nothing to serve. Poller has zeroed its budget; Deferrable kept it.
    Yielded,
}

/// Run one server dispatch at time `t`.
///
/// Called only when the ordered ready queue has the server job at its head.
/// On service, both the aperiodic head's remaining time and the server
/// budget are decremented; a completed aperiodic job is logged with
/// `AperiodicFinish` at `t + 1` and dropped from the FIFO. The caller is
/// responsible for removing the server job when its budget reaches zero and
/// for re-selecting after a yield.
pub fn run_server_tick(
    kind: ServerPolicyKind,
    server_job: &mut Job,
    aperiodic: &mut VecDeque<Job>,
    timeline: &mut Timeline,
    t: u64,
) -> ServerDecision {
    debug_assert!(kind.is_active(), "server tick with no active server");

    let Some(job) = aperiodic.front_mut() else {
        return match kind {
            ServerPolicyKind::Poller => {
                // Polling rule: the budget is lost the moment the server is
                // dispatched idle.
                debug!(time = t, budget = server_job.remaining, "polling server forfeits budget");
                server_job.remaining = 0;
                ServerDecision::Yielded
            }
            _ => {
                debug!(time = t, budget = server_job.remaining, "deferrable server yields");
                ServerDecision::Yielded
            }
        };
    };

    let event = match kind {
        ServerPolicyKind::Deferrable => EventKind::ServerExecDeferrable,
        _ => EventKind::ServerExec,
    };
    timeline.record(t, Some(job.id), Some(job.task.id), event);

    job.remaining -= 1;
    server_job.remaining -= 1;

    if job.is_complete() {
        timeline.record(t + 1, Some(job.id), Some(job.task.id), EventKind::AperiodicFinish);
        aperiodic.pop_front();
    }

    ServerDecision::Serviced
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::{Task, TaskKind};

    fn server_job(capacity: u64, period: u64) -> Job {
        Job::new(1, Task::server(capacity, period), 0)
    }

    fn aperiodic_queue(executions: &[u64]) -> VecDeque<Job> {
        executions
            .iter()
            .enumerate()
            .map(|(i, &e)| {
                Job::new(
                    10 + i as u32,
                    Task::new(10 + i as u32, TaskKind::Aperiodic, 0, e, 0, 0),
                    0,
                )
            })
            .collect()
    }

    #[test]
    fn service_decrements_both_job_and_budget() {
        let mut server = server_job(2, 5);
        let mut queue = aperiodic_queue(&[3]);
        let mut tl = Timeline::new();

        let d = run_server_tick(ServerPolicyKind::Poller, &mut server, &mut queue, &mut tl, 1);
        assert_eq!(d, ServerDecision::Serviced);
        assert_eq!(server.remaining, 1);
        assert_eq!(queue.front().unwrap().remaining, 2);
        assert_eq!(tl.count(EventKind::ServerExec), 1);
    }

    #[test]
    fn deferrable_service_uses_its_own_event_kind() {
        let mut server = server_job(2, 5);
        let mut queue = aperiodic_queue(&[3]);
        let mut tl = Timeline::new();

        run_server_tick(ServerPolicyKind::Deferrable, &mut server, &mut queue, &mut tl, 0);
        assert_eq!(tl.count(EventKind::ServerExecDeferrable), 1);
        assert_eq!(tl.count(EventKind::ServerExec), 0);
    }

    #[test]
    fn finished_aperiodic_is_logged_and_dropped() {
        let mut server = server_job(2, 5);
        let mut queue = aperiodic_queue(&[1, 4]);
        let mut tl = Timeline::new();

        run_server_tick(ServerPolicyKind::Poller, &mut server, &mut queue, &mut tl, 3);
        assert_eq!(queue.len(), 1);
        assert_eq!(queue.front().unwrap().remaining, 4);
        let finish = tl.events().last().unwrap();
        assert_eq!(finish.kind, EventKind::AperiodicFinish);
        assert_eq!(finish.time, 4);
    }

    #[test]
    fn poller_forfeits_budget_on_empty_queue() {
        let mut server = server_job(2, 5);
        let mut queue = VecDeque::new();
        let mut tl = Timeline::new();

        let d = run_server_tick(ServerPolicyKind::Poller, &mut server, &mut queue, &mut tl, 0);
        assert_eq!(d, ServerDecision::Yielded);
        assert_eq!(server.remaining, 0);
        assert!(tl.is_empty());
    }

    #[test]
    fn deferrable_preserves_budget_on_empty_queue() {
        let mut server = server_job(2, 5);
        let mut queue = VecDeque::new();
        let mut tl = Timeline::new();

        let d = run_server_tick(ServerPolicyKind::Deferrable, &mut server, &mut queue, &mut tl, 0);
        assert_eq!(d, ServerDecision::Yielded);
        assert_eq!(server.remaining, 2);
        assert!(tl.is_empty());
    }

    #[test]
    fn background_policy_is_inactive() {
        assert!(!ServerPolicyKind::Background.is_active());
        assert!(ServerPolicyKind::Poller.is_active());
        assert!(ServerPolicyKind::Deferrable.is_active());
    }
}
