/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Core task and job data structures.
//!
//! Two types model the two halves of the simulation:
//!
//! ```text
//! workload file ──(parser)──► Task ──(arrival)──► Job ──(engine)──► timeline
//!                              ↑ immutable descriptor   ↑ mutable instance
//! ```
//!
//! # Ownership model
//! `Task` is a plain `Copy` value – every field is an integer tick count –
//! so each [`Job`] embeds its descriptor instead of borrowing it. Jobs are
//! owned by exactly one queue at any moment (the ready queue or the
//! aperiodic FIFO) and are dropped on completion, on server expiry, or with
//! the engine. There are no back-pointers from tasks to jobs.

use std::fmt;

/// Reserved task id identifying the synthetic server task.
pub const SERVER_TASK_ID: u32 = 999;

// ── Task kind ─────────────────────────────────────────────────────────────────

/// Workload class of a task.
///
/// Sporadic tasks are scheduled exactly like periodic ones; their period is
/// the minimum inter-arrival bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskKind {
    Periodic,
    Sporadic,
    Aperiodic,
}

impl fmt::Display for TaskKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaskKind::Periodic => write!(f, "Periodic"),
            TaskKind::Sporadic => write!(f, "Sporadic"),
            TaskKind::Aperiodic => write!(f, "Aperiodic"),
        }
    }
}

// ── Task ──────────────────────────────────────────────────────────────────────

/// Immutable task descriptor, created once per workload entry.
///
/// All timing fields are integer ticks (the parser scales fractional input
/// before a `Task` is ever built). `period` and `relative_deadline` are zero
/// for aperiodic tasks, which have no hard deadline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Task {
    /// Unique id across the workload. [`SERVER_TASK_ID`] is reserved.
    pub id: u32,
    pub kind: TaskKind,
    /// First arrival (periodic/sporadic) or sole arrival (aperiodic).
    pub release_time: u64,
    /// Worst-case execution in ticks. Always > 0 for parsed tasks.
    pub computation_time: u64,
    /// ≥ 1 for periodic/sporadic, 0 for aperiodic.
    pub period: u64,
    /// ≥ 1 for periodic/sporadic, 0 for aperiodic.
    pub relative_deadline: u64,
}

impl Task {
    pub fn new(
        id: u32,
        kind: TaskKind,
        release_time: u64,
        computation_time: u64,
        period: u64,
        relative_deadline: u64,
    ) -> Self {
        Self {
            id,
            kind,
            release_time,
            computation_time,
            period,
            relative_deadline,
        }
    }

    /// The synthetic server task: periodic, released at 0, with the server
    /// capacity as computation time and deadline equal to the period.
    pub fn server(capacity: u64, period: u64) -> Self {
        Self::new(SERVER_TASK_ID, TaskKind::Periodic, 0, capacity, period, period)
    }

    pub fn is_server(&self) -> bool {
        self.id == SERVER_TASK_ID
    }
}

// ── Job ───────────────────────────────────────────────────────────────────────

/// Mutable job instance released from a [`Task`].
///
/// `start_time` / `finish_time` are `Option` instead of a `-1` sentinel;
/// both are set by the engine (first executed tick, completion tick).
///
/// # Lifecycle
/// Created by the engine's arrival step, pushed into exactly one queue,
/// mutated in place as it executes, and dropped on completion or expiry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Job {
    /// Monotonically increasing across all tasks; never reused.
    pub id: u32,
    /// Read-only descriptor this job was released from.
    pub task: Task,
    pub arrival: u64,
    /// `arrival + task.relative_deadline`. Meaningless for aperiodic jobs.
    pub absolute_deadline: u64,
    /// Initialised to `task.computation_time`; −1 per executed tick.
    pub remaining: u64,
    pub start_time: Option<u64>,
    pub finish_time: Option<u64>,
}

impl Job {
    pub fn new(id: u32, task: Task, arrival: u64) -> Self {
        Self {
            id,
            task,
            arrival,
            absolute_deadline: arrival + task.relative_deadline,
            remaining: task.computation_time,
            start_time: None,
            finish_time: None,
        }
    }

    /// Slack at time `t`: `absolute_deadline − t − remaining`.
    ///
    /// Signed – a job that can no longer meet its deadline has negative
    /// slack, and the Least Slack Time rule must still order it.
    pub fn slack(&self, t: u64) -> i64 {
        self.absolute_deadline as i64 - t as i64 - self.remaining as i64
    }

    pub fn is_complete(&self) -> bool {
        self.remaining == 0
    }

    pub fn is_server(&self) -> bool {
        self.task.is_server()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
