/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! The simulation event log and its tab-separated export.

use std::fmt;
use std::io::{self, Write};

use crate::task::{TaskKind, SERVER_TASK_ID};
use crate::workload::{Workload, TICK_SCALE};

// ── Event kinds ───────────────────────────────────────────────────────────────

/// What happened in a timeline record.
///
/// `Display` renders the exact strings the exporter and the downstream
/// visualiser expect, including `ServerExec(DS)` and `DEADLINE_MISS`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    Running,
    Finish,
    AperiodicArrival,
    ServerExec,
    ServerExecDeferrable,
    AperiodicFinish,
    BackgroundRun,
    Idle,
    DeadlineMiss,
}

impl EventKind {
    /// Records that occupy the processor for their tick. At most one of
    /// these may exist per tick; arrival/finish records are instantaneous.
    pub fn occupies_tick(&self) -> bool {
        matches!(
            self,
            EventKind::Running
                | EventKind::ServerExec
                | EventKind::ServerExecDeferrable
                | EventKind::BackgroundRun
                | EventKind::Idle
        )
    }

    pub fn is_server_exec(&self) -> bool {
        matches!(self, EventKind::ServerExec | EventKind::ServerExecDeferrable)
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventKind::Running => write!(f, "Running"),
            EventKind::Finish => write!(f, "Finish"),
            EventKind::AperiodicArrival => write!(f, "AperiodicArrival"),
            EventKind::ServerExec => write!(f, "ServerExec"),
            EventKind::ServerExecDeferrable => write!(f, "ServerExec(DS)"),
            EventKind::AperiodicFinish => write!(f, "AperiodicFinish"),
            EventKind::BackgroundRun => write!(f, "BackgroundRun"),
            EventKind::Idle => write!(f, "Idle"),
            EventKind::DeadlineMiss => write!(f, "DEADLINE_MISS"),
        }
    }
}

// ── Timeline ──────────────────────────────────────────────────────────────────

/// One record of the ordered event log.
///
/// Idle records carry no job or task; `None` is exported as the original's
/// `-1` sentinel, which only exists at the output boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimelineEvent {
    pub time: u64,
    pub job: Option<u32>,
    pub task: Option<u32>,
    pub kind: EventKind,
}

/// Ordered event log produced by one simulation run.
#[derive(Debug, Default, Clone)]
pub struct Timeline {
    events: Vec<TimelineEvent>,
}

impl Timeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, time: u64, job: Option<u32>, task: Option<u32>, kind: EventKind) {
        self.events.push(TimelineEvent {
            time,
            job,
            task,
            kind,
        });
    }

    pub fn events(&self) -> &[TimelineEvent] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn last(&self) -> Option<&TimelineEvent> {
        self.events.last()
    }

    /// Number of records of `kind`.
    pub fn count(&self, kind: EventKind) -> usize {
        self.events.iter().filter(|e| e.kind == kind).count()
    }

    /// Ticks of ordinary execution a job received.
    pub fn running_ticks(&self, job: u32) -> usize {
        self.events
            .iter()
            .filter(|e| e.kind == EventKind::Running && e.job == Some(job))
            .count()
    }

    /// Ticks of server service an aperiodic job received (either flavour).
    pub fn service_ticks(&self, job: u32) -> usize {
        self.events
            .iter()
            .filter(|e| e.kind.is_server_exec() && e.job == Some(job))
            .count()
    }

    /// Finish times of a task's jobs, in record order.
    pub fn finish_times(&self, task: u32) -> Vec<u64> {
        self.events
            .iter()
            .filter(|e| e.kind == EventKind::Finish && e.task == Some(task))
            .map(|e| e.time)
            .collect()
    }

    // ── Export ────────────────────────────────────────────────────────────────

    /// Write the log as tab-separated text.
    ///
    /// Times are divided by [`TICK_SCALE`] to recover the user's resolution.
    /// The `Description` column mirrors the original exporter: `FAILURE` for
    /// a miss, `Server(<policy>)` for server activity, otherwise the task's
    /// class (`Unknown` for idle records, which reference no task).
    pub fn write_tsv<W: Write>(&self, workload: &Workload, out: &mut W) -> io::Result<()> {
        writeln!(out, "Time\tJobID\tTaskID\tDescription\tEvent")?;
        writeln!(out, "{}", "-".repeat(56))?;

        for event in &self.events {
            let time = event.time as f64 / TICK_SCALE as f64;
            let job = event.job.map_or(-1, |j| j as i64);
            let task = event.task.map_or(-1, |t| t as i64);
            let desc = describe(event, workload);
            writeln!(out, "{time}\t{job}\t{task}\t{desc}\t{}", event.kind)?;
        }
        Ok(())
    }
}

/// The `Description` column of one record.
fn describe(event: &TimelineEvent, workload: &Workload) -> String {
    if event.kind == EventKind::DeadlineMiss {
        return "FAILURE".to_string();
    }
    if event.kind.is_server_exec() || event.task == Some(SERVER_TASK_ID) {
        return format!("Server({})", workload.server_policy);
    }
    match event.task.and_then(|id| workload.task_kind(id)) {
        Some(TaskKind::Aperiodic) => "Aperiodic".to_string(),
        Some(_) => "Periodic".to_string(),
        None => "Unknown".to_string(),
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
