/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! rtsim – discrete-event simulator for uniprocessor real-time scheduling.
//!
//! Given a workload of periodic and aperiodic tasks and a priority rule, the
//! engine produces a tick-by-tick timeline of job execution, aperiodic
//! service by a bandwidth-preserving server, background slots, and deadline
//! outcomes.
//!
//! Module layout:
//!
//! ```text
//! lib.rs
//! ├── task.rs        – Task descriptors and mutable Job instances
//! ├── workload/      – line-oriented workload parser (tick scaling ×10)
//! ├── policy/        – priority rules: RM, DM, EDF, LST
//! ├── server/        – aperiodic servers: Polling, Deferrable
//! ├── hyperperiod/   – LCM fold, horizon extension, safety cap
//! ├── engine/        – the tick-loop simulator
//! └── timeline/      – event log, queries, TSV export
//! ```

pub mod engine;
pub mod hyperperiod;
pub mod policy;
pub mod server;
pub mod task;
pub mod timeline;
pub mod workload;

pub use engine::{ServerParams, SimError, SimOutcome, SimReport, Simulator};
pub use policy::PriorityRule;
pub use server::ServerPolicyKind;
pub use task::{Job, Task, TaskKind, SERVER_TASK_ID};
pub use timeline::{EventKind, Timeline, TimelineEvent};
pub use workload::{Workload, TICK_SCALE};
