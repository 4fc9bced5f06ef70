/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Structured error type for simulator construction.
//!
//! A deadline miss is deliberately **not** here: it is a reported outcome
//! of a successful run ([`SimOutcome`]), not a failure of the simulator.
//!
//! [`SimOutcome`]: super::SimOutcome

use thiserror::Error;

/// Errors returned by [`Simulator`](super::Simulator) construction.
#[derive(Debug, Error)]
pub enum SimError {
    /// Both the periodic and the aperiodic task lists are empty.
    #[error("no tasks provided — workload is empty")]
    NoTasks,

    /// A server policy is active but the server parameters are degenerate.
    #[error("server capacity and period must be positive (got capacity={capacity}, period={period})")]
    InvalidServerParams { capacity: u64, period: u64 },
}
