//! The tick-loop simulation engine.
//!
//! [`Simulator`] drives an integer clock over one hyperperiod and records
//! everything that happens into a [`Timeline`]. Per tick, in fixed order:
//!
//! 1. stale server jobs are cleaned up (expiry is silent, never a miss),
//! 2. periodic and sporadic jobs arrive, then aperiodic jobs,
//! 3. the priority rule orders the ready queue,
//! 4. a server job at the head is intercepted by the server policy,
//! 5. the selected job executes one tick (or the head aperiodic runs in
//!    background when nothing is ready, or the tick is idle),
//! 6. any non-server job past its deadline aborts the run.
//!
//! The engine is single-threaded and fully deterministic: every sort
//! carries a job-id tie-break, and the per-tick step order above is fixed.
//! Jobs are owned by exactly one queue; completion, server expiry, and
//! engine teardown are the only destruction points.

pub mod error;

pub use error::SimError;

use std::collections::VecDeque;

use tracing::{debug, info, warn};

use crate::hyperperiod::{self, HorizonInfo, BACKGROUND_MARGIN, HORIZON_CAP};
use crate::policy::PriorityRule;
use crate::server::{self, ServerDecision, ServerPolicyKind};
use crate::task::{Job, Task};
use crate::timeline::{EventKind, Timeline};
use crate::workload::{Workload, TICK_SCALE};

// ── Server parameters ─────────────────────────────────────────────────────────

/// Capacity and period of the synthetic server task, in engine ticks.
///
/// The defaults are 2 and 5 user units at tick resolution. Tests running at
/// native (unscaled) resolution pass their own values through
/// [`Simulator::with_server_params`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServerParams {
    pub capacity: u64,
    pub period: u64,
}

impl Default for ServerParams {
    fn default() -> Self {
        Self {
            capacity: 2 * TICK_SCALE as u64,
            period: 5 * TICK_SCALE as u64,
        }
    }
}

// ── Run outcome ───────────────────────────────────────────────────────────────

/// How a simulation run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimOutcome {
    /// The clock reached the horizon with every deadline met.
    Completed,
    /// A non-server job was still pending past its absolute deadline.
    /// `time` is the tick boundary at which the miss was detected.
    DeadlineMiss { time: u64, job: u32, task: u32 },
}

/// The result of one run: the full event log plus the outcome.
#[derive(Debug)]
pub struct SimReport {
    pub timeline: Timeline,
    pub outcome: SimOutcome,
    pub horizon: HorizonInfo,
}

impl SimReport {
    pub fn missed_deadline(&self) -> bool {
        matches!(self.outcome, SimOutcome::DeadlineMiss { .. })
    }
}

// ── Simulator ─────────────────────────────────────────────────────────────────

/// The uniprocessor scheduling simulator.
///
/// Owns every live job for the duration of the run; `run()` consumes the
/// simulator, so teardown is ordinary drop of the queues.
#[derive(Debug)]
pub struct Simulator {
    rule: PriorityRule,
    server_policy: ServerPolicyKind,
    /// Periodic and sporadic descriptors, including the synthetic server
    /// task when a server policy is active.
    periodic: Vec<Task>,
    aperiodic_tasks: Vec<Task>,
    horizon: HorizonInfo,
    ready: Vec<Job>,
    aperiodic: VecDeque<Job>,
    timeline: Timeline,
    next_job_id: u32,
}

impl Simulator {
    /// Build a simulator with the default server parameters.
    pub fn new(workload: &Workload, rule: PriorityRule) -> Result<Self, SimError> {
        Self::with_server_params(workload, rule, ServerParams::default())
    }

    /// Build a simulator with explicit server capacity and period.
    ///
    /// # Errors
    /// [`SimError::NoTasks`] for an empty workload;
    /// [`SimError::InvalidServerParams`] when a server policy is active with
    /// a zero capacity or period.
    pub fn with_server_params(
        workload: &Workload,
        rule: PriorityRule,
        params: ServerParams,
    ) -> Result<Self, SimError> {
        if workload.is_empty() {
            return Err(SimError::NoTasks);
        }

        let server_policy = workload.server_policy;
        let mut periodic = workload.periodic.clone();
        if server_policy.is_active() {
            if params.capacity == 0 || params.period == 0 {
                return Err(SimError::InvalidServerParams {
                    capacity: params.capacity,
                    period: params.period,
                });
            }
            periodic.push(Task::server(params.capacity, params.period));
        }

        let horizon =
            hyperperiod::horizon(&periodic, &workload.aperiodic, BACKGROUND_MARGIN, HORIZON_CAP);

        Ok(Self {
            rule,
            server_policy,
            periodic,
            aperiodic_tasks: workload.aperiodic.clone(),
            horizon,
            ready: Vec::new(),
            aperiodic: VecDeque::new(),
            timeline: Timeline::new(),
            next_job_id: 1,
        })
    }

    pub fn horizon(&self) -> &HorizonInfo {
        &self.horizon
    }

    // ── Run loop ──────────────────────────────────────────────────────────────

    /// Run the simulation to the horizon or the first deadline miss.
    pub fn run(mut self) -> SimReport {
        info!(
            horizon = self.horizon.ticks,
            rule = %self.rule,
            policy = %self.server_policy,
            "starting simulation"
        );

        for t in 0..self.horizon.ticks {
            self.cleanup_stale_server_jobs(t);
            self.release_periodic(t);
            self.release_aperiodic(t);

            self.rule.order(&mut self.ready, t);

            // Selection: index into the ordered ready queue, resolved after
            // any server interception.
            let mut serviced = false;
            let mut selected: Option<usize> = None;

            if !self.ready.is_empty() {
                if self.ready[0].is_server() && self.server_policy.is_active() {
                    match server::run_server_tick(
                        self.server_policy,
                        &mut self.ready[0],
                        &mut self.aperiodic,
                        &mut self.timeline,
                        t,
                    ) {
                        ServerDecision::Serviced => {
                            if self.ready[0].is_complete() {
                                self.ready.remove(0);
                            }
                            serviced = true;
                        }
                        ServerDecision::Yielded => match self.server_policy {
                            ServerPolicyKind::Poller => {
                                // Budget already forfeited; drop the server
                                // job and re-select from the new head.
                                self.ready.remove(0);
                                if !self.ready.is_empty() {
                                    selected = Some(0);
                                }
                            }
                            ServerPolicyKind::Deferrable => {
                                // Budget preserved; the next-ranked job gets
                                // this tick.
                                if self.ready.len() > 1 {
                                    selected = Some(1);
                                }
                            }
                            ServerPolicyKind::Background => {}
                        },
                    }
                } else {
                    selected = Some(0);
                }
            }

            if !serviced {
                if let Some(idx) = selected {
                    self.execute(idx, t);
                } else if self.ready.is_empty() && !self.aperiodic.is_empty() {
                    self.background(t);
                } else {
                    self.timeline.record(t, None, None, EventKind::Idle);
                }
            }

            if let Some((time, job, task)) = self.check_deadlines(t) {
                warn!(time, job, task, "deadline miss — aborting simulation");
                self.timeline.record(time, Some(job), Some(task), EventKind::DeadlineMiss);
                return SimReport {
                    timeline: self.timeline,
                    outcome: SimOutcome::DeadlineMiss { time, job, task },
                    horizon: self.horizon,
                };
            }
        }

        info!(events = self.timeline.len(), "simulation complete");
        SimReport {
            timeline: self.timeline,
            outcome: SimOutcome::Completed,
            horizon: self.horizon,
        }
    }

    // ── Per-tick steps ────────────────────────────────────────────────────────

    /// Remove server jobs at or past their deadline. Runs before arrivals so
    /// a preserved Deferrable budget never survives its period boundary and
    /// never masks the replenishing arrival.
    fn cleanup_stale_server_jobs(&mut self, t: u64) {
        self.ready.retain(|job| {
            let stale = job.is_server() && job.absolute_deadline <= t;
            if stale {
                debug!(time = t, job = job.id, "removing expired server job");
            }
            !stale
        });
    }

    fn release_periodic(&mut self, t: u64) {
        for task in &self.periodic {
            if t >= task.release_time && (t - task.release_time) % task.period == 0 {
                let job = Job::new(self.next_job_id, *task, t);
                self.next_job_id += 1;
                self.ready.push(job);
            }
        }
    }

    fn release_aperiodic(&mut self, t: u64) {
        for task in &self.aperiodic_tasks {
            if task.release_time == t {
                let job = Job::new(self.next_job_id, *task, t);
                self.next_job_id += 1;
                self.timeline
                    .record(t, Some(job.id), Some(task.id), EventKind::AperiodicArrival);
                self.aperiodic.push_back(job);
            }
        }
    }

    /// Execute one tick of the ready job at `idx`.
    fn execute(&mut self, idx: usize, t: u64) {
        let (job_id, task_id, finished) = {
            let job = &mut self.ready[idx];
            if job.start_time.is_none() {
                job.start_time = Some(t);
            }
            job.remaining -= 1;
            if job.remaining == 0 {
                job.finish_time = Some(t + 1);
            }
            (job.id, job.task.id, job.remaining == 0)
        };

        self.timeline.record(t, Some(job_id), Some(task_id), EventKind::Running);
        if finished {
            self.timeline
                .record(t + 1, Some(job_id), Some(task_id), EventKind::Finish);
            self.ready.remove(idx);
        }
    }

    /// One tick of background service for the head aperiodic job.
    fn background(&mut self, t: u64) {
        let Some(job) = self.aperiodic.front_mut() else {
            return;
        };
        self.timeline
            .record(t, Some(job.id), Some(job.task.id), EventKind::BackgroundRun);
        job.remaining -= 1;
        if job.is_complete() {
            self.aperiodic.pop_front();
        }
    }

    /// Scan the ready queue for a missed deadline at the end of tick `t`,
    /// returning `(time, job, task)` for the first one found.
    ///
    /// Server jobs are exempt – an expired server job is a cleanup case for
    /// the next tick, never a miss.
    fn check_deadlines(&self, t: u64) -> Option<(u64, u32, u32)> {
        self.ready
            .iter()
            .find(|job| !job.is_server() && t + 1 > job.absolute_deadline)
            .map(|job| (t + 1, job.id, job.task.id))
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
