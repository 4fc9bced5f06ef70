//! Workload loading and parsing.
//!
//! The input is line-oriented text. Blank lines and `#` comments are
//! ignored; every other line starts with a type tag followed by
//! whitespace-separated numbers, optionally with a trailing server-policy
//! word on aperiodic lines:
//!
//! ```text
//! # tag  fields                        meaning
//! P      e p | r e p | r e p d         periodic (d defaults to p, r to 0)
//! D      e p | e p d | r e p d         sporadic / deadline-constrained
//! A      r e [Poller|Deferrable]       aperiodic, optional global policy
//! ```
//!
//! Numbers may be fractional: every field is multiplied by [`TICK_SCALE`]
//! and rounded, so the engine downstream operates on integer ticks only.
//! Lines with an unknown tag or too few fields are skipped (logged at debug
//! level), matching the tolerant behaviour of the original reader.

use std::path::Path;

use anyhow::{Context, Result};
use tracing::{debug, info};

use crate::server::ServerPolicyKind;
use crate::task::{Task, TaskKind};

/// Scale factor applied to every parsed field.
///
/// One user time unit is `TICK_SCALE` engine ticks, which lets users write
/// fractional execution times while the tick loop stays strictly integer.
pub const TICK_SCALE: u32 = 10;

// ── Workload ──────────────────────────────────────────────────────────────────

/// A parsed workload: task lists plus the global aperiodic-service policy.
///
/// Sporadic tasks live in `periodic` – they are scheduled identically. The
/// server policy is global: the last `Poller`/`Deferrable` word seen wins
/// and applies to all aperiodic work; with no tag at all, aperiodic jobs
/// are served purely in the background.
#[derive(Debug, Clone)]
pub struct Workload {
    pub periodic: Vec<Task>,
    pub aperiodic: Vec<Task>,
    pub server_policy: ServerPolicyKind,
}

impl Workload {
    /// Read and parse a workload file.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read; the parse itself never
    /// fails (bad lines are skipped).
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("cannot open workload file: {}", path.display()))?;
        let workload = Self::parse_str(&content);
        info!(
            periodic = workload.periodic.len(),
            aperiodic = workload.aperiodic.len(),
            policy = %workload.server_policy,
            "loaded workload from {}",
            path.display()
        );
        Ok(workload)
    }

    /// Parse workload text. Infallible: malformed lines are dropped.
    pub fn parse_str(input: &str) -> Self {
        let mut periodic = Vec::new();
        let mut aperiodic = Vec::new();
        // Default set once, before any line is read. A tagless A line keeps
        // the last known policy rather than resetting it.
        let mut server_policy = ServerPolicyKind::Background;
        let mut next_id: u32 = 1;

        for (idx, raw) in input.lines().enumerate() {
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let mut tokens = line.split_whitespace();
            let tag = tokens.next().unwrap_or_default();
            let kind = match tag {
                "P" => TaskKind::Periodic,
                "D" => TaskKind::Sporadic,
                "A" => TaskKind::Aperiodic,
                other => {
                    debug!(line = idx + 1, tag = other, "skipping line with unknown tag");
                    continue;
                }
            };

            // Leading numeric fields, then whatever trails them (the policy
            // word on A lines).
            let mut numbers: Vec<u64> = Vec::new();
            let mut trailing: Vec<&str> = Vec::new();
            for tok in tokens {
                if trailing.is_empty() {
                    if let Ok(v) = tok.parse::<f64>() {
                        if v.is_finite() && v >= 0.0 {
                            numbers.push(scale_to_ticks(v));
                            continue;
                        }
                    }
                }
                trailing.push(tok);
            }

            if kind == TaskKind::Aperiodic {
                // Substring match so decorated forms like "(Poller)" work.
                let rest = trailing.join(" ");
                if rest.contains("Poller") {
                    server_policy = ServerPolicyKind::Poller;
                } else if rest.contains("Deferrable") {
                    server_policy = ServerPolicyKind::Deferrable;
                }
            }

            let Some((r, e, p, d)) = map_fields(kind, &numbers) else {
                debug!(line = idx + 1, tag, fields = numbers.len(), "skipping short line");
                continue;
            };

            if e == 0 {
                debug!(line = idx + 1, "skipping task with zero computation time");
                continue;
            }
            if kind != TaskKind::Aperiodic && (p == 0 || d == 0) {
                debug!(line = idx + 1, "skipping task with zero period or deadline");
                continue;
            }

            let task = Task::new(next_id, kind, r, e, p, d);
            next_id += 1;
            if kind == TaskKind::Aperiodic {
                aperiodic.push(task);
            } else {
                periodic.push(task);
            }
        }

        Self {
            periodic,
            aperiodic,
            server_policy,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.periodic.is_empty() && self.aperiodic.is_empty()
    }

    /// Look up the kind of a task by id, across both lists.
    pub fn task_kind(&self, id: u32) -> Option<TaskKind> {
        self.periodic
            .iter()
            .chain(self.aperiodic.iter())
            .find(|t| t.id == id)
            .map(|t| t.kind)
    }
}

/// Map the numeric fields of a line onto `(r, e, p, d)`.
///
/// The sporadic 3-number form is `(e, p, d)` – an explicit deadline is what
/// distinguishes the `D` tag. Returns `None` when too few fields remain.
fn map_fields(kind: TaskKind, n: &[u64]) -> Option<(u64, u64, u64, u64)> {
    match kind {
        TaskKind::Aperiodic => match n {
            [r, e, ..] => Some((*r, *e, 0, 0)),
            _ => None,
        },
        TaskKind::Periodic => match n {
            [e, p] => Some((0, *e, *p, *p)),
            [r, e, p] => Some((*r, *e, *p, *p)),
            [r, e, p, d, ..] => Some((*r, *e, *p, *d)),
            _ => None,
        },
        TaskKind::Sporadic => match n {
            [e, p] => Some((0, *e, *p, *p)),
            [e, p, d] => Some((0, *e, *p, *d)),
            [r, e, p, d, ..] => Some((*r, *e, *p, *d)),
            _ => None,
        },
    }
}

fn scale_to_ticks(v: f64) -> u64 {
    (v * TICK_SCALE as f64).round() as u64
}

// ── Tests ─────────────────────────────────────────────────────────────────────
