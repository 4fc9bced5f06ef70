//! Simulation-horizon calculation.
//!
//! The horizon is the hyperperiod – the LCM of all periodic task periods,
//! the smallest window after which the periodic schedule repeats – extended
//! in whole hyperperiods when a late aperiodic arrival (plus a margin that
//! lets background service finish it) would otherwise fall outside the
//! simulated window.
//!
//! Both the LCM fold and the extension are clamped at a safety cap so a
//! pathological workload (co-prime periods, huge release times) cannot make
//! the simulation unbounded; a clamped horizon is reported on a warn line.
//! LCM overflow is treated the same way – anything past the cap is the cap.

use tracing::{debug, warn};

use crate::task::Task;
use crate::workload::TICK_SCALE;

/// Upper limit on the simulation horizon, in engine ticks.
pub const HORIZON_CAP: u64 = 10_000;

/// Headroom added past the last aperiodic arrival so background service can
/// complete it: 20 user units at the engine's tick resolution.
pub const BACKGROUND_MARGIN: u64 = 20 * TICK_SCALE as u64;

// ── Math ──────────────────────────────────────────────────────────────────────

/// Iterative Euclidean GCD. Returns the non-zero operand when one is zero.
pub fn gcd(mut a: u64, mut b: u64) -> u64 {
    while b != 0 {
        let t = b;
        b = a % b;
        a = t;
    }
    a
}

/// Checked LCM via the overflow-safe `(a / gcd) * b` form; `None` when the
/// final multiplication would overflow. `lcm(0, _) == Some(0)`.
pub fn lcm(a: u64, b: u64) -> Option<u64> {
    if a == 0 || b == 0 {
        return Some(0);
    }
    (a / gcd(a, b)).checked_mul(b)
}

// ── Horizon ───────────────────────────────────────────────────────────────────

/// Computed simulation horizon.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HorizonInfo {
    /// Total simulated ticks, including any aperiodic extension.
    pub ticks: u64,
    /// The bare hyperperiod (LCM of periods) before extension.
    pub lcm_ticks: u64,
    /// Whether the safety cap truncated the fold or the extension.
    pub capped: bool,
}

/// Compute the horizon for a task set.
///
/// `periodic` should already include the synthetic server task when one is
/// active, so the server period participates in the LCM. With no periodic
/// tasks at all the hyperperiod is 1 and the extension alone sizes the
/// window for aperiodic work.
pub fn horizon(periodic: &[Task], aperiodic: &[Task], margin: u64, cap: u64) -> HorizonInfo {
    let mut lcm_ticks: u64 = 1;
    let mut capped = false;

    for task in periodic.iter().filter(|t| t.period > 0) {
        match lcm(lcm_ticks, task.period) {
            Some(v) if v <= cap => lcm_ticks = v,
            _ => {
                lcm_ticks = cap;
                capped = true;
                break;
            }
        }
    }

    // Latest tick any aperiodic job needs to arrive and drain in background.
    let needed = aperiodic
        .iter()
        .map(|t| t.release_time.saturating_add(t.computation_time).saturating_add(margin))
        .max()
        .unwrap_or(0);

    let mut ticks = lcm_ticks;
    if ticks < needed {
        let step = lcm_ticks;
        while ticks < needed && ticks < cap {
            ticks += step;
        }
        if ticks > cap {
            ticks = cap;
        }
        if ticks == cap && ticks < needed {
            capped = true;
        }
        debug!(lcm_ticks, needed, ticks, "horizon extended for aperiodic arrivals");
    }

    if capped {
        warn!(cap, lcm_ticks, "simulation horizon clamped at safety cap");
    }

    HorizonInfo {
        ticks,
        lcm_ticks,
        capped,
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::TaskKind;

    fn periodic(id: u32, period: u64) -> Task {
        Task::new(id, TaskKind::Periodic, 0, 1, period, period)
    }

    fn aperiodic(id: u32, release: u64, exec: u64) -> Task {
        Task::new(id, TaskKind::Aperiodic, release, exec, 0, 0)
    }

    // ── gcd / lcm ─────────────────────────────────────────────────────────────

    #[test]
    fn gcd_basic_cases() {
        assert_eq!(gcd(12, 8), 4);
        assert_eq!(gcd(7, 3), 1);
        assert_eq!(gcd(0, 5), 5);
        assert_eq!(gcd(5, 0), 5);
    }

    #[test]
    fn lcm_basic_cases() {
        assert_eq!(lcm(4, 6), Some(12));
        assert_eq!(lcm(3, 5), Some(15));
        assert_eq!(lcm(0, 9), Some(0));
    }

    #[test]
    fn lcm_overflow_is_none() {
        let a = u64::MAX / 2 + 1;
        let b = u64::MAX / 2 + 3; // coprime with a
        assert_eq!(lcm(a, b), None);
    }

    // ── horizon ───────────────────────────────────────────────────────────────

    #[test]
    fn horizon_is_lcm_of_periods() {
        let tasks = vec![periodic(1, 40), periodic(2, 60), periodic(3, 80)];
        let h = horizon(&tasks, &[], BACKGROUND_MARGIN, HORIZON_CAP);
        assert_eq!(h.ticks, 240);
        assert_eq!(h.lcm_ticks, 240);
        assert!(!h.capped);
    }

    #[test]
    fn horizon_single_period() {
        let h = horizon(&[periodic(1, 50)], &[], BACKGROUND_MARGIN, HORIZON_CAP);
        assert_eq!(h.ticks, 50);
    }

    #[test]
    fn lcm_fold_clamps_at_the_cap() {
        // 7, 11, 13, 17 → LCM 17017 > 10000
        let tasks = vec![periodic(1, 70), periodic(2, 110), periodic(3, 130), periodic(4, 170)];
        let h = horizon(&tasks, &[], BACKGROUND_MARGIN, HORIZON_CAP);
        assert_eq!(h.ticks, HORIZON_CAP);
        assert!(h.capped);
    }

    #[test]
    fn late_aperiodic_extends_in_whole_hyperperiods() {
        // Hyperperiod 40; aperiodic needs 60 + 10 + margin 200 = 270 → 7 × 40 = 280.
        let h = horizon(&[periodic(1, 40)], &[aperiodic(2, 60, 10)], 200, HORIZON_CAP);
        assert_eq!(h.lcm_ticks, 40);
        assert_eq!(h.ticks, 280);
        assert!(!h.capped);
    }

    #[test]
    fn aperiodic_within_hyperperiod_needs_no_extension() {
        let h = horizon(&[periodic(1, 500)], &[aperiodic(2, 10, 10)], 200, HORIZON_CAP);
        assert_eq!(h.ticks, 500);
    }

    #[test]
    fn aperiodic_only_workload_sizes_from_the_margin() {
        // No periodic tasks: LCM is 1, extension walks up to r + e + margin.
        let h = horizon(&[], &[aperiodic(1, 30, 20)], 200, HORIZON_CAP);
        assert_eq!(h.lcm_ticks, 1);
        assert_eq!(h.ticks, 250);
    }

    #[test]
    fn extension_clamps_at_the_cap() {
        let h = horizon(&[periodic(1, 40)], &[aperiodic(2, 50_000, 10)], 200, HORIZON_CAP);
        assert_eq!(h.ticks, HORIZON_CAP);
        assert!(h.capped);
    }

    #[test]
    fn zero_period_tasks_are_ignored_in_the_fold() {
        let h = horizon(&[periodic(1, 0), periodic(2, 30)], &[], BACKGROUND_MARGIN, HORIZON_CAP);
        assert_eq!(h.ticks, 30);
    }
}
