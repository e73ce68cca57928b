//! Per-user CPU accounting across sampling ticks.
//!
//! The [`Accountant`] owns the two tables that make up the run's state: the
//! tracked-process table, keyed by [`ProcessKey`] so that a recycled pid is
//! never mistaken for the process that previously held it, and the per-uid
//! totals table. One [`Accountant::scan`] call performs a full tick of
//! bookkeeping: enumerate, read, match, credit, prune.

use std::io;
use std::path::{Path, PathBuf};

use ahash::AHashMap;
use tracing::trace;

use crate::process;

/// Identity of one process instance.
///
/// The kernel reuses pid numbers; the start time (ticks since boot, fixed for
/// the instance's whole life) disambiguates. Two observations with the same
/// pid but different `start_ticks` are different processes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ProcessKey {
    pub pid: u32,
    pub start_ticks: u64,
}

/// Accounting state for one tracked instance.
#[derive(Debug)]
struct TrackedProcess {
    /// Cumulative CPU ticks at the last tick this instance was seen.
    last_cpu_ticks: u64,
    /// Reset at the start of every scan; entries still false at the end of
    /// the scan belong to processes that exited and are pruned.
    seen_this_tick: bool,
}

/// Counters describing one completed scan, logged per tick.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ScanSummary {
    /// Processes successfully read this tick.
    pub processes_seen: usize,
    /// Instances observed for the first time this tick.
    pub new_instances: usize,
    /// Tracked instances that disappeared and were dropped this tick.
    pub reaped: usize,
    /// Milliseconds added to user totals this tick.
    pub credited_ms: f64,
}

/// The process-table root could not be opened, so the whole tick is unusable.
/// Accumulated totals are untouched; the caller skips the tick and retries on
/// the next one.
#[derive(Debug, thiserror::Error)]
#[error("cannot read process table at {}: {source}", path.display())]
pub struct ScanError {
    pub path: PathBuf,
    #[source]
    pub source: io::Error,
}

/// Owns tracked-process state and per-user totals for one monitoring run.
pub struct Accountant {
    clk_tck: u64,
    /// Host uptime (seconds) when monitoring began. Processes started before
    /// this point contribute only CPU time consumed during the window.
    monitor_start_uptime: f64,
    tracked: AHashMap<ProcessKey, TrackedProcess>,
    totals: AHashMap<u32, f64>,
}

impl Accountant {
    pub fn new(clk_tck: u64, monitor_start_uptime: f64) -> Self {
        Self {
            clk_tck,
            monitor_start_uptime,
            tracked: AHashMap::new(),
            totals: AHashMap::new(),
        }
    }

    /// Runs one tick of bookkeeping against the process table.
    ///
    /// Matched instances are credited the non-negative increase in their
    /// cumulative CPU ticks since the previous tick. Instances observed for
    /// the first time are seeded: if the process predates
    /// `monitor_start_uptime` its prior CPU time is ignored, otherwise its
    /// entire accumulated time falls inside the window and is credited in
    /// full. Tracked instances absent from this tick's enumeration are
    /// dropped, keeping whatever they already contributed to the totals.
    pub fn scan(&mut self, proc_root: &Path) -> Result<ScanSummary, ScanError> {
        for entry in self.tracked.values_mut() {
            entry.seen_this_tick = false;
        }

        let pids = process::enumerate_pids(proc_root).map_err(|source| ScanError {
            path: proc_root.to_path_buf(),
            source,
        })?;

        let mut summary = ScanSummary::default();

        for pid in pids {
            let stat = match process::read_process_stat(proc_root, pid) {
                Ok(stat) => stat,
                Err(err) => {
                    trace!(pid, error = %err, "skipping process stat");
                    continue;
                }
            };
            let uid = match process::read_real_uid(proc_root, pid) {
                Ok(uid) => uid,
                Err(err) => {
                    trace!(pid, error = %err, "skipping process uid");
                    continue;
                }
            };

            summary.processes_seen += 1;
            let total_ticks = stat.total_ticks();
            let key = ProcessKey {
                pid,
                start_ticks: stat.start_ticks,
            };

            let credited_ticks = match self.tracked.get_mut(&key) {
                Some(tracked) => {
                    // Clamp: a counter anomaly must never subtract from a
                    // user's total.
                    let delta = total_ticks.saturating_sub(tracked.last_cpu_ticks);
                    tracked.last_cpu_ticks = total_ticks;
                    tracked.seen_this_tick = true;
                    delta
                }
                None => {
                    summary.new_instances += 1;
                    self.tracked.insert(
                        key,
                        TrackedProcess {
                            last_cpu_ticks: total_ticks,
                            seen_this_tick: true,
                        },
                    );
                    if self.started_before_monitor(stat.start_ticks) {
                        0
                    } else {
                        total_ticks
                    }
                }
            };

            let credited_ms = self.ticks_to_ms(credited_ticks);
            *self.totals.entry(uid).or_insert(0.0) += credited_ms;
            summary.credited_ms += credited_ms;
        }

        let before = self.tracked.len();
        self.tracked.retain(|_, entry| entry.seen_this_tick);
        summary.reaped = before - self.tracked.len();

        Ok(summary)
    }

    /// Per-uid accumulated CPU milliseconds so far.
    pub fn totals(&self) -> &AHashMap<u32, f64> {
        &self.totals
    }

    /// Number of instances currently tracked.
    pub fn tracked_count(&self) -> usize {
        self.tracked.len()
    }

    fn ticks_to_ms(&self, ticks: u64) -> f64 {
        ticks as f64 * 1000.0 / self.clk_tck as f64
    }

    fn started_before_monitor(&self, start_ticks: u64) -> bool {
        (start_ticks as f64 / self.clk_tck as f64) < self.monitor_start_uptime
    }
}
