//! Per-process CPU counters and ownership from /proc.
//!
//! This module reads the two files the accounting engine needs for each
//! candidate pid: `/proc/<pid>/stat` for the cumulative CPU tick counters
//! and the process start time, and `/proc/<pid>/status` for the real owning
//! uid. A process routinely exits between enumeration and these reads; that
//! case is modeled as [`StatReadError::Vanished`] and callers skip the pid
//! for the tick.

use std::fs;
use std::io;
use std::path::Path;

// Field positions within /proc/<pid>/stat, counted in the tokens after the
// comm field (field 3, "state", lands at index 0). The comm field itself may
// contain spaces and parentheses, so absolute whitespace positions are not
// trustworthy; everything after the last ')' is.
const STAT_UTIME: usize = 11; // field 14
const STAT_STIME: usize = 12; // field 15
const STAT_STARTTIME: usize = 19; // field 22

/// Minimum token count after the comm field for a stat record we accept.
const STAT_MIN_FIELDS: usize = STAT_STARTTIME + 1;

/// CPU counters and start time for one process instance, in raw clock ticks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProcessStat {
    /// Cumulative user-mode CPU ticks.
    pub utime: u64,
    /// Cumulative kernel-mode CPU ticks.
    pub stime: u64,
    /// Process start time in ticks since boot; immutable for the instance.
    pub start_ticks: u64,
}

impl ProcessStat {
    /// Combined user+kernel CPU ticks consumed so far.
    pub fn total_ticks(&self) -> u64 {
        self.utime + self.stime
    }
}

/// Failures reading per-process data.
#[derive(Debug, thiserror::Error)]
pub enum StatReadError {
    /// The process exited between enumeration and the read. Expected during
    /// normal churn; never an error condition for the run.
    #[error("process no longer exists")]
    Vanished,

    #[error("unexpected record layout")]
    Malformed,

    #[error(transparent)]
    Io(io::Error),
}

impl StatReadError {
    fn from_io(err: io::Error) -> Self {
        if err.kind() == io::ErrorKind::NotFound {
            StatReadError::Vanished
        } else {
            StatReadError::Io(err)
        }
    }
}

/// Parses one line of `/proc/<pid>/stat`.
///
/// The comm field is free text chosen by the process (field 2, wrapped in
/// parentheses) and may itself contain parentheses and whitespace, e.g.
/// `123 (tmux: server (v3)) S ...`. The fields the engine needs are taken as
/// fixed-position tokens after the last `)` in the record.
pub fn parse_stat_line(line: &str) -> Result<ProcessStat, StatReadError> {
    let after_comm = line
        .rfind(')')
        .map(|idx| &line[idx + 1..])
        .ok_or(StatReadError::Malformed)?;

    let fields: Vec<&str> = after_comm.split_whitespace().collect();
    if fields.len() < STAT_MIN_FIELDS {
        return Err(StatReadError::Malformed);
    }

    let utime = fields[STAT_UTIME]
        .parse::<u64>()
        .map_err(|_| StatReadError::Malformed)?;
    let stime = fields[STAT_STIME]
        .parse::<u64>()
        .map_err(|_| StatReadError::Malformed)?;
    let start_ticks = fields[STAT_STARTTIME]
        .parse::<u64>()
        .map_err(|_| StatReadError::Malformed)?;

    Ok(ProcessStat {
        utime,
        stime,
        start_ticks,
    })
}

/// Reads and parses `<proc_root>/<pid>/stat`.
pub fn read_process_stat(proc_root: &Path, pid: u32) -> Result<ProcessStat, StatReadError> {
    let path = proc_root.join(pid.to_string()).join("stat");
    let content = fs::read_to_string(&path).map_err(StatReadError::from_io)?;
    parse_stat_line(content.trim_end())
}

/// Reads the real (not effective) uid from `<proc_root>/<pid>/status`.
///
/// The `Uid:` line carries four values (real, effective, saved, filesystem);
/// accounting attributes CPU time to the real uid.
pub fn read_real_uid(proc_root: &Path, pid: u32) -> Result<u32, StatReadError> {
    let path = proc_root.join(pid.to_string()).join("status");
    let content = fs::read_to_string(&path).map_err(StatReadError::from_io)?;

    for line in content.lines() {
        if let Some(rest) = line.strip_prefix("Uid:") {
            return rest
                .split_whitespace()
                .next()
                .and_then(|tok| tok.parse::<u32>().ok())
                .ok_or(StatReadError::Malformed);
        }
    }
    Err(StatReadError::Malformed)
}
