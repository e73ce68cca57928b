//! Host-wide constants and readings from the /proc filesystem.
//!
//! The accounting engine needs two facts about the host before the first
//! scan: the kernel's clock-tick rate (to convert CPU ticks to wall time)
//! and the current uptime (to decide whether an observed process predates
//! the monitoring window). Both are resolved once at startup; failure of
//! either is fatal before the sampling loop begins.

use std::fs;
use std::path::{Path, PathBuf};

/// Startup-time failures resolving host constants.
#[derive(Debug, thiserror::Error)]
pub enum SystemError {
    #[error("sysconf(_SC_CLK_TCK) returned no usable value")]
    ClockTicksUnavailable,

    #[error("failed to read {}: {source}", path.display())]
    UptimeUnreadable {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("malformed uptime data in {}", path.display())]
    UptimeMalformed { path: PathBuf },
}

/// Queries the system clock ticks per second (usually 100, but can vary).
pub fn clock_ticks_per_second() -> Result<u64, SystemError> {
    // SAFETY: sysconf is safe to call with _SC_CLK_TCK
    // Returns -1 on error, 0 if undefined - both are handled by the > 0 check
    let tck = unsafe { libc::sysconf(libc::_SC_CLK_TCK) };
    if tck > 0 {
        Ok(tck as u64)
    } else {
        Err(SystemError::ClockTicksUnavailable)
    }
}

/// Reads host uptime in seconds from `<proc_root>/uptime`.
///
/// Format: "<uptime_seconds> <idle_seconds>"
pub fn read_uptime_seconds(proc_root: &Path) -> Result<f64, SystemError> {
    let path = proc_root.join("uptime");
    let content = fs::read_to_string(&path).map_err(|source| SystemError::UptimeUnreadable {
        path: path.clone(),
        source,
    })?;

    content
        .split_whitespace()
        .next()
        .and_then(|field| field.parse::<f64>().ok())
        .ok_or(SystemError::UptimeMalformed { path })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_clock_ticks_per_second() {
        // Every Linux host reports a positive tick rate; 100 is the common
        // value but anything positive is acceptable here.
        let tck = clock_ticks_per_second().expect("clk_tck should resolve");
        assert!(tck > 0);
    }

    #[test]
    fn test_read_uptime_seconds() {
        let dir = tempdir().expect("Failed to create temp dir");
        std::fs::write(dir.path().join("uptime"), "12345.67 98765.43\n")
            .expect("Failed to write uptime file");

        let uptime = read_uptime_seconds(dir.path()).expect("uptime should parse");
        assert!((uptime - 12345.67).abs() < 0.001);
    }

    #[test]
    fn test_read_uptime_seconds_missing_file() {
        let dir = tempdir().expect("Failed to create temp dir");

        let result = read_uptime_seconds(dir.path());
        assert!(matches!(result, Err(SystemError::UptimeUnreadable { .. })));
    }

    #[test]
    fn test_read_uptime_seconds_malformed() {
        let dir = tempdir().expect("Failed to create temp dir");
        std::fs::write(dir.path().join("uptime"), "not-a-number\n")
            .expect("Failed to write uptime file");

        let result = read_uptime_seconds(dir.path());
        assert!(matches!(result, Err(SystemError::UptimeMalformed { .. })));
    }

    #[test]
    fn test_read_uptime_seconds_empty() {
        let dir = tempdir().expect("Failed to create temp dir");
        std::fs::write(dir.path().join("uptime"), "").expect("Failed to write uptime file");

        let result = read_uptime_seconds(dir.path());
        assert!(matches!(result, Err(SystemError::UptimeMalformed { .. })));
    }
}
