//! Bounded sampling loop and shutdown signaling.

use std::io;
use std::path::Path;
use std::time::Duration;

use tokio::signal::unix::{signal, SignalKind};
use tokio::sync::watch;
use tokio::time;
use tracing::{debug, info, warn};

use crate::accounting::Accountant;

/// Spacing between samples.
pub const TICK_INTERVAL: Duration = Duration::from_secs(1);

/// Installs SIGINT and SIGTERM handlers and returns the stop-request channel.
///
/// Installation happens synchronously so that a failure surfaces as a
/// startup error. The spawned listener forwards the first signal as a stop
/// request; the loop keeps running until the tick in progress has finished
/// its bookkeeping.
pub fn spawn_shutdown_listener() -> io::Result<watch::Receiver<bool>> {
    let mut interrupt = signal(SignalKind::interrupt())?;
    let mut terminate = signal(SignalKind::terminate())?;
    let (tx, rx) = watch::channel(false);

    tokio::spawn(async move {
        tokio::select! {
            _ = interrupt.recv() => info!("interrupt received, finishing current tick"),
            _ = terminate.recv() => info!("termination requested, finishing current tick"),
        }
        let _ = tx.send(true);
        // Keep the sender alive for the rest of the run; a closed channel
        // would wake every receiver permanently.
        tx.closed().await;
    });

    Ok(rx)
}

/// Samples the process table at every whole-second boundary of the window:
/// `duration_secs + 1` ticks including both ends, sleeping between ticks but
/// not after the last.
///
/// A tick whose scan fails is logged and skipped; accumulated totals carry
/// over to the next tick. A stop request is honored at the next tick
/// boundary, so partial results remain complete and reportable.
pub async fn run(
    accountant: &mut Accountant,
    proc_root: &Path,
    duration_secs: u64,
    mut shutdown: watch::Receiver<bool>,
) {
    for tick in 0..=duration_secs {
        if *shutdown.borrow() {
            info!(tick, "stop requested, ending observation early");
            break;
        }

        match accountant.scan(proc_root) {
            Ok(summary) => debug!(
                tick,
                processes = summary.processes_seen,
                new_instances = summary.new_instances,
                reaped = summary.reaped,
                credited_ms = summary.credited_ms,
                tracked = accountant.tracked_count(),
                "tick complete"
            ),
            Err(err) => warn!(tick, error = %err, "tick skipped"),
        }

        if tick < duration_secs {
            tokio::select! {
                _ = time::sleep(TICK_INTERVAL) => {}
                _ = shutdown.changed() => {}
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test(start_paused = true)]
    async fn test_run_completes_with_empty_process_table() {
        let proc = tempdir().expect("Failed to create temp dir");
        let mut acct = Accountant::new(100, 0.0);
        let (_tx, rx) = watch::channel(false);

        run(&mut acct, proc.path(), 3, rx).await;

        assert_eq!(acct.tracked_count(), 0);
        assert!(acct.totals().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_skips_ticks_when_root_missing() {
        let proc = tempdir().expect("Failed to create temp dir");
        let missing = proc.path().join("no_such_root");
        let mut acct = Accountant::new(100, 0.0);
        let (_tx, rx) = watch::channel(false);

        // Every tick fails to open the root; the loop must still terminate
        // normally with empty state.
        run(&mut acct, &missing, 2, rx).await;

        assert!(acct.totals().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_honors_prior_stop_request() {
        let proc = tempdir().expect("Failed to create temp dir");
        let pid_dir = proc.path().join("321");
        std::fs::create_dir(&pid_dir).expect("Failed to create pid dir");
        std::fs::write(
            pid_dir.join("stat"),
            "321 (busy) R 1 321 321 0 -1 4194304 0 0 0 0 500 0 0 0 20 0 1 0 10 0 0 0 0 0 0 0 0 0 0 0 0 0 17 1 0 0 0 0 0\n",
        )
        .expect("Failed to write stat file");
        std::fs::write(pid_dir.join("status"), "Uid:\t1000\t1000\t1000\t1000\n")
            .expect("Failed to write status file");

        let mut acct = Accountant::new(100, 0.0);
        let (tx, rx) = watch::channel(false);
        tx.send(true).expect("receiver should be alive");

        // Stop already requested: no tick runs, nothing is credited.
        run(&mut acct, proc.path(), 5, rx).await;

        assert!(acct.totals().is_empty());
    }

    #[tokio::test]
    async fn test_spawn_shutdown_listener_installs() {
        let rx = spawn_shutdown_listener().expect("handlers should install");
        assert!(!*rx.borrow());
    }
}
