//! Process enumeration from the proc filesystem.

use std::io;
use std::path::Path;

/// Lists the pids currently visible under `proc_root`.
///
/// A directory entry counts as a process if its name is all ASCII digits and
/// it is a directory; everything else under /proc (`uptime`, `meminfo`,
/// `self`, ...) is skipped. Entries that fail to stat are skipped rather
/// than failing the scan, since processes exit while we iterate. Failure to
/// open `proc_root` itself is the caller's to handle: the whole tick is
/// unusable without it.
pub fn enumerate_pids(proc_root: &Path) -> io::Result<Vec<u32>> {
    let mut pids = Vec::new();

    for entry in proc_root.read_dir()?.flatten() {
        let name = entry.file_name();
        let Some(name) = name.to_str() else {
            continue;
        };
        if name.is_empty() || !name.bytes().all(|b| b.is_ascii_digit()) {
            continue;
        }
        match entry.file_type() {
            Ok(ft) if ft.is_dir() => {}
            _ => continue,
        }
        if let Ok(pid) = name.parse::<u32>() {
            pids.push(pid);
        }
    }

    Ok(pids)
}
