//! Reading per-process data out of the proc filesystem.

pub mod scanner;
pub mod stat;

pub use scanner::enumerate_pids;
pub use stat::{read_process_stat, read_real_uid, ProcessStat, StatReadError};
