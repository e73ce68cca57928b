//! Herakles Per-User CPU Accounting Library
//!
//! This library samples a process table at one-second intervals for a bounded
//! window and attributes CPU time to the owning user accounts. It tracks
//! process instances by pid plus start time, so a pid recycled mid-run never
//! inherits its predecessor's counters, and it credits only CPU time spent
//! inside the observation window.
//!
//! # Features
//!
//! - **Instance tracking**: `(pid, start_ticks)` identity across ticks
//! - **Windowed accounting**: pre-existing processes contribute deltas only
//! - **Clamped deltas**: counter anomalies never reduce a user's total
//! - **Deterministic ranking**: descending CPU time, ties by ascending uid
//!
//! # Usage
//!
//! ```rust
//! use herakles_user_cpu::accounting::Accountant;
//! use herakles_user_cpu::report;
//!
//! // 100 Hz clock, monitoring starts at boot: every process is in-window.
//! let accountant = Accountant::new(100, 0.0);
//!
//! // Drive `accountant.scan(proc_root)` once per tick, then rank.
//! let ranking = report::build_ranking(accountant.totals(), |uid| uid.to_string());
//! let table = report::render_table(&ranking);
//! assert_eq!(table, "Rank\tUser\tCPU Time (milliseconds)\n");
//! ```

pub mod accounting;
pub mod cli;
pub mod process;
pub mod report;
pub mod sampler;
pub mod system;

// Re-export main types for convenience
pub use accounting::{Accountant, ProcessKey, ScanError, ScanSummary};
pub use report::{build_ranking, render_json, render_table, RankedUser, RANKING_HEADER};
