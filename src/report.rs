//! Final per-user ranking and its rendered forms.

use std::cmp::Ordering;

use ahash::AHashMap;
use nix::unistd::{Uid, User};
use serde::Serialize;

/// First line of the table output.
pub const RANKING_HEADER: &str = "Rank\tUser\tCPU Time (milliseconds)";

/// One row of the final ranking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RankedUser {
    pub rank: usize,
    pub user: String,
    pub uid: u32,
    /// Accumulated CPU milliseconds, truncated to whole milliseconds.
    pub cpu_ms: u64,
}

/// Orders accumulated totals into the final ranking.
///
/// Users with exactly zero accumulated time are omitted. Rows sort by
/// descending CPU time, ties by ascending uid so repeated runs order equal
/// users identically. Fractional milliseconds are kept throughout accounting
/// and truncated only here.
pub fn build_ranking<F>(totals: &AHashMap<u32, f64>, mut resolve: F) -> Vec<RankedUser>
where
    F: FnMut(u32) -> String,
{
    let mut entries: Vec<(u32, f64)> = totals
        .iter()
        .filter(|(_, ms)| **ms > 0.0)
        .map(|(uid, ms)| (*uid, *ms))
        .collect();

    entries.sort_by(|a, b| {
        b.1.partial_cmp(&a.1)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.0.cmp(&b.0))
    });

    entries
        .into_iter()
        .enumerate()
        .map(|(idx, (uid, ms))| RankedUser {
            rank: idx + 1,
            user: resolve(uid),
            uid,
            cpu_ms: ms as u64,
        })
        .collect()
}

/// Looks up the account name for a uid, falling back to the numeric id when
/// the user database has no entry (deleted accounts, foreign containers).
pub fn resolve_username(uid: u32) -> String {
    match User::from_uid(Uid::from_raw(uid)) {
        Ok(Some(user)) => user.name,
        _ => uid.to_string(),
    }
}

/// Tab-separated table: header line, then `rank<TAB>user<TAB>cpu_ms` rows.
pub fn render_table(ranking: &[RankedUser]) -> String {
    let mut out = String::from(RANKING_HEADER);
    out.push('\n');
    for row in ranking {
        out.push_str(&format!("{}\t{}\t{}\n", row.rank, row.user, row.cpu_ms));
    }
    out
}

/// The same ranking as a JSON array.
pub fn render_json(ranking: &[RankedUser]) -> serde_json::Result<String> {
    serde_json::to_string_pretty(ranking)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn totals(pairs: &[(u32, f64)]) -> AHashMap<u32, f64> {
        pairs.iter().copied().collect()
    }

    fn numeric(uid: u32) -> String {
        uid.to_string()
    }

    #[test]
    fn test_ranking_sorts_descending() {
        let totals = totals(&[(1000, 250.0), (1001, 900.0), (1002, 40.0)]);

        let ranking = build_ranking(&totals, numeric);

        let order: Vec<u32> = ranking.iter().map(|r| r.uid).collect();
        assert_eq!(order, vec![1001, 1000, 1002]);
        let ranks: Vec<usize> = ranking.iter().map(|r| r.rank).collect();
        assert_eq!(ranks, vec![1, 2, 3]);
    }

    #[test]
    fn test_ranking_ties_break_by_ascending_uid() {
        let totals = totals(&[(1002, 500.0), (1000, 500.0), (1001, 700.0)]);

        let ranking = build_ranking(&totals, numeric);

        let order: Vec<u32> = ranking.iter().map(|r| r.uid).collect();
        assert_eq!(order, vec![1001, 1000, 1002]);
    }

    #[test]
    fn test_ranking_omits_zero_totals() {
        let totals = totals(&[(1000, 0.0), (1001, 10.0)]);

        let ranking = build_ranking(&totals, numeric);

        assert_eq!(ranking.len(), 1);
        assert_eq!(ranking[0].uid, 1001);
        assert_eq!(ranking[0].rank, 1);
    }

    #[test]
    fn test_ranking_truncates_fractional_ms() {
        let totals = totals(&[(1000, 1234.9)]);

        let ranking = build_ranking(&totals, numeric);

        assert_eq!(ranking[0].cpu_ms, 1234);
    }

    #[test]
    fn test_render_table_format() {
        let ranking = vec![
            RankedUser {
                rank: 1,
                user: "alice".to_string(),
                uid: 1001,
                cpu_ms: 900,
            },
            RankedUser {
                rank: 2,
                user: "bob".to_string(),
                uid: 1000,
                cpu_ms: 250,
            },
        ];

        let table = render_table(&ranking);

        assert_eq!(
            table,
            "Rank\tUser\tCPU Time (milliseconds)\n1\talice\t900\n2\tbob\t250\n"
        );
    }

    #[test]
    fn test_render_table_empty_is_header_only() {
        let table = render_table(&[]);
        assert_eq!(table, "Rank\tUser\tCPU Time (milliseconds)\n");
    }

    #[test]
    fn test_render_json_shape() {
        let ranking = vec![RankedUser {
            rank: 1,
            user: "alice".to_string(),
            uid: 1001,
            cpu_ms: 900,
        }];

        let json = render_json(&ranking).expect("ranking should serialize");
        let value: serde_json::Value =
            serde_json::from_str(&json).expect("output should be valid JSON");

        assert_eq!(value[0]["rank"], 1);
        assert_eq!(value[0]["user"], "alice");
        assert_eq!(value[0]["uid"], 1001);
        assert_eq!(value[0]["cpu_ms"], 900);
    }

    #[test]
    fn test_resolve_username_root() {
        assert_eq!(resolve_username(0), "root");
    }

    #[test]
    fn test_resolve_username_falls_back_to_numeric() {
        // One below the kernel's invalid uid sentinel; no real system
        // allocates it.
        let uid = u32::MAX - 1;
        assert_eq!(resolve_username(uid), uid.to_string());
    }
}
