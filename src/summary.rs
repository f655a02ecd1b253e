//! Per-(domain, planner) statistics over a results table.
//!
//! [`summarize`] groups rows in first-seen order; [`write_summary`] persists
//! the groups as `summary.csv` and [`display_summary`] prints them as an
//! aligned table.

use crate::errors::HarnessError;
use crate::model::ExperimentTable;
use crate::planner::PlannerKind;
use crate::store::{MISSING, atomic_write, escape_field};
use std::path::Path;

/// Column order of `summary.csv`.
pub const SUMMARY_HEADER: [&str; 8] = [
    "domain",
    "planner",
    "n_runs",
    "success_rate",
    "mean_time",
    "median_time",
    "mean_plan_len",
    "median_plan_len",
];

/// Aggregate statistics for one (domain, planner) group.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupSummary {
    pub domain: String,
    pub planner: PlannerKind,
    pub n_runs: usize,
    /// Fraction of successful runs, 0.0 to 1.0
    pub success_rate: f64,
    pub mean_time: f64,
    pub median_time: f64,
    /// Over successful runs only; `None` when no run produced a plan
    pub mean_plan_len: Option<f64>,
    pub median_plan_len: Option<f64>,
}

/// Group `table` by (domain, planner), keeping first-seen order.
pub fn summarize(table: &ExperimentTable) -> Vec<GroupSummary> {
    let mut keys: Vec<(String, PlannerKind)> = Vec::new();
    let mut times: Vec<Vec<f64>> = Vec::new();
    let mut lens: Vec<Vec<f64>> = Vec::new();
    let mut successes: Vec<usize> = Vec::new();

    for row in table {
        let idx = match keys
            .iter()
            .position(|(d, p)| *d == row.domain && *p == row.planner)
        {
            Some(idx) => idx,
            None => {
                keys.push((row.domain.clone(), row.planner));
                times.push(Vec::new());
                lens.push(Vec::new());
                successes.push(0);
                keys.len() - 1
            }
        };
        times[idx].push(row.time_s);
        if row.success {
            successes[idx] += 1;
        }
        if let Some(len) = row.plan_len {
            lens[idx].push(f64::from(len));
        }
    }

    keys.into_iter()
        .enumerate()
        .map(|(idx, (domain, planner))| {
            let n_runs = times[idx].len();
            GroupSummary {
                domain,
                planner,
                n_runs,
                success_rate: successes[idx] as f64 / n_runs as f64,
                mean_time: mean(&times[idx]).unwrap_or(0.0),
                median_time: median(&times[idx]).unwrap_or(0.0),
                mean_plan_len: mean(&lens[idx]),
                median_plan_len: median(&lens[idx]),
            }
        })
        .collect()
}

fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

fn median(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        Some((sorted[mid - 1] + sorted[mid]) / 2.0)
    } else {
        Some(sorted[mid])
    }
}

fn format_optional(value: Option<f64>) -> String {
    value
        .map(|v| format!("{:.4}", v))
        .unwrap_or_else(|| MISSING.to_string())
}

/// Render groups as CSV, header included.
pub fn render_summary_csv(groups: &[GroupSummary]) -> String {
    let mut out = SUMMARY_HEADER.join(",");
    out.push('\n');
    for g in groups {
        let line = [
            escape_field(&g.domain),
            escape_field(g.planner.label()),
            g.n_runs.to_string(),
            format!("{:.4}", g.success_rate),
            format!("{:.4}", g.mean_time),
            format!("{:.4}", g.median_time),
            format_optional(g.mean_plan_len),
            format_optional(g.median_plan_len),
        ]
        .join(",");
        out.push_str(&line);
        out.push('\n');
    }
    out
}

/// Write `summary.csv` atomically.
pub fn write_summary(path: &Path, groups: &[GroupSummary]) -> Result<(), HarnessError> {
    atomic_write(path, render_summary_csv(groups).as_bytes()).map_err(|source| {
        HarnessError::StoreWriteFailed {
            path: path.to_path_buf(),
            source,
        }
    })
}

/// Print the groups as an aligned table.
pub fn display_summary(groups: &[GroupSummary]) {
    if groups.is_empty() {
        println!("No results to summarize.");
        return;
    }

    let total: usize = groups.iter().map(|g| g.n_runs).sum();
    println!();
    println!("Results by domain and planner (across {} runs):", total);
    println!(
        "{:<14} {:<8} {:<6} {:<9} {:<11} {:<11} {:<9} {:<9}",
        "Domain", "Planner", "Runs", "Success", "Mean time", "Median", "Mean len", "Med len"
    );
    println!(
        "{:<14} {:<8} {:<6} {:<9} {:<11} {:<11} {:<9} {:<9}",
        "--------------", "--------", "------", "---------", "-----------", "-----------", "---------",
        "---------"
    );
    for g in groups {
        let len = |v: Option<f64>| v.map_or_else(|| MISSING.to_string(), |v| format!("{:.1}", v));
        println!(
            "{:<14} {:<8} {:<6} {:<8.0}% {:<11} {:<11} {:<9} {:<9}",
            g.domain,
            g.planner.label(),
            g.n_runs,
            g.success_rate * 100.0,
            format!("{:.2}s", g.mean_time),
            format!("{:.2}s", g.median_time),
            len(g.mean_plan_len),
            len(g.median_plan_len)
        );
    }
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::RunResult;
    use tempfile::tempdir;

    fn row(domain: &str, planner: PlannerKind, plan_len: Option<u32>, time_s: f64) -> RunResult {
        RunResult {
            domain: domain.to_string(),
            problem: "p.pddl".to_string(),
            planner,
            success: plan_len.is_some(),
            time_s,
            plan_len,
        }
    }

    fn table() -> ExperimentTable {
        ExperimentTable::from(vec![
            row("gripper", PlannerKind::Mcts, Some(10), 1.0),
            row("gripper", PlannerKind::AStar, Some(8), 4.0),
            row("gripper", PlannerKind::Mcts, None, 300.0),
            row("gripper", PlannerKind::AStar, Some(12), 2.0),
            row("depots", PlannerKind::Mcts, None, 300.0),
            row("gripper", PlannerKind::Mcts, Some(20), 2.0),
        ])
    }

    #[test]
    fn test_groups_in_first_seen_order() {
        let groups = summarize(&table());
        let keys: Vec<_> = groups.iter().map(|g| (g.domain.as_str(), g.planner)).collect();
        assert_eq!(
            keys,
            vec![
                ("gripper", PlannerKind::Mcts),
                ("gripper", PlannerKind::AStar),
                ("depots", PlannerKind::Mcts),
            ]
        );
    }

    #[test]
    fn test_group_statistics() {
        let groups = summarize(&table());
        let mcts = &groups[0];
        assert_eq!(mcts.n_runs, 3);
        assert!((mcts.success_rate - 2.0 / 3.0).abs() < 1e-9);
        assert!((mcts.mean_time - 101.0).abs() < 1e-9);
        assert!((mcts.median_time - 2.0).abs() < 1e-9);
        assert_eq!(mcts.mean_plan_len, Some(15.0));
        assert_eq!(mcts.median_plan_len, Some(15.0));

        let astar = &groups[1];
        assert_eq!(astar.n_runs, 2);
        assert_eq!(astar.success_rate, 1.0);
        assert!((astar.median_time - 3.0).abs() < 1e-9);
        assert_eq!(astar.mean_plan_len, Some(10.0));
    }

    #[test]
    fn test_group_without_plans_has_missing_lengths() {
        let groups = summarize(&table());
        let depots = &groups[2];
        assert_eq!(depots.success_rate, 0.0);
        assert_eq!(depots.mean_plan_len, None);
        assert_eq!(depots.median_plan_len, None);
    }

    #[test]
    fn test_empty_table() {
        assert!(summarize(&ExperimentTable::new()).is_empty());
    }

    #[test]
    fn test_render_summary_csv() {
        let csv = render_summary_csv(&summarize(&table()));
        let lines: Vec<_> = csv.lines().collect();
        assert_eq!(
            lines[0],
            "domain,planner,n_runs,success_rate,mean_time,median_time,mean_plan_len,median_plan_len"
        );
        assert_eq!(lines[2], "gripper,A*,2,1.0000,3.0000,3.0000,10.0000,10.0000");
        assert_eq!(lines[3], "depots,MCTS,1,0.0000,300.0000,300.0000,NA,NA");
    }

    #[test]
    fn test_write_summary_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out").join("summary.csv");
        write_summary(&path, &summarize(&table())).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content.lines().count(), 4);
    }
}
