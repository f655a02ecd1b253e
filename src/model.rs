//! Core records produced by a sweep.

use crate::classify::Outcome;
use crate::planner::PlannerKind;
use std::path::PathBuf;
use std::time::Duration;

/// One planning task: a problem file inside a domain directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProblemInstance {
    /// Domain name, e.g. "blocksworld"
    pub domain: String,
    /// Problem file name, e.g. "p01.pddl"
    pub name: String,
    /// Shared domain description for this domain
    pub domain_file: PathBuf,
    pub problem_file: PathBuf,
}

/// The atomic row of the results table.
#[derive(Debug, Clone, PartialEq)]
pub struct RunResult {
    pub domain: String,
    pub problem: String,
    pub planner: PlannerKind,
    pub success: bool,
    /// Wall-clock seconds, including startup and timeout overrun
    pub time_s: f64,
    /// Only present on success
    pub plan_len: Option<u32>,
}

impl RunResult {
    pub fn new(problem: &ProblemInstance, planner: PlannerKind, outcome: Outcome, elapsed: Duration) -> Self {
        Self {
            domain: problem.domain.clone(),
            problem: problem.name.clone(),
            planner,
            success: outcome.success,
            time_s: elapsed.as_secs_f64(),
            plan_len: if outcome.success { outcome.plan_len } else { None },
        }
    }
}

/// Results of a sweep in enumeration order: domain, then problem, then planner.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExperimentTable {
    rows: Vec<RunResult>,
}

impl ExperimentTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, row: RunResult) {
        self.rows.push(row);
    }

    pub fn rows(&self) -> &[RunResult] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, RunResult> {
        self.rows.iter()
    }

    pub fn successes(&self) -> usize {
        self.rows.iter().filter(|r| r.success).count()
    }
}

impl From<Vec<RunResult>> for ExperimentTable {
    fn from(rows: Vec<RunResult>) -> Self {
        Self { rows }
    }
}

impl<'a> IntoIterator for &'a ExperimentTable {
    type Item = &'a RunResult;
    type IntoIter = std::slice::Iter<'a, RunResult>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}
