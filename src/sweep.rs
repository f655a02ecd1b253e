//! The experiment sweep.
//!
//! A sweep walks every (domain, problem, planner) cell in a fixed order:
//! domains as configured, problems by file name (first N), planners as
//! configured. Each cell runs to completion before the next starts, gets its
//! run log written, and has its row appended to the results file right away.
//!
//! Problem discovery is a separate step ([`plan_sweep`]) so callers can size
//! progress output before anything runs.

use crate::artifact::ArtifactLogger;
use crate::classify::OutcomeClassifier;
use crate::config::BenchConfig;
use crate::errors::HarnessError;
use crate::model::{ExperimentTable, ProblemInstance, RunResult};
use crate::planner::PlannerSpec;
use crate::runner::{ProcessRunner, Termination};
use crate::store::ResultWriter;
use crate::ui::SweepUI;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// A domain left out of the sweep, with the reason.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedDomain {
    pub domain: String,
    pub reason: String,
}

/// Discovery result for one configured domain.
#[derive(Debug, Clone, PartialEq)]
pub enum DomainSelection {
    Ready {
        domain: String,
        problems: Vec<ProblemInstance>,
    },
    Skipped(SkippedDomain),
}

/// What a sweep will run, in order.
#[derive(Debug, Clone, Default)]
pub struct SweepPlan {
    pub domains: Vec<DomainSelection>,
    planner_count: usize,
}

impl SweepPlan {
    /// Number of planner invocations the plan contains.
    pub fn total_cells(&self) -> usize {
        self.problem_count() * self.planner_count
    }

    pub fn problem_count(&self) -> usize {
        self.domains
            .iter()
            .map(|d| match d {
                DomainSelection::Ready { problems, .. } => problems.len(),
                DomainSelection::Skipped(_) => 0,
            })
            .sum()
    }

    pub fn skipped(&self) -> Vec<SkippedDomain> {
        self.domains
            .iter()
            .filter_map(|d| match d {
                DomainSelection::Skipped(skip) => Some(skip.clone()),
                DomainSelection::Ready { .. } => None,
            })
            .collect()
    }
}

/// Resolve every configured domain to its problem instances.
///
/// Missing directories, missing domain files and empty problem sets are not
/// errors: the domain is marked skipped and the rest of the plan is kept.
pub fn plan_sweep(config: &BenchConfig) -> SweepPlan {
    let domains_dir = config.domains_dir();
    let domains = config
        .domains()
        .iter()
        .map(|domain| select_domain(config, &domains_dir, domain))
        .collect();
    SweepPlan {
        domains,
        planner_count: config.planners().len(),
    }
}

fn select_domain(config: &BenchConfig, domains_dir: &Path, domain: &str) -> DomainSelection {
    let skip = |reason: String| {
        DomainSelection::Skipped(SkippedDomain {
            domain: domain.to_string(),
            reason,
        })
    };

    let domain_dir = domains_dir.join(domain);
    if !domain_dir.is_dir() {
        return skip(format!("directory not found: {}", domain_dir.display()));
    }

    let domain_file = domain_dir.join(config.domain_file_name());
    if !domain_file.is_file() {
        return skip(format!("domain file not found: {}", domain_file.display()));
    }

    let files = match discover_problems(
        &domain_dir,
        config.problem_glob(),
        config.problems_per_domain(),
    ) {
        Ok(files) => files,
        Err(e) => return skip(format!("cannot list {}: {}", domain_dir.display(), e)),
    };
    if files.is_empty() {
        return skip(format!(
            "no problems matching '{}' in {}",
            config.problem_glob(),
            domain_dir.display()
        ));
    }

    let problems = files
        .into_iter()
        .map(|problem_file| ProblemInstance {
            domain: domain.to_string(),
            name: problem_file
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default(),
            domain_file: domain_file.clone(),
            problem_file,
        })
        .collect();

    DomainSelection::Ready {
        domain: domain.to_string(),
        problems,
    }
}

/// Problem files in `domain_dir` whose names match `pattern`, sorted by
/// file name, truncated to the first `limit`.
pub fn discover_problems(
    domain_dir: &Path,
    pattern: &str,
    limit: usize,
) -> std::io::Result<Vec<PathBuf>> {
    let pattern = glob::Pattern::new(pattern)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidInput, e.to_string()))?;

    let mut files: Vec<PathBuf> = std::fs::read_dir(domain_dir)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_file())
        .filter(|path| {
            path.file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|name| pattern.matches(name))
        })
        .collect();

    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    files.truncate(limit);
    Ok(files)
}

/// Outcome of a whole sweep.
#[derive(Debug, Clone)]
pub struct SweepReport {
    /// Completed rows in enumeration order
    pub table: ExperimentTable,
    pub skipped: Vec<SkippedDomain>,
    /// Invocations killed by the timeout
    pub timed_out: usize,
    /// True if the sweep stopped early on cancellation
    pub cancelled: bool,
    pub results_path: PathBuf,
    pub logs_dir: PathBuf,
    pub started_at: DateTime<Utc>,
    pub ended_at: DateTime<Utc>,
}

impl SweepReport {
    pub fn attempted(&self) -> usize {
        self.table.len()
    }

    pub fn succeeded(&self) -> usize {
        self.table.successes()
    }
}

/// Runs a [`SweepPlan`] and owns the table while it fills.
pub struct Sweeper {
    plan: SweepPlan,
    planners: Vec<(PlannerSpec, OutcomeClassifier)>,
    runner: ProcessRunner,
    logger: ArtifactLogger,
    results_path: PathBuf,
    table: ExperimentTable,
    cancel: CancellationToken,
    ui: Option<Arc<SweepUI>>,
}

impl Sweeper {
    pub fn new(config: &BenchConfig, plan: SweepPlan) -> Self {
        let cancel = CancellationToken::new();
        let runner = ProcessRunner::new(config.timeout())
            .with_working_dir(&config.project_dir)
            .with_cancellation(cancel.clone());
        let planners = config
            .planners()
            .iter()
            .map(|spec| (spec.clone(), OutcomeClassifier::for_planner(spec)))
            .collect();

        Self {
            plan,
            planners,
            runner,
            logger: ArtifactLogger::new(config.logs_dir()),
            results_path: config.results_path(),
            table: ExperimentTable::new(),
            cancel,
            ui: None,
        }
    }

    /// Stop the sweep (and kill the running planner) when `token` is cancelled.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.runner = self.runner.with_cancellation(token.clone());
        self.cancel = token;
        self
    }

    pub fn with_ui(mut self, ui: Arc<SweepUI>) -> Self {
        self.ui = Some(ui);
        self
    }

    /// Run every cell in order.
    ///
    /// Only persistence failures are returned as errors. A cancelled sweep
    /// returns `Ok` with `cancelled` set; the in-flight cell is dropped, so the
    /// results file holds completed cells only.
    pub async fn run(mut self) -> Result<SweepReport, HarnessError> {
        let started_at = Utc::now();
        self.logger.ensure_dir()?;
        let mut writer = ResultWriter::create(&self.results_path)?;

        let mut timed_out = 0;
        let mut cancelled = false;
        let plan = std::mem::take(&mut self.plan);

        'domains: for selection in &plan.domains {
            let (domain, problems) = match selection {
                DomainSelection::Skipped(skip) => {
                    warn!(domain = %skip.domain, reason = %skip.reason, "Skipping domain");
                    if let Some(ui) = &self.ui {
                        ui.domain_skipped(&skip.domain, &skip.reason);
                    }
                    continue;
                }
                DomainSelection::Ready { domain, problems } => (domain, problems),
            };

            info!(domain = %domain, problems = problems.len(), "Sweeping domain");
            if let Some(ui) = &self.ui {
                ui.start_domain(domain, problems.len());
            }

            for problem in problems {
                for (spec, classifier) in &self.planners {
                    if self.cancel.is_cancelled() {
                        cancelled = true;
                        break 'domains;
                    }

                    if let Some(ui) = &self.ui {
                        ui.start_cell(&problem.name, spec.kind);
                    }

                    let invocation = self
                        .runner
                        .run(spec, &problem.domain_file, &problem.problem_file)
                        .await;
                    debug!(
                        command = %invocation.command_display(),
                        termination = %invocation.termination,
                        "Invocation finished"
                    );

                    if invocation.termination == Termination::Cancelled {
                        info!(domain = %domain, problem = %problem.name, planner = %spec.kind, "Cell cancelled; not recorded");
                        cancelled = true;
                        break 'domains;
                    }

                    let outcome = classifier.classify_invocation(&invocation);
                    let row = RunResult::new(problem, spec.kind, outcome, invocation.elapsed);

                    let artifact = self.logger.write(problem, spec.kind, &invocation)?;
                    writer.append(&row)?;

                    if invocation.timed_out() {
                        timed_out += 1;
                    }
                    info!(
                        domain = %row.domain,
                        problem = %row.problem,
                        planner = %row.planner,
                        success = row.success,
                        time_s = row.time_s,
                        plan_len = ?row.plan_len,
                        "Cell complete"
                    );
                    if let Some(ui) = &self.ui {
                        ui.cell_done(&row, invocation.timed_out(), &artifact);
                    }

                    self.table.push(row);
                }
            }
        }

        let results_path = writer.finish()?;
        if let Some(ui) = &self.ui {
            ui.finish(self.table.len(), self.table.successes(), cancelled);
        }

        Ok(SweepReport {
            table: self.table,
            skipped: plan.skipped(),
            timed_out,
            cancelled,
            results_path,
            logs_dir: self.logger.dir().to_path_buf(),
            started_at,
            ended_at: Utc::now(),
        })
    }
}
