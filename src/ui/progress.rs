use crate::model::RunResult;
use crate::planner::PlannerKind;
use crate::ui::icons::{CHECK, CLOCK, CROSS, FILE_NEW, FOLDER, PROGRESS, SKIP, SPARKLE};
use console::style;
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use std::path::Path;
use std::time::Duration;

/// Terminal UI for a sweep, rendered via `indicatif` progress bars.
///
/// Two bars are stacked vertically:
/// - Cell bar: how many (domain, problem, planner) cells have finished
/// - Run bar: spinner showing the invocation currently in flight
///
/// Per-cell results are printed above the bars through `MultiProgress`.
pub struct SweepUI {
    multi: MultiProgress,
    cell_bar: ProgressBar,
    run_bar: ProgressBar,
    verbose: bool,
}

impl SweepUI {
    /// Create the UI sized for `total_cells` planner invocations.
    pub fn new(total_cells: u64, verbose: bool) -> Self {
        let multi = MultiProgress::new();

        let cell_style = ProgressStyle::default_bar()
            .template("{prefix:.bold.dim} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .expect("progress bar template is a valid static string")
            .progress_chars("█▓▒░");

        let cell_bar = multi.add(ProgressBar::new(total_cells));
        cell_bar.set_style(cell_style);
        cell_bar.set_prefix("Cells");

        let run_style = ProgressStyle::default_spinner()
            .template("{prefix:.bold.dim} {spinner} {msg} {elapsed:.dim}")
            .expect("progress bar template is a valid static string");

        let run_bar = multi.add(ProgressBar::new_spinner());
        run_bar.set_style(run_style);
        run_bar.set_prefix("  Run");

        Self {
            multi,
            cell_bar,
            run_bar,
            verbose,
        }
    }

    /// Print a line via `MultiProgress`, falling back to `eprintln!` if the rich UI fails.
    fn print_line(&self, msg: impl AsRef<str>) {
        if self.multi.println(msg.as_ref()).is_err() {
            eprintln!("{}", msg.as_ref());
        }
    }

    /// Announce a domain and how many problems it contributes.
    pub fn start_domain(&self, domain: &str, problems: usize) {
        self.cell_bar
            .set_message(format!("{}", style(domain).yellow()));
        self.print_line(format!(
            "{}{} {}",
            FOLDER,
            style(domain).bold(),
            style(format!("({} problems)", problems)).dim()
        ));
    }

    /// Report a domain that was skipped and why.
    pub fn domain_skipped(&self, domain: &str, reason: &str) {
        self.print_line(format!(
            "{}{} {}",
            SKIP,
            style(domain).yellow().bold(),
            style(reason).dim()
        ));
    }

    /// Start the spinner for one invocation.
    pub fn start_cell(&self, problem: &str, planner: PlannerKind) {
        self.run_bar.reset_elapsed();
        self.run_bar.set_message(format!(
            "{} {}",
            style(planner.label()).cyan(),
            problem
        ));
        self.run_bar.enable_steady_tick(Duration::from_millis(100));
    }

    /// Record a finished cell and advance the cell bar.
    pub fn cell_done(&self, row: &RunResult, timed_out: bool, artifact: &Path) {
        let verdict = if row.success {
            format!(
                "{}{}",
                CHECK,
                style(format!(
                    "plan_len={}",
                    row.plan_len.map_or_else(|| "?".to_string(), |n| n.to_string())
                ))
                .green()
            )
        } else if timed_out {
            format!("{}{}", CLOCK, style("timeout").red())
        } else {
            format!("{}{}", CROSS, style("failed").red())
        };

        self.print_line(format!(
            "    {:<6} {:<16} {} {}",
            row.planner.label(),
            row.problem,
            verdict,
            style(format!("{:.2}s", row.time_s)).dim()
        ));
        if self.verbose {
            self.print_line(format!(
                "      {}{}",
                FILE_NEW,
                style(artifact.display()).dim()
            ));
        }
        self.cell_bar.inc(1);
    }

    /// Finish the bars and print the totals.
    pub fn finish(&self, attempted: usize, succeeded: usize, cancelled: bool) {
        self.run_bar.finish_and_clear();
        if cancelled {
            self.cell_bar
                .abandon_with_message(format!("{}", style("cancelled").red().bold()));
        } else {
            self.cell_bar
                .finish_with_message(format!("{}", style("done").green().bold()));
        }
        self.print_line(format!(
            "{}{} {}/{} runs succeeded",
            if cancelled { PROGRESS } else { SPARKLE },
            style(if cancelled { "Sweep cancelled:" } else { "Sweep complete:" }).bold(),
            style(succeeded).green(),
            attempted
        ));
    }
}
