//! The benchmark sweep: `planbench run`.

use anyhow::{Context, Result};
use console::style;
use std::path::Path;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::warn;

use planbench::config::{BenchConfig, CliOverrides};
use planbench::manifest::SweepManifest;
use planbench::sweep::{Sweeper, plan_sweep};
use planbench::ui::SweepUI;

pub async fn cmd_run(project_dir: &Path, overrides: CliOverrides, verbose: bool) -> Result<()> {
    let config = BenchConfig::load(project_dir, overrides).context("Failed to load planbench.toml")?;

    for warning in config.validate() {
        warn!("{}", warning);
    }

    let plan = plan_sweep(&config);
    if plan.total_cells() == 0 {
        warn!("No runnable problems found under {}", config.domains_dir().display());
    }

    println!();
    println!(
        "{} {} problems x {} planners, timeout {}s",
        style("planbench").bold().cyan(),
        plan.problem_count(),
        config.planners().len(),
        config.timeout().as_secs()
    );
    println!();

    let cancel = CancellationToken::new();
    let on_ctrl_c = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupt received, stopping after killing the running planner");
            on_ctrl_c.cancel();
        }
    });

    let ui = Arc::new(SweepUI::new(plan.total_cells() as u64, verbose));
    let report = Sweeper::new(&config, plan)
        .with_cancellation(cancel)
        .with_ui(ui)
        .run()
        .await
        .context("Sweep aborted")?;

    let manifest_path = config.manifest_path();
    SweepManifest::from_report(&config, &report)
        .write(&manifest_path)
        .context("Failed to write sweep manifest")?;

    println!();
    if !report.skipped.is_empty() {
        println!("Skipped domains:");
        for skip in &report.skipped {
            println!("  - {}: {}", skip.domain, skip.reason);
        }
        println!();
    }
    println!(
        "{} runs, {} succeeded, {} timed out",
        report.attempted(),
        report.succeeded(),
        report.timed_out
    );
    println!("Results:  {}", report.results_path.display());
    println!("Logs:     {}", report.logs_dir.display());
    println!("Manifest: {}", manifest_path.display());
    println!();

    if report.cancelled {
        anyhow::bail!(
            "Sweep cancelled after {} completed runs; results hold completed runs only",
            report.attempted()
        );
    }
    Ok(())
}
