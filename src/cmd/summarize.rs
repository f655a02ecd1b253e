//! Results aggregation: `planbench summarize`.

use anyhow::{Context, Result};
use std::path::Path;

use planbench::config::{BenchConfig, CliOverrides};
use planbench::store::read_table;
use planbench::summary::{display_summary, summarize, write_summary};

pub fn cmd_summarize(project_dir: &Path, input: Option<&Path>, output: Option<&Path>) -> Result<()> {
    let config = BenchConfig::load(project_dir, CliOverrides::default())
        .context("Failed to load planbench.toml")?;

    let input = input
        .map(|p| project_dir.join(p))
        .unwrap_or_else(|| config.results_path());
    let output = output
        .map(|p| project_dir.join(p))
        .unwrap_or_else(|| config.summary_path());

    let table = read_table(&input)
        .with_context(|| format!("Failed to read results from {}", input.display()))?;
    let groups = summarize(&table);

    display_summary(&groups);
    write_summary(&output, &groups)?;
    println!("Summary written to {}", output.display());

    Ok(())
}
