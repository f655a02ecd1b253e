//! Configuration view and validation commands: `planbench config`.

use anyhow::{Context, Result};
use std::path::Path;

use super::super::ConfigCommands;

pub fn cmd_config(project_dir: &Path, command: Option<ConfigCommands>) -> Result<()> {
    use planbench::config::{BenchConfig, BenchToml, CONFIG_FILE, CliOverrides, TIMEOUT_ENV};

    let config_path = project_dir.join(CONFIG_FILE);

    match command {
        None | Some(ConfigCommands::Show) => {
            println!();
            println!("planbench Configuration");
            println!("=======================");
            println!();

            let toml = if config_path.exists() {
                println!("Config file: {}", config_path.display());
                BenchToml::load(&config_path)?
            } else {
                println!("No {} found at {}", CONFIG_FILE, config_path.display());
                println!("Using default configuration.");
                BenchToml::default()
            };
            println!();

            println!("[harness]");
            println!("  timeout_s = {}", toml.harness.timeout_s);
            println!("  domains_dir = \"{}\"", toml.harness.domains_dir.display());
            println!("  domains = {:?}", toml.harness.domains);
            println!("  problems_per_domain = {}", toml.harness.problems_per_domain);
            println!("  problem_glob = \"{}\"", toml.harness.problem_glob);
            println!("  domain_file = \"{}\"", toml.harness.domain_file);
            println!();

            for planner in &toml.planners {
                println!("[[planners]] {}", planner.kind.label());
                println!("  program = \"{}\"", planner.program);
                if !planner.prefix_args.is_empty() {
                    println!("  prefix_args = {:?}", planner.prefix_args);
                }
                println!("  args = {:?}", planner.args);
                let extractors: Vec<_> = planner.extractors.iter().map(|e| e.name()).collect();
                println!("  extractors = {:?}", extractors);
                println!();
            }

            let config = BenchConfig::load(project_dir, CliOverrides::default())
                .context("Failed to apply environment overrides")?;
            println!("Effective values (with {} override):", TIMEOUT_ENV);
            println!("  timeout_s = {}", config.timeout().as_secs());
            println!("  results = {}", config.results_path().display());
            println!("  logs_dir = {}", config.logs_dir().display());
            println!("  summary = {}", config.summary_path().display());
            println!("  manifest = {}", config.manifest_path().display());
            println!();

            if !config_path.exists() {
                println!("Run 'planbench config init' to create a {} file.", CONFIG_FILE);
                println!();
            }
        }
        Some(ConfigCommands::Validate) => {
            println!();
            println!("Validating configuration...");
            println!();

            if !config_path.exists() {
                println!("No {} found. Using defaults (valid).", CONFIG_FILE);
                return Ok(());
            }

            let toml = BenchToml::load(&config_path)?;
            let warnings = toml.validate();

            if warnings.is_empty() {
                println!("Configuration is valid.");
            } else {
                println!("Configuration warnings:");
                for warning in warnings {
                    println!("  - {}", warning);
                }
            }
            println!();
        }
        Some(ConfigCommands::Init) => {
            if config_path.exists() {
                println!("{} already exists at {}", CONFIG_FILE, config_path.display());
                println!("Delete it first if you want to recreate it.");
                return Ok(());
            }

            if !project_dir.exists() {
                std::fs::create_dir_all(project_dir)?;
            }

            let toml = BenchToml::default();
            toml.save(&config_path)?;

            println!("Created {} at {}", CONFIG_FILE, config_path.display());
            println!();
            println!("You can now customize:");
            println!("  - [harness] timeout_s, domains, problems_per_domain");
            println!("  - [output] results, logs_dir, summary, manifest");
            println!("  - [[planners]] program, args, extractors");
            println!();
        }
    }

    Ok(())
}
