//! Benchmark configuration.
//!
//! Settings are read from `planbench.toml` in the project directory and
//! layered: file → environment (`TIMEOUT_S`) → CLI flags. A missing file means
//! all defaults, which reproduce the reference suite: four pddl4j domains, ten
//! problems each, a 300 s timeout, MCTS and A* on the JVM.
//!
//! # Configuration File Format
//!
//! ```toml
//! [harness]
//! timeout_s = 300
//! domains_dir = "tp_domains"
//! domains = ["blocksworld", "depots", "gripper", "logistics"]
//! problems_per_domain = 10
//! problem_glob = "p*.pddl"
//! domain_file = "domain.pddl"
//!
//! [output]
//! results = "results.csv"
//! logs_dir = "runs_logs"
//! summary = "summary.csv"
//! manifest = "sweep-manifest.json"
//!
//! [[planners]]
//! kind = "mcts"
//! program = "java"
//! prefix_args = ["-cp", "classes_build:lib/pddl4j-4.0.0.jar", "fr.uga.pddl4j.examples.mcts.MCTSPlanner"]
//! args = ["-t", "{timeout}", "-n", "400", "-d", "80", "-p", "250", "-s", "1"]
//! extractors = ["annotated-count", "step-count"]
//! ```

use crate::errors::ConfigError;
use crate::planner::PlannerSpec;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Config file name, looked up in the project directory.
pub const CONFIG_FILE: &str = "planbench.toml";

/// Environment variable overriding `harness.timeout_s`.
pub const TIMEOUT_ENV: &str = "TIMEOUT_S";

/// Where problems come from and how long each run may take.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HarnessSection {
    /// Wall-clock limit per planner invocation, in seconds
    #[serde(default = "default_timeout_s")]
    pub timeout_s: u64,
    /// Directory holding one sub-directory per domain
    #[serde(default = "default_domains_dir")]
    pub domains_dir: PathBuf,
    /// Domains to sweep, in order
    #[serde(default = "default_domains")]
    pub domains: Vec<String>,
    /// Number of problems taken from each domain (first N by file name)
    #[serde(default = "default_problems_per_domain")]
    pub problems_per_domain: usize,
    /// Glob selecting problem files inside a domain directory
    #[serde(default = "default_problem_glob")]
    pub problem_glob: String,
    /// Domain description file name inside each domain directory
    #[serde(default = "default_domain_file")]
    pub domain_file: String,
}

fn default_timeout_s() -> u64 {
    300
}

fn default_domains_dir() -> PathBuf {
    PathBuf::from("tp_domains")
}

fn default_domains() -> Vec<String> {
    ["blocksworld", "depots", "gripper", "logistics"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_problems_per_domain() -> usize {
    10
}

fn default_problem_glob() -> String {
    "p*.pddl".to_string()
}

fn default_domain_file() -> String {
    "domain.pddl".to_string()
}

impl Default for HarnessSection {
    fn default() -> Self {
        Self {
            timeout_s: default_timeout_s(),
            domains_dir: default_domains_dir(),
            domains: default_domains(),
            problems_per_domain: default_problems_per_domain(),
            problem_glob: default_problem_glob(),
            domain_file: default_domain_file(),
        }
    }
}

/// Output locations, relative to the output directory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputSection {
    #[serde(default = "default_results")]
    pub results: PathBuf,
    #[serde(default = "default_logs_dir")]
    pub logs_dir: PathBuf,
    #[serde(default = "default_summary")]
    pub summary: PathBuf,
    #[serde(default = "default_manifest")]
    pub manifest: PathBuf,
}

fn default_results() -> PathBuf {
    PathBuf::from("results.csv")
}

fn default_logs_dir() -> PathBuf {
    PathBuf::from("runs_logs")
}

fn default_summary() -> PathBuf {
    PathBuf::from("summary.csv")
}

fn default_manifest() -> PathBuf {
    PathBuf::from("sweep-manifest.json")
}

impl Default for OutputSection {
    fn default() -> Self {
        Self {
            results: default_results(),
            logs_dir: default_logs_dir(),
            summary: default_summary(),
            manifest: default_manifest(),
        }
    }
}

fn default_planners() -> Vec<PlannerSpec> {
    vec![PlannerSpec::mcts_default(), PlannerSpec::astar_default()]
}

/// The complete planbench.toml structure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BenchToml {
    #[serde(default)]
    pub harness: HarnessSection,
    #[serde(default)]
    pub output: OutputSection,
    /// Planners run on every problem, in this order
    #[serde(default = "default_planners")]
    pub planners: Vec<PlannerSpec>,
}

impl Default for BenchToml {
    fn default() -> Self {
        Self {
            harness: HarnessSection::default(),
            output: OutputSection::default(),
            planners: default_planners(),
        }
    }
}

impl BenchToml {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::ReadFailed {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Load `planbench.toml` from the project directory, or defaults.
    pub fn load_or_default(project_dir: &Path) -> Result<Self, ConfigError> {
        let config_path = project_dir.join(CONFIG_FILE);
        if config_path.exists() {
            Self::load(&config_path)
        } else {
            Ok(Self::default())
        }
    }

    /// Save configuration to a TOML file.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content).map_err(|source| ConfigError::WriteFailed {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Validate the configuration and return any warnings.
    pub fn validate(&self) -> Vec<String> {
        let mut warnings = Vec::new();

        if self.harness.timeout_s == 0 {
            warnings.push("timeout_s is 0: every run will time out immediately".to_string());
        }
        if self.harness.problems_per_domain == 0 {
            warnings.push("problems_per_domain is 0: no problems will run".to_string());
        }
        if self.harness.domains.is_empty() {
            warnings.push("domains is empty: nothing to sweep".to_string());
        }
        if let Err(e) = glob::Pattern::new(&self.harness.problem_glob) {
            warnings.push(format!(
                "Invalid problem_glob '{}': {}",
                self.harness.problem_glob, e
            ));
        }
        if self.planners.is_empty() {
            warnings.push("No planners configured".to_string());
        }

        let mut seen = HashSet::new();
        for planner in &self.planners {
            if !seen.insert(planner.kind) {
                warnings.push(format!(
                    "Planner '{}' is configured more than once; `run` rejects this",
                    planner.kind.config_name()
                ));
            }
            if planner.program.trim().is_empty() {
                warnings.push(format!(
                    "Planner '{}' has an empty program",
                    planner.kind.config_name()
                ));
            }
            if planner.extractors.is_empty() {
                warnings.push(format!(
                    "Planner '{}' has no extractors: every run will be recorded as a failure",
                    planner.kind.config_name()
                ));
            }
        }

        let mut seen_domains = HashSet::new();
        for domain in &self.harness.domains {
            if !seen_domains.insert(domain.as_str()) {
                warnings.push(format!("Domain '{}' is listed more than once; `run` rejects this", domain));
            }
        }

        warnings
    }
}

/// Command-line overrides, applied last.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub timeout_s: Option<u64>,
    pub domains: Option<Vec<String>>,
    pub problems_per_domain: Option<usize>,
    pub out_dir: Option<PathBuf>,
}

/// Resolved configuration used by a sweep.
///
/// Relative paths from the file are resolved against the project directory;
/// outputs go to `out_dir` when given.
#[derive(Debug, Clone)]
pub struct BenchConfig {
    pub project_dir: PathBuf,
    /// Parsed planbench.toml with env/CLI overrides already applied
    pub toml: BenchToml,
    out_dir: PathBuf,
}

impl BenchConfig {
    /// Load from the project directory, applying `TIMEOUT_S` and CLI overrides.
    pub fn load(project_dir: &Path, overrides: CliOverrides) -> Result<Self, ConfigError> {
        let toml = BenchToml::load_or_default(project_dir)?;
        let env_timeout = std::env::var(TIMEOUT_ENV).ok();
        Self::from_parts(project_dir, toml, env_timeout.as_deref(), overrides)
    }

    /// Build from already-loaded pieces.
    pub fn from_parts(
        project_dir: &Path,
        mut toml: BenchToml,
        env_timeout: Option<&str>,
        overrides: CliOverrides,
    ) -> Result<Self, ConfigError> {
        if let Some(raw) = env_timeout.filter(|v| !v.trim().is_empty()) {
            toml.harness.timeout_s =
                raw.trim()
                    .parse::<u64>()
                    .map_err(|_| ConfigError::InvalidEnv {
                        var: TIMEOUT_ENV.to_string(),
                        value: raw.to_string(),
                    })?;
        }
        if let Some(timeout_s) = overrides.timeout_s {
            toml.harness.timeout_s = timeout_s;
        }
        if let Some(domains) = overrides.domains {
            toml.harness.domains = domains;
        }
        if let Some(n) = overrides.problems_per_domain {
            toml.harness.problems_per_domain = n;
        }

        glob::Pattern::new(&toml.harness.problem_glob).map_err(|e| ConfigError::InvalidGlob {
            pattern: toml.harness.problem_glob.clone(),
            message: e.to_string(),
        })?;
        reject_duplicates(&toml)?;

        let out_dir = match overrides.out_dir {
            Some(dir) => resolve(project_dir, &dir),
            None => project_dir.to_path_buf(),
        };

        Ok(Self {
            project_dir: project_dir.to_path_buf(),
            toml,
            out_dir,
        })
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.toml.harness.timeout_s)
    }

    pub fn domains(&self) -> &[String] {
        &self.toml.harness.domains
    }

    pub fn problems_per_domain(&self) -> usize {
        self.toml.harness.problems_per_domain
    }

    pub fn problem_glob(&self) -> &str {
        &self.toml.harness.problem_glob
    }

    pub fn domain_file_name(&self) -> &str {
        &self.toml.harness.domain_file
    }

    pub fn planners(&self) -> &[PlannerSpec] {
        &self.toml.planners
    }

    pub fn domains_dir(&self) -> PathBuf {
        resolve(&self.project_dir, &self.toml.harness.domains_dir)
    }

    pub fn out_dir(&self) -> &Path {
        &self.out_dir
    }

    pub fn results_path(&self) -> PathBuf {
        resolve(&self.out_dir, &self.toml.output.results)
    }

    pub fn logs_dir(&self) -> PathBuf {
        resolve(&self.out_dir, &self.toml.output.logs_dir)
    }

    pub fn summary_path(&self) -> PathBuf {
        resolve(&self.out_dir, &self.toml.output.summary)
    }

    pub fn manifest_path(&self) -> PathBuf {
        resolve(&self.out_dir, &self.toml.output.manifest)
    }

    pub fn validate(&self) -> Vec<String> {
        self.toml.validate()
    }
}

/// Each (domain, problem, planner) cell must map to exactly one row and one log.
fn reject_duplicates(toml: &BenchToml) -> Result<(), ConfigError> {
    let mut domains = HashSet::new();
    for domain in &toml.harness.domains {
        if !domains.insert(domain.as_str()) {
            return Err(ConfigError::DuplicateDomain(domain.clone()));
        }
    }
    let mut kinds = HashSet::new();
    for planner in &toml.planners {
        if !kinds.insert(planner.kind) {
            return Err(ConfigError::DuplicatePlanner(
                planner.kind.config_name().to_string(),
            ));
        }
    }
    Ok(())
}

fn resolve(base: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}
