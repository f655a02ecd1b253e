//! Planner variants and their invocation templates.
//!
//! A planner is an opaque executable. The harness only knows how to build its
//! command line:
//!
//! ```text
//! <program> <prefix_args...> <domain.pddl> <problem.pddl> <args...>
//! ```
//!
//! `args` may contain the `{timeout}` placeholder, expanded to the sweep's
//! timeout in whole seconds so the planner's own budget matches the harness.

use crate::classify::ExtractorKind;
use crate::errors::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Placeholder replaced by the timeout (seconds) in planner arguments.
pub const TIMEOUT_PLACEHOLDER: &str = "{timeout}";

const PDDL4J_CLASSPATH: &str = "classes_build:lib/pddl4j-4.0.0.jar";

/// The planner families being compared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum PlannerKind {
    /// Monte-Carlo tree search planner (random-walk rollouts).
    Mcts,
    /// Weighted A* planner with a heuristic.
    AStar,
}

impl PlannerKind {
    /// Label used in the results table.
    pub fn label(self) -> &'static str {
        match self {
            PlannerKind::Mcts => "MCTS",
            PlannerKind::AStar => "A*",
        }
    }

    /// Filesystem-safe tag used in run log names.
    pub fn tag(self) -> &'static str {
        match self {
            PlannerKind::Mcts => "MCTS",
            PlannerKind::AStar => "ASTAR",
        }
    }

    /// Name used in `planbench.toml`.
    pub fn config_name(self) -> &'static str {
        match self {
            PlannerKind::Mcts => "mcts",
            PlannerKind::AStar => "astar",
        }
    }
}

impl std::fmt::Display for PlannerKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl std::str::FromStr for PlannerKind {
    type Err = ConfigError;

    /// Accepts both the config names (`mcts`, `astar`) and the table labels
    /// (`MCTS`, `A*`), case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "mcts" => Ok(PlannerKind::Mcts),
            "astar" | "a*" => Ok(PlannerKind::AStar),
            _ => Err(ConfigError::UnknownPlanner(s.to_string())),
        }
    }
}

impl TryFrom<String> for PlannerKind {
    type Error = ConfigError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<PlannerKind> for String {
    fn from(kind: PlannerKind) -> Self {
        kind.config_name().to_string()
    }
}

/// How to invoke one planner and how to read its output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlannerSpec {
    /// Which planner family this is
    pub kind: PlannerKind,
    /// Executable to launch
    pub program: String,
    /// Arguments placed before the domain/problem paths
    #[serde(default)]
    pub prefix_args: Vec<String>,
    /// Planner-specific flags placed after the domain/problem paths
    #[serde(default)]
    pub args: Vec<String>,
    /// Plan-length extractors, highest priority first
    #[serde(default = "default_extractors")]
    pub extractors: Vec<ExtractorKind>,
}

fn default_extractors() -> Vec<ExtractorKind> {
    vec![ExtractorKind::AnnotatedCount, ExtractorKind::StepCount]
}

impl PlannerSpec {
    /// Default MCTS invocation (pddl4j example planner on the JVM).
    pub fn mcts_default() -> Self {
        Self {
            kind: PlannerKind::Mcts,
            program: "java".to_string(),
            prefix_args: vec![
                "-cp".to_string(),
                PDDL4J_CLASSPATH.to_string(),
                "fr.uga.pddl4j.examples.mcts.MCTSPlanner".to_string(),
            ],
            args: ["-t", TIMEOUT_PLACEHOLDER, "-n", "400", "-d", "80", "-p", "250", "-s", "1"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            extractors: default_extractors(),
        }
    }

    /// Default A* invocation (pddl4j example planner on the JVM).
    pub fn astar_default() -> Self {
        Self {
            kind: PlannerKind::AStar,
            program: "java".to_string(),
            prefix_args: vec![
                "-cp".to_string(),
                PDDL4J_CLASSPATH.to_string(),
                "fr.uga.pddl4j.examples.asp.ASP".to_string(),
            ],
            args: ["-t", TIMEOUT_PLACEHOLDER, "-e", "FAST_FORWARD", "-w", "1.2"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            extractors: default_extractors(),
        }
    }

    /// Build the full argv (program first) for one problem.
    pub fn command_line(&self, domain_file: &Path, problem_file: &Path, timeout: Duration) -> Vec<String> {
        let mut argv = Vec::with_capacity(3 + self.prefix_args.len() + self.args.len());
        argv.push(self.program.clone());
        argv.extend(self.prefix_args.iter().cloned());
        argv.push(domain_file.display().to_string());
        argv.push(problem_file.display().to_string());
        argv.extend(self.args.iter().map(|a| expand_placeholders(a, timeout)));
        argv
    }
}

/// Replace `{timeout}` with the timeout in whole seconds.
pub fn expand_placeholders(arg: &str, timeout: Duration) -> String {
    arg.replace(TIMEOUT_PLACEHOLDER, &timeout.as_secs().to_string())
}

/// Render an argv as a copy-pasteable shell command.
pub fn display_command(argv: &[String]) -> String {
    argv.iter()
        .map(|p| shell_quote(p))
        .collect::<Vec<_>>()
        .join(" ")
}

fn shell_quote(s: &str) -> String {
    if s.is_empty() {
        "''".to_string()
    } else if s
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || "-_./:=*".contains(c))
    {
        s.to_string()
    } else {
        format!("'{}'", s.replace('\'', "'\"'\"'"))
    }
}
