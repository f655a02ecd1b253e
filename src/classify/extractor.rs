//! Plan-length extraction strategies.
//!
//! The two planner families report their plans differently:
//! - numbered steps, one per line: `  0: (pick-up a)`
//! - a single annotation: `MCTS succeeded, plan found (12 steps).`
//!
//! Each format is one [`PlanExtractor`]. A planner lists the extractors to try
//! in priority order; supporting a new format means adding one implementation
//! and one [`ExtractorKind`] variant.

use crate::errors::ConfigError;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;
use tracing::debug;

static PLAN_STEP_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*\d+:\s+\(").unwrap());

static ANNOTATED_COUNT_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)plan found \((\d+) steps\)").unwrap());

/// Reads a plan length out of free-text planner output.
///
/// Returns `None` when the output carries nothing this extractor recognises,
/// letting the next extractor in line try. `Some(0)` claims the output but
/// reports no usable length, which the classifier records as a failure.
pub trait PlanExtractor: Send + Sync {
    /// Name used in logs and config.
    fn name(&self) -> &'static str;

    fn extract(&self, text: &str) -> Option<u32>;
}

/// Counts lines of the form `<n>: (<action> ...)`.
#[derive(Debug, Clone, Copy, Default)]
pub struct StepCountExtractor;

impl PlanExtractor for StepCountExtractor {
    fn name(&self) -> &'static str {
        ExtractorKind::StepCount.name()
    }

    fn extract(&self, text: &str) -> Option<u32> {
        let count = text
            .lines()
            .filter(|line| PLAN_STEP_REGEX.is_match(line))
            .count();
        if count == 0 {
            None
        } else {
            u32::try_from(count).ok()
        }
    }
}

/// Reads `plan found (<n> steps)`, case-insensitively. First occurrence wins.
///
/// A count too large for `u32` yields `Some(0)`: the annotation was there, so
/// later extractors must not substitute a different length.
#[derive(Debug, Clone, Copy, Default)]
pub struct AnnotatedCountExtractor;

impl PlanExtractor for AnnotatedCountExtractor {
    fn name(&self) -> &'static str {
        ExtractorKind::AnnotatedCount.name()
    }

    fn extract(&self, text: &str) -> Option<u32> {
        let digits = ANNOTATED_COUNT_REGEX.captures(text)?.get(1)?.as_str();
        match digits.parse::<u32>() {
            Ok(len) => Some(len),
            Err(e) => {
                debug!(value = digits, error = %e, "annotated plan length out of range");
                Some(0)
            }
        }
    }
}

/// Config-facing names for the available extractors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum ExtractorKind {
    /// `plan found (<n> steps)`
    AnnotatedCount,
    /// numbered `<n>: (` step lines
    StepCount,
}

impl ExtractorKind {
    pub fn name(self) -> &'static str {
        match self {
            ExtractorKind::AnnotatedCount => "annotated-count",
            ExtractorKind::StepCount => "step-count",
        }
    }

    /// Instantiate the strategy behind this name.
    pub fn build(self) -> Box<dyn PlanExtractor> {
        match self {
            ExtractorKind::AnnotatedCount => Box::new(AnnotatedCountExtractor),
            ExtractorKind::StepCount => Box::new(StepCountExtractor),
        }
    }
}

impl std::fmt::Display for ExtractorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl std::str::FromStr for ExtractorKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('_', "-").as_str() {
            "annotated-count" => Ok(ExtractorKind::AnnotatedCount),
            "step-count" => Ok(ExtractorKind::StepCount),
            _ => Err(ConfigError::UnknownExtractor(s.to_string())),
        }
    }
}

impl TryFrom<String> for ExtractorKind {
    type Error = ConfigError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ExtractorKind> for String {
    fn from(kind: ExtractorKind) -> Self {
        kind.name().to_string()
    }
}
