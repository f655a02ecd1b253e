//! Machine-readable record of one sweep.
//!
//! Written next to the results as `sweep-manifest.json` so a results table can
//! be traced back to the exact configuration and timing that produced it.

use crate::config::{BenchConfig, BenchToml};
use crate::errors::HarnessError;
use crate::store::atomic_write;
use crate::sweep::{SkippedDomain, SweepReport};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SweepManifest {
    pub sweep_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub ended_at: DateTime<Utc>,
    pub duration_secs: f64,
    /// Configuration after env and CLI overrides
    pub config: BenchToml,
    pub attempted: usize,
    pub succeeded: usize,
    pub timed_out: usize,
    pub skipped_domains: Vec<SkippedDomain>,
    pub cancelled: bool,
    pub results_path: PathBuf,
    pub logs_dir: PathBuf,
}

impl SweepManifest {
    pub fn from_report(config: &BenchConfig, report: &SweepReport) -> Self {
        let duration_secs = (report.ended_at - report.started_at)
            .to_std()
            .map(|d| d.as_secs_f64())
            .unwrap_or(0.0);
        Self {
            sweep_id: Uuid::new_v4(),
            started_at: report.started_at,
            ended_at: report.ended_at,
            duration_secs,
            config: config.toml.clone(),
            attempted: report.attempted(),
            succeeded: report.succeeded(),
            timed_out: report.timed_out,
            skipped_domains: report.skipped.clone(),
            cancelled: report.cancelled,
            results_path: report.results_path.clone(),
            logs_dir: report.logs_dir.clone(),
        }
    }

    /// Write as pretty JSON via temp file and rename.
    pub fn write(&self, path: &Path) -> Result<(), HarnessError> {
        let write_err = |source: std::io::Error| HarnessError::ManifestWriteFailed {
            path: path.to_path_buf(),
            source,
        };
        let json = serde_json::to_vec_pretty(self).map_err(|e| write_err(e.into()))?;
        atomic_write(path, &json).map_err(write_err)
    }

    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }
}
