//! Per-run log files for human debugging.
//!
//! Every attempted cell gets one file, failures and timeouts included:
//!
//! ```text
//! runs_logs/blocksworld__p01.pddl__ASTAR.log
//!
//! $ java -cp classes_build:lib/pddl4j-4.0.0.jar fr.uga.pddl4j.examples.asp.ASP ...
//!
//! <merged planner output>
//!
//! [harness] exited with code 0 after 1.2034s
//! ```
//!
//! The harness never reads these back.

use crate::errors::HarnessError;
use crate::model::ProblemInstance;
use crate::planner::PlannerKind;
use crate::runner::Invocation;
use std::fs;
use std::path::{Path, PathBuf};

/// Writes one log file per (domain, problem, planner).
#[derive(Debug, Clone)]
pub struct ArtifactLogger {
    dir: PathBuf,
}

impl ArtifactLogger {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Create the log directory if needed.
    pub fn ensure_dir(&self) -> Result<(), HarnessError> {
        fs::create_dir_all(&self.dir).map_err(|source| HarnessError::CreateDirFailed {
            path: self.dir.clone(),
            source,
        })
    }

    /// Path of the log for one cell.
    pub fn path_for(&self, problem: &ProblemInstance, planner: PlannerKind) -> PathBuf {
        self.dir.join(artifact_file_name(&problem.domain, &problem.name, planner))
    }

    /// Write the command line and captured output for one invocation.
    pub fn write(
        &self,
        problem: &ProblemInstance,
        planner: PlannerKind,
        invocation: &Invocation,
    ) -> Result<PathBuf, HarnessError> {
        let path = self.path_for(problem, planner);
        fs::write(&path, render(invocation)).map_err(|source| HarnessError::ArtifactWriteFailed {
            path: path.clone(),
            source,
        })?;
        Ok(path)
    }
}

/// `{domain}__{problem}__{TAG}.log`.
///
/// Bytes outside `[A-Za-z0-9.-]` are written as `%XX`, `_` and `%` included,
/// so distinct cells never share a file and `__` only ever separates parts.
pub fn artifact_file_name(domain: &str, problem: &str, planner: PlannerKind) -> String {
    format!(
        "{}__{}__{}.log",
        sanitize(domain),
        sanitize(problem),
        planner.tag()
    )
}

fn sanitize(part: &str) -> String {
    let mut out = String::with_capacity(part.len());
    for byte in part.bytes() {
        if byte.is_ascii_alphanumeric() || matches!(byte, b'.' | b'-') {
            out.push(byte as char);
        } else {
            out.push_str(&format!("%{:02X}", byte));
        }
    }
    out
}

fn render(invocation: &Invocation) -> String {
    let mut content = format!("$ {}\n\n", invocation.command_display());
    content.push_str(&invocation.output);
    if !invocation.output.ends_with('\n') {
        content.push('\n');
    }
    content.push_str(&format!(
        "\n[harness] {} after {:.4}s\n",
        invocation.termination,
        invocation.elapsed.as_secs_f64()
    ));
    content
}
