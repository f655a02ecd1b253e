//! CSV persistence for the results table.
//!
//! ```text
//! domain,problem,planner,success,time_s,plan_len
//! blocksworld,p01.pddl,MCTS,true,2.3140,18
//! blocksworld,p01.pddl,A*,false,300.0021,NA
//! ```
//!
//! `plan_len` is `NA` whenever there is no metric, never `0`. During a sweep
//! rows are appended one complete line per write, so an interrupted sweep
//! leaves a readable file holding only finished cells.

use crate::errors::HarnessError;
use crate::model::{ExperimentTable, RunResult};
use crate::planner::PlannerKind;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Column order of the results table.
pub const HEADER: [&str; 6] = ["domain", "problem", "planner", "success", "time_s", "plan_len"];

/// Marker for "no metric" cells.
pub const MISSING: &str = "NA";

/// Incremental writer used by the sweep.
#[derive(Debug)]
pub struct ResultWriter {
    path: PathBuf,
    file: File,
}

impl ResultWriter {
    /// Create (or truncate) the results file and write the header.
    pub fn create(path: &Path) -> Result<Self, HarnessError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| HarnessError::CreateDirFailed {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        let file = File::create(path).map_err(|source| HarnessError::StoreWriteFailed {
            path: path.to_path_buf(),
            source,
        })?;
        let mut writer = Self {
            path: path.to_path_buf(),
            file,
        };
        writer.write_line(&header_line())?;
        Ok(writer)
    }

    /// Append one row and flush it.
    pub fn append(&mut self, row: &RunResult) -> Result<(), HarnessError> {
        self.write_line(&format_row(row))
    }

    /// Flush to disk and close.
    pub fn finish(self) -> Result<PathBuf, HarnessError> {
        self.file
            .sync_all()
            .map_err(|source| HarnessError::StoreWriteFailed {
                path: self.path.clone(),
                source,
            })?;
        Ok(self.path)
    }

    fn write_line(&mut self, line: &str) -> Result<(), HarnessError> {
        let mut bytes = Vec::with_capacity(line.len() + 1);
        bytes.extend_from_slice(line.as_bytes());
        bytes.push(b'\n');
        self.file
            .write_all(&bytes)
            .and_then(|_| self.file.flush())
            .map_err(|source| HarnessError::StoreWriteFailed {
                path: self.path.clone(),
                source,
            })
    }
}

/// Read a results table back.
///
/// Legacy tables that recorded `0` for failed runs are normalised: a failed
/// row never carries a plan length.
pub fn read_table(path: &Path) -> Result<ExperimentTable, HarnessError> {
    let content = fs::read_to_string(path).map_err(|source| HarnessError::StoreReadFailed {
        path: path.to_path_buf(),
        source,
    })?;
    parse_table(path, &content)
}

fn parse_table(path: &Path, content: &str) -> Result<ExperimentTable, HarnessError> {
    let malformed = |line: usize, message: String| HarnessError::MalformedRow {
        path: path.to_path_buf(),
        line,
        message,
    };

    let records = split_records(content.trim_start_matches('\u{feff}'))
        .map_err(|(line, message)| malformed(line, message))?;
    let mut records = records.into_iter();

    let (header_no, header_fields) = records
        .next()
        .ok_or_else(|| malformed(1, "missing header row".to_string()))?;
    if header_fields.iter().map(|f| f.trim()).ne(HEADER.iter().copied()) {
        return Err(malformed(
            header_no,
            format!("expected header '{}'", header_line()),
        ));
    }

    let mut table = ExperimentTable::new();
    for (line_no, fields) in records {
        let row = parse_row(&fields).map_err(|m| malformed(line_no, m))?;
        table.push(row);
    }
    Ok(table)
}

fn header_line() -> String {
    HEADER.join(",")
}

/// Render one row as a CSV line (no trailing newline).
pub fn format_row(row: &RunResult) -> String {
    let plan_len = row
        .plan_len
        .map(|n| n.to_string())
        .unwrap_or_else(|| MISSING.to_string());
    [
        escape_field(&row.domain),
        escape_field(&row.problem),
        escape_field(row.planner.label()),
        row.success.to_string(),
        format!("{:.4}", row.time_s),
        plan_len,
    ]
    .join(",")
}

fn parse_row(fields: &[String]) -> Result<RunResult, String> {
    if fields.len() != HEADER.len() {
        return Err(format!(
            "expected {} fields, found {}",
            HEADER.len(),
            fields.len()
        ));
    }

    let planner: PlannerKind = fields[2].parse().map_err(|e| format!("{}", e))?;
    let success = match fields[3].trim().to_lowercase().as_str() {
        "true" => true,
        "false" => false,
        other => return Err(format!("invalid success value '{}'", other)),
    };
    let time_s: f64 = fields[4]
        .trim()
        .parse()
        .map_err(|_| format!("invalid time_s value '{}'", fields[4]))?;
    if !time_s.is_finite() || time_s < 0.0 {
        return Err(format!("time_s must be a non-negative number, got '{}'", fields[4]));
    }
    let plan_len = match fields[5].trim() {
        "" | MISSING => None,
        raw => Some(
            raw.parse::<u32>()
                .map_err(|_| format!("invalid plan_len value '{}'", raw))?,
        ),
    };

    Ok(RunResult {
        domain: fields[0].clone(),
        problem: fields[1].clone(),
        planner,
        success,
        time_s,
        plan_len: if success { plan_len } else { None },
    })
}

pub(crate) fn escape_field(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

/// Split CSV text into records, honouring double-quoted fields that may
/// contain commas, quotes and line breaks.
///
/// Each record carries the line number it starts on. Blank lines are skipped.
/// Errors carry the line number of the offending record.
pub(crate) fn split_records(content: &str) -> Result<Vec<(usize, Vec<String>)>, (usize, String)> {
    let mut records = Vec::new();
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut line = 1;
    let mut record_start = 1;
    let mut chars = content.chars().peekable();

    let mut end_record = |fields: &mut Vec<String>, current: &mut String, start: usize| {
        if fields.is_empty() && current.trim().is_empty() {
            current.clear();
            return;
        }
        fields.push(std::mem::take(current));
        records.push((start, std::mem::take(fields)));
    };

    while let Some(c) = chars.next() {
        match (c, in_quotes) {
            ('"', true) => {
                if chars.peek() == Some(&'"') {
                    current.push('"');
                    chars.next();
                } else {
                    in_quotes = false;
                }
            }
            ('"', false) if current.is_empty() => in_quotes = true,
            (',', false) => fields.push(std::mem::take(&mut current)),
            ('\r', false) if chars.peek() == Some(&'\n') => {}
            ('\n', false) => {
                end_record(&mut fields, &mut current, record_start);
                line += 1;
                record_start = line;
            }
            ('\n', true) => {
                current.push(c);
                line += 1;
            }
            _ => current.push(c),
        }
    }
    if in_quotes {
        return Err((record_start, "unterminated quoted field".to_string()));
    }
    end_record(&mut fields, &mut current, record_start);
    Ok(records)
}

/// Write to a sibling temp file, fsync, then rename over `path`.
pub(crate) fn atomic_write(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let name = path
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or("table");
    let tmp = path.with_file_name(format!(".{}.tmp.{}", name, std::process::id()));
    let mut file = File::create(&tmp)?;
    file.write_all(bytes)?;
    file.sync_all()?;
    fs::rename(&tmp, path)
}
