//! Backlog CSV import.
//!
//! Expected header (only `task` is required, order is free):
//!   task,priority,days_pending,id,reason
//!   Pest Control,high,2,,aphids on the east rows
//!
//! Rows come out as `PendingTaskInput` so they go through the same
//! normalization as a JSON request.

use anyhow::{Context, Result};
use cropweek_core::{PendingTaskInput, PendingTaskRecord, Priority};
use csv::StringRecord;
use regex::Regex;
use std::io::Read;
use std::path::Path;
use tracing::{debug, warn};

use crate::types::BacklogColumns;

/// Turns free-form task names into catalog keys:
/// "Pest Control" -> "pest_control", "  Drainage-Check " -> "drainage_check".
pub struct TaskNameNormalizer {
    separators: Regex,
}

impl TaskNameNormalizer {
    pub fn new() -> Result<Self> {
        Ok(Self {
            separators: Regex::new(r"[^a-z0-9]+")?,
        })
    }

    pub fn normalize(&self, raw: &str) -> String {
        let lower = raw.trim().to_ascii_lowercase();
        self.separators
            .replace_all(&lower, "_")
            .trim_matches('_')
            .to_string()
    }
}

fn cell(record: &StringRecord, idx: Option<usize>) -> Option<&str> {
    idx.and_then(|i| record.get(i))
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

/// Parse a backlog export from any reader.
pub fn parse_backlog_reader<R: Read>(reader: R) -> Result<Vec<PendingTaskInput>> {
    let mut rdr = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let names = TaskNameNormalizer::new()?;
    let headers = rdr.headers().context("reading backlog CSV header")?.clone();
    let cols = BacklogColumns::from_headers(&headers)?;

    let mut out = Vec::new();
    for (line, result) in rdr.records().enumerate() {
        let record = result.with_context(|| format!("reading backlog row {}", line + 2))?;

        let Some(task) = cell(&record, Some(cols.task)).map(|t| names.normalize(t)) else {
            continue;
        };
        if task.is_empty() {
            continue;
        }

        let priority = cell(&record, cols.priority).map(|p| match p.parse::<Priority>() {
            Ok(p) => p.as_str().to_string(),
            Err(_) => {
                warn!(row = line + 2, priority = p, "unknown priority, using medium");
                Priority::Medium.as_str().to_string()
            }
        });

        let days_pending = cell(&record, cols.days_pending).map(|d| {
            d.parse::<u32>().map(i64::from).unwrap_or_else(|_| {
                warn!(row = line + 2, days_pending = d, "unparseable days_pending, using 0");
                0
            })
        });

        out.push(PendingTaskInput::Record(PendingTaskRecord {
            task: Some(task),
            id: cell(&record, cols.id).map(str::to_string),
            priority,
            days_pending,
            reason: cell(&record, cols.reason).map(str::to_string),
        }));
    }

    debug!(count = out.len(), "parsed backlog rows");
    Ok(out)
}

/// Parse a backlog CSV file.
pub fn parse_backlog_csv(path: impl AsRef<Path>) -> Result<Vec<PendingTaskInput>> {
    let path = path.as_ref();
    let file = std::fs::File::open(path).with_context(|| format!("opening {}", path.display()))?;
    parse_backlog_reader(file).with_context(|| format!("parsing {}", path.display()))
}
