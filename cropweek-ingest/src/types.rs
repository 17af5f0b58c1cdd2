use anyhow::{Result, bail};
use csv::StringRecord;

/// Column positions of a backlog export, resolved from its header row.
///
/// Only `task` is required. Matching ignores case and surrounding spaces;
/// unknown columns are ignored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BacklogColumns {
    pub task: usize,
    pub priority: Option<usize>,
    pub days_pending: Option<usize>,
    pub id: Option<usize>,
    pub reason: Option<usize>,
}

impl BacklogColumns {
    pub fn from_headers(headers: &StringRecord) -> Result<Self> {
        let find = |names: &[&str]| {
            headers
                .iter()
                .position(|h| names.iter().any(|n| h.trim().eq_ignore_ascii_case(n)))
        };

        let Some(task) = find(&["task", "task_kind"]) else {
            bail!("backlog CSV has no 'task' column (headers: {:?})", headers);
        };

        Ok(Self {
            task,
            priority: find(&["priority"]),
            days_pending: find(&["days_pending", "days pending"]),
            id: find(&["id", "task_id"]),
            reason: find(&["reason"]),
        })
    }
}
