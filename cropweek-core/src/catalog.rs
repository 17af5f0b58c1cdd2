//! Static task catalog: per-kind weight, duration and carryover patience.
//!
//! The standard table is built once per process and shared read-only.
//! Callers that need different numbers clone it and apply overrides.

use crate::error::ScheduleIssue;
use crate::task::{Priority, TaskKind};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::OnceLock;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    /// 1 = most important.
    pub priority_weight: u8,
    /// Hours.
    pub duration: u32,
    /// Days a task may be carried over before it is dropped.
    pub max_delay: u32,
}

impl CatalogEntry {
    pub const fn new(priority_weight: u8, duration: u32, max_delay: u32) -> Self {
        Self {
            priority_weight,
            duration,
            max_delay,
        }
    }

    /// Used for any kind the catalog does not know.
    pub const GENERIC: CatalogEntry = CatalogEntry::new(5, 1, 7);

    /// Bucket the numeric weight into a priority level.
    pub fn default_priority(&self) -> Priority {
        match self.priority_weight {
            0 | 1 => Priority::High,
            2 => Priority::Medium,
            _ => Priority::Low,
        }
    }
}

/// One `[[catalog]]` row in a config file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogOverride {
    pub kind: TaskKind,
    pub weight: u8,
    pub duration: u32,
    pub max_delay: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskCatalog {
    entries: BTreeMap<TaskKind, CatalogEntry>,
}

static STANDARD: OnceLock<TaskCatalog> = OnceLock::new();

impl TaskCatalog {
    pub fn empty() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    /// The built-in table, initialized on first use.
    pub fn standard() -> &'static TaskCatalog {
        STANDARD.get_or_init(|| {
            let mut c = TaskCatalog::empty();
            c.insert(TaskKind::Irrigation, CatalogEntry::new(1, 2, 2));
            c.insert(TaskKind::Fertilizer, CatalogEntry::new(2, 1, 3));
            c.insert(TaskKind::PestControl, CatalogEntry::new(1, 1, 1));
            c.insert(TaskKind::Harvest, CatalogEntry::new(1, 3, 0));
            c.insert(TaskKind::Pruning, CatalogEntry::new(3, 2, 5));
            c.insert(TaskKind::Weeding, CatalogEntry::new(2, 2, 4));
            c.insert(TaskKind::SoilTesting, CatalogEntry::new(4, 1, 10));
            c.insert(TaskKind::GeneralCare, CatalogEntry::new(4, 1, 7));
            c.insert(TaskKind::DrainageCheck, CatalogEntry::new(1, 1, 1));
            c.insert(TaskKind::ShadeManagement, CatalogEntry::new(2, 1, 2));
            c.insert(TaskKind::FrostProtection, CatalogEntry::new(1, 1, 1));
            c
        })
    }

    pub fn insert(&mut self, kind: TaskKind, entry: CatalogEntry) {
        self.entries.insert(kind, entry);
    }

    pub fn apply_overrides(&mut self, overrides: &[CatalogOverride]) {
        for o in overrides {
            self.insert(o.kind.clone(), CatalogEntry::new(o.weight, o.duration, o.max_delay));
        }
    }

    pub fn get(&self, kind: &TaskKind) -> Option<&CatalogEntry> {
        self.entries.get(kind)
    }

    pub fn contains(&self, kind: &TaskKind) -> bool {
        self.entries.contains_key(kind)
    }

    /// Entry for `kind`, falling back to `CatalogEntry::GENERIC`.
    pub fn lookup(&self, kind: &TaskKind) -> CatalogEntry {
        self.get(kind).copied().unwrap_or(CatalogEntry::GENERIC)
    }

    /// Like `lookup`, but reports the gap when the fallback was used.
    pub fn resolve(&self, kind: &TaskKind) -> (CatalogEntry, Option<ScheduleIssue>) {
        match self.get(kind) {
            Some(e) => (*e, None),
            None => (
                CatalogEntry::GENERIC,
                Some(ScheduleIssue::gap(format!(
                    "task kind '{kind}' is not in the catalog; using duration 1, max_delay 7"
                ))),
            ),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&TaskKind, &CatalogEntry)> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for TaskCatalog {
    fn default() -> Self {
        TaskCatalog::standard().clone()
    }
}
