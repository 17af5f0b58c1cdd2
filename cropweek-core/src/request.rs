//! Loose plan request as it arrives over JSON or CSV, and its normalization
//! into typed planner input.
//!
//! Every default lives in [`PlanRequest::normalize`]. Past that point the
//! planner only sees typed records.

use crate::catalog::TaskCatalog;
use crate::conditions::ConditionVector;
use crate::crop::{CropInfo, CropType, GrowthStage};
use crate::error::ScheduleIssue;
use crate::task::{Priority, TaskKind, TaskRecord};
use serde::{Deserialize, Serialize};

const DEFAULT_DAYS_SINCE_PLANTING: u32 = 30;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlanRequest {
    pub crop: Option<String>,
    pub growth_stage: Option<String>,
    #[serde(alias = "daysSincePlanting")]
    pub days_since_planting: Option<i64>,
    pub conditions: Option<ConditionsInput>,
    pub pending_tasks: Vec<PendingTaskInput>,
}

/// Conditions either as the positional six-number vector or as named fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ConditionsInput {
    Positional(Vec<f64>),
    Named(NamedConditions),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NamedConditions {
    #[serde(alias = "crop_age_days")]
    pub crop_age: Option<f64>,
    #[serde(alias = "temperature_c")]
    pub temperature: Option<f64>,
    #[serde(alias = "humidity_pct")]
    pub humidity: Option<f64>,
    #[serde(alias = "rainfall_mm")]
    pub rainfall: Option<f64>,
    #[serde(alias = "soil_moisture_pct")]
    pub soil_moisture: Option<f64>,
    #[serde(alias = "season_code")]
    pub season: Option<f64>,
}

/// A pending task: just a kind name, or a record with optional fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PendingTaskInput {
    Name(String),
    Record(PendingTaskRecord),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PendingTaskRecord {
    #[serde(alias = "task_kind")]
    pub task: Option<String>,
    pub id: Option<String>,
    pub priority: Option<String>,
    pub days_pending: Option<i64>,
    pub reason: Option<String>,
}

/// Typed planner input plus whatever had to be defaulted on the way.
#[derive(Debug, Clone, PartialEq)]
pub struct PlanInput {
    pub crop: CropInfo,
    /// `None` when the supplied conditions were unusable.
    pub conditions: Option<ConditionVector>,
    pub backlog: Vec<TaskRecord>,
    pub issues: Vec<ScheduleIssue>,
}

impl PlanRequest {
    pub fn with_pending(mut self, tasks: impl IntoIterator<Item = PendingTaskInput>) -> Self {
        self.pending_tasks.extend(tasks);
        self
    }

    pub fn normalize(&self, catalog: &TaskCatalog) -> PlanInput {
        let mut issues = Vec::new();

        let crop_type = match self.crop.as_deref() {
            None => CropType::Tomato,
            Some(s) => s.parse().unwrap_or_else(|e: String| {
                issues.push(ScheduleIssue::malformed(e));
                CropType::Unknown
            }),
        };

        let growth_stage = match self.growth_stage.as_deref() {
            None => GrowthStage::Vegetative,
            Some(s) => s.parse().unwrap_or_else(|e: String| {
                issues.push(ScheduleIssue::malformed(format!("{e}; using vegetative")));
                GrowthStage::Vegetative
            }),
        };

        let days = match self.days_since_planting {
            None => DEFAULT_DAYS_SINCE_PLANTING,
            Some(d) if d < 0 => {
                issues.push(ScheduleIssue::malformed(format!(
                    "days_since_planting {d} is negative; using 0"
                )));
                0
            }
            Some(d) => u32::try_from(d).unwrap_or(u32::MAX),
        };

        let conditions = match &self.conditions {
            None => Some(ConditionVector::baseline(days)),
            Some(input) => match input.resolve(days) {
                Ok(c) => Some(c),
                Err(issue) => {
                    issues.push(issue);
                    None
                }
            },
        };

        let backlog = self
            .pending_tasks
            .iter()
            .enumerate()
            .filter_map(|(i, p)| p.to_record(i, catalog, &mut issues))
            .collect();

        PlanInput {
            crop: CropInfo::new(crop_type, growth_stage, days),
            conditions,
            backlog,
            issues,
        }
    }
}

impl ConditionsInput {
    fn resolve(&self, days_since_planting: u32) -> Result<ConditionVector, ScheduleIssue> {
        match self {
            ConditionsInput::Positional(raw) => ConditionVector::from_raw(raw),
            ConditionsInput::Named(n) => {
                let b = ConditionVector::baseline(days_since_planting).to_raw();
                ConditionVector::from_raw(&[
                    n.crop_age.unwrap_or(b[0]),
                    n.temperature.unwrap_or(b[1]),
                    n.humidity.unwrap_or(b[2]),
                    n.rainfall.unwrap_or(b[3]),
                    n.soil_moisture.unwrap_or(b[4]),
                    n.season.unwrap_or(b[5]),
                ])
            }
        }
    }
}

impl From<&str> for PendingTaskInput {
    fn from(kind: &str) -> Self {
        PendingTaskInput::Name(kind.to_string())
    }
}

impl PendingTaskInput {
    fn to_record(
        &self,
        index: usize,
        catalog: &TaskCatalog,
        issues: &mut Vec<ScheduleIssue>,
    ) -> Option<TaskRecord> {
        let blank = PendingTaskRecord::default();
        let (name, rec) = match self {
            PendingTaskInput::Name(name) => (Some(name.as_str()), &blank),
            PendingTaskInput::Record(rec) => (rec.task.as_deref(), rec),
        };

        let Some(name) = name.map(str::trim).filter(|n| !n.is_empty()) else {
            issues.push(ScheduleIssue::malformed(format!(
                "pending task #{index} has no task kind; skipped"
            )));
            return None;
        };

        let kind = TaskKind::from(name.to_string());
        let known = catalog.contains(&kind);
        if !known {
            if kind.is_custom() {
                issues.push(ScheduleIssue::malformed(format!(
                    "unknown task kind '{kind}'; treated as a generic task"
                )));
            } else {
                issues.push(ScheduleIssue::gap(format!("no catalog entry for '{kind}'")));
            }
        }

        let priority = match rec.priority.as_deref() {
            Some(p) => p.parse().unwrap_or_else(|e: String| {
                issues.push(ScheduleIssue::malformed(format!("{e}; using medium")));
                Priority::Medium
            }),
            None if known => Priority::Medium,
            None => Priority::Low,
        };

        let days_pending = match rec.days_pending {
            Some(d) if d < 0 => {
                issues.push(ScheduleIssue::malformed(format!(
                    "days_pending {d} for '{kind}' is negative; using 0"
                )));
                0
            }
            Some(d) => u32::try_from(d).unwrap_or(u32::MAX),
            None => 0,
        };

        let id = rec
            .id
            .clone()
            .unwrap_or_else(|| format!("pending_{index}_{}", kind.as_str()));

        Some(
            TaskRecord::new(id, kind.clone())
                .with_priority(priority)
                .with_duration(catalog.lookup(&kind).duration)
                .with_days_pending(days_pending)
                .with_reason(rec.reason.clone().unwrap_or_default())
                .carried_over(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> &'static TaskCatalog {
        TaskCatalog::standard()
    }

    #[test]
    fn empty_request_uses_defaults() {
        let input = PlanRequest::default().normalize(catalog());
        assert_eq!(input.crop, CropInfo::default());
        assert_eq!(input.conditions, Some(ConditionVector::baseline(30)));
        assert!(input.backlog.is_empty());
        assert!(input.issues.is_empty());
    }

    #[test]
    fn camel_case_alias_and_named_conditions() {
        let req: PlanRequest = serde_json::from_str(
            r#"{"crop":"rice","daysSincePlanting":12,"conditions":{"soil_moisture":18}}"#,
        )
        .unwrap();
        let input = req.normalize(catalog());

        assert_eq!(input.crop.crop_type, CropType::Rice);
        assert_eq!(input.crop.days_since_planting, 12);
        let c = input.conditions.unwrap();
        assert_eq!(c.crop_age_days, 12);
        assert_eq!(c.soil_moisture_pct, 18.0);
        assert_eq!(c.temperature_c, 28.0);
    }

    #[test]
    fn short_vector_is_reported_not_fatal() {
        let req: PlanRequest = serde_json::from_str(r#"{"conditions":[10, 28, 65]}"#).unwrap();
        let input = req.normalize(catalog());
        assert_eq!(input.conditions, None);
        assert!(matches!(input.issues[0], ScheduleIssue::MalformedInput(_)));
    }

    #[test]
    fn pending_tasks_mixed_shapes() {
        let req: PlanRequest = serde_json::from_str(
            r#"{"pending_tasks":[
                "weeding",
                {"task_kind":"irrigation","priority":"high","days_pending":3},
                {"task":"mulching"},
                {"priority":"low"},
                {"task":"pruning","priority":"asap","id":"p1"}
            ]}"#,
        )
        .unwrap();
        let input = req.normalize(catalog());

        let ids: Vec<&str> = input.backlog.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, ["pending_0_weeding", "pending_1_irrigation", "pending_2_mulching", "p1"]);

        let irrigation = &input.backlog[1];
        assert_eq!(irrigation.priority, Priority::High);
        assert_eq!(irrigation.days_pending, 3);
        assert_eq!(irrigation.estimated_duration, 2);
        assert!(irrigation.is_carry_over);

        let mulching = &input.backlog[2];
        assert!(mulching.task_kind.is_custom());
        assert_eq!(mulching.priority, Priority::Low);
        assert_eq!(mulching.estimated_duration, 1);

        assert_eq!(input.backlog[3].priority, Priority::Medium);
        // unknown kind, missing kind, bad priority
        assert_eq!(input.issues.len(), 3);
    }

    #[test]
    fn unknown_crop_and_stage_fall_back() {
        let req = PlanRequest {
            crop: Some("okra".into()),
            growth_stage: Some("budding".into()),
            days_since_planting: Some(-4),
            ..PlanRequest::default()
        };
        let input = req.normalize(catalog());
        assert_eq!(input.crop.crop_type, CropType::Unknown);
        assert_eq!(input.crop.growth_stage, GrowthStage::Vegetative);
        assert_eq!(input.crop.days_since_planting, 0);
        assert_eq!(input.issues.len(), 3);
    }
}
