//! Task model for the weekly farm planner.
//!
//! A `TaskRecord` is the unit that flows through selection, backlog scoring and
//! carryover. Everything here is plain serde data so plans can be handed
//! straight to a JSON layer.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Kind of farming action. Unknown names are kept verbatim as `Custom`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum TaskKind {
    Irrigation,
    Fertilizer,
    PestControl,
    Harvest,
    Pruning,
    Weeding,
    GeneralCare,
    DrainageCheck,
    ShadeManagement,
    FrostProtection,
    SoilTesting,
    Custom(String),
}

impl TaskKind {
    /// Every built-in kind, in catalog order.
    pub const BUILTIN: [TaskKind; 11] = [
        TaskKind::Irrigation,
        TaskKind::Fertilizer,
        TaskKind::PestControl,
        TaskKind::Harvest,
        TaskKind::Pruning,
        TaskKind::Weeding,
        TaskKind::SoilTesting,
        TaskKind::GeneralCare,
        TaskKind::DrainageCheck,
        TaskKind::ShadeManagement,
        TaskKind::FrostProtection,
    ];

    pub fn as_str(&self) -> &str {
        match self {
            TaskKind::Irrigation => "irrigation",
            TaskKind::Fertilizer => "fertilizer",
            TaskKind::PestControl => "pest_control",
            TaskKind::Harvest => "harvest",
            TaskKind::Pruning => "pruning",
            TaskKind::Weeding => "weeding",
            TaskKind::GeneralCare => "general_care",
            TaskKind::DrainageCheck => "drainage_check",
            TaskKind::ShadeManagement => "shade_management",
            TaskKind::FrostProtection => "frost_protection",
            TaskKind::SoilTesting => "soil_testing",
            TaskKind::Custom(name) => name,
        }
    }

    pub fn is_custom(&self) -> bool {
        matches!(self, TaskKind::Custom(_))
    }

    /// "pest_control" -> "Pest Control"
    pub fn display_name(&self) -> String {
        self.as_str()
            .split('_')
            .filter(|w| !w.is_empty())
            .map(|w| {
                let mut chars = w.chars();
                match chars.next() {
                    Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                    None => String::new(),
                }
            })
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl From<String> for TaskKind {
    fn from(s: String) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "irrigation" => TaskKind::Irrigation,
            "fertilizer" => TaskKind::Fertilizer,
            "pest_control" => TaskKind::PestControl,
            "harvest" => TaskKind::Harvest,
            "pruning" => TaskKind::Pruning,
            "weeding" => TaskKind::Weeding,
            "general_care" => TaskKind::GeneralCare,
            "drainage_check" => TaskKind::DrainageCheck,
            "shade_management" => TaskKind::ShadeManagement,
            "frost_protection" => TaskKind::FrostProtection,
            "soil_testing" => TaskKind::SoilTesting,
            _ => TaskKind::Custom(s.trim().to_string()),
        }
    }
}

impl From<&str> for TaskKind {
    fn from(s: &str) -> Self {
        TaskKind::from(s.to_string())
    }
}

impl From<TaskKind> for String {
    fn from(kind: TaskKind) -> Self {
        kind.as_str().to_string()
    }
}

impl fmt::Display for TaskKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ordered most urgent first, so `Priority::Urgent < Priority::Low`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Urgent = 0,
    High = 1,
    Medium = 2,
    Low = 3,
}

impl Priority {
    /// One step more urgent; saturates at `Urgent`.
    pub fn escalate(self) -> Self {
        match self {
            Priority::Low => Priority::Medium,
            Priority::Medium => Priority::High,
            Priority::High | Priority::Urgent => Priority::Urgent,
        }
    }

    /// Score multiplier used when ranking the backlog.
    pub fn multiplier(self) -> f64 {
        match self {
            Priority::Urgent => 3.0,
            Priority::High => 2.0,
            Priority::Medium => 1.5,
            Priority::Low => 1.0,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Priority::Urgent => "urgent",
            Priority::High => "high",
            Priority::Medium => "medium",
            Priority::Low => "low",
        }
    }
}

impl FromStr for Priority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "urgent" => Ok(Priority::Urgent),
            "high" => Ok(Priority::High),
            "medium" => Ok(Priority::Medium),
            "low" => Ok(Priority::Low),
            other => Err(format!("unknown priority: {other}")),
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single scheduled (or pending) farming task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskRecord {
    pub id: String,
    pub task_kind: TaskKind,
    pub priority: Priority,
    pub reason: String,

    /// Hours.
    pub estimated_duration: u32,

    /// True when the task came from an earlier day's backlog.
    pub is_carry_over: bool,

    /// Days the task has survived without being performed.
    pub days_pending: u32,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub postpone_reason: Option<String>,
}

impl TaskRecord {
    pub fn new(id: impl Into<String>, task_kind: TaskKind) -> Self {
        Self {
            id: id.into(),
            task_kind,
            priority: Priority::Medium,
            reason: String::new(),
            estimated_duration: 1,
            is_carry_over: false,
            days_pending: 0,
            postpone_reason: None,
        }
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = reason.into();
        self
    }

    pub fn with_duration(mut self, hours: u32) -> Self {
        self.estimated_duration = hours;
        self
    }

    pub fn with_days_pending(mut self, days: u32) -> Self {
        self.days_pending = days;
        self
    }

    pub fn carried_over(mut self) -> Self {
        self.is_carry_over = true;
        self
    }

    /// The copy that rolls into tomorrow's backlog.
    pub fn rolled_forward(&self) -> Self {
        let mut next = self.clone();
        next.days_pending += 1;
        next.priority = self.priority.escalate();
        next.is_carry_over = true;
        next
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escalation_saturates_at_urgent() {
        assert_eq!(Priority::Low.escalate(), Priority::Medium);
        assert_eq!(Priority::Medium.escalate(), Priority::High);
        assert_eq!(Priority::High.escalate(), Priority::Urgent);
        assert_eq!(Priority::Urgent.escalate(), Priority::Urgent);
    }

    #[test]
    fn urgent_sorts_before_low() {
        let mut ps = vec![Priority::Low, Priority::Urgent, Priority::Medium, Priority::High];
        ps.sort();
        assert_eq!(ps, vec![Priority::Urgent, Priority::High, Priority::Medium, Priority::Low]);
    }

    #[test]
    fn unknown_kind_round_trips_as_custom() {
        let kind: TaskKind = serde_json::from_str("\"mulching\"").unwrap();
        assert_eq!(kind, TaskKind::Custom("mulching".to_string()));
        assert_eq!(serde_json::to_string(&kind).unwrap(), "\"mulching\"");

        let known: TaskKind = serde_json::from_str("\"pest_control\"").unwrap();
        assert_eq!(known, TaskKind::PestControl);
    }

    #[test]
    fn display_name_title_cases_words() {
        assert_eq!(TaskKind::DrainageCheck.display_name(), "Drainage Check");
        assert_eq!(TaskKind::Irrigation.display_name(), "Irrigation");
    }

    #[test]
    fn rolled_forward_escalates_and_ages() {
        let t = TaskRecord::new("t1", TaskKind::Weeding)
            .with_priority(Priority::Low)
            .with_days_pending(2);
        let next = t.rolled_forward();
        assert_eq!(next.priority, Priority::Medium);
        assert_eq!(next.days_pending, 3);
        assert!(next.is_carry_over);
        assert_eq!(next.id, "t1");
    }

    #[test]
    fn task_record_json_uses_snake_case_fields() {
        let t = TaskRecord::new("main_20260301", TaskKind::Irrigation)
            .with_priority(Priority::High)
            .with_duration(2);
        let json = serde_json::to_string(&t).unwrap();
        assert!(json.contains("\"task_kind\":\"irrigation\""));
        assert!(json.contains("\"priority\":\"high\""));
        assert!(json.contains("\"estimated_duration\":2"));
        assert!(json.contains("\"is_carry_over\":false"));
        assert!(!json.contains("postpone_reason"));
    }
}
