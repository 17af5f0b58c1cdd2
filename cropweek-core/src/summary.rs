//! Compact per-day display and plain-text week rendering.

use crate::planner::{DailyPlan, WeeklyPlan};
use crate::task::{TaskKind, TaskRecord};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt::Write;

pub fn emoji(kind: &TaskKind) -> &'static str {
    match kind {
        TaskKind::Irrigation => "💧",
        TaskKind::Fertilizer => "🌱",
        TaskKind::PestControl => "🐛",
        TaskKind::Harvest => "🌾",
        TaskKind::Pruning => "✂️",
        TaskKind::Weeding => "🌿",
        TaskKind::GeneralCare => "✅",
        TaskKind::DrainageCheck => "🌧️",
        TaskKind::ShadeManagement => "☀️",
        TaskKind::FrostProtection => "❄️",
        TaskKind::SoilTesting | TaskKind::Custom(_) => "📋",
    }
}

/// One-line label for a day: first task, plus a count of the rest.
///
/// Today reads `💧 Irrigation +2 more`; later days read `💧 Irrigation (+2)`.
pub fn single_line(tasks: &[TaskRecord], is_today: bool) -> String {
    let Some(first) = tasks.first() else {
        return "No tasks scheduled".to_string();
    };
    let head = format!("{} {}", emoji(&first.task_kind), first.task_kind.display_name());
    match (tasks.len() - 1, is_today) {
        (0, _) => head,
        (n, true) => format!("{head} +{n} more"),
        (n, false) => format!("{head} (+{n})"),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DaySummary {
    pub date: NaiveDate,
    pub day_name: String,
    pub is_today: bool,
    pub main_task: TaskKind,
    pub additional_tasks: Vec<TaskKind>,
    /// Tasks pushed to the next day.
    pub postponed_count: usize,
    pub total_duration: u32,
    pub single_line: String,
}

impl DaySummary {
    pub fn from_day(day: &DailyPlan) -> Self {
        Self {
            date: day.date,
            day_name: day.day_name.clone(),
            is_today: day.day_offset == 0,
            main_task: day.primary_task.task_kind.clone(),
            additional_tasks: day.backlog_tasks.iter().map(|t| t.task_kind.clone()).collect(),
            postponed_count: day.overflow_tasks.len(),
            total_duration: day.total_duration,
            single_line: day.single_line.clone(),
        }
    }
}

/// Plain-text rendering used by the CLI.
pub fn render_week(plan: &WeeklyPlan) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{} ({}, day {}) - week of {}",
        plan.crop, plan.stage, plan.days_since_planting, plan.week_start_date
    );
    for goal in &plan.weekly_goals {
        let _ = writeln!(out, "  goal: {goal}");
    }
    out.push('\n');

    for day in plan.days() {
        let _ = writeln!(
            out,
            "{} {:<9} {:<32} {}h",
            day.date, day.day_name, day.single_line, day.total_duration
        );
        for task in &day.all_tasks {
            let _ = writeln!(
                out,
                "    [{}] {} - {}",
                task.priority,
                task.task_kind.display_name(),
                task.reason
            );
        }
        for alert in &day.alerts {
            let _ = writeln!(out, "    ! {alert}");
        }
        for dropped in &day.dropped_tasks {
            let _ = writeln!(out, "    - dropped {}", dropped.task.id);
        }
    }

    if !plan.final_backlog.is_empty() {
        let _ = writeln!(out, "\ncarried into next week: {}", plan.final_backlog.len());
    }
    for issue in &plan.issues {
        let _ = writeln!(out, "note: {issue}");
    }
    out
}
