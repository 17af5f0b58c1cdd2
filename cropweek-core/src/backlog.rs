//! Backlog scheduler: score, rank and cap carried-over work.
//!
//! Algorithm per day (deterministic):
//! 1) drop tasks whose relevance rule fails (weeding/general care never fail)
//! 2) score survivors: base + relevance + weather + days pending, times the
//!    priority multiplier
//! 3) stable sort by score DESC, so ties keep backlog order
//! 4) evict tasks that would exceed their catalog max_delay
//! 5) first `MAX_BACKLOG_PER_DAY` run today, the rest roll into tomorrow with
//!    days_pending + 1 and priority escalated one step

use crate::catalog::TaskCatalog;
use crate::conditions::ConditionVector;
use crate::error::ScheduleIssue;
use crate::predicates::{is_always_relevant, is_relevant, is_weather_appropriate};
use crate::task::TaskRecord;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info};

/// Backlog items allowed next to the primary task. With the primary task this
/// caps a day at three visible items.
pub const MAX_BACKLOG_PER_DAY: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringWeights {
    pub base: f64,
    pub relevance_bonus: f64,
    pub weather_bonus: f64,
    /// Added per day the task has been pending.
    pub urgency_per_day: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            base: 50.0,
            relevance_bonus: 30.0,
            weather_bonus: 20.0,
            urgency_per_day: 2.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum DropReason {
    NoLongerRelevant,
    ExceededMaxDelay { max_delay: u32 },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DroppedTask {
    pub task: TaskRecord,
    #[serde(flatten)]
    pub reason: DropReason,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScoredTask {
    pub task: TaskRecord,
    pub relevant: bool,
    pub weather_appropriate: bool,
    pub score: f64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AdvanceOutcome {
    /// Runs today beside the primary task (at most `MAX_BACKLOG_PER_DAY`).
    pub scheduled: Vec<TaskRecord>,
    /// Tomorrow's backlog.
    pub overflow: Vec<TaskRecord>,
    /// Discarded for good.
    pub dropped: Vec<DroppedTask>,
    pub issues: Vec<ScheduleIssue>,
}

#[derive(Debug, Clone)]
pub struct BacklogScheduler {
    catalog: Arc<TaskCatalog>,
    weights: ScoringWeights,
}

impl BacklogScheduler {
    pub fn new(catalog: Arc<TaskCatalog>) -> Self {
        Self {
            catalog,
            weights: ScoringWeights::default(),
        }
    }

    pub fn with_weights(mut self, weights: ScoringWeights) -> Self {
        self.weights = weights;
        self
    }

    pub fn weights(&self) -> &ScoringWeights {
        &self.weights
    }

    pub fn score(&self, task: &TaskRecord, relevant: bool, weather_appropriate: bool) -> f64 {
        let w = &self.weights;
        let mut score = w.base;
        if relevant {
            score += w.relevance_bonus;
        }
        if weather_appropriate {
            score += w.weather_bonus;
        }
        score += task.days_pending as f64 * w.urgency_per_day;
        score * task.priority.multiplier()
    }

    /// Steps 1-3: relevance filter, scoring and stable ranking.
    pub fn rank(
        &self,
        backlog: Vec<TaskRecord>,
        c: &ConditionVector,
    ) -> (Vec<ScoredTask>, Vec<DroppedTask>) {
        let mut ranked = Vec::with_capacity(backlog.len());
        let mut dropped = Vec::new();

        for task in backlog {
            let relevant = is_relevant(&task.task_kind, c);
            if !relevant && !is_always_relevant(&task.task_kind) {
                info!(
                    task_id = %task.id,
                    kind = %task.task_kind,
                    "dropping task: no longer relevant"
                );
                dropped.push(DroppedTask {
                    task,
                    reason: DropReason::NoLongerRelevant,
                });
                continue;
            }

            let weather_appropriate = is_weather_appropriate(&task.task_kind, c);
            let score = self.score(&task, relevant, weather_appropriate);
            ranked.push(ScoredTask {
                task,
                relevant,
                weather_appropriate,
                score,
            });
        }

        // sort_by is stable: equal scores keep their backlog order.
        ranked.sort_by(|a, b| b.score.total_cmp(&a.score));
        (ranked, dropped)
    }

    /// Run one day of backlog handling.
    pub fn advance(&self, backlog: Vec<TaskRecord>, c: &ConditionVector) -> AdvanceOutcome {
        if backlog.is_empty() {
            return AdvanceOutcome::default();
        }

        let (ranked, mut dropped) = self.rank(backlog, c);
        let mut issues = Vec::new();
        let mut survivors = Vec::with_capacity(ranked.len());

        for scored in ranked {
            let (entry, gap) = self.catalog.resolve(&scored.task.task_kind);
            issues.extend(gap);

            if scored.task.days_pending + 1 > entry.max_delay {
                info!(
                    task_id = %scored.task.id,
                    kind = %scored.task.task_kind,
                    days_pending = scored.task.days_pending,
                    max_delay = entry.max_delay,
                    "discarding task: exceeded max delay"
                );
                dropped.push(DroppedTask {
                    task: scored.task,
                    reason: DropReason::ExceededMaxDelay {
                        max_delay: entry.max_delay,
                    },
                });
                continue;
            }

            debug!(
                task_id = %scored.task.id,
                score = scored.score,
                relevant = scored.relevant,
                weather_ok = scored.weather_appropriate,
                "backlog candidate"
            );
            survivors.push(scored.task);
        }

        let overflow: Vec<TaskRecord> = survivors
            .split_off(survivors.len().min(MAX_BACKLOG_PER_DAY))
            .iter()
            .map(TaskRecord::rolled_forward)
            .collect();

        let scheduled = survivors
            .into_iter()
            .map(TaskRecord::carried_over)
            .collect();

        AdvanceOutcome {
            scheduled,
            overflow,
            dropped,
            issues,
        }
    }
}
