//! Weekly plan builder.
//!
//! A plan is a strict 7-step fold: each day projects conditions, picks one
//! primary task, then runs the backlog scheduler on whatever the previous day
//! left over. Day N+1 cannot start before day N's overflow is known.

use crate::backlog::{BacklogScheduler, DroppedTask, ScoringWeights};
use crate::catalog::TaskCatalog;
use crate::conditions::{ConditionVector, ProjectionBounds, project};
use crate::crop::{CropInfo, CropType, GrowthStage};
use crate::error::ScheduleIssue;
use crate::feedback::{FeedbackSink, NoopFeedback};
use crate::reason;
use crate::request::PlanInput;
use crate::selector::{SelectorConfig, TaskSelector};
use crate::summary::{DaySummary, single_line};
use crate::task::{Priority, TaskRecord};
use chrono::{Days, NaiveDate};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::ops::Bound;
use std::sync::Arc;
use tracing::{debug, warn};

pub const DAYS_PER_PLAN: u32 = 7;

/// How the primary task's priority is chosen.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrimaryPriority {
    /// Always `high`.
    #[default]
    Fixed,
    /// Bucketed from the catalog weight of the selected kind.
    Catalog,
}

/// Tunables shared by every build of a planner.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlannerConfig {
    pub primary_priority: PrimaryPriority,
    pub projection: ProjectionBounds,
    pub scoring: ScoringWeights,
    pub selector: SelectorConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyPlan {
    pub date: NaiveDate,
    pub day_name: String,
    pub day_offset: u32,
    pub predicted_conditions: ConditionVector,
    pub primary_task: TaskRecord,
    /// Carried-over tasks running today, at most two.
    pub backlog_tasks: Vec<TaskRecord>,
    /// `primary_task` followed by `backlog_tasks`, minus anything postponed.
    pub all_tasks: Vec<TaskRecord>,
    /// Rolls into the next day's backlog, postponed copies included.
    pub overflow_tasks: Vec<TaskRecord>,
    /// Escalated copies of tasks postponed on this day.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub postponed_tasks: Vec<TaskRecord>,
    pub dropped_tasks: Vec<DroppedTask>,
    /// Hours.
    pub total_duration: u32,
    pub has_carry_over: bool,
    pub alerts: Vec<String>,
    pub single_line: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeeklyPlan {
    pub crop: CropType,
    pub stage: GrowthStage,
    pub days_since_planting: u32,
    pub week_start_date: NaiveDate,
    /// Keyed by ISO date (`YYYY-MM-DD`), so iteration is chronological.
    pub daily_plans: BTreeMap<String, DailyPlan>,
    /// Overflow left after the last day.
    pub final_backlog: Vec<TaskRecord>,
    pub weekly_goals: Vec<String>,
    pub week_summary: Vec<DaySummary>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub issues: Vec<ScheduleIssue>,
}

impl WeeklyPlan {
    pub fn days(&self) -> impl Iterator<Item = &DailyPlan> {
        self.daily_plans.values()
    }

    pub fn day(&self, date: NaiveDate) -> Option<&DailyPlan> {
        self.daily_plans.get(&iso(date))
    }

    /// Locate a task scheduled on any day.
    pub fn find_task(&self, task_id: &str) -> Option<(&DailyPlan, &TaskRecord)> {
        self.days()
            .find_map(|d| d.all_tasks.iter().find(|t| t.id == task_id).map(|t| (d, t)))
    }

    fn crop_info(&self) -> CropInfo {
        CropInfo::new(self.crop, self.stage, self.days_since_planting)
    }

    /// Take a scheduled task off its day and carry an escalated copy forward.
    ///
    /// The copy joins that day's overflow, and every later day's backlog is
    /// re-run against its stored conditions, so the copy is scheduled, carried
    /// or dropped like any other backlog task. Primary tasks and conditions are
    /// left as they were. A postponed primary stays in `primary_task`, flagged
    /// with the reason, but leaves `all_tasks`.
    pub fn postpone_task(
        &mut self,
        task_id: &str,
        why: &str,
        scheduler: &BacklogScheduler,
    ) -> Option<TaskRecord> {
        let (key, copy) = {
            let (key, day) = self
                .daily_plans
                .iter_mut()
                .find(|(_, d)| d.all_tasks.iter().any(|t| t.id == task_id))?;

            let pos = day.all_tasks.iter().position(|t| t.id == task_id)?;
            let mut original = day.all_tasks.remove(pos);
            original.postpone_reason = Some(why.to_string());
            day.backlog_tasks.retain(|t| t.id != task_id);
            if day.primary_task.id == task_id {
                day.primary_task.postpone_reason = Some(why.to_string());
            }

            let mut copy = original.rolled_forward();
            copy.reason = reason::carried(&original.reason);
            day.postponed_tasks.push(copy.clone());
            day.overflow_tasks.push(copy.clone());
            day.refresh();
            (key.clone(), copy)
        };

        self.replay_after(&key, scheduler);
        self.week_summary = self.days().map(DaySummary::from_day).collect();
        debug!(task_id, reason = why, "task postponed");
        Some(copy)
    }

    /// Re-run the backlog for every day after `key`, threading overflow as
    /// `build` does, and reset `final_backlog`.
    fn replay_after(&mut self, key: &str, scheduler: &BacklogScheduler) {
        let crop = self.crop_info();
        let mut backlog = self
            .daily_plans
            .get(key)
            .map(|d| d.overflow_tasks.clone())
            .unwrap_or_default();

        for day in self
            .daily_plans
            .range_mut::<str, _>((Bound::Excluded(key), Bound::Unbounded))
            .map(|(_, d)| d)
        {
            let c = day.predicted_conditions;
            let outcome = scheduler.advance(std::mem::take(&mut backlog), &c);
            for issue in outcome.issues {
                note(&mut self.issues, issue);
            }

            // Tasks postponed here already sit in `postponed_tasks`.
            let held: Vec<String> = day.postponed_tasks.iter().map(|t| t.id.clone()).collect();
            let fresh = |t: &TaskRecord| !held.contains(&t.id);
            let (scheduled, overflow) = annotate(
                outcome.scheduled.into_iter().filter(fresh).collect(),
                outcome.overflow.into_iter().filter(fresh).collect(),
                &c,
                &crop,
            );

            day.all_tasks = std::iter::once(&day.primary_task)
                .filter(|p| p.postpone_reason.is_none())
                .chain(&scheduled)
                .cloned()
                .collect();
            day.backlog_tasks = scheduled;
            day.overflow_tasks = overflow;
            day.overflow_tasks.extend(day.postponed_tasks.iter().cloned());
            day.dropped_tasks = outcome.dropped;
            day.refresh();

            debug!(
                date = %day.date,
                scheduled = day.backlog_tasks.len(),
                overflow = day.overflow_tasks.len(),
                "replanned day backlog"
            );
            backlog = day.overflow_tasks.clone();
        }

        self.final_backlog = backlog;
    }
}

impl DailyPlan {
    fn refresh(&mut self) {
        self.total_duration = self.all_tasks.iter().map(|t| t.estimated_duration).sum();
        self.has_carry_over = !self.backlog_tasks.is_empty();
        self.single_line = single_line(&self.all_tasks, self.day_offset == 0);
    }
}

/// Attach today's reasons: scheduled tasks get a fresh explanation, overflow
/// gets the carried-over prefix.
fn annotate(
    scheduled: Vec<TaskRecord>,
    overflow: Vec<TaskRecord>,
    c: &ConditionVector,
    crop: &CropInfo,
) -> (Vec<TaskRecord>, Vec<TaskRecord>) {
    let scheduled = scheduled
        .into_iter()
        .map(|t| {
            let why = reason::explain(&t.task_kind, c, crop);
            t.with_reason(why)
        })
        .collect();
    let overflow = overflow
        .into_iter()
        .map(|t| {
            let why = reason::carried(&reason::explain(&t.task_kind, c, crop));
            t.with_reason(why)
        })
        .collect();
    (scheduled, overflow)
}

fn iso(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

pub struct WeeklyPlanner<R, F = NoopFeedback> {
    catalog: Arc<TaskCatalog>,
    selector: TaskSelector,
    backlog: BacklogScheduler,
    config: PlannerConfig,
    rng: R,
    feedback: F,
}

impl WeeklyPlanner<SmallRng, NoopFeedback> {
    /// Reproducible planner: the same seed and inputs give the same plan.
    pub fn seeded(seed: u64) -> Self {
        Self::new(SmallRng::seed_from_u64(seed), NoopFeedback)
    }

    pub fn from_entropy() -> Self {
        Self::new(SmallRng::from_entropy(), NoopFeedback)
    }
}

impl<R: Rng, F: FeedbackSink> WeeklyPlanner<R, F> {
    pub fn new(rng: R, feedback: F) -> Self {
        let catalog = Arc::new(TaskCatalog::standard().clone());
        Self {
            backlog: BacklogScheduler::new(Arc::clone(&catalog)),
            selector: TaskSelector::default(),
            config: PlannerConfig::default(),
            catalog,
            rng,
            feedback,
        }
    }

    pub fn with_catalog(mut self, catalog: Arc<TaskCatalog>) -> Self {
        self.backlog = BacklogScheduler::new(Arc::clone(&catalog)).with_weights(self.config.scoring);
        self.catalog = catalog;
        self
    }

    pub fn with_config(mut self, config: PlannerConfig) -> Self {
        self.backlog = BacklogScheduler::new(Arc::clone(&self.catalog)).with_weights(config.scoring);
        self.selector = TaskSelector::new(config.selector.clone());
        self.config = config;
        self
    }

    /// Swap the feedback sink, keeping everything else.
    pub fn with_feedback<G: FeedbackSink>(self, feedback: G) -> WeeklyPlanner<R, G> {
        WeeklyPlanner {
            catalog: self.catalog,
            selector: self.selector,
            backlog: self.backlog,
            config: self.config,
            rng: self.rng,
            feedback,
        }
    }

    pub fn catalog(&self) -> &TaskCatalog {
        &self.catalog
    }

    pub fn config(&self) -> &PlannerConfig {
        &self.config
    }

    pub fn feedback(&self) -> &F {
        &self.feedback
    }

    pub fn backlog_scheduler(&self) -> &BacklogScheduler {
        &self.backlog
    }

    pub fn record_outcome(&mut self, task_id: &str, completed: bool) {
        self.feedback.record_outcome(task_id, completed);
    }

    /// Postpone a task in `plan` using this planner's catalog and weights.
    pub fn postpone(&self, plan: &mut WeeklyPlan, task_id: &str, why: &str) -> Option<TaskRecord> {
        plan.postpone_task(task_id, why, &self.backlog)
    }

    /// Build from a normalized request, carrying its issues into the plan.
    pub fn build_from(&mut self, input: PlanInput, week_start: NaiveDate) -> WeeklyPlan {
        let PlanInput {
            crop,
            conditions,
            backlog,
            issues,
        } = input;
        let mut plan = self.build(&crop, conditions.as_ref(), backlog, week_start);
        for issue in issues.into_iter().rev() {
            if !plan.issues.contains(&issue) {
                plan.issues.insert(0, issue);
            }
        }
        plan
    }

    pub fn build(
        &mut self,
        crop: &CropInfo,
        base: Option<&ConditionVector>,
        initial_backlog: Vec<TaskRecord>,
        week_start: NaiveDate,
    ) -> WeeklyPlan {
        let mut issues: Vec<ScheduleIssue> = Vec::new();
        if base.is_none() {
            note(
                &mut issues,
                ScheduleIssue::malformed("no usable base conditions; projecting from defaults"),
            );
        }

        let mut daily_plans = BTreeMap::new();
        let mut week_summary = Vec::with_capacity(DAYS_PER_PLAN as usize);
        let mut backlog = initial_backlog;

        for offset in 0..DAYS_PER_PLAN {
            let date = week_start
                .checked_add_days(Days::new(offset as u64))
                .unwrap_or(NaiveDate::MAX);
            let conditions = project(base, offset, &self.config.projection, &mut self.rng);

            let primary = self.primary_task(date, &conditions, crop, offset, &mut issues);

            let outcome = self.backlog.advance(std::mem::take(&mut backlog), &conditions);
            for issue in outcome.issues {
                note(&mut issues, issue);
            }

            let (backlog_tasks, overflow_tasks) =
                annotate(outcome.scheduled, outcome.overflow, &conditions, crop);

            let mut all_tasks = Vec::with_capacity(1 + backlog_tasks.len());
            all_tasks.push(primary.clone());
            all_tasks.extend(backlog_tasks.iter().cloned());

            let day = DailyPlan {
                date,
                day_name: date.format("%A").to_string(),
                day_offset: offset,
                predicted_conditions: conditions,
                total_duration: all_tasks.iter().map(|t| t.estimated_duration).sum(),
                has_carry_over: !backlog_tasks.is_empty(),
                alerts: conditions.alerts(),
                single_line: single_line(&all_tasks, offset == 0),
                primary_task: primary,
                backlog_tasks,
                all_tasks,
                overflow_tasks: overflow_tasks.clone(),
                postponed_tasks: Vec::new(),
                dropped_tasks: outcome.dropped,
            };

            debug!(
                date = %day.date,
                primary = %day.primary_task.task_kind,
                scheduled = day.backlog_tasks.len(),
                overflow = day.overflow_tasks.len(),
                dropped = day.dropped_tasks.len(),
                "planned day"
            );

            week_summary.push(DaySummary::from_day(&day));
            daily_plans.insert(iso(date), day);
            backlog = overflow_tasks;
        }

        WeeklyPlan {
            crop: crop.crop_type,
            stage: crop.growth_stage,
            days_since_planting: crop.days_since_planting,
            week_start_date: week_start,
            daily_plans,
            final_backlog: backlog,
            weekly_goals: crop
                .growth_stage
                .weekly_goals()
                .iter()
                .map(|g| g.to_string())
                .collect(),
            week_summary,
            issues,
        }
    }

    fn primary_task(
        &self,
        date: NaiveDate,
        conditions: &ConditionVector,
        crop: &CropInfo,
        offset: u32,
        issues: &mut Vec<ScheduleIssue>,
    ) -> TaskRecord {
        let kind = self.selector.select(conditions, crop, offset);
        let (entry, gap) = self.catalog.resolve(&kind);
        if let Some(gap) = gap {
            note(issues, gap);
        }

        let priority = match self.config.primary_priority {
            PrimaryPriority::Fixed => Priority::High,
            PrimaryPriority::Catalog => entry.default_priority(),
        };
        let why = reason::explain(&kind, conditions, crop);

        TaskRecord::new(format!("main_{}", date.format("%Y%m%d")), kind)
            .with_priority(priority)
            .with_duration(entry.duration)
            .with_reason(why)
    }
}

fn note(issues: &mut Vec<ScheduleIssue>, issue: ScheduleIssue) {
    if !issues.contains(&issue) {
        warn!(%issue, "recovered scheduling issue");
        issues.push(issue);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feedback::OutcomeCounters;
    use crate::task::TaskKind;

    fn start() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, 2).unwrap()
    }

    fn tomato(age: u32) -> CropInfo {
        CropInfo::new(CropType::Tomato, GrowthStage::Vegetative, age)
    }

    #[test]
    fn plan_has_seven_consecutive_days() {
        let mut planner = WeeklyPlanner::seeded(1);
        let plan = planner.build(&tomato(30), Some(&ConditionVector::baseline(30)), vec![], start());

        assert_eq!(plan.daily_plans.len(), 7);
        let dates: Vec<NaiveDate> = plan.days().map(|d| d.date).collect();
        assert_eq!(dates[0], start());
        assert_eq!(dates[6], NaiveDate::from_ymd_opt(2026, 3, 8).unwrap());
        assert_eq!(plan.days().next().unwrap().day_name, "Monday");
        assert!(plan.days().all(|d| d.primary_task.id.starts_with("main_2026030")));
        assert_eq!(plan.week_summary.len(), 7);
    }

    #[test]
    fn dry_start_picks_irrigation_on_day_zero() {
        let mut planner = WeeklyPlanner::seeded(3);
        let base = ConditionVector::new(10, 28.0, 65.0, 0.0, 15.0, 2);
        let plan = planner.build(&tomato(10), Some(&base), vec![], start());

        let day0 = plan.day(start()).unwrap();
        assert_eq!(day0.primary_task.task_kind, TaskKind::Irrigation);
        assert_eq!(day0.primary_task.priority, Priority::High);
        assert_eq!(day0.primary_task.estimated_duration, 2);
        assert!(!day0.primary_task.is_carry_over);
    }

    #[test]
    fn missing_base_falls_back_and_reports() {
        let mut planner = WeeklyPlanner::seeded(3);
        let plan = planner.build(&tomato(30), None, vec![], start());

        let day3 = plan.days().nth(3).unwrap();
        assert_eq!(day3.predicted_conditions, ConditionVector::fallback(3));
        assert!(matches!(plan.issues[0], ScheduleIssue::MalformedInput(_)));
    }

    #[test]
    fn catalog_priority_policy() {
        let config = PlannerConfig {
            primary_priority: PrimaryPriority::Catalog,
            ..PlannerConfig::default()
        };
        let mut planner = WeeklyPlanner::seeded(5).with_config(config);
        let base = ConditionVector::new(60, 25.0, 65.0, 0.0, 42.0, 2);
        let plan = planner.build(&tomato(60), Some(&base), vec![], start());

        // general_care has weight 4.
        let day0 = plan.day(start()).unwrap();
        assert_eq!(day0.primary_task.task_kind, TaskKind::GeneralCare);
        assert_eq!(day0.primary_task.priority, Priority::Low);
    }

    #[test]
    fn overflow_threads_into_next_day() {
        let mut planner = WeeklyPlanner::seeded(11);
        let backlog: Vec<TaskRecord> = (0..4)
            .map(|i| {
                TaskRecord::new(format!("care{i}"), TaskKind::GeneralCare)
                    .with_priority(Priority::Low)
                    .carried_over()
            })
            .collect();

        let plan = planner.build(&tomato(60), Some(&ConditionVector::baseline(60)), backlog, start());
        let days: Vec<&DailyPlan> = plan.days().collect();

        assert_eq!(days[0].backlog_tasks.len(), 2);
        assert_eq!(days[0].overflow_tasks.len(), 2);
        assert_eq!(days[1].backlog_tasks.len(), 2);
        let day1_ids: Vec<&str> = days[1].backlog_tasks.iter().map(|t| t.id.as_str()).collect();
        let day0_overflow: Vec<&str> = days[0].overflow_tasks.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(day1_ids, day0_overflow);
        assert!(days[1].overflow_tasks.is_empty());
        assert!(plan.final_backlog.is_empty());
        assert!(days[0].overflow_tasks[0].reason.starts_with("Pending from previous day"));
    }

    #[test]
    fn postponing_last_primary_lands_in_final_backlog() {
        let mut planner = WeeklyPlanner::seeded(2);
        let mut plan = planner.build(&tomato(30), Some(&ConditionVector::baseline(30)), vec![], start());
        let id = "main_20260308";
        assert!(plan.find_task(id).is_some());

        let copy = planner.postpone(&mut plan, id, "tractor broke").unwrap();
        assert_eq!(copy.days_pending, 1);
        assert_eq!(copy.priority, Priority::Urgent);
        assert!(copy.is_carry_over);
        assert_eq!(copy.postpone_reason.as_deref(), Some("tractor broke"));
        assert!(plan.final_backlog.iter().any(|t| t.id == id));

        let last = plan.days().last().unwrap();
        assert!(last.all_tasks.is_empty());
        assert_eq!(last.total_duration, 0);
        assert_eq!(last.single_line, "No tasks scheduled");
        assert_eq!(last.primary_task.postpone_reason.as_deref(), Some("tractor broke"));
        assert_eq!(last.postponed_tasks.len(), 1);
        assert!(plan.find_task(id).is_none());
        assert!(planner.postpone(&mut plan, "nope", "x").is_none());
    }

    #[test]
    fn postponing_mid_week_carries_into_next_day() {
        let mut planner = WeeklyPlanner::seeded(3);
        let mut plan = planner.build(&tomato(30), Some(&ConditionVector::baseline(30)), vec![], start());
        let id = "main_20260304";
        let conditions_before: Vec<ConditionVector> =
            plan.days().map(|d| d.predicted_conditions).collect();

        plan.postpone_task(id, "rain", planner.backlog_scheduler()).unwrap();

        let days: Vec<&DailyPlan> = plan.days().collect();
        assert!(days[2].all_tasks.is_empty());
        assert!(days[2].overflow_tasks.iter().any(|t| t.id == id));

        // Day 3 picks the copy up as carried-over work beside its own primary.
        let carried = days[3].backlog_tasks.iter().find(|t| t.id == id).unwrap();
        assert_eq!(carried.days_pending, 1);
        assert_eq!(carried.priority, Priority::Urgent);
        assert_eq!(days[3].all_tasks[0], days[3].primary_task);
        assert_eq!(days[3].all_tasks.len(), 2);
        assert!(days[3].has_carry_over);
        assert_eq!(
            days[3].total_duration,
            days[3].all_tasks.iter().map(|t| t.estimated_duration).sum::<u32>()
        );
        assert_eq!(plan.week_summary[3].additional_tasks, vec![carried.task_kind.clone()]);
        assert!(plan.final_backlog.is_empty());

        let conditions_after: Vec<ConditionVector> =
            plan.days().map(|d| d.predicted_conditions).collect();
        assert_eq!(conditions_before, conditions_after);

        // Postponing it again pushes it one more day without duplicating it.
        let again = plan.postpone_task(id, "still wet", planner.backlog_scheduler()).unwrap();
        assert_eq!(again.days_pending, 2);
        let days: Vec<&DailyPlan> = plan.days().collect();
        assert!(days[3].backlog_tasks.iter().all(|t| t.id != id));
        assert_eq!(days[4].backlog_tasks.iter().filter(|t| t.id == id).count(), 1);
        let seen: usize = plan
            .days()
            .map(|d| d.all_tasks.iter().filter(|t| t.id == id).count())
            .sum();
        assert_eq!(seen, 1);
    }

    #[test]
    fn outcomes_reach_the_sink() {
        let mut planner = WeeklyPlanner::seeded(2).with_feedback(OutcomeCounters::new());
        planner.record_outcome("main_20260302", true);
        planner.record_outcome("main_20260303", false);
        assert_eq!(planner.feedback().reward("main_20260302"), 10);
        assert_eq!(planner.feedback().total_reward(), 5);
    }
}
