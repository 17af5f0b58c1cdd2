//! cropweek-core: Weekly crop task planning with backlog carryover

pub mod backlog;
pub mod catalog;
pub mod conditions;
pub mod crop;
pub mod error;
pub mod feedback;
pub mod planner;
pub mod predicates;
pub mod reason;
pub mod request;
pub mod selector;
pub mod summary;
pub mod task;

pub use backlog::{
    AdvanceOutcome, BacklogScheduler, DropReason, DroppedTask, MAX_BACKLOG_PER_DAY, ScoredTask,
    ScoringWeights,
};
pub use catalog::{CatalogEntry, CatalogOverride, TaskCatalog};
pub use conditions::{ConditionVector, ProjectionBounds, project};
pub use crop::{CropInfo, CropType, GrowthStage};
pub use error::ScheduleIssue;
pub use feedback::{FeedbackSink, NoopFeedback, OutcomeCounters, OutcomeTally};
pub use planner::{DailyPlan, PlannerConfig, PrimaryPriority, WeeklyPlan, WeeklyPlanner};
pub use request::{ConditionsInput, PendingTaskInput, PendingTaskRecord, PlanInput, PlanRequest};
pub use selector::{SelectorConfig, TaskSelector, select_primary};
pub use summary::{DaySummary, render_week};
pub use task::{Priority, TaskKind, TaskRecord};
