//! Outcome feedback: where "done" / "postponed" signals go.
//!
//! The planner never keeps history itself. Callers choose a sink: drop the
//! signal, count it in memory, or forward it to storage of their own.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub trait FeedbackSink {
    fn record_outcome(&mut self, task_id: &str, completed: bool);
}

/// Discards every outcome.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopFeedback;

impl FeedbackSink for NoopFeedback {
    fn record_outcome(&mut self, _task_id: &str, _completed: bool) {}
}

/// Reward for a completed task.
pub const COMPLETION_REWARD: i64 = 10;
/// Penalty for a postponed task.
pub const POSTPONE_PENALTY: i64 = -5;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutcomeTally {
    pub completed: u32,
    pub postponed: u32,
}

impl OutcomeTally {
    pub fn reward(&self) -> i64 {
        self.completed as i64 * COMPLETION_REWARD + self.postponed as i64 * POSTPONE_PENALTY
    }
}

/// In-memory per-task counters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutcomeCounters {
    tallies: BTreeMap<String, OutcomeTally>,
}

impl OutcomeCounters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, task_id: &str) -> OutcomeTally {
        self.tallies.get(task_id).copied().unwrap_or_default()
    }

    pub fn reward(&self, task_id: &str) -> i64 {
        self.get(task_id).reward()
    }

    pub fn total_reward(&self) -> i64 {
        self.tallies.values().map(OutcomeTally::reward).sum()
    }

    pub fn len(&self) -> usize {
        self.tallies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tallies.is_empty()
    }
}

impl FeedbackSink for OutcomeCounters {
    fn record_outcome(&mut self, task_id: &str, completed: bool) {
        let tally = self.tallies.entry(task_id.to_string()).or_default();
        if completed {
            tally.completed += 1;
        } else {
            tally.postponed += 1;
        }
    }
}

impl<S: FeedbackSink + ?Sized> FeedbackSink for &mut S {
    fn record_outcome(&mut self, task_id: &str, completed: bool) {
        (**self).record_outcome(task_id, completed);
    }
}
