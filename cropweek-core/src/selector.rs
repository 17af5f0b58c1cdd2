//! Primary task selection: ordered condition rules, first match wins.
//!
//! Order matters. Water stress outranks nutrient and pest work, so the
//! moisture and drainage rules sit at the top.

use crate::conditions::ConditionVector;
use crate::crop::CropInfo;
use crate::task::TaskKind;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

struct Rule {
    kind: TaskKind,
    applies: fn(&ConditionVector, &CropInfo) -> bool,
}

fn rules() -> [Rule; 7] {
    [
        Rule {
            kind: TaskKind::Irrigation,
            applies: |c, _| c.soil_moisture_pct < 25.0,
        },
        Rule {
            kind: TaskKind::DrainageCheck,
            applies: |c, _| c.rainfall_mm > 10.0,
        },
        Rule {
            kind: TaskKind::Fertilizer,
            applies: |c, crop| (20..=40).contains(&c.crop_age_days) && crop.is_tomato(),
        },
        Rule {
            kind: TaskKind::PestControl,
            applies: |c, _| (35..=55).contains(&c.crop_age_days),
        },
        Rule {
            kind: TaskKind::Harvest,
            applies: |c, _| c.crop_age_days >= 70,
        },
        Rule {
            kind: TaskKind::ShadeManagement,
            applies: |c, _| c.temperature_c > 35.0,
        },
        Rule {
            kind: TaskKind::FrostProtection,
            applies: |c, _| c.temperature_c < 10.0,
        },
    ]
}

/// Optional day-of-week filter layered over the rule list.
///
/// A kind listed here may only be picked on the given day offsets (0..=6).
/// When a matching rule is filtered out, evaluation moves on to the next rule.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectorConfig {
    pub day_restrictions: BTreeMap<TaskKind, Vec<u32>>,
}

impl SelectorConfig {
    pub fn restrict(mut self, kind: TaskKind, offsets: impl IntoIterator<Item = u32>) -> Self {
        self.day_restrictions.insert(kind, offsets.into_iter().collect());
        self
    }

    pub fn is_eligible(&self, kind: &TaskKind, day_offset: u32) -> bool {
        if *kind == TaskKind::GeneralCare {
            return true;
        }
        self.day_restrictions
            .get(kind)
            .is_none_or(|days| days.contains(&day_offset))
    }
}

#[derive(Debug, Clone, Default)]
pub struct TaskSelector {
    config: SelectorConfig,
}

impl TaskSelector {
    pub fn new(config: SelectorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SelectorConfig {
        &self.config
    }

    pub fn select(&self, c: &ConditionVector, crop: &CropInfo, day_offset: u32) -> TaskKind {
        rules()
            .into_iter()
            .find(|r| (r.applies)(c, crop) && self.config.is_eligible(&r.kind, day_offset))
            .map(|r| r.kind)
            .unwrap_or(TaskKind::GeneralCare)
    }
}

/// Selection with no day filter.
pub fn select_primary(c: &ConditionVector, crop: &CropInfo, day_offset: u32) -> TaskKind {
    TaskSelector::default().select(c, crop, day_offset)
}
