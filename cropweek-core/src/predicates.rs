//! Per-kind rules evaluated against a day's conditions.
//!
//! `is_relevant` decides whether a pending task still applies at all.
//! `is_weather_appropriate` only nudges its score.

use crate::conditions::ConditionVector;
use crate::task::TaskKind;

/// Kinds that survive the relevance filter whatever the conditions.
pub const ALWAYS_RELEVANT: [TaskKind; 2] = [TaskKind::Weeding, TaskKind::GeneralCare];

pub fn is_always_relevant(kind: &TaskKind) -> bool {
    ALWAYS_RELEVANT.contains(kind)
}

pub fn is_relevant(kind: &TaskKind, c: &ConditionVector) -> bool {
    let age = c.crop_age_days;
    match kind {
        TaskKind::Irrigation => c.soil_moisture_pct < 60.0,
        TaskKind::Fertilizer => (15..=50).contains(&age) && c.rainfall_mm < 5.0,
        TaskKind::PestControl => c.humidity_pct > 70.0 || c.temperature_c > 30.0,
        TaskKind::Harvest => age >= 70,
        TaskKind::Weeding | TaskKind::GeneralCare => true,
        TaskKind::Pruning => (30..=80).contains(&age),
        TaskKind::SoilTesting => age % 30 == 0,
        TaskKind::DrainageCheck => c.rainfall_mm > 5.0,
        TaskKind::ShadeManagement => c.temperature_c > 35.0,
        TaskKind::FrostProtection => c.temperature_c < 10.0,
        TaskKind::Custom(_) => true,
    }
}

pub fn is_weather_appropriate(kind: &TaskKind, c: &ConditionVector) -> bool {
    let rain = c.rainfall_mm;
    let temp = c.temperature_c;
    match kind {
        TaskKind::Irrigation => rain < 5.0,
        TaskKind::Fertilizer => rain < 3.0 && temp < 35.0,
        TaskKind::PestControl => rain <= 10.0,
        TaskKind::Harvest => rain < 2.0,
        TaskKind::Pruning => !(rain > 5.0 || temp > 35.0),
        TaskKind::DrainageCheck => rain > 5.0,
        TaskKind::ShadeManagement => temp > 30.0,
        TaskKind::FrostProtection => temp < 15.0,
        _ => true,
    }
}
