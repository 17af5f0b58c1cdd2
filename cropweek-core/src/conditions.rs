//! Field conditions and the day-by-day projector.
//!
//! The projector ages the crop deterministically and nudges the weather and
//! soil fields by a bounded random amount. The random source is always passed
//! in, so a seeded RNG reproduces a week exactly.

use crate::error::ScheduleIssue;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Snapshot of one day's growing conditions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConditionVector {
    pub crop_age_days: u32,
    pub temperature_c: f64,
    /// 0-100.
    pub humidity_pct: f64,
    /// >= 0.
    pub rainfall_mm: f64,
    /// 0-100.
    pub soil_moisture_pct: f64,
    /// 1 = spring .. 4 = winter.
    pub season_code: u8,
}

/// Positional layout used by legacy callers:
/// `[crop_age, temperature, humidity, rainfall, soil_moisture, season]`.
pub const RAW_FIELD_COUNT: usize = 6;

impl ConditionVector {
    pub fn new(
        crop_age_days: u32,
        temperature_c: f64,
        humidity_pct: f64,
        rainfall_mm: f64,
        soil_moisture_pct: f64,
        season_code: u8,
    ) -> Self {
        Self {
            crop_age_days,
            temperature_c,
            humidity_pct: humidity_pct.clamp(0.0, 100.0),
            rainfall_mm: rainfall_mm.max(0.0),
            soil_moisture_pct: soil_moisture_pct.clamp(0.0, 100.0),
            season_code: season_code.clamp(1, 4),
        }
    }

    /// Typical mid-season reading, used when the caller supplies no conditions.
    pub fn baseline(crop_age_days: u32) -> Self {
        Self::new(crop_age_days, 28.0, 65.0, 0.0, 42.0, 2)
    }

    /// What the projector returns when it has nothing usable to project from.
    pub fn fallback(day_offset: u32) -> Self {
        Self::new(30 + day_offset, 25.0, 60.0, 0.0, 40.0, 2)
    }

    /// Build from the positional layout. Out-of-range values are clamped;
    /// too few fields or non-finite numbers are malformed.
    pub fn from_raw(raw: &[f64]) -> Result<Self, ScheduleIssue> {
        if raw.len() < RAW_FIELD_COUNT {
            return Err(ScheduleIssue::malformed(format!(
                "condition vector has {} fields, expected {RAW_FIELD_COUNT}",
                raw.len()
            )));
        }
        if let Some(idx) = raw[..RAW_FIELD_COUNT].iter().position(|v| !v.is_finite()) {
            return Err(ScheduleIssue::malformed(format!(
                "condition vector field {idx} is not a finite number"
            )));
        }

        Ok(Self::new(
            raw[0].max(0.0).round() as u32,
            raw[1],
            raw[2],
            raw[3],
            raw[4],
            raw[5].round().clamp(1.0, 4.0) as u8,
        ))
    }

    pub fn to_raw(&self) -> [f64; RAW_FIELD_COUNT] {
        [
            self.crop_age_days as f64,
            self.temperature_c,
            self.humidity_pct,
            self.rainfall_mm,
            self.soil_moisture_pct,
            self.season_code as f64,
        ]
    }

    /// Conditions that warrant attention right away, independent of the plan.
    pub fn alerts(&self) -> Vec<String> {
        let mut out = Vec::new();
        if self.soil_moisture_pct < 20.0 {
            out.push(format!(
                "CRITICAL: very low soil moisture ({:.1}%)",
                self.soil_moisture_pct
            ));
        }
        if self.temperature_c > 38.0 {
            out.push(format!("ALERT: extreme temperature ({:.1}°C)", self.temperature_c));
        }
        if self.rainfall_mm > 15.0 {
            out.push(format!("ALERT: heavy rainfall ({:.1}mm)", self.rainfall_mm));
        }
        out
    }
}

/// Perturbation bounds for the projector.
///
/// Each field gets `value + (r - center) * swing` with `r` uniform in [0, 1).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectionBounds {
    pub temperature_swing: f64,
    pub humidity_swing: f64,
    pub humidity_min: f64,
    pub humidity_max: f64,
    pub rainfall_swing: f64,
    /// Below 0.5 skews rainfall upward.
    pub rainfall_center: f64,
    /// Daily drying applied to soil moisture before the random swing.
    pub soil_drift: f64,
    pub soil_swing: f64,
    pub soil_min: f64,
    pub soil_max: f64,
}

impl Default for ProjectionBounds {
    fn default() -> Self {
        Self {
            temperature_swing: 4.0,
            humidity_swing: 20.0,
            humidity_min: 30.0,
            humidity_max: 90.0,
            rainfall_swing: 5.0,
            rainfall_center: 0.3,
            soil_drift: 2.0,
            soil_swing: 10.0,
            soil_min: 20.0,
            soil_max: 80.0,
        }
    }
}

/// Project `base` forward by `day_offset` days.
///
/// Draws exactly four values from `rng` (temperature, humidity, rainfall, soil
/// moisture, in that order) unless `base` is `None`, in which case the fixed
/// fallback vector is returned and nothing is drawn.
pub fn project<R: Rng>(
    base: Option<&ConditionVector>,
    day_offset: u32,
    bounds: &ProjectionBounds,
    rng: &mut R,
) -> ConditionVector {
    let Some(base) = base else {
        return ConditionVector::fallback(day_offset);
    };

    let mut draw = || rng.gen_range(0.0..1.0_f64);

    let temperature = base.temperature_c + (draw() - 0.5) * bounds.temperature_swing;
    let humidity = (base.humidity_pct + (draw() - 0.5) * bounds.humidity_swing)
        .clamp(bounds.humidity_min, bounds.humidity_max);
    let rainfall =
        (base.rainfall_mm + (draw() - bounds.rainfall_center) * bounds.rainfall_swing).max(0.0);
    let soil = (base.soil_moisture_pct - bounds.soil_drift
        + (draw() - 0.5) * bounds.soil_swing)
        .clamp(bounds.soil_min, bounds.soil_max);

    ConditionVector::new(
        base.crop_age_days.saturating_add(day_offset),
        temperature,
        humidity,
        rainfall,
        soil,
        base.season_code,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    #[test]
    fn short_raw_vector_is_malformed() {
        let err = ConditionVector::from_raw(&[10.0, 28.0, 65.0]).unwrap_err();
        assert!(matches!(err, ScheduleIssue::MalformedInput(_)));
        assert!(ConditionVector::from_raw(&[10.0, f64::NAN, 65.0, 0.0, 40.0, 2.0]).is_err());
    }

    #[test]
    fn raw_vector_is_clamped() {
        let c = ConditionVector::from_raw(&[-3.0, 28.0, 140.0, -1.0, 42.0, 9.0]).unwrap();
        assert_eq!(c.crop_age_days, 0);
        assert_eq!(c.humidity_pct, 100.0);
        assert_eq!(c.rainfall_mm, 0.0);
        assert_eq!(c.season_code, 4);
    }

    #[test]
    fn missing_base_uses_fallback_without_drawing() {
        let mut rng = SmallRng::seed_from_u64(7);
        let c = project(None, 3, &ProjectionBounds::default(), &mut rng);
        assert_eq!(c, ConditionVector::new(33, 25.0, 60.0, 0.0, 40.0, 2));

        // The stream was not consumed.
        let mut fresh = SmallRng::seed_from_u64(7);
        assert_eq!(rng.gen_range(0.0..1.0_f64), fresh.gen_range(0.0..1.0_f64));
    }

    #[test]
    fn projection_ages_crop_and_stays_in_bounds() {
        let base = ConditionVector::baseline(30);
        let bounds = ProjectionBounds::default();
        let mut rng = SmallRng::seed_from_u64(42);

        for offset in 0..7 {
            let c = project(Some(&base), offset, &bounds, &mut rng);
            assert_eq!(c.crop_age_days, 30 + offset);
            assert_eq!(c.season_code, base.season_code);
            assert!((c.temperature_c - 28.0).abs() <= 2.0);
            assert!((30.0..=90.0).contains(&c.humidity_pct));
            assert!(c.rainfall_mm >= 0.0);
            assert!((20.0..=80.0).contains(&c.soil_moisture_pct));
        }
    }

    #[test]
    fn same_seed_same_projection() {
        let base = ConditionVector::baseline(12);
        let bounds = ProjectionBounds::default();
        let mut a = SmallRng::seed_from_u64(99);
        let mut b = SmallRng::seed_from_u64(99);
        for offset in 0..7 {
            assert_eq!(
                project(Some(&base), offset, &bounds, &mut a),
                project(Some(&base), offset, &bounds, &mut b)
            );
        }
    }

    #[test]
    fn alerts_flag_extremes() {
        let c = ConditionVector::new(40, 39.0, 50.0, 20.0, 10.0, 2);
        let alerts = c.alerts();
        assert_eq!(alerts.len(), 3);
        assert!(ConditionVector::baseline(30).alerts().is_empty());
    }
}
