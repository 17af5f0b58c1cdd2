//! Human-readable "why today" text for a task.

use crate::conditions::ConditionVector;
use crate::crop::CropInfo;
use crate::task::TaskKind;

pub fn explain(kind: &TaskKind, c: &ConditionVector, crop: &CropInfo) -> String {
    let name = crop.crop_type.as_str();
    let age = c.crop_age_days;
    match kind {
        TaskKind::Irrigation => format!(
            "Soil moisture low ({:.1}%) - {name} plants need water",
            c.soil_moisture_pct
        ),
        TaskKind::Fertilizer => format!("{name} at day {age} - vegetative stage needs nutrients"),
        TaskKind::PestControl => format!(
            "High pest risk at day {age} with {:.1}% humidity",
            c.humidity_pct
        ),
        TaskKind::Harvest => format!("{name} mature at day {age} - ready for harvest"),
        TaskKind::DrainageCheck => format!(
            "Heavy rain expected ({:.1}mm) - check drainage for {name}",
            c.rainfall_mm
        ),
        TaskKind::ShadeManagement => format!(
            "High temperature ({:.1}°C) - provide shade for {name}",
            c.temperature_c
        ),
        TaskKind::FrostProtection => format!(
            "Low temperature ({:.1}°C) - protect {name} from frost",
            c.temperature_c
        ),
        TaskKind::Weeding => format!("Weed growth detected - remove competing plants from {name}"),
        TaskKind::Pruning => format!("{name} at optimal pruning stage ({age} days)"),
        TaskKind::SoilTesting => format!("Regular soil health check due for {name}"),
        TaskKind::GeneralCare => format!("Routine maintenance and observation for {name}"),
        TaskKind::Custom(_) => format!("Farming task for {name} at day {age}"),
    }
}

/// Reason attached to a task that rolls into tomorrow's backlog.
pub fn carried(previous: &str) -> String {
    const PREFIX: &str = "Pending from previous day - ";
    // Don't stack the prefix on every extra day.
    let base = previous.strip_prefix(PREFIX).unwrap_or(previous);
    format!("{PREFIX}{base}")
}
