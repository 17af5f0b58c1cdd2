use anyhow::{Context, Result, anyhow};
use chrono_tz::Tz;
use cropweek_core::{
    BacklogScheduler, CatalogOverride, PlannerConfig, PrimaryPriority, ProjectionBounds, ScoringWeights,
    SelectorConfig, TaskCatalog,
};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use crate::state::ensure_cropweek_home;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub farm: FarmSection,
    pub planner: PlannerSection,
    pub projection: ProjectionBounds,
    pub scoring: ScoringWeights,
    pub selector: SelectorConfig,
    /// Per-kind overrides layered over the standard catalog.
    pub catalog: Vec<CatalogOverride>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FarmSection {
    /// IANA name, used to decide which day "today" is.
    pub timezone: String,
}

impl Default for FarmSection {
    fn default() -> Self {
        Self {
            timezone: "Asia/Kolkata".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlannerSection {
    /// Fixed seed for reproducible weeks; unset draws from entropy.
    pub seed: Option<u64>,
    pub primary_priority: PrimaryPriority,
}

impl Config {
    pub fn timezone(&self) -> Result<Tz> {
        self.farm
            .timezone
            .parse::<Tz>()
            .map_err(|e| anyhow!("invalid [farm] timezone {:?}: {e}", self.farm.timezone))
    }

    pub fn planner_config(&self) -> PlannerConfig {
        PlannerConfig {
            primary_priority: self.planner.primary_priority,
            projection: self.projection,
            scoring: self.scoring,
            selector: self.selector.clone(),
        }
    }

    /// Scheduler matching what `plan` builds with, for editing a saved plan.
    pub fn backlog_scheduler(&self) -> BacklogScheduler {
        BacklogScheduler::new(Arc::new(self.catalog())).with_weights(self.scoring)
    }

    pub fn catalog(&self) -> TaskCatalog {
        let mut catalog = TaskCatalog::standard().clone();
        catalog.apply_overrides(&self.catalog);
        catalog
    }
}

pub fn config_path() -> Result<PathBuf> {
    Ok(ensure_cropweek_home()?.join("config.toml"))
}

pub fn load_config() -> Result<Config> {
    let p = config_path()?;
    if !p.exists() {
        return Ok(Config::default());
    }
    let s = fs::read_to_string(&p).with_context(|| format!("read {}", p.display()))?;
    parse_config(&s)
}

pub fn parse_config(s: &str) -> Result<Config> {
    toml::from_str(s).context("parse config.toml")
}

pub fn save_config(cfg: &Config) -> Result<()> {
    let p = config_path()?;
    let s = toml::to_string_pretty(cfg).context("serialize config")?;
    fs::write(&p, s).with_context(|| format!("write {}", p.display()))?;
    Ok(())
}

pub fn init_config() -> Result<()> {
    let p = config_path()?;
    if p.exists() {
        println!("Config already exists: {}", p.display());
        return Ok(());
    }
    save_config(&Config::default())?;
    println!("Wrote {}", p.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use cropweek_core::TaskKind;

    #[test]
    fn empty_file_is_default() {
        assert_eq!(parse_config("").unwrap(), Config::default());
    }

    #[test]
    fn sections_override_defaults() {
        let cfg = parse_config(
            r#"
[farm]
timezone = "America/Chicago"

[planner]
seed = 7
primary_priority = "catalog"

[scoring]
weather_bonus = 5.0

[selector.day_restrictions]
fertilizer = [0, 3]

[[catalog]]
kind = "weeding"
weight = 1
duration = 3
max_delay = 2
"#,
        )
        .unwrap();

        assert_eq!(cfg.timezone().unwrap(), chrono_tz::America::Chicago);
        assert_eq!(cfg.planner.seed, Some(7));

        let planner = cfg.planner_config();
        assert_eq!(planner.primary_priority, PrimaryPriority::Catalog);
        assert_eq!(planner.scoring.weather_bonus, 5.0);
        assert_eq!(planner.scoring.base, 50.0);
        assert!(!planner.selector.is_eligible(&TaskKind::Fertilizer, 1));

        let weeding = cfg.catalog().lookup(&TaskKind::Weeding);
        assert_eq!((weeding.duration, weeding.max_delay), (3, 2));
    }

    #[test]
    fn bad_timezone_is_an_error() {
        let cfg = parse_config("[farm]\ntimezone = \"Mars/Olympus\"\n").unwrap();
        assert!(cfg.timezone().is_err());
    }

    #[test]
    fn default_round_trips_through_toml() {
        let s = toml::to_string_pretty(&Config::default()).unwrap();
        assert_eq!(parse_config(&s).unwrap(), Config::default());
    }
}
