use anyhow::{Context, Result};
use cropweek_core::{OutcomeCounters, WeeklyPlan};
use std::fs;
use std::path::PathBuf;

pub fn cropweek_home() -> Result<PathBuf> {
    if let Ok(dir) = std::env::var("CROPWEEK_HOME") {
        return Ok(PathBuf::from(dir));
    }
    let home = std::env::var("HOME").context("HOME is not set")?;
    Ok(PathBuf::from(home).join(".cropweek"))
}

pub fn ensure_cropweek_home() -> Result<PathBuf> {
    let dir = cropweek_home()?;
    fs::create_dir_all(&dir).with_context(|| format!("create {}", dir.display()))?;
    Ok(dir)
}

pub fn last_plan_path() -> Result<PathBuf> {
    Ok(ensure_cropweek_home()?.join("last_plan.json"))
}

pub fn outcomes_path() -> Result<PathBuf> {
    Ok(ensure_cropweek_home()?.join("outcomes.json"))
}

pub fn write_last_plan(plan: &WeeklyPlan) -> Result<()> {
    let p = last_plan_path()?;
    let json = serde_json::to_string_pretty(plan)?;
    fs::write(&p, json).with_context(|| format!("write {}", p.display()))?;
    Ok(())
}

pub fn read_last_plan() -> Result<WeeklyPlan> {
    let p = last_plan_path()?;
    let s = fs::read_to_string(&p)
        .with_context(|| format!("read {} (run `cropweek plan` first)", p.display()))?;
    serde_json::from_str(&s).with_context(|| format!("parse {}", p.display()))
}

pub fn read_outcomes() -> Result<OutcomeCounters> {
    let p = outcomes_path()?;
    if !p.exists() {
        return Ok(OutcomeCounters::new());
    }
    let s = fs::read_to_string(&p).with_context(|| format!("read {}", p.display()))?;
    serde_json::from_str(&s).with_context(|| format!("parse {}", p.display()))
}

pub fn write_outcomes(outcomes: &OutcomeCounters) -> Result<()> {
    let p = outcomes_path()?;
    let json = serde_json::to_string_pretty(outcomes)?;
    fs::write(&p, json).with_context(|| format!("write {}", p.display()))?;
    Ok(())
}
