use anyhow::{Context, Result, bail};
use chrono::{NaiveDate, Utc};
use clap::{Parser, Subcommand};
use cropweek_core::{FeedbackSink, PlanRequest, WeeklyPlan, WeeklyPlanner, render_week};
use cropweek_ingest::parse_backlog_csv;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod config;
mod state;

#[derive(Parser, Debug)]
#[command(
    name = "cropweek",
    version = concat!(env!("CARGO_PKG_VERSION"), " (", env!("CROPWEEK_BUILD_SHA"), ")"),
    about = "Weekly crop task planner with backlog carryover"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Build a 7-day plan and save it as the current plan
    Plan {
        /// JSON plan request (crop, growth_stage, conditions, pending_tasks)
        #[arg(long)]
        request: Option<PathBuf>,

        /// Backlog CSV appended to the request's pending tasks
        #[arg(long)]
        backlog: Option<PathBuf>,

        /// RNG seed (overrides [planner] seed)
        #[arg(long)]
        seed: Option<u64>,

        /// First day of the plan (default: today in the farm timezone)
        #[arg(long)]
        start: Option<NaiveDate>,

        /// Print the full plan as JSON
        #[arg(long)]
        json: bool,

        /// Carry the saved plan's final backlog into this plan
        #[arg(long = "continue")]
        carry: bool,
    },

    /// Postpone a task in the current plan
    Postpone {
        task_id: String,

        #[arg(long, default_value = "postponed by farmer")]
        reason: String,
    },

    /// Mark a task in the current plan as done
    Done { task_id: String },

    /// Print the effective task catalog
    Catalog,

    /// Write ~/.cropweek/config.toml with defaults
    InitConfig,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("cropweek=info,cropweek_core=info,cropweek_ingest=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Plan {
            request,
            backlog,
            seed,
            start,
            json,
            carry,
        } => {
            let plan = plan(request, backlog, seed, start, carry)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&plan)?);
            } else {
                print!("{}", render_week(&plan));
            }
        }

        Command::Postpone { task_id, reason } => {
            let cfg = config::load_config()?;
            let mut plan = state::read_last_plan()?;
            let Some(copy) = plan.postpone_task(&task_id, &reason, &cfg.backlog_scheduler()) else {
                bail!("no task {task_id} in the current plan");
            };
            state::write_last_plan(&plan)?;

            let mut outcomes = state::read_outcomes()?;
            outcomes.record_outcome(&task_id, false);
            state::write_outcomes(&outcomes)?;

            println!(
                "Postponed {} ({}), now {} with {} day(s) pending",
                task_id,
                copy.task_kind.display_name(),
                copy.priority,
                copy.days_pending
            );
        }

        Command::Done { task_id } => {
            let plan = state::read_last_plan()?;
            if plan.find_task(&task_id).is_none() {
                bail!("no task {task_id} in the current plan");
            }

            let mut outcomes = state::read_outcomes()?;
            outcomes.record_outcome(&task_id, true);
            state::write_outcomes(&outcomes)?;

            println!(
                "Marked {} done (reward {}, total {})",
                task_id,
                outcomes.reward(&task_id),
                outcomes.total_reward()
            );
        }

        Command::Catalog => {
            let cfg = config::load_config()?;
            println!("{:<18} {:>6} {:>8} {:>9}", "kind", "weight", "duration", "max_delay");
            for (kind, entry) in cfg.catalog().iter() {
                println!(
                    "{:<18} {:>6} {:>7}h {:>8}d",
                    kind.as_str(),
                    entry.priority_weight,
                    entry.duration,
                    entry.max_delay
                );
            }
        }

        Command::InitConfig => config::init_config()?,
    }

    Ok(())
}

fn plan(
    request: Option<PathBuf>,
    backlog: Option<PathBuf>,
    seed: Option<u64>,
    start: Option<NaiveDate>,
    carry: bool,
) -> Result<WeeklyPlan> {
    let cfg = config::load_config()?;

    let mut req = match &request {
        Some(path) => {
            let s = std::fs::read_to_string(path)
                .with_context(|| format!("read {}", path.display()))?;
            serde_json::from_str::<PlanRequest>(&s)
                .with_context(|| format!("parse plan request {}", path.display()))?
        }
        None => PlanRequest::default(),
    };

    if let Some(path) = &backlog {
        let rows = parse_backlog_csv(path)?;
        info!(rows = rows.len(), path = %path.display(), "imported backlog");
        req = req.with_pending(rows);
    }

    let week_start = match start {
        Some(d) => d,
        None => Utc::now().with_timezone(&cfg.timezone()?).date_naive(),
    };

    let planner = match seed.or(cfg.planner.seed) {
        Some(seed) => WeeklyPlanner::seeded(seed),
        None => WeeklyPlanner::from_entropy(),
    };
    let mut planner = planner
        .with_catalog(Arc::new(cfg.catalog()))
        .with_config(cfg.planner_config());

    let mut input = req.normalize(planner.catalog());
    if carry {
        let carried = state::read_last_plan()?.final_backlog;
        info!(tasks = carried.len(), "carrying backlog from the saved plan");
        input.backlog.extend(carried);
    }

    let plan = planner.build_from(input, week_start);
    state::write_last_plan(&plan)?;
    Ok(plan)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn version_carries_build_label() {
        let version = Cli::command().render_version();
        assert!(version.contains(env!("CARGO_PKG_VERSION")));
        let label = env!("CROPWEEK_BUILD_SHA");
        assert!(!label.is_empty());
        assert!(version.contains(&format!("({label})")));
    }

    #[test]
    fn postponed_copy_flows_into_continued_plan() {
        let home = std::env::temp_dir().join(format!("cropweek-cli-{}", std::process::id()));
        std::fs::create_dir_all(&home).unwrap();
        // Only test in this crate that touches the environment.
        unsafe { std::env::set_var("CROPWEEK_HOME", &home) };

        let monday = NaiveDate::from_ymd_opt(2026, 6, 1).unwrap();
        let mut first = plan(None, None, Some(3), Some(monday), false).unwrap();
        let last_id = first.days().last().unwrap().primary_task.id.clone();

        let scheduler = config::Config::default().backlog_scheduler();
        first.postpone_task(&last_id, "storm", &scheduler).unwrap();
        state::write_last_plan(&first).unwrap();
        assert_eq!(state::read_last_plan().unwrap().final_backlog.len(), 1);

        let next_monday = NaiveDate::from_ymd_opt(2026, 6, 8).unwrap();
        let next = plan(None, None, Some(3), Some(next_monday), true).unwrap();
        let day0 = next.days().next().unwrap();
        let reached = day0
            .backlog_tasks
            .iter()
            .chain(&day0.overflow_tasks)
            .chain(day0.dropped_tasks.iter().map(|d| &d.task))
            .any(|t| t.id == last_id);
        assert!(reached, "{last_id} was not carried into the new week");

        let fresh = plan(None, None, Some(3), Some(next_monday), false).unwrap();
        assert!(fresh.days().all(|d| d.backlog_tasks.is_empty()));

        std::fs::remove_dir_all(&home).unwrap();
    }
}
