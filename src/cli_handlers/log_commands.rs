use serde_json::json;

use crate::cli::LogCommands;
use crate::cli_handlers::utils::resolve_goal;
use crate::error::{PlannerError, Result};
use crate::models::{DailyLogEntry, EnergyLevel, TimeOfDay};
use crate::project::ProjectContext;
use crate::time_utils;
use crate::validation::validate_log_values;

/// Handle all `gp log` subcommands
pub async fn handle_log_command(cmd: LogCommands) -> Result<()> {
    match cmd {
        LogCommands::Add {
            date,
            tasks,
            hours,
            energy,
            time_of_day,
            goal,
            format,
        } => handle_add(date, tasks, hours, energy, time_of_day, goal, format).await,

        LogCommands::List { goal, format } => handle_list(goal, format).await,
    }
}

async fn handle_add(
    date: String,
    tasks: i64,
    hours: f64,
    energy: String,
    time_of_day: String,
    goal: Option<String>,
    format: String,
) -> Result<()> {
    validate_log_values(tasks, hours)?;
    let entry = DailyLogEntry {
        date: time_utils::parse_date(&date)?,
        tasks_completed: u32::try_from(tasks)
            .map_err(|_| PlannerError::validation("tasks_completed", "value is too large"))?,
        hours_focused: hours,
        energy_level: EnergyLevel::parse(&energy)?,
        time_of_day: TimeOfDay::parse(&time_of_day)?,
    };

    let ctx = ProjectContext::load().await?;
    let goal_id = resolve_goal(&ctx.adapter, goal.as_deref()).await?;
    let snapshot = ctx.adapter.record_daily_log(&goal_id, &entry).await?;

    if format == "json" {
        let response = json!({
            "entry": entry,
            "revision": snapshot.revision,
        });
        println!("{}", serde_json::to_string_pretty(&response)?);
    } else {
        println!(
            "Logged {}: {} task(s), {:.1}h, {} energy, {}",
            entry.date,
            entry.tasks_completed,
            entry.hours_focused,
            entry.energy_level.as_str(),
            entry.time_of_day.as_str()
        );
    }
    Ok(())
}

async fn handle_list(goal: Option<String>, format: String) -> Result<()> {
    let ctx = ProjectContext::load().await?;
    let goal_id = resolve_goal(&ctx.adapter, goal.as_deref()).await?;
    let logs = ctx.adapter.list_daily_logs(&goal_id).await?;

    if format == "json" {
        println!("{}", serde_json::to_string_pretty(&logs)?);
    } else if logs.is_empty() {
        println!("No daily log entries yet");
    } else {
        for entry in &logs {
            println!(
                "{}  {:>3} task(s)  {:>5.1}h  {:<4}  {}",
                entry.date,
                entry.tasks_completed,
                entry.hours_focused,
                entry.energy_level.as_str(),
                entry.time_of_day.as_str()
            );
        }
    }
    Ok(())
}
