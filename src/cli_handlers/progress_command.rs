use crate::analytics::ProgressReport;
use crate::cli_handlers::utils::{resolve_goal, short_id};
use crate::error::Result;
use crate::models::FocusStatus;
use crate::planner::Planner;
use crate::project::ProjectContext;
use crate::time_utils;
use crate::validation::MAX_HOURS_PER_DAY;

pub async fn handle_progress(goal: Option<String>, today: String, format: String) -> Result<()> {
    let today = time_utils::parse_date(&today)?;
    let ctx = ProjectContext::load().await?;
    let goal_id = resolve_goal(&ctx.adapter, goal.as_deref()).await?;
    let planner = Planner::open(ctx.adapter, &goal_id).await?;
    let report = planner.progress(today);

    if format == "json" {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_progress(&report);
    }
    Ok(())
}

fn print_progress(report: &ProgressReport) {
    println!(
        "{}: {}% of {} task(s) complete (as of {})",
        report.goal.title, report.goal.completion_percentage, report.goal.tasks_total, report.as_of
    );
    println!(
        "  {} not started, {} in progress, {} completed, {} locked",
        report.status.not_started, report.status.in_progress, report.status.completed, report.status.locked
    );

    if report.burndown.is_empty() {
        println!("\nNo daily log entries yet; record one with 'gp log add'.");
    } else {
        println!("\nBurndown:");
        println!("  {:<10}  {:>6}  {:>6}", "date", "ideal", "actual");
        for point in &report.burndown {
            let marker = if point.is_ahead { "  ahead" } else { "" };
            println!(
                "  {}  {:>6.1}  {:>6}{}",
                point.date, point.ideal_remaining, point.actual_remaining, marker
            );
        }

        println!("\nFocus hours:");
        for point in &report.heat {
            let bar = "█".repeat(focus_bar_len(point.hours_focused));
            println!("  {}  {:>5.1}h {}", point.date, point.hours_focused, bar);
        }

        println!("\nBy time of day:");
        for bucket in &report.productivity.buckets {
            println!(
                "  {:<9}  {:>3} task(s) over {} productive day(s), avg {:.2}",
                bucket.time_of_day.as_str(),
                bucket.total_tasks,
                bucket.productive_days,
                bucket.avg_productivity
            );
        }
        println!(
            "  Peak: {} ({}%)",
            report.productivity.peak.as_str(),
            report.productivity.peak_percentage
        );
    }

    println!("\nToday's focus:");
    if report.focus.is_empty() {
        println!("  Nothing due");
    }
    for item in &report.focus {
        let badge = match item.task.status {
            FocusStatus::Complete => "✓",
            FocusStatus::Incomplete if item.is_overdue => "!",
            FocusStatus::Incomplete => "○",
        };
        let overdue = if item.is_overdue { " (overdue)" } else { "" };
        println!(
            "  {} {} {} due {}{}",
            badge,
            short_id(&item.task.id),
            item.task.title,
            item.task.due_date,
            overdue
        );
    }
}

/// Bar width for a day's focus hours, one block per hour.
fn focus_bar_len(hours: f64) -> usize {
    if !hours.is_finite() {
        return 0;
    }
    hours.round().clamp(0.0, MAX_HOURS_PER_DAY) as usize
}
