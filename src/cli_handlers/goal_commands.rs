use chrono::Utc;
use serde_json::json;

use crate::cli::GoalCommands;
use crate::cli_handlers::utils::{print_goal, print_weeks, resolve_goal, short_id};
use crate::db::adapter::GoalChanges;
use crate::error::Result;
use crate::models::{Goal, Intensity, Priority};
use crate::planner::Planner;
use crate::project::ProjectContext;
use crate::templates::TemplateTitles;
use crate::time_utils;

/// Handle all `gp goal` subcommands
pub async fn handle_goal_command(cmd: GoalCommands) -> Result<()> {
    match cmd {
        GoalCommands::Create {
            title,
            weeks,
            priority,
            intensity,
            generate,
            format,
        } => handle_create(title, weeks, priority, intensity, generate, format).await,

        GoalCommands::List { format } => handle_list(format).await,

        GoalCommands::Show { id, format } => handle_show(id, format).await,

        GoalCommands::Update {
            id,
            title,
            weeks,
            priority,
            intensity,
            format,
        } => handle_update(id, title, weeks, priority, intensity, format).await,

        GoalCommands::Delete { id, format } => handle_delete(id, format).await,
    }
}

// ============================================================================
// Individual command handlers
// ============================================================================

async fn handle_create(
    title: String,
    weeks: u32,
    priority: String,
    intensity: String,
    generate: bool,
    format: String,
) -> Result<()> {
    let priority = Priority::parse(&priority)?;
    let intensity = Intensity::parse(&intensity)?;
    let ctx = ProjectContext::load_or_init().await?;

    let goal = Goal::new(&title, weeks, priority, intensity, Utc::now());
    let snapshot = ctx.adapter.create_goal(&goal).await?;

    let mut planner = Planner::open(ctx.adapter, &snapshot.goal.id).await?;
    if generate {
        planner.generate(&TemplateTitles, Utc::now()).await?;
    }

    if format == "json" {
        let response = json!({
            "goal": planner.goal(),
            "revision": planner.snapshot().revision,
            "tasks_generated": planner.store().len(),
        });
        println!("{}", serde_json::to_string_pretty(&response)?);
    } else {
        println!("Goal created: {} {}", short_id(&planner.goal().id), planner.goal().title);
        println!("  ID: {}", planner.goal().id);
        println!(
            "  {} week(s), priority {}, intensity {}",
            planner.goal().duration_weeks,
            planner.goal().priority.as_str(),
            planner.goal().intensity.as_str()
        );
        if generate {
            println!("  Generated {} task(s)", planner.store().len());
        }
    }
    Ok(())
}

async fn handle_list(format: String) -> Result<()> {
    let ctx = ProjectContext::load_or_init().await?;
    let goals = ctx.adapter.list_goals().await?;

    if format == "json" {
        println!("{}", serde_json::to_string_pretty(&goals)?);
    } else if goals.is_empty() {
        println!("No goals yet. Create one with: gp goal create \"<title>\" --weeks <N>");
    } else {
        for goal in &goals {
            println!(
                "{}  {}  ({} week(s), {}, ends {})",
                short_id(&goal.id),
                goal.title,
                goal.duration_weeks,
                goal.priority.as_str(),
                goal.end_date.date_naive()
            );
        }
    }
    Ok(())
}

async fn handle_show(id: Option<String>, format: String) -> Result<()> {
    let ctx = ProjectContext::load().await?;
    let goal_id = resolve_goal(&ctx.adapter, id.as_deref()).await?;
    let planner = Planner::open(ctx.adapter, &goal_id).await?;
    let report = planner.progress(time_utils::today());

    if format == "json" {
        let response = json!({
            "goal": planner.goal(),
            "revision": planner.snapshot().revision,
            "summary": report.goal,
            "status": report.status,
            "weeks": planner.view(),
        });
        println!("{}", serde_json::to_string_pretty(&response)?);
    } else {
        print_goal(planner.goal());
        println!(
            "  Progress: {}% of {} task(s) ({} completed, {} in progress, {} locked)",
            report.goal.completion_percentage,
            report.goal.tasks_total,
            report.status.completed,
            report.status.in_progress,
            report.status.locked
        );
        println!();
        print_weeks(&planner.view());
    }
    Ok(())
}

async fn handle_update(
    id: String,
    title: Option<String>,
    weeks: Option<u32>,
    priority: Option<String>,
    intensity: Option<String>,
    format: String,
) -> Result<()> {
    let changes = GoalChanges {
        title,
        duration_weeks: weeks,
        priority: priority.as_deref().map(Priority::parse).transpose()?,
        intensity: intensity.as_deref().map(Intensity::parse).transpose()?,
    };

    let ctx = ProjectContext::load().await?;
    let goal_id = ctx.adapter.resolve_goal_id(&id).await?;
    let snapshot = ctx.adapter.update_goal(&goal_id, &changes).await?;

    if format == "json" {
        let response = json!({
            "goal": snapshot.goal,
            "revision": snapshot.revision,
        });
        println!("{}", serde_json::to_string_pretty(&response)?);
    } else {
        println!("Goal updated (revision {})", snapshot.revision);
        print_goal(&snapshot.goal);
    }
    Ok(())
}

async fn handle_delete(id: String, format: String) -> Result<()> {
    let ctx = ProjectContext::load().await?;
    let goal_id = ctx.adapter.resolve_goal_id(&id).await?;
    ctx.adapter.delete_goal(&goal_id).await?;

    if format == "json" {
        println!("{}", serde_json::to_string_pretty(&json!({ "deleted": goal_id }))?);
    } else {
        println!("Goal deleted: {}", goal_id);
    }
    Ok(())
}
