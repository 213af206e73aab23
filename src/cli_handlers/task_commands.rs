use chrono::Utc;
use serde_json::json;

use crate::cli::TaskCommands;
use crate::cli_handlers::utils::{
    print_outcome, print_task_line, print_weeks, resolve_goal, resolve_tasks, short_id,
};
use crate::db::SqliteAdapter;
use crate::error::Result;
use crate::models::{TaskStatus, TaskWithLock};
use crate::ordering::{Direction, MoveScope};
use crate::planner::{NewTask, Planner};
use crate::project::ProjectContext;
use crate::sync::TaskChanges;
use crate::templates::TemplateTitles;

/// Handle all `gp task` subcommands
pub async fn handle_task_command(cmd: TaskCommands) -> Result<()> {
    match cmd {
        TaskCommands::Generate { goal, format } => handle_generate(goal, format).await,

        TaskCommands::List { goal, week, format } => handle_list(goal, week, format).await,

        TaskCommands::Add {
            title,
            week,
            day,
            description,
            depends_on,
            goal,
            format,
        } => handle_add(title, week, day, description, depends_on, goal, format).await,

        TaskCommands::Update {
            id,
            title,
            description,
            status,
            day,
            depends_on,
            clear_deps,
            goal,
            format,
        } => {
            handle_update(
                id,
                title,
                description,
                status,
                day,
                depends_on,
                clear_deps,
                goal,
                format,
            )
            .await
        },

        TaskCommands::Done { id, goal, format } => {
            handle_status(id, TaskStatus::Completed, goal, format).await
        },

        TaskCommands::Start { id, goal, format } => {
            handle_status(id, TaskStatus::InProgress, goal, format).await
        },

        TaskCommands::Move {
            id,
            direction,
            across_weeks,
            goal,
            format,
        } => handle_move(id, direction, across_weeks, goal, format).await,

        TaskCommands::Relocate {
            id,
            week,
            goal,
            format,
        } => handle_relocate(id, week, goal, format).await,

        TaskCommands::Normalize { week, goal, format } => handle_normalize(week, goal, format).await,

        TaskCommands::Rm {
            id,
            force,
            goal,
            format,
        } => handle_rm(id, force, goal, format).await,

        TaskCommands::Cycles { goal, format } => handle_cycles(goal, format).await,
    }
}

/// Open the planner for `--goal` (or the only goal).
async fn open_planner(goal: Option<String>) -> Result<Planner<SqliteAdapter>> {
    let ctx = ProjectContext::load().await?;
    let goal_id = resolve_goal(&ctx.adapter, goal.as_deref()).await?;
    Planner::open(ctx.adapter, &goal_id).await
}

async fn resolve_task(planner: &Planner<SqliteAdapter>, prefix: &str) -> Result<String> {
    planner
        .adapter()
        .resolve_task_id(&planner.goal().id, prefix)
        .await
}

// ============================================================================
// Individual command handlers
// ============================================================================

async fn handle_generate(goal: Option<String>, format: String) -> Result<()> {
    let mut planner = open_planner(goal).await?;
    let outcome = planner.generate(&TemplateTitles, Utc::now()).await?;

    if format == "json" {
        let response = json!({
            "outcome": outcome,
            "weeks": planner.view(),
        });
        println!("{}", serde_json::to_string_pretty(&response)?);
    } else {
        println!(
            "Generated {} task(s) for '{}' (topic: {})",
            planner.store().len(),
            planner.goal().title,
            TemplateTitles::detect_topic(&planner.goal().title)
        );
        print_weeks(&planner.view());
    }
    Ok(())
}

async fn handle_list(goal: Option<String>, week: Option<u32>, format: String) -> Result<()> {
    let planner = open_planner(goal).await?;
    let mut weeks = planner.view();
    if let Some(week) = week {
        weeks.retain(|w| w.week_number == week);
    }

    if format == "json" {
        println!("{}", serde_json::to_string_pretty(&weeks)?);
    } else {
        println!("{} (revision {})", planner.goal().title, planner.snapshot().revision);
        print_weeks(&weeks);
    }
    Ok(())
}

async fn handle_add(
    title: String,
    week: u32,
    day: Option<u32>,
    description: Option<String>,
    depends_on: Vec<String>,
    goal: Option<String>,
    format: String,
) -> Result<()> {
    let mut planner = open_planner(goal).await?;
    let dependencies = resolve_tasks(planner.adapter(), &planner.goal().id, &depends_on).await?;

    let new = NewTask {
        title,
        week_number: week,
        day_number: day,
        description,
        dependencies,
    };
    let (id, outcome) = planner.add_task(new, Utc::now()).await?;

    if format == "json" {
        let response = json!({
            "outcome": outcome,
            "task": planner.task(&id)?,
            "is_locked": planner.locks().get(&id).copied().unwrap_or(false),
        });
        println!("{}", serde_json::to_string_pretty(&response)?);
    } else {
        let task = planner.task(&id)?;
        println!("Task created: {} {}", short_id(&task.id), task.title);
        println!("  ID: {}", task.id);
        println!("  Week: {}", task.week_number);
        if !task.dependencies.is_empty() {
            println!("  Depends on: {}", task.dependencies.len());
        }
    }
    Ok(())
}

#[allow(clippy::too_many_arguments)]
async fn handle_update(
    id: String,
    title: Option<String>,
    description: Option<String>,
    status: Option<String>,
    day: Option<u32>,
    depends_on: Vec<String>,
    clear_deps: bool,
    goal: Option<String>,
    format: String,
) -> Result<()> {
    let mut planner = open_planner(goal).await?;
    let task_id = resolve_task(&planner, &id).await?;

    let dependencies = if clear_deps {
        Some(Vec::new())
    } else if depends_on.is_empty() {
        None
    } else {
        Some(resolve_tasks(planner.adapter(), &planner.goal().id, &depends_on).await?)
    };

    let changes = TaskChanges {
        title,
        description,
        status: status.as_deref().map(TaskStatus::parse).transpose()?,
        dependencies,
        day_number: day,
        ..Default::default()
    };
    let outcome = planner.update_task(&task_id, changes).await?;
    print_outcome(&format!("Task {} updated", short_id(&task_id)), &outcome, &format)
}

async fn handle_status(id: String, status: TaskStatus, goal: Option<String>, format: String) -> Result<()> {
    let mut planner = open_planner(goal).await?;
    let task_id = resolve_task(&planner, &id).await?;
    let outcome = planner.set_status(&task_id, status).await?;

    print_outcome(&format!("Task {} is now {}", short_id(&task_id), status), &outcome, &format)?;

    // Show what completing this task unlocked
    if format != "json" && status.is_completed() && outcome.revision().is_some() {
        let locks = planner.locks();
        let unlocked: Vec<_> = planner
            .store()
            .dependents_of(&task_id)
            .into_iter()
            .filter(|t| !locks.get(&t.id).copied().unwrap_or(true))
            .collect();
        if !unlocked.is_empty() {
            println!("Unlocked:");
            for task in unlocked {
                print_task_line(&TaskWithLock {
                    task: task.clone(),
                    is_locked: false,
                });
            }
        }
    }
    Ok(())
}

async fn handle_move(
    id: String,
    direction: String,
    across_weeks: bool,
    goal: Option<String>,
    format: String,
) -> Result<()> {
    let direction = Direction::parse(&direction)?;
    let scope = if across_weeks { MoveScope::Goal } else { MoveScope::Week };
    let mut planner = open_planner(goal).await?;
    let task_id = resolve_task(&planner, &id).await?;

    let outcome = planner.move_adjacent(&task_id, direction, scope).await?;
    let week = planner.task(&task_id)?.week_number;
    print_outcome(
        &format!("Task {} moved {} (week {})", short_id(&task_id), direction.as_str(), week),
        &outcome,
        &format,
    )
}

async fn handle_relocate(id: String, week: u32, goal: Option<String>, format: String) -> Result<()> {
    let mut planner = open_planner(goal).await?;
    let task_id = resolve_task(&planner, &id).await?;
    let outcome = planner.relocate_to_week(&task_id, week).await?;
    print_outcome(
        &format!("Task {} moved to week {}", short_id(&task_id), week),
        &outcome,
        &format,
    )
}

async fn handle_normalize(week: u32, goal: Option<String>, format: String) -> Result<()> {
    let mut planner = open_planner(goal).await?;
    let outcome = planner.normalize_week(week).await?;
    print_outcome(&format!("Week {} renumbered", week), &outcome, &format)
}

async fn handle_rm(id: String, force: bool, goal: Option<String>, format: String) -> Result<()> {
    let mut planner = open_planner(goal).await?;
    let task_id = resolve_task(&planner, &id).await?;
    let outcome = planner.delete_task(&task_id, force).await?;
    print_outcome(&format!("Task {} deleted", short_id(&task_id)), &outcome, &format)
}

async fn handle_cycles(goal: Option<String>, format: String) -> Result<()> {
    let planner = open_planner(goal).await?;
    let cycles = planner.cycles();

    if format == "json" {
        println!("{}", serde_json::to_string_pretty(&json!({ "cycles": cycles }))?);
    } else if cycles.is_empty() {
        println!("No dependency cycles");
    } else {
        println!("{} dependency cycle(s); these tasks can never unlock:", cycles.len());
        for cycle in &cycles {
            for id in cycle {
                let title = planner.store().get(id).map(|t| t.title.as_str()).unwrap_or("?");
                println!("  {} {}", short_id(id), title);
            }
            println!();
        }
    }
    Ok(())
}
