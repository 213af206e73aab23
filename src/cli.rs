use clap::{Parser, Subcommand};

const LONG_ABOUT: &str = r#"
Goal Planner - week-by-week plans for personal goals

Break a goal into weekly tasks, work through them in dependency order,
and track progress from a daily activity log.

Workflow:
  gp goal create "Learn Rust" --weeks 6     ← Define the goal
  gp task generate                          ← Lay out weekly tasks
  gp task list                              ← See what is unlocked
  gp task done <ID>                         ← Complete tasks in order
  gp log add --tasks 2 --hours 1.5          ← Record the day
  gp progress                               ← Burndown, heatmap, peak window

Key Rules:
  • A task is locked until every task it depends on is completed
  • Tasks others depend on are only deleted with --force
  • IDs may be abbreviated to any unambiguous prefix
  • --goal may be omitted while only one goal exists
"#;

#[derive(Parser, Clone)]
#[command(name = "gp")]
#[command(about = "Goal planning engine: weekly tasks, dependency locks and progress analytics")]
#[command(long_about = LONG_ABOUT)]
#[command(version)]
pub struct Cli {
    /// Enable verbose output (-v)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress non-error output (-q)
    #[arg(short, long)]
    pub quiet: bool,

    /// Output logs in JSON format
    #[arg(long)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Clone)]
pub enum Commands {
    /// Create, inspect and edit goals
    #[command(subcommand)]
    Goal(GoalCommands),

    /// Manage the tasks of a goal
    #[command(subcommand)]
    Task(TaskCommands),

    /// Record and review daily activity
    #[command(subcommand)]
    Log(LogCommands),

    /// Show progress analytics for a goal
    ///
    /// Examples:
    ///   gp progress
    ///   gp progress --goal 3f2a --today 2025-12-14 --format json
    Progress {
        /// Goal ID or unambiguous prefix
        #[arg(short, long)]
        goal: Option<String>,

        /// Reference date for overdue flags (YYYY-MM-DD, today, yesterday, -Nd)
        #[arg(long, default_value = "today")]
        today: String,

        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
}

#[derive(Subcommand, Clone)]
pub enum GoalCommands {
    /// Create a new goal
    ///
    /// Examples:
    ///   gp goal create "Learn Rust" --weeks 6
    ///   gp goal create "Master Python" --weeks 4 --priority High --intensity Aggressive --generate
    Create {
        /// Goal title
        title: String,

        /// Duration in weeks (1-52)
        #[arg(short, long)]
        weeks: u32,

        /// Priority: Low, Medium, High
        #[arg(short, long, default_value = "Medium")]
        priority: String,

        /// Intensity: Light, Normal, Aggressive
        #[arg(short, long, default_value = "Normal")]
        intensity: String,

        /// Generate the weekly task plan right away
        #[arg(long)]
        generate: bool,

        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },

    /// List all goals
    List {
        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },

    /// Show a goal with its task summary
    Show {
        /// Goal ID or unambiguous prefix
        id: Option<String>,

        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },

    /// Update goal metadata
    ///
    /// Examples:
    ///   gp goal update 3f2a --title "Learn Rust deeply"
    ///   gp goal update 3f2a --weeks 8 --priority High
    Update {
        /// Goal ID or unambiguous prefix
        id: String,

        #[arg(long)]
        title: Option<String>,

        /// Duration in weeks (1-52)
        #[arg(short, long)]
        weeks: Option<u32>,

        #[arg(short, long)]
        priority: Option<String>,

        #[arg(short, long)]
        intensity: Option<String>,

        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },

    /// Delete a goal with all of its tasks and log entries
    Delete {
        /// Goal ID or unambiguous prefix
        id: String,

        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
}

#[derive(Subcommand, Clone)]
pub enum TaskCommands {
    /// Generate the weekly task plan for a goal
    ///
    /// Titles come from the topic template matching the goal title
    /// (react, python, javascript, data structures, or a general plan).
    Generate {
        /// Goal ID or unambiguous prefix
        #[arg(short, long)]
        goal: Option<String>,

        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },

    /// List tasks grouped by week with their lock state
    List {
        /// Goal ID or unambiguous prefix
        #[arg(short, long)]
        goal: Option<String>,

        /// Only this week
        #[arg(short, long)]
        week: Option<u32>,

        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },

    /// Add a task to the end of a week
    ///
    /// Examples:
    ///   gp task add "Read the book" --week 2
    ///   gp task add "Build a CLI" --week 3 --day 5 --depends-on 9c1e
    Add {
        /// Task title
        title: String,

        /// Week number (1..duration)
        #[arg(short, long)]
        week: u32,

        /// Day within the week (1-7)
        #[arg(long)]
        day: Option<u32>,

        #[arg(short, long)]
        description: Option<String>,

        /// IDs of tasks that must be completed first
        #[arg(long = "depends-on")]
        depends_on: Vec<String>,

        /// Goal ID or unambiguous prefix
        #[arg(short, long)]
        goal: Option<String>,

        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },

    /// Edit a task
    ///
    /// Examples:
    ///   gp task update 9c1e --title "Read chapters 1-3"
    ///   gp task update 9c1e --depends-on 41aa --depends-on 77b0
    ///   gp task update 9c1e --clear-deps
    Update {
        /// Task ID or unambiguous prefix
        id: String,

        #[arg(long)]
        title: Option<String>,

        #[arg(short, long)]
        description: Option<String>,

        /// Status: not_started, in_progress, completed
        #[arg(short, long)]
        status: Option<String>,

        /// Day within the week (1-7)
        #[arg(long)]
        day: Option<u32>,

        /// Replace dependencies with these task IDs
        #[arg(long = "depends-on")]
        depends_on: Vec<String>,

        /// Remove all dependencies
        #[arg(long, conflicts_with = "depends_on")]
        clear_deps: bool,

        /// Goal ID or unambiguous prefix
        #[arg(short, long)]
        goal: Option<String>,

        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },

    /// Mark a task completed
    Done {
        /// Task ID or unambiguous prefix
        id: String,

        /// Goal ID or unambiguous prefix
        #[arg(short, long)]
        goal: Option<String>,

        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },

    /// Mark a task in progress
    Start {
        /// Task ID or unambiguous prefix
        id: String,

        /// Goal ID or unambiguous prefix
        #[arg(short, long)]
        goal: Option<String>,

        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },

    /// Move a task one position up or down
    ///
    /// The first and last task of a week stay put. Use --across-weeks to
    /// swap with the neighbouring week's edge task instead.
    Move {
        /// Task ID or unambiguous prefix
        id: String,

        /// Direction: up or down
        direction: String,

        /// Take neighbours across the whole goal, crossing week boundaries
        #[arg(long)]
        across_weeks: bool,

        /// Goal ID or unambiguous prefix
        #[arg(short, long)]
        goal: Option<String>,

        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },

    /// Move a task to another week, keeping its position value
    Relocate {
        /// Task ID or unambiguous prefix
        id: String,

        /// Destination week
        week: u32,

        /// Goal ID or unambiguous prefix
        #[arg(short, long)]
        goal: Option<String>,

        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },

    /// Renumber a week's tasks to 0..n in display order
    Normalize {
        /// Week number
        week: u32,

        /// Goal ID or unambiguous prefix
        #[arg(short, long)]
        goal: Option<String>,

        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },

    /// Delete a task
    Rm {
        /// Task ID or unambiguous prefix
        id: String,

        /// Delete even if other tasks depend on it (they stay locked)
        #[arg(long)]
        force: bool,

        /// Goal ID or unambiguous prefix
        #[arg(short, long)]
        goal: Option<String>,

        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },

    /// Report dependency cycles (their tasks can never unlock)
    Cycles {
        /// Goal ID or unambiguous prefix
        #[arg(short, long)]
        goal: Option<String>,

        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
}

#[derive(Subcommand, Clone)]
pub enum LogCommands {
    /// Record a day of activity (replaces an existing entry for that date)
    ///
    /// Examples:
    ///   gp log add --tasks 2 --hours 1.5
    ///   gp log add --date 2025-12-03 --tasks 0 --hours 0.5 --energy Low --time-of-day Evening
    Add {
        /// Date (YYYY-MM-DD, today, yesterday, -Nd)
        #[arg(long, default_value = "today")]
        date: String,

        /// Tasks completed that day
        #[arg(short, long, allow_negative_numbers = true)]
        tasks: i64,

        /// Focused hours that day
        #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
        hours: f64,

        /// Energy level: High or Low
        #[arg(long, default_value = "High")]
        energy: String,

        /// Morning, Afternoon or Evening
        #[arg(long = "time-of-day", default_value = "Morning")]
        time_of_day: String,

        /// Goal ID or unambiguous prefix
        #[arg(short, long)]
        goal: Option<String>,

        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },

    /// List the daily log in chronological order
    List {
        /// Goal ID or unambiguous prefix
        #[arg(short, long)]
        goal: Option<String>,

        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
}
