use clap::Parser;
use goal_planner::cli::{Cli, Commands};
use goal_planner::cli_handlers::{
    handle_goal_command, handle_log_command, handle_progress, handle_task_command,
};
use goal_planner::error::Result;
use goal_planner::logging::{init_logging, LoggingConfig};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let log_config = LoggingConfig::from_args(cli.quiet, cli.verbose > 0, cli.json);
    if let Err(e) = init_logging(log_config) {
        eprintln!("Failed to initialize logging: {}", e);
        std::process::exit(1);
    }

    if let Err(e) = run(&cli).await {
        let error_response = e.to_error_response();
        match serde_json::to_string_pretty(&error_response) {
            Ok(json) => eprintln!("{}", json),
            Err(_) => eprintln!("{}", error_response.error),
        }
        std::process::exit(1);
    }
}

async fn run(cli: &Cli) -> Result<()> {
    match cli.command.clone() {
        Commands::Goal(cmd) => handle_goal_command(cmd).await,
        Commands::Task(cmd) => handle_task_command(cmd).await,
        Commands::Log(cmd) => handle_log_command(cmd).await,
        Commands::Progress {
            goal,
            today,
            format,
        } => handle_progress(goal, today, format).await,
    }
}
