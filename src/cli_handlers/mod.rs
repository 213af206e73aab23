// CLI command handlers module
//
// One file per command group: goal, task, log, progress.

pub mod goal_commands;
pub mod log_commands;
pub mod progress_command;
pub mod task_commands;
pub mod utils;

pub use goal_commands::handle_goal_command;
pub use log_commands::handle_log_command;
pub use progress_command::handle_progress;
pub use task_commands::handle_task_command;
pub use utils::{get_status_badge, resolve_goal};
