use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PlannerError {
    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Task not found: {0}")]
    TaskNotFound(String),

    #[error("Goal not found: {0}")]
    GoalNotFound(String),

    #[error("Invalid {field}: {message}")]
    Validation {
        field: &'static str,
        message: String,
    },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Task {task_id} is required by {} other task(s): {}", .dependents.len(), .dependents.join(", "))]
    DependencyConflict {
        task_id: String,
        dependents: Vec<String>,
    },

    #[error("Sync adapter failure: {0}")]
    AdapterError(String),

    #[error("Current directory is not a goal-planner project")]
    NotAProject,

    #[error("JSON serialization error: {0}")]
    JsonError(#[from] serde_json::Error),
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

impl PlannerError {
    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        PlannerError::Validation {
            field,
            message: message.into(),
        }
    }

    pub fn to_error_code(&self) -> &'static str {
        match self {
            PlannerError::TaskNotFound(_) => "TASK_NOT_FOUND",
            PlannerError::GoalNotFound(_) => "GOAL_NOT_FOUND",
            PlannerError::DatabaseError(_) => "DATABASE_ERROR",
            PlannerError::Validation { .. } | PlannerError::InvalidInput(_) => "VALIDATION_ERROR",
            PlannerError::DependencyConflict { .. } => "DEPENDENCY_CONFLICT",
            PlannerError::AdapterError(_) => "ADAPTER_ERROR",
            PlannerError::NotAProject => "NOT_A_PROJECT",
            _ => "INTERNAL_ERROR",
        }
    }

    /// Transport-level failures the caller may retry against a fresh snapshot.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            PlannerError::DatabaseError(_) | PlannerError::AdapterError(_)
        )
    }

    pub fn to_error_response(&self) -> ErrorResponse {
        let field = match self {
            PlannerError::Validation { field, .. } => Some(field.to_string()),
            _ => None,
        };
        ErrorResponse {
            error: self.to_string(),
            code: self.to_error_code().to_string(),
            field,
        }
    }
}

pub type Result<T> = std::result::Result<T, PlannerError>;
