use crate::db::{create_pool, run_migrations, SqliteAdapter};
use crate::error::{PlannerError, Result};
use std::path::{Path, PathBuf};

pub const PLANNER_DIR: &str = ".goal-planner";
pub const DB_FILE: &str = "planner.db";
pub const PROJECT_DIR_ENV: &str = "GOAL_PLANNER_DIR";

#[derive(Debug)]
pub struct ProjectContext {
    pub root: PathBuf,
    pub db_path: PathBuf,
    pub adapter: SqliteAdapter,
}

fn has_planner_dir(dir: &Path) -> bool {
    dir.join(PLANNER_DIR).is_dir()
}

impl ProjectContext {
    /// Find the project root that holds a `.goal-planner` directory.
    ///
    /// Search strategy (in priority order):
    /// 1. `GOAL_PLANNER_DIR` environment variable
    /// 2. Upwards from `start`
    /// 3. The user's home directory
    pub fn find_project_root_from(start: &Path) -> Option<PathBuf> {
        if let Some(env_path) = std::env::var_os(PROJECT_DIR_ENV) {
            let path = PathBuf::from(env_path);
            if has_planner_dir(&path) {
                tracing::debug!(root = %path.display(), "Using project from {}", PROJECT_DIR_ENV);
                return Some(path);
            }
            tracing::warn!(
                root = %path.display(),
                "{} is set but holds no {} directory",
                PROJECT_DIR_ENV,
                PLANNER_DIR
            );
        }

        let mut current = start.to_path_buf();
        loop {
            if has_planner_dir(&current) {
                return Some(current);
            }
            if !current.pop() {
                break;
            }
        }

        dirs::home_dir().filter(|home| has_planner_dir(home))
    }

    pub fn find_project_root() -> Option<PathBuf> {
        let cwd = std::env::current_dir().ok()?;
        Self::find_project_root_from(&cwd)
    }

    /// Open (creating if needed) the planner database under `root`.
    pub async fn open_at(root: &Path) -> Result<Self> {
        let planner_dir = root.join(PLANNER_DIR);
        std::fs::create_dir_all(&planner_dir)?;
        let db_path = planner_dir.join(DB_FILE);

        let pool = create_pool(&db_path).await?;
        run_migrations(&pool).await?;

        Ok(ProjectContext {
            root: root.to_path_buf(),
            db_path,
            adapter: SqliteAdapter::new(pool),
        })
    }

    /// Initialise a project in `GOAL_PLANNER_DIR` if set, else the current directory.
    pub async fn initialize_project() -> Result<Self> {
        let root = match std::env::var_os(PROJECT_DIR_ENV) {
            Some(dir) => PathBuf::from(dir),
            None => std::env::current_dir()?,
        };
        tracing::info!(root = %root.display(), "Initialising goal-planner project");
        Self::open_at(&root).await
    }

    /// Load an existing project context
    pub async fn load() -> Result<Self> {
        let root = Self::find_project_root().ok_or(PlannerError::NotAProject)?;
        Self::open_at(&root).await
    }

    /// Load project context, initializing if necessary (for write commands)
    pub async fn load_or_init() -> Result<Self> {
        match Self::load().await {
            Ok(ctx) => Ok(ctx),
            Err(PlannerError::NotAProject) => Self::initialize_project().await,
            Err(e) => Err(e),
        }
    }
}
