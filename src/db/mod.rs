pub mod adapter;
pub mod models;

use crate::error::Result;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::path::Path;

pub use adapter::SqliteAdapter;

pub async fn create_pool(db_path: &Path) -> Result<SqlitePool> {
    let options = SqliteConnectOptions::new()
        .filename(db_path)
        .create_if_missing(true)
        .foreign_keys(true)
        .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
        .busy_timeout(std::time::Duration::from_millis(5000));

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await?;

    Ok(pool)
}

pub async fn run_migrations(pool: &SqlitePool) -> Result<()> {
    sqlx::query("PRAGMA journal_mode=WAL;")
        .execute(pool)
        .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS goals (
            id TEXT PRIMARY KEY,
            title TEXT NOT NULL,
            duration_weeks INTEGER NOT NULL,
            priority TEXT NOT NULL,
            intensity TEXT NOT NULL,
            start_date DATETIME NOT NULL,
            end_date DATETIME NOT NULL,
            created_at DATETIME NOT NULL,
            revision INTEGER NOT NULL DEFAULT 0,
            CHECK (duration_weeks BETWEEN 1 AND 52),
            CHECK (priority IN ('Low', 'Medium', 'High')),
            CHECK (intensity IN ('Light', 'Normal', 'Aggressive'))
        )
        "#,
    )
    .execute(pool)
    .await?;

    // Dependencies are stored as a JSON array of task ids. Dangling ids are
    // legal after a forced delete, so there is no foreign key on them.
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS tasks (
            id TEXT PRIMARY KEY,
            goal_id TEXT NOT NULL,
            week_number INTEGER NOT NULL,
            day_number INTEGER,
            title TEXT NOT NULL,
            description TEXT,
            status TEXT NOT NULL DEFAULT 'not_started',
            dependencies TEXT NOT NULL DEFAULT '[]',
            sort_order INTEGER NOT NULL DEFAULT 0,
            created_at DATETIME NOT NULL,
            updated_at DATETIME NOT NULL,
            FOREIGN KEY (goal_id) REFERENCES goals(id) ON DELETE CASCADE,
            CHECK (status IN ('not_started', 'in_progress', 'completed')),
            CHECK (week_number >= 1),
            CHECK (day_number IS NULL OR day_number BETWEEN 1 AND 7)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_tasks_goal_week ON tasks(goal_id, week_number, sort_order)",
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS daily_logs (
            goal_id TEXT NOT NULL,
            log_date DATE NOT NULL,
            tasks_completed INTEGER NOT NULL DEFAULT 0,
            hours_focused REAL NOT NULL DEFAULT 0,
            energy_level TEXT NOT NULL DEFAULT 'High',
            time_of_day TEXT NOT NULL,
            PRIMARY KEY (goal_id, log_date),
            FOREIGN KEY (goal_id) REFERENCES goals(id) ON DELETE CASCADE,
            CHECK (tasks_completed >= 0),
            CHECK (hours_focused >= 0),
            CHECK (energy_level IN ('High', 'Low')),
            CHECK (time_of_day IN ('Morning', 'Afternoon', 'Evening'))
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS schema_meta (
            key TEXT PRIMARY KEY,
            value TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("INSERT OR REPLACE INTO schema_meta (key, value) VALUES ('schema_version', '1')")
        .execute(pool)
        .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_migrations_are_idempotent() {
        let dir = TempDir::new().unwrap();
        let pool = create_pool(&dir.path().join("planner.db")).await.unwrap();
        run_migrations(&pool).await.unwrap();
        run_migrations(&pool).await.unwrap();

        let tables: Vec<String> = sqlx::query_scalar(
            "SELECT name FROM sqlite_master WHERE type = 'table' ORDER BY name",
        )
        .fetch_all(&pool)
        .await
        .unwrap();
        for expected in ["daily_logs", "goals", "schema_meta", "tasks"] {
            assert!(tables.iter().any(|t| t == expected), "missing table {}", expected);
        }
    }
}
