//! Task Store: idempotent persistent map `taskId -> Task`.
//!
//! Grounded on `infrastructure::database::MarketDatabase`'s upsert/schema
//! pattern (`ON CONFLICT (id) DO UPDATE`, `sqlx::PgPool`), generalized to a
//! `TaskStore` trait so tests run against an in-memory implementation
//! without a database dependency.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;
use sqlx::postgres::PgPoolOptions;
use sqlx::{PgPool, Row};
use thiserror::Error;
use tracing::{debug, info};

use crate::domain::task::Task;

#[derive(Debug, Error)]
pub enum TaskStoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("task not found: {0}")]
    NotFound(String),
}

pub type Result<T> = std::result::Result<T, TaskStoreError>;

/// Partial, atomic update applied to a stored task. Only fields the
/// caller actually touched are carried; everything else is left alone.
pub type TaskUpdate = Box<dyn Fn(&mut Task) + Send + Sync>;

#[async_trait]
pub trait TaskStore: Send + Sync {
    async fn get_task(&self, task_id: &str) -> Result<Option<Task>>;

    async fn put_task(&self, task: Task) -> Result<()>;

    /// Atomically read-modify-write. `None` if `task_id` doesn't exist.
    async fn update_task(&self, task_id: &str, update: TaskUpdate) -> Result<Option<Task>>;

    async fn get_tasks_by_status(&self, statuses: &[&str]) -> Result<Vec<Task>>;

    async fn delete_task(&self, task_id: &str) -> Result<()>;
}

pub const SCHEMA_VERSION: i32 = 1;

pub async fn initialize_schema(pool: &PgPool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS arb_tasks (
            task_id TEXT PRIMARY KEY,
            status TEXT NOT NULL,
            payload JSONB NOT NULL,
            updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_arb_tasks_status ON arb_tasks(status)")
        .execute(pool)
        .await?;

    Ok(())
}

/// `sqlx`/Postgres-backed `TaskStore`.
pub struct PgTaskStore {
    pool: PgPool,
}

impl PgTaskStore {
    pub async fn new(db_url: &str) -> Result<Self> {
        info!("Connecting to task store database: {}", db_url);
        let pool = PgPoolOptions::new().max_connections(10).connect(db_url).await?;
        initialize_schema(&pool).await?;
        Ok(Self { pool })
    }

    async fn upsert(&self, task: &Task) -> Result<()> {
        let payload = serde_json::to_value(task)?;
        sqlx::query(
            r#"
            INSERT INTO arb_tasks (task_id, status, payload, updated_at)
            VALUES ($1, $2, $3, now())
            ON CONFLICT (task_id) DO UPDATE SET
                status = EXCLUDED.status,
                payload = EXCLUDED.payload,
                updated_at = now()
            "#,
        )
        .bind(&task.task_id)
        .bind(task.status.short_name())
        .bind(&payload)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

#[async_trait]
impl TaskStore for PgTaskStore {
    async fn get_task(&self, task_id: &str) -> Result<Option<Task>> {
        let row = sqlx::query("SELECT payload FROM arb_tasks WHERE task_id = $1")
            .bind(task_id)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => {
                let payload: serde_json::Value = row.try_get("payload")?;
                Ok(Some(serde_json::from_value(payload)?))
            }
            None => Ok(None),
        }
    }

    async fn put_task(&self, task: Task) -> Result<()> {
        debug!(task_id = %task.task_id, status = task.status.short_name(), "upserting task");
        self.upsert(&task).await
    }

    async fn update_task(&self, task_id: &str, update: TaskUpdate) -> Result<Option<Task>> {
        let Some(mut task) = self.get_task(task_id).await? else {
            return Ok(None);
        };
        update(&mut task);
        self.upsert(&task).await?;
        Ok(Some(task))
    }

    async fn get_tasks_by_status(&self, statuses: &[&str]) -> Result<Vec<Task>> {
        let rows = sqlx::query("SELECT payload FROM arb_tasks WHERE status = ANY($1)")
            .bind(statuses)
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter()
            .map(|row| {
                let payload: serde_json::Value = row.try_get("payload")?;
                Ok(serde_json::from_value(payload)?)
            })
            .collect()
    }

    async fn delete_task(&self, task_id: &str) -> Result<()> {
        sqlx::query("DELETE FROM arb_tasks WHERE task_id = $1")
            .bind(task_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

/// In-memory `TaskStore` for tests: no database dependency.
#[derive(Default)]
pub struct InMemoryTaskStore {
    tasks: RwLock<HashMap<String, Task>>,
}

impl InMemoryTaskStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shared() -> Arc<Self> {
        Arc::new(Self::new())
    }
}

#[async_trait]
impl TaskStore for InMemoryTaskStore {
    async fn get_task(&self, task_id: &str) -> Result<Option<Task>> {
        Ok(self.tasks.read().get(task_id).cloned())
    }

    async fn put_task(&self, task: Task) -> Result<()> {
        self.tasks.write().insert(task.task_id.clone(), task);
        Ok(())
    }

    async fn update_task(&self, task_id: &str, update: TaskUpdate) -> Result<Option<Task>> {
        let mut tasks = self.tasks.write();
        match tasks.get_mut(task_id) {
            Some(task) => {
                update(task);
                Ok(Some(task.clone()))
            }
            None => Ok(None),
        }
    }

    async fn get_tasks_by_status(&self, statuses: &[&str]) -> Result<Vec<Task>> {
        Ok(self
            .tasks
            .read()
            .values()
            .filter(|t| statuses.contains(&t.status.short_name()))
            .cloned()
            .collect())
    }

    async fn delete_task(&self, task_id: &str) -> Result<()> {
        self.tasks.write().remove(task_id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::task::{ArbSide, TaskDirection, TaskStatus};
    use chrono::Utc;

    fn sample_task(id: &str) -> Task {
        Task::new(id, TaskDirection::Buy, ArbSide::Yes, 100.0, 0.40, 0.60, 0.0, None, Utc::now())
    }

    #[tokio::test]
    async fn put_then_get_round_trips() {
        let store = InMemoryTaskStore::new();
        store.put_task(sample_task("t1")).await.unwrap();
        let fetched = store.get_task("t1").await.unwrap().unwrap();
        assert_eq!(fetched.task_id, "t1");
    }

    #[tokio::test]
    async fn get_missing_task_is_none() {
        let store = InMemoryTaskStore::new();
        assert!(store.get_task("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn update_task_applies_closure_atomically() {
        let store = InMemoryTaskStore::new();
        store.put_task(sample_task("t1")).await.unwrap();

        let updated = store
            .update_task("t1", Box::new(|t| t.predict_filled_qty = 42.0))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.predict_filled_qty, 42.0);

        let fetched = store.get_task("t1").await.unwrap().unwrap();
        assert_eq!(fetched.predict_filled_qty, 42.0);
    }

    #[tokio::test]
    async fn update_missing_task_returns_none() {
        let store = InMemoryTaskStore::new();
        let result = store.update_task("missing", Box::new(|_| {})).await.unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn get_tasks_by_status_filters() {
        let store = InMemoryTaskStore::new();
        let mut t1 = sample_task("t1");
        t1.status = TaskStatus::Hedging;
        let mut t2 = sample_task("t2");
        t2.status = TaskStatus::Completed;
        store.put_task(t1).await.unwrap();
        store.put_task(t2).await.unwrap();

        let hedging = store.get_tasks_by_status(&["HEDGING"]).await.unwrap();
        assert_eq!(hedging.len(), 1);
        assert_eq!(hedging[0].task_id, "t1");
    }

    #[tokio::test]
    async fn delete_task_removes_it() {
        let store = InMemoryTaskStore::new();
        store.put_task(sample_task("t1")).await.unwrap();
        store.delete_task("t1").await.unwrap();
        assert!(store.get_task("t1").await.unwrap().is_none());
    }
}
