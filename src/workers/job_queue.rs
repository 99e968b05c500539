use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::Row;
use uuid::Uuid;

use crate::api::middleware::error::ApiResult;
use crate::database::Database;
use crate::models::{Job, JobStatus};

/// Durable work queue with at-least-once delivery. Handlers must be
/// idempotent under redelivery.
#[async_trait]
pub trait TaskQueue: Send + Sync {
    async fn enqueue(&self, job_type: &str, payload: Value, max_attempts: i32)
        -> ApiResult<String>;
    async fn enqueue_at(
        &self,
        job_type: &str,
        payload: Value,
        run_at: DateTime<Utc>,
        max_attempts: i32,
    ) -> ApiResult<String>;
    async fn fetch_next_job(&self) -> ApiResult<Option<Job>>;
    async fn complete_job(&self, job_id: &str) -> ApiResult<()>;
    async fn fail_job(&self, job_id: &str, error: &str) -> ApiResult<()>;
}

/// SQL-backed implementation of the TaskQueue over the `jobs` table
#[derive(Clone)]
pub struct SqlTaskQueue {
    db: Database,
}

impl SqlTaskQueue {
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}

#[async_trait]
impl TaskQueue for SqlTaskQueue {
    async fn enqueue(
        &self,
        job_type: &str,
        payload: Value,
        max_attempts: i32,
    ) -> ApiResult<String> {
        self.enqueue_at(job_type, payload, Utc::now(), max_attempts)
            .await
    }

    async fn enqueue_at(
        &self,
        job_type: &str,
        payload: Value,
        run_at: DateTime<Utc>,
        max_attempts: i32,
    ) -> ApiResult<String> {
        let id = Uuid::new_v4().to_string();
        let now = Utc::now();
        let payload_str = serde_json::to_string(&payload).unwrap_or_default();

        sqlx::query(
            "INSERT INTO jobs (id, job_type, payload, status, run_at, created_at, updated_at, max_attempts)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&id)
        .bind(job_type)
        .bind(&payload_str)
        .bind(JobStatus::Pending.to_string())
        .bind(run_at.to_rfc3339())
        .bind(now.to_rfc3339())
        .bind(now.to_rfc3339())
        .bind(max_attempts)
        .execute(self.db.pool())
        .await?;

        tracing::debug!("Enqueued {} job {}", job_type, id);
        Ok(id)
    }

    async fn fetch_next_job(&self) -> ApiResult<Option<Job>> {
        let now = Utc::now();
        let lock_timeout = now + chrono::Duration::minutes(5);

        // Transaction to ensure atomic fetch-and-lock
        let mut tx = self.db.pool().begin().await?;

        let candidate_row = sqlx::query(
            "SELECT id FROM jobs
             WHERE status = 'pending' AND run_at <= ?
             ORDER BY run_at ASC
             LIMIT 1",
        )
        .bind(now.to_rfc3339())
        .fetch_optional(&mut *tx)
        .await?;

        let Some(row) = candidate_row else {
            return Ok(None);
        };
        let id: String = row.try_get("id")?;

        // Lock the job. If another worker picked this same id, the update
        // matches no rows and we drop out.
        let result = sqlx::query(
            "UPDATE jobs
             SET status = 'processing', updated_at = ?, locked_until = ?
             WHERE id = ? AND status = 'pending'",
        )
        .bind(now.to_rfc3339())
        .bind(lock_timeout.to_rfc3339())
        .bind(&id)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            tx.rollback().await?;
            return Ok(None);
        }

        let job_row = sqlx::query(
            "SELECT id, job_type, payload, status,
                    CAST(run_at AS TEXT) as run_at,
                    CAST(created_at AS TEXT) as created_at,
                    CAST(updated_at AS TEXT) as updated_at,
                    attempts, max_attempts, last_error
             FROM jobs WHERE id = ?",
        )
        .bind(&id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        let status_str: String = job_row.try_get("status")?;
        let payload_str: String = job_row.try_get("payload")?;
        let payload: Value = serde_json::from_str(&payload_str).unwrap_or(Value::Null);

        fn parse_date_col(row: &sqlx::any::AnyRow, col: &str) -> ApiResult<DateTime<Utc>> {
            let s: String = row.try_get(col)?;
            DateTime::parse_from_rfc3339(&s)
                .map(|dt| dt.with_timezone(&Utc))
                .map_err(|e| sqlx::Error::Decode(Box::new(e)).into())
        }

        let last_error: Option<String> = job_row.try_get("last_error").ok();

        Ok(Some(Job {
            id: job_row.try_get("id")?,
            job_type: job_row.try_get("job_type")?,
            payload,
            status: JobStatus::from(status_str),
            run_at: parse_date_col(&job_row, "run_at")?,
            created_at: parse_date_col(&job_row, "created_at")?,
            updated_at: parse_date_col(&job_row, "updated_at")?,
            attempts: job_row.try_get("attempts")?,
            max_attempts: job_row.try_get("max_attempts")?,
            last_error,
        }))
    }

    async fn complete_job(&self, job_id: &str) -> ApiResult<()> {
        let now = Utc::now();
        sqlx::query(
            "UPDATE jobs
             SET status = 'completed', updated_at = ?
             WHERE id = ?",
        )
        .bind(now.to_rfc3339())
        .bind(job_id)
        .execute(self.db.pool())
        .await?;

        Ok(())
    }

    async fn fail_job(&self, job_id: &str, error: &str) -> ApiResult<()> {
        let now = Utc::now();

        let row = sqlx::query("SELECT attempts, max_attempts FROM jobs WHERE id = ?")
            .bind(job_id)
            .fetch_one(self.db.pool())
            .await?;

        let attempts: i32 = row.try_get("attempts")?;
        let max_attempts: i32 = row.try_get("max_attempts")?;
        let new_attempts = attempts + 1;

        if new_attempts < max_attempts {
            // Exponential backoff: 2^attempts * 30 seconds
            let backoff_seconds = 30 * (1 << attempts);
            let next_run = now + chrono::Duration::seconds(backoff_seconds as i64);

            sqlx::query(
                "UPDATE jobs
                 SET status = 'pending', attempts = ?, last_error = ?, run_at = ?, updated_at = ?
                 WHERE id = ?",
            )
            .bind(new_attempts)
            .bind(error)
            .bind(next_run.to_rfc3339())
            .bind(now.to_rfc3339())
            .bind(job_id)
            .execute(self.db.pool())
            .await?;
        } else {
            sqlx::query(
                "UPDATE jobs
                 SET status = 'failed', attempts = ?, last_error = ?, updated_at = ?
                 WHERE id = ?",
            )
            .bind(new_attempts)
            .bind(error)
            .bind(now.to_rfc3339())
            .bind(job_id)
            .execute(self.db.pool())
            .await?;
        }

        Ok(())
    }
}
