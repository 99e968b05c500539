use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};

use crate::database::Database;
use crate::models::{Job, TemplateStatus};
use crate::providers::Provider;
use crate::workers::job_queue::TaskQueue;
use crate::workers::JOB_SUBMIT_TEMPLATE;

/// Background worker consuming the durable queue. Submission handlers
/// are idempotent under redelivery: all state transitions go through the
/// store's conditional update, so a redelivered job for an
/// already-submitted template exits as a no-op.
pub struct JobProcessor {
    queue: Arc<dyn TaskQueue>,
    db: Database,
    provider: Arc<dyn Provider>,
}

impl JobProcessor {
    pub fn new(queue: Arc<dyn TaskQueue>, db: Database, provider: Arc<dyn Provider>) -> Self {
        Self {
            queue,
            db,
            provider,
        }
    }

    pub async fn run(&self) {
        info!("Starting JobProcessor (provider: {})", self.provider.name());
        loop {
            match self.process_next().await {
                Ok(Some(_)) => {
                    // Job processed, check for next one immediately
                    continue;
                }
                Ok(None) => {
                    tokio::time::sleep(Duration::from_secs(1)).await;
                }
                Err(e) => {
                    error!("Error processing job: {}", e);
                    tokio::time::sleep(Duration::from_secs(5)).await;
                }
            }
        }
    }

    pub async fn process_next(&self) -> Result<Option<()>, String> {
        let job = self
            .queue
            .fetch_next_job()
            .await
            .map_err(|e| e.to_string())?;

        let Some(job) = job else {
            return Ok(None);
        };

        info!("Processing job {} (type: {})", job.id, job.job_type);

        let result = self.execute_job(&job).await;

        match result {
            Ok(_) => {
                if let Err(e) = self.queue.complete_job(&job.id).await {
                    error!("Failed to mark job {} as completed: {}", job.id, e);
                }
            }
            Err(e) => {
                error!("Job {} failed: {}", job.id, e);
                if let Err(retry_err) = self.queue.fail_job(&job.id, &e).await {
                    error!("Failed to mark job {} as failed: {}", job.id, retry_err);
                }
            }
        }

        Ok(Some(()))
    }

    async fn execute_job(&self, job: &Job) -> Result<(), String> {
        match job.job_type.as_str() {
            JOB_SUBMIT_TEMPLATE => self.handle_submit_template(job).await,
            _ => Err(format!("Unknown job type: {}", job.job_type)),
        }
    }

    /// Submit a template to the provider and conditionally move it to
    /// PENDING. Returns Err only for transient provider failures, which
    /// the queue retries with backoff.
    async fn handle_submit_template(&self, job: &Job) -> Result<(), String> {
        let template_id = job.payload["template_id"]
            .as_str()
            .ok_or("Missing 'template_id' in job payload")?;

        let template = self
            .db
            .get_template_unscoped(template_id)
            .await
            .map_err(|e| e.to_string())?;

        let Some(template) = template else {
            // The row was never created or this is a stray redelivery;
            // nothing to retry.
            warn!("Template {} not found, dropping submission job", template_id);
            return Ok(());
        };

        if !matches!(
            template.status,
            TemplateStatus::Draft | TemplateStatus::Failed
        ) {
            info!(
                "Template {} already {} , skipping submission (redelivery)",
                template_id, template.status
            );
            return Ok(());
        }

        match self.provider.submit(&template).await {
            Ok(reference) => {
                let updated = self
                    .db
                    .update_template_status(
                        template_id,
                        &[TemplateStatus::Draft, TemplateStatus::Failed],
                        TemplateStatus::Pending,
                        Some(&reference),
                        None,
                    )
                    .await
                    .map_err(|e| e.to_string())?;

                if updated {
                    info!(
                        "Template {} submitted, provider reference {}",
                        template_id, reference
                    );
                } else {
                    // A concurrent execution won the transition first.
                    info!(
                        "Template {} already transitioned, submission result dropped",
                        template_id
                    );
                }
                Ok(())
            }
            Err(e) if e.is_transient() => {
                // This execution is attempt `attempts + 1`; once the
                // budget is spent the failure becomes terminal.
                let final_attempt = job.attempts + 1 >= job.max_attempts;
                if final_attempt {
                    warn!(
                        "Template {} submission exhausted {} attempts: {}",
                        template_id, job.max_attempts, e
                    );
                    self.db
                        .update_template_status(
                            template_id,
                            &[TemplateStatus::Draft, TemplateStatus::Failed],
                            TemplateStatus::Failed,
                            None,
                            Some(&e.to_string()),
                        )
                        .await
                        .map_err(|err| err.to_string())?;
                }
                Err(e.to_string())
            }
            Err(e) => {
                warn!("Template {} rejected by provider: {}", template_id, e);
                self.db
                    .update_template_status(
                        template_id,
                        &[TemplateStatus::Draft, TemplateStatus::Failed],
                        TemplateStatus::Failed,
                        None,
                        Some(&e.to_string()),
                    )
                    .await
                    .map_err(|err| err.to_string())?;
                Ok(())
            }
        }
    }
}
