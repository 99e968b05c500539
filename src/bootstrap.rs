use crate::api::middleware::{AppState, TenantConfig};
use crate::config::Config;
use crate::database::Database;
use crate::providers;
use crate::services::TemplateService;
use crate::workers::{JobProcessor, SqlTaskQueue, TaskQueue};
use std::sync::Arc;

/// Wire up services and start the background submission worker
pub async fn build_app_state(
    db: Database,
    config: &Config,
) -> Result<AppState, Box<dyn std::error::Error>> {
    let task_queue: Arc<dyn TaskQueue> = Arc::new(SqlTaskQueue::new(db.clone()));
    tracing::info!("Task queue initialized");

    let provider = providers::build_provider(config)?;
    tracing::info!("Provider adapter initialized: {}", provider.name());

    let template_service = TemplateService::new(
        db.clone(),
        task_queue.clone(),
        config.submit_max_attempts,
    );
    tracing::info!(
        "Template service initialized (submit retry budget: {})",
        config.submit_max_attempts
    );

    let job_processor = JobProcessor::new(task_queue.clone(), db.clone(), provider);
    tokio::spawn(async move {
        job_processor.run().await;
    });
    tracing::info!("Submission worker started");

    Ok(AppState {
        template_service,
        tenant: TenantConfig {
            jwt_secret: config.jwt_secret.clone(),
            claim: config.tenant_claim.clone(),
            strict: config.tenant_strict,
        },
        provider_name: config.provider_name.clone(),
    })
}
