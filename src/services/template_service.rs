use crate::api::middleware::error::{ApiError, ApiResult};
use crate::database::Database;
use crate::models::*;
use crate::services::state_machine::validate_transition;
use crate::workers::{TaskQueue, JOB_SUBMIT_TEMPLATE};
use serde_json::{json, Value};
use std::sync::Arc;

const MAX_NAME_LEN: usize = 200;

/// Outcome vocabulary accepted from provider webhooks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WebhookOutcome {
    Approved,
    Rejected,
}

impl WebhookOutcome {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "approved" => Some(WebhookOutcome::Approved),
            "rejected" => Some(WebhookOutcome::Rejected),
            _ => None,
        }
    }

    fn status(self) -> TemplateStatus {
        match self {
            WebhookOutcome::Approved => TemplateStatus::Approved,
            WebhookOutcome::Rejected => TemplateStatus::Rejected,
        }
    }
}

/// What a webhook delivery did to the record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WebhookDisposition {
    Updated,
    /// Record was not in a state the callback applies to (duplicate or
    /// late delivery); accepted without mutation.
    Ignored,
}

/// Service owning template lifecycle operations: tenant-scoped CRUD,
/// submission dispatch, and webhook application.
#[derive(Clone)]
pub struct TemplateService {
    db: Database,
    queue: Arc<dyn TaskQueue>,
    submit_max_attempts: i32,
}

impl TemplateService {
    pub fn new(db: Database, queue: Arc<dyn TaskQueue>, submit_max_attempts: i32) -> Self {
        Self {
            db,
            queue,
            submit_max_attempts,
        }
    }

    /// Create a DRAFT template and enqueue its provider submission
    pub async fn create_template(
        &self,
        tenant_id: &str,
        request: CreateTemplateRequest,
    ) -> ApiResult<Template> {
        let name = request.name.trim().to_string();
        if name.is_empty() {
            return Err(ApiError::BadRequest(
                "Template name cannot be empty".to_string(),
            ));
        }
        if name.len() > MAX_NAME_LEN {
            return Err(ApiError::BadRequest(format!(
                "Template name cannot exceed {} characters",
                MAX_NAME_LEN
            )));
        }

        let template_type: TemplateType = request
            .template_type
            .parse()
            .map_err(ApiError::BadRequest)?;

        let category: TemplateCategory = request
            .category
            .as_deref()
            .unwrap_or("MARKETING")
            .parse()
            .map_err(ApiError::BadRequest)?;

        let content = request
            .content
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty());

        if template_type == TemplateType::Text && content.is_none() {
            return Err(ApiError::BadRequest(
                "Text templates require content".to_string(),
            ));
        }

        let payload = match request.payload {
            Value::Null => json!({}),
            Value::Object(map) => Value::Object(map),
            _ => {
                return Err(ApiError::BadRequest(
                    "Template payload must be a JSON object".to_string(),
                ))
            }
        };

        let template = Template::new(
            tenant_id.to_string(),
            name,
            template_type,
            request.language_code.unwrap_or_else(|| "en".to_string()),
            category,
            content,
            payload,
        );

        self.db.create_template(&template).await?;
        self.enqueue_submission(&template.id).await?;

        Ok(template)
    }

    /// Tenant-scoped lookup; cross-tenant reads surface as NotFound
    pub async fn get_template(&self, tenant_id: &str, id: &str) -> ApiResult<Template> {
        self.db
            .get_template(tenant_id, id)
            .await?
            .ok_or_else(|| ApiError::NotFound(format!("Template {} not found", id)))
    }

    pub async fn list_templates(
        &self,
        tenant_id: &str,
        status: Option<&str>,
        limit: i64,
        offset: i64,
    ) -> ApiResult<(Vec<Template>, i64)> {
        let status = match status {
            Some(s) => Some(
                s.parse::<TemplateStatus>()
                    .map_err(ApiError::BadRequest)?,
            ),
            None => None,
        };

        self.db
            .list_templates(tenant_id, status, limit, offset)
            .await
    }

    /// Re-enqueue submission for a FAILED template. A submitted
    /// template's payload is never edited in place; anything past FAILED
    /// keeps its history and resubmission means creating a new record.
    pub async fn resubmit_template(&self, tenant_id: &str, id: &str) -> ApiResult<Template> {
        let template = self.get_template(tenant_id, id).await?;

        if template.status != TemplateStatus::Failed {
            return Err(ApiError::Conflict(format!(
                "Template {} is {}; only failed templates can be resubmitted",
                id, template.status
            )));
        }

        self.enqueue_submission(&template.id).await?;
        Ok(template)
    }

    /// Apply a provider callback. Only records currently PENDING are
    /// transitioned; anything else (duplicate delivery, late callback
    /// after a newer state) is accepted as a no-op so the provider's
    /// retries stay harmless. The record's stored tenant_id is
    /// authoritative; the payload carries none.
    pub async fn apply_webhook(
        &self,
        template_id: &str,
        outcome: WebhookOutcome,
    ) -> ApiResult<WebhookDisposition> {
        let template = self
            .db
            .get_template_unscoped(template_id)
            .await?
            .ok_or_else(|| ApiError::NotFound(format!("Template {} not found", template_id)))?;

        let target = outcome.status();
        if validate_transition(template.status, target).is_err() {
            tracing::info!(
                "Webhook for template {} ignored: {} -> {} not applicable",
                template_id,
                template.status,
                target
            );
            return Ok(WebhookDisposition::Ignored);
        }

        let updated = self
            .db
            .update_template_status(template_id, &[TemplateStatus::Pending], target, None, None)
            .await?;

        if updated {
            Ok(WebhookDisposition::Updated)
        } else {
            // Lost a race with a concurrent delivery; same end state.
            Ok(WebhookDisposition::Ignored)
        }
    }

    async fn enqueue_submission(&self, template_id: &str) -> ApiResult<()> {
        self.queue
            .enqueue(
                JOB_SUBMIT_TEMPLATE,
                json!({ "template_id": template_id }),
                self.submit_max_attempts,
            )
            .await?;
        Ok(())
    }
}
