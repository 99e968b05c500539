use axum::{
    extract::{Path, State},
    Json,
};
use serde_json::{json, Value};

use crate::{
    api::middleware::{ApiError, ApiResult, AppState},
    services::{WebhookDisposition, WebhookOutcome},
};

/// POST /api/webhooks/:provider/ - Provider status callback.
///
/// Body: `{"template_id": "...", "status": "approved"|"rejected"}`.
/// Duplicate and late deliveries are accepted with 200 and no state
/// change; only malformed bodies (400) and unknown template ids (404)
/// are rejected. The body is taken as raw JSON so shape validation
/// stays a 400 rather than an extractor rejection.
pub async fn provider_webhook(
    State(state): State<AppState>,
    Path(provider): Path<String>,
    Json(body): Json<Value>,
) -> ApiResult<Json<Value>> {
    if provider != state.provider_name {
        return Err(ApiError::NotFound(format!("Unknown provider: {}", provider)));
    }

    let template_id = match body.get("template_id") {
        Some(Value::String(s)) if !s.is_empty() => s.clone(),
        // Some providers send numeric ids
        Some(Value::Number(n)) => n.to_string(),
        _ => {
            return Err(ApiError::BadRequest(
                "Missing or invalid 'template_id'".to_string(),
            ))
        }
    };

    let status = body
        .get("status")
        .and_then(Value::as_str)
        .ok_or_else(|| ApiError::BadRequest("Missing 'status'".to_string()))?;

    let outcome = WebhookOutcome::parse(status)
        .ok_or_else(|| ApiError::BadRequest(format!("Unknown status: {}", status)))?;

    let disposition = state
        .template_service
        .apply_webhook(&template_id, outcome)
        .await?;

    let detail = match disposition {
        WebhookDisposition::Updated => "updated",
        WebhookDisposition::Ignored => "ignored",
    };

    tracing::info!(
        "Webhook from {} for template {}: {} ({})",
        provider,
        template_id,
        status,
        detail
    );

    Ok(Json(json!({ "detail": detail })))
}
