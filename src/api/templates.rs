use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use serde_json::json;

use crate::{
    api::middleware::{ApiResult, AppState, TenantContext},
    models::*,
};

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub status: Option<String>,
    #[serde(default = "default_page")]
    pub page: i64,
    #[serde(default = "default_per_page")]
    pub per_page: i64,
}

fn default_page() -> i64 {
    1
}

fn default_per_page() -> i64 {
    20
}

/// POST /api/templates/ - Create a template (DRAFT) and queue submission
pub async fn create_template(
    State(state): State<AppState>,
    axum::Extension(ctx): axum::Extension<TenantContext>,
    Json(req): Json<CreateTemplateRequest>,
) -> ApiResult<(StatusCode, Json<TemplateResponse>)> {
    let tenant_id = ctx.require()?;

    let template = state
        .template_service
        .create_template(tenant_id, req)
        .await?;

    Ok((StatusCode::CREATED, Json(TemplateResponse::from(template))))
}

/// GET /api/templates/:id - Get template by ID (tenant-scoped)
pub async fn get_template(
    State(state): State<AppState>,
    axum::Extension(ctx): axum::Extension<TenantContext>,
    Path(template_id): Path<String>,
) -> ApiResult<Json<TemplateResponse>> {
    let tenant_id = ctx.require()?;

    let template = state
        .template_service
        .get_template(tenant_id, &template_id)
        .await?;

    Ok(Json(TemplateResponse::from(template)))
}

/// GET /api/templates/ - List templates, filterable by status
pub async fn list_templates(
    State(state): State<AppState>,
    axum::Extension(ctx): axum::Extension<TenantContext>,
    Query(params): Query<ListQuery>,
) -> ApiResult<Json<TemplateListResponse>> {
    let tenant_id = ctx.require()?;

    let page = params.page.max(1);
    let per_page = params.per_page.clamp(1, 100);
    let offset = (page - 1) * per_page;

    let (templates, total) = state
        .template_service
        .list_templates(tenant_id, params.status.as_deref(), per_page, offset)
        .await?;

    let total_pages = (total + per_page - 1) / per_page;
    let responses: Vec<TemplateResponse> =
        templates.into_iter().map(TemplateResponse::from).collect();

    Ok(Json(TemplateListResponse {
        templates: responses,
        pagination: PaginationMetadata {
            page,
            per_page,
            total_count: total,
            total_pages,
        },
    }))
}

/// POST /api/templates/:id/resubmit/ - Re-queue a failed template
pub async fn resubmit_template(
    State(state): State<AppState>,
    axum::Extension(ctx): axum::Extension<TenantContext>,
    Path(template_id): Path<String>,
) -> ApiResult<(StatusCode, Json<serde_json::Value>)> {
    let tenant_id = ctx.require()?;

    state
        .template_service
        .resubmit_template(tenant_id, &template_id)
        .await?;

    Ok((
        StatusCode::ACCEPTED,
        Json(json!({ "detail": "Submitted for approval" })),
    ))
}

/// GET /api/templates/types/ - Template type vocabulary for clients
pub async fn template_types() -> Json<serde_json::Value> {
    let types: Vec<&str> = TemplateType::ALL.iter().map(|t| t.as_str()).collect();
    Json(json!({ "types": types }))
}
