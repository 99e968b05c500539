use crate::api::middleware::error::ApiResult;
use crate::database::Database;
use crate::models::{Template, TemplateStatus};
use sqlx::any::AnyRow;
use sqlx::Row;

fn row_to_template(row: &AnyRow) -> ApiResult<Template> {
    let status_str: String = row.try_get("status")?;
    let type_str: String = row.try_get("template_type")?;
    let category_str: String = row.try_get("category")?;
    let payload_str: String = row.try_get("payload")?;
    let payload = serde_json::from_str(&payload_str).unwrap_or(serde_json::Value::Null);

    Ok(Template {
        id: row.try_get("id")?,
        tenant_id: row.try_get("tenant_id")?,
        name: row.try_get("name")?,
        template_type: type_str
            .parse()
            .map_err(crate::api::middleware::error::ApiError::Internal)?,
        language_code: row.try_get("language_code")?,
        category: category_str
            .parse()
            .map_err(crate::api::middleware::error::ApiError::Internal)?,
        content: row.try_get("content").ok(),
        payload,
        status: TemplateStatus::from(status_str),
        provider_reference: row.try_get("provider_reference").ok(),
        last_error: row.try_get("last_error").ok(),
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

impl Database {
    /// Insert a new template row
    pub async fn create_template(&self, template: &Template) -> ApiResult<()> {
        let payload_str = serde_json::to_string(&template.payload).unwrap_or_default();

        sqlx::query(
            "INSERT INTO templates (id, tenant_id, name, template_type, language_code, category,
                                    content, payload, status, provider_reference, last_error,
                                    created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&template.id)
        .bind(&template.tenant_id)
        .bind(&template.name)
        .bind(template.template_type.as_str())
        .bind(&template.language_code)
        .bind(template.category.as_str())
        .bind(&template.content)
        .bind(&payload_str)
        .bind(template.status.as_str())
        .bind(&template.provider_reference)
        .bind(&template.last_error)
        .bind(&template.created_at)
        .bind(&template.updated_at)
        .execute(&self.pool)
        .await?;

        tracing::info!(
            "Template created: id={}, tenant={}, name={}",
            template.id,
            template.tenant_id,
            template.name
        );
        Ok(())
    }

    /// Tenant-scoped lookup. A row owned by another tenant is invisible.
    pub async fn get_template(&self, tenant_id: &str, id: &str) -> ApiResult<Option<Template>> {
        let row = sqlx::query(
            "SELECT id, tenant_id, name, template_type, language_code, category, content,
                    payload, status, provider_reference, last_error, created_at, updated_at
             FROM templates
             WHERE id = ? AND tenant_id = ?",
        )
        .bind(id)
        .bind(tenant_id)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => Ok(Some(row_to_template(&row)?)),
            None => Ok(None),
        }
    }

    /// Unscoped lookup for the webhook and worker paths, where the row's
    /// own tenant_id is authoritative.
    pub async fn get_template_unscoped(&self, id: &str) -> ApiResult<Option<Template>> {
        let row = sqlx::query(
            "SELECT id, tenant_id, name, template_type, language_code, category, content,
                    payload, status, provider_reference, last_error, created_at, updated_at
             FROM templates
             WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => Ok(Some(row_to_template(&row)?)),
            None => Ok(None),
        }
    }

    /// List templates for a tenant, newest first, optionally filtered by status
    pub async fn list_templates(
        &self,
        tenant_id: &str,
        status: Option<TemplateStatus>,
        limit: i64,
        offset: i64,
    ) -> ApiResult<(Vec<Template>, i64)> {
        let (count_sql, list_sql) = if status.is_some() {
            (
                "SELECT COUNT(*) as count FROM templates WHERE tenant_id = ? AND status = ?",
                "SELECT id, tenant_id, name, template_type, language_code, category, content,
                        payload, status, provider_reference, last_error, created_at, updated_at
                 FROM templates
                 WHERE tenant_id = ? AND status = ?
                 ORDER BY created_at DESC
                 LIMIT ? OFFSET ?",
            )
        } else {
            (
                "SELECT COUNT(*) as count FROM templates WHERE tenant_id = ?",
                "SELECT id, tenant_id, name, template_type, language_code, category, content,
                        payload, status, provider_reference, last_error, created_at, updated_at
                 FROM templates
                 WHERE tenant_id = ?
                 ORDER BY created_at DESC
                 LIMIT ? OFFSET ?",
            )
        };

        let mut count_query = sqlx::query(count_sql).bind(tenant_id);
        if let Some(s) = status {
            count_query = count_query.bind(s.as_str());
        }
        let count_row = count_query.fetch_one(&self.pool).await?;
        let total_count: i64 = count_row.try_get("count")?;

        let mut list_query = sqlx::query(list_sql).bind(tenant_id);
        if let Some(s) = status {
            list_query = list_query.bind(s.as_str());
        }
        let rows = list_query
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?;

        let mut templates = Vec::new();
        for row in rows {
            templates.push(row_to_template(&row)?);
        }

        Ok((templates, total_count))
    }

    /// Conditional status update: the write succeeds only if the row's
    /// current status is in `expected`, which serializes concurrent
    /// transitions on the same record. Returns whether a row changed;
    /// losers of the race observe `false` and must treat it as a no-op.
    ///
    /// `provider_reference` is set when `Some` and left untouched
    /// otherwise. `last_error` is always written, so a successful
    /// transition clears any earlier failure detail.
    pub async fn update_template_status(
        &self,
        id: &str,
        expected: &[TemplateStatus],
        new_status: TemplateStatus,
        provider_reference: Option<&str>,
        last_error: Option<&str>,
    ) -> ApiResult<bool> {
        let now = chrono::Utc::now().to_rfc3339();
        let placeholders = expected.iter().map(|_| "?").collect::<Vec<_>>().join(", ");
        let sql = format!(
            "UPDATE templates
             SET status = ?,
                 provider_reference = COALESCE(?, provider_reference),
                 last_error = ?,
                 updated_at = ?
             WHERE id = ? AND status IN ({})",
            placeholders
        );

        let mut query = sqlx::query(&sql)
            .bind(new_status.as_str())
            .bind(provider_reference)
            .bind(last_error)
            .bind(&now)
            .bind(id);
        for s in expected {
            query = query.bind(s.as_str());
        }

        let result = query.execute(&self.pool).await?;
        let updated = result.rows_affected() > 0;

        if updated {
            tracing::info!("Template {} status -> {}", id, new_status);
        } else {
            tracing::debug!(
                "Template {} status update to {} skipped (precondition not met)",
                id,
                new_status
            );
        }

        Ok(updated)
    }
}
