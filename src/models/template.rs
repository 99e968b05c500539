use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::str::FromStr;
use uuid::Uuid;

/// Lifecycle status of a template. Stored as lowercase strings, which is
/// also the vocabulary the provider uses in webhook callbacks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TemplateStatus {
    Draft,
    Pending,
    Approved,
    Rejected,
    Failed,
}

impl TemplateStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TemplateStatus::Draft => "draft",
            TemplateStatus::Pending => "pending",
            TemplateStatus::Approved => "approved",
            TemplateStatus::Rejected => "rejected",
            TemplateStatus::Failed => "failed",
        }
    }
}

impl std::fmt::Display for TemplateStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TemplateStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" => Ok(TemplateStatus::Draft),
            "pending" => Ok(TemplateStatus::Pending),
            "approved" => Ok(TemplateStatus::Approved),
            "rejected" => Ok(TemplateStatus::Rejected),
            "failed" => Ok(TemplateStatus::Failed),
            other => Err(format!("Unknown template status: {}", other)),
        }
    }
}

impl From<String> for TemplateStatus {
    fn from(s: String) -> Self {
        s.parse().unwrap_or(TemplateStatus::Draft)
    }
}

/// Template content type, provider vocabulary (uppercase on the wire)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TemplateType {
    Text,
    Image,
    Video,
    Document,
    Carousel,
    Catalog,
}

impl TemplateType {
    pub const ALL: [TemplateType; 6] = [
        TemplateType::Text,
        TemplateType::Image,
        TemplateType::Video,
        TemplateType::Document,
        TemplateType::Carousel,
        TemplateType::Catalog,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TemplateType::Text => "TEXT",
            TemplateType::Image => "IMAGE",
            TemplateType::Video => "VIDEO",
            TemplateType::Document => "DOCUMENT",
            TemplateType::Carousel => "CAROUSEL",
            TemplateType::Catalog => "CATALOG",
        }
    }
}

impl std::fmt::Display for TemplateType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TemplateType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "TEXT" => Ok(TemplateType::Text),
            "IMAGE" => Ok(TemplateType::Image),
            "VIDEO" => Ok(TemplateType::Video),
            "DOCUMENT" => Ok(TemplateType::Document),
            "CAROUSEL" => Ok(TemplateType::Carousel),
            "CATALOG" => Ok(TemplateType::Catalog),
            other => Err(format!("Unknown template type: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TemplateCategory {
    Marketing,
    Utility,
    Authentication,
}

impl TemplateCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            TemplateCategory::Marketing => "MARKETING",
            TemplateCategory::Utility => "UTILITY",
            TemplateCategory::Authentication => "AUTHENTICATION",
        }
    }
}

impl FromStr for TemplateCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "MARKETING" => Ok(TemplateCategory::Marketing),
            "UTILITY" => Ok(TemplateCategory::Utility),
            "AUTHENTICATION" => Ok(TemplateCategory::Authentication),
            other => Err(format!("Unknown template category: {}", other)),
        }
    }
}

/// WhatsApp message template entity.
///
/// `tenant_id` is immutable after creation and every API read/write is
/// scoped by it. `status` only moves forward through the lifecycle; the
/// store enforces transitions with conditional updates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Template {
    pub id: String,
    pub tenant_id: String,
    pub name: String,
    pub template_type: TemplateType,
    pub language_code: String,
    pub category: TemplateCategory,
    pub content: Option<String>,
    pub payload: Value,
    pub status: TemplateStatus,
    pub provider_reference: Option<String>,
    pub last_error: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl Template {
    pub fn new(
        tenant_id: String,
        name: String,
        template_type: TemplateType,
        language_code: String,
        category: TemplateCategory,
        content: Option<String>,
        payload: Value,
    ) -> Self {
        let now = chrono::Utc::now().to_rfc3339();
        Self {
            id: Uuid::new_v4().to_string(),
            tenant_id,
            name,
            template_type,
            language_code,
            category,
            content,
            payload,
            status: TemplateStatus::Draft,
            provider_reference: None,
            last_error: None,
            created_at: now.clone(),
            updated_at: now,
        }
    }
}

// ========== DTOs (Data Transfer Objects) ==========

/// Request to create a new template
#[derive(Debug, Deserialize)]
pub struct CreateTemplateRequest {
    pub name: String,
    #[serde(rename = "templateType")]
    pub template_type: String,
    #[serde(rename = "languageCode")]
    pub language_code: Option<String>,
    pub category: Option<String>,
    pub content: Option<String>,
    #[serde(default)]
    pub payload: Value,
}

/// Response containing full template data
#[derive(Debug, Serialize)]
pub struct TemplateResponse {
    pub id: String,
    pub tenant_id: String,
    pub name: String,
    #[serde(rename = "templateType")]
    pub template_type: TemplateType,
    #[serde(rename = "languageCode")]
    pub language_code: String,
    pub category: TemplateCategory,
    pub content: Option<String>,
    pub payload: Value,
    pub status: TemplateStatus,
    pub provider_reference: Option<String>,
    pub last_error: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Template> for TemplateResponse {
    fn from(t: Template) -> Self {
        Self {
            id: t.id,
            tenant_id: t.tenant_id,
            name: t.name,
            template_type: t.template_type,
            language_code: t.language_code,
            category: t.category,
            content: t.content,
            payload: t.payload,
            status: t.status,
            provider_reference: t.provider_reference,
            last_error: t.last_error,
            created_at: t.created_at,
            updated_at: t.updated_at,
        }
    }
}

/// Response containing paginated list of templates
#[derive(Debug, Serialize)]
pub struct TemplateListResponse {
    pub templates: Vec<TemplateResponse>,
    pub pagination: crate::models::PaginationMetadata,
}
