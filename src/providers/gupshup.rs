use crate::models::Template;
use crate::providers::{Provider, ProviderError};
use async_trait::async_trait;
use reqwest::StatusCode;
use serde_json::Value;
use std::collections::HashMap;
use std::time::Duration;

/// Gupshup partner API client. Templates are submitted as form-encoded
/// POSTs to `/partner/app/{app_id}/templates` with the partner API key
/// in the Authorization header.
pub struct GupshupProvider {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    app_id: String,
}

impl GupshupProvider {
    pub fn new(base_url: String, api_key: String, app_id: String) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .expect("Failed to build HTTP client");

        Self {
            client,
            base_url,
            api_key,
            app_id,
        }
    }

    /// Flatten the template into the form fields Gupshup expects.
    /// Structured payload entries (buttons, cards, ...) are sent as JSON
    /// strings, scalars as plain strings.
    fn build_form(&self, template: &Template) -> HashMap<String, String> {
        let mut form = HashMap::new();
        form.insert("elementName".to_string(), template.name.clone());
        form.insert(
            "languageCode".to_string(),
            template.language_code.clone(),
        );
        form.insert(
            "category".to_string(),
            template.category.as_str().to_string(),
        );
        form.insert(
            "templateType".to_string(),
            template.template_type.as_str().to_string(),
        );
        if let Some(content) = &template.content {
            form.insert("content".to_string(), content.clone());
        }

        if let Value::Object(extra) = &template.payload {
            for (key, value) in extra {
                let encoded = match value {
                    Value::String(s) => s.clone(),
                    Value::Null => continue,
                    other => other.to_string(),
                };
                form.entry(key.clone()).or_insert(encoded);
            }
        }

        form
    }
}

#[async_trait]
impl Provider for GupshupProvider {
    fn name(&self) -> &str {
        "gupshup"
    }

    async fn submit(&self, template: &Template) -> Result<String, ProviderError> {
        let url = format!("{}/partner/app/{}/templates", self.base_url, self.app_id);
        let form = self.build_form(template);

        tracing::debug!("Submitting template {} to {}", template.id, url);

        let response = self
            .client
            .post(&url)
            .header("Authorization", &self.api_key)
            .header("Accept", "application/json")
            .form(&form)
            .send()
            .await
            .map_err(|e| ProviderError::Transient(format!("Request failed: {}", e)))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ProviderError::Transient(format!("Failed to read response: {}", e)))?;

        if status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS {
            return Err(ProviderError::Transient(format!("HTTP {}: {}", status, body)));
        }
        if !status.is_success() {
            return Err(ProviderError::Permanent(format!("HTTP {}: {}", status, body)));
        }

        let parsed: Value = serde_json::from_str(&body)
            .map_err(|_| ProviderError::Permanent(format!("Unparseable response: {}", body)))?;

        if parsed.get("status").and_then(Value::as_str) != Some("success") {
            return Err(ProviderError::Permanent(format!(
                "Provider rejected submission: {}",
                body
            )));
        }

        parsed
            .get("template")
            .and_then(|t| t.get("id"))
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| {
                ProviderError::Permanent(format!("Missing template id in response: {}", body))
            })
    }
}
