use crate::models::Template;
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

pub mod gupshup;

pub use gupshup::GupshupProvider;

/// Errors from a provider submission, split by retry eligibility.
/// Transient failures (network, timeouts, 5xx) are retried by the job
/// queue; permanent ones (validation, other 4xx) move the template to
/// FAILED immediately.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("transient provider error: {0}")]
    Transient(String),
    #[error("permanent provider error: {0}")]
    Permanent(String),
}

impl ProviderError {
    pub fn is_transient(&self) -> bool {
        matches!(self, ProviderError::Transient(_))
    }
}

/// External template-approval provider. One concrete implementation
/// ships; the trait keeps the submission worker and API layer unaware of
/// which provider is configured.
#[async_trait]
pub trait Provider: Send + Sync {
    fn name(&self) -> &str;

    /// Submit a template for approval; returns the provider-assigned
    /// reference id used to correlate later webhook callbacks.
    async fn submit(&self, template: &Template) -> Result<String, ProviderError>;
}

/// Select the provider implementation by name at startup
pub fn build_provider(config: &crate::config::Config) -> Result<Arc<dyn Provider>, String> {
    match config.provider_name.as_str() {
        "gupshup" => Ok(Arc::new(GupshupProvider::new(
            config.gupshup_base_url.clone(),
            config.gupshup_api_key.clone(),
            config.gupshup_app_id.clone(),
        ))),
        other => Err(format!("Unknown provider: {}", other)),
    }
}
