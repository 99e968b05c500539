pub mod state_machine;
pub mod template_service;

pub use template_service::{TemplateService, WebhookDisposition, WebhookOutcome};
