use std::env;

#[derive(Clone, Debug)]
pub struct Config {
    pub database_url: String,
    pub server_host: String,
    pub server_port: u16,
    pub jwt_secret: Option<String>,
    pub tenant_claim: String,
    pub tenant_strict: bool,
    pub provider_name: String,
    pub gupshup_api_key: String,
    pub gupshup_app_id: String,
    pub gupshup_base_url: String,
    pub submit_max_attempts: i32,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if it exists
        dotenvy::dotenv().ok();

        let database_url = env::var("DATABASE_URL")
            .unwrap_or_else(|_| "sqlite://wa_templates.db?mode=rwc".to_string());

        let server_host = env::var("SERVER_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());

        let server_port = env::var("SERVER_PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse()
            .map_err(|_| ConfigError::InvalidPort)?;

        let jwt_secret = env::var("JWT_SECRET").ok().filter(|s| !s.is_empty());

        let tenant_claim = env::var("TENANT_CLAIM").unwrap_or_else(|_| "org".to_string());

        let tenant_strict = env::var("TENANT_STRICT")
            .map(|v| matches!(v.to_lowercase().as_str(), "1" | "true" | "yes"))
            .unwrap_or(false);

        if tenant_strict && jwt_secret.is_none() {
            return Err(ConfigError::MissingJwtSecret);
        }

        let provider_name = env::var("PROVIDER_NAME").unwrap_or_else(|_| "gupshup".to_string());

        let gupshup_api_key = env::var("GUPSHUP_API_KEY").unwrap_or_default();
        let gupshup_app_id = env::var("GUPSHUP_APP_ID").unwrap_or_default();
        let gupshup_base_url = env::var("GUPSHUP_BASE_URL")
            .unwrap_or_else(|_| "https://partner.gupshup.io".to_string());

        let submit_max_attempts = env::var("SUBMIT_MAX_ATTEMPTS")
            .unwrap_or_else(|_| "3".to_string())
            .parse()
            .unwrap_or(3);

        Ok(Config {
            database_url,
            server_host,
            server_port,
            jwt_secret,
            tenant_claim,
            tenant_strict,
            provider_name,
            gupshup_api_key,
            gupshup_app_id,
            gupshup_base_url,
            submit_max_attempts,
        })
    }

    pub fn server_address(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("JWT_SECRET must be set when TENANT_STRICT is enabled")]
    MissingJwtSecret,

    #[error("Invalid port number")]
    InvalidPort,
}
