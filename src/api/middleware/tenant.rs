use crate::api::middleware::error::ApiError;
use crate::services::TemplateService;
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde_json::Value;

/// Tenant extraction settings, sourced from the environment at startup
#[derive(Clone, Debug)]
pub struct TenantConfig {
    /// HS256 shared secret for verifying bearer tokens. Verification is
    /// skipped entirely when absent (tolerant deployments only).
    pub jwt_secret: Option<String>,
    /// Claim carrying the tenant identifier (`org_id` is always accepted
    /// as a fallback)
    pub claim: String,
    /// Reject requests without a resolvable tenant instead of proceeding
    /// with an anonymous context
    pub strict: bool,
}

#[derive(Clone)]
pub struct AppState {
    pub template_service: TemplateService,
    pub tenant: TenantConfig,
    pub provider_name: String,
}

/// Per-request tenant context, resolved from the bearer credential.
/// `tenant_id` is `None` in tolerant mode when no credential was
/// presented; tenant-scoped handlers reject such requests at use.
#[derive(Clone, Debug, Default)]
pub struct TenantContext {
    pub tenant_id: Option<String>,
    pub subject: Option<String>,
}

impl TenantContext {
    pub fn require(&self) -> Result<&str, ApiError> {
        self.tenant_id.as_deref().ok_or(ApiError::Unauthorized)
    }
}

/// Decode the Authorization bearer token and attach a `TenantContext` to
/// the request. Tolerant mode lets requests through with an empty
/// context on any failure; strict mode turns every failure into 401.
pub async fn resolve_tenant(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let ctx = match extract_context(&state.tenant, &request) {
        Ok(ctx) => ctx,
        Err(e) => {
            if state.tenant.strict {
                return Err(e);
            }
            tracing::debug!("Tenant resolution failed, proceeding anonymously: {}", e);
            TenantContext::default()
        }
    };

    if state.tenant.strict && ctx.tenant_id.is_none() {
        return Err(ApiError::Unauthorized);
    }

    request.extensions_mut().insert(ctx);
    Ok(next.run(request).await)
}

fn extract_context(config: &TenantConfig, request: &Request) -> Result<TenantContext, ApiError> {
    let auth_header = request
        .headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok());

    let token = match auth_header {
        Some(value) => value
            .strip_prefix("Bearer ")
            .ok_or(ApiError::Unauthorized)?,
        None => return Ok(TenantContext::default()),
    };

    let secret = match config.jwt_secret.as_deref() {
        Some(s) => s,
        // Nothing to verify against; treat the token as opaque.
        None => return Ok(TenantContext::default()),
    };

    let validation = Validation::new(Algorithm::HS256);
    let claims = decode::<Value>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map_err(|e| {
        tracing::debug!("Bearer token rejected: {}", e);
        ApiError::Unauthorized
    })?
    .claims;

    let tenant_id = claims
        .get(&config.claim)
        .or_else(|| claims.get("org_id"))
        .and_then(Value::as_str)
        .map(str::to_string);

    let subject = claims
        .get("sub")
        .or_else(|| claims.get("user_id"))
        .and_then(Value::as_str)
        .map(str::to_string);

    if tenant_id.is_none() {
        tracing::debug!("Bearer token carries no '{}' claim", config.claim);
    }

    Ok(TenantContext { tenant_id, subject })
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use jsonwebtoken::{encode, EncodingKey, Header};

    const SECRET: &str = "test-secret";

    fn config(claim: &str, strict: bool) -> TenantConfig {
        TenantConfig {
            jwt_secret: Some(SECRET.to_string()),
            claim: claim.to_string(),
            strict,
        }
    }

    fn token(claims: Value) -> String {
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap()
    }

    fn request_with_auth(value: &str) -> Request {
        Request::builder()
            .uri("/api/templates/")
            .header("Authorization", value)
            .body(Body::empty())
            .unwrap()
    }

    fn exp() -> i64 {
        chrono::Utc::now().timestamp() + 3600
    }

    #[test]
    fn no_header_yields_anonymous_context() {
        let request = Request::builder()
            .uri("/api/templates/")
            .body(Body::empty())
            .unwrap();
        let ctx = extract_context(&config("org", false), &request).unwrap();
        assert!(ctx.tenant_id.is_none());
        assert!(ctx.require().is_err());
    }

    #[test]
    fn valid_token_resolves_tenant_and_subject() {
        let token = token(serde_json::json!({
            "org": "org_abc", "sub": "user-1", "exp": exp()
        }));
        let request = request_with_auth(&format!("Bearer {}", token));
        let ctx = extract_context(&config("org", true), &request).unwrap();
        assert_eq!(ctx.tenant_id.as_deref(), Some("org_abc"));
        assert_eq!(ctx.subject.as_deref(), Some("user-1"));
        assert_eq!(ctx.require().unwrap(), "org_abc");
    }

    #[test]
    fn org_id_claim_is_accepted_as_fallback() {
        let token = token(serde_json::json!({ "org_id": "org_xyz", "exp": exp() }));
        let request = request_with_auth(&format!("Bearer {}", token));
        let ctx = extract_context(&config("org", false), &request).unwrap();
        assert_eq!(ctx.tenant_id.as_deref(), Some("org_xyz"));
    }

    #[test]
    fn tampered_signature_is_rejected() {
        let token = encode(
            &Header::default(),
            &serde_json::json!({ "org": "org_abc", "exp": exp() }),
            &EncodingKey::from_secret(b"wrong-secret"),
        )
        .unwrap();
        let request = request_with_auth(&format!("Bearer {}", token));
        let result = extract_context(&config("org", true), &request);
        assert!(matches!(result, Err(ApiError::Unauthorized)));
    }

    #[test]
    fn token_without_tenant_claim_resolves_to_none() {
        let token = token(serde_json::json!({ "sub": "user-1", "exp": exp() }));
        let request = request_with_auth(&format!("Bearer {}", token));
        let ctx = extract_context(&config("org", false), &request).unwrap();
        assert!(ctx.tenant_id.is_none());
    }

    #[test]
    fn non_bearer_scheme_is_rejected() {
        let request = request_with_auth("Basic dXNlcjpwYXNz");
        let result = extract_context(&config("org", true), &request);
        assert!(matches!(result, Err(ApiError::Unauthorized)));
    }
}
