use crate::api;
use crate::api::middleware::{resolve_tenant, AppState};
use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

pub fn build_router(state: AppState) -> Router {
    // Tenant-scoped template routes
    let templates = Router::new()
        .route(
            "/api/templates/",
            post(api::templates::create_template).get(api::templates::list_templates),
        )
        .route("/api/templates/types/", get(api::templates::template_types))
        .route("/api/templates/:id", get(api::templates::get_template))
        .route(
            "/api/templates/:id/resubmit/",
            post(api::templates::resubmit_template),
        )
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            resolve_tenant,
        ));

    // Provider callbacks carry no tenant credential; the stored row's
    // tenant_id is authoritative.
    let webhooks = Router::new().route(
        "/api/webhooks/:provider/",
        post(api::webhooks::provider_webhook),
    );

    Router::new()
        .merge(templates)
        .merge(webhooks)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
