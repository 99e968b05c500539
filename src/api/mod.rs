pub mod middleware;
pub mod router;
pub mod templates;
pub mod webhooks;

pub use middleware::*;
pub use router::build_router;
