pub mod job;
pub mod template;

pub use job::*;
pub use template::*;

use serde::Serialize;

/// Pagination envelope shared by list responses
#[derive(Debug, Serialize)]
pub struct PaginationMetadata {
    pub page: i64,
    pub per_page: i64,
    pub total_count: i64,
    pub total_pages: i64,
}
