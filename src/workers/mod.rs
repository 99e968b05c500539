pub mod job_queue;
pub mod job_worker;

pub use job_queue::{SqlTaskQueue, TaskQueue};
pub use job_worker::JobProcessor;

/// Job type for provider submission tasks
pub const JOB_SUBMIT_TEMPLATE: &str = "submit_template";
