use crate::models::TemplateStatus;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TransitionError {
    #[error("Invalid transition from {from:?} to {to:?}")]
    InvalidTransition {
        from: TemplateStatus,
        to: TemplateStatus,
    },
}

/// Validates if a template status transition is allowed.
///
/// The lifecycle only moves forward: DRAFT -> PENDING -> APPROVED or
/// REJECTED, with FAILED reachable from DRAFT and PENDING. FAILED ->
/// PENDING is the resubmission path. Nothing ever re-enters DRAFT and
/// APPROVED/REJECTED are terminal.
pub fn validate_transition(
    from: TemplateStatus,
    to: TemplateStatus,
) -> Result<(), TransitionError> {
    use TemplateStatus::*;

    match (from, to) {
        (Draft, Pending) => Ok(()),
        (Pending, Approved) => Ok(()),
        (Pending, Rejected) => Ok(()),
        (Draft, Failed) => Ok(()),
        (Pending, Failed) => Ok(()),
        // Resubmission after a terminal submission failure
        (Failed, Pending) => Ok(()),
        (Failed, Failed) => Ok(()),

        _ => Err(TransitionError::InvalidTransition { from, to }),
    }
}
