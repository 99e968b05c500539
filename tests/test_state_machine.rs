use wa_templates::models::TemplateStatus;
use wa_templates::services::state_machine::validate_transition;

#[test]
fn test_all_valid_transitions_pass() {
    // Draft -> Pending (submission succeeded)
    assert!(validate_transition(TemplateStatus::Draft, TemplateStatus::Pending).is_ok());

    // Pending -> Approved / Rejected (webhook outcomes)
    assert!(validate_transition(TemplateStatus::Pending, TemplateStatus::Approved).is_ok());
    assert!(validate_transition(TemplateStatus::Pending, TemplateStatus::Rejected).is_ok());

    // Draft / Pending -> Failed (submission failures)
    assert!(validate_transition(TemplateStatus::Draft, TemplateStatus::Failed).is_ok());
    assert!(validate_transition(TemplateStatus::Pending, TemplateStatus::Failed).is_ok());

    // Failed -> Pending (resubmission)
    assert!(validate_transition(TemplateStatus::Failed, TemplateStatus::Pending).is_ok());
}

#[test]
fn test_all_invalid_transitions_fail() {
    // Nothing re-enters Draft
    assert!(validate_transition(TemplateStatus::Pending, TemplateStatus::Draft).is_err());
    assert!(validate_transition(TemplateStatus::Approved, TemplateStatus::Draft).is_err());
    assert!(validate_transition(TemplateStatus::Rejected, TemplateStatus::Draft).is_err());
    assert!(validate_transition(TemplateStatus::Failed, TemplateStatus::Draft).is_err());

    // Draft cannot skip the provider
    assert!(validate_transition(TemplateStatus::Draft, TemplateStatus::Approved).is_err());
    assert!(validate_transition(TemplateStatus::Draft, TemplateStatus::Rejected).is_err());

    // Approved / Rejected are terminal
    assert!(validate_transition(TemplateStatus::Approved, TemplateStatus::Pending).is_err());
    assert!(validate_transition(TemplateStatus::Approved, TemplateStatus::Rejected).is_err());
    assert!(validate_transition(TemplateStatus::Rejected, TemplateStatus::Pending).is_err());
    assert!(validate_transition(TemplateStatus::Rejected, TemplateStatus::Approved).is_err());

    // A failed template cannot jump straight to an outcome
    assert!(validate_transition(TemplateStatus::Failed, TemplateStatus::Approved).is_err());
    assert!(validate_transition(TemplateStatus::Failed, TemplateStatus::Rejected).is_err());
}
