mod helpers;

use helpers::test_db::setup_test_db;
use serde_json::json;
use wa_templates::models::{Template, TemplateCategory, TemplateStatus, TemplateType};

fn make_template(tenant_id: &str, name: &str) -> Template {
    Template::new(
        tenant_id.to_string(),
        name.to_string(),
        TemplateType::Text,
        "en".to_string(),
        TemplateCategory::Marketing,
        Some("Hello".to_string()),
        json!({}),
    )
}

#[tokio::test]
async fn test_create_and_get_template() {
    let db = setup_test_db().await;

    let template = make_template("T1", "promo-1");
    db.create_template(&template).await.unwrap();

    let fetched = db.get_template("T1", &template.id).await.unwrap().unwrap();
    assert_eq!(fetched.id, template.id);
    assert_eq!(fetched.tenant_id, "T1");
    assert_eq!(fetched.name, "promo-1");
    assert_eq!(fetched.status, TemplateStatus::Draft);
    assert_eq!(fetched.template_type, TemplateType::Text);
    assert_eq!(fetched.content.as_deref(), Some("Hello"));
    assert!(fetched.provider_reference.is_none());
}

#[tokio::test]
async fn test_cross_tenant_read_is_invisible() {
    let db = setup_test_db().await;

    let template = make_template("T1", "promo-1");
    db.create_template(&template).await.unwrap();

    // T2 must never see T1's record
    let fetched = db.get_template("T2", &template.id).await.unwrap();
    assert!(fetched.is_none());

    // the unscoped path (webhook/worker) still resolves it
    let fetched = db.get_template_unscoped(&template.id).await.unwrap();
    assert!(fetched.is_some());
}

#[tokio::test]
async fn test_list_templates_scoped_and_filtered() {
    let db = setup_test_db().await;

    for name in ["a", "b", "c"] {
        db.create_template(&make_template("T1", name)).await.unwrap();
    }
    db.create_template(&make_template("T2", "other")).await.unwrap();

    let (templates, total) = db.list_templates("T1", None, 10, 0).await.unwrap();
    assert_eq!(total, 3);
    assert_eq!(templates.len(), 3);
    assert!(templates.iter().all(|t| t.tenant_id == "T1"));

    // status filter
    let first_id = templates[0].id.clone();
    db.update_template_status(
        &first_id,
        &[TemplateStatus::Draft],
        TemplateStatus::Pending,
        Some("PR1"),
        None,
    )
    .await
    .unwrap();

    let (pending, total) = db
        .list_templates("T1", Some(TemplateStatus::Pending), 10, 0)
        .await
        .unwrap();
    assert_eq!(total, 1);
    assert_eq!(pending[0].id, first_id);
}

#[tokio::test]
async fn test_conditional_update_requires_expected_status() {
    let db = setup_test_db().await;

    let template = make_template("T1", "promo-1");
    db.create_template(&template).await.unwrap();

    // precondition not met: record is draft, caller expects pending
    let updated = db
        .update_template_status(
            &template.id,
            &[TemplateStatus::Pending],
            TemplateStatus::Approved,
            None,
            None,
        )
        .await
        .unwrap();
    assert!(!updated);

    let fetched = db.get_template("T1", &template.id).await.unwrap().unwrap();
    assert_eq!(fetched.status, TemplateStatus::Draft);

    // precondition met
    let updated = db
        .update_template_status(
            &template.id,
            &[TemplateStatus::Draft, TemplateStatus::Failed],
            TemplateStatus::Pending,
            Some("PR123"),
            None,
        )
        .await
        .unwrap();
    assert!(updated);

    let fetched = db.get_template("T1", &template.id).await.unwrap().unwrap();
    assert_eq!(fetched.status, TemplateStatus::Pending);
    assert_eq!(fetched.provider_reference.as_deref(), Some("PR123"));
}

#[tokio::test]
async fn test_concurrent_transitions_have_one_winner() {
    let db = setup_test_db().await;

    let template = make_template("T1", "promo-1");
    db.create_template(&template).await.unwrap();

    let expected = [TemplateStatus::Draft, TemplateStatus::Failed];
    let (a, b) = tokio::join!(
        db.update_template_status(
            &template.id,
            &expected,
            TemplateStatus::Pending,
            Some("PR-A"),
            None,
        ),
        db.update_template_status(
            &template.id,
            &expected,
            TemplateStatus::Pending,
            Some("PR-B"),
            None,
        ),
    );

    let a = a.unwrap();
    let b = b.unwrap();
    assert!(a ^ b, "exactly one concurrent transition must win");

    let fetched = db.get_template("T1", &template.id).await.unwrap().unwrap();
    assert_eq!(fetched.status, TemplateStatus::Pending);
    let winner_ref = fetched.provider_reference.unwrap();
    assert!(winner_ref == "PR-A" || winner_ref == "PR-B");
}

#[tokio::test]
async fn test_successful_transition_clears_last_error() {
    let db = setup_test_db().await;

    let template = make_template("T1", "promo-1");
    db.create_template(&template).await.unwrap();

    db.update_template_status(
        &template.id,
        &[TemplateStatus::Draft],
        TemplateStatus::Failed,
        None,
        Some("HTTP 400: bad template"),
    )
    .await
    .unwrap();

    let fetched = db.get_template("T1", &template.id).await.unwrap().unwrap();
    assert_eq!(fetched.status, TemplateStatus::Failed);
    assert_eq!(fetched.last_error.as_deref(), Some("HTTP 400: bad template"));

    // resubmission succeeds; error detail is gone
    db.update_template_status(
        &template.id,
        &[TemplateStatus::Failed],
        TemplateStatus::Pending,
        Some("PR9"),
        None,
    )
    .await
    .unwrap();

    let fetched = db.get_template("T1", &template.id).await.unwrap().unwrap();
    assert_eq!(fetched.status, TemplateStatus::Pending);
    assert!(fetched.last_error.is_none());
}
