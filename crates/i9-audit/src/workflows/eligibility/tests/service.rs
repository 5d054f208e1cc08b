use super::common::*;
use crate::config::AuditConfig;
use crate::error::AuditError;
use crate::workflows::eligibility::domain::{InputError, PageRecord};
use crate::workflows::eligibility::{
    ComplianceStatus, EligibilityAuditor, EligibilityStatus, SelectionTier,
};
use serde_json::json;

#[test]
fn audits_a_classified_catalog() {
    let catalog = catalog(vec![
        section1(1, "01/06/2024", Some("03/15/2025")),
        section2(2, "01/08/2024", (EAD, "A12345678", "03/15/2025")),
        ead_card(3, "A12345678", "03/15/2025"),
    ]);

    let audit = EligibilityAuditor::default().audit_catalog(&catalog);

    assert_eq!(audit.page_count, 3);
    assert_eq!(audit.i9_page_count, 2);
    assert_eq!(audit.tier, Some(SelectionTier::NewHire));
    assert_eq!(
        audit.selected.as_ref().map(|set| set.id.as_str()),
        Some("set_01_06_2024")
    );
    assert_eq!(audit.matches.len(), 1);
    assert!(audit.matches[0].is_matched());
    assert_eq!(audit.compliance.status, ComplianceStatus::Success);
    assert_eq!(audit.rubric.status, EligibilityStatus::CompleteSuccess);
    assert!(audit.review.is_none());
}

#[test]
fn stricter_match_floor_rejects_type_only_candidates() {
    let catalog = catalog(vec![
        section1(1, "01/06/2024", Some("03/15/2025")),
        section2(2, "01/08/2024", (EAD, "A12345678", "03/15/2025")),
        ead_card(3, "B98765432", "12/31/2030"),
    ]);
    let auditor = EligibilityAuditor::new(AuditConfig {
        match_min_confidence: 0.6,
        ..AuditConfig::default()
    });

    let audit = auditor.audit_catalog(&catalog);

    assert_eq!(audit.matches.len(), 1);
    assert!(!audit.matches[0].is_matched());
    assert_eq!(audit.compliance.status, ComplianceStatus::PartialSuccess);
}

#[test]
fn duplicate_pages_stop_the_audit() {
    let records: Vec<PageRecord> = serde_json::from_value(json!([
        { "page_number": 1, "title": "Form I-9 Section 1", "extracted_fields": {} },
        { "page_number": 1, "title": "Form I-9 Section 2", "extracted_fields": {} },
    ]))
    .expect("records decode");

    match EligibilityAuditor::default().audit(&records) {
        Err(AuditError::Input(InputError::DuplicatePageNumber(1))) => {}
        other => panic!("expected duplicate page error, got {other:?}"),
    }
}

#[test]
fn audit_serializes_statuses_in_upper_snake_case() {
    let records: Vec<PageRecord> = serde_json::from_value(json!([
        { "page_number": 1, "page_title": "Passport", "extracted_values": { "passport_number": "P1" } },
    ]))
    .expect("records decode");

    let audit = EligibilityAuditor::default()
        .audit(&records)
        .expect("audit runs");
    let encoded = serde_json::to_value(&audit).expect("audit encodes");

    assert_eq!(encoded["compliance"]["status"], "ERROR");
    assert_eq!(encoded["rubric"]["status"], "NO_I9_FOUND");
    assert_eq!(encoded["selected"], serde_json::Value::Null);
}
