use super::common::*;
use crate::workflows::eligibility::compliance::ComplianceValidator;
use crate::workflows::eligibility::domain::{Page, PageCatalog};
use crate::workflows::eligibility::matching::DocumentMatcher;
use crate::workflows::eligibility::review::{ReviewItem, ReviewPolicy, ReviewPriority};
use crate::workflows::eligibility::rubric::RubricScorer;
use crate::workflows::eligibility::selection::PrioritySelector;

fn review(catalog: &PageCatalog) -> Option<ReviewItem> {
    let outcome = PrioritySelector::new().select(catalog, assemble(catalog));
    let matches = match &outcome {
        Some(outcome) => {
            DocumentMatcher::default().match_set(catalog, &outcome.selected, outcome.tier)
        }
        None => Vec::new(),
    };
    let selected = outcome.as_ref().map(|outcome| &outcome.selected);
    let compliance = ComplianceValidator::default().validate(catalog, selected, &matches);
    let rubric = RubricScorer::new().score(catalog, outcome.as_ref(), &matches);
    ReviewPolicy::default().evaluate(outcome.as_ref(), &compliance, &rubric)
}

fn new_hire(confidence: f64) -> Vec<Page> {
    vec![
        section1(1, "01/06/2024", Some("03/15/2025")),
        section2(2, "01/08/2024", (EAD, "A12345678", "03/15/2025")),
        ead_card(3, "A12345678", "03/15/2025"),
    ]
    .into_iter()
    .map(|page| Page {
        confidence_score: confidence,
        ..page
    })
    .collect()
}

#[test]
fn clean_packets_skip_review() {
    let catalog = catalog(new_hire(0.9));

    assert!(review(&catalog).is_none());
}

#[test]
fn low_extraction_confidence_needs_medium_review() {
    let catalog = catalog(new_hire(0.5));

    let item = review(&catalog).expect("review item");

    assert_eq!(item.priority, ReviewPriority::Medium);
    assert_eq!(item.reasons, vec!["Low confidence score: 50.0%".to_string()]);
    assert_eq!(item.set_id.as_deref(), Some("set_01_06_2024"));
    assert_eq!(item.rubric_score, 92);
}

#[test]
fn missing_documents_are_reviewed_at_low_priority() {
    let catalog = catalog(vec![
        section1(1, "01/06/2022", Some("06/30/2024")),
        section2(2, "01/07/2022", (EAD, "A11111111", "06/30/2024")),
        section3(3, "06/15/2024", (EAD, "A12345678", "06/30/2026")),
    ]);

    let item = review(&catalog).expect("review item");

    assert_eq!(item.priority, ReviewPriority::Low);
    assert_eq!(
        item.summary(),
        "Validation status: PARTIAL_SUCCESS | Poor document matching: 0.0"
    );
}

#[test]
fn packets_without_i9_pages_need_high_review() {
    let catalog = catalog(vec![ead_card(1, "A12345678", "03/15/2025")]);

    let item = review(&catalog).expect("review item");

    assert_eq!(item.priority, ReviewPriority::High);
    assert_eq!(item.set_id, None);
    assert!(item.reasons.iter().any(|reason| reason == "No I-9 set assembled"));
    assert!(item.reasons.iter().any(|reason| reason == "2 critical issue(s)"));
}
