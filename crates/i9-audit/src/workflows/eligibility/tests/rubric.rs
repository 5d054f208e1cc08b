use super::common::*;
use crate::workflows::eligibility::domain::{Page, PageCatalog, SectionType};
use crate::workflows::eligibility::matching::DocumentMatcher;
use crate::workflows::eligibility::rubric::{
    EligibilityStatus, RubricBucket, RubricResult, RubricScorer,
};

fn score(catalog: &PageCatalog) -> RubricResult {
    let outcome = select(catalog);
    let matches = DocumentMatcher::default().match_set(catalog, &outcome.selected, outcome.tier);
    RubricScorer::new().score(catalog, Some(&outcome), &matches)
}

fn citizen_packet(include_birth_date: bool) -> Vec<Page> {
    let mut attestation = vec![
        ("employee_first_name", "Sam"),
        ("employee_last_name", "Carter"),
        ("citizenship_status", "US Citizen"),
        ("employee_signature_date", "02/03/2023"),
    ];
    if include_birth_date {
        attestation.push(("date_of_birth", "07/04/1985"));
    }
    vec![
        page(1, SectionType::Section1, "Form I-9 Section 1", &attestation),
        section2(2, "02/05/2023", ("U.S. Passport", "P1234567", "N/A")),
        page(3, SectionType::SupportingDoc, "Passport", &[("passport_number", "P1234567")]),
    ]
}

#[test]
fn complete_new_hire_scores_every_bucket() {
    let catalog = catalog(vec![
        section1(1, "01/06/2024", Some("03/15/2025")),
        section2(2, "01/08/2024", (EAD, "A12345678", "03/15/2025")),
        ead_card(3, "A12345678", "03/15/2025"),
    ]);

    let result = score(&catalog);

    assert_eq!(result.score_of(RubricBucket::PersonalData), 20);
    assert_eq!(result.score_of(RubricBucket::Detection), 17);
    assert_eq!(result.score_of(RubricBucket::BusinessRules), 25);
    assert_eq!(result.score_of(RubricBucket::WorkAuthorization), 15);
    assert_eq!(result.score_of(RubricBucket::DocumentTracking), 15);
    assert_eq!(result.total_score, 92);
    match result.status {
        EligibilityStatus::CompleteSuccess => {}
        other => panic!("expected complete success, got {other:?}"),
    }
    assert!(result.criteria.iter().any(|criterion| criterion.name == "expiry_match"));
}

fn skipped_forms(result: &RubricResult) -> Vec<String> {
    result
        .bucket(RubricBucket::BusinessRules)
        .expect("business rules bucket")
        .reasons
        .iter()
        .filter(|reason| reason.starts_with("skipped"))
        .cloned()
        .collect()
}

#[test]
fn invalid_higher_tier_forms_are_credited_as_skipped() {
    let catalog = catalog(vec![
        section1(1, "01/06/2024", Some("03/15/2025")),
        section2(2, "01/08/2024", (EAD, "A12345678", "03/15/2025")),
        ead_card(3, "A12345678", "03/15/2025"),
        page(
            10,
            SectionType::Section3,
            "Form I-9 Section 3",
            &[("reverification_document_title", EAD)],
        ),
        blank_supplement_b(14),
    ]);

    let result = score(&catalog);

    assert_eq!(
        skipped_forms(&result),
        vec![
            "skipped invalid Supplement B form".to_string(),
            "skipped invalid Section 3 form".to_string(),
        ]
    );
    assert_eq!(result.score_of(RubricBucket::BusinessRules), 25);
}

#[test]
fn no_skip_credit_without_higher_tier_pages() {
    let catalog = catalog(vec![
        section1(1, "01/06/2024", Some("03/15/2025")),
        section2(2, "01/08/2024", (EAD, "A12345678", "03/15/2025")),
        ead_card(3, "A12345678", "03/15/2025"),
    ]);

    let result = score(&catalog);

    assert!(skipped_forms(&result).is_empty());
}

#[test]
fn supplement_b_selection_earns_the_detection_bonus() {
    let catalog = catalog(vec![
        section1(1, "01/06/2022", Some("06/30/2024")),
        section2(2, "01/07/2022", (EAD, "A11111111", "06/30/2024")),
        section3(3, "06/15/2024", (EAD, "A12345678", "06/30/2026")),
        supplement_b(9, "02/01/2024", (EAD, "A22222222", "05/01/2027")),
    ]);

    let result = score(&catalog);

    let detection = result
        .bucket(RubricBucket::Detection)
        .expect("detection bucket");
    assert_eq!(detection.score, 25);
    assert_eq!(detection.max, 25);
    assert!(detection
        .reasons
        .iter()
        .any(|reason| reason == "bonus: Supplement B form identified"));
}

#[test]
fn citizens_skip_the_expiry_criterion() {
    let catalog = catalog(citizen_packet(true));

    let result = score(&catalog);

    assert!(result.criteria.iter().all(|criterion| criterion.name != "expiry_match"));
    match result.status {
        EligibilityStatus::CompleteSuccess => {}
        other => panic!("expected complete success, got {other:?}"),
    }
}

#[test]
fn missing_birth_date_is_partial() {
    let catalog = catalog(citizen_packet(false));

    let result = score(&catalog);

    let birth_date = result
        .criteria
        .iter()
        .find(|criterion| criterion.name == "date_of_birth")
        .expect("date of birth criterion");
    assert!(!birth_date.met);
    match result.status {
        EligibilityStatus::PartialSuccess => {}
        other => panic!("expected partial success, got {other:?}"),
    }
}

#[test]
fn ssn_scores_full_or_partial() {
    let with_ssn = |ssn: &str| {
        catalog(vec![
            page(
                1,
                SectionType::Section1,
                "Form I-9 Section 1",
                &[
                    ("employee_first_name", "Maria"),
                    ("employee_signature_date", "01/06/2024"),
                    ("us_social_security_number", ssn),
                ],
            ),
            section2(2, "01/08/2024", (EAD, "A12345678", "N/A")),
        ])
    };

    assert_eq!(score(&with_ssn("123-45-6789")).score_of(RubricBucket::PersonalData), 10);
    assert_eq!(score(&with_ssn("[PII_REDACTED]")).score_of(RubricBucket::PersonalData), 8);
    assert_eq!(score(&with_ssn("N/A")).score_of(RubricBucket::PersonalData), 5);
}

#[test]
fn documents_without_i9_pages_are_not_found() {
    let catalog = catalog(vec![ead_card(1, "A12345678", "03/15/2025")]);

    let result = RubricScorer::new().score(&catalog, None, &[]);

    match result.status {
        EligibilityStatus::NoI9Found => {}
        other => panic!("expected no I-9 found, got {other:?}"),
    }
    assert_eq!(result.score_of(RubricBucket::Detection), 0);
    assert_eq!(result.total_score, 3);
}
