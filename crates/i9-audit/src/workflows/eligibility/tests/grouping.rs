use super::common::*;
use crate::workflows::eligibility::domain::{PageId, SectionType, SetType};
use crate::workflows::eligibility::grouping::{PageClaims, SetGrouper, SetIds};

#[test]
fn standard_tiers_run_in_order() {
    assert_eq!(
        SetGrouper::default().strategy_names(),
        vec![
            "expiry_match",
            "signature_date",
            "proximity",
            "section1_section3_proximity",
            "signature_cluster",
        ]
    );
}

#[test]
fn matching_expiry_dates_pair_sections() {
    let catalog = catalog(vec![
        section1(1, "01/06/2024", Some("03/15/2025")),
        section2(2, "01/08/2024", (EAD, "A12345678", "03/15/2025")),
    ]);

    let outcome = SetGrouper::default().group(&catalog);

    assert_eq!(outcome.sets.len(), 1);
    let set = &outcome.sets[0];
    assert_eq!(set.id, "set_01_06_2024");
    assert_eq!(set.origin, "expiry_match");
    assert_eq!(set.set_type, SetType::NewHire);
    assert_eq!(set.section1_page, Some(PageId(1)));
    assert_eq!(set.section2_page, Some(PageId(2)));
    assert_eq!(set.anchor_signature_date.as_deref(), Some("01/06/2024"));
}

#[test]
fn nearby_signatures_pair_sections_without_expiry() {
    let catalog = catalog(vec![
        section1(1, "02/03/2023", None),
        section2(2, "02/05/2023", ("U.S. Passport", "P1234567", "N/A")),
    ]);

    let outcome = SetGrouper::default().group(&catalog);

    assert_eq!(outcome.sets.len(), 1);
    assert_eq!(outcome.sets[0].origin, "signature_date");
    assert_eq!(outcome.sets[0].set_type, SetType::NewHire);
}

#[test]
fn one_section2_page_per_set() {
    let catalog = catalog(vec![
        section1(1, "01/01/2024", None),
        section2(2, "01/02/2024", (EAD, "A11111111", "N/A")),
        section2(3, "01/03/2024", (EAD, "A22222222", "N/A")),
    ]);

    let outcome = SetGrouper::default().group(&catalog);

    assert_eq!(outcome.sets.len(), 2);
    let paired = &outcome.sets[0];
    assert_eq!(paired.section2_page, Some(PageId(2)));

    let leftover = &outcome.sets[1];
    assert_eq!(leftover.origin, "signature_cluster");
    assert_eq!(leftover.section1_page, None);
    assert_eq!(leftover.section2_page, Some(PageId(3)));
    assert_eq!(leftover.set_type, SetType::Incomplete);
    assert_eq!(leftover.id, "set_01_03_2024");
}

#[test]
fn undated_adjacent_sections_group_by_proximity() {
    let catalog = catalog(vec![
        page(
            1,
            SectionType::Section1,
            "Form I-9 Section 1",
            &[("employee_first_name", "Maria"), ("employee_last_name", "Lopez")],
        ),
        page(
            2,
            SectionType::Section2,
            "Form I-9 Section 2",
            &[("list_a_document_title", EAD)],
        ),
    ]);

    let outcome = SetGrouper::default().group(&catalog);

    assert_eq!(outcome.sets.len(), 1);
    assert_eq!(outcome.sets[0].origin, "proximity");
    assert_eq!(outcome.sets[0].id, "set_pages_1-2");
}

#[test]
fn section1_pairs_with_nearby_section3_on_expiry() {
    let catalog = catalog(vec![
        section1(1, "N/A", Some("06/30/2026")),
        section3(2, "06/15/2024", (EAD, "A12345678", "07/02/2026")),
    ]);

    let outcome = SetGrouper::default().group(&catalog);

    assert_eq!(outcome.sets.len(), 1);
    let set = &outcome.sets[0];
    assert_eq!(set.origin, "section1_section3_proximity");
    assert_eq!(set.section3_pages, vec![PageId(2)]);
    assert_eq!(set.set_type, SetType::Reverification);
}

#[test]
fn adjacent_section3_pairs_without_expiry_dates() {
    let adjacent = catalog(vec![
        section1(1, "N/A", None),
        section3(2, "06/15/2024", (EAD, "A12345678", "N/A")),
    ]);

    let outcome = SetGrouper::default().group(&adjacent);

    assert_eq!(outcome.sets.len(), 1);
    assert_eq!(outcome.sets[0].origin, "section1_section3_proximity");
    assert_eq!(outcome.sets[0].section3_pages, vec![PageId(2)]);

    let apart = catalog(vec![
        section1(1, "N/A", None),
        section3(3, "06/15/2024", (EAD, "A12345678", "N/A")),
    ]);

    let outcome = SetGrouper::default().group(&apart);

    assert!(outcome
        .sets
        .iter()
        .all(|set| set.origin != "section1_section3_proximity"));
}

#[test]
fn claimed_pages_are_never_reused() {
    let catalog = catalog(vec![
        section1(1, "01/01/2024", None),
        section2(2, "01/02/2024", (EAD, "A11111111", "N/A")),
        section2(3, "01/03/2024", (EAD, "A22222222", "N/A")),
    ]);
    let mut claims = PageClaims::default();

    let first = claims
        .take(&catalog, vec![PageId(1), PageId(2)], 2)
        .expect("first group is admitted");
    assert_eq!(first.pages, vec![PageId(1), PageId(2)]);

    assert!(claims.take(&catalog, vec![PageId(1), PageId(3)], 2).is_none());
    assert!(!claims.is_claimed(PageId(3)));
    assert_eq!(claims.len(), 2);
}

#[test]
fn repeated_set_ids_are_suffixed() {
    let mut ids = SetIds::default();

    assert_eq!(ids.issue("set_01_06_2024".to_string()), "set_01_06_2024");
    assert_eq!(ids.issue("set_01_06_2024".to_string()), "set_01_06_2024_2");
    assert_eq!(ids.issue("set_02_01_2024".to_string()), "set_02_01_2024");
}

#[test]
fn section1_with_furthest_expiry_anchors_the_set() {
    let unsigned_section1 = |number: u32, until: &str| {
        page(
            number,
            SectionType::Section1,
            "Form I-9 Section 1",
            &[("employee_last_name", "Lopez"), ("alien_authorized_to_work_until", until)],
        )
    };
    let catalog = catalog(vec![
        unsigned_section1(1, "03/15/2025"),
        unsigned_section1(2, "03/15/2027"),
        page(
            3,
            SectionType::Section2,
            "Form I-9 Section 2",
            &[("list_a_document_title", EAD)],
        ),
    ]);

    let outcome = SetGrouper::default().group(&catalog);

    assert_eq!(outcome.sets.len(), 1);
    let set = &outcome.sets[0];
    assert_eq!(set.origin, "proximity");
    assert_eq!(set.section1_page, Some(PageId(2)));
    assert_eq!(set.section1_candidates, vec![PageId(1)]);
    assert!(outcome.claims.is_claimed(PageId(3)));
}
