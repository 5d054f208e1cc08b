use crate::workflows::eligibility::domain::{FieldMap, Page, PageCatalog, SectionType};
use crate::workflows::eligibility::grouping::SetGrouper;
use crate::workflows::eligibility::selection::{PrioritySelector, SelectionOutcome};
use crate::workflows::eligibility::{SectionAssociator, TransactionSet};

pub(super) fn fields(pairs: &[(&str, &str)]) -> FieldMap {
    pairs
        .iter()
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .collect()
}

pub(super) fn page(number: u32, section: SectionType, title: &str, pairs: &[(&str, &str)]) -> Page {
    Page::new(number, section, title, fields(pairs), 0.9)
}

pub(super) fn catalog(pages: Vec<Page>) -> PageCatalog {
    PageCatalog::from_pages(pages).expect("unique page numbers")
}

/// Employee attestation for an authorized alien.
pub(super) fn section1(number: u32, signed: &str, authorized_until: Option<&str>) -> Page {
    let mut pairs = vec![
        ("employee_first_name", "Maria"),
        ("employee_last_name", "Lopez"),
        ("date_of_birth", "02/14/1990"),
        ("citizenship_status", "alien_authorized_to_work"),
        ("employee_signature_date", signed),
    ];
    if let Some(until) = authorized_until {
        pairs.push(("alien_authorized_to_work_until", until));
    }
    page(number, SectionType::Section1, "Form I-9 Section 1", &pairs)
}

/// Employer review recording one List A document.
pub(super) fn section2(number: u32, signed: &str, document: (&str, &str, &str)) -> Page {
    let (title, number_on_form, expiry) = document;
    page(
        number,
        SectionType::Section2,
        "Form I-9 Section 2",
        &[
            ("employee_first_name", "Maria"),
            ("employee_last_name", "Lopez"),
            ("list_a_document_title", title),
            ("list_a_document_number", number_on_form),
            ("list_a_expiration_date", expiry),
            ("employer_signature_date", signed),
        ],
    )
}

pub(super) fn section3(number: u32, signed: &str, document: (&str, &str, &str)) -> Page {
    let (title, number_on_form, expiry) = document;
    page(
        number,
        SectionType::Section3,
        "Form I-9 Section 3",
        &[
            ("reverification_document_title", title),
            ("reverification_document_number", number_on_form),
            ("reverification_expiration_date", expiry),
            ("reverification_signature_date", signed),
        ],
    )
}

pub(super) fn supplement_b(number: u32, signed: &str, document: (&str, &str, &str)) -> Page {
    let (title, number_on_form, expiry) = document;
    page(
        number,
        SectionType::SupplementB,
        "Form I-9 Supplement B",
        &[
            ("reverification_1_document_title", title),
            ("reverification_1_document_number", number_on_form),
            ("reverification_1_expiration_date", expiry),
            ("employer_signature_date", signed),
        ],
    )
}

pub(super) fn blank_supplement_b(number: u32) -> Page {
    page(
        number,
        SectionType::SupplementB,
        "Form I-9 Supplement B",
        &[
            ("reverification_1_document_title", "N/A"),
            ("employer_signature_date", ""),
            ("reverification_blocks_0_last_name", "null"),
        ],
    )
}

pub(super) fn ead_card(number: u32, card_number: &str, expiry: &str) -> Page {
    page(
        number,
        SectionType::SupportingDoc,
        "Employment Authorization Card",
        &[("card_number", card_number), ("expiration_date", expiry)],
    )
}

pub(super) const EAD: &str = "Employment Authorization Document";

/// Group, associate and select with default settings.
pub(super) fn assemble(catalog: &PageCatalog) -> Vec<TransactionSet> {
    let grouped = SetGrouper::default().group(catalog);
    SectionAssociator::default().associate(catalog, grouped)
}

pub(super) fn select(catalog: &PageCatalog) -> SelectionOutcome {
    PrioritySelector::new()
        .select(catalog, assemble(catalog))
        .expect("a set is selected")
}
