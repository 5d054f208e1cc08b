use crate::workflows::eligibility::classifier::mentions;
use crate::workflows::eligibility::domain::{FieldMap, Page, PageCatalog, PageId, SectionType, TransactionSet};
use crate::workflows::eligibility::fields::{
    first_present, is_placeholder, normalize_identifier, present,
};
use crate::workflows::eligibility::selection::SelectionTier;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identity or work-authorization document kinds recognised from titles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentType {
    Passport,
    PermanentResidentCard,
    I94,
    Ds2019,
    Ead,
    DriversLicense,
    SsnCard,
    BirthCertificate,
    Other(String),
}

impl DocumentType {
    /// Two descriptors agree on type. `Other` never agrees with anything.
    pub fn matches(&self, other: &DocumentType) -> bool {
        !matches!(self, DocumentType::Other(_)) && self == other
    }

    pub fn label(&self) -> &str {
        match self {
            DocumentType::Passport => "passport",
            DocumentType::PermanentResidentCard => "permanent_resident_card",
            DocumentType::I94 => "i94",
            DocumentType::Ds2019 => "ds2019",
            DocumentType::Ead => "ead",
            DocumentType::DriversLicense => "drivers_license",
            DocumentType::SsnCard => "ssn_card",
            DocumentType::BirthCertificate => "birth_certificate",
            DocumentType::Other(_) => "other",
        }
    }
}

impl fmt::Display for DocumentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Map a free-text document title onto a [`DocumentType`].
pub fn normalize_document_type(title: &str) -> DocumentType {
    let lower = title.trim().to_lowercase();
    if lower.contains("passport") {
        DocumentType::Passport
    } else if lower.contains("permanent resident") || lower.contains("green card") || mentions(&lower, "i-551") {
        DocumentType::PermanentResidentCard
    } else if mentions(&lower, "i-94") || mentions(&lower, "i94") {
        DocumentType::I94
    } else if mentions(&lower, "ds-2019") || mentions(&lower, "ds2019") {
        DocumentType::Ds2019
    } else if mentions(&lower, "ead")
        || lower.contains("employment authorization")
        || mentions(&lower, "i-766")
    {
        DocumentType::Ead
    } else if lower.contains("driver") || lower.contains("license") {
        DocumentType::DriversLicense
    } else if lower.contains("social security") || mentions(&lower, "ssn") {
        DocumentType::SsnCard
    } else if lower.contains("birth certificate") {
        DocumentType::BirthCertificate
    } else {
        DocumentType::Other(title.trim().to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ListCategory {
    A,
    B,
    C,
}

impl ListCategory {
    fn prefix(self) -> &'static str {
        match self {
            ListCategory::A => "list_a",
            ListCategory::B => "list_b",
            ListCategory::C => "list_c",
        }
    }
}

/// A document the employer recorded on the form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentReference {
    pub document_type: DocumentType,
    pub title: String,
    pub number: Option<String>,
    pub expiration_date: Option<String>,
    pub issuing_authority: Option<String>,
    pub list_category: ListCategory,
    pub source_section: SectionType,
    pub page: PageId,
}

impl DocumentReference {
    /// Normalized document number, if one was extracted.
    pub fn normalized_number(&self) -> Option<String> {
        self.number
            .as_deref()
            .map(normalize_identifier)
            .filter(|number| !number.is_empty())
    }
}

/// A scanned identity document found elsewhere in the PDF.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SupportingDocument {
    pub page: PageId,
    pub document_type: DocumentType,
    pub number: Option<String>,
    pub expiration_date: Option<String>,
    pub issuing_authority: Option<String>,
    pub confidence: f64,
}

/// Field alternates for one printed document slot of Section 2.
struct ListSlot {
    list: ListCategory,
    title: Vec<String>,
    number: Vec<String>,
    expiry: Vec<String>,
    authority: Vec<String>,
}

impl ListSlot {
    fn new(list: ListCategory, ordinal: usize) -> Self {
        let prefix = list.prefix();
        let names = |attribute: &str| -> Vec<String> {
            let mut names = Vec::new();
            if ordinal == 1 {
                names.push(format!("section_2_{prefix}_{attribute}"));
                names.push(format!("{prefix}_{attribute}"));
            }
            names.push(format!("{prefix}_{attribute}_{ordinal}"));
            names.push(format!("{prefix}_document_{ordinal}_{}", short(attribute)));
            names
        };
        Self {
            list,
            title: names("document_title"),
            number: names("document_number"),
            expiry: {
                let mut expiry = names("expiration_date");
                if ordinal == 1 {
                    expiry.insert(1, format!("{prefix}_document_expiration_date"));
                }
                expiry
            },
            authority: names("issuing_authority"),
        }
    }
}

/// Attribute name used in the `list_x_document_N_<attr>` convention.
fn short(attribute: &str) -> &str {
    attribute.strip_prefix("document_").unwrap_or(attribute)
}

fn first_named<'a>(fields: &'a FieldMap, names: &[String]) -> Option<&'a str> {
    names.iter().find_map(|name| present(fields, name))
}

fn section2_references(page: &Page) -> Vec<DocumentReference> {
    let mut references = Vec::new();
    for list in [ListCategory::A, ListCategory::B, ListCategory::C] {
        for ordinal in 1..=3 {
            let slot = ListSlot::new(list, ordinal);
            let Some(title) = first_named(&page.fields, &slot.title) else {
                continue;
            };
            push_unique(
                &mut references,
                DocumentReference {
                    document_type: normalize_document_type(title),
                    title: title.to_string(),
                    number: first_named(&page.fields, &slot.number).map(str::to_string),
                    expiration_date: first_named(&page.fields, &slot.expiry).map(str::to_string),
                    issuing_authority: first_named(&page.fields, &slot.authority)
                        .map(str::to_string),
                    list_category: slot.list,
                    source_section: SectionType::Section2,
                    page: page.id,
                },
            );
        }
    }
    references
}

/// Reverification blocks are found by their `<prefix>document_title` key,
/// which covers flat, numbered, nested and array-of-block extractions.
fn block_references(page: &Page, source_section: SectionType) -> Vec<DocumentReference> {
    let mut references = Vec::new();
    for (key, title) in &page.fields {
        let Some(prefix) = key.strip_suffix("document_title") else {
            continue;
        };
        if prefix.starts_with("list_") || prefix.starts_with("section_2_") {
            continue;
        }
        if is_placeholder(title) {
            continue;
        }
        let attribute = |names: &[&str]| -> Option<String> {
            let keys: Vec<String> = names.iter().map(|name| format!("{prefix}{name}")).collect();
            first_named(&page.fields, &keys).map(str::to_string)
        };
        push_unique(
            &mut references,
            DocumentReference {
                document_type: normalize_document_type(title),
                title: title.to_string(),
                number: attribute(&["document_number"]),
                expiration_date: attribute(&["expiration_date", "document_expiration_date"]),
                issuing_authority: attribute(&["issuing_authority", "document_issuing_authority"]),
                list_category: ListCategory::A,
                source_section,
                page: page.id,
            },
        );
    }
    references
}

fn push_unique(references: &mut Vec<DocumentReference>, reference: DocumentReference) {
    let duplicate = references.iter().any(|existing| {
        existing.list_category == reference.list_category
            && existing.title.eq_ignore_ascii_case(&reference.title)
            && existing.normalized_number() == reference.normalized_number()
    });
    if !duplicate {
        references.push(reference);
    }
}

/// References recorded on `page` when read as `section`.
///
/// A Section 2 page attached as Section 3 content is read with the
/// reverification scheme.
pub fn references_in(page: &Page, section: SectionType) -> Vec<DocumentReference> {
    match section {
        SectionType::Section2 => section2_references(page),
        SectionType::Section3 | SectionType::SupplementB => block_references(page, section),
        SectionType::Section1 | SectionType::SupportingDoc => Vec::new(),
    }
}

/// References from the section the selection tier makes authoritative.
pub fn references_for_tier(
    catalog: &PageCatalog,
    set: &TransactionSet,
    tier: SelectionTier,
) -> Vec<DocumentReference> {
    match tier {
        SelectionTier::SupplementB => collect(catalog, &set.supplement_b_pages, SectionType::SupplementB),
        SelectionTier::Section3 => collect(catalog, &set.section3_pages, SectionType::Section3),
        SelectionTier::NewHire | SelectionTier::Fallback => {
            collect(catalog, set.section2_page.as_slice(), SectionType::Section2)
        }
    }
}

/// Every reference recorded anywhere in the set.
pub fn all_references(catalog: &PageCatalog, set: &TransactionSet) -> Vec<DocumentReference> {
    let mut references = collect(catalog, set.section2_page.as_slice(), SectionType::Section2);
    references.extend(collect(catalog, &set.section3_pages, SectionType::Section3));
    references.extend(collect(catalog, &set.supplement_b_pages, SectionType::SupplementB));
    references
}

fn collect(catalog: &PageCatalog, ids: &[PageId], section: SectionType) -> Vec<DocumentReference> {
    catalog
        .resolve(ids)
        .flat_map(|page| references_in(page, section))
        .collect()
}

const PASSPORT_NUMBER_FIELDS: &[&str] = &["passport_number", "document_number"];
const I94_NUMBER_FIELDS: &[&str] = &["admission_record_number", "admission_number", "i94_number"];
const DS2019_NUMBER_FIELDS: &[&str] = &["sevis_id", "program_number"];
const GENERIC_NUMBER_FIELDS: &[&str] = &[
    "document_number",
    "card_number",
    "license_number",
    "uscis_number",
    "number",
    "id_number",
];

const PASSPORT_EXPIRY_FIELDS: &[&str] = &["date_of_expiry", "expiration_date"];
const DS2019_EXPIRY_FIELDS: &[&str] = &["form_covers_period_to"];
const GENERIC_EXPIRY_FIELDS: &[&str] =
    &["expiration_date", "card_expires_on", "expires", "valid_until"];

const PASSPORT_AUTHORITY_FIELDS: &[&str] =
    &["issuing_country_code", "issuing_authority", "issuing_country"];
const DS2019_AUTHORITY_FIELDS: &[&str] = &["program_sponsor"];
const GENERIC_AUTHORITY_FIELDS: &[&str] = &["issuing_authority", "issuing_state"];

/// Describe a supporting page. The type comes from the page title, falling
/// back to an extracted `document_type` field.
pub fn supporting_document(page: &Page) -> SupportingDocument {
    let mut document_type = normalize_document_type(&page.title);
    if let DocumentType::Other(_) = document_type {
        if let Some(declared) = page.field(&["document_type", "document_title"]) {
            document_type = normalize_document_type(declared);
        }
    }

    let (numbers, expiries, authorities) = match document_type {
        DocumentType::Passport => (
            PASSPORT_NUMBER_FIELDS,
            PASSPORT_EXPIRY_FIELDS,
            PASSPORT_AUTHORITY_FIELDS,
        ),
        DocumentType::I94 => (I94_NUMBER_FIELDS, GENERIC_EXPIRY_FIELDS, GENERIC_AUTHORITY_FIELDS),
        DocumentType::Ds2019 => (
            DS2019_NUMBER_FIELDS,
            DS2019_EXPIRY_FIELDS,
            DS2019_AUTHORITY_FIELDS,
        ),
        _ => (
            GENERIC_NUMBER_FIELDS,
            GENERIC_EXPIRY_FIELDS,
            GENERIC_AUTHORITY_FIELDS,
        ),
    };

    SupportingDocument {
        page: page.id,
        number: first_present(&page.fields, numbers).map(str::to_string),
        expiration_date: first_present(&page.fields, expiries).map(str::to_string),
        issuing_authority: first_present(&page.fields, authorities).map(str::to_string),
        confidence: page.confidence_score,
        document_type,
    }
}

/// Supporting documents for every supporting page of the catalog.
pub fn supporting_documents(catalog: &PageCatalog) -> Vec<SupportingDocument> {
    catalog.supporting_pages().map(supporting_document).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(number: u32, section: SectionType, title: &str, pairs: &[(&str, &str)]) -> Page {
        let fields = pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        Page::new(number, section, title, fields, 0.9)
    }

    #[test]
    fn titles_map_to_document_types() {
        assert_eq!(normalize_document_type("U.S. Passport"), DocumentType::Passport);
        assert_eq!(
            normalize_document_type("Employment Authorization Document (Form I-766)"),
            DocumentType::Ead
        );
        assert_eq!(normalize_document_type("Form I-94"), DocumentType::I94);
        assert_eq!(normalize_document_type("Driver's License"), DocumentType::DriversLicense);
        assert_eq!(normalize_document_type("Social Security Card"), DocumentType::SsnCard);
        match normalize_document_type("School ID") {
            DocumentType::Other(title) => assert_eq!(title, "School ID"),
            other => panic!("expected other document type, got {other:?}"),
        }
    }

    #[test]
    fn other_documents_never_type_match() {
        let school = DocumentType::Other("School ID".to_string());
        assert!(!school.matches(&school.clone()));
        assert!(DocumentType::Ead.matches(&DocumentType::Ead));
    }

    #[test]
    fn reads_every_section2_slot_convention() {
        let section2 = page(
            2,
            SectionType::Section2,
            "Section 2",
            &[
                ("list_a_document_title", "EAD"),
                ("list_a_document_number", "A-123 456 789"),
                ("list_a_expiration_date", "03/15/2025"),
                ("list_b_document_1_title", "Driver's License"),
                ("list_b_document_1_number", "D1234567"),
                ("list_c_document_title_1", "Social Security Card"),
                ("list_c_document_number_1", "N/A"),
            ],
        );

        let references = references_in(&section2, SectionType::Section2);
        assert_eq!(references.len(), 3);
        assert_eq!(references[0].document_type, DocumentType::Ead);
        assert_eq!(references[0].normalized_number().as_deref(), Some("A123456789"));
        assert_eq!(references[0].expiration_date.as_deref(), Some("03/15/2025"));
        assert_eq!(references[1].list_category, ListCategory::B);
        assert_eq!(references[1].number.as_deref(), Some("D1234567"));
        assert_eq!(references[2].list_category, ListCategory::C);
        assert_eq!(references[2].number, None);
    }

    #[test]
    fn reads_reverification_blocks_by_prefix() {
        let supplement = page(
            5,
            SectionType::SupplementB,
            "Supplement B",
            &[
                ("reverification_1_document_title", "EAD"),
                ("reverification_1_document_number", "B7654321"),
                ("reverification_1_expiration_date", "01/01/2027"),
                ("reverification_blocks_0_document_title", "N/A"),
            ],
        );

        let references = references_in(&supplement, SectionType::SupplementB);
        assert_eq!(references.len(), 1);
        assert_eq!(references[0].source_section, SectionType::SupplementB);
        assert_eq!(references[0].number.as_deref(), Some("B7654321"));
        assert_eq!(references[0].expiration_date.as_deref(), Some("01/01/2027"));
    }

    #[test]
    fn supporting_pages_use_type_specific_fields() {
        let passport = page(
            7,
            SectionType::SupportingDoc,
            "Passport",
            &[("passport_number", "X1"), ("date_of_expiry", "2030-01-01")],
        );
        let document = supporting_document(&passport);
        assert_eq!(document.document_type, DocumentType::Passport);
        assert_eq!(document.number.as_deref(), Some("X1"));
        assert_eq!(document.expiration_date.as_deref(), Some("2030-01-01"));

        let card = page(
            8,
            SectionType::SupportingDoc,
            "Scan",
            &[("document_type", "Employment Authorization Card"), ("card_number", "A1")],
        );
        let document = supporting_document(&card);
        assert_eq!(document.document_type, DocumentType::Ead);
        assert_eq!(document.number.as_deref(), Some("A1"));
    }
}
