use super::domain::{FieldMap, InputError, Page, PageCatalog, PageKind, PageRecord, SectionType};
use super::fields::{first_present, present};
use tracing::debug;

const SUPPLEMENT_B_TITLES: &[&str] = &[
    "supplement b",
    "supplementb",
    "supplement-b",
    "i-9 supplement b",
    "form i-9 supplement b",
    "reverification and rehire",
];

const SECTION3_KEYWORDS: &[&str] = &["reverification", "rehire", "rehires"];

const SECTION3_TITLES: &[&str] = &[
    "section 3",
    "employment authorization expiration",
    "new employment authorization document",
    "updated information",
    "section iii",
    "part 3",
];

const SECTION1_TITLES: &[&str] = &[
    "section 1",
    "employee information",
    "employee attestation",
    "section i",
    "part 1",
    "employee data",
];

const SECTION2_TITLES: &[&str] = &[
    "section 2",
    "employer",
    "employer review",
    "document verification",
    "section ii",
    "part 2",
    "employer verification",
];

const I9_TITLES: &[&str] = &[
    "form i-9",
    "i-9",
    "i9",
    "form i9",
    "employment eligibility",
    "supplement b",
    "reverification",
];

const SECTION3_FIELDS: &[&str] = &[
    "new_name",
    "rehire_date",
    "new_employment_authorization_document",
    "document_title_list_a_or_list_c",
    "document_number_list_a_or_c",
    "expiration_date_if_any_list_a_or_c",
    "section_3_employee_signature_date",
    "reverification_date",
    "new_i94_number",
    "reverification_document_title",
    "reverification_document_number",
    "reverification_expiration_date",
    "rehire_last_name",
    "rehire_first_name",
    "rehire_middle_initial",
    "section_3_date_of_rehire",
    "section_3_document_title",
    "section_3_document_number",
    "section_3_expiration_date",
    "section_3_new_first_name",
    "section_3_new_middle_initial",
    "section_3_employer_name",
    "section_3_date_signed",
];

const SECTION1_FIELDS: &[&str] = &[
    "employee_last_name",
    "employee_first_name",
    "employee_middle_initial",
    "other_last_names_used",
    "employee_address",
    "date_of_birth",
    "us_social_security_number",
    "employee_email_address",
    "employee_telephone_number",
    "citizenship_status",
];

const SECTION2_FIELDS: &[&str] = &[
    "list_a_document_title",
    "list_b_document_title",
    "list_c_document_title",
    "list_a_document_title_1",
    "list_b_document_title_1",
    "list_c_document_title_1",
    "employer_signature_date",
    "employee_first_day_of_employment",
    "employer_name",
    "employer_address",
];

/// Document title or number fields; a Section 2 tag needs one of these filled.
const SECTION2_CRITICAL_FIELDS: &[&str] = &[
    "list_a_document_title",
    "list_a_document_number",
    "list_a_document_title_1",
    "list_a_document_number_1",
    "list_b_document_title",
    "list_b_document_number",
    "list_c_document_title",
    "list_c_document_number",
];

/// Fields only an I-9 page carries. Identity documents share names and birth dates.
const I9_MARKER_FIELDS: &[&str] = &[
    "citizenship_status",
    "employee_first_name",
    "employee_last_name",
    "employee_signature_date",
    "employer_signature_date",
    "employee_first_day_of_employment",
    "list_a_document_title",
    "list_b_document_title",
    "list_c_document_title",
    "alien_authorized_to_work_until",
    "us_social_security_number",
    "reverification_signature_date",
    "reverification_document_title",
    "rehire_date",
];

const FORM_VERSION_FIELDS: &[&str] = &["form_version", "form_type", "form_name"];

/// Section tag plus the rule that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification {
    pub section_type: SectionType,
    pub reason: &'static str,
}

impl Classification {
    fn new(section_type: SectionType, reason: &'static str) -> Self {
        Self {
            section_type,
            reason,
        }
    }
}

/// Assigns section tags from page titles and extracted field names.
#[derive(Debug, Clone, Default)]
pub struct PageClassifier;

impl PageClassifier {
    pub fn new() -> Self {
        Self
    }

    /// Validate, flatten and tag every record of one document.
    pub fn classify_records(&self, records: &[PageRecord]) -> Result<PageCatalog, InputError> {
        let mut pages = Vec::with_capacity(records.len());
        for (index, record) in records.iter().enumerate() {
            let staged = Page::from_record(index, record, SectionType::SupportingDoc)?;
            let classification = self.classify(&staged.title, &staged.fields, record.page_kind);
            debug!(
                page = staged.number(),
                section = classification.section_type.label(),
                reason = classification.reason,
                "classified page"
            );
            pages.push(Page {
                section_type: classification.section_type,
                ..staged
            });
        }
        PageCatalog::from_pages(pages)
    }

    pub fn classify(
        &self,
        title: &str,
        fields: &FieldMap,
        kind: Option<PageKind>,
    ) -> Classification {
        let is_i9 = match kind {
            Some(PageKind::I9Form) => true,
            Some(PageKind::SupportingDocument) => false,
            None => self.is_i9_page(title, fields),
        };

        if is_i9 {
            self.section_for(title, fields)
        } else {
            Classification::new(SectionType::SupportingDoc, "not an I-9 page")
        }
    }

    pub fn is_i9_page(&self, title: &str, fields: &FieldMap) -> bool {
        let title = title.to_lowercase();
        if mentions_any(&title, I9_TITLES)
            || mentions_any(&title, SUPPLEMENT_B_TITLES)
            || mentions_any(&title, &["section 1", "section 2", "section 3"])
        {
            return true;
        }

        if I9_MARKER_FIELDS
            .iter()
            .any(|name| present(fields, name).is_some())
        {
            return true;
        }

        first_present(fields, FORM_VERSION_FIELDS)
            .map(|version| mentions(&version.to_lowercase(), "i-9"))
            .unwrap_or(false)
    }

    /// Section tag for a page already known to be part of an I-9.
    pub fn section_for(&self, title: &str, fields: &FieldMap) -> Classification {
        let title = title.to_lowercase();

        if mentions_any(&title, SUPPLEMENT_B_TITLES) {
            return Classification::new(SectionType::SupplementB, "supplement b title");
        }

        let mentions_supplement = title.contains("supplement");
        if mentions_any(&title, SECTION3_KEYWORDS) && !mentions_supplement {
            return Classification::new(SectionType::Section3, "reverification title");
        }
        if mentions_any(&title, SECTION3_TITLES) && !mentions_supplement {
            return Classification::new(SectionType::Section3, "section 3 title");
        }
        if mentions_any(&title, SECTION1_TITLES) {
            return Classification::new(SectionType::Section1, "section 1 title");
        }
        if mentions_any(&title, SECTION2_TITLES) {
            return Classification::new(SectionType::Section2, "section 2 title");
        }

        let section3_hits = count_keys(fields, SECTION3_FIELDS);
        let section1_hits = count_keys(fields, SECTION1_FIELDS);
        let section2_hits = count_keys(fields, SECTION2_FIELDS);
        let has_employee_name = present(fields, "employee_first_name").is_some()
            || present(fields, "employee_last_name").is_some();

        if section3_hits > 0 {
            return Classification::new(SectionType::Section3, "section 3 fields");
        }
        if has_employee_name && section1_hits > 0 {
            return Classification::new(SectionType::Section1, "employee name fields");
        }
        if section2_hits > 0
            && SECTION2_CRITICAL_FIELDS
                .iter()
                .any(|name| present(fields, name).is_some())
        {
            return Classification::new(SectionType::Section2, "section 2 document fields");
        }
        if section1_hits > 0 {
            return Classification::new(SectionType::Section1, "section 1 fields");
        }

        Classification::new(SectionType::Section1, "default")
    }
}

fn count_keys(fields: &FieldMap, names: &[&str]) -> usize {
    names.iter().filter(|name| fields.contains_key(**name)).count()
}

fn mentions_any(haystack: &str, needles: &[&str]) -> bool {
    needles.iter().any(|needle| mentions(haystack, needle))
}

/// Substring match that refuses to split a word: "section i" does not match
/// "section ii" and "i-9" does not match "i-94".
pub(crate) fn mentions(haystack: &str, needle: &str) -> bool {
    haystack.match_indices(needle).any(|(start, matched)| {
        let before = haystack[..start].chars().next_back();
        let after = haystack[start + matched.len()..].chars().next();
        !before.is_some_and(char::is_alphanumeric) && !after.is_some_and(char::is_alphanumeric)
    })
}
