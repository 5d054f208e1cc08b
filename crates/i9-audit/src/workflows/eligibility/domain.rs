use super::dates::parse_optional;
use super::fields::{
    all_present, first_present, flatten_fields, present_where, EMPLOYEE_SIGNATURE_FIELDS,
    EMPLOYER_SIGNATURE_FIELDS, FIRST_NAME_FIELDS, LAST_NAME_FIELDS,
    REVERIFICATION_SIGNATURE_FIELDS, SECTION1_EXPIRY_FIELDS,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// Flattened extractor output keyed by path-joined field names.
pub type FieldMap = BTreeMap<String, String>;

/// Stable identifier for a page: its physical page number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PageId(pub u32);

impl PageId {
    pub fn number(self) -> u32 {
        self.0
    }

    pub fn distance(self, other: PageId) -> u32 {
        self.0.abs_diff(other.0)
    }
}

impl fmt::Display for PageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum SectionType {
    Section1,
    Section2,
    Section3,
    SupplementB,
    SupportingDoc,
}

impl SectionType {
    pub fn is_i9(self) -> bool {
        !matches!(self, SectionType::SupportingDoc)
    }

    pub fn label(self) -> &'static str {
        match self {
            SectionType::Section1 => "Section 1",
            SectionType::Section2 => "Section 2",
            SectionType::Section3 => "Section 3",
            SectionType::SupplementB => "Supplement B",
            SectionType::SupportingDoc => "supporting document",
        }
    }
}

/// Upstream hint about what a page is, when the catalog already knows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PageKind {
    I9Form,
    SupportingDocument,
}

/// Page as delivered by the extraction service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageRecord {
    #[serde(default)]
    pub page_number: Option<u32>,
    #[serde(default, alias = "page_title")]
    pub title: String,
    #[serde(default, alias = "extracted_values")]
    pub extracted_fields: Value,
    #[serde(default)]
    pub confidence_score: f64,
    #[serde(default)]
    pub page_kind: Option<PageKind>,
}

/// Structural violations that stop processing of a document.
#[derive(Debug, thiserror::Error)]
pub enum InputError {
    #[error("page record at position {index} has no page_number")]
    MissingPageNumber { index: usize },
    #[error("page number {0} appears more than once")]
    DuplicatePageNumber(u32),
}

/// Classified, read-only page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page {
    pub id: PageId,
    pub section_type: SectionType,
    pub title: String,
    pub fields: FieldMap,
    pub confidence_score: f64,
}

impl Page {
    pub fn new(
        page_number: u32,
        section_type: SectionType,
        title: impl Into<String>,
        fields: FieldMap,
        confidence_score: f64,
    ) -> Self {
        Self {
            id: PageId(page_number),
            section_type,
            title: title.into(),
            fields,
            confidence_score: sanitize_confidence(confidence_score),
        }
    }

    pub(crate) fn from_record(
        index: usize,
        record: &PageRecord,
        section_type: SectionType,
    ) -> Result<Self, InputError> {
        let page_number = record
            .page_number
            .ok_or(InputError::MissingPageNumber { index })?;
        Ok(Self::new(
            page_number,
            section_type,
            record.title.clone(),
            flatten_fields(&record.extracted_fields),
            record.confidence_score,
        ))
    }

    pub fn number(&self) -> u32 {
        self.id.number()
    }

    pub fn field(&self, names: &[&str]) -> Option<&str> {
        first_present(&self.fields, names)
    }

    pub fn employee_signature_date(&self) -> Option<&str> {
        self.field(EMPLOYEE_SIGNATURE_FIELDS)
    }

    pub fn employer_signature_date(&self) -> Option<&str> {
        self.field(EMPLOYER_SIGNATURE_FIELDS)
    }

    /// Employer-side signature dates in the naming scheme of the page's section.
    pub fn section_signature_dates(&self) -> Vec<&str> {
        match self.section_type {
            SectionType::Section3 => all_present(&self.fields, REVERIFICATION_SIGNATURE_FIELDS),
            SectionType::SupplementB => present_where(&self.fields, |key| {
                key.contains("employer") && key.contains("signature_date")
            }),
            _ => all_present(&self.fields, EMPLOYER_SIGNATURE_FIELDS),
        }
    }

    pub fn section_signature_date(&self) -> Option<&str> {
        self.section_signature_dates().into_iter().next()
    }

    pub(crate) fn latest_section_signature(&self) -> Option<NaiveDate> {
        self.section_signature_dates()
            .into_iter()
            .filter_map(|raw| parse_optional(Some(raw)))
            .max()
    }

    pub fn work_authorization_expiry(&self) -> Option<&str> {
        self.field(SECTION1_EXPIRY_FIELDS)
    }

    pub(crate) fn work_authorization_expiry_date(&self) -> Option<NaiveDate> {
        parse_optional(self.work_authorization_expiry())
    }

    pub fn has_employee_name(&self) -> bool {
        self.field(FIRST_NAME_FIELDS).is_some() || self.field(LAST_NAME_FIELDS).is_some()
    }
}

fn sanitize_confidence(value: f64) -> f64 {
    if value.is_finite() {
        value.clamp(0.0, 1.0)
    } else {
        0.0
    }
}

/// Every page of one document, ordered by page number.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageCatalog {
    pages: Vec<Page>,
}

impl PageCatalog {
    pub fn from_pages(mut pages: Vec<Page>) -> Result<Self, InputError> {
        pages.sort_by_key(|page| page.id);
        let mut seen = BTreeSet::new();
        for page in &pages {
            if !seen.insert(page.id) {
                return Err(InputError::DuplicatePageNumber(page.number()));
            }
        }
        Ok(Self { pages })
    }

    pub fn get(&self, id: PageId) -> Option<&Page> {
        self.pages
            .binary_search_by_key(&id, |page| page.id)
            .ok()
            .map(|index| &self.pages[index])
    }

    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    pub fn of_type(&self, section_type: SectionType) -> impl Iterator<Item = &Page> + '_ {
        self.pages
            .iter()
            .filter(move |page| page.section_type == section_type)
    }

    pub fn i9_pages(&self) -> impl Iterator<Item = &Page> + '_ {
        self.pages.iter().filter(|page| page.section_type.is_i9())
    }

    pub fn has_i9_pages(&self) -> bool {
        self.i9_pages().next().is_some()
    }

    pub fn supporting_pages(&self) -> impl Iterator<Item = &Page> + '_ {
        self.of_type(SectionType::SupportingDoc)
    }

    pub(crate) fn resolve<'a>(&'a self, ids: &'a [PageId]) -> impl Iterator<Item = &'a Page> + 'a {
        ids.iter().filter_map(move |id| self.get(*id))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SetType {
    NewHire,
    Reverification,
    Rehire,
    Incomplete,
}

impl SetType {
    pub(crate) fn from_sections(has_section1: bool, has_section2: bool, has_section3: bool) -> Self {
        if has_section3 {
            SetType::Reverification
        } else if has_section1 && has_section2 {
            SetType::NewHire
        } else {
            SetType::Incomplete
        }
    }
}

/// One hiring or reverification event assembled from page references.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionSet {
    pub id: String,
    pub set_type: SetType,
    pub anchor_signature_date: Option<String>,
    pub section1_page: Option<PageId>,
    pub section2_page: Option<PageId>,
    pub section3_pages: Vec<PageId>,
    pub supplement_b_pages: Vec<PageId>,
    pub supporting_doc_pages: Vec<PageId>,
    /// Other Section 1 pages grouped alongside the chosen one.
    pub section1_candidates: Vec<PageId>,
    pub is_complete: bool,
    pub validation_errors: Vec<String>,
    pub confidence_score: f64,
    /// Name of the grouping rule that produced the set.
    pub origin: String,
}

impl TransactionSet {
    pub(crate) fn empty(id: String, origin: &str) -> Self {
        Self {
            id,
            set_type: SetType::Incomplete,
            anchor_signature_date: None,
            section1_page: None,
            section2_page: None,
            section3_pages: Vec::new(),
            supplement_b_pages: Vec::new(),
            supporting_doc_pages: Vec::new(),
            section1_candidates: Vec::new(),
            is_complete: false,
            validation_errors: Vec::new(),
            confidence_score: 0.0,
            origin: origin.to_string(),
        }
    }

    /// Inclusive span of the Section 1 and Section 2 pages.
    pub fn core_page_range(&self) -> Option<(u32, u32)> {
        let numbers: Vec<u32> = self
            .section1_page
            .iter()
            .chain(self.section2_page.iter())
            .map(|id| id.number())
            .collect();
        let min = numbers.iter().min()?;
        let max = numbers.iter().max()?;
        Some((*min, *max))
    }

    pub fn has_supplement_b(&self) -> bool {
        !self.supplement_b_pages.is_empty()
    }

    pub fn has_section3(&self) -> bool {
        !self.section3_pages.is_empty()
    }

    /// I-9 pages claimed by the set, deduplicated and ordered.
    pub fn i9_pages(&self) -> Vec<PageId> {
        let mut ids = BTreeSet::new();
        ids.extend(self.section1_page);
        ids.extend(self.section2_page);
        ids.extend(self.section3_pages.iter().copied());
        ids.extend(self.supplement_b_pages.iter().copied());
        ids.into_iter().collect()
    }

    pub(crate) fn refresh_set_type(&mut self) {
        self.set_type = if self.has_supplement_b() {
            SetType::Rehire
        } else {
            SetType::from_sections(
                self.section1_page.is_some(),
                self.section2_page.is_some(),
                self.has_section3(),
            )
        };
    }
}

pub(crate) fn within_range(page: PageId, range: (u32, u32), distance: u32) -> bool {
    let (min, max) = range;
    let number = page.number();
    number.saturating_add(distance) >= min && number <= max.saturating_add(distance)
}
