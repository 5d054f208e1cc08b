use super::dates::{parse_optional, same_date_text};
use super::domain::{
    within_range, Page, PageCatalog, PageId, SectionType, TransactionSet,
};
use super::fields::{first_present, has_filled_field, normalize_identifier, SECTION3_CONTENT_FIELDS};
use super::grouping::{dedicated, reselect_section1, GroupingOutcome, PageClaims};
use super::matching::all_references;
use crate::config::AuditConfig;
use chrono::NaiveDate;
use std::cmp::Ordering;
use tracing::{debug, info};

pub const MISSING_SECTION1: &str = "E001: Missing Section 1 (Employee Information)";
pub const MISSING_SECTION2: &str = "E002: Missing Section 2 (Employer Verification)";
pub const ORPHAN_SECTION3: &str = "E003: Section 3 found without corresponding Section 1";

#[derive(Debug, Clone, PartialEq)]
pub struct AssociationConfig {
    pub proximity_pages: u32,
    pub supporting_proximity_pages: u32,
    pub section1_reach: u32,
    /// Shorter document numbers are too ambiguous to locate a scan by.
    pub min_reference_length: usize,
}

impl Default for AssociationConfig {
    fn default() -> Self {
        Self {
            proximity_pages: 2,
            supporting_proximity_pages: 3,
            section1_reach: 5,
            min_reference_length: 4,
        }
    }
}

impl From<&AuditConfig> for AssociationConfig {
    fn from(config: &AuditConfig) -> Self {
        Self {
            proximity_pages: u32::try_from(config.proximity_pages).unwrap_or(2),
            ..Self::default()
        }
    }
}

/// Attaches reverification, rehire and supporting pages to grouped sets.
pub struct SectionAssociator {
    config: AssociationConfig,
}

impl SectionAssociator {
    pub fn new(config: AssociationConfig) -> Self {
        Self { config }
    }

    /// Complete the grouped sets, add dedicated sets for leftover Section 3
    /// and Supplement B pages, then validate and order the result.
    pub fn associate(&self, catalog: &PageCatalog, outcome: GroupingOutcome) -> Vec<TransactionSet> {
        let GroupingOutcome {
            mut sets,
            mut claims,
        } = outcome;

        let mut filled: Vec<&Page> = Vec::new();
        for page in catalog.of_type(SectionType::SupplementB) {
            if has_filled_field(&page.fields) {
                filled.push(page);
            } else {
                debug!(page = page.number(), "ignoring blank Supplement B page");
            }
        }

        for set in sets.iter_mut() {
            self.attach_section3(catalog, set, &mut claims);
            self.attach_supplement_b(catalog, set, &mut claims, &filled);
        }

        let mut reverification =
            dedicated::reverification_sets(catalog, &mut claims, &sets, self.config.section1_reach);
        for set in reverification.iter_mut() {
            self.attach_supplement_b(catalog, set, &mut claims, &filled);
        }
        sets.extend(reverification);

        let leftover: Vec<&Page> = filled
            .into_iter()
            .filter(|page| !claims.is_claimed(page.id))
            .collect();
        let rehire = dedicated::rehire_sets(catalog, &mut claims, &sets, leftover);
        sets.extend(rehire);

        for set in sets.iter_mut() {
            self.attach_supporting(catalog, set);
            validate(catalog, set);
        }
        order_sets(catalog, &mut sets);

        info!(
            sets = sets.len(),
            claimed = claims.len(),
            "associated sections"
        );
        sets
    }

    fn attach_section3(&self, catalog: &PageCatalog, set: &mut TransactionSet, claims: &mut PageClaims) {
        let candidates = claims.unclaimed(catalog, &[SectionType::Section3]);

        let (mut rule, mut attached) = self.secondary_pages(set, &candidates);
        if attached.is_empty() && set.section3_pages.is_empty() {
            if let Some(id) = shared_section2_page(catalog, set) {
                rule = "shared_page";
                attached.push(id);
            }
        }
        if attached.is_empty() {
            return;
        }

        for id in &attached {
            claims.claim(*id);
        }
        debug!(set = %set.id, rule, pages = ?attached, "attached Section 3 pages");
        set.section3_pages.extend(attached);
        set.refresh_set_type();
    }

    fn attach_supplement_b(
        &self,
        catalog: &PageCatalog,
        set: &mut TransactionSet,
        claims: &mut PageClaims,
        filled: &[&Page],
    ) {
        let candidates: Vec<&Page> = filled
            .iter()
            .copied()
            .filter(|page| !claims.is_claimed(page.id))
            .collect();
        let (rule, attached) = self.secondary_pages(set, &candidates);
        if attached.is_empty() {
            return;
        }

        for id in &attached {
            claims.claim(*id);
        }
        debug!(set = %set.id, rule, pages = ?attached, "attached Supplement B pages");
        set.supplement_b_pages.extend(attached);
        set.refresh_set_type();
        reselect_section1(catalog, set, true);
    }

    /// Candidates signed on the set's anchor date, else those near its core pages.
    fn secondary_pages(&self, set: &TransactionSet, candidates: &[&Page]) -> (&'static str, Vec<PageId>) {
        if let Some(anchor) = set.anchor_signature_date.as_deref() {
            let signed: Vec<PageId> = candidates
                .iter()
                .filter(|page| signed_on(page, anchor))
                .map(|page| page.id)
                .collect();
            if !signed.is_empty() {
                return ("signature_date", signed);
            }
        }

        let range = set
            .core_page_range()
            .or_else(|| set.section3_pages.first().map(|id| (id.number(), id.number())));
        let Some(range) = range else {
            return ("none", Vec::new());
        };
        let near = candidates
            .iter()
            .filter(|page| within_range(page.id, range, self.config.proximity_pages))
            .map(|page| page.id)
            .collect();
        ("proximity", near)
    }

    fn attach_supporting(&self, catalog: &PageCatalog, set: &mut TransactionSet) {
        let supporting: Vec<&Page> = catalog.supporting_pages().collect();
        if supporting.is_empty() {
            return;
        }

        let numbers: Vec<String> = all_references(catalog, set)
            .iter()
            .filter_map(|reference| reference.normalized_number())
            .filter(|number| number.len() >= self.config.min_reference_length)
            .collect();
        let mut attached: Vec<PageId> = supporting
            .iter()
            .filter(|page| numbers.iter().any(|number| page_mentions(page, number)))
            .map(|page| page.id)
            .collect();
        let mut rule = "document_number";

        if attached.is_empty() {
            if let Some(range) = set.core_page_range() {
                attached = supporting
                    .iter()
                    .filter(|page| within_range(page.id, range, self.config.supporting_proximity_pages))
                    .map(|page| page.id)
                    .collect();
                rule = "proximity";
            }
        }
        if attached.is_empty() {
            attached = supporting.iter().map(|page| page.id).collect();
            rule = "all_supporting";
        }

        debug!(set = %set.id, rule, pages = ?attached, "attached supporting pages");
        set.supporting_doc_pages = attached;
    }
}

impl Default for SectionAssociator {
    fn default() -> Self {
        Self::new(AssociationConfig::default())
    }
}

fn signed_on(page: &Page, anchor: &str) -> bool {
    page.employee_signature_date()
        .into_iter()
        .chain(page.section_signature_dates())
        .any(|signed| same_date_text(signed, anchor))
}

/// The set's Section 2 page when it also carries reverification content.
fn shared_section2_page(catalog: &PageCatalog, set: &TransactionSet) -> Option<PageId> {
    let page = catalog.get(set.section2_page?)?;
    first_present(&page.fields, SECTION3_CONTENT_FIELDS).map(|_| page.id)
}

fn page_mentions(page: &Page, number: &str) -> bool {
    page.fields
        .values()
        .any(|value| normalize_identifier(value).contains(number))
}

/// Recompute `validation_errors`, `is_complete` and `confidence_score`.
pub fn validate(catalog: &PageCatalog, set: &mut TransactionSet) {
    let mut errors = Vec::new();
    if set.section1_page.is_none() {
        errors.push(MISSING_SECTION1.to_string());
    }
    if set.section2_page.is_none() {
        errors.push(MISSING_SECTION2.to_string());
    }
    if set.has_section3() && set.section1_page.is_none() {
        errors.push(ORPHAN_SECTION3.to_string());
    }
    set.is_complete = errors.is_empty();
    set.validation_errors = errors;

    let core: Vec<PageId> = set.section1_page.into_iter().chain(set.section2_page).collect();
    let confidences: Vec<f64> = catalog.resolve(&core).map(|page| page.confidence_score).collect();
    if !confidences.is_empty() {
        set.confidence_score = confidences.iter().sum::<f64>() / confidences.len() as f64;
    }
}

fn employee_signature(catalog: &PageCatalog, set: &TransactionSet) -> Option<NaiveDate> {
    parse_optional(
        set.section1_page
            .and_then(|id| catalog.get(id))
            .and_then(Page::employee_signature_date),
    )
    .or_else(|| parse_optional(set.anchor_signature_date.as_deref()))
}

/// Latest employee signature first; undated sets follow, highest Section 1
/// page first.
pub fn order_sets(catalog: &PageCatalog, sets: &mut [TransactionSet]) {
    sets.sort_by(|left, right| {
        let left_date = employee_signature(catalog, left);
        let right_date = employee_signature(catalog, right);
        match (left_date, right_date) {
            (Some(left), Some(right)) => right.cmp(&left),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => right.section1_page.cmp(&left.section1_page),
        }
    });
}
