//! Cross-reference of documents recorded on the form against scanned
//! supporting pages of the same PDF.

mod references;

pub use references::{
    all_references, normalize_document_type, references_for_tier, references_in,
    supporting_document, supporting_documents, DocumentReference, DocumentType, ListCategory,
    SupportingDocument,
};

use super::dates::{normalize_date_text, parse_date, ParsedDate};
use super::domain::{PageCatalog, TransactionSet};
use super::fields::normalize_identifier;
use super::selection::SelectionTier;
use crate::config::AuditConfig;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

const TYPE_WEIGHT: f64 = 0.6;
const EXACT_NUMBER_WEIGHT: f64 = 0.5;
const FUZZY_NUMBER_WEIGHT: f64 = 0.3;
const EXPIRY_WEIGHT: f64 = 0.1;
const FUZZY_MIN_LENGTH: usize = 8;
const FUZZY_AGREEMENT: f64 = 0.8;

/// Acceptance thresholds for candidate supporting pages.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchPolicy {
    /// A candidate must score strictly above this to be accepted.
    pub min_confidence: f64,
    /// Accepted matches below this are flagged.
    pub low_confidence: f64,
}

impl MatchPolicy {
    pub fn new(min_confidence: f64, low_confidence: f64) -> Self {
        Self {
            min_confidence: sanitize_ratio(min_confidence, 0.0),
            low_confidence: sanitize_ratio(low_confidence, 0.7),
        }
    }
}

impl Default for MatchPolicy {
    fn default() -> Self {
        Self::new(0.0, 0.7)
    }
}

impl From<&AuditConfig> for MatchPolicy {
    fn from(config: &AuditConfig) -> Self {
        Self::new(config.match_min_confidence, config.match_low_confidence)
    }
}

fn sanitize_ratio(value: f64, fallback: f64) -> f64 {
    if value.is_finite() {
        value.clamp(0.0, 1.0)
    } else {
        fallback
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentMatch {
    pub reference: DocumentReference,
    pub supporting_document: Option<SupportingDocument>,
    pub match_confidence: f64,
    pub match_reasons: Vec<String>,
    pub validation_errors: Vec<String>,
}

impl DocumentMatch {
    pub fn is_matched(&self) -> bool {
        self.supporting_document.is_some()
    }

    pub fn has_number_mismatch(&self) -> bool {
        self.validation_errors
            .iter()
            .any(|error| error.starts_with("Document number mismatch"))
    }
}

pub struct DocumentMatcher {
    policy: MatchPolicy,
}

impl DocumentMatcher {
    pub fn new(policy: MatchPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &MatchPolicy {
        &self.policy
    }

    /// Match the references the selection tier makes authoritative against
    /// every supporting page of the document.
    pub fn match_set(
        &self,
        catalog: &PageCatalog,
        set: &TransactionSet,
        tier: SelectionTier,
    ) -> Vec<DocumentMatch> {
        let references = references_for_tier(catalog, set, tier);
        let candidates = supporting_documents(catalog);
        let matches = self.match_references(&references, &candidates);
        info!(
            set = %set.id,
            references = references.len(),
            candidates = candidates.len(),
            matched = matches.iter().filter(|found| found.is_matched()).count(),
            "matched document references"
        );
        matches
    }

    /// Best candidate per reference. The first candidate wins ties.
    pub fn match_references(
        &self,
        references: &[DocumentReference],
        candidates: &[SupportingDocument],
    ) -> Vec<DocumentMatch> {
        references
            .iter()
            .map(|reference| self.match_reference(reference, candidates))
            .collect()
    }

    fn match_reference(
        &self,
        reference: &DocumentReference,
        candidates: &[SupportingDocument],
    ) -> DocumentMatch {
        let mut best: Option<(&SupportingDocument, f64, Vec<String>)> = None;
        for candidate in candidates {
            let (confidence, reasons) = self.score(reference, candidate);
            let floor = best
                .as_ref()
                .map_or(self.policy.min_confidence, |(_, current, _)| *current);
            if confidence > floor {
                best = Some((candidate, confidence, reasons));
            }
        }

        let Some((candidate, confidence, reasons)) = best else {
            debug!(
                document = %reference.document_type,
                page = %reference.page,
                "no supporting document for reference"
            );
            return DocumentMatch {
                reference: reference.clone(),
                supporting_document: None,
                match_confidence: 0.0,
                match_reasons: Vec::new(),
                validation_errors: vec![format!(
                    "No supporting document found for {} {}",
                    reference.document_type,
                    reference.number.as_deref().unwrap_or("N/A")
                )],
            };
        };

        let mut validation_errors = Vec::new();
        if let (Some(recorded), Some(scanned)) = (&reference.number, &candidate.number) {
            if !numbers_equal(recorded, scanned) && !numbers_fuzzy_match(recorded, scanned) {
                validation_errors.push(format!("Document number mismatch: {recorded} vs {scanned}"));
            }
        }
        if confidence < self.policy.low_confidence {
            validation_errors.push("Low confidence match".to_string());
        }

        DocumentMatch {
            reference: reference.clone(),
            supporting_document: Some(candidate.clone()),
            match_confidence: confidence,
            match_reasons: reasons,
            validation_errors,
        }
    }

    /// Weighted agreement between a reference and a candidate, capped at 1.0.
    pub fn score(
        &self,
        reference: &DocumentReference,
        candidate: &SupportingDocument,
    ) -> (f64, Vec<String>) {
        let mut confidence = 0.0;
        let mut reasons = Vec::new();

        if reference.document_type.matches(&candidate.document_type) {
            confidence += TYPE_WEIGHT;
            reasons.push("Document type matches".to_string());
        }

        if let (Some(recorded), Some(scanned)) = (&reference.number, &candidate.number) {
            if numbers_equal(recorded, scanned) {
                confidence += EXACT_NUMBER_WEIGHT;
                reasons.push("Document number exact match".to_string());
            } else if numbers_fuzzy_match(recorded, scanned) {
                confidence += FUZZY_NUMBER_WEIGHT;
                reasons.push("Document number fuzzy match".to_string());
            }
        }

        if let (Some(recorded), Some(scanned)) =
            (&reference.expiration_date, &candidate.expiration_date)
        {
            if dates_match(recorded, scanned) {
                confidence += EXPIRY_WEIGHT;
                reasons.push("Expiration date matches".to_string());
            }
        }

        (f64::min(confidence, 1.0), reasons)
    }
}

impl Default for DocumentMatcher {
    fn default() -> Self {
        Self::new(MatchPolicy::default())
    }
}

fn numbers_equal(left: &str, right: &str) -> bool {
    let left = normalize_identifier(left);
    !left.is_empty() && left == normalize_identifier(right)
}

/// Containment, or at least 80% positional agreement on long numbers.
pub fn numbers_fuzzy_match(left: &str, right: &str) -> bool {
    let left = normalize_identifier(left);
    let right = normalize_identifier(right);
    if left.is_empty() || right.is_empty() {
        return false;
    }
    if left.contains(&right) || right.contains(&left) {
        return true;
    }
    if left.len() < FUZZY_MIN_LENGTH || right.len() < FUZZY_MIN_LENGTH {
        return false;
    }

    let shortest = left.len().min(right.len());
    let agreeing = left
        .bytes()
        .zip(right.bytes())
        .filter(|(a, b)| a == b)
        .count();
    agreeing as f64 / shortest as f64 >= FUZZY_AGREEMENT
}

fn dates_match(left: &str, right: &str) -> bool {
    match (parse_date(left), parse_date(right)) {
        (ParsedDate::Parsed(left), ParsedDate::Parsed(right)) => left == right,
        _ => {
            let left = normalize_date_text(left);
            !left.is_empty() && left == normalize_date_text(right)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflows::eligibility::domain::{PageId, SectionType};

    fn reference(number: Option<&str>, expiry: Option<&str>) -> DocumentReference {
        DocumentReference {
            document_type: DocumentType::Ead,
            title: "EAD".to_string(),
            number: number.map(str::to_string),
            expiration_date: expiry.map(str::to_string),
            issuing_authority: None,
            list_category: ListCategory::A,
            source_section: SectionType::Section2,
            page: PageId(2),
        }
    }

    fn candidate(
        page: u32,
        document_type: DocumentType,
        number: Option<&str>,
        expiry: Option<&str>,
    ) -> SupportingDocument {
        SupportingDocument {
            page: PageId(page),
            document_type,
            number: number.map(str::to_string),
            expiration_date: expiry.map(str::to_string),
            issuing_authority: None,
            confidence: 0.9,
        }
    }

    #[test]
    fn exact_match_is_capped_at_one() {
        let matcher = DocumentMatcher::default();
        let (confidence, reasons) = matcher.score(
            &reference(Some("A12345678"), Some("03/15/2025")),
            &candidate(9, DocumentType::Ead, Some("a12-345-678"), Some("2025-03-15")),
        );
        assert_eq!(confidence, 1.0);
        assert_eq!(reasons.len(), 3);
    }

    #[test]
    fn type_only_match_is_accepted_but_flagged() {
        let matcher = DocumentMatcher::default();
        let matches = matcher.match_references(
            &[reference(Some("A12345678"), None)],
            &[candidate(9, DocumentType::Ead, Some("ZZ999"), None)],
        );

        let found = &matches[0];
        assert!(found.is_matched());
        assert!((found.match_confidence - 0.6).abs() < 1e-9);
        assert!(found.has_number_mismatch());
        assert!(found
            .validation_errors
            .contains(&"Low confidence match".to_string()));
    }

    #[test]
    fn minimum_confidence_rejects_weak_candidates() {
        let matcher = DocumentMatcher::new(MatchPolicy::new(0.6, 0.7));
        let matches = matcher.match_references(
            &[reference(Some("A12345678"), None)],
            &[candidate(9, DocumentType::Ead, None, None)],
        );
        assert!(!matches[0].is_matched());
        assert_eq!(
            matches[0].validation_errors,
            vec!["No supporting document found for ead A12345678".to_string()]
        );
    }

    #[test]
    fn no_candidates_is_a_failure() {
        let matcher = DocumentMatcher::default();
        let matches = matcher.match_references(&[reference(None, None)], &[]);
        assert!(!matches[0].is_matched());
        assert_eq!(matches[0].match_confidence, 0.0);
    }

    #[test]
    fn first_candidate_wins_ties() {
        let matcher = DocumentMatcher::default();
        let matches = matcher.match_references(
            &[reference(Some("A12345678"), None)],
            &[
                candidate(7, DocumentType::Ead, Some("A12345678"), None),
                candidate(9, DocumentType::Ead, Some("A12345678"), None),
            ],
        );
        let chosen = matches[0]
            .supporting_document
            .as_ref()
            .map(|document| document.page);
        assert_eq!(chosen, Some(PageId(7)));
    }

    #[test]
    fn fuzzy_numbers_allow_containment_and_near_misses() {
        assert!(numbers_fuzzy_match("A12345678", "12345678"));
        assert!(numbers_fuzzy_match("A12345678", "A12345679"));
        assert!(!numbers_fuzzy_match("A1234", "B9876"));
        assert!(!numbers_fuzzy_match("ABCDEFGH", "HGFEDCBA"));
    }
}
