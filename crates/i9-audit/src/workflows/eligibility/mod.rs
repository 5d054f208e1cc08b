//! I-9 eligibility packet auditing.
//!
//! Pages flow through the stages in order: classification, grouping into
//! candidate transaction sets, section association, priority selection,
//! document matching, compliance validation and rubric scoring. Sets refer
//! to pages by [`PageId`]; pages themselves are never copied into sets.

pub mod association;
pub mod classifier;
pub mod compliance;
pub mod dates;
pub mod domain;
pub mod fields;
pub mod grouping;
pub mod matching;
pub mod review;
pub mod rubric;
pub mod selection;
pub mod service;

pub use association::{AssociationConfig, SectionAssociator};
pub use classifier::{Classification, PageClassifier};
pub use compliance::{
    ComplianceReport, ComplianceStatus, ComplianceValidator, ErrorCode, Severity, ValidationIssue,
};
pub use dates::{parse_date, ParsedDate};
pub use domain::{
    FieldMap, InputError, Page, PageCatalog, PageId, PageKind, PageRecord, SectionType, SetType,
    TransactionSet,
};
pub use grouping::{
    CandidateGroup, GroupingConfig, GroupingOutcome, GroupingStrategy, PageClaims, SetGrouper,
};
pub use matching::{
    DocumentMatch, DocumentMatcher, DocumentReference, DocumentType, ListCategory, MatchPolicy,
    SupportingDocument,
};
pub use review::{ReviewItem, ReviewPolicy, ReviewPriority};
pub use rubric::{
    BucketScore, Criterion, EligibilityStatus, RubricBucket, RubricResult, RubricScorer,
};
pub use selection::{PrioritySelector, SelectionOutcome, SelectionTier};
pub use service::{EligibilityAuditor, TransactionAudit};

#[cfg(test)]
mod tests;
