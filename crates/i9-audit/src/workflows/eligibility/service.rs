use super::association::{AssociationConfig, SectionAssociator};
use super::classifier::PageClassifier;
use super::compliance::{ComplianceReport, ComplianceValidator};
use super::domain::{PageCatalog, PageRecord, TransactionSet};
use super::grouping::{GroupingConfig, SetGrouper};
use super::matching::{DocumentMatch, DocumentMatcher, MatchPolicy};
use super::review::{ReviewItem, ReviewPolicy};
use super::rubric::{RubricResult, RubricScorer};
use super::selection::{PrioritySelector, SelectionOutcome, SelectionTier};
use crate::config::AuditConfig;
use crate::error::AuditError;
use serde::{Deserialize, Serialize};
use tracing::info;

/// Everything the auditor concluded about one document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionAudit {
    pub page_count: usize,
    pub i9_page_count: usize,
    pub selected: Option<TransactionSet>,
    pub tier: Option<SelectionTier>,
    pub selection_reason: Option<String>,
    pub alternatives: Vec<TransactionSet>,
    pub matches: Vec<DocumentMatch>,
    pub compliance: ComplianceReport,
    pub rubric: RubricResult,
    pub review: Option<ReviewItem>,
}

/// Runs classification through rubric scoring for one document.
pub struct EligibilityAuditor {
    classifier: PageClassifier,
    grouper: SetGrouper,
    associator: SectionAssociator,
    selector: PrioritySelector,
    matcher: DocumentMatcher,
    validator: ComplianceValidator,
    scorer: RubricScorer,
    review: ReviewPolicy,
}

impl EligibilityAuditor {
    pub fn new(config: AuditConfig) -> Self {
        let policy = MatchPolicy::from(&config);
        Self {
            classifier: PageClassifier::new(),
            grouper: SetGrouper::new(&GroupingConfig::from(&config)),
            associator: SectionAssociator::new(AssociationConfig::from(&config)),
            selector: PrioritySelector::new(),
            validator: ComplianceValidator::new(&policy),
            matcher: DocumentMatcher::new(policy),
            scorer: RubricScorer::new(),
            review: ReviewPolicy::from(&config),
        }
    }

    pub fn audit(&self, records: &[PageRecord]) -> Result<TransactionAudit, AuditError> {
        let catalog = self.classifier.classify_records(records)?;
        Ok(self.audit_catalog(&catalog))
    }

    /// Audit pages that are already classified.
    pub fn audit_catalog(&self, catalog: &PageCatalog) -> TransactionAudit {
        let grouped = self.grouper.group(catalog);
        let sets = self.associator.associate(catalog, grouped);
        let selection = self.selector.select(catalog, sets);

        let matches = match &selection {
            Some(outcome) => self.matcher.match_set(catalog, &outcome.selected, outcome.tier),
            None => Vec::new(),
        };
        let compliance = self.validator.validate(
            catalog,
            selection.as_ref().map(|outcome| &outcome.selected),
            &matches,
        );
        let rubric = self.scorer.score(catalog, selection.as_ref(), &matches);
        let review = self.review.evaluate(selection.as_ref(), &compliance, &rubric);

        let i9_page_count = catalog.i9_pages().count();
        info!(
            pages = catalog.len(),
            i9_pages = i9_page_count,
            selected = selection.as_ref().map(|outcome| outcome.selected.id.as_str()).unwrap_or("none"),
            compliance = ?compliance.status,
            rubric = ?rubric.status,
            total_score = rubric.total_score,
            "audited document"
        );

        let (selected, tier, selection_reason, alternatives) = match selection {
            Some(SelectionOutcome {
                selected,
                alternatives,
                tier,
                reason,
            }) => (Some(selected), Some(tier), Some(reason), alternatives),
            None => (None, None, None, Vec::new()),
        };

        TransactionAudit {
            page_count: catalog.len(),
            i9_page_count,
            selected,
            tier,
            selection_reason,
            alternatives,
            matches,
            compliance,
            rubric,
            review,
        }
    }
}

impl Default for EligibilityAuditor {
    fn default() -> Self {
        Self::new(AuditConfig::default())
    }
}
