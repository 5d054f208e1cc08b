//! Independent 100-point quality audit of one document.
//!
//! The rubric does not reuse the compliance scores; it re-reads the selected
//! set, the catalog and the document matches and awards points per bucket.

mod buckets;
mod status;

pub use status::{is_us_citizen, Criterion, EligibilityStatus};

use super::domain::{Page, PageCatalog, SectionType};
use super::matching::{references_for_tier, DocumentMatch, DocumentReference};
use super::selection::SelectionOutcome;
use serde::{Deserialize, Serialize};
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RubricBucket {
    PersonalData,
    Detection,
    BusinessRules,
    WorkAuthorization,
    DocumentTracking,
}

impl RubricBucket {
    pub const ALL: [RubricBucket; 5] = [
        RubricBucket::PersonalData,
        RubricBucket::Detection,
        RubricBucket::BusinessRules,
        RubricBucket::WorkAuthorization,
        RubricBucket::DocumentTracking,
    ];

    /// Base points, excluding any bonus.
    pub fn max(self) -> u32 {
        match self {
            RubricBucket::PersonalData | RubricBucket::BusinessRules => 25,
            RubricBucket::Detection => 20,
            RubricBucket::WorkAuthorization | RubricBucket::DocumentTracking => 15,
        }
    }

    pub fn bonus_max(self) -> u32 {
        match self {
            RubricBucket::Detection => 5,
            _ => 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BucketScore {
    pub bucket: RubricBucket,
    pub score: u32,
    pub max: u32,
    pub reasons: Vec<String>,
}

impl BucketScore {
    fn new(bucket: RubricBucket) -> Self {
        Self {
            bucket,
            score: 0,
            max: bucket.max() + bucket.bonus_max(),
            reasons: Vec::new(),
        }
    }

    fn award(&mut self, points: u32, reason: impl Into<String>) {
        self.score += points;
        self.reasons.push(reason.into());
    }

    fn note(&mut self, reason: impl Into<String>) {
        self.reasons.push(reason.into());
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RubricResult {
    pub buckets: Vec<BucketScore>,
    pub total_score: u32,
    pub status: EligibilityStatus,
    pub criteria: Vec<Criterion>,
}

impl RubricResult {
    pub fn bucket(&self, bucket: RubricBucket) -> Option<&BucketScore> {
        self.buckets.iter().find(|score| score.bucket == bucket)
    }

    pub fn score_of(&self, bucket: RubricBucket) -> u32 {
        self.bucket(bucket).map_or(0, |score| score.score)
    }
}

/// What every bucket reads.
pub(crate) struct RubricInput<'a> {
    pub(crate) catalog: &'a PageCatalog,
    pub(crate) selection: Option<&'a SelectionOutcome>,
    pub(crate) matches: &'a [DocumentMatch],
    pub(crate) references: Vec<DocumentReference>,
}

impl<'a> RubricInput<'a> {
    fn new(
        catalog: &'a PageCatalog,
        selection: Option<&'a SelectionOutcome>,
        matches: &'a [DocumentMatch],
    ) -> Self {
        let references = selection
            .map(|outcome| references_for_tier(catalog, &outcome.selected, outcome.tier))
            .unwrap_or_default();
        Self {
            catalog,
            selection,
            matches,
            references,
        }
    }

    /// Section 1 page of the selected set, else the document's first one.
    pub(crate) fn section1(&self) -> Option<&'a Page> {
        let catalog = self.catalog;
        self.selection
            .and_then(|outcome| outcome.selected.section1_page)
            .and_then(|id| catalog.get(id))
            .or_else(|| catalog.of_type(SectionType::Section1).next())
    }
}

#[derive(Debug, Clone, Default)]
pub struct RubricScorer;

impl RubricScorer {
    pub fn new() -> Self {
        Self
    }

    pub fn score(
        &self,
        catalog: &PageCatalog,
        selection: Option<&SelectionOutcome>,
        matches: &[DocumentMatch],
    ) -> RubricResult {
        let input = RubricInput::new(catalog, selection, matches);

        let buckets = vec![
            buckets::personal_data(&input),
            buckets::detection(&input),
            buckets::business_rules(&input),
            buckets::work_authorization(&input),
            buckets::document_tracking(&input),
        ];
        let total_score = buckets.iter().map(|bucket| bucket.score).sum();
        let criteria = status::criteria(&input);
        let status = status::determine(&input, &criteria);

        info!(total_score, status = ?status, "scored rubric");

        RubricResult {
            buckets,
            total_score,
            status,
            criteria,
        }
    }
}
