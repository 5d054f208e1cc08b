use super::compliance::{ComplianceReport, ComplianceStatus, Severity};
use super::domain::SetType;
use super::rubric::RubricResult;
use super::selection::SelectionOutcome;
use crate::config::AuditConfig;
use serde::{Deserialize, Serialize};
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ReviewPriority {
    High,
    Medium,
    Low,
}

/// A document an auditor should look at by hand.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewItem {
    pub set_id: Option<String>,
    pub priority: ReviewPriority,
    pub reasons: Vec<String>,
    pub confidence_score: f64,
    pub validation_score: f64,
    pub rubric_score: u32,
}

impl ReviewItem {
    pub fn summary(&self) -> String {
        self.reasons.join(" | ")
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReviewPolicy {
    pub low_confidence: f64,
    pub low_validation: f64,
    pub critical_validation: f64,
    pub poor_matching: f64,
}

impl Default for ReviewPolicy {
    fn default() -> Self {
        Self {
            low_confidence: 0.7,
            low_validation: 60.0,
            critical_validation: 40.0,
            poor_matching: 50.0,
        }
    }
}

impl From<&AuditConfig> for ReviewPolicy {
    fn from(config: &AuditConfig) -> Self {
        Self {
            low_confidence: config.match_low_confidence,
            low_validation: config.review_low_validation,
            ..Self::default()
        }
    }
}

impl ReviewPolicy {
    pub fn evaluate(
        &self,
        selection: Option<&SelectionOutcome>,
        compliance: &ComplianceReport,
        rubric: &RubricResult,
    ) -> Option<ReviewItem> {
        let mut reasons = Vec::new();
        let mut priority = ReviewPriority::Low;
        let confidence = selection.map_or(0.0, |outcome| outcome.selected.confidence_score);

        if confidence < self.low_confidence {
            reasons.push(format!("Low confidence score: {:.1}%", confidence * 100.0));
            priority = priority.min(ReviewPriority::Medium);
        }

        if compliance.overall < self.low_validation {
            reasons.push(format!("Low validation score: {:.1}", compliance.overall));
            if compliance.overall < self.critical_validation {
                priority = ReviewPriority::High;
            }
        }

        let critical = compliance.count(Severity::Critical);
        if critical > 0 {
            reasons.push(format!("{critical} critical issue(s)"));
            priority = ReviewPriority::High;
        }

        match compliance.status {
            ComplianceStatus::Error => {
                reasons.push("Validation status: ERROR".to_string());
                priority = ReviewPriority::High;
            }
            ComplianceStatus::PartialSuccess => {
                reasons.push("Validation status: PARTIAL_SUCCESS".to_string());
            }
            ComplianceStatus::Success => {}
        }

        match selection.map(|outcome| outcome.selected.set_type) {
            Some(SetType::Incomplete) => reasons.push("I-9 set incomplete".to_string()),
            None => reasons.push("No I-9 set assembled".to_string()),
            Some(_) => {}
        }

        if compliance.document_matching < self.poor_matching {
            reasons.push(format!(
                "Poor document matching: {:.1}",
                compliance.document_matching
            ));
        }

        if reasons.is_empty() {
            return None;
        }

        let item = ReviewItem {
            set_id: selection.map(|outcome| outcome.selected.id.clone()),
            priority,
            reasons,
            confidence_score: confidence,
            validation_score: compliance.overall,
            rubric_score: rubric.total_score,
        };
        warn!(
            set = item.set_id.as_deref().unwrap_or("none"),
            priority = ?item.priority,
            reasons = %item.summary(),
            "document flagged for manual review"
        );
        Some(item)
    }
}
