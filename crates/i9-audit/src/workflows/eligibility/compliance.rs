use super::dates::parse_date;
use super::domain::{PageCatalog, PageId, TransactionSet};
use super::fields::{first_present, present, CITIZENSHIP_FIELDS, FIRST_NAME_FIELDS, LAST_NAME_FIELDS};
use super::matching::{DocumentMatch, MatchPolicy};
use serde::{Deserialize, Serialize};
use tracing::info;

const AUTHORIZED_ALIEN_MARKERS: &[&str] = &["alien_authorized_to_work", "noncitizen_authorized_to_work"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorCode {
    E001,
    E002,
    E003,
    E004,
    E005,
    E006,
    E007,
    E008,
    E009,
    E010,
}

impl ErrorCode {
    pub fn description(self) -> &'static str {
        match self {
            ErrorCode::E001 => "Missing Section 1",
            ErrorCode::E002 => "Missing Section 2",
            ErrorCode::E003 => "Section 3 without corresponding Section 1",
            ErrorCode::E004 => "Document expiration date mismatch",
            ErrorCode::E005 => "Missing supporting documents",
            ErrorCode::E006 => "Inconsistent employee information",
            ErrorCode::E007 => "Invalid work authorization period",
            ErrorCode::E008 => "Document number mismatch",
            ErrorCode::E009 => "Expired documents",
            ErrorCode::E010 => "Incomplete form sections",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Error,
    Critical,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationIssue {
    pub error_code: ErrorCode,
    pub severity: Severity,
    pub message: String,
    pub affected_pages: Vec<PageId>,
    pub recommendations: Vec<String>,
}

impl ValidationIssue {
    fn new(
        error_code: ErrorCode,
        severity: Severity,
        message: impl Into<String>,
        affected_pages: Vec<PageId>,
        recommendation: impl Into<String>,
    ) -> Self {
        Self {
            error_code,
            severity,
            message: message.into(),
            affected_pages,
            recommendations: vec![recommendation.into()],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ComplianceStatus {
    Success,
    PartialSuccess,
    Error,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComplianceReport {
    pub issues: Vec<ValidationIssue>,
    pub completeness: f64,
    pub document_matching: f64,
    pub compliance: f64,
    pub overall: f64,
    pub status: ComplianceStatus,
}

impl ComplianceReport {
    pub fn count(&self, severity: Severity) -> usize {
        self.issues
            .iter()
            .filter(|issue| issue.severity == severity)
            .count()
    }

    pub fn has_code(&self, code: ErrorCode) -> bool {
        self.issues.iter().any(|issue| issue.error_code == code)
    }
}

/// Fixed compliance rules over the selected set and its document matches.
#[derive(Debug, Clone)]
pub struct ComplianceValidator {
    low_confidence: f64,
}

impl ComplianceValidator {
    pub fn new(policy: &MatchPolicy) -> Self {
        Self {
            low_confidence: policy.low_confidence,
        }
    }

    pub fn validate(
        &self,
        catalog: &PageCatalog,
        set: Option<&TransactionSet>,
        matches: &[DocumentMatch],
    ) -> ComplianceReport {
        let mut issues = completeness_issues(set);
        if let Some(set) = set {
            issues.extend(name_issues(catalog, set));
            issues.extend(work_authorization_issues(catalog, set));
        }
        issues.extend(self.document_issues(matches));

        let has_section1 = set.is_some_and(|set| set.section1_page.is_some());
        let has_section2 = set.is_some_and(|set| set.section2_page.is_some());
        let completeness = 100.0 - missing(has_section1) - missing(has_section2);

        let document_matching = if matches.is_empty() {
            0.0
        } else {
            let matched = matches.iter().filter(|found| found.is_matched()).count();
            matched as f64 / matches.len() as f64 * 100.0
        };

        let penalty: f64 = issues
            .iter()
            .map(|issue| match issue.severity {
                Severity::Critical => 25.0,
                Severity::Error => 15.0,
                Severity::Warning => 5.0,
                Severity::Info => 0.0,
            })
            .sum();
        let compliance = (100.0 - penalty).max(0.0);
        let overall = completeness * 0.4 + document_matching * 0.3 + compliance * 0.3;

        let status = if issues.iter().any(|issue| issue.severity == Severity::Critical) {
            ComplianceStatus::Error
        } else if issues.iter().any(|issue| issue.severity == Severity::Error) || overall < 80.0 {
            ComplianceStatus::PartialSuccess
        } else {
            ComplianceStatus::Success
        };

        info!(
            set = set.map(|set| set.id.as_str()).unwrap_or("none"),
            issues = issues.len(),
            overall,
            status = ?status,
            "validated compliance"
        );

        ComplianceReport {
            issues,
            completeness,
            document_matching,
            compliance,
            overall,
            status,
        }
    }

    fn document_issues(&self, matches: &[DocumentMatch]) -> Vec<ValidationIssue> {
        let mut issues = Vec::new();
        for found in matches {
            let reference = &found.reference;
            let Some(document) = &found.supporting_document else {
                issues.push(ValidationIssue::new(
                    ErrorCode::E005,
                    Severity::Error,
                    format!(
                        "No supporting document found for {} {}",
                        reference.document_type,
                        reference.number.as_deref().unwrap_or("N/A")
                    ),
                    Vec::new(),
                    format!("Ensure the {} document is included in the PDF", reference.document_type),
                ));
                continue;
            };

            if found.match_confidence < self.low_confidence {
                issues.push(ValidationIssue::new(
                    ErrorCode::E008,
                    Severity::Warning,
                    format!(
                        "Low confidence document match ({:.1}%)",
                        found.match_confidence * 100.0
                    ),
                    vec![document.page],
                    "Manually verify document numbers match",
                ));
            }
            for error in found
                .validation_errors
                .iter()
                .filter(|error| error.starts_with("Document number mismatch"))
            {
                issues.push(ValidationIssue::new(
                    ErrorCode::E008,
                    Severity::Warning,
                    error.clone(),
                    vec![document.page],
                    "Review document details for accuracy",
                ));
            }
        }
        issues
    }
}

impl Default for ComplianceValidator {
    fn default() -> Self {
        Self::new(&MatchPolicy::default())
    }
}

fn missing(present: bool) -> f64 {
    if present {
        0.0
    } else {
        50.0
    }
}

fn completeness_issues(set: Option<&TransactionSet>) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();
    if set.and_then(|set| set.section1_page).is_none() {
        issues.push(ValidationIssue::new(
            ErrorCode::E001,
            Severity::Critical,
            "Missing Section 1 (Employee Information and Attestation)",
            Vec::new(),
            "Ensure Section 1 is completed by the employee before processing",
        ));
    }
    if set.and_then(|set| set.section2_page).is_none() {
        issues.push(ValidationIssue::new(
            ErrorCode::E002,
            Severity::Critical,
            "Missing Section 2 (Employer Review and Verification)",
            Vec::new(),
            "Ensure Section 2 is completed by the employer",
        ));
    }
    if let Some(set) = set {
        if set.has_section3() && set.section1_page.is_none() {
            issues.push(ValidationIssue::new(
                ErrorCode::E003,
                Severity::Error,
                "Section 3 found without corresponding Section 1",
                set.section3_pages.clone(),
                "Verify that Section 1 is present for the reverification",
            ));
        }
    }
    issues
}

fn name_issues(catalog: &PageCatalog, set: &TransactionSet) -> Vec<ValidationIssue> {
    let (Some(section1), Some(section2)) = (
        set.section1_page.and_then(|id| catalog.get(id)),
        set.section2_page.and_then(|id| catalog.get(id)),
    ) else {
        return Vec::new();
    };

    let checks = [
        ("First", FIRST_NAME_FIELDS, "employee_first_name"),
        ("Last", LAST_NAME_FIELDS, "employee_last_name"),
    ];
    checks
        .into_iter()
        .filter_map(|(label, section1_names, section2_name)| {
            let attested = first_present(&section1.fields, section1_names)?.trim().to_uppercase();
            let reviewed = present(&section2.fields, section2_name)?.trim().to_uppercase();
            (attested != reviewed).then(|| {
                ValidationIssue::new(
                    ErrorCode::E006,
                    Severity::Error,
                    format!("{label} name inconsistency: Section 1 '{attested}' vs Section 2 '{reviewed}'"),
                    vec![section1.id, section2.id],
                    "Verify employee name spelling across all sections",
                )
            })
        })
        .collect()
}

fn work_authorization_issues(catalog: &PageCatalog, set: &TransactionSet) -> Vec<ValidationIssue> {
    let Some(section1) = set.section1_page.and_then(|id| catalog.get(id)) else {
        return Vec::new();
    };
    let Some(citizenship) = first_present(&section1.fields, CITIZENSHIP_FIELDS) else {
        return Vec::new();
    };
    let normalized = citizenship.trim().to_lowercase().replace([' ', '-'], "_");
    if !AUTHORIZED_ALIEN_MARKERS
        .iter()
        .any(|marker| normalized.contains(marker))
    {
        return Vec::new();
    }

    let message = match section1.work_authorization_expiry() {
        None => "Missing work authorization expiration date for alien authorized to work".to_string(),
        Some(raw) if parse_date(raw).date().is_none() => {
            format!("Unreadable work authorization expiration date '{raw}'")
        }
        Some(_) => return Vec::new(),
    };
    vec![ValidationIssue::new(
        ErrorCode::E007,
        Severity::Error,
        message,
        vec![section1.id],
        "Ensure the work authorization expiration date is provided",
    )]
}
