use super::{CandidateGroup, GroupingStrategy, PageClaims};
use crate::workflows::eligibility::dates::same_date_text;
use crate::workflows::eligibility::domain::{PageCatalog, SectionType};
use crate::workflows::eligibility::fields::{all_present, DOCUMENT_EXPIRY_FIELDS};
use tracing::debug;

/// Pairs a Section 1 work-authorization expiry with Section 2/3 pages
/// recording the same document expiry.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExpiryMatchStrategy;

impl GroupingStrategy for ExpiryMatchStrategy {
    fn name(&self) -> &'static str {
        "expiry_match"
    }

    fn group(&self, catalog: &PageCatalog, claims: &mut PageClaims) -> Vec<CandidateGroup> {
        let mut groups = Vec::new();

        for section1 in claims.unclaimed(catalog, &[SectionType::Section1]) {
            let Some(expiry) = section1.work_authorization_expiry() else {
                continue;
            };

            let mut members = vec![section1.id];
            for page in claims.unclaimed(catalog, &[SectionType::Section2, SectionType::Section3]) {
                let matched = all_present(&page.fields, DOCUMENT_EXPIRY_FIELDS)
                    .into_iter()
                    .any(|candidate| same_date_text(candidate, expiry));
                if matched {
                    debug!(
                        section1 = section1.number(),
                        page = page.number(),
                        expiry,
                        "expiry dates match"
                    );
                    members.push(page.id);
                }
            }

            if members.len() > 1 {
                groups.extend(claims.take(catalog, members, 2));
            }
        }

        groups
    }
}
