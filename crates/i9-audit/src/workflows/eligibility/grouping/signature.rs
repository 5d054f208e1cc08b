use super::{CandidateGroup, GroupingStrategy, PageClaims};
use crate::workflows::eligibility::dates::{parse_optional, within_days};
use crate::workflows::eligibility::domain::{PageCatalog, PageId, SectionType};
use chrono::NaiveDate;

/// Matches Section 1 employee signatures against Section 2/3 employer
/// signatures, and pulls Section 1 pages toward a page signed by both parties.
#[derive(Debug, Clone)]
pub struct SignatureDateStrategy {
    window_days: i64,
    combined_window_days: i64,
    section1_reach: u32,
}

impl SignatureDateStrategy {
    pub fn new(window_days: i64, combined_window_days: i64, section1_reach: u32) -> Self {
        Self {
            window_days: window_days.max(0),
            combined_window_days: combined_window_days.max(0),
            section1_reach,
        }
    }
}

impl GroupingStrategy for SignatureDateStrategy {
    fn name(&self) -> &'static str {
        "signature_date"
    }

    fn group(&self, catalog: &PageCatalog, claims: &mut PageClaims) -> Vec<CandidateGroup> {
        let mut groups = Vec::new();
        let employer_sections = [SectionType::Section2, SectionType::Section3];

        for section1 in claims.unclaimed(catalog, &[SectionType::Section1]) {
            let Some(employee_signed) = section1.employee_signature_date() else {
                continue;
            };

            let mut members = vec![section1.id];
            members.extend(
                claims
                    .unclaimed(catalog, &employer_sections)
                    .into_iter()
                    .filter(|page| {
                        page.section_signature_date().is_some_and(|employer_signed| {
                            within_days(employee_signed, employer_signed, self.window_days)
                        })
                    })
                    .map(|page| page.id),
            );

            if members.len() > 1 {
                groups.extend(claims.take(catalog, members, 2));
            }
        }

        for page in claims.unclaimed(catalog, &employer_sections) {
            let (Some(employee_signed), Some(employer_signed)) =
                (page.employee_signature_date(), page.section_signature_date())
            else {
                continue;
            };
            if !within_days(employee_signed, employer_signed, self.combined_window_days) {
                continue;
            }

            let mut members: Vec<PageId> = claims
                .unclaimed(catalog, &[SectionType::Section1])
                .into_iter()
                .filter(|section1| section1.id.distance(page.id) <= self.section1_reach)
                .map(|section1| section1.id)
                .collect();
            if members.is_empty() {
                continue;
            }
            members.push(page.id);
            groups.extend(claims.take(catalog, members, 2));
        }

        groups
    }
}

/// Last tier: clusters leftover dated Section 1/2 pages whose signatures fall
/// within a few days of each other. Single pages form incomplete sets.
#[derive(Debug, Clone)]
pub struct SignatureClusterStrategy {
    window_days: i64,
}

impl SignatureClusterStrategy {
    pub fn new(window_days: i64) -> Self {
        Self {
            window_days: window_days.max(0),
        }
    }
}

impl GroupingStrategy for SignatureClusterStrategy {
    fn name(&self) -> &'static str {
        "signature_cluster"
    }

    fn group(&self, catalog: &PageCatalog, claims: &mut PageClaims) -> Vec<CandidateGroup> {
        let mut clusters: Vec<(NaiveDate, Vec<PageId>)> = Vec::new();

        for page in claims.unclaimed(catalog, &[SectionType::Section1, SectionType::Section2]) {
            let Some(signed) =
                parse_optional(page.employee_signature_date().or(page.employer_signature_date()))
            else {
                continue;
            };

            let existing = clusters
                .iter_mut()
                .find(|(key, _)| (*key - signed).num_days().abs() <= self.window_days);
            match existing {
                Some((_, members)) => members.push(page.id),
                None => clusters.push((signed, vec![page.id])),
            }
        }

        clusters
            .into_iter()
            .filter_map(|(_, members)| claims.take(catalog, sort_section1_first(catalog, members), 1))
            .collect()
    }
}

fn sort_section1_first(catalog: &PageCatalog, mut members: Vec<PageId>) -> Vec<PageId> {
    members.sort_by_key(|id| {
        let is_section1 = catalog
            .get(*id)
            .is_some_and(|page| page.section_type == SectionType::Section1);
        (!is_section1, *id)
    });
    members
}
