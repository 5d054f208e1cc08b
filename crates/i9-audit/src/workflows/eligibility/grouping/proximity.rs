use super::{CandidateGroup, GroupingStrategy, PageClaims};
use crate::workflows::eligibility::dates::{parse_date, ParsedDate};
use crate::workflows::eligibility::domain::{Page, PageCatalog, PageId, SectionType};
use crate::workflows::eligibility::fields::{
    first_present, DOCUMENT_EXPIRY_FIELDS, SECTION2_CONTENT_FIELDS,
};

/// Chains unclaimed I-9 pages whose page gaps stay within `max_gap`.
///
/// A chain is kept only with a Section 1 + Section 2 pair, or a Section 1 +
/// Section 3 pair where some page also shows employer document fields.
#[derive(Debug, Clone)]
pub struct ProximityStrategy {
    max_gap: u32,
}

impl ProximityStrategy {
    pub fn new(max_gap: u32) -> Self {
        Self { max_gap }
    }
}

impl GroupingStrategy for ProximityStrategy {
    fn name(&self) -> &'static str {
        "proximity"
    }

    fn group(&self, catalog: &PageCatalog, claims: &mut PageClaims) -> Vec<CandidateGroup> {
        let pages = claims.unclaimed(
            catalog,
            &[
                SectionType::Section1,
                SectionType::Section2,
                SectionType::Section3,
            ],
        );

        let mut chains: Vec<Vec<&Page>> = Vec::new();
        for page in pages {
            match chains.last_mut() {
                Some(chain)
                    if chain
                        .last()
                        .is_some_and(|previous| page.id.distance(previous.id) <= self.max_gap) =>
                {
                    chain.push(page)
                }
                _ => chains.push(vec![page]),
            }
        }

        chains
            .into_iter()
            .filter(|chain| is_viable(chain))
            .filter_map(|chain| {
                let members: Vec<PageId> = chain.iter().map(|page| page.id).collect();
                claims.take(catalog, members, 2)
            })
            .collect()
    }
}

fn is_viable(chain: &[&Page]) -> bool {
    let has = |section: SectionType| chain.iter().any(|page| page.section_type == section);
    if !has(SectionType::Section1) {
        return false;
    }
    if has(SectionType::Section2) {
        return true;
    }
    has(SectionType::Section3) && chain.iter().any(|page| has_section2_content(page))
}

pub(crate) fn has_section2_content(page: &Page) -> bool {
    first_present(&page.fields, SECTION2_CONTENT_FIELDS).is_some()
}

/// Pairs a Section 1 page with a nearby Section 3 page when their expiry
/// dates agree within a tolerance, or when the pages are adjacent and either
/// expiry is missing or unreadable.
#[derive(Debug, Clone)]
pub struct ReverificationProximityStrategy {
    max_distance: u32,
    expiry_window_days: i64,
}

impl ReverificationProximityStrategy {
    pub fn new(max_distance: u32, expiry_window_days: i64) -> Self {
        Self {
            max_distance,
            expiry_window_days,
        }
    }

    fn pairs(&self, section1: &Page, section3: &Page) -> bool {
        let distance = section1.id.distance(section3.id);
        if distance > self.max_distance {
            return false;
        }
        let authorized = section1.work_authorization_expiry().map(parse_date);
        let documented = first_present(&section3.fields, DOCUMENT_EXPIRY_FIELDS).map(parse_date);

        match (authorized, documented) {
            (Some(ParsedDate::Parsed(left)), Some(ParsedDate::Parsed(right))) => {
                (left - right).num_days().abs() <= self.expiry_window_days
            }
            _ => distance == 1,
        }
    }
}

impl GroupingStrategy for ReverificationProximityStrategy {
    fn name(&self) -> &'static str {
        "section1_section3_proximity"
    }

    fn group(&self, catalog: &PageCatalog, claims: &mut PageClaims) -> Vec<CandidateGroup> {
        let mut groups = Vec::new();

        for section1 in claims.unclaimed(catalog, &[SectionType::Section1]) {
            let partner = claims
                .unclaimed(catalog, &[SectionType::Section3])
                .into_iter()
                .find(|section3| self.pairs(section1, section3))
                .map(|section3| section3.id);

            if let Some(section3) = partner {
                groups.extend(claims.take(catalog, vec![section1.id, section3], 2));
            }
        }

        groups
    }
}
