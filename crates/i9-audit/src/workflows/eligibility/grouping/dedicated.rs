use super::{date_slug, furthest_expiry, PageClaims, SetIds};
use crate::workflows::eligibility::domain::{
    Page, PageCatalog, PageId, SectionType, SetType, TransactionSet,
};
use crate::workflows::eligibility::fields::first_present;
use tracing::{debug, info};

const DEDICATED_CONFIDENCE: f64 = 0.8;

const REVERIFICATION_GROUP_FIELDS: &[&str] =
    &["reverification_signature_date", "employer_signature_date"];

/// Builds reverification sets for Section 3 pages no existing set claimed.
///
/// Pages cluster by their reverification signature date; undated pages are
/// skipped. Each set is paired with the nearest Section 1 page within
/// `section1_reach` pages, else the document's last Section 1 page.
pub(crate) fn reverification_sets(
    catalog: &PageCatalog,
    claims: &mut PageClaims,
    existing: &[TransactionSet],
    section1_reach: u32,
) -> Vec<TransactionSet> {
    let mut clusters: Vec<(String, Vec<PageId>)> = Vec::new();
    for page in claims.unclaimed(catalog, &[SectionType::Section3]) {
        let Some(signed) = first_present(&page.fields, REVERIFICATION_GROUP_FIELDS)
            .or_else(|| page.section_signature_date())
        else {
            debug!(page = page.number(), "undated Section 3 page left unassigned");
            continue;
        };
        push_clustered(&mut clusters, signed, page.id);
    }

    let mut ids = SetIds::default();
    ids.observe(existing);

    clusters
        .into_iter()
        .map(|(signed, pages)| {
            for id in &pages {
                claims.claim(*id);
            }
            let first_page = pages.iter().min().copied();
            let mut set = TransactionSet::empty(
                ids.issue(format!("section_3_{}", date_slug(&signed))),
                "dedicated_section3",
            );
            set.set_type = SetType::Reverification;
            set.anchor_signature_date = Some(signed);
            set.section1_page =
                first_page.and_then(|anchor| nearest_section1(catalog, anchor, section1_reach));
            set.section3_pages = pages;
            set.is_complete = true;
            set.confidence_score = DEDICATED_CONFIDENCE;
            info!(set = %set.id, pages = ?set.section3_pages, "created dedicated reverification set");
            set
        })
        .collect()
}

/// Builds rehire sets for filled Supplement B pages no existing set claimed.
///
/// Pages cluster by employer signature date; undated pages share one set.
pub(crate) fn rehire_sets(
    catalog: &PageCatalog,
    claims: &mut PageClaims,
    existing: &[TransactionSet],
    pages: Vec<&Page>,
) -> Vec<TransactionSet> {
    let mut dated: Vec<(String, Vec<PageId>)> = Vec::new();
    let mut undated: Vec<PageId> = Vec::new();
    for page in pages {
        if claims.is_claimed(page.id) {
            continue;
        }
        match page.section_signature_date() {
            Some(signed) => push_clustered(&mut dated, signed, page.id),
            None => undated.push(page.id),
        }
    }

    let mut ids = SetIds::default();
    ids.observe(existing);

    let mut groups: Vec<(Option<String>, Vec<PageId>)> = dated
        .into_iter()
        .map(|(signed, pages)| (Some(signed), pages))
        .collect();
    if !undated.is_empty() {
        groups.push((None, undated));
    }

    groups
        .into_iter()
        .map(|(signed, pages)| {
            for id in &pages {
                claims.claim(*id);
            }
            let base = match &signed {
                Some(date) => format!("supplement_b_{}", date_slug(date)),
                None => {
                    let numbers: Vec<String> = pages.iter().map(PageId::to_string).collect();
                    format!("supplement_b_pages_{}", numbers.join("-"))
                }
            };
            let mut set = TransactionSet::empty(ids.issue(base), "dedicated_supplement_b");
            set.set_type = SetType::Rehire;
            set.anchor_signature_date = signed;
            let section1: Vec<&Page> = catalog.of_type(SectionType::Section1).collect();
            set.section1_page = furthest_expiry(&section1);
            set.section1_candidates = section1
                .iter()
                .map(|page| page.id)
                .filter(|id| Some(*id) != set.section1_page)
                .collect();
            set.supplement_b_pages = pages;
            set.confidence_score = DEDICATED_CONFIDENCE;
            info!(set = %set.id, pages = ?set.supplement_b_pages, "created dedicated rehire set");
            set
        })
        .collect()
}

fn push_clustered(clusters: &mut Vec<(String, Vec<PageId>)>, signed: &str, id: PageId) {
    let key = signed.trim();
    match clusters.iter_mut().find(|(existing, _)| existing == key) {
        Some((_, pages)) => pages.push(id),
        None => clusters.push((key.to_string(), vec![id])),
    }
}

/// Closest Section 1 page within `reach` of `anchor`, else the last one.
pub(crate) fn nearest_section1(catalog: &PageCatalog, anchor: PageId, reach: u32) -> Option<PageId> {
    let section1: Vec<&Page> = catalog.of_type(SectionType::Section1).collect();

    section1
        .iter()
        .filter(|page| page.id.distance(anchor) <= reach)
        .min_by_key(|page| page.id.distance(anchor))
        .or_else(|| section1.iter().max_by_key(|page| page.id))
        .map(|page| page.id)
}
