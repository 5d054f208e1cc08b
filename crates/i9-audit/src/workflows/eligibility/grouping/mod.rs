//! Tiered clustering of classified pages into candidate transaction sets.
//!
//! Each tier is a [`GroupingStrategy`]. Tiers run in order over the pages
//! earlier tiers left unclaimed; [`PageClaims`] guarantees that a Section 1,
//! 2, 3 or Supplement B page lands in at most one set.

pub(crate) mod dedicated;
mod expiry;
mod proximity;
mod signature;

pub use expiry::ExpiryMatchStrategy;
pub use proximity::{ProximityStrategy, ReverificationProximityStrategy};
pub use signature::{SignatureClusterStrategy, SignatureDateStrategy};

use super::domain::{Page, PageCatalog, PageId, SectionType, SetType, TransactionSet};
use crate::config::AuditConfig;
use chrono::NaiveDate;
use std::collections::{BTreeSet, HashMap};
use tracing::debug;

/// Windows and distances used by the grouping tiers.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupingConfig {
    pub signature_window_days: i64,
    pub combined_signature_window_days: i64,
    pub combined_section1_reach: u32,
    pub proximity_pages: u32,
    pub reverification_expiry_window_days: i64,
    pub cluster_window_days: i64,
}

impl Default for GroupingConfig {
    fn default() -> Self {
        Self {
            signature_window_days: 30,
            combined_signature_window_days: 7,
            combined_section1_reach: 3,
            proximity_pages: 2,
            reverification_expiry_window_days: 7,
            cluster_window_days: 7,
        }
    }
}

impl From<&AuditConfig> for GroupingConfig {
    fn from(config: &AuditConfig) -> Self {
        Self {
            signature_window_days: config.signature_window_days,
            proximity_pages: u32::try_from(config.proximity_pages).unwrap_or(2),
            ..Self::default()
        }
    }
}

/// Pages already owned by a set.
#[derive(Debug, Clone, Default)]
pub struct PageClaims {
    claimed: BTreeSet<PageId>,
}

impl PageClaims {
    pub fn is_claimed(&self, id: PageId) -> bool {
        self.claimed.contains(&id)
    }

    pub fn len(&self) -> usize {
        self.claimed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.claimed.is_empty()
    }

    /// Unclaimed pages of the given sections, in page order.
    pub fn unclaimed<'a>(
        &self,
        catalog: &'a PageCatalog,
        sections: &[SectionType],
    ) -> Vec<&'a Page> {
        catalog
            .pages()
            .iter()
            .filter(|page| sections.contains(&page.section_type) && !self.is_claimed(page.id))
            .collect()
    }

    /// Claim a candidate group, dropping pages someone else already owns.
    ///
    /// Only the first Section 2 page is admitted; later ones stay available.
    /// Returns `None` when fewer than `min_pages` survive.
    pub fn take(
        &mut self,
        catalog: &PageCatalog,
        candidates: Vec<PageId>,
        min_pages: usize,
    ) -> Option<CandidateGroup> {
        let mut admitted: Vec<PageId> = Vec::with_capacity(candidates.len());
        let mut has_section2 = false;
        for id in candidates {
            if self.is_claimed(id) || admitted.contains(&id) {
                continue;
            }
            let Some(page) = catalog.get(id) else {
                continue;
            };
            if page.section_type == SectionType::Section2 {
                if has_section2 {
                    continue;
                }
                has_section2 = true;
            }
            admitted.push(id);
        }

        if admitted.len() < min_pages.max(1) {
            return None;
        }

        self.claimed.extend(admitted.iter().copied());
        Some(CandidateGroup { pages: admitted })
    }

    pub(crate) fn claim(&mut self, id: PageId) {
        self.claimed.insert(id);
    }
}

/// Pages one tier decided belong together, in the order they were found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateGroup {
    pub pages: Vec<PageId>,
}

/// One grouping tier.
pub trait GroupingStrategy {
    fn name(&self) -> &'static str;

    fn group(&self, catalog: &PageCatalog, claims: &mut PageClaims) -> Vec<CandidateGroup>;
}

/// Sets produced by the grouping tiers plus the claims they hold.
#[derive(Debug, Clone, Default)]
pub struct GroupingOutcome {
    pub sets: Vec<TransactionSet>,
    pub claims: PageClaims,
}

pub struct SetGrouper {
    strategies: Vec<Box<dyn GroupingStrategy>>,
}

impl SetGrouper {
    /// Standard tiers: expiry, signature, proximity, Section 1+3 proximity,
    /// then residual signature clusters.
    pub fn new(config: &GroupingConfig) -> Self {
        Self::with_strategies(vec![
            Box::new(ExpiryMatchStrategy),
            Box::new(SignatureDateStrategy::new(
                config.signature_window_days,
                config.combined_signature_window_days,
                config.combined_section1_reach,
            )),
            Box::new(ProximityStrategy::new(config.proximity_pages)),
            Box::new(ReverificationProximityStrategy::new(
                config.proximity_pages,
                config.reverification_expiry_window_days,
            )),
            Box::new(SignatureClusterStrategy::new(config.cluster_window_days)),
        ])
    }

    pub fn with_strategies(strategies: Vec<Box<dyn GroupingStrategy>>) -> Self {
        Self { strategies }
    }

    pub fn strategy_names(&self) -> Vec<&'static str> {
        self.strategies.iter().map(|strategy| strategy.name()).collect()
    }

    pub fn group(&self, catalog: &PageCatalog) -> GroupingOutcome {
        let mut claims = PageClaims::default();
        let mut sets = Vec::new();
        let mut ids = SetIds::default();

        for strategy in &self.strategies {
            let groups = strategy.group(catalog, &mut claims);
            debug!(
                strategy = strategy.name(),
                groups = groups.len(),
                "grouping tier finished"
            );
            for group in groups {
                sets.push(build_set(catalog, &group, strategy.name(), &mut ids));
            }
        }

        GroupingOutcome { sets, claims }
    }
}

impl Default for SetGrouper {
    fn default() -> Self {
        Self::new(&GroupingConfig::default())
    }
}

/// Hands out unique set ids, suffixing repeats.
#[derive(Debug, Default)]
pub(crate) struct SetIds {
    seen: HashMap<String, usize>,
}

impl SetIds {
    pub(crate) fn issue(&mut self, base: String) -> String {
        let count = self.seen.entry(base.clone()).or_insert(0);
        *count += 1;
        if *count == 1 {
            base
        } else {
            format!("{base}_{count}")
        }
    }

    pub(crate) fn observe(&mut self, existing: &[TransactionSet]) {
        for set in existing {
            self.seen.entry(set.id.clone()).or_insert(1);
        }
    }
}

pub(crate) fn date_slug(date: &str) -> String {
    date.trim().replace(['/', ' '], "_")
}

fn build_set(
    catalog: &PageCatalog,
    group: &CandidateGroup,
    origin: &str,
    ids: &mut SetIds,
) -> TransactionSet {
    let members: Vec<&Page> = catalog.resolve(&group.pages).collect();

    let section1: Vec<&Page> = members
        .iter()
        .copied()
        .filter(|page| page.section_type == SectionType::Section1)
        .collect();
    let section1_page = furthest_expiry(&section1);
    let section2_page = members
        .iter()
        .find(|page| page.section_type == SectionType::Section2)
        .map(|page| page.id);
    let section3_pages: Vec<PageId> = members
        .iter()
        .filter(|page| page.section_type == SectionType::Section3)
        .map(|page| page.id)
        .collect();

    let anchor = section1_page
        .and_then(|id| catalog.get(id))
        .and_then(Page::employee_signature_date)
        .or_else(|| members.iter().find_map(|page| page.employee_signature_date()))
        .or_else(|| members.iter().find_map(|page| page.section_signature_date()))
        .map(str::to_string);

    let base_id = match &anchor {
        Some(date) => format!("set_{}", date_slug(date)),
        None => {
            let mut numbers: Vec<u32> = group.pages.iter().map(|id| id.number()).collect();
            numbers.sort_unstable();
            let joined: Vec<String> = numbers.iter().map(u32::to_string).collect();
            format!("set_pages_{}", joined.join("-"))
        }
    };

    let mut set = TransactionSet::empty(ids.issue(base_id), origin);
    set.set_type = SetType::from_sections(
        section1_page.is_some(),
        section2_page.is_some(),
        !section3_pages.is_empty(),
    );
    set.anchor_signature_date = anchor;
    set.section1_page = section1_page;
    set.section1_candidates = section1
        .iter()
        .map(|page| page.id)
        .filter(|id| Some(*id) != section1_page)
        .collect();
    set.section2_page = section2_page;
    set.section3_pages = section3_pages;

    debug!(
        set = %set.id,
        origin,
        pages = ?group.pages,
        "assembled candidate set"
    );
    set
}

/// Section 1 page with the furthest-future work authorization expiry.
///
/// The first page wins ties and is the fallback when no expiry parses.
pub(crate) fn furthest_expiry(pages: &[&Page]) -> Option<PageId> {
    let mut best: Option<(&Page, Option<NaiveDate>)> = None;
    for page in pages.iter().copied() {
        let expiry = page.work_authorization_expiry_date();
        match best {
            None => best = Some((page, expiry)),
            Some((_, current)) if expiry > current => best = Some((page, expiry)),
            Some(_) => {}
        }
    }
    best.map(|(page, _)| page.id)
}

/// Re-pick the Section 1 page of `set` by furthest expiry. The current page
/// is considered first so it survives ties; `whole_document` widens the pool
/// to every Section 1 page in the catalog.
pub(crate) fn reselect_section1(
    catalog: &PageCatalog,
    set: &mut TransactionSet,
    whole_document: bool,
) {
    let mut pool: Vec<PageId> = set
        .section1_page
        .into_iter()
        .chain(set.section1_candidates.iter().copied())
        .collect();
    if whole_document {
        for page in catalog.of_type(SectionType::Section1) {
            if !pool.contains(&page.id) {
                pool.push(page.id);
            }
        }
    }

    let pages: Vec<&Page> = catalog.resolve(&pool).collect();
    let chosen = furthest_expiry(&pages);
    if chosen != set.section1_page {
        debug!(set = %set.id, from = ?set.section1_page, to = ?chosen, "reselected Section 1 page");
    }
    set.section1_candidates = pool.into_iter().filter(|id| Some(*id) != chosen).collect();
    set.section1_page = chosen;
}
