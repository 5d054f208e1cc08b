use super::dates::parse_optional;
use super::domain::{Page, PageCatalog, PageId, SetType, TransactionSet};
use super::grouping::reselect_section1;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Priority tier a set competes in, strongest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum SelectionTier {
    SupplementB,
    Section3,
    NewHire,
    Fallback,
}

impl SelectionTier {
    pub fn of(set: &TransactionSet) -> Self {
        if set.has_supplement_b() {
            SelectionTier::SupplementB
        } else if set.has_section3() {
            SelectionTier::Section3
        } else if set.section1_page.is_some() && set.section2_page.is_some() {
            SelectionTier::NewHire
        } else {
            SelectionTier::Fallback
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SelectionTier::SupplementB => "Supplement B",
            SelectionTier::Section3 => "Section 3",
            SelectionTier::NewHire => "new hire",
            SelectionTier::Fallback => "fallback",
        }
    }

    fn prefers_named_section1(self) -> bool {
        matches!(self, SelectionTier::SupplementB | SelectionTier::Section3)
    }
}

/// Authoritative set plus the sets it beat.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectionOutcome {
    pub selected: TransactionSet,
    pub alternatives: Vec<TransactionSet>,
    pub tier: SelectionTier,
    pub reason: String,
}

/// Latest signature that ranks a set inside its tier.
///
/// Supplement B and Section 3 sets rank by the employer signatures on those
/// pages; new-hire sets by the Section 1 employee signature; anything else by
/// its anchor date.
pub fn tier_signature(
    catalog: &PageCatalog,
    set: &TransactionSet,
    tier: SelectionTier,
) -> Option<NaiveDate> {
    match tier {
        SelectionTier::SupplementB => latest_on(catalog, &set.supplement_b_pages),
        SelectionTier::Section3 => latest_on(catalog, &set.section3_pages),
        SelectionTier::NewHire => parse_optional(
            set.section1_page
                .and_then(|id| catalog.get(id))
                .and_then(Page::employee_signature_date),
        ),
        SelectionTier::Fallback => parse_optional(set.anchor_signature_date.as_deref()),
    }
}

fn latest_on(catalog: &PageCatalog, ids: &[PageId]) -> Option<NaiveDate> {
    catalog
        .resolve(ids)
        .filter_map(Page::latest_section_signature)
        .max()
}

fn has_named_section1(catalog: &PageCatalog, set: &TransactionSet) -> bool {
    set.section1_page
        .and_then(|id| catalog.get(id))
        .is_some_and(Page::has_employee_name)
}

/// Applies the Supplement B > Section 3 > new hire hierarchy.
#[derive(Debug, Clone, Default)]
pub struct PrioritySelector;

impl PrioritySelector {
    pub fn new() -> Self {
        Self
    }

    pub fn select(
        &self,
        catalog: &PageCatalog,
        mut sets: Vec<TransactionSet>,
    ) -> Option<SelectionOutcome> {
        let tier = sets.iter().map(SelectionTier::of).min()?;

        let mut winner: Option<(usize, (Option<NaiveDate>, bool))> = None;
        let mut competitors = 0;
        for (index, set) in sets.iter().enumerate() {
            if SelectionTier::of(set) != tier {
                continue;
            }
            competitors += 1;
            let named = tier.prefers_named_section1() && has_named_section1(catalog, set);
            let key = (tier_signature(catalog, set, tier), named);
            match &winner {
                Some((_, best)) if key <= *best => {}
                _ => winner = Some((index, key)),
            }
        }
        let (index, (signature, _)) = winner?;

        let mut selected = sets.remove(index);
        let whole_document = selected.set_type == SetType::Rehire;
        reselect_section1(catalog, &mut selected, whole_document);

        let signature = signature
            .map(|date| date.format("%m/%d/%Y").to_string())
            .unwrap_or_else(|| "none".to_string());
        let reason = format!(
            "{} tier selected from {competitors} candidate set(s); latest signature {signature}",
            tier.label()
        );
        if tier == SelectionTier::Fallback {
            warn!(set = %selected.id, "no complete set available; selected fallback set");
        }
        info!(
            set = %selected.id,
            tier = tier.label(),
            alternatives = sets.len(),
            "selected authoritative set"
        );

        Some(SelectionOutcome {
            selected,
            alternatives: sets,
            tier,
            reason,
        })
    }
}
