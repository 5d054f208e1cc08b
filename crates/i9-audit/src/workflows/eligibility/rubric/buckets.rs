use super::{BucketScore, RubricBucket, RubricInput};
use crate::workflows::eligibility::dates::{days_between, parse_date, same_date_text};
use crate::workflows::eligibility::domain::{Page, PageCatalog, SectionType, TransactionSet};
use crate::workflows::eligibility::fields::{
    first_present, CITIZENSHIP_FIELDS, DATE_OF_BIRTH_FIELDS, DOCUMENT_EXPIRY_FIELDS,
    FIRST_NAME_FIELDS, LAST_NAME_FIELDS, SECTION3_CONTENT_FIELDS, SSN_FIELDS,
};
use crate::workflows::eligibility::matching::{references_for_tier, references_in};
use crate::workflows::eligibility::selection::{tier_signature, SelectionTier};

const EXPIRY_TOLERANCE_DAYS: i64 = 30;

pub(super) fn personal_data(input: &RubricInput<'_>) -> BucketScore {
    let mut bucket = BucketScore::new(RubricBucket::PersonalData);
    let Some(page) = input.section1() else {
        bucket.note("no Section 1 page to read personal data from");
        return bucket;
    };

    let checks: [(&str, &[&str]); 4] = [
        ("first name", FIRST_NAME_FIELDS),
        ("last name", LAST_NAME_FIELDS),
        ("date of birth", DATE_OF_BIRTH_FIELDS),
        ("citizenship status", CITIZENSHIP_FIELDS),
    ];
    for (label, names) in checks {
        match first_present(&page.fields, names) {
            Some(_) => bucket.award(5, format!("{label} found")),
            None => bucket.note(format!("{label} missing")),
        }
    }

    // Redaction markers count as a partial SSN: the field was extracted.
    let ssn = SSN_FIELDS.iter().find_map(|name| {
        page.fields
            .get(*name)
            .map(|value| value.trim())
            .filter(|value| !value.is_empty() && !matches!(value.to_lowercase().as_str(), "n/a" | "null"))
    });
    match ssn {
        Some(value) if value.chars().filter(char::is_ascii_digit).count() == 9 => {
            bucket.award(5, "SSN found")
        }
        Some(_) => bucket.award(3, "SSN partial or redacted"),
        None => bucket.note("SSN missing"),
    }
    bucket
}

pub(super) fn detection(input: &RubricInput<'_>) -> BucketScore {
    let mut bucket = BucketScore::new(RubricBucket::Detection);
    let catalog = input.catalog;
    if !catalog.has_i9_pages() {
        bucket.note("no I-9 pages detected");
        return bucket;
    }
    bucket.award(8, "I-9 pages detected");

    let found = |section: SectionType| catalog.of_type(section).count();
    let section1 = found(SectionType::Section1);
    let section2 = found(SectionType::Section2);
    let secondary = found(SectionType::Section3) + found(SectionType::SupplementB);
    for (count, label) in [
        (section1, "Section 1"),
        (section2, "Section 2"),
        (secondary, "Section 3/Supplement B"),
    ] {
        if count > 0 {
            bucket.award(4, format!("{count} {label} page(s) found"));
        } else {
            bucket.note(format!("no {label} pages"));
        }
    }

    let Some(outcome) = input.selection else {
        return bucket;
    };
    let strongest_valid = std::iter::once(&outcome.selected)
        .chain(outcome.alternatives.iter())
        .filter(|set| is_valid_form(catalog, set))
        .map(SelectionTier::of)
        .min();
    if strongest_valid.is_some_and(|tier| tier == outcome.tier) {
        let bonus = match outcome.tier {
            SelectionTier::SupplementB => 5,
            SelectionTier::Section3 => 3,
            SelectionTier::NewHire => 1,
            SelectionTier::Fallback => 0,
        };
        if bonus > 0 {
            bucket.award(bonus, format!("bonus: {} form identified", outcome.tier.label()));
        }
    }
    bucket
}

pub(super) fn business_rules(input: &RubricInput<'_>) -> BucketScore {
    let mut bucket = BucketScore::new(RubricBucket::BusinessRules);
    let Some(outcome) = input.selection else {
        bucket.note("no transaction set selected");
        return bucket;
    };
    let catalog = input.catalog;
    let selected = &outcome.selected;
    let mut points: i32 = 0;

    if is_valid_form(catalog, selected) {
        points += 10;
        bucket.note(format!("valid {} form selected", outcome.tier.label()));
    } else {
        points -= 5;
        bucket.note(format!("fell back to an invalid {} form", outcome.tier.label()));
    }

    for (tier, section) in [
        (SelectionTier::SupplementB, SectionType::SupplementB),
        (SelectionTier::Section3, SectionType::Section3),
    ] {
        if tier >= outcome.tier {
            continue;
        }
        let mut pages = catalog.of_type(section).peekable();
        if pages.peek().is_some() && pages.all(|page| !is_valid_page(page)) {
            points += 2;
            bucket.note(format!("skipped invalid {} form", tier.label()));
        }
    }

    let signature = tier_signature(catalog, selected, outcome.tier);
    let latest = signature.is_some()
        && outcome
            .alternatives
            .iter()
            .filter(|set| SelectionTier::of(set) == outcome.tier)
            .all(|set| tier_signature(catalog, set, outcome.tier) <= signature);
    if latest {
        points += 8;
        bucket.note("latest signature selected within tier");
    } else {
        bucket.note("latest signature not established");
    }

    if selected.section1_page.is_some() {
        points += 4;
        bucket.note("Section 1 selected");
    }
    if !input.references.is_empty() {
        points += 3;
        bucket.note(format!("documents read from the {} section", outcome.tier.label()));
    }

    bucket.score = u32::try_from(points.clamp(0, RubricBucket::BusinessRules.max() as i32)).unwrap_or(0);
    bucket
}

pub(super) fn work_authorization(input: &RubricInput<'_>) -> BucketScore {
    let mut bucket = BucketScore::new(RubricBucket::WorkAuthorization);

    let authorized_until = input
        .section1()
        .and_then(|page| page.work_authorization_expiry());
    match authorized_until {
        Some(date) => bucket.award(8, format!("work authorization expiry {date} found")),
        None => bucket.note("no work authorization expiry"),
    }

    let document_expiry = document_expiry(input);
    match &document_expiry {
        Some(date) => bucket.award(4, format!("document expiry {date} found")),
        None => bucket.note("no document expiry"),
    }

    if let (Some(authorized), Some(document)) = (authorized_until, document_expiry.as_deref()) {
        if expiry_dates_equal(authorized, document) {
            bucket.award(3, "expiry dates match exactly");
        } else {
            match days_between(authorized, document) {
                Some(days) if days <= EXPIRY_TOLERANCE_DAYS => {
                    bucket.award(2, format!("expiry dates within {days} days"))
                }
                Some(days) => bucket.note(format!("expiry dates {days} days apart")),
                None => bucket.note("expiry dates could not be compared"),
            }
        }
    }
    bucket
}

pub(super) fn document_tracking(input: &RubricInput<'_>) -> BucketScore {
    let mut bucket = BucketScore::new(RubricBucket::DocumentTracking);
    let references = &input.references;

    if references.is_empty() {
        bucket.note("no documents listed");
    } else {
        bucket.award(6, format!("{} document(s) listed", references.len()));
        if references.iter().any(|reference| reference.number.is_some()) {
            bucket.award(3, "document numbers extracted");
        }
    }

    let supporting = input.catalog.supporting_pages().count();
    if supporting > 0 {
        bucket.award(3, format!("{supporting} supporting page(s) found"));
    }

    if references.is_empty() {
        bucket.note("attachment status NONE");
    } else if all_attached(input) {
        bucket.award(3, "attachment status ATTACHED");
    } else {
        bucket.award(1, "attachment status LISTED_ONLY");
    }
    bucket
}

/// At least one reference, and every match found a supporting page.
pub(super) fn all_attached(input: &RubricInput<'_>) -> bool {
    !input.matches.is_empty() && input.matches.iter().all(|found| found.is_matched())
}

/// Expiry on the documents of the selected tier.
pub(super) fn document_expiry(input: &RubricInput<'_>) -> Option<String> {
    if let Some(date) = input
        .references
        .iter()
        .find_map(|reference| reference.expiration_date.clone())
    {
        return Some(date);
    }

    let outcome = input.selection?;
    let set = &outcome.selected;
    let pages = match outcome.tier {
        SelectionTier::SupplementB => set.supplement_b_pages.clone(),
        SelectionTier::Section3 => set.section3_pages.clone(),
        SelectionTier::NewHire | SelectionTier::Fallback => set.section2_page.into_iter().collect(),
    };
    let expiry = input
        .catalog
        .resolve(&pages)
        .find_map(|page| first_present(&page.fields, DOCUMENT_EXPIRY_FIELDS))
        .map(str::to_string);
    expiry
}

pub(super) fn expiry_dates_equal(left: &str, right: &str) -> bool {
    match (parse_date(left).date(), parse_date(right).date()) {
        (Some(left), Some(right)) => left == right,
        _ => same_date_text(left, right),
    }
}

/// A form is valid when it is signed and carries review content.
/// Signed, and carrying either a document reference or reverification content.
fn is_valid_page(page: &Page) -> bool {
    page.latest_section_signature().is_some()
        && (!references_in(page, page.section_type).is_empty()
            || first_present(&page.fields, SECTION3_CONTENT_FIELDS).is_some())
}

pub(super) fn is_valid_form(catalog: &PageCatalog, set: &TransactionSet) -> bool {
    let tier = SelectionTier::of(set);
    if tier_signature(catalog, set, tier).is_none() {
        return false;
    }
    if !references_for_tier(catalog, set, tier).is_empty() {
        return true;
    }
    match tier {
        SelectionTier::SupplementB => catalog
            .resolve(&set.supplement_b_pages)
            .any(|page| first_present(&page.fields, SECTION3_CONTENT_FIELDS).is_some()),
        SelectionTier::Section3 => catalog
            .resolve(&set.section3_pages)
            .any(|page| first_present(&page.fields, SECTION3_CONTENT_FIELDS).is_some()),
        SelectionTier::NewHire | SelectionTier::Fallback => set
            .section1_page
            .and_then(|id| catalog.get(id))
            .is_some_and(|page| page.has_employee_name()),
    }
}
