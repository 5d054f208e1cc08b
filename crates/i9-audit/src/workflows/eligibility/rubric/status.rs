use super::buckets::{all_attached, document_expiry, expiry_dates_equal};
use super::RubricInput;
use crate::workflows::eligibility::fields::{
    first_present, CITIZENSHIP_FIELDS, DATE_OF_BIRTH_FIELDS, FIRST_NAME_FIELDS, LAST_NAME_FIELDS,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EligibilityStatus {
    CompleteSuccess,
    PartialSuccess,
    NoI9Found,
    Error,
}

/// One eligibility requirement and whether the document meets it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Criterion {
    pub name: String,
    pub met: bool,
}

impl Criterion {
    fn new(name: &str, met: bool) -> Self {
        Self {
            name: name.to_string(),
            met,
        }
    }
}

/// Any attestation naming a citizen, unless it is a noncitizen one.
pub fn is_us_citizen(citizenship: &str) -> bool {
    let normalized = citizenship.to_lowercase();
    normalized.contains("citizen") && !normalized.contains("non")
}

pub(super) fn criteria(input: &RubricInput<'_>) -> Vec<Criterion> {
    let section1 = input.section1();
    let has = |names: &[&str]| section1.is_some_and(|page| first_present(&page.fields, names).is_some());

    let mut criteria = vec![
        Criterion::new("first_name", has(FIRST_NAME_FIELDS)),
        Criterion::new("last_name", has(LAST_NAME_FIELDS)),
        Criterion::new("date_of_birth", has(DATE_OF_BIRTH_FIELDS)),
        Criterion::new("documents_attached", all_attached(input)),
    ];

    let citizen = section1
        .and_then(|page| first_present(&page.fields, CITIZENSHIP_FIELDS))
        .is_some_and(is_us_citizen);
    if !citizen {
        let expiry_matches = section1
            .and_then(|page| page.work_authorization_expiry())
            .zip(document_expiry(input))
            .is_some_and(|(authorized, document)| expiry_dates_equal(authorized, &document));
        criteria.push(Criterion::new("expiry_match", expiry_matches));
    }
    criteria
}

pub(super) fn determine(input: &RubricInput<'_>, criteria: &[Criterion]) -> EligibilityStatus {
    if !input.catalog.has_i9_pages() {
        EligibilityStatus::NoI9Found
    } else if input.selection.is_none() {
        EligibilityStatus::Error
    } else if criteria.iter().all(|criterion| criterion.met) {
        EligibilityStatus::CompleteSuccess
    } else {
        EligibilityStatus::PartialSuccess
    }
}

#[cfg(test)]
mod tests {
    use super::is_us_citizen;

    #[test]
    fn recognises_citizen_attestations() {
        assert!(is_us_citizen("US Citizen"));
        assert!(is_us_citizen("U.S. Citizen"));
        assert!(is_us_citizen("a_citizen_of_the_united_states"));
        assert!(is_us_citizen("Citizen"));
        assert!(is_us_citizen("citizen"));
        assert!(is_us_citizen("United States Citizen"));
        assert!(!is_us_citizen("lawful_permanent_resident"));
        assert!(!is_us_citizen("alien_authorized_to_work"));
        assert!(!is_us_citizen("noncitizen national"));
        assert!(!is_us_citizen("non_us_citizen"));
    }
}
