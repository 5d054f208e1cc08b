use super::domain::FieldMap;
use serde_json::Value;

const PLACEHOLDER_VALUES: &[&str] = &["", "n/a", "null", "[pii_redacted]", "[date_redacted]"];

/// Section 1 work-authorization expiry, most specific name first.
pub(crate) const SECTION1_EXPIRY_FIELDS: &[&str] = &[
    "work_authorization_expiration_date",
    "section_1_work_authorization_expiration_date",
    "section_1_alien_authorized_to_work_until",
    "alien_authorized_to_work_until",
    "alien_authorized_to_work_until_date",
    "work_auth_expiration_date",
    "work_until_date",
    "alien_expiration_date",
];

/// Every expiry a Section 2 or Section 3 page may carry.
pub(crate) const DOCUMENT_EXPIRY_FIELDS: &[&str] = &[
    "reverification_expiration_date",
    "rehire_expiration_date",
    "section_3_expiration_date",
    "list_a_expiration_date",
    "list_a_expiration_date_1",
    "list_a_document_expiration_date",
    "list_a_document_1_expiration_date",
    "list_a_document_2_expiration_date",
    "list_a_document_3_expiration_date",
    "list_b_expiration_date",
    "list_c_expiration_date",
    "document_expiration_date",
    "expiration_date_if_any_list_a_or_c",
    "new_document_expiration_date",
];

pub(crate) const EMPLOYEE_SIGNATURE_FIELDS: &[&str] = &[
    "employee_signature_date",
    "section_1_employee_signature_date",
    "section_1_signature_date",
    "employee_date_signed",
];

pub(crate) const EMPLOYER_SIGNATURE_FIELDS: &[&str] = &[
    "employer_signature_date",
    "section_2_employer_signature_date",
    "employer_date_signed",
];

pub(crate) const REVERIFICATION_SIGNATURE_FIELDS: &[&str] = &[
    "reverification_signature_date",
    "employer_signature_date",
    "section_3_employer_signature_date",
    "reverification_employer_signature_date",
    "section_3_signature_date",
    "section_3_date_signed",
    "employer_date",
];

pub(crate) const FIRST_NAME_FIELDS: &[&str] = &["employee_first_name", "first_name"];
pub(crate) const LAST_NAME_FIELDS: &[&str] = &["employee_last_name", "last_name"];
pub(crate) const DATE_OF_BIRTH_FIELDS: &[&str] =
    &["date_of_birth", "employee_date_of_birth", "dob"];
pub(crate) const SSN_FIELDS: &[&str] = &[
    "us_social_security_number",
    "social_security_number",
    "employee_social_security_number",
    "ssn",
];
pub(crate) const CITIZENSHIP_FIELDS: &[&str] =
    &["citizenship_status", "citizenship", "attestation_status"];

/// Fields that prove a page carries employer document review content.
pub(crate) const SECTION2_CONTENT_FIELDS: &[&str] = &[
    "list_a_document_title",
    "list_a_document_number",
    "list_a_expiration_date",
    "list_b_document_title",
    "list_c_document_title",
    "employer_signature_date",
    "employee_first_day_of_employment",
];

/// Reverification content that can share a physical page with Section 2.
pub(crate) const SECTION3_CONTENT_FIELDS: &[&str] = &[
    "reverification_date",
    "reverification_document_title",
    "reverification_document_number",
    "reverification_signature_date",
    "section_3_document_title",
    "section_3_document_number",
    "section_3_date_of_rehire",
    "rehire_date",
    "new_name",
];

pub fn is_placeholder(value: &str) -> bool {
    let trimmed = value.trim();
    PLACEHOLDER_VALUES
        .iter()
        .any(|placeholder| trimmed.eq_ignore_ascii_case(placeholder))
}

pub(crate) fn present<'a>(fields: &'a FieldMap, name: &str) -> Option<&'a str> {
    fields
        .get(name)
        .map(String::as_str)
        .filter(|value| !is_placeholder(value))
}

/// First non-placeholder value among ordered alternate names.
pub fn first_present<'a>(fields: &'a FieldMap, names: &[&str]) -> Option<&'a str> {
    names.iter().find_map(|name| present(fields, name))
}

pub(crate) fn all_present<'a>(fields: &'a FieldMap, names: &[&str]) -> Vec<&'a str> {
    names.iter().filter_map(|name| present(fields, name)).collect()
}

/// Non-placeholder values of every key accepted by `predicate`, in key order.
pub(crate) fn present_where<'a>(
    fields: &'a FieldMap,
    predicate: impl Fn(&str) -> bool,
) -> Vec<&'a str> {
    fields
        .iter()
        .filter(|(key, value)| predicate(key.as_str()) && !is_placeholder(value))
        .map(|(_, value)| value.as_str())
        .collect()
}

pub fn has_filled_field(fields: &FieldMap) -> bool {
    fields.values().any(|value| !is_placeholder(value))
}

/// Flatten an extractor payload into path-joined keys.
///
/// Nested objects join with `_`; array elements add their index as a segment,
/// so `{"blocks": [{"date": "x"}]}` becomes `blocks_0_date`.
pub fn flatten_fields(value: &Value) -> FieldMap {
    let mut fields = FieldMap::new();
    if value.is_object() || value.is_array() {
        flatten_into(&mut fields, "", value);
    }
    fields
}

fn flatten_into(fields: &mut FieldMap, prefix: &str, value: &Value) {
    match value {
        Value::Object(map) => {
            for (key, nested) in map {
                flatten_into(fields, &join_key(prefix, key), nested);
            }
        }
        Value::Array(items) => {
            for (index, nested) in items.iter().enumerate() {
                flatten_into(fields, &join_key(prefix, &index.to_string()), nested);
            }
        }
        Value::String(text) => {
            fields.insert(prefix.to_string(), text.clone());
        }
        Value::Null => {
            fields.insert(prefix.to_string(), "null".to_string());
        }
        Value::Bool(flag) => {
            fields.insert(prefix.to_string(), flag.to_string());
        }
        Value::Number(number) => {
            fields.insert(prefix.to_string(), number.to_string());
        }
    }
}

fn join_key(prefix: &str, key: &str) -> String {
    if prefix.is_empty() {
        key.to_string()
    } else {
        format!("{prefix}_{key}")
    }
}

/// Uppercased alphanumerics, used for document-number comparison.
pub fn normalize_identifier(value: &str) -> String {
    value
        .chars()
        .filter(char::is_ascii_alphanumeric)
        .map(|c| c.to_ascii_uppercase())
        .collect()
}
