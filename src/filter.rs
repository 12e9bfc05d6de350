use std::collections::BTreeMap;

use crate::models::{FieldValue, Intern, Person, BOOL_COLUMNS};

/// Sentinel accepted by the status/type filters meaning "no filter".
pub const ALL: &str = "all";

/// Free-text match: name or email case-insensitively contain the query,
/// or the phone number contains it verbatim.
pub fn matches_search(intern: &Intern, query: &str) -> bool {
    let needle = query.to_lowercase();
    intern.intern_name.to_lowercase().contains(&needle)
        || intern.email.to_lowercase().contains(&needle)
        || intern.phone_number.contains(query)
}

pub fn matches_status(intern: &Intern, status: &str) -> bool {
    status == ALL || intern.internship_status.as_str() == status
}

pub fn matches_type(intern: &Intern, kind: &str) -> bool {
    kind == ALL || intern.internship_type.as_str() == kind
}

/// Visible subset under the search/status/type variant. Order is
/// preserved; an empty query and "all" filters return every record.
pub fn filter_interns<'a>(
    interns: &'a [Intern],
    query: &str,
    status: &str,
    kind: &str,
) -> Vec<&'a Intern> {
    interns
        .iter()
        .filter(|intern| {
            matches_search(intern, query)
                && matches_status(intern, status)
                && matches_type(intern, kind)
        })
        .collect()
}

/// Per-column filter: empty matches, boolean columns compare Yes/No,
/// everything else is a case-insensitive substring match on the field's
/// string form.
pub fn matches_column(intern: &Intern, key: &str, filter: &str) -> bool {
    if filter.is_empty() {
        return true;
    }
    let Some(value) = intern.field(key) else {
        return false;
    };
    if BOOL_COLUMNS.contains(&key) {
        let wanted = filter.eq_ignore_ascii_case("yes");
        return value == FieldValue::Bool(wanted);
    }
    value
        .display()
        .to_lowercase()
        .contains(&filter.to_lowercase())
}

/// Visible subset under the per-column variant: search AND every active
/// column filter.
pub fn filter_interns_by_columns<'a>(
    interns: &'a [Intern],
    query: &str,
    filters: &BTreeMap<String, String>,
) -> Vec<&'a Intern> {
    interns
        .iter()
        .filter(|intern| {
            matches_search(intern, query)
                && filters
                    .iter()
                    .all(|(key, filter)| matches_column(intern, key, filter))
        })
        .collect()
}

pub fn filter_persons<'a>(persons: &'a [Person], query: &str) -> Vec<&'a Person> {
    let needle = query.to_lowercase();
    persons
        .iter()
        .filter(|person| person.name.to_lowercase().contains(&needle))
        .collect()
}

/// De-duplicated column values in order of first occurrence, rendered as
/// strings (booleans as Yes/No). Populates filter choice lists.
pub fn unique_values(interns: &[Intern], key: &str) -> Vec<String> {
    let mut seen = Vec::new();
    for intern in interns {
        if let Some(value) = intern.field(key) {
            let text = value.display();
            if !seen.contains(&text) {
                seen.push(text);
            }
        }
    }
    seen
}
