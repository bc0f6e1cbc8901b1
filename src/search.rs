use crate::contacts::{ContactRecord, Snapshot};
use crate::translit;

/// What the user asked for: free text plus an exact organization.
/// Empty values mean "no constraint".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterCriteria {
    pub search_text: String,
    pub organization: String,
}

impl FilterCriteria {
    pub fn new(search_text: impl Into<String>, organization: impl Into<String>) -> Self {
        Self {
            search_text: search_text.into(),
            organization: organization.into(),
        }
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.search_text.is_empty() && self.organization.is_empty()
    }
}

/// Lowercased query and its keyboard-layout transliteration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Needles {
    pub text: String,
    pub translit: String,
}

/// `None` for an empty query, which matches everything.
pub fn needles(search_text: &str) -> Option<Needles> {
    if search_text.is_empty() {
        None
    } else {
        Some(Needles {
            text: search_text.to_lowercase(),
            translit: translit::transliterate(search_text),
        })
    }
}

pub fn matches(record: &ContactRecord, criteria: &FilterCriteria) -> bool {
    let search_ok = match needles(&criteria.search_text) {
        None => true,
        Some(needles) => record.fields().any(|(_, value)| {
            // Digits are unaffected by case folding, so phone fields go
            // through the same path as the rest.
            let value = value.to_lowercase();
            value.contains(&needles.text) || value.contains(&needles.translit)
        }),
    };

    let organization_ok =
        criteria.organization.is_empty() || record.organization() == criteria.organization;

    search_ok && organization_ok
}

/// Records matching `criteria`, in snapshot order.
pub fn filter<'a>(snapshot: &'a Snapshot, criteria: &FilterCriteria) -> Vec<&'a ContactRecord> {
    snapshot
        .records()
        .iter()
        .filter(|record| matches(record, criteria))
        .collect()
}
