//! Contact snapshot taken from the phonebook listing page.

use std::collections::BTreeSet;

use anyhow::Result;
use tracing::{debug, warn};

use crate::config::DirectoryConfig;
use crate::page::{text_of, Page};

/// Searchable attributes every contact card publishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SearchField {
    Name,
    Email,
    Phone,
    Mobile,
    Title,
    Department,
    Organization,
}

impl SearchField {
    pub const ALL: [SearchField; 7] = [
        SearchField::Name,
        SearchField::Email,
        SearchField::Phone,
        SearchField::Mobile,
        SearchField::Title,
        SearchField::Department,
        SearchField::Organization,
    ];

    pub fn attribute(self) -> &'static str {
        match self {
            SearchField::Name => "data-name",
            SearchField::Email => "data-email",
            SearchField::Phone => "data-phone",
            SearchField::Mobile => "data-mobile",
            SearchField::Title => "data-title",
            SearchField::Department => "data-department",
            SearchField::Organization => "data-organization",
        }
    }

    fn index(self) -> usize {
        match self {
            SearchField::Name => 0,
            SearchField::Email => 1,
            SearchField::Phone => 2,
            SearchField::Mobile => 3,
            SearchField::Title => 4,
            SearchField::Department => 5,
            SearchField::Organization => 6,
        }
    }
}

/// One contact card: its markup, re-insertable verbatim, plus the values
/// the filter looks at. Missing attributes read as empty strings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactRecord {
    markup: String,
    fields: [String; 7],
}

impl ContactRecord {
    pub fn new(markup: impl Into<String>) -> Self {
        Self {
            markup: markup.into(),
            fields: Default::default(),
        }
    }

    pub fn with_field(mut self, field: SearchField, value: impl Into<String>) -> Self {
        self.fields[field.index()] = value.into();
        self
    }

    pub fn markup(&self) -> &str {
        &self.markup
    }

    pub fn field(&self, field: SearchField) -> &str {
        &self.fields[field.index()]
    }

    pub fn name(&self) -> &str {
        self.field(SearchField::Name)
    }

    pub fn organization(&self) -> &str {
        self.field(SearchField::Organization)
    }

    /// Fields in `SearchField::ALL` order.
    pub fn fields(&self) -> impl Iterator<Item = (SearchField, &str)> {
        SearchField::ALL
            .into_iter()
            .map(move |field| (field, self.field(field)))
    }
}

/// Immutable, document-ordered copy of every card on the page.
///
/// Filtering never touches the records; it derives a fresh visible subset
/// from them each time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Snapshot {
    records: Vec<ContactRecord>,
}

impl Snapshot {
    pub fn from_records(records: Vec<ContactRecord>) -> Self {
        Self { records }
    }

    pub fn records(&self) -> &[ContactRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Distinct non-empty organizations, sorted.
    pub fn organizations(&self) -> Vec<String> {
        self.records
            .iter()
            .map(|record| record.organization())
            .filter(|org| !org.is_empty())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .map(str::to_string)
            .collect()
    }
}

/// Read every contact card inside the configured container.
///
/// A page without the container has no contacts; that is logged and
/// otherwise not an error.
pub fn build_snapshot(page: &Page, layout: &DirectoryConfig) -> Result<Snapshot> {
    let container = format!("#{}", layout.container_id);
    if page.first(&container)?.is_none() {
        warn!("page has no `{}` element, contact list is empty", container);
        return Ok(Snapshot::default());
    }

    let cards = page.select(&format!("{} {}", container, layout.card_selector))?;
    let records: Vec<ContactRecord> = cards
        .into_iter()
        .map(|card| {
            let element = card.value();
            SearchField::ALL
                .into_iter()
                .fold(ContactRecord::new(card.html()), |record, field| {
                    let value = element.attr(field.attribute()).unwrap_or_default();
                    record.with_field(field, value)
                })
        })
        .collect();

    debug!("captured {} contact cards", records.len());
    Ok(Snapshot::from_records(records))
}

/// Organizations offered by the page's filter drop-down, falling back to
/// the ones present in the snapshot when the page has no drop-down.
pub fn organizations(page: &Page, snapshot: &Snapshot) -> Result<Vec<String>> {
    if page.first("#organizationFilter")?.is_none() {
        return Ok(snapshot.organizations());
    }

    let options = page.select("#organizationFilter option")?;
    Ok(options
        .into_iter()
        .map(|option| {
            option
                .value()
                .attr("value")
                .map(str::to_string)
                .unwrap_or_else(|| text_of(option))
        })
        .filter(|value| !value.is_empty())
        .collect())
}
