use anyhow::Result;
use tracing::debug;

use crate::config::DirectoryConfig;
use crate::contacts::{self, Snapshot};
use crate::page::Page;
use crate::render::{self, RenderedView};
use crate::search::{self, FilterCriteria};

/// Live filter over one loaded phonebook page.
///
/// The snapshot is taken once in [`ContactDirectory::load`] and only read
/// afterwards; every input event re-derives the view from it.
pub struct ContactDirectory {
    snapshot: Snapshot,
    layout: DirectoryConfig,
    criteria: FilterCriteria,
}

impl ContactDirectory {
    pub fn load(page: &Page, layout: DirectoryConfig) -> Result<Self> {
        let snapshot = contacts::build_snapshot(page, &layout)?;
        Ok(Self::new(snapshot, layout))
    }

    pub fn new(snapshot: Snapshot, layout: DirectoryConfig) -> Self {
        Self {
            snapshot,
            layout,
            criteria: FilterCriteria::default(),
        }
    }

    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    #[cfg(test)]
    pub fn criteria(&self) -> &FilterCriteria {
        &self.criteria
    }

    /// Render for the current criteria (the initial view after load).
    pub fn view(&self) -> RenderedView {
        self.filter(&self.criteria)
    }

    /// Render for arbitrary criteria without changing the current ones.
    pub fn filter(&self, criteria: &FilterCriteria) -> RenderedView {
        let visible = search::filter(&self.snapshot, criteria);
        debug!(
            "filter {:?} / {:?}: {} of {} visible",
            criteria.search_text,
            criteria.organization,
            visible.len(),
            self.snapshot.len()
        );
        render::render(&visible, &self.layout)
    }

    /// Search text changed.
    pub fn set_search(&mut self, text: impl Into<String>) -> RenderedView {
        self.criteria.search_text = text.into();
        self.view()
    }

    /// Organization selection changed.
    pub fn set_organization(&mut self, organization: impl Into<String>) -> RenderedView {
        self.criteria.organization = organization.into();
        self.view()
    }

    pub fn clear(&mut self) -> RenderedView {
        self.criteria = FilterCriteria::default();
        self.view()
    }

    /// Names of the records visible under the current criteria.
    pub fn visible_names(&self) -> Vec<&str> {
        search::filter(&self.snapshot, &self.criteria)
            .into_iter()
            .map(|record| record.name())
            .collect()
    }
}
