//! Server-rendered page access.
//!
//! Both the phonebook listing and the admin floor-plan page are rendered on
//! the server; everything this tool knows about contacts and placements is
//! read back from that markup.

use std::fs;
use std::path::Path;

use anyhow::{anyhow, Context, Result};
use scraper::{ElementRef, Html, Selector};

pub struct Page {
    document: Html,
}

impl Page {
    pub fn parse(html: &str) -> Self {
        Self {
            document: Html::parse_document(html),
        }
    }

    pub fn read(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read page at {}", path.display()))?;
        Ok(Self::parse(&raw))
    }

    /// All elements matching `selector`, in document order.
    pub fn select(&self, selector: &str) -> Result<Vec<ElementRef<'_>>> {
        let selector = selector_for(selector)?;
        Ok(self.document.select(&selector).collect())
    }

    /// First element matching `selector`, if any.
    pub fn first(&self, selector: &str) -> Result<Option<ElementRef<'_>>> {
        let selector = selector_for(selector)?;
        Ok(self.document.select(&selector).next())
    }

    /// CSRF token published by the page in `<meta name="csrf-token">`.
    /// Empty when the page has none; the server decides whether that is valid.
    pub fn csrf_token(&self) -> String {
        self.first(r#"meta[name="csrf-token"]"#)
            .ok()
            .flatten()
            .and_then(|meta| meta.value().attr("content"))
            .unwrap_or_default()
            .to_string()
    }
}

pub fn selector_for(selector: &str) -> Result<Selector> {
    Selector::parse(selector).map_err(|err| anyhow!("invalid selector `{}`: {}", selector, err))
}

/// Text content of an element with runs of whitespace collapsed.
pub fn text_of(element: ElementRef<'_>) -> String {
    element
        .text()
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}
