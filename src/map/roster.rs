//! People listed next to the floor plan on the admin map page.

use anyhow::Result;
use scraper::{ElementRef, Selector};
use tracing::warn;

use crate::map::{PersonId, Point};
use crate::page::{selector_for, text_of, Page};

#[derive(Debug, Clone, PartialEq)]
pub struct RosterEntry {
    pub id: PersonId,
    pub name: String,
    pub title: String,
    pub department: String,
    pub coordinates: Option<Point>,
}

impl RosterEntry {
    /// Placed people get "find" and "remove" actions next to their name.
    pub fn is_placed(&self) -> bool {
        self.coordinates.is_some()
    }

    fn matches(&self, needle: &str) -> bool {
        self.name.to_lowercase().contains(needle)
            || self.title.to_lowercase().contains(needle)
            || self.department.to_lowercase().contains(needle)
    }
}

/// Parse every `.user-item` of the page. Items without an id are skipped,
/// and so are coordinates that do not parse (the person is then unplaced).
pub fn parse_roster(page: &Page) -> Result<Vec<RosterEntry>> {
    let name_sel = selector_for("strong")?;
    let title_sel = selector_for(".text-muted")?;
    let department_sel = selector_for("small:not(.text-muted)")?;

    let mut entries = Vec::new();
    for item in page.select(".user-item")? {
        let element = item.value();
        let Some(id) = element.attr("data-user-id").and_then(|raw| PersonId::new(raw).ok()) else {
            warn!("roster item without a usable data-user-id skipped");
            continue;
        };

        let coordinates = match element.attr("data-coordinates").map(str::trim) {
            None | Some("") => None,
            Some(raw) => match raw.parse::<Point>() {
                Ok(point) => Some(point),
                Err(err) => {
                    warn!("ignoring coordinates of {}: {:#}", id, err);
                    None
                }
            },
        };

        entries.push(RosterEntry {
            name: first_text(item, &name_sel),
            title: first_text(item, &title_sel),
            department: first_text(item, &department_sel),
            id,
            coordinates,
        });
    }
    Ok(entries)
}

fn first_text(item: ElementRef<'_>, selector: &Selector) -> String {
    item.select(selector).next().map(text_of).unwrap_or_default()
}

/// Case-insensitive substring search over name, title and department.
pub fn search<'a>(entries: &'a [RosterEntry], text: &str) -> Vec<&'a RosterEntry> {
    let needle = text.to_lowercase();
    entries.iter().filter(|entry| entry.matches(&needle)).collect()
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) const ADMIN_PAGE: &str = r#"<!DOCTYPE html>
<html><head><meta name="csrf-token" content="tok-1"></head>
<body>
  <input id="user-search">
  <div class="user-item" data-user-id="41" data-coordinates="120,80">
    <strong>Иванов Иван</strong>
    <small class="text-muted">Инженер</small>
    <small>ИТ</small>
    <div class="btn-group"><button class="btn-place"></button></div>
  </div>
  <div class="user-item" data-user-id="42" data-coordinates="">
    <strong>Петров Пётр</strong>
    <small class="text-muted">Бухгалтер</small>
    <small>Финансы</small>
  </div>
  <div class="user-item" data-user-id="43" data-coordinates="oops">
    <strong>Anna Smith</strong>
    <small class="text-muted">Manager</small>
    <small>Sales</small>
  </div>
  <div class="user-item"><strong>Nobody</strong></div>
  <div id="map-container"><img id="building-plan"><div id="user-markers"></div></div>
</body></html>"#;

    fn roster() -> Vec<RosterEntry> {
        parse_roster(&Page::parse(ADMIN_PAGE)).unwrap()
    }

    #[test]
    fn test_parse_roster_entries() {
        let roster = roster();
        assert_eq!(roster.len(), 3);
        let first = &roster[0];
        assert_eq!(first.id.to_string(), "41");
        assert_eq!(first.name, "Иванов Иван");
        assert_eq!(first.title, "Инженер");
        assert_eq!(first.department, "ИТ");
        assert_eq!(first.coordinates, Some(Point::new(120.0, 80.0)));
        assert!(first.is_placed());
    }

    #[test]
    fn test_empty_and_bad_coordinates_mean_unplaced() {
        let roster = roster();
        assert_eq!(roster[1].coordinates, None);
        assert_eq!(roster[2].coordinates, None);
        assert!(!roster[2].is_placed());
    }

    #[test]
    fn test_search_by_name_title_department() {
        let roster = roster();
        let ids = |text: &str| -> Vec<String> {
            search(&roster, text)
                .into_iter()
                .map(|e| e.id.to_string())
                .collect()
        };
        assert_eq!(ids("ПЕТР"), vec!["42"]);
        assert_eq!(ids("manager"), vec!["43"]);
        assert_eq!(ids("ит"), vec!["41"]);
        assert_eq!(ids(""), vec!["41", "42", "43"]);
        assert!(ids("zzz").is_empty());
    }
}
