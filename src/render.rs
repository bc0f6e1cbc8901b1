//! Rebuild of the visible contact list.
//!
//! Every update produces a brand-new container from the visible records;
//! nothing is diffed against the previous view. Cost is linear in the
//! number of visible cards per update, which is fine for a phonebook but is
//! the first thing to revisit for lists in the tens of thousands.

use crate::config::DirectoryConfig;
use crate::contacts::ContactRecord;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedView {
    /// Replacement container holding the visible cards
    pub html: String,
    pub visible_count: usize,
    pub counter_text: String,
    pub show_no_results: bool,
}

pub fn render(visible: &[&ContactRecord], layout: &DirectoryConfig) -> RenderedView {
    let mut html = format!(r#"<div class="row" id="{}">"#, layout.container_id);
    for record in visible {
        html.push_str(&format!(r#"<div class="{}">"#, layout.column_class));
        html.push_str(record.markup());
        html.push_str("</div>");
    }
    html.push_str("</div>");

    RenderedView {
        html,
        visible_count: visible.len(),
        counter_text: counter_text(&layout.counter_label, visible.len()),
        show_no_results: visible.is_empty(),
    }
}

pub fn counter_text(label: &str, count: usize) -> String {
    format!("{}: {}", label, count)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_wraps_each_card_in_order() {
        let a = ContactRecord::new("<div class=\"contact-card\">A</div>");
        let b = ContactRecord::new("<div class=\"contact-card\">B</div>");
        let view = render(&[&a, &b], &DirectoryConfig::default());
        assert_eq!(
            view.html,
            concat!(
                r#"<div class="row" id="contacts-cards-container">"#,
                r#"<div class="col-md-6 col-lg-4 mb-4"><div class="contact-card">A</div></div>"#,
                r#"<div class="col-md-6 col-lg-4 mb-4"><div class="contact-card">B</div></div>"#,
                "</div>"
            )
        );
        assert_eq!(view.visible_count, 2);
        assert_eq!(view.counter_text, "Найдено контактов: 2");
        assert!(!view.show_no_results);
    }

    #[test]
    fn test_render_empty() {
        let view = render(&[], &DirectoryConfig::default());
        assert_eq!(view.html, r#"<div class="row" id="contacts-cards-container"></div>"#);
        assert_eq!(view.visible_count, 0);
        assert_eq!(view.counter_text, "Найдено контактов: 0");
        assert!(view.show_no_results);
    }

    #[test]
    fn test_render_uses_configured_layout() {
        let layout = DirectoryConfig {
            container_id: "cards".into(),
            column_class: "col".into(),
            counter_label: "Found".into(),
            ..DirectoryConfig::default()
        };
        let a = ContactRecord::new("<p>A</p>");
        let view = render(&[&a], &layout);
        assert_eq!(view.html, r#"<div class="row" id="cards"><div class="col"><p>A</p></div></div>"#);
        assert_eq!(view.counter_text, "Found: 1");
    }
}
