//! HTML → visible text via `scraper`

use scraper::{ElementRef, Html, Node};

/// Elements whose text is never rendered
const HIDDEN_TAGS: &[&str] = &["script", "style", "template", "noscript"];

/// Extract the visible text of an HTML document
///
/// Every text node is trimmed, empty ones are dropped and the rest are
/// joined with newlines, in document order.
pub fn visible_text(html: &str) -> String {
    let doc = Html::parse_document(html);
    let mut lines = Vec::new();
    collect_text(doc.root_element(), &mut lines);
    lines.join("\n")
}

fn collect_text<'a>(element: ElementRef<'a>, lines: &mut Vec<&'a str>) {
    for child in element.children() {
        match child.value() {
            Node::Text(text) => {
                let trimmed = text.trim();
                if !trimmed.is_empty() {
                    lines.push(trimmed);
                }
            }
            Node::Element(el) if HIDDEN_TAGS.contains(&el.name()) => {}
            Node::Element(_) => {
                if let Some(child_ref) = ElementRef::wrap(child) {
                    collect_text(child_ref, lines);
                }
            }
            _ => {}
        }
    }
}
