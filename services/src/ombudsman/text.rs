//! Plain-text rendering of the rich-text replies staff write.

use scraper::{ElementRef, Html};

const BLOCKS: &[&str] = &[
    "p", "div", "h1", "h2", "h3", "h4", "h5", "h6", "ul", "ol", "blockquote", "pre", "table", "tr",
];
const MEDIA: &[&str] = &["img", "picture", "video", "audio", "iframe", "object", "embed", "svg"];

/// Converts reply HTML into readable plain text.
///
/// Paragraphs and block elements become blank-line separated, `<br>` becomes a
/// newline, list items become `- ` bullets. Remaining tags are dropped, entities
/// decoded by the parser and whitespace normalised.
pub fn html_to_text(html: &str) -> String {
    let fragment = Html::parse_fragment(html);
    let mut raw = String::new();
    render(fragment.root_element(), &mut raw);

    let mut lines: Vec<String> = Vec::new();
    for line in raw.lines() {
        let line = line.split_whitespace().collect::<Vec<_>>().join(" ");
        // At most one blank line in a row, none leading.
        if line.is_empty() && lines.last().map_or(true, |last| last.is_empty()) {
            continue;
        }
        lines.push(line);
    }
    while lines.last().is_some_and(|last| last.is_empty()) {
        lines.pop();
    }

    lines.join("\n")
}

fn render(element: ElementRef<'_>, out: &mut String) {
    for child in element.children() {
        if let Some(text) = child.value().as_text() {
            // Source newlines are insignificant in HTML; only tags produce breaks.
            out.extend(text.chars().map(|c| if c.is_whitespace() { ' ' } else { c }));
            continue;
        }
        let Some(child) = ElementRef::wrap(child) else {
            continue;
        };

        match child.value().name() {
            "script" | "style" => {}
            "br" => out.push('\n'),
            "li" => {
                out.push_str("\n- ");
                render(child, out);
            }
            name if BLOCKS.contains(&name) => {
                out.push('\n');
                render(child, out);
                out.push_str("\n\n");
            }
            _ => render(child, out),
        }
    }
}

/// True when the reply still says something once markup is removed.
pub fn has_visible_content(html: &str) -> bool {
    !html_to_text(html).is_empty()
}

/// True when a submitted reply carries nothing worth storing: no text and no
/// embedded media.
pub fn is_blank_reply(html: &str) -> bool {
    if html.trim().is_empty() {
        return true;
    }
    if has_visible_content(html) {
        return false;
    }

    let fragment = Html::parse_fragment(html);
    !fragment
        .root_element()
        .descendants()
        .filter_map(ElementRef::wrap)
        .any(|el| MEDIA.contains(&el.value().name()))
}
