//! Value-cell extraction.
//!
//! A value cell is read one of three ways depending on the row's canonical key
//! (see [`indicator_core::keys::field_kind`]): as cleaned text, as the list of
//! checked options of a checkbox group, or as an embedded image reference.

use indicator_core::keys::{self, FieldKind};
use indicator_core::FieldValue;
use regex::Regex;
use scraper::{ElementRef, Node, Selector};
use std::sync::LazyLock;

static PARAGRAPH_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("p, li").expect("Invalid paragraph selector"));
static IMAGE_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("img[src]").expect("Invalid image selector"));

/// `style="…"` / `style='…'` leaked into text.
static STYLE_ATTR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"style\s*=\s*(?:"[^"]*"|'[^']*')"#).expect("Invalid style attribute regex")
});
/// `style={{…}}` or a bare `{{…}}` object literal.
static STYLE_OBJECT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:style\s*=\s*)?\{\{[^}]*\}\}").expect("Invalid style object regex")
});
static BLANK_LINES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n(?:[ \t]*\n){2,}").expect("Invalid blank line regex"));

/// Leading check mark. A bare `x`/`X` only counts when followed by whitespace
/// or the end of the line.
static CHECKED_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:[☒☑✓✔■]\s*|\[[xX]\]\s*|[xX](?:\s+|$))(?P<rest>.*)$")
        .expect("Invalid checked line regex")
});
static OTHER_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^other\s*[:\-–]\s*").expect("Invalid other prefix regex"));

/// What a value cell produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedCell {
    /// Value stored under the row's own key.
    pub value: FieldValue,
    /// Image found in a communication-details cell, stored under
    /// [`keys::IMAGE`].
    pub image: Option<String>,
}

/// Read a value cell according to the field kind of `key`.
#[must_use]
pub fn extract_cell(key: &str, cell: ElementRef<'_>) -> ExtractedCell {
    match keys::field_kind(key) {
        FieldKind::Image => ExtractedCell {
            value: FieldValue::Text(first_image_src(cell).unwrap_or_else(|| cell_text(cell))),
            image: None,
        },
        FieldKind::CommunicationDetails => ExtractedCell {
            value: FieldValue::Text(cell_text(cell)),
            image: first_image_src(cell),
        },
        FieldKind::CheckboxGroup => ExtractedCell {
            value: FieldValue::List(extract_checked(cell)),
            image: None,
        },
        FieldKind::PlainText => ExtractedCell {
            value: FieldValue::Text(cell_text(cell)),
            image: None,
        },
    }
}

/// Cleaned text of a cell.
#[must_use]
pub fn cell_text(cell: ElementRef<'_>) -> String {
    clean_text(&plain_text(cell))
}

/// Source of the first `<img>` in the element, if any.
#[must_use]
pub fn first_image_src(element: ElementRef<'_>) -> Option<String> {
    element
        .select(&IMAGE_SELECTOR)
        .filter_map(|img| img.value().attr("src"))
        .map(str::trim)
        .find(|src| !src.is_empty())
        .map(ToString::to_string)
}

/// Normalize cell text: NBSP to space, leaked inline styles removed, runs of
/// blank lines collapsed to one, outer whitespace trimmed.
#[must_use]
pub fn clean_text(raw: &str) -> String {
    let text = raw.replace('\u{00A0}', " ");
    let text = STYLE_OBJECT.replace_all(&text, "");
    let text = STYLE_ATTR.replace_all(&text, "");
    let text = BLANK_LINES.replace_all(&text, "\n\n");
    text.trim().to_string()
}

/// Checked options of a checkbox group cell, in document order.
///
/// Candidate lines are the innermost `p`/`li` elements; a cell without any is
/// split on line breaks instead.
#[must_use]
pub fn extract_checked(cell: ElementRef<'_>) -> Vec<String> {
    let blocks: Vec<ElementRef<'_>> = cell
        .select(&PARAGRAPH_SELECTOR)
        .filter(|block| block.select(&PARAGRAPH_SELECTOR).next().is_none())
        .collect();

    let texts: Vec<String> = if blocks.is_empty() {
        vec![cell_text(cell)]
    } else {
        blocks.into_iter().map(cell_text).collect()
    };

    texts
        .iter()
        .flat_map(|text| text.lines())
        .filter_map(checked_option)
        .collect()
}

/// Option text of a checked line, or `None` for unchecked or empty lines.
#[must_use]
pub fn checked_option(line: &str) -> Option<String> {
    let line = line.trim();
    let rest = CHECKED_LINE.captures(line)?.name("rest")?.as_str();
    let option = OTHER_PREFIX.replace(rest.trim(), "");
    let option = option.trim();
    (!option.is_empty()).then(|| option.to_string())
}

/// `innerText`-style text of an element: block elements start new lines,
/// whitespace inside text nodes collapses, `<br>` is a hard line break.
#[must_use]
pub fn plain_text(element: ElementRef<'_>) -> String {
    let mut buffer = TextBuffer::default();
    collect_text(element, &mut buffer);
    buffer.out
}

fn collect_text(element: ElementRef<'_>, buffer: &mut TextBuffer) {
    for child in element.children() {
        if let Some(child_element) = ElementRef::wrap(child) {
            let name = child_element.value().name();
            match name {
                "br" => buffer.line_break(),
                "script" | "style" | "head" => {}
                _ => {
                    let gap = block_gap(name);
                    buffer.block(gap);
                    if matches!(name, "td" | "th") {
                        buffer.pending_space = true;
                    }
                    collect_text(child_element, buffer);
                    buffer.block(gap);
                }
            }
        } else if let Node::Text(text) = child.value() {
            buffer.push_text(text);
        }
    }
}

/// Newlines a block element puts around its content.
fn block_gap(name: &str) -> usize {
    match name {
        "p" | "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => 2,
        "div" | "li" | "ul" | "ol" | "tr" | "table" | "tbody" | "thead" | "tfoot"
        | "blockquote" | "section" | "article" => 1,
        _ => 0,
    }
}

#[derive(Default)]
struct TextBuffer {
    out: String,
    pending_breaks: usize,
    pending_space: bool,
}

impl TextBuffer {
    fn push_text(&mut self, text: &str) {
        for ch in text.chars() {
            if ch.is_ascii_whitespace() {
                self.pending_space = true;
            } else {
                self.flush();
                self.out.push(ch);
            }
        }
    }

    fn flush(&mut self) {
        if !self.out.is_empty() {
            if self.pending_breaks > 0 {
                for _ in 0..self.pending_breaks {
                    self.out.push('\n');
                }
            } else if self.pending_space && !self.out.ends_with('\n') {
                self.out.push(' ');
            }
        }
        self.pending_breaks = 0;
        self.pending_space = false;
    }

    fn block(&mut self, gap: usize) {
        if gap > 0 {
            self.pending_breaks = self.pending_breaks.max(gap);
            self.pending_space = false;
        }
    }

    fn line_break(&mut self) {
        self.pending_space = false;
        if self.pending_breaks > 0 {
            self.flush();
        }
        self.out.push('\n');
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use scraper::Html;

    /// Parse `inner` as the content of a single table cell and run `f` on it.
    fn with_cell<T>(inner: &str, f: impl FnOnce(ElementRef<'_>) -> T) -> T {
        let html = Html::parse_document(&format!("<table><tr><td>{inner}</td></tr></table>"));
        let selector = Selector::parse("td").unwrap();
        let cell = html.select(&selector).next().unwrap();
        f(cell)
    }

    #[test]
    fn test_clean_text_strips_styles_and_blank_lines() {
        let raw = "Hello\u{00A0}world style=\"color:red\"\n\n\n\nNext {{ color: 'red' }}line";
        assert_eq!(clean_text(raw), "Hello world \n\nNext line");
        assert_eq!(clean_text("  a style={{margin: 0}}b  "), "a b");
        assert_eq!(clean_text("a\n\nb"), "a\n\nb");
    }

    #[test]
    fn test_plain_text_paragraphs_and_breaks() {
        let text = with_cell("<p>First   line</p><p>Second<br />third</p>", plain_text);
        assert_eq!(text, "First line\n\nSecond\nthird");
    }

    #[test]
    fn test_plain_text_inline_elements_join() {
        let text = with_cell("Share of <b>households</b> in <i>zones</i>", plain_text);
        assert_eq!(text, "Share of households in zones");
    }

    #[test]
    fn test_checked_option_glyphs() {
        assert_eq!(checked_option("☒ National"), Some("National".to_string()));
        assert_eq!(checked_option("☑Regional"), Some("Regional".to_string()));
        assert_eq!(checked_option("✔ Local"), Some("Local".to_string()));
        assert_eq!(checked_option("[x] Website"), Some("Website".to_string()));
        assert_eq!(checked_option("X Blogs"), Some("Blogs".to_string()));
        assert_eq!(checked_option("☐ National"), None);
        assert_eq!(checked_option("Xylophone"), None);
        assert_eq!(checked_option("National"), None);
    }

    #[test]
    fn test_checked_option_other_prefix() {
        assert_eq!(checked_option("☒ Other: Biannual"), Some("Biannual".to_string()));
        assert_eq!(checked_option("☒ other - Radio"), Some("Radio".to_string()));
        assert_eq!(checked_option("☒ Other:"), None);
        assert_eq!(checked_option("☒ Other"), Some("Other".to_string()));
        assert_eq!(checked_option("☒"), None);
    }

    #[test]
    fn test_extract_checked_from_paragraphs() {
        let checked = with_cell(
            "<p>☒ National</p><p>☐ Regional</p><p>☒ Local</p><p>☒ Local</p>",
            extract_checked,
        );
        assert_eq!(checked, vec!["National", "Local", "Local"]);
    }

    #[test]
    fn test_extract_checked_mixed_markers() {
        let checked = with_cell("<p>☒ Water</p><p>Energy</p><p>[x] Land</p>", extract_checked);
        assert_eq!(checked, vec!["Water", "Land"]);
    }

    #[test]
    fn test_extract_checked_from_list_items() {
        let checked = with_cell(
            "<ul><li>☐ Website</li><li>☒ X (Twitter)</li></ul>",
            extract_checked,
        );
        assert_eq!(checked, vec!["X (Twitter)"]);
    }

    #[test]
    fn test_extract_checked_falls_back_to_lines() {
        let checked = with_cell("☒ Yes<br />☐ No", extract_checked);
        assert_eq!(checked, vec!["Yes"]);
    }

    #[test]
    fn test_extract_checked_splits_broken_paragraph() {
        let checked = with_cell("<p>☒ Annually<br />☒ Other: Biannual</p>", extract_checked);
        assert_eq!(checked, vec!["Annually", "Biannual"]);
    }

    #[test]
    fn test_extract_cell_image_and_fallback() {
        let extracted = with_cell("<p><img src=\"data:image/png;base64,AA==\" /></p>", |cell| {
            extract_cell(keys::IMAGE, cell)
        });
        assert_eq!(
            extracted.value,
            FieldValue::Text("data:image/png;base64,AA==".to_string())
        );

        let extracted = with_cell("<p>see attachment</p>", |cell| extract_cell(keys::IMAGE, cell));
        assert_eq!(extracted.value, FieldValue::Text("see attachment".to_string()));
    }

    #[test]
    fn test_extract_cell_communication_details_with_image() {
        let extracted = with_cell(
            "<p>Posted 2024-03-01</p><p><img src=\"chart.png\" /></p>",
            |cell| extract_cell(keys::COMM_DETAILS, cell),
        );
        assert_eq!(extracted.value, FieldValue::Text("Posted 2024-03-01".to_string()));
        assert_eq!(extracted.image.as_deref(), Some("chart.png"));
    }

    #[test]
    fn test_extract_cell_plain_text_and_checkbox() {
        let extracted = with_cell("<p>  Rainfall index </p>", |cell| {
            extract_cell(keys::SHORT_NAME, cell)
        });
        assert_eq!(extracted.value, FieldValue::Text("Rainfall index".to_string()));
        assert_eq!(extracted.image, None);

        let extracted = with_cell("<p>☒ Quarterly</p>", |cell| extract_cell(keys::FREQUENCY, cell));
        assert_eq!(extracted.value, FieldValue::List(vec!["Quarterly".to_string()]));
    }

    proptest! {
        /// Property: extracted options are never empty and never start with whitespace.
        #[test]
        fn proptest_extract_checked_never_empty(
            lines in prop::collection::vec(
                (prop::sample::select(vec!["☒", "☐", "[x]", "X", "", "☑ "]), "[A-Za-z :\\-]{0,16}"),
                0..8,
            )
        ) {
            let inner: String = lines
                .iter()
                .map(|(glyph, text)| format!("<p>{glyph}{text}</p>"))
                .collect();
            let checked = with_cell(&inner, extract_checked);
            for option in &checked {
                prop_assert!(!option.is_empty());
                prop_assert_eq!(option.trim(), option.as_str());
            }
        }
    }
}
