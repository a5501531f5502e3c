//! DOCX (Microsoft Word) to HTML converter
//!
//! # Architecture
//!
//! Manual ZIP + XML parsing. DOCX files are ZIP archives containing:
//! - `word/document.xml`: Main content (paragraphs, tables, content controls)
//! - `word/_rels/document.xml.rels`: Relationships (images)
//! - `word/media/*`: Embedded images
//!
//! The output is deliberately simple HTML: paragraphs, line breaks, tables and
//! data-URI images. Styling, numbering and headers are not rendered; the table
//! parser only needs row/cell structure, one element per checkbox line and the
//! checkbox glyphs themselves.

use crate::error::{BackendError, Result};
use crate::traits::{InputFormat, MarkupConverter};
use base64::Engine;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::collections::HashMap;
use std::io::{Cursor, Read, Seek};
use zip::ZipArchive;

const DOCUMENT_PART: &str = "word/document.xml";
const RELATIONSHIPS_PART: &str = "word/_rels/document.xml.rels";

/// Checked box emitted for symbol-font and content-control checkboxes.
pub const CHECKED_GLYPH: char = '☒';
/// Unchecked box emitted for symbol-font and content-control checkboxes.
pub const UNCHECKED_GLYPH: char = '☐';

/// `w:sym w:char` codes (Wingdings and Unicode) that draw a checked box.
const CHECKED_SYMBOLS: &[&str] = &["F0FE", "F0FD", "F078", "F0FB", "00FE", "2612", "2611"];
/// `w:sym w:char` codes that draw an empty box.
const UNCHECKED_SYMBOLS: &[&str] = &["F0A8", "F06F", "F071", "00A8", "2610"];

/// Extract an attribute value by key from an element
#[inline]
fn get_attr(e: &BytesStart, key: &[u8]) -> Option<String> {
    e.attributes()
        .find(|a| a.as_ref().ok().map(|x| x.key.as_ref()) == Some(key))
        .and_then(std::result::Result::ok)
        .map(|attr| String::from_utf8_lossy(&attr.value).to_string())
}

/// Escape text for an HTML text node or a double-quoted attribute.
fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(ch),
        }
    }
    out
}

/// MIME type for an image path, by extension.
fn mime_type_from_path(path: &str) -> &'static str {
    let ext = path
        .rsplit('.')
        .next()
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();
    match ext.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "bmp" => "image/bmp",
        "tif" | "tiff" => "image/tiff",
        "svg" => "image/svg+xml",
        "webp" => "image/webp",
        "emf" => "image/emf",
        "wmf" => "image/wmf",
        _ => "application/octet-stream",
    }
}

fn symbol_glyph(code: &str) -> Option<char> {
    let code = code.to_ascii_uppercase();
    if CHECKED_SYMBOLS.contains(&code.as_str()) {
        Some(CHECKED_GLYPH)
    } else if UNCHECKED_SYMBOLS.contains(&code.as_str()) {
        Some(UNCHECKED_GLYPH)
    } else {
        None
    }
}

fn contains_checkbox_glyph(markup: &str) -> bool {
    markup.contains([CHECKED_GLYPH, UNCHECKED_GLYPH, '☑'])
}

fn read_part<R: Read + Seek>(archive: &mut ZipArchive<R>, name: &str) -> Result<Option<String>> {
    let Ok(mut part) = archive.by_name(name) else {
        return Ok(None);
    };
    let mut content = String::new();
    part.read_to_string(&mut content)?;
    Ok(Some(content))
}

/// Map relationship ids (e.g. `rId7`) to archive paths (e.g. `word/media/image1.png`).
///
/// External targets are skipped.
fn parse_relationships<R: Read + Seek>(
    archive: &mut ZipArchive<R>,
) -> Result<HashMap<String, String>> {
    let Some(xml_content) = read_part(archive, RELATIONSHIPS_PART)? else {
        return Ok(HashMap::new());
    };

    let mut relationships = HashMap::new();
    let mut reader = Reader::from_str(&xml_content);
    reader.trim_text(true);

    let mut buf = Vec::new();
    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Empty(e) | Event::Start(e)) if e.name().as_ref() == b"Relationship" => {
                let external = get_attr(&e, b"TargetMode").is_some_and(|m| m == "External");
                if let (false, Some(id), Some(target)) =
                    (external, get_attr(&e, b"Id"), get_attr(&e, b"Target"))
                {
                    let path = match target.strip_prefix('/') {
                        Some(absolute) => absolute.to_string(),
                        None => format!("word/{target}"),
                    };
                    relationships.insert(id, path);
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(BackendError::XmlError(format!(
                    "Error parsing relationships: {e}"
                )))
            }
            _ => {}
        }
        buf.clear();
    }

    Ok(relationships)
}

/// Converts DOCX bytes into simple HTML.
///
/// # Examples
///
/// ```no_run
/// use indicator_backend::{DocxConverter, MarkupConverter};
///
/// let bytes = std::fs::read("report.docx")?;
/// let html = DocxConverter::new().to_markup(&bytes)?;
/// assert!(html.contains("<table>"));
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DocxConverter;

impl DocxConverter {
    #[inline]
    #[must_use = "creates a DOCX converter"]
    pub const fn new() -> Self {
        Self
    }
}

impl MarkupConverter for DocxConverter {
    #[inline]
    fn format(&self) -> InputFormat {
        InputFormat::Docx
    }

    fn to_markup(&self, bytes: &[u8]) -> Result<String> {
        let mut archive = ZipArchive::new(Cursor::new(bytes))?;
        let relationships = parse_relationships(&mut archive)?;
        let document = read_part(&mut archive, DOCUMENT_PART)?
            .ok_or_else(|| BackendError::MissingPart(DOCUMENT_PART.to_string()))?;
        walk_body(&document, &relationships, &mut archive)
    }
}

/// Pending content-control checkbox: its state and where its glyph would go.
#[derive(Debug, Clone, Copy)]
struct PendingCheckbox {
    checked: bool,
    insert_at: Option<usize>,
}

/// Mutable state of one pass over `word/document.xml`.
#[derive(Debug, Default)]
struct MarkupWriter {
    out: String,
    run_depth: usize,
    in_text: bool,
    checkbox: Option<PendingCheckbox>,
}

impl MarkupWriter {
    fn handle_start(&mut self, e: &BytesStart) {
        match e.name().as_ref() {
            b"w:p" => self.out.push_str("<p>"),
            b"w:tbl" => self.out.push_str("<table>"),
            b"w:tr" => self.out.push_str("<tr>"),
            b"w:tc" => self.out.push_str("<td>"),
            b"w:r" => self.run_depth += 1,
            b"w:t" => self.in_text = true,
            b"w:sdtContent" => {
                if let Some(pending) = self.checkbox.as_mut() {
                    pending.insert_at = Some(self.out.len());
                }
            }
            _ => self.handle_marker(e),
        }
    }

    /// Self-closing elements, and start tags whose content does not matter.
    fn handle_marker(&mut self, e: &BytesStart) {
        match e.name().as_ref() {
            b"w:br" | b"w:cr" if self.run_depth > 0 => self.out.push_str("<br />"),
            b"w:tab" if self.run_depth > 0 => self.out.push(' '),
            b"w:noBreakHyphen" if self.run_depth > 0 => self.out.push('-'),
            b"w:sym" => {
                if let Some(glyph) = get_attr(e, b"w:char").as_deref().and_then(symbol_glyph) {
                    self.out.push(glyph);
                }
            }
            b"w14:checked" => {
                let checked = get_attr(e, b"w14:val").map_or(true, |v| v == "1" || v == "true");
                self.checkbox = Some(PendingCheckbox {
                    checked,
                    insert_at: None,
                });
            }
            _ => {}
        }
    }

    fn handle_empty(&mut self, e: &BytesStart) {
        match e.name().as_ref() {
            b"w:p" => self.out.push_str("<p></p>"),
            b"w:tc" => self.out.push_str("<td></td>"),
            _ => self.handle_marker(e),
        }
    }

    fn handle_end(&mut self, name: &[u8]) {
        match name {
            b"w:p" => self.out.push_str("</p>"),
            b"w:tbl" => self.out.push_str("</table>"),
            b"w:tr" => self.out.push_str("</tr>"),
            b"w:tc" => self.out.push_str("</td>"),
            b"w:r" => self.run_depth = self.run_depth.saturating_sub(1),
            b"w:t" => self.in_text = false,
            b"w:sdt" => self.finish_checkbox(),
            _ => {}
        }
    }

    fn handle_text(&mut self, text: &str) {
        if self.in_text {
            self.out.push_str(&escape_html(text));
        }
    }

    fn embed_image<R: Read + Seek>(
        &mut self,
        archive: &mut ZipArchive<R>,
        relationships: &HashMap<String, String>,
        rel_id: &str,
    ) {
        if let Some(src) = image_data_uri(archive, relationships, rel_id) {
            self.out.push_str("<img src=\"");
            self.out.push_str(&escape_html(&src));
            self.out.push_str("\" />");
        }
    }

    /// Emit the glyph of a content-control checkbox whose content had none.
    fn finish_checkbox(&mut self) {
        let Some(pending) = self.checkbox.take() else {
            return;
        };
        let Some(mut at) = pending.insert_at else {
            return;
        };
        if contains_checkbox_glyph(&self.out[at..]) {
            return;
        }
        if self.out[at..].starts_with("<p>") {
            at += "<p>".len();
        }
        let glyph = if pending.checked {
            CHECKED_GLYPH
        } else {
            UNCHECKED_GLYPH
        };
        self.out.insert(at, glyph);
    }
}

/// Relationship id of a DrawingML or VML image reference.
fn image_relationship(e: &BytesStart) -> Option<String> {
    match e.name().as_ref() {
        b"a:blip" => get_attr(e, b"r:embed"),
        b"v:imagedata" => get_attr(e, b"r:id"),
        _ => None,
    }
}

/// Read an embedded image as a data URI.
fn image_data_uri<R: Read + Seek>(
    archive: &mut ZipArchive<R>,
    relationships: &HashMap<String, String>,
    rel_id: &str,
) -> Option<String> {
    let Some(media_path) = relationships.get(rel_id) else {
        log::warn!("Image relationship {rel_id} not found");
        return None;
    };
    let mut image_bytes = Vec::new();
    match archive.by_name(media_path) {
        Ok(mut image_file) => {
            if let Err(e) = image_file.read_to_end(&mut image_bytes) {
                log::warn!("Failed to read image {media_path}: {e}");
                return None;
            }
        }
        Err(e) => {
            log::warn!("Image file {media_path} not found: {e}");
            return None;
        }
    }
    let encoded = base64::engine::general_purpose::STANDARD.encode(&image_bytes);
    Some(format!(
        "data:{};base64,{encoded}",
        mime_type_from_path(media_path)
    ))
}

fn walk_body<R: Read + Seek>(
    xml_content: &str,
    relationships: &HashMap<String, String>,
    archive: &mut ZipArchive<R>,
) -> Result<String> {
    let mut writer = MarkupWriter::default();
    let mut reader = Reader::from_str(xml_content);
    // DOCX marks significant whitespace with xml:space="preserve"
    reader.trim_text(false);

    let mut buf = Vec::new();
    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => match image_relationship(&e) {
                Some(rel_id) => writer.embed_image(archive, relationships, &rel_id),
                None => writer.handle_start(&e),
            },
            Ok(Event::Empty(e)) => match image_relationship(&e) {
                Some(rel_id) => writer.embed_image(archive, relationships, &rel_id),
                None => writer.handle_empty(&e),
            },
            Ok(Event::Text(e)) => {
                let text = e.unescape().unwrap_or_default();
                writer.handle_text(&text);
            }
            Ok(Event::End(e)) => writer.handle_end(e.name().as_ref()),
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(BackendError::XmlError(format!(
                    "Error parsing document.xml: {e}"
                )));
            }
            _ => {}
        }
        buf.clear();
    }

    Ok(writer.out)
}
