//! First-table parser: label/value rows to a [`ParsedRecord`].

use crate::cell::{cell_text, extract_cell};
use crate::error::Result;
use crate::traits::{converter_for_path, MarkupConverter};
use indicator_core::{keys, labels, ParsedRecord};
use scraper::{ElementRef, Html, Selector};
use std::path::Path;
use std::sync::LazyLock;

static TABLE_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("table").expect("Invalid table selector"));

/// Parse the first table of `html` into a record.
///
/// Each row with at least two cells contributes one entry: the first cell is
/// the label, the second the value. Rows with a blank label are skipped, and a
/// later row overwrites an earlier one with the same canonical key. A document
/// without a table yields an empty record.
#[must_use]
pub fn parse_first_table(html: &str) -> ParsedRecord {
    let document = Html::parse_document(html);
    let mut record = ParsedRecord::new();

    let Some(table) = document.select(&TABLE_SELECTOR).next() else {
        log::debug!("No table found in markup");
        return record;
    };

    for (index, row) in get_direct_rows(&table).iter().enumerate() {
        let cells = get_direct_cells(row);
        let [label_cell, value_cell, ..] = cells.as_slice() else {
            log::debug!("Skipping row {index}: fewer than two cells");
            continue;
        };

        let label = cell_text(*label_cell);
        if label.is_empty() {
            log::debug!("Skipping row {index}: empty label");
            continue;
        }

        let key = labels::canonicalize(&label);
        let extracted = extract_cell(&key, *value_cell);
        if let Some(image) = extracted.image {
            record.insert(keys::IMAGE, image);
        }
        if record.insert(key.clone(), extracted.value).is_some() {
            log::debug!("Row {index} overwrites earlier value for '{key}'");
        }
    }

    record
}

/// Convert document bytes with `converter` and parse the first table.
///
/// # Errors
/// Returns an error if the converter cannot read the document.
pub fn parse_bytes(converter: &dyn MarkupConverter, bytes: &[u8]) -> Result<ParsedRecord> {
    let markup = converter.to_markup(bytes)?;
    Ok(parse_first_table(&markup))
}

/// Read the file at `path`, picking the converter by extension, and parse
/// its first table.
///
/// # Errors
/// Returns an error for unsupported extensions, unreadable files or
/// malformed documents.
pub fn parse_file(path: &Path) -> Result<ParsedRecord> {
    let converter = converter_for_path(path)?;
    let markup = converter.file_to_markup(path)?;
    log::debug!("Converted {} to {} bytes of markup", path.display(), markup.len());
    Ok(parse_first_table(&markup))
}

/// Rows that belong to this table, not to tables nested in its cells.
///
/// Picks `<tr>` children directly and through `<thead>`/`<tbody>`/`<tfoot>`.
fn get_direct_rows<'a>(table: &ElementRef<'a>) -> Vec<ElementRef<'a>> {
    let mut rows = Vec::new();
    for child in table.children() {
        if let Some(child_element) = ElementRef::wrap(child) {
            match child_element.value().name() {
                "tr" => rows.push(child_element),
                "thead" | "tbody" | "tfoot" => {
                    for inner_child in child_element.children() {
                        if let Some(inner_element) = ElementRef::wrap(inner_child) {
                            if inner_element.value().name() == "tr" {
                                rows.push(inner_element);
                            }
                        }
                    }
                }
                _ => {}
            }
        }
    }
    rows
}

/// Direct `<td>`/`<th>` children of a row.
fn get_direct_cells<'a>(row: &ElementRef<'a>) -> Vec<ElementRef<'a>> {
    row.children()
        .filter_map(ElementRef::wrap)
        .filter(|cell| matches!(cell.value().name(), "td" | "th"))
        .collect()
}
