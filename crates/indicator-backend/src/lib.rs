//! # Indicator Backend - Document Reading and Table Parsing
//!
//! Reads indicator report documents and turns the first table into a
//! [`ParsedRecord`](indicator_core::ParsedRecord).
//!
//! ## Architecture
//!
//! ```text
//! .docx ──► DocxConverter ──┐
//!                           ├──► markup ──► parse_first_table ──► ParsedRecord
//! .html ──► HtmlPassthrough ┘                    │
//!                                      labels::canonicalize + cell::extract_cell
//! ```
//!
//! Converters implement [`MarkupConverter`]; [`converter_for_path`] picks one
//! by file extension.
//!
//! ## Example
//!
//! ```
//! use indicator_backend::parse_first_table;
//! use indicator_core::keys;
//!
//! let html = "<table>\
//!     <tr><td>Indicator short name:</td><td>Rainfall index</td></tr>\
//!     <tr><td>Frequency</td><td><p>☒ Annually</p><p>☐ Quarterly</p></td></tr>\
//! </table>";
//! let record = parse_first_table(html);
//! assert_eq!(record.first(keys::SHORT_NAME), Some("Rainfall index"));
//! assert_eq!(record.values(keys::FREQUENCY), vec!["Annually"]);
//! ```

pub mod cell;
pub mod docx;
pub mod error;
pub mod table;
pub mod traits;

pub use docx::DocxConverter;
pub use error::{BackendError, Result};
pub use table::{parse_bytes, parse_file, parse_first_table};
pub use traits::{converter_for_path, HtmlPassthrough, InputFormat, MarkupConverter};
