//! Core trait definitions for markup converters

use crate::docx::DocxConverter;
use crate::error::{BackendError, Result};
use std::path::Path;

/// Input formats the pipeline can read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputFormat {
    /// Word Open XML document.
    Docx,
    /// HTML, taken as already-converted markup.
    Html,
}

impl InputFormat {
    /// Detect the format from a file extension (case-insensitive).
    #[must_use]
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "docx" => Some(Self::Docx),
            "html" | "htm" => Some(Self::Html),
            _ => None,
        }
    }
}

/// Turns document bytes into HTML-like markup for the table parser.
///
/// Converters emit tables as `table`/`tr`/`td`, checkbox lines as `p` or `li`
/// elements and images as `<img src=…>`.
pub trait MarkupConverter: Send + Sync {
    /// Format this converter handles.
    fn format(&self) -> InputFormat;

    /// Convert document bytes to markup.
    ///
    /// # Errors
    /// Returns an error if the bytes are not a readable document of this format.
    fn to_markup(&self, bytes: &[u8]) -> Result<String>;

    /// Convert the document at `path` to markup.
    ///
    /// # Errors
    /// Returns an error if file reading or conversion fails.
    fn file_to_markup(&self, path: &Path) -> Result<String> {
        let bytes = std::fs::read(path)?;
        self.to_markup(&bytes)
    }
}

/// Converter for input that is already HTML.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HtmlPassthrough;

impl MarkupConverter for HtmlPassthrough {
    #[inline]
    fn format(&self) -> InputFormat {
        InputFormat::Html
    }

    fn to_markup(&self, bytes: &[u8]) -> Result<String> {
        Ok(String::from_utf8_lossy(bytes).into_owned())
    }
}

/// Pick a converter by file extension.
///
/// # Errors
/// Returns [`BackendError::UnsupportedFormat`] for extensions other than
/// `.docx`, `.html` and `.htm`.
pub fn converter_for_path(path: &Path) -> Result<Box<dyn MarkupConverter>> {
    match InputFormat::from_path(path) {
        Some(InputFormat::Docx) => Ok(Box::new(DocxConverter::new())),
        Some(InputFormat::Html) => Ok(Box::new(HtmlPassthrough)),
        None => Err(BackendError::UnsupportedFormat(path.display().to_string())),
    }
}
