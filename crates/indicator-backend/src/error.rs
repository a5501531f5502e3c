//! Error types for document-to-markup conversion.

use thiserror::Error;

/// Error raised while turning a document into markup.
///
/// Table parsing itself never fails; these errors only come from reading the
/// input document.
#[derive(Error, Debug)]
pub enum BackendError {
    /// File I/O error.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// The input is not a readable ZIP container.
    #[error("Invalid DOCX archive: {0}")]
    ArchiveError(String),

    /// A required part is missing from the container.
    #[error("Missing document part: {0}")]
    MissingPart(String),

    /// The document XML is malformed.
    #[error("XML error: {0}")]
    XmlError(String),

    /// No converter handles this input.
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),
}

impl From<zip::result::ZipError> for BackendError {
    #[inline]
    fn from(err: zip::result::ZipError) -> Self {
        Self::ArchiveError(err.to_string())
    }
}

impl From<quick_xml::Error> for BackendError {
    #[inline]
    fn from(err: quick_xml::Error) -> Self {
        Self::XmlError(err.to_string())
    }
}

/// Type alias for [`Result<T, BackendError>`].
pub type Result<T> = std::result::Result<T, BackendError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unsupported_format_display() {
        let error = BackendError::UnsupportedFormat("report.pdf".to_string());
        assert_eq!(error.to_string(), "Unsupported format: report.pdf");
    }

    #[test]
    fn test_missing_part_display() {
        let error = BackendError::MissingPart("word/document.xml".to_string());
        assert!(error.to_string().contains("word/document.xml"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: BackendError = io_err.into();
        match err {
            BackendError::IoError(e) => assert_eq!(e.kind(), std::io::ErrorKind::NotFound),
            _ => panic!("Expected IoError variant"),
        }
    }

    #[test]
    fn test_zip_error_conversion() {
        let err: BackendError = zip::result::ZipError::FileNotFound.into();
        assert!(matches!(err, BackendError::ArchiveError(_)));
    }
}
