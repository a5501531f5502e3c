//! Error types for indicator ingestion and persistence.
//!
//! Parsing and normalization never fail: unreadable values degrade to unset
//! fields. The only errors that surface come from the record store and from
//! decoding externally supplied payloads.

use serde::de::DeserializeOwned;
use serde_json::error::Category;
use thiserror::Error;

/// Failure reported by a [`crate::store::RecordStore`].
///
/// "Not found" is kept apart from storage failures so callers can report the
/// two differently.
///
/// # Examples
///
/// ```
/// use indicator_core::StoreError;
///
/// let err = StoreError::not_found("indicator", "42");
/// assert!(err.is_not_found());
/// assert_eq!(err.to_string(), "indicator not found: 42");
/// ```
#[derive(Error, Debug)]
pub enum StoreError {
    /// No record with the given id.
    #[error("{entity} not found: {id}")]
    NotFound {
        /// Record kind ("indicator" or "organization").
        entity: &'static str,
        /// Requested id.
        id: String,
    },

    /// Reading or writing the backing file failed.
    #[error("Store IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The backing file could not be encoded or decoded.
    #[error("Store JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl StoreError {
    /// Shorthand for [`StoreError::NotFound`].
    #[inline]
    #[must_use]
    pub fn not_found(entity: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity,
            id: id.into(),
        }
    }

    /// Whether this is a missing-record error rather than a storage failure.
    #[inline]
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

/// Error raised by the ingest service and payload decoding.
#[derive(Error, Debug)]
pub enum IndicatorError {
    /// Propagated store failure.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Malformed JSON payload.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Well-formed JSON of the wrong shape (not an object, wrong field types,
    /// unknown enum values).
    #[error("Invalid payload: {0}")]
    InvalidPayload(String),
}

impl IndicatorError {
    /// Whether the underlying cause is a missing record.
    #[inline]
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Store(err) if err.is_not_found())
    }
}

/// Type alias for [`Result<T, IndicatorError>`].
pub type Result<T> = std::result::Result<T, IndicatorError>;

/// Decode a JSON payload, keeping syntax errors apart from shape errors.
pub(crate) fn decode_json<T: DeserializeOwned>(json: &str) -> Result<T> {
    serde_json::from_str(json).map_err(|err| match err.classify() {
        Category::Data => IndicatorError::InvalidPayload(err.to_string()),
        Category::Io | Category::Syntax | Category::Eof => IndicatorError::JsonError(err),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_display() {
        let error = StoreError::not_found("organization", "org-1");
        assert_eq!(error.to_string(), "organization not found: org-1");
        assert!(error.is_not_found());
    }

    #[test]
    fn test_io_error_is_not_not_found() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let store_err: StoreError = io_err.into();
        assert!(!store_err.is_not_found());
        assert!(store_err.to_string().starts_with("Store IO error"));
    }

    #[test]
    fn test_store_error_propagates_transparently() {
        fn inner() -> std::result::Result<(), StoreError> {
            Err(StoreError::not_found("indicator", "x"))
        }

        fn outer() -> Result<()> {
            inner()?;
            Ok(())
        }

        let err = outer().unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(err.to_string(), "indicator not found: x");
    }

    #[test]
    fn test_decode_json_syntax_error() {
        let err = decode_json::<serde_json::Value>("{ invalid json }").unwrap_err();
        assert!(matches!(err, IndicatorError::JsonError(_)));
        assert!(!err.is_not_found());
    }

    #[test]
    fn test_decode_json_shape_error() {
        let err = decode_json::<std::collections::HashMap<String, String>>("[1, 2]").unwrap_err();
        assert!(matches!(err, IndicatorError::InvalidPayload(_)));
        assert!(err.to_string().starts_with("Invalid payload: "));
    }

    #[test]
    fn test_error_size() {
        use std::mem::size_of;
        let size = size_of::<IndicatorError>();
        assert!(
            size < 256,
            "IndicatorError size is {size} bytes, consider boxing large variants"
        );
    }
}
