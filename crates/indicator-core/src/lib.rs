//! # Indicator Core - Indicator Record Model and Normalization
//!
//! Turns the key/value table of an indicator report into a typed indicator
//! record and links it to the organization that submitted it.
//!
//! ## Pipeline
//!
//! ```text
//! ParsedRecord ──► normalize ──► IndicatorData + OrgFields
//!                                     │             │
//!                                     │     organization::resolve
//!                                     ▼             ▼
//!                               RecordStore (indicators, organizations)
//! ```
//!
//! The table parser that produces [`ParsedRecord`] lives in `indicator-backend`.
//! Everything in this crate up to the store boundary is pure.
//!
//! ## Quick Start
//!
//! ```
//! use indicator_core::enums::Frequency;
//! use indicator_core::{keys, normalize, FieldValue, ParsedRecord};
//!
//! let record: ParsedRecord = [
//!     (keys::SHORT_NAME, FieldValue::from("Rainfall index")),
//!     (keys::FREQUENCY, FieldValue::from(vec!["Annually", "Other: Biannual"])),
//! ]
//! .into_iter()
//! .collect();
//!
//! let normalized = normalize(&record);
//! assert_eq!(normalized.indicator.short_name, "Rainfall index");
//! assert_eq!(normalized.indicator.frequency, Some(Frequency::Other));
//! assert_eq!(normalized.indicator.frequency_note.as_deref(), Some("Biannual"));
//! ```
//!
//! ## Modules
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`keys`] | Canonical field keys and [`keys::FieldKind`] |
//! | [`labels`] | Row label canonicalizer |
//! | [`record`] | [`ParsedRecord`] / [`FieldValue`] |
//! | [`enums`] | Closed enumerations and token dictionaries |
//! | [`coerce`] | Date, URL, list, integer and boolean coercion |
//! | [`normalize`](mod@normalize) | Record → typed indicator |
//! | [`organization`] | Organization model and identity resolution |
//! | [`store`] | [`RecordStore`], [`MemoryStore`], [`JsonFileStore`] |
//! | [`service`] | [`IndicatorService`] |
//! | [`view`] | Detail view and catalogue search |

pub mod coerce;
pub mod enums;
pub mod error;
pub mod indicator;
pub mod keys;
pub mod labels;
pub mod normalize;
pub mod organization;
pub mod record;
pub mod service;
pub mod store;
pub mod view;

pub use error::{IndicatorError, Result, StoreError};
pub use indicator::{Indicator, IndicatorData, IndicatorPatch};
pub use normalize::{normalize, Normalized};
pub use organization::{OrgFields, Organization};
pub use record::{FieldValue, ParsedRecord};
pub use service::IndicatorService;
pub use store::{JsonFileStore, MemoryStore, RecordStore};
pub use view::{IndicatorQuery, IndicatorView};
