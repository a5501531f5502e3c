//! Canonical field keys of the indicator template table.
//!
//! Every row label recognized by [`crate::labels::canonicalize`] resolves to one of
//! these constants. The strings are the labels used by the current revision of the
//! Word template, so a document produced from that template needs no aliasing.

/// Indicator footprint (checkbox group).
pub const FOOTPRINT: &str = "Indicator Footprint";
/// Indicator thematic areas (checkbox group).
pub const THEMATIC_AREAS: &str = "Indicator thematic areas";
/// Indicator category (checkbox group, unknown tokens overflow into a note).
pub const INDICATOR_CATEGORY: &str = "Indicator category";
/// Type of data (checkbox group).
pub const TYPE_OF_DATA: &str = "Type of Data";
/// Data nature: quantitative / qualitative / both (checkbox group, single value used).
pub const DATA_TYPE: &str = "Data type";
/// Groups supported with data (checkbox group).
pub const GROUPS_SUPPORTED: &str = "Groups supported with data";
/// Purpose of data (checkbox group).
pub const PURPOSE_OF_DATA: &str = "Purpose of data";
/// Target audience (checkbox group, kept in the parsed record only).
pub const TARGET_AUDIENCE: &str = "Target audience";
/// Data replicability (checkbox group, kept in the parsed record only).
pub const DATA_REPLICABILITY: &str = "Data replicability";
/// Pre-analysis steps (checkbox group).
pub const PRE_ANALYSIS: &str = "Pre-analysis";
/// Data analysis methods (checkbox group).
pub const DATA_ANALYSIS: &str = "Data analysis";
/// Result validation (checkbox group).
pub const RESULT_VALIDATION: &str = "Result Validation";
/// Update frequency (checkbox group).
pub const FREQUENCY: &str = "Frequency";
/// Channels where the data is communicated (checkbox group).
pub const COMM_CHANNELS: &str = "Data communicated in the public space";
/// Public sharing consent (yes/no checkbox group).
pub const PUBLIC_SHARING_CONSENT: &str = "Public sharing consent";
/// Frequent information updates (yes/no checkbox group).
pub const FREQUENT_UPDATES: &str = "Frequent information updates";
/// Web scraping approval (yes/no checkbox group). The template misspells it.
pub const WEB_SCRAPING_APPROVAL: &str = "WebScrapping approval";
/// Dashboard usage (yes/no checkbox group).
pub const DASHBOARD_USAGE: &str = "Dashboard usage";

/// Indicator short name.
pub const SHORT_NAME: &str = "Indicator Short Name";
/// Free-text description.
pub const DESCRIPTION: &str = "Description";
/// Countries, delimited free text.
pub const COUNTRIES: &str = "Countries";
/// Links to collected data, delimited free text.
pub const LINKS_TO_DATA: &str = "Links to collected data";
/// First year the indicator was collected.
pub const YEAR_START: &str = "Indicator year start";
/// Methodology, free text.
pub const METHODOLOGY: &str = "Methodology";
/// Limitations, free text.
pub const LIMITATIONS: &str = "Limitations";

/// Communication details: free text that may embed a date, a link and an image.
pub const COMM_DETAILS: &str = "Communication Details";
/// Explicit communication date.
pub const COMM_DATE: &str = "Communication Date";
/// Explicit communication link.
pub const COMM_LINK: &str = "Communication link";
/// Indicator image reference.
pub const IMAGE: &str = "Indicator Image";

/// Organization natural identifier.
pub const ORG_CODE: &str = "Organization ID";
/// Organization full name.
pub const ORG_NAME: &str = "Organization Full Name";
/// Organization contact person.
pub const ORG_CONTACT_NAME: &str = "Organization contact name";
/// Organization contact email.
pub const ORG_CONTACT_EMAIL: &str = "Organization contact email";
/// Organization website.
pub const ORG_WEBSITE: &str = "Organization website";

/// Keys whose value cell is a group of checkbox lines.
pub const CHECKBOX_FIELDS: &[&str] = &[
    FOOTPRINT,
    THEMATIC_AREAS,
    INDICATOR_CATEGORY,
    TYPE_OF_DATA,
    DATA_TYPE,
    GROUPS_SUPPORTED,
    PURPOSE_OF_DATA,
    TARGET_AUDIENCE,
    DATA_REPLICABILITY,
    PRE_ANALYSIS,
    DATA_ANALYSIS,
    RESULT_VALIDATION,
    FREQUENCY,
    COMM_CHANNELS,
    PUBLIC_SHARING_CONSENT,
    FREQUENT_UPDATES,
    WEB_SCRAPING_APPROVAL,
    DASHBOARD_USAGE,
];

/// How the value cell of a row is read.
///
/// Decided once per canonical key by [`field_kind`]; the cell extractor branches on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKind {
    /// Cell holds an embedded image; its source is the value.
    Image,
    /// Free text that may also carry an image stored under [`IMAGE`].
    CommunicationDetails,
    /// Checkbox lines; the checked options are the value.
    CheckboxGroup,
    /// Anything else: cleaned text.
    PlainText,
}

/// Resolve the [`FieldKind`] for a canonical key.
///
/// Passthrough (unrecognized) keys are always [`FieldKind::PlainText`].
#[must_use]
pub fn field_kind(key: &str) -> FieldKind {
    if key == IMAGE {
        FieldKind::Image
    } else if key == COMM_DETAILS {
        FieldKind::CommunicationDetails
    } else if CHECKBOX_FIELDS.contains(&key) {
        FieldKind::CheckboxGroup
    } else {
        FieldKind::PlainText
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_kind_dispatch() {
        assert_eq!(field_kind(IMAGE), FieldKind::Image);
        assert_eq!(field_kind(COMM_DETAILS), FieldKind::CommunicationDetails);
        assert_eq!(field_kind(FOOTPRINT), FieldKind::CheckboxGroup);
        assert_eq!(field_kind(DASHBOARD_USAGE), FieldKind::CheckboxGroup);
        assert_eq!(field_kind(DESCRIPTION), FieldKind::PlainText);
        assert_eq!(field_kind("Some ad hoc label"), FieldKind::PlainText);
    }

    #[test]
    fn test_checkbox_fields_are_unique() {
        let mut seen = std::collections::HashSet::new();
        for key in CHECKBOX_FIELDS {
            assert!(seen.insert(*key), "duplicate checkbox key {key}");
        }
    }
}
