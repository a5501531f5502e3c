//! Field normalization: [`ParsedRecord`] → typed [`IndicatorData`].
//!
//! Pure and deterministic. Tokens the dictionaries do not know are dropped,
//! except indicator categories, which overflow into
//! [`IndicatorData::indicator_category_other`].

use crate::coerce::{bool_from_list, bool_from_text, find_date, find_url, parse_leading_int, split_list};
use crate::enums::{
    CommChannel, DataAnalysis, DataNature, Footprint, Frequency, IndicatorCategory, PreAnalysis,
    PublishStatus, Purpose, ResultValidation, SupportedGroup, ThematicArea, TypeOfData,
};
use crate::indicator::{IndicatorData, UNTITLED_INDICATOR};
use crate::keys;
use crate::organization::OrgFields;
use crate::record::{FieldValue, ParsedRecord};
use chrono::NaiveDate;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

static OTHER_LABEL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^other\s*[:\-–]?\s*").expect("Invalid other-label regex"));

/// Output of [`normalize`]: the indicator and, when present, its organization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Normalized {
    pub indicator: IndicatorData,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub organization: Option<OrgFields>,
}

/// Map a list of raw options through a dictionary.
///
/// Misses go to `other` when a bucket is given, otherwise they are dropped.
fn map_many<T>(
    values: &[&str],
    lookup: impl Fn(&str) -> Option<T>,
    field: &str,
    mut other: Option<&mut Vec<String>>,
) -> Vec<T> {
    let mut mapped = Vec::with_capacity(values.len());
    for value in values {
        match lookup(value) {
            Some(token) => mapped.push(token),
            None => match other.as_deref_mut() {
                Some(bucket) => bucket.push((*value).to_string()),
                None => log::debug!("Dropping unrecognized {field} option {value:?}"),
            },
        }
    }
    mapped
}

fn text(record: &ParsedRecord, key: &str) -> Option<String> {
    record.first(key).map(str::to_string)
}

fn flag(record: &ParsedRecord, key: &str) -> Option<bool> {
    match record.get(key)? {
        FieldValue::List(items) => bool_from_list(items),
        FieldValue::Text(value) => bool_from_text(value),
    }
}

/// Frequency and its note.
///
/// The first option picks the frequency (unknown ⇒ `OTHER`); further options
/// become an "Additional: ..." note. An option starting with "other" forces
/// `OTHER` and its free text becomes the note instead.
fn map_frequency(values: &[&str]) -> (Option<Frequency>, Option<String>) {
    let Some(first) = values.first() else {
        return (None, None);
    };

    let mut frequency = Frequency::lookup(first).unwrap_or(Frequency::Other);
    let mut note = (values.len() > 1).then(|| format!("Additional: {}", values[1..].join(", ")));

    if let Some(other) = values
        .iter()
        .find(|value| value.to_lowercase().starts_with("other"))
    {
        frequency = Frequency::Other;
        let free_text = OTHER_LABEL.replace(other, "").trim().to_string();
        note = (!free_text.is_empty()).then_some(free_text);
    }

    (Some(frequency), note)
}

fn comm_date(record: &ParsedRecord, details: Option<&str>) -> Option<NaiveDate> {
    record
        .first(keys::COMM_DATE)
        .and_then(find_date)
        .or_else(|| details.and_then(find_date))
}

/// Explicit link (its URL token, else the value as written), then the first
/// URL in the details text.
fn comm_link(record: &ParsedRecord, details: Option<&str>) -> Option<String> {
    record
        .first(keys::COMM_LINK)
        .map(str::trim)
        .filter(|raw| !raw.is_empty())
        .map(|raw| find_url(raw).unwrap_or_else(|| raw.to_string()))
        .or_else(|| details.and_then(find_url))
}

/// Organization fields of a record; `None` when all five are absent.
#[must_use]
pub fn extract_organization(record: &ParsedRecord) -> Option<OrgFields> {
    let org = OrgFields {
        code: text(record, keys::ORG_CODE),
        name: text(record, keys::ORG_NAME),
        contact_name: text(record, keys::ORG_CONTACT_NAME),
        contact_email: text(record, keys::ORG_CONTACT_EMAIL),
        website: text(record, keys::ORG_WEBSITE),
    };
    (org != OrgFields::default()).then_some(org)
}

/// Map a parsed record onto indicator fields.
///
/// Missing or unreadable values leave fields unset (or empty). The short name
/// defaults to [`UNTITLED_INDICATOR`], data nature to `BOTH` and the status to
/// `PUBLISHED`.
///
/// # Examples
///
/// ```
/// use indicator_core::enums::IndicatorCategory;
/// use indicator_core::normalize::normalize_indicator;
/// use indicator_core::{keys, FieldValue, ParsedRecord};
///
/// let record: ParsedRecord = [(
///     keys::INDICATOR_CATEGORY,
///     FieldValue::from(vec!["Climate Adaptation", "Foo Bar"]),
/// )]
/// .into_iter()
/// .collect();
///
/// let data = normalize_indicator(&record);
/// assert_eq!(data.indicator_categories, vec![IndicatorCategory::ClimateAdaptation]);
/// assert_eq!(data.indicator_category_other.as_deref(), Some("Foo Bar"));
/// ```
#[must_use]
pub fn normalize_indicator(record: &ParsedRecord) -> IndicatorData {
    let mut other_categories = Vec::new();
    let indicator_categories = map_many(
        &record.values(keys::INDICATOR_CATEGORY),
        IndicatorCategory::lookup,
        keys::INDICATOR_CATEGORY,
        Some(&mut other_categories),
    );

    let (frequency, frequency_note) = map_frequency(&record.values(keys::FREQUENCY));
    let details = record.first(keys::COMM_DETAILS);

    IndicatorData {
        short_name: text(record, keys::SHORT_NAME)
            .unwrap_or_else(|| UNTITLED_INDICATOR.to_string()),
        description: text(record, keys::DESCRIPTION),
        footprints: map_many(
            &record.values(keys::FOOTPRINT),
            Footprint::lookup,
            keys::FOOTPRINT,
            None,
        ),
        countries: record
            .first(keys::COUNTRIES)
            .map(split_list)
            .unwrap_or_default(),
        thematic_areas: map_many(
            &record.values(keys::THEMATIC_AREAS),
            ThematicArea::lookup,
            keys::THEMATIC_AREAS,
            None,
        ),
        indicator_categories,
        indicator_category_other: (!other_categories.is_empty())
            .then(|| other_categories.join(", ")),
        type_of_data: map_many(
            &record.values(keys::TYPE_OF_DATA),
            TypeOfData::lookup,
            keys::TYPE_OF_DATA,
            None,
        ),
        data_nature: record
            .first(keys::DATA_TYPE)
            .and_then(DataNature::lookup)
            .unwrap_or_default(),
        groups_supported: map_many(
            &record.values(keys::GROUPS_SUPPORTED),
            SupportedGroup::lookup,
            keys::GROUPS_SUPPORTED,
            None,
        ),
        purposes: map_many(
            &record.values(keys::PURPOSE_OF_DATA),
            Purpose::lookup,
            keys::PURPOSE_OF_DATA,
            None,
        ),
        year_start: record.first(keys::YEAR_START).and_then(parse_leading_int),
        methodology: text(record, keys::METHODOLOGY),
        limitations: text(record, keys::LIMITATIONS),
        pre_analysis: map_many(
            &record.values(keys::PRE_ANALYSIS),
            PreAnalysis::lookup,
            keys::PRE_ANALYSIS,
            None,
        ),
        data_analysis: map_many(
            &record.values(keys::DATA_ANALYSIS),
            DataAnalysis::lookup,
            keys::DATA_ANALYSIS,
            None,
        ),
        result_validation: map_many(
            &record.values(keys::RESULT_VALIDATION),
            ResultValidation::lookup,
            keys::RESULT_VALIDATION,
            None,
        ),
        frequency,
        frequency_note,
        links_to_data: record
            .first(keys::LINKS_TO_DATA)
            .map(split_list)
            .unwrap_or_default(),
        comm_channels: map_many(
            &record.values(keys::COMM_CHANNELS),
            CommChannel::lookup,
            keys::COMM_CHANNELS,
            None,
        ),
        comm_date: comm_date(record, details),
        comm_link: comm_link(record, details),
        public_sharing_consent: flag(record, keys::PUBLIC_SHARING_CONSENT),
        frequent_updates: flag(record, keys::FREQUENT_UPDATES),
        web_scraping_approval: flag(record, keys::WEB_SCRAPING_APPROVAL),
        dashboard_usage: flag(record, keys::DASHBOARD_USAGE),
        status: PublishStatus::default(),
        image_url: text(record, keys::IMAGE),
    }
}

/// Normalize a record into indicator fields plus organization fields.
#[must_use]
pub fn normalize(record: &ParsedRecord) -> Normalized {
    Normalized {
        indicator: normalize_indicator(record),
        organization: extract_organization(record),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn record(entries: &[(&str, FieldValue)]) -> ParsedRecord {
        entries.iter().cloned().collect()
    }

    #[test]
    fn test_empty_record_defaults() {
        let data = normalize_indicator(&ParsedRecord::new());
        assert_eq!(data, IndicatorData::default());
        assert_eq!(data.short_name, "Untitled Indicator");
        assert_eq!(data.data_nature, DataNature::Both);
        assert_eq!(data.status, PublishStatus::Published);
        assert!(normalize(&ParsedRecord::new()).organization.is_none());
    }

    #[test]
    fn test_category_overflow() {
        let data = normalize_indicator(&record(&[(
            keys::INDICATOR_CATEGORY,
            vec!["Climate Adaptation", "Foo Bar", "Baz"].into(),
        )]));
        assert_eq!(
            data.indicator_categories,
            vec![IndicatorCategory::ClimateAdaptation]
        );
        assert_eq!(data.indicator_category_other.as_deref(), Some("Foo Bar, Baz"));
    }

    #[test]
    fn test_unknown_tokens_dropped_elsewhere() {
        let data = normalize_indicator(&record(&[
            (keys::THEMATIC_AREAS, vec!["Water", "Microplastics", "Water"].into()),
            (keys::COMM_CHANNELS, vec!["Magazines/Blogs", "Carrier pigeon"].into()),
        ]));
        assert_eq!(
            data.thematic_areas,
            vec![ThematicArea::Water, ThematicArea::Water]
        );
        assert_eq!(data.comm_channels, vec![CommChannel::MagazinesBlogs]);
        assert_eq!(data.indicator_category_other, None);
    }

    #[test]
    fn test_frequency_other_overrides_additional() {
        let (freq, note) = map_frequency(&["Annually", "Other: Biannual"]);
        assert_eq!(freq, Some(Frequency::Other));
        assert_eq!(note.as_deref(), Some("Biannual"));
    }

    #[test]
    fn test_frequency_additional_note() {
        let (freq, note) = map_frequency(&["Quarterly", "Annually", "Event-triggered"]);
        assert_eq!(freq, Some(Frequency::Quarterly));
        assert_eq!(note.as_deref(), Some("Additional: Annually, Event-triggered"));
    }

    #[test]
    fn test_frequency_edge_cases() {
        assert_eq!(map_frequency(&[]), (None, None));
        assert_eq!(map_frequency(&["Fortnightly"]), (Some(Frequency::Other), None));
        assert_eq!(map_frequency(&["Other"]), (Some(Frequency::Other), None));
    }

    #[test]
    fn test_comm_details_mining() {
        let data = normalize_indicator(&record(&[(
            keys::COMM_DETAILS,
            "Published on 8 March 2024 at https://example.org/report".into(),
        )]));
        assert_eq!(data.comm_date, NaiveDate::from_ymd_opt(2024, 3, 8));
        assert_eq!(data.comm_link.as_deref(), Some("https://example.org/report"));
    }

    #[test]
    fn test_explicit_comm_fields_win() {
        let data = normalize_indicator(&record(&[
            (keys::COMM_DATE, "2023-01-05".into()),
            (keys::COMM_LINK, "https://explicit.org".into()),
            (
                keys::COMM_DETAILS,
                "Published on 8 March 2024 at https://example.org/report".into(),
            ),
        ]));
        assert_eq!(data.comm_date, NaiveDate::from_ymd_opt(2023, 1, 5));
        assert_eq!(data.comm_link.as_deref(), Some("https://explicit.org"));
    }

    #[test]
    fn test_explicit_link_without_scheme_is_kept() {
        let data = normalize_indicator(&record(&[(keys::COMM_LINK, "www.acme.org/report".into())]));
        assert_eq!(data.comm_link.as_deref(), Some("www.acme.org/report"));

        let data = normalize_indicator(&record(&[
            (keys::COMM_LINK, "acme.org/report".into()),
            (keys::COMM_DETAILS, "mirror at https://other.example/x".into()),
        ]));
        assert_eq!(data.comm_link.as_deref(), Some("acme.org/report"));

        let data = normalize_indicator(&record(&[
            (keys::COMM_LINK, "  ".into()),
            (keys::COMM_DETAILS, "mirror at https://other.example/x".into()),
        ]));
        assert_eq!(data.comm_link.as_deref(), Some("https://other.example/x"));
    }

    #[test]
    fn test_unparseable_comm_date_falls_back() {
        let data = normalize_indicator(&record(&[
            (keys::COMM_DATE, "sometime in spring".into()),
            (keys::COMM_DETAILS, "Shared 01/02/2022".into()),
        ]));
        assert_eq!(data.comm_date, NaiveDate::from_ymd_opt(2022, 2, 1));
        assert_eq!(data.comm_link, None);
    }

    #[test]
    fn test_booleans() {
        let data = normalize_indicator(&record(&[
            (keys::PUBLIC_SHARING_CONSENT, vec!["Yes"].into()),
            (keys::FREQUENT_UPDATES, vec!["No"].into()),
            (keys::WEB_SCRAPING_APPROVAL, vec!["Maybe"].into()),
            (keys::DASHBOARD_USAGE, FieldValue::List(Vec::new())),
        ]));
        assert_eq!(data.public_sharing_consent, Some(true));
        assert_eq!(data.frequent_updates, Some(false));
        assert_eq!(data.web_scraping_approval, Some(true));
        assert_eq!(data.dashboard_usage, None);
    }

    #[test]
    fn test_scalar_boolean() {
        let data = normalize_indicator(&record(&[
            (keys::DASHBOARD_USAGE, "no".into()),
            (keys::PUBLIC_SHARING_CONSENT, "".into()),
        ]));
        assert_eq!(data.dashboard_usage, Some(false));
        assert_eq!(data.public_sharing_consent, None);
    }

    #[test]
    fn test_text_lists_and_year() {
        let data = normalize_indicator(&record(&[
            (keys::SHORT_NAME, "Rainfall index".into()),
            (keys::DESCRIPTION, "".into()),
            (keys::COUNTRIES, "Kenya, Uganda;\nTanzania".into()),
            (keys::LINKS_TO_DATA, "https://a.org; https://b.org".into()),
            (keys::YEAR_START, "2019 onwards".into()),
            (keys::DATA_TYPE, vec!["Quantitative", "Qualitative"].into()),
            (keys::IMAGE, "data:image/png;base64,AA==".into()),
        ]));
        assert_eq!(data.short_name, "Rainfall index");
        assert_eq!(data.description, None);
        assert_eq!(data.countries, vec!["Kenya", "Uganda", "Tanzania"]);
        assert_eq!(data.links_to_data, vec!["https://a.org", "https://b.org"]);
        assert_eq!(data.year_start, Some(2019));
        assert_eq!(data.data_nature, DataNature::Quantitative);
        assert_eq!(data.image_url.as_deref(), Some("data:image/png;base64,AA=="));
    }

    #[test]
    fn test_year_not_a_number() {
        let data = normalize_indicator(&record(&[(keys::YEAR_START, "unknown".into())]));
        assert_eq!(data.year_start, None);
    }

    #[test]
    fn test_extract_organization() {
        let rec = record(&[
            (keys::ORG_CODE, "ORG1".into()),
            (keys::ORG_WEBSITE, vec!["https://acme.org", "ignored"].into()),
        ]);
        let org = extract_organization(&rec).unwrap();
        assert_eq!(org.code.as_deref(), Some("ORG1"));
        assert_eq!(org.name, None);
        assert_eq!(org.website.as_deref(), Some("https://acme.org"));

        let blank = record(&[(keys::ORG_NAME, "".into())]);
        assert_eq!(extract_organization(&blank), None);
    }

    fn field_value() -> impl Strategy<Value = FieldValue> {
        prop_oneof![
            "[A-Za-z0-9 :/&-]{0,20}".prop_map(FieldValue::Text),
            prop::collection::vec("[A-Za-z :&-]{0,16}", 0..4).prop_map(FieldValue::List),
        ]
    }

    proptest! {
        #[test]
        fn prop_normalize_is_deterministic(
            entries in prop::collection::vec(
                (prop::sample::select(keys::CHECKBOX_FIELDS.to_vec()), field_value()),
                0..8,
            )
        ) {
            let rec: ParsedRecord = entries.into_iter().collect();
            prop_assert_eq!(normalize(&rec), normalize(&rec));
        }
    }
}
