//! The typed indicator record and its partial-update payload.

use crate::enums::{
    CommChannel, DataAnalysis, DataNature, Footprint, Frequency, IndicatorCategory, PreAnalysis,
    PublishStatus, Purpose, ResultValidation, SupportedGroup, ThematicArea, TypeOfData,
};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Short name used when a document does not provide one.
pub const UNTITLED_INDICATOR: &str = "Untitled Indicator";

/// Normalized indicator content, as produced by the field normalizer.
///
/// List fields keep extraction order and duplicates. Optional fields are `None`
/// when the document did not provide a readable value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndicatorData {
    /// Indicator short name; [`UNTITLED_INDICATOR`] when missing.
    pub short_name: String,
    /// Free-text description.
    pub description: Option<String>,
    /// Geographic footprints.
    #[serde(default)]
    pub footprints: Vec<Footprint>,
    /// Countries covered.
    #[serde(default)]
    pub countries: Vec<String>,
    /// Thematic areas.
    #[serde(default)]
    pub thematic_areas: Vec<ThematicArea>,
    /// Recognized indicator categories.
    #[serde(default)]
    pub indicator_categories: Vec<IndicatorCategory>,
    /// Category tokens the dictionary did not know, comma-joined.
    pub indicator_category_other: Option<String>,
    /// Origin of the data.
    #[serde(default)]
    pub type_of_data: Vec<TypeOfData>,
    /// Quantitative / qualitative nature.
    #[serde(default)]
    pub data_nature: DataNature,
    /// Supported population groups.
    #[serde(default)]
    pub groups_supported: Vec<SupportedGroup>,
    /// Purposes of the data.
    #[serde(default)]
    pub purposes: Vec<Purpose>,
    /// First year of collection.
    pub year_start: Option<i32>,
    /// Methodology notes.
    pub methodology: Option<String>,
    /// Known limitations.
    pub limitations: Option<String>,
    /// Pre-analysis steps.
    #[serde(default)]
    pub pre_analysis: Vec<PreAnalysis>,
    /// Data analysis methods.
    #[serde(default)]
    pub data_analysis: Vec<DataAnalysis>,
    /// Result validation methods.
    #[serde(default)]
    pub result_validation: Vec<ResultValidation>,
    /// Update frequency.
    pub frequency: Option<Frequency>,
    /// Extra frequency information ("Additional: ..." or the "other" text).
    pub frequency_note: Option<String>,
    /// Links to the collected data.
    #[serde(default)]
    pub links_to_data: Vec<String>,
    /// Public communication channels.
    #[serde(default)]
    pub comm_channels: Vec<CommChannel>,
    /// Date the data was communicated.
    pub comm_date: Option<NaiveDate>,
    /// Link to the communication.
    pub comm_link: Option<String>,
    /// Consent to share publicly.
    pub public_sharing_consent: Option<bool>,
    /// Whether information is updated frequently.
    pub frequent_updates: Option<bool>,
    /// Approval for web scraping.
    pub web_scraping_approval: Option<bool>,
    /// Whether the data feeds a dashboard.
    pub dashboard_usage: Option<bool>,
    /// Publication status.
    #[serde(default)]
    pub status: PublishStatus,
    /// Image reference (URL or data URI).
    pub image_url: Option<String>,
}

impl Default for IndicatorData {
    fn default() -> Self {
        Self {
            short_name: UNTITLED_INDICATOR.to_string(),
            description: None,
            footprints: Vec::new(),
            countries: Vec::new(),
            thematic_areas: Vec::new(),
            indicator_categories: Vec::new(),
            indicator_category_other: None,
            type_of_data: Vec::new(),
            data_nature: DataNature::default(),
            groups_supported: Vec::new(),
            purposes: Vec::new(),
            year_start: None,
            methodology: None,
            limitations: None,
            pre_analysis: Vec::new(),
            data_analysis: Vec::new(),
            result_validation: Vec::new(),
            frequency: None,
            frequency_note: None,
            links_to_data: Vec::new(),
            comm_channels: Vec::new(),
            comm_date: None,
            comm_link: None,
            public_sharing_consent: None,
            frequent_updates: None,
            web_scraping_approval: None,
            dashboard_usage: None,
            status: PublishStatus::default(),
            image_url: None,
        }
    }
}

/// A stored indicator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Indicator {
    /// Store-assigned identifier.
    pub id: String,
    /// Linked organization, if any.
    pub organization_id: Option<String>,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last modification time.
    pub updated_at: DateTime<Utc>,
    /// Indicator content.
    #[serde(flatten)]
    pub data: IndicatorData,
}

/// Deserialize a field that distinguishes "absent" from "explicitly null".
///
/// Paired with `#[serde(default)]`: absent stays `None`, `null` becomes
/// `Some(None)`, a value becomes `Some(Some(v))`.
fn nullable<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Field-by-field update of an indicator.
///
/// `None` leaves a field untouched. Nullable fields use `Some(None)` to clear.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
#[allow(clippy::option_option)] // Absent vs. null is the point of this type
pub struct IndicatorPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub short_name: Option<String>,
    #[serde(deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    pub description: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub footprints: Option<Vec<Footprint>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub countries: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thematic_areas: Option<Vec<ThematicArea>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub indicator_categories: Option<Vec<IndicatorCategory>>,
    #[serde(deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    pub indicator_category_other: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub type_of_data: Option<Vec<TypeOfData>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_nature: Option<DataNature>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub groups_supported: Option<Vec<SupportedGroup>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub purposes: Option<Vec<Purpose>>,
    #[serde(deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    pub year_start: Option<Option<i32>>,
    #[serde(deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    pub methodology: Option<Option<String>>,
    #[serde(deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    pub limitations: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pre_analysis: Option<Vec<PreAnalysis>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_analysis: Option<Vec<DataAnalysis>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result_validation: Option<Vec<ResultValidation>>,
    #[serde(deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    pub frequency: Option<Option<Frequency>>,
    #[serde(deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    pub frequency_note: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub links_to_data: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comm_channels: Option<Vec<CommChannel>>,
    #[serde(deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    pub comm_date: Option<Option<NaiveDate>>,
    #[serde(deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    pub comm_link: Option<Option<String>>,
    #[serde(deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    pub public_sharing_consent: Option<Option<bool>>,
    #[serde(deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    pub frequent_updates: Option<Option<bool>>,
    #[serde(deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    pub web_scraping_approval: Option<Option<bool>>,
    #[serde(deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    pub dashboard_usage: Option<Option<bool>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<PublishStatus>,
    #[serde(deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    pub image_url: Option<Option<String>>,
    /// Relink (or unlink with `Some(None)`) the organization.
    #[serde(deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    pub organization_id: Option<Option<String>>,
}

impl IndicatorPatch {
    /// Patch that replays a freshly normalized record over a stored one.
    ///
    /// Lists and required scalars are replaced. Optional values the new document
    /// did not provide are left as stored; this includes the image reference.
    #[must_use]
    pub fn rederived(data: IndicatorData) -> Self {
        Self {
            short_name: Some(data.short_name),
            description: data.description.map(Some),
            footprints: Some(data.footprints),
            countries: Some(data.countries),
            thematic_areas: Some(data.thematic_areas),
            indicator_categories: Some(data.indicator_categories),
            indicator_category_other: data.indicator_category_other.map(Some),
            type_of_data: Some(data.type_of_data),
            data_nature: Some(data.data_nature),
            groups_supported: Some(data.groups_supported),
            purposes: Some(data.purposes),
            year_start: data.year_start.map(Some),
            methodology: data.methodology.map(Some),
            limitations: data.limitations.map(Some),
            pre_analysis: Some(data.pre_analysis),
            data_analysis: Some(data.data_analysis),
            result_validation: Some(data.result_validation),
            frequency: data.frequency.map(Some),
            frequency_note: data.frequency_note.map(Some),
            links_to_data: Some(data.links_to_data),
            comm_channels: Some(data.comm_channels),
            comm_date: data.comm_date.map(Some),
            comm_link: data.comm_link.map(Some),
            public_sharing_consent: data.public_sharing_consent.map(Some),
            frequent_updates: data.frequent_updates.map(Some),
            web_scraping_approval: data.web_scraping_approval.map(Some),
            dashboard_usage: data.dashboard_usage.map(Some),
            status: Some(data.status),
            image_url: data.image_url.map(Some),
            organization_id: None,
        }
    }

    /// Link the patched indicator to `organization_id`.
    #[must_use]
    pub fn with_organization(mut self, organization_id: Option<String>) -> Self {
        self.organization_id = Some(organization_id);
        self
    }

    /// Whether applying the patch would change nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Decode a JSON patch body.
    ///
    /// # Errors
    ///
    /// [`crate::IndicatorError::JsonError`] for malformed JSON,
    /// [`crate::IndicatorError::InvalidPayload`] for a non-object body, a field of
    /// the wrong type or an unknown enum token.
    pub fn from_json(json: &str) -> crate::Result<Self> {
        crate::error::decode_json(json)
    }

    /// Apply the patch to an indicator's content.
    ///
    /// The organization link is applied by the store, which owns the indicator row.
    pub fn apply(self, target: &mut IndicatorData) {
        fn set<T>(slot: &mut T, value: Option<T>) {
            if let Some(value) = value {
                *slot = value;
            }
        }

        set(&mut target.short_name, self.short_name);
        set(&mut target.description, self.description);
        set(&mut target.footprints, self.footprints);
        set(&mut target.countries, self.countries);
        set(&mut target.thematic_areas, self.thematic_areas);
        set(&mut target.indicator_categories, self.indicator_categories);
        set(&mut target.indicator_category_other, self.indicator_category_other);
        set(&mut target.type_of_data, self.type_of_data);
        set(&mut target.data_nature, self.data_nature);
        set(&mut target.groups_supported, self.groups_supported);
        set(&mut target.purposes, self.purposes);
        set(&mut target.year_start, self.year_start);
        set(&mut target.methodology, self.methodology);
        set(&mut target.limitations, self.limitations);
        set(&mut target.pre_analysis, self.pre_analysis);
        set(&mut target.data_analysis, self.data_analysis);
        set(&mut target.result_validation, self.result_validation);
        set(&mut target.frequency, self.frequency);
        set(&mut target.frequency_note, self.frequency_note);
        set(&mut target.links_to_data, self.links_to_data);
        set(&mut target.comm_channels, self.comm_channels);
        set(&mut target.comm_date, self.comm_date);
        set(&mut target.comm_link, self.comm_link);
        set(&mut target.public_sharing_consent, self.public_sharing_consent);
        set(&mut target.frequent_updates, self.frequent_updates);
        set(&mut target.web_scraping_approval, self.web_scraping_approval);
        set(&mut target.dashboard_usage, self.dashboard_usage);
        set(&mut target.status, self.status);
        set(&mut target.image_url, self.image_url);
    }
}
