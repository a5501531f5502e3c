//! Read-side shapes: the detail view of an indicator and catalogue search.

use crate::enums::{ThematicArea, UnknownToken};
use crate::indicator::Indicator;
use crate::organization::Organization;
use serde::{Deserialize, Serialize};

/// Turn a stored token into a display label: `CLIMATE_CHANGE` → `Climate Change`.
///
/// # Examples
///
/// ```
/// use indicator_core::view::humanize;
///
/// assert_eq!(humanize("CLIMATE_CHANGE"), "Climate Change");
/// assert_eq!(humanize("LGBTQ_PLUS"), "Lgbtq Plus");
/// ```
#[must_use]
pub fn humanize(token: &str) -> String {
    let mut out = String::with_capacity(token.len());
    let mut at_word_start = true;
    for ch in token.to_lowercase().chars() {
        let ch = if ch == '_' { ' ' } else { ch };
        if at_word_start && ch.is_alphanumeric() {
            out.extend(ch.to_uppercase());
        } else {
            out.push(ch);
        }
        at_word_start = !ch.is_alphanumeric();
    }
    out
}

/// One-line summary of how an indicator was communicated.
///
/// `Date: YYYY-MM-DD • Link: … • Channels: A, B`, omitting empty parts;
/// `None` when there is nothing to say.
#[must_use]
pub fn communication_summary(indicator: &Indicator) -> Option<String> {
    let data = &indicator.data;
    let mut parts = Vec::new();
    if let Some(date) = data.comm_date {
        parts.push(format!("Date: {}", date.format("%Y-%m-%d")));
    }
    if let Some(link) = &data.comm_link {
        parts.push(format!("Link: {link}"));
    }
    if !data.comm_channels.is_empty() {
        let channels: Vec<&str> = data.comm_channels.iter().map(|c| c.as_str()).collect();
        parts.push(format!("Channels: {}", channels.join(", ")));
    }
    (!parts.is_empty()).then(|| parts.join(" • "))
}

/// Indicator detail with its organization's fields inlined.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndicatorView {
    #[serde(flatten)]
    pub indicator: Indicator,
    pub organization_name: Option<String>,
    pub organization_contact_name: Option<String>,
    pub organization_contact_email: Option<String>,
    pub organization_website: Option<String>,
    pub communication_details: Option<String>,
}

impl IndicatorView {
    /// Build the view from an indicator and the organization it links to.
    #[must_use]
    pub fn new(indicator: Indicator, organization: Option<&Organization>) -> Self {
        let communication_details = communication_summary(&indicator);
        Self {
            organization_name: organization.map(|org| org.name.clone()),
            organization_contact_name: organization.and_then(|org| org.contact_name.clone()),
            organization_contact_email: organization.and_then(|org| org.contact_email.clone()),
            organization_website: organization.and_then(|org| org.website.clone()),
            communication_details,
            indicator,
        }
    }
}

/// Catalogue filter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IndicatorQuery {
    /// Case-insensitive substring of the short name or description.
    pub text: Option<String>,
    /// Required thematic area; `None` matches all.
    pub thematic_area: Option<ThematicArea>,
}

impl IndicatorQuery {
    /// Build a query from user-facing strings. A topic of `ALL` (or empty) means no filter.
    ///
    /// # Errors
    ///
    /// Returns [`UnknownToken`] if the topic names no thematic area.
    pub fn parse(text: Option<&str>, topic: Option<&str>) -> Result<Self, UnknownToken> {
        let text = text.map(str::trim).filter(|t| !t.is_empty()).map(str::to_string);
        let thematic_area = match topic.map(str::trim) {
            None | Some("") => None,
            Some(topic) if topic.eq_ignore_ascii_case("all") => None,
            Some(topic) => Some(topic.parse::<ThematicArea>()?),
        };
        Ok(Self {
            text,
            thematic_area,
        })
    }

    /// Whether `indicator` passes the filter.
    #[must_use]
    pub fn matches(&self, indicator: &Indicator) -> bool {
        let data = &indicator.data;
        if let Some(area) = self.thematic_area {
            if !data.thematic_areas.contains(&area) {
                return false;
            }
        }
        let Some(text) = &self.text else {
            return true;
        };
        let needle = text.to_lowercase();
        data.short_name.to_lowercase().contains(&needle)
            || data
                .description
                .as_deref()
                .is_some_and(|d| d.to_lowercase().contains(&needle))
    }

    /// Filter `indicators`, newest first.
    #[must_use]
    pub fn apply(&self, indicators: Vec<Indicator>) -> Vec<Indicator> {
        let mut hits: Vec<Indicator> = indicators
            .into_iter()
            .filter(|indicator| self.matches(indicator))
            .collect();
        hits.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        hits
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enums::CommChannel;
    use crate::indicator::IndicatorData;
    use chrono::{Duration, NaiveDate, Utc};

    fn indicator(name: &str, description: Option<&str>, areas: Vec<ThematicArea>) -> Indicator {
        Indicator {
            id: name.to_lowercase(),
            organization_id: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
            data: IndicatorData {
                short_name: name.to_string(),
                description: description.map(str::to_string),
                thematic_areas: areas,
                ..IndicatorData::default()
            },
        }
    }

    #[test]
    fn test_humanize() {
        assert_eq!(humanize("CLIMATE_CHANGE"), "Climate Change");
        assert_eq!(humanize("M_E"), "M E");
        assert_eq!(humanize("WATER"), "Water");
        assert_eq!(humanize(""), "");
    }

    #[test]
    fn test_communication_summary() {
        let mut ind = indicator("A", None, Vec::new());
        assert_eq!(communication_summary(&ind), None);

        ind.data.comm_date = NaiveDate::from_ymd_opt(2024, 3, 8);
        ind.data.comm_link = Some("https://example.org".to_string());
        ind.data.comm_channels = vec![CommChannel::Website, CommChannel::X];
        assert_eq!(
            communication_summary(&ind).as_deref(),
            Some("Date: 2024-03-08 • Link: https://example.org • Channels: WEBSITE, X")
        );

        ind.data.comm_date = None;
        ind.data.comm_link = None;
        assert_eq!(
            communication_summary(&ind).as_deref(),
            Some("Channels: WEBSITE, X")
        );
    }

    #[test]
    fn test_view_inlines_organization() {
        let org = Organization {
            id: "o".to_string(),
            code: None,
            name: "Acme".to_string(),
            contact_name: None,
            contact_email: Some("info@acme.org".to_string()),
            website: None,
        };
        let view = IndicatorView::new(indicator("A", None, Vec::new()), Some(&org));
        assert_eq!(view.organization_name.as_deref(), Some("Acme"));
        assert_eq!(view.organization_contact_email.as_deref(), Some("info@acme.org"));

        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["shortName"], "A");
        assert_eq!(json["organizationName"], "Acme");

        let bare = IndicatorView::new(indicator("B", None, Vec::new()), None);
        assert_eq!(bare.organization_name, None);
    }

    #[test]
    fn test_query_parse() {
        assert_eq!(IndicatorQuery::parse(None, Some("ALL")).unwrap(), IndicatorQuery::default());
        assert_eq!(IndicatorQuery::parse(Some("  "), Some("")).unwrap(), IndicatorQuery::default());
        let query = IndicatorQuery::parse(Some("rain"), Some("water")).unwrap();
        assert_eq!(query.thematic_area, Some(ThematicArea::Water));
        assert_eq!(query.text.as_deref(), Some("rain"));
        assert!(IndicatorQuery::parse(None, Some("space")).is_err());
    }

    #[test]
    fn test_query_matching_and_order() {
        let mut older = indicator("Rainfall", None, vec![ThematicArea::Water]);
        older.created_at = Utc::now() - Duration::days(1);
        let newer = indicator("Soil health", Some("Tracks RAINFALL runoff"), vec![ThematicArea::Land]);
        let other = indicator("Fish stocks", None, vec![ThematicArea::Fisheries]);

        let query = IndicatorQuery::parse(Some("rainfall"), None).unwrap();
        let hits = query.apply(vec![older.clone(), newer.clone(), other.clone()]);
        let names: Vec<_> = hits.iter().map(|i| i.data.short_name.as_str()).collect();
        assert_eq!(names, vec!["Soil health", "Rainfall"]);

        let query = IndicatorQuery::parse(None, Some("WATER")).unwrap();
        let hits = query.apply(vec![older, newer, other]);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].data.short_name, "Rainfall");
    }
}
