//! Label canonicalization for template table rows.
//!
//! Template revisions disagree on spelling ("Organisation" vs "Organization"),
//! punctuation ("Pre-analysis" vs "Pre analysis") and trailing colons. Every
//! label is folded by [`normalize_label`] and looked up in a static alias table.
//! Labels the table does not know pass through trimmed, so ad hoc rows survive
//! as their own keys instead of being dropped.

use crate::keys;
use std::collections::HashMap;
use std::sync::LazyLock;

/// Canonical key and the folded spellings that resolve to it.
///
/// The canonical key's own folded form is registered automatically.
const ALIASES: &[(&str, &[&str])] = &[
    (keys::FOOTPRINT, &["footprint", "footprints", "indicator footprints"]),
    (
        keys::THEMATIC_AREAS,
        &["thematic areas", "thematic area", "indicator thematic area"],
    ),
    (
        keys::INDICATOR_CATEGORY,
        &["category", "categories", "indicator categories"],
    ),
    (keys::TYPE_OF_DATA, &["types of data"]),
    (keys::DATA_TYPE, &["datatype", "nature of data", "data nature"]),
    (
        keys::GROUPS_SUPPORTED,
        &["groups supported", "supported groups"],
    ),
    (keys::PURPOSE_OF_DATA, &["purpose", "purposes of data"]),
    (keys::TARGET_AUDIENCE, &["target audiences"]),
    (keys::DATA_REPLICABILITY, &[]),
    (keys::PRE_ANALYSIS, &["pre analysis", "preanalysis", "pre–analysis"]),
    (keys::DATA_ANALYSIS, &[]),
    (keys::RESULT_VALIDATION, &["results validation"]),
    (keys::FREQUENCY, &["update frequency"]),
    (
        keys::COMM_CHANNELS,
        &["communication channels", "communication channel"],
    ),
    (keys::PUBLIC_SHARING_CONSENT, &[]),
    (keys::FREQUENT_UPDATES, &[]),
    (
        keys::WEB_SCRAPING_APPROVAL,
        &[
            "web scrapping approval",
            "webscraping approval",
            "web scraping approval",
        ],
    ),
    (keys::DASHBOARD_USAGE, &[]),
    (keys::SHORT_NAME, &["short name", "indicator name"]),
    (keys::DESCRIPTION, &["indicator description"]),
    (keys::COUNTRIES, &["country/countries", "country", "country / countries"]),
    (keys::LINKS_TO_DATA, &["links to data", "link to collected data"]),
    (keys::YEAR_START, &["year start", "start year"]),
    (keys::METHODOLOGY, &[]),
    (keys::LIMITATIONS, &[]),
    (keys::COMM_DETAILS, &[]),
    (keys::COMM_DATE, &["comm date", "publication date"]),
    (keys::COMM_LINK, &["comm link", "communication url"]),
    (keys::IMAGE, &["image", "indicator picture"]),
    (keys::ORG_CODE, &["organisation id", "organization code", "organisation code"]),
    (
        keys::ORG_NAME,
        &[
            "organisation full name",
            "organization name",
            "organisation name",
        ],
    ),
    (keys::ORG_CONTACT_NAME, &["organisation contact name"]),
    (keys::ORG_CONTACT_EMAIL, &["organisation contact email"]),
    (keys::ORG_WEBSITE, &["organisation website"]),
];

static ALIAS_TABLE: LazyLock<HashMap<String, &'static str>> = LazyLock::new(|| {
    let mut table = HashMap::new();
    for (canonical, variants) in ALIASES {
        table.insert(normalize_label(canonical), *canonical);
        for variant in *variants {
            table.insert(normalize_label(variant), *canonical);
        }
    }
    table
});

/// Fold a raw label for alias lookup.
///
/// Lower-cases, maps non-breaking spaces to spaces, collapses whitespace runs
/// to a single ASCII space, drops a trailing colon and trims.
#[must_use]
pub fn normalize_label(raw: &str) -> String {
    let lowered = raw.to_lowercase().replace('\u{a0}', " ");
    let collapsed = lowered.split_whitespace().collect::<Vec<_>>().join(" ");
    collapsed
        .trim_end_matches(':')
        .trim()
        .to_string()
}

/// Resolve a raw row label to its canonical key.
///
/// Unknown labels come back as the raw label with outer whitespace trimmed.
///
/// # Examples
///
/// ```
/// use indicator_core::labels::canonicalize;
///
/// assert_eq!(canonicalize("  organisation WEBSITE: "), "Organization website");
/// assert_eq!(canonicalize(" Funding source "), "Funding source");
/// ```
#[must_use]
pub fn canonicalize(raw: &str) -> String {
    let folded = normalize_label(raw);
    if let Some(canonical) = ALIAS_TABLE.get(&folded) {
        return (*canonical).to_string();
    }
    let passthrough = raw.trim().to_string();
    log::debug!("Label {passthrough:?} has no alias, passing through");
    passthrough
}

/// Iterate every `(spelling, canonical key)` pair the alias table knows.
pub fn alias_pairs() -> impl Iterator<Item = (&'static str, &'static str)> {
    ALIASES.iter().flat_map(|(canonical, variants)| {
        std::iter::once((*canonical, *canonical))
            .chain(variants.iter().map(move |variant| (*variant, *canonical)))
    })
}
