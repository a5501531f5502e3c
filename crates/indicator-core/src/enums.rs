//! Closed enumerations and their token dictionaries.
//!
//! Each enum carries a static dictionary from normalized tokens (see
//! [`normalize_token`]) to variants: the variant's own token plus the aliases the
//! Word template and older revisions use. Dictionaries are built once per process
//! and never mutated.

use serde::{Deserialize, Serialize};

/// Normalize free text into a dictionary token.
///
/// Trims, upper-cases, replaces `&` with `AND`, `-` with `_`, `/` with a space,
/// then turns whitespace runs into `_`.
///
/// # Examples
///
/// ```
/// use indicator_core::enums::normalize_token;
///
/// assert_eq!(normalize_token("Loss & Damage risk"), "LOSS_AND_DAMAGE_RISK");
/// assert_eq!(normalize_token("Magazines/Blogs"), "MAGAZINES_BLOGS");
/// assert_eq!(normalize_token(" Event-triggered "), "EVENT_TRIGGERED");
/// ```
#[must_use]
pub fn normalize_token(raw: &str) -> String {
    let upper = raw
        .trim()
        .to_uppercase()
        .replace('&', "AND")
        .replace('-', "_")
        .replace('/', " ");
    upper.split_whitespace().collect::<Vec<_>>().join("_")
}

/// Error returned when a string names no variant of a closed enumeration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind} value: {value:?}")]
pub struct UnknownToken {
    /// Enumeration name.
    pub kind: &'static str,
    /// Rejected input.
    pub value: String,
}

macro_rules! token_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident {
            $(
                $(#[$vmeta:meta])*
                $variant:ident => $token:literal $(| $alias:literal)*
            ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub enum $name {
            $(
                $(#[$vmeta])*
                #[serde(rename = $token)]
                $variant,
            )+
        }

        impl $name {
            /// Every variant in declaration order.
            pub const ALL: &'static [Self] = &[$(Self::$variant),+];

            /// Stored token, e.g. `CLIMATE_CHANGE`.
            #[inline]
            #[must_use]
            pub const fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $token,)+
                }
            }

            /// Resolve free text through the dictionary.
            ///
            /// The input is folded with [`normalize_token`] first; `None` on a miss.
            #[must_use]
            pub fn lookup(raw: &str) -> Option<Self> {
                static DICTIONARY: std::sync::LazyLock<
                    std::collections::HashMap<&'static str, $name>,
                > = std::sync::LazyLock::new(|| {
                    let mut dictionary = std::collections::HashMap::new();
                    $(
                        dictionary.insert($token, $name::$variant);
                        $(dictionary.insert($alias, $name::$variant);)*
                    )+
                    dictionary
                });
                DICTIONARY.get(normalize_token(raw).as_str()).copied()
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = UnknownToken;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::lookup(s).ok_or_else(|| UnknownToken {
                    kind: stringify!($name),
                    value: s.to_string(),
                })
            }
        }
    };
}

token_enum! {
    /// Geographic reach of an indicator.
    pub enum Footprint {
        Global => "GLOBAL",
        Regional => "REGIONAL",
        National => "NATIONAL",
        Localised => "LOCALISED" | "LOCALIZED" | "LOCAL",
    }
}

token_enum! {
    /// Thematic area an indicator covers.
    pub enum ThematicArea {
        Agriculture => "AGRICULTURE",
        Biodiversity => "BIODIVERSITY",
        ClimateChange => "CLIMATE_CHANGE",
        Energy => "ENERGY",
        EnvironmentalLeadership => "ENVIRONMENTAL_LEADERSHIP",
        Fisheries => "FISHERIES",
        Forestry => "FORESTRY",
        GenderBasedViolence => "GENDER_BASED_VIOLENCE" | "GBV",
        Land => "LAND",
        Nutrition => "NUTRITION",
        Oceans => "OCEANS" | "OCEAN",
        ReproductiveHealth => "REPRODUCTIVE_HEALTH",
        ServiceDelivery => "SERVICE_DELIVERY",
        Water => "WATER",
        Other => "OTHER",
    }
}

token_enum! {
    /// Climate category of an indicator.
    pub enum IndicatorCategory {
        ClimateAdaptation => "CLIMATE_ADAPTATION" | "ADAPTATION",
        ClimateMitigation => "CLIMATE_MITIGATION" | "MITIGATION",
        LossDamageRisk => "LOSS_DAMAGE_RISK" | "LOSS_AND_DAMAGE_RISK" | "LOSS_AND_DAMAGE",
        AdaptationAndMitigation => "ADAPTATION_AND_MITIGATION",
        AdaptationAndLdr => "ADAPTATION_AND_LDR",
        MitigationAndLdr => "MITIGATION_AND_LDR",
        AdaptationMitigationAndLdr => "ADAPTATION_MITIGATION_AND_LDR"
            | "ADAPTATION,_MITIGATION_AND_LDR",
        Other => "OTHER",
    }
}

token_enum! {
    /// Origin of the collected data.
    pub enum TypeOfData {
        AreaBasedProjects => "AREA_BASED_PROJECTS",
        CitizenGenerated => "CITIZEN_GENERATED" | "CITIZEN_GENERATED_DATA",
        NationalStatistics => "NATIONAL_STATISTICS",
        ResearchProjects => "RESEARCH_PROJECTS",
        Other => "OTHER",
    }
}

token_enum! {
    /// Quantitative / qualitative nature of the data.
    pub enum DataNature {
        Quantitative => "QUANTITATIVE",
        Qualitative => "QUALITATIVE",
        Both => "BOTH" | "QUANTITATIVE_AND_QUALITATIVE" | "MIXED",
    }
}

impl Default for DataNature {
    #[inline]
    fn default() -> Self {
        Self::Both
    }
}

token_enum! {
    /// Population groups the data supports.
    pub enum SupportedGroup {
        Castes => "CASTES",
        Children => "CHILDREN",
        VulnerableToClimateChange => "VULNERABLE_TO_CLIMATE_CHANGE",
        IndigenousPeople => "INDIGENOUS_PEOPLE" | "INDIGENOUS_PEOPLES",
        LgbtqPlus => "LGBTQ_PLUS" | "LGBTQ+" | "LGBTQI+" | "LGBTQ",
        SmallScaleIndustry => "SMALL_SCALE_INDUSTRY",
        TribalGroups => "TRIBAL_GROUPS",
        Women => "WOMEN",
        Youth => "YOUTH",
        Other => "OTHER",
    }
}

token_enum! {
    /// What the data is used for.
    pub enum Purpose {
        Advocacy => "ADVOCACY",
        CapacityBuilding => "CAPACITY_BUILDING",
        EnvDataScience => "ENV_DATA_SCIENCE" | "ENVIRONMENTAL_DATA_SCIENCE",
        GesiAnalysis => "GESI_ANALYSIS",
        MonitoringAndEvaluation => "M_E" | "MANDE" | "M_AND_E" | "MONITORING_AND_EVALUATION",
        PolicyMaking => "POLICY_MAKING",
        PolicyResearch => "POLICY_RESEARCH",
        SustainableDevTech => "SUSTAINABLE_DEV_TECH" | "SUSTAINABLE_DEVELOPMENT_TECHNOLOGY",
        Other => "OTHER",
    }
}

token_enum! {
    /// Preparation done before analysis.
    pub enum PreAnalysis {
        StakeholderEngagements => "STAKEHOLDER_ENGAGEMENTS" | "STAKEHOLDER_ENGAGEMENT",
        DataQualityControl => "DATA_QUALITY_CONTROL",
        DbStructure => "DB_STRUCTURE" | "DATABASE_STRUCTURE",
        DisaggregationByGender => "DISAGGREGATION_BY_GENDER",
        Other => "OTHER",
    }
}

token_enum! {
    /// Analysis methods applied to the data.
    pub enum DataAnalysis {
        StatisticalModelling => "STATISTICAL_MODELLING" | "STATISTICAL_MODELING",
        QualitativeCoding => "QUALITATIVE_CODING",
        VisualRepresentation => "VISUAL_REPRESENTATION",
        Other => "OTHER",
    }
}

token_enum! {
    /// How results were validated.
    pub enum ResultValidation {
        PeerReview => "PEER_REVIEW",
        ExpertFeedback => "EXPERT_FEEDBACK",
        SupportedGroupFeedback => "SUPPORTED_GROUP_FEEDBACK",
        TargetAudienceFeedback => "TARGET_AUDIENCE_FEEDBACK",
        Triangulation => "TRIANGULATION",
        Other => "OTHER",
    }
}

token_enum! {
    /// Update frequency.
    pub enum Frequency {
        Annually => "ANNUALLY" | "ANNUAL" | "YEARLY",
        Quarterly => "QUARTERLY",
        EventTriggered => "EVENT_TRIGGERED" | "EVENT_BASED",
        Other => "OTHER",
    }
}

token_enum! {
    /// Channel used to communicate the data publicly.
    pub enum CommChannel {
        PeerReviewed => "PEER_REVIEWED" | "PEER_REVIEWED_PUBLICATION",
        NonPeerReviewed => "NON_PEER_REVIEWED" | "NON_PEER_REVIEWED_PUBLICATION",
        Website => "WEBSITE",
        Webinar => "WEBINAR",
        Linkedin => "LINKEDIN",
        Facebook => "FACEBOOK",
        X => "X" | "TWITTER" | "X_(TWITTER)",
        Tiktok => "TIKTOK",
        Instagram => "INSTAGRAM",
        Whatsapp => "WHATSAPP",
        Youtube => "YOUTUBE",
        Telegram => "TELEGRAM",
        Signal => "SIGNAL",
        Radio => "RADIO",
        Streaming => "STREAMING",
        Television => "TELEVISION" | "TV",
        MagazinesBlogs => "MAGAZINES_BLOGS" | "MAGAZINES_AND_BLOGS",
        Other => "OTHER",
    }
}

token_enum! {
    /// Visibility of an indicator record.
    pub enum PublishStatus {
        Published => "PUBLISHED",
        Draft => "DRAFT",
    }
}

impl Default for PublishStatus {
    #[inline]
    fn default() -> Self {
        Self::Published
    }
}
