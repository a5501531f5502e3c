//! Organization records and identity resolution.
//!
//! An uploaded document names its organization by code and/or full name. The
//! resolver decides, without touching storage, whether that names an existing
//! record (reused, with empty contact fields filled in) or a new one.

use serde::{Deserialize, Serialize};

/// Name given to organizations created without one.
pub const UNNAMED_ORGANIZATION: &str = "Unnamed Organization";

/// A stored organization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Organization {
    pub id: String,
    /// Natural identifier from the template ("Organization ID").
    pub code: Option<String>,
    pub name: String,
    pub contact_name: Option<String>,
    pub contact_email: Option<String>,
    pub website: Option<String>,
}

/// Organization fields read from one document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrgFields {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact_email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
}

impl OrgFields {
    /// Whether the fields carry an identity (code or name) to resolve against.
    #[inline]
    #[must_use]
    pub fn is_identifiable(&self) -> bool {
        self.code.is_some() || self.name.is_some()
    }
}

/// Content of an organization about to be created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewOrganization {
    pub code: Option<String>,
    pub name: String,
    pub contact_name: Option<String>,
    pub contact_email: Option<String>,
    pub website: Option<String>,
}

impl NewOrganization {
    /// Attach a store-assigned id.
    #[must_use]
    pub fn into_organization(self, id: String) -> Organization {
        Organization {
            id,
            code: self.code,
            name: self.name,
            contact_name: self.contact_name,
            contact_email: self.contact_email,
            website: self.website,
        }
    }
}

/// Contact fields to fill on an existing organization. `None` leaves a field alone.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrgPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact_email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
}

impl OrgPatch {
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.contact_name.is_none() && self.contact_email.is_none() && self.website.is_none()
    }

    /// Write the patch into `target`.
    pub fn apply(self, target: &mut Organization) {
        if let Some(contact_name) = self.contact_name {
            target.contact_name = Some(contact_name);
        }
        if let Some(contact_email) = self.contact_email {
            target.contact_email = Some(contact_email);
        }
        if let Some(website) = self.website {
            target.website = Some(website);
        }
    }
}

/// One alternative of an organization lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrgCondition {
    /// Exact code match.
    CodeEquals(String),
    /// Name match ignoring case.
    NameEqualsIgnoreCase(String),
}

impl OrgCondition {
    /// Whether `org` satisfies this condition.
    #[must_use]
    pub fn matches(&self, org: &Organization) -> bool {
        match self {
            Self::CodeEquals(code) => org.code.as_deref() == Some(code.as_str()),
            Self::NameEqualsIgnoreCase(name) => org.name.to_lowercase() == name.to_lowercase(),
        }
    }
}

/// Lookup conditions for incoming fields, highest priority first: code, then name.
#[must_use]
pub fn conditions_for(incoming: &OrgFields) -> Vec<OrgCondition> {
    let mut conditions = Vec::with_capacity(2);
    if let Some(code) = &incoming.code {
        conditions.push(OrgCondition::CodeEquals(code.clone()));
    }
    if let Some(name) = &incoming.name {
        conditions.push(OrgCondition::NameEqualsIgnoreCase(name.clone()));
    }
    conditions
}

/// What to do with the organization named by a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrgAction {
    /// Link to an existing organization as is.
    Reuse { id: String },
    /// Link to an existing organization after filling its empty contact fields.
    Patch { id: String, patch: OrgPatch },
    /// Create a new organization and link to it.
    Create(NewOrganization),
}

impl OrgAction {
    /// Id of the organization the action links to, when it already exists.
    #[must_use]
    pub fn existing_id(&self) -> Option<&str> {
        match self {
            Self::Reuse { id } | Self::Patch { id, .. } => Some(id),
            Self::Create(_) => None,
        }
    }
}

fn is_blank(value: Option<&str>) -> bool {
    value.map_or(true, str::is_empty)
}

fn fill(existing: Option<&str>, incoming: Option<&String>) -> Option<String> {
    match incoming {
        Some(value) if !value.is_empty() && is_blank(existing) => Some(value.clone()),
        _ => None,
    }
}

/// Decide how to link `incoming` given the lookup result.
///
/// A match never has its name or code changed, and only contact fields that
/// are empty on the stored record are filled. Resolving the same fields again
/// after applying the action yields [`OrgAction::Reuse`].
///
/// # Examples
///
/// ```
/// use indicator_core::organization::{resolve, OrgAction, OrgFields};
///
/// let incoming = OrgFields {
///     name: Some("Acme".to_string()),
///     ..OrgFields::default()
/// };
/// match resolve(None, &incoming) {
///     OrgAction::Create(new_org) => assert_eq!(new_org.name, "Acme"),
///     other => panic!("unexpected {other:?}"),
/// }
/// ```
#[must_use]
pub fn resolve(existing: Option<&Organization>, incoming: &OrgFields) -> OrgAction {
    let Some(existing) = existing else {
        return OrgAction::Create(NewOrganization {
            code: incoming.code.clone(),
            name: incoming
                .name
                .clone()
                .unwrap_or_else(|| UNNAMED_ORGANIZATION.to_string()),
            contact_name: incoming.contact_name.clone(),
            contact_email: incoming.contact_email.clone(),
            website: incoming.website.clone(),
        });
    };

    let patch = OrgPatch {
        contact_name: fill(existing.contact_name.as_deref(), incoming.contact_name.as_ref()),
        contact_email: fill(existing.contact_email.as_deref(), incoming.contact_email.as_ref()),
        website: fill(existing.website.as_deref(), incoming.website.as_ref()),
    };

    if patch.is_empty() {
        OrgAction::Reuse {
            id: existing.id.clone(),
        }
    } else {
        OrgAction::Patch {
            id: existing.id.clone(),
            patch,
        }
    }
}
