//! Persistence of indicators and organizations.
//!
//! [`RecordStore`] is the seam the ingest service talks to. Two implementations
//! ship with the crate: [`MemoryStore`] and [`JsonFileStore`], which keeps a
//! whole-file JSON snapshot and rewrites it atomically after every mutation.

use crate::error::StoreError;
use crate::indicator::{Indicator, IndicatorData, IndicatorPatch};
use crate::organization::{NewOrganization, OrgCondition, OrgPatch, Organization};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Result of a store operation.
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Storage capability used by [`crate::service::IndicatorService`].
///
/// Mutations take `&mut self`, so a store serializes its own writers.
pub trait RecordStore {
    /// Indicator by id.
    fn get_indicator(&self, id: &str) -> StoreResult<Indicator>;

    /// Every indicator, in creation order.
    fn list_indicators(&self) -> StoreResult<Vec<Indicator>>;

    /// Store a new indicator, optionally linked to an organization.
    fn create_indicator(
        &mut self,
        data: IndicatorData,
        organization_id: Option<String>,
    ) -> StoreResult<Indicator>;

    /// Apply a partial update; `NotFound` when the id is unknown.
    fn update_indicator(&mut self, id: &str, patch: IndicatorPatch) -> StoreResult<Indicator>;

    /// Remove an indicator; `NotFound` when the id is unknown.
    fn delete_indicator(&mut self, id: &str) -> StoreResult<()>;

    /// Organization by id.
    fn get_organization(&self, id: &str) -> StoreResult<Organization>;

    /// First organization satisfying the earliest condition that matches anything.
    ///
    /// Conditions are alternatives in priority order: a code match beats a name
    /// match even when the name match was stored first.
    fn find_first_organization(
        &self,
        conditions: &[OrgCondition],
    ) -> StoreResult<Option<Organization>>;

    /// Store a new organization.
    fn create_organization(&mut self, new_org: NewOrganization) -> StoreResult<Organization>;

    /// Fill contact fields of an organization.
    fn update_organization(&mut self, id: &str, patch: OrgPatch) -> StoreResult<Organization>;
}

fn new_id() -> String {
    Uuid::new_v4().to_string()
}

/// Snapshot of everything a store holds.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Snapshot {
    #[serde(default)]
    organizations: Vec<Organization>,
    #[serde(default)]
    indicators: Vec<Indicator>,
}

impl Snapshot {
    fn indicator_mut(&mut self, id: &str) -> StoreResult<&mut Indicator> {
        self.indicators
            .iter_mut()
            .find(|indicator| indicator.id == id)
            .ok_or_else(|| StoreError::not_found("indicator", id))
    }

    fn organization_mut(&mut self, id: &str) -> StoreResult<&mut Organization> {
        self.organizations
            .iter_mut()
            .find(|org| org.id == id)
            .ok_or_else(|| StoreError::not_found("organization", id))
    }

    fn get_indicator(&self, id: &str) -> StoreResult<Indicator> {
        self.indicators
            .iter()
            .find(|indicator| indicator.id == id)
            .cloned()
            .ok_or_else(|| StoreError::not_found("indicator", id))
    }

    fn get_organization(&self, id: &str) -> StoreResult<Organization> {
        self.organizations
            .iter()
            .find(|org| org.id == id)
            .cloned()
            .ok_or_else(|| StoreError::not_found("organization", id))
    }

    fn ensure_organization(&self, id: Option<&str>) -> StoreResult<()> {
        match id {
            Some(id) => self.get_organization(id).map(|_| ()),
            None => Ok(()),
        }
    }

    fn create_indicator(
        &mut self,
        data: IndicatorData,
        organization_id: Option<String>,
    ) -> StoreResult<Indicator> {
        self.ensure_organization(organization_id.as_deref())?;
        let now = Utc::now();
        let indicator = Indicator {
            id: new_id(),
            organization_id,
            created_at: now,
            updated_at: now,
            data,
        };
        log::info!("Created indicator {} ({})", indicator.id, indicator.data.short_name);
        self.indicators.push(indicator.clone());
        Ok(indicator)
    }

    fn update_indicator(&mut self, id: &str, mut patch: IndicatorPatch) -> StoreResult<Indicator> {
        if let Some(organization_id) = &patch.organization_id {
            self.ensure_organization(organization_id.as_deref())?;
        }
        let relink = patch.organization_id.take();

        let indicator = self.indicator_mut(id)?;
        patch.apply(&mut indicator.data);
        if let Some(organization_id) = relink {
            indicator.organization_id = organization_id;
        }
        indicator.updated_at = Utc::now();
        log::info!("Updated indicator {id}");
        Ok(indicator.clone())
    }

    fn delete_indicator(&mut self, id: &str) -> StoreResult<()> {
        let before = self.indicators.len();
        self.indicators.retain(|indicator| indicator.id != id);
        if self.indicators.len() == before {
            return Err(StoreError::not_found("indicator", id));
        }
        log::info!("Deleted indicator {id}");
        Ok(())
    }

    fn find_first_organization(&self, conditions: &[OrgCondition]) -> Option<Organization> {
        conditions.iter().find_map(|condition| {
            self.organizations
                .iter()
                .find(|org| condition.matches(org))
                .cloned()
        })
    }

    fn create_organization(&mut self, new_org: NewOrganization) -> Organization {
        let org = new_org.into_organization(new_id());
        log::info!("Created organization {} ({})", org.id, org.name);
        self.organizations.push(org.clone());
        org
    }

    fn update_organization(&mut self, id: &str, patch: OrgPatch) -> StoreResult<Organization> {
        let org = self.organization_mut(id)?;
        patch.apply(org);
        log::info!("Updated organization {id}");
        Ok(org.clone())
    }
}

/// In-process store. Nothing outlives the value.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    snapshot: Snapshot,
}

impl MemoryStore {
    #[inline]
    #[must_use = "creates an empty store"]
    pub fn new() -> Self {
        Self::default()
    }
}

impl RecordStore for MemoryStore {
    fn get_indicator(&self, id: &str) -> StoreResult<Indicator> {
        self.snapshot.get_indicator(id)
    }

    fn list_indicators(&self) -> StoreResult<Vec<Indicator>> {
        Ok(self.snapshot.indicators.clone())
    }

    fn create_indicator(
        &mut self,
        data: IndicatorData,
        organization_id: Option<String>,
    ) -> StoreResult<Indicator> {
        self.snapshot.create_indicator(data, organization_id)
    }

    fn update_indicator(&mut self, id: &str, patch: IndicatorPatch) -> StoreResult<Indicator> {
        self.snapshot.update_indicator(id, patch)
    }

    fn delete_indicator(&mut self, id: &str) -> StoreResult<()> {
        self.snapshot.delete_indicator(id)
    }

    fn get_organization(&self, id: &str) -> StoreResult<Organization> {
        self.snapshot.get_organization(id)
    }

    fn find_first_organization(
        &self,
        conditions: &[OrgCondition],
    ) -> StoreResult<Option<Organization>> {
        Ok(self.snapshot.find_first_organization(conditions))
    }

    fn create_organization(&mut self, new_org: NewOrganization) -> StoreResult<Organization> {
        Ok(self.snapshot.create_organization(new_org))
    }

    fn update_organization(&mut self, id: &str, patch: OrgPatch) -> StoreResult<Organization> {
        self.snapshot.update_organization(id, patch)
    }
}

/// Store backed by a single JSON file.
///
/// The file is read once by [`JsonFileStore::open`]. Each successful mutation
/// rewrites it through a sibling temporary file and a rename, so readers never
/// observe a half-written snapshot.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    snapshot: Snapshot,
}

impl JsonFileStore {
    /// Open the store at `path`; a missing file is an empty store.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Io`] if the file exists but cannot be read, and
    /// [`StoreError::Json`] if it is not a valid snapshot.
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        let path = path.as_ref().to_path_buf();
        let snapshot = if path.exists() {
            let content = fs::read_to_string(&path)?;
            if content.trim().is_empty() {
                Snapshot::default()
            } else {
                serde_json::from_str(&content)?
            }
        } else {
            log::debug!("Store file {} does not exist yet", path.display());
            Snapshot::default()
        };
        Ok(Self { path, snapshot })
    }

    /// Path of the backing file.
    #[inline]
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self, snapshot: &Snapshot) -> StoreResult<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let mut tmp_name = self.path.as_os_str().to_owned();
        tmp_name.push(".tmp");
        let tmp_path = PathBuf::from(tmp_name);

        let json = serde_json::to_string_pretty(snapshot)?;
        fs::write(&tmp_path, json)?;
        fs::rename(&tmp_path, &self.path)?;
        Ok(())
    }

    /// Run a mutation on a copy of the snapshot; the copy replaces the live
    /// snapshot only once it is on disk.
    fn mutate<T>(
        &mut self,
        op: impl FnOnce(&mut Snapshot) -> StoreResult<T>,
    ) -> StoreResult<T> {
        let mut next = self.snapshot.clone();
        let out = op(&mut next)?;
        self.persist(&next)?;
        self.snapshot = next;
        Ok(out)
    }
}

impl RecordStore for JsonFileStore {
    fn get_indicator(&self, id: &str) -> StoreResult<Indicator> {
        self.snapshot.get_indicator(id)
    }

    fn list_indicators(&self) -> StoreResult<Vec<Indicator>> {
        Ok(self.snapshot.indicators.clone())
    }

    fn create_indicator(
        &mut self,
        data: IndicatorData,
        organization_id: Option<String>,
    ) -> StoreResult<Indicator> {
        self.mutate(|snapshot| snapshot.create_indicator(data, organization_id))
    }

    fn update_indicator(&mut self, id: &str, patch: IndicatorPatch) -> StoreResult<Indicator> {
        self.mutate(|snapshot| snapshot.update_indicator(id, patch))
    }

    fn delete_indicator(&mut self, id: &str) -> StoreResult<()> {
        self.mutate(|snapshot| snapshot.delete_indicator(id))
    }

    fn get_organization(&self, id: &str) -> StoreResult<Organization> {
        self.snapshot.get_organization(id)
    }

    fn find_first_organization(
        &self,
        conditions: &[OrgCondition],
    ) -> StoreResult<Option<Organization>> {
        Ok(self.snapshot.find_first_organization(conditions))
    }

    fn create_organization(&mut self, new_org: NewOrganization) -> StoreResult<Organization> {
        self.mutate(|snapshot| Ok(snapshot.create_organization(new_org)))
    }

    fn update_organization(&mut self, id: &str, patch: OrgPatch) -> StoreResult<Organization> {
        self.mutate(|snapshot| snapshot.update_organization(id, patch))
    }
}
