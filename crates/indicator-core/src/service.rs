//! Ingest service: normalization, organization resolution and store calls.

use crate::error::Result;
use crate::indicator::{Indicator, IndicatorPatch};
use crate::normalize::normalize;
use crate::organization::{conditions_for, resolve, OrgAction, OrgFields};
use crate::record::ParsedRecord;
use crate::store::RecordStore;
use crate::view::{IndicatorQuery, IndicatorView};

/// Indicator lifecycle over a [`RecordStore`].
///
/// # Examples
///
/// ```
/// use indicator_core::{keys, IndicatorService, MemoryStore, ParsedRecord};
///
/// let mut service = IndicatorService::new(MemoryStore::new());
/// let record: ParsedRecord = [
///     (keys::SHORT_NAME, "Rainfall index"),
///     (keys::ORG_NAME, "Acme"),
/// ]
/// .into_iter()
/// .collect();
///
/// let indicator = service.ingest(&record)?;
/// let view = service.view(&indicator.id)?;
/// assert_eq!(view.organization_name.as_deref(), Some("Acme"));
/// # Ok::<(), indicator_core::IndicatorError>(())
/// ```
#[derive(Debug)]
pub struct IndicatorService<S> {
    store: S,
}

impl<S: RecordStore> IndicatorService<S> {
    #[inline]
    #[must_use = "creates a service over the given store"]
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Underlying store.
    #[inline]
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Give the store back.
    #[inline]
    pub fn into_store(self) -> S {
        self.store
    }

    /// Find or create the organization named by `org`, filling empty contact fields.
    ///
    /// Returns `None` when the fields carry neither a code nor a name.
    fn link_organization(&mut self, org: &OrgFields) -> Result<Option<String>> {
        if !org.is_identifiable() {
            log::debug!("Organization fields without code or name, not linking");
            return Ok(None);
        }

        let existing = self.store.find_first_organization(&conditions_for(org))?;
        let id = match resolve(existing.as_ref(), org) {
            OrgAction::Reuse { id } => id,
            OrgAction::Patch { id, patch } => {
                self.store.update_organization(&id, patch)?;
                id
            }
            OrgAction::Create(new_org) => self.store.create_organization(new_org)?.id,
        };
        Ok(Some(id))
    }

    /// Create an indicator from a parsed document.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails.
    pub fn ingest(&mut self, record: &ParsedRecord) -> Result<Indicator> {
        let normalized = normalize(record);
        let organization_id = match &normalized.organization {
            Some(org) => self.link_organization(org)?,
            None => None,
        };
        Ok(self
            .store
            .create_indicator(normalized.indicator, organization_id)?)
    }

    /// Re-run normalization on a newer document and apply it to `id`.
    ///
    /// Lists are replaced. Optional values the new document lacks keep their
    /// stored values. The organization is resolved again and relinked when the
    /// document names one.
    ///
    /// # Errors
    ///
    /// Returns a not-found error if `id` is unknown, or any store failure.
    pub fn rederive(&mut self, id: &str, record: &ParsedRecord) -> Result<Indicator> {
        self.store.get_indicator(id)?;

        let normalized = normalize(record);
        let mut patch = IndicatorPatch::rederived(normalized.indicator);
        if let Some(org) = &normalized.organization {
            if let Some(organization_id) = self.link_organization(org)? {
                patch = patch.with_organization(Some(organization_id));
            }
        }
        Ok(self.store.update_indicator(id, patch)?)
    }

    /// Apply a field-by-field update.
    ///
    /// # Errors
    ///
    /// Returns a not-found error if `id` (or a relinked organization) is unknown.
    pub fn update(&mut self, id: &str, patch: IndicatorPatch) -> Result<Indicator> {
        Ok(self.store.update_indicator(id, patch)?)
    }

    /// Delete an indicator. Its organization is kept.
    ///
    /// # Errors
    ///
    /// Returns a not-found error if `id` is unknown.
    pub fn delete(&mut self, id: &str) -> Result<()> {
        Ok(self.store.delete_indicator(id)?)
    }

    /// Fetch an indicator.
    ///
    /// # Errors
    ///
    /// Returns a not-found error if `id` is unknown.
    pub fn get(&self, id: &str) -> Result<Indicator> {
        Ok(self.store.get_indicator(id)?)
    }

    /// Fetch an indicator with its organization's fields inlined.
    ///
    /// # Errors
    ///
    /// Returns a not-found error if `id` is unknown.
    pub fn view(&self, id: &str) -> Result<IndicatorView> {
        let indicator = self.store.get_indicator(id)?;
        let organization = match indicator.organization_id.as_deref() {
            Some(org_id) => match self.store.get_organization(org_id) {
                Ok(org) => Some(org),
                Err(err) if err.is_not_found() => {
                    log::warn!("Indicator {id} links to missing organization {org_id}");
                    None
                }
                Err(err) => return Err(err.into()),
            },
            None => None,
        };
        Ok(IndicatorView::new(indicator, organization.as_ref()))
    }

    /// Indicators matching `query`, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails.
    pub fn search(&self, query: &IndicatorQuery) -> Result<Vec<Indicator>> {
        Ok(query.apply(self.store.list_indicators()?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enums::ThematicArea;
    use crate::keys;
    use crate::record::FieldValue;
    use crate::store::MemoryStore;

    fn record(entries: &[(&str, FieldValue)]) -> ParsedRecord {
        entries.iter().cloned().collect()
    }

    #[test]
    fn test_ingest_without_organization() {
        let mut service = IndicatorService::new(MemoryStore::new());
        let indicator = service.ingest(&ParsedRecord::new()).unwrap();
        assert_eq!(indicator.data.short_name, "Untitled Indicator");
        assert_eq!(indicator.organization_id, None);
    }

    #[test]
    fn test_contact_only_organization_is_not_linked() {
        let mut service = IndicatorService::new(MemoryStore::new());
        let indicator = service
            .ingest(&record(&[(keys::ORG_CONTACT_EMAIL, "a@b.org".into())]))
            .unwrap();
        assert_eq!(indicator.organization_id, None);
    }

    #[test]
    fn test_ingest_reuses_and_patches_organization() {
        let mut service = IndicatorService::new(MemoryStore::new());
        let first = service
            .ingest(&record(&[
                (keys::ORG_CODE, "ORG1".into()),
                (keys::ORG_NAME, "Acme".into()),
            ]))
            .unwrap();
        let second = service
            .ingest(&record(&[
                (keys::ORG_CODE, "ORG1".into()),
                (keys::ORG_WEBSITE, "https://acme.org".into()),
            ]))
            .unwrap();

        assert_eq!(first.organization_id, second.organization_id);
        let org_id = second.organization_id.unwrap();
        let org = service.store().get_organization(&org_id).unwrap();
        assert_eq!(org.name, "Acme");
        assert_eq!(org.website.as_deref(), Some("https://acme.org"));
    }

    #[test]
    fn test_ingest_matches_name_case_insensitively() {
        let mut service = IndicatorService::new(MemoryStore::new());
        let first = service
            .ingest(&record(&[(keys::ORG_NAME, "Acme Ltd".into())]))
            .unwrap();
        let second = service
            .ingest(&record(&[(keys::ORG_NAME, "ACME LTD".into())]))
            .unwrap();
        assert_eq!(first.organization_id, second.organization_id);
    }

    #[test]
    fn test_ingest_creates_unnamed_organization_for_code_only() {
        let mut service = IndicatorService::new(MemoryStore::new());
        let indicator = service
            .ingest(&record(&[(keys::ORG_CODE, "X9".into())]))
            .unwrap();
        let org = service
            .store()
            .get_organization(indicator.organization_id.as_deref().unwrap())
            .unwrap();
        assert_eq!(org.name, "Unnamed Organization");
    }

    #[test]
    fn test_rederive_replaces_lists_and_keeps_optionals() {
        let mut service = IndicatorService::new(MemoryStore::new());
        let created = service
            .ingest(&record(&[
                (keys::SHORT_NAME, "Rainfall".into()),
                (keys::METHODOLOGY, "Gauges".into()),
                (keys::THEMATIC_AREAS, vec!["Water", "Land"].into()),
                (keys::IMAGE, "data:image/png;base64,AA==".into()),
            ]))
            .unwrap();

        let updated = service
            .rederive(
                &created.id,
                &record(&[
                    (keys::SHORT_NAME, "Rainfall v2".into()),
                    (keys::THEMATIC_AREAS, vec!["Energy"].into()),
                    (keys::ORG_NAME, "Acme".into()),
                ]),
            )
            .unwrap();

        assert_eq!(updated.id, created.id);
        assert_eq!(updated.data.short_name, "Rainfall v2");
        assert_eq!(updated.data.thematic_areas, vec![ThematicArea::Energy]);
        assert_eq!(updated.data.methodology.as_deref(), Some("Gauges"));
        assert!(updated.data.image_url.is_some());
        assert!(updated.organization_id.is_some());
    }

    #[test]
    fn test_rederive_unknown_id_creates_nothing() {
        let mut service = IndicatorService::new(MemoryStore::new());
        let err = service
            .rederive("missing", &record(&[(keys::ORG_NAME, "Acme".into())]))
            .unwrap_err();
        assert!(err.is_not_found());
        assert!(service
            .store()
            .find_first_organization(&conditions_for(&OrgFields {
                name: Some("Acme".to_string()),
                ..OrgFields::default()
            }))
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_update_delete_and_search() {
        let mut service = IndicatorService::new(MemoryStore::new());
        let a = service
            .ingest(&record(&[
                (keys::SHORT_NAME, "Water quality".into()),
                (keys::THEMATIC_AREAS, vec!["Water"].into()),
            ]))
            .unwrap();
        service
            .ingest(&record(&[(keys::SHORT_NAME, "Forest cover".into())]))
            .unwrap();

        let patch: IndicatorPatch =
            serde_json::from_str(r#"{"description": "River sampling"}"#).unwrap();
        let updated = service.update(&a.id, patch).unwrap();
        assert_eq!(updated.data.description.as_deref(), Some("River sampling"));

        let hits = service
            .search(&IndicatorQuery::parse(Some("river"), Some("WATER")).unwrap())
            .unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(service.search(&IndicatorQuery::default()).unwrap().len(), 2);

        service.delete(&a.id).unwrap();
        assert!(service.get(&a.id).unwrap_err().is_not_found());
        assert!(service.delete(&a.id).unwrap_err().is_not_found());
    }
}
