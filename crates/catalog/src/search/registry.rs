//! Criterion registry.
//!
//! The registry declares every supported filter key: the shape of its value,
//! the label shown in the search description, the joins it needs and the
//! permission it is gated behind. It turns raw request values into
//! [`Criterion`]s and checks them against the caller.

use std::collections::HashMap;

use chrono::{NaiveDate, NaiveDateTime};
use tracing::debug;

use crate::caller::Permission;
use crate::core::PermissionOracle;
use crate::error::{CatalogError, CatalogResult};
use crate::types::{
    control, ActiveCriteria, Criterion, CriterionKey, CriterionValue, RawRequest, RequestPreset,
    DATETIME_FORMAT,
};

use super::predicate::Join;

/// Shape of a criterion value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    /// True whenever the key is present.
    Flag,
    /// True when present, unless blank or `0`.
    Switch,
    /// A single identifier.
    Id,
    /// A single identifier where `0` means unset.
    OptionalId,
    /// One or more identifiers; a lone scalar becomes a one-element list.
    Ids,
    /// Free text.
    Text,
    /// `YYYY-MM-DD HH:MM:SS` (a bare date means midnight).
    DateTime,
    /// A `request` preset.
    Preset,
}

/// Definition of one filter key.
#[derive(Debug, Clone)]
pub struct CriterionDefinition {
    /// The key.
    pub key: CriterionKey,
    /// Value shape.
    pub kind: ValueKind,
    /// Label used in the search description.
    pub label: &'static str,
    /// Joins the criterion needs, activated as inner joins.
    pub joins: &'static [Join],
    /// Permission required to use the criterion.
    pub permission: Option<Permission>,
}

impl CriterionDefinition {
    /// Creates a definition with no joins and no permission.
    pub fn new(key: CriterionKey, kind: ValueKind, label: &'static str) -> Self {
        Self {
            key,
            kind,
            label,
            joins: &[],
            permission: None,
        }
    }

    /// Sets the joins.
    pub fn with_joins(mut self, joins: &'static [Join]) -> Self {
        self.joins = joins;
        self
    }

    /// Sets the gating permission.
    pub fn with_permission(mut self, permission: Permission) -> Self {
        self.permission = Some(permission);
        self
    }

    /// Permission needed for this particular value.
    ///
    /// The `request` key is gated for the organization, entity and store
    /// location presets only.
    pub fn required_permission(&self, value: &CriterionValue) -> Option<Permission> {
        match (self.key, value) {
            (
                CriterionKey::Request,
                CriterionValue::Preset(RequestPreset::Organization | RequestPreset::Entity),
            ) => Some(Permission::SelectSc),
            (CriterionKey::Request, CriterionValue::Preset(RequestPreset::StoreLocation)) => {
                Some(Permission::ReadSc)
            }
            (CriterionKey::Request, _) => None,
            _ => self.permission,
        }
    }

    /// Joins needed for this particular value.
    pub fn required_joins(&self, value: &CriterionValue) -> &'static [Join] {
        match (self.key, value) {
            (CriterionKey::Request, CriterionValue::Preset(RequestPreset::Organization)) => {
                &[Join::Storage]
            }
            (CriterionKey::Request, _) => &[],
            _ => self.joins,
        }
    }

    /// Parses raw request values.
    ///
    /// Returns `Ok(None)` when the value is blank, which means the criterion
    /// is absent.
    pub fn normalize(&self, raw: &[String]) -> CatalogResult<Option<CriterionValue>> {
        let values: Vec<&str> = raw
            .iter()
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
            .collect();
        let first = values.first().copied();

        let value = match self.kind {
            ValueKind::Flag => Some(CriterionValue::Flag),
            ValueKind::Switch => match first {
                None | Some("0") => None,
                Some(_) => Some(CriterionValue::Flag),
            },
            ValueKind::Id => first.map(|v| self.parse_id(v)).transpose()?.map(CriterionValue::Id),
            ValueKind::OptionalId => match first {
                None | Some("0") => None,
                Some(v) => Some(CriterionValue::Id(self.parse_id(v)?)),
            },
            ValueKind::Ids => {
                let ids = values
                    .iter()
                    .map(|v| self.parse_id(v))
                    .collect::<CatalogResult<Vec<_>>>()?;
                if ids.is_empty() {
                    None
                } else {
                    Some(CriterionValue::Ids(ids))
                }
            }
            ValueKind::Text => first.map(|v| CriterionValue::Text(v.to_string())),
            ValueKind::DateTime => first
                .map(|v| self.parse_datetime(v))
                .transpose()?
                .map(CriterionValue::DateTime),
            ValueKind::Preset => match first {
                None => None,
                Some("all") => Some(CriterionValue::Preset(RequestPreset::All)),
                Some("organization") => Some(CriterionValue::Preset(RequestPreset::Organization)),
                Some("entity") => Some(CriterionValue::Preset(RequestPreset::Entity)),
                Some("store_location") => {
                    Some(CriterionValue::Preset(RequestPreset::StoreLocation))
                }
                Some(other) => {
                    return Err(CatalogError::invalid(
                        self.key.as_str(),
                        format!("unknown preset '{}'", other),
                    ));
                }
            },
        };
        Ok(value)
    }

    fn parse_id(&self, raw: &str) -> CatalogResult<i64> {
        raw.parse::<i64>().map_err(|_| {
            CatalogError::invalid(self.key.as_str(), format!("'{}' is not an identifier", raw))
        })
    }

    fn parse_datetime(&self, raw: &str) -> CatalogResult<NaiveDateTime> {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, DATETIME_FORMAT) {
            return Ok(dt);
        }
        NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .ok()
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .ok_or_else(|| {
                CatalogError::invalid(
                    self.key.as_str(),
                    format!("'{}' is not a date (expected YYYY-MM-DD HH:MM:SS)", raw),
                )
            })
    }
}

/// Registry of criterion definitions.
#[derive(Debug, Clone)]
pub struct CriterionRegistry {
    definitions: HashMap<CriterionKey, CriterionDefinition>,
}

impl CriterionRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self {
            definitions: HashMap::new(),
        }
    }

    /// The catalog's standard filter keys.
    pub fn standard() -> Self {
        use CriterionKey as K;
        use ValueKind as V;

        const STORAGE: &[Join] = &[Join::Storage];
        const STORAGE_LOCATION: &[Join] = &[Join::Storage, Join::StoreLocation];

        let mut registry = Self::new();
        for def in [
            CriterionDefinition::new(K::Request, V::Preset, "scope"),
            CriterionDefinition::new(K::ProductId, V::Ids, "product"),
            CriterionDefinition::new(K::NotArchive, V::Flag, "not archived").with_joins(STORAGE),
            CriterionDefinition::new(K::Archive, V::Flag, "archived")
                .with_joins(STORAGE)
                .with_permission(Permission::ReadArchive),
            CriterionDefinition::new(K::Bookmark, V::Flag, "bookmarked")
                .with_joins(&[Join::Bookmark]),
            CriterionDefinition::new(K::Entity, V::Ids, "entity")
                .with_joins(STORAGE_LOCATION)
                .with_permission(Permission::SelectSc),
            CriterionDefinition::new(K::StoreLocation, V::Ids, "store location")
                .with_joins(STORAGE)
                .with_permission(Permission::ReadSc),
            CriterionDefinition::new(
                K::IncludeChildrenStoreLocation,
                V::Flag,
                "including sub-locations",
            ),
            CriterionDefinition::new(K::BorrowEntity, V::Switch, "borrowed in my entities")
                .with_joins(&[Join::Borrow, Join::Storage, Join::StoreLocation]),
            CriterionDefinition::new(K::Borrower, V::OptionalId, "borrower")
                .with_joins(&[Join::Borrow, Join::Storage]),
            CriterionDefinition::new(K::PhysicalState, V::OptionalId, "physical state"),
            CriterionDefinition::new(K::IsCmr, V::Flag, "CMR"),
            CriterionDefinition::new(K::IsRadio, V::Flag, "radioactive"),
            CriterionDefinition::new(K::ToDestroy, V::Flag, "to destroy").with_joins(STORAGE),
            CriterionDefinition::new(K::CasNumber, V::Text, "CAS number"),
            CriterionDefinition::new(K::CeNumber, V::Text, "CE number"),
            CriterionDefinition::new(K::ProductDatetime, V::DateTime, "product created since"),
            CriterionDefinition::new(K::EntryDatetime, V::DateTime, "entered since")
                .with_joins(STORAGE),
            CriterionDefinition::new(K::ExitDatetime, V::DateTime, "exited before")
                .with_joins(STORAGE),
            CriterionDefinition::new(K::Barecode, V::Text, "barecode").with_joins(STORAGE),
            CriterionDefinition::new(K::Comment, V::Text, "comment").with_joins(STORAGE),
            CriterionDefinition::new(K::Name, V::Text, "name"),
            CriterionDefinition::new(K::EmpiricalFormula, V::Id, "empirical formula"),
            CriterionDefinition::new(K::LinearFormula, V::Id, "linear formula"),
            CriterionDefinition::new(K::ClassOfCompounds, V::Ids, "class of compounds"),
            CriterionDefinition::new(K::ExactCoc, V::Flag, "exact classes"),
            CriterionDefinition::new(K::RiskPhrase, V::Ids, "risk phrase"),
            CriterionDefinition::new(K::SafetyPhrase, V::Ids, "safety phrase"),
            CriterionDefinition::new(K::HazardStatement, V::Ids, "hazard statement"),
            CriterionDefinition::new(K::PrecautionaryStatement, V::Ids, "precautionary statement"),
            CriterionDefinition::new(K::HazardCode, V::Ids, "hazard code"),
            CriterionDefinition::new(K::Symbol, V::Ids, "symbol"),
            CriterionDefinition::new(K::PersonPc, V::Id, "product created by"),
            CriterionDefinition::new(K::PersonSc, V::Id, "storage created by").with_joins(STORAGE),
            CriterionDefinition::new(K::PersonAsc, V::Id, "archived storage created by")
                .with_joins(STORAGE),
        ] {
            registry.register(def);
        }
        registry
    }

    /// Adds or replaces a definition.
    pub fn register(&mut self, definition: CriterionDefinition) {
        self.definitions.insert(definition.key, definition);
    }

    /// Returns the definition of `key`.
    pub fn definition(&self, key: CriterionKey) -> Option<&CriterionDefinition> {
        self.definitions.get(&key)
    }

    /// Returns `true` if `name` is a registered criterion key.
    pub fn recognizes(&self, name: &str) -> bool {
        CriterionKey::parse(name).is_some_and(|k| self.definitions.contains_key(&k))
    }

    /// Number of registered definitions.
    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    /// Returns `true` if nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    /// Parses one raw criterion. Blank values yield `Ok(None)`.
    pub fn normalize(&self, key: CriterionKey, raw: &[String]) -> CatalogResult<Option<Criterion>> {
        let Some(definition) = self.definitions.get(&key) else {
            return Ok(None);
        };
        Ok(definition
            .normalize(raw)?
            .map(|value| Criterion::new(key, value)))
    }

    /// Checks that `caller` may use `criterion`.
    pub fn authorize<C: PermissionOracle + ?Sized>(
        &self,
        criterion: &Criterion,
        caller: &C,
    ) -> CatalogResult<()> {
        let required = self
            .definitions
            .get(&criterion.key)
            .and_then(|d| d.required_permission(&criterion.value));
        match required {
            Some(permission) if !caller.has_permission(permission) => {
                Err(CatalogError::forbidden(criterion.key.as_str(), permission))
            }
            _ => Ok(()),
        }
    }

    /// Normalizes and authorizes every criterion of `request`.
    ///
    /// Controls are skipped and unknown keys are ignored.
    pub fn parse_request<C: PermissionOracle + ?Sized>(
        &self,
        request: &RawRequest,
        caller: &C,
    ) -> CatalogResult<ActiveCriteria> {
        let mut criteria = ActiveCriteria::new();
        for (name, raw) in request.iter() {
            let Some(key) = CriterionKey::parse(name) else {
                if !is_control(name) {
                    debug!(parameter = name, "ignoring unknown search parameter");
                }
                continue;
            };
            if let Some(criterion) = self.normalize(key, raw)? {
                self.authorize(&criterion, caller)?;
                criteria.insert(criterion);
            }
        }
        Ok(criteria)
    }

    /// Describes `criteria` in one line, e.g. `name: ACETONE, CMR`.
    pub fn describe(&self, criteria: &ActiveCriteria) -> String {
        let parts: Vec<String> = criteria
            .iter()
            .filter_map(|(key, value)| {
                let def = self.definitions.get(&key)?;
                Some(match value {
                    CriterionValue::Flag => def.label.to_string(),
                    other => format!("{}: {}", def.label, other),
                })
            })
            .collect();
        if parts.is_empty() {
            "all products".to_string()
        } else {
            parts.join(", ")
        }
    }
}

impl Default for CriterionRegistry {
    fn default() -> Self {
        Self::standard()
    }
}

fn is_control(name: &str) -> bool {
    matches!(
        name,
        control::DISPLAY_BY
            | control::ORDER_BY
            | control::PAGE
            | control::RESULT_PER_PAGE
            | control::PAGE_SIZE
            | control::KEEP_LAST_SEARCH
            | control::PAGINATE
            | control::EXPORT_CSV
            | control::EXPORT_HTML
            | control::IS_DID_YOU_MEAN
            | control::IS_IN_ENTITY
            | control::IS_IN_STORE_LOCATION
    )
}

/// Rewrites the `entity` and `store_location` presets into their criteria.
///
/// `request=entity&is_in_entity=4` becomes `entity=4`, and likewise
/// `request=store_location&is_in_store_location=9` becomes
/// `store_location=9`. The criteria then go through the usual
/// normalization and authorization. A preset without its companion value
/// leaves the request untouched.
pub fn expand_preset(request: &mut RawRequest) {
    let (target, source) = match request.first(CriterionKey::Request.as_str()).map(str::trim) {
        Some("entity") => (CriterionKey::Entity, control::IS_IN_ENTITY),
        Some("store_location") => (CriterionKey::StoreLocation, control::IS_IN_STORE_LOCATION),
        _ => return,
    };
    if let Some(values) = request.remove(source) {
        request.set(target.as_str(), values);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::caller::CallerContext;

    fn raw(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn test_standard_covers_every_key() {
        let registry = CriterionRegistry::standard();
        assert_eq!(registry.len(), CriterionKey::ALL.len());
        for key in CriterionKey::ALL {
            assert!(registry.definition(key).is_some(), "missing {}", key);
        }
    }

    #[test]
    fn test_lone_scalar_becomes_list() {
        let registry = CriterionRegistry::standard();
        let c = registry
            .normalize(CriterionKey::Entity, &raw(&["4"]))
            .unwrap()
            .unwrap();
        assert_eq!(c.value, CriterionValue::Ids(vec![4]));
    }

    #[test]
    fn test_blank_is_absent() {
        let registry = CriterionRegistry::standard();
        assert!(registry.normalize(CriterionKey::Name, &raw(&["  "])).unwrap().is_none());
        assert!(registry.normalize(CriterionKey::Symbol, &raw(&["", " "])).unwrap().is_none());
        assert!(registry.normalize(CriterionKey::Borrower, &raw(&["0"])).unwrap().is_none());
        assert!(registry.normalize(CriterionKey::BorrowEntity, &raw(&["0"])).unwrap().is_none());
        assert!(registry.normalize(CriterionKey::PhysicalState, &raw(&["0"])).unwrap().is_none());
    }

    #[test]
    fn test_flags_are_presence_only() {
        let registry = CriterionRegistry::standard();
        for key in [CriterionKey::IsCmr, CriterionKey::Bookmark, CriterionKey::ExactCoc] {
            let c = registry.normalize(key, &raw(&[""])).unwrap().unwrap();
            assert_eq!(c.value, CriterionValue::Flag);
        }
    }

    #[test]
    fn test_invalid_values_name_key() {
        let registry = CriterionRegistry::standard();
        match registry.normalize(CriterionKey::ProductId, &raw(&["12", "abc"])) {
            Err(CatalogError::InvalidCriterion { key, .. }) => assert_eq!(key, "product_id"),
            other => panic!("expected InvalidCriterion, got {:?}", other),
        }
        match registry.normalize(CriterionKey::EntryDatetime, &raw(&["yesterday"])) {
            Err(CatalogError::InvalidCriterion { key, .. }) => assert_eq!(key, "entry_datetime"),
            other => panic!("expected InvalidCriterion, got {:?}", other),
        }
    }

    #[test]
    fn test_datetime_formats() {
        let registry = CriterionRegistry::standard();
        let full = registry
            .normalize(CriterionKey::ProductDatetime, &raw(&["2020-03-01 10:20:30"]))
            .unwrap()
            .unwrap();
        assert_eq!(full.value.to_string(), "2020-03-01 10:20:30");
        let date = registry
            .normalize(CriterionKey::ProductDatetime, &raw(&["2020-03-01"]))
            .unwrap()
            .unwrap();
        assert_eq!(date.value.to_string(), "2020-03-01 00:00:00");
    }

    #[test]
    fn test_entity_requires_select_sc() {
        let registry = CriterionRegistry::standard();
        let request = RawRequest::from_pairs([("entity", "1")]);

        let plain = CallerContext::builder(1).build();
        match registry.parse_request(&request, &plain) {
            Err(CatalogError::Forbidden { key, permission }) => {
                assert_eq!(key, "entity");
                assert_eq!(permission, Permission::SelectSc);
            }
            other => panic!("expected Forbidden, got {:?}", other),
        }

        let allowed = CallerContext::builder(1).permission(Permission::SelectSc).build();
        assert!(registry.parse_request(&request, &allowed).is_ok());
    }

    #[test]
    fn test_organization_preset_gated() {
        let registry = CriterionRegistry::standard();
        let plain = CallerContext::builder(1).build();
        assert!(registry
            .parse_request(&RawRequest::from_pairs([("request", "all")]), &plain)
            .is_ok());
        assert!(registry
            .parse_request(&RawRequest::from_pairs([("request", "organization")]), &plain)
            .is_err());
    }

    #[test]
    fn test_expand_entity_and_store_location_presets() {
        let mut request = RawRequest::from_pairs([("request", "entity"), ("is_in_entity", "4")]);
        expand_preset(&mut request);
        assert_eq!(request.get("entity").unwrap(), &["4"]);
        assert!(!request.contains("is_in_entity"));

        let mut request = RawRequest::from_pairs([
            ("request", "store_location"),
            ("is_in_store_location", "9"),
        ]);
        expand_preset(&mut request);
        assert_eq!(request.get("store_location").unwrap(), &["9"]);

        let mut request = RawRequest::from_pairs([("request", "all"), ("is_in_entity", "4")]);
        expand_preset(&mut request);
        assert!(!request.contains("entity"));
    }

    #[test]
    fn test_location_presets_gated() {
        let registry = CriterionRegistry::standard();
        let plain = CallerContext::builder(1).build();
        match registry.parse_request(&RawRequest::from_pairs([("request", "entity")]), &plain) {
            Err(CatalogError::Forbidden { permission, .. }) => {
                assert_eq!(permission, Permission::SelectSc)
            }
            other => panic!("expected Forbidden, got {:?}", other),
        }
        match registry.parse_request(
            &RawRequest::from_pairs([("request", "store_location")]),
            &plain,
        ) {
            Err(CatalogError::Forbidden { permission, .. }) => {
                assert_eq!(permission, Permission::ReadSc)
            }
            other => panic!("expected Forbidden, got {:?}", other),
        }

        let reader = CallerContext::builder(1).permission(Permission::ReadSc).build();
        let criteria = registry
            .parse_request(
                &RawRequest::from_pairs([("request", "store_location"), ("store_location", "9")]),
                &reader,
            )
            .unwrap();
        assert_eq!(criteria.ids(CriterionKey::StoreLocation), vec![9]);
    }

    #[test]
    fn test_unknown_keys_and_controls_ignored() {
        let registry = CriterionRegistry::standard();
        let caller = CallerContext::builder(1).build();
        let request = RawRequest::from_pairs([
            ("utm_source", "mail"),
            ("page", "2"),
            ("is_cmr", "on"),
        ]);
        let criteria = registry.parse_request(&request, &caller).unwrap();
        assert_eq!(criteria.len(), 1);
        assert!(criteria.contains(CriterionKey::IsCmr));
    }

    #[test]
    fn test_describe() {
        let registry = CriterionRegistry::standard();
        let caller = CallerContext::builder(1).build();
        let criteria = registry
            .parse_request(
                &RawRequest::from_pairs([("name", "acetone"), ("is_cmr", "")]),
                &caller,
            )
            .unwrap();
        assert_eq!(registry.describe(&criteria), "CMR, name: acetone");
        assert_eq!(registry.describe(&ActiveCriteria::new()), "all products");
    }
}
