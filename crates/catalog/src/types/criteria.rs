//! Search criterion types.

use std::collections::BTreeMap;
use std::fmt;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// The closed set of filter keys the engine understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[allow(missing_docs)] // variants are the request keys in snake_case
pub enum CriterionKey {
    /// Preset scope: every product, the organization's stock, or the stock
    /// of one entity or store location.
    Request,
    ProductId,
    NotArchive,
    Archive,
    Bookmark,
    Entity,
    StoreLocation,
    IncludeChildrenStoreLocation,
    BorrowEntity,
    Borrower,
    PhysicalState,
    IsCmr,
    IsRadio,
    ToDestroy,
    CasNumber,
    CeNumber,
    ProductDatetime,
    EntryDatetime,
    ExitDatetime,
    Barecode,
    Comment,
    Name,
    EmpiricalFormula,
    LinearFormula,
    ClassOfCompounds,
    ExactCoc,
    RiskPhrase,
    SafetyPhrase,
    HazardStatement,
    PrecautionaryStatement,
    HazardCode,
    Symbol,
    PersonPc,
    PersonSc,
    PersonAsc,
}

impl CriterionKey {
    /// Every key, in declaration order.
    pub const ALL: [CriterionKey; 35] = [
        CriterionKey::Request,
        CriterionKey::ProductId,
        CriterionKey::NotArchive,
        CriterionKey::Archive,
        CriterionKey::Bookmark,
        CriterionKey::Entity,
        CriterionKey::StoreLocation,
        CriterionKey::IncludeChildrenStoreLocation,
        CriterionKey::BorrowEntity,
        CriterionKey::Borrower,
        CriterionKey::PhysicalState,
        CriterionKey::IsCmr,
        CriterionKey::IsRadio,
        CriterionKey::ToDestroy,
        CriterionKey::CasNumber,
        CriterionKey::CeNumber,
        CriterionKey::ProductDatetime,
        CriterionKey::EntryDatetime,
        CriterionKey::ExitDatetime,
        CriterionKey::Barecode,
        CriterionKey::Comment,
        CriterionKey::Name,
        CriterionKey::EmpiricalFormula,
        CriterionKey::LinearFormula,
        CriterionKey::ClassOfCompounds,
        CriterionKey::ExactCoc,
        CriterionKey::RiskPhrase,
        CriterionKey::SafetyPhrase,
        CriterionKey::HazardStatement,
        CriterionKey::PrecautionaryStatement,
        CriterionKey::HazardCode,
        CriterionKey::Symbol,
        CriterionKey::PersonPc,
        CriterionKey::PersonSc,
        CriterionKey::PersonAsc,
    ];

    /// The request parameter name of this key.
    pub fn as_str(&self) -> &'static str {
        match self {
            CriterionKey::Request => "request",
            CriterionKey::ProductId => "product_id",
            CriterionKey::NotArchive => "not_archive",
            CriterionKey::Archive => "archive",
            CriterionKey::Bookmark => "bookmark",
            CriterionKey::Entity => "entity",
            CriterionKey::StoreLocation => "store_location",
            CriterionKey::IncludeChildrenStoreLocation => "include_children_store_location",
            CriterionKey::BorrowEntity => "borrow_entity",
            CriterionKey::Borrower => "borrower",
            CriterionKey::PhysicalState => "physical_state",
            CriterionKey::IsCmr => "is_cmr",
            CriterionKey::IsRadio => "is_radio",
            CriterionKey::ToDestroy => "to_destroy",
            CriterionKey::CasNumber => "cas_number",
            CriterionKey::CeNumber => "ce_number",
            CriterionKey::ProductDatetime => "product_datetime",
            CriterionKey::EntryDatetime => "entry_datetime",
            CriterionKey::ExitDatetime => "exit_datetime",
            CriterionKey::Barecode => "barecode",
            CriterionKey::Comment => "comment",
            CriterionKey::Name => "name",
            CriterionKey::EmpiricalFormula => "empirical_formula",
            CriterionKey::LinearFormula => "linear_formula",
            CriterionKey::ClassOfCompounds => "class_of_compounds",
            CriterionKey::ExactCoc => "exact_coc",
            CriterionKey::RiskPhrase => "risk_phrase",
            CriterionKey::SafetyPhrase => "safety_phrase",
            CriterionKey::HazardStatement => "hazard_statement",
            CriterionKey::PrecautionaryStatement => "precautionary_statement",
            CriterionKey::HazardCode => "hazard_code",
            CriterionKey::Symbol => "symbol",
            CriterionKey::PersonPc => "person_pc",
            CriterionKey::PersonSc => "person_sc",
            CriterionKey::PersonAsc => "person_asc",
        }
    }

    /// Looks a key up by its request parameter name.
    pub fn parse(name: &str) -> Option<Self> {
        CriterionKey::ALL.into_iter().find(|k| k.as_str() == name)
    }
}

impl fmt::Display for CriterionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Values accepted by the `request` key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestPreset {
    /// The whole catalog.
    All,
    /// Non-archived stock held by the organization.
    Organization,
    /// Stock of the entity named by `is_in_entity`.
    Entity,
    /// Stock of the store location named by `is_in_store_location`.
    StoreLocation,
}

/// A normalized criterion value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CriterionValue {
    /// Presence-only switch.
    Flag,
    /// A single identifier.
    Id(i64),
    /// One or more identifiers.
    Ids(Vec<i64>),
    /// Trimmed, non-empty text.
    Text(String),
    /// A date bound.
    DateTime(NaiveDateTime),
    /// A `request` preset.
    Preset(RequestPreset),
}

impl fmt::Display for CriterionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CriterionValue::Flag => write!(f, "yes"),
            CriterionValue::Id(id) => write!(f, "{}", id),
            CriterionValue::Ids(ids) => {
                let parts: Vec<String> = ids.iter().map(|i| i.to_string()).collect();
                write!(f, "{}", parts.join(","))
            }
            CriterionValue::Text(text) => write!(f, "{}", text),
            CriterionValue::DateTime(dt) => write!(f, "{}", dt.format(super::DATETIME_FORMAT)),
            CriterionValue::Preset(RequestPreset::All) => write!(f, "all"),
            CriterionValue::Preset(RequestPreset::Organization) => write!(f, "organization"),
            CriterionValue::Preset(RequestPreset::Entity) => write!(f, "entity"),
            CriterionValue::Preset(RequestPreset::StoreLocation) => write!(f, "store location"),
        }
    }
}

/// A key paired with its normalized value.
#[derive(Debug, Clone, PartialEq)]
pub struct Criterion {
    /// The filter key.
    pub key: CriterionKey,
    /// The normalized value.
    pub value: CriterionValue,
}

impl Criterion {
    /// Creates a criterion.
    pub fn new(key: CriterionKey, value: CriterionValue) -> Self {
        Self { key, value }
    }
}

/// The criteria in effect for one search, keyed by [`CriterionKey`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ActiveCriteria {
    values: BTreeMap<CriterionKey, CriterionValue>,
}

impl ActiveCriteria {
    /// Creates an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces a criterion.
    pub fn insert(&mut self, criterion: Criterion) {
        self.values.insert(criterion.key, criterion.value);
    }

    /// Returns `true` if `key` is active.
    pub fn contains(&self, key: CriterionKey) -> bool {
        self.values.contains_key(&key)
    }

    /// Returns the value of `key`.
    pub fn get(&self, key: CriterionKey) -> Option<&CriterionValue> {
        self.values.get(&key)
    }

    /// Returns the identifiers of `key` whether it holds one or many.
    pub fn ids(&self, key: CriterionKey) -> Vec<i64> {
        match self.values.get(&key) {
            Some(CriterionValue::Ids(ids)) => ids.clone(),
            Some(CriterionValue::Id(id)) => vec![*id],
            _ => Vec::new(),
        }
    }

    /// Returns the single identifier of `key`.
    pub fn id(&self, key: CriterionKey) -> Option<i64> {
        match self.values.get(&key) {
            Some(CriterionValue::Id(id)) => Some(*id),
            _ => None,
        }
    }

    /// Returns the text of `key`.
    pub fn text(&self, key: CriterionKey) -> Option<&str> {
        match self.values.get(&key) {
            Some(CriterionValue::Text(text)) => Some(text.as_str()),
            _ => None,
        }
    }

    /// Returns the date bound of `key`.
    pub fn datetime(&self, key: CriterionKey) -> Option<NaiveDateTime> {
        match self.values.get(&key) {
            Some(CriterionValue::DateTime(dt)) => Some(*dt),
            _ => None,
        }
    }

    /// Iterates active criteria in key order.
    pub fn iter(&self) -> impl Iterator<Item = (CriterionKey, &CriterionValue)> {
        self.values.iter().map(|(k, v)| (*k, v))
    }

    /// Number of active criteria.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns `true` if nothing is active.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
