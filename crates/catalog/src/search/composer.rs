//! Query composition.
//!
//! [`QueryComposer`] folds the active criteria, the search controls and the
//! caller into one [`QueryPlan`]: a predicate tree anchored on
//! `product.id > 0`, the joins it needs, the row grouping, the ordering and
//! the de-duplication policy. Composition is pure; anything that needs the
//! store (location closures, synonym ids, the class catalog) is resolved
//! beforehand into [`Lookups`].

use serde::Serialize;

use crate::caller::CallerContext;
use crate::types::{
    ActiveCriteria, CriterionKey, CriterionValue, DisplayBy, OrderBy, RequestPreset,
    SearchControls,
};

use super::fuzzy::normalize_name;
use super::predicate::{CompareOp, Field, Join, JoinPlan, Predicate, Scalar, Table};
use super::registry::CriterionRegistry;

/// `product.id`
pub const PRODUCT_ID: Field = Field::product("id");
/// `name.label`
pub const NAME_LABEL: Field = Field::new(Table::Name, "label");
/// `name.label_nost`
pub const NAME_LABEL_NOST: Field = Field::new(Table::Name, "label_nost");
/// `storage.store_location`
pub const STORAGE_LOCATION: Field = Field::storage("store_location");
/// `borrow.borrower`
pub const BORROW_BORROWER: Field = Field::new(Table::Borrow, "borrower");

const STORAGE_ARCHIVE: Field = Field::storage("archive");
const LOCATION_ENTITY: Field = Field::new(Table::StoreLocation, "entity");

/// Which rows a plan selects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Projection {
    /// Product and name columns, one row per product.
    ByProduct,
    /// Storage columns with their product, one row per storage unit.
    ByStorage,
    /// Every column of every joined table.
    Export,
}

/// One ordering term.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum OrderTerm {
    /// Ascending on a field.
    Asc(Field),
    /// Rows whose `field` equals `value` first.
    ExactFirst {
        /// Field compared.
        field: Field,
        /// Value ranked first.
        value: String,
    },
}

/// A composed query.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryPlan {
    /// The full conjunction, base predicate included.
    pub predicate: Predicate,
    /// Joins beyond `product`/`name`.
    pub joins: JoinPlan,
    /// Row shape.
    pub projection: Projection,
    /// De-duplicate rows.
    pub distinct: bool,
    /// Count distinct `product.id` rather than rows.
    pub count_distinct: bool,
    /// Ordering terms; `product.id` is always appended as a tie-breaker.
    pub order: Vec<OrderTerm>,
}

/// Store-derived inputs for composition.
#[derive(Debug, Clone, Default)]
pub struct Lookups {
    /// Store locations the `store_location` criterion expands to.
    pub locations: Vec<i64>,
    /// Names matching the name pattern, searched among product synonyms.
    pub synonym_name_ids: Vec<i64>,
    /// Every class of compounds in the catalog.
    pub class_ids: Vec<i64>,
}

/// Turns a typed product name into a `LIKE` pattern.
///
/// The query is trimmed and uppercased, `-` becomes the single-character
/// wildcard and quotes become `%`.
pub fn name_pattern(raw: &str) -> String {
    let normalized = raw
        .trim()
        .to_uppercase()
        .replace('-', "_")
        .replace(['\'', '`'], "%");
    format!("%{}%", normalized)
}

/// Builds query plans.
pub struct QueryComposer<'a> {
    registry: &'a CriterionRegistry,
}

impl<'a> QueryComposer<'a> {
    /// Creates a composer over `registry`.
    pub fn new(registry: &'a CriterionRegistry) -> Self {
        Self { registry }
    }

    /// Composes the plan for one search.
    pub fn compose(
        &self,
        criteria: &ActiveCriteria,
        controls: &SearchControls,
        caller: &CallerContext,
        lookups: &Lookups,
    ) -> QueryPlan {
        let mut joins = JoinPlan::new();
        let mut parts = vec![Predicate::compare(PRODUCT_ID, CompareOp::Gt, Scalar::Int(0))];

        if !caller.can_see_restricted() {
            parts.push(Predicate::is(Field::product("restricted_access"), false));
        }

        for (key, value) in criteria.iter() {
            if let Some(def) = self.registry.definition(key) {
                for join in def.required_joins(value) {
                    joins.require(*join);
                }
            }
            if let Some(predicate) = criterion_predicate(key, value, criteria, caller, lookups) {
                parts.push(predicate);
            }
        }

        let by_storage = controls.display_by == DisplayBy::Storage;
        if by_storage {
            joins.require(Join::Storage);
            joins.require(Join::StoreLocation);
            parts.push(Predicate::is(STORAGE_ARCHIVE, false));
            parts.push(Predicate::belongs(LOCATION_ENTITY, caller.entity_ids().to_vec()));
        }

        let projection = match (controls.export.is_some(), by_storage) {
            (true, _) => {
                joins.optional(Join::Storage);
                joins.optional(Join::Borrow);
                Projection::Export
            }
            (false, true) => Projection::ByStorage,
            (false, false) => Projection::ByProduct,
        };

        let name = criteria.text(CriterionKey::Name);
        let (order, distinct) = match name {
            Some(name) if controls.did_you_mean => (
                vec![
                    OrderTerm::ExactFirst {
                        field: NAME_LABEL,
                        value: normalize_name(name),
                    },
                    OrderTerm::Asc(NAME_LABEL_NOST),
                ],
                !by_storage,
            ),
            _ if by_storage => match controls.order_by {
                OrderBy::Storage => (vec![OrderTerm::Asc(STORAGE_LOCATION)], false),
                OrderBy::Borrower => {
                    joins.optional(Join::Borrow);
                    (
                        vec![
                            OrderTerm::Asc(BORROW_BORROWER),
                            OrderTerm::Asc(STORAGE_LOCATION),
                        ],
                        false,
                    )
                }
            },
            _ => (vec![OrderTerm::Asc(NAME_LABEL_NOST)], true),
        };

        let export = projection == Projection::Export;
        QueryPlan {
            predicate: Predicate::all(parts),
            distinct: distinct && !export && joins.has_one_to_many(),
            count_distinct: !by_storage && !export,
            joins,
            projection,
            order,
        }
    }
}

fn criterion_predicate(
    key: CriterionKey,
    value: &CriterionValue,
    criteria: &ActiveCriteria,
    caller: &CallerContext,
    lookups: &Lookups,
) -> Option<Predicate> {
    use CriterionKey as K;

    let ids = || criteria.ids(key);
    let id = || criteria.id(key).map(Scalar::Int);
    let text = || criteria.text(key).map(|t| Scalar::Text(t.to_string()));
    let since = |field: Field, op: CompareOp| {
        criteria
            .datetime(key)
            .map(|dt| Predicate::compare(field, op, Scalar::DateTime(dt)))
    };
    let any_contains = |field: Field| {
        Predicate::any(ids().into_iter().map(|v| Predicate::contains(field, v)))
    };

    let predicate = match key {
        K::Request => match value {
            CriterionValue::Preset(RequestPreset::Organization) => Predicate::all([
                Predicate::compare(Field::storage("id"), CompareOp::Gt, Scalar::Int(0)),
                Predicate::is(STORAGE_ARCHIVE, false),
            ]),
            _ => return None,
        },
        K::ProductId => Predicate::belongs(PRODUCT_ID, ids()),
        K::NotArchive => Predicate::is(STORAGE_ARCHIVE, false),
        K::Archive => Predicate::is(STORAGE_ARCHIVE, true),
        K::Bookmark => Predicate::eq(
            Field::new(Table::Bookmark, "person"),
            Scalar::Int(caller.person_id()),
        ),
        K::Entity => Predicate::belongs(LOCATION_ENTITY, ids()),
        K::StoreLocation => Predicate::all([
            Predicate::is(STORAGE_ARCHIVE, false),
            Predicate::belongs(STORAGE_LOCATION, lookups.locations.clone()),
        ]),
        K::BorrowEntity => Predicate::belongs(LOCATION_ENTITY, caller.entity_ids().to_vec()),
        K::Borrower => Predicate::eq(BORROW_BORROWER, id()?),
        K::PhysicalState => Predicate::eq(Field::product("physical_state"), id()?),
        K::IsCmr => Predicate::is(Field::product("is_cmr"), true),
        K::IsRadio => Predicate::is(Field::product("is_radio"), true),
        K::ToDestroy => Predicate::is(Field::storage("to_destroy"), true),
        K::CasNumber => Predicate::eq(Field::product("cas_number"), text()?),
        K::CeNumber => Predicate::eq(Field::product("ce_number"), text()?),
        K::ProductDatetime => since(Field::product("creation_datetime"), CompareOp::Ge)?,
        K::EntryDatetime => since(Field::storage("entry_datetime"), CompareOp::Ge)?,
        K::ExitDatetime => since(Field::storage("exit_datetime"), CompareOp::Le)?,
        K::Barecode => Predicate::like(
            Field::storage("barecode"),
            format!("%{}%", criteria.text(key)?),
        ),
        K::Comment => Predicate::like(
            Field::storage("comment"),
            format!("%{}%", criteria.text(key)?),
        ),
        K::Name => {
            let pattern = name_pattern(criteria.text(key)?);
            Predicate::any(
                std::iter::once(Predicate::like(NAME_LABEL, pattern)).chain(
                    lookups
                        .synonym_name_ids
                        .iter()
                        .map(|id| Predicate::contains(Field::product("synonym"), *id)),
                ),
            )
        }
        K::EmpiricalFormula => Predicate::eq(Field::product("empirical_formula"), id()?),
        K::LinearFormula => Predicate::eq(Field::product("linear_formula"), id()?),
        K::ClassOfCompounds => {
            let field = Field::product("class_of_compounds");
            let selected = ids();
            if criteria.contains(K::ExactCoc) {
                let excluded = lookups
                    .class_ids
                    .iter()
                    .filter(|c| !selected.contains(c))
                    .map(|c| Predicate::not(Predicate::contains(field, *c)));
                Predicate::all(
                    selected
                        .iter()
                        .map(|c| Predicate::contains(field, *c))
                        .chain(excluded)
                        .collect::<Vec<_>>(),
                )
            } else {
                any_contains(field)
            }
        }
        K::RiskPhrase => any_contains(Field::product("risk_phrase")),
        K::SafetyPhrase => any_contains(Field::product("safety_phrase")),
        K::HazardStatement => any_contains(Field::product("hazard_statement")),
        K::PrecautionaryStatement => any_contains(Field::product("precautionary_statement")),
        K::HazardCode => any_contains(Field::product("hazard_code")),
        K::Symbol => any_contains(Field::product("symbol")),
        K::PersonPc => Predicate::eq(Field::product("person"), id()?),
        K::PersonSc | K::PersonAsc => Predicate::eq(Field::storage("person"), id()?),
        K::IncludeChildrenStoreLocation | K::ExactCoc => return None,
    };
    Some(predicate)
}
