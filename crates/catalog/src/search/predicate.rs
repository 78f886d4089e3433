//! Predicate trees and join plans.
//!
//! The composer builds a backend-neutral [`Predicate`] tree; backends render
//! it to their own query language. Fields are addressed as `table.column`
//! pairs over a fixed set of [`Table`]s.

use std::collections::BTreeMap;
use std::fmt;

use chrono::NaiveDateTime;
use serde::Serialize;

/// Tables a predicate can reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
#[allow(missing_docs)]
pub enum Table {
    Product,
    Name,
    Storage,
    StoreLocation,
    Borrow,
    Bookmark,
}

impl Table {
    /// Table name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Table::Product => "product",
            Table::Name => "name",
            Table::Storage => "storage",
            Table::StoreLocation => "store_location",
            Table::Borrow => "borrow",
            Table::Bookmark => "bookmark",
        }
    }

    /// The join that brings this table into a query, if it is not always
    /// present.
    pub fn join(&self) -> Option<Join> {
        match self {
            Table::Product | Table::Name => None,
            Table::Storage => Some(Join::Storage),
            Table::StoreLocation => Some(Join::StoreLocation),
            Table::Borrow => Some(Join::Borrow),
            Table::Bookmark => Some(Join::Bookmark),
        }
    }
}

/// A `table.column` reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Field {
    /// Owning table.
    pub table: Table,
    /// Column name.
    pub column: &'static str,
}

impl Field {
    /// Creates a field reference.
    pub const fn new(table: Table, column: &'static str) -> Self {
        Self { table, column }
    }

    /// Shorthand for a `product` column.
    pub const fn product(column: &'static str) -> Self {
        Self::new(Table::Product, column)
    }

    /// Shorthand for a `storage` column.
    pub const fn storage(column: &'static str) -> Self {
        Self::new(Table::Storage, column)
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.table.as_str(), self.column)
    }
}

/// A literal compared against a field.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Scalar {
    /// Integer or identifier.
    Int(i64),
    /// Boolean flag column.
    Bool(bool),
    /// Text, compared verbatim.
    Text(String),
    /// Date bound.
    DateTime(NaiveDateTime),
}

/// Comparison operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CompareOp {
    /// `=`
    Eq,
    /// `>`
    Gt,
    /// `>=`
    Ge,
    /// `<=`
    Le,
}

impl CompareOp {
    /// SQL spelling of the operator.
    pub fn as_sql(&self) -> &'static str {
        match self {
            CompareOp::Eq => "=",
            CompareOp::Gt => ">",
            CompareOp::Ge => ">=",
            CompareOp::Le => "<=",
        }
    }
}

/// A boolean condition over the joined tables.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Predicate {
    /// Always true.
    True,
    /// Every operand holds; an empty list is true.
    And(Vec<Predicate>),
    /// Some operand holds; an empty list is false.
    Or(Vec<Predicate>),
    /// Negation.
    Not(Box<Predicate>),
    /// `field <op> value`.
    Compare {
        /// Compared field.
        field: Field,
        /// Operator.
        op: CompareOp,
        /// Right-hand literal.
        value: Scalar,
    },
    /// `field` is one of `values`. An empty list matches nothing.
    #[allow(missing_docs)]
    Belongs { field: Field, values: Vec<i64> },
    /// The multi-valued `field` holds `value`.
    #[allow(missing_docs)]
    Contains { field: Field, value: i64 },
    /// SQL `LIKE` match.
    #[allow(missing_docs)]
    Like { field: Field, pattern: String },
}

impl Predicate {
    /// `field = value`.
    pub fn eq(field: Field, value: Scalar) -> Self {
        Predicate::Compare {
            field,
            op: CompareOp::Eq,
            value,
        }
    }

    /// `field <op> value`.
    pub fn compare(field: Field, op: CompareOp, value: Scalar) -> Self {
        Predicate::Compare { field, op, value }
    }

    /// `field = true` / `field = false`.
    pub fn is(field: Field, value: bool) -> Self {
        Self::eq(field, Scalar::Bool(value))
    }

    /// `field IN values`.
    pub fn belongs(field: Field, values: Vec<i64>) -> Self {
        Predicate::Belongs { field, values }
    }

    /// `field` contains `value`.
    pub fn contains(field: Field, value: i64) -> Self {
        Predicate::Contains { field, value }
    }

    /// `field LIKE pattern`.
    pub fn like(field: Field, pattern: impl Into<String>) -> Self {
        Predicate::Like {
            field,
            pattern: pattern.into(),
        }
    }

    /// Negation.
    #[allow(clippy::should_implement_trait)]
    pub fn not(inner: Predicate) -> Self {
        Predicate::Not(Box::new(inner))
    }

    /// Conjunction, flattening nested `And`s and dropping `True`.
    pub fn all(parts: impl IntoIterator<Item = Predicate>) -> Self {
        let mut flat = Vec::new();
        for part in parts {
            match part {
                Predicate::True => {}
                Predicate::And(inner) => flat.extend(inner),
                other => flat.push(other),
            }
        }
        match flat.len() {
            0 => Predicate::True,
            1 => flat.remove(0),
            _ => Predicate::And(flat),
        }
    }

    /// Disjunction. A single alternative is returned unwrapped.
    pub fn any(parts: impl IntoIterator<Item = Predicate>) -> Self {
        let mut flat: Vec<Predicate> = parts.into_iter().collect();
        match flat.len() {
            1 => flat.remove(0),
            _ => Predicate::Or(flat),
        }
    }

    /// Calls `f` on every leaf field.
    pub fn visit_fields(&self, f: &mut impl FnMut(&Field)) {
        match self {
            Predicate::True => {}
            Predicate::And(parts) | Predicate::Or(parts) => {
                for p in parts {
                    p.visit_fields(f);
                }
            }
            Predicate::Not(inner) => inner.visit_fields(f),
            Predicate::Compare { field, .. }
            | Predicate::Belongs { field, .. }
            | Predicate::Contains { field, .. }
            | Predicate::Like { field, .. } => f(field),
        }
    }
}

/// Optional joins around the `product`/`name` core.
///
/// `StoreLocation` and `Borrow` hang off `Storage`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
#[allow(missing_docs)]
pub enum Join {
    Storage,
    StoreLocation,
    Borrow,
    Bookmark,
}

impl Join {
    /// Join this one depends on.
    pub fn parent(&self) -> Option<Join> {
        match self {
            Join::StoreLocation | Join::Borrow => Some(Join::Storage),
            Join::Storage | Join::Bookmark => None,
        }
    }

    /// Returns `true` if the join can multiply product rows.
    pub fn is_one_to_many(&self) -> bool {
        !matches!(self, Join::StoreLocation)
    }
}

/// How a join is performed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum JoinMode {
    /// `LEFT JOIN`: keeps products without a match.
    Left,
    /// `INNER JOIN`: the criterion needs a matching row.
    Inner,
}

/// The joins a query activates, each exactly once.
///
/// Requiring a join upgrades a left join to an inner one; a join is never
/// downgraded.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct JoinPlan {
    joins: BTreeMap<Join, JoinMode>,
}

impl JoinPlan {
    /// An empty plan.
    pub fn new() -> Self {
        Self::default()
    }

    /// Activates `join` as an inner join, along with its parent.
    pub fn require(&mut self, join: Join) {
        self.activate(join, JoinMode::Inner);
    }

    /// Activates `join` as a left join unless it is already inner.
    pub fn optional(&mut self, join: Join) {
        self.activate(join, JoinMode::Left);
    }

    fn activate(&mut self, join: Join, mode: JoinMode) {
        if let Some(parent) = join.parent() {
            self.activate(parent, mode);
        }
        let entry = self.joins.entry(join).or_insert(mode);
        if mode > *entry {
            *entry = mode;
        }
    }

    /// Mode of `join`, if active.
    pub fn mode(&self, join: Join) -> Option<JoinMode> {
        self.joins.get(&join).copied()
    }

    /// Returns `true` if `join` is active.
    pub fn contains(&self, join: Join) -> bool {
        self.joins.contains_key(&join)
    }

    /// Active joins in dependency order.
    pub fn iter(&self) -> impl Iterator<Item = (Join, JoinMode)> + '_ {
        self.joins.iter().map(|(j, m)| (*j, *m))
    }

    /// Returns `true` if any active join can multiply product rows.
    pub fn has_one_to_many(&self) -> bool {
        self.joins.keys().any(Join::is_one_to_many)
    }
}
