//! SQL query builder for composed search plans.
//!
//! Translates a [`QueryPlan`] into a count statement and a row statement
//! over the catalog tables. Multi-valued product fields live in
//! `product_<field>` link tables and are exported as `|`-separated ids.

use crate::error::{CatalogError, CatalogResult};
use crate::search::{
    Field, Join, JoinMode, OrderTerm, Predicate, Projection, QueryPlan, Scalar, Table,
};
use crate::types::DATETIME_FORMAT;

use super::schema::PRODUCT_LIST_FIELDS;

/// A fragment of SQL with bound parameters.
#[derive(Debug, Clone, Default)]
pub struct SqlFragment {
    /// The SQL text.
    pub sql: String,
    /// Bound parameter values.
    pub params: Vec<SqlParam>,
}

/// A bound SQL parameter.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlParam {
    /// Text value.
    String(String),
    /// Integer value; booleans bind as 0/1.
    Integer(i64),
}

impl SqlFragment {
    /// Creates an empty fragment.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a parameter and returns its placeholder.
    pub fn add_param(&mut self, param: SqlParam) -> String {
        self.params.push(param);
        format!("?{}", self.params.len())
    }

    /// Boxed parameters for rusqlite.
    pub fn to_sql_params(&self) -> Vec<Box<dyn rusqlite::ToSql>> {
        self.params
            .iter()
            .map(|p| -> Box<dyn rusqlite::ToSql> {
                match p {
                    SqlParam::String(s) => Box::new(s.clone()),
                    SqlParam::Integer(i) => Box::new(*i),
                }
            })
            .collect()
    }
}

/// How a selected column is decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    /// Plain value.
    Value,
    /// Integer stored flag, decoded as a JSON boolean.
    Bool,
    /// `|`-separated ids from a link table.
    List,
}

/// A selected column and its `table.column` alias.
#[derive(Debug, Clone)]
pub struct SelectColumn {
    /// `table.column` name of the value in result rows.
    pub alias: String,
    /// Decoding of the value.
    pub kind: ColumnKind,
}

/// A row statement plus the columns it yields, in order.
#[derive(Debug, Clone)]
pub struct SelectQuery {
    /// Statement and parameters.
    pub fragment: SqlFragment,
    /// Columns in select order.
    pub columns: Vec<SelectColumn>,
}

const PRODUCT_COLUMNS: [&str; 20] = [
    "id",
    "name",
    "specificity",
    "restricted_access",
    "creation_datetime",
    "archive",
    "person",
    "cas_number",
    "ce_number",
    "empirical_formula",
    "linear_formula",
    "td_formula",
    "msds",
    "is_cmr",
    "is_radio",
    "cmr_cat",
    "physical_state",
    "signal_word",
    "remark",
    "disposal_comment",
];

const NAME_COLUMNS: [&str; 3] = ["id", "label", "label_nost"];

const STORAGE_COLUMNS: [&str; 18] = [
    "id",
    "product",
    "store_location",
    "volume_weight",
    "unit",
    "barecode",
    "comment",
    "batch_number",
    "supplier",
    "creation_datetime",
    "entry_datetime",
    "exit_datetime",
    "opening_datetime",
    "to_destroy",
    "person",
    "archive",
    "reference",
    "nb_items",
];

const STORE_LOCATION_COLUMNS: [&str; 3] = ["id", "label", "entity"];

const BORROW_COLUMNS: [&str; 4] = ["id", "storage", "borrower", "person"];

const BOOL_COLUMNS: [&str; 5] = ["restricted_access", "archive", "is_cmr", "is_radio", "to_destroy"];

/// Builds SQL statements from query plans.
pub struct QueryBuilder<'a> {
    plan: &'a QueryPlan,
}

impl<'a> QueryBuilder<'a> {
    /// Creates a builder for `plan`.
    pub fn new(plan: &'a QueryPlan) -> Self {
        Self { plan }
    }

    /// `SELECT COUNT(...)` over the plan, ignoring ordering and windows.
    pub fn build_count(&self) -> CatalogResult<SqlFragment> {
        let mut fragment = SqlFragment::new();
        let target = if self.plan.count_distinct {
            "COUNT(DISTINCT \"product\".\"id\")"
        } else {
            "COUNT(*)"
        };
        let where_sql = render_predicate(&self.plan.predicate, &mut fragment)?;
        fragment.sql = format!(
            "SELECT {} FROM {} WHERE {}",
            target,
            self.from_clause(),
            where_sql
        );
        Ok(fragment)
    }

    /// The row statement, optionally restricted to `(offset, limit)`.
    pub fn build_select(&self, window: Option<(u64, u64)>) -> CatalogResult<SelectQuery> {
        let columns = self.select_columns();
        let mut fragment = SqlFragment::new();

        let select_list: Vec<String> = columns
            .iter()
            .map(|c| format!("{} AS \"{}\"", column_expr(c), c.alias))
            .collect();
        let where_sql = render_predicate(&self.plan.predicate, &mut fragment)?;

        let mut order_sql = Vec::new();
        for term in &self.plan.order {
            match term {
                OrderTerm::Asc(field) => order_sql.push(format!("{} ASC", field_sql(field))),
                OrderTerm::ExactFirst { field, value } => {
                    let p = fragment.add_param(SqlParam::String(value.clone()));
                    order_sql.push(format!(
                        "CASE WHEN {} = {} THEN 0 ELSE 1 END",
                        field_sql(field),
                        p
                    ));
                }
            }
        }
        order_sql.push(format!("{} ASC", field_sql(&Field::product("id"))));

        let mut sql = format!(
            "SELECT {}{} FROM {} WHERE {} ORDER BY {}",
            if self.plan.distinct { "DISTINCT " } else { "" },
            select_list.join(", "),
            self.from_clause(),
            where_sql,
            order_sql.join(", ")
        );

        if let Some((offset, limit)) = window {
            let limit_p = fragment.add_param(SqlParam::Integer(clamp_i64(limit)));
            let offset_p = fragment.add_param(SqlParam::Integer(clamp_i64(offset)));
            sql.push_str(&format!(" LIMIT {} OFFSET {}", limit_p, offset_p));
        }

        fragment.sql = sql;
        Ok(SelectQuery { fragment, columns })
    }

    fn from_clause(&self) -> String {
        let mut from = String::from("\"product\" JOIN \"name\" ON \"name\".\"id\" = \"product\".\"name\"");
        for (join, mode) in self.plan.joins.iter() {
            let kind = match mode {
                JoinMode::Inner => "JOIN",
                JoinMode::Left => "LEFT JOIN",
            };
            let on = match join {
                Join::Storage => "\"storage\" ON \"storage\".\"product\" = \"product\".\"id\"",
                Join::StoreLocation => {
                    "\"store_location\" ON \"store_location\".\"id\" = \"storage\".\"store_location\""
                }
                Join::Borrow => "\"borrow\" ON \"borrow\".\"storage\" = \"storage\".\"id\"",
                Join::Bookmark => "\"bookmark\" ON \"bookmark\".\"product\" = \"product\".\"id\"",
            };
            from.push_str(&format!(" {} {}", kind, on));
        }
        from
    }

    fn select_columns(&self) -> Vec<SelectColumn> {
        let joins = &self.plan.joins;
        let mut columns = Vec::new();

        let product_and_name = |columns: &mut Vec<SelectColumn>| {
            push_columns(columns, Table::Product, &PRODUCT_COLUMNS);
            for field in PRODUCT_LIST_FIELDS {
                columns.push(SelectColumn {
                    alias: format!("product.{}", field),
                    kind: ColumnKind::List,
                });
            }
            push_columns(columns, Table::Name, &NAME_COLUMNS);
        };

        match self.plan.projection {
            Projection::ByProduct => product_and_name(&mut columns),
            Projection::ByStorage => {
                push_columns(&mut columns, Table::Storage, &STORAGE_COLUMNS);
                push_columns(&mut columns, Table::StoreLocation, &STORE_LOCATION_COLUMNS);
                if joins.contains(Join::Borrow) {
                    push_columns(&mut columns, Table::Borrow, &BORROW_COLUMNS);
                }
                product_and_name(&mut columns);
            }
            Projection::Export => {
                product_and_name(&mut columns);
                if joins.contains(Join::Storage) {
                    push_columns(&mut columns, Table::Storage, &STORAGE_COLUMNS);
                }
                if joins.contains(Join::Borrow) {
                    push_columns(&mut columns, Table::Borrow, &BORROW_COLUMNS);
                }
            }
        }
        columns
    }
}

fn push_columns(columns: &mut Vec<SelectColumn>, table: Table, names: &[&str]) {
    for name in names {
        let kind = if BOOL_COLUMNS.contains(name) {
            ColumnKind::Bool
        } else {
            ColumnKind::Value
        };
        columns.push(SelectColumn {
            alias: format!("{}.{}", table.as_str(), name),
            kind,
        });
    }
}

fn column_expr(column: &SelectColumn) -> String {
    let (table, name) = column.alias.split_once('.').unwrap_or(("product", column.alias.as_str()));
    match column.kind {
        ColumnKind::List => format!(
            "(SELECT group_concat(\"value_id\", '|') FROM \"product_{name}\" WHERE \"product_id\" = \"product\".\"id\")"
        ),
        _ => format!("\"{}\".\"{}\"", table, name),
    }
}

fn field_sql(field: &Field) -> String {
    format!("\"{}\".\"{}\"", field.table.as_str(), field.column)
}

fn clamp_i64(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

fn scalar_param(value: &Scalar) -> SqlParam {
    match value {
        Scalar::Int(i) => SqlParam::Integer(*i),
        Scalar::Bool(b) => SqlParam::Integer(i64::from(*b)),
        Scalar::Text(s) => SqlParam::String(s.clone()),
        Scalar::DateTime(dt) => SqlParam::String(dt.format(DATETIME_FORMAT).to_string()),
    }
}

/// Renders `predicate` into SQL, pushing its parameters onto `fragment`.
pub fn render_predicate(predicate: &Predicate, fragment: &mut SqlFragment) -> CatalogResult<String> {
    let sql = match predicate {
        Predicate::True => "1".to_string(),
        Predicate::And(parts) if parts.is_empty() => "1".to_string(),
        Predicate::Or(parts) if parts.is_empty() => "0".to_string(),
        Predicate::And(parts) => join_parts(parts, " AND ", fragment)?,
        Predicate::Or(parts) => join_parts(parts, " OR ", fragment)?,
        Predicate::Not(inner) => format!("NOT ({})", render_predicate(inner, fragment)?),
        Predicate::Compare { field, op, value } => {
            let p = fragment.add_param(scalar_param(value));
            format!("{} {} {}", field_sql(field), op.as_sql(), p)
        }
        Predicate::Belongs { values, .. } if values.is_empty() => "0".to_string(),
        Predicate::Belongs { field, values } => {
            let placeholders: Vec<String> = values
                .iter()
                .map(|v| fragment.add_param(SqlParam::Integer(*v)))
                .collect();
            format!("{} IN ({})", field_sql(field), placeholders.join(", "))
        }
        Predicate::Contains { field, value } => {
            if field.table != Table::Product || !PRODUCT_LIST_FIELDS.contains(&field.column) {
                return Err(CatalogError::unavailable(format!(
                    "sqlite: {} is not a multi-valued field",
                    field
                )));
            }
            let p = fragment.add_param(SqlParam::Integer(*value));
            format!(
                "\"product\".\"id\" IN (SELECT \"product_id\" FROM \"product_{}\" WHERE \"value_id\" = {})",
                field.column, p
            )
        }
        Predicate::Like { field, pattern } => {
            let p = fragment.add_param(SqlParam::String(pattern.clone()));
            format!("{} LIKE {}", field_sql(field), p)
        }
    };
    Ok(sql)
}

fn join_parts(parts: &[Predicate], sep: &str, fragment: &mut SqlFragment) -> CatalogResult<String> {
    let rendered = parts
        .iter()
        .map(|p| render_predicate(p, fragment).map(|sql| format!("({})", sql)))
        .collect::<CatalogResult<Vec<_>>>()?;
    Ok(rendered.join(sep))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::{CompareOp, JoinPlan};

    fn plan(predicate: Predicate, joins: JoinPlan, projection: Projection) -> QueryPlan {
        QueryPlan {
            predicate,
            joins,
            projection,
            distinct: false,
            count_distinct: true,
            order: vec![OrderTerm::Asc(Field::new(Table::Name, "label_nost"))],
        }
    }

    #[test]
    fn test_render_numbering() {
        let p = Predicate::all([
            Predicate::compare(Field::product("id"), CompareOp::Gt, Scalar::Int(0)),
            Predicate::any([
                Predicate::like(Field::new(Table::Name, "label"), "%ACE%"),
                Predicate::contains(Field::product("synonym"), 9),
            ]),
            Predicate::belongs(Field::storage("store_location"), vec![1, 2]),
        ]);
        let mut fragment = SqlFragment::new();
        let sql = render_predicate(&p, &mut fragment).unwrap();
        assert_eq!(
            sql,
            "(\"product\".\"id\" > ?1) AND ((\"name\".\"label\" LIKE ?2) OR (\"product\".\"id\" IN (SELECT \"product_id\" FROM \"product_synonym\" WHERE \"value_id\" = ?3))) AND (\"storage\".\"store_location\" IN (?4, ?5))"
        );
        assert_eq!(
            fragment.params,
            vec![
                SqlParam::Integer(0),
                SqlParam::String("%ACE%".into()),
                SqlParam::Integer(9),
                SqlParam::Integer(1),
                SqlParam::Integer(2),
            ]
        );
    }

    #[test]
    fn test_empty_lists_match_nothing() {
        let mut fragment = SqlFragment::new();
        assert_eq!(
            render_predicate(&Predicate::belongs(Field::product("id"), vec![]), &mut fragment).unwrap(),
            "0"
        );
        assert_eq!(render_predicate(&Predicate::Or(vec![]), &mut fragment).unwrap(), "0");
        assert!(fragment.params.is_empty());
    }

    #[test]
    fn test_contains_rejects_scalar_field() {
        let mut fragment = SqlFragment::new();
        assert!(render_predicate(&Predicate::contains(Field::product("cas_number"), 1), &mut fragment).is_err());
    }

    #[test]
    fn test_count_distinct_and_joins() {
        let mut joins = JoinPlan::new();
        joins.require(Join::StoreLocation);
        joins.optional(Join::Borrow);
        let p = plan(Predicate::True, joins, Projection::ByProduct);
        let count = QueryBuilder::new(&p).build_count().unwrap();
        assert!(count.sql.starts_with("SELECT COUNT(DISTINCT \"product\".\"id\") FROM"));
        assert!(count.sql.contains(" JOIN \"storage\" ON"));
        assert!(count.sql.contains(" JOIN \"store_location\" ON"));
        assert!(count.sql.contains(" LEFT JOIN \"borrow\" ON"));
    }

    #[test]
    fn test_select_window_params_follow_predicate() {
        let p = plan(
            Predicate::eq(Field::product("cas_number"), Scalar::Text("64-17-5".into())),
            JoinPlan::new(),
            Projection::ByProduct,
        );
        let query = QueryBuilder::new(&p).build_select(Some((20, 10))).unwrap();
        assert!(query.fragment.sql.ends_with("LIMIT ?2 OFFSET ?3"));
        assert_eq!(query.fragment.params[1], SqlParam::Integer(10));
        assert_eq!(query.fragment.params[2], SqlParam::Integer(20));
        assert!(query.columns.iter().any(|c| c.alias == "product.symbol" && c.kind == ColumnKind::List));
        assert!(query.columns.iter().any(|c| c.alias == "product.is_cmr" && c.kind == ColumnKind::Bool));
    }

    #[test]
    fn test_export_columns_follow_joins() {
        let mut joins = JoinPlan::new();
        joins.optional(Join::Storage);
        joins.optional(Join::Borrow);
        let p = plan(Predicate::True, joins, Projection::Export);
        let query = QueryBuilder::new(&p).build_select(None).unwrap();
        assert!(query.columns.iter().any(|c| c.alias == "storage.barecode"));
        assert!(query.columns.iter().any(|c| c.alias == "borrow.borrower"));
        assert!(!query.fragment.sql.contains("LIMIT"));
    }
}
