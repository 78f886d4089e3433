//! Search collaborator traits for the SQLite backend.

use async_trait::async_trait;
use rusqlite::types::ValueRef;
use serde_json::{Number, Value};

use crate::core::{LocationHierarchy, ReferenceCatalog, StoreExecutor};
use crate::error::CatalogResult;
use crate::search::QueryPlan;
use crate::types::Row;

use super::backend::SqliteBackend;
use super::query_builder::{ColumnKind, QueryBuilder};

#[async_trait]
impl StoreExecutor for SqliteBackend {
    fn backend_name(&self) -> &'static str {
        "sqlite"
    }

    async fn ping(&self) -> CatalogResult<()> {
        self.health_check()
    }

    async fn execute(
        &self,
        plan: &QueryPlan,
        window: Option<(u64, u64)>,
    ) -> CatalogResult<(Vec<Row>, u64)> {
        let builder = QueryBuilder::new(plan);
        let count_query = builder.build_count()?;
        let select = builder.build_select(window)?;

        let conn = self.get_connection()?;

        let count_params = count_query.to_sql_params();
        let count_refs: Vec<&dyn rusqlite::ToSql> = count_params.iter().map(|p| p.as_ref()).collect();
        let total: i64 = conn.query_row(&count_query.sql, count_refs.as_slice(), |row| row.get(0))?;

        let select_params = select.fragment.to_sql_params();
        let select_refs: Vec<&dyn rusqlite::ToSql> =
            select_params.iter().map(|p| p.as_ref()).collect();
        let mut stmt = conn.prepare(&select.fragment.sql)?;
        let rows = stmt.query_map(select_refs.as_slice(), |row| {
            let mut out = Row::new();
            for (idx, column) in select.columns.iter().enumerate() {
                out.insert(column.alias.clone(), decode(row.get_ref(idx)?, column.kind));
            }
            Ok(out)
        })?;
        let rows = rows.collect::<Result<Vec<_>, _>>()?;

        tracing::debug!(
            total,
            returned = rows.len(),
            sql = %select.fragment.sql,
            "sqlite search executed"
        );

        Ok((rows, u64::try_from(total).unwrap_or(0)))
    }
}

#[async_trait]
impl LocationHierarchy for SqliteBackend {
    async fn children_of(&self, location_id: i64) -> CatalogResult<Vec<i64>> {
        let conn = self.get_connection()?;
        let mut stmt = conn.prepare("SELECT id FROM store_location WHERE parent = ?1 ORDER BY id")?;
        let ids = stmt
            .query_map([location_id], |row| row.get(0))?
            .collect::<Result<Vec<i64>, _>>()?;
        Ok(ids)
    }
}

#[async_trait]
impl ReferenceCatalog for SqliteBackend {
    async fn names_like(&self, pattern: &str) -> CatalogResult<Vec<i64>> {
        let conn = self.get_connection()?;
        let mut stmt = conn.prepare("SELECT id FROM name WHERE label LIKE ?1 ORDER BY id")?;
        let ids = stmt
            .query_map([pattern], |row| row.get(0))?
            .collect::<Result<Vec<i64>, _>>()?;
        Ok(ids)
    }

    async fn name_labels(&self) -> CatalogResult<Vec<String>> {
        let conn = self.get_connection()?;
        let mut stmt = conn.prepare("SELECT label_nost FROM name ORDER BY label_nost, id")?;
        let labels = stmt
            .query_map([], |row| row.get(0))?
            .collect::<Result<Vec<String>, _>>()?;
        Ok(labels)
    }

    async fn class_of_compound_ids(&self) -> CatalogResult<Vec<i64>> {
        let conn = self.get_connection()?;
        let mut stmt = conn.prepare("SELECT id FROM class_of_compounds ORDER BY id")?;
        let ids = stmt
            .query_map([], |row| row.get(0))?
            .collect::<Result<Vec<i64>, _>>()?;
        Ok(ids)
    }
}

fn decode(value: ValueRef<'_>, kind: ColumnKind) -> Value {
    match (kind, value) {
        (_, ValueRef::Null) => Value::Null,
        (ColumnKind::Bool, ValueRef::Integer(i)) => Value::Bool(i != 0),
        (ColumnKind::List, ValueRef::Text(bytes)) => Value::Array(
            String::from_utf8_lossy(bytes)
                .split('|')
                .filter_map(|id| id.parse::<i64>().ok())
                .map(Value::from)
                .collect(),
        ),
        (_, ValueRef::Integer(i)) => Value::from(i),
        (_, ValueRef::Real(f)) => Number::from_f64(f).map(Value::Number).unwrap_or(Value::Null),
        (_, ValueRef::Text(bytes)) | (_, ValueRef::Blob(bytes)) => {
            Value::String(String::from_utf8_lossy(bytes).into_owned())
        }
    }
}
