//! Store-facing traits.

use async_trait::async_trait;

use crate::error::CatalogResult;
use crate::search::QueryPlan;
use crate::types::Row;

/// Executes composed query plans.
#[async_trait]
pub trait StoreExecutor: Send + Sync {
    /// Short name of the backend, for logs and health reports.
    fn backend_name(&self) -> &'static str;

    /// Checks that the store is reachable.
    async fn ping(&self) -> CatalogResult<()> {
        Ok(())
    }

    /// Runs `plan` and returns the rows inside `window` along with the total
    /// match count.
    ///
    /// `window` is an `(offset, limit)` pair; `None` returns every row. The
    /// count honours [`QueryPlan::count_distinct`] and ignores the window.
    async fn execute(
        &self,
        plan: &QueryPlan,
        window: Option<(u64, u64)>,
    ) -> CatalogResult<(Vec<Row>, u64)>;
}

/// Navigates the store location tree.
#[async_trait]
pub trait LocationHierarchy: Send + Sync {
    /// Returns the direct children of `location_id`.
    async fn children_of(&self, location_id: i64) -> CatalogResult<Vec<i64>>;
}

/// Reference data lookups.
#[async_trait]
pub trait ReferenceCatalog: Send + Sync {
    /// Identifiers of names whose label matches the SQL `LIKE` pattern.
    async fn names_like(&self, pattern: &str) -> CatalogResult<Vec<i64>>;

    /// Every normalized name label (`name.label_nost`).
    async fn name_labels(&self) -> CatalogResult<Vec<String>>;

    /// Every class of compounds identifier in the catalog.
    async fn class_of_compound_ids(&self) -> CatalogResult<Vec<i64>>;
}
