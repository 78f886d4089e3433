//! The search engine facade.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::caller::CallerContext;
use crate::core::{LocationHierarchy, ReferenceCatalog, SessionStore, StoreExecutor};
use crate::error::CatalogResult;
use crate::types::{
    control, ActiveCriteria, CriterionKey, RawRequest, ResultPage, SearchControls, SearchOutcome,
};

use super::composer::{name_pattern, Lookups, QueryComposer};
use super::fuzzy::{suggest, DEFAULT_MAX_DISTANCE};
use super::hierarchy::descendant_closure;
use super::paginator::window;
use super::projector::project_export;
use super::registry::{expand_preset, CriterionRegistry};
use super::state_store::{persist, restore, SearchStateStore};

/// Tunables of the search engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchSettings {
    /// Page size when the request names none.
    #[serde(default = "default_page_size")]
    pub default_page_size: u64,

    /// Larger requested page sizes are clamped to this.
    #[serde(default = "default_max_page_size")]
    pub max_page_size: u64,

    /// Maximum edit distance of a name suggestion.
    #[serde(default = "default_suggestion_threshold")]
    pub suggestion_threshold: usize,
}

fn default_page_size() -> u64 {
    10
}

fn default_max_page_size() -> u64 {
    1000
}

fn default_suggestion_threshold() -> usize {
    DEFAULT_MAX_DISTANCE
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            default_page_size: default_page_size(),
            max_page_size: default_max_page_size(),
            suggestion_threshold: default_suggestion_threshold(),
        }
    }
}

/// Runs faceted searches against a backend.
///
/// `B` provides query execution, the location tree and reference data; `S`
/// keeps each session's last search.
pub struct SearchEngine<B: ?Sized, S: ?Sized> {
    backend: Arc<B>,
    states: SearchStateStore<S>,
    registry: CriterionRegistry,
    settings: SearchSettings,
}

impl<B, S> SearchEngine<B, S>
where
    B: StoreExecutor + LocationHierarchy + ReferenceCatalog + ?Sized,
    S: SessionStore + ?Sized,
{
    /// Creates an engine with the standard criterion registry.
    pub fn new(backend: Arc<B>, sessions: Arc<S>, settings: SearchSettings) -> Self {
        Self {
            backend,
            states: SearchStateStore::new(sessions),
            registry: CriterionRegistry::standard(),
            settings,
        }
    }

    /// Replaces the criterion registry.
    pub fn with_registry(mut self, registry: CriterionRegistry) -> Self {
        self.registry = registry;
        self
    }

    /// Returns the criterion registry.
    pub fn registry(&self) -> &CriterionRegistry {
        &self.registry
    }

    /// Returns the settings.
    pub fn settings(&self) -> &SearchSettings {
        &self.settings
    }

    /// Returns the backend.
    pub fn backend(&self) -> &Arc<B> {
        &self.backend
    }

    /// Runs one search for `caller` in session `session_id`.
    ///
    /// The previous search of the session is merged in when the request
    /// carries `keep_last_search` or `paginate`. The merged criteria are
    /// remembered once they have been validated and composed.
    #[instrument(skip(self, request, caller), fields(person_id = caller.person_id()))]
    pub async fn search(
        &self,
        request: RawRequest,
        session_id: &str,
        caller: &CallerContext,
    ) -> CatalogResult<SearchOutcome> {
        let keep = request.contains(control::KEEP_LAST_SEARCH) || request.contains(control::PAGINATE);
        let previous = if keep {
            self.states.load(session_id).await
        } else {
            None
        };
        let mut merged = restore(&self.registry, previous.as_ref(), request);
        expand_preset(&mut merged);

        let controls = SearchControls::from_request(
            &merged,
            self.settings.default_page_size,
            self.settings.max_page_size,
        )?;
        let criteria = self.registry.parse_request(&merged, caller)?;
        let lookups = self.resolve_lookups(&criteria).await?;
        let plan = QueryComposer::new(&self.registry).compose(&criteria, &controls, caller, &lookups);
        debug!(
            criteria = criteria.len(),
            projection = ?plan.projection,
            distinct = plan.distinct,
            joins = plan.joins.iter().count(),
            "composed search plan"
        );

        self.states
            .save(session_id, &persist(&self.registry, &merged, &controls))
            .await;

        let suggestions = match criteria.text(CriterionKey::Name) {
            Some(name) => suggest(
                name,
                self.backend.name_labels().await?,
                self.settings.suggestion_threshold,
            ),
            None => Vec::new(),
        };
        let label = self.registry.describe(&criteria);

        if let Some(format) = controls.export {
            let (rows, _) = self.backend.execute(&plan, None).await?;
            debug!(rows = rows.len(), "exporting search results");
            return Ok(SearchOutcome::Export(project_export(
                rows,
                format,
                suggestions,
                label,
            )));
        }

        let offset = controls.page.saturating_mul(controls.page_size);
        let (rows, total) = self
            .backend
            .execute(&plan, Some((offset, controls.page_size)))
            .await?;
        let page_window = window(controls.page, controls.page_size, total);
        let rows = if page_window.is_empty() { Vec::new() } else { rows };
        debug!(total, rows = rows.len(), page = controls.page, "search executed");

        Ok(SearchOutcome::Page(ResultPage {
            rows,
            total,
            page: controls.page,
            page_size: controls.page_size,
            total_pages: page_window.total_pages,
            display_by: controls.display_by,
            suggestions,
            label,
        }))
    }

    /// Forgets the remembered search of `session_id`.
    pub async fn reset(&self, session_id: &str) {
        self.states.clear(session_id).await;
    }

    async fn resolve_lookups(&self, criteria: &ActiveCriteria) -> CatalogResult<Lookups> {
        let mut lookups = Lookups::default();

        if criteria.contains(CriterionKey::StoreLocation) {
            let roots = criteria.ids(CriterionKey::StoreLocation);
            lookups.locations = if criteria.contains(CriterionKey::IncludeChildrenStoreLocation) {
                descendant_closure(self.backend.as_ref(), &roots).await?
            } else {
                roots
            };
        }

        if let Some(name) = criteria.text(CriterionKey::Name) {
            lookups.synonym_name_ids = self.backend.names_like(&name_pattern(name)).await?;
        }

        if criteria.contains(CriterionKey::ClassOfCompounds) && criteria.contains(CriterionKey::ExactCoc) {
            lookups.class_ids = self.backend.class_of_compound_ids().await?;
        }

        Ok(lookups)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::caller::Permission;
    use crate::error::CatalogError;
    use crate::search::composer::QueryPlan;
    use crate::search::state_store::InMemorySessionStore;
    use crate::types::Row;
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use serde_json::Value;

    /// Returns `total` numbered rows and remembers every plan it ran.
    #[derive(Default)]
    struct StubBackend {
        total: u64,
        fail: bool,
        plans: Mutex<Vec<QueryPlan>>,
    }

    #[async_trait]
    impl StoreExecutor for StubBackend {
        fn backend_name(&self) -> &'static str {
            "stub"
        }

        async fn execute(
            &self,
            plan: &QueryPlan,
            window: Option<(u64, u64)>,
        ) -> CatalogResult<(Vec<Row>, u64)> {
            if self.fail {
                return Err(CatalogError::unavailable("stub is down"));
            }
            self.plans.lock().push(plan.clone());
            let (offset, limit) = window.unwrap_or((0, self.total));
            let rows = (offset..self.total.min(offset.saturating_add(limit)))
                .map(|i| Row::new().with("product.id", Value::from(i)))
                .collect();
            Ok((rows, self.total))
        }
    }

    #[async_trait]
    impl LocationHierarchy for StubBackend {
        async fn children_of(&self, _location_id: i64) -> CatalogResult<Vec<i64>> {
            Ok(Vec::new())
        }
    }

    #[async_trait]
    impl ReferenceCatalog for StubBackend {
        async fn names_like(&self, _pattern: &str) -> CatalogResult<Vec<i64>> {
            Ok(Vec::new())
        }

        async fn name_labels(&self) -> CatalogResult<Vec<String>> {
            Ok(vec!["ACETONE".to_string(), "ACETAL".to_string()])
        }

        async fn class_of_compound_ids(&self) -> CatalogResult<Vec<i64>> {
            Ok(vec![1, 2, 3])
        }
    }

    fn engine(backend: StubBackend) -> SearchEngine<StubBackend, InMemorySessionStore> {
        SearchEngine::new(
            Arc::new(backend),
            Arc::new(InMemorySessionStore::new()),
            SearchSettings::default(),
        )
    }

    fn caller() -> CallerContext {
        CallerContext::builder(3)
            .entities(vec![1])
            .permission(Permission::SelectSc)
            .build()
    }

    fn page(outcome: SearchOutcome) -> ResultPage {
        match outcome {
            SearchOutcome::Page(page) => page,
            SearchOutcome::Export(_) => panic!("expected a page"),
        }
    }

    #[test]
    fn test_settings_defaults_from_json() {
        let settings: SearchSettings = serde_json::from_str(r#"{"max_page_size": 50}"#).unwrap();
        assert_eq!(settings.default_page_size, 10);
        assert_eq!(settings.max_page_size, 50);
        assert_eq!(settings.suggestion_threshold, 4);
    }

    #[tokio::test]
    async fn test_page_window_and_total() {
        let engine = engine(StubBackend {
            total: 25,
            ..Default::default()
        });

        let result = page(
            engine
                .search(RawRequest::from_pairs([("page", "2")]), "s", &caller())
                .await
                .unwrap(),
        );
        assert_eq!(result.total, 25);
        assert_eq!(result.total_pages, 3);
        assert_eq!(result.rows.len(), 5);

        let past_end = page(
            engine
                .search(RawRequest::from_pairs([("page", "5")]), "s", &caller())
                .await
                .unwrap(),
        );
        assert!(past_end.rows.is_empty());
        assert_eq!(past_end.total, 25);
    }

    #[tokio::test]
    async fn test_store_failure_is_propagated() {
        let engine = engine(StubBackend {
            fail: true,
            ..Default::default()
        });

        let err = engine
            .search(RawRequest::new(), "s", &caller())
            .await
            .unwrap_err();
        assert_eq!(err.code(), "store_unavailable");
    }

    #[tokio::test]
    async fn test_rejected_request_is_not_remembered() {
        let engine = engine(StubBackend::default());
        let visitor = CallerContext::builder(4).build();

        engine
            .search(RawRequest::from_pairs([("is_cmr", "")]), "s", &visitor)
            .await
            .unwrap();
        let err = engine
            .search(RawRequest::from_pairs([("entity", "1")]), "s", &visitor)
            .await
            .unwrap_err();
        assert!(matches!(err, CatalogError::Forbidden { .. }));

        let kept = engine
            .search(RawRequest::from_pairs([("keep_last_search", "")]), "s", &visitor)
            .await
            .unwrap();
        assert_eq!(kept.label(), "CMR");
    }

    #[tokio::test]
    async fn test_suggestions_and_exact_class_lookup() {
        let engine = engine(StubBackend::default());

        let outcome = engine
            .search(
                RawRequest::from_pairs([
                    ("name", "acetne"),
                    ("class_of_compounds", "2"),
                    ("exact_coc", ""),
                ]),
                "s",
                &caller(),
            )
            .await
            .unwrap();
        assert_eq!(outcome.suggestions()[0].candidate, "ACETONE");
        assert_eq!(outcome.suggestions()[0].distance, 1);

        let plans = engine.backend().plans.lock();
        let mut negated = 0;
        fn count_not(p: &crate::search::Predicate, n: &mut usize) {
            use crate::search::Predicate as P;
            match p {
                P::Not(_) => *n += 1,
                P::And(parts) | P::Or(parts) => parts.iter().for_each(|q| count_not(q, n)),
                _ => {}
            }
        }
        count_not(&plans[0].predicate, &mut negated);
        assert_eq!(negated, 2);
    }
}
