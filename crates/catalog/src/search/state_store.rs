//! Search state carried across requests.
//!
//! A caller who pages through results or refines a search sends
//! `keep_last_search` (or `paginate`); the previous criteria are then merged
//! under the incoming ones. Any other request starts from scratch. Either
//! way the resulting criteria are written back for the next request.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;
use tracing::{debug, warn};

use crate::core::SessionStore;
use crate::error::{SessionError, SessionResult};
use crate::types::{control, RawRequest, SearchControls, SearchState};

use super::registry::CriterionRegistry;

/// Session key holding the serialized [`SearchState`].
pub const SEARCH_STATE_KEY: &str = "search_state";

/// Merges `previous` into `request` when the request asks to keep it.
///
/// Only recognized criterion keys and the carried controls (`display_by`,
/// `order_by`, `page`, `result_per_page`) are restored, and only where the
/// request does not supply them itself.
pub fn restore(
    registry: &CriterionRegistry,
    previous: Option<&SearchState>,
    mut request: RawRequest,
) -> RawRequest {
    let keep = request.contains(control::KEEP_LAST_SEARCH) || request.contains(control::PAGINATE);
    let Some(previous) = previous.filter(|_| keep) else {
        return request;
    };

    for (key, values) in &previous.criteria {
        if registry.recognizes(key) && !request.contains(key) {
            request.set(key, values.clone());
        }
    }

    let has_size = request.contains(control::RESULT_PER_PAGE) || request.contains(control::PAGE_SIZE);
    for name in control::CARRIED {
        let supplied = if name == control::RESULT_PER_PAGE {
            has_size
        } else {
            request.contains(name)
        };
        if !supplied {
            if let Some(value) = previous.control_value(name) {
                request.set(name, vec![value]);
            }
        }
    }
    request
}

/// Builds the state to remember after a search on `merged`.
pub fn persist(
    registry: &CriterionRegistry,
    merged: &RawRequest,
    controls: &SearchControls,
) -> SearchState {
    let criteria = merged
        .iter()
        .filter(|(key, _)| registry.recognizes(key))
        .map(|(key, values)| (key.to_string(), values.to_vec()))
        .collect();

    SearchState {
        criteria,
        display_by: controls.display_by,
        order_by: controls.order_by,
        page: controls.page,
        page_size: controls.page_size,
    }
}

/// Loads and saves [`SearchState`]s through a [`SessionStore`].
///
/// Session failures are logged and otherwise ignored.
pub struct SearchStateStore<S: ?Sized> {
    sessions: Arc<S>,
}

impl<S: SessionStore + ?Sized> SearchStateStore<S> {
    /// Wraps a session store.
    pub fn new(sessions: Arc<S>) -> Self {
        Self { sessions }
    }

    /// Reads the state of `session_id`; `None` if missing or unreadable.
    pub async fn load(&self, session_id: &str) -> Option<SearchState> {
        let raw = match self.sessions.get(session_id, SEARCH_STATE_KEY).await {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                warn!(session_id, error = %e, "failed to read search state, starting fresh");
                return None;
            }
        };
        match serde_json::from_str::<SearchState>(&raw) {
            Ok(state) => {
                debug!(session_id, criteria = state.criteria.len(), "restored search state");
                Some(state)
            }
            Err(e) => {
                let err = SessionError::Corrupt {
                    key: SEARCH_STATE_KEY.to_string(),
                    message: e.to_string(),
                };
                warn!(session_id, error = %err, "discarding unreadable search state");
                None
            }
        }
    }

    /// Writes the state of `session_id`.
    pub async fn save(&self, session_id: &str, state: &SearchState) {
        let raw = match serde_json::to_string(state) {
            Ok(raw) => raw,
            Err(e) => {
                warn!(session_id, error = %e, "failed to encode search state");
                return;
            }
        };
        if let Err(e) = self.sessions.set(session_id, SEARCH_STATE_KEY, raw).await {
            warn!(session_id, error = %e, "failed to save search state");
        }
    }

    /// Forgets the state of `session_id`.
    pub async fn clear(&self, session_id: &str) {
        if let Err(e) = self.sessions.delete(session_id, SEARCH_STATE_KEY).await {
            warn!(session_id, error = %e, "failed to clear search state");
        }
    }
}

/// Process-local [`SessionStore`].
#[derive(Debug, Default)]
pub struct InMemorySessionStore {
    values: RwLock<HashMap<(String, String), String>>,
}

impl InMemorySessionStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored values across all sessions.
    pub fn len(&self) -> usize {
        self.values.read().len()
    }

    /// Returns `true` if nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.values.read().is_empty()
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn get(&self, session_id: &str, key: &str) -> SessionResult<Option<String>> {
        Ok(self
            .values
            .read()
            .get(&(session_id.to_string(), key.to_string()))
            .cloned())
    }

    async fn set(&self, session_id: &str, key: &str, value: String) -> SessionResult<()> {
        self.values
            .write()
            .insert((session_id.to_string(), key.to_string()), value);
        Ok(())
    }

    async fn delete(&self, session_id: &str, key: &str) -> SessionResult<()> {
        self.values
            .write()
            .remove(&(session_id.to_string(), key.to_string()));
        Ok(())
    }
}
