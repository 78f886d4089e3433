//! Session storage trait.

use async_trait::async_trait;

use crate::error::SessionResult;

/// Key/value storage scoped to a caller session.
///
/// Values are opaque strings; the engine stores JSON.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Reads `key` from the session.
    async fn get(&self, session_id: &str, key: &str) -> SessionResult<Option<String>>;

    /// Writes `key`, replacing any previous value.
    async fn set(&self, session_id: &str, key: &str, value: String) -> SessionResult<()>;

    /// Removes `key`. Removing a missing key is not an error.
    async fn delete(&self, session_id: &str, key: &str) -> SessionResult<()>;
}
