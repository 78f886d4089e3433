//! Caller context consulted by the search engine.

use std::sync::Arc;

use super::permissions::{Permission, PermissionSet};
use crate::core::PermissionOracle;
use crate::error::CatalogError;

/// The person a search runs for.
#[derive(Debug, Clone)]
pub struct CallerContext {
    /// The person identifier.
    person_id: i64,
    /// Entities the person is a member of.
    entity_ids: Vec<i64>,
    /// Permissions granted by the host application.
    permissions: Arc<PermissionSet>,
}

impl CallerContext {
    /// Creates a context with the given person, entities and permissions.
    pub fn new(person_id: i64, entity_ids: Vec<i64>, permissions: PermissionSet) -> Self {
        Self {
            person_id,
            entity_ids,
            permissions: Arc::new(permissions),
        }
    }

    /// Starts a builder for the given person.
    pub fn builder(person_id: i64) -> CallerContextBuilder {
        CallerContextBuilder::new(person_id)
    }

    /// Returns the person identifier.
    pub fn person_id(&self) -> i64 {
        self.person_id
    }

    /// Returns the entities the caller belongs to.
    pub fn entity_ids(&self) -> &[i64] {
        &self.entity_ids
    }

    /// Returns the granted permissions.
    pub fn permissions(&self) -> &PermissionSet {
        &self.permissions
    }

    /// Returns `true` if restricted products are visible to this caller.
    pub fn can_see_restricted(&self) -> bool {
        self.has_permission(Permission::ReadRpc)
    }

    /// Checks that the caller may use the criterion `key`.
    ///
    /// Returns [`CatalogError::Forbidden`] naming the key when the permission
    /// is missing.
    pub fn check_permission(&self, key: &str, permission: Permission) -> Result<(), CatalogError> {
        if self.has_permission(permission) {
            Ok(())
        } else {
            Err(CatalogError::forbidden(key, permission))
        }
    }
}

impl PermissionOracle for CallerContext {
    fn has_permission(&self, permission: Permission) -> bool {
        self.permissions.allows(permission)
    }
}

/// Builder for [`CallerContext`].
pub struct CallerContextBuilder {
    person_id: i64,
    entity_ids: Vec<i64>,
    permissions: PermissionSet,
}

impl CallerContextBuilder {
    /// Creates a builder with no entities and no permissions.
    pub fn new(person_id: i64) -> Self {
        Self {
            person_id,
            entity_ids: Vec::new(),
            permissions: PermissionSet::none(),
        }
    }

    /// Sets the entities.
    pub fn entities(mut self, entity_ids: Vec<i64>) -> Self {
        self.entity_ids = entity_ids;
        self
    }

    /// Grants one permission.
    pub fn permission(mut self, permission: Permission) -> Self {
        self.permissions.grant(permission);
        self
    }

    /// Replaces the permission set.
    pub fn permissions(mut self, permissions: PermissionSet) -> Self {
        self.permissions = permissions;
        self
    }

    /// Builds the context.
    pub fn build(self) -> CallerContext {
        CallerContext::new(self.person_id, self.entity_ids, self.permissions)
    }
}
