//! Caller permission types.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Permissions the search engine knows how to consult.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Permission {
    /// Administrator: implies every other permission.
    Admin,
    /// Filter storage by entity, and use the organization-wide preset.
    SelectSc,
    /// Filter storage by store location.
    ReadSc,
    /// See archived storage.
    ReadArchive,
    /// See restricted products.
    ReadRpc,
}

impl Permission {
    /// All known permissions.
    pub const ALL: [Permission; 5] = [
        Permission::Admin,
        Permission::SelectSc,
        Permission::ReadSc,
        Permission::ReadArchive,
        Permission::ReadRpc,
    ];

    /// Canonical lowercase name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Permission::Admin => "admin",
            Permission::SelectSc => "select_sc",
            Permission::ReadSc => "read_sc",
            Permission::ReadArchive => "read_archive",
            Permission::ReadRpc => "read_rpc",
        }
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Permission {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Permission::ALL
            .into_iter()
            .find(|p| p.as_str() == wanted)
            .ok_or_else(|| format!("unknown permission '{}'", s.trim()))
    }
}

/// The set of permissions granted to a caller.
///
/// Holding [`Permission::Admin`] satisfies every check.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionSet {
    granted: BTreeSet<Permission>,
}

impl PermissionSet {
    /// An empty permission set.
    pub fn none() -> Self {
        Self::default()
    }

    /// A set holding only [`Permission::Admin`].
    pub fn admin() -> Self {
        Self::from_iter([Permission::Admin])
    }

    /// Grants an additional permission.
    pub fn grant(&mut self, permission: Permission) {
        self.granted.insert(permission);
    }

    /// Returns `true` if the permission is held directly or through admin.
    pub fn allows(&self, permission: Permission) -> bool {
        self.granted.contains(&Permission::Admin) || self.granted.contains(&permission)
    }

    /// Iterates the permissions granted explicitly.
    pub fn iter(&self) -> impl Iterator<Item = Permission> + '_ {
        self.granted.iter().copied()
    }

    /// Returns `true` when nothing is granted.
    pub fn is_empty(&self) -> bool {
        self.granted.is_empty()
    }
}

impl FromIterator<Permission> for PermissionSet {
    fn from_iter<I: IntoIterator<Item = Permission>>(iter: I) -> Self {
        Self {
            granted: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_admin_implies_everything() {
        let perms = PermissionSet::admin();
        for p in Permission::ALL {
            assert!(perms.allows(p), "admin should allow {}", p);
        }
    }

    #[test]
    fn test_explicit_grant() {
        let perms: PermissionSet = [Permission::ReadSc].into_iter().collect();
        assert!(perms.allows(Permission::ReadSc));
        assert!(!perms.allows(Permission::SelectSc));
        assert!(!perms.allows(Permission::Admin));
    }

    #[test]
    fn test_parse_permission() {
        assert_eq!("select_sc".parse::<Permission>(), Ok(Permission::SelectSc));
        assert_eq!(" READ_RPC ".parse::<Permission>(), Ok(Permission::ReadRpc));
        assert!("write_everything".parse::<Permission>().is_err());
    }

    #[test]
    fn test_permission_display() {
        assert_eq!(Permission::ReadArchive.to_string(), "read_archive");
        assert_eq!(Permission::Admin.to_string(), "admin");
    }
}
