//! Ordered permission collection with union-by-identity

use serde::{Deserialize, Serialize};

use crate::types::{Permission, PermissionId};

/// An ordered set of permissions, unique by [`PermissionId`].
///
/// Insertion order is preserved. Inserting a permission whose id is already
/// present replaces the existing entry in place.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PermissionSet {
    permissions: Vec<Permission>,
}

impl PermissionSet {
    /// Create an empty set
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a permission, replacing any entry with the same id
    pub fn insert(&mut self, permission: Permission) {
        match self.permissions.iter_mut().find(|p| p.id == permission.id) {
            Some(existing) => *existing = permission,
            None => self.permissions.push(permission),
        }
    }

    /// Union `other` into this set
    pub fn merge(&mut self, other: impl IntoIterator<Item = Permission>) {
        for permission in other {
            self.insert(permission);
        }
    }

    pub fn contains_id(&self, id: PermissionId) -> bool {
        self.permissions.iter().any(|p| p.id == id)
    }

    pub fn contains_name(&self, name: &str) -> bool {
        self.permissions.iter().any(|p| p.name == name)
    }

    /// Permission ids in set order
    pub fn ids(&self) -> Vec<PermissionId> {
        self.permissions.iter().map(|p| p.id).collect()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Permission> {
        self.permissions.iter()
    }

    pub fn len(&self) -> usize {
        self.permissions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.permissions.is_empty()
    }
}

impl FromIterator<Permission> for PermissionSet {
    fn from_iter<I: IntoIterator<Item = Permission>>(iter: I) -> Self {
        let mut set = Self::new();
        set.merge(iter);
        set
    }
}

impl From<Vec<Permission>> for PermissionSet {
    fn from(permissions: Vec<Permission>) -> Self {
        permissions.into_iter().collect()
    }
}

impl IntoIterator for PermissionSet {
    type Item = Permission;
    type IntoIter = std::vec::IntoIter<Permission>;

    fn into_iter(self) -> Self::IntoIter {
        self.permissions.into_iter()
    }
}

impl<'a> IntoIterator for &'a PermissionSet {
    type Item = &'a Permission;
    type IntoIter = std::slice::Iter<'a, Permission>;

    fn into_iter(self) -> Self::IntoIter {
        self.permissions.iter()
    }
}
