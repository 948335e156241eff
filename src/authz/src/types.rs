//! Core permission model types

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Unique permission identifier
pub type PermissionId = i64;

/// Unique role identifier
pub type RoleId = i64;

/// Identity of any permission-holding entity
pub type EntityId = i64;

/// Extra data stored on an association record (the pivot row)
pub type PivotAttributes = HashMap<String, serde_json::Value>;

/// Runtime entity type plus identity.
///
/// Two entity types that share a numeric identity (say `user/1` and
/// `role/1`) produce distinct keys.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityKey {
    /// Entity type (e.g. "user", "role", "service_account")
    pub entity_type: String,

    /// Entity identity within its type
    pub id: EntityId,
}

impl EntityKey {
    /// Create a new entity key
    pub fn new(entity_type: impl Into<String>, id: EntityId) -> Self {
        Self {
            entity_type: entity_type.into(),
            id,
        }
    }
}

impl fmt::Display for EntityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.entity_type, self.id)
    }
}

/// An atomic named authorization unit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Permission {
    /// Unique permission identifier
    pub id: PermissionId,

    /// Unique permission name (e.g. "posts.edit")
    pub name: String,

    /// Arbitrary additional attributes
    #[serde(default)]
    pub attributes: HashMap<String, serde_json::Value>,
}

impl Permission {
    /// Create a new permission
    pub fn new(id: PermissionId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            attributes: HashMap::new(),
        }
    }

    /// Add an attribute to the permission
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }
}

/// A named bundle of permissions assignable to a subject
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    /// Unique role identifier
    pub id: RoleId,

    /// Role name (e.g. "editor")
    pub name: String,
}

impl Role {
    /// Entity type under which roles are keyed
    pub const ENTITY_TYPE: &'static str = "role";

    /// Create a new role
    pub fn new(id: RoleId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}

/// Any entity that holds permissions directly and through at most one role
///
/// The `role` entity type is reserved: a subject using it addresses the
/// role's own associations, and the resolver rejects it when a role is also
/// assigned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subject {
    /// Entity type (e.g. "user")
    #[serde(rename = "type")]
    pub entity_type: String,

    /// Entity identity
    pub id: EntityId,

    /// Assigned role, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
}

impl Subject {
    /// Create a new subject without a role
    pub fn new(entity_type: impl Into<String>, id: EntityId) -> Self {
        Self {
            entity_type: entity_type.into(),
            id,
            role: None,
        }
    }

    /// Create a `user` subject
    pub fn user(id: EntityId) -> Self {
        Self::new("user", id)
    }

    /// Assign a role to the subject
    pub fn with_role(mut self, role: Role) -> Self {
        self.role = Some(role);
        self
    }
}
