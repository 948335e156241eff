//! Entities capable of holding permissions

use crate::types::{EntityKey, Role, Subject};

/// An entity whose effective permissions can be resolved.
///
/// Resolution dispatches on [`inherited_role`](Self::inherited_role): a holder
/// that inherits from no role resolves to its own associations only, any other
/// holder resolves to its own associations merged with the role's.
pub trait PermissionHolder: Send + Sync {
    /// Runtime entity type and identity; the cache is keyed by this.
    fn entity_key(&self) -> EntityKey;

    /// Role whose permissions this holder inherits.
    fn inherited_role(&self) -> Option<&Role>;
}

impl PermissionHolder for Role {
    fn entity_key(&self) -> EntityKey {
        EntityKey::new(Self::ENTITY_TYPE, self.id)
    }

    /// Roles never inherit.
    fn inherited_role(&self) -> Option<&Role> {
        None
    }
}

impl PermissionHolder for Subject {
    fn entity_key(&self) -> EntityKey {
        EntityKey::new(self.entity_type.clone(), self.id)
    }

    fn inherited_role(&self) -> Option<&Role> {
        self.role.as_ref()
    }
}
