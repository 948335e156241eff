//! Association storage for the entity ↔ permission many-to-many mapping

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::types::{EntityKey, Permission, PermissionId, PivotAttributes};

pub mod memory;

#[cfg(feature = "postgres")]
pub mod postgres;

pub use memory::InMemoryAssociationStore;

#[cfg(feature = "postgres")]
pub use postgres::PostgresAssociationStore;

/// Changes applied by [`AssociationStore::sync`]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncChanges {
    /// Newly attached permission ids
    pub attached: Vec<PermissionId>,
    /// Detached permission ids
    pub detached: Vec<PermissionId>,
}

impl SyncChanges {
    /// Work out the changes that turn `current` into `desired`
    pub fn plan(current: &[PermissionId], desired: &[PermissionId], detaching: bool) -> Self {
        let mut changes = Self::default();

        if detaching {
            changes.detached = current
                .iter()
                .copied()
                .filter(|id| !desired.contains(id))
                .collect();
        }

        for id in desired {
            if !current.contains(id) && !changes.attached.contains(id) {
                changes.attached.push(*id);
            }
        }

        changes
    }

    /// Whether the sync changed anything
    pub fn is_empty(&self) -> bool {
        self.attached.is_empty() && self.detached.is_empty()
    }
}

/// Association store trait
///
/// Errors from an implementation are surfaced to callers of the resolver
/// as-is; the resolver never retries.
#[async_trait]
pub trait AssociationStore: Send + Sync {
    /// Permissions directly associated with an entity, in association order
    async fn fetch_associated(&self, key: &EntityKey) -> Result<Vec<Permission>>;

    /// Associate permissions with an entity.
    ///
    /// `pivot` is stored on every new association record. With `touch` the
    /// entity's timestamp is updated.
    async fn attach(
        &self,
        key: &EntityKey,
        ids: &[PermissionId],
        pivot: &PivotAttributes,
        touch: bool,
    ) -> Result<()>;

    /// Remove associations; `None` removes all of them. Returns the number removed.
    async fn detach(
        &self,
        key: &EntityKey,
        ids: Option<&[PermissionId]>,
        touch: bool,
    ) -> Result<usize>;

    /// Make `ids` the associated set. Associations missing from `ids` are
    /// only removed when `detaching` is set.
    async fn sync(
        &self,
        key: &EntityKey,
        ids: &[PermissionId],
        detaching: bool,
    ) -> Result<SyncChanges>;
}
