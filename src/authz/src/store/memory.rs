//! In-memory association store

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

use super::{AssociationStore, SyncChanges};
use crate::error::{AuthzError, Result};
use crate::types::{EntityKey, Permission, PermissionId, PivotAttributes};

/// One row of the association table
#[derive(Debug, Clone)]
struct PivotRecord {
    permission_id: PermissionId,
    attributes: PivotAttributes,
    attached_at: DateTime<Utc>,
}

#[derive(Debug, Default)]
struct StoreState {
    /// Permission catalogue in insertion order
    permissions: Vec<Permission>,
    pivots: HashMap<EntityKey, Vec<PivotRecord>>,
    touched: HashMap<EntityKey, DateTime<Utc>>,
}

impl StoreState {
    fn permission(&self, id: PermissionId) -> Option<&Permission> {
        self.permissions.iter().find(|p| p.id == id)
    }

    fn ensure_exists(&self, ids: &[PermissionId]) -> Result<()> {
        match ids.iter().find(|id| self.permission(**id).is_none()) {
            Some(missing) => Err(AuthzError::ForeignKeyViolation { permission_id: *missing }),
            None => Ok(()),
        }
    }

    fn attached_ids(&self, key: &EntityKey) -> Vec<PermissionId> {
        self.pivots
            .get(key)
            .map(|records| records.iter().map(|r| r.permission_id).collect())
            .unwrap_or_default()
    }

    fn touch(&mut self, key: &EntityKey) {
        self.touched.insert(key.clone(), Utc::now());
    }
}

/// In-memory association store
///
/// Enforces the same constraints a relational pivot table would: every
/// association must reference an existing permission, and an entity holds a
/// given permission at most once. A failing call changes nothing.
#[derive(Debug, Clone, Default)]
pub struct InMemoryAssociationStore {
    state: Arc<RwLock<StoreState>>,
}

impl InMemoryAssociationStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a permission to the catalogue. Ids and names are unique.
    pub async fn insert_permission(&self, permission: Permission) -> Result<()> {
        if permission.name.is_empty() {
            return Err(AuthzError::InvalidInput("permission name must not be empty".to_string()));
        }

        let mut state = self.state.write().await;

        if state.permission(permission.id).is_some() {
            return Err(AuthzError::UniqueViolation(format!("permission id {}", permission.id)));
        }
        if state.permissions.iter().any(|p| p.name == permission.name) {
            return Err(AuthzError::UniqueViolation(format!("permission name '{}'", permission.name)));
        }

        state.permissions.push(permission);
        Ok(())
    }

    /// Add several permissions to the catalogue, stopping at the first failure
    pub async fn insert_permissions(
        &self,
        permissions: impl IntoIterator<Item = Permission>,
    ) -> Result<()> {
        for permission in permissions {
            self.insert_permission(permission).await?;
        }
        Ok(())
    }

    /// Look up a catalogue entry
    pub async fn permission(&self, id: PermissionId) -> Option<Permission> {
        self.state.read().await.permission(id).cloned()
    }

    /// Pivot attributes stored on an association
    pub async fn pivot_attributes(
        &self,
        key: &EntityKey,
        permission_id: PermissionId,
    ) -> Option<PivotAttributes> {
        let state = self.state.read().await;
        state
            .pivots
            .get(key)?
            .iter()
            .find(|r| r.permission_id == permission_id)
            .map(|r| r.attributes.clone())
    }

    /// When an association was created
    pub async fn attached_at(
        &self,
        key: &EntityKey,
        permission_id: PermissionId,
    ) -> Option<DateTime<Utc>> {
        let state = self.state.read().await;
        state
            .pivots
            .get(key)?
            .iter()
            .find(|r| r.permission_id == permission_id)
            .map(|r| r.attached_at)
    }

    /// Last time the entity was touched by a mutation
    pub async fn last_touched(&self, key: &EntityKey) -> Option<DateTime<Utc>> {
        self.state.read().await.touched.get(key).copied()
    }
}

#[async_trait]
impl AssociationStore for InMemoryAssociationStore {
    async fn fetch_associated(&self, key: &EntityKey) -> Result<Vec<Permission>> {
        let state = self.state.read().await;

        let Some(records) = state.pivots.get(key) else {
            return Ok(Vec::new());
        };

        Ok(records
            .iter()
            .filter_map(|r| state.permission(r.permission_id).cloned())
            .collect())
    }

    async fn attach(
        &self,
        key: &EntityKey,
        ids: &[PermissionId],
        pivot: &PivotAttributes,
        touch: bool,
    ) -> Result<()> {
        let mut state = self.state.write().await;

        state.ensure_exists(ids)?;

        let mut seen: HashSet<PermissionId> = state.attached_ids(key).into_iter().collect();
        for id in ids {
            if !seen.insert(*id) {
                return Err(AuthzError::UniqueViolation(format!(
                    "{} already has permission {}",
                    key, id
                )));
            }
        }

        let now = Utc::now();
        let records = state.pivots.entry(key.clone()).or_default();
        records.extend(ids.iter().map(|id| PivotRecord {
            permission_id: *id,
            attributes: pivot.clone(),
            attached_at: now,
        }));

        if touch {
            state.touch(key);
        }

        debug!("Attached {} permission(s) to {}", ids.len(), key);
        Ok(())
    }

    async fn detach(
        &self,
        key: &EntityKey,
        ids: Option<&[PermissionId]>,
        touch: bool,
    ) -> Result<usize> {
        if matches!(ids, Some(ids) if ids.is_empty()) {
            return Ok(0);
        }

        let mut state = self.state.write().await;

        let removed = match (state.pivots.get_mut(key), ids) {
            (Some(records), Some(ids)) => {
                let before = records.len();
                records.retain(|r| !ids.contains(&r.permission_id));
                before - records.len()
            }
            (Some(records), None) => {
                let removed = records.len();
                records.clear();
                removed
            }
            (None, _) => 0,
        };

        if touch {
            state.touch(key);
        }

        debug!("Detached {} permission(s) from {}", removed, key);
        Ok(removed)
    }

    async fn sync(
        &self,
        key: &EntityKey,
        ids: &[PermissionId],
        detaching: bool,
    ) -> Result<SyncChanges> {
        let mut state = self.state.write().await;

        state.ensure_exists(ids)?;

        let changes = SyncChanges::plan(&state.attached_ids(key), ids, detaching);

        let now = Utc::now();
        let records = state.pivots.entry(key.clone()).or_default();
        records.retain(|r| !changes.detached.contains(&r.permission_id));
        records.extend(changes.attached.iter().map(|id| PivotRecord {
            permission_id: *id,
            attributes: PivotAttributes::new(),
            attached_at: now,
        }));

        if !changes.is_empty() {
            state.touch(key);
        }

        debug!(
            "Synced {}: attached={:?}, detached={:?}",
            key, changes.attached, changes.detached
        );
        Ok(changes)
    }
}
