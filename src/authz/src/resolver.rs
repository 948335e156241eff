//! Permission resolver with per-entity caching
//!
//! The resolver computes the effective permission set of a
//! [`PermissionHolder`], answers membership queries against it, and routes
//! attach/detach/sync through an [`AssociationStore`], refreshing the cached
//! snapshot after every successful mutation.
//!
//! # Example
//!
//! ```rust
//! use single_role_authz::{
//!     InMemoryAssociationStore, MatchMode, Permission, PermissionRef, PermissionResolver,
//!     PivotAttributes, Role, Subject,
//! };
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let store = InMemoryAssociationStore::new();
//! store.insert_permissions(vec![Permission::new(1, "view"), Permission::new(2, "edit")]).await?;
//!
//! let resolver = PermissionResolver::new(Arc::new(store));
//! let editor = Role::new(1, "editor");
//! let user = Subject::user(1).with_role(editor.clone());
//!
//! resolver.attach_permissions(&editor, &[2], &PivotAttributes::new(), true).await?;
//! resolver.attach_permissions(&user, &[1], &PivotAttributes::new(), true).await?;
//! resolver.cache().clear();
//!
//! assert!(resolver.has_permission(&user, &"edit".into()).await?);
//! assert!(resolver.has_permissions(&user, &PermissionRef::parse_list("view|edit"), MatchMode::All).await?);
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::cache::{CacheStats, PermissionCache};
use crate::config::{RefreshMode, ResolverConfig};
use crate::error::{AuthzError, Result};
use crate::holder::PermissionHolder;
use crate::permission_ref::{MatchMode, PermissionRef};
use crate::permission_set::PermissionSet;
use crate::store::{AssociationStore, SyncChanges};
use crate::types::{EntityKey, PermissionId, PivotAttributes, Role};

/// Resolves and caches effective permission sets
///
/// # Thread Safety
///
/// The resolver is `Send + Sync` and can be shared behind an `Arc`. See
/// [`PermissionCache`] for the consistency guarantees of cached snapshots.
pub struct PermissionResolver {
    /// Association storage backend
    store: Arc<dyn AssociationStore>,

    /// Effective permission snapshots per entity
    cache: Arc<PermissionCache>,

    config: ResolverConfig,
}

impl PermissionResolver {
    /// Create a resolver with default configuration and a private cache
    pub fn new(store: Arc<dyn AssociationStore>) -> Self {
        Self::with_config(store, ResolverConfig::default())
    }

    /// Create a resolver with a private cache
    pub fn with_config(store: Arc<dyn AssociationStore>, config: ResolverConfig) -> Self {
        let cache = Arc::new(PermissionCache::with_stats(config.track_stats));
        Self::with_cache(store, cache, config)
    }

    /// Create a resolver over an existing cache.
    ///
    /// Resolvers sharing a cache also share its snapshots.
    pub fn with_cache(
        store: Arc<dyn AssociationStore>,
        cache: Arc<PermissionCache>,
        config: ResolverConfig,
    ) -> Self {
        debug!("PermissionResolver initialized with refresh_mode={:?}", config.refresh_mode);

        Self { store, cache, config }
    }

    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    pub fn cache(&self) -> &Arc<PermissionCache> {
        &self.cache
    }

    /// Get cache statistics
    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    /// Effective permission set of `holder`.
    ///
    /// A cached snapshot is returned as-is. Otherwise the holder's own
    /// associations are fetched and, if it inherits a role, merged with the
    /// role's associations; the result is cached before it is returned.
    pub async fn get_permissions<H>(&self, holder: &H) -> Result<Arc<PermissionSet>>
    where
        H: PermissionHolder + ?Sized,
    {
        let key = holder_key(holder)?;

        if let Some(cached) = self.cache.get(&key) {
            debug!("Permission cache hit for {}", key);
            return Ok(cached);
        }

        debug!("Permission cache miss for {}", key);
        let permissions = self.resolve_effective(holder, &key).await?;

        Ok(self.cache.insert(key, permissions))
    }

    /// Whether `holder` has the referenced permission
    pub async fn has_permission<H>(&self, holder: &H, permission: &PermissionRef) -> Result<bool>
    where
        H: PermissionHolder + ?Sized,
    {
        let permissions = self.get_permissions(holder).await?;

        Ok(permissions.iter().any(|p| permission.matches(p)))
    }

    /// Evaluate a batch of references in order.
    ///
    /// [`MatchMode::Any`] stops at the first match, [`MatchMode::All`] at the
    /// first miss. An empty batch is `false` under `Any` and `true` under `All`.
    pub async fn has_permissions<H>(
        &self,
        holder: &H,
        permissions: &[PermissionRef],
        mode: MatchMode,
    ) -> Result<bool>
    where
        H: PermissionHolder + ?Sized,
    {
        for permission in permissions {
            let found = self.has_permission(holder, permission).await?;

            match mode {
                MatchMode::Any if found => return Ok(true),
                MatchMode::All if !found => return Ok(false),
                _ => {}
            }
        }

        Ok(mode == MatchMode::All)
    }

    /// Attach permissions to `holder`, then refresh its cache entry
    pub async fn attach_permissions<'h, H>(
        &self,
        holder: &'h H,
        ids: &[PermissionId],
        pivot: &PivotAttributes,
        touch: bool,
    ) -> Result<&'h H>
    where
        H: PermissionHolder + ?Sized,
    {
        let key = holder_key(holder)?;

        self.store
            .attach(&key, ids, pivot, touch)
            .await
            .map_err(|e| {
                warn!("Attach to {} failed: {}", key, e);
                e
            })?;

        info!("Attached permissions {:?} to {}", ids, key);
        self.refresh(holder, key).await?;

        Ok(holder)
    }

    /// Detach permissions from `holder` (`None` detaches all), then refresh
    /// its cache entry
    pub async fn detach_permissions<'h, H>(
        &self,
        holder: &'h H,
        ids: Option<&[PermissionId]>,
        touch: bool,
    ) -> Result<&'h H>
    where
        H: PermissionHolder + ?Sized,
    {
        let key = holder_key(holder)?;

        let removed = self.store
            .detach(&key, ids, touch)
            .await
            .map_err(|e| {
                warn!("Detach from {} failed: {}", key, e);
                e
            })?;

        info!("Detached {} permission(s) from {}", removed, key);
        self.refresh(holder, key).await?;

        Ok(holder)
    }

    /// Replace the associations of `holder` with `ids`, then refresh its
    /// cache entry
    pub async fn sync_permissions<'h, H>(
        &self,
        holder: &'h H,
        ids: &[PermissionId],
        detaching: bool,
    ) -> Result<&'h H>
    where
        H: PermissionHolder + ?Sized,
    {
        self.sync_permissions_with_changes(holder, ids, detaching).await?;

        Ok(holder)
    }

    /// Like [`sync_permissions`](Self::sync_permissions), returning what changed
    pub async fn sync_permissions_with_changes<H>(
        &self,
        holder: &H,
        ids: &[PermissionId],
        detaching: bool,
    ) -> Result<SyncChanges>
    where
        H: PermissionHolder + ?Sized,
    {
        let key = holder_key(holder)?;

        let changes = self.store
            .sync(&key, ids, detaching)
            .await
            .map_err(|e| {
                warn!("Sync of {} failed: {}", key, e);
                e
            })?;

        info!(
            "Synced permissions of {}: attached={:?}, detached={:?}",
            key, changes.attached, changes.detached
        );
        self.refresh(holder, key).await?;

        Ok(changes)
    }

    async fn resolve_effective<H>(&self, holder: &H, key: &EntityKey) -> Result<PermissionSet>
    where
        H: PermissionHolder + ?Sized,
    {
        let mut permissions: PermissionSet = self.store.fetch_associated(key).await?.into();

        if let Some(role) = holder.inherited_role() {
            let role_key = role.entity_key();
            permissions.merge(self.store.fetch_associated(&role_key).await?);
            debug!("Merged permissions of {} into {}", role_key, key);
        }

        Ok(permissions)
    }

    /// Overwrite the cache entry of a just-mutated holder
    async fn refresh<H>(&self, holder: &H, key: EntityKey) -> Result<Arc<PermissionSet>>
    where
        H: PermissionHolder + ?Sized,
    {
        let permissions: PermissionSet = match self.config.refresh_mode {
            RefreshMode::OwnAssociations => self.store.fetch_associated(&key).await?.into(),
            RefreshMode::Effective => self.resolve_effective(holder, &key).await?,
        };

        debug!("Refreshed cached permissions of {} ({} entries)", key, permissions.len());
        Ok(self.cache.refresh(key, permissions))
    }
}

/// Cache and store key of `holder`.
///
/// A holder that inherits a role may not use the role entity type, or its
/// effective set would land in the role's own entry.
fn holder_key<H>(holder: &H) -> Result<EntityKey>
where
    H: PermissionHolder + ?Sized,
{
    let key = holder.entity_key();

    if key.entity_type == Role::ENTITY_TYPE && holder.inherited_role().is_some() {
        return Err(AuthzError::InvalidInput(format!(
            "entity type '{}' is reserved for roles",
            Role::ENTITY_TYPE
        )));
    }

    Ok(key)
}
