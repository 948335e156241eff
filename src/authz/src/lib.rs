//! # Single-Role Authorization
//!
//! Permission membership checks for subjects that hold permissions directly
//! and through at most one role.
//!
//! ## Features
//!
//! - **Effective permission sets**: a subject's own permissions merged with
//!   those of its assigned role, unique by permission id
//! - **Per-entity caching** keyed by entity type and identity, refreshed after
//!   every attach/detach/sync
//! - **ANY/ALL batch checks** over permission ids or names
//! - **Pluggable association storage**: in-memory, or PostgreSQL with the
//!   `postgres` feature
//!
//! ## Example
//!
//! ```rust
//! use single_role_authz::{
//!     InMemoryAssociationStore, MatchMode, Permission, PermissionRef, PermissionResolver,
//!     PivotAttributes, Role, Subject,
//! };
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = InMemoryAssociationStore::new();
//!     store.insert_permissions(vec![
//!         Permission::new(1, "view"),
//!         Permission::new(2, "edit"),
//!     ]).await?;
//!
//!     let resolver = PermissionResolver::new(Arc::new(store));
//!
//!     let editor = Role::new(1, "editor");
//!     resolver.attach_permissions(&editor, &[2], &PivotAttributes::new(), true).await?;
//!
//!     let user = Subject::user(42).with_role(editor);
//!     resolver.get_permissions(&user).await?;
//!
//!     if resolver.has_permission(&user, &"edit".into()).await? {
//!         println!("Editing allowed");
//!     }
//!
//!     let either = PermissionRef::parse_list("view|edit");
//!     assert!(resolver.has_permissions(&user, &either, MatchMode::Any).await?);
//!
//!     Ok(())
//! }
//! ```

pub mod types;
pub mod holder;
pub mod permission_set;
pub mod permission_ref;
pub mod cache;
pub mod config;
pub mod store;
pub mod resolver;
pub mod error;

// Re-export commonly used types
pub use types::{
    EntityId, EntityKey, Permission, PermissionId, PivotAttributes, Role, RoleId, Subject,
};
pub use holder::PermissionHolder;
pub use permission_set::PermissionSet;
pub use permission_ref::{MatchMode, PermissionRef};
pub use cache::{CacheStats, PermissionCache};
pub use config::{RefreshMode, ResolverConfig};
pub use store::{AssociationStore, InMemoryAssociationStore, SyncChanges};
pub use resolver::PermissionResolver;
pub use error::{AuthzError, Result};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
