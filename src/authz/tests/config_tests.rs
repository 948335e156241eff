//! Resolver configuration loading tests

use single_role_authz::{
    InMemoryAssociationStore, PermissionResolver, RefreshMode, ResolverConfig,
};
use std::io::Write;
use std::sync::Arc;

#[test]
fn test_load_from_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "refresh_mode = \"effective\"").unwrap();
    writeln!(file, "track_stats = false").unwrap();

    let config = ResolverConfig::load(file.path()).unwrap();

    assert_eq!(config.refresh_mode, RefreshMode::Effective);
    assert!(!config.track_stats);
}

#[test]
fn test_missing_file_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("absent.toml");

    let err = ResolverConfig::load(&path).unwrap_err();
    assert!(err.to_string().contains("Failed to read configuration file"));
}

#[tokio::test]
async fn test_untracked_stats_config_reaches_cache() {
    let config = ResolverConfig::from_toml_str("track_stats = false").unwrap();
    let resolver = PermissionResolver::with_config(Arc::new(InMemoryAssociationStore::new()), config);

    let user = single_role_authz::Subject::user(1);
    resolver.get_permissions(&user).await.unwrap();
    resolver.get_permissions(&user).await.unwrap();

    let stats = resolver.cache_stats();
    assert_eq!(stats.hits, 0);
    assert_eq!(stats.misses, 0);
    assert_eq!(stats.entries, 1);
}
