//! Property tests for effective permission sets and batch checks

use proptest::prelude::*;
use single_role_authz::{
    AssociationStore, InMemoryAssociationStore, MatchMode, Permission, PermissionHolder,
    PermissionId, PermissionRef, PermissionResolver, PivotAttributes, Role, Subject,
};
use std::collections::BTreeSet;
use std::sync::Arc;

const CATALOGUE: PermissionId = 12;

fn permission_name(id: PermissionId) -> String {
    format!("perm-{}", id)
}

fn id_set() -> impl Strategy<Value = BTreeSet<PermissionId>> {
    proptest::collection::btree_set(1..=CATALOGUE, 0..8)
}

async fn resolver_with(
    own: &BTreeSet<PermissionId>,
    inherited: Option<&BTreeSet<PermissionId>>,
) -> (PermissionResolver, Subject) {
    let store = Arc::new(InMemoryAssociationStore::new());
    store
        .insert_permissions((1..=CATALOGUE).map(|id| Permission::new(id, permission_name(id))))
        .await
        .unwrap();

    let mut user = Subject::user(1);
    let own: Vec<_> = own.iter().copied().collect();
    store.attach(&user.entity_key(), &own, &PivotAttributes::new(), false).await.unwrap();

    if let Some(inherited) = inherited {
        let role = Role::new(1, "generated");
        let ids: Vec<_> = inherited.iter().copied().collect();
        store.attach(&role.entity_key(), &ids, &PivotAttributes::new(), false).await.unwrap();
        user = user.with_role(role);
    }

    (PermissionResolver::new(store), user)
}

proptest! {
    #[test]
    fn effective_set_is_the_union(own in id_set(), inherited in id_set()) {
        tokio_test::block_on(async {
            let (resolver, user) = resolver_with(&own, Some(&inherited)).await;
            let permissions = resolver.get_permissions(&user).await.unwrap();

            let ids = permissions.ids();
            let unique: BTreeSet<_> = ids.iter().copied().collect();
            let expected: BTreeSet<_> = own.union(&inherited).copied().collect();

            prop_assert_eq!(ids.len(), unique.len());
            prop_assert_eq!(unique, expected);
            Ok(())
        })?;
    }

    #[test]
    fn reads_are_stable(own in id_set(), inherited in id_set()) {
        tokio_test::block_on(async {
            let (resolver, user) = resolver_with(&own, Some(&inherited)).await;

            let first = resolver.get_permissions(&user).await.unwrap();
            let second = resolver.get_permissions(&user).await.unwrap();

            prop_assert_eq!(first, second);
            Ok(())
        })?;
    }

    #[test]
    fn id_and_name_references_agree(own in id_set(), probe in 1..=CATALOGUE + 3) {
        tokio_test::block_on(async {
            let (resolver, user) = resolver_with(&own, None).await;

            let by_id = resolver.has_permission(&user, &probe.to_string().into()).await.unwrap();
            let by_name = resolver.has_permission(&user, &permission_name(probe).into()).await.unwrap();

            prop_assert_eq!(by_id, own.contains(&probe));
            prop_assert_eq!(by_name, own.contains(&probe));
            Ok(())
        })?;
    }

    #[test]
    fn batch_modes_match_any_and_all(own in id_set(), probes in proptest::collection::vec(1..=CATALOGUE, 0..5)) {
        tokio_test::block_on(async {
            let (resolver, user) = resolver_with(&own, None).await;

            let joined = probes.iter().map(|id| permission_name(*id)).collect::<Vec<_>>().join("|");
            let refs = if probes.is_empty() {
                Vec::new()
            } else {
                PermissionRef::parse_list(&joined)
            };

            let any = resolver.has_permissions(&user, &refs, MatchMode::Any).await.unwrap();
            let all = resolver.has_permissions(&user, &refs, MatchMode::All).await.unwrap();

            prop_assert_eq!(any, probes.iter().any(|id| own.contains(id)));
            prop_assert_eq!(all, probes.iter().all(|id| own.contains(id)));
            Ok(())
        })?;
    }

    #[test]
    fn attach_then_detach_round_trips_membership(own in id_set(), extra in 1..=CATALOGUE) {
        tokio_test::block_on(async {
            let (resolver, user) = resolver_with(&own, None).await;
            prop_assume!(!own.contains(&extra));

            resolver.attach_permissions(&user, &[extra], &PivotAttributes::new(), true).await.unwrap();
            prop_assert!(resolver.get_permissions(&user).await.unwrap().contains_id(extra));

            resolver.detach_permissions(&user, Some(&[extra]), true).await.unwrap();
            prop_assert!(!resolver.get_permissions(&user).await.unwrap().contains_id(extra));
            Ok(())
        })?;
    }
}
