//! Role and member lifecycle through the role service.
//!
//! Covers creation, lookup, renames, full replacement, idempotent deletion
//! and member upserts, all performed by the superadmin.

mod common;

use common::{cn, token, TestFixture, ANCHOR};
use pki_auth::{MatchCriteria, MatchKey, MatchOperator};
use pki_roles::{MemberId, Role, RoleError, RoleId, RoleMember, RoleServiceConfig};
use pki_rules::{ResourcePath, Rule, RuleSet};
use std::sync::Arc;

#[tokio::test]
async fn test_create_get_round_trip() {
    let fixture = TestFixture::new().await;

    let created = fixture
        .service
        .create_role(&fixture.admin, "", "Nibbler")
        .await
        .unwrap();
    let role_id = created.id.expect("created role has an id");

    let fetched = fixture.service.get_role(role_id).await.unwrap();
    assert_eq!(fetched.id, Some(role_id));
    assert_eq!(fetched.namespace, "");
    assert_eq!(fetched.name, "Nibbler");
    assert!(fetched.rules.is_empty());

    let by_name = fixture.service.get_role_by_name("", "Nibbler").await.unwrap();
    assert_eq!(by_name.id, Some(role_id));
}

#[tokio::test]
async fn test_duplicate_create_fails() {
    let fixture = TestFixture::new().await;
    fixture
        .service
        .create_role(&fixture.admin, "", "Nibbler")
        .await
        .unwrap();

    let err = fixture
        .service
        .create_role(&fixture.admin, "", "Nibbler")
        .await
        .unwrap_err();
    match err {
        RoleError::RoleExists { namespace, name } => {
            assert_eq!(namespace, "");
            assert_eq!(name, "Nibbler");
        }
        other => panic!("expected RoleExists, got {other:?}"),
    }

    // same name in another namespace is a different role
    fixture
        .service
        .create_role(&fixture.admin, "TenantA", "Nibbler")
        .await
        .unwrap();
}

#[tokio::test]
async fn test_missing_roles_are_absent_not_errors() {
    let fixture = TestFixture::new().await;
    assert!(fixture.service.get_role(RoleId::new()).await.is_none());
    assert!(fixture.service.get_role_by_name("", "Nobody").await.is_none());
    assert!(fixture.service.get_role_members(RoleId::new()).await.is_empty());
}

#[tokio::test]
async fn test_idempotent_delete() {
    let fixture = TestFixture::new().await;
    let role = fixture
        .service
        .create_role(&fixture.admin, "", "Nibbler")
        .await
        .unwrap();
    let role_id = role.id.unwrap();

    assert!(fixture
        .service
        .delete_role_idempotent(&fixture.admin, role_id)
        .await
        .unwrap());
    assert!(!fixture
        .service
        .delete_role_idempotent(&fixture.admin, role_id)
        .await
        .unwrap());
    assert!(fixture.service.get_role(role_id).await.is_none());
    assert!(fixture.service.get_role_by_name("", "Nibbler").await.is_none());

    // the name is free again
    fixture
        .service
        .create_role(&fixture.admin, "", "Nibbler")
        .await
        .unwrap();
}

#[tokio::test]
async fn test_delete_cascades_members() {
    let fixture = TestFixture::new().await;
    let role = fixture
        .service
        .persist_role(
            &fixture.admin,
            Role::new("", "Operators").with_rule("/ca/IssuingCA", Rule::allow_subtree()),
        )
        .await
        .unwrap();
    let role_id = role.id.unwrap();
    fixture
        .service
        .add_member(&fixture.admin, RoleMember::new(role_id, cn("Operator")))
        .await
        .unwrap();
    assert!(fixture.service.is_authorized(&token("Operator"), "/ca/IssuingCA").await);

    fixture
        .service
        .delete_role_idempotent(&fixture.admin, role_id)
        .await
        .unwrap();
    assert!(fixture.service.get_role_members(role_id).await.is_empty());
    assert!(!fixture.service.is_authorized(&token("Operator"), "/ca/IssuingCA").await);
}

#[tokio::test]
async fn test_rename_collision() {
    let fixture = TestFixture::new().await;
    let a = fixture
        .service
        .create_role(&fixture.admin, "", "A")
        .await
        .unwrap();
    fixture
        .service
        .create_role(&fixture.admin, "", "Cubert")
        .await
        .unwrap();

    let err = fixture
        .service
        .persist_role(&fixture.admin, a.clone().renamed("", "Cubert"))
        .await
        .unwrap_err();
    assert!(matches!(err, RoleError::RoleExists { .. }));
    assert_eq!(fixture.service.get_role(a.id.unwrap()).await.unwrap().name, "A");

    let moved = fixture
        .service
        .persist_role(&fixture.admin, a.clone().renamed("TenantA", "Cubert"))
        .await
        .unwrap();
    assert_eq!(moved.id, a.id);
    assert_eq!(moved.namespace, "TenantA");
    assert_eq!(moved.created_at, a.created_at);
}

#[tokio::test]
async fn test_rename_updates_name_lookup() {
    let fixture = TestFixture::new().await;
    let role = fixture
        .service
        .create_role(&fixture.admin, "", "Old")
        .await
        .unwrap();
    // warm the cache
    assert!(fixture.service.get_role_by_name("", "Old").await.is_some());

    fixture
        .service
        .persist_role(&fixture.admin, role.clone().renamed("", "New"))
        .await
        .unwrap();
    assert!(fixture.service.get_role_by_name("", "Old").await.is_none());
    assert_eq!(
        fixture.service.get_role_by_name("", "New").await.unwrap().id,
        role.id
    );
}

#[tokio::test]
async fn test_stale_cache_entry_is_verified() {
    let fixture = TestFixture::new().await;
    let role = fixture
        .service
        .create_role(&fixture.admin, "", "Nibbler")
        .await
        .unwrap();

    // point the cache at a role that does not carry this name
    fixture
        .service
        .name_cache()
        .insert("", "Nibbler", RoleId::new())
        .await;
    assert_eq!(
        fixture.service.get_role_by_name("", "Nibbler").await.unwrap().id,
        role.id
    );
}

#[tokio::test]
async fn test_persist_replaces_rules() {
    let fixture = TestFixture::new().await;
    let role = fixture
        .service
        .persist_role(
            &fixture.admin,
            Role::new("", "Operators").with_rule("/ca/A", Rule::allow_subtree()),
        )
        .await
        .unwrap();

    let replaced = fixture
        .service
        .persist_role(
            &fixture.admin,
            role.clone()
                .with_rules(RuleSet::new().with_rule("/ca/B", Rule::allow_exact())),
        )
        .await
        .unwrap();
    assert_eq!(replaced.id, role.id);
    assert!(replaced.rules.get(&ResourcePath::new("/ca/A")).is_none());
    assert_eq!(
        fixture.service.get_role(role.id.unwrap()).await.unwrap().rules,
        replaced.rules
    );
}

#[tokio::test]
async fn test_persist_with_unknown_id_creates() {
    let fixture = TestFixture::new().await;
    let role_id = RoleId::new();
    let mut role = Role::new("", "Imported");
    role.id = Some(role_id);

    let created = fixture.service.persist_role(&fixture.admin, role).await.unwrap();
    assert_eq!(created.id, Some(role_id));
    assert!(fixture.service.get_role(role_id).await.is_some());
}

#[tokio::test]
async fn test_member_upsert_by_identity() {
    let fixture = TestFixture::new().await;
    let role = fixture
        .service
        .create_role(&fixture.admin, "", "Operators")
        .await
        .unwrap();
    let role_id = role.id.unwrap();

    let first = fixture
        .service
        .add_member(&fixture.admin, RoleMember::new(role_id, cn("Operator")))
        .await
        .unwrap();
    let again = fixture
        .service
        .add_member(&fixture.admin, RoleMember::new(role_id, cn("Operator")))
        .await
        .unwrap();
    assert_eq!(first, again);
    assert_eq!(fixture.service.get_role_members(role_id).await.len(), 1);

    // same identity, different operator: updated in place
    let relaxed = MatchCriteria::new(
        ANCHOR,
        MatchKey::CommonName,
        MatchOperator::EqualsCaseInsensitive,
        "Operator",
    );
    let updated = fixture
        .service
        .add_member(&fixture.admin, RoleMember::new(role_id, relaxed))
        .await
        .unwrap();
    assert_eq!(updated.id, first.id);
    let members = fixture.service.get_role_members(role_id).await;
    assert_eq!(members.len(), 1);
    assert_eq!(members[0].criteria.operator, MatchOperator::EqualsCaseInsensitive);
}

#[tokio::test]
async fn test_member_identity_is_rederived() {
    let fixture = TestFixture::new().await;
    let role = fixture
        .service
        .create_role(&fixture.admin, "", "Operators")
        .await
        .unwrap();
    let role_id = role.id.unwrap();

    let mut member = RoleMember::new(role_id, cn("Operator"));
    let expected = member.id;
    member.id = MemberId::derive(RoleId::new(), &cn("Someone else"));

    let added = fixture.service.add_member(&fixture.admin, member).await.unwrap();
    assert_eq!(added.id, expected);
}

#[tokio::test]
async fn test_remove_member() {
    let fixture = TestFixture::new().await;
    let role = fixture
        .service
        .persist_role(
            &fixture.admin,
            Role::new("", "Operators").with_rule("/ca/IssuingCA", Rule::allow_subtree()),
        )
        .await
        .unwrap();
    let role_id = role.id.unwrap();
    let member = fixture
        .service
        .add_member_criteria(&fixture.admin, role_id, cn("Operator"))
        .await
        .unwrap();

    assert!(fixture
        .service
        .remove_member(&fixture.admin, role_id, member.id)
        .await
        .unwrap());
    assert!(!fixture
        .service
        .remove_member(&fixture.admin, role_id, member.id)
        .await
        .unwrap());
    assert!(!fixture.service.is_authorized(&token("Operator"), "/ca/IssuingCA").await);
}

#[tokio::test]
async fn test_member_writes_on_missing_role() {
    let fixture = TestFixture::new().await;
    let missing = RoleId::new();

    let err = fixture
        .service
        .add_member(&fixture.admin, RoleMember::new(missing, cn("Operator")))
        .await
        .unwrap_err();
    assert!(matches!(err, RoleError::NotFound(_)));

    let err = fixture
        .service
        .remove_member(&fixture.admin, missing, MemberId::derive(missing, &cn("Operator")))
        .await
        .unwrap_err();
    assert_eq!(err.error_code(), "NOT_FOUND");
}

#[tokio::test]
async fn test_invalid_member_rejected() {
    let fixture = TestFixture::new().await;
    let role = fixture
        .service
        .create_role(&fixture.admin, "", "Operators")
        .await
        .unwrap();

    let empty = MatchCriteria::new(ANCHOR, MatchKey::CommonName, MatchOperator::Equals, " ");
    let err = fixture
        .service
        .add_member(&fixture.admin, RoleMember::new(role.id.unwrap(), empty))
        .await
        .unwrap_err();
    assert_eq!(err.error_code(), "INVALID_MEMBER");
}

#[tokio::test]
async fn test_roles_token_is_member_of() {
    let fixture = TestFixture::new().await;
    let operators = fixture.seed("", "Operators", RuleSet::new(), &["Alice"]).await;
    fixture.seed("TenantA", "Auditors", RuleSet::new(), &["Bob"]).await;
    let tenant_ops = fixture.seed("TenantA", "Operators", RuleSet::new(), &["Alice"]).await;

    let mut ids: Vec<_> = fixture
        .service
        .get_roles_token_is_member_of(&token("Alice"))
        .await
        .into_iter()
        .map(|role| role.id)
        .collect();
    ids.sort();
    let mut expected = vec![operators.id, tenant_ops.id];
    expected.sort();
    assert_eq!(ids, expected);
}

#[tokio::test]
async fn test_minimized_rules_are_stored_when_enabled() {
    let store = Arc::new(pki_roles::MemoryRoleStore::new());
    let config = RoleServiceConfig::default().with_minimize_rules(true);
    let service = pki_roles::RoleService::with_config(store, config).unwrap();
    service
        .initialize_superadmin("Super Administrator Role", cn("SuperAdmin"))
        .await
        .unwrap();
    let admin = token("SuperAdmin");

    let role = service
        .persist_role(
            &admin,
            Role::new("", "Operators")
                .with_rule("/ca", Rule::allow_subtree())
                .with_rule("/ca/IssuingCA", Rule::allow_exact())
                .with_rule("/other", Rule::deny_subtree()),
        )
        .await
        .unwrap();
    assert_eq!(role.rules.len(), 1);
    assert!(role.rules.is_allowed(&ResourcePath::new("/ca/IssuingCA")));
}
