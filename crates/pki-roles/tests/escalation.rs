//! Privilege escalation prevention.
//!
//! An administrator may only create, change, delete or hand out roles whose
//! grants it already holds itself.

mod common;

use common::{cn, token, TestFixture};
use pki_auth::{MatchCriteria, MatchKey, MatchOperator};
use pki_roles::{Role, RoleError, RoleMember};
use pki_rules::{standard, Rule, RuleSet};

fn names(roles: &[Role]) -> Vec<&str> {
    roles.iter().map(|role| role.name.as_str()).collect()
}

#[tokio::test]
async fn test_strong_and_weak_roles() {
    let fixture = TestFixture::empty();
    fixture
        .seed(
            "",
            "strong",
            RuleSet::new()
                .with_rule("/", Rule::allow_subtree())
                .with_rule("/bar/foo", Rule::allow_subtree()),
            &["Strong"],
        )
        .await;
    fixture
        .seed(
            "",
            "weak",
            RuleSet::new()
                .with_rule("/", Rule::allow_subtree())
                .with_rule("/bar/foo", Rule::deny_exact()),
            &["Weak"],
        )
        .await;

    let strong = fixture.service.get_authorized_roles(&token("Strong")).await;
    assert_eq!(names(&strong), vec!["strong", "weak"]);

    let weak = fixture.service.get_authorized_roles(&token("Weak")).await;
    assert_eq!(names(&weak), vec!["weak"]);
}

#[tokio::test]
async fn test_candidate_denies_need_no_coverage() {
    let fixture = TestFixture::new().await;
    let restricted = Role::new("", "Restricted")
        .with_rule("/", Rule::allow_subtree())
        .with_rule("/x", Rule::deny_exact());

    assert!(fixture
        .service
        .is_authorized_to_edit_role(&fixture.admin, &restricted)
        .await);
    fixture
        .service
        .persist_role(&fixture.admin, restricted)
        .await
        .unwrap();
}

#[tokio::test]
async fn test_subtree_grant_needs_subtree_coverage() {
    let fixture = TestFixture::new().await;
    fixture
        .seed(
            "",
            "Bar Editors",
            TestFixture::editor_rules(RuleSet::new().with_rule("/bar", Rule::allow_exact())),
            &["Editor"],
        )
        .await;
    let editor = token("Editor");

    let exact = Role::new("", "Exact").with_rule("/bar", Rule::allow_exact());
    let subtree = Role::new("", "Subtree").with_rule("/bar", Rule::allow_subtree());
    assert!(fixture.service.is_authorized_to_edit_role(&editor, &exact).await);
    assert!(!fixture.service.is_authorized_to_edit_role(&editor, &subtree).await);

    let err = fixture
        .service
        .persist_role(&editor, subtree)
        .await
        .unwrap_err();
    match err {
        RoleError::AuthorizationDenied(reason) => assert!(reason.contains("/bar"), "{reason}"),
        other => panic!("expected AuthorizationDenied, got {other:?}"),
    }
    assert!(fixture.service.get_role_by_name("", "Subtree").await.is_none());
}

#[tokio::test]
async fn test_denied_persist_leaves_store_unchanged() {
    let fixture = TestFixture::new().await;
    fixture
        .seed(
            "",
            "CA Editors",
            TestFixture::editor_rules(RuleSet::new().with_rule("/ca/IssuingCA", Rule::allow_subtree())),
            &["Editor"],
        )
        .await;
    let editor = token("Editor");

    let target = fixture
        .service
        .persist_role(
            &fixture.admin,
            Role::new("", "Operators").with_rule("/ca/IssuingCA", Rule::allow_exact()),
        )
        .await
        .unwrap();

    // widening to a CA the editor cannot reach is refused as a whole
    let widened = target
        .clone()
        .renamed("", "Operators Plus")
        .with_rule("/ca/RootCA", Rule::allow_exact());
    let err = fixture.service.persist_role(&editor, widened).await.unwrap_err();
    assert!(matches!(err, RoleError::AuthorizationDenied(_)));

    let stored = fixture.service.get_role(target.id.unwrap()).await.unwrap();
    assert_eq!(stored, target);

    // narrowing within its own reach is fine
    let narrowed = target
        .clone()
        .with_rules(RuleSet::new().with_rule("/ca/IssuingCA/profiles", Rule::allow_subtree()));
    fixture.service.persist_role(&editor, narrowed).await.unwrap();
}

#[tokio::test]
async fn test_cannot_rewrite_stronger_role() {
    let fixture = TestFixture::new().await;
    fixture
        .seed(
            "",
            "CA Editors",
            TestFixture::editor_rules(RuleSet::new().with_rule("/ca/IssuingCA", Rule::allow_subtree())),
            &["Editor"],
        )
        .await;
    let editor = token("Editor");
    let superadmin = fixture
        .service
        .get_role_by_name("", "Super Administrator Role")
        .await
        .unwrap();

    // the replacement would be within reach, the current role is not
    let weakened = superadmin.clone().with_rules(RuleSet::new());
    assert!(!fixture.service.is_authorized_to_edit_role(&editor, &weakened).await);
    let err = fixture.service.persist_role(&editor, weakened).await.unwrap_err();
    assert!(matches!(err, RoleError::AuthorizationDenied(_)));

    let err = fixture
        .service
        .delete_role_idempotent(&editor, superadmin.id.unwrap())
        .await
        .unwrap_err();
    assert!(matches!(err, RoleError::AuthorizationDenied(_)));
    assert!(fixture.service.get_role(superadmin.id.unwrap()).await.is_some());
}

#[tokio::test]
async fn test_cannot_join_stronger_role() {
    let fixture = TestFixture::new().await;
    fixture
        .seed(
            "",
            "CA Editors",
            TestFixture::editor_rules(
                RuleSet::new()
                    .with_rule("/ca/IssuingCA", Rule::allow_subtree())
                    .with_rule(standard::ca_access(common::ANCHOR), Rule::allow_exact()),
            ),
            &["Editor"],
        )
        .await;
    let editor = token("Editor");
    let superadmin = fixture
        .service
        .get_role_by_name("", "Super Administrator Role")
        .await
        .unwrap();

    let err = fixture
        .service
        .add_member(&editor, RoleMember::new(superadmin.id.unwrap(), cn("Editor")))
        .await
        .unwrap_err();
    assert!(matches!(err, RoleError::AuthorizationDenied(_)));
    assert!(!fixture.service.is_authorized(&editor, "/").await);

    let superadmin_member = fixture.service.get_role_members(superadmin.id.unwrap()).await;
    let err = fixture
        .service
        .remove_member(&editor, superadmin.id.unwrap(), superadmin_member[0].id)
        .await
        .unwrap_err();
    assert!(matches!(err, RoleError::AuthorizationDenied(_)));
}

#[tokio::test]
async fn test_member_trust_anchor_must_be_accessible() {
    let fixture = TestFixture::new().await;
    fixture
        .seed(
            "",
            "CA Editors",
            TestFixture::editor_rules(
                RuleSet::new()
                    .with_rule("/ca/IssuingCA", Rule::allow_subtree())
                    .with_rule(standard::ca_access(common::ANCHOR), Rule::allow_exact()),
            ),
            &["Editor"],
        )
        .await;
    let editor = token("Editor");
    let operators = fixture
        .service
        .persist_role(&editor, Role::new("", "Operators").with_rule("/ca/IssuingCA", Rule::allow_exact()))
        .await
        .unwrap();
    let role_id = operators.id.unwrap();

    fixture
        .service
        .add_member(&editor, RoleMember::new(role_id, cn("Operator")))
        .await
        .unwrap();

    let foreign = MatchCriteria::new("PartnerCA", MatchKey::CommonName, MatchOperator::Equals, "Operator");
    let err = fixture
        .service
        .add_member(&editor, RoleMember::new(role_id, foreign))
        .await
        .unwrap_err();
    assert!(matches!(err, RoleError::AuthorizationDenied(_)));

    // command line members carry no CA trust anchor to check
    let cli = MatchCriteria::new("local", MatchKey::Username, MatchOperator::Equals, "operator");
    fixture
        .service
        .add_member(&editor, RoleMember::new(role_id, cli))
        .await
        .unwrap();
}

#[tokio::test]
async fn test_role_edit_resource_required() {
    let fixture = TestFixture::new().await;
    // full reach over CAs, but not over role management
    fixture
        .seed(
            "",
            "CA Owners",
            RuleSet::new().with_rule("/ca", Rule::allow_subtree()),
            &["Owner"],
        )
        .await;
    let owner = token("Owner");

    let role = Role::new("", "Operators").with_rule("/ca/IssuingCA", Rule::allow_exact());
    assert!(fixture.service.is_authorized_to_edit_role(&owner, &role).await);
    let err = fixture.service.persist_role(&owner, role).await.unwrap_err();
    match err {
        RoleError::AuthorizationDenied(reason) => {
            assert!(reason.contains(standard::ROLE_EDIT), "{reason}")
        }
        other => panic!("expected AuthorizationDenied, got {other:?}"),
    }
    assert!(fixture.service.get_role_by_name("", "Operators").await.is_none());
}

#[tokio::test]
async fn test_authorized_roles_without_view_resource() {
    let fixture = TestFixture::new().await;
    fixture
        .seed(
            "",
            "CA Ops",
            RuleSet::new().with_rule("/ca", Rule::allow_subtree()),
            &["Ops"],
        )
        .await;
    fixture
        .seed("", "Sub Ops", RuleSet::new().with_rule("/ca/A", Rule::allow_exact()), &[])
        .await;
    let ops = token("Ops");

    let visible = fixture.service.get_authorized_roles(&ops).await;
    assert_eq!(names(&visible), vec!["CA Ops", "Sub Ops"]);

    let own = fixture
        .service
        .get_role_by_name("", "CA Ops")
        .await
        .unwrap();
    assert!(fixture.service.is_authorized_to_edit_role(&ops, &own).await);
}

#[tokio::test]
async fn test_authorized_roles_include_own_and_weaker() {
    let fixture = TestFixture::new().await;
    fixture
        .seed(
            "",
            "CA Editors",
            TestFixture::editor_rules(RuleSet::new().with_rule("/ca/IssuingCA", Rule::allow_subtree())),
            &["Editor"],
        )
        .await;
    fixture
        .seed(
            "",
            "Operators",
            RuleSet::new()
                .with_rule("/ca/IssuingCA/profiles", Rule::allow_subtree())
                .with_rule("/ca/RootCA", Rule::deny_subtree()),
            &[],
        )
        .await;
    fixture
        .seed("", "Root Operators", RuleSet::new().with_rule("/ca/RootCA", Rule::allow_exact()), &[])
        .await;

    let visible = fixture.service.get_authorized_roles(&token("Editor")).await;
    assert_eq!(names(&visible), vec!["CA Editors", "Operators"]);

    let all = fixture.service.get_authorized_roles(&fixture.admin).await;
    assert_eq!(all.len(), 4);
}
