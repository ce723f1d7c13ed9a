//! Integration tests for tree building over the in-memory store.

mod helpers;

use std::collections::{HashMap, HashSet};

use foldview_auth::acl::NodeClassifier;
use foldview_core::config::tree::TreeConfig;
use foldview_core::{NodeId, TreeNode};
use foldview_entity::classification::Category;
use foldview_entity::output::{FolderClass, NodeHint, ParentRef};
use foldview_entity::permission::PermissionContext;
use foldview_service::verify_parent_refs;
use foldview_store::{MemoryItemStore, TreeSnapshot};

use helpers::{Lcg, TestTree, ctx, folder, ids, random_context, random_tree};

#[tokio::test]
async fn test_forbidden_leaf_under_show_only_yields_empty_tree() {
    let app = TestTree::new(vec![folder(1, 0, "A"), folder(2, 1, "B")]);
    let mut ctx = ctx();
    ctx.show_only_accessible_folders = true;
    ctx.forbidden_folders.insert(2);

    let out = app.service.build_full_tree(&ctx).await.unwrap();
    assert!(out.is_empty());
}

#[tokio::test]
async fn test_permitted_folder_under_hidden_parent_attaches_to_root() {
    let app = TestTree::new(vec![folder(1, 0, "A"), folder(2, 1, "B")]);
    let mut ctx = ctx();
    ctx.show_only_accessible_folders = true;
    ctx.limited_folders.insert(2, HashSet::from([500]));

    let out = app.service.build_full_tree(&ctx).await.unwrap();
    assert_eq!(ids(&out), vec![2]);
    assert_eq!(out[0].parent, ParentRef::Root);
}

#[tokio::test]
async fn test_permitted_folder_under_excluded_parent_attaches_to_root() {
    let app = TestTree::new(vec![folder(1, 0, "A"), folder(2, 1, "B")]);
    let mut ctx = ctx();
    ctx.show_only_accessible_folders = true;
    ctx.forbidden_folders.insert(1);
    ctx.visible_groups.insert(2);

    let out = app.service.build_full_tree(&ctx).await.unwrap();
    assert_eq!(ids(&out), vec![2]);
    assert_eq!(out[0].parent, ParentRef::Root);
    assert_eq!(out[0].category, Category::Visible);
}

#[tokio::test]
async fn test_personal_root_folder_shows_login() {
    let mut personal = folder(7, 0, "42");
    personal.personal_folder = true;
    let app = TestTree::new(vec![personal]);
    let mut ctx = ctx();
    ctx.visible_groups.insert(7);
    ctx.personal_folders.insert(7);

    let out = app.service.build_full_tree(&ctx).await.unwrap();
    assert_eq!(out.len(), 1);
    assert_eq!(out[0].label.title, "alice");
    assert!(out[0].label.is_personal);
    assert!(out[0].in_personal_folders);
}

#[tokio::test]
async fn test_read_only_folder_in_visible_groups() {
    let app = TestTree::with_items(vec![folder(3, 0, "Audit")], HashMap::from([(3, 11)]));
    let mut ctx = ctx();
    ctx.visible_groups.insert(3);
    ctx.read_only_folders.insert(3);

    let out = app.service.build_full_tree(&ctx).await.unwrap();
    assert_eq!(out[0].category, Category::ReadOnly);
    assert_eq!(out[0].label.badge_count, Some(11));
    assert_eq!(out[0].folder_class, FolderClass::FolderNotDroppable);
    assert_eq!(out[0].hint, Some(NodeHint::ReadOnlyAccount));
    assert!(out[0].label.eye_badge);
}

#[tokio::test]
async fn test_other_users_personal_folders_never_leak() {
    let mut foreign = folder(9, 0, "17");
    foreign.personal_folder = true;
    let mut foreign_child = folder(10, 9, "Secrets");
    foreign_child.personal_folder = true;
    let app = TestTree::new(vec![foreign, foreign_child, folder(11, 0, "Shared")]);

    let mut ctx = ctx();
    ctx.visible_groups.extend([9, 10, 11]);

    let out = app.service.build_full_tree(&ctx).await.unwrap();
    assert_eq!(ids(&out), vec![11]);
}

#[tokio::test]
async fn test_counters_roll_up_accessible_subtree() {
    let app = TestTree::with_items(
        vec![folder(1, 0, "A"), folder(2, 1, "B"), folder(3, 1, "C")],
        HashMap::from([(1, 1), (2, 20), (3, 300)]),
    );
    let mut ctx = ctx();
    ctx.counters_enabled = true;
    ctx.visible_groups.extend([1, 2]);

    let out = app.service.build_full_tree(&ctx).await.unwrap();
    let a = &out[0];
    assert_eq!(a.label.badge_count, Some(1));
    assert_eq!(a.label.descendant_badge_count, Some(21));
    assert_eq!(a.label.descendant_folder_count, Some(2));
}

#[tokio::test]
async fn test_failing_item_store_zeroes_only_the_broken_folder() {
    let items = MemoryItemStore::new(HashMap::from([(1, 1), (2, 20), (3, 300)])).with_failure(2);
    let app = TestTree::with_item_store(
        vec![folder(1, 0, "A"), folder(2, 1, "B"), folder(3, 1, "C")],
        items,
        &TreeConfig::default(),
    );
    let mut ctx = ctx();
    ctx.counters_enabled = true;
    ctx.visible_groups.extend([1, 2, 3]);

    let out = app.service.build_full_tree(&ctx).await.unwrap();
    assert_eq!(ids(&out), vec![1, 2, 3]);
    assert_eq!(out[1].label.badge_count, Some(0));
    assert_eq!(out[2].label.badge_count, Some(300));
    assert_eq!(out[0].label.descendant_badge_count, Some(301));
    assert_eq!(out[0].label.descendant_folder_count, Some(2));

    let children = app.service.build_children(1, &ctx).await.unwrap();
    assert_eq!(ids(&children), vec![2, 3]);
    assert_eq!(children[0].label.badge_count, Some(0));
    assert_eq!(children[0].label.descendant_badge_count, Some(0));
}

#[tokio::test]
async fn test_random_trees_keep_structural_invariants() {
    for seed in 0..24u64 {
        let mut rng = Lcg::new(seed);
        let folders = random_tree(&mut rng, 120);
        let ctx = random_context(&mut rng, 120, seed % 2 == 0);
        let app = TestTree::new(folders.clone());

        let out = app.service.build_full_tree(&ctx).await.unwrap();
        verify_parent_refs(&out, None).unwrap();

        let classifier = NodeClassifier::new(&ctx);
        let by_id: HashMap<NodeId, &TreeNode> = folders.iter().map(|f| (f.id, f)).collect();
        let excluded: HashSet<NodeId> = folders
            .iter()
            .filter(|f| classifier.classify(f, false).category == Category::Excluded)
            .map(|f| f.id)
            .collect();
        let emitted: HashSet<NodeId> = ids(&out).into_iter().collect();

        for node in &out {
            assert!(
                node.category.is_emitted(),
                "seed {seed}: folder {} emitted as {:?}",
                node.id,
                node.category
            );
            if has_excluded_ancestor(node.id, &by_id, &excluded) {
                assert!(
                    node.category.is_override(),
                    "seed {seed}: folder {} leaked from an excluded subtree",
                    node.id
                );
            }
        }

        for f in &folders {
            if classifier.classify(f, false).category.is_override() {
                assert!(
                    emitted.contains(&f.id),
                    "seed {seed}: granted folder {} missing",
                    f.id
                );
            }
        }

        let again = app.service.build_full_tree(&ctx).await.unwrap();
        assert_eq!(out, again, "seed {seed}: build is not deterministic");
    }
}

#[tokio::test]
async fn test_random_children_slices_keep_parent_refs() {
    for seed in 100..108u64 {
        let mut rng = Lcg::new(seed);
        let folders = random_tree(&mut rng, 60);
        let ctx = random_context(&mut rng, 60, seed % 2 == 1);
        let app = TestTree::new(folders.clone());

        for node_id in std::iter::once(0).chain(folders.iter().map(|f| f.id)) {
            let out = app.service.build_children(node_id, &ctx).await.unwrap();
            verify_parent_refs(&out, Some(node_id)).unwrap();
            let expected = ParentRef::from_parent_id(node_id);
            assert!(out.iter().all(|n| n.parent == expected));
            assert!(out.iter().all(|n| n.category.is_emitted()));
        }
    }
}

#[tokio::test]
async fn test_demo_snapshot_renders_expected_tree() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("snapshot.json");
    std::fs::write(&path, include_str!("../../demos/snapshot.json")).unwrap();

    let snapshot = TreeSnapshot::load(&path).await.unwrap();
    let app = TestTree::with_items(snapshot.folders, snapshot.active_items);

    let session: serde_json::Value =
        serde_json::from_str(include_str!("../../demos/session.json")).unwrap();
    let ctx = PermissionContext::from_session(&session, &Default::default());

    let out = app.service.build_full_tree(&ctx).await.unwrap();
    assert_eq!(ids(&out), vec![1, 2, 3, 4, 6, 7, 8]);

    let by_id: HashMap<NodeId, _> = out.iter().map(|n| (n.id, n)).collect();
    assert_eq!(by_id[&1].category, Category::BlockedVisible);
    assert_eq!(by_id[&3].category, Category::ReadOnly);
    assert_eq!(by_id[&3].label.badge_count, Some(12));
    assert_eq!(by_id[&4].label.title, "R&D servers");
    assert_eq!(by_id[&6].parent, ParentRef::Root);
    assert_eq!(by_id[&6].label.badge_count, Some(2));
    assert_eq!(by_id[&7].label.title, "alice");
    assert!(by_id[&7].can_edit);
    assert_eq!(by_id[&8].parent, ParentRef::Node(7));
}

fn has_excluded_ancestor(
    id: NodeId,
    by_id: &HashMap<NodeId, &TreeNode>,
    excluded: &HashSet<NodeId>,
) -> bool {
    let mut current = by_id.get(&id).map(|n| n.parent_id);
    while let Some(parent) = current.filter(|p| *p != 0) {
        if excluded.contains(&parent) {
            return true;
        }
        current = by_id.get(&parent).map(|n| n.parent_id);
    }
    false
}
