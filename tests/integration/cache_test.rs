//! Integration tests for cached tree loading.

mod helpers;

use chrono::{Duration, TimeZone, Utc};

use foldview_core::traits::CacheProvider;
use foldview_service::{CacheEntry, TreeRequest};

use helpers::{TestTree, broken_cache, ctx, folder, ids, memory_cache};

fn app() -> TestTree {
    TestTree::new(vec![folder(1, 0, "A"), folder(2, 1, "B"), folder(3, 0, "C")])
}

fn visible_ctx() -> foldview_entity::permission::PermissionContext {
    let mut ctx = ctx();
    ctx.visible_groups.extend([1, 2, 3]);
    ctx
}

#[tokio::test]
async fn test_second_load_is_served_from_cache() {
    let app = app();
    let ctx = visible_ctx();
    let request = TreeRequest::full("s1");

    let first = app.service.load_tree(&request, &ctx).await.unwrap();
    assert!(!first.from_cache);

    let second = app.service.load_tree(&request, &ctx).await.unwrap();
    assert!(second.from_cache);
    assert_eq!(second.nodes, first.nodes);
    assert_eq!(second.built_at, first.built_at);
}

#[tokio::test]
async fn test_cached_tree_ignores_new_permissions_until_refresh() {
    let app = app();
    let request = TreeRequest::full("s1");
    app.service.load_tree(&request, &visible_ctx()).await.unwrap();

    // A different context is not consulted while the cached tree is fresh.
    let narrower = ctx();
    let cached = app.service.load_tree(&request, &narrower).await.unwrap();
    assert!(cached.from_cache);
    assert_eq!(ids(&cached.nodes), vec![1, 2, 3]);

    let forced = TreeRequest {
        force_refresh: true,
        ..request
    };
    let rebuilt = app.service.load_tree(&forced, &narrower).await.unwrap();
    assert!(!rebuilt.from_cache);
    assert_eq!(rebuilt.nodes.len(), 3);
    assert!(rebuilt.nodes.iter().all(|n| n.label.is_blocked));
}

#[tokio::test]
async fn test_structure_change_after_build_triggers_rebuild() {
    let app = app();
    let ctx = visible_ctx();
    let request = TreeRequest::full("s1");

    let first = app.service.load_tree(&request, &ctx).await.unwrap();
    app.clock
        .record_change(first.built_at + Duration::seconds(1))
        .await;

    let second = app.service.load_tree(&request, &ctx).await.unwrap();
    assert!(!second.from_cache);
    assert!(second.built_at >= first.built_at);
}

#[tokio::test]
async fn test_stale_caller_refresh_triggers_rebuild() {
    let app = app();
    let ctx = visible_ctx();
    let changed = Utc.with_ymd_and_hms(2024, 3, 1, 10, 0, 0).unwrap();
    app.clock.record_change(changed).await;

    let request = TreeRequest::full("s1");
    app.service.load_tree(&request, &ctx).await.unwrap();

    // The entry was built after the change, but this caller refreshed before it.
    let stale = TreeRequest {
        last_refresh: Some(changed - Duration::hours(1)),
        ..request.clone()
    };
    assert!(!app.service.load_tree(&stale, &ctx).await.unwrap().from_cache);

    let fresh = TreeRequest {
        last_refresh: Some(changed + Duration::hours(1)),
        ..request
    };
    assert!(app.service.load_tree(&fresh, &ctx).await.unwrap().from_cache);
}

#[tokio::test]
async fn test_modes_are_cached_separately() {
    let app = app();
    let ctx = visible_ctx();

    let full = app
        .service
        .load_tree(&TreeRequest::full("s1"), &ctx)
        .await
        .unwrap();
    let children = app
        .service
        .load_tree(&TreeRequest::children("s1", 1), &ctx)
        .await
        .unwrap();

    assert!(!children.from_cache);
    assert_eq!(ids(&full.nodes), vec![1, 2, 3]);
    assert_eq!(ids(&children.nodes), vec![2]);
}

#[tokio::test]
async fn test_invalidate_session_drops_only_that_session() {
    let app = app();
    let ctx = visible_ctx();
    for request in [
        TreeRequest::full("s1"),
        TreeRequest::children("s1", 0),
        TreeRequest::full("s2"),
    ] {
        app.service.load_tree(&request, &ctx).await.unwrap();
    }

    let removed = app.service.invalidate_session("s1").await.unwrap();
    assert_eq!(removed, 2);

    let s1 = app
        .service
        .load_tree(&TreeRequest::full("s1"), &ctx)
        .await
        .unwrap();
    let s2 = app
        .service
        .load_tree(&TreeRequest::full("s2"), &ctx)
        .await
        .unwrap();
    assert!(!s1.from_cache);
    assert!(s2.from_cache);
}

#[tokio::test]
async fn test_corrupted_entry_is_rebuilt_and_replaced() {
    let cache = memory_cache();
    let app = TestTree::with_cache(vec![folder(1, 0, "A")], cache.clone());
    let ctx = visible_ctx();
    cache
        .put("s1", "full", "not json", std::time::Duration::from_secs(60))
        .await
        .unwrap();

    let first = app
        .service
        .load_tree(&TreeRequest::full("s1"), &ctx)
        .await
        .unwrap();
    assert!(!first.from_cache);

    let stored: Option<CacheEntry> = cache.get_json("s1", "full").await.unwrap();
    assert_eq!(stored.map(|e| e.nodes), Some(first.nodes));
}

#[tokio::test]
async fn test_unavailable_cache_still_builds() {
    let app = TestTree::with_cache(vec![folder(1, 0, "A")], broken_cache());
    let ctx = visible_ctx();
    let request = TreeRequest::full("s1");

    let first = app.service.load_tree(&request, &ctx).await.unwrap();
    let second = app.service.load_tree(&request, &ctx).await.unwrap();
    assert!(!first.from_cache);
    assert!(!second.from_cache);
    assert_eq!(ids(&second.nodes), vec![1]);

    let err = app.service.invalidate_session("s1").await.unwrap_err();
    assert!(err.is_cache());
}
