//! Engine Integration Tests
//!
//! End-to-end behaviour of a workspace session against an in-memory host.

use std::collections::HashMap;
use std::sync::Arc;

use sources_plus::cascade::{group_counts, is_effectively_enabled, GroupCounts};
use sources_plus::domain::{ChildRef, LeafKey, TitleKeyResolver, WorkspaceKey};
use sources_plus::mutation::{EnablementOperations, HierarchyOperations};
use sources_plus::repository::{init_db, MemoryStateRepository, SqliteStateRepository};
use sources_plus::session::WorkspaceSession;
use sources_plus::store::TreeStore;
use sources_plus::sync::{HostSurface, MemoryHost};

fn key(title: &str) -> LeafKey {
    TitleKeyResolver::base_key(title)
}

fn host_with(titles: &[&str]) -> MemoryHost {
    let mut host = MemoryHost::new();
    host.set_sources(titles.iter().map(|t| (t.to_string(), true)).collect());
    host
}

async fn session_with(titles: &[&str]) -> (WorkspaceSession, MemoryHost) {
    let repo = Arc::new(MemoryStateRepository::new());
    let mut session = WorkspaceSession::open(repo, WorkspaceKey::new("nb")).await;
    let mut host = host_with(titles);
    host.bind(session.gate());
    session.rescan(&mut host);
    (session, host)
}

/// Count how many containers hold each leaf key
fn placements(store: &TreeStore) -> HashMap<LeafKey, usize> {
    let mut seen: HashMap<LeafKey, usize> = HashMap::new();
    for key in store.ungrouped() {
        *seen.entry(key.clone()).or_default() += 1;
    }
    for group in store.groups() {
        for child in &group.children {
            if let ChildRef::Leaf { key } = child {
                *seen.entry(key.clone()).or_default() += 1;
            }
        }
    }
    seen
}

fn assert_exclusive(session: &WorkspaceSession, observed: &[&str]) {
    session.store().check_invariants().unwrap();
    let seen = placements(session.store());
    for title in observed {
        assert_eq!(seen.get(&key(title)), Some(&1), "{} placed exactly once", title);
    }
}

#[tokio::test]
async fn test_containment_exclusivity() {
    let titles = ["a", "b", "c", "d"];
    let (mut session, mut host) = session_with(&titles).await;
    assert_exclusive(&session, &titles);

    let g1 = session.create_group(None, Some("G1")).unwrap();
    let g2 = session.create_group(Some(&g1), Some("G2")).unwrap();
    let g3 = session.create_group(None, Some("G3")).unwrap();
    assert_exclusive(&session, &titles);

    session.move_node(&ChildRef::leaf(key("a")), &g2, &mut host);
    session.move_node(&ChildRef::leaf(key("b")), &g1, &mut host);
    session.move_node(&ChildRef::leaf(key("c")), &g3, &mut host);
    session.move_node(&ChildRef::leaf(key("a")), &g3, &mut host);
    assert_exclusive(&session, &titles);

    session.move_node(&ChildRef::group(g2.clone()), &g3, &mut host);
    session.delete_group(&g1, &mut host);
    assert_exclusive(&session, &titles);

    // "d" disappears from the host but keeps its place
    host.set_sources(vec![("a".into(), true), ("b".into(), true), ("c".into(), true)]);
    session.rescan(&mut host);
    assert_exclusive(&session, &titles);

    session.delete_group(&g3, &mut host);
    assert_exclusive(&session, &titles);
    assert!(session.store().top_level().contains(&g2));
}

#[test]
fn test_cascade_correctness() {
    let mut store = TreeStore::new();
    let leaf = LeafKey::new("l");
    store.upsert_leaf(leaf.clone(), "L", true);
    let g1 = store.create_group(None, Some("G1")).unwrap();
    let g2 = store.create_group(Some(&g1), Some("G2")).unwrap();
    store.reparent(&ChildRef::leaf(leaf.clone()), &g2).unwrap();
    assert!(is_effectively_enabled(&store, &leaf));

    store.set_leaf_enabled(&leaf, false).unwrap();
    assert!(!is_effectively_enabled(&store, &leaf));
    store.set_leaf_enabled(&leaf, true).unwrap();
    assert!(is_effectively_enabled(&store, &leaf));

    for group in [&g1, &g2] {
        store.set_group_enabled(group, false).unwrap();
        assert!(!is_effectively_enabled(&store, &leaf));
        store.set_group_enabled(group, true).unwrap();
        assert!(is_effectively_enabled(&store, &leaf));
    }
}

#[tokio::test]
async fn test_cycle_rejection_leaves_tree_unchanged() {
    let (mut session, mut host) = session_with(&["a"]).await;
    let g1 = session.create_group(None, Some("G1")).unwrap();
    let g2 = session.create_group(Some(&g1), Some("G2")).unwrap();
    session.move_node(&ChildRef::leaf(key("a")), &g2, &mut host);

    let before = session.snapshot();
    assert!(!session.move_node(&ChildRef::group(g1.clone()), &g2, &mut host));
    assert!(!session.move_node(&ChildRef::group(g1.clone()), &g1, &mut host));
    assert_eq!(session.snapshot(), before);
    session.store().check_invariants().unwrap();
}

#[tokio::test]
async fn test_isolate_counts() {
    let titles = ["a1", "a2", "b1", "b2", "c1", "c2"];
    let (mut session, mut host) = session_with(&titles).await;

    let mut groups = Vec::new();
    for (name, members) in [("A", ["a1", "a2"]), ("B", ["b1", "b2"]), ("C", ["c1", "c2"])] {
        let gid = session.create_group(None, Some(name)).unwrap();
        for title in members {
            session.move_node(&ChildRef::leaf(key(title)), &gid, &mut host);
        }
        groups.push(gid);
    }

    assert!(session.isolate_group(&groups[1], &mut host));
    let store = session.store();
    assert_eq!(group_counts(store, &groups[1]), GroupCounts { enabled: 2, total: 2 });
    assert_eq!(group_counts(store, &groups[0]), GroupCounts { enabled: 0, total: 2 });
    assert_eq!(group_counts(store, &groups[2]), GroupCounts { enabled: 0, total: 2 });

    let pushes = host.take_pushes();
    assert_eq!(pushes.len(), 4);
    assert!(pushes.iter().all(|(_, enabled)| !enabled));
}

#[tokio::test]
async fn test_diff_only_push() {
    let (mut session, mut host) = session_with(&["inside", "beside"]).await;
    let outer = session.create_group(None, Some("Outer")).unwrap();
    let inner = session.create_group(Some(&outer), Some("Inner")).unwrap();
    let other = session.create_group(None, Some("Other")).unwrap();
    session.move_node(&ChildRef::leaf(key("inside")), &inner, &mut host);
    session.move_node(&ChildRef::leaf(key("beside")), &other, &mut host);

    session.toggle_group(&outer, false, &mut host);
    assert_eq!(host.take_pushes(), vec![(key("inside"), false)]);

    session.toggle_group(&inner, false, &mut host);
    session.toggle_group(&inner, true, &mut host);
    assert!(host.take_pushes().is_empty(), "inside stayed gated by Outer");

    // a group whose leaves are ungated pushes both ways
    session.toggle_group(&other, false, &mut host);
    session.toggle_group(&other, true, &mut host);
    assert_eq!(
        host.take_pushes(),
        vec![(key("beside"), false), (key("beside"), true)]
    );
}

#[tokio::test]
async fn test_round_trip_through_sqlite() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("state.db");
    let titles = ["a", "b", "c"];

    let before = {
        let db = init_db(&db_path).await.unwrap();
        let repo = Arc::new(SqliteStateRepository::new(db.connection()));
        let mut session = WorkspaceSession::open(repo, WorkspaceKey::new("nb")).await;
        let mut host = host_with(&titles);
        session.rescan(&mut host);

        let g = session.create_group(None, Some("Reading")).unwrap();
        let sub = session.create_group(Some(&g), None).unwrap();
        session.move_node(&ChildRef::leaf(key("a")), &sub, &mut host);
        session.move_node(&ChildRef::leaf(key("b")), &g, &mut host);
        session.toggle_leaf(&key("a"), false, &mut host);
        session.toggle_group(&g, false, &mut host);
        session.toggle_leaf(&key("b"), false, &mut host);
        session.toggle_collapsed(&sub);
        assert!(session.flush().await);
        session.snapshot()
    };

    let db = init_db(&db_path).await.unwrap();
    let repo = Arc::new(SqliteStateRepository::new(db.connection()));
    let mut session = WorkspaceSession::open(repo, WorkspaceKey::new("nb")).await;
    assert_eq!(session.snapshot(), before);

    let mut host = host_with(&titles);
    session.rescan(&mut host);
    for title in titles {
        let flag = session.store().leaf(&key(title)).unwrap().enabled;
        assert_eq!(flag, before.enabled_by_leaf_key[&key(title)], "{} flag", title);
    }
    session.store().check_invariants().unwrap();
}

#[tokio::test]
async fn test_push_echo_is_not_a_mutation() {
    let (mut session, mut host) = session_with(&["a", "b"]).await;
    let g = session.create_group(None, Some("G")).unwrap();
    session.move_node(&ChildRef::leaf(key("a")), &g, &mut host);
    session.move_node(&ChildRef::leaf(key("b")), &g, &mut host);

    assert!(session.toggle_group(&g, false, &mut host));
    assert_eq!(host.take_pushes().len(), 2);

    // the host fired change events for both pushes; none were queued
    assert_eq!(session.ingest_changes(), 0);
    assert!(session.store().leaf(&key("a")).unwrap().enabled);
    assert!(session.store().leaf(&key("b")).unwrap().enabled);
    assert!(!session.synchronizer().guard().is_held());

    // a real user click afterwards still gets through
    assert!(host.user_toggle(&key("a"), true));
    assert!(host.user_toggle(&key("b"), false));
    assert_eq!(session.ingest_changes(), 1);
    assert!(!session.store().leaf(&key("b")).unwrap().enabled);
}
