//! Young Pass Tests
//!
//! A young pass promotes every reachable young object into the mature space,
//! treats remembered mature objects as extra roots, rewrites every slot that
//! named a young address and leaves the young space empty.

mod common;

use common::{assert_alive, assert_deleted, VmFixture, TEST_YOUNG_SIZE};
use vmgc::object::{ObjectRef, ObjectType, Zone};
use vmgc::{GcError, GcGeneration};

#[test]
fn test_young_space_is_empty_after_pass() {
    let fixture = VmFixture::new();
    let kept = fixture.tuple(vec![fixture.leaf()]);
    let root = fixture.root(kept);
    for _ in 0..10 {
        fixture.leaf();
    }

    let report = fixture.young();
    assert_eq!(report.generation, GcGeneration::Young);
    assert_eq!(report.promoted, 2);
    assert_eq!(report.deleted, 10);

    let memory = fixture.state.memory();
    assert!(memory.objects_in(Zone::Young).is_empty());
    assert_eq!(memory.stats().young_used, 0);

    let moved = fixture.root_value(root);
    let child = fixture.slot(moved, 0);
    assert_eq!(fixture.zone(moved), Some(Zone::Mature));
    assert_eq!(fixture.zone(child), Some(Zone::Mature));
}

#[test]
fn test_shared_child_promoted_once() {
    let fixture = VmFixture::new();
    let shared = fixture.leaf();
    let left = fixture.tuple(vec![shared]);
    let right = fixture.tuple(vec![shared]);
    let left_root = fixture.root(left);
    let right_root = fixture.root(right);

    let report = fixture.young();
    assert_eq!(report.promoted, 3);

    let left = fixture.root_value(left_root);
    let right = fixture.root_value(right_root);
    assert_eq!(fixture.slot(left, 0), fixture.slot(right, 0));
}

#[test]
fn test_remembered_mature_object_keeps_young_child() {
    let fixture = VmFixture::new();
    let holder = fixture.alloc_mature(ObjectType::Tuple, vec![ObjectRef::NIL]);
    let child = fixture.leaf();
    fixture.set_slot(holder, 0, child);
    assert!(fixture.state.memory().is_remembered(holder));

    // The holder is not rooted: in a young pass every mature object is live
    let report = fixture.young();
    assert_eq!(report.promoted, 1);
    assert_eq!(report.deleted, 0);

    let moved = fixture.slot(holder, 0);
    assert_ne!(moved, child);
    assert_alive(&fixture, moved, "young child of remembered object");
    assert!(!fixture.state.memory().is_remembered(holder));

    let report = fixture.full();
    assert_eq!(report.deleted, 2);
    assert_deleted(&fixture, holder, "unrooted mature holder");
    assert_deleted(&fixture, moved, "promoted child");
}

#[test]
fn test_mature_to_mature_store_is_not_remembered() {
    let fixture = VmFixture::new();
    let holder = fixture.alloc_mature(ObjectType::Tuple, vec![ObjectRef::NIL]);
    let other = fixture.alloc_mature(ObjectType::Object, vec![]);
    fixture.set_slot(holder, 0, other);
    assert!(!fixture.state.memory().is_remembered(holder));

    let young = fixture.tuple(vec![ObjectRef::NIL]);
    fixture.set_slot(young, 0, other);
    assert!(!fixture.state.memory().is_remembered(young));
}

#[test]
fn test_young_pass_never_deletes_mature_objects() {
    let fixture = VmFixture::new();
    let orphan = fixture.alloc_mature(ObjectType::Object, vec![]);

    let report = fixture.young();
    assert_eq!(report.deleted, 0);
    assert_alive(&fixture, orphan, "unreachable mature object");

    let report = fixture.full();
    assert_eq!(report.deleted, 1);
}

#[test]
fn test_young_space_is_reused_across_passes() {
    let fixture = VmFixture::new();
    let chunk = 4096;
    let per_round = TEST_YOUNG_SIZE / chunk / 2;

    for _ in 0..8 {
        for _ in 0..per_round {
            fixture
                .state
                .memory()
                .allocate_bytes(vec![0u8; chunk])
                .unwrap();
        }
        fixture.young();
    }
    assert_eq!(fixture.object_count(), 0);
}

#[test]
fn test_young_space_exhaustion_is_reported() {
    let fixture = VmFixture::new();
    let memory = fixture.state.memory();

    let mut result = Ok(ObjectRef::NULL);
    for _ in 0..(TEST_YOUNG_SIZE / 1024 + 1) {
        result = memory.allocate_bytes(vec![0u8; 1024]);
        if result.is_err() {
            break;
        }
    }
    assert!(matches!(result, Err(GcError::OutOfMemory { .. })));

    fixture.young();
    assert!(memory.allocate_bytes(vec![0u8; 1024]).is_ok());
}

#[test]
fn test_global_cache_follows_promoted_objects() {
    let fixture = VmFixture::new();
    let klass = fixture.alloc(ObjectType::Module, vec![ObjectRef::NIL]);
    let method = fixture.leaf();
    let module = fixture.alloc_mature(ObjectType::Module, vec![ObjectRef::NIL]);
    let klass_root = fixture.root(klass);
    let method_root = fixture.root(method);
    fixture.root(module);

    let cache = fixture.state.global_cache();
    cache.insert(klass, 7, module, method);

    fixture.young();
    let klass = fixture.root_value(klass_root);
    let method = fixture.root_value(method_root);
    let entry = cache.lookup(klass, 7).expect("entry rekeyed to promoted class");
    assert_eq!(entry.module, module);
    assert_eq!(entry.method, method);
}

#[test]
fn test_global_cache_drops_dead_entries() {
    let fixture = VmFixture::new();
    let klass = fixture.alloc_mature(ObjectType::Module, vec![ObjectRef::NIL]);
    fixture.root(klass);
    let young_method = fixture.leaf();
    let old_method = fixture.alloc_mature(ObjectType::Object, vec![]);

    let cache = fixture.state.global_cache();
    cache.insert(klass, 1, klass, young_method);
    cache.insert(klass, 2, klass, old_method);
    cache.insert(klass, 3, klass, ObjectRef::NIL);

    fixture.young();
    assert!(cache.lookup(klass, 1).is_none(), "unpromoted method dropped");
    assert!(cache.lookup(klass, 2).is_some(), "mature method untouched");
    assert_eq!(cache.len(), 2);

    fixture.full();
    assert!(cache.lookup(klass, 2).is_none(), "dead mature method dropped");
    assert_eq!(cache.len(), 1);
}

#[test]
fn test_stats_count_young_and_full_cycles() {
    let fixture = VmFixture::new();
    fixture.root(fixture.leaf());

    fixture.young();
    fixture.young();
    fixture.full();

    let summary = fixture.state.stats().summary();
    assert_eq!(summary.young_cycles, 2);
    assert_eq!(summary.full_cycles, 1);
    assert_eq!(summary.total_cycles, 3);
    assert_eq!(summary.objects_promoted, 1);
}
