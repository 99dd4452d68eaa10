//! GC Correctness Tests - Reachability Soundness and Completeness
//!
//! Every object reachable from a root category survives a pass, everything
//! else is deleted, and removing the only path to a subgraph releases the
//! whole subgraph.

mod common;

use common::{assert_alive, assert_deleted, VmFixture};
use vmgc::object::{ObjectRef, ObjectType, Zone};
use vmgc::GcGeneration;

/// ============================================================================
/// FULL PASS
/// ============================================================================

#[test]
fn test_root_chain_survives_and_cascades() {
    let fixture = VmFixture::new();
    let b = fixture.leaf();
    let a = fixture.tuple(vec![b]);
    let r = fixture.tuple(vec![a]);
    fixture.root(r);

    let report = fixture.full();
    assert_eq!(report.generation, GcGeneration::Full);
    assert_eq!(report.deleted, 0);
    assert_alive(&fixture, r, "root");
    assert_alive(&fixture, a, "child of root");
    assert_alive(&fixture, b, "grandchild of root");

    fixture.set_slot(r, 0, ObjectRef::NIL);
    let report = fixture.full();
    assert_eq!(report.deleted, 2);
    assert_alive(&fixture, r, "root after unlink");
    assert_deleted(&fixture, a, "unlinked child");
    assert_deleted(&fixture, b, "grandchild of unlinked child");
}

#[test]
fn test_isolated_component_is_deleted() {
    let fixture = VmFixture::new();
    let live = fixture.tuple(vec![ObjectRef::fixnum(1)]);
    fixture.root(live);

    let island_leaf = fixture.leaf();
    let island = fixture.tuple(vec![island_leaf, ObjectRef::NIL]);
    fixture.set_slot(island, 1, island);

    let report = fixture.full();
    assert_eq!(report.deleted, 2);
    assert_alive(&fixture, live, "rooted object");
    assert_deleted(&fixture, island, "self-referencing island");
    assert_deleted(&fixture, island_leaf, "island member");
}

#[test]
fn test_cycle_reachable_from_root_survives() {
    let fixture = VmFixture::new();
    let x = fixture.tuple(vec![ObjectRef::NIL]);
    let y = fixture.tuple(vec![x]);
    fixture.set_slot(x, 0, y);
    fixture.root(x);

    fixture.full();
    assert_alive(&fixture, x, "cycle head");
    assert_alive(&fixture, y, "cycle tail");
    assert_eq!(fixture.slot(y, 0), x);
}

#[test]
fn test_byte_array_payload_is_not_traced() {
    let fixture = VmFixture::new();
    let bytes = fixture
        .state
        .memory()
        .allocate_bytes(vec![0u8; 64])
        .unwrap();
    let holder = fixture.tuple(vec![bytes]);
    fixture.root(holder);

    let report = fixture.full();
    assert_eq!(report.deleted, 0);
    assert_eq!(report.scanned, 2);
    assert_alive(&fixture, bytes, "byte array");
}

#[test]
fn test_data_objects_release_native_resources() {
    let fixture = VmFixture::new();
    let kept = fixture.alloc(ObjectType::Data, vec![]);
    fixture.root(kept);
    fixture.alloc(ObjectType::Data, vec![]);
    fixture.alloc(ObjectType::Data, vec![]);

    fixture.full();
    assert_eq!(fixture.state.memory().cleanups(), 2);
    assert_alive(&fixture, kept, "rooted data object");
}

#[test]
fn test_marks_are_cleared_between_passes() {
    let fixture = VmFixture::new();
    let obj = fixture.leaf();
    let id = fixture.root(obj);

    fixture.full();
    assert!(!fixture.state.memory().is_marked(obj));

    fixture.state.roots().remove(id).unwrap();
    let report = fixture.full();
    assert_eq!(report.deleted, 1);
    assert_deleted(&fixture, obj, "unrooted after first pass");
}

/// ============================================================================
/// ROOT CATEGORIES
/// ============================================================================

#[test]
fn test_strong_handle_keeps_object_alive() {
    let fixture = VmFixture::new();
    let obj = fixture.leaf();
    let handle = fixture.state.handles().allocate(obj);

    fixture.full();
    assert_alive(&fixture, obj, "strongly handled object");
    assert_eq!(handle.get().unwrap(), obj);
}

#[test]
fn test_global_handle_location_is_a_root() {
    let fixture = VmFixture::new();
    let obj = fixture.leaf();
    let slot = std::sync::Arc::new(parking_lot::Mutex::new(obj));
    let global = fixture
        .state
        .global_handles()
        .register(slot.clone(), Some("rb_mKernel"));

    fixture.young();
    let moved = *slot.lock();
    assert_ne!(moved, obj, "global location must be rewritten");
    assert_eq!(fixture.zone(moved), Some(Zone::Mature));

    fixture.state.global_handles().unregister(&global);
    let report = fixture.full();
    assert_eq!(report.deleted, 1);
    assert_deleted(&fixture, moved, "object of released global handle");
}

#[test]
fn test_thread_roots_survive() {
    let fixture = VmFixture::new();
    let thread_object = fixture.leaf();
    let exception = fixture.leaf();
    let thread = fixture.thread("main");
    {
        let mut state = thread.state();
        state.thread_object = thread_object;
        state.current_exception = exception;
    }

    fixture.full();
    assert_alive(&fixture, thread_object, "thread object");
    assert_alive(&fixture, exception, "pending exception");

    thread.state().current_exception = ObjectRef::NIL;
    fixture.full();
    assert_deleted(&fixture, exception, "cleared exception");
}

/// ============================================================================
/// REPORTS
/// ============================================================================

#[test]
fn test_report_counts_and_stats() {
    let fixture = VmFixture::new();
    let leaf = fixture.leaf();
    fixture.root(fixture.tuple(vec![leaf]));
    fixture.leaf();

    let report = fixture.full();
    assert_eq!(report.cycle, 1);
    assert_eq!(report.marked, 2);
    assert_eq!(report.scanned, 2);
    assert_eq!(report.deleted, 1);

    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["generation"], "Full");
    assert_eq!(json["deleted"], 1);

    let summary = fixture.state.stats().summary();
    assert_eq!(summary.full_cycles, 1);
    assert_eq!(summary.objects_deleted, 1);
}

#[test]
fn test_logger_records_pass_events() {
    let fixture = VmFixture::new();
    fixture.root(fixture.leaf());
    fixture.full();

    let events = fixture.state.logger().events();
    let kinds: Vec<String> = events
        .iter()
        .map(|event| serde_json::to_value(event).unwrap()["type"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(kinds.first().map(String::as_str), Some("cycle_start"));
    assert_eq!(kinds.last().map(String::as_str), Some("cycle_end"));
    assert!(kinds.iter().any(|kind| kind == "sweep_stats"));
    assert!(kinds.iter().any(|kind| kind == "phase_end"));
}

#[test]
fn test_logger_retains_bounded_history() {
    let fixture = VmFixture::with_config(vmgc::GcConfig {
        max_log_events: 32,
        ..common::test_config()
    });
    fixture.root(fixture.leaf());

    for _ in 0..200 {
        fixture.full();
    }
    assert_eq!(fixture.state.logger().event_count(), 32);
    assert_eq!(fixture.state.stats().summary().full_cycles, 200);
}
