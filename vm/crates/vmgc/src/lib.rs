//! # vmgc - Garbage Collection Engine for a Managed-Language VM
//!
//! vmgc is the memory-management core of a bytecode VM: it finds every heap
//! object still reachable from the VM's roots and reclaims the rest, while
//! keeping interpreter frames, native handles, weak references and locked
//! objects consistent with where objects live after the pass.
//!
//! ## Overview
//!
//! - **Shared engine**: [`GarbageCollector`] enumerates roots, walks call
//!   frames and variable scopes, scans root buffers, cleans weak references
//!   and reconciles locked objects
//! - **Pluggable liveness**: a [`Collector`] variant decides what survives
//!   and where it moves ([`MarkSweepCollector`], [`YoungCollector`])
//! - **Generational heap**: bump allocated young and mature spaces, with a
//!   write barrier feeding the remembered set
//! - **Relocation-aware walking**: every frame walker takes an
//!   [`AddressDisplacement`], so saved fiber stacks are walked in place
//!
//! ## Quick Start
//!
//! ```rust
//! use vmgc::{GcConfig, GcGeneration, SharedState};
//! use vmgc::object::{ObjectRef, ObjectType};
//! use vmgc::roots::RootType;
//!
//! fn main() -> vmgc::Result<()> {
//!     let state = SharedState::new(GcConfig::default())?;
//!
//!     let leaf = state.memory().allocate(ObjectType::Object, vec![])?;
//!     let holder = state.memory().allocate(ObjectType::Tuple, vec![leaf])?;
//!     let root = state.roots().add(holder, RootType::Global, Some("$holder"));
//!     state.memory().allocate(ObjectType::Object, vec![])?; // garbage
//!
//!     let report = state.collect(GcGeneration::Young);
//!     assert_eq!(report.promoted, 2);
//!
//!     // The root slot now names the promoted copy
//!     let holder = state.roots().get(root)?;
//!     assert!(state.memory().contains(holder));
//!     assert_ne!(state.memory().slot(holder, 0)?, ObjectRef::NULL);
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │                      SharedState                        │
//! │  Roots  Handles  GlobalHandles  GlobalCache  Threads    │
//! └───────────────────────────┬─────────────────────────────┘
//!                             │ GcData (borrowed per pass)
//!                             ▼
//! ┌─────────────────────────────────────────────────────────┐
//! │                   GarbageCollector                      │
//! │  mark_object ─▶ Collector::saw_object ─▶ mark stack     │
//! │  scan_object ─▶ Collector::scanned_object               │
//! │  weak refs, locked objects, sweep                       │
//! └───────────────────────────┬─────────────────────────────┘
//!                             ▼
//! ┌─────────────────────────────────────────────────────────┐
//! │                        Memory                           │
//! │     young space ──promote──▶ mature space               │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Thread Safety
//!
//! A pass assumes every registered thread is stopped at a safe point. The
//! engine never suspends threads itself; [`SharedState::collect`] only
//! serializes passes against each other.
//!
//! ## Modules
//!
//! - [`gc`]: the engine, collector variants, `GcData`, `AddressDisplacement`
//! - [`memory`]: young and mature spaces, write barrier, promotion
//! - [`object`]: tagged words, headers, per-type slot layouts
//! - [`thread`]: managed threads, call frames, root buffers, fibers
//! - [`capi`]: native handles and global handle locations
//! - [`roots`], [`global_cache`]: VM root slots and the method cache
//! - [`config`], [`error`], [`logging`], [`stats`]: ambient support

pub mod capi;
pub mod config;
pub mod error;
pub mod gc;
pub mod global_cache;
pub mod logging;
pub mod memory;
pub mod object;
pub mod roots;
pub mod state;
pub mod stats;
pub mod thread;

pub use config::GcConfig;
pub use error::{GcError, Result};
pub use gc::{
    AddressDisplacement, CollectionReport, Collector, GarbageCollector, GcData, GcGeneration,
    MarkSweepCollector, ObjectMark, YoungCollector,
};
pub use state::SharedState;

/// vmgc version string from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Build a VM heap with the default configuration
pub fn init() -> Result<SharedState> {
    SharedState::new(GcConfig::default())
}

/// Build a VM heap with a custom configuration
///
/// # Examples
///
/// ```rust
/// let config = vmgc::GcConfig {
///     young_space_size: 256 * 1024,
///     verify_after_gc: true,
///     ..Default::default()
/// };
/// let state = vmgc::init_with_config(config)?;
/// assert_eq!(state.memory().object_count(), 0);
/// # Ok::<(), vmgc::GcError>(())
/// ```
pub fn init_with_config(config: GcConfig) -> Result<SharedState> {
    SharedState::new(config)
}
