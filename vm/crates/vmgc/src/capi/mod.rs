//! Native extension handles the collector scans and updates.

pub mod global_handle;
pub mod handle;

pub use global_handle::{GlobalHandle, GlobalHandles, GlobalLocation};
pub use handle::{CachedHandles, Handle, Handles};
