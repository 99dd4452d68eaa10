//! Error Module - vmgc Error Types
//!
//! Errors surface only at the collaborator boundary: allocating objects,
//! touching slots, resolving native handles, locking objects, building a
//! configuration. A collection pass itself never returns an error; invariant
//! breaks inside a pass go through [`fatal`].
//!
//! # Error Categories
//!
//! ## Memory Errors
//! - `OutOfMemory` - Young or mature space exhausted
//! - `InvalidObject` - Address does not name a live heap object
//! - `SlotOutOfBounds` - Slot index past the object's slot count
//!
//! ## Collaborator Errors
//! - `InvalidHandle` - Native handle was released or invalidated
//! - `UnknownThread` - Thread id not registered with the nexus
//! - `LockNotHeld` - Unlock from a thread that does not own the lock
//!
//! ## Configuration Errors
//! - `Configuration` - Invalid configuration
//! - `Internal` - Invariant violation outside a pass

use thiserror::Error;

/// Main error type for all vmgc operations
///
/// # Examples
///
/// ```rust
/// use vmgc::GcError;
///
/// fn handle_error(err: GcError) {
///     match err {
///         GcError::OutOfMemory { requested, available } => {
///             eprintln!("OOM: requested {}, available {}", requested, available);
///         }
///         _ => eprintln!("Other error: {}", err),
///     }
/// }
/// ```
#[derive(Debug, Error)]
pub enum GcError {
    /// Out of memory - a space has no room for the request
    ///
    /// **When returned:** Allocation or promotion exceeds the remaining space
    ///
    /// **Recovery strategy:** Run a collection and retry
    #[error("Out of memory: requested {requested} bytes, available {available} bytes")]
    OutOfMemory { requested: usize, available: usize },

    /// Address does not name a live heap object
    ///
    /// **When returned:** Slot access on a freed, never-allocated or immediate value
    #[error("Invalid object address: {address:#x}")]
    InvalidObject { address: usize },

    /// Slot index outside the object
    #[error("Slot index {index} out of bounds for {length} slots")]
    SlotOutOfBounds { index: usize, length: usize },

    /// Native handle no longer valid
    ///
    /// **When returned:** Resolving a handle whose object was collected or
    /// which was released by native code
    #[error("Invalid native handle: {0}")]
    InvalidHandle(u64),

    /// Thread id unknown to the thread registry
    #[error("Unknown thread: {0}")]
    UnknownThread(u64),

    /// Unlock attempted by a thread that does not own the lock
    #[error("Object {address:#x} is not locked by thread {thread}")]
    LockNotHeld { address: usize, thread: u64 },

    /// Configuration error
    ///
    /// **When returned:** Invalid GC configuration detected
    ///
    /// **Recovery strategy:** Use default configuration or fail fast
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Internal error - indicates a bug in vmgc
    ///
    /// **Action required:** Report to developers with full stack trace
    #[error("Internal error: {0}")]
    Internal(String),
}

impl GcError {
    /// Check if this error is recoverable
    pub fn is_recoverable(&self) -> bool {
        matches!(self, GcError::OutOfMemory { .. } | GcError::InvalidHandle(_))
    }

    /// Check if this error indicates a bug in the code
    pub fn is_bug(&self) -> bool {
        matches!(
            self,
            GcError::Internal(_) | GcError::SlotOutOfBounds { .. }
        )
    }
}

impl From<crate::config::ConfigError> for GcError {
    fn from(err: crate::config::ConfigError) -> Self {
        GcError::Configuration(err.to_string())
    }
}

/// Result type alias for vmgc operations
pub type Result<T> = std::result::Result<T, GcError>;

/// Abort the running pass on a broken heap invariant.
///
/// A collection pass has no recoverable error path, so the only sound
/// reaction to a dangling reference or a double delete is to stop the
/// process. The message goes to the log first so it survives the unwind.
#[cold]
#[track_caller]
pub fn fatal(message: impl std::fmt::Display) -> ! {
    log::error!("fatal GC invariant violation: {}", message);
    panic!("fatal GC invariant violation: {}", message);
}

/// Macro for assertion with context, fatal on failure
#[macro_export]
macro_rules! gc_assert {
    ($cond:expr, $context:expr) => {
        if !$cond {
            $crate::error::fatal(format!("{} ({})", $context, stringify!($cond)));
        }
    };
    ($cond:expr, $fmt:expr, $($arg:tt)*) => {
        if !$cond {
            $crate::error::fatal(format!("{} ({})", format!($fmt, $($arg)*), stringify!($cond)));
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_classification() {
        let oom = GcError::OutOfMemory {
            requested: 64,
            available: 0,
        };
        assert!(oom.is_recoverable());
        assert!(!oom.is_bug());

        let internal = GcError::Internal("broken".to_string());
        assert!(internal.is_bug());
        assert!(!internal.is_recoverable());
    }

    #[test]
    fn test_error_display() {
        let err = GcError::InvalidObject { address: 0x1000 };
        assert_eq!(err.to_string(), "Invalid object address: 0x1000");
    }

    #[test]
    #[should_panic(expected = "fatal GC invariant violation")]
    fn test_gc_assert_panics() {
        gc_assert!(1 + 1 == 3, "arithmetic is broken");
    }
}
